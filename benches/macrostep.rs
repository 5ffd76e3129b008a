//! Cost of one outer macro-step at varying body counts and `S_max`.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shellstep::body::{Body, BodySet};
use shellstep::config::IntegratorConfig;
use shellstep::integrator::{Integrator, Simulation};
use shellstep::math::Vector;
use std::f64::consts::TAU;
use std::hint::black_box;

/// A star plus `count - 1` planets on randomized, well-separated circular-ish
/// orbits, so close encounters are rare and the benchmark mostly measures
/// the outer shell's cost.
fn solar_system(count: usize, seed: u64) -> BodySet {
    let mut state = seed.wrapping_mul(2_685_821_657_736_338_717).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state as f64 / u64::MAX as f64
    };

    let g = 1.0;
    let star_mass = 1.0;
    let mut bodies = vec![Body::new(star_mass, Vector::ZERO, Vector::ZERO)];

    for i in 1..count {
        let radius = 1.0 + i as f64 * 0.3;
        let speed = libm::sqrt(g * star_mass / radius);
        let theta = next() * TAU;
        let position = Vector::new(radius * theta.cos(), radius * theta.sin(), 0.0);
        let velocity = Vector::new(-speed * theta.sin(), speed * theta.cos(), 0.0);
        bodies.push(Body::new(1e-6, position, velocity));
    }

    BodySet::new(bodies, count)
}

fn bench_macrostep_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("macrostep_scaling");

    for &count in &[2usize, 10, 50] {
        let bodies = solar_system(count, 3);
        let dt = TAU / 100.0;
        let config = IntegratorConfig {
            whsplitting: false,
            ..IntegratorConfig::default()
        };

        group.throughput(Throughput::Elements((count * count) as u64));
        group.bench_with_input(BenchmarkId::new("bodies", count), &count, |b, _| {
            b.iter(|| {
                let mut sim = Simulation::new(bodies.clone(), 1.0, dt);
                let mut integrator = Integrator::new(config.clone());
                integrator.part1(&mut sim);
                black_box(integrator.part2(&mut sim));
            });
        });
    }

    group.finish();
}

fn bench_macrostep_by_s_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("macrostep_s_max");
    let bodies = solar_system(20, 5);
    let dt = TAU / 100.0;

    for &s_max in &[1usize, 3, 10] {
        let config = IntegratorConfig {
            whsplitting: false,
            s_max,
            ..IntegratorConfig::default()
        };

        group.bench_with_input(BenchmarkId::new("s_max", s_max), &s_max, |b, _| {
            b.iter(|| {
                let mut sim = Simulation::new(bodies.clone(), 1.0, dt);
                let mut integrator = Integrator::new(config.clone());
                integrator.part1(&mut sim);
                black_box(integrator.part2(&mut sim));
            });
        });
    }

    group.finish();
}

criterion_group!(macrostep, bench_macrostep_scaling, bench_macrostep_by_s_max);
criterion_main!(macrostep);
