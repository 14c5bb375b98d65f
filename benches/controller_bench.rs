#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use cruise::{
    camera::{controller::CruiseControls, core::Camera},
    input::{
        DeltaMode, InputEvent, ListenerRegistry, PlatformProfile, WheelDelta,
    },
    options::Options,
};

fn controls() -> (CruiseControls<Camera, ListenerRegistry>, ListenerRegistry) {
    let registry = ListenerRegistry::new();
    let controls = CruiseControls::new(
        Camera::default(),
        registry.clone(),
        &Options::default(),
        PlatformProfile::default(),
    )
    .unwrap();
    (controls, registry)
}

fn idle_update_benchmark(c: &mut Criterion) {
    let (mut controls, _registry) = controls();
    c.bench_function("update_idle", |b| {
        b.iter(|| black_box(controls.update(black_box(0.016))))
    });
}

fn held_keys_benchmark(c: &mut Criterion) {
    let (mut controls, registry) = controls();
    for code in ["KeyW", "KeyD", "ArrowLeft", "KeyQ"] {
        let _ = registry.dispatch(&InputEvent::KeyDown { code: code.into() });
    }
    c.bench_function("update_held_keys", |b| {
        b.iter(|| black_box(controls.update(black_box(0.016))))
    });
}

fn dispatch_benchmark(c: &mut Criterion) {
    let (mut controls, registry) = controls();
    let _ = registry.dispatch(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
    let mut group = c.benchmark_group("dispatch_then_update");

    group.bench_function("pointer_move", |b| {
        let mut x = 0.0_f32;
        b.iter(|| {
            x += 1.0;
            let _ = registry.dispatch(&InputEvent::PointerMove { x, y: 0.0 });
            black_box(controls.update(0.016))
        })
    });

    let wheel = InputEvent::Wheel {
        delta: WheelDelta::Standard {
            delta_y: -100.0,
            mode: DeltaMode::Pixel,
        },
    };
    group.bench_function("wheel", |b| {
        b.iter(|| {
            let _ = registry.dispatch(black_box(&wheel));
            black_box(controls.update(0.016))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    idle_update_benchmark,
    held_keys_benchmark,
    dispatch_benchmark
);
criterion_main!(benches);
