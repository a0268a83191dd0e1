use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use escapade_core::{Backend, EscapeParams, PlaneWindow, RasterSpec};
use escapade_render::{render, Formula, Palette, RenderRequest};

fn request(width: u32, height: u32) -> RenderRequest {
    RenderRequest {
        window: PlaneWindow::FULL,
        raster: RasterSpec::new(width, height).unwrap(),
        backend: Backend::Fixed64,
        formula: Formula::default(),
        palette: Palette::grayscale(),
        supersample: false,
    }
}

fn bench_full_frame_render(c: &mut Criterion) {
    let req = request(640, 480);
    c.bench_function("full_frame_640x480", |b| {
        b.iter(|| render(&req).unwrap());
    });
}

fn bench_supersampled(c: &mut Criterion) {
    let req = RenderRequest {
        supersample: true,
        ..request(320, 240)
    };
    c.bench_function("supersampled_320x240", |b| {
        b.iter(|| render(&req).unwrap());
    });
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("backend_128x128");
    group.sample_size(10);
    let window = PlaneWindow::new(-0.8, -0.2, -0.4, 0.2).unwrap();
    for backend in [
        Backend::Fixed32,
        Backend::Fixed64,
        Backend::BigFloat {
            precision_bits: 128,
        },
    ] {
        let req = RenderRequest {
            window,
            backend,
            formula: Formula::Mandelbrot(EscapeParams::new(100, 2.0).unwrap()),
            ..request(128, 128)
        };
        group.bench_with_input(BenchmarkId::from_parameter(backend.name()), &req, |b, req| {
            b.iter(|| render(req).unwrap());
        });
    }
    group.finish();
}

fn bench_newton(c: &mut Criterion) {
    let formula = Formula::unity_quartic();
    let req = RenderRequest {
        palette: formula.default_palette(),
        formula,
        ..request(256, 256)
    };
    c.bench_function("newton_256x256", |b| {
        b.iter(|| render(&req).unwrap());
    });
}

criterion_group!(
    benches,
    bench_full_frame_render,
    bench_supersampled,
    bench_backends,
    bench_newton
);
criterion_main!(benches);
