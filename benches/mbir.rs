use criterion::{criterion_group, criterion_main, Criterion};
use mbir::geometry::{ImageGeometry, SinoGeometry};
use mbir::icd::{IcdOptimizer, ReconParams};
use mbir::prior::QggmrfParams;
use mbir::sysmatrix::{BeamModel, BuilderContext, SystemMatrix};
use mbir::volume::{Residual, Volume, Weights};
use std::f32::consts::PI;
use std::hint::black_box;

fn make_geometry(n: usize) -> (SinoGeometry, ImageGeometry) {
    let n_views = 60;
    let angles: Vec<f32> = (0..n_views)
        .map(|i| i as f32 * PI / n_views as f32)
        .collect();
    let sino = SinoGeometry::new(n, 1.0, 0.0, angles).unwrap();
    let image = ImageGeometry::new(n, n, 1, 1.0, n as f32 / 2.0).unwrap();
    (sino, image)
}

fn bench_sysmatrix_build(c: &mut Criterion) {
    let (sino, image) = make_geometry(64);
    let ctx = BuilderContext::new(&sino, &image, BeamModel::Narrow);

    c.bench_function("sysmatrix_build_64", |b| {
        b.iter(|| black_box(SystemMatrix::build(&ctx, image.nxy()).unwrap()))
    });
}

fn bench_icd_sweep(c: &mut Criterion) {
    let (sino, image) = make_geometry(32);
    let ctx = BuilderContext::new(&sino, &image, BeamModel::Narrow);
    let matrix = SystemMatrix::build(&ctx, image.nxy()).unwrap();

    let params = ReconParams {
        prior: QggmrfParams::new(1.2, 2.0, 1.0, 0.01).unwrap(),
        b_nearest: 1.0,
        b_diag: std::f32::consts::FRAC_1_SQRT_2,
        b_interslice: 1.0,
        positivity: true,
        stop_threshold: 0.0,
        max_iterations: 1,
        init_image_value: 0.0,
    };

    c.bench_function("icd_one_sweep_32", |b| {
        b.iter(|| {
            let mut volume = Volume::filled(&image, 0.0);
            let mut residual = Residual::filled(&sino, image.nz(), 1.0);
            let weights = Weights::filled(&sino, image.nz(), 1.0);
            let mut optimizer = IcdOptimizer::new(params, 42).unwrap();
            black_box(
                optimizer
                    .run(
                        &matrix,
                        &mut volume,
                        &mut residual,
                        &weights,
                        image.nx(),
                        image.ny(),
                        image.nz(),
                        || false,
                    )
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_sysmatrix_build, bench_icd_sweep);
criterion_main!(benches);
