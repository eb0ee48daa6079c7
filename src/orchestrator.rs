//! End-to-end run wiring: load parameters, build or load the system matrix,
//! drive the optimizer, and report a structured run summary.

use crate::convergence::ConvergenceMonitor;
use crate::geometry::{ImageGeometry, SinoGeometry};
use crate::icd::{IcdOptimizer, OptimizerState, ReconParams};
use crate::sysmatrix::{BeamModel, BuilderContext, SystemMatrix};
use crate::trace::{trace_event, trace_span};
use crate::util::MbirResult;
use crate::volume::{Residual, Sinogram, Volume, Weights};

/// Attenuation of air and of water, used by the Hounsfield-unit conversion.
pub const MU_AIR: f32 = 0.0;
/// Linear attenuation coefficient of water at the reference energy, mm^-1.
pub const MU_WATER: f32 = 0.020_252_7;

/// Converts a linear attenuation coefficient (mm^-1) to Hounsfield units.
pub fn mu_to_hu(mu: f32) -> f32 {
    1000.0 * (mu - MU_AIR) / (MU_WATER - MU_AIR)
}

/// Converts Hounsfield units back to a linear attenuation coefficient (mm^-1).
pub fn hu_to_mu(hu: f32) -> f32 {
    hu * (MU_WATER - MU_AIR) / 1000.0 + MU_AIR
}

/// Structured summary of one reconstruction run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    pub iterations_run: u32,
    pub final_rmse_percent: f64,
    pub converged: bool,
    pub numeric_error_count: u64,
}

/// Builds the system matrix from geometry, either sequentially or (with the
/// `rayon` feature) across a thread pool.
pub fn build_system_matrix(
    sino: &SinoGeometry,
    image: &ImageGeometry,
    beam: BeamModel,
) -> MbirResult<SystemMatrix> {
    let _span = trace_span!("build_system_matrix", columns = image.nxy()).entered();
    let ctx = BuilderContext::new(sino, image, beam);
    let matrix = {
        #[cfg(feature = "rayon")]
        {
            SystemMatrix::build_parallel(&ctx, image.nxy())
        }
        #[cfg(not(feature = "rayon"))]
        {
            SystemMatrix::build(&ctx, image.nxy())
        }
    }?;
    trace_event!("system_matrix_built", columns = matrix.n_columns());
    Ok(matrix)
}

/// Drives reconstruction to completion (or the iteration cap), given an
/// already-built system matrix, a loaded sinogram and weights, and an initial
/// volume (typically filled with `ReconParams::init_image_value`).
pub fn reconstruct(
    matrix: &SystemMatrix,
    sino: &Sinogram,
    weights: &Weights,
    volume: &mut Volume,
    image: &ImageGeometry,
    params: ReconParams,
    seed: u64,
) -> MbirResult<RunReport> {
    let _span = trace_span!("reconstruct", nx = image.nx(), ny = image.ny(), nz = image.nz()).entered();
    let mut residual = Residual::filled_with_rows(sino.n_rows(), image.nz(), 0.0);
    for z in 0..image.nz() {
        let e = residual.slice_mut(z);
        let y = sino.slice(z);
        e.copy_from_slice(y);
        let x = volume.slice(z);
        for (xy, &v) in x.iter().enumerate() {
            if v == 0.0 {
                continue;
            }
            for (row, a) in matrix.column(xy).iter() {
                e[row as usize] -= a * v;
            }
        }
    }

    let mut optimizer = IcdOptimizer::new(params, seed)?;
    let monitor: ConvergenceMonitor = optimizer.run(
        matrix,
        volume,
        &mut residual,
        weights,
        image.nx(),
        image.ny(),
        image.nz(),
        || false,
    )?;

    if optimizer.state() == OptimizerState::MaxIterReached {
        trace_event!("convergence_warning", iterations = optimizer.iteration());
    }
    trace_event!(
        "reconstruct_done",
        iterations = optimizer.iteration(),
        rmse_percent = monitor.rmse_percent()
    );

    Ok(RunReport {
        iterations_run: optimizer.iteration(),
        final_rmse_percent: monitor.rmse_percent(),
        converged: optimizer.state() == OptimizerState::Converged,
        numeric_error_count: optimizer.skipped_voxels(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hu_round_trips_through_mu() {
        let mu = 0.025f32;
        let hu = mu_to_hu(mu);
        let back = hu_to_mu(hu);
        assert!((mu - back).abs() < 1e-6);
    }

    #[test]
    fn water_maps_to_zero_hu() {
        assert!((mu_to_hu(MU_WATER) - 0.0).abs() < 1e-3);
    }

    #[test]
    fn air_maps_to_minus_1000_hu() {
        assert!((mu_to_hu(MU_AIR) - (-1000.0)).abs() < 1e-3);
    }
}
