//! Slice-parallel ICD sweep: each worker owns one slice's strip of the volume
//! and its residual row, so slices can be updated independently. Voxels within
//! a slice remain strictly sequential because each update mutates the
//! residual and the in-plane neighbor values that subsequent updates in the
//! same slice read.
//!
//! Interslice neighbors (+z, -z) belong to a concurrently-running worker's
//! slice, so they are read from `neighbor_snapshot`, a copy of the volume
//! taken at the start of the sweep, rather than from the live buffer.

use super::scalar::{icd_step, update_residual};
use super::{sweep_order, ReconParams};
use crate::sysmatrix::SystemMatrix;
use crate::volume::Volume;
use rayon::prelude::*;

/// Runs one sweep over every slice in parallel, returning `(sum_diff_sq, sum_v_sq)`
/// accumulated across all voxels for the convergence check.
#[allow(clippy::too_many_arguments)]
pub fn sweep_all_slices(
    matrix: &SystemMatrix,
    volume_slices: &mut [&mut [f32]],
    neighbor_snapshot: &Volume,
    residual_slices: &mut [&mut [f32]],
    weights_slices: &[&[f32]],
    nx: usize,
    ny: usize,
    nz: usize,
    params: &ReconParams,
    seed: u64,
    iteration: u32,
) -> (f64, f64) {
    let nxy = nx * ny;
    volume_slices
        .par_iter_mut()
        .zip(residual_slices.par_iter_mut())
        .zip(weights_slices.par_iter())
        .enumerate()
        .map(|(z, ((volume_slice, residual_slice), weights_slice))| {
            sweep_one_slice(
                matrix,
                volume_slice,
                neighbor_snapshot,
                residual_slice,
                weights_slice,
                nx,
                ny,
                nz,
                z,
                nxy,
                params,
                seed,
                iteration,
            )
        })
        .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1))
}

#[allow(clippy::too_many_arguments)]
fn sweep_one_slice(
    matrix: &SystemMatrix,
    volume_slice: &mut [f32],
    neighbor_snapshot: &Volume,
    residual_slice: &mut [f32],
    weights_slice: &[f32],
    nx: usize,
    ny: usize,
    nz: usize,
    z: usize,
    nxy: usize,
    params: &ReconParams,
    seed: u64,
    iteration: u32,
) -> (f64, f64) {
    let order = sweep_order(nxy, seed, iteration, z);
    let mut sum_diff_sq = 0.0f64;
    let mut sum_v_sq = 0.0f64;

    for xy in order {
        let xy = xy as usize;
        let jx = xy % nx;
        let jy = xy / nx;
        let v = volume_slice[xy];
        let column = matrix.column(xy);

        let (_, outcome) = icd_step(
            column,
            residual_slice,
            weights_slice,
            v,
            jx,
            jy,
            z,
            nx,
            ny,
            nz,
            params,
            |nx_, ny_, nz_| {
                if nz_ == z {
                    volume_slice[ny_ * nx + nx_]
                } else {
                    neighbor_snapshot.get(nz_, ny_ * nx + nx_)
                }
            },
        );

        if let super::StepOutcome::Updated(updated) = outcome {
            let diff = updated - v;
            update_residual(column, residual_slice, diff);
            volume_slice[xy] = updated;
            sum_diff_sq += (diff as f64).powi(2);
            sum_v_sq += (updated as f64).powi(2);
        }
    }

    (sum_diff_sq, sum_v_sq)
}
