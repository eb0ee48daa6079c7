//! Sequential per-voxel ICD step and single-slice sweep.

use super::{accumulate_prior, IcdStepContext, ReconParams, StepOutcome};
use crate::sysmatrix::SparseColumn;

/// Computes theta1/theta2 for one voxel from its sparse column against the
/// slice's residual and weights, then folds in the QGGMRF prior contribution.
pub fn icd_step(
    column: &SparseColumn,
    residual_slice: &[f32],
    weights_slice: &[f32],
    v: f32,
    jx: usize,
    jy: usize,
    jz: usize,
    nx: usize,
    ny: usize,
    nz: usize,
    params: &ReconParams,
    value_at: impl FnMut(usize, usize, usize) -> f32,
) -> (IcdStepContext, StepOutcome) {
    let mut theta1 = 0.0f32;
    let mut theta2 = 0.0f32;
    for (row, a) in column.iter() {
        let i = row as usize;
        theta1 -= a * weights_slice[i] * residual_slice[i];
        theta2 += a * weights_slice[i] * a;
    }

    let (prior_theta1, prior_theta2) =
        accumulate_prior(v, jx, jy, jz, nx, ny, nz, params, value_at);
    theta1 += prior_theta1;
    theta2 += prior_theta2;

    let ctx = IcdStepContext {
        v,
        neighbors: [0.0; 10],
        theta1,
        theta2,
    };

    if theta2 <= 0.0 {
        return (ctx, StepOutcome::Skipped);
    }

    let mut updated = v - theta1 / theta2;
    if params.positivity {
        updated = updated.max(0.0);
    }
    (ctx, StepOutcome::Updated(updated))
}

/// Applies `diff = updated - previous` to the residual for every nonzero of `column`.
pub fn update_residual(column: &SparseColumn, residual_slice: &mut [f32], diff: f32) {
    for (row, a) in column.iter() {
        residual_slice[row as usize] -= a * diff;
    }
}

/// Sweeps every voxel of slice `z` sequentially in the deterministic order for
/// `(seed, iteration, z)`, returning `(sum_diff_sq, sum_v_sq)` for convergence.
#[allow(clippy::too_many_arguments)]
pub fn sweep_slice(
    matrix: &crate::sysmatrix::SystemMatrix,
    volume_slice: &mut [f32],
    residual_slice: &mut [f32],
    weights_slice: &[f32],
    nx: usize,
    ny: usize,
    nz: usize,
    z: usize,
    params: &ReconParams,
    seed: u64,
    iteration: u32,
    mut other_slice: impl FnMut(usize, usize, usize) -> f32,
) -> (f64, f64) {
    let nxy = nx * ny;
    let order = super::sweep_order(nxy, seed, iteration, z);
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
                    other_slice(nx_, ny_, nz_)
                }
            },
        );

        if let StepOutcome::Updated(updated) = outcome {
            let diff = updated - v;
            update_residual(column, residual_slice, diff);
            volume_slice[xy] = updated;
            sum_diff_sq += (diff as f64).powi(2);
            sum_v_sq += (updated as f64).powi(2);
        }
    }

    (sum_diff_sq, sum_v_sq)
}
