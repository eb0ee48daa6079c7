//! Iterative coordinate-descent (ICD) optimizer.
//!
//! Each step forms a local quadratic surrogate of the cost function at one
//! voxel from both the data-fit term (via the voxel's sparse column of `A`)
//! and the QGGMRF prior (via its 10-neighbor surrogate), takes the Newton
//! step of that surrogate, and keeps the residual `e = y - Ax` consistent.

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon_sweep;

use crate::neighborhood::extract_neighbors;
use crate::prior::QggmrfParams;
use crate::util::{MbirError, MbirResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Reconstruction hyperparameters: prior shape/scale, neighbor weights, and the
/// optimizer's stopping policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconParams {
    pub prior: QggmrfParams,
    pub b_nearest: f32,
    pub b_diag: f32,
    pub b_interslice: f32,
    pub positivity: bool,
    pub stop_threshold: f32,
    pub max_iterations: u32,
    pub init_image_value: f32,
}

impl ReconParams {
    /// Validates neighbor weights and stopping policy.
    pub fn validate(&self) -> MbirResult<()> {
        if self.b_nearest < 0.0 || self.b_diag < 0.0 || self.b_interslice < 0.0 {
            return Err(MbirError::ParameterError {
                context: "ReconParams".into(),
                reason: "b_nearest, b_diag, b_interslice must all be non-negative".into(),
            });
        }
        if !self.stop_threshold.is_finite() || self.stop_threshold < 0.0 {
            return Err(MbirError::ParameterError {
                context: "ReconParams".into(),
                reason: "StopThreshold must be a non-negative finite value".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(MbirError::ParameterError {
                context: "ReconParams".into(),
                reason: "MaxIterations must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Per-step transient state: the quadratic surrogate coefficients accumulated
/// while visiting one voxel's column and its 10 neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IcdStepContext {
    pub v: f32,
    pub neighbors: [f32; 10],
    pub theta1: f32,
    pub theta2: f32,
}

/// Outcome of one voxel update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The voxel was updated to the given value.
    Updated(f32),
    /// theta2 was non-positive with an empty column and zero prior weight;
    /// the voxel is left unchanged.
    Skipped,
}

/// Builds a deterministic voxel sweep order for one iteration of a slice with
/// `nxy` pixels, seeded by `(seed, iteration, slice)` so the traversal is
/// reproducible without sharing mutable RNG state across slices.
pub fn sweep_order(nxy: usize, seed: u64, iteration: u32, slice: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..nxy as u32).collect();
    let mixed_seed = seed
        ^ (iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (slice as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    let mut rng = StdRng::seed_from_u64(mixed_seed);
    order.shuffle(&mut rng);
    order
}

pub(crate) fn accumulate_prior(
    v: f32,
    jx: usize,
    jy: usize,
    jz: usize,
    nx: usize,
    ny: usize,
    nz: usize,
    params: &ReconParams,
    mut value_at: impl FnMut(usize, usize, usize) -> f32,
) -> (f32, f32) {
    use crate::neighborhood::NeighborBucket;
    use crate::prior::surrogate_coeff;

    let neighbors = extract_neighbors(jx, jy, jz, nx, ny, nz, &mut value_at);

    let mut sum1_nearest = 0.0f32;
    let mut sum2_nearest = 0.0f32;
    let mut sum1_interslice = 0.0f32;
    let mut sum2_interslice = 0.0f32;
    let mut sum1_diag = 0.0f32;
    let mut sum2_diag = 0.0f32;

    for neighbor in neighbors {
        let delta = v - neighbor.value;
        let coeff = surrogate_coeff(delta, &params.prior);
        match neighbor.bucket {
            NeighborBucket::Nearest => {
                sum1_nearest += coeff * delta;
                sum2_nearest += coeff;
            }
            NeighborBucket::Interslice => {
                sum1_interslice += coeff * delta;
                sum2_interslice += coeff;
            }
            NeighborBucket::Diagonal => {
                sum1_diag += coeff * delta;
                sum2_diag += coeff;
            }
        }
    }

    let theta1 = params.b_nearest * sum1_nearest
        + params.b_diag * sum1_diag
        + params.b_interslice * sum1_interslice;
    let theta2 = params.b_nearest * sum2_nearest
        + params.b_diag * sum2_diag
        + params.b_interslice * sum2_interslice;

    (theta1, theta2)
}

/// The optimizer's run state, per the `Idle -> Initializing -> Sweeping ->
/// (Sweeping | Converged | MaxIterReached)` lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerState {
    Idle,
    Initializing,
    Sweeping,
    Converged,
    MaxIterReached,
}

/// The outer ICD scheduler: sweeps the volume, invokes one step per voxel,
/// keeps the volume and residual updated, and tracks convergence.
pub struct IcdOptimizer {
    params: ReconParams,
    seed: u64,
    state: OptimizerState,
    iteration: u32,
    skipped_voxels: u64,
}

impl IcdOptimizer {
    /// Builds an optimizer in the `Idle` state. `seed` makes the per-iteration
    /// voxel sweep order reproducible.
    pub fn new(params: ReconParams, seed: u64) -> MbirResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            seed,
            state: OptimizerState::Idle,
            iteration: 0,
            skipped_voxels: 0,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Voxels skipped across the run due to a degenerate (theta2 <= 0) quadratic.
    pub fn skipped_voxels(&self) -> u64 {
        self.skipped_voxels
    }

    /// Runs sweeps against `volume`/`residual`/`weights` until convergence or
    /// `MaxIterations`, using a single-threaded flat traversal of the volume.
    /// `cancelled` is polled once per sweep boundary.
    pub fn run(
        &mut self,
        matrix: &crate::sysmatrix::SystemMatrix,
        volume: &mut crate::volume::Volume,
        residual: &mut crate::volume::Residual,
        weights: &crate::volume::Weights,
        nx: usize,
        ny: usize,
        nz: usize,
        mut cancelled: impl FnMut() -> bool,
    ) -> MbirResult<crate::convergence::ConvergenceMonitor> {
        self.state = OptimizerState::Initializing;
        let nxy = nx * ny;
        let mut monitor = crate::convergence::ConvergenceMonitor::new();

        self.state = OptimizerState::Sweeping;
        loop {
            if cancelled() {
                break;
            }
            monitor = crate::convergence::ConvergenceMonitor::new();
            let order = sweep_order(nxy * nz, self.seed, self.iteration, 0);

            for voxel in order {
                let voxel = voxel as usize;
                let z = voxel / nxy;
                let xy = voxel % nxy;
                let jx = xy % nx;
                let jy = xy / nx;
                let v = volume.get(z, xy);
                let column = matrix.column(xy);

                let (_, outcome) = scalar::icd_step(
                    column,
                    residual.slice(z),
                    weights.slice(z),
                    v,
                    jx,
                    jy,
                    z,
                    nx,
                    ny,
                    nz,
                    &self.params,
                    |nx_, ny_, nz_| volume.get(nz_, ny_ * nx + nx_),
                );

                match outcome {
                    StepOutcome::Updated(updated) => {
                        let diff = updated - v;
                        scalar::update_residual(column, residual.slice_mut(z), diff);
                        volume.set(z, xy, updated);
                        monitor.accumulate((diff as f64).powi(2), (updated as f64).powi(2));
                    }
                    StepOutcome::Skipped => {
                        self.skipped_voxels += 1;
                    }
                }
            }

            self.iteration += 1;
            if monitor.should_stop(self.params.stop_threshold, self.iteration, self.params.max_iterations) {
                self.state = if self.iteration >= self.params.max_iterations {
                    OptimizerState::MaxIterReached
                } else {
                    OptimizerState::Converged
                };
                break;
            }
        }

        Ok(monitor)
    }
}
