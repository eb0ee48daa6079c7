//! Low-level building blocks for custom reconstruction pipelines.
//!
//! These re-exports expose the profile table, sparse column builder, and
//! single-voxel ICD step for advanced use cases beyond [`orchestrator::reconstruct`].
//!
//! [`orchestrator::reconstruct`]: crate::orchestrator::reconstruct

pub use crate::geometry::profile::{ProfileTable, LEN_PIX};
pub use crate::icd::scalar::{icd_step, sweep_slice, update_residual};
pub use crate::neighborhood::{extract_neighbors, Neighbor, NeighborBucket};
pub use crate::prior::{potential, surrogate_coeff};
pub use crate::sysmatrix::{BeamModel, BuilderContext, SparseColumn};
