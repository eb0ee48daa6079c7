//! Sparse forward-projection system matrix, shared across all slices.
//!
//! One [`SystemMatrix`] column is built per image pixel and reused by every
//! slice (the parallel-beam geometry does not vary with z), the same way a
//! template plan is precomputed once from a reference patch and then sampled
//! by many scan positions.

mod io;

pub use io::{read_system_matrix, write_system_matrix};

use crate::geometry::profile::{ProfileTable, LEN_PIX};
use crate::geometry::{ImageGeometry, SinoGeometry};
use crate::util::{MbirError, MbirResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// How a detector channel's aperture is modeled when sampling the pixel profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BeamModel {
    /// Sample only the center of the detector aperture.
    #[default]
    Narrow,
    /// Split the aperture into `len_det` sub-elements and average their samples.
    Wide { len_det: usize },
}

/// One sparse column of the system matrix: the nonzero weights contributed by a
/// single image pixel to the sinogram rows it projects onto.
#[derive(Clone, Debug, Default)]
pub struct SparseColumn {
    values: Box<[f32]>,
    row_indices: Box<[u32]>,
}

impl SparseColumn {
    /// Builds a column from its raw parts. Exposed crate-wide for file I/O and tests.
    pub(crate) fn from_parts(values: Box<[f32]>, row_indices: Box<[u32]>) -> Self {
        Self { values, row_indices }
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The nonzero weights.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The sinogram row index (`view * NChannels + channel`) of each nonzero weight.
    pub fn row_indices(&self) -> &[u32] {
        &self.row_indices
    }

    /// Iterates over `(row_index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.row_indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// Precomputed constants shared by every column the builder constructs, replacing
/// the function-static first-call initialization of the reference implementation
/// with an explicit, reusable context.
#[derive(Clone, Debug)]
pub struct BuilderContext {
    n_views: usize,
    n_channels: usize,
    nx: usize,
    delta_channel: f32,
    delta_xy: f32,
    t0: f32,
    x0: f32,
    y0: f32,
    view_angles: Vec<f32>,
    profile: ProfileTable,
    beam: BeamModel,
}

impl BuilderContext {
    /// Builds a context from sinogram and image geometry, precomputing the
    /// detector-pixel profile table.
    pub fn new(sino: &SinoGeometry, image: &ImageGeometry, beam: BeamModel) -> Self {
        let profile = ProfileTable::build(sino, image.delta_xy());
        Self {
            n_views: sino.n_views(),
            n_channels: sino.n_channels(),
            nx: image.nx(),
            delta_channel: sino.delta_channel(),
            delta_xy: image.delta_xy(),
            t0: sino.t0(),
            x0: image.x0(),
            y0: image.y0(),
            view_angles: sino.view_angles().to_vec(),
            profile,
            beam,
        }
    }

    /// Builds one sparse column for pixel `column_index = row * Nx + col`.
    pub fn build_column(&self, column_index: usize) -> MbirResult<SparseColumn> {
        let im_row = column_index / self.nx;
        let im_col = column_index % self.nx;
        let y = self.y0 + im_row as f32 * self.delta_xy;
        let x = self.x0 + im_col as f32 * self.delta_xy;

        let max_nnz = self.n_channels * self.n_views;
        let mut values = Vec::with_capacity(max_nnz.min(4 * self.n_views));
        let mut row_indices = Vec::with_capacity(max_nnz.min(4 * self.n_views));

        for (view, &ang) in self.view_angles.iter().enumerate() {
            let pind = view * self.n_channels;
            let (sin_a, cos_a) = ang.sin_cos();

            let t_min = y * cos_a - x * sin_a - self.delta_xy;
            let t_max = t_min + 2.0 * self.delta_xy;
            if t_max < self.t0 {
                continue;
            }

            let mut ind_min = ((t_min - self.t0) / self.delta_channel - 0.5).ceil() as i64;
            let mut ind_max = ((t_max - self.t0) / self.delta_channel + 0.5) as i64;
            ind_min = ind_min.max(0);
            ind_max = ind_max.min(self.n_channels as i64 - 1);

            let const3 = self.delta_xy - (y * cos_a - x * sin_a);

            for i in ind_min..=ind_max {
                let aval = match self.beam {
                    BeamModel::Narrow => {
                        let prof_ind_f =
                            LEN_PIX as f32 * (self.t0 + i as f32 * self.delta_channel + const3)
                                / (2.0 * self.delta_xy);
                        let prof_ind = prof_ind_f as i64;
                        let prof_ind = if prof_ind == LEN_PIX as i64 {
                            LEN_PIX as i64 - 1
                        } else if prof_ind == -1 {
                            0
                        } else if !(0..LEN_PIX as i64).contains(&prof_ind) {
                            return Err(MbirError::GeometryInconsistency {
                                column: column_index,
                                context: MbirError::UNKNOWN_SOURCE.to_string(),
                                reason: format!(
                                    "profile index {prof_ind} out of range for view {view}, channel {i}"
                                ),
                            });
                        } else {
                            prof_ind
                        };
                        self.profile.sample_nearest(view, prof_ind)
                    }
                    BeamModel::Wide { len_det } => {
                        let const1 = self.t0 - self.delta_channel / 2.0 + self.delta_channel / (len_det as f32 - 1.0);
                        let const2 = self.delta_channel / (len_det as f32 - 1.0);
                        let const4 = (LEN_PIX as f32 - 1.0) / (2.0 * self.delta_xy);
                        let weight = 1.0 / len_det as f32;
                        let mut acc = 0.0f32;
                        for k in 0..len_det {
                            let t = const1 + i as f32 * self.delta_channel + k as f32 * const2;
                            let prof_ind = (t + const3) * const4 + 0.5;
                            let prof_ind = prof_ind as i64;
                            if (0..LEN_PIX as i64).contains(&prof_ind) {
                                acc += weight * self.profile.sample_nearest(view, prof_ind);
                            }
                        }
                        acc
                    }
                };

                if aval > 0.0 {
                    values.push(aval);
                    row_indices.push((pind as i64 + i) as u32);
                }
            }
        }

        Ok(SparseColumn {
            values: values.into_boxed_slice(),
            row_indices: row_indices.into_boxed_slice(),
        })
    }
}

/// The full sparse system matrix: one column per image pixel.
#[derive(Clone, Debug)]
pub struct SystemMatrix {
    columns: Vec<SparseColumn>,
}

impl SystemMatrix {
    /// Builds the full matrix sequentially.
    pub fn build(ctx: &BuilderContext, n_columns: usize) -> MbirResult<Self> {
        let columns = (0..n_columns)
            .map(|i| ctx.build_column(i))
            .collect::<MbirResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Builds the full matrix with columns computed across a thread pool.
    #[cfg(feature = "rayon")]
    pub fn build_parallel(ctx: &BuilderContext, n_columns: usize) -> MbirResult<Self> {
        let columns = (0..n_columns)
            .into_par_iter()
            .map(|i| ctx.build_column(i))
            .collect::<MbirResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Number of columns (image pixels).
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Borrows column `index`.
    pub fn column(&self, index: usize) -> &SparseColumn {
        &self.columns[index]
    }
}
