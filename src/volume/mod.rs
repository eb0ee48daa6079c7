//! Bounds-checked, slice-addressable buffers for the reconstructed volume, the
//! sinogram, the detector weights, and the running residual.
//!
//! Every buffer is stored as one flat contiguous allocation, laid out slice by
//! slice, so that an `ICD` sweep over slice `z` touches one contiguous region
//! of each buffer it reads or writes.

use crate::geometry::{ImageGeometry, SinoGeometry};
use crate::util::{MbirError, MbirResult};

/// The reconstructed attenuation volume `x`, one voxel per `(column, row, slice)`.
#[derive(Clone, Debug)]
pub struct Volume {
    nxy: usize,
    nz: usize,
    data: Box<[f32]>,
}

impl Volume {
    /// Creates a volume of the given geometry, filled with `fill`.
    pub fn filled(geometry: &ImageGeometry, fill: f32) -> Self {
        let nxy = geometry.nxy();
        let nz = geometry.nz();
        Self {
            nxy,
            nz,
            data: vec![fill; nxy * nz].into_boxed_slice(),
        }
    }

    /// Wraps an existing flat buffer as a volume, checking its length.
    pub fn from_vec(geometry: &ImageGeometry, data: Vec<f32>) -> MbirResult<Self> {
        let nxy = geometry.nxy();
        let nz = geometry.nz();
        let expected = nxy * nz;
        if data.len() != expected {
            return Err(MbirError::InvalidDimensions {
                reason: format!("volume buffer has {} elements, expected {expected}", data.len()),
            });
        }
        Ok(Self {
            nxy,
            nz,
            data: data.into_boxed_slice(),
        })
    }

    /// Pixels per slice.
    pub fn nxy(&self) -> usize {
        self.nxy
    }

    /// Number of slices.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Borrows slice `z` as an `Nxy`-long contiguous row.
    pub fn slice(&self, z: usize) -> &[f32] {
        let start = z * self.nxy;
        &self.data[start..start + self.nxy]
    }

    /// Mutably borrows slice `z`.
    pub fn slice_mut(&mut self, z: usize) -> &mut [f32] {
        let start = z * self.nxy;
        &mut self.data[start..start + self.nxy]
    }

    /// Reads voxel value at in-plane index `xy` on slice `z`.
    pub fn get(&self, z: usize, xy: usize) -> f32 {
        self.slice(z)[xy]
    }

    /// Sets voxel value at in-plane index `xy` on slice `z`.
    pub fn set(&mut self, z: usize, xy: usize, value: f32) {
        self.slice_mut(z)[xy] = value;
    }

    /// The full flat buffer, slice-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The full flat buffer, slice-major, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

/// A per-slice buffer shaped like the sinogram: `NViews * NChannels` rows, one
/// per slice. Shared representation for the sinogram `y`, the weights `w`, and
/// the running residual `e`.
#[derive(Clone, Debug)]
pub struct SinoBuffer {
    n_rows: usize,
    nz: usize,
    data: Box<[f32]>,
}

impl SinoBuffer {
    /// Creates a buffer of the given shape, filled with `fill`.
    pub fn filled(sino: &SinoGeometry, nz: usize, fill: f32) -> Self {
        Self::filled_with_rows(sino.n_rows(), nz, fill)
    }

    /// Creates a buffer with an explicit row count, filled with `fill`. Useful
    /// when matching the shape of an existing buffer without its geometry handle.
    pub fn filled_with_rows(n_rows: usize, nz: usize, fill: f32) -> Self {
        Self {
            n_rows,
            nz,
            data: vec![fill; n_rows * nz].into_boxed_slice(),
        }
    }

    /// Wraps an existing flat buffer, checking its length.
    pub fn from_vec(sino: &SinoGeometry, nz: usize, data: Vec<f32>) -> MbirResult<Self> {
        Self::from_vec_with_rows(sino.n_rows(), nz, data)
    }

    /// Wraps an existing flat buffer with an explicit row count, checking its length.
    pub fn from_vec_with_rows(n_rows: usize, nz: usize, data: Vec<f32>) -> MbirResult<Self> {
        let expected = n_rows * nz;
        if data.len() != expected {
            return Err(MbirError::InvalidDimensions {
                reason: format!("sinogram buffer has {} elements, expected {expected}", data.len()),
            });
        }
        Ok(Self {
            n_rows,
            nz,
            data: data.into_boxed_slice(),
        })
    }

    /// Rows (`NViews * NChannels`) per slice.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of slices.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Borrows slice `z` as an `n_rows`-long contiguous row.
    pub fn slice(&self, z: usize) -> &[f32] {
        let start = z * self.n_rows;
        &self.data[start..start + self.n_rows]
    }

    /// Mutably borrows slice `z`.
    pub fn slice_mut(&mut self, z: usize) -> &mut [f32] {
        let start = z * self.n_rows;
        &mut self.data[start..start + self.n_rows]
    }

    /// The full flat buffer, slice-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The full flat buffer, slice-major, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

/// Measured projections `y`.
pub type Sinogram = SinoBuffer;
/// Per-measurement statistical weights `w` (e.g. inverse noise variance).
pub type Weights = SinoBuffer;
/// Running residual `e = y - Ax`, maintained incrementally during ICD.
pub type Residual = SinoBuffer;

#[cfg(test)]
mod tests {
    use super::*;

    fn image_geom() -> ImageGeometry {
        ImageGeometry::new(4, 4, 2, 1.0, 2.0).unwrap()
    }

    fn sino_geom() -> SinoGeometry {
        SinoGeometry::new(8, 1.0, 0.0, vec![0.0, 0.5, 1.0]).unwrap()
    }

    #[test]
    fn volume_round_trips_through_get_set() {
        let mut v = Volume::filled(&image_geom(), 0.0);
        v.set(1, 3, 2.5);
        assert_eq!(v.get(1, 3), 2.5);
        assert_eq!(v.slice(0).len(), 16);
    }

    #[test]
    fn volume_from_vec_rejects_wrong_length() {
        let geom = image_geom();
        assert!(Volume::from_vec(&geom, vec![0.0; 5]).is_err());
        assert!(Volume::from_vec(&geom, vec![0.0; geom.nxy() * geom.nz()]).is_ok());
    }

    #[test]
    fn sino_buffer_slices_are_contiguous_and_sized() {
        let buf = SinoBuffer::filled(&sino_geom(), 2, 1.0);
        assert_eq!(buf.slice(0).len(), 24);
        assert_eq!(buf.slice(1).len(), 24);
    }
}
