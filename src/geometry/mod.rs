//! Sinogram and image geometry, and the trapezoidal detector-pixel profile table.
//!
//! The profile table is precomputed once per view and reused by every column the
//! system-matrix builder constructs, the same way a template plan in a matcher is
//! precomputed once and sampled many times.

pub mod profile;

pub use profile::ProfileTable;

use crate::util::{MbirError, MbirResult};

/// Parallel-beam sinogram acquisition geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct SinoGeometry {
    n_channels: usize,
    delta_channel: f32,
    center_offset: f32,
    view_angles: Vec<f32>,
}

impl SinoGeometry {
    /// Builds sinogram geometry, validating all invariants up front.
    pub fn new(
        n_channels: usize,
        delta_channel: f32,
        center_offset: f32,
        view_angles: Vec<f32>,
    ) -> MbirResult<Self> {
        if n_channels == 0 {
            return Err(MbirError::ParameterError {
                context: "SinoGeometry".into(),
                reason: "NChannels must be at least 1".into(),
            });
        }
        if !delta_channel.is_finite() || delta_channel <= 0.0 {
            return Err(MbirError::ParameterError {
                context: "SinoGeometry".into(),
                reason: "DeltaChannel must be a positive finite value".into(),
            });
        }
        if view_angles.is_empty() {
            return Err(MbirError::ParameterError {
                context: "SinoGeometry".into(),
                reason: "NViews must be at least 1".into(),
            });
        }
        if view_angles.iter().any(|a| !a.is_finite()) {
            return Err(MbirError::ParameterError {
                context: "SinoGeometry".into(),
                reason: "ViewAngles must all be finite".into(),
            });
        }
        Ok(Self {
            n_channels,
            delta_channel,
            center_offset,
            view_angles,
        })
    }

    /// Number of detector channels.
    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// Detector channel spacing.
    pub fn delta_channel(&self) -> f32 {
        self.delta_channel
    }

    /// Center-of-rotation offset, in channels.
    pub fn center_offset(&self) -> f32 {
        self.center_offset
    }

    /// Number of view angles.
    pub fn n_views(&self) -> usize {
        self.view_angles.len()
    }

    /// Returns the view angles, in radians.
    pub fn view_angles(&self) -> &[f32] {
        &self.view_angles
    }

    /// Number of (view, channel) rows in the sinogram/residual layout.
    pub fn n_rows(&self) -> usize {
        self.n_views() * self.n_channels
    }

    /// World-space position of detector channel 0.
    pub fn t0(&self) -> f32 {
        -((self.n_channels as f32 - 1.0) * self.delta_channel) / 2.0
            - self.center_offset * self.delta_channel
    }
}

/// Reconstructed-volume geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageGeometry {
    nx: usize,
    ny: usize,
    nz: usize,
    delta_xy: f32,
    roi_radius: f32,
}

impl ImageGeometry {
    /// Builds image geometry, validating all invariants up front.
    pub fn new(nx: usize, ny: usize, nz: usize, delta_xy: f32, roi_radius: f32) -> MbirResult<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(MbirError::ParameterError {
                context: "ImageGeometry".into(),
                reason: "Nx, Ny, Nz must all be at least 1".into(),
            });
        }
        if !delta_xy.is_finite() || delta_xy <= 0.0 {
            return Err(MbirError::ParameterError {
                context: "ImageGeometry".into(),
                reason: "Deltaxy must be a positive finite value".into(),
            });
        }
        if !roi_radius.is_finite() || roi_radius < 0.0 {
            return Err(MbirError::ParameterError {
                context: "ImageGeometry".into(),
                reason: "ROIRadius must be a non-negative finite value".into(),
            });
        }
        nx.checked_mul(ny)
            .and_then(|nxy| nxy.checked_mul(nz))
            .ok_or_else(|| MbirError::InvalidDimensions {
                reason: format!("Nx={nx} Ny={ny} Nz={nz} overflow the addressable index space"),
            })?;
        Ok(Self {
            nx,
            ny,
            nz,
            delta_xy,
            roi_radius,
        })
    }

    /// Number of columns (x-extent) of the volume.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows (y-extent) of the volume.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of slices (z-extent) of the volume.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Pixel spacing, equal in x and y.
    pub fn delta_xy(&self) -> f32 {
        self.delta_xy
    }

    /// Reconstruction ROI radius.
    pub fn roi_radius(&self) -> f32 {
        self.roi_radius
    }

    /// Number of pixels in a single slice (`Nx * Ny`).
    pub fn nxy(&self) -> usize {
        self.nx * self.ny
    }

    /// World-space x coordinate of column 0.
    pub fn x0(&self) -> f32 {
        -((self.nx as f32 - 1.0) * self.delta_xy) / 2.0
    }

    /// World-space y coordinate of row 0.
    pub fn y0(&self) -> f32 {
        -((self.ny as f32 - 1.0) * self.delta_xy) / 2.0
    }

    /// World-space pixel center for in-plane index `c = row * Nx + col`.
    pub fn pixel_center(&self, c: usize) -> (f32, f32) {
        let row = c / self.nx;
        let col = c % self.nx;
        let x = self.x0() + col as f32 * self.delta_xy;
        let y = self.y0() + row as f32 * self.delta_xy;
        (x, y)
    }
}
