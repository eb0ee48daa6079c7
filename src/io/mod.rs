//! Plain-text parameter files and binary sinogram/weights/image/view-angle files.

mod params;

pub use params::{ImageParamsFile, ReconParamsFile, SinoParamsFile};

use crate::util::{MbirError, MbirResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reads `NViews` little-endian `f32` view angles (radians) from `path`.
pub fn read_view_angles(path: impl AsRef<Path>, n_views: usize) -> MbirResult<Vec<f32>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut reader = BufReader::new(file);
    read_f32_vec(&mut reader, path, n_views)
}

/// Writes view angles (radians) as little-endian `f32` to `path`.
pub fn write_view_angles(path: impl AsRef<Path>, angles: &[f32]) -> MbirResult<()> {
    write_f32_vec(path, angles)
}

/// Reads one slice's sinogram/weights row (`NViews * NChannels` floats) from
/// `<basename>_slice<NNNN>.2Dsinodata`-style path.
pub fn read_sino_slice(path: impl AsRef<Path>, n_rows: usize) -> MbirResult<Vec<f32>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut reader = BufReader::new(file);
    read_f32_vec(&mut reader, path, n_rows)
}

/// Writes one slice's sinogram/weights row.
pub fn write_sino_slice(path: impl AsRef<Path>, row: &[f32]) -> MbirResult<()> {
    write_f32_vec(path, row)
}

/// Reads one slice's image data (`Nx * Ny` floats).
pub fn read_image_slice(path: impl AsRef<Path>, nxy: usize) -> MbirResult<Vec<f32>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut reader = BufReader::new(file);
    read_f32_vec(&mut reader, path, nxy)
}

/// Writes one slice's image data.
pub fn write_image_slice(path: impl AsRef<Path>, slice: &[f32]) -> MbirResult<()> {
    write_f32_vec(path, slice)
}

/// Builds the zero-padded per-slice filename `<basename>_slice<NNNN>.<ext>`.
pub fn slice_path(basename: &str, slice: usize, ext: &str) -> String {
    format!("{basename}_slice{slice:04}.{ext}")
}

fn read_f32_vec(reader: &mut impl Read, path: &Path, n: usize) -> MbirResult<Vec<f32>> {
    let mut out = vec![0f32; n];
    let mut buf = [0u8; 4];
    for slot in out.iter_mut() {
        reader
            .read_exact(&mut buf)
            .map_err(|e| MbirError::io(path.display().to_string(), e))?;
        *slot = f32::from_le_bytes(buf);
    }
    Ok(out)
}

fn write_f32_vec(path: impl AsRef<Path>, values: &[f32]) -> MbirResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut writer = BufWriter::new(file);
    for &v in values {
        writer
            .write_all(&v.to_le_bytes())
            .map_err(|e| MbirError::io(path.display().to_string(), e))?;
    }
    writer.flush().map_err(|e| MbirError::io(path.display().to_string(), e))
}
