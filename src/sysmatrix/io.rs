//! Binary `.2Dsysmatrix` file I/O.
//!
//! Format: `Ncolumns` (`u32`), then per column: `Nnonzero` (`u32`), `Nnonzero`
//! row indices (`u32`), `Nnonzero` values (`f32`) — all little-endian.

use super::{SparseColumn, SystemMatrix};
use crate::util::{MbirError, MbirResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reads a system matrix from `path`.
pub fn read_system_matrix(path: impl AsRef<Path>) -> MbirResult<SystemMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut reader = BufReader::new(file);

    let n_columns = read_u32(&mut reader, path)? as usize;
    let mut columns = Vec::with_capacity(n_columns);
    for _ in 0..n_columns {
        let nnz = read_u32(&mut reader, path)? as usize;
        let mut row_indices = vec![0u32; nnz];
        let mut values = vec![0f32; nnz];
        read_u32_slice(&mut reader, path, &mut row_indices)?;
        read_f32_slice(&mut reader, path, &mut values)?;
        columns.push(SparseColumn {
            values: values.into_boxed_slice(),
            row_indices: row_indices.into_boxed_slice(),
        });
    }
    Ok(SystemMatrix { columns })
}

/// Writes `matrix` to `path`.
pub fn write_system_matrix(matrix: &SystemMatrix, path: impl AsRef<Path>) -> MbirResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut writer = BufWriter::new(file);

    write_u32(&mut writer, path, matrix.n_columns() as u32)?;
    for column in &matrix.columns {
        write_u32(&mut writer, path, column.nnz() as u32)?;
        for &idx in column.row_indices() {
            write_u32(&mut writer, path, idx)?;
        }
        for &val in column.values() {
            write_f32(&mut writer, path, val)?;
        }
    }
    writer.flush().map_err(|e| MbirError::io(path.display().to_string(), e))
}

fn read_u32(reader: &mut impl Read, path: &Path) -> MbirResult<u32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| MbirError::io(path.display().to_string(), e))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u32_slice(reader: &mut impl Read, path: &Path, out: &mut [u32]) -> MbirResult<()> {
    for slot in out.iter_mut() {
        *slot = read_u32(reader, path)?;
    }
    Ok(())
}

fn read_f32_slice(reader: &mut impl Read, path: &Path, out: &mut [f32]) -> MbirResult<()> {
    let mut buf = [0u8; 4];
    for slot in out.iter_mut() {
        reader
            .read_exact(&mut buf)
            .map_err(|e| MbirError::io(path.display().to_string(), e))?;
        *slot = f32::from_le_bytes(buf);
    }
    Ok(())
}

fn write_u32(writer: &mut impl Write, path: &Path, value: u32) -> MbirResult<()> {
    writer
        .write_all(&value.to_le_bytes())
        .map_err(|e| MbirError::io(path.display().to_string(), e))
}

fn write_f32(writer: &mut impl Write, path: &Path, value: f32) -> MbirResult<()> {
    writer
        .write_all(&value.to_le_bytes())
        .map_err(|e| MbirError::io(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysmatrix::{BeamModel, BuilderContext};
    use crate::geometry::{ImageGeometry, SinoGeometry};

    #[test]
    fn round_trips_through_a_temp_file() {
        let sino = SinoGeometry::new(8, 1.0, 0.0, vec![0.0, 0.4, 0.9]).unwrap();
        let image = ImageGeometry::new(4, 4, 1, 1.0, 2.0).unwrap();
        let ctx = BuilderContext::new(&sino, &image, BeamModel::Narrow);
        let matrix = SystemMatrix::build(&ctx, image.nxy()).unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join(format!("mbir-test-{}.2dsysmatrix", std::process::id()));
        write_system_matrix(&matrix, &path).unwrap();
        let loaded = read_system_matrix(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.n_columns(), matrix.n_columns());
        for c in 0..matrix.n_columns() {
            assert_eq!(loaded.column(c).values(), matrix.column(c).values());
            assert_eq!(loaded.column(c).row_indices(), matrix.column(c).row_indices());
        }
    }
}
