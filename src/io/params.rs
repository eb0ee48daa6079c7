//! `key = value` parameter file parsing for sino, image, and reconstruction params.

use crate::geometry::{ImageGeometry, SinoGeometry};
use crate::icd::ReconParams;
use crate::prior::QggmrfParams;
use crate::util::{MbirError, MbirResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn parse_kv(path: &Path) -> MbirResult<HashMap<String, String>> {
    let text = fs::read_to_string(path).map_err(|e| MbirError::io(path.display().to_string(), e))?;
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(MbirError::ParameterError {
                context: path.display().to_string(),
                reason: format!("malformed line (expected `key = value`): {line:?}"),
            });
        };
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(map)
}

fn required<'a>(map: &'a HashMap<String, String>, path: &Path, key: &str) -> MbirResult<&'a str> {
    map.get(key).map(String::as_str).ok_or_else(|| MbirError::ParameterError {
        context: path.display().to_string(),
        reason: format!("missing required key `{key}`"),
    })
}

fn parse_value<T: std::str::FromStr>(path: &Path, key: &str, raw: &str) -> MbirResult<T> {
    raw.parse().map_err(|_| MbirError::ParameterError {
        context: path.display().to_string(),
        reason: format!("key `{key}` has value `{raw}` that cannot be parsed"),
    })
}

/// Parsed `.sinoparams` file: sinogram acquisition geometry minus `ViewAngles`,
/// which is supplied by a companion `.ViewAngles` binary file.
pub struct SinoParamsFile;

impl SinoParamsFile {
    /// Reads NChannels, DeltaChannel, CenterOffset, NViews and, given `view_angles`
    /// already loaded from the companion binary file, builds a [`SinoGeometry`].
    pub fn read(path: impl AsRef<Path>, view_angles: Vec<f32>) -> MbirResult<SinoGeometry> {
        let path = path.as_ref();
        let map = parse_kv(path)?;
        let n_channels: usize = parse_value(path, "NChannels", required(&map, path, "NChannels")?)?;
        let delta_channel: f32 = parse_value(path, "DeltaChannel", required(&map, path, "DeltaChannel")?)?;
        let center_offset: f32 = parse_value(path, "CenterOffset", required(&map, path, "CenterOffset")?)?;
        let n_views: usize = parse_value(path, "NViews", required(&map, path, "NViews")?)?;
        if view_angles.len() != n_views {
            return Err(MbirError::ParameterError {
                context: path.display().to_string(),
                reason: format!(
                    "NViews={n_views} but the ViewAngles file supplied {} angles",
                    view_angles.len()
                ),
            });
        }
        SinoGeometry::new(n_channels, delta_channel, center_offset, view_angles)
    }

    /// Reads just `NChannels` and `NViews` and returns their product, the
    /// number of sinogram rows per slice. Useful for sizing sinogram/weights
    /// buffers without needing the companion `.ViewAngles` file.
    pub fn read_row_count(path: impl AsRef<Path>) -> MbirResult<usize> {
        let path = path.as_ref();
        let map = parse_kv(path)?;
        let n_channels: usize = parse_value(path, "NChannels", required(&map, path, "NChannels")?)?;
        let n_views: usize = parse_value(path, "NViews", required(&map, path, "NViews")?)?;
        Ok(n_channels * n_views)
    }

    /// Reads just `NViews`, needed to size the companion `.ViewAngles` file
    /// before the rest of the sinogram geometry can be assembled.
    pub fn read_n_views(path: impl AsRef<Path>) -> MbirResult<usize> {
        let path = path.as_ref();
        let map = parse_kv(path)?;
        parse_value(path, "NViews", required(&map, path, "NViews")?)
    }
}

/// Parsed `.imgparams` file.
pub struct ImageParamsFile;

impl ImageParamsFile {
    /// Reads Nx, Ny, Nz, Deltaxy, ROIRadius and builds an [`ImageGeometry`].
    pub fn read(path: impl AsRef<Path>) -> MbirResult<ImageGeometry> {
        let path = path.as_ref();
        let map = parse_kv(path)?;
        let nx: usize = parse_value(path, "Nx", required(&map, path, "Nx")?)?;
        let ny: usize = parse_value(path, "Ny", required(&map, path, "Ny")?)?;
        let nz: usize = parse_value(path, "Nz", required(&map, path, "Nz")?)?;
        let delta_xy: f32 = parse_value(path, "Deltaxy", required(&map, path, "Deltaxy")?)?;
        let roi_radius: f32 = parse_value(path, "ROIRadius", required(&map, path, "ROIRadius")?)?;
        ImageGeometry::new(nx, ny, nz, delta_xy, roi_radius)
    }
}

/// Parsed `.reconparams` file.
pub struct ReconParamsFile;

impl ReconParamsFile {
    /// Reads p, q, T, SigmaX, b_nearest, b_diag, b_interslice, Positivity,
    /// StopThreshold, MaxIterations, InitImageValue and builds [`ReconParams`].
    pub fn read(path: impl AsRef<Path>) -> MbirResult<ReconParams> {
        let path = path.as_ref();
        let map = parse_kv(path)?;
        let p: f32 = parse_value(path, "p", required(&map, path, "p")?)?;
        let q: f32 = parse_value(path, "q", required(&map, path, "q")?)?;
        let t: f32 = parse_value(path, "T", required(&map, path, "T")?)?;
        let sigma_x: f32 = parse_value(path, "SigmaX", required(&map, path, "SigmaX")?)?;
        let b_nearest: f32 = parse_value(path, "b_nearest", required(&map, path, "b_nearest")?)?;
        let b_diag: f32 = parse_value(path, "b_diag", required(&map, path, "b_diag")?)?;
        let b_interslice: f32 = parse_value(path, "b_interslice", required(&map, path, "b_interslice")?)?;
        let positivity_raw: i32 = parse_value(path, "Positivity", required(&map, path, "Positivity")?)?;
        let stop_threshold: f32 = parse_value(path, "StopThreshold", required(&map, path, "StopThreshold")?)?;
        let max_iterations: u32 = parse_value(path, "MaxIterations", required(&map, path, "MaxIterations")?)?;
        let init_image_value: f32 = parse_value(path, "InitImageValue", required(&map, path, "InitImageValue")?)?;

        let prior = QggmrfParams::new(p, q, t, sigma_x)?;
        let params = ReconParams {
            prior,
            b_nearest,
            b_diag,
            b_interslice,
            positivity: positivity_raw != 0,
            stop_threshold,
            max_iterations,
            init_image_value,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.txt", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_image_params_file() {
        let path = write_temp(
            "imgparams",
            "Nx = 8\nNy = 8\nNz = 2\nDeltaxy = 1.0\nROIRadius = 4.0\n",
        );
        let geom = ImageParamsFile::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(geom.nx(), 8);
        assert_eq!(geom.nz(), 2);
    }

    #[test]
    fn missing_key_is_a_parameter_error() {
        let path = write_temp("imgparams-bad", "Nx = 8\nNy = 8\n");
        let err = ImageParamsFile::read(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, MbirError::ParameterError { .. }));
    }

    #[test]
    fn parses_recon_params_file() {
        let path = write_temp(
            "reconparams",
            "p = 1.2\nq = 2.0\nT = 1.0\nSigmaX = 0.01\nb_nearest = 1.0\nb_diag = 0.707\nb_interslice = 1.0\nPositivity = 1\nStopThreshold = 0.01\nMaxIterations = 20\nInitImageValue = 0.0\n",
        );
        let params = ReconParamsFile::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(params.positivity);
        assert_eq!(params.max_iterations, 20);
    }
}
