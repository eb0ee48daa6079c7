//! Reconstructor: loads a (pre-built) system matrix, sinogram, weights, and
//! reconstruction parameters, runs ICD to convergence, and writes the output
//! volume plus an optional JSON run summary.

use clap::Parser;
use mbir::geometry::ImageGeometry;
use mbir::io::{
    read_image_slice, read_sino_slice, slice_path, write_image_slice, ImageParamsFile,
    ReconParamsFile, SinoParamsFile,
};
use mbir::orchestrator::{mu_to_hu, reconstruct, RunReport};
use mbir::sysmatrix::read_system_matrix;
use mbir::volume::{Sinogram, Volume, Weights};
use mbir_cli::parse_args;
use serde::Serialize;
use std::process::ExitCode;

/// Runs model-based iterative reconstruction against a pre-built system matrix.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Basename of the `.imgparams` file.
    #[arg(short = 'i', value_name = "BASENAME")]
    imgparams: String,
    /// Basename of the `.sinoparams` file.
    #[arg(short = 'j', value_name = "BASENAME")]
    sinoparams: String,
    /// Basename of the `.reconparams` file.
    #[arg(short = 'r', value_name = "BASENAME")]
    reconparams: String,
    /// Basename of the `.2Dsysmatrix` file.
    #[arg(short = 'm', value_name = "BASENAME")]
    sysmatrix: String,
    /// Basename of the per-slice `_sliceNNNN.2Dsinodata` sinogram files.
    #[arg(short = 's', value_name = "BASENAME")]
    sino: String,
    /// Basename of the per-slice weights files (same shape as the sinogram).
    #[arg(short = 'w', value_name = "BASENAME")]
    weights: String,
    /// Basename of the per-slice output image files.
    #[arg(short = 'o', value_name = "BASENAME")]
    output: String,
    /// Optional basename of per-slice initial image files; defaults to a
    /// constant volume at `InitImageValue`.
    #[arg(short = 'f', value_name = "BASENAME")]
    init_image: Option<String>,
    /// Deterministic seed for the per-iteration voxel sweep order.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Convert the output volume to Hounsfield units before writing.
    #[arg(long)]
    hounsfield: bool,
    /// Write a JSON run summary to this path.
    #[arg(long, value_name = "FILE")]
    json_summary: Option<String>,
}

#[derive(Serialize)]
struct RunReportJson {
    iterations_run: u32,
    final_rmse_percent: f64,
    converged: bool,
    numeric_error_count: u64,
}

impl From<RunReport> for RunReportJson {
    fn from(r: RunReport) -> Self {
        Self {
            iterations_run: r.iterations_run,
            final_rmse_percent: r.final_rmse_percent,
            converged: r.converged,
            numeric_error_count: r.numeric_error_count,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli: Cli = parse_args();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> mbir::MbirResult<()> {
    let image: ImageGeometry = ImageParamsFile::read(format!("{}.imgparams", cli.imgparams))?;
    let params = ReconParamsFile::read(format!("{}.reconparams", cli.reconparams))?;
    let matrix = read_system_matrix(format!("{}.2Dsysmatrix", cli.sysmatrix))?;
    let n_rows = SinoParamsFile::read_row_count(format!("{}.sinoparams", cli.sinoparams))?;

    let mut sino_data = Vec::with_capacity(n_rows * image.nz());
    let mut weights_data = Vec::with_capacity(n_rows * image.nz());
    for z in 0..image.nz() {
        sino_data.extend(read_sino_slice(slice_path(&cli.sino, z, "2Dsinodata"), n_rows)?);
        weights_data.extend(read_sino_slice(slice_path(&cli.weights, z, "wght"), n_rows)?);
    }
    let sino = Sinogram::from_vec_with_rows(n_rows, image.nz(), sino_data)?;
    let weights = Weights::from_vec_with_rows(n_rows, image.nz(), weights_data)?;

    let mut volume = match &cli.init_image {
        Some(basename) => {
            let mut data = Vec::with_capacity(image.nxy() * image.nz());
            for z in 0..image.nz() {
                data.extend(read_image_slice(slice_path(basename, z, "2dimgdata"), image.nxy())?);
            }
            Volume::from_vec(&image, data)?
        }
        None => Volume::filled(&image, params.init_image_value),
    };

    let report = reconstruct(&matrix, &sino, &weights, &mut volume, &image, params, cli.seed)?;

    for z in 0..image.nz() {
        let mut slice_out = volume.slice(z).to_vec();
        if cli.hounsfield {
            for v in slice_out.iter_mut() {
                *v = mu_to_hu(*v);
            }
        }
        write_image_slice(slice_path(&cli.output, z, "2dimgdata"), &slice_out)?;
    }

    if report.numeric_error_count > 0 {
        eprintln!(
            "warning: {} voxel(s) skipped with a degenerate quadratic surrogate",
            report.numeric_error_count
        );
    }
    if !report.converged {
        eprintln!(
            "warning: MaxIterations reached after {} iterations without meeting StopThreshold (final change {:.4}%)",
            report.iterations_run, report.final_rmse_percent
        );
    }

    if let Some(path) = cli.json_summary {
        let json = serde_json::to_string_pretty(&RunReportJson::from(report))
            .expect("RunReportJson serializes without error");
        std::fs::write(&path, json).map_err(|e| mbir::MbirError::io(path, e))?;
    }

    Ok(())
}
