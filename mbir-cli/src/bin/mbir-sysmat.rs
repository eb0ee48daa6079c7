//! System-matrix generator: reads image/sinogram parameters and view angles,
//! builds the sparse forward-projection matrix, and writes it to disk.

use clap::Parser;
use mbir::geometry::ImageGeometry;
use mbir::io::{read_view_angles, ImageParamsFile, SinoParamsFile};
use mbir::orchestrator::build_system_matrix;
use mbir::sysmatrix::{write_system_matrix, BeamModel};
use mbir_cli::parse_args;
use std::process::ExitCode;

/// Builds a 3-D parallel-beam system matrix from image and sinogram parameters.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Basename of the `.imgparams` file (extension omitted).
    #[arg(short = 'i', value_name = "BASENAME")]
    imgparams: String,
    /// Basename of the `.sinoparams` / `.ViewAngles` files (extension omitted).
    #[arg(short = 'j', value_name = "BASENAME")]
    sinoparams: String,
    /// Basename of the output `.2Dsysmatrix` file (extension omitted).
    #[arg(short = 'm', value_name = "BASENAME")]
    sysmatrix: String,
    /// Use the wide-beam detector model with the given number of sub-elements
    /// per aperture, instead of the default narrow-beam (center-of-aperture) model.
    #[arg(long, value_name = "LEN_DET")]
    wide_beam: Option<usize>,
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

    let sinoparams_path = format!("{}.sinoparams", cli.sinoparams);
    let view_angles_path = format!("{}.ViewAngles", cli.sinoparams);
    let n_views = SinoParamsFile::read_n_views(&sinoparams_path)?;
    let view_angles = read_view_angles(&view_angles_path, n_views)?;
    let sino = SinoParamsFile::read(&sinoparams_path, view_angles)?;

    let beam = match cli.wide_beam {
        Some(len_det) => BeamModel::Wide { len_det },
        None => BeamModel::Narrow,
    };

    let matrix = build_system_matrix(&sino, &image, beam).map_err(|e| {
        e.with_source_context(format!("{}.imgparams / {}.sinoparams", cli.imgparams, cli.sinoparams))
    })?;
    write_system_matrix(&matrix, format!("{}.2Dsysmatrix", cli.sysmatrix))?;

    println!(
        "wrote {}.2Dsysmatrix ({} columns)",
        cli.sysmatrix,
        matrix.n_columns()
    );
    Ok(())
}
