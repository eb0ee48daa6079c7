use mbir::io::{
    read_image_slice, read_sino_slice, read_view_angles, slice_path, write_image_slice,
    write_sino_slice, write_view_angles, ImageParamsFile, ReconParamsFile, SinoParamsFile,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mbir-test-{name}-{}", std::process::id()))
}

fn write_text(path: &PathBuf, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

#[test]
fn sinoparams_and_view_angles_combine_into_a_geometry() {
    let params_path = temp_path("sinoparams.txt");
    let angles_path = temp_path("angles.bin");
    write_text(
        &params_path,
        "NChannels = 16\nDeltaChannel = 1.0\nCenterOffset = 0.0\nNViews = 4\n",
    );
    let angles = vec![0.0f32, 0.3, 0.9, 1.5];
    write_view_angles(&angles_path, &angles).unwrap();

    let loaded_angles = read_view_angles(&angles_path, 4).unwrap();
    let geom = SinoParamsFile::read(&params_path, loaded_angles).unwrap();

    std::fs::remove_file(&params_path).ok();
    std::fs::remove_file(&angles_path).ok();

    assert_eq!(geom.n_channels(), 16);
    assert_eq!(geom.view_angles(), angles.as_slice());
}

#[test]
fn sinoparams_mismatched_view_angle_count_is_rejected() {
    let params_path = temp_path("sinoparams-mismatch.txt");
    write_text(
        &params_path,
        "NChannels = 16\nDeltaChannel = 1.0\nCenterOffset = 0.0\nNViews = 4\n",
    );
    let result = SinoParamsFile::read(&params_path, vec![0.0, 0.1, 0.2]);
    std::fs::remove_file(&params_path).ok();
    assert!(result.is_err());
}

#[test]
fn read_row_count_matches_channels_times_views() {
    let params_path = temp_path("sinoparams-rowcount.txt");
    write_text(
        &params_path,
        "NChannels = 20\nDeltaChannel = 1.0\nCenterOffset = 0.0\nNViews = 7\n",
    );
    let rows = SinoParamsFile::read_row_count(&params_path).unwrap();
    std::fs::remove_file(&params_path).ok();
    assert_eq!(rows, 140);
}

#[test]
fn full_parameter_trio_builds_consistent_geometries() {
    let img_path = temp_path("imgparams-full.txt");
    let recon_path = temp_path("reconparams-full.txt");
    write_text(
        &img_path,
        "Nx = 16\nNy = 16\nNz = 3\nDeltaxy = 1.0\nROIRadius = 8.0\n",
    );
    write_text(
        &recon_path,
        "p = 1.2\nq = 2.0\nT = 1.0\nSigmaX = 0.02\nb_nearest = 1.0\nb_diag = 0.7071\nb_interslice = 1.0\nPositivity = 0\nStopThreshold = 0.5\nMaxIterations = 10\nInitImageValue = 0.0\n",
    );

    let image = ImageParamsFile::read(&img_path).unwrap();
    let recon = ReconParamsFile::read(&recon_path).unwrap();

    std::fs::remove_file(&img_path).ok();
    std::fs::remove_file(&recon_path).ok();

    assert_eq!(image.nxy(), 256);
    assert_eq!(image.nz(), 3);
    assert!(!recon.positivity);
    assert_eq!(recon.max_iterations, 10);
}

#[test]
fn sino_and_image_slice_round_trip_through_zero_padded_paths() {
    let basename = temp_path("phantom").display().to_string();
    let sino_path = slice_path(&basename, 3, "2Dsinodata");
    let image_path = slice_path(&basename, 3, "2dimgdata");
    assert!(sino_path.ends_with("_slice0003.2Dsinodata"));

    let row = vec![1.0f32, 2.0, 3.0, 4.0];
    write_sino_slice(&sino_path, &row).unwrap();
    let loaded_row = read_sino_slice(&sino_path, row.len()).unwrap();
    std::fs::remove_file(&sino_path).ok();
    assert_eq!(loaded_row, row);

    let image = vec![0.1f32, 0.2, 0.3];
    write_image_slice(&image_path, &image).unwrap();
    let loaded_image = read_image_slice(&image_path, image.len()).unwrap();
    std::fs::remove_file(&image_path).ok();
    assert_eq!(loaded_image, image);
}
