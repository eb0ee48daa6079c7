use mbir::geometry::profile::{ProfileTable, LEN_PIX};
use mbir::geometry::SinoGeometry;
use std::f32::consts::FRAC_PI_2;

#[test]
fn trapezoid_normalizes_to_pixel_footprint_length() {
    let delta_xy = 1.0f32;
    let angles = vec![0.0f32, 0.2, 0.6, 1.0, 1.4];
    let sino = SinoGeometry::new(8, 1.0, 0.0, angles.clone()).unwrap();
    let table = ProfileTable::build(&sino, delta_xy);

    for (view, &angle) in angles.iter().enumerate() {
        let mut folded = angle;
        while folded >= FRAC_PI_2 {
            folded -= FRAC_PI_2;
        }
        while folded < 0.0 {
            folded += FRAC_PI_2;
        }
        let expected_footprint = if folded <= std::f32::consts::FRAC_PI_4 {
            delta_xy / folded.cos()
        } else {
            delta_xy / (FRAC_PI_2 - folded).cos()
        };

        let sum: f32 = table.row(view).iter().sum();
        let integral = sum * (2.0 * delta_xy / LEN_PIX as f32);
        let rel_err = (integral - expected_footprint).abs() / expected_footprint;
        assert!(
            rel_err < 0.01,
            "view {view}: integral {integral} vs expected {expected_footprint} (rel err {rel_err})"
        );
    }
}

#[test]
fn profile_table_has_n_views_rows() {
    let sino = SinoGeometry::new(16, 0.5, 0.0, vec![0.0, 0.3, 0.9]).unwrap();
    let table = ProfileTable::build(&sino, 1.0);
    assert_eq!(table.n_views(), 3);
}

#[test]
fn sino_geometry_rejects_zero_channels() {
    assert!(SinoGeometry::new(0, 1.0, 0.0, vec![0.0]).is_err());
}
