//! End-to-end beam size measurements on synthetic frames.

use approx::assert_abs_diff_eq;
use beamsize::image_proc::io::{array2_to_gray16_image, array2_to_gray_image};
use beamsize::image_proc::test_patterns::{generate_gaussian_beam, quantize, sigma_to_fwhm};
use beamsize::{
    analyze, analyze_all, AnalysisParams, BeamError, Centroid, DatasetParams, DeadPixelRegion,
    ImageSource,
};
use ndarray::Array2;

fn full_sensor_beam(sigma_x: f64, sigma_y: f64) -> Array2<f64> {
    generate_gaussian_beam(2000, 2000, (1212.0, 1012.0), (sigma_x, sigma_y), 1000.0, 0.0)
}

#[test]
fn test_full_sensor_frame_with_default_region() {
    let frame = full_sensor_beam(8.0, 5.0);
    let result = analyze(
        &frame.view(),
        &AnalysisParams::projection(100, 100),
        &DeadPixelRegion::default(),
    )
    .unwrap();

    // The default region is clipped to cols 212..2000 and rows 24..2000
    assert_eq!(result.coarse_centroid, Centroid { x: 1000, y: 988 });
    assert_eq!(result.refined_centroid, Centroid { x: 100, y: 100 });
    assert_eq!(result.cropped.dim(), (200, 200));
    assert_abs_diff_eq!(result.widths.x_fwhm, sigma_to_fwhm(8.0), epsilon = 0.3);
    assert_abs_diff_eq!(result.widths.y_fwhm, sigma_to_fwhm(5.0), epsilon = 0.3);
}

#[test]
fn test_identical_frames_give_identical_scaled_widths() {
    let frame = full_sensor_beam(6.0, 6.0);
    let single = analyze(
        &frame.view(),
        &AnalysisParams::projection(100, 100),
        &DeadPixelRegion::default(),
    )
    .unwrap();

    let sources: Vec<ImageSource> = (0..4).map(|_| frame.clone().into()).collect();
    let params = DatasetParams {
        analysis: AnalysisParams::projection(100, 100),
        pixel_size: 3.45,
        ..DatasetParams::default()
    };
    let (xs, ys) = analyze_all(sources, &params).unwrap().into_widths().unwrap();

    assert_eq!(xs.len(), 4);
    for (x, y) in xs.iter().zip(&ys) {
        assert_abs_diff_eq!(*x, single.widths.x_fwhm * 3.45, epsilon = 1e-9);
        assert_abs_diff_eq!(*y, single.widths.y_fwhm * 3.45, epsilon = 1e-9);
    }
}

#[test]
fn test_png_dataset_with_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let beam = generate_gaussian_beam(300, 240, (140.0, 110.0), (5.0, 7.0), 40000.0, 0.0);

    let deep = dir.path().join("deep.png");
    array2_to_gray16_image(&quantize::<u16>(&beam))
        .save(&deep)
        .unwrap();

    let shallow = dir.path().join("shallow.png");
    array2_to_gray_image(&quantize::<u8>(&(&beam * (250.0 / 40000.0))))
        .save(&shallow)
        .unwrap();

    let missing = dir.path().join("missing.png");

    let params = DatasetParams {
        analysis: AnalysisParams::projection(50, 50),
        pixel_size: 1.0,
        dead_pixel_region: DeadPixelRegion::full_frame((240, 300)),
        parallel: true,
    };
    let report = analyze_all(
        vec![deep.into(), missing.into(), shallow.into()],
        &params,
    )
    .unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.failure_count(), 1);
    assert!(matches!(
        report.outcomes[1].result,
        Err(BeamError::Decode { .. })
    ));

    let xs = report.x_fwhms();
    let ys = report.y_fwhms();
    for i in [0, 2] {
        assert_abs_diff_eq!(xs[i].unwrap(), sigma_to_fwhm(5.0), epsilon = 0.4);
        assert_abs_diff_eq!(ys[i].unwrap(), sigma_to_fwhm(7.0), epsilon = 0.4);
    }
}
