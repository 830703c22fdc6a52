//! Measure beam FWHM along x and y for a set of camera frames.
//!
//! Widths are reported in physical units (pixel size × pixels). Settings come
//! from an optional JSON config file; command-line flags override it.

use anyhow::{bail, Context, Result};
use beamsize::config::BeamConfig;
use beamsize::image_proc::io::{load_luminance, ImageSource};
use beamsize::image_proc::test_patterns::{generate_gaussian_beam, sigma_to_fwhm};
use beamsize::pipeline::dataset::{analyze_all_with_background, DatasetParams, DatasetReport};
use beamsize::pipeline::single::{analyze, ProfileMode, SingleImageAnalysis};
use beamsize::DeadPixelRegion;
use clap::{Parser, ValueEnum};
use ndarray::Array2;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Parse a dead-pixel box in format "center_x,center_y,x_margin,y_margin"
fn parse_region(s: &str) -> Result<DeadPixelRegion, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err("Region must be in format 'center_x,center_y,x_margin,y_margin'".to_string());
    }

    let values = parts
        .iter()
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid region value: {e}"))?;

    Ok(DeadPixelRegion::new(values[0], values[1], values[2], values[3]))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Sum the region of interest along each axis
    Projection,
    /// Sum a narrow band of rows/columns through the beam
    Lineout,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate beam FWHM from camera frames")]
struct Args {
    /// Image files to analyze
    #[arg(required_unless_present = "self_check")]
    images: Vec<PathBuf>,

    /// Measure a synthetic Gaussian frame with the active settings instead of files
    #[arg(long, default_value_t = false)]
    self_check: bool,

    /// JSON configuration file (see --save-config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Half-width of the region of interest, in pixels
    #[arg(long)]
    x_margin: Option<usize>,

    /// Half-height of the region of interest, in pixels
    #[arg(long)]
    y_margin: Option<usize>,

    /// Profile extraction mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Lineout half-band (lines summed on each side, default 0)
    #[arg(long)]
    band: Option<usize>,

    /// Column of the y lineout inside the region of interest (default: beam center)
    #[arg(long)]
    xpixel: Option<usize>,

    /// Row of the x lineout inside the region of interest (default: beam center)
    #[arg(long)]
    ypixel: Option<usize>,

    /// Prominence window ratio around the profile maximum
    #[arg(long)]
    prominence_ratio: Option<f64>,

    /// Physical pixel size (e.g. micrometers)
    #[arg(long)]
    pixel_size: Option<f64>,

    /// Sensor region to keep: "center_x,center_y,x_margin,y_margin"
    #[arg(long, value_parser = parse_region)]
    dead_pixel_region: Option<DeadPixelRegion>,

    /// Background frame subtracted from every image
    #[arg(long)]
    background: Option<PathBuf>,

    /// Analyze frames one at a time instead of in parallel
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Fail if any frame cannot be analyzed
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write the effective configuration to this path
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportRow {
    index: usize,
    image: String,
    x_fwhm: Option<f64>,
    y_fwhm: Option<f64>,
    error: Option<String>,
}

fn effective_config(args: &Args) -> Result<BeamConfig> {
    let mut config = match &args.config {
        Some(path) => BeamConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BeamConfig::default(),
    };

    if let Some(x_margin) = args.x_margin {
        config.analysis.x_margin = x_margin;
    }
    if let Some(y_margin) = args.y_margin {
        config.analysis.y_margin = y_margin;
    }
    if let Some(ratio) = args.prominence_ratio {
        config.analysis.prominence_ratio = ratio;
    }
    if let Some(pixel_size) = args.pixel_size {
        config.pixel_size = pixel_size;
    }
    if let Some(region) = args.dead_pixel_region {
        config.dead_pixel_region = region;
    }
    match args.mode {
        Some(Mode::Projection) => config.analysis.mode = ProfileMode::Projection,
        Some(Mode::Lineout) if config.analysis.mode == ProfileMode::Projection => {
            config.analysis.mode = ProfileMode::Lineout {
                xpixel: None,
                ypixel: None,
                band: 0,
            }
        }
        _ => {}
    }

    // Lineout flags refine whichever lineout mode is active, from --mode or the config
    match &mut config.analysis.mode {
        ProfileMode::Lineout {
            xpixel,
            ypixel,
            band,
        } => {
            if args.xpixel.is_some() {
                *xpixel = args.xpixel;
            }
            if args.ypixel.is_some() {
                *ypixel = args.ypixel;
            }
            if let Some(b) = args.band {
                *band = b;
            }
        }
        ProfileMode::Projection => {
            if args.xpixel.is_some() || args.ypixel.is_some() || args.band.is_some() {
                bail!("--xpixel, --ypixel and --band need lineout mode (--mode lineout)");
            }
        }
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn report_rows(report: &DatasetReport) -> Vec<ReportRow> {
    report
        .outcomes
        .iter()
        .map(|o| ReportRow {
            index: o.index,
            image: o.label.clone(),
            x_fwhm: o.result.as_ref().ok().map(|w| w.x_fwhm),
            y_fwhm: o.result.as_ref().ok().map(|w| w.y_fwhm),
            error: o.result.as_ref().err().map(|e| e.to_string()),
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

const SELF_CHECK_SIGMA: (f64, f64) = (8.0, 5.0);

/// Gaussian frame just large enough to hold the whole dead-pixel region, with
/// the beam at the region center.
fn synthetic_frame(region: &DeadPixelRegion) -> Array2<f64> {
    let width = (region.center_x + region.x_margin).max(1);
    let height = (region.center_y + region.y_margin).max(1);
    generate_gaussian_beam(
        width,
        height,
        (region.center_x as f64, region.center_y as f64),
        SELF_CHECK_SIGMA,
        1000.0,
        0.0,
    )
}

fn run_self_check(config: &BeamConfig) -> Result<SingleImageAnalysis> {
    let region = config.dead_pixel_region;
    let frame = synthetic_frame(&region);
    analyze(&frame.view(), &config.analysis, &region).context("Self-check analysis failed")
}

fn self_check(config: &BeamConfig) -> Result<()> {
    let (sigma_x, sigma_y) = SELF_CHECK_SIGMA;
    let result = run_self_check(config)?;
    info!(
        "Centroid {} in sensor crop, {} in region of interest",
        result.coarse_centroid, result.refined_centroid
    );
    println!(
        "x FWHM: {:.3} px (expected {:.3})",
        result.widths.x_fwhm,
        sigma_to_fwhm(sigma_x)
    );
    println!(
        "y FWHM: {:.3} px (expected {:.3})",
        result.widths.y_fwhm,
        sigma_to_fwhm(sigma_y)
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = effective_config(&args)?;

    if let Some(path) = &args.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        info!("Saved configuration to {}", path.display());
    }

    if args.self_check {
        return self_check(&config);
    }

    let background = match &args.background {
        Some(path) => Some(
            load_luminance(path)
                .with_context(|| format!("Failed to load background {}", path.display()))?,
        ),
        None => None,
    };

    let mut params = DatasetParams::from_config(&config);
    params.parallel = !args.sequential;

    let sources: Vec<ImageSource> = args.images.iter().cloned().map(ImageSource::from).collect();
    let background_view = background.as_ref().map(|bg| bg.view());
    let report = analyze_all_with_background(sources, &params, background_view.as_ref())
        .context("Dataset analysis failed")?;

    let rows = report_rows(&report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>5}  {:>12}  {:>12}  image", "#", "x FWHM", "y FWHM");
        for row in &rows {
            match (row.x_fwhm, row.y_fwhm, &row.error) {
                (Some(x), Some(y), _) => {
                    println!("{:>5}  {:>12.3}  {:>12.3}  {}", row.index, x, y, row.image)
                }
                (_, _, Some(err)) => {
                    println!("{:>5}  {:>12}  {:>12}  {} ({err})", row.index, "-", "-", row.image)
                }
                _ => {}
            }
        }
    }

    let xs: Vec<f64> = report.x_fwhms().into_iter().flatten().collect();
    let ys: Vec<f64> = report.y_fwhms().into_iter().flatten().collect();
    if let (Some(mx), Some(my)) = (mean(&xs), mean(&ys)) {
        info!(
            "Mean FWHM over {} frames: x={mx:.3}, y={my:.3} (pixel size {})",
            xs.len(),
            config.pixel_size
        );
    }

    if args.strict {
        report.into_widths().context("At least one frame failed")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["beam_fwhm", "frame.png"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn lineout_config_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("lineout.json");
        std::fs::write(
            &path,
            r#"{ "analysis": { "mode": { "kind": "lineout", "xpixel": null, "ypixel": 9, "band": 0 } } }"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_lineout_flags_apply_with_explicit_mode() {
        let args = parse(&["--mode", "lineout", "--xpixel", "5", "--ypixel", "7", "--band", "2"]);
        let config = effective_config(&args).unwrap();
        assert_eq!(
            config.analysis.mode,
            ProfileMode::Lineout {
                xpixel: Some(5),
                ypixel: Some(7),
                band: 2
            }
        );
    }

    #[test]
    fn test_lineout_flags_without_lineout_mode_are_rejected() {
        let args = parse(&["--xpixel", "5", "--ypixel", "7", "--band", "2"]);
        assert!(effective_config(&args).is_err());

        let args = parse(&["--mode", "projection", "--band", "1"]);
        assert!(effective_config(&args).is_err());
    }

    #[test]
    fn test_lineout_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = lineout_config_file(&dir);
        let config_arg = path.to_str().unwrap();

        let args = parse(&["--config", config_arg, "--band", "4", "--xpixel", "3"]);
        let config = effective_config(&args).unwrap();
        // Unset flags keep the config values
        assert_eq!(
            config.analysis.mode,
            ProfileMode::Lineout {
                xpixel: Some(3),
                ypixel: Some(9),
                band: 4
            }
        );

        let args = parse(&["--config", config_arg, "--mode", "lineout"]);
        let config = effective_config(&args).unwrap();
        assert_eq!(
            config.analysis.mode,
            ProfileMode::Lineout {
                xpixel: None,
                ypixel: Some(9),
                band: 0
            }
        );
    }

    #[test]
    fn test_projection_mode_replaces_config_lineout() {
        let dir = tempfile::tempdir().unwrap();
        let path = lineout_config_file(&dir);
        let args = parse(&["--config", path.to_str().unwrap(), "--mode", "projection"]);
        let config = effective_config(&args).unwrap();
        assert_eq!(config.analysis.mode, ProfileMode::Projection);
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(
            parse_region("10, 20,5,6").unwrap(),
            DeadPixelRegion::new(10, 20, 5, 6)
        );
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,3,-4").is_err());
    }

    #[test]
    fn test_synthetic_frame_holds_region_past_2000() {
        let region = DeadPixelRegion::new(2500, 60, 40, 40);
        let frame = synthetic_frame(&region);
        assert_eq!(frame.dim(), (100, 2540));
        assert_abs_diff_eq!(frame[[60, 2500]], 1000.0, epsilon = 1e-9);

        let args = parse(&[
            "--dead-pixel-region",
            "2500,60,40,40",
            "--x-margin",
            "30",
            "--y-margin",
            "30",
        ]);
        let config = effective_config(&args).unwrap();
        let result = run_self_check(&config).unwrap();
        assert_abs_diff_eq!(result.widths.x_fwhm, sigma_to_fwhm(8.0), epsilon = 0.3);
        assert_abs_diff_eq!(result.widths.y_fwhm, sigma_to_fwhm(5.0), epsilon = 0.3);
    }
}
