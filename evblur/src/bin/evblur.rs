//! Blur region detection driver
//!
//! # Usage
//!
//! ```bash
//! # One event stream, scored against a ground-truth / reconstruction pair
//! cargo run --release --bin evblur -- detect -e events.txt --width 346 --height 260 \
//!     --ground-truth gt.png --reconstruction recon.png --crop-dir crops/
//!
//! # Median variant with the heatmap written out for inspection
//! cargo run --release --bin evblur -- detect -e events.txt --width 346 --height 260 \
//!     --statistic median --heatmap-out heatmap.png
//!
//! # Every scenario folder of a dataset
//! cargo run --release --bin evblur -- batch -d RESBLUR --width 346 --height 260
//!
//! # Ground-truth frame extraction
//! cargo run --release --bin evblur -- extract-gt -d RESBLUR -o RESBLUR_OUT
//! ```
//!
//! Set `RUST_LOG=debug` to see thresholds and region counts.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use evblur::dataset::{extract_ground_truth, list_scenarios};
use evblur::events::read_events;
use evblur::image_proc::heatmap::build_heatmap;
use evblur::image_proc::image::{load_gray, save_gray};
use evblur::image_proc::psnr::crop_regions;
use evblur::image_proc::thresholding::Statistic;
use evblur::pipeline::{run_heatmap, ImagePair, PipelineReport};
use evblur::PipelineConfig;
use shared::image_size::ImageSize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatisticArg {
    Mean,
    Median,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::Mean => Statistic::Mean,
            StatisticArg::Median => Statistic::Median,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct DetectionArgs {
    /// Sensor width in pixels
    #[arg(long)]
    width: usize,

    /// Sensor height in pixels
    #[arg(long)]
    height: usize,

    /// JSON pipeline config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold statistic
    #[arg(short, long, value_enum)]
    statistic: Option<StatisticArg>,

    /// Threshold = statistic * ratio (default 0.5 for mean, 2.0 for median)
    #[arg(short, long)]
    ratio: Option<f64>,

    /// Discard regions with fewer cells
    #[arg(long)]
    min_area: Option<usize>,

    /// Threshold the [0, 255]-normalized heatmap
    #[arg(long)]
    normalize: bool,
}

impl DetectionArgs {
    fn size(&self) -> ImageSize {
        ImageSize::from_width_height(self.width, self.height)
    }

    fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(statistic) = self.statistic {
            config.statistic = statistic.into();
            // A ratio from the file belongs to the file's statistic
            config.ratio = None;
        }
        if let Some(ratio) = self.ratio {
            config.ratio = Some(ratio);
        }
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        config.normalize |= self.normalize;

        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and score the blur region of a single event stream
    Detect {
        /// Event text file (timestamp x y polarity per line)
        #[arg(short, long)]
        events: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Ground-truth image aligned with the sensor
        #[arg(long, requires = "reconstruction")]
        ground_truth: Option<PathBuf>,

        /// Reconstructed image aligned with the sensor
        #[arg(long, requires = "ground_truth")]
        reconstruction: Option<PathBuf>,

        /// Write every region's patch from both images here
        #[arg(long, requires = "ground_truth")]
        crop_dir: Option<PathBuf>,

        /// Write the normalized heatmap as a grayscale image
        #[arg(long)]
        heatmap_out: Option<PathBuf>,
    },

    /// Run detection on every scenario folder of a dataset
    Batch {
        /// Dataset root holding one folder per scenario
        #[arg(short, long)]
        dataset: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Event file name inside each scenario
        #[arg(long, default_value = "events.txt")]
        events_name: String,

        /// Ground-truth image name inside each scenario
        #[arg(long, default_value = "gt.png")]
        ground_truth_name: String,

        /// Reconstruction image name inside each scenario
        #[arg(long, default_value = "reconstruction.png")]
        reconstruction_name: String,
    },

    /// Copy ground-truth frames of every scenario and write their timestamps
    ExtractGt {
        /// Dataset root holding one folder per scenario
        #[arg(short, long)]
        dataset: PathBuf,

        /// Output root; one folder per scenario is created
        #[arg(short, long)]
        output: PathBuf,
    },
}

struct UnitInputs<'a> {
    events: &'a Path,
    images: Option<(&'a Path, &'a Path)>,
    crop_dir: Option<&'a Path>,
    heatmap_out: Option<&'a Path>,
}

fn process_unit(
    inputs: &UnitInputs,
    size: ImageSize,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    let detector = config.detector()?;
    let events = read_events(inputs.events)?;
    let heatmap = build_heatmap(&events, size)?;

    if let Some(path) = inputs.heatmap_out {
        save_gray(heatmap.normalized_u8().view(), path)?;
        log::info!("Wrote heatmap to {}", path.display());
    }

    let images = match inputs.images {
        Some((gt_path, recon_path)) => Some((load_gray(gt_path)?, load_gray(recon_path)?)),
        None => None,
    };
    let pair = images.as_ref().map(|(gt, recon)| ImagePair {
        ground_truth: gt.view(),
        reconstruction: recon.view(),
    });

    let report = run_heatmap(&heatmap, &detector, pair)?;

    if let (Some(dir), Some((gt, recon))) = (inputs.crop_dir, &images) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating crop directory {}", dir.display()))?;
        let gt_patches = crop_regions(gt.view(), &report.regions)?;
        let recon_patches = crop_regions(recon.view(), &report.regions)?;

        for ((region, gt_patch), recon_patch) in
            report.regions.iter().zip(gt_patches).zip(recon_patches)
        {
            save_gray(gt_patch, &dir.join(format!("region_{}_gt.png", region.label)))?;
            save_gray(
                recon_patch,
                &dir.join(format!("region_{}_recon.png", region.label)),
            )?;
        }
        log::info!(
            "Wrote {} region crops to {}",
            report.regions.len(),
            dir.display()
        );
    }

    Ok(report)
}

fn scenario_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_batch(
    dataset: &Path,
    detection: &DetectionArgs,
    events_name: &str,
    ground_truth_name: &str,
    reconstruction_name: &str,
) -> Result<()> {
    let config = detection.resolve_config()?;
    // Fail once up front rather than once per scenario
    config.detector()?;
    let size = detection.size();
    let scenarios = list_scenarios(dataset)?;

    log::info!(
        "Processing {} scenarios in {}",
        scenarios.len(),
        dataset.display()
    );

    let results: Vec<(String, Result<PipelineReport>)> = scenarios
        .par_iter()
        .map(|scenario| {
            let gt = scenario.join(ground_truth_name);
            let recon = scenario.join(reconstruction_name);
            let events = scenario.join(events_name);
            let inputs = UnitInputs {
                events: &events,
                images: (gt.is_file() && recon.is_file()).then(|| (gt.as_path(), recon.as_path())),
                crop_dir: None,
                heatmap_out: None,
            };
            (
                scenario_name(scenario),
                process_unit(&inputs, size, &config),
            )
        })
        .collect();

    let mut failed = 0usize;
    let mut scores = Vec::new();
    for (name, result) in &results {
        match result {
            Ok(report) => {
                match report.psnr {
                    Some(psnr) => log::info!(
                        "{}: {} regions, largest area {}, PSNR {:.3} dB",
                        name,
                        report.regions.len(),
                        report.selected.area,
                        psnr
                    ),
                    None => log::info!(
                        "{}: {} regions, largest area {} (no images to score)",
                        name,
                        report.regions.len(),
                        report.selected.area
                    ),
                }
                if let Some(psnr) = report.psnr.filter(|p| p.is_finite()) {
                    scores.push(psnr);
                }
                println!("{}\t{}", name, serde_json::to_string(report)?);
            }
            Err(e) => {
                failed += 1;
                log::warn!("{}: skipped: {:#}", name, e);
            }
        }
    }

    println!(
        "Processed {} scenarios, {} failed",
        results.len() - failed,
        failed
    );
    if !scores.is_empty() {
        println!(
            "Mean PSNR over {} scored scenarios: {:.3} dB",
            scores.len(),
            scores.iter().sum::<f64>() / scores.len() as f64
        );
    }

    Ok(())
}

fn run_extract_gt(dataset: &Path, output: &Path) -> Result<()> {
    let scenarios = list_scenarios(dataset)?;
    let mut failed = 0usize;

    for scenario in &scenarios {
        let name = scenario_name(scenario);
        match extract_ground_truth(scenario, &output.join(&name)) {
            Ok(timestamps) => println!("{}\t{} frames", name, timestamps.len()),
            Err(e) => {
                failed += 1;
                log::warn!("{}: skipped: {}", name, e);
            }
        }
    }

    if failed == scenarios.len() && !scenarios.is_empty() {
        bail!("No scenario in {} could be extracted", dataset.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            events,
            detection,
            ground_truth,
            reconstruction,
            crop_dir,
            heatmap_out,
        } => {
            let config = detection.resolve_config()?;
            let inputs = UnitInputs {
                events: &events,
                images: ground_truth.as_deref().zip(reconstruction.as_deref()),
                crop_dir: crop_dir.as_deref(),
                heatmap_out: heatmap_out.as_deref(),
            };

            let report = process_unit(&inputs, detection.size(), &config)
                .with_context(|| format!("processing {}", events.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Batch {
            dataset,
            detection,
            events_name,
            ground_truth_name,
            reconstruction_name,
        } => run_batch(
            &dataset,
            &detection,
            &events_name,
            &ground_truth_name,
            &reconstruction_name,
        )?,

        Commands::ExtractGt { dataset, output } => run_extract_gt(&dataset, &output)?,
    }

    Ok(())
}
