//! triage - waste severity assessment for detector output
//!
//! `assess` triages one frame of detections; `footage` summarises recorded
//! per-frame detector output.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cleanscan::annotate::build_overlays;
use cleanscan::config::TriageConfig;
use cleanscan::detect::{ingest_records, DetectionRecord};
use cleanscan::footage::{selected_frames, FootageAggregator};
use cleanscan::report::{render_assessment, render_footage};
use cleanscan::{classify_severity, filter_by_confidence, parse_detections, ImageDimensions};

#[derive(Parser, Debug)]
#[command(name = "triage", about = "Waste severity triage for detector output")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess one frame: `[{"label", "confidence", "bbox": [x1, y1, x2, y2]}]`
    Assess {
        #[arg(long)]
        detections: PathBuf,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        width: Option<u32>,
        /// Source image; supplies dimensions when --height/--width are absent.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Write the image with boxes drawn (requires --image).
        #[arg(long)]
        annotate_out: Option<PathBuf>,
        /// TrueType font for box captions; boxes only when absent.
        #[arg(long, env = "CLEANSCAN_FONT")]
        font: Option<PathBuf>,
        #[arg(long, env = "CLEANSCAN_MIN_CONFIDENCE")]
        min_confidence: Option<f32>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Summarise recorded footage: `{"height", "width", "frames": [[...], ...]}`
    Footage {
        #[arg(long)]
        frames: PathBuf,
        #[arg(long)]
        max_frames: Option<usize>,
        #[arg(long, env = "CLEANSCAN_MIN_CONFIDENCE")]
        min_confidence: Option<f32>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Debug, Deserialize)]
struct FootageFile {
    height: u32,
    width: u32,
    frames: Vec<Vec<DetectionRecord>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = TriageConfig::load()?;

    match args.command {
        Command::Assess {
            detections,
            height,
            width,
            image,
            annotate_out,
            font,
            min_confidence,
            format,
        } => {
            let dims = resolve_dimensions(height, width, image.as_deref())?;
            let raw = read_input(&detections)?;
            let parsed = parse_detections(&raw, dims)?;
            let kept = filter_by_confidence(&parsed, min_confidence.unwrap_or(config.min_confidence))?;
            log::info!(
                "{} of {} detections above confidence threshold",
                kept.len(),
                parsed.len()
            );
            let assessment = classify_severity(&kept, dims)?;

            if let Some(out) = annotate_out {
                let input = image
                    .as_deref()
                    .ok_or_else(|| anyhow!("--annotate-out requires --image"))?;
                write_annotated(input, &out, font.as_deref(), &kept)?;
            }

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
                Format::Text => print!("{}", render_assessment(&assessment, &kept)),
            }
        }
        Command::Footage {
            frames,
            max_frames,
            min_confidence,
            format,
        } => {
            let raw = read_input(&frames)?;
            let footage: FootageFile = serde_json::from_str(&raw)
                .map_err(|e| anyhow!("invalid footage file {}: {}", frames.display(), e))?;
            let dims = ImageDimensions::new(footage.height, footage.width);
            let threshold = min_confidence.unwrap_or(config.min_confidence);
            let max_frames = max_frames.unwrap_or(config.max_frames);

            let selected = selected_frames(footage.frames.len(), max_frames)?;
            log::info!(
                "analysing {} of {} recorded frames",
                selected.len(),
                footage.frames.len()
            );
            let mut recorded: Vec<Option<Vec<DetectionRecord>>> =
                footage.frames.into_iter().map(Some).collect();
            let mut aggregator = FootageAggregator::new();
            for index in selected {
                let records = recorded[index].take().unwrap_or_default();
                let detections = ingest_records(records, dims)
                    .with_context(|| format!("frame {}", index))?;
                let kept = filter_by_confidence(&detections, threshold)?;
                aggregator.push_frame(index, &kept, dims)?;
            }
            let summary = aggregator.finish();

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                Format::Text => print!("{}", render_footage(&summary)),
            }
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn resolve_dimensions(
    height: Option<u32>,
    width: Option<u32>,
    image: Option<&Path>,
) -> Result<ImageDimensions> {
    match (height, width, image) {
        (Some(height), Some(width), _) => Ok(ImageDimensions::new(height, width)),
        (None, None, Some(path)) => image_dimensions(path),
        _ => Err(anyhow!("pass both --height and --width, or --image")),
    }
}

#[cfg(feature = "annotate")]
fn image_dimensions(path: &Path) -> Result<ImageDimensions> {
    cleanscan::annotate::image_dimensions(path)
}

#[cfg(not(feature = "annotate"))]
fn image_dimensions(_path: &Path) -> Result<ImageDimensions> {
    Err(anyhow!(
        "reading image dimensions requires the 'annotate' feature; pass --height and --width"
    ))
}

#[cfg(feature = "annotate")]
fn write_annotated(
    input: &Path,
    output: &Path,
    font: Option<&Path>,
    detections: &[cleanscan::Detection],
) -> Result<()> {
    let font = font.map(cleanscan::annotate::load_font).transpose()?;
    cleanscan::annotate::annotate_file(input, output, &build_overlays(detections), font.as_ref())
}

#[cfg(not(feature = "annotate"))]
fn write_annotated(
    _input: &Path,
    output: &Path,
    _font: Option<&Path>,
    detections: &[cleanscan::Detection],
) -> Result<()> {
    let overlays = build_overlays(detections);
    let json_out = output.with_extension("overlay.json");
    std::fs::write(&json_out, serde_json::to_string_pretty(&overlays)?)
        .with_context(|| format!("failed to write {}", json_out.display()))?;
    log::warn!(
        "built without the 'annotate' feature; wrote overlay instructions to {}",
        json_out.display()
    );
    Ok(())
}
