//! demo - end-to-end synthetic run for CleanScan

use anyhow::{anyhow, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use cleanscan::annotate::build_overlays;
use cleanscan::config::TriageConfig;
use cleanscan::report::{render_assessment, render_footage, render_text_result};
use cleanscan::text::{analyze, TextOperation};
use cleanscan::{BackendRegistry, Frame, ImageDimensions, StubBackend};

const DEMO_WIDTH: u32 = 320;
const DEMO_HEIGHT: u32 = 240;
const MAX_PER_FRAME: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of synthetic frames.
    #[arg(long, default_value_t = 60)]
    frames: usize,
    /// Seed for the synthetic detector script.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Output directory for the demo artifacts.
    #[arg(long, default_value = "demo_out")]
    out: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.frames == 0 {
        return Err(anyhow!("frames must be >= 1"));
    }
    let config = TriageConfig::load()?;

    let out_dir = PathBuf::from(&args.out);
    fs::create_dir_all(&out_dir)?;

    let dims = ImageDimensions::new(DEMO_HEIGHT, DEMO_WIDTH);
    let frames: Vec<Frame> = (0..args.frames)
        .map(|_| Frame {
            pixels: vec![0u8; (DEMO_WIDTH * DEMO_HEIGHT * 3) as usize],
            dims,
        })
        .collect();

    stage("register synthetic detector");
    let mut registry = BackendRegistry::with_min_confidence(config.min_confidence)?;
    registry.register(StubBackend::synthetic(args.seed, args.frames, MAX_PER_FRAME, dims))?;
    log::info!(
        "backends: {} (min confidence {:.2})",
        registry.names().join(", "),
        registry.min_confidence()
    );

    stage("triage first frame");
    let (first, assessment) =
        registry.triage_with(None, &frames[0].pixels, DEMO_WIDTH, DEMO_HEIGHT)?;
    let assessment_text = render_assessment(&assessment, &first.detections);
    print!("{}", assessment_text);
    fs::write(
        out_dir.join("frame0_overlay.json"),
        serde_json::to_string_pretty(&build_overlays(&first.detections))?,
    )?;

    stage("analyse footage");
    let summary = registry.footage_with(None, &frames, config.max_frames)?;
    let footage_text = render_footage(&summary);
    print!("{}", footage_text);
    fs::write(
        out_dir.join("footage_summary.json"),
        serde_json::to_string_pretty(&summary)?,
    )?;

    stage("summarise report text");
    let report = format!("{}\n{}", assessment_text, footage_text);
    for op in [TextOperation::Keywords, TextOperation::Summarize] {
        let result = analyze(&report, op, config.summary_length, &config.text)?;
        print!("{}", render_text_result(&result));
    }

    stage(&format!("artifacts written to {}", out_dir.display()));
    Ok(())
}

fn stage(msg: &str) {
    eprintln!("demo: {}", msg);
}
