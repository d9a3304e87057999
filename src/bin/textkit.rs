//! textkit - keyword / summary / clean / chunk over a file or stdin

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use cleanscan::config::TriageConfig;
use cleanscan::report::render_text_result;
use cleanscan::text::analyze_tagged;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Text frequency tools")]
struct Args {
    /// keywords, summarize, clean or chunk.
    #[arg(long, default_value = "keywords")]
    op: String,
    /// Summary budget / chunk size in characters (defaults to the configured summary length).
    #[arg(long)]
    max_length: Option<usize>,
    /// Input file; stdin when absent.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = TriageConfig::load()?;

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        log::warn!("input text is empty");
    }

    let max_length = args.max_length.unwrap_or(config.summary_length);
    let result = analyze_tagged(&text, &args.op, max_length, &config.text)?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print!("{}", render_text_result(&result)),
    }
    Ok(())
}
