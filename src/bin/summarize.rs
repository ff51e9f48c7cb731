//! One-shot version of the upload pipeline for local files:
//! `summarize <input.csv> [output.csv] [per-device|append-summary]`

use std::path::PathBuf;
use std::process::ExitCode;
use std::{env, fs};

use anyhow::{Context, Result};
use metersum::process::{self, Layout, OutputMode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let input = PathBuf::from(args.next().context(
        "usage: summarize <input.csv> [output.csv] [per-device|append-summary]",
    )?);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("summary.csv"));
    let mode: OutputMode = args.next().as_deref().unwrap_or("per-device").parse()?;

    let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let summary = process::process_data(&bytes, &Layout::default(), mode)?;
    fs::write(&output, &summary).with_context(|| format!("writing {}", output.display()))?;

    info!(input = %input.display(), output = %output.display(), "summary written");
    Ok(())
}
