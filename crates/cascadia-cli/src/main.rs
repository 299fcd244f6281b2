/// Offline scenario runner: loads a scenario JSON file, runs the cascading
/// hazard pipeline with a given seed, and prints the outcome as JSON.
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

use cascadia_core::pipeline::run_stage;
use cascadia_core::ScenarioConfig;

#[derive(Parser, Debug)]
#[command(name = "cascadia", about = "Cascading disaster scenario runner")]
struct Args {
    /// Path to a scenario JSON file.
    #[arg(short, long)]
    scenario: String,

    /// Stage RNG seed (epicenter, magnitude, weather fallback).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Emit the full stage outcome (per-panel grid and hazard maps)
    /// instead of just the damage report.
    #[arg(long)]
    full: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("cannot read scenario file {}", args.scenario))?;
    let config: ScenarioConfig =
        serde_json::from_str(&text).context("scenario file is not a valid configuration")?;

    let outcome = run_stage(&config, args.seed)?;

    if args.full {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        eprintln!(
            "epicenter ({}, {}), magnitude {:.2}, weather {:?}",
            outcome.epicenter.x, outcome.epicenter.y, outcome.magnitude, outcome.weather
        );
        eprintln!(
            "collapses: {} shaking, {} waving, {} landslide",
            outcome.shaking_collapses, outcome.waving_collapses, outcome.landslide_collapses
        );
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    }

    Ok(())
}
