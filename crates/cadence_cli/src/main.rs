//! Cadence CLI
//!
//! Play tween sequences headlessly, scaffold sequence files and inspect
//! easing curves.

mod config;
mod run;

use anyhow::{Context, Result};
use cadence_animation::Easing;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::SequenceFile;
use crate::run::{simulate, RunOptions};

#[derive(Parser)]
#[command(name = "cadence", version, about = "Headless tween sequence player")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a sequence file and print field values per frame
    Run {
        /// Sequence file
        path: PathBuf,
        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Stop after this many frames
        #[arg(long, conflicts_with = "seconds")]
        frames: Option<u64>,
        /// Stop after this many simulated seconds
        #[arg(long)]
        seconds: Option<f32>,
        /// Print every Nth frame
        #[arg(long, default_value_t = 1)]
        every: u64,
        /// Emit one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Write a sample sequence file
    Init {
        /// Destination file
        path: PathBuf,
        /// Sequence name
        #[arg(long, default_value = "sample")]
        name: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print sampled values of every easing preset
    Easings {
        /// Samples between 0 and 1 (inclusive)
        #[arg(long, default_value_t = 5)]
        samples: usize,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            path,
            fps,
            frames,
            seconds,
            every,
            json,
        } => cmd_run(
            path,
            RunOptions {
                fps,
                frames,
                seconds,
                every,
            },
            json,
        ),
        Commands::Init { path, name, force } => cmd_init(path, &name, force),
        Commands::Easings { samples } => cmd_easings(samples),
    }
}

fn cmd_run(path: PathBuf, options: RunOptions, json: bool) -> Result<()> {
    let file = SequenceFile::load(&path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = simulate(&file, &options, |frame| {
        if json {
            serde_json::to_writer(&mut out, frame)?;
            writeln!(out)?;
        } else {
            let fields: Vec<String> = frame
                .fields
                .iter()
                .map(|(name, value)| format!("{}={:.3}", name, value))
                .collect();
            writeln!(
                out,
                "frame {:>5}  t={:>7.3}  step {:>2}  {:<8}  {}",
                frame.index,
                frame.time,
                frame.step,
                frame.state,
                fields.join(" ")
            )?;
        }
        Ok(())
    })?;

    if json {
        serde_json::to_writer(&mut out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "\n{}: {} frames, {:.3}s, {}, {} loop(s)",
            report.name,
            report.frames,
            report.time,
            if report.finished { "finished" } else { "still playing" },
            report.cycles
        )?;
        if !report.markers.is_empty() {
            writeln!(out, "markers: {}", report.markers.join(", "))?;
        }
    }
    Ok(())
}

fn cmd_init(path: PathBuf, name: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let sample = SequenceFile::sample(name);
    fs::write(&path, sample.to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "wrote sample sequence");
    println!("Created {}", path.display());
    println!("Play it with: cadence run {}", path.display());
    Ok(())
}

fn cmd_easings(samples: usize) -> Result<()> {
    let samples = samples.max(2);
    let points: Vec<f32> = (0..samples)
        .map(|i| i as f32 / (samples - 1) as f32)
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    write!(out, "{:<18}", "easing")?;
    for x in &points {
        write!(out, "{:>9.3}", x)?;
    }
    writeln!(out)?;

    for (name, easing) in Easing::PRESETS {
        write!(out, "{:<18}", name)?;
        for x in &points {
            write!(out, "{:>9.3}", easing.apply(*x))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
