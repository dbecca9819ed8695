mod catalog;
mod reports;
mod simulation;
mod strategy;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use reports::{
    generate_console_report, generate_csv_report, generate_json_report, generate_markdown_report,
    report_rows,
};
use simulation::{SimulationConfig, run_simulation};
use strategy::Strategy;

#[derive(Debug, Parser)]
#[command(name = "kraljic-tester", version = "0.1.0")]
#[command(about = "Simulation driver for the Kraljic practice scoring engine")]
struct Args {
    /// Number of simulated participants
    #[arg(long, default_value_t = 6)]
    participants: usize,

    /// Seed for the participant bots
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Strategies to assign round-robin (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let strategies = resolve_strategies(&args.strategies)?;
    let config = SimulationConfig {
        participants: args.participants,
        seed: args.seed,
        strategies,
        verbose: args.verbose,
    };

    let start_time = Instant::now();
    let outcomes = run_simulation(&config)?;
    let rows = report_rows(&outcomes);

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => generate_json_report(output_target.writer(), &rows)?,
        "markdown" => generate_markdown_report(output_target.writer(), &rows)?,
        "csv" => generate_csv_report(output_target.writer(), &rows)?,
        _ => generate_console_report(output_target.writer(), &rows)?,
    }

    let duration = start_time.elapsed();
    writeln!(output_target.writer())?;
    writeln!(
        output_target.writer(),
        "🏁 {} participants in {duration:?}",
        rows.len()
    )?;
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner() {
    println!("{}", "🧭 Kraljic Simulation Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in Strategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:12} - {}",
            strategy.label(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_strategies(tokens: &str) -> Result<Vec<Strategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(tokens) {
        if token == "all" {
            strategies.extend(Strategy::ALL);
            continue;
        }
        match Strategy::parse(&token) {
            Some(strategy) => strategies.push(strategy),
            None => eprintln!("⚠️  Unknown strategy: {}", token.yellow()),
        }
    }
    if strategies.is_empty() {
        bail!("no valid strategies selected");
    }
    Ok(strategies)
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
