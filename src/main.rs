//! pathkit: plan a tokenized G-Code program and report or export the result.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use pathkit::{
    format_summary, init_logging, load_program, write_vertex_data, AxisConvention,
    PlannerConfig, Simulator, Strictness,
};

#[derive(Parser)]
#[command(
    name = "pathkit",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about = "Plan and discretize a tokenized G-Code program"
)]
struct Args {
    /// Tokenized program (JSON array of command lines)
    input: PathBuf,

    /// Planner config file (TOML or JSON); defaults to the user config
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Report unsupported and unknown G-Codes
    #[arg(long)]
    strict: bool,

    /// Emit vertices for a Y-up renderer
    #[arg(long)]
    y_up: bool,

    /// Write the vertex buffer here (`.bin` for raw floats, otherwise JSON)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format for the report: text or json
    #[arg(long, default_value = "text", value_parser = validate_output_format)]
    output_format: String,

    /// Suppress all logging
    #[arg(long)]
    log_disable: bool,
}

fn validate_output_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("Unknown output format '{}'. Options: text, json", s)),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(!args.log_disable) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::load_or_default().context("loading user config")?,
    };
    if args.strict {
        config.interpreter.strictness = Strictness::Strict;
    }
    if args.y_up {
        config.display.axis_convention = AxisConvention::YUp;
    }

    let program = load_program(&args.input)
        .with_context(|| format!("reading program {}", args.input.display()))?;

    let simulator = Simulator::new(config);
    let result = simulator.simulate(&program);
    let config = simulator.config();

    for problem in &result.diagnostics {
        eprintln!("{}", problem);
    }

    let summary = result.summary();
    match args.output_format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => println!("{}", format_summary(&summary, &config.display)),
    }

    if let Some(path) = &args.output {
        let data = result.vertex_data(config.display.axis_convention);
        write_vertex_data(path, &data)
            .with_context(|| format!("writing vertices to {}", path.display()))?;
        tracing::info!("Wrote {} vertices to {}", data.len(), path.display());
    }

    Ok(())
}
