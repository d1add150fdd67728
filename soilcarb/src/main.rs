//! Enzyme-driven soil carbon simulator.
//!
//! Reads a scenario (`scenario.toml`), steps the model across its forcing
//! schedule, and exports the state history as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use soilcarb::core::error::SimulationError;
use soilcarb::core::summary::summarize;
use soilcarb::core::types::Variable;
use soilcarb::exit_codes;
use soilcarb::io::config::{DEFAULT_CONFIG_FILE, ScenarioConfig, load_config, write_config};
use soilcarb::io::error::ExportError;
use soilcarb::io::history_store::{export_history, load_history};
use soilcarb::logging;
use soilcarb::simulate::{SampleOverrides, run_scenario};

#[derive(Parser)]
#[command(
    name = "soilcarb",
    version,
    about = "Enzyme-driven soil carbon simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a scenario file with the reference soil and published parameters.
    Init {
        /// Scenario file to create.
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run a scenario and export its history.
    Run(RunArgs),
    /// Print first/last/min/max of every variable in an exported history.
    Summary {
        history: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
        /// Only report these variables (repeatable, e.g. `-v soc -v co2`).
        #[arg(short = 'v', long = "variable", value_name = "NAME")]
        variables: Vec<Variable>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Scenario file; defaults apply if it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Number of steps (caps explicit schedules and series).
    #[arg(short, long)]
    steps: Option<usize>,
    /// History destination, overriding `output.history_path`.
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Record intermediate variables on every history entry.
    #[arg(long)]
    diagnostics: bool,
    /// Clamp carbon-use efficiency to [0, 1].
    #[arg(long)]
    clamp_cue: bool,
    /// Initial SOC from a raw OpenLandMap sample.
    #[arg(long)]
    soc_sample: Option<f64>,
    /// Initial temperature from a raw MODIS LST sample.
    #[arg(long)]
    lst_sample: Option<f64>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { config, force } => cmd_init(&config, force),
        Command::Run(args) => cmd_run(&args),
        Command::Summary {
            history,
            json,
            variables,
        } => cmd_summary(&history, json, &variables),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ExportError>().is_some() {
        return exit_codes::EXPORT;
    }
    match err.downcast_ref::<SimulationError>() {
        Some(SimulationError::Domain { .. }) => exit_codes::DOMAIN,
        _ => exit_codes::INVALID,
    }
}

fn cmd_init(config: &Path, force: bool) -> Result<()> {
    if !force && config.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config.display()
        );
    }
    write_config(config, &ScenarioConfig::default())
        .with_context(|| format!("write {}", config.display()))?;
    println!("{}", config.display());
    Ok(())
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let mut cfg = load_config(&args.config)?;
    if let Some(steps) = args.steps {
        cfg.forcing.steps = u32::try_from(steps).context("--steps is too large")?;
    }
    cfg.output.record_diagnostics |= args.diagnostics;
    cfg.output.clamp_cue |= args.clamp_cue;
    let samples = SampleOverrides {
        soc_sample: args.soc_sample,
        lst_sample: args.lst_sample,
    };

    let base_dir = args
        .config
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (runner, outcome) = run_scenario(&cfg, base_dir, &samples, args.steps)?;

    let out = match &args.out {
        Some(out) => out.clone(),
        None => base_dir.join(&cfg.output.history_path),
    };
    let receipt = export_history(&out, runner.history())?;
    let state = outcome.final_state;
    println!(
        "{} steps -> {} (soc={} doc={} mic={} enz={} co2={} temp={})",
        outcome.steps_executed,
        receipt.path.display(),
        state.soc,
        state.doc,
        state.mic,
        state.enz,
        state.co2,
        state.temp
    );
    Ok(())
}

fn cmd_summary(history: &Path, json: bool, variables: &[Variable]) -> Result<()> {
    let log = load_history(history)?;
    let Some(mut summary) = summarize(&log) else {
        println!("no steps recorded");
        return Ok(());
    };
    if !variables.is_empty() {
        summary
            .ranges
            .retain(|range| variables.contains(&range.variable));
    }
    if json {
        let mut payload = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        payload.push('\n');
        print!("{payload}");
        return Ok(());
    }
    println!("steps: {}", summary.steps);
    for range in &summary.ranges {
        println!(
            "{:<4} first={} last={} min={} max={} change={}",
            range.variable,
            range.first,
            range.last,
            range.min,
            range.max,
            range.change()
        );
    }
    println!("organic carbon change: {}", summary.organic_carbon_change);
    if summary.negative_stock_steps > 0 {
        println!("steps with negative stocks: {}", summary.negative_stock_steps);
    }
    Ok(())
}
