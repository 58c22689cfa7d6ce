//! balance-trainer - closed-loop balance training from the command line.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use balance_control::SessionState;
use balance_errors::{BalanceError, ErrorCategory, ErrorSeverity};
use balance_filters::{CascadeFilter, PassType};
use balance_link::{DeviceConnector, SerialLink};
use balance_trainer::{
    ConfigStore, ControlSession, RunSummary, SampleSource, SimulatedSway, TickClock, TrainerConfig,
};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "balance-trainer")]
#[command(about = "Closed-loop FES balance training: filter CoP, compute stimulation, drive the stimulator")]
#[command(version)]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a training session
    Run(RunArgs),

    /// Print the per-section coefficients of a Butterworth design as JSON
    Coefficients {
        /// Cutoff frequency (Hz)
        #[arg(long, default_value_t = 0.4615)]
        cutoff_hz: f64,
        /// Sample rate (Hz)
        #[arg(long, default_value_t = 20.0)]
        sample_hz: f64,
        /// Filter order
        #[arg(long, default_value_t = 2)]
        order: usize,
        /// High-pass instead of low-pass
        #[arg(long)]
        high_pass: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// YAML or JSON configuration file
    #[arg(short, long, env = "BALANCE_TRAINER_CONFIG")]
    config: Option<PathBuf>,

    /// Stimulator device path, e.g. /dev/ttyUSB0
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Stop after this many ticks instead of the configured duration
    #[arg(long)]
    ticks: Option<u64>,

    /// Run without a stimulator link
    #[arg(long)]
    dry_run: bool,

    /// Do not pace ticks in real time
    #[arg(long, requires = "dry_run")]
    fast: bool,

    /// Seed for the simulated subject
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_failure(&e);
            if cli.json {
                output::print_error_json(&e, classify(&e));
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// The first classified error in the chain, if any.
fn classify(err: &anyhow::Error) -> Option<&BalanceError> {
    err.chain().find_map(|e| e.downcast_ref::<BalanceError>())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match classify(err).map(BalanceError::category) {
        Some(ErrorCategory::Config) => 2,
        Some(ErrorCategory::Link) => 3,
        Some(ErrorCategory::IO) => 4,
        Some(ErrorCategory::Other) | None => 1,
    }
}

fn log_failure(err: &anyhow::Error) {
    let Some(classified) = classify(err) else {
        error!(error = %err, "Command failed");
        return;
    };
    let category = classified.category();
    let severity = classified.severity();
    match severity {
        ErrorSeverity::Critical => error!(%category, %severity, error = %err, "Stimulation stopped"),
        ErrorSeverity::Error => error!(%category, %severity, error = %err, "Command failed"),
        ErrorSeverity::Warning | ErrorSeverity::Info => {
            warn!(%category, %severity, error = %err, "Command failed");
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run(args, cli.json),
        Commands::Coefficients {
            cutoff_hz,
            sample_hz,
            order,
            high_pass,
        } => {
            let pass = if *high_pass {
                PassType::HighPass
            } else {
                PassType::LowPass
            };
            let filter = CascadeFilter::butterworth(*cutoff_hz, *sample_hz, *order, pass)
                .map_err(BalanceError::from)?;
            output::print_coefficients(&filter)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TrainerConfig> {
    let store = match path {
        Some(path) => ConfigStore::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConfigStore::new(),
    };
    let config = TrainerConfig::from_store(&store).map_err(BalanceError::from)?;
    config.validate().map_err(BalanceError::from)?;
    Ok(config)
}

fn open_link(device: &Path, config: &TrainerConfig) -> Result<SerialLink> {
    let connector = DeviceConnector::new(device.to_string_lossy(), config.link.baud_rate);
    let link = SerialLink::start(connector, config.link.clone()).map_err(BalanceError::from)?;
    Ok(link)
}

fn run(args: &RunArgs, json: bool) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let link = if args.dry_run {
        None
    } else {
        let device = args
            .device
            .as_deref()
            .ok_or_else(|| BalanceError::other("no stimulator device given; pass --device or --dry-run"))?;
        Some(open_link(device, &config)?)
    };

    let mut session = ControlSession::new(&config, link).map_err(BalanceError::from)?;
    let state = SessionState::new(config.session.target());
    let mut source = SimulatedSway::new(args.seed).with_mass(config.controller.body_mass_kg);
    let mut clock = TickClock::new(config.session.tick_hz).map_err(BalanceError::from)?;

    let planned = args.ticks.unwrap_or_else(|| config.session.total_ticks());
    let mut summary = RunSummary::new(planned);
    info!(planned, tick_hz = config.session.tick_hz, dry_run = args.dry_run, "Session starting");

    let mut link_error = None;
    while clock.ticks() < planned {
        let timing = if args.fast { clock.step() } else { clock.wait() };
        let Some(sample) = source.next_sample(timing.timestamp_s) else {
            break;
        };
        match session.tick(&sample, &state) {
            Ok(report) => summary.record(&report, &timing),
            Err(e) => {
                error!(error = %e, tick = timing.tick, "Stimulator link lost");
                summary.aborted = Some(e.to_string());
                link_error = Some(e);
                break;
            }
        }
    }

    summary.link = session.link_stats();
    let finished = session.finish();
    output::print_summary(&summary, json)?;

    // the worker's own error explains a lost link better than NotRunning
    finished.map_err(BalanceError::from)?;
    if let Some(e) = link_error {
        return Err(BalanceError::from(e).into());
    }
    Ok(())
}
