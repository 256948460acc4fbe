use clap::Parser;
use colored::*;
use decay_looper::domain::clamp_index;
use decay_looper::{DecayIndexLooper, DecayPlan, LooperState, Phase};
use eyre::{Context, Result, bail};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, SpinArgs};
use config::Config;

/// Above this many slots the wheel is printed as `index/size`
const MAX_DRAWN_SLOTS: usize = 24;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("decay-looper")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("decay-looper.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => run_spin(&SpinArgs::default(), config),
        Some(Commands::Spin(args)) => run_spin(args, config),
        Some(Commands::Schedule { size, current, stop }) => {
            handle_schedule_command(*size, *current, *stop, config)
        }
    }
}

fn run_spin(args: &SpinArgs, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(spin(args, config))
}

async fn spin(args: &SpinArgs, config: &Config) -> Result<()> {
    let size = args.size.unwrap_or(config.demo.size);
    let initial = args.initial.unwrap_or(config.demo.initial_index);
    let stop = args.stop.unwrap_or(config.demo.stop_index);
    let spin_for = Duration::from_millis(args.spin_ms.unwrap_or(config.demo.spin_ms));
    info!(
        "Spinning: size={} initial={} stop={} spin_for={:?}",
        size, initial, stop, spin_for
    );

    let looper =
        DecayIndexLooper::new(config.looper.to_looper_config()).context("Invalid looper configuration")?;
    let mut updates = looper.updates();

    info!(
        "Looper ready: linear={:?} max_decay={:?} growth={}",
        looper.config().linear_interval,
        looper.config().max_decay_interval,
        looper.config().decay_growth.label()
    );

    looper.start_loop(size, initial);
    if !looper.state().phase.is_running() {
        bail!("Looper did not start: size must be positive (got {})", size);
    }

    let decay_at = tokio::time::sleep(spin_for);
    tokio::pin!(decay_at);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut decay_requested = false;

    loop {
        tokio::select! {
            _ = &mut decay_at, if !decay_requested => {
                decay_requested = true;
                looper.start_decay(stop);
            }
            update = updates.recv() => match update {
                Ok(state) => {
                    print_state(state, size, args.json)?;
                    if state.phase == Phase::Finished {
                        break;
                    }
                    if state.phase == Phase::Idle {
                        bail!("Looper reset to idle mid-session");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Output lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => bail!("Looper output closed"),
            },
            _ = &mut ctrl_c => {
                info!("Interrupted at {}", looper.state());
                println!("{}", "Interrupted".yellow());
                break;
            }
        }
    }

    Ok(())
}

fn print_state(state: LooperState, size: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&state).context("Failed to encode state")?);
        return Ok(());
    }

    let phase = format!("{:>9}", state.phase.to_string());
    let phase = match state.phase {
        Phase::Idle => phase.dimmed(),
        Phase::Linear => phase.cyan(),
        Phase::Decaying => phase.yellow(),
        Phase::Finished => phase.green().bold(),
    };
    println!("{} {}", phase, render_wheel(state.current_index, size));
    Ok(())
}

fn render_wheel(index: usize, size: usize) -> String {
    if size > MAX_DRAWN_SLOTS {
        return format!("{}/{}", index, size);
    }
    (0..size)
        .map(|slot| {
            if slot == index {
                format!("[{}]", slot).reversed().to_string()
            } else {
                format!(" {} ", slot)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn handle_schedule_command(size: Option<usize>, current: i64, stop: Option<i64>, config: &Config) -> Result<()> {
    let size = size.unwrap_or(config.demo.size);
    if size == 0 {
        bail!("Size must be positive");
    }
    let current = clamp_index(current, size);
    let stop = clamp_index(stop.unwrap_or(config.demo.stop_index), size);
    info!("Planning decay: size={} current={} stop={}", size, current, stop);

    let looper_config = config.looper.to_looper_config();
    looper_config.validate().context("Invalid looper configuration")?;
    let intervals = looper_config
        .decay_intervals()
        .context("Failed to generate decay intervals")?;
    let plan = DecayPlan::new(size, current, stop, intervals);
    let linear = looper_config.linear_interval;

    println!("{} {}", "Growth:".green(), looper_config.decay_growth.label());
    println!(
        "{} {:?} (max decay {:?})",
        "Linear interval:".green(),
        linear,
        looper_config.max_decay_interval
    );
    if plan.is_snap() {
        println!("{} snaps straight to {}", "Decay:".yellow(), plan.stop_index);
        return Ok(());
    }

    let intervals: Vec<String> = plan.intervals.iter().map(|d| d.as_millis().to_string()).collect();
    println!("{} [{}] ms", "Decay intervals:".green(), intervals.join(", "));
    println!("{} {}", "Padding steps:".green(), plan.pad_steps);
    println!("{} {}", "Total steps:".green(), plan.total_steps());
    println!("{} {:?}", "Total duration:".green(), plan.total_duration(linear));
    println!("{} {} -> {}", "Lands:".green(), current, plan.stop_index);
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging first
    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
