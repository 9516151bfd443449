//! # Line Tracer Control Unit
//!
//! Loads the configuration, opens the hardware through the driver registry,
//! prepares the loop thread and runs the control loop until Ctrl-C (or the
//! configured tick limit). A stop frame is sent and the bus released on the
//! way out.
//!
//! `--simulate` swaps the GPIO/I2C hardware for the scripted sensors and
//! recording bus, so the binary can be exercised on any Linux host.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracer_common::config::LogLevel;
use tracer_common::consts::DEFAULT_CONFIG_PATH;
use tracer_control_unit::config::{ConfigOverrides, LoadedConfig, load_config};
use tracer_control_unit::cycle::{ControlLoop, CycleStats, LoopConfig, rt_setup};
use tracer_hal::DriverRegistry;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Line tracer control unit: sensors in, drive frames out
#[derive(Parser, Debug)]
#[command(name = "tracer_control_unit")]
#[command(version)]
#[command(about = "Fixed-rate line following control loop")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the simulation driver (same as `--driver simulation`).
    #[arg(short, long)]
    simulate: bool,

    /// Hardware driver to open.
    #[arg(long, default_value = "linux")]
    driver: String,

    /// Override the tick period in microseconds (0 = unregulated).
    #[arg(long, value_name = "US")]
    cycle_time_us: Option<u64>,

    /// Exit after this many ticks.
    #[arg(long, value_name = "N")]
    max_ticks: Option<u64>,

    /// CPU core to pin the loop thread to (rt builds only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt builds only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn driver_name(&self) -> &str {
        if self.simulate { "simulation" } else { &self.driver }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            cycle_time_us: self.cycle_time_us,
            max_ticks: self.max_ticks,
        }
    }
}

fn main() {
    let args = Args::parse();

    // Config is read first so its log level can seed the filter.
    let loaded = load_config(&args.config, &args.overrides());
    let level = match &loaded {
        Ok(l) => l.config.shared.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_tracing(&args, level);

    info!("Line tracer control unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|loaded| run(&args, loaded));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Line tracer control unit shutdown complete");
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let LoadedConfig { config, from_file } = loaded;
    if from_file {
        info!("Loaded config from {}", args.config.display());
    } else {
        warn!("Config file {} not found, using defaults", args.config.display());
    }
    info!(
        "Config OK: service={}, cycle_time={}µs, bus={}@0x{:02x}",
        config.shared.service_name,
        config.control.cycle_time_us,
        config.bus.device.display(),
        config.bus.address
    );

    // Sensor or bus setup failure here is fatal: the loop never starts.
    let registry = DriverRegistry::with_builtin_drivers();
    let handles = registry.create(args.driver_name(), &config)?;

    rt_setup(args.cpu_core, args.rt_priority)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Release);
    })?;

    let mut control = ControlLoop::new(
        handles.sensors,
        handles.bus,
        LoopConfig::from(&config.control),
    );
    let exit = control.run(&running);
    log_summary(control.stats());

    if let Err(e) = control.close() {
        warn!("Failed to close bus cleanly: {e}");
    }
    info!("Loop ended: {:?}", exit);
    Ok(())
}

fn log_summary(stats: &CycleStats) {
    info!(
        "ticks={} avg={}ns min={}ns max={}ns max_latency={}ns overruns={}",
        stats.ticks,
        stats.avg_tick_ns(),
        if stats.ticks == 0 { 0 } else { stats.min_tick_ns },
        stats.max_tick_ns,
        stats.max_latency_ns,
        stats.overruns
    );
    info!(
        "delivered={} short_writes={} transport_errors={} invalid={} sensor_errors={} fallback={}",
        stats.frames_delivered,
        stats.short_writes,
        stats.transport_errors,
        stats.invalid_commands,
        stats.sensor_errors,
        stats.fallback_ticks
    );
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
