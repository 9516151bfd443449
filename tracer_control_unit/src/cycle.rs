//! Fixed-rate control loop: sense → decide → actuate → remember.
//!
//! ## Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Tick Cadence
//! The loop busy-polls the monotonic clock until the next tick boundary
//! instead of sleeping. Boundaries advance by exactly one period so timing
//! does not drift; after an overrun the schedule resyncs to "now" rather than
//! firing a burst of catch-up ticks. A period of zero runs ticks back to back.
//!
//! ## Shutdown
//! The running flag is checked before every tick and while waiting. On exit
//! a stop frame is sent unless `stop_on_shutdown` is off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracer_common::config::ControlConfig;
use tracer_common::hal::driver::{BusHandle, HalError, SensorSource};
use tracer_common::sensor::SensorState;
use tracing::{debug, error, info, trace, warn};

use crate::actuation::{ActuationEncoder, ActuationError};
use crate::decision::{Decision, DecisionEngine, TableKind};
use crate::hysteresis::HysteresisStore;

/// Warnings of one kind are logged for the first 10 occurrences, then every 1000th.
#[inline]
fn should_report(count: u64) -> bool {
    count <= 10 || count % 1000 == 0
}

#[inline]
fn as_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing and delivery statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub ticks: u64,
    /// Last tick duration [ns].
    pub last_tick_ns: i64,
    /// Minimum tick duration [ns].
    pub min_tick_ns: i64,
    /// Maximum tick duration [ns].
    pub max_tick_ns: i64,
    /// Running sum for average computation.
    pub sum_tick_ns: i64,
    /// Ticks whose body took longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (scheduled boundary → tick start).
    pub max_latency_ns: i64,
    /// Drive frames the bus accepted in full.
    pub frames_delivered: u64,
    /// Drive frames the bus accepted only partially.
    pub short_writes: u64,
    /// Drive frames the bus rejected.
    pub transport_errors: u64,
    /// Commands the encoder refused as out of range.
    pub invalid_commands: u64,
    /// Sensor reads that failed and were treated as "line lost".
    pub sensor_errors: u64,
    /// Ticks decided from the fallback table.
    pub fallback_ticks: u64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            last_tick_ns: 0,
            min_tick_ns: i64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
            frames_delivered: 0,
            short_writes: 0,
            transport_errors: 0,
            invalid_commands: 0,
            sensor_errors: 0,
            fallback_ticks: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.ticks += 1;
        self.last_tick_ns = duration_ns;
        if duration_ns < self.min_tick_ns {
            self.min_tick_ns = duration_ns;
        }
        if duration_ns > self.max_tick_ns {
            self.max_tick_ns = duration_ns;
        }
        self.sum_tick_ns = self.sum_tick_ns.saturating_add(duration_ns);
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Average tick time [ns] (returns 0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> i64 {
        if self.ticks == 0 {
            0
        } else {
            self.sum_tick_ns / self.ticks as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Loop Configuration ─────────────────────────────────────────────

/// Runtime parameters of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Tick period; zero means unregulated.
    pub period: Duration,
    /// Send a stop frame when the loop exits.
    pub stop_on_shutdown: bool,
    /// Exit after this many ticks.
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from(&ControlConfig::default())
    }
}

impl From<&ControlConfig> for LoopConfig {
    fn from(config: &ControlConfig) -> Self {
        Self {
            period: Duration::from_micros(config.cycle_time_us),
            stop_on_shutdown: config.stop_on_shutdown,
            max_ticks: config.max_ticks,
        }
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors while preparing the loop thread.
#[derive(Debug, Error)]
pub enum LoopError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), LoopError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| LoopError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), LoopError> {
    Ok(())
}

/// Touch a stack buffer so its pages are resident before the first tick.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), LoopError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| LoopError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| LoopError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), LoopError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), LoopError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(LoopError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), LoopError> {
    Ok(())
}

/// Prepare the calling thread for the control loop.
///
/// Without the `rt` feature only the stack prefault runs.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), LoopError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    debug!(
        "RT setup done (core {}, priority {}, rt feature {})",
        cpu_core,
        rt_priority,
        cfg!(feature = "rt")
    );
    Ok(())
}

// ─── Control Loop ───────────────────────────────────────────────────

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Raw sensor reading (all-false if the read failed).
    pub raw: SensorState,
    /// Decision taken.
    pub decision: Decision,
    /// Delivery result of the drive frame.
    pub outcome: Result<(), ActuationError>,
}

/// Why [`ControlLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The running flag was cleared.
    Cancelled,
    /// `max_ticks` ticks were executed.
    TickLimit,
}

/// The control loop. Sole owner of the sensor source, the bus and the
/// hysteresis store.
pub struct ControlLoop<S: SensorSource, B: BusHandle> {
    sensors: S,
    encoder: ActuationEncoder<B>,
    engine: DecisionEngine,
    hysteresis: HysteresisStore,
    config: LoopConfig,
    stats: CycleStats,
}

impl<S: SensorSource, B: BusHandle> ControlLoop<S, B> {
    /// Create a loop with an empty hysteresis store.
    pub fn new(sensors: S, bus: B, config: LoopConfig) -> Self {
        Self {
            sensors,
            encoder: ActuationEncoder::new(bus),
            engine: DecisionEngine::new(),
            hysteresis: HysteresisStore::new(),
            config,
            stats: CycleStats::new(),
        }
    }

    /// Execute one tick immediately.
    ///
    /// Delivery failures are counted and logged; they never stop the loop.
    pub fn tick(&mut self) -> TickReport {
        self.step(0)
    }

    fn step(&mut self, latency_ns: i64) -> TickReport {
        let start = Instant::now();

        let raw = self.read_sensors();
        let decision = self.engine.decide(raw, &self.hysteresis);
        if decision.table == TableKind::Fallback {
            self.stats.fallback_ticks += 1;
        }
        trace!(
            "tick {}: raw={} effective={} table={:?} speeds=({}, {})",
            self.stats.ticks + 1,
            raw,
            decision.effective,
            decision.table,
            decision.command.left_speed,
            decision.command.right_speed
        );

        let outcome = self.encoder.drive(&decision.command);
        self.hysteresis.record(decision.effective);
        self.account(&outcome);

        let duration_ns = as_nanos(start.elapsed());
        self.stats.record(duration_ns, latency_ns);
        if !self.config.period.is_zero() && duration_ns > as_nanos(self.config.period) {
            self.stats.overruns += 1;
            if should_report(self.stats.overruns) {
                warn!(
                    "Tick overrun: {}ns > {}ns period (total {})",
                    duration_ns,
                    as_nanos(self.config.period),
                    self.stats.overruns
                );
            }
        }

        TickReport {
            raw,
            decision,
            outcome,
        }
    }

    fn read_sensors(&mut self) -> SensorState {
        match self.sensors.read_sensors() {
            Ok(state) => state,
            Err(e) => {
                self.stats.sensor_errors += 1;
                if should_report(self.stats.sensor_errors) {
                    warn!(
                        "Sensor read failed, treating as line lost: {} (total {})",
                        e, self.stats.sensor_errors
                    );
                }
                SensorState::LOST
            }
        }
    }

    fn account(&mut self, outcome: &Result<(), ActuationError>) {
        let Err(e) = outcome else {
            self.stats.frames_delivered += 1;
            return;
        };
        match e {
            ActuationError::ShortWrite { .. } => {
                self.stats.short_writes += 1;
                if should_report(self.stats.short_writes) {
                    warn!(
                        "Command not guaranteed delivered: {} (total {})",
                        e, self.stats.short_writes
                    );
                }
            }
            ActuationError::Transport(_) => {
                self.stats.transport_errors += 1;
                if should_report(self.stats.transport_errors) {
                    warn!(
                        "Command not delivered: {} (total {})",
                        e, self.stats.transport_errors
                    );
                }
            }
            ActuationError::InvalidCommand { .. } => {
                self.stats.invalid_commands += 1;
                error!("Decision produced an unencodable command: {}", e);
            }
        }
    }

    /// Run ticks until `running` is cleared or `max_ticks` is reached.
    ///
    /// The first tick fires one period after the call. The stop frame is
    /// sent on exit when `stop_on_shutdown` is set.
    pub fn run(&mut self, running: &AtomicBool) -> LoopExit {
        let period = self.config.period;
        info!(
            "Control loop started (period {}us, max ticks {:?})",
            period.as_micros(),
            self.config.max_ticks
        );

        let mut next = Instant::now() + period;
        let exit = loop {
            if !running.load(Ordering::Acquire) {
                break LoopExit::Cancelled;
            }
            if self.config.max_ticks.is_some_and(|max| self.stats.ticks >= max) {
                break LoopExit::TickLimit;
            }

            let latency_ns = if period.is_zero() {
                0
            } else {
                if !wait_until(next, running) {
                    break LoopExit::Cancelled;
                }
                as_nanos(Instant::now().saturating_duration_since(next))
            };

            self.step(latency_ns);

            if !period.is_zero() {
                next += period;
                let now = Instant::now();
                if next < now {
                    next = now;
                }
            }

            if self.stats.ticks % 1000 == 0 {
                debug!(
                    "ticks={} avg={}ns max={}ns overruns={} delivered={} fallback={}",
                    self.stats.ticks,
                    self.stats.avg_tick_ns(),
                    self.stats.max_tick_ns,
                    self.stats.overruns,
                    self.stats.frames_delivered,
                    self.stats.fallback_ticks
                );
            }
        };

        if self.config.stop_on_shutdown {
            let _ = self.send_stop();
        }
        info!("Control loop exited ({:?}) after {} ticks", exit, self.stats.ticks);
        exit
    }

    /// Send the stop frame, logging the outcome.
    pub fn send_stop(&mut self) -> Result<(), ActuationError> {
        let result = self.encoder.stop();
        match &result {
            Ok(()) => info!("Stop frame sent"),
            Err(e) => warn!("Stop frame not delivered: {}", e),
        }
        result
    }

    /// Release the bus.
    pub fn close(&mut self) -> Result<(), HalError> {
        self.encoder.close()
    }

    /// Current hysteresis store.
    pub fn hysteresis(&self) -> &HysteresisStore {
        &self.hysteresis
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// The sensor source.
    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// The bus.
    pub fn bus(&self) -> &B {
        self.encoder.bus()
    }
}

/// Busy-poll until `deadline`. Returns false if `running` was cleared first.
fn wait_until(deadline: Instant, running: &AtomicBool) -> bool {
    while Instant::now() < deadline {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        std::hint::spin_loop();
    }
    true
}

// ─── Tests ──────────────────────────────────────────────────────────
