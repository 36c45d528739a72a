//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and running totals for monitoring long
//! headless runs.

use crate::world::TickReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Ticks between two summary lines.
const LOG_EVERY: u64 = 1000;

/// Metrics collector for simulation statistics.
pub struct Metrics {
    tick_count: AtomicU64,
    agent_count: AtomicU64,
    food_remaining: AtomicU64,
    pickups: AtomicU64,
    deliveries: AtomicU64,
    deaths: AtomicU64,
    busy_nanos: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            food_remaining: AtomicU64::new(0),
            pickups: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, report: &TickReport, agents: usize, food: u64) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.agent_count.store(agents as u64, Ordering::Relaxed);
        self.food_remaining.store(food, Ordering::Relaxed);
        self.pickups
            .fetch_add(u64::from(report.pickups), Ordering::Relaxed);
        self.deliveries
            .fetch_add(u64::from(report.deliveries), Ordering::Relaxed);
        self.deaths
            .fetch_add(u64::from(report.deaths), Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);

        // Log at info level every 1000 ticks
        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick.is_multiple_of(LOG_EVERY) {
            tracing::info!(
                tick = report.tick,
                agents = agents,
                food = food,
                deliveries = self.deliveries(),
                deaths = self.deaths(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    /// Gets the number of recorded ticks.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_remaining(&self) -> u64 {
        self.food_remaining.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn pickups(&self) -> u64 {
        self.pickups.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    /// Mean time spent inside `World::update`.
    #[must_use]
    pub fn mean_tick_duration(&self) -> Duration {
        let ticks = self.tick_count();
        if ticks == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed) / ticks)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs a simulation event.
    pub fn log_event(&self, event_type: &str, details: &str) {
        tracing::info!(
            event_type = event_type,
            details = details,
            "Simulation event"
        );
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG` and falls back to `default_filter`. Safe to call more
/// than once; later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}
