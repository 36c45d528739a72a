use anyhow::{Context, Result};
use formica_core::scenario::{populate_random, populate_test_scenario};
use formica_core::{AppConfig, Metrics, TickOutcome, World};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Initial map of a new run.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scenario {
    /// Walled arena with two facing nests and three food piles
    #[default]
    Test,
    /// Nests on the middle row, scattered walls and food
    Random,
    /// Blank grid without nests, so no agents either
    Empty,
}

/// On-disk encoding used by `--load` and `--save`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveFormat {
    /// Compact binary save file without trails or tick
    #[default]
    Binary,
    /// rkyv archive of the complete world
    Rkyv,
    /// Human-readable JSON of the complete world
    Json,
}

impl SaveFormat {
    pub fn save<P: AsRef<Path>>(self, world: &World, path: P) -> Result<()> {
        let path = path.as_ref();
        match self {
            SaveFormat::Binary => formica_io::save_world(world, path)?,
            SaveFormat::Rkyv => formica_io::persistence::save_snapshot(world, path)?,
            SaveFormat::Json => formica_io::save_world_json(world, path)?,
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(self, config: AppConfig, path: P) -> Result<World> {
        let path = path.as_ref();
        let world = match self {
            SaveFormat::Binary => formica_io::load_world(config, path)?,
            SaveFormat::Rkyv => formica_io::persistence::load_snapshot(config, path)?,
            SaveFormat::Json => formica_io::load_world_json(config, path)?,
        };
        Ok(world)
    }
}

/// Why [`App::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxTicks,
    FoodExhausted,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub ticks: u64,
    pub delivered: u64,
    pub remaining: u64,
    pub agents: usize,
    pub mean_tick: Duration,
}

/// Reads `path` when it exists, otherwise falls back to the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => AppConfig::from_toml(&content)
            .with_context(|| format!("invalid configuration in {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// A fresh world laid out by `scenario` with its initial agents spawned.
pub fn build_world(config: AppConfig, scenario: Scenario) -> Result<World> {
    let mut world = World::new(config).context("failed to create world")?;
    match scenario {
        Scenario::Test => populate_test_scenario(&mut world)?,
        Scenario::Random => populate_random(&mut world)?,
        Scenario::Empty => {}
    }
    world.spawn_initial_agents();
    Ok(world)
}

/// Headless loop driver: owns the world and decides when a run is over.
pub struct App {
    pub world: World,
    pub metrics: Metrics,
    pub max_ticks: u64,
    pub stats_interval: u64,
    pub stats_path: Option<PathBuf>,
}

impl App {
    pub fn new(world: World) -> Self {
        let max_ticks = world.config().world.max_ticks;
        let stats_interval = world.config().stats_interval;
        Self {
            world,
            metrics: Metrics::new(),
            max_ticks,
            stats_interval,
            stats_path: None,
        }
    }

    pub fn with_statistics<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.stats_path = Some(path.into());
        self
    }

    /// Advances one tick and handles the periodic bookkeeping.
    pub fn step(&mut self) -> Result<TickOutcome> {
        let started = Instant::now();
        let outcome = self.world.update();
        if let TickOutcome::Advanced(report) = &outcome {
            self.metrics.record_tick(
                started.elapsed(),
                report,
                self.world.agent_count(),
                self.world.remaining_food(),
            );
            if report.tick.is_multiple_of(self.stats_interval) {
                self.write_statistics()?;
            }
        }
        Ok(outcome)
    }

    /// Runs until the tick limit, food exhaustion, or the world stops ticking.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.metrics.log_event("run_started", &self.world.config().fingerprint());
        let reason = loop {
            if let Some(reason) = self.finished() {
                break reason;
            }
            match self.step()? {
                TickOutcome::Advanced(_) => {}
                TickOutcome::Paused => break StopReason::Paused,
                TickOutcome::Stopped => break StopReason::Stopped,
            }
        };

        if matches!(reason, StopReason::MaxTicks | StopReason::FoodExhausted) {
            self.world.stop();
        }
        if self.stats_path.is_some() && !self.world.tick().is_multiple_of(self.stats_interval) {
            self.write_statistics()?;
        }

        let summary = self.summary(reason);
        tracing::info!(reason = ?summary.reason, ticks = summary.ticks, delivered = summary.delivered, "Run finished");
        Ok(summary)
    }

    fn finished(&self) -> Option<StopReason> {
        if self.world.tick() >= self.max_ticks {
            Some(StopReason::MaxTicks)
        } else if self.world.is_food_exhausted() {
            Some(StopReason::FoodExhausted)
        } else {
            None
        }
    }

    fn write_statistics(&self) -> Result<()> {
        if let Some(path) = &self.stats_path {
            formica_io::append_statistics(&self.world, path)
                .with_context(|| format!("failed to append statistics to {}", path.display()))?;
        }
        Ok(())
    }

    pub fn summary(&self, reason: StopReason) -> RunSummary {
        RunSummary {
            reason,
            ticks: self.world.tick(),
            delivered: self.world.delivered_food(),
            remaining: self.world.remaining_food(),
            agents: self.world.agent_count(),
            mean_tick: self.metrics.mean_tick_duration(),
        }
    }
}
