use anyhow::{Context, Result};
use clap::Parser;
use formica_lib::app::{build_world, load_config, App, SaveFormat, Scenario};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Initial map when not loading a save file
    #[arg(short, long, value_enum, default_value = "test")]
    scenario: Scenario,

    /// RNG seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of ticks, overrides the config file
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Resume from a binary save file
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a binary save file when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Encoding of the --load and --save files
    #[arg(short, long, value_enum, default_value = "binary")]
    format: SaveFormat,

    /// Append per-colony statistics to this CSV file
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    formica_core::init_logging("info");

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    if let Some(ticks) = args.ticks {
        config.world.max_ticks = ticks;
    }
    config.validate()?;

    let world = match &args.load {
        Some(path) => args
            .format
            .load(config, path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => build_world(config, args.scenario)?,
    };

    let mut app = App::new(world);
    if let Some(path) = args.stats {
        app = app.with_statistics(path);
    }

    let summary = app.run()?;
    println!(
        "Finished after {} ticks ({:?}): {} food delivered, {} left on the map, {} agents alive",
        summary.ticks, summary.reason, summary.delivered, summary.remaining, summary.agents
    );
    for colony in app.world.colonies() {
        println!(
            "  colony {}: collected {}, agents {}, active {}, efficiency {:.2}",
            colony.id(),
            colony.food_collected(),
            colony.total_count(),
            colony.active_count(),
            colony.efficiency_score()
        );
    }

    if let Some(path) = &args.save {
        args.format
            .save(&app.world, path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
