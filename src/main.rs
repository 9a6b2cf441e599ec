//! kspace
//!
//! Lists the parts and ships of an installed Kerbal Space Program and prints
//! per-stage mass and thrust.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kspace::config::GAME_PATH_ENV;
use kspace::{GameConfig, PartCatalog, Ship};

#[derive(Parser)]
#[command(name = "kspace")]
#[command(about = "Reads parts and ships from an installed Kerbal Space Program")]
struct Cli {
    /// Root directory of the game install
    #[arg(short, long, env = GAME_PATH_ENV)]
    game_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all part definitions
    Parts,

    /// List all saved ships
    Ships,

    /// Show engines and stage breakdown for a ship
    Ship {
        /// Ship name as saved in the craft file
        name: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.game_path {
        Some(path) => GameConfig::new(path),
        None => GameConfig::from_env(),
    }
    .context("invalid game path")?;

    let catalog = PartCatalog::load_all(&config).context("failed to load part definitions")?;

    match cli.command {
        Commands::Parts => {
            println!("{:<28} {:<16} {:>8} {:>10}", "Part", "Module", "Mass", "Thrust");
            println!("{}", "-".repeat(65));
            for name in catalog.names() {
                if let Some(part) = catalog.get(name) {
                    println!(
                        "{:<28} {:<16} {:>8.2} {:>10.1}",
                        part.name,
                        part.module.name(),
                        part.mass,
                        part.thrust()
                    );
                }
            }
        }

        Commands::Ships => {
            let ships = Ship::load_all(&config, &catalog).context("failed to load ships")?;
            if ships.is_empty() {
                println!("No ships found in {}", config.ships_dir().display());
            }
            for ship in &ships {
                println!(
                    "{} ({} parts, {} stages)",
                    ship.name,
                    ship.parts().len(),
                    ship.stage_count()
                );
            }
        }

        Commands::Ship { name } => {
            let ships = Ship::load_all(&config, &catalog).context("failed to load ships")?;
            let Some(ship) = ships.iter().find(|s| s.name == name) else {
                bail!("ship '{}' not found", name);
            };
            print_ship(ship);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kspace=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn print_ship(ship: &Ship<'_>) {
    println!("Ship: {} with {} stages", ship.name, ship.stage_count());

    let engines = ship.engines();
    println!("Engines: {}", engines.len());
    for engine in engines {
        println!(
            "  istg {} dstg {} sqor {}  {}",
            engine.inverse_stage,
            engine.decouple_stage,
            engine.stage_order.map_or_else(|| "-".to_string(), |v| v.to_string()),
            engine
        );
    }

    for stage in ship.stages() {
        let list = |parts: Vec<String>| if parts.is_empty() { "-".to_string() } else { parts.join(", ") };
        let mut ignite: Vec<String> = stage.parts().map(|p| p.to_string()).collect();
        let mut detach: Vec<String> = stage.detached().map(|p| p.to_string()).collect();
        let mut thrusters: Vec<String> =
            stage.available_thrusters().iter().map(|p| p.to_string()).collect();
        ignite.sort();
        detach.sort();
        thrusters.sort();

        println!("-------------------");
        println!(
            "stage {} (fires #{}): mass {:.3}, vehicle mass {:.3}",
            stage.game_stage(),
            stage.activation_index() + 1,
            stage.mass(),
            stage.vehicle_mass()
        );
        println!("  ignite:    {}", list(ignite));
        println!("  detach:    {}", list(detach));
        println!("  thrusters: {} ({:.1} total)", list(thrusters), stage.available_thrust());
    }
}
