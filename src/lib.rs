//! Reads ships and parts from an installed copy of Kerbal Space Program.
//!
//! Load the part catalog first, then the ships that reference it:
//!
//! ```no_run
//! use kspace::{GameConfig, PartCatalog, Ship};
//!
//! # fn main() -> kspace::Result<()> {
//! let config = GameConfig::new("C:\\games\\KSP_win")?;
//! let catalog = PartCatalog::load_all(&config)?;
//! let ships = Ship::load_all(&config, &catalog)?;
//!
//! for ship in &ships {
//!     if let Some(launch) = ship.launch_stage() {
//!         println!("{}: {} stages, {:.2} t at launch", ship.name, ship.stage_count(), launch.vehicle_mass());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cfg;
pub mod config;
pub mod craft;
pub mod error;
pub mod part;
pub mod ship;

pub use catalog::PartCatalog;
pub use config::GameConfig;
pub use craft::{CraftFile, CraftPart};
pub use error::{Error, Result};
pub use part::{Part, PartModule};
pub use ship::{Ship, ShipPart, Stage, StageView};
