//! Ships resolved against a part catalog, their stages and derived metrics
//!
//! Staging follows the game's numbering: every part carries the game stage
//! that ignites it (`istg`) and the one that separates it (`dstg`). The
//! highest game stage fires first. [`Ship::stages`] is kept in activation
//! order instead, so index 0 is the launch stage and the last entry is game
//! stage 0.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::PartCatalog;
use crate::config::{self, GameConfig};
use crate::craft::{CraftFile, CraftPart};
use crate::error::{Error, Result};
use crate::part::Part;

/// File extension of saved ships.
pub const CRAFT_EXTENSION: &str = "craft";

/// A part instance placed on a ship. `part` is borrowed from the catalog.
#[derive(Debug, Clone)]
pub struct ShipPart<'c> {
    pub instance_id: String,
    pub part: &'c Part,
    /// Game stage that activates this part (`istg`).
    pub inverse_stage: u32,
    /// Game stage that separates this part (`dstg`).
    pub decouple_stage: u32,
    pub stage_index: Option<i64>,
    pub stage_order: Option<i64>,
    pub attach_mode: Option<i64>,
    pub position: Option<Vec<f64>>,
    pub rotation: Option<Vec<f64>>,
    /// Indices into [`Ship::parts`].
    pub links: Vec<usize>,
    pub attachments: BTreeMap<String, usize>,
    pub surface_attachments: Vec<(String, usize)>,
    pub symmetry: Vec<usize>,
    pub extra: BTreeMap<String, String>,
}

impl ShipPart<'_> {
    pub fn is_engine(&self) -> bool {
        self.part.is_engine()
    }
}

impl fmt::Display for ShipPart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {}>", self.part.name, self.instance_id)
    }
}

/// Parts grouped by the game stage that activates or separates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub game_stage: u32,
    ignition: Vec<usize>,
    detach: Vec<usize>,
}

/// A complete vehicle. Read-only after loading.
#[derive(Debug, Clone)]
pub struct Ship<'c> {
    pub name: String,
    pub version: Option<String>,
    pub source: PathBuf,
    pub extra: BTreeMap<String, String>,
    parts: Vec<ShipPart<'c>>,
    by_id: HashMap<String, usize>,
    /// Activation order: launch stage first.
    stages: Vec<Stage>,
}

impl<'c> Ship<'c> {
    /// Load every `.craft` file under the install's `Ships` directory.
    pub fn load_all(config: &GameConfig, catalog: &'c PartCatalog) -> Result<Vec<Self>> {
        Self::from_dir(&config.ships_dir(), catalog)
    }

    /// Load every `.craft` file below `ships_dir`, in sorted path order.
    /// The first file that fails aborts the load.
    pub fn from_dir(ships_dir: &Path, catalog: &'c PartCatalog) -> Result<Vec<Self>> {
        ensure_loaded(catalog)?;
        config::require_dir(ships_dir)?;

        let mut ships = Vec::new();
        for entry in WalkDir::new(ships_dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == CRAFT_EXTENSION)
            {
                ships.push(Self::load(path, catalog)?);
            }
        }

        info!(count = ships.len(), dir = %ships_dir.display(), "loaded ships");
        Ok(ships)
    }

    /// Load a single craft file.
    pub fn load(path: &Path, catalog: &'c PartCatalog) -> Result<Self> {
        ensure_loaded(catalog)?;
        debug!(file = %path.display(), "reading ship");
        let craft = CraftFile::load(path)?;
        Self::from_craft(craft, catalog)
    }

    /// Resolve a parsed craft file against `catalog`.
    pub fn from_craft(craft: CraftFile, catalog: &'c PartCatalog) -> Result<Self> {
        ensure_loaded(catalog)?;
        let name = craft.name();
        let path = craft.path;

        let by_id: HashMap<String, usize> = craft
            .parts
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.instance_id.clone(), idx))
            .collect();

        let parts = craft
            .parts
            .into_iter()
            .map(|raw| resolve_part(raw, &path, catalog, &by_id))
            .collect::<Result<Vec<_>>>()?;

        let stages = group_stages(&parts);

        Ok(Self {
            name,
            version: craft.version,
            source: path,
            extra: craft.extra,
            parts,
            by_id,
            stages,
        })
    }

    pub fn parts(&self) -> &[ShipPart<'c>] {
        &self.parts
    }

    /// Look up a part instance by its id, e.g. `fuelTank_4293372840`.
    pub fn part(&self, instance_id: &str) -> Option<&ShipPart<'c>> {
        self.by_id.get(instance_id).map(|&idx| &self.parts[idx])
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Stages in activation order.
    pub fn stages(&self) -> impl ExactSizeIterator<Item = StageView<'_, 'c>> {
        self.stages.iter().map(move |stage| StageView { ship: self, stage })
    }

    /// Stage at `activation_index` (0 = launch).
    pub fn stage(&self, activation_index: usize) -> Option<StageView<'_, 'c>> {
        self.stages
            .get(activation_index)
            .map(|stage| StageView { ship: self, stage })
    }

    /// Look a stage up by its game stage number.
    pub fn game_stage(&self, game_stage: u32) -> Option<StageView<'_, 'c>> {
        self.stage(self.activation_index(game_stage)?)
    }

    /// The stage that fires first.
    pub fn launch_stage(&self) -> Option<StageView<'_, 'c>> {
        self.stage(0)
    }

    /// Every engine on the ship, ordered by (istg, dstg, sqor, id).
    pub fn engines(&self) -> Vec<&ShipPart<'c>> {
        let mut engines: Vec<&ShipPart<'c>> = self.parts.iter().filter(|p| p.is_engine()).collect();
        engines.sort_by(|a, b| {
            (a.inverse_stage, a.decouple_stage, a.stage_order, &a.instance_id).cmp(&(
                b.inverse_stage,
                b.decouple_stage,
                b.stage_order,
                &b.instance_id,
            ))
        });
        engines
    }

    /// Activation index of a game stage number, if the ship has that stage.
    pub fn activation_index(&self, game_stage: u32) -> Option<usize> {
        let count = self.stages.len();
        let game_stage = game_stage as usize;
        (game_stage < count).then(|| count - 1 - game_stage)
    }

    /// Whether `part` provides thrust while the stage at `activation_index`
    /// is the current one: it must be an engine, its ignition stage must
    /// already have fired and its separation stage must not have.
    pub fn is_available(&self, part: &ShipPart<'_>, activation_index: usize) -> bool {
        let fired = |game_stage: u32| {
            self.activation_index(game_stage)
                .is_some_and(|idx| idx <= activation_index)
        };
        part.is_engine() && fired(part.inverse_stage) && !fired(part.decouple_stage)
    }
}

impl fmt::Display for Ship<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Ship {}>", self.name)
    }
}

/// A stage together with the ship it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct StageView<'s, 'c> {
    ship: &'s Ship<'c>,
    stage: &'s Stage,
}

impl<'s, 'c> StageView<'s, 'c> {
    /// Position in activation order (0 = launch).
    pub fn activation_index(&self) -> usize {
        self.ship
            .activation_index(self.stage.game_stage)
            .unwrap_or_default()
    }

    pub fn game_stage(&self) -> u32 {
        self.stage.game_stage
    }

    /// Parts this stage activates.
    pub fn parts(&self) -> impl Iterator<Item = &'s ShipPart<'c>> + use<'s, 'c> {
        let ship = self.ship;
        self.stage.ignition.iter().map(move |&idx| &ship.parts[idx])
    }

    /// Parts this stage separates from the vehicle.
    pub fn detached(&self) -> impl Iterator<Item = &'s ShipPart<'c>> + use<'s, 'c> {
        let ship = self.ship;
        self.stage.detach.iter().map(move |&idx| &ship.parts[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.stage.ignition.is_empty()
    }

    /// Sum of the catalog mass of the parts this stage activates. This is
    /// the part.cfg `mass`, so tanks count with their fuel aboard.
    pub fn mass(&self) -> f64 {
        self.parts().map(|p| p.part.mass).sum()
    }

    /// Like [`mass`](Self::mass) but with fuel spent.
    pub fn dry_mass(&self) -> f64 {
        self.parts().map(|p| p.part.dry_mass()).sum()
    }

    /// Mass of this stage plus every stage that activates after it; the
    /// vehicle mass at the moment this stage fires.
    pub fn vehicle_mass(&self) -> f64 {
        self.ship
            .stages()
            .skip(self.activation_index())
            .map(|stage| stage.mass())
            .sum()
    }

    /// Engines providing thrust while this is the current stage.
    pub fn available_thrusters(&self) -> Vec<&'s ShipPart<'c>> {
        let index = self.activation_index();
        self.ship
            .parts
            .iter()
            .filter(|p| self.ship.is_available(p, index))
            .collect()
    }

    pub fn available_thrust(&self) -> f64 {
        self.available_thrusters()
            .iter()
            .map(|p| p.part.thrust())
            .sum()
    }
}

fn ensure_loaded(catalog: &PartCatalog) -> Result<()> {
    if catalog.is_empty() {
        Err(Error::CatalogNotLoaded)
    } else {
        Ok(())
    }
}

fn resolve_part<'c>(
    raw: CraftPart,
    path: &Path,
    catalog: &'c PartCatalog,
    by_id: &HashMap<String, usize>,
) -> Result<ShipPart<'c>> {
    let part = catalog
        .get(&raw.part_name)
        .ok_or_else(|| Error::UnresolvedReference {
            path: path.to_path_buf(),
            part: raw.part_name.clone(),
        })?;

    let line = raw.line;
    let link = |id: &str| {
        by_id.get(id).copied().ok_or_else(|| {
            Error::parse(
                path,
                Some(line),
                format!("{} links to unknown part instance '{id}'", raw.instance_id),
            )
        })
    };

    let links = raw.links.iter().map(|id| link(id)).collect::<Result<Vec<_>>>()?;
    let symmetry = raw.symmetry.iter().map(|id| link(id)).collect::<Result<Vec<_>>>()?;
    let attachments = raw
        .attachments
        .iter()
        .map(|(node, id)| link(id).map(|idx| (node.clone(), idx)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    let surface_attachments = raw
        .surface_attachments
        .iter()
        .map(|(node, id)| link(id).map(|idx| (node.clone(), idx)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ShipPart {
        instance_id: raw.instance_id,
        part,
        inverse_stage: raw.inverse_stage,
        decouple_stage: raw.decouple_stage,
        stage_index: raw.stage_index,
        stage_order: raw.stage_order,
        attach_mode: raw.attach_mode,
        position: raw.position,
        rotation: raw.rotation,
        links,
        attachments,
        surface_attachments,
        symmetry,
        extra: raw.extra,
    })
}

/// One stage per game number from 0 to the highest `istg`/`dstg` in use,
/// returned in activation order.
fn group_stages(parts: &[ShipPart<'_>]) -> Vec<Stage> {
    let Some(highest) = parts
        .iter()
        .map(|p| p.inverse_stage.max(p.decouple_stage))
        .max()
    else {
        return Vec::new();
    };

    let mut stages: Vec<Stage> = (0..=highest)
        .rev()
        .map(|game_stage| Stage {
            game_stage,
            ignition: Vec::new(),
            detach: Vec::new(),
        })
        .collect();

    // index = highest - game stage, so the launch stage comes first
    for (idx, part) in parts.iter().enumerate() {
        stages[(highest - part.inverse_stage) as usize].ignition.push(idx);
        stages[(highest - part.decouple_stage) as usize].detach.push(idx);
    }
    stages
}
