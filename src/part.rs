//! Part definitions read from `Parts/<dir>/part.cfg`

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::trace;

use crate::cfg::{self, Field, LineKind};
use crate::error::{Error, Result};

/// The `module` a part definition declares; decides how the game treats it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartModule {
    CommandPod,
    SASModule,
    AdvSASModule,
    FuelTank,
    RCSFuelTank,
    Parachutes,
    Decoupler,
    RadialDecoupler,
    Strut,
    RCSModule,
    SolidRocket,
    LiquidEngine,
    LandingLeg,
    StrutConnector,
    FuelLine,
    Winglet,
    ControlSurface,
    /// A module this crate has no special knowledge of.
    Other(String),
}

impl PartModule {
    pub fn from_name(name: &str) -> Self {
        match name {
            "CommandPod" => Self::CommandPod,
            "SASModule" => Self::SASModule,
            "AdvSASModule" => Self::AdvSASModule,
            "FuelTank" => Self::FuelTank,
            "RCSFuelTank" => Self::RCSFuelTank,
            "Parachutes" => Self::Parachutes,
            "Decoupler" => Self::Decoupler,
            "RadialDecoupler" => Self::RadialDecoupler,
            "Strut" => Self::Strut,
            "RCSModule" => Self::RCSModule,
            "SolidRocket" => Self::SolidRocket,
            "LiquidEngine" => Self::LiquidEngine,
            "LandingLeg" => Self::LandingLeg,
            "StrutConnector" => Self::StrutConnector,
            "FuelLine" => Self::FuelLine,
            "Winglet" => Self::Winglet,
            "ControlSurface" => Self::ControlSurface,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CommandPod => "CommandPod",
            Self::SASModule => "SASModule",
            Self::AdvSASModule => "AdvSASModule",
            Self::FuelTank => "FuelTank",
            Self::RCSFuelTank => "RCSFuelTank",
            Self::Parachutes => "Parachutes",
            Self::Decoupler => "Decoupler",
            Self::RadialDecoupler => "RadialDecoupler",
            Self::Strut => "Strut",
            Self::RCSModule => "RCSModule",
            Self::SolidRocket => "SolidRocket",
            Self::LiquidEngine => "LiquidEngine",
            Self::LandingLeg => "LandingLeg",
            Self::StrutConnector => "StrutConnector",
            Self::FuelLine => "FuelLine",
            Self::Winglet => "Winglet",
            Self::ControlSurface => "ControlSurface",
            Self::Other(name) => name,
        }
    }

    /// Engines are the only thrust-producing modules.
    pub fn is_engine(&self) -> bool {
        matches!(self, Self::SolidRocket | Self::LiquidEngine)
    }
}

impl fmt::Display for PartModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Numeric attributes kept by name rather than as dedicated fields.
const FLOAT_KEYS: &[&str] = &[
    "scale",
    "specPower",
    "rimFalloff",
    "alphaCutoff",
    "maximum_drag",
    "minimum_drag",
    "angularDrag",
    "crashTolerance",
    "maxTemp",
    "breakingForce",
    "breakingTorque",
    "explosionPotential",
    "fullExplosionPotential",
    "emptyExplosionPotential",
    "torque",
    "maxTorque",
    "Ki",
    "Kd",
    "Kp",
    "linPower",
    "rotPower",
    "autoDeployDelay",
    "minAirPressureToOpen",
    "deployAltitude",
    "closedDrag",
    "semiDeployedDrag",
    "fullyDeployedDrag",
    "ejectionForce",
    "heatProduction",
    "gimbalRange",
    "extensionTime",
    "retractTime",
    "pivotingAngle",
    "linearStrength",
    "angularStrength",
    "maxLength",
    "dragCoeff",
    "deflectionLiftCoeff",
    "ctrlSurfaceRange",
    "ctrlSurfaceArea",
    "stageOffset",
    "childStageOffset",
    "stackSymmetry",
];

const VECTOR_KEYS: &[&str] = &[
    "iconCenter",
    "iconScale",
    "thrustCenter",
    "thrustVector",
    "thrustVector0",
    "thrustVector1",
    "thrustVector2",
    "thrustVector3",
    "pivotAxis",
];

const FLAG_KEYS: &[&str] = &["thrustVectoringCapable", "useAGL"];

/// A static part definition. Immutable once loaded; ships borrow it from
/// the [`PartCatalog`](crate::PartCatalog).
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Catalog identifier (`name` in part.cfg).
    pub name: String,
    pub module: PartModule,
    pub title: Option<String>,
    pub manufacturer: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub subcategory: Option<i64>,
    pub cost: f64,
    /// Mass as listed in part.cfg, i.e. with any stored fuel on board.
    pub mass: f64,
    pub dry_mass_attr: Option<f64>,
    pub fuel: Option<f64>,
    pub internal_fuel: Option<f64>,
    /// Thrust of a solid rocket.
    pub solid_thrust: Option<f64>,
    pub max_thrust: Option<f64>,
    pub min_thrust: Option<f64>,
    pub fuel_consumption: Option<f64>,
    pub attach_rules: Vec<i64>,
    pub node_attach: Option<Vec<f64>>,
    /// `node_stack_<name>` entries keyed by `<name>`.
    pub node_stack: BTreeMap<String, Vec<f64>>,
    pub fuel_cross_feed: bool,
    pub stage_before: bool,
    pub stage_after: bool,
    pub numbers: BTreeMap<String, f64>,
    pub vectors: BTreeMap<String, Vec<f64>>,
    pub flags: BTreeMap<String, bool>,
    /// Attributes with no typed reader, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Part {
    /// Empty definition for the given name and module.
    pub fn new(name: impl Into<String>, module: PartModule) -> Self {
        Self {
            name: name.into(),
            module,
            title: None,
            manufacturer: None,
            author: None,
            description: None,
            category: None,
            subcategory: None,
            cost: 0.0,
            mass: 0.0,
            dry_mass_attr: None,
            fuel: None,
            internal_fuel: None,
            solid_thrust: None,
            max_thrust: None,
            min_thrust: None,
            fuel_consumption: None,
            attach_rules: Vec::new(),
            node_attach: None,
            node_stack: BTreeMap::new(),
            fuel_cross_feed: false,
            stage_before: false,
            stage_after: false,
            numbers: BTreeMap::new(),
            vectors: BTreeMap::new(),
            flags: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Read and parse a part.cfg file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse part.cfg text. `path` is only used for error reporting.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut part = Part::new(String::new(), PartModule::Other(String::new()));
        let mut name = None;
        let mut module = None;

        // Entries at the top level, or directly inside an outer `PART` block,
        // describe the part. Deeper MODULE/RESOURCE blocks carry their own
        // `name` keys and are skipped.
        let mut header = None;
        let mut opened_at: Vec<(usize, bool)> = Vec::new();
        for line in cfg::lines(text) {
            let (key, value) = match line.kind {
                LineKind::Header(block) => {
                    header = Some(block);
                    continue;
                }
                LineKind::Open => {
                    let is_part = opened_at.is_empty() && header == Some("PART");
                    opened_at.push((line.number, is_part));
                    header = None;
                    continue;
                }
                LineKind::Close => {
                    if opened_at.pop().is_none() {
                        return Err(Error::parse(path, Some(line.number), "unmatched '}'"));
                    }
                    header = None;
                    continue;
                }
                LineKind::Entry { key, value } => {
                    header = None;
                    match opened_at.as_slice() {
                        [] | [(_, true)] => (key, value),
                        _ => continue,
                    }
                }
                LineKind::Other(_) => continue,
            };
            let field = Field::new(path, line.number, key, value);
            match key {
                "name" => name = Some(field.string()),
                "module" => module = Some(PartModule::from_name(value)),
                _ => part.read_attribute(&field)?,
            }
        }

        if let Some(&(open, _)) = opened_at.first() {
            return Err(Error::parse(path, Some(open), "block is never closed"));
        }

        part.name = name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::parse(path, None, "missing 'name'"))?;
        part.module = module.ok_or_else(|| Error::parse(path, None, "missing 'module'"))?;
        Ok(part)
    }

    fn read_attribute(&mut self, field: &Field<'_>) -> Result<()> {
        let key = field.key;
        if let Some(node) = key.strip_prefix("node_stack_") {
            self.node_stack.insert(node.to_string(), field.floats()?);
            return Ok(());
        }
        if key.starts_with("fx_") || key.starts_with("sound_") {
            return Ok(());
        }

        match key {
            "title" => self.title = Some(field.string()),
            "manufacturer" => self.manufacturer = Some(field.string()),
            "author" => self.author = Some(field.string()),
            "description" => self.description = Some(field.string()),
            "category" => self.category = Some(field.int()?),
            "subcategory" => self.subcategory = Some(field.int()?),
            "cost" => self.cost = field.float()?,
            "mass" => self.mass = field.float()?,
            "dryMass" => self.dry_mass_attr = Some(field.float()?),
            "fuel" => self.fuel = Some(field.float()?),
            "internalFuel" => self.internal_fuel = Some(field.float()?),
            "thrust" => self.solid_thrust = Some(field.float()?),
            "maxThrust" => self.max_thrust = Some(field.float()?),
            "minThrust" => self.min_thrust = Some(field.float()?),
            "fuelConsumption" => self.fuel_consumption = Some(field.float()?),
            "attachRules" => self.attach_rules = field.ints()?,
            "node_attach" => self.node_attach = Some(field.floats()?),
            "fuelCrossFeed" => self.fuel_cross_feed = field.boolean(),
            "stageBefore" => self.stage_before = field.boolean(),
            "stageAfter" => self.stage_after = field.boolean(),
            k if FLOAT_KEYS.contains(&k) => {
                self.numbers.insert(k.to_string(), field.float()?);
            }
            k if VECTOR_KEYS.contains(&k) => {
                self.vectors.insert(k.to_string(), field.floats()?);
            }
            k if FLAG_KEYS.contains(&k) => {
                self.flags.insert(k.to_string(), field.boolean());
            }
            _ => {
                trace!(file = %field.path.display(), key, "unrecognised part attribute");
                self.extra.insert(key.to_string(), field.string());
            }
        }
        Ok(())
    }

    pub fn is_engine(&self) -> bool {
        self.module.is_engine()
    }

    /// Thrust the part produces when ignited; zero for non-engines.
    pub fn thrust(&self) -> f64 {
        match self.module {
            PartModule::SolidRocket => self.solid_thrust.unwrap_or(0.0),
            PartModule::LiquidEngine => self.max_thrust.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Mass with fuel spent; equals `mass` for parts that carry none.
    pub fn dry_mass(&self) -> f64 {
        self.dry_mass_attr.unwrap_or(self.mass)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.module, self.name)
    }
}
