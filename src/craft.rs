//! Raw `.craft` file contents, before part names are resolved
//!
//! A craft file starts with ship-level entries (`ship`, `version`, ...)
//! followed by one block per part instance:
//!
//! ```text
//! ship = Kerbal X
//! version = 0.14.2
//! {
//!     part = liquidEngine_4293374216
//!     istg = 1
//!     dstg = 1
//!     attN = top, fuelTank_4293372840
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::cfg::{self, Field, LineKind};
use crate::error::{Error, Result};

// Pattern: liquidEngine_4293374216  (part name, then '_' and a numeric uid)
/// Highest `istg`/`dstg` a part may carry. Ships get one stage per number
/// up to the highest in use, so larger values are treated as corrupt input.
pub const MAX_STAGE: u32 = 1024;

static INSTANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_(\d+)$").expect("instance pattern is valid"));

/// A parsed craft file.
#[derive(Debug, Clone, Default)]
pub struct CraftFile {
    pub path: PathBuf,
    pub ship: Option<String>,
    pub version: Option<String>,
    pub extra: BTreeMap<String, String>,
    pub parts: Vec<CraftPart>,
}

/// One part block of a craft file.
#[derive(Debug, Clone, Default)]
pub struct CraftPart {
    /// Line of the opening brace.
    pub line: usize,
    /// Instance id as written, e.g. `fuelTank_4293372840`.
    pub instance_id: String,
    /// Catalog name taken from the instance id, e.g. `fuelTank`.
    pub part_name: String,
    /// `istg`: game stage that ignites/activates the part.
    pub inverse_stage: u32,
    /// `dstg`: game stage that separates the part from the vehicle.
    pub decouple_stage: u32,
    pub stage_index: Option<i64>,
    pub stage_order: Option<i64>,
    pub attach_mode: Option<i64>,
    pub position: Option<Vec<f64>>,
    pub rotation: Option<Vec<f64>>,
    pub links: Vec<String>,
    /// `attN` entries: node name to attached instance id.
    pub attachments: BTreeMap<String, String>,
    /// `srfN` entries: (node, instance id).
    pub surface_attachments: Vec<(String, String)>,
    pub symmetry: Vec<String>,
    pub extra: BTreeMap<String, String>,
}

impl CraftFile {
    /// Read and parse a craft file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse craft text. `path` is kept for error reporting.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut craft = CraftFile {
            path: path.to_path_buf(),
            ..Default::default()
        };
        let mut current: Option<PartBuilder> = None;
        // Depth of nested blocks inside the current part; their contents are
        // module settings that this crate does not read.
        let mut nested = 0usize;

        for line in cfg::lines(text) {
            let Some(builder) = current.as_mut() else {
                match line.kind {
                    LineKind::Entry { key, value } => match key {
                        "ship" => craft.ship = Some(value.to_string()),
                        "version" => craft.version = Some(value.to_string()),
                        _ => {
                            craft.extra.insert(key.to_string(), value.to_string());
                        }
                    },
                    LineKind::Open => current = Some(PartBuilder::new(line.number)),
                    LineKind::Close => {
                        return Err(Error::parse(path, Some(line.number), "unmatched '}'"));
                    }
                    LineKind::Header(_) => {}
                    LineKind::Other(other) => return Err(unexpected(path, line.number, other)),
                }
                continue;
            };

            if nested > 0 {
                match line.kind {
                    LineKind::Open => nested += 1,
                    LineKind::Close => nested -= 1,
                    _ => {}
                }
                continue;
            }

            match line.kind {
                LineKind::Entry { key, value } => {
                    builder.read(&Field::new(path, line.number, key, value))?;
                }
                LineKind::Open => nested = 1,
                LineKind::Close => {
                    if let Some(done) = current.take() {
                        craft.parts.push(done.finish(path)?);
                    }
                }
                LineKind::Header(_) => {}
                LineKind::Other(other) => return Err(unexpected(path, line.number, other)),
            }
        }

        if let Some(builder) = current {
            return Err(Error::parse(
                path,
                Some(builder.line),
                "part block is never closed",
            ));
        }
        if craft.parts.is_empty() {
            return Err(Error::parse(path, None, "craft has no parts"));
        }
        Ok(craft)
    }

    /// Ship name, falling back to the file stem.
    pub fn name(&self) -> String {
        match &self.ship {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Split an instance id into its catalog part name.
pub fn part_name_of(instance_id: &str) -> Option<&str> {
    INSTANCE_RE
        .captures(instance_id)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

struct PartBuilder {
    line: usize,
    part: CraftPart,
    instance_id: Option<String>,
    inverse_stage: Option<u32>,
    decouple_stage: Option<u32>,
}

impl PartBuilder {
    fn new(line: usize) -> Self {
        Self {
            line,
            part: CraftPart {
                line,
                ..Default::default()
            },
            instance_id: None,
            inverse_stage: None,
            decouple_stage: None,
        }
    }

    fn read(&mut self, field: &Field<'_>) -> Result<()> {
        let part = &mut self.part;
        match field.key {
            "part" => self.instance_id = Some(field.string()),
            "istg" => self.inverse_stage = Some(field.index()?),
            "dstg" => self.decouple_stage = Some(field.index()?),
            "sidx" => part.stage_index = Some(field.int()?),
            "sqor" => part.stage_order = Some(field.int()?),
            "attm" => part.attach_mode = Some(field.int()?),
            "pos" => part.position = Some(field.floats()?),
            "rot" => part.rotation = Some(field.floats()?),
            "link" => part.links.push(field.string()),
            "sym" => part.symmetry.push(field.string()),
            "attN" => {
                let (node, target) = split_pair(field)?;
                part.attachments.insert(node, target);
            }
            "srfN" => part.surface_attachments.push(split_pair(field)?),
            key => {
                trace!(file = %field.path.display(), key, "unrecognised craft part attribute");
                part.extra.insert(key.to_string(), field.string());
            }
        }
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<CraftPart> {
        let missing = |key: &str| Error::parse(path, Some(self.line), format!("part block lacks '{key}'"));

        let instance_id = self.instance_id.clone().ok_or_else(|| missing("part"))?;
        let inverse_stage = self.inverse_stage.ok_or_else(|| missing("istg"))?;
        let decouple_stage = self.decouple_stage.ok_or_else(|| missing("dstg"))?;
        for (key, stage) in [("istg", inverse_stage), ("dstg", decouple_stage)] {
            if stage > MAX_STAGE {
                return Err(Error::parse(
                    path,
                    Some(self.line),
                    format!("{key} {stage} out of range (max {MAX_STAGE})"),
                ));
            }
        }
        let part_name = part_name_of(&instance_id)
            .ok_or_else(|| {
                Error::parse(
                    path,
                    Some(self.line),
                    format!("part id '{instance_id}' lacks a numeric suffix"),
                )
            })?
            .to_string();

        Ok(CraftPart {
            instance_id,
            part_name,
            inverse_stage,
            decouple_stage,
            ..self.part
        })
    }
}

fn unexpected(path: &Path, line: usize, text: &str) -> Error {
    Error::parse(path, Some(line), format!("unexpected line '{text}'"))
}

// Pattern: top, fuelTank_4293372840
fn split_pair(field: &Field<'_>) -> Result<(String, String)> {
    match field.value.split_once(',') {
        Some((node, target)) if !target.trim().is_empty() => {
            Ok((node.trim().to_string(), target.trim().to_string()))
        }
        _ => Err(Error::parse(
            field.path,
            Some(field.line),
            format!("{} = '{}' is not '<node>, <part id>'", field.key, field.value),
        )),
    }
}
