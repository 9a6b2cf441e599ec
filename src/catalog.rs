//! Part catalog: every part definition of an install, keyed by name
//!
//! The catalog is an ordinary value owned by the caller. Loaded ships borrow
//! parts from it, so it cannot be reloaded while any ship is alive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{self, GameConfig, PART_CFG};
use crate::error::{Error, Result};
use crate::part::Part;

#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: HashMap<String, Part>,
    source: Option<PathBuf>,
}

impl PartCatalog {
    /// Load every `part.cfg` under the install's `Parts` directory.
    pub fn load_all(config: &GameConfig) -> Result<Self> {
        Self::from_dir(&config.parts_dir())
    }

    /// Load every `part.cfg` below `parts_dir`.
    ///
    /// Files are visited in sorted path order. The first file that fails to
    /// parse aborts the load. When two files define the same name, the one
    /// visited last wins.
    pub fn from_dir(parts_dir: &Path) -> Result<Self> {
        config::require_dir(parts_dir)?;

        let files = find_part_files(parts_dir)?;
        if files.is_empty() {
            return Err(Error::NoPartDefinitions {
                path: parts_dir.to_path_buf(),
            });
        }

        let mut parts = HashMap::with_capacity(files.len());
        for path in &files {
            debug!(file = %path.display(), "reading part");
            let part = Part::load(path)?;
            if let Some(previous) = parts.insert(part.name.clone(), part) {
                warn!(
                    part = %previous.name,
                    file = %path.display(),
                    "duplicate part name, later definition replaces earlier one"
                );
            }
        }

        info!(count = parts.len(), dir = %parts_dir.display(), "loaded part catalog");
        Ok(Self {
            parts,
            source: Some(parts_dir.to_path_buf()),
        })
    }

    /// Build a catalog from parts already in memory. Later duplicates win.
    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            parts: parts.into_iter().map(|p| (p.name.clone(), p)).collect(),
            source: None,
        }
    }

    /// Re-scan the install and replace the whole catalog. On error the
    /// current contents are left untouched.
    pub fn reload(&mut self, config: &GameConfig) -> Result<()> {
        *self = Self::load_all(config)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Part names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Directory the catalog was loaded from, if it came from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Find all part.cfg files below `parts_dir`, sorted by path.
fn find_part_files(parts_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(parts_dir)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == PART_CFG {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
