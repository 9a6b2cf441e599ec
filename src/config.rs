//! Location of an installed game copy

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable consulted by [`GameConfig::from_env`].
pub const GAME_PATH_ENV: &str = "KSP_GAME_PATH";

/// Sub-directory of the install holding one directory per part.
pub const PARTS_SUBDIR: &str = "Parts";

/// Sub-directory of the install holding saved `.craft` files.
pub const SHIPS_SUBDIR: &str = "Ships";

/// File name of a part definition inside its part directory.
pub const PART_CFG: &str = "part.cfg";

/// Root directory of an installed game, passed explicitly to both loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    root: PathBuf,
}

impl GameConfig {
    /// Validate and wrap an install root.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Configuration {
                path: root,
                reason: "not an existing directory".to_string(),
            });
        }
        Ok(Self { root })
    }

    /// Build a config from `KSP_GAME_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(env::var_os(GAME_PATH_ENV))
    }

    // An unset and an empty variable are treated the same.
    fn from_env_value(value: Option<OsString>) -> Result<Self> {
        match value {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Err(Error::GamePathNotSet),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn parts_dir(&self) -> PathBuf {
        self.root.join(PARTS_SUBDIR)
    }

    pub fn ships_dir(&self) -> PathBuf {
        self.root.join(SHIPS_SUBDIR)
    }
}

/// Fail with a configuration error unless `dir` is a directory.
pub(crate) fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::Configuration {
            path: dir.to_path_buf(),
            reason: "expected directory is missing".to_string(),
        })
    }
}
