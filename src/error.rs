//! Error type shared by the part and ship loaders

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No game path was given and `KSP_GAME_PATH` is not set.
    #[error("game path not set (pass a path or set KSP_GAME_PATH)")]
    GamePathNotSet,

    /// The game path, or a directory expected inside it, is unusable.
    #[error("invalid game directory {}: {reason}", .path.display())]
    Configuration { path: PathBuf, reason: String },

    /// A part definition or craft file does not follow the expected grammar.
    #[error("failed to parse {}{}: {reason}", .path.display(), format_line(.line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },

    /// A craft file names a part that the catalog does not contain.
    #[error("{} references unknown part '{part}'", .path.display())]
    UnresolvedReference { path: PathBuf, part: String },

    /// Ships were requested before any part definitions were loaded.
    #[error("part catalog is empty; load part definitions before loading ships")]
    CatalogNotLoaded,

    /// The parts directory exists but holds no `part.cfg` files.
    #[error("no part definitions found under {}", .path.display())]
    NoPartDefinitions { path: PathBuf },

    /// Reading a file failed.
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, line: Option<usize>, reason: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

fn format_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}
