//! CLI errors

use std::io;
use std::path::PathBuf;

use tableview_lib::error::ColumnError;
use tableview_lib::error::ConfigError;
use tableview_lib::error::ExportError;
use tableview_lib::error::PageError;

/// Errors surfaced to the user by the `tableview` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// An input file is not valid JSON for its purpose.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A `key=value` argument is malformed.
    #[error("invalid --{flag} value '{value}': expected key=value")]
    KeyValue {
        /// Flag name.
        flag: &'static str,
        /// Raw value.
        value: String,
    },

    /// A `--sort` argument is malformed.
    #[error("invalid --sort value: {0}")]
    Sort(String),

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl CliError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
