//! Error types for the dataset build.
//!
//! Two layers: [`BuildError`] aborts the run (configuration, corpus
//! acquisition, artifact output), [`RecordError`] is scoped to a single source
//! document and is always converted into a skip by the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that terminate a build.
#[derive(Debug, Error)]
pub enum BuildError {
    // === Configuration ===
    /// A configured input file does not exist.
    #[error("missing {what} file: {path}\nHint: {hint}")]
    MissingConfigFile {
        what: &'static str,
        path: PathBuf,
        hint: &'static str,
    },

    /// A configuration file exists but could not be read.
    #[error("failed to read {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON of the expected shape.
    #[error("failed to parse {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Corpus acquisition ===
    /// The git executable could not be started.
    #[error("failed to run git {action}")]
    GitSpawn {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// git exited unsuccessfully.
    #[error("git {action} failed ({status})")]
    GitFailed { action: &'static str, status: String },

    /// The corpus directory is missing after acquisition.
    #[error("corpus directory not found: {path}")]
    CorpusNotFound { path: PathBuf },

    /// Failed to enumerate corpus files.
    #[error("failed to list {path}")]
    CorpusList {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // === Filesystem ===
    /// Failed to create a directory.
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Output ===
    /// Failed to write an output artifact.
    #[error("failed to write {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize an output artifact.
    #[error("failed to serialize {path}")]
    OutputSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors loading previously built artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A required artifact does not exist yet.
    #[error("{path} not found. Run `raidtable build` to generate the data.")]
    Missing { path: PathBuf },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tells the operator how to produce the artifacts.
pub const BUILD_HINT: &str = "Run `raidtable build` to generate the data.";

impl ArtifactError {
    /// One-line message for the search error row, ending with [`BUILD_HINT`].
    pub fn with_build_hint(&self) -> String {
        match self {
            Self::Missing { .. } => self.to_string(),
            Self::Read { source, .. } => format!("{}: {}. {}", self, source, BUILD_HINT),
            Self::Parse { source, .. } => format!("{}: {}. {}", self, source, BUILD_HINT),
        }
    }
}

/// Errors scoped to one source document.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("root is not a JSON object")]
    NotAnObject,
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
