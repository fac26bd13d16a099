//! Output artifacts.
//!
//! A build writes five JSON files into the output directory. Every file is
//! rewritten whole on each run; a bench index left over from an earlier run is
//! removed when the current corpus has no craft benches.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::core::{BuildOutput, NameIndex, NormalizedRow, RunMetadata};
use crate::error::{ArtifactError, BuildError, Result};

pub const ROWS_FILE: &str = "items.json";
pub const COLUMNS_FILE: &str = "columns.json";
pub const ITEM_INDEX_FILE: &str = "itemIdToName.json";
pub const BENCH_INDEX_FILE: &str = "craftBenchIdToName.json";
pub const META_FILE: &str = "meta.json";

/// Writes build artifacts into one directory.
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Writes every artifact of `output` and returns the paths written.
    pub fn write_all(&self, output: &BuildOutput) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir).map_err(|source| BuildError::CreateDir {
            path: self.out_dir.clone(),
            source,
        })?;

        let mut written = vec![
            self.write_json(ROWS_FILE, &output.rows, false)?,
            self.write_json(COLUMNS_FILE, &output.columns, true)?,
            self.write_json(ITEM_INDEX_FILE, &output.indices.items, false)?,
        ];

        match &output.indices.benches {
            Some(benches) => written.push(self.write_json(BENCH_INDEX_FILE, benches, false)?),
            None => self.remove_stale(BENCH_INDEX_FILE)?,
        }

        written.push(self.write_json(META_FILE, &output.metadata, true)?);
        Ok(written)
    }

    /// Serializes `value` to `name`. Pretty files use 2-space indentation and
    /// end with a newline.
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T, pretty: bool) -> Result<PathBuf> {
        let path = self.out_dir.join(name);
        let serialized = if pretty {
            serde_json::to_string_pretty(value).map(|s| format!("{}\n", s))
        } else {
            serde_json::to_string(value)
        }
        .map_err(|source| BuildError::OutputSerialize {
            path: path.clone(),
            source,
        })?;

        fs::write(&path, serialized).map_err(|source| BuildError::OutputWrite {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Wrote artifact");
        Ok(path)
    }

    fn remove_stale(&self, name: &str) -> Result<()> {
        let path = self.out_dir.join(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| BuildError::OutputWrite {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "Removed stale artifact");
        }
        Ok(())
    }
}

/// Artifacts loaded back for querying.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub rows: Vec<NormalizedRow>,
    pub columns: Vec<String>,
    pub items: NameIndex,
    pub benches: NameIndex,
    pub metadata: Option<RunMetadata>,
}

impl Artifacts {
    /// Loads the artifacts in `dir`.
    ///
    /// Rows and columns are required. The indices and metadata are optional
    /// and default to empty.
    pub fn load(dir: &Path) -> std::result::Result<Self, ArtifactError> {
        Ok(Self {
            rows: read_json(&dir.join(ROWS_FILE))?,
            columns: read_json(&dir.join(COLUMNS_FILE))?,
            items: read_optional_json(&dir.join(ITEM_INDEX_FILE))?.unwrap_or_default(),
            benches: read_optional_json(&dir.join(BENCH_INDEX_FILE))?.unwrap_or_default(),
            metadata: read_optional_json(&dir.join(META_FILE))?,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, ArtifactError> {
    read_optional_json(path)?.ok_or_else(|| ArtifactError::Missing {
        path: path.to_path_buf(),
    })
}

fn read_optional_json<T: DeserializeOwned>(
    path: &Path,
) -> std::result::Result<Option<T>, ArtifactError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
