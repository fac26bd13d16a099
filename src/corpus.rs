//! Corpus acquisition and enumeration.
//!
//! The source data lives in a git repository with one JSON document per item
//! (`items/`) and one per craft bench (`hideout/`). [`GitCorpus`] clones or
//! fast-forwards that repository; [`LocalCorpus`] uses a directory as-is.
//! Either way the result is a [`CorpusLayout`] listing the documents in sorted
//! path order, which makes every run deterministic.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use enum_dispatch::enum_dispatch;
use glob::Pattern;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// A place the raw corpus can be obtained from.
#[enum_dispatch]
pub trait CorpusSource {
    /// Makes the corpus available on disk and returns its root directory.
    ///
    /// Calling this repeatedly must be safe.
    fn acquire(&self) -> Result<PathBuf>;
}

#[enum_dispatch(CorpusSource)]
#[derive(Debug, Clone)]
pub enum Corpus {
    Git(GitCorpus),
    Local(LocalCorpus),
}

/// Shallow clone of a remote repository, updated with `git pull --ff-only`.
#[derive(Debug, Clone)]
pub struct GitCorpus {
    pub url: String,
    pub dir: PathBuf,
}

impl CorpusSource for GitCorpus {
    fn acquire(&self) -> Result<PathBuf> {
        if self.dir.join(".git").exists() {
            info!(dir = %self.dir.display(), "Updating corpus repository");
            run_git(
                "pull",
                Command::new("git")
                    .args(["pull", "--ff-only"])
                    .current_dir(&self.dir),
            )?;
        } else {
            info!(url = %self.url, dir = %self.dir.display(), "Cloning corpus repository");
            if let Some(parent) = self.dir.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            run_git(
                "clone",
                Command::new("git")
                    .args(["clone", "--depth", "1", self.url.as_str()])
                    .arg(&self.dir),
            )?;
        }
        Ok(self.dir.clone())
    }
}

/// A directory that already holds the corpus.
#[derive(Debug, Clone)]
pub struct LocalCorpus {
    pub dir: PathBuf,
}

impl CorpusSource for LocalCorpus {
    fn acquire(&self) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(BuildError::CorpusNotFound {
                path: self.dir.clone(),
            });
        }
        debug!(dir = %self.dir.display(), "Using local corpus");
        Ok(self.dir.clone())
    }
}

fn run_git(action: &'static str, command: &mut Command) -> Result<()> {
    let status = command
        .status()
        .map_err(|source| BuildError::GitSpawn { action, source })?;
    if !status.success() {
        return Err(BuildError::GitFailed {
            action,
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Source documents of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusLayout {
    pub item_files: Vec<PathBuf>,
    /// `None` when the corpus has no craft-bench directory.
    pub bench_files: Option<Vec<PathBuf>>,
}

impl CorpusLayout {
    /// Lists item and bench documents under `root`.
    ///
    /// The items directory is required; the benches directory is optional.
    pub fn scan(
        root: &Path,
        items_dir: &str,
        benches_dir: &str,
        ignores: &[Pattern],
    ) -> Result<Self> {
        let items_path = root.join(items_dir);
        if !items_path.is_dir() {
            return Err(BuildError::CorpusNotFound { path: items_path });
        }
        let item_files = list_json_files(&items_path, ignores)?;

        let benches_path = root.join(benches_dir);
        let bench_files = if benches_path.is_dir() {
            Some(list_json_files(&benches_path, ignores)?)
        } else {
            debug!(dir = %benches_path.display(), "No craft-bench directory");
            None
        };

        Ok(Self {
            item_files,
            bench_files,
        })
    }
}

/// Lists `*.json` files directly inside `dir`, sorted by file name.
///
/// Files whose name matches one of `ignores` are left out.
pub fn list_json_files(dir: &Path, ignores: &[Pattern]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| BuildError::CorpusList {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if ignores.iter().any(|p| p.matches(&file_name)) {
            debug!(file = %file_name, "Ignored by pattern");
            continue;
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}
