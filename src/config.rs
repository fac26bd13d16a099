use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::core::{
    DEFAULT_EFFECTS_FIELD, DEFAULT_REFERENCE_FIELDS, FlattenStrategy, LocaleDetection,
    NormalizeOptions, locale::BASE_LOCALE,
};
use crate::error::BuildError;

pub const CONFIG_FILE_NAME: &str = ".raidtablerc.json";

/// Environment variable selecting the target language.
pub const LANGUAGE_ENV: &str = "ARC_DATA_LANG";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_repo_url")]
    pub repo_url: String,
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,
    #[serde(default = "default_items_dir")]
    pub items_dir: String,
    #[serde(default = "default_benches_dir", alias = "hideoutDir")]
    pub benches_dir: String,
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// `null` switches to column discovery.
    #[serde(default = "default_columns_file")]
    pub columns_file: Option<String>,
    /// `null` excludes nothing.
    #[serde(default = "default_exclude_types_file")]
    pub exclude_types_file: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub flatten: FlattenStrategy,
    #[serde(default)]
    pub locale_detection: LocaleDetection,
    #[serde(default = "default_reference_fields")]
    pub reference_fields: Vec<String>,
    #[serde(default = "default_effects_field")]
    pub effects_field: String,
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
}

fn default_repo_url() -> String {
    "https://github.com/RaidTheory/arcraiders-data.git".to_string()
}

fn default_repo_dir() -> String {
    "./repos/arcraiders-data".to_string()
}

fn default_items_dir() -> String {
    "items".to_string()
}

fn default_benches_dir() -> String {
    "hideout".to_string()
}

fn default_out_dir() -> String {
    "./public/data".to_string()
}

fn default_columns_file() -> Option<String> {
    Some("./public/columns.json".to_string())
}

fn default_exclude_types_file() -> Option<String> {
    Some("./public/exclude_types.json".to_string())
}

fn default_language() -> String {
    BASE_LOCALE.to_string()
}

fn default_reference_fields() -> Vec<String> {
    DEFAULT_REFERENCE_FIELDS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_effects_field() -> String {
    DEFAULT_EFFECTS_FIELD.to_string()
}

fn default_required_fields() -> Vec<String> {
    vec!["value".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: default_repo_url(),
            repo_dir: default_repo_dir(),
            items_dir: default_items_dir(),
            benches_dir: default_benches_dir(),
            out_dir: default_out_dir(),
            columns_file: default_columns_file(),
            exclude_types_file: default_exclude_types_file(),
            language: default_language(),
            flatten: FlattenStrategy::default(),
            locale_detection: LocaleDetection::default(),
            reference_fields: default_reference_fields(),
            effects_field: default_effects_field(),
            required_fields: default_required_fields(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for an empty language or an invalid glob in `ignores`.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(BuildError::InvalidConfig("'language' must not be empty".to_string()).into());
        }
        self.ignore_patterns()?;
        Ok(())
    }

    /// Compiled `ignores` patterns.
    pub fn ignore_patterns(&self) -> Result<Vec<Pattern>> {
        self.ignores
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))
            })
            .collect()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            language: self.language.clone(),
            detection: self.locale_detection,
            strategy: self.flatten,
            reference_fields: self.reference_fields.clone(),
            effects_field: self.effects_field.clone(),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

impl ConfigLoadResult {
    /// Resolves a configured path against [`Self::base_dir`].
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_path(&self.base_dir, path.as_ref())
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let config: Config = read_json_file(&path)?;
            config.validate()?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                base_dir,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            base_dir: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}

/// Joins `path` onto `base` unless it is absolute. A leading `./` is dropped.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let rel = path.strip_prefix(".").unwrap_or(path);
    base.join(rel)
}

/// Loads the ordered column allow-list.
pub fn load_columns(path: &Path) -> Result<Vec<String>, BuildError> {
    require_file(
        path,
        "columns",
        "Create it with an array of column names to include.",
    )?;
    read_json_file(path)
}

/// Loads the set of item types to exclude.
pub fn load_exclude_types(path: &Path) -> Result<HashSet<String>, BuildError> {
    require_file(
        path,
        "exclude-types",
        "Create it with an array of item type strings to exclude, or an empty array if none.",
    )?;
    let types: Vec<String> = read_json_file(path)?;
    Ok(types.into_iter().collect())
}

fn require_file(path: &Path, what: &'static str, hint: &'static str) -> Result<(), BuildError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(BuildError::MissingConfigFile {
            what,
            path: path.to_path_buf(),
            hint,
        })
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
    let content = fs::read_to_string(path).map_err(|source| BuildError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| BuildError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
