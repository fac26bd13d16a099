use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{info, info_span};

use super::super::args::BuildCommand;
use super::super::exit_status::ExitStatus;
use super::super::report::{print_build_summary, print_record_warnings};
use crate::config::{ConfigLoadResult, load_columns, load_config, load_exclude_types};
use crate::core::{ColumnSelection, NormalizeOptions, Pipeline, RequiredFields, RowProjector};
use crate::corpus::{Corpus, CorpusLayout, CorpusSource, GitCorpus, LocalCorpus};
use crate::output::ArtifactWriter;

/// Everything a build needs, after config file, environment and flags are merged.
#[derive(Debug)]
pub struct BuildPlan {
    pub corpus: Corpus,
    pub options: NormalizeOptions,
    pub out_dir: PathBuf,
    /// `None` derives the columns from the data.
    pub columns_file: Option<PathBuf>,
    pub exclude_types_file: Option<PathBuf>,
    pub required_fields: RequiredFields,
}

impl BuildPlan {
    /// Applies command-line overrides on top of the loaded configuration.
    ///
    /// Paths given on the command line are relative to `cwd`; paths from the
    /// config file are relative to the file's directory.
    pub fn resolve(loaded: &ConfigLoadResult, cmd: &BuildCommand, cwd: &Path) -> Self {
        let config = &loaded.config;

        let mut options = config.normalize_options();
        if let Some(language) = cmd.language.as_ref().filter(|l| !l.trim().is_empty()) {
            options.language = language.clone();
        }
        if let Some(strategy) = cmd.flatten {
            options.strategy = strategy;
        }

        let repo_dir = loaded.resolve_path(&config.repo_dir);
        let corpus = match &cmd.corpus_dir {
            Some(dir) => Corpus::from(LocalCorpus { dir: cwd.join(dir) }),
            None if cmd.offline => Corpus::from(LocalCorpus { dir: repo_dir }),
            None => Corpus::from(GitCorpus {
                url: config.repo_url.clone(),
                dir: repo_dir,
            }),
        };

        let out_dir = match &cmd.out {
            Some(dir) => cwd.join(dir),
            None => loaded.resolve_path(&config.out_dir),
        };

        let columns_file = if cmd.discover_columns {
            None
        } else {
            config.columns_file.as_ref().map(|f| loaded.resolve_path(f))
        };

        Self {
            corpus,
            options,
            out_dir,
            columns_file,
            exclude_types_file: config
                .exclude_types_file
                .as_ref()
                .map(|f| loaded.resolve_path(f)),
            required_fields: RequiredFields::new(config.required_fields.iter().cloned()),
        }
    }

    /// Loads the column and exclude-type files into a projector.
    pub fn projector(&self) -> Result<RowProjector> {
        let columns = match &self.columns_file {
            Some(path) => ColumnSelection::Fixed(load_columns(path)?),
            None => ColumnSelection::Discover,
        };
        let exclude_types = match &self.exclude_types_file {
            Some(path) => load_exclude_types(path)?,
            None => Default::default(),
        };
        Ok(RowProjector::new(
            exclude_types,
            self.required_fields.clone(),
            columns,
        ))
    }
}

pub fn build(cmd: BuildCommand, verbose: bool) -> Result<ExitStatus> {
    let cwd = env::current_dir()?;
    let loaded = load_config(&cwd)?;
    if !loaded.from_file {
        info!("No config file found, using defaults");
    }
    let ignores = loaded.config.ignore_patterns()?;
    let plan = BuildPlan::resolve(&loaded, &cmd, &cwd);
    let projector = plan.projector()?;

    let root = {
        let _span = info_span!("acquire").entered();
        plan.corpus.acquire()?
    };
    let layout = CorpusLayout::scan(
        &root,
        &loaded.config.items_dir,
        &loaded.config.benches_dir,
        &ignores,
    )?;
    info!(
        items = layout.item_files.len(),
        benches = layout.bench_files.as_ref().map_or(0, Vec::len),
        language = %plan.options.language,
        "Building dataset"
    );

    let output = Pipeline::new(plan.options, projector).run(&layout);
    let written = ArtifactWriter::new(&plan.out_dir).write_all(&output)?;

    print_build_summary(&output, &written, verbose);
    if output.warnings.is_empty() {
        Ok(ExitStatus::Success)
    } else {
        print_record_warnings(&output.warnings);
        Ok(ExitStatus::Failure)
    }
}
