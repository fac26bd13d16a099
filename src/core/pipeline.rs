use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use super::{
    Indices, NormalizeOptions, NormalizedRow, RawRecord, ValueFlattener, build_name_index,
    parsers::json::{RecordWarning, parse_record_file, record_id},
    project::{Projection, RowProjector},
    resolve::resolve_references,
};
use crate::corpus::CorpusLayout;

/// Progress is logged every this many parsed documents.
const PROGRESS_INTERVAL: usize = 100;

/// A parsed source document and the identifier used to report on it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecord {
    pub id: String,
    pub record: RawRecord,
}

impl LoadedRecord {
    pub fn new(id: impl Into<String>, record: RawRecord) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

/// Documents that parsed, plus warnings for those that did not.
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub records: Vec<LoadedRecord>,
    pub warnings: Vec<RecordWarning>,
}

/// Summary written next to the rows as `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub language: String,
    pub row_count: usize,
    pub column_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench_count: Option<usize>,
    #[serde(default)]
    pub skipped_by_type: usize,
    #[serde(default)]
    pub skipped_missing_required: usize,
    #[serde(default)]
    pub failed_records: usize,
}

/// Everything a run produces.
#[derive(Debug)]
pub struct BuildOutput {
    pub rows: Vec<NormalizedRow>,
    pub columns: Vec<String>,
    pub indices: Indices,
    pub metadata: RunMetadata,
    /// Documents skipped because they could not be read or parsed.
    pub warnings: Vec<RecordWarning>,
}

/// Result of the row phase.
#[derive(Debug, Default)]
pub struct RowPass {
    pub rows: Vec<NormalizedRow>,
    pub columns: Vec<String>,
    pub skipped_by_type: usize,
    pub skipped_missing_required: usize,
}

/// Two-phase normalization pipeline.
///
/// # Phases
///
/// 1. [`Pipeline::build_indices`] indexes every item and craft-bench document
///    and returns an immutable [`Indices`].
/// 2. [`Pipeline::build_rows`] flattens, resolves and projects each item using
///    those indices.
///
/// Records are processed in parallel within a phase. Output order always
/// follows input order, so identical input gives identical output.
pub struct Pipeline {
    options: NormalizeOptions,
    projector: RowProjector,
}

impl Pipeline {
    pub fn new(options: NormalizeOptions, projector: RowProjector) -> Self {
        Self { options, projector }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Loads the documents listed in `layout` and runs both phases.
    pub fn run(&self, layout: &CorpusLayout) -> BuildOutput {
        let items = {
            let _span = info_span!("load", corpus = "items").entered();
            load_records(&layout.item_files)
        };
        let benches = layout.bench_files.as_ref().map(|files| {
            let _span = info_span!("load", corpus = "benches").entered();
            load_records(files)
        });

        let mut warnings = items.warnings;
        let bench_records = benches.map(|benches| {
            warnings.extend(benches.warnings);
            benches.records
        });

        self.run_records(items.records, bench_records, warnings)
    }

    /// Runs both phases over already-parsed documents.
    pub fn run_records(
        &self,
        items: Vec<LoadedRecord>,
        benches: Option<Vec<LoadedRecord>>,
        warnings: Vec<RecordWarning>,
    ) -> BuildOutput {
        let indices = self.build_indices(&items, benches.as_deref());
        let pass = self.build_rows(items, &indices);

        let metadata = RunMetadata {
            language: self.options.language.clone(),
            row_count: pass.rows.len(),
            column_count: pass.columns.len(),
            bench_count: indices.benches.as_ref().map(|b| b.len()),
            skipped_by_type: pass.skipped_by_type,
            skipped_missing_required: pass.skipped_missing_required,
            failed_records: warnings.len(),
        };

        BuildOutput {
            rows: pass.rows,
            columns: pass.columns,
            indices,
            metadata,
            warnings,
        }
    }

    /// Phase 1: builds the item and craft-bench indices.
    pub fn build_indices(
        &self,
        items: &[LoadedRecord],
        benches: Option<&[LoadedRecord]>,
    ) -> Indices {
        let _span = info_span!("index").entered();

        let item_index = build_name_index(items.iter().map(|r| &r.record), &self.options);
        info!(count = item_index.len(), "Indexed item names");

        let bench_index = benches.map(|benches| {
            let index = build_name_index(benches.iter().map(|r| &r.record), &self.options);
            info!(count = index.len(), "Indexed craft-bench names");
            index
        });

        Indices {
            items: item_index,
            benches: bench_index,
        }
    }

    /// Phase 2: turns each item document into an output row.
    pub fn build_rows(&self, items: Vec<LoadedRecord>, indices: &Indices) -> RowPass {
        let _span = info_span!("rows").entered();

        let projections: Vec<(String, Projection)> = items
            .into_par_iter()
            .map(|loaded| {
                let projection = self.process_record(loaded.record, indices);
                (loaded.id, projection)
            })
            .collect();

        let mut pass = RowPass::default();
        let mut rows = Vec::with_capacity(projections.len());
        for (id, projection) in projections {
            match projection {
                Projection::Keep(row) => rows.push(row),
                Projection::SkippedByType(item_type) => {
                    debug!(record = %id, %item_type, "Skipped by type");
                    pass.skipped_by_type += 1;
                }
                Projection::MissingRequired(field) => {
                    debug!(record = %id, %field, "Skipped for missing required field");
                    pass.skipped_missing_required += 1;
                }
            }
        }

        let (rows, columns) = self.projector.finish(rows);
        info!(
            rows = rows.len(),
            columns = columns.len(),
            skipped_by_type = pass.skipped_by_type,
            skipped_missing_required = pass.skipped_missing_required,
            "Built rows"
        );
        pass.rows = rows;
        pass.columns = columns;
        pass
    }

    /// Flatten, then resolve references, then project.
    fn process_record(&self, record: RawRecord, indices: &Indices) -> Projection {
        let mut row = ValueFlattener::new(&self.options).flatten(record);
        resolve_references(&mut row, &self.options.reference_fields, &indices.items);
        self.projector.project(row)
    }
}

/// Reads and parses `files` in parallel.
///
/// A document that fails is logged and reported as a warning; it never stops
/// the others. Parsed records keep the order of `files`.
pub fn load_records(files: &[PathBuf]) -> LoadedCorpus {
    let results: Vec<_> = files
        .par_iter()
        .map(|path| (record_id(path), parse_record_file(path)))
        .collect();

    let total = results.len();
    let mut corpus = LoadedCorpus::default();
    for (i, (id, result)) in results.into_iter().enumerate() {
        match result {
            Ok(record) => corpus.records.push(LoadedRecord::new(id, record)),
            Err(e) => {
                warn!(record = %id, error = %e, "Skipping record");
                corpus.warnings.push(RecordWarning::new(id, &e));
            }
        }
        if (i + 1) % PROGRESS_INTERVAL == 0 {
            debug!("Parsed {}/{}", i + 1, total);
        }
    }
    info!(
        parsed = corpus.records.len(),
        failed = corpus.warnings.len(),
        "Loaded documents"
    );
    corpus
}
