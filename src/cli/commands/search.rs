use std::{env, path::PathBuf};

use anyhow::Result;

use super::super::args::SearchCommand;
use super::super::exit_status::ExitStatus;
use super::super::report::{DisplayIndices, print_error_row, print_table, print_warning};
use crate::config::load_config;
use crate::output::Artifacts;
use crate::query::{SortDirection, detect_numeric_columns, filter_rows, sort_rows};

pub fn search(cmd: SearchCommand) -> Result<ExitStatus> {
    let data_dir = match &cmd.data {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };

    let artifacts = match Artifacts::load(&data_dir) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            print_error_row(&err.with_build_hint());
            return Ok(ExitStatus::Error);
        }
    };

    let keyword = cmd.keywords.join(" ");
    let mut rows = filter_rows(&artifacts.rows, &artifacts.columns, &keyword);

    if let Some(column) = &cmd.sort {
        if artifacts.columns.contains(column) {
            let direction = if cmd.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let numeric = detect_numeric_columns(&artifacts.rows, &artifacts.columns);
            sort_rows(&mut rows, column, direction, &artifacts.columns, &numeric);
        } else {
            print_warning(&format!("unknown column `{}`, rows left unsorted", column));
        }
    }

    if let Some(limit) = cmd.limit {
        rows.truncate(limit);
    }

    print_table(
        &artifacts.columns,
        &rows,
        artifacts.rows.len(),
        &DisplayIndices {
            items: &artifacts.items,
            benches: &artifacts.benches,
        },
        cmd.expanded,
    );
    Ok(ExitStatus::Success)
}

fn default_data_dir() -> Result<PathBuf> {
    let loaded = load_config(&env::current_dir()?)?;
    Ok(loaded.resolve_path(&loaded.config.out_dir))
}
