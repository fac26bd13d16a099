use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{build::build, init::init, search::search},
    exit_status::ExitStatus,
};

/// Dispatches to the command handler.
///
/// # Returns
/// - `Ok(ExitStatus)` when the command ran to completion
/// - `Err` for fatal errors (configuration, corpus acquisition, output)
pub fn run(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose > 0;
    match args.command {
        Some(Command::Build(cmd)) => build(cmd, verbose),
        Some(Command::Search(cmd)) => search(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
