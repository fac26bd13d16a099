use std::{env, process::ExitCode};

use clap::Parser;
use raidtable::cli::{Arguments, ExitStatus};
use raidtable::logging::{LogConfig, init_logging};

fn main() -> ExitCode {
    let args = Arguments::parse();

    let log_config = LogConfig::from_verbosity(args.verbose)
        .with_format(args.log_format)
        .with_ansi(env::var_os("NO_COLOR").is_none());
    if let Err(err) = init_logging(&log_config) {
        eprintln!("Error: {}", err);
        return ExitStatus::Error.into();
    }

    match raidtable::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
