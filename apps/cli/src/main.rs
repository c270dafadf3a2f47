//! doccapture CLI — capture documentation files into a single report.
//!
//! Exit status: 0 when every manifest entry was captured, 1 when any entry
//! was missing or unreadable, 1 with a `Fatal error:` message when the run
//! itself failed.

mod commands;

use std::process::ExitCode;

use clap::Parser;

use commands::Cli;

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("Fatal error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    commands::init_tracing(&cli);

    match commands::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Fatal error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
