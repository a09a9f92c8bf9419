//! mdtohtml - "Convert to HTML" for Markdown files
//!
//! Entry point. The Windows build uses the GUI subsystem so that launching
//! the verb from Explorer does not flash a console window.

#![cfg_attr(windows, windows_subsystem = "windows")]

use clap::Parser;
use mdtohtml::{cli::Cli, dialog, ExitCode};

fn main() {
    // Parse command-line arguments; anything clap rejects is malformed input
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => std::process::exit(mdtohtml::report_parse_error(&err).as_i32()),
    };
    let worker = cli.worker;

    match mdtohtml::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            log::error!("[{}] {:#}", ExitCode::Failure.code_prefix(), err);
            let message = format!("{err:#}");
            if worker {
                eprintln!("{message}");
            } else {
                dialog::native().error(&message);
            }
            std::process::exit(ExitCode::Failure.as_i32());
        }
    }
}
