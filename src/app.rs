//! Command dispatch.
//!
//! [`App`] runs one parsed [`Command`] against a dialog and a key store and
//! turns the outcome into an [`ExitCode`]. [`run_app`] wires it to the real
//! platform: configuration, logging, native dialogs and the registry, plus
//! the optional hand-off to a console worker.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};

use crate::cli::{usage, Cli, Command};
use crate::config::{Config, Host};
use crate::convert::Converter;
use crate::dialog::{self, ConsoleDialog, Dialog};
use crate::error::{Error, ExitCode};
use crate::logging;
use crate::shell::{self, KeyStore, ShellVerb};
use crate::watcher::Watcher;

/// Program name used in the usage text when the executable name is unknown.
const FALLBACK_PROGRAM: &str = "mdtohtml";

/// Executes commands and reports failures through a dialog.
pub struct App<D, S> {
    config: Config,
    dialog: D,
    store: S,
    app_path: PathBuf,
}

impl<D: Dialog, S: KeyStore> App<D, S> {
    /// Create an app.
    ///
    /// `app_path` is the executable the shell verb will launch.
    pub fn new(config: Config, dialog: D, store: S, app_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            dialog,
            store,
            app_path: app_path.into(),
        }
    }

    /// The dialog, e.g. to inspect what a test double recorded.
    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    /// The key store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one command.
    pub fn execute(&mut self, command: &Command) -> ExitCode {
        let result = match command {
            Command::Convert(markdown) => self.convert(markdown),
            Command::Set { icon } => ShellVerb::new(self.config.verb_label.as_str()).install(
                &mut self.store,
                &self.app_path,
                *icon,
            ),
            Command::Unset => ShellVerb::new(self.config.verb_label.as_str()).uninstall(&mut self.store),
            Command::Help => {
                self.show_help();
                return ExitCode::Failure;
            }
        };

        match result {
            Ok(()) => ExitCode::Success,
            Err(Error::OverwriteDeclined(path)) => {
                log::info!("Kept existing {}", path.display());
                ExitCode::Failure
            }
            Err(e) => {
                log::error!("[{}] {}", ExitCode::Failure.code_prefix(), e);
                self.dialog.error(&e.to_string());
                ExitCode::Failure
            }
        }
    }

    /// Show the usage text.
    pub fn show_help(&mut self) {
        let text = usage(&program_name(&self.app_path));
        self.dialog.help(&text);
    }

    fn convert(&mut self, markdown: &Path) -> crate::Result<()> {
        Converter::new(&self.config.extensions, self.config.output)
            .with_stylesheet(self.config.stylesheet.clone())
            .convert_file(markdown, &mut self.dialog)
            .map(|_| ())
    }
}

/// Executable stem, e.g. `mdtohtml` for `C:\Tools\mdtohtml.exe`.
fn program_name(app_path: &Path) -> String {
    app_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_PROGRAM.to_string())
}

/// Run the application for parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for setup failures: the executable path cannot be
/// determined, logging cannot be initialized, or the worker cannot be run.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref());
    logging::init_for_process(cli.verbose, cli.quiet, cli.worker, config.log_file.as_deref())?;

    let app_path = std::env::current_exe().context("Failed to determine the executable path")?;
    let dialog: Box<dyn Dialog> = if cli.worker {
        Box::new(ConsoleDialog::stdio())
    } else {
        dialog::native()
    };

    let mut app = App::new(config, dialog, shell::native_store(), app_path);

    let command = match cli.command() {
        Ok(command) => command,
        Err(e) => {
            log::warn!("{}", e);
            app.show_help();
            return Ok(ExitCode::Failure);
        }
    };
    log::debug!("Command: {:?}", command);

    if let Command::Convert(markdown) = &command {
        if app.config.host == Host::Worker && !cli.worker {
            return launch_worker(&cli, &app.app_path, markdown, &mut app.dialog);
        }
    }

    Ok(app.execute(&command))
}

/// Re-run this executable as a console worker and relay its dialogs.
fn launch_worker<D: Dialog + ?Sized>(
    cli: &Cli,
    app_path: &Path,
    markdown: &Path,
    dialog: &mut D,
) -> Result<ExitCode> {
    let mut worker = process::Command::new(app_path);
    worker
        .args(cli.forwarded_flags())
        .arg("--worker")
        .arg(worker_argument(markdown));

    let code = Watcher::new()
        .run(&mut worker, dialog)
        .context("Failed to run the conversion worker")?;
    Ok(ExitCode::from_status(code))
}

/// The `/Markdown:<path>` argument for the worker, keeping the path's bytes.
fn worker_argument(markdown: &Path) -> OsString {
    let mut arg = OsString::from("/Markdown:");
    arg.push(markdown);
    arg
}

/// Report a command line clap could not parse: show usage and fail.
///
/// `--version` is answered with the version and succeeds.
pub fn report_parse_error(err: &clap::Error) -> ExitCode {
    let mut dialog = dialog::native();
    match err.kind() {
        clap::error::ErrorKind::DisplayVersion => {
            dialog.help(&format!("{} {}", FALLBACK_PROGRAM, env!("CARGO_PKG_VERSION")));
            ExitCode::Success
        }
        _ => {
            let program = std::env::current_exe()
                .map(|path| program_name(&path))
                .unwrap_or_else(|_| FALLBACK_PROGRAM.to_string());
            dialog.help(&usage(&program));
            ExitCode::Failure
        }
    }
}
