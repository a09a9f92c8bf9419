//! mdtohtml - "Convert to HTML" for Markdown files
//!
//! A small Windows utility that registers a right-click shell verb for `.md`
//! files and, when invoked on one, writes the converted HTML next to it.
//! Errors and questions are presented as modal dialogs.

pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod dialog;
pub mod document;
pub mod error;
pub mod logging;
pub mod shell;
pub mod watcher;

pub use app::{report_parse_error, run_app, App};
pub use error::{Error, ExitCode, Result};
