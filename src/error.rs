//! Error types and exit codes.
//!
//! The `Display` text of every [`Error`] variant is exactly what the user
//! reads in the error dialog, so the wording is kept short and path-first.

use std::io;
use std::path::PathBuf;

/// Exit codes for the application.
///
/// - 0: Success (conversion written, verb installed or removed)
/// - 1: Failure (error dialog shown, overwrite declined, or help displayed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The requested command completed.
    Success = 0,
    /// The command failed, was declined, or only help was shown.
    Failure = 1,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix used in log lines.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MH000",
            Self::Failure => "MH001",
        }
    }

    /// Map a child process exit status onto the two codes this tool reports.
    #[must_use]
    pub fn from_status(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Errors raised while converting a file or editing the shell verb.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input path does not carry the `.md` extension.
    #[error("\"{}\" is not a markdown (.md) file.", .0.display())]
    NotMarkdown(PathBuf),

    /// Input path does not name an existing file.
    #[error("\"{}\" cannot be found.", .0.display())]
    NotFound(PathBuf),

    /// The computed output path is a directory.
    #[error("\"{}\" cannot be overwritten because it is a directory.", .0.display())]
    OutputIsDirectory(PathBuf),

    /// The user answered No to the overwrite prompt.
    #[error("\"{}\" was left unchanged.", .0.display())]
    OverwriteDeclined(PathBuf),

    /// Writing the output failed with a permission error.
    #[error("Access to the path \"{}\" is denied.", .0.display())]
    AccessDenied(PathBuf),

    /// Writing the output failed for any other reason.
    #[error("Unspecified error trying to write to \"{}\".", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the markdown source failed.
    #[error("\"{}\" cannot be read: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rendering the standalone document template failed.
    #[error("HTML template error: {0}")]
    Template(#[from] askama::Error),

    /// A registry operation failed.
    #[error("Registry error on \"{key}\": {source}")]
    Registry {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The shell verb cannot be managed on this platform.
    #[error("The shortcut menu can only be configured on Windows.")]
    Unsupported,

    /// The console worker could not be started or talked to.
    #[error("The conversion worker failed: {0}")]
    Worker(#[source] io::Error),
}

/// Convenient alias for results returned by the library.
pub type Result<T> = std::result::Result<T, Error>;
