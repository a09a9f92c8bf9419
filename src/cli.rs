//! Command-line interface definitions.
//!
//! The shell invokes the program with Windows-style slash commands
//! (`/Markdown:<path>`, `/Set[:NoIcon]`, `/Unset`, `/Help`). Clap only handles
//! the ambient flags; the slash command arrives as a single positional value
//! and is parsed by [`parse_command`].
//!
//! # Example
//!
//! ```bash
//! # Install the shortcut menu (same as running without arguments)
//! mdtohtml /Set
//!
//! # Install without an icon
//! mdtohtml /Set:NoIcon
//!
//! # Convert a file, with debug logging
//! mdtohtml -v /Markdown:C:\Notes\todo.md
//! ```

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Converts markdown files to HTML from the Explorer shortcut menu.
#[derive(Debug, Parser)]
#[command(name = "mdtohtml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file to use instead of the per-user default
    #[arg(long, value_name = "PATH", env = "MDTOHTML_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run as the console worker of a hidden launcher
    #[arg(long, hide = true)]
    pub worker: bool,

    /// /Markdown:<path>, /Set[:NoIcon], /Unset or /Help
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,
}

impl Cli {
    /// Interpret the positional slash command.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] when the argument is not one of the known forms.
    pub fn command(&self) -> Result<Command, ParamError> {
        parse_command(self.command.as_deref())
    }

    /// Flags to forward to a worker process so it logs the same way.
    #[must_use]
    pub fn forwarded_flags(&self) -> Vec<OsString> {
        let mut flags = Vec::new();
        if self.quiet {
            flags.push(OsString::from("--quiet"));
        } else if self.verbose > 0 {
            flags.push(OsString::from(format!("-{}", "v".repeat(usize::from(self.verbose)))));
        }
        if let Some(config) = &self.config {
            flags.push(OsString::from("--config"));
            flags.push(config.clone().into_os_string());
        }
        flags
    }
}

/// The four mutually exclusive actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Convert the markdown file to an HTML file next to it.
    Convert(PathBuf),
    /// Install the shortcut menu, with or without the icon.
    Set { icon: bool },
    /// Remove the shortcut menu.
    Unset,
    /// Show the usage text.
    Help,
}

/// Malformed command arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// `/Markdown` without a usable path.
    #[error("/Markdown requires a file path, as in /Markdown:<markdown file path>")]
    MissingPath,

    /// Anything that is not a known form.
    #[error("Unknown argument '{arg}'{}", suggestion_suffix(.suggestion))]
    Unknown {
        arg: String,
        suggestion: Option<&'static str>,
    },
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(form) => format!(". Did you mean {form}?"),
        None => String::new(),
    }
}

/// Known forms: lowercase probe and display spelling.
const FORMS: &[(&str, &str)] = &[
    ("/markdown", "/Markdown:<path>"),
    ("/set", "/Set"),
    ("/set:noicon", "/Set:NoIcon"),
    ("/unset", "/Unset"),
    ("/help", "/Help"),
];

/// Largest edit distance that still earns a suggestion.
const SUGGESTION_DISTANCE: usize = 2;

/// Parse the slash command. `None` means no argument, which installs the menu.
///
/// Matching is case-insensitive. For `/Markdown:` everything after the first
/// colon is the path, so drive letters survive (`/Markdown:C:\a.md`).
///
/// # Examples
///
/// ```
/// use mdtohtml::cli::{parse_command, Command};
/// use std::path::PathBuf;
///
/// assert_eq!(parse_command(None).unwrap(), Command::Set { icon: true });
/// assert_eq!(parse_command(Some("/set:noicon")).unwrap(), Command::Set { icon: false });
/// assert_eq!(
///     parse_command(Some("/Markdown:C:\\notes.md")).unwrap(),
///     Command::Convert(PathBuf::from("C:\\notes.md"))
/// );
/// ```
///
/// # Errors
///
/// Returns [`ParamError::MissingPath`] for `/Markdown:` with an empty path or
/// one that starts with another colon, and [`ParamError::Unknown`] otherwise.
pub fn parse_command(arg: Option<&str>) -> Result<Command, ParamError> {
    let Some(arg) = arg else {
        return Ok(Command::Set { icon: true });
    };

    if let Some((name, path)) = arg.split_once(':') {
        if name.eq_ignore_ascii_case("/markdown") {
            if path.is_empty() || path.starts_with(':') {
                return Err(ParamError::MissingPath);
            }
            return Ok(Command::Convert(PathBuf::from(path)));
        }
    } else if arg.eq_ignore_ascii_case("/markdown") {
        return Err(ParamError::MissingPath);
    }

    match arg.to_ascii_lowercase().as_str() {
        "/set" => Ok(Command::Set { icon: true }),
        "/set:noicon" => Ok(Command::Set { icon: false }),
        "/unset" => Ok(Command::Unset),
        "/help" => Ok(Command::Help),
        _ => Err(ParamError::Unknown {
            arg: arg.to_string(),
            suggestion: suggest(arg),
        }),
    }
}

/// Closest known form within [`SUGGESTION_DISTANCE`] edits.
fn suggest(arg: &str) -> Option<&'static str> {
    let probe = arg.to_ascii_lowercase();
    let head = probe.split(':').next().unwrap_or_default();

    FORMS
        .iter()
        .map(|(key, display)| {
            // The markdown form carries a free-form path, so only its head counts.
            let distance = if *key == "/markdown" {
                strsim::levenshtein(head, key)
            } else {
                strsim::levenshtein(&probe, key)
            };
            (distance, *display)
        })
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, display)| display)
}

/// Build the usage text shown by `/Help` and for malformed input.
#[must_use]
pub fn usage(program: &str) -> String {
    let mut text = String::new();
    text.push_str("The MarkdownToHtml shortcut launcher.\n");
    text.push_str("It converts the selected markdown file to an HTML file next to it.\n\n");
    text.push_str("Syntax:\n");
    text.push_str(&format!("  {program} /Markdown:<markdown file path>\n"));
    text.push_str(&format!("  {program} [/Set[:NoIcon]]\n"));
    text.push_str(&format!("  {program} /Unset\n"));
    text.push_str(&format!("  {program} /Help\n\n"));
    text.push_str("<markdown file path>  The selected markdown's file path.\n");
    text.push_str("                 Set  Configure the shortcut menu in the registry.\n");
    text.push_str("              NoIcon  Specifies that the icon is not configured.\n");
    text.push_str("               Unset  Removes the shortcut menu.\n");
    text.push_str("                Help  Show the help doc.\n");
    text
}
