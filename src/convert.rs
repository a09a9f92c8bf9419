//! Markdown file to HTML file conversion.
//!
//! The conversion is a fixed sequence:
//!
//! 1. [`check_markdown`] - the input must be an existing `.md` file
//! 2. [`html_path`] - the output sits next to it with an `.html` extension
//! 3. [`check_output`] - an existing output file needs the user's consent,
//!    a directory in the way is an error
//! 4. [`Converter::render`] - pulldown-cmark turns the text into HTML
//! 5. the result is written, truncating any previous output
//!
//! # Example
//!
//! ```rust,no_run
//! use mdtohtml::convert::{Converter, Extensions, OutputFormat};
//! use mdtohtml::dialog;
//!
//! let converter = Converter::new(&Extensions::default(), OutputFormat::Fragment);
//! let mut dialog = dialog::native();
//! let written = converter.convert_file("notes.md".as_ref(), &mut dialog)?;
//! println!("Wrote {}", written.display());
//! # Ok::<(), mdtohtml::Error>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::dialog::Dialog;
use crate::document::Document;
use crate::error::{Error, Result};

/// Extension of the markdown input, compared case-insensitively.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Extension given to the output file.
pub const HTML_EXTENSION: &str = "html";

/// Shape of the generated HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Body markup only.
    #[default]
    Fragment,
    /// A complete HTML5 document with head and title.
    Document,
}

/// Markdown syntax extensions beyond CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
    pub heading_attributes: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }
}

impl Extensions {
    /// Parser options for the enabled extensions.
    #[must_use]
    pub fn options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        options
    }
}

/// Validate the input markdown path.
///
/// # Errors
///
/// [`Error::NotMarkdown`] when the extension is not `.md`, then
/// [`Error::NotFound`] when no file exists at the path.
pub fn check_markdown(path: &Path) -> Result<()> {
    if !has_markdown_extension(path) {
        return Err(Error::NotMarkdown(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Whether the file name ends in `.md`, ignoring case.
///
/// A file named just `.md` counts, although [`Path::extension`] sees no
/// extension in it.
fn has_markdown_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION),
        None => is_bare_extension(path),
    }
}

fn is_bare_extension(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.eq_ignore_ascii_case(format!(".{MARKDOWN_EXTENSION}")))
}

/// Output path for a markdown file: same directory and stem, `.html` extension.
/// A file named `.md` becomes `.html`.
#[must_use]
pub fn html_path(markdown: &Path) -> PathBuf {
    if is_bare_extension(markdown) {
        markdown.with_file_name(format!(".{HTML_EXTENSION}"))
    } else {
        markdown.with_extension(HTML_EXTENSION)
    }
}

/// Make sure the output path can be written.
///
/// An existing file is only replaced after the user answers Yes.
///
/// # Errors
///
/// [`Error::OverwriteDeclined`] when the user answers No, and
/// [`Error::OutputIsDirectory`] when a directory occupies the path.
pub fn check_output<D: Dialog + ?Sized>(html: &Path, dialog: &mut D) -> Result<()> {
    if html.is_file() {
        let question = format!(
            "The file \"{}\" already exists.\n\nDo you want to overwrite it?",
            html.display()
        );
        if !dialog.confirm(&question) {
            return Err(Error::OverwriteDeclined(html.to_path_buf()));
        }
    } else if html.is_dir() {
        return Err(Error::OutputIsDirectory(html.to_path_buf()));
    }
    Ok(())
}

/// Markdown renderer configured with extensions and an output shape.
#[derive(Debug, Clone)]
pub struct Converter {
    options: Options,
    output: OutputFormat,
    stylesheet: Option<String>,
}

impl Converter {
    /// Create a converter.
    #[must_use]
    pub fn new(extensions: &Extensions, output: OutputFormat) -> Self {
        Self {
            options: extensions.options(),
            output,
            stylesheet: None,
        }
    }

    /// Link a stylesheet from generated documents. Ignored for fragments.
    #[must_use]
    pub fn with_stylesheet(mut self, href: Option<String>) -> Self {
        self.stylesheet = href;
        self
    }

    /// Render markdown text to HTML.
    ///
    /// `fallback_title` names the document when the text has no heading.
    ///
    /// # Errors
    ///
    /// Only the document template can fail.
    pub fn render(&self, markdown: &str, fallback_title: &str) -> Result<String> {
        let markdown = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
        let events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options).collect();

        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut body, events.iter().cloned());

        match self.output {
            OutputFormat::Fragment => Ok(body),
            OutputFormat::Document => {
                let title = first_heading(&events).unwrap_or_else(|| fallback_title.to_string());
                let document = Document::new(title, body, self.stylesheet.clone());
                Ok(document.to_html()?)
            }
        }
    }

    /// Convert a markdown file and write the HTML next to it.
    ///
    /// Returns the path that was written.
    ///
    /// # Errors
    ///
    /// Any validation error from [`check_markdown`] or [`check_output`],
    /// [`Error::ReadFailed`] when the source cannot be read, and
    /// [`Error::AccessDenied`] or [`Error::WriteFailed`] when the output
    /// cannot be written.
    pub fn convert_file<D: Dialog + ?Sized>(
        &self,
        markdown: &Path,
        dialog: &mut D,
    ) -> Result<PathBuf> {
        check_markdown(markdown)?;
        let html = html_path(markdown);
        check_output(&html, dialog)?;

        let text = fs::read_to_string(markdown).map_err(|source| Error::ReadFailed {
            path: markdown.to_path_buf(),
            source,
        })?;
        let title = markdown
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rendered = self.render(&text, &title)?;

        log::debug!(
            "Rendered {} bytes of markdown into {} bytes of HTML",
            text.len(),
            rendered.len()
        );

        fs::write(&html, rendered).map_err(|source| write_error(&html, source))?;
        log::info!("Converted {} -> {}", markdown.display(), html.display());
        Ok(html)
    }
}

fn write_error(path: &Path, source: io::Error) -> Error {
    if source.kind() == io::ErrorKind::PermissionDenied {
        Error::AccessDenied(path.to_path_buf())
    } else {
        Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Plain text of the first heading, if any.
fn first_heading(events: &[Event<'_>]) -> Option<String> {
    let start = events
        .iter()
        .position(|event| matches!(event, Event::Start(Tag::Heading { .. })))?;

    let mut title = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(text) | Event::Code(text) => title.push_str(text),
            Event::SoftBreak | Event::HardBreak => title.push(' '),
            _ => {}
        }
    }

    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
