//! Standalone HTML document wrapper using the `askama` template engine.
//!
//! The body markup is inserted verbatim; the title and stylesheet href are
//! escaped by the template.

use askama::Template;

/// A complete HTML5 page around converted markdown.
#[derive(Template)]
#[template(path = "document.html")]
pub struct Document {
    /// Page title
    pub title: String,
    /// Rendered markdown body
    pub body: String,
    /// Optional stylesheet href
    pub stylesheet: Option<String>,
    /// Generator version
    pub version: &'static str,
}

impl Document {
    /// Create a document for the given title and body.
    #[must_use]
    pub fn new(title: String, body: String, stylesheet: Option<String>) -> Self {
        Self {
            title,
            body,
            stylesheet,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }
}
