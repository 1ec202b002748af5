//! Markdown rendering with HTML entity support.
//!
//! This crate is the public face of the workspace. It ties the entity
//! table of [`presto_entities`] to the document tree and renderers of
//! [`presto_renderer`]:
//!
//! - [`to_html`] and [`render`] parse text and serialize it in one call
//! - [`Markdown`] carries text through optional entity substitution into
//!   any of the five output formats
//! - [`config::RenderConfig`] describes a render in TOML
//!
//! # Example
//!
//! ```
//! use presto::{Markdown, Options};
//!
//! let doc = Markdown::new(r"\Aacute *la* carte").with_entities();
//! assert_eq!(doc.to_html(Options::default()).unwrap(), "<p>Á <em>la</em> carte</p>\n");
//! assert_eq!(doc.render_latex(Options::default(), 0).unwrap(), "Á \\emph{la} carte\n");
//! ```

pub mod config;

pub use config::{ConfigError, RenderConfig};
pub use presto_entities::{
    EntityTable, HtmlEntity, Lookup, decode_references, substitute_entities,
};
pub use presto_renderer::{
    DocumentTree, NodeId, NodeKind, Options, OptionsError, ParseError, Phase, RenderError,
    RenderTarget, SourcePos, WalkEvent,
};

/// Any failure of the public API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input could not be turned into a document tree.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A document tree could not be serialized.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A render configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parse `text` and render it as HTML.
pub fn to_html(text: &str, options: Options) -> Result<String, Error> {
    Ok(presto_renderer::to_html(text, options)?)
}

/// Parse `text` with the target's options and render it in the target's
/// format.
pub fn render(text: &str, target: &RenderTarget) -> Result<String, Error> {
    let tree = DocumentTree::parse(text, target.options());
    let output = tree.render(target);
    tree.release();
    Ok(output?)
}

/// Like [`render`], for input that may not be UTF-8.
///
/// Invalid input is repaired when the target's options include
/// [`Options::VALIDATE_UTF8`] and rejected otherwise.
pub fn render_bytes(bytes: &[u8], target: &RenderTarget) -> Result<String, Error> {
    let tree = DocumentTree::parse_bytes(bytes, target.options())?;
    let output = tree.render(target);
    tree.release();
    Ok(output?)
}

/// Markdown source text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markdown {
    text: String,
}

impl Markdown {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Replace backslash entity escapes with their characters.
    #[must_use]
    pub fn with_entities(self) -> Self {
        Self {
            text: substitute_entities(&self.text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parse this text into a tree for repeated rendering.
    pub fn parse(&self, options: Options) -> DocumentTree {
        DocumentTree::parse(&self.text, options)
    }

    pub fn to_html(&self, options: Options) -> Result<String, Error> {
        to_html(&self.text, options)
    }

    pub fn render(&self, target: &RenderTarget) -> Result<String, Error> {
        render(&self.text, target)
    }

    pub fn render_html(&self, options: Options) -> Result<String, Error> {
        self.render(&RenderTarget::html(options))
    }

    pub fn render_xml(&self, options: Options) -> Result<String, Error> {
        self.render(&RenderTarget::xml(options))
    }

    pub fn render_man(&self, options: Options, width: i32) -> Result<String, Error> {
        self.render(&RenderTarget::man(options, width))
    }

    pub fn render_commonmark(&self, options: Options, width: i32) -> Result<String, Error> {
        self.render(&RenderTarget::commonmark(options, width))
    }

    pub fn render_latex(&self, options: Options, width: i32) -> Result<String, Error> {
        self.render(&RenderTarget::latex(options, width))
    }
}

impl From<&str> for Markdown {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Markdown {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Markdown {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
