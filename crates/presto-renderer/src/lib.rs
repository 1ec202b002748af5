//! CommonMark document tree with five output formats.
//!
//! Text is parsed once into a [`DocumentTree`], which any number of
//! [`RenderTarget`]s can then serialize:
//!
//! - HTML
//! - CommonMark XML
//! - groff man
//! - CommonMark (re-serialized source)
//! - LaTeX
//!
//! Behavior is controlled by [`Options`]. Parse flags (`NORMALIZE`,
//! `VALIDATE_UTF8`, `SMART`) only affect [`DocumentTree::parse`]; render
//! flags (`SOURCE_POS`, `HARD_BREAKS`, `NO_BREAKS`, `SAFE`) only affect
//! [`render`].
//!
//! # Example
//!
//! ```
//! use presto_renderer::{DocumentTree, Options, RenderTarget};
//!
//! let tree = DocumentTree::parse("This is *my* html.", Options::default());
//! let man = tree.render(&RenderTarget::man(Options::default(), 0)).unwrap();
//! let markdown = tree.render(&RenderTarget::commonmark(Options::default(), 0)).unwrap();
//! tree.release();
//!
//! assert_eq!(man, ".PP\nThis is \\f[I]my\\f[] html.\n");
//! assert_eq!(markdown, "This is *my* html.\n");
//! ```

mod builder;
mod error;
mod escape;
mod options;
mod render;
mod tree;

pub use error::{OptionsError, ParseError, RenderError};
pub use escape::{escape_href, escape_html, is_dangerous_url};
pub use options::{Options, Phase};
pub use render::{RenderTarget, render, to_html};
pub use tree::{DocumentTree, ListDelim, ListType, NodeId, NodeKind, SourcePos, WalkEvent, Walker};
