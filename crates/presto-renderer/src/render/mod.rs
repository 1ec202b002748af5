//! Render targets and dispatch to the format serializers.

mod commonmark;
mod html;
mod latex;
mod man;
mod text;
mod xml;

use std::fmt;

use crate::error::RenderError;
use crate::options::{Options, Phase};
use crate::tree::DocumentTree;

use self::commonmark::CommonMarkBackend;
use self::latex::LatexBackend;
use self::man::ManBackend;
use self::text::TextRenderer;

/// Output format with its render options and, for the text formats, a wrap
/// column. A width of 0 disables wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// HTML fragment.
    Html { options: Options },
    /// CommonMark XML tree dump, one element per node.
    Xml { options: Options },
    /// groff man macros.
    Man { options: Options, width: i32 },
    /// CommonMark re-serialized from the tree.
    CommonMark { options: Options, width: i32 },
    /// LaTeX body markup.
    Latex { options: Options, width: i32 },
}

impl RenderTarget {
    #[must_use]
    pub fn html(options: Options) -> Self {
        Self::Html { options }
    }

    #[must_use]
    pub fn xml(options: Options) -> Self {
        Self::Xml { options }
    }

    #[must_use]
    pub fn man(options: Options, width: i32) -> Self {
        Self::Man { options, width }
    }

    #[must_use]
    pub fn commonmark(options: Options, width: i32) -> Self {
        Self::CommonMark { options, width }
    }

    #[must_use]
    pub fn latex(options: Options, width: i32) -> Self {
        Self::Latex { options, width }
    }

    /// Options carried by the target.
    #[must_use]
    pub fn options(&self) -> Options {
        match *self {
            Self::Html { options }
            | Self::Xml { options }
            | Self::Man { options, .. }
            | Self::CommonMark { options, .. }
            | Self::Latex { options, .. } => options,
        }
    }

    /// Wrap column; always 0 for HTML and XML.
    #[must_use]
    pub fn width(&self) -> i32 {
        match *self {
            Self::Html { .. } | Self::Xml { .. } => 0,
            Self::Man { width, .. } | Self::CommonMark { width, .. } | Self::Latex { width, .. } => {
                width
            }
        }
    }

    /// Short format name, as used in configuration.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html { .. } => "html",
            Self::Xml { .. } => "xml",
            Self::Man { .. } => "man",
            Self::CommonMark { .. } => "commonmark",
            Self::Latex { .. } => "latex",
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize `tree` into the format named by `target`.
///
/// Parse-phase flags in the target's options are ignored. The tree is only
/// borrowed and may be rendered again.
pub fn render(tree: &DocumentTree, target: &RenderTarget) -> Result<String, RenderError> {
    let options = target.options().applied(Phase::Render);
    let width = target.width();
    let width = usize::try_from(width).map_err(|_| RenderError::NegativeWidth(width))?;

    let output = match target {
        RenderTarget::Html { .. } => html::render(tree, options)?,
        RenderTarget::Xml { .. } => xml::render(tree, options)?,
        RenderTarget::Man { .. } => TextRenderer::<ManBackend>::new(options, width).render(tree),
        RenderTarget::CommonMark { .. } => {
            let width = if options.contains(Options::HARD_BREAKS) {
                0
            } else {
                width
            };
            TextRenderer::<CommonMarkBackend>::new(options, width).render(tree)
        }
        RenderTarget::Latex { .. } => TextRenderer::<LatexBackend>::new(options, width).render(tree),
    };
    tracing::trace!(format = %target, bytes = output.len(), "Rendered document");
    Ok(output)
}

/// Parse `text` and render it straight to HTML.
///
/// The intermediate tree never leaves this function.
///
/// # Example
///
/// ```
/// use presto_renderer::{Options, to_html};
///
/// let html = to_html("This is *my* html.", Options::default()).unwrap();
/// assert_eq!(html, "<p>This is <em>my</em> html.</p>\n");
/// ```
pub fn to_html(text: &str, options: Options) -> Result<String, RenderError> {
    let tree = DocumentTree::parse(text, options);
    let html = render(&tree, &RenderTarget::html(options));
    tree.release();
    html
}

impl DocumentTree {
    /// Serialize this tree; see [`render`].
    pub fn render(&self, target: &RenderTarget) -> Result<String, RenderError> {
        render(self, target)
    }
}
