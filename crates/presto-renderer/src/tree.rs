//! In-memory document tree.
//!
//! Nodes live in an arena owned by [`DocumentTree`] and link to their
//! parent, children and siblings by [`NodeId`]. The tree is move-only: it
//! cannot be cloned, any number of renders may borrow it, and it is
//! released exactly once, either by [`DocumentTree::release`] or by going
//! out of scope.

use std::fmt;

use crate::builder;
use crate::error::ParseError;
use crate::options::{Options, Phase};

/// Handle to a node inside one [`DocumentTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Kind of list marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListType {
    /// `-`, `+` or `*` markers.
    Bullet,
    /// Numbered markers.
    Ordered,
}

/// Delimiter after an ordered list number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListDelim {
    /// `1.`
    Period,
    /// `1)`
    Paren,
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of every tree.
    Document,
    /// `>` quoted blocks.
    BlockQuote,
    List {
        list_type: ListType,
        /// First number of an ordered list, 0 for bullet lists.
        start: u64,
        /// `None` for bullet lists.
        delim: Option<ListDelim>,
        /// No blank line separates the items or their blocks.
        tight: bool,
    },
    Item,
    /// Fenced or indented code.
    CodeBlock {
        /// Info string after the opening fence, empty when indented.
        info: String,
        /// Code text, with its line endings.
        literal: String,
    },
    /// Raw HTML block.
    HtmlBlock(String),
    Paragraph,
    /// ATX or setext heading, level 1 to 6.
    Heading(u8),
    ThematicBreak,
    Text(String),
    /// Line ending inside a paragraph.
    SoftBreak,
    /// Hard line break (trailing backslash or two spaces).
    LineBreak,
    /// Inline code span.
    Code(String),
    /// Raw inline HTML.
    HtmlInline(String),
    Emph,
    Strong,
    /// Link; the children are its text.
    Link {
        url: String,
        title: String,
    },
    /// Image; the children are its alt text.
    Image {
        url: String,
        title: String,
    },
}

impl NodeKind {
    /// Element name used by the XML renderer.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::BlockQuote => "block_quote",
            NodeKind::List { .. } => "list",
            NodeKind::Item => "item",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::HtmlBlock(_) => "html_block",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading(_) => "heading",
            NodeKind::ThematicBreak => "thematic_break",
            NodeKind::Text(_) => "text",
            NodeKind::SoftBreak => "softbreak",
            NodeKind::LineBreak => "linebreak",
            NodeKind::Code(_) => "code",
            NodeKind::HtmlInline(_) => "html_inline",
            NodeKind::Emph => "emph",
            NodeKind::Strong => "strong",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
        }
    }

    /// Whether this is a block-level node.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::BlockQuote
                | NodeKind::List { .. }
                | NodeKind::Item
                | NodeKind::CodeBlock { .. }
                | NodeKind::HtmlBlock(_)
                | NodeKind::Paragraph
                | NodeKind::Heading(_)
                | NodeKind::ThematicBreak
        )
    }

    /// Whether this node never has children.
    ///
    /// Leaves produce a single [`WalkEvent::Enter`] during a walk.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::CodeBlock { .. }
                | NodeKind::HtmlBlock(_)
                | NodeKind::ThematicBreak
                | NodeKind::Text(_)
                | NodeKind::SoftBreak
                | NodeKind::LineBreak
                | NodeKind::Code(_)
                | NodeKind::HtmlInline(_)
        )
    }

    /// Literal content of text-like nodes.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            NodeKind::Text(s) | NodeKind::Code(s) | NodeKind::HtmlInline(s) | NodeKind::HtmlBlock(s) => {
                Some(s)
            }
            NodeKind::CodeBlock { literal, .. } => Some(literal),
            _ => None,
        }
    }
}

/// Source span of a block, 1-based and inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePos {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    pos: Option<SourcePos>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Parsed document.
///
/// # Example
///
/// ```
/// use presto_renderer::{DocumentTree, Options, RenderTarget};
///
/// let tree = DocumentTree::parse("This is *my* html.", Options::default());
/// let html = tree.render(&RenderTarget::html(Options::default())).unwrap();
/// let latex = tree.render(&RenderTarget::latex(Options::default(), 0)).unwrap();
/// tree.release();
///
/// assert_eq!(html, "<p>This is <em>my</em> html.</p>\n");
/// assert_eq!(latex, "This is \\emph{my} html.\n");
/// ```
#[derive(Debug)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    /// Parse CommonMark text.
    ///
    /// Only parse-phase flags ([`Options::NORMALIZE`], [`Options::SMART`])
    /// take effect here.
    #[must_use]
    pub fn parse(text: &str, options: Options) -> Self {
        let tree = builder::build(text, options.applied(Phase::Parse));
        tracing::trace!(nodes = tree.nodes.len(), "Built document tree");
        tree
    }

    /// Parse CommonMark bytes.
    ///
    /// With [`Options::VALIDATE_UTF8`] invalid sequences are replaced by
    /// U+FFFD; without it they are an error.
    pub fn parse_bytes(bytes: &[u8], options: Options) -> Result<Self, ParseError> {
        if options.contains(Options::VALIDATE_UTF8) {
            Ok(Self::parse(&String::from_utf8_lossy(bytes), options))
        } else {
            Ok(Self::parse(std::str::from_utf8(bytes)?, options))
        }
    }

    /// Release the tree.
    ///
    /// Equivalent to dropping it; spelled out for call sites that want the
    /// end of the tree's lifetime to be visible.
    pub fn release(self) {
        tracing::trace!(nodes = self.nodes.len(), "Released document tree");
    }

    /// The document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Source span, recorded for block nodes only.
    #[must_use]
    pub fn source_pos(&self, id: NodeId) -> Option<SourcePos> {
        self.nodes[id.0].pos
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    #[must_use]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(id), |&child| self.next(child))
    }

    /// Kind of the parent node, if any.
    #[must_use]
    pub fn parent_kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.parent(id).map(|parent| self.kind(parent))
    }

    /// Number of earlier siblings.
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> usize {
        std::iter::successors(self.prev(id), |&prev| self.prev(prev)).count()
    }

    /// Concatenated literal of the run of text nodes starting at `id`.
    #[must_use]
    pub fn text_run(&self, id: NodeId) -> String {
        std::iter::successors(Some(id), |&node| self.next(node))
            .map_while(|node| match self.kind(node) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Depth-first walk emitting enter and exit events.
    #[must_use]
    pub fn walk(&self) -> Walker<'_> {
        Walker {
            tree: self,
            root: self.root(),
            next: Some(WalkEvent::Enter(self.root())),
        }
    }

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                pos: None,
                parent: None,
                first_child: None,
                last_child: None,
                prev: None,
                next: None,
            }],
        }
    }

    /// Append a new last child to `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let prev = self.nodes[parent.0].last_child;
        self.nodes.push(Node {
            kind,
            pos: None,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            prev,
            next: None,
        });
        match prev {
            Some(prev) => self.nodes[prev.0].next = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub(crate) fn set_source_pos(&mut self, id: NodeId, pos: SourcePos) {
        self.nodes[id.0].pos = Some(pos);
    }

    /// Merge each run of adjacent text nodes into its first node.
    pub(crate) fn consolidate_text_nodes(&mut self) {
        for index in 0..self.nodes.len() {
            if !matches!(self.nodes[index].kind, NodeKind::Text(_)) {
                continue;
            }
            while let Some(next) = self.nodes[index].next {
                let tail = match &mut self.nodes[next.0].kind {
                    NodeKind::Text(tail) => std::mem::take(tail),
                    _ => break,
                };
                if let NodeKind::Text(head) = &mut self.nodes[index].kind {
                    head.push_str(&tail);
                }
                self.unlink(next);
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Node {
            parent, prev, next, ..
        } = self.nodes[id.0];
        match prev {
            Some(prev) => self.nodes[prev.0].next = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev = None;
        node.next = None;
    }
}

/// Event produced by [`Walker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Exit(NodeId),
}

impl WalkEvent {
    #[must_use]
    pub fn node(self) -> NodeId {
        match self {
            WalkEvent::Enter(id) | WalkEvent::Exit(id) => id,
        }
    }

    #[must_use]
    pub fn is_enter(self) -> bool {
        matches!(self, WalkEvent::Enter(_))
    }
}

/// Depth-first iterator over a [`DocumentTree`].
///
/// Container nodes yield an enter and an exit event, leaves only an enter.
pub struct Walker<'a> {
    tree: &'a DocumentTree,
    root: NodeId,
    next: Option<WalkEvent>,
}

impl Walker<'_> {
    /// Skip the remaining children of `id` and its exit event.
    pub fn skip_children(&mut self, id: NodeId) {
        self.next = self.after(id);
    }

    fn after(&self, id: NodeId) -> Option<WalkEvent> {
        if id == self.root {
            return None;
        }
        match self.tree.next(id) {
            Some(sibling) => Some(WalkEvent::Enter(sibling)),
            None => self.tree.parent(id).map(WalkEvent::Exit),
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let current = self.next?;
        self.next = match current {
            WalkEvent::Enter(id) if !self.tree.kind(id).is_leaf() => {
                match self.tree.first_child(id) {
                    Some(child) => Some(WalkEvent::Enter(child)),
                    None => Some(WalkEvent::Exit(id)),
                }
            }
            WalkEvent::Enter(id) | WalkEvent::Exit(id) => self.after(id),
        };
        Some(current)
    }
}
