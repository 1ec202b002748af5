//! Builds a [`DocumentTree`] from pulldown-cmark events.
//!
//! pulldown-cmark drops the paragraph wrapper inside items of tight lists;
//! the builder restores it as an implicit paragraph so that every renderer
//! sees the same block structure regardless of list tightness.

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{
    CodeBlockKind, Event, HeadingLevel, LinkType, Options as ParserOptions, Parser, Tag, TagEnd,
};

use crate::options::Options;
use crate::tree::{DocumentTree, ListDelim, ListType, NodeId, NodeKind, SourcePos};

/// Parse `text` into a tree. Only parse-phase flags are expected here.
pub(crate) fn build(text: &str, options: Options) -> DocumentTree {
    let mut parser_options = ParserOptions::empty();
    if options.contains(Options::SMART) {
        parser_options |= ParserOptions::ENABLE_SMART_PUNCTUATION;
    }

    let mut builder = TreeBuilder::new(text);
    for (event, range) in Parser::new_ext(text, parser_options).into_offset_iter() {
        builder.event(event, range);
    }
    let mut tree = builder.finish();

    if options.contains(Options::NORMALIZE) {
        tree.consolidate_text_nodes();
    }
    tree
}

/// Maps byte offsets to 1-based line and column numbers.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        (line + 1, offset - self.starts[line] + 1)
    }

    /// Span of `range`, with the end on the last byte before any trailing
    /// line ending.
    fn span(&self, range: &Range<usize>) -> SourcePos {
        let bytes = self.source.as_bytes();
        let mut end = range.end.min(bytes.len());
        while end > range.start && matches!(bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        let (start_line, start_column) = self.position(range.start);
        let (end_line, end_column) = if end > range.start {
            self.position(end - 1)
        } else {
            (start_line, start_column)
        };
        SourcePos {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// `range.end` moved back over trailing whitespace.
    fn content_end(&self, range: &Range<usize>) -> usize {
        let bytes = self.source.as_bytes();
        let mut end = range.end.min(bytes.len());
        while end > range.start && matches!(bytes[end - 1], b' ' | b'\t' | b'\r' | b'\n') {
            end -= 1;
        }
        end
    }

    /// Whether a blank line lies between `from` and `to`. Lines holding only
    /// block quote markers count as blank.
    fn blank_line_between(&self, from: usize, to: usize) -> bool {
        let Some(gap) = self.source.get(from..to) else {
            return false;
        };
        let mut lines = gap.split('\n');
        lines.next();
        let mut lines = lines.peekable();
        while let Some(line) = lines.next() {
            if lines.peek().is_none() {
                break;
            }
            if line.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'>')) {
                return true;
            }
        }
        false
    }

    /// Byte that terminates the number of an ordered list marker.
    fn list_delim(&self, range: &Range<usize>) -> ListDelim {
        let marker = &self.source.as_bytes()[range.start..];
        let delim = marker
            .iter()
            .skip_while(|b| !b.is_ascii_digit())
            .find(|b| !b.is_ascii_digit());
        match delim {
            Some(b')') => ListDelim::Paren,
            _ => ListDelim::Period,
        }
    }
}

struct TreeBuilder<'a> {
    lines: LineIndex<'a>,
    tree: DocumentTree,
    stack: Vec<NodeId>,
    /// Paragraph opened for inline content of a tight list item, with the
    /// byte range it covers so far.
    implicit: Option<(NodeId, Range<usize>)>,
    /// End of the last closed block child, keyed by parent.
    block_ends: HashMap<NodeId, usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let tree = DocumentTree::new();
        let root = tree.root();
        Self {
            lines: LineIndex::new(source),
            tree,
            stack: vec![root],
            implicit: None,
            block_ends: HashMap::new(),
        }
    }

    fn finish(mut self) -> DocumentTree {
        self.close_implicit();
        let root = self.tree.root();
        let span = self.lines.span(&(0..self.lines.source.len()));
        self.tree.set_source_pos(root, span);
        self.tree
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag, &range),
            Event::Text(text) => self.text(&text, range),
            Event::Html(html) => self.text(&html, range),
            Event::Code(code) => self.inline(NodeKind::Code(code.into_string()), range),
            Event::InlineHtml(html) => self.inline(NodeKind::HtmlInline(html.into_string()), range),
            Event::SoftBreak => self.inline(NodeKind::SoftBreak, range),
            Event::HardBreak => self.inline(NodeKind::LineBreak, range),
            Event::Rule => {
                self.close_implicit();
                self.block(NodeKind::ThematicBreak, &range);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => {
                if matches!(self.tree.kind(self.top()), NodeKind::Item) {
                    self.mark_loose();
                }
                NodeKind::Paragraph
            }
            Tag::Heading { level, .. } => NodeKind::Heading(heading_level(level)),
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::CodeBlock(kind) => NodeKind::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) => info.into_string(),
                    CodeBlockKind::Indented => String::new(),
                },
                literal: String::new(),
            },
            Tag::HtmlBlock => NodeKind::HtmlBlock(String::new()),
            Tag::List(start) => match start {
                Some(start) => NodeKind::List {
                    list_type: ListType::Ordered,
                    start,
                    delim: Some(self.lines.list_delim(&range)),
                    tight: true,
                },
                None => NodeKind::List {
                    list_type: ListType::Bullet,
                    start: 0,
                    delim: None,
                    tight: true,
                },
            },
            Tag::Item => NodeKind::Item,
            Tag::Emphasis => NodeKind::Emph,
            Tag::Strong => NodeKind::Strong,
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => NodeKind::Link {
                url: destination(link_type, &dest_url),
                title: title.into_string(),
            },
            Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            } => NodeKind::Image {
                url: destination(link_type, &dest_url),
                title: title.into_string(),
            },
            _ => return,
        };

        let id = if kind.is_block() {
            self.close_implicit();
            self.block(kind, &range)
        } else {
            let parent = self.inline_parent(&range);
            self.tree.append(parent, kind)
        };
        self.stack.push(id);
    }

    fn end(&mut self, tag: TagEnd, range: &Range<usize>) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::List(_)
            | TagEnd::Item => {
                self.close_implicit();
                if let Some(id) = self.stack.pop() {
                    self.record_end(id, self.lines.content_end(range));
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Link | TagEnd::Image => {
                self.stack.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        let top = self.top();
        match self.tree.kind_mut(top) {
            NodeKind::CodeBlock { literal, .. } | NodeKind::HtmlBlock(literal) => {
                literal.push_str(text);
            }
            _ => self.inline(NodeKind::Text(text.to_owned()), range),
        }
    }

    fn inline(&mut self, kind: NodeKind, range: Range<usize>) {
        let parent = self.inline_parent(&range);
        self.tree.append(parent, kind);
    }

    fn block(&mut self, kind: NodeKind, range: &Range<usize>) -> NodeId {
        let parent = self.top();
        self.check_separation(parent, range.start);
        let id = self.tree.append(parent, kind);
        self.tree.set_source_pos(id, self.lines.span(range));
        if matches!(self.tree.kind(id), NodeKind::ThematicBreak) {
            self.record_end(id, self.lines.content_end(range));
        }
        id
    }

    fn record_end(&mut self, id: NodeId, end: usize) {
        if let Some(parent) = self.tree.parent(id) {
            self.block_ends.insert(parent, end);
        }
    }

    /// Mark the enclosing list loose when a blank line separates a new block
    /// from the previous block child of the same item or list.
    fn check_separation(&mut self, parent: NodeId, start: usize) {
        let list = match self.tree.kind(parent) {
            NodeKind::List { .. } => parent,
            NodeKind::Item => match self.tree.parent(parent) {
                Some(list) => list,
                None => return,
            },
            _ => return,
        };
        if let Some(&end) = self.block_ends.get(&parent)
            && self.lines.blank_line_between(end, start)
        {
            self.set_loose(list);
        }
    }

    /// Container for an inline node, opening an implicit paragraph when the
    /// content sits directly in a list item.
    fn inline_parent(&mut self, range: &Range<usize>) -> NodeId {
        let top = self.top();
        if matches!(self.tree.kind(top), NodeKind::Item) {
            let id = self.tree.append(top, NodeKind::Paragraph);
            self.stack.push(id);
            self.implicit = Some((id, range.clone()));
        } else if let Some((_, span)) = &mut self.implicit {
            span.end = span.end.max(range.end);
        }
        self.top()
    }

    fn close_implicit(&mut self) {
        let Some((id, span)) = self.implicit.take() else {
            return;
        };
        self.tree.set_source_pos(id, self.lines.span(&span));
        self.record_end(id, self.lines.content_end(&span));
        if self.stack.last() == Some(&id) {
            self.stack.pop();
        }
    }

    /// Flag the list containing the current item as loose.
    fn mark_loose(&mut self) {
        if let Some(list) = self.tree.parent(self.top()) {
            self.set_loose(list);
        }
    }

    fn set_loose(&mut self, list: NodeId) {
        if let NodeKind::List { tight, .. } = self.tree.kind_mut(list) {
            *tight = false;
        }
    }
}

fn destination(link_type: LinkType, url: &str) -> String {
    match link_type {
        LinkType::Email => format!("mailto:{url}"),
        _ => url.to_owned(),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
