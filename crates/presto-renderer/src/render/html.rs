//! HTML serializer.

use std::fmt::Write;

use crate::escape::{is_dangerous_url, push_escaped_href, push_escaped_html};
use crate::options::Options;
use crate::tree::{DocumentTree, ListType, NodeId, NodeKind, WalkEvent};

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

pub(super) fn render(tree: &DocumentTree, options: Options) -> Result<String, std::fmt::Error> {
    let mut renderer = HtmlRenderer {
        tree,
        options,
        out: String::with_capacity(1024),
        plain: None,
    };
    for event in tree.walk() {
        renderer.event(event)?;
    }
    Ok(renderer.out)
}

struct HtmlRenderer<'a> {
    tree: &'a DocumentTree,
    options: Options,
    out: String,
    /// Image whose description is being written as plain alt text.
    plain: Option<NodeId>,
}

impl HtmlRenderer<'_> {
    fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn source_pos(&mut self, id: NodeId) -> std::fmt::Result {
        if self.options.contains(Options::SOURCE_POS)
            && let Some(pos) = self.tree.source_pos(id)
        {
            write!(self.out, " data-sourcepos=\"{pos}\"")?;
        }
        Ok(())
    }

    fn raw(&mut self, literal: &str) {
        if self.options.contains(Options::SAFE) {
            self.out.push_str(RAW_HTML_OMITTED);
        } else {
            self.out.push_str(literal);
        }
    }

    fn destination(&mut self, url: &str) {
        if !(self.options.contains(Options::SAFE) && is_dangerous_url(url)) {
            push_escaped_href(&mut self.out, url);
        }
    }

    /// Alt text mode: only the text content of an image description.
    fn plain_event(&mut self, event: WalkEvent) {
        let WalkEvent::Enter(id) = event else {
            return;
        };
        match self.tree.kind(id) {
            NodeKind::Text(literal) | NodeKind::Code(literal) | NodeKind::HtmlInline(literal) => {
                push_escaped_html(&mut self.out, literal);
            }
            NodeKind::LineBreak | NodeKind::SoftBreak => self.out.push(' '),
            _ => {}
        }
    }

    /// Whether paragraphs under `paragraph`'s item are rendered bare.
    fn in_tight_list(&self, paragraph: NodeId) -> bool {
        let grandparent = self
            .tree
            .parent(paragraph)
            .and_then(|parent| self.tree.parent(parent));
        grandparent.is_some_and(|id| matches!(self.tree.kind(id), NodeKind::List { tight: true, .. }))
    }

    #[allow(clippy::too_many_lines)]
    fn event(&mut self, event: WalkEvent) -> std::fmt::Result {
        let id = event.node();
        if self.plain == Some(id) {
            self.plain = None;
        }
        if self.plain.is_some() {
            self.plain_event(event);
            return Ok(());
        }

        let tree = self.tree;
        let entering = event.is_enter();
        match tree.kind(id) {
            NodeKind::Document => {}
            NodeKind::BlockQuote => {
                self.cr();
                if entering {
                    self.out.push_str("<blockquote");
                    self.source_pos(id)?;
                    self.out.push_str(">\n");
                } else {
                    self.out.push_str("</blockquote>\n");
                }
            }
            NodeKind::List {
                list_type, start, ..
            } => {
                self.cr();
                match (list_type, entering) {
                    (ListType::Bullet, true) => {
                        self.out.push_str("<ul");
                        self.source_pos(id)?;
                        self.out.push_str(">\n");
                    }
                    (ListType::Ordered, true) => {
                        self.out.push_str("<ol");
                        if *start != 1 {
                            write!(self.out, " start=\"{start}\"")?;
                        }
                        self.source_pos(id)?;
                        self.out.push_str(">\n");
                    }
                    (ListType::Bullet, false) => self.out.push_str("</ul>\n"),
                    (ListType::Ordered, false) => self.out.push_str("</ol>\n"),
                }
            }
            NodeKind::Item => {
                if entering {
                    self.cr();
                    self.out.push_str("<li");
                    self.source_pos(id)?;
                    self.out.push('>');
                } else {
                    self.out.push_str("</li>\n");
                }
            }
            NodeKind::Heading(level) => {
                if entering {
                    self.cr();
                    write!(self.out, "<h{level}")?;
                    self.source_pos(id)?;
                    self.out.push('>');
                } else {
                    writeln!(self.out, "</h{level}>")?;
                }
            }
            NodeKind::CodeBlock { info, literal } => {
                self.cr();
                self.out.push_str("<pre");
                self.source_pos(id)?;
                self.out.push_str("><code");
                if let Some(language) = info.split(' ').next().filter(|word| !word.is_empty()) {
                    self.out.push_str(" class=\"language-");
                    push_escaped_html(&mut self.out, language);
                    self.out.push('"');
                }
                self.out.push('>');
                push_escaped_html(&mut self.out, literal);
                self.out.push_str("</code></pre>\n");
            }
            NodeKind::HtmlBlock(literal) => {
                self.cr();
                self.raw(literal);
                self.cr();
            }
            NodeKind::ThematicBreak => {
                self.cr();
                self.out.push_str("<hr");
                self.source_pos(id)?;
                self.out.push_str(" />\n");
            }
            NodeKind::Paragraph => {
                if !self.in_tight_list(id) {
                    if entering {
                        self.cr();
                        self.out.push_str("<p");
                        self.source_pos(id)?;
                        self.out.push('>');
                    } else {
                        self.out.push_str("</p>\n");
                    }
                }
            }
            NodeKind::Text(literal) => push_escaped_html(&mut self.out, literal),
            NodeKind::LineBreak => self.out.push_str("<br />\n"),
            NodeKind::SoftBreak => {
                if self.options.contains(Options::HARD_BREAKS) {
                    self.out.push_str("<br />\n");
                } else if self.options.contains(Options::NO_BREAKS) {
                    self.out.push(' ');
                } else {
                    self.out.push('\n');
                }
            }
            NodeKind::Code(literal) => {
                self.out.push_str("<code>");
                push_escaped_html(&mut self.out, literal);
                self.out.push_str("</code>");
            }
            NodeKind::HtmlInline(literal) => self.raw(literal),
            NodeKind::Strong => self
                .out
                .push_str(if entering { "<strong>" } else { "</strong>" }),
            NodeKind::Emph => self.out.push_str(if entering { "<em>" } else { "</em>" }),
            NodeKind::Link { url, title } => {
                if entering {
                    self.out.push_str("<a href=\"");
                    self.destination(url);
                    if !title.is_empty() {
                        self.out.push_str("\" title=\"");
                        push_escaped_html(&mut self.out, title);
                    }
                    self.out.push_str("\">");
                } else {
                    self.out.push_str("</a>");
                }
            }
            NodeKind::Image { url, title } => {
                if entering {
                    self.out.push_str("<img src=\"");
                    self.destination(url);
                    self.out.push_str("\" alt=\"");
                    self.plain = Some(id);
                } else {
                    if !title.is_empty() {
                        self.out.push_str("\" title=\"");
                        push_escaped_html(&mut self.out, title);
                    }
                    self.out.push_str("\" />");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn html(text: &str, options: Options) -> String {
        render(&DocumentTree::parse(text, options), options).unwrap()
    }

    #[test]
    fn test_headings_and_paragraphs() {
        assert_eq!(
            html("# Title\n\nBody text.\n", Options::empty()),
            "<h1>Title</h1>\n<p>Body text.</p>\n"
        );
    }

    #[test]
    fn test_tight_list_has_bare_items() {
        assert_eq!(
            html("- a\n- b\n", Options::empty()),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_list_wraps_paragraphs() {
        assert_eq!(
            html("1. a\n\n2. b\n", Options::empty()),
            "<ol>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(
            html("7. seven\n", Options::empty()),
            "<ol start=\"7\">\n<li>seven</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_nested_tight_list() {
        assert_eq!(
            html("- a\n  - b\n", Options::empty()),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_code_block_language_class() {
        assert_eq!(
            html("```rust extra\nlet x = 1 < 2;\n```\n", Options::empty()),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_block_quote_and_rule() {
        assert_eq!(
            html("> quote\n\n---\n", Options::empty()),
            "<blockquote>\n<p>quote</p>\n</blockquote>\n<hr />\n"
        );
    }

    #[test]
    fn test_soft_break_variants() {
        let text = "one\ntwo";
        assert_eq!(html(text, Options::empty()), "<p>one\ntwo</p>\n");
        assert_eq!(html(text, Options::HARD_BREAKS), "<p>one<br />\ntwo</p>\n");
        assert_eq!(html(text, Options::NO_BREAKS), "<p>one two</p>\n");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(html("one  \ntwo", Options::empty()), "<p>one<br />\ntwo</p>\n");
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            html("[a](http://x.org/?q=1&r=2 \"T\")", Options::empty()),
            "<p><a href=\"http://x.org/?q=1&amp;r=2\" title=\"T\">a</a></p>\n"
        );
    }

    #[test]
    fn test_image_alt_is_plain_text() {
        assert_eq!(
            html("![a *b* `c`](i.png \"t\")", Options::empty()),
            "<p><img src=\"i.png\" alt=\"a b c\" title=\"t\" /></p>\n"
        );
    }

    #[test]
    fn test_safe_mode() {
        assert_eq!(
            html("<div>x</div>\n\n[a](javascript:alert(1)) <b>hi</b>", Options::SAFE),
            "<!-- raw HTML omitted -->\n<p><a href=\"\">a</a> <!-- raw HTML omitted -->hi<!-- raw HTML omitted --></p>\n"
        );
    }

    #[test]
    fn test_raw_html_passes_through() {
        assert_eq!(
            html("<div>x</div>\n\nA <b>b</b>", Options::empty()),
            "<div>x</div>\n<p>A <b>b</b></p>\n"
        );
    }

    #[test]
    fn test_source_positions() {
        assert_eq!(
            html("# T\n\n- a\n", Options::SOURCE_POS),
            "<h1 data-sourcepos=\"1:1-1:3\">T</h1>\n\
             <ul data-sourcepos=\"3:1-3:3\">\n\
             <li data-sourcepos=\"3:1-3:3\">a</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html("", Options::empty()), "");
    }
}
