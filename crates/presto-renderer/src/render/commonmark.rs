//! CommonMark serializer.
//!
//! Output re-parses to a tree that renders to the same HTML as the source.

use crate::escape::has_scheme;
use crate::options::Options;
use crate::tree::{DocumentTree, ListDelim, ListType, NodeId, NodeKind, WalkEvent};

use super::text::{Escaping, Step, TextBackend, TextRenderer};

pub(super) struct CommonMarkBackend;

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{0b}' | '\u{0c}' | '\r')
}

fn needs_escape(renderer: &TextRenderer<CommonMarkBackend>, escaping: Escaping, c: char, next: Option<char>) -> bool {
    if !c.is_ascii() {
        return false;
    }
    let follows_digit = renderer.last_byte().is_some_and(|b| b.is_ascii_digit());
    match escaping {
        Escaping::Literal => false,
        Escaping::Normal => {
            matches!(c, '*' | '_' | '[' | ']' | '#' | '<' | '>' | '\\' | '`' | '!')
                || (c == '&' && next.is_some_and(|n| n.is_ascii_alphabetic()))
                || (renderer.begin_content && matches!(c, '-' | '+' | '=') && !follows_digit)
                || (renderer.begin_content
                    && matches!(c, '.' | ')')
                    && follows_digit
                    && next.is_none_or(is_whitespace))
        }
        Escaping::Url => {
            matches!(c, '`' | '<' | '>' | '\\' | '(' | ')') || is_whitespace(c)
        }
        Escaping::Title => matches!(c, '`' | '<' | '>' | '"' | '\\'),
    }
}

/// Whether `id` is an item of a tight list.
fn is_tight_item(tree: &DocumentTree, id: NodeId) -> bool {
    matches!(tree.kind(id), NodeKind::Item)
        && matches!(tree.parent_kind(id), Some(NodeKind::List { tight: true, .. }))
}

fn in_tight_list_item(tree: &DocumentTree, id: NodeId) -> bool {
    let block = std::iter::successors(Some(id), |&node| tree.parent(node))
        .find(|&node| tree.kind(node).is_block());
    block.is_some_and(|block| {
        is_tight_item(tree, block) || tree.parent(block).is_some_and(|parent| is_tight_item(tree, parent))
    })
}

/// A link whose text is its own destination, written as `<url>`.
fn is_autolink(tree: &DocumentTree, id: NodeId, url: &str, title: &str) -> bool {
    if url.is_empty() || !has_scheme(url) || !title.is_empty() {
        return false;
    }
    let Some(text) = tree.first_child(id) else {
        return false;
    };
    tree.text_run(text) == url.strip_prefix("mailto:").unwrap_or(url)
}

/// Length of the longest run of backticks in `code`.
fn longest_backtick_run(code: &str) -> usize {
    code.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Shortest run of backticks that does not occur in `code`.
fn shortest_unused_backtick_run(code: &str) -> usize {
    let used: Vec<usize> = code
        .split(|c| c != '`')
        .map(str::len)
        .filter(|&len| len > 0)
        .collect();
    (1..).find(|len| !used.contains(len)).unwrap_or(1)
}

/// Marker text and prefix width for a list item.
fn item_marker(tree: &DocumentTree, item: NodeId) -> (String, usize) {
    match tree.parent_kind(item) {
        Some(NodeKind::List {
            list_type: ListType::Ordered,
            start,
            delim,
            ..
        }) => {
            let number = *start + tree.sibling_index(item) as u64;
            let delim = match delim {
                Some(ListDelim::Paren) => ')',
                _ => '.',
            };
            let padding = if number < 10 { "  " } else { " " };
            let marker = format!("{number}{delim}{padding}");
            let width = marker.len();
            (marker, width)
        }
        _ => ("  - ".to_owned(), 4),
    }
}

impl TextBackend for CommonMarkBackend {
    fn escape_char(renderer: &mut TextRenderer<Self>, escaping: Escaping, c: char, next: Option<char>) {
        if !needs_escape(renderer, escaping, c, next) {
            renderer.code_point(c);
        } else if is_whitespace(c) {
            renderer.ascii(&format!("%{:2x}", u32::from(c)));
        } else {
            renderer.ascii("\\");
            renderer.code_point(c);
        }
    }

    #[allow(clippy::too_many_lines)]
    fn node(renderer: &mut TextRenderer<Self>, tree: &DocumentTree, event: WalkEvent) -> Step {
        let id = event.node();
        let entering = event.is_enter();
        let kind = tree.kind(id);
        let allow_wrap = renderer.allow_wrap() && !renderer.options.contains(Options::HARD_BREAKS);

        // the first item keeps the state of the enclosing block so the blank
        // line before the list survives
        if !(entering && matches!(kind, NodeKind::Item) && tree.prev(id).is_none()) {
            renderer.in_tight_list_item = in_tight_list_item(tree, id);
        }

        match kind {
            NodeKind::BlockQuote => {
                if entering {
                    renderer.lit("> ");
                    renderer.begin_content = true;
                    renderer.prefix.push_str("> ");
                } else {
                    renderer.truncate_prefix(2);
                    renderer.blankline();
                }
            }
            NodeKind::List { .. } => {
                let followed_by_block = tree.next(id).is_some_and(|next| {
                    matches!(tree.kind(next), NodeKind::CodeBlock { .. } | NodeKind::List { .. })
                });
                if !entering && followed_by_block {
                    renderer.cr();
                    renderer.lit("<!-- end list -->");
                    renderer.blankline();
                }
            }
            NodeKind::Item => {
                let (marker, width) = item_marker(tree, id);
                if entering {
                    renderer.lit(&marker);
                    renderer.begin_content = true;
                    renderer.prefix.push_str(&" ".repeat(width));
                } else {
                    renderer.truncate_prefix(width);
                    renderer.cr();
                }
            }
            NodeKind::Heading(level) => {
                if entering {
                    renderer.lit(&"#".repeat(usize::from(*level)));
                    renderer.lit(" ");
                    renderer.begin_content = true;
                    renderer.no_linebreaks = true;
                } else {
                    renderer.no_linebreaks = false;
                    renderer.blankline();
                }
            }
            NodeKind::CodeBlock { info, literal } => {
                let first_in_item =
                    tree.prev(id).is_none() && matches!(tree.parent_kind(id), Some(NodeKind::Item));
                if !first_in_item {
                    renderer.blankline();
                }
                let mut chars = literal.chars();
                let indented = info.is_empty()
                    && literal.len() > 2
                    && !chars.next().is_some_and(is_whitespace)
                    && !(chars.next_back().is_some_and(is_whitespace)
                        && chars.next_back().is_some_and(is_whitespace))
                    && !first_in_item;
                if indented {
                    renderer.lit("    ");
                    renderer.prefix.push_str("    ");
                    renderer.lit(literal);
                    renderer.truncate_prefix(4);
                } else {
                    let fence_char = if info.contains('`') { "~" } else { "`" };
                    let fence = fence_char.repeat((longest_backtick_run(literal) + 1).max(3));
                    renderer.lit(&fence);
                    renderer.lit(" ");
                    renderer.lit(info);
                    renderer.cr();
                    renderer.lit(literal);
                    renderer.cr();
                    renderer.lit(&fence);
                }
                renderer.blankline();
            }
            NodeKind::HtmlBlock(literal) => {
                renderer.blankline();
                renderer.lit(literal);
                renderer.blankline();
            }
            NodeKind::ThematicBreak => {
                renderer.blankline();
                renderer.lit("-----");
                renderer.blankline();
            }
            NodeKind::Paragraph => {
                if !entering {
                    renderer.blankline();
                }
            }
            NodeKind::Text(literal) => renderer.out(literal, allow_wrap, Escaping::Normal),
            NodeKind::LineBreak => {
                if !renderer.options.contains(Options::HARD_BREAKS) {
                    renderer.lit("  ");
                }
                renderer.cr();
            }
            NodeKind::SoftBreak => {
                if renderer.options.contains(Options::HARD_BREAKS) {
                    renderer.lit("  ");
                    renderer.cr();
                } else if !renderer.no_linebreaks
                    && renderer.width == 0
                    && !renderer.options.contains(Options::NO_BREAKS)
                {
                    renderer.cr();
                } else {
                    renderer.out(" ", allow_wrap, Escaping::Literal);
                }
            }
            NodeKind::Code(literal) => {
                let ticks = "`".repeat(shortest_unused_backtick_run(literal));
                let padded = literal.is_empty()
                    || literal.starts_with(['`', ' '])
                    || literal.ends_with(['`', ' ']);
                renderer.lit(&ticks);
                if padded {
                    renderer.lit(" ");
                }
                renderer.out(literal, allow_wrap, Escaping::Literal);
                if padded {
                    renderer.lit(" ");
                }
                renderer.lit(&ticks);
            }
            NodeKind::HtmlInline(literal) => renderer.lit(literal),
            NodeKind::Strong => renderer.lit("**"),
            NodeKind::Emph => {
                // *_x_* because **x** would be strong
                let nested = matches!(tree.parent_kind(id), Some(NodeKind::Emph))
                    && tree.prev(id).is_none()
                    && tree.next(id).is_none();
                renderer.lit(if nested { "_" } else { "*" });
            }
            NodeKind::Link { url, title } => {
                if is_autolink(tree, id, url, title) {
                    if entering {
                        renderer.lit("<");
                        renderer.lit(url.strip_prefix("mailto:").unwrap_or(url));
                        renderer.lit(">");
                        return Step::SkipChildren;
                    }
                } else if entering {
                    renderer.lit("[");
                } else {
                    renderer.lit("](");
                    renderer.out(url, false, Escaping::Url);
                    if !title.is_empty() {
                        renderer.lit(" \"");
                        renderer.out(title, false, Escaping::Title);
                        renderer.lit("\"");
                    }
                    renderer.lit(")");
                }
            }
            NodeKind::Image { url, title } => {
                if entering {
                    renderer.lit("![");
                } else {
                    renderer.lit("](");
                    renderer.out(url, false, Escaping::Url);
                    if !title.is_empty() {
                        renderer.out(" \"", allow_wrap, Escaping::Literal);
                        renderer.out(title, false, Escaping::Title);
                        renderer.lit("\"");
                    }
                    renderer.lit(")");
                }
            }
            NodeKind::Document => {}
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn commonmark(text: &str, options: Options, width: usize) -> String {
        TextRenderer::<CommonMarkBackend>::new(options, width).render(&DocumentTree::parse(text, options))
    }

    #[test]
    fn test_paragraphs_and_headings() {
        assert_eq!(
            commonmark("Title\n=====\n\nBody\ntext", Options::empty(), 0),
            "# Title\n\nBody\ntext\n"
        );
    }

    #[test]
    fn test_escapes_markup_characters() {
        assert_eq!(
            commonmark("\\*not emph\\* \\[x\\] a\\_b", Options::empty(), 0),
            "\\*not emph\\* \\[x\\] a\\_b\n"
        );
    }

    #[test]
    fn test_escapes_block_starts() {
        assert_eq!(commonmark("\\- item", Options::empty(), 0), "\\- item\n");
        assert_eq!(commonmark("1\\. item", Options::empty(), 0), "1\\. item\n");
    }

    #[test]
    fn test_tight_and_loose_lists() {
        assert_eq!(
            commonmark("- a\n- b\n", Options::empty(), 0),
            "  - a\n  - b\n"
        );
        assert_eq!(
            commonmark("1) a\n\n2) b\n", Options::empty(), 0),
            "1)  a\n\n2)  b\n"
        );
    }

    #[test]
    fn test_end_list_marker() {
        assert_eq!(
            commonmark("- a\n\n<!-- -->\n\n- b\n", Options::empty(), 0),
            "  - a\n\n<!-- -->\n\n  - b\n"
        );
        assert_eq!(
            commonmark("- a\n\n```\ncode\n```\n", Options::empty(), 0),
            "  - a\n\n<!-- end list -->\n\n    code\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(
            commonmark("> a\n>\n> b\n", Options::empty(), 0),
            "> a\n> \n> b\n"
        );
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(
            commonmark("    let x;\n", Options::empty(), 0),
            "    let x;\n"
        );
        assert_eq!(
            commonmark("```rust\nlet x;\n```\n", Options::empty(), 0),
            "``` rust\nlet x;\n```\n"
        );
        assert_eq!(
            commonmark("````x\n```\n````\n", Options::empty(), 0),
            "```` x\n```\n````\n"
        );
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(commonmark("`a`", Options::empty(), 0), "`a`\n");
        assert_eq!(commonmark("`` a`b ``", Options::empty(), 0), "``a`b``\n");
        assert_eq!(commonmark("`` `a ``", Options::empty(), 0), "`` `a ``\n");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            commonmark("[a](/u \"t\") <http://x.org> ![i](p.png)", Options::empty(), 0),
            "[a](/u \"t\") <http://x.org> ![i](p.png)\n"
        );
        assert_eq!(
            commonmark("[a](</my url>)", Options::empty(), 0),
            "[a](/my%20url)\n"
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(commonmark("*_a_*", Options::empty(), 0), "*_a_*\n");
        assert_eq!(commonmark("**a**", Options::empty(), 0), "**a**\n");
    }

    #[test]
    fn test_breaks() {
        assert_eq!(commonmark("a  \nb", Options::empty(), 0), "a  \nb\n");
        assert_eq!(commonmark("a\nb", Options::HARD_BREAKS, 0), "a  \nb\n");
        assert_eq!(commonmark("a\nb", Options::NO_BREAKS, 0), "a b\n");
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(
            commonmark("aaa bbb ccc ddd", Options::empty(), 8),
            "aaa bbb\nccc ddd\n"
        );
    }

    #[test]
    fn test_backtick_runs() {
        assert_eq!(longest_backtick_run("a ``` b ` c"), 3);
        assert_eq!(longest_backtick_run("none"), 0);
        assert_eq!(shortest_unused_backtick_run("a ` b `` c"), 3);
        assert_eq!(shortest_unused_backtick_run("a ``` b"), 1);
        assert_eq!(shortest_unused_backtick_run(""), 1);
    }
}
