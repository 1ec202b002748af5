//! groff man serializer.

use crate::options::Options;
use crate::tree::{DocumentTree, ListType, NodeKind, WalkEvent};

use super::text::{Escaping, Step, TextBackend, TextRenderer};

pub(super) struct ManBackend;

impl TextBackend for ManBackend {
    fn escape_char(renderer: &mut TextRenderer<Self>, escaping: Escaping, c: char, _next: Option<char>) {
        if escaping == Escaping::Literal {
            renderer.code_point(c);
            return;
        }
        match c {
            '.' if renderer.begin_line => renderer.ascii("\\&."),
            '\'' if renderer.begin_line => renderer.ascii("\\&'"),
            '-' => renderer.ascii("\\-"),
            '\\' => renderer.ascii("\\e"),
            '\u{2018}' => renderer.ascii("\\[oq]"),
            '\u{2019}' => renderer.ascii("\\[cq]"),
            '\u{201c}' => renderer.ascii("\\[lq]"),
            '\u{201d}' => renderer.ascii("\\[rq]"),
            '\u{2014}' => renderer.ascii("\\[em]"),
            '\u{2013}' => renderer.ascii("\\[en]"),
            _ => renderer.code_point(c),
        }
    }

    fn node(renderer: &mut TextRenderer<Self>, tree: &DocumentTree, event: WalkEvent) -> Step {
        let id = event.node();
        let entering = event.is_enter();
        let allow_wrap = renderer.allow_wrap();

        match tree.kind(id) {
            NodeKind::BlockQuote => {
                renderer.cr();
                renderer.lit(if entering { ".RS" } else { ".RE" });
                renderer.cr();
            }
            NodeKind::Item => {
                renderer.cr();
                if entering {
                    renderer.lit(".IP ");
                    if let Some(NodeKind::List {
                        list_type: ListType::Ordered,
                        start,
                        ..
                    }) = tree.parent_kind(id)
                    {
                        let number = *start + tree.sibling_index(id) as u64;
                        renderer.lit(&format!("\"{number}.\" 4"));
                    } else {
                        renderer.lit("\\[bu] 2");
                    }
                    renderer.cr();
                }
            }
            NodeKind::Heading(level) => {
                renderer.cr();
                if entering {
                    renderer.lit(if *level == 1 { ".SH" } else { ".SS" });
                    renderer.cr();
                }
            }
            NodeKind::CodeBlock { literal, .. } => {
                renderer.cr();
                renderer.lit(".IP\n.nf\n\\f[C]\n");
                renderer.out(literal, false, Escaping::Normal);
                renderer.cr();
                renderer.lit("\\f[]\n.fi");
                renderer.cr();
            }
            NodeKind::ThematicBreak => {
                renderer.cr();
                renderer.lit(".PP\n  *  *  *  *  *");
                renderer.cr();
            }
            NodeKind::Paragraph => {
                if entering {
                    let first_in_item = tree.prev(id).is_none()
                        && matches!(tree.parent_kind(id), Some(NodeKind::Item));
                    if !first_in_item {
                        renderer.cr();
                        renderer.lit(".PP");
                        renderer.cr();
                    }
                } else {
                    renderer.cr();
                }
            }
            NodeKind::Text(literal) => renderer.out(literal, allow_wrap, Escaping::Normal),
            NodeKind::LineBreak => {
                renderer.lit(".PD 0\n.P\n.PD");
                renderer.cr();
            }
            NodeKind::SoftBreak => {
                if renderer.options.contains(Options::HARD_BREAKS) {
                    renderer.lit(".PD 0\n.P\n.PD");
                    renderer.cr();
                } else if renderer.width == 0 && !renderer.options.contains(Options::NO_BREAKS) {
                    renderer.cr();
                } else {
                    renderer.out(" ", allow_wrap, Escaping::Literal);
                }
            }
            NodeKind::Code(literal) => {
                renderer.lit("\\f[C]");
                renderer.out(literal, allow_wrap, Escaping::Normal);
                renderer.lit("\\f[]");
            }
            NodeKind::Strong => renderer.lit(if entering { "\\f[B]" } else { "\\f[]" }),
            NodeKind::Emph => renderer.lit(if entering { "\\f[I]" } else { "\\f[]" }),
            NodeKind::Link { url, .. } => {
                if !entering {
                    renderer.lit(" (");
                    renderer.out(url, allow_wrap, Escaping::Url);
                    renderer.lit(")");
                }
            }
            NodeKind::Image { .. } => renderer.lit(if entering { "[IMAGE: " } else { "]" }),
            NodeKind::Document
            | NodeKind::List { .. }
            | NodeKind::HtmlBlock(_)
            | NodeKind::HtmlInline(_) => {}
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn man(text: &str, options: Options, width: usize) -> String {
        TextRenderer::<ManBackend>::new(options, width).render(&DocumentTree::parse(text, options))
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            man("# Name\n\n## Options\n", Options::empty(), 0),
            ".SH\nName\n.SS\nOptions\n"
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            man("a-b \\\\ c\n\n.dot", Options::empty(), 0),
            ".PP\na\\-b \\e c\n.PP\n\\&.dot\n"
        );
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(
            man("- one\n- two\n", Options::empty(), 0),
            ".IP \\[bu] 2\none\n.IP \\[bu] 2\ntwo\n"
        );
    }

    #[test]
    fn test_ordered_list_numbers() {
        assert_eq!(
            man("3. a\n4. b\n", Options::empty(), 0),
            ".IP \"3.\" 4\na\n.IP \"4.\" 4\nb\n"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            man("    x-y\n", Options::empty(), 0),
            ".IP\n.nf\n\\f[C]\nx\\-y\n\\f[]\n.fi\n"
        );
    }

    #[test]
    fn test_block_quote_and_rule() {
        assert_eq!(
            man("> q\n\n---\n", Options::empty(), 0),
            ".RS\n.PP\nq\n.RE\n.PP\n  *  *  *  *  *\n"
        );
    }

    #[test]
    fn test_link_and_strong() {
        assert_eq!(
            man("**b** [t](http://x.org)", Options::empty(), 0),
            ".PP\n\\f[B]b\\f[] t (http://x.org)\n"
        );
    }

    #[test]
    fn test_soft_breaks() {
        assert_eq!(man("a\nb", Options::empty(), 0), ".PP\na\nb\n");
        assert_eq!(man("a\nb", Options::NO_BREAKS, 0), ".PP\na b\n");
        // cmark 0.28 writes the request on the text line
        assert_eq!(
            man("a\nb", Options::HARD_BREAKS, 0),
            ".PP\na.PD 0\n.P\n.PD\nb\n"
        );
    }

    #[test]
    fn test_line_break() {
        assert_eq!(man("a\\\nb", Options::empty(), 0), ".PP\na.PD 0\n.P\n.PD\nb\n");
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(
            man("one two three four", Options::empty(), 9),
            ".PP\none two\nthree\nfour\n"
        );
    }

    #[test]
    fn test_raw_html_is_dropped() {
        assert_eq!(man("a <b>c</b>", Options::empty(), 0), ".PP\na c\n");
    }
}
