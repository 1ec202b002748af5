//! LaTeX serializer.

use crate::escape::has_scheme;
use crate::options::Options;
use crate::tree::{DocumentTree, ListType, NodeId, NodeKind, WalkEvent};

use super::text::{Escaping, Step, TextBackend, TextRenderer};

pub(super) struct LatexBackend;

/// How a link is written, decided from its destination and text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkKind {
    /// Destination without a scheme, or a link with neither text nor title.
    Bare,
    /// Text equal to a URL destination.
    UrlAutolink,
    /// Text equal to the address of a `mailto:` destination.
    EmailAutolink,
    Normal,
    /// Destination starting with `#`.
    Internal,
}

fn link_kind(tree: &DocumentTree, id: NodeId, url: &str, title: &str) -> LinkKind {
    if url.starts_with('#') {
        return LinkKind::Internal;
    }
    if !has_scheme(url) || (title.is_empty() && tree.first_child(id).is_none()) {
        return LinkKind::Bare;
    }
    if title.is_empty()
        && let Some(text) = tree.first_child(id)
    {
        let (address, email) = match url.strip_prefix("mailto:") {
            Some(address) => (address, true),
            None => (url, false),
        };
        if tree.text_run(text) == address {
            return if email {
                LinkKind::EmailAutolink
            } else {
                LinkKind::UrlAutolink
            };
        }
    }
    LinkKind::Normal
}

/// Nesting depth used to pick the `enum` counter of an ordered list.
fn enum_level(tree: &DocumentTree, list: NodeId) -> usize {
    if !matches!(
        tree.kind(list),
        NodeKind::List {
            list_type: ListType::Ordered,
            ..
        }
    ) {
        return 0;
    }
    std::iter::successors(Some(list), |&node| tree.parent(node))
        .filter(|&node| matches!(tree.kind(node), NodeKind::List { .. }))
        .count()
}

impl TextBackend for LatexBackend {
    fn escape_char(renderer: &mut TextRenderer<Self>, escaping: Escaping, c: char, next: Option<char>) {
        if escaping == Escaping::Literal {
            renderer.code_point(c);
            return;
        }
        let normal = escaping == Escaping::Normal;
        match c {
            '{' | '}' | '#' | '%' | '&' => {
                renderer.ascii("\\");
                renderer.code_point(c);
            }
            '$' | '_' => {
                if normal {
                    renderer.ascii("\\");
                }
                renderer.code_point(c);
            }
            '-' => renderer.ascii(if next == Some('-') { "-{}" } else { "-" }),
            '~' if normal => renderer.ascii("\\textasciitilde{}"),
            '^' => renderer.ascii("\\^{}"),
            '\\' if escaping == Escaping::Url => renderer.ascii("/"),
            '\\' => renderer.ascii("\\textbackslash{}"),
            '|' => renderer.ascii("\\textbar{}"),
            '<' => renderer.ascii("\\textless{}"),
            '>' => renderer.ascii("\\textgreater{}"),
            '[' | ']' => {
                renderer.ascii("{");
                renderer.code_point(c);
                renderer.ascii("}");
            }
            '"' => renderer.ascii("\\textquotedbl{}"),
            '\'' => renderer.ascii("\\textquotesingle{}"),
            '\u{a0}' => renderer.ascii("~"),
            '\u{2026}' => renderer.ascii("\\ldots{}"),
            '\u{2018}' if normal => renderer.ascii("`"),
            '\u{2019}' if normal => renderer.ascii("'"),
            '\u{201c}' if normal => renderer.ascii("``"),
            '\u{201d}' if normal => renderer.ascii("''"),
            '\u{2014}' if normal => renderer.ascii("---"),
            '\u{2013}' if normal => renderer.ascii("--"),
            _ => renderer.code_point(c),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn node(renderer: &mut TextRenderer<Self>, tree: &DocumentTree, event: WalkEvent) -> Step {
        let id = event.node();
        let entering = event.is_enter();
        let allow_wrap = renderer.allow_wrap();

        match tree.kind(id) {
            NodeKind::BlockQuote => {
                if entering {
                    renderer.lit("\\begin{quote}");
                    renderer.cr();
                } else {
                    renderer.lit("\\end{quote}");
                    renderer.blankline();
                }
            }
            NodeKind::List {
                list_type, start, ..
            } => {
                let environment = match list_type {
                    ListType::Ordered => "enumerate",
                    ListType::Bullet => "itemize",
                };
                if entering {
                    renderer.lit(&format!("\\begin{{{environment}}}"));
                    renderer.cr();
                    if *start > 1 {
                        let counter = match enum_level(tree, id) {
                            1 => Some("i"),
                            2 => Some("ii"),
                            3 => Some("iii"),
                            4 => Some("iv"),
                            5 => Some("v"),
                            _ => None,
                        };
                        if let Some(counter) = counter {
                            renderer.lit(&format!("\\setcounter{{enum{counter}}}{{"));
                            renderer.out(&start.to_string(), false, Escaping::Normal);
                            renderer.lit("}");
                        }
                        renderer.cr();
                    }
                } else {
                    renderer.lit(&format!("\\end{{{environment}}}"));
                    renderer.blankline();
                }
            }
            NodeKind::Item => {
                if entering {
                    renderer.lit("\\item ");
                } else {
                    renderer.cr();
                }
            }
            NodeKind::Heading(level) => {
                if entering {
                    let command = match level {
                        1 => "\\section",
                        2 => "\\subsection",
                        3 => "\\subsubsection",
                        4 => "\\paragraph",
                        5 => "\\subparagraph",
                        _ => "",
                    };
                    renderer.lit(command);
                    renderer.lit("{");
                } else {
                    renderer.lit("}");
                    renderer.blankline();
                }
            }
            NodeKind::CodeBlock { literal, .. } => {
                renderer.cr();
                renderer.lit("\\begin{verbatim}");
                renderer.cr();
                renderer.lit(literal);
                renderer.cr();
                renderer.lit("\\end{verbatim}");
                renderer.blankline();
            }
            NodeKind::ThematicBreak => {
                renderer.blankline();
                renderer.lit("\\begin{center}\\rule{0.5\\linewidth}{\\linethickness}\\end{center}");
                renderer.blankline();
            }
            NodeKind::Paragraph => {
                if !entering {
                    renderer.blankline();
                }
            }
            NodeKind::Text(literal) => renderer.out(literal, allow_wrap, Escaping::Normal),
            NodeKind::LineBreak => {
                renderer.lit("\\\\");
                renderer.cr();
            }
            NodeKind::SoftBreak => {
                if renderer.options.contains(Options::HARD_BREAKS) {
                    renderer.lit("\\\\");
                    renderer.cr();
                } else if renderer.width == 0 && !renderer.options.contains(Options::NO_BREAKS) {
                    renderer.cr();
                } else {
                    renderer.out(" ", allow_wrap, Escaping::Normal);
                }
            }
            NodeKind::Code(literal) => {
                renderer.lit("\\texttt{");
                renderer.out(literal, false, Escaping::Normal);
                renderer.lit("}");
            }
            NodeKind::Strong => renderer.lit(if entering { "\\textbf{" } else { "}" }),
            NodeKind::Emph => renderer.lit(if entering { "\\emph{" } else { "}" }),
            NodeKind::Link { url, title } => {
                if !entering {
                    renderer.lit("}");
                    return Step::Continue;
                }
                match link_kind(tree, id, url, title) {
                    LinkKind::UrlAutolink => {
                        renderer.lit("\\url{");
                        renderer.out(url, false, Escaping::Url);
                        renderer.lit("}");
                        return Step::SkipChildren;
                    }
                    LinkKind::EmailAutolink => {
                        renderer.lit("\\href{");
                        renderer.out(url, false, Escaping::Url);
                        renderer.lit("}\\nolinkurl{");
                    }
                    LinkKind::Normal => {
                        renderer.lit("\\href{");
                        renderer.out(url, false, Escaping::Url);
                        renderer.lit("}{");
                    }
                    LinkKind::Internal => {
                        renderer.lit("\\protect\\hyperlink{");
                        renderer.out(&url[1..], false, Escaping::Url);
                        renderer.lit("}{");
                    }
                    LinkKind::Bare => renderer.lit("{"),
                }
            }
            NodeKind::Image { url, .. } => {
                if entering {
                    renderer.lit("\\protect\\includegraphics{");
                    renderer.out(url, false, Escaping::Url);
                    renderer.lit("}");
                    return Step::SkipChildren;
                }
            }
            NodeKind::Document | NodeKind::HtmlBlock(_) | NodeKind::HtmlInline(_) => {}
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn latex(text: &str, options: Options, width: usize) -> String {
        TextRenderer::<LatexBackend>::new(options, width).render(&DocumentTree::parse(text, options))
    }

    #[test]
    fn test_headings_and_emphasis() {
        assert_eq!(
            latex("# One\n\n### Three\n\n**b** _i_", Options::empty(), 0),
            "\\section{One}\n\n\\subsubsection{Three}\n\n\\textbf{b} \\emph{i}\n"
        );
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(
            latex("50% of $x_1 & {y} ~ a--b", Options::empty(), 0),
            "50\\% of \\$x\\_1 \\& \\{y\\} \\textasciitilde{} a-{}-b\n"
        );
    }

    #[test]
    fn test_smart_punctuation() {
        assert_eq!(
            latex("\"a\" -- b", Options::SMART, 0),
            "``a'' -- b\n"
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            latex("- a\n- b\n", Options::empty(), 0),
            "\\begin{itemize}\n\\item a\n\n\\item b\n\n\\end{itemize}\n"
        );
    }

    #[test]
    fn test_ordered_list_counter() {
        assert_eq!(
            latex("3. a\n", Options::empty(), 0),
            "\\begin{enumerate}\n\\setcounter{enumi}{3}\n\\item a\n\n\\end{enumerate}\n"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            latex(
                "[t](http://x.org) <http://y.org> <me@x.org> [s](#sec) [r](rel)",
                Options::empty(),
                0
            ),
            "\\href{http://x.org}{t} \\url{http://y.org} \
             \\href{mailto:me@x.org}\\nolinkurl{me@x.org} \
             \\protect\\hyperlink{sec}{s} {r}\n"
        );
    }

    #[test]
    fn test_empty_link_text() {
        assert_eq!(latex("[](http://x.org)", Options::empty(), 0), "{}\n");
    }

    #[test]
    fn test_image_and_code() {
        assert_eq!(
            latex("![alt](pic.png) `a_b`", Options::empty(), 0),
            "\\protect\\includegraphics{pic.png} \\texttt{a\\_b}\n"
        );
    }

    #[test]
    fn test_code_block_and_quote() {
        assert_eq!(
            latex("> q\n\n```\nx_y\n```\n", Options::empty(), 0),
            "\\begin{quote}\nq\n\n\\end{quote}\n\n\\begin{verbatim}\nx_y\n\\end{verbatim}\n"
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(latex("a\\\nb", Options::empty(), 0), "a\\\\\nb\n");
        assert_eq!(latex("a\nb", Options::HARD_BREAKS, 0), "a\\\\\nb\n");
        assert_eq!(latex("a\nb", Options::NO_BREAKS, 0), "a b\n");
    }
}
