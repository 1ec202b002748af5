//! CommonMark XML serializer.

use std::fmt::Write;

use crate::escape::push_escaped_html;
use crate::options::Options;
use crate::tree::{DocumentTree, ListDelim, ListType, NodeKind, WalkEvent};

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                      <!DOCTYPE document SYSTEM \"CommonMark.dtd\">\n";

const NAMESPACE: &str = "http://commonmark.org/xml/1.0";

pub(super) fn render(tree: &DocumentTree, options: Options) -> Result<String, std::fmt::Error> {
    let mut out = String::with_capacity(2048);
    out.push_str(HEADER);
    let mut indent: usize = 0;

    for event in tree.walk() {
        let id = event.node();
        let kind = tree.kind(id);
        let name = kind.type_name();
        let has_children = tree.first_child(id).is_some();

        if let WalkEvent::Exit(_) = event {
            if has_children {
                indent -= 2;
                writeln!(out, "{:indent$}</{name}>", "")?;
            }
            continue;
        }

        write!(out, "{:indent$}<{name}", "")?;
        if options.contains(Options::SOURCE_POS)
            && let Some(pos) = tree.source_pos(id)
        {
            write!(out, " sourcepos=\"{pos}\"")?;
        }

        let mut literal = false;
        match kind {
            NodeKind::Document => write!(out, " xmlns=\"{NAMESPACE}\"")?,
            NodeKind::Text(text)
            | NodeKind::Code(text)
            | NodeKind::HtmlBlock(text)
            | NodeKind::HtmlInline(text) => {
                out.push('>');
                push_escaped_html(&mut out, text);
                write!(out, "</{name}")?;
                literal = true;
            }
            NodeKind::List {
                list_type,
                start,
                delim,
                tight,
            } => {
                match list_type {
                    ListType::Ordered => {
                        write!(out, " type=\"ordered\" start=\"{start}\"")?;
                        match delim {
                            Some(ListDelim::Paren) => out.push_str(" delim=\"paren\""),
                            Some(ListDelim::Period) => out.push_str(" delim=\"period\""),
                            None => {}
                        }
                    }
                    ListType::Bullet => out.push_str(" type=\"bullet\""),
                }
                write!(out, " tight=\"{tight}\"")?;
            }
            NodeKind::Heading(level) => write!(out, " level=\"{level}\"")?,
            NodeKind::CodeBlock { info, literal: code } => {
                if !info.is_empty() {
                    out.push_str(" info=\"");
                    push_escaped_html(&mut out, info);
                    out.push('"');
                }
                out.push('>');
                push_escaped_html(&mut out, code);
                write!(out, "</{name}")?;
                literal = true;
            }
            NodeKind::Link { url, title } | NodeKind::Image { url, title } => {
                out.push_str(" destination=\"");
                push_escaped_html(&mut out, url);
                out.push_str("\" title=\"");
                push_escaped_html(&mut out, title);
                out.push('"');
            }
            _ => {}
        }

        if has_children {
            indent += 2;
        } else if !literal {
            out.push_str(" /");
        }
        out.push_str(">\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn xml_body(text: &str, options: Options) -> String {
        let out = render(&DocumentTree::parse(text, options), options).unwrap();
        out.strip_prefix(HEADER).unwrap().to_owned()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(
            xml_body("", Options::empty()),
            "<document xmlns=\"http://commonmark.org/xml/1.0\" />\n"
        );
    }

    #[test]
    fn test_list_attributes() {
        assert_eq!(
            xml_body("2) a\n3) b\n", Options::empty()),
            "<document xmlns=\"http://commonmark.org/xml/1.0\">\n\
             \x20 <list type=\"ordered\" start=\"2\" delim=\"paren\" tight=\"true\">\n\
             \x20   <item>\n\
             \x20     <paragraph>\n\
             \x20       <text>a</text>\n\
             \x20     </paragraph>\n\
             \x20   </item>\n\
             \x20   <item>\n\
             \x20     <paragraph>\n\
             \x20       <text>b</text>\n\
             \x20     </paragraph>\n\
             \x20   </item>\n\
             \x20 </list>\n\
             </document>\n"
        );
    }

    #[test]
    fn test_leaf_blocks() {
        assert_eq!(
            xml_body("## H\n\n```sh\na < b\n```\n\n***\n", Options::empty()),
            "<document xmlns=\"http://commonmark.org/xml/1.0\">\n\
             \x20 <heading level=\"2\">\n\
             \x20   <text>H</text>\n\
             \x20 </heading>\n\
             \x20 <code_block info=\"sh\">a &lt; b\n</code_block>\n\
             \x20 <thematic_break />\n\
             </document>\n"
        );
    }

    #[test]
    fn test_link_and_breaks() {
        assert_eq!(
            xml_body("[x](/u \"t\")\ny", Options::empty()),
            "<document xmlns=\"http://commonmark.org/xml/1.0\">\n\
             \x20 <paragraph>\n\
             \x20   <link destination=\"/u\" title=\"t\">\n\
             \x20     <text>x</text>\n\
             \x20   </link>\n\
             \x20   <softbreak />\n\
             \x20   <text>y</text>\n\
             \x20 </paragraph>\n\
             </document>\n"
        );
    }

    #[test]
    fn test_source_positions_on_blocks_only() {
        assert_eq!(
            xml_body("*a*", Options::SOURCE_POS),
            "<document sourcepos=\"1:1-1:3\" xmlns=\"http://commonmark.org/xml/1.0\">\n\
             \x20 <paragraph sourcepos=\"1:1-1:3\">\n\
             \x20   <emph>\n\
             \x20     <text>a</text>\n\
             \x20   </emph>\n\
             \x20 </paragraph>\n\
             </document>\n"
        );
    }
}
