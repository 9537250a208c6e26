//! HTML serialization
//!
//! Markup for a subtree, following the HTML fragment serialization rules:
//! void elements get no end tag, raw text elements are written unescaped.

use fos_dom::{DomTree, NodeData, NodeId};

/// Elements that never have an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Elements whose text children are emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext"];

/// Serialized markup of the children of `id`
pub fn inner_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let raw = tree.tag_name(id).is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
    for (child, _) in tree.children(id) {
        write_node(tree, child, raw, &mut out);
    }
    out
}

/// Serialized markup of `id` itself, including its own tags
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let raw = tree.parent(id)
        .and_then(|p| tree.tag_name(p))
        .is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
    write_node(tree, id, raw, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, raw_text: bool, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Document => {
            out.push_str(&inner_html(tree, id));
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(tree.resolve(*name));
            out.push('>');
        }
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(&text.content);
            } else {
                escape_into(&text.content, false, out);
            }
        }
        NodeData::Comment(content) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        NodeData::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(tree.resolve(*target));
            out.push(' ');
            out.push_str(data);
            out.push('>');
        }
        NodeData::Element(elem) => {
            let tag = tree.resolve(elem.name.local);
            out.push('<');
            out.push_str(tag);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(tree.resolve(attr.name.local));
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            out.push_str(&inner_html(tree, id));
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlParser;

    #[test]
    fn test_inner_and_outer_html() {
        let doc = HtmlParser::new().parse(r#"<div id="x" title="a &quot;b&quot;">1 &lt; 2<br><b>bold</b><!--c--></div>"#);
        let div = doc.get_element_by_id("x").unwrap();

        assert_eq!(inner_html(doc.tree(), div), "1 &lt; 2<br><b>bold</b><!--c-->");
        assert_eq!(
            outer_html(doc.tree(), div),
            r#"<div id="x" title="a &quot;b&quot;">1 &lt; 2<br><b>bold</b><!--c--></div>"#
        );
    }

    #[test]
    fn test_raw_text_is_not_escaped() {
        let doc = HtmlParser::new().parse("<script>if (a < b && c) {}</script>");
        let script = doc.tree().element_children(doc.head()).next().unwrap();
        assert_eq!(inner_html(doc.tree(), script), "if (a < b && c) {}");
    }

    #[test]
    fn test_document_serialization() {
        let doc = HtmlParser::new().parse("<!DOCTYPE html><p>hi</p>");
        assert_eq!(
            inner_html(doc.tree(), doc.root()),
            "<!DOCTYPE html><html><head></head><body><p>hi</p></body></html>"
        );
    }
}
