//! Comprehensive tests for fos-html
//!
//! Document structure after parsing, markup serialization and XML input.

use fos_html::{inner_html, outer_html, parse, parse_xml, HtmlParser, ParseError, XmlParser};
use fos_dom::{NodeId, NodeType};

fn first(doc: &fos_html::Document, tag: &str) -> NodeId {
    let tree = doc.tree();
    tree.descendants(doc.root())
        .find(|&n| tree.tag_name(n) == Some(tag))
        .unwrap_or_else(|| panic!("no <{}> in document", tag))
}

// ============================================================================
// HTML STRUCTURE
// ============================================================================

#[test]
fn test_empty_input_gets_skeleton() {
    let doc = HtmlParser::new().parse("");
    let tree = doc.tree();
    assert_eq!(tree.tag_name(doc.document_element()), Some("html"));
    assert_eq!(tree.tag_name(doc.head()), Some("head"));
    assert_eq!(tree.tag_name(doc.body()), Some("body"));
    assert_eq!(tree.child_ids(doc.body()).len(), 0);
}

#[test]
fn test_doctype_is_kept() {
    let doc = parse("<!DOCTYPE html><p>x</p>");
    let tree = doc.tree();
    let first_child = tree.child_ids(doc.root())[0];
    assert_eq!(tree.node_type(first_child), Some(NodeType::Doctype));
    assert!(outer_html(tree, doc.root()).starts_with("<!DOCTYPE html><html>"));
}

#[test]
fn test_nested_structure_and_whitespace() {
    let doc = parse("<div id=\"c\">\n  <h1>Welcome</h1>\n  <p class=\"intro\">Hi</p>\n</div>");
    let tree = doc.tree();
    let c = doc.get_element_by_id("c").unwrap();

    assert_eq!(tree.element_children(c).count(), 2);
    // Whitespace text between elements survives parsing
    assert_eq!(tree.child_ids(c).len(), 5);
    assert_eq!(tree.text_content(c).as_deref(), Some("\n  Welcome\n  Hi\n"));
}

#[test]
fn test_implied_end_tags() {
    let doc = parse("<ul><li>one<li>two</ul><p>a<p>b");
    let tree = doc.tree();
    let ul = first(&doc, "ul");
    assert_eq!(tree.element_children(ul).count(), 2);
    assert_eq!(tree.element_children(doc.body()).count(), 3);
}

#[test]
fn test_table_gets_tbody() {
    let doc = parse("<table><tr><td>x</td></tr></table>");
    let table = first(&doc, "table");
    let section = doc.tree().element_children(table).next().unwrap();
    assert_eq!(doc.tree().tag_name(section), Some("tbody"));
}

#[test]
fn test_attributes_and_entities() {
    let doc = parse(r#"<a href="/x?a=1&amp;b=2" data-note='say "hi"' hidden>&lt;&copy;&#65;&#x42;&gt;</a>"#);
    let tree = doc.tree();
    let a = first(&doc, "a");

    assert_eq!(tree.get_attribute(a, "href"), Some("/x?a=1&b=2"));
    assert_eq!(tree.get_attribute(a, "data-note"), Some(r#"say "hi""#));
    assert_eq!(tree.get_attribute(a, "hidden"), Some(""));
    assert_eq!(tree.text_content(a).as_deref(), Some("<©AB>"));
}

#[test]
fn test_title_and_comments() {
    let doc = parse("<title> Page  title </title><!-- note --><p>x</p>");
    assert_eq!(doc.title(), "Page  title");

    let tree = doc.tree();
    let has_comment = tree.descendants(doc.root())
        .any(|n| tree.node_type(n) == Some(NodeType::Comment));
    assert!(has_comment);
}

#[test]
fn test_svg_elements_keep_local_names() {
    let doc = parse(r#"<svg viewBox="0 0 10 10"><circle r="4"/></svg>"#);
    let circle = first(&doc, "circle");
    assert_eq!(doc.tree().get_attribute(circle, "r"), Some("4"));
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_inner_and_outer_html() {
    let doc = parse(r#"<div id="box" class="a"><b>bold</b> text<br><img src="i.png"></div>"#);
    let tree = doc.tree();
    let div = doc.get_element_by_id("box").unwrap();

    assert_eq!(inner_html(tree, div), r#"<b>bold</b> text<br><img src="i.png">"#);
    assert_eq!(outer_html(tree, div), r#"<div id="box" class="a"><b>bold</b> text<br><img src="i.png"></div>"#);
}

#[test]
fn test_serialization_escapes_text_and_attributes() {
    let doc = parse(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#);
    let p = first(&doc, "p");
    assert_eq!(
        outer_html(doc.tree(), p),
        r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#
    );
}

#[test]
fn test_raw_text_is_not_escaped() {
    let doc = parse("<script>if (a < b && c) {}</script><style>a > b {}</style>");
    assert_eq!(inner_html(doc.tree(), first(&doc, "script")), "if (a < b && c) {}");
    assert_eq!(inner_html(doc.tree(), first(&doc, "style")), "a > b {}");
}

#[test]
fn test_fragment_reparse_matches() {
    let markup = r#"<em>one</em> <span class="x">two</span><!--c-->"#;
    let mut doc = parse(r#"<div id="host">old</div>"#);
    let host = doc.get_element_by_id("host").unwrap();

    doc.tree_mut().remove_children(host);
    let added = HtmlParser::new().parse_fragment_into(doc.tree_mut(), host, markup);

    assert_eq!(added.len(), 4);
    assert_eq!(inner_html(doc.tree(), host), markup);
}

#[test]
fn test_fragment_with_head_content() {
    let mut doc = parse(r#"<div id="host"></div>"#);
    let host = doc.get_element_by_id("host").unwrap();
    HtmlParser::new().parse_fragment_into(doc.tree_mut(), host, "<meta charset=utf-8><p>x</p>");

    assert_eq!(inner_html(doc.tree(), host), r#"<meta charset="utf-8"><p>x</p>"#);
}

#[test]
fn test_fragment_parsed_in_context_of_target() {
    let mut doc = parse(r#"<table><tbody id="rows"></tbody></table><select id="pick"></select>"#);
    let rows = doc.get_element_by_id("rows").unwrap();
    let pick = doc.get_element_by_id("pick").unwrap();

    let parser = HtmlParser::new();
    parser.parse_fragment_into(doc.tree_mut(), rows, "<tr><td>a</td></tr><tr><td>b</td></tr>");
    parser.parse_fragment_into(doc.tree_mut(), pick, "<option>one</option><option>two</option>");

    assert_eq!(
        inner_html(doc.tree(), rows),
        "<tr><td>a</td></tr><tr><td>b</td></tr>"
    );
    assert_eq!(doc.tree().element_children(pick).count(), 2);
}

#[test]
fn test_fragment_keeps_leading_whitespace() {
    let mut doc = parse(r#"<div id="host"></div>"#);
    let host = doc.get_element_by_id("host").unwrap();
    let added = HtmlParser::new().parse_fragment_into(doc.tree_mut(), host, "\n  <b>x</b>");

    assert_eq!(added.len(), 2);
    assert_eq!(inner_html(doc.tree(), host), "\n  <b>x</b>");
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn test_xml_document_element_and_case() {
    let doc = parse_xml(r#"<?xml version="1.0"?><Root><Item Key="v"/><item>t</item></Root>"#).unwrap();
    let tree = doc.tree();
    let root = doc.document_element();

    assert_eq!(tree.tag_name(root), Some("Root"));
    let items: Vec<_> = tree.element_children(root).collect();
    assert_eq!(tree.tag_name(items[0]), Some("Item"));
    assert_eq!(tree.get_attribute(items[0], "Key"), Some("v"));
    assert_eq!(tree.text_content(items[1]).as_deref(), Some("t"));
}

#[test]
fn test_xml_url_is_recorded() {
    let doc = XmlParser::new().parse_with_url("<a/>", "https://example.test/feed.xml").unwrap();
    assert_eq!(doc.url(), "https://example.test/feed.xml");
}

#[test]
fn test_xml_errors() {
    assert!(matches!(parse_xml("<a><b></a>"), Err(ParseError::Xml { .. })));
    assert!(matches!(parse_xml("<a><b>"), Err(ParseError::UnclosedTag { .. })));
    assert!(parse_xml("   ").is_err());

    let message = parse_xml("<a>").unwrap_err().to_string();
    assert!(message.contains("a"), "unexpected message: {}", message);
}
