//! Comprehensive tests for fos-css
//!
//! Selector parsing edge cases, matching against parsed documents and
//! inline style handling.

use fos_css::*;
use fos_dom::{Document, NodeId};
use fos_html::HtmlParser;

const PAGE: &str = r#"<html><head><title>T</title></head><body>
<nav id="menu"><a href="/home" class="active">Home</a><a href="/about" lang="en-US">About</a><a>Nowhere</a></nav>
<form><input type="text" required><input type="checkbox" checked><input type="submit" disabled></form>
<ol><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li><li>6</li></ol>
<div class="Card wide" data-kind="Promo"></div>
</body></html>"#;

fn page() -> Document {
    HtmlParser::new().parse(PAGE)
}

fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
    query_selector_all(doc.tree(), doc.root(), selector).unwrap()
}

fn texts(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| doc.tree().text_content(n).unwrap_or_default()).collect()
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_group_and_combinators() {
    let list = parse_selector_list("ul > li.item + li, a ~ b c").unwrap();
    assert_eq!(list.0.len(), 2);
    assert_eq!(list.0[0].combinators, vec![Combinator::Child, Combinator::NextSibling]);
    assert_eq!(list.0[1].combinators, vec![Combinator::SubsequentSibling, Combinator::Descendant]);
}

#[test]
fn test_parse_compound_components() {
    let list = parse_selector_list("DIV#main.a.b[data-x]").unwrap();
    let compound = &list.0[0].compounds[0];
    assert_eq!(compound[0], SelectorComponent::Type("div".into()));
    assert_eq!(compound[1], SelectorComponent::Id("main".into()));
    assert_eq!(compound.len(), 5);
}

#[test]
fn test_parse_errors() {
    for bad in ["", "div >", "> p", "a,,b", "p::before", "[href", ":no-such-thing", "li:nth-child(x)", "#"] {
        match parse_selector_list(bad) {
            Err(CssError::InvalidSelector { selector, .. }) => assert_eq!(selector, bad),
            Ok(list) => panic!("'{}' parsed as {:?}", bad, list),
        }
    }
}

#[test]
fn test_nth_expressions() {
    assert_eq!(NthExpression::parse("odd"), Some(NthExpression::odd()));
    assert_eq!(NthExpression::parse("even"), Some(NthExpression::even()));
    assert_eq!(NthExpression::parse("3"), Some(NthExpression::index(3)));
    assert_eq!(NthExpression::parse("-n+3"), Some(NthExpression::new(-1, 3)));
    assert!(NthExpression::new(2, 1).matches(5));
    assert!(!NthExpression::new(2, 1).matches(4));
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn test_structural_pseudo_classes() {
    let doc = page();
    assert_eq!(texts(&doc, &select(&doc, "li:first-child, li:last-child")), vec!["1", "6"]);
    assert_eq!(texts(&doc, &select(&doc, "li:nth-child(3n)")), vec!["3", "6"]);
    assert_eq!(texts(&doc, &select(&doc, "li:nth-last-child(-n+2)")), vec!["5", "6"]);
    assert_eq!(texts(&doc, &select(&doc, "li:not(:nth-child(even))")), vec!["1", "3", "5"]);
    assert_eq!(select(&doc, "title:only-of-type").len(), 1);
}

#[test]
fn test_attribute_operators() {
    let doc = page();
    assert_eq!(select(&doc, "a[href]").len(), 2);
    assert_eq!(select(&doc, r#"a[href="/home"]"#).len(), 1);
    assert_eq!(select(&doc, r#"a[href^="/a"]"#).len(), 1);
    assert_eq!(select(&doc, r#"a[href$="me"]"#).len(), 1);
    assert_eq!(select(&doc, r#"a[href*="bou"]"#).len(), 1);
    assert_eq!(select(&doc, r#"a[lang|="en"]"#).len(), 1);
    assert_eq!(select(&doc, r#"div[class~="wide"]"#).len(), 1);
    assert_eq!(select(&doc, r#"div[data-kind="promo" i]"#).len(), 1);
    assert!(select(&doc, r#"div[data-kind="promo"]"#).is_empty());
}

#[test]
fn test_form_and_link_pseudo_classes() {
    let doc = page();
    assert_eq!(select(&doc, "input:required").len(), 1);
    assert_eq!(select(&doc, "input:optional").len(), 2);
    assert_eq!(select(&doc, "input:checked").len(), 1);
    assert_eq!(select(&doc, "input:disabled").len(), 1);
    assert_eq!(select(&doc, "input:enabled").len(), 2);
    assert_eq!(select(&doc, "a:link").len(), 2);
}

#[test]
fn test_interaction_state_never_matches() {
    let doc = page();
    assert!(select(&doc, "a:hover, a:focus, a:active, a:visited").is_empty());
}

#[test]
fn test_class_selectors_are_case_sensitive() {
    let doc = page();
    assert_eq!(select(&doc, ".Card").len(), 1);
    assert!(select(&doc, ".card").is_empty());
    assert_eq!(select(&doc, "DIV.Card").len(), 1);
}

#[test]
fn test_root_and_empty() {
    let doc = page();
    assert_eq!(select(&doc, ":root"), vec![doc.document_element()]);
    assert_eq!(select(&doc, "div:empty").len(), 1);
}

#[test]
fn test_is_and_where() {
    let doc = page();
    assert_eq!(select(&doc, "nav :is(.active, [lang])").len(), 2);
    assert_eq!(select(&doc, ":where(ol) > li").len(), 6);
}

#[test]
fn test_closest_walks_ancestors() {
    let doc = page();
    let home = select(&doc, "a.active")[0];
    let nav = doc.get_element_by_id("menu").unwrap();
    assert_eq!(closest(doc.tree(), home, "nav").unwrap(), Some(nav));
    assert_eq!(closest(doc.tree(), home, "ol").unwrap(), None);
    assert!(matches(doc.tree(), home, "#menu > a:first-child").unwrap());
}

// ============================================================================
// INLINE STYLE
// ============================================================================

#[test]
fn test_style_parse_and_serialize() {
    let style = StyleDeclaration::parse("COLOR: red; ; bogus; margin:0 ;color: blue !important");
    assert_eq!(style.len(), 2);
    assert_eq!(style.get_property_value("color"), Some("blue"));
    assert!(style.iter().any(|d| d.property == "color" && d.important));
    assert_eq!(style.css_text(), "color: blue !important; margin: 0;");
}

#[test]
fn test_style_edit() {
    let mut style = StyleDeclaration::new();
    assert!(style.is_empty());
    style.set_property("display", "none");
    style.set_property("Display", "block");
    assert_eq!(style.css_text(), "display: block;");
    assert_eq!(style.remove_property("display"), Some("block".to_string()));
    assert_eq!(style.css_text(), "");
}
