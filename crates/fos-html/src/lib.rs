//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, XML parsing built on quick-xml, and
//! markup serialization for `fos_dom` trees.

mod parser;
mod serialize;
mod xml;

pub use fos_dom::Document;
pub use parser::HtmlParser;
pub use serialize::{inner_html, outer_html};
pub use xml::XmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an XML string into a Document
pub fn parse_xml(xml: &str) -> Result<Document, ParseError> {
    XmlParser::new().parse(xml)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Unclosed tag: {tag}")]
    UnclosedTag { tag: String },

    #[error("DOM error: {0}")]
    Dom(#[from] fos_dom::DomError),
}
