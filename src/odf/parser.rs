//! Streaming XML to element tree parser.
//!
//! A single quick-xml pass builds the whole [`Element`] tree for one ODF
//! part. Character data is kept verbatim (whitespace included) because ODF
//! whitespace collapsing depends on the surrounding element.

use super::element::{Element, Node};
use crate::common::xml::{resolve_entity, unescape_xml};
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parse an XML document and return its root element.
///
/// # Example
///
/// ```
/// use odf2latex::odf::parser::parse_xml;
/// use odf2latex::odf::element::ElementBase;
///
/// let root = parse_xml(br#"<office:text><text:p text:style-name="P1">Hi &amp; bye</text:p></office:text>"#).unwrap();
/// let p = root.child_elements().next().unwrap();
/// assert_eq!(p.get_attribute("text:style-name"), Some("P1"));
/// assert_eq!(p.text_content(), "Hi & bye");
/// ```
pub fn parse_xml(xml: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                stack.push(element_from_start(e)?);
            },
            Event::Empty(ref e) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element);
            },
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlError("Unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            },
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(t);
                    current.push_text(&unescape_xml(&raw));
                }
            },
            Event::CData(ref t) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(t));
                }
            },
            Event::GeneralRef(ref r) => {
                if let Some(current) = stack.last_mut() {
                    let name = String::from_utf8_lossy(r);
                    match resolve_entity(&name) {
                        Some(ch) => {
                            let mut tmp = [0u8; 4];
                            current.push_text(ch.encode_utf8(&mut tmp));
                        },
                        None => current.push_text(&format!("&{};", name)),
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::XmlError(format!(
            "Unexpected end of document inside <{}>",
            super::element::ElementBase::tag_name(&stack[stack.len() - 1])
        )));
    }
    root.ok_or_else(|| Error::XmlError("Document has no root element".to_string()))
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element> {
    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut element = Element::new(&tag_name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = String::from_utf8_lossy(&attr.value);
        element.set_attribute(&key, &unescape_xml(&value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::element::ElementBase;
    use crate::odf::node::NodeKind;

    #[test]
    fn test_parse_mixed_content() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<office:text><text:p>Hello <text:span text:style-name="T1">bold</text:span> world<text:s text:c="2"/>!</text:p></office:text>"#;
        let root = parse_xml(xml).unwrap();
        assert_eq!(root.kind(), NodeKind::OfficeText);
        let p = root.first_child(NodeKind::Paragraph).unwrap();
        assert_eq!(p.children().len(), 5);
        assert_eq!(p.text_content(), "Hello bold world  !");
        let span = p.first_child(NodeKind::Span).unwrap();
        assert_eq!(span.get_attribute("text:style-name"), Some("T1"));
    }

    #[test]
    fn test_parse_entities_and_char_refs() {
        let root = parse_xml(br#"<text:p a="x &lt; y">&#x41;&#66;&quot;&gt;</text:p>"#).unwrap();
        assert_eq!(root.text_content(), "AB\">");
        assert_eq!(root.get_attribute("a"), Some("x < y"));
    }

    #[test]
    fn test_unbalanced_document_is_error() {
        assert!(parse_xml(b"<office:text><text:p>").is_err());
        assert!(parse_xml(b"").is_err());
    }
}
