//! Document parsing.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::element::Element;
use crate::error::{DomError, Result};

/// Parses an XML document from a string into an element tree.
///
/// Comments, processing instructions and the XML declaration are skipped.
/// Text is accumulated across entity references and trimmed once per
/// element, so indentation whitespace disappears while spaces around
/// references survive.
pub fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack.pop().ok_or(DomError::UnmatchedClose)?;
                element.trim_text();
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&text);
                    parent.append_text(&unescape(&raw)?);
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent.append_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(parent) = stack.last_mut() {
                    let name = String::from_utf8_lossy(&reference);
                    let name = name.trim_start_matches('&').trim_end_matches(';');
                    let ch = resolve_reference(name).ok_or_else(|| DomError::UnknownEntity {
                        name: name.to_string(),
                    })?;
                    parent.append_char(ch);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DomError::UnexpectedEof {
            tag: open.tag().to_string(),
        });
    }
    root.ok_or(DomError::NoRootElement)
}

/// Reads and parses an XML document from a file.
pub fn read_document(path: &Path) -> Result<Element> {
    let text = fs::read_to_string(path).map_err(|source| DomError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        element.set_attr(name, unescape(&raw)?.into_owned());
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
    } else if root.is_some() {
        return Err(DomError::MultipleRoots);
    } else {
        *root = Some(element);
    }
    Ok(())
}

/// Resolves a predefined or numeric character reference name.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
