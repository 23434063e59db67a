//! Document serialization.

use std::fs;
use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::element::Element;
use crate::error::{DomError, Result};

/// Renders an element tree as an indented XML document string.
pub fn render_document(root: &Element) -> Result<String> {
    let mut buffer = Vec::new();
    let mut xml = Writer::new_with_indent(&mut buffer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut xml, root)?;
    let mut rendered = String::from_utf8(buffer)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Renders an element tree to a file, creating parent directories as needed.
pub fn write_document(path: &Path, root: &Element) -> Result<()> {
    let rendered = render_document(root)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| DomError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, rendered).map_err(|source| DomError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn write_element<W: Write>(xml: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.tag());
    for (name, value) in element.attributes() {
        start.push_attribute((name, value));
    }
    if element.children().is_empty() && element.text().is_empty() {
        xml.write_event(Event::Empty(start))?;
        return Ok(());
    }
    xml.write_event(Event::Start(start))?;
    if !element.text().is_empty() {
        xml.write_event(Event::Text(BytesText::new(element.text())))?;
    }
    for child in element.children() {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.tag())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_document;

    #[test]
    fn renders_with_declaration_and_indentation() {
        let root = Element::new("maplayer")
            .with_attr("type", "vector")
            .with_child(Element::new("id").with_text("parcels"))
            .with_child(Element::new("dependencies"));
        let rendered = render_document(&root).unwrap();
        assert_eq!(
            rendered,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <maplayer type=\"vector\">\n  <id>parcels</id>\n  <dependencies/>\n</maplayer>\n"
        );
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let root = Element::new("a")
            .with_attr("name", "x & y")
            .with_child(Element::new("b").with_text("1 < 2"));
        let rendered = render_document(&root).unwrap();
        assert!(rendered.contains("name=\"x &amp; y\""));
        assert!(rendered.contains("<b>1 &lt; 2</b>"));
    }

    #[test]
    fn render_and_parse_round_trip() {
        let root = Element::new("root")
            .with_attr("version", "1")
            .with_child(
                Element::new("entry")
                    .with_attr("label", "a \"quoted\" label")
                    .with_text("text & more"),
            )
            .with_child(Element::new("empty"));
        let rendered = render_document(&root).unwrap();
        let parsed = parse_document(&rendered).unwrap();
        assert_eq!(parsed, root);
    }
}
