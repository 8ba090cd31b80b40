use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::convert::object_width;
use crate::error::DatexError;
use crate::model::ParsedTable;

/// Key holding an element's own text.
const TEXT_KEY: &str = "_text";

/// Parsed element before conversion to JSON.
#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Text before the first child; tail text after children is dropped.
    text: String,
    children: Vec<Element>,
}

/// Parse an XML file into nested objects, flattened to records when the
/// root holds a repeated child tag.
pub fn parse_xml(path: &Path) -> Result<ParsedTable, DatexError> {
    let bytes = std::fs::read(path)?;
    parse_xml_bytes(&bytes)
}

pub fn parse_xml_str(text: &str) -> Result<ParsedTable, DatexError> {
    parse_xml_bytes(text.as_bytes())
}

/// Parse raw document bytes. The encoding comes from the BOM or the XML
/// declaration, defaulting to UTF-8.
pub fn parse_xml_bytes(bytes: &[u8]) -> Result<ParsedTable, DatexError> {
    let root = read_tree(bytes)?;
    Ok(tabulate(element_to_map(root)))
}

fn read_tree(bytes: &[u8]) -> Result<Element, DatexError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let decoder = reader.decoder();
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => stack.push(open_element(&start, decoder)?),
            Event::Empty(start) => {
                let element = open_element(&start, decoder)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    DatexError::Malformed(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(t) => push_text(&mut stack, &t.unescape()?)?,
            Event::CData(c) => {
                let text = decoder.decode(&c).map_err(quick_xml::Error::from)?;
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(DatexError::Malformed(format!(
            "unclosed element <{}>",
            open.tag
        )));
    }
    root.ok_or_else(|| DatexError::EmptyData("no element found".into()))
}

fn open_element(start: &BytesStart, decoder: Decoder) -> Result<Element, DatexError> {
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = decode(decoder, attr.key.as_ref())?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attrs.push((key, value));
    }

    Ok(Element {
        tag: decode(decoder, start.name().as_ref())?,
        attrs,
        ..Default::default()
    })
}

fn decode(decoder: Decoder, raw: &[u8]) -> Result<String, DatexError> {
    let text = decoder.decode(raw).map_err(quick_xml::Error::from)?;
    Ok(text.into_owned())
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), DatexError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(DatexError::Malformed(format!(
                "junk after document element: <{}>",
                element.tag
            )))
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), DatexError> {
    match stack.last_mut() {
        Some(current) if current.children.is_empty() => current.text.push_str(text),
        Some(_) => {}
        None if text.trim().is_empty() => {}
        None => {
            return Err(DatexError::Malformed(
                "text outside the document element".into(),
            ))
        }
    }
    Ok(())
}

/// `_text` first, then children in document order (repeats collapse into
/// an array at the first occurrence's position), then `@`-prefixed
/// attributes.
fn element_to_map(element: Element) -> Map<String, Value> {
    let mut map = Map::new();

    let text = element.text.trim();
    if !text.is_empty() {
        map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }

    for child in element.children {
        let tag = child.tag.clone();
        let value = Value::Object(element_to_map(child));
        match map.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(tag, value);
            }
        }
    }

    for (key, value) in element.attrs {
        map.insert(format!("@{key}"), Value::String(value));
    }

    map
}

/// Pick the records out of the root object.
///
/// The first array-valued key becomes the record list. Without one, the
/// root object itself is the single record.
fn tabulate(mut root: Map<String, Value>) -> ParsedTable {
    let root_width = root.len();
    let list_key = root
        .iter()
        .find(|(_, v)| v.is_array())
        .map(|(k, _)| k.clone());

    match list_key.and_then(|k| root.remove(&k)) {
        Some(Value::Array(items)) => {
            let columns = match items.first() {
                Some(first @ Value::Object(_)) => object_width(first),
                _ => root_width,
            };
            ParsedTable {
                rows: items.len(),
                columns,
                pages: 1,
                data: Value::Array(items),
            }
        }
        _ => ParsedTable {
            rows: 1,
            columns: root_width,
            pages: 1,
            data: Value::Object(root),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_children_become_records() {
        let table = parse_xml_str(
            r#"<?xml version="1.0"?>
<people source="hr">
  <person id="1"><name>Alice</name><age>30</age></person>
  <person id="2"><name>Bob</name><age>25</age></person>
  <person id="3"><name>Carla</name><age>41</age></person>
</people>"#,
        )
        .unwrap();
        assert_eq!((table.pages, table.rows, table.columns), (1, 3, 3));
        assert_eq!(
            table.data[0],
            json!({"name": {"_text": "Alice"}, "age": {"_text": "30"}, "@id": "1"})
        );
    }

    #[test]
    fn no_repeats_keeps_root_object() {
        let table = parse_xml_str("<config><host>db</host><port>5432</port></config>").unwrap();
        assert_eq!((table.rows, table.columns), (1, 2));
        assert_eq!(
            table.data,
            json!({"host": {"_text": "db"}, "port": {"_text": "5432"}})
        );
    }

    #[test]
    fn first_repeated_tag_wins() {
        let table = parse_xml_str(
            "<r><meta/><a>1</a><b>x</b><a>2</a><b>y</b><b>z</b></r>",
        )
        .unwrap();
        assert_eq!(table.rows, 2);
        assert_eq!(table.data, json!([{"_text": "1"}, {"_text": "2"}]));
        assert_eq!(table.columns, 1);
    }

    #[test]
    fn leading_text_only_and_entities() {
        let table = parse_xml_str(
            "<note>  Fish &amp; chips <![CDATA[<raw>]]><to>Ann</to> tail text</note>",
        )
        .unwrap();
        assert_eq!(
            table.data,
            json!({"_text": "Fish & chips <raw>", "to": {"_text": "Ann"}})
        );
    }

    #[test]
    fn namespace_declarations_are_skipped() {
        let table = parse_xml_str(r#"<x:doc xmlns:x="urn:x" lang="sv"/>"#).unwrap();
        assert_eq!(table.data, json!({"@lang": "sv"}));
    }

    #[test]
    fn declared_latin1_is_decoded() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r k=\"\xE5\"><c>caf\xE9</c></r>";
        let table = parse_xml_bytes(bytes).unwrap();
        assert_eq!(table.data, json!({"c": {"_text": "caf\u{e9}"}, "@k": "\u{e5}"}));
    }

    #[test]
    fn utf8_bom_is_accepted() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<r><c>\u{f6}</c></r>".as_bytes());
        let table = parse_xml_bytes(&bytes).unwrap();
        assert_eq!(table.data, json!({"c": {"_text": "\u{f6}"}}));
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(parse_xml_str("<a><b></a>").is_err());
        assert!(parse_xml_str("<a>").is_err());
        assert!(parse_xml_str("").is_err());
        assert!(parse_xml_str("<a/><b/>").is_err());
    }
}
