//! Reading and writing [`Element`] trees.
//!
//! Parsing keeps every attribute and element. Whitespace-only text is dropped
//! from elements that also hold child elements; other character data is kept.
//! Input must be UTF-8. Comments, processing
//! instructions and the document type declaration are not retained.
//!
//! Writing emits an XML declaration with an explicit `UTF-8` encoding and
//! indents nested elements by two spaces, as draw.io does.

use std::{borrow::Cow, io::Write, str};

use log::trace;
use quick_xml::{
    Reader, Writer,
    escape::resolve_predefined_entity,
    events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event},
};

use crate::{
    element::{Element, Node},
    error::{ParseError, XmlError},
};

/// Parses an XML document into its top-level element.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed or does not have
/// exactly one top-level element. The error carries the byte offset at which
/// the problem was detected.
///
/// # Examples
///
/// ```
/// use strata_core::xml;
///
/// let root = xml::parse(r#"<mxfile host="test"><diagram id="d"/></mxfile>"#).unwrap();
/// assert_eq!(root.name(), "mxfile");
/// assert_eq!(root.attribute("host"), Some("test"));
/// ```
pub fn parse(source: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(source);
    read_document(&mut reader).map_err(|err| {
        let offset = match err {
            XmlError::Syntax(_) => reader.error_position(),
            _ => reader.buffer_position(),
        };
        ParseError::new(err, usize::try_from(offset).unwrap_or(source.len()))
    })
}

/// Parses an XML document held as raw bytes.
///
/// # Errors
///
/// Returns [`ParseError`] with [`XmlError::InvalidUtf8`] at the first invalid
/// byte if `bytes` is not UTF-8, and otherwise as [`parse`] does.
pub fn parse_bytes(bytes: &[u8]) -> Result<Element, ParseError> {
    let source = str::from_utf8(bytes)
        .map_err(|err| ParseError::new(XmlError::InvalidUtf8(err), err.valid_up_to()))?;
    parse(source)
}

fn read_document(reader: &mut Reader<&[u8]>) -> Result<Element, XmlError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut document: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut document, element)?;
            }
            Event::End(end) => {
                let mut element = stack.pop().ok_or_else(|| {
                    XmlError::UnexpectedClose(String::from_utf8_lossy(end.name().as_ref()).into())
                })?;
                element.drop_blank_text();
                attach(&mut stack, &mut document, element)?;
            }
            Event::Text(text) => push_text(&mut stack, &text.decode()?),
            Event::CData(data) => push_text(&mut stack, &data.decode()?),
            Event::GeneralRef(reference) => push_text(&mut stack, &resolve_reference(&reference)?),
            Event::Eof => break,
            other => trace!(event:? = other; "Skipping XML event"),
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.name().to_string()));
    }

    document.ok_or(XmlError::NoRootElement)
}

/// Serializes an element tree as a complete XML document.
///
/// # Errors
///
/// Returns [`XmlError`] if writing fails.
pub fn to_string(document: &Element) -> Result<String, XmlError> {
    let mut buffer = Vec::new();
    write(document, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes an element tree as a complete XML document to `sink`.
///
/// The output starts with `<?xml version="1.0" encoding="UTF-8"?>` and ends
/// with a newline.
///
/// # Errors
///
/// Returns [`XmlError`] if the sink fails.
pub fn write<W: Write>(document: &Element, sink: W) -> Result<(), XmlError> {
    let mut writer = Writer::new_with_indent(sink, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, document)?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        let escaped = escape_attribute(value);
        start.push_attribute((key.as_bytes(), escaped.as_bytes()));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;

    Ok(())
}

/// Escapes an attribute value.
///
/// Line breaks and tabs become character references so that they survive
/// attribute value normalization when the file is read again.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let qname = start.name();
    let name = str::from_utf8(qname.as_ref())?;
    let mut element = Element::new(name);

    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = str::from_utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value()?;
        element.set_attribute(key, value);
    }

    Ok(element)
}

/// Attaches a completed element to the open parent, or makes it the document
/// element when nothing is open.
fn attach(
    stack: &mut [Element],
    document: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
    } else if document.is_none() {
        *document = Some(element);
    } else {
        return Err(XmlError::MultipleRoots(element.name().to_string()));
    }
    Ok(())
}

/// Text outside the document element (only whitespace in well-formed input)
/// is ignored.
fn push_text(stack: &mut [Element], text: &str) {
    if let Some(parent) = stack.last_mut() {
        parent.push_text(text);
    }
}

fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, XmlError> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }

    let name = reference.decode()?;
    Ok(match resolve_predefined_entity(&name) {
        Some(value) => value.to_string(),
        None => format!("&{name};"),
    })
}
