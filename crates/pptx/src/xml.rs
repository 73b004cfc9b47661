//! Small XML helpers shared by the package parts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use slidefill_core::{Error, Result};

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the attribute whose full key is `key`, unescaped.
pub fn attr(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

/// Value of the first prefixed attribute with local name `local`
/// (e.g. `r:id` for `b"id"`).
pub fn prefixed_attr(element: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| {
            let key = a.key.as_ref();
            key.contains(&b':') && local_name(key) == local
        })
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Escape text for element content or attribute values.
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Escape text for a text run, writing each character XML 1.0 forbids as
/// `_xHHHH_`, the form Office uses for them.
pub fn escape_text(text: &str) -> String {
    if !text.chars().any(is_forbidden) {
        return escape(text);
    }
    let mut encoded = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_forbidden(c) {
            encoded.push_str(&format!("_x{:04X}_", u32::from(c)));
        } else {
            encoded.push(c);
        }
    }
    escape(&encoded)
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Decision for each element seen by [`rewrite`].
pub enum Action {
    /// Copy the element unchanged.
    Keep,
    /// Drop the element and everything inside it.
    Drop,
}

/// Stream `xml` through, dropping elements selected by `select` and
/// splicing `insert` raw markup in front of the closing tag of the first
/// element whose local name is `insert_before_end_of`.
///
/// `select` receives the local names of the open ancestors and the element.
pub fn rewrite<F>(
    xml: &str,
    mut select: F,
    insert_before_end_of: Option<(&[u8], &str)>,
) -> Result<String>
where
    F: FnMut(&[Vec<u8>], &BytesStart<'_>) -> Action,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut ancestors: Vec<Vec<u8>> = Vec::new();
    let mut skip_depth = 0usize;
    let mut inserted = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("at position {}: {}", reader.buffer_position(), e)))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref e) => {
                if let Action::Drop = select(&ancestors, e) {
                    skip_depth = 1;
                    continue;
                }
                ancestors.push(local_name(e.name().as_ref()).to_vec());
            }
            Event::Empty(ref e) => {
                if let Action::Drop = select(&ancestors, e) {
                    continue;
                }
            }
            Event::End(ref e) => {
                ancestors.pop();
                if let Some((target, markup)) = insert_before_end_of {
                    if !inserted && local_name(e.name().as_ref()) == target {
                        writer.get_mut().extend_from_slice(markup.as_bytes());
                        inserted = true;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }

        writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))?;
    }

    if let Some((target, _)) = insert_before_end_of {
        if !inserted {
            return Err(Error::XmlError(format!(
                "Element '{}' not found",
                String::from_utf8_lossy(target)
            )));
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::XmlError(e.to_string()))
}
