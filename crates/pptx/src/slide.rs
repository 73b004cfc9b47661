//! Slide part editing and text inspection.

use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;
use slidefill_core::Result;

use crate::xml::{attr, local_name, rewrite, Action};

/// Remove pictures that sit directly in the slide's shape tree.
///
/// Pictures nested in group shapes are kept with their group.
/// Returns the new markup and the number of pictures removed.
pub fn strip_pictures(xml: &str) -> Result<(String, usize)> {
    let mut removed = 0;
    let out = rewrite(
        xml,
        |ancestors, e| {
            let in_tree = ancestors.last().map(Vec::as_slice) == Some(b"spTree".as_slice());
            if in_tree && local_name(e.name().as_ref()) == b"pic" {
                removed += 1;
                Action::Drop
            } else {
                Action::Keep
            }
        },
        None,
    )?;
    Ok((out, removed))
}

/// An empty slide: a bare shape tree that follows the master's colors.
pub const BLANK_SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#;

/// Remove every element with a namespaced attribute naming one of
/// `rel_ids`, such as hyperlinks to slides that were deleted.
pub fn drop_references(xml: &str, rel_ids: &HashSet<String>) -> Result<String> {
    rewrite(
        xml,
        |_, e| {
            let references = e.attributes().flatten().any(|a| {
                let key = a.key.as_ref();
                !key.starts_with(b"xmlns")
                    && key.contains(&b':')
                    && rel_ids.contains(&*String::from_utf8_lossy(&a.value))
            });
            if references {
                Action::Drop
            } else {
                Action::Keep
            }
        },
        None,
    )
}

/// Append raw shape markup at the end of the shape tree.
pub fn append_shapes(xml: &str, shapes: &str) -> Result<String> {
    rewrite(xml, |_, _| Action::Keep, Some((b"spTree", shapes)))
}

/// Largest `cNvPr` id used on the slide.
pub fn max_shape_id(xml: &str) -> u32 {
    let mut reader = Reader::from_str(xml);
    let mut max_id = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"cNvPr" =>
            {
                if let Some(id) = attr(e, b"id").and_then(|v| v.parse::<u32>().ok()) {
                    max_id = max_id.max(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error while scanning shape ids (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    max_id
}

/// Text of each shape on the slide, ordered top-to-bottom then left-to-right.
pub fn slide_text_lines(xml: &str) -> Vec<String> {
    let mut shapes = extract_shapes_from_xml(xml);
    shapes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });
    shapes.into_iter().map(|s| s.text).collect()
}

/// Information about a shape extracted from XML.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    x: f64,
    y: f64,
}

/// Collect shapes with non-empty text and their offsets.
fn extract_shapes_from_xml(xml_content: &str) -> Vec<ShapeInfo> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_paragraph = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => current_shape = Some(ShapeInfo::default()),
                b"off" => read_offset(e, current_shape.as_mut()),
                b"txBody" => in_text_body = true,
                b"p" if in_text_body => {
                    in_paragraph = true;
                    if !current_text.is_empty() {
                        current_text.push(' ');
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"off" {
                    read_offset(e, current_shape.as_mut());
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_paragraph {
                    let text = e.unescape().unwrap_or_default();
                    current_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current_shape.take() {
                        shape.text = current_text.trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    current_text.clear();
                    in_text_body = false;
                    in_paragraph = false;
                }
                b"txBody" => in_text_body = false,
                b"p" => in_paragraph = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    shapes
}

fn read_offset(e: &quick_xml::events::BytesStart<'_>, shape: Option<&mut ShapeInfo>) {
    if let Some(shape) = shape {
        if let Some(x) = attr(e, b"x").and_then(|v| v.parse::<f64>().ok()) {
            shape.x = x;
        }
        if let Some(y) = attr(e, b"y").and_then(|v| v.parse::<f64>().ok()) {
            shape.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="100" y="900"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Lower</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:nvPicPr><p:cNvPr id="4" name="Old"/></p:nvPicPr></p:pic><p:grpSp><p:nvGrpSpPr><p:cNvPr id="9" name="Group"/></p:nvGrpSpPr><p:pic><p:nvPicPr><p:cNvPr id="10" name="Nested"/></p:nvPicPr></p:pic></p:grpSp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Header"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="50" y="10"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Upper</a:t></a:r></a:p><a:p><a:r><a:t>Second</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_drop_references() {
        let xml = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Link"><a:hlinkClick r:id="rId4" action="ppaction://hlinksldjump"/></p:cNvPr></p:nvSpPr><p:txBody><a:p><a:r><a:rPr><a:hlinkClick r:id="rId4"/></a:rPr><a:t>rId4</a:t></a:r><a:r><a:rPr><a:hlinkClick r:id="rId5"/></a:rPr><a:t>kept</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let dropped: HashSet<String> = ["rId4".to_string()].into_iter().collect();
        let out = drop_references(xml, &dropped).unwrap();
        assert!(!out.contains(r#"r:id="rId4""#));
        assert!(out.contains(r#"<a:hlinkClick r:id="rId5"/>"#));
        assert!(out.contains("<a:t>rId4</a:t>"));
        assert!(out.contains(r#"<p:cNvPr id="2" name="Link"></p:cNvPr>"#));
    }

    #[test]
    fn test_blank_slide_has_empty_tree() {
        assert_eq!(max_shape_id(BLANK_SLIDE), 1);
        assert!(slide_text_lines(BLANK_SLIDE).is_empty());
        assert!(append_shapes(BLANK_SLIDE, "<p:sp/>").unwrap().contains("<p:grpSpPr/><p:sp/></p:spTree>"));
    }

    #[test]
    fn test_strip_top_level_pictures_only() {
        let (xml, removed) = strip_pictures(SLIDE).unwrap();
        assert_eq!(removed, 1);
        assert!(!xml.contains(r#"name="Old""#));
        assert!(xml.contains(r#"name="Nested""#));
        assert!(xml.contains("<a:t>Lower</a:t>"));
    }

    #[test]
    fn test_append_shapes_at_end_of_tree() {
        let xml = append_shapes(SLIDE, "<p:sp>NEW</p:sp>").unwrap();
        assert!(xml.contains("<p:sp>NEW</p:sp></p:spTree>"));
    }

    #[test]
    fn test_max_shape_id() {
        assert_eq!(max_shape_id(SLIDE), 10);
        assert_eq!(max_shape_id("<p:sld/>"), 0);
    }

    #[test]
    fn test_slide_text_lines_sorted_by_position() {
        assert_eq!(slide_text_lines(SLIDE), vec!["Upper Second", "Lower"]);
    }
}
