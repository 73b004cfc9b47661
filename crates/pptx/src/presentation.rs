//! Presentation-level operations: slide order, slide removal and slide editing.

use std::collections::HashSet;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use slidefill_core::{Error, Result};

use crate::package::{
    rels_path, relative_target, resolve_target, Package, CONTENT_TYPES_PART,
};
use crate::rels::{
    ContentTypes, Relationships, REL_IMAGE, REL_NOTES_SLIDE, REL_OFFICE_DOCUMENT, REL_SLIDE,
    REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, SLIDE_CONTENT_TYPE,
};
use crate::shapes::{picture_xml, text_box_xml, TextStyle};
use crate::slide::{
    append_shapes, drop_references, max_shape_id, slide_text_lines, strip_pictures, BLANK_SLIDE,
};
use crate::xml::{attr, local_name, prefixed_attr, rewrite, Action};

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const FIRST_SLIDE_ID: u32 = 256;

/// Children of `p:presentation` that come after `p:sldIdLst`.
const AFTER_SLIDE_ID_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// A slide as listed in the presentation's slide id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Numeric slide id from `p:sldId`.
    pub id: String,
    /// Relationship id from the presentation part.
    pub rel_id: String,
    /// Resolved slide part name.
    pub part: String,
}

/// Slide number, part and visible text, for choosing a template slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSummary {
    /// 1-based position in the presentation.
    pub number: usize,
    pub part: String,
    pub lines: Vec<String>,
}

/// An opened `.pptx` document.
#[derive(Debug, Clone)]
pub struct PptxDocument {
    package: Package,
    presentation_part: String,
}

impl PptxDocument {
    /// Open a presentation file.
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening presentation {}", path.display());
        Self::from_package(Package::open(path)?)
    }

    /// Open a presentation from a ZIP reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    /// Wrap a package, locating its main presentation part.
    pub fn from_package(package: Package) -> Result<Self> {
        let from_rels = package
            .part_str("_rels/.rels")
            .ok()
            .and_then(|xml| Relationships::parse(&xml).ok())
            .and_then(|rels| {
                rels.of_type(REL_OFFICE_DOCUMENT)
                    .next()
                    .map(|r| resolve_target("", &r.target))
            });
        let presentation_part =
            from_rels.unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());

        if !package.contains(&presentation_part) {
            return Err(Error::PptxError(format!(
                "Presentation part '{}' not found",
                presentation_part
            )));
        }

        Ok(Self {
            package,
            presentation_part,
        })
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Slides in presentation order.
    ///
    /// Order comes from `p:sldIdLst`; ids whose relationship is missing are
    /// skipped.
    pub fn slides(&self) -> Result<Vec<SlideRef>> {
        let rels = self.presentation_rels()?;
        let xml = self.package.part_str(&self.presentation_part)?;
        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        let mut slides = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    let id = attr(e, b"id").unwrap_or_default();
                    let Some(rel_id) = prefixed_attr(e, b"id") else {
                        continue;
                    };
                    match rels.get(&rel_id).filter(|r| r.rel_type == REL_SLIDE) {
                        Some(rel) => slides.push(SlideRef {
                            id,
                            part: resolve_target(&self.presentation_part, &rel.target),
                            rel_id,
                        }),
                        None => log::warn!("Slide id {} has no slide relationship {}", id, rel_id),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing presentation: {}", e)));
                }
                _ => {}
            }
        }

        Ok(slides)
    }

    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slides()?.len())
    }

    /// Every slide with its text lines sorted by position.
    pub fn summaries(&self) -> Result<Vec<SlideSummary>> {
        self.slides()?
            .into_iter()
            .enumerate()
            .map(|(idx, slide)| {
                let xml = self.package.part_str(&slide.part)?;
                Ok(SlideSummary {
                    number: idx + 1,
                    lines: slide_text_lines(&xml),
                    part: slide.part,
                })
            })
            .collect()
    }

    /// Delete every slide except the 0-based `index`, returning the kept
    /// slide's part name.
    ///
    /// Removed slides take their notes slides with them. References in the
    /// presentation part, its relationships and the content types are
    /// dropped, as are the kept slide's links to parts that no longer exist
    /// and the elements in the slide that used those links.
    pub fn keep_only_slide(&mut self, index: usize) -> Result<String> {
        let slides = self.slides()?;
        let kept = slides
            .get(index)
            .cloned()
            .ok_or(Error::SlideIndexOutOfRange {
                index,
                count: slides.len(),
            })?;

        let mut content_types = self.content_types()?;
        let mut removed_rel_ids = HashSet::new();

        for slide in slides.iter().filter(|s| s.part != kept.part) {
            removed_rel_ids.insert(slide.rel_id.clone());

            let mut doomed = vec![slide.part.clone()];
            if let Some(rels) = self.part_rels(&slide.part)? {
                doomed.extend(
                    rels.of_type(REL_NOTES_SLIDE)
                        .filter(|r| !r.external)
                        .map(|r| resolve_target(&slide.part, &r.target)),
                );
            }

            for part in doomed {
                log::debug!("Removing part {}", part);
                self.package.remove_part(&part);
                self.package.remove_part(&rels_path(&part));
                content_types.remove_override(&part);
            }
        }

        let xml = self.package.part_str(&self.presentation_part)?;
        let xml = rewrite(
            &xml,
            |_, e| {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                let references_removed = (name == b"sldId" || name == b"sld")
                    && prefixed_attr(e, b"id").is_some_and(|id| removed_rel_ids.contains(&id));
                if references_removed {
                    Action::Drop
                } else {
                    Action::Keep
                }
            },
            None,
        )?;
        self.package
            .set_part(&self.presentation_part, xml.into_bytes());

        let mut rels = self.presentation_rels()?;
        rels.retain(|r| !removed_rel_ids.contains(&r.id));
        self.package.set_part(
            &rels_path(&self.presentation_part),
            rels.to_xml().into_bytes(),
        );

        if let Some(mut slide_rels) = self.part_rels(&kept.part)? {
            let package = &self.package;
            let source = &kept.part;
            let mut dangling = HashSet::new();
            slide_rels.retain(|r| {
                let present = r.external || package.contains(&resolve_target(source, &r.target));
                if !present {
                    log::debug!("Dropping dangling relationship {} of {}", r.id, source);
                    dangling.insert(r.id.clone());
                }
                present
            });
            self.package
                .set_part(&rels_path(&kept.part), slide_rels.to_xml().into_bytes());

            if !dangling.is_empty() {
                let xml = drop_references(&self.package.part_str(&kept.part)?, &dangling)?;
                self.package.set_part(&kept.part, xml.into_bytes());
            }
        }

        self.package
            .set_part(CONTENT_TYPES_PART, content_types.to_xml().into_bytes());
        Ok(kept.part)
    }

    /// Append an empty slide using the first layout of the first slide
    /// master, returning the new slide's part name.
    pub fn append_blank_slide(&mut self) -> Result<String> {
        let layout = self.first_layout()?;
        let next_id = self
            .slides()?
            .iter()
            .filter_map(|s| s.id.parse::<u32>().ok())
            .max()
            .map_or(FIRST_SLIDE_ID, |id| id + 1);
        let part = (1..)
            .map(|n| format!("ppt/slides/slide{}.xml", n))
            .find(|name| !self.package.contains(name))
            .unwrap_or_default();

        let mut slide_rels = Relationships::default();
        slide_rels.add(REL_SLIDE_LAYOUT, &relative_target(&part, &layout));
        self.package.set_part(&part, BLANK_SLIDE.as_bytes().to_vec());
        self.package
            .set_part(&rels_path(&part), slide_rels.to_xml().into_bytes());

        let mut content_types = self.content_types()?;
        content_types.set_override(&part, SLIDE_CONTENT_TYPE);
        self.package
            .set_part(CONTENT_TYPES_PART, content_types.to_xml().into_bytes());

        let mut rels = self.presentation_rels()?;
        let rel_id = rels.add(REL_SLIDE, &relative_target(&self.presentation_part, &part));
        self.package.set_part(
            &rels_path(&self.presentation_part),
            rels.to_xml().into_bytes(),
        );

        let xml = self.package.part_str(&self.presentation_part)?;
        let xml = add_slide_id(&xml, next_id, &rel_id)?;
        self.package
            .set_part(&self.presentation_part, xml.into_bytes());

        log::debug!("Appended blank slide {} using {}", part, layout);
        Ok(part)
    }

    /// Start editing a slide part. Changes are applied by [`SlideWriter::finish`].
    pub fn edit_slide(&mut self, part: &str) -> Result<SlideWriter<'_>> {
        let xml = self.package.part_str(part)?;
        let rels = self.part_rels(part)?.unwrap_or_default();
        let content_types = self.content_types()?;
        let next_shape_id = max_shape_id(&xml) + 1;

        Ok(SlideWriter {
            part: part.to_string(),
            xml,
            rels,
            content_types,
            next_shape_id,
            shapes: String::new(),
            document: self,
        })
    }

    /// Write the document to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        log::debug!("Saving presentation to {}", path.display());
        self.package.save(path)
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.package.write_to(writer)
    }

    fn presentation_rels(&self) -> Result<Relationships> {
        Ok(self.part_rels(&self.presentation_part)?.unwrap_or_default())
    }

    fn part_rels(&self, part: &str) -> Result<Option<Relationships>> {
        let path = rels_path(part);
        if !self.package.contains(&path) {
            return Ok(None);
        }
        Relationships::parse(&self.package.part_str(&path)?).map(Some)
    }

    fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(&self.package.part_str(CONTENT_TYPES_PART)?)
    }

    /// Part name of the first layout listed by the first slide master.
    fn first_layout(&self) -> Result<String> {
        let master = self
            .presentation_rels()?
            .of_type(REL_SLIDE_MASTER)
            .next()
            .map(|r| resolve_target(&self.presentation_part, &r.target))
            .ok_or_else(|| Error::PptxError("Presentation has no slide master".to_string()))?;
        let master_rels = self.part_rels(&master)?.unwrap_or_default();
        let listed = first_layout_rel_id(&self.package.part_str(&master)?);

        let rel = listed
            .and_then(|id| master_rels.get(&id))
            .filter(|r| r.rel_type == REL_SLIDE_LAYOUT)
            .or_else(|| master_rels.of_type(REL_SLIDE_LAYOUT).next())
            .ok_or_else(|| Error::PptxError(format!("Slide master '{}' has no layouts", master)))?;
        Ok(resolve_target(&master, &rel.target))
    }
}

fn first_layout_rel_id(master_xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(master_xml);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldLayoutId" =>
            {
                return prefixed_attr(e, b"id");
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Add a `sldId` entry at the end of the presentation's slide id list,
/// creating the list when the presentation has none.
fn add_slide_id(xml: &str, id: u32, rel_id: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 64));
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut added = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing presentation: {}", e)))?;

        match &event {
            Event::Start(e) | Event::Empty(e) if !added => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if depth == 0 {
                    let full = qname.as_ref();
                    if let Some(pos) = full.iter().position(|&b| b == b':') {
                        prefix = format!("{}:", String::from_utf8_lossy(&full[..pos]));
                    }
                } else if depth == 1 && name == b"sldIdLst" && matches!(event, Event::Empty(_)) {
                    writer
                        .write_event(Event::Start(e.clone()))
                        .map_err(|err| Error::XmlError(err.to_string()))?;
                    let list = String::from_utf8_lossy(qname.as_ref()).into_owned();
                    let markup = format!(
                        r#"<{p}sldId id="{id}" r:id="{rel_id}"/></{list}>"#,
                        p = prefix
                    );
                    writer.get_mut().extend_from_slice(markup.as_bytes());
                    added = true;
                    continue;
                } else if depth == 1 && AFTER_SLIDE_ID_LIST.contains(&name) {
                    let markup = format!(
                        r#"<{p}sldIdLst><{p}sldId id="{id}" r:id="{rel_id}"/></{p}sldIdLst>"#,
                        p = prefix
                    );
                    writer.get_mut().extend_from_slice(markup.as_bytes());
                    added = true;
                }
            }
            Event::End(e)
                if !added && depth == 2 && local_name(e.name().as_ref()) == b"sldIdLst" =>
            {
                let markup = format!(r#"<{p}sldId id="{id}" r:id="{rel_id}"/>"#, p = prefix);
                writer.get_mut().extend_from_slice(markup.as_bytes());
                added = true;
            }
            Event::Eof => break,
            _ => {}
        }

        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))?;
    }

    if !added {
        return Err(Error::PptxError(
            "Presentation has no place for a slide id list".to_string(),
        ));
    }
    String::from_utf8(writer.into_inner()).map_err(|e| Error::XmlError(e.to_string()))
}

/// Pending edits to one slide.
pub struct SlideWriter<'a> {
    document: &'a mut PptxDocument,
    part: String,
    xml: String,
    rels: Relationships,
    content_types: ContentTypes,
    next_shape_id: u32,
    shapes: String,
}

impl SlideWriter<'_> {
    /// Remove the pictures at the top level of the slide.
    pub fn strip_pictures(&mut self) -> Result<usize> {
        let (xml, removed) = strip_pictures(&self.xml)?;
        self.xml = xml;
        log::debug!("Removed {} pictures from {}", removed, self.part);
        Ok(removed)
    }

    /// Embed the image at `path` and place it at `(x, y)` with extent `(cx, cy)`, all in EMU.
    pub fn add_picture(&mut self, path: &Path, x: i64, y: i64, cx: i64, cy: i64) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content_type = image_content_type(&extension).ok_or_else(|| {
            Error::ImageError(format!("unsupported image type: {}", path.display()))
        })?;
        let data = fs::read(path)?;

        let media_part = (1..)
            .map(|n| format!("ppt/media/image{}.{}", n, extension))
            .find(|name| !self.document.package.contains(name))
            .unwrap_or_default();
        self.document.package.set_part(&media_part, data);
        self.content_types.ensure_default(&extension, content_type);

        let rel_id = self
            .rels
            .add(REL_IMAGE, &relative_target(&self.part, &media_part));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = self.take_shape_id();
        self.shapes
            .push_str(&picture_xml(id, &name, &rel_id, x, y, cx, cy));
        log::debug!("Added {} as {} ({})", name, media_part, rel_id);
        Ok(())
    }

    /// Place a text box with its top-left corner at `(x, y)` in EMU.
    pub fn add_text_box(&mut self, text: &str, x: i64, y: i64, style: &TextStyle) {
        let id = self.take_shape_id();
        self.shapes.push_str(&text_box_xml(id, text, x, y, style));
    }

    /// Write the slide, its relationships and the content types back to the package.
    pub fn finish(self) -> Result<()> {
        let xml = if self.shapes.is_empty() {
            self.xml
        } else {
            append_shapes(&self.xml, &self.shapes)?
        };

        let package = &mut self.document.package;
        package.set_part(&self.part, xml.into_bytes());
        package.set_part(&rels_path(&self.part), self.rels.to_xml().into_bytes());
        package.set_part(CONTENT_TYPES_PART, self.content_types.to_xml().into_bytes());
        Ok(())
    }

    fn take_shape_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }
}

fn image_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{minimal_pptx, png_bytes};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn document(texts: &[&str]) -> PptxDocument {
        PptxDocument::from_reader(Cursor::new(minimal_pptx(texts))).unwrap()
    }

    fn round_trip(doc: &PptxDocument) -> PptxDocument {
        let mut buffer = Cursor::new(Vec::new());
        doc.write_to(&mut buffer).unwrap();
        PptxDocument::from_reader(Cursor::new(buffer.into_inner())).unwrap()
    }

    #[test]
    fn test_slides_follow_id_list_order() {
        let doc = document(&["one", "two", "three"]);
        let parts: Vec<String> = doc.slides().unwrap().into_iter().map(|s| s.part).collect();
        assert_eq!(
            parts,
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide3.xml"]
        );
    }

    #[test]
    fn test_summaries() {
        let doc = document(&["first", "second"]);
        let summaries = doc.summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].number, 2);
        assert_eq!(summaries[1].lines, vec!["second"]);
    }

    #[test]
    fn test_keep_only_slide() {
        let mut doc = document(&["one", "two", "three"]);
        let kept = doc.keep_only_slide(1).unwrap();
        assert_eq!(kept, "ppt/slides/slide2.xml");

        let doc = round_trip(&doc);
        let slides = doc.slides().unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].part, "ppt/slides/slide2.xml");

        let package = doc.package();
        assert!(!package.contains("ppt/slides/slide1.xml"));
        assert!(!package.contains("ppt/slides/_rels/slide3.xml.rels"));
        assert!(!package.contains("ppt/notesSlides/notesSlide1.xml"));
        assert!(package.contains("ppt/notesSlides/notesSlide2.xml"));

        let presentation = package.part_str("ppt/presentation.xml").unwrap();
        assert_eq!(presentation.matches("<p:sldId ").count(), 1);
        assert!(!presentation.contains("<p:sld "));

        let types = package.part_str(CONTENT_TYPES_PART).unwrap();
        assert!(!types.contains("/ppt/slides/slide1.xml"));
        assert!(types.contains("/ppt/slides/slide2.xml"));

        // slide2 linked to slide1, which is gone now
        let rels = package.part_str("ppt/slides/_rels/slide2.xml.rels").unwrap();
        assert!(!rels.contains("slide1.xml"));
        assert!(rels.contains("slideLayout1.xml"));

        // and its jump link to slide1 goes with the relationship
        let slide = package.part_str("ppt/slides/slide2.xml").unwrap();
        assert!(!slide.contains("hlinkClick"));
        assert!(slide.contains("<a:t>two</a:t>"));
        assert!(slide.contains(r#"<a:blip r:embed="rId2"/>"#));
    }

    #[test]
    fn test_append_blank_slide_to_empty_presentation() {
        let mut doc = document(&[]);
        assert_eq!(doc.slide_count().unwrap(), 0);
        assert_eq!(doc.append_blank_slide().unwrap(), "ppt/slides/slide1.xml");

        let doc = round_trip(&doc);
        let slides = doc.slides().unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].id, "256");
        assert_eq!(slides[0].rel_id, "rId2");

        let package = doc.package();
        let presentation = package.part_str("ppt/presentation.xml").unwrap();
        let list = presentation.find("<p:sldIdLst>").unwrap();
        assert!(presentation.find("</p:sldMasterIdLst>").unwrap() < list);
        assert!(list < presentation.find("<p:sldSz").unwrap());

        let rels = package.part_str("ppt/slides/_rels/slide1.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="../slideLayouts/slideLayout1.xml""#));
        let types = package.part_str(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"PartName="/ppt/slides/slide1.xml""#));
        assert!(doc.summaries().unwrap()[0].lines.is_empty());
    }

    #[test]
    fn test_append_blank_slide_after_existing() {
        let mut doc = document(&["one", "two"]);
        assert_eq!(doc.append_blank_slide().unwrap(), "ppt/slides/slide3.xml");
        let slides = doc.slides().unwrap();
        let ids: Vec<&str> = slides.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["256", "257", "258"]);
        assert_eq!(slides[2].part, "ppt/slides/slide3.xml");
    }

    #[test]
    fn test_add_slide_id_to_empty_list() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst/><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        assert_eq!(
            add_slide_id(xml, 300, "rId7").unwrap(),
            r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="300" r:id="rId7"/></p:sldIdLst><p:sldSz cx="1" cy="1"/></p:presentation>"#
        );
    }

    #[test]
    fn test_append_blank_slide_requires_master() {
        let mut doc = document(&["one"]);
        let mut package = doc.package().clone();
        package.remove_part("ppt/slideMasters/slideMaster1.xml");
        package.remove_part("ppt/slideMasters/_rels/slideMaster1.xml.rels");
        package.set_part(
            "ppt/_rels/presentation.xml.rels",
            Relationships::default().to_xml().into_bytes(),
        );
        doc = PptxDocument::from_package(package).unwrap();
        assert!(matches!(doc.append_blank_slide(), Err(Error::PptxError(_))));
    }

    #[test]
    fn test_keep_only_slide_out_of_range() {
        let mut doc = document(&["one"]);
        assert!(matches!(
            doc.keep_only_slide(3),
            Err(Error::SlideIndexOutOfRange { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_edit_slide_adds_picture_and_text() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("photo.PNG");
        let png = png_bytes(4, 3);
        fs::write(&image, &png).unwrap();

        let mut doc = document(&["one"]);
        let mut slide = doc.edit_slide("ppt/slides/slide1.xml").unwrap();
        assert_eq!(slide.strip_pictures().unwrap(), 1);
        slide.add_picture(&image, 10, 20, 30, 40).unwrap();
        slide.add_text_box("42", 50, 60, &TextStyle::default());
        slide.finish().unwrap();

        let doc = round_trip(&doc);
        let package = doc.package();
        let xml = package.part_str("ppt/slides/slide1.xml").unwrap();
        assert_eq!(xml.matches("<p:pic>").count(), 1);
        assert!(xml.contains(r#"descr="photo.PNG""#));
        assert!(xml.contains("<a:t>42</a:t>"));
        // ids continue after the highest existing one
        assert!(xml.contains(r#"<p:cNvPr id="4" name="Picture 4""#));
        assert!(xml.contains(r#"<p:cNvPr id="5" name="TextBox 4"/>"#));

        // old.png already lives in ppt/media but not under the image1 name
        assert_eq!(package.part("ppt/media/image1.png"), Some(png.as_slice()));
        let rels = package.part_str("ppt/slides/_rels/slide1.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="../media/image1.png""#));
        let types = package.part_str(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"Extension="png""#));
    }

    #[test]
    fn test_add_picture_rejects_unknown_type() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("photo.tiff");
        fs::write(&image, b"II*\0").unwrap();

        let mut doc = document(&["one"]);
        let mut slide = doc.edit_slide("ppt/slides/slide1.xml").unwrap();
        assert!(matches!(
            slide.add_picture(&image, 0, 0, 1, 1),
            Err(Error::ImageError(_))
        ));
    }

    #[test]
    fn test_missing_presentation_part() {
        let mut package = Package::default();
        package.set_part(CONTENT_TYPES_PART, b"<Types/>".to_vec());
        assert!(matches!(
            PptxDocument::from_package(package),
            Err(Error::PptxError(_))
        ));
    }
}
