//! Generate and fill workflows: populate a template slide from a session.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveTime};
use slidefill_core::{
    BatchReport, EntryKind, Error, FileResolver, ImageLayout, LineExtractor, Result, Session,
    TextLayout,
};

use crate::presentation::{PptxDocument, SlideSummary, SlideWriter};
use crate::shapes::TextStyle;
use crate::units::{cm_to_emu, picture_extent};

/// `{prefix}_{HH-MM-SS}.pptx`
pub fn output_file_name(prefix: &str, time: NaiveTime) -> String {
    format!("{}_{}.pptx", prefix, time.format("%H-%M-%S"))
}

/// Build a one-slide presentation from the session's template slide and
/// save it as `{workDir}/{mode}_{HH-MM-SS}.pptx`.
pub fn generate(session: &Session, slide_index: usize) -> Result<BatchReport> {
    let work_dir = require_work_dir(session)?;
    let output = work_dir.join(output_file_name(session.mode_name(), Local::now().time()));
    generate_to(session, slide_index, &output)
}

/// Like [`generate`], writing to `output`.
///
/// An out-of-range `slide_index` falls back to the first slide, and a
/// template without slides gets a blank one from its first layout. All other
/// slides are removed, the kept slide loses its top-level pictures, then
/// the session's pictures and text boxes are added in entry order.
/// Entries that fail are recorded in the report and skipped.
pub fn generate_to(session: &Session, slide_index: usize, output: &Path) -> Result<BatchReport> {
    let template = require_template(session)?;
    let work_dir = require_work_dir(session)?;
    if session.is_empty() {
        return Err(Error::EmptyMode);
    }

    let mut document = PptxDocument::open(template)?;
    let mut count = document.slide_count()?;
    if count == 0 {
        log::warn!("{} contains no slides, adding a blank one", template.display());
        document.append_blank_slide()?;
        count = 1;
    }
    let index = if slide_index < count {
        slide_index
    } else {
        log::warn!(
            "Slide index {} out of range ({} slides), using the first slide",
            slide_index,
            count
        );
        0
    };

    let part = document.keep_only_slide(index)?;
    let mut report = BatchReport::new(session.images().len(), session.texts().len());
    report.source = Some(describe_source(template, index));

    let mut slide = document.edit_slide(&part)?;
    slide.strip_pictures()?;

    for (i, layout) in session.images().iter().enumerate() {
        match insert_picture(&mut slide, work_dir, layout) {
            Ok(()) => report.images_inserted += 1,
            Err(e) => report.fail(EntryKind::Image, i, e.to_string()),
        }
    }
    insert_texts(&mut slide, work_dir, session.texts(), &mut report);
    slide.finish()?;

    document.save(output)?;
    report.output = Some(output.to_path_buf());
    log::info!(
        "Generated {} ({} images, {} texts)",
        output.display(),
        report.images_inserted,
        report.texts_inserted
    );
    Ok(report)
}

/// Add the session's text boxes to a slide of the template, keeping every
/// slide, and save as `{workDir}/{templateStem}_filled_{HH-MM-SS}.pptx`.
pub fn fill(session: &Session, slide_index: usize) -> Result<BatchReport> {
    let template = require_template(session)?;
    let work_dir = require_work_dir(session)?;
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output = work_dir.join(output_file_name(
        &format!("{}_filled", stem),
        Local::now().time(),
    ));
    fill_to(session, slide_index, &output)
}

/// Like [`fill`], writing to `output`. The slide index must exist.
pub fn fill_to(session: &Session, slide_index: usize, output: &Path) -> Result<BatchReport> {
    let template = require_template(session)?;
    let work_dir = require_work_dir(session)?;
    if session.texts().is_empty() {
        return Err(Error::EmptyMode);
    }

    let mut document = PptxDocument::open(template)?;
    let slides = document.slides()?;
    let slide_ref = slides
        .get(slide_index)
        .ok_or(Error::SlideIndexOutOfRange {
            index: slide_index,
            count: slides.len(),
        })?;

    let mut report = BatchReport::new(0, session.texts().len());
    report.source = Some(describe_source(template, slide_index));

    let mut slide = document.edit_slide(&slide_ref.part)?;
    insert_texts(&mut slide, work_dir, session.texts(), &mut report);
    slide.finish()?;

    document.save(output)?;
    report.output = Some(output.to_path_buf());
    log::info!(
        "Filled slide {} into {} ({} texts)",
        slide_index + 1,
        output.display(),
        report.texts_inserted
    );
    Ok(report)
}

/// Slides of a template with their text, for choosing a slide index.
pub fn list_slides(template: &Path) -> Result<Vec<SlideSummary>> {
    if !template.is_file() {
        return Err(Error::TemplateNotFound(template.to_path_buf()));
    }
    PptxDocument::open(template)?.summaries()
}

/// Resolve, read and format the value of one text layout.
pub fn text_value(work_dir: &Path, layout: &TextLayout, extractor: &LineExtractor) -> Result<String> {
    let path = FileResolver::new(work_dir).resolve_path(&layout.keyword)?;
    let value = extractor.extract(&path, layout.line_number, &layout.file_cols)?;
    Ok(value.text)
}

fn insert_picture(slide: &mut SlideWriter<'_>, work_dir: &Path, layout: &ImageLayout) -> Result<()> {
    if layout.filename.is_empty() {
        return Err(Error::ImageError("no image file selected".to_string()));
    }
    let path = work_dir.join(&layout.filename);
    if !path.is_file() {
        return Err(Error::FileNotFound(format!(
            "file not found: {}",
            layout.filename
        )));
    }

    let native = match image::image_dimensions(&path) {
        Ok(size) => Some(size),
        Err(e) => {
            log::debug!("Could not read size of {}: {}", path.display(), e);
            None
        }
    };
    let (cx, cy) = picture_extent(layout, native)?;
    slide.add_picture(&path, cm_to_emu(layout.left), cm_to_emu(layout.top), cx, cy)
}

fn insert_texts(
    slide: &mut SlideWriter<'_>,
    work_dir: &Path,
    texts: &[TextLayout],
    report: &mut BatchReport,
) {
    let extractor = LineExtractor::new();
    let style = TextStyle::default();

    for (i, layout) in texts.iter().enumerate() {
        match text_value(work_dir, layout, &extractor) {
            Ok(value) => {
                slide.add_text_box(&value, cm_to_emu(layout.left), cm_to_emu(layout.top), &style);
                report.texts_inserted += 1;
            }
            Err(e) => report.fail(EntryKind::Text, i, e.to_string()),
        }
    }
}

fn require_template(session: &Session) -> Result<&Path> {
    match session.template() {
        Some(path) if path.is_file() => Ok(path),
        other => Err(Error::TemplateNotFound(
            other.map(Path::to_path_buf).unwrap_or_else(PathBuf::new),
        )),
    }
}

fn require_work_dir(session: &Session) -> Result<&Path> {
    match session.work_dir() {
        Some(path) if path.is_dir() => Ok(path),
        other => Err(Error::WorkDirNotFound(
            other.map(Path::to_path_buf).unwrap_or_else(PathBuf::new),
        )),
    }
}

fn describe_source(template: &Path, index: usize) -> String {
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{} slide {}", name, index + 1)
}
