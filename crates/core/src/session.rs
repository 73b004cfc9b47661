//! Editing session state.
//!
//! Holds the currently configured image and text entries, the working
//! directory and the template. Every mutation is announced to subscribed
//! listeners so a front end can re-render from the state alone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::default_template;
use crate::error::{Error, Result};
use crate::types::{ImageLayout, LayoutMode, TextLayout, CUSTOM_MODE};

/// Image extensions picked up when filling entries from a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// A change to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ModeApplied { name: String, images: usize, texts: usize },
    TemplateChanged(Option<PathBuf>),
    WorkDirChanged(PathBuf),
    ImageAdded(usize),
    ImageRemoved(usize),
    ImagesFilled { found: usize, total: usize },
    TextAdded(usize),
    TextRemoved(usize),
    Cleared,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// The working state a generate or fill operation runs against.
#[derive(Default)]
pub struct Session {
    mode_name: String,
    template: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    images: Vec<ImageLayout>,
    texts: Vec<TextLayout>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode_name", &self.mode_name)
            .field("template", &self.template)
            .field("work_dir", &self.work_dir)
            .field("images", &self.images)
            .field("texts", &self.texts)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Session {
    /// Start with the reserved mode and no entries.
    pub fn new() -> Self {
        Self {
            mode_name: CUSTOM_MODE.to_string(),
            ..Self::default()
        }
    }

    /// Register a listener for state changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn mode_name(&self) -> &str {
        &self.mode_name
    }

    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    pub fn images(&self) -> &[ImageLayout] {
        &self.images
    }

    pub fn texts(&self) -> &[TextLayout] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.texts.is_empty()
    }

    /// Set the template presentation.
    pub fn set_template(&mut self, template: Option<PathBuf>) {
        self.template = template.clone();
        self.emit(SessionEvent::TemplateChanged(template));
    }

    /// Set the working directory that images and data files are read from.
    pub fn set_work_dir(&mut self, work_dir: impl Into<PathBuf>) {
        let work_dir = work_dir.into();
        self.work_dir = Some(work_dir.clone());
        self.emit(SessionEvent::WorkDirChanged(work_dir));
    }

    /// Replace the entries with a mode's layouts and adopt its template.
    ///
    /// A mode without any layouts only changes the selected name. The
    /// mode's template is used if it still exists, otherwise the bundled
    /// default template if that exists.
    pub fn apply_mode(&mut self, mode: &LayoutMode) {
        self.mode_name = mode.name.clone();

        if let Some(template) = &mode.template_file {
            if template.exists() {
                self.set_template(Some(template.clone()));
            } else if let Some(fallback) = default_template() {
                log::debug!(
                    "Template {} missing, using {}",
                    template.display(),
                    fallback.display()
                );
                self.set_template(Some(fallback));
            }
        }

        if mode.is_empty() {
            return;
        }

        self.images = mode.layouts.clone();
        self.texts = mode.text_layouts.clone();
        self.emit(SessionEvent::ModeApplied {
            name: mode.name.clone(),
            images: self.images.len(),
            texts: self.texts.len(),
        });
    }

    /// Append an image entry at the default offset.
    pub fn add_image(&mut self, filename: impl Into<String>) -> usize {
        self.push_image(ImageLayout::default().with_filename(filename))
    }

    /// Append a fully specified image entry.
    pub fn push_image(&mut self, layout: ImageLayout) -> usize {
        self.images.push(layout);
        let index = self.images.len() - 1;
        self.emit(SessionEvent::ImageAdded(index));
        index
    }

    /// Append a text entry with default settings.
    pub fn add_text(&mut self) -> usize {
        self.push_text(TextLayout::default())
    }

    /// Append a fully specified text entry.
    pub fn push_text(&mut self, layout: TextLayout) -> usize {
        self.texts.push(layout);
        let index = self.texts.len() - 1;
        self.emit(SessionEvent::TextAdded(index));
        index
    }

    /// Mutable access to an image entry.
    pub fn image_mut(&mut self, index: usize) -> Option<&mut ImageLayout> {
        self.images.get_mut(index)
    }

    /// Mutable access to a text entry.
    pub fn text_mut(&mut self, index: usize) -> Option<&mut TextLayout> {
        self.texts.get_mut(index)
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageLayout> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.emit(SessionEvent::ImageRemoved(index));
        Some(removed)
    }

    pub fn remove_text(&mut self, index: usize) -> Option<TextLayout> {
        if index >= self.texts.len() {
            return None;
        }
        let removed = self.texts.remove(index);
        self.emit(SessionEvent::TextRemoved(index));
        Some(removed)
    }

    /// Drop every image and text entry.
    pub fn clear(&mut self) {
        self.images.clear();
        self.texts.clear();
        self.emit(SessionEvent::Cleared);
    }

    /// Assign the working directory's images, sorted by name, to the entries.
    ///
    /// With existing entries only the first `len` images are used and any
    /// surplus entries keep their current file name. With no entries one
    /// entry is created per image. Returns the number of images found.
    pub fn fill_images_from_dir(&mut self) -> Result<usize> {
        let work_dir = self
            .work_dir
            .clone()
            .ok_or_else(|| Error::WorkDirNotFound(PathBuf::new()))?;
        if !work_dir.is_dir() {
            return Err(Error::WorkDirNotFound(work_dir));
        }

        let files = list_images(&work_dir)?;
        if files.is_empty() {
            return Err(Error::FileNotFound(format!(
                "No image files found in {}",
                work_dir.display()
            )));
        }

        let found = files.len();
        if self.images.is_empty() {
            self.images = files
                .into_iter()
                .map(|name| ImageLayout::default().with_filename(name))
                .collect();
        } else {
            for (entry, name) in self.images.iter_mut().zip(files) {
                entry.filename = name;
            }
        }

        let total = self.images.len();
        self.emit(SessionEvent::ImagesFilled { found, total });
        Ok(found)
    }

    /// Build a layout mode from the current entries.
    ///
    /// File names are not persisted; a mode describes positions only.
    pub fn capture_mode(&self, name: &str, slide_index: Option<usize>) -> Result<LayoutMode> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidLayout("mode name is empty".to_string()));
        }
        if name == CUSTOM_MODE {
            return Err(Error::ReservedMode(name.to_string()));
        }
        if self.is_empty() {
            return Err(Error::EmptyMode);
        }

        let mut mode = LayoutMode::new(name);
        mode.layouts = self
            .images
            .iter()
            .map(|layout| ImageLayout {
                filename: String::new(),
                ..layout.clone()
            })
            .collect();
        mode.text_layouts = self.texts.clone();
        mode.template_file = self.template.clone();
        mode.slide_index = slide_index.unwrap_or(0);
        mode.description = LayoutMode::describe(mode.layouts.len(), mode.text_layouts.len(), slide_index);
        mode.validate()?;
        Ok(mode)
    }
}

/// Image files in `dir`, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| is_image_name(name))
        .collect();
    files.sort();
    Ok(files)
}

/// Whether the file name has a supported image extension.
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
