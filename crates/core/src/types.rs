//! Domain types for layout modes and extracted values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Name of the reserved layout mode that always exists.
pub const CUSTOM_MODE: &str = "custom";

/// Description stored on the reserved mode.
pub const CUSTOM_MODE_DESCRIPTION: &str =
    "Manually configure the position and size of each image";

/// Width/height ratio assumed when only one image dimension is known.
pub const ASSUMED_ASPECT: f64 = 4.0 / 3.0;

fn default_offset() -> f64 {
    2.0
}

fn default_line_number() -> usize {
    1
}

fn default_columns() -> String {
    "1".to_string()
}

/// A named bundle of image and text placements plus a template slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMode {
    /// Unique key; stored as the map key, not inside the record.
    #[serde(skip)]
    pub name: String,

    /// Human-readable summary.
    #[serde(default)]
    pub description: String,

    /// Template presentation this mode was captured against.
    #[serde(default)]
    pub template_file: Option<PathBuf>,

    /// 0-based slide of the template to clone.
    #[serde(default)]
    pub slide_index: usize,

    /// Picture placements, in insertion order.
    #[serde(default)]
    pub layouts: Vec<ImageLayout>,

    /// Text box placements, in insertion order.
    #[serde(default)]
    pub text_layouts: Vec<TextLayout>,
}

impl LayoutMode {
    /// Create an empty mode with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            template_file: None,
            slide_index: 0,
            layouts: Vec::new(),
            text_layouts: Vec::new(),
        }
    }

    /// The reserved mode with empty layouts.
    pub fn custom() -> Self {
        Self {
            description: CUSTOM_MODE_DESCRIPTION.to_string(),
            ..Self::new(CUSTOM_MODE)
        }
    }

    /// Whether this is the reserved mode.
    pub fn is_reserved(&self) -> bool {
        self.name == CUSTOM_MODE
    }

    /// Whether both layout sequences are empty.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty() && self.text_layouts.is_empty()
    }

    /// Check the invariants a mode must satisfy before it is saved.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidLayout("mode name is empty".to_string()));
        }
        if self.is_empty() {
            return Err(Error::EmptyMode);
        }
        for (i, layout) in self.layouts.iter().enumerate() {
            layout
                .validate()
                .map_err(|e| Error::InvalidLayout(format!("image {}: {}", i + 1, e)))?;
        }
        for (i, layout) in self.text_layouts.iter().enumerate() {
            layout
                .validate()
                .map_err(|e| Error::InvalidLayout(format!("text {}: {}", i + 1, e)))?;
        }
        Ok(())
    }

    /// Build the generated description used when a mode is captured.
    pub fn describe(image_count: usize, text_count: usize, template_slide: Option<usize>) -> String {
        let mut description = format!("{} image layout", image_count);
        if let Some(index) = template_slide {
            description.push_str(&format!(" (template slide {})", index + 1));
        }
        if text_count > 0 {
            description.push_str(&format!(", {} text", text_count));
        }
        description
    }
}

/// Placement of one picture, in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayout {
    /// Offset from the slide's left edge.
    #[serde(default = "default_offset")]
    pub left: f64,

    /// Offset from the slide's top edge.
    #[serde(default = "default_offset")]
    pub top: f64,

    /// Image file name relative to the working directory.
    #[serde(default)]
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            left: default_offset(),
            top: default_offset(),
            filename: String::new(),
            width: None,
            height: None,
        }
    }
}

impl ImageLayout {
    /// Create a layout at the given offset with no explicit size.
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    /// Set the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set explicit dimensions.
    pub fn with_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Width if set to a positive value. Zero counts as unset.
    pub fn explicit_width(&self) -> Option<f64> {
        self.width.filter(|w| *w > 0.0)
    }

    /// Height if set to a positive value. Zero counts as unset.
    pub fn explicit_height(&self) -> Option<f64> {
        self.height.filter(|h| *h > 0.0)
    }

    /// Resolve both dimensions given the image's width/height ratio.
    ///
    /// Returns `None` when neither dimension is set; the caller then falls
    /// back to the image's native size.
    pub fn size_with_aspect(&self, aspect: f64) -> Option<(f64, f64)> {
        match (self.explicit_width(), self.explicit_height()) {
            (Some(w), Some(h)) => Some((w, h)),
            (Some(w), None) => Some((w, w / aspect)),
            (None, Some(h)) => Some((h * aspect, h)),
            (None, None) => None,
        }
    }

    /// Resolve both dimensions assuming a 4:3 picture.
    pub fn size_cm(&self) -> Option<(f64, f64)> {
        self.size_with_aspect(ASSUMED_ASPECT)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        check_offset("left", self.left)?;
        check_offset("top", self.top)?;
        if let Some(w) = self.width {
            check_offset("width", w)?;
        }
        if let Some(h) = self.height {
            check_offset("height", h)?;
        }
        Ok(())
    }
}

/// Placement of one extracted text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    /// 1-based line in the resolved data file.
    #[serde(default = "default_line_number")]
    pub line_number: usize,

    /// Comma-separated 1-based column indices, e.g. `"1,3"`.
    #[serde(default = "default_columns")]
    pub file_cols: String,

    #[serde(default = "default_offset")]
    pub left: f64,

    #[serde(default = "default_offset")]
    pub top: f64,

    /// File name substring used to pick the data file; empty means
    /// "first text-like file".
    #[serde(default)]
    pub keyword: String,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            line_number: default_line_number(),
            file_cols: default_columns(),
            left: default_offset(),
            top: default_offset(),
            keyword: String::new(),
        }
    }
}

impl TextLayout {
    /// Create a text layout reading `file_cols` of `line_number`.
    pub fn new(line_number: usize, file_cols: impl Into<String>) -> Self {
        Self {
            line_number,
            file_cols: file_cols.into(),
            ..Self::default()
        }
    }

    /// Set the offset.
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Set the file keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into().trim().to_string();
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.line_number == 0 {
            return Err("line numbers start at 1".to_string());
        }
        check_offset("left", self.left)?;
        check_offset("top", self.top)
    }
}

fn check_offset(field: &str, value: f64) -> std::result::Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a non-negative number, got {}", field, value))
    }
}

/// A value read from a data file, ready to be placed in a text box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    /// File the value came from.
    pub source: PathBuf,

    /// The trimmed source line.
    pub line: String,

    /// Formatted text; columns joined with `/`, or the whole line.
    pub text: String,
}
