//! Error types for slide population.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, extracting, storing layouts
/// or assembling the output document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// The persisted layout-mode file could not be parsed.
    #[error("Invalid layout configuration: {0}")]
    ConfigError(String),

    /// No data file in the working directory matched.
    #[error("{0}")]
    FileNotFound(String),

    /// None of the candidate encodings could decode the file.
    ///
    /// [`LineExtractor`](crate::LineExtractor) never returns this: its
    /// lossy UTF-8 fallback decodes any input.
    #[error("Could not decode {}", .0.display())]
    DecodeError(PathBuf),

    /// The requested line does not exist in the file.
    #[error("Line {0} does not exist")]
    LineNotFound(usize),

    /// A column list entry is not an integer.
    #[error("Failed to parse column numbers '{0}'")]
    ColumnParseError(String),

    /// The reserved layout mode cannot be deleted or overwritten.
    #[error("'{0}' is a reserved layout mode")]
    ReservedMode(String),

    /// A layout mode must carry at least one image or text layout.
    #[error("Layout mode has no image or text layouts")]
    EmptyMode,

    /// No layout mode with this name.
    #[error("Layout mode '{0}' not found")]
    ModeNotFound(String),

    /// A layout entry violates a coordinate or numbering constraint.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// The template presentation does not exist.
    #[error("Template file does not exist: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The working directory does not exist.
    #[error("Working directory does not exist: {}", .0.display())]
    WorkDirNotFound(PathBuf),

    /// The requested slide is outside the presentation.
    #[error("Slide index {index} out of range ({count} slides)")]
    SlideIndexOutOfRange { index: usize, count: usize },

    /// An image could not be probed or embedded.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Failed to interpret the PPTX package structure.
    #[error("PPTX error: {0}")]
    PptxError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}
