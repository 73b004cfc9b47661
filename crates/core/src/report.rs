//! Outcome of a generate or fill batch.

use std::path::PathBuf;

/// Errors listed in a status message before the rest are summarized.
const SHOWN_ERRORS: usize = 3;

/// What kind of entry a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Image,
    Text,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "Image"),
            Self::Text => write!(f, "Text"),
        }
    }
}

/// A single entry that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryError {
    pub kind: EntryKind,
    /// 0-based entry position.
    pub index: usize,
    pub message: String,
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.index + 1, self.message)
    }
}

/// Counts and per-entry failures of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub images_total: usize,
    pub images_inserted: usize,
    pub texts_total: usize,
    pub texts_inserted: usize,
    pub errors: Vec<EntryError>,
    /// Where the document was written, if it was.
    pub output: Option<PathBuf>,
    /// Which template and slide the batch was based on.
    pub source: Option<String>,
}

impl BatchReport {
    pub fn new(images_total: usize, texts_total: usize) -> Self {
        Self {
            images_total,
            texts_total,
            ..Self::default()
        }
    }

    /// Record a failed entry.
    pub fn fail(&mut self, kind: EntryKind, index: usize, message: impl Into<String>) {
        let error = EntryError {
            kind,
            index,
            message: message.into(),
        };
        log::debug!("{}", error);
        self.errors.push(error);
    }

    pub fn inserted(&self) -> usize {
        self.images_inserted + self.texts_inserted
    }

    /// Short human-readable summary of the batch.
    pub fn status_message(&self) -> String {
        let mut message = if self.inserted() == 0 {
            "Warning: nothing was inserted".to_string()
        } else {
            let mut lines = Vec::new();
            if let Some(source) = &self.source {
                lines.push(format!("Based on {}", source));
            }
            let mut counts = format!(
                "Inserted {}/{} images",
                self.images_inserted, self.images_total
            );
            if self.texts_inserted > 0 || self.texts_total > 0 {
                counts.push_str(&format!(
                    ", {}/{} texts",
                    self.texts_inserted, self.texts_total
                ));
            }
            lines.push(counts);
            if let Some(output) = &self.output {
                lines.push(format!("Saved to: {}", output.display()));
            }
            lines.join("\n")
        };

        if !self.errors.is_empty() {
            let shown: Vec<String> = self
                .errors
                .iter()
                .take(SHOWN_ERRORS)
                .map(ToString::to_string)
                .collect();
            message.push_str(&format!(
                "\n{} errors: {}",
                self.errors.len(),
                shown.join("; ")
            ));
            if self.errors.len() > SHOWN_ERRORS {
                message.push_str(&format!(
                    "... and {} more",
                    self.errors.len() - SHOWN_ERRORS
                ));
            }
        }

        message
    }
}
