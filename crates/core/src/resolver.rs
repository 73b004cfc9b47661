//! Data file resolution inside a working directory.
//!
//! A keyword selects the first file whose name contains it. Without a
//! keyword the resolver prefers well-known text extensions and numbered
//! job-output files (`job.o12345`), then falls back to sniffing the
//! leading bytes of every other file.

use regex::Regex;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Extensions accepted as text without sniffing (compared lowercase).
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "log", "dat", "json", "xml"];

/// Bytes inspected when sniffing a file.
const SNIFF_LEN: u64 = 100;

/// Share of printable bytes needed to call a sample text.
const TEXT_RATIO: f64 = 0.7;

/// Scheduler job-output suffix, e.g. `run.o2343908`.
static JOB_OUTPUT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.o\d+$").unwrap());

/// Resolves data files for text entries.
#[derive(Debug, Clone)]
pub struct FileResolver {
    work_dir: PathBuf,
}

impl FileResolver {
    /// Create a resolver over a working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// The directory being searched.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Pick a file name for `keyword` (trimmed; empty means "any text file").
    pub fn resolve(&self, keyword: &str) -> Result<String> {
        let keyword = keyword.trim();
        let found = if keyword.is_empty() {
            self.first_text_file()?
        } else {
            self.find_by_keyword(keyword)?
        };

        match found {
            Some(name) => {
                log::debug!("Resolved keyword '{}' to {}", keyword, name);
                Ok(name)
            }
            None if keyword.is_empty() => Err(Error::FileNotFound(format!(
                "No text file found in {}",
                self.work_dir.display()
            ))),
            None => Err(Error::FileNotFound(format!(
                "No file containing keyword '{}' found",
                keyword
            ))),
        }
    }

    /// Resolve and return the full path.
    pub fn resolve_path(&self, keyword: &str) -> Result<PathBuf> {
        self.resolve(keyword).map(|name| self.work_dir.join(name))
    }

    /// First regular file (in directory order) whose name contains `keyword`.
    fn find_by_keyword(&self, keyword: &str) -> Result<Option<String>> {
        for entry in fs::read_dir(&self.work_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.contains(keyword) && entry.path().is_file() {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// Lexicographically first text candidate.
    fn first_text_file(&self) -> Result<Option<String>> {
        let names: Vec<String> = fs::read_dir(&self.work_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();

        let mut candidates: Vec<String> = names
            .iter()
            .filter(|name| has_text_name(name))
            .cloned()
            .collect();

        if candidates.is_empty() {
            candidates = names
                .iter()
                .filter(|name| !is_job_output(name))
                .filter(|name| {
                    let path = self.work_dir.join(name);
                    path.is_file() && sniff_is_text(&path)
                })
                .cloned()
                .collect();
        }

        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

/// Whether the name has a known text extension or a job-output suffix.
pub fn has_text_name(name: &str) -> bool {
    let known_extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
    known_extension || is_job_output(name)
}

/// Whether the name ends in `.o<digits>`.
pub fn is_job_output(name: &str) -> bool {
    JOB_OUTPUT_REGEX.is_match(name)
}

/// Classify a byte sample as text when more than 70% of it is printable
/// (byte >= 32) or tab/newline/carriage return.
pub fn looks_like_text(sample: &[u8]) -> bool {
    let text_bytes = sample
        .iter()
        .filter(|&&b| b >= 32 || matches!(b, 9 | 10 | 13))
        .count();
    text_bytes as f64 / sample.len().max(1) as f64 > TEXT_RATIO
}

fn sniff_is_text(path: &Path) -> bool {
    let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
    match File::open(path).and_then(|f| f.take(SNIFF_LEN).read_to_end(&mut sample)) {
        Ok(_) => looks_like_text(&sample),
        Err(e) => {
            log::debug!("Skipping unreadable {}: {}", path.display(), e);
            false
        }
    }
}
