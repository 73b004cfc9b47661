//! Line and column extraction from data files of unknown encoding.

use encoding_rs::{GBK, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::number::format_number;
use crate::types::ExtractedValue;

/// Separator between formatted column values.
pub const COLUMN_SEPARATOR: &str = "/";

/// A text encoding tried when reading a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Gbk,
    /// Decoded with the GBK tables, which are a superset of GB2312.
    Gb2312,
    /// BOM-directed; little-endian when no BOM is present.
    Utf16,
    Latin1,
}

/// Encodings in the order they are attempted.
pub const ENCODING_CHAIN: [TextEncoding; 5] = [
    TextEncoding::Utf8,
    TextEncoding::Gbk,
    TextEncoding::Gb2312,
    TextEncoding::Utf16,
    TextEncoding::Latin1,
];

impl TextEncoding {
    /// Strictly decode `bytes`, returning `None` on any malformed sequence.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Self::Gbk | Self::Gb2312 => GBK
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Self::Utf16 => {
                let (encoding, body) = match bytes {
                    [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                    [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                    _ => (UTF_16LE, bytes),
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
            Self::Gb2312 => "gb2312",
            Self::Utf16 => "utf-16",
            Self::Latin1 => "latin-1",
        }
    }
}

/// Split text into lines on `\n`, `\r\n` or a lone `\r`.
///
/// A trailing terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Parse a comma-separated list of 1-based column numbers.
///
/// Zero and negative numbers parse fine; they never select a column.
pub fn parse_columns(spec: &str) -> Result<Vec<i64>> {
    spec.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| Error::ColumnParseError(spec.to_string()))
        })
        .collect()
}

/// Pick whitespace-delimited tokens of `line` by 1-based column number.
///
/// Columns past the end of the line are skipped.
pub fn select_columns<'a>(line: &'a str, columns: &[i64]) -> Vec<&'a str> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    columns
        .iter()
        .filter_map(|&col| {
            let index = usize::try_from(col.checked_sub(1)?).ok()?;
            tokens.get(index).copied()
        })
        .collect()
}

/// Format selected columns joined by `/`, or the whole line when no
/// requested column exists.
pub fn format_columns(line: &str, columns: &[i64]) -> String {
    let values = select_columns(line, columns);
    if values.is_empty() {
        format_number(line)
    } else {
        values
            .into_iter()
            .map(format_number)
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR)
    }
}

/// Reads one line of a data file and formats columns from it.
#[derive(Debug, Clone)]
pub struct LineExtractor {
    encodings: Vec<TextEncoding>,
}

impl Default for LineExtractor {
    fn default() -> Self {
        Self {
            encodings: ENCODING_CHAIN.to_vec(),
        }
    }
}

impl LineExtractor {
    /// Create an extractor using the standard encoding chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the encoding chain.
    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Return the trimmed content of 1-based `line_number`.
    ///
    /// Each encoding is tried in order. An encoding that decodes but yields
    /// too few lines hands over to the next one. When every encoding has
    /// been tried, the bytes are decoded as UTF-8 with malformed sequences
    /// dropped and the lookup is retried once.
    pub fn read_line(&self, path: &Path, line_number: usize) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::FileNotFound(format!("File not found: {}", path.display()))
            }
            _ => Error::IoError(e),
        })?;
        let index = line_number.checked_sub(1).ok_or(Error::LineNotFound(line_number))?;

        // TODO: confirm whether a short file should fail immediately instead
        // of moving on to the next encoding; kept as the fallback for now.
        let decoded = self.encodings.iter().find_map(|&encoding| {
            let text = encoding.decode(&bytes)?;
            let line = split_lines(&text).get(index).map(|l| l.trim().to_string());
            if line.is_none() {
                log::debug!(
                    "{} decoded as {} but has no line {}",
                    path.display(),
                    encoding.name(),
                    line_number
                );
            }
            line.map(|l| (encoding, l))
        });

        if let Some((encoding, line)) = decoded {
            log::debug!("Read line {} of {} as {}", line_number, path.display(), encoding.name());
            return Ok(line);
        }

        log::debug!("Falling back to lossy UTF-8 for {}", path.display());
        let lossy = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
        lossy
            .split('\n')
            .nth(index)
            .map(|l| l.trim().to_string())
            .ok_or(Error::LineNotFound(line_number))
    }

    /// Extract and format `column_spec` from line `line_number` of `path`.
    pub fn extract(&self, path: &Path, line_number: usize, column_spec: &str) -> Result<ExtractedValue> {
        let line = self.read_line(path, line_number)?;
        let columns = parse_columns(column_spec)?;
        let text = format_columns(&line, &columns);
        Ok(ExtractedValue {
            source: path.to_path_buf(),
            line,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(parse_columns("1,3").unwrap(), vec![1, 3]);
        assert_eq!(parse_columns(" 2 , +4 ").unwrap(), vec![2, 4]);
        assert!(matches!(parse_columns("1,x"), Err(Error::ColumnParseError(_))));
        assert!(matches!(parse_columns(""), Err(Error::ColumnParseError(_))));
    }

    #[test]
    fn test_select_columns_skips_missing() {
        assert_eq!(select_columns("10 20 30", &[1, 3]), vec!["10", "30"]);
        assert_eq!(select_columns("10\t20   30", &[3, 5, 0, -1]), vec!["30"]);
        assert!(select_columns("10 20 30", &[5]).is_empty());
    }

    #[test]
    fn test_format_columns() {
        assert_eq!(format_columns("10 20 30", &[1, 3]), "10/30");
        assert_eq!(format_columns("1.234 12345", &[2, 1]), "1.23E+04/1.23");
        // Missing column falls back to the whole line.
        assert_eq!(format_columns("10 20 30", &[5]), "10 20 30");
        assert_eq!(format_columns("42.0", &[9]), "42");
    }

    #[test]
    fn test_extract_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.txt", b"header\n  10 20 30  \nfooter\n");
        let value = LineExtractor::new().extract(&path, 2, "1,3").unwrap();
        assert_eq!(value.line, "10 20 30");
        assert_eq!(value.text, "10/30");
    }

    #[test]
    fn test_extract_missing_column_uses_whole_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.txt", b"a\n10 20 30\nc\n");
        let value = LineExtractor::new().extract(&path, 2, "5").unwrap();
        assert_eq!(value.text, "10 20 30");
    }

    #[test]
    fn test_extract_gbk() {
        let dir = TempDir::new().unwrap();
        let (encoded, _, _) = GBK.encode("温度 25.678\n");
        let path = write(&dir, "gbk.log", &encoded);
        let value = LineExtractor::new().extract(&path, 1, "1,2").unwrap();
        assert_eq!(value.text, "温度/25.7");
    }

    #[test]
    fn test_extract_utf16_with_bom() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "x 1\ny 0.5\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let path = write(&dir, "wide.txt", &bytes);
        let extractor = LineExtractor::new().with_encodings(vec![TextEncoding::Utf16]);
        assert_eq!(extractor.extract(&path, 2, "2").unwrap().text, "0.5");
    }

    #[test]
    fn test_latin1_decodes_anything() {
        assert_eq!(TextEncoding::Latin1.decode(&[0x41, 0xE9]).unwrap(), "Aé");
        assert!(TextEncoding::Utf8.decode(&[0x41, 0xE9]).is_none());
    }

    #[test]
    fn test_line_not_found() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "short.txt", b"one\ntwo");
        let result = LineExtractor::new().read_line(&path, 5);
        assert!(matches!(result, Err(Error::LineNotFound(5))));
        assert!(matches!(
            LineExtractor::new().read_line(&path, 0),
            Err(Error::LineNotFound(0))
        ));
    }

    #[test]
    fn test_lossy_fallback_sees_trailing_empty_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "two.txt", b"one\ntwo\n");
        // Two lines under every encoding; the lossy split yields a third, empty one.
        assert_eq!(LineExtractor::new().read_line(&path, 3).unwrap(), "");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = LineExtractor::new().read_line(&dir.path().join("nope.txt"), 1);
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_bad_column_spec_after_line_found() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.txt", b"1 2 3\n");
        let result = LineExtractor::new().extract(&path, 1, "a");
        assert!(matches!(result, Err(Error::ColumnParseError(_))));
    }
}
