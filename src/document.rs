//! Document Reader
//!
//! A template is held as owned byte lines with their terminators removed.
//! Bytes pass through untouched, whatever the file's encoding; only the
//! tags and markers need to match. Every pass re-iterates the same lines
//! from the start.

use std::fs;
use std::path::Path;

use bstr::{BStr, BString, ByteSlice};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Error opening {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable, re-iterable template document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<BString>,
}

impl Document {
    /// Split source bytes into lines. `\n` and `\r\n` are both accepted.
    pub fn parse(source: impl AsRef<[u8]>) -> Self {
        Self {
            lines: source.as_ref().lines().map(BString::from).collect(),
        }
    }

    /// Read a template from disk.
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(bytes))
    }

    /// Iterate lines from the start of the document.
    pub fn lines(&self) -> impl Iterator<Item = &BStr> + '_ {
        self.lines.iter().map(|line| line.as_bstr())
    }

    pub(crate) fn as_lines(&self) -> &[BString] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&str> for Document {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_strips_terminators() {
        let doc = Document::parse("a\r\nb\nc");
        let lines: Vec<_> = doc.lines().collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lines_restartable() {
        let doc = Document::parse("one\ntwo\n");
        let first: Vec<_> = doc.lines().collect();
        let second: Vec<_> = doc.lines().collect();
        assert_eq!(first, second);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>\n<£lhp\n£>\n").unwrap();
        let doc = Document::read(file.path()).unwrap();
        assert!(doc.lines().nth(1).unwrap() == "<£lhp");
    }

    #[test]
    fn test_read_keeps_non_utf8_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<p>caf\xe9</p>\n\xa3>\n").unwrap();
        let doc = Document::read(file.path()).unwrap();
        let lines: Vec<_> = doc.lines().map(|line| line.as_bytes()).collect();
        assert_eq!(lines, vec![&b"<p>caf\xe9</p>"[..], &b"\xa3>"[..]]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::read(&dir.path().join("missing.lhp")).unwrap_err();
        assert!(err.to_string().starts_with("Error opening"));
    }
}
