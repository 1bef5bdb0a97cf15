//! Region Tracking - Tag Events and Line Classification
//!
//! A document has exactly one tagged statement block. The region state
//! machine only knows one legal path: `Prologue -> Block -> Epilogue`.
//! Any other tag transition lands in `Overrun`, which only occurs in
//! documents the validator rejects.

use bstr::{BStr, BString, ByteSlice};

use crate::config::{DirectiveConfig, TagConfig, TranspileConfig};
use crate::document::Document;

/// A region tag found on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEvent {
    Open,
    Close,
}

impl TagEvent {
    /// Detect a tag by byte substring. When a line holds both tags, only
    /// the opening tag counts.
    pub fn detect(line: &[u8], tags: &TagConfig) -> Option<Self> {
        if line.contains_str(&tags.open) {
            Some(Self::Open)
        } else if line.contains_str(&tags.close) {
            Some(Self::Close)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionState {
    /// Before the opening tag.
    #[default]
    Prologue,
    /// Between the opening and closing tags.
    Block,
    /// After the closing tag.
    Epilogue,
    /// A tag arrived out of order or after the pair was complete.
    Overrun,
}

impl RegionState {
    pub fn advance(self, event: TagEvent) -> Self {
        match (self, event) {
            (Self::Prologue, TagEvent::Open) => Self::Block,
            (Self::Block, TagEvent::Close) => Self::Epilogue,
            _ => Self::Overrun,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Directive,
    PrologueMarkup,
    StatementBlock,
    EpilogueMarkup,
    Boundary(TagEvent),
    Overrun,
}

/// Whether a line is a hoistable toolchain directive. Only the strict
/// line-leading form counts: the marker must be the first non-whitespace
/// character.
pub fn is_directive(line: &[u8], directive: &DirectiveConfig) -> bool {
    let mut marker = [0u8; 4];
    let marker = directive.marker.encode_utf8(&mut marker);
    trim_layout_whitespace(line).starts_with_str(marker) && line.contains_str(&directive.keyword)
}

/// Strip leading layout whitespace, byte by byte.
pub(crate) fn trim_layout_whitespace(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|&b| !is_layout_whitespace(b))
        .unwrap_or(line.len());
    &line[start..]
}

fn is_layout_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// 1-based line number in the source document.
    pub number: usize,
    pub kind: LineKind,
    /// Region state after this line has been processed.
    pub state: RegionState,
    pub text: &'a BStr,
}

/// One independent pass over a document. Each component creates its own
/// scanner, so no state carries over between passes.
pub struct RegionScanner<'a> {
    lines: std::iter::Enumerate<std::slice::Iter<'a, BString>>,
    tags: &'a TagConfig,
    directive: &'a DirectiveConfig,
    state: RegionState,
}

impl<'a> RegionScanner<'a> {
    pub fn new(document: &'a Document, config: &'a TranspileConfig) -> Self {
        Self {
            lines: document.as_lines().iter().enumerate(),
            tags: &config.tags,
            directive: &config.directive,
            state: RegionState::Prologue,
        }
    }

    pub fn state(&self) -> RegionState {
        self.state
    }
}

impl<'a> Iterator for RegionScanner<'a> {
    type Item = ClassifiedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, text) = self.lines.next()?;
        let text = text.as_bstr();

        let kind = if let Some(event) = TagEvent::detect(text, self.tags) {
            self.state = self.state.advance(event);
            LineKind::Boundary(event)
        } else if is_directive(text, self.directive) {
            LineKind::Directive
        } else {
            match self.state {
                RegionState::Prologue => LineKind::PrologueMarkup,
                RegionState::Block => LineKind::StatementBlock,
                RegionState::Epilogue => LineKind::EpilogueMarkup,
                RegionState::Overrun => LineKind::Overrun,
            }
        };

        Some(ClassifiedLine {
            number: index + 1,
            kind,
            state: self.state,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LineKind> {
        let doc = Document::parse(source);
        let config = TranspileConfig::default();
        RegionScanner::new(&doc, &config).map(|l| l.kind).collect()
    }

    #[test]
    fn test_single_pair_transitions() {
        let state = RegionState::Prologue.advance(TagEvent::Open);
        assert_eq!(state, RegionState::Block);
        assert_eq!(state.advance(TagEvent::Close), RegionState::Epilogue);
    }

    #[test]
    fn test_illegal_transitions_overrun() {
        assert_eq!(RegionState::Prologue.advance(TagEvent::Close), RegionState::Overrun);
        assert_eq!(RegionState::Block.advance(TagEvent::Open), RegionState::Overrun);
        assert_eq!(RegionState::Epilogue.advance(TagEvent::Open), RegionState::Overrun);
        assert_eq!(RegionState::Overrun.advance(TagEvent::Close), RegionState::Overrun);
    }

    #[test]
    fn test_open_wins_on_shared_line() {
        let tags = TagConfig::default();
        assert_eq!(TagEvent::detect("<£lhp x £>".as_bytes(), &tags), Some(TagEvent::Open));
        assert_eq!(TagEvent::detect("  £>".as_bytes(), &tags), Some(TagEvent::Close));
        assert_eq!(TagEvent::detect("<p>£5</p>".as_bytes(), &tags), None);
        // A lone Latin-1 pound sign is not the UTF-8 tag.
        assert_eq!(TagEvent::detect(b"\xa3>", &tags), None);
    }

    #[test]
    fn test_classification() {
        let kinds = kinds("<h1>\n#include <stdio.h>\n<£lhp\nint x;\n  #include <math.h>\n£>\n</h1>");
        assert_eq!(
            kinds,
            vec![
                LineKind::PrologueMarkup,
                LineKind::Directive,
                LineKind::Boundary(TagEvent::Open),
                LineKind::StatementBlock,
                LineKind::Directive,
                LineKind::Boundary(TagEvent::Close),
                LineKind::EpilogueMarkup,
            ]
        );
    }

    #[test]
    fn test_directive_must_lead_line() {
        let directive = DirectiveConfig::default();
        assert!(is_directive(b"\t #include <stdio.h>", &directive));
        assert!(!is_directive(b"x = 1; #include <stdio.h>", &directive));
        assert!(!is_directive(b"#define N 3", &directive));
        assert!(is_directive(b"#include <caf\xe9.h>", &directive));
    }

    #[test]
    fn test_scanner_line_numbers_and_state() {
        let doc = Document::parse("a\n<£lhp\nb");
        let config = TranspileConfig::default();
        let lines: Vec<_> = RegionScanner::new(&doc, &config).collect();
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].state, RegionState::Block);
        assert_eq!(lines[0].state, RegionState::Prologue);
    }
}
