//! Statement Block Rewriting
//!
//! The tagged block becomes the program's entry point. Its body is wrapped
//! in the serving loop, with the prologue routine called at the top of
//! each iteration and the epilogue routine called before the exit
//! statement.
//!
//! Markers are found by substring. Any block line containing the exit
//! marker triggers the epilogue injection, so a comment or string literal
//! holding the marker text injects a second call. That is the expected
//! output for such templates.

use bstr::{BStr, BString, ByteSlice, ByteVec};

use crate::config::TranspileConfig;
use crate::document::Document;
use crate::region::{LineKind, RegionScanner};

const STATEMENT_INDENT: &str = "\t\t";
const LOOP_INDENT: &str = "\t";

/// Leading indentation of the entry-point line, in bytes. Spaces and tabs
/// count as one column each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndentBaseline(usize);

impl IndentBaseline {
    pub fn measure(line: &[u8]) -> Self {
        Self(line.iter().take_while(|&&b| b == b' ' || b == b'\t').count())
    }

    pub fn width(self) -> usize {
        self.0
    }

    /// Drop the first `width` bytes, whatever they are. Lines shorter than
    /// the baseline are returned unchanged.
    pub fn trim(self, line: &[u8]) -> &BStr {
        match line.get(self.0..) {
            Some(rest) => rest.as_bstr(),
            None => line.as_bstr(),
        }
    }
}

/// Rewrite leading spaces as tabs, one for one.
pub fn tabs_for_spaces(line: &[u8]) -> BString {
    let indent = IndentBaseline::measure(line).width();
    let (lead, rest) = line.split_at(indent);
    let mut rewritten = lead.replace(" ", "\t");
    rewritten.push_str(rest);
    rewritten.into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    pub statements: usize,
    pub entry_points: usize,
    pub exits: usize,
    pub baseline: IndentBaseline,
}

/// Append the rewritten entry point.
pub fn render_block(document: &Document, config: &TranspileConfig, out: &mut BString) -> BlockStats {
    let markers = &config.markers;
    let mut stats = BlockStats::default();

    for line in RegionScanner::new(document, config) {
        if line.kind != LineKind::StatementBlock {
            continue;
        }
        let text = line.text;
        let is_entry = text.contains_str(&markers.entry_point);
        let is_exit = text.contains_str(&markers.exit_statement);

        if is_entry {
            let entry_line = if config.normalize_entry_indent {
                tabs_for_spaces(text)
            } else {
                BString::from(text.as_bytes())
            };
            stats.baseline = IndentBaseline::measure(&entry_line);
            stats.entry_points += 1;

            out.push_str(stats.baseline.trim(&entry_line));
            out.push_byte(b'\n');
            out.push_str(format!("{}{}\n", LOOP_INDENT, config.serving_loop));
            out.push_str(format!("{}{}();\n", STATEMENT_INDENT, config.prologue.name));
        }

        if is_exit {
            stats.exits += 1;
            out.push_str(format!("{}{}();\n", STATEMENT_INDENT, config.epilogue.name));
            out.push_str(format!("{}}}\n", LOOP_INDENT));
            out.push_str(stats.baseline.trim(text));
            out.push_byte(b'\n');
        }

        if is_entry || is_exit {
            continue;
        }

        let statement = stats.baseline.trim(text);
        if statement == "}" {
            out.push_str("}\n");
        } else {
            out.push_str(STATEMENT_INDENT);
            out.push_str(statement);
            out.push_byte(b'\n');
        }
        stats.statements += 1;
    }

    stats
}
