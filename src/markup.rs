//! Markup Rendering
//!
//! Markup before the tagged block becomes the prologue routine, markup
//! after it becomes the epilogue routine. Each markup line is wrapped,
//! verbatim, in one print call.

use bstr::{BStr, BString, ByteVec};

use crate::config::{RoutineConfig, TranspileConfig};
use crate::document::Document;
use crate::region::{LineKind, RegionScanner};

/// Markup lines split around the tagged block, each side in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupPartition<'a> {
    pub prologue: Vec<&'a BStr>,
    pub epilogue: Vec<&'a BStr>,
}

impl<'a> MarkupPartition<'a> {
    /// Empty lines are dropped; they would only print nothing.
    pub fn scan(document: &'a Document, config: &'a TranspileConfig) -> Self {
        let mut partition = Self::default();

        for line in RegionScanner::new(document, config) {
            if line.text.is_empty() {
                continue;
            }
            match line.kind {
                LineKind::PrologueMarkup => partition.prologue.push(line.text),
                LineKind::EpilogueMarkup => partition.epilogue.push(line.text),
                _ => {}
            }
        }

        partition
    }
}

fn open_routine(routine: &RoutineConfig, out: &mut BString) {
    out.push_str(format!("\n// {}\nvoid {}()\n{{\n", routine.comment, routine.name));
}

/// Markup bytes are copied as they are, never re-encoded.
fn print_line(text: &[u8], out: &mut BString) {
    out.push_str("\tprintf(\"");
    out.push_str(text);
    out.push_str("\");\n");
}

/// Append the prologue and epilogue generator routines.
pub fn render_markup(document: &Document, config: &TranspileConfig, out: &mut BString) -> (usize, usize) {
    let partition = MarkupPartition::scan(document, config);

    open_routine(&config.prologue, out);
    print_line(format!("{}\\n\\n", config.content_type).as_bytes(), out);
    for text in &partition.prologue {
        print_line(text, out);
    }
    out.push_str("}\n");

    open_routine(&config.epilogue, out);
    for text in &partition.epilogue {
        print_line(text, out);
    }
    out.push_str("}\n");

    (partition.prologue.len(), partition.epilogue.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::ByteSlice;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_order() {
        let doc = Document::parse("<html>\n<body>\n<£lhp\nint x;\n£>\n</body>\n</html>\n");
        let config = TranspileConfig::default();
        let partition = MarkupPartition::scan(&doc, &config);
        assert_eq!(partition.prologue, vec!["<html>", "<body>"]);
        assert_eq!(partition.epilogue, vec!["</body>", "</html>"]);
    }

    #[test]
    fn test_empty_lines_skipped_whitespace_kept() {
        let doc = Document::parse("\n  \n<£lhp\n£>\n\n");
        let config = TranspileConfig::default();
        let partition = MarkupPartition::scan(&doc, &config);
        assert_eq!(partition.prologue, vec!["  "]);
        assert!(partition.epilogue.is_empty());
    }

    #[test]
    fn test_directives_not_printed() {
        let doc = Document::parse("#include <stdio.h>\n<p>\n<£lhp\n£>\n");
        let config = TranspileConfig::default();
        let partition = MarkupPartition::scan(&doc, &config);
        assert_eq!(partition.prologue, vec!["<p>"]);
    }

    #[test]
    fn test_non_utf8_markup_printed_verbatim() {
        let doc = Document::parse(&b"<p>caf\xe9</p>\n<\xc2\xa3lhp\n\xc2\xa3>\n"[..]);
        let mut out = BString::default();
        render_markup(&doc, &TranspileConfig::default(), &mut out);
        assert!(out.contains_str(&b"\tprintf(\"<p>caf\xe9</p>\");\n"[..]));
    }

    #[test]
    fn test_render_routines() {
        let doc = Document::parse("Hi\n<£lhp\n£>\nBye\n");
        let mut out = BString::default();
        let counts = render_markup(&doc, &TranspileConfig::default(), &mut out);
        assert_eq!(counts, (1, 1));
        assert_eq!(
            out,
            concat!(
                "\n// Header HTML Function.\n",
                "void header_html()\n",
                "{\n",
                "\tprintf(\"Content-type: text/html\\n\\n\");\n",
                "\tprintf(\"Hi\");\n",
                "}\n",
                "\n// Footer HTML Function.\n",
                "void footer_html()\n",
                "{\n",
                "\tprintf(\"Bye\");\n",
                "}\n",
            )
        );
    }
}
