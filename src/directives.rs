//! Directive Extraction
//!
//! Toolchain directives are hoisted to the top of the generated program in
//! source order, wherever they appear in the template.

use bstr::{BStr, BString, ByteSlice, ByteVec};

use crate::config::TranspileConfig;
use crate::document::Document;
use crate::region::{trim_layout_whitespace, LineKind, RegionScanner};

/// Collect directive lines with leading whitespace stripped. Trailing text,
/// including whitespace, is kept as written.
pub fn extract_directives<'a>(document: &'a Document, config: &'a TranspileConfig) -> Vec<&'a BStr> {
    RegionScanner::new(document, config)
        .filter(|line| line.kind == LineKind::Directive)
        .map(|line| trim_layout_whitespace(line.text).as_bstr())
        .collect()
}

/// Append the runtime include followed by every hoisted directive.
pub fn render_directives(document: &Document, config: &TranspileConfig, out: &mut BString) -> usize {
    out.push_str(&config.runtime_include);
    out.push_byte(b'\n');

    let directives = extract_directives(document, config);
    for directive in &directives {
        out.push_str(directive);
        out.push_byte(b'\n');
    }
    directives.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_in_source_order() {
        let doc = Document::parse(
            "#include <stdio.h>\n<p>x</p>\n<£lhp\n    #include <string.h>\nint main(){\n£>\n\t#include <math.h>\n",
        );
        let config = TranspileConfig::default();
        assert_eq!(
            extract_directives(&doc, &config),
            vec!["#include <stdio.h>", "#include <string.h>", "#include <math.h>"]
        );
    }

    #[test]
    fn test_mid_line_marker_ignored() {
        let doc = Document::parse("<£lhp\nputs(\"#include\");\n£>\n");
        assert!(extract_directives(&doc, &TranspileConfig::default()).is_empty());
    }

    #[test]
    fn test_trailing_whitespace_kept() {
        let doc = Document::parse("  #include <stdlib.h>  \n");
        assert_eq!(
            extract_directives(&doc, &TranspileConfig::default()),
            vec!["#include <stdlib.h>  "]
        );
    }

    #[test]
    fn test_render_starts_with_runtime_include() {
        let doc = Document::parse("#include <stdio.h>\n");
        let mut out = BString::default();
        let count = render_directives(&doc, &TranspileConfig::default(), &mut out);
        assert_eq!(count, 1);
        assert_eq!(out, "#include \"fcgi_stdio.h\"\n#include <stdio.h>\n");
    }
}
