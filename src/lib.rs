//! LHP Compiler - Template to FastCGI Program Transpiler
//!
//! A template interleaves markup with one tagged block of C statements.
//! The transpiler hoists `#include` directives, turns the markup into two
//! print routines, and wraps the block's entry point in a FastCGI request
//! loop that calls those routines.
//!
//! ```
//! use bstr::ByteSlice;
//! use lhp_compiler::transpile;
//!
//! let program = transpile("Hi\n<£lhp\nint main(){\nreturn 0;\n}\n£>\nBye\n").unwrap();
//! assert!(program.starts_with(b"#include \"fcgi_stdio.h\"\n"));
//! assert!(program.contains_str("while (FCGI_Accept() >= 0){"));
//! ```

use bstr::BString;

pub mod block;
pub mod config;
pub mod diagnostics;
pub mod directives;
pub mod document;
pub mod hashing;
pub mod markup;
pub mod naming;
pub mod pipeline;
pub mod region;
pub mod toolchain;
pub mod validation;

pub use config::{ConfigError, TranspileConfig};
pub use diagnostics::DiagnosticLog;
pub use document::{Document, DocumentError};
pub use pipeline::{GeneratedProgram, PipelineError, TranspilePipeline};
pub use region::{LineKind, RegionState, TagEvent};
pub use toolchain::{HostPlatform, ToolchainError};
pub use validation::{Rejection, RejectionReason, ValidationResult, ValidationViolation};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_CONFIG_ENGINE_VERSION: &str = "1.0.0";

/// Transpile template source with the default configuration. Markup and
/// statement bytes are carried into the program unchanged.
pub fn transpile(source: impl AsRef<[u8]>) -> Result<BString, PipelineError> {
    TranspilePipeline::default()
        .transpile(&Document::parse(source))
        .map(|program| program.source)
}
