//! Transpile Pipeline - Single Entry Point
//!
//! CRITICAL: transpile MUST validate first. A rejected document produces
//! no output at all.

use bstr::BString;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::block::{render_block, BlockStats};
use crate::config::{ConfigError, TranspileConfig};
use crate::directives::render_directives;
use crate::document::Document;
use crate::hashing::{fingerprint_document, sha256_hex};
use crate::markup::render_markup;
use crate::validation::{Rejection, TagCensus, ValidationResult, Validator};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Config(_) => None,
        }
    }
}

/// The generated program plus what each pass contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProgram {
    pub source: BString,
    pub census: TagCensus,
    pub directives: usize,
    pub prologue_lines: usize,
    pub epilogue_lines: usize,
    pub block: BlockStats,
    pub source_hash: String,
    pub program_hash: String,
}

/// The transpile pipeline - single entry point for all documents
pub struct TranspilePipeline {
    config: TranspileConfig,
    validator: Validator,
}

impl TranspilePipeline {
    pub fn new(config: TranspileConfig) -> Result<Self, PipelineError> {
        config.check_engine_version()?;
        Ok(Self {
            config,
            validator: Validator::new(),
        })
    }

    pub fn config(&self) -> &TranspileConfig {
        &self.config
    }

    /// Validate a document without generating anything.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_document(&self, document: &Document) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(document, &self.config)
    }

    /// Transpile a document.
    ///
    /// Passes run in a fixed order, each over its own scan of the document:
    /// directives, markup routines, then the entry point.
    pub fn transpile(&self, document: &Document) -> Result<GeneratedProgram, PipelineError> {
        // MANDATORY: nothing is generated for a rejected document.
        let census = match self.validate_document(document).into_result() {
            Ok(census) => census,
            Err(rejection) => {
                warn!(violations = rejection.violations.len(), "document rejected: {}", rejection);
                return Err(rejection.into());
            }
        };

        let mut source = BString::default();

        let directives = render_directives(document, &self.config, &mut source);
        debug!(directives, "hoisted directives");

        let (prologue_lines, epilogue_lines) = render_markup(document, &self.config, &mut source);
        debug!(prologue_lines, epilogue_lines, "rendered markup routines");

        let block = render_block(document, &self.config, &mut source);
        debug!(
            statements = block.statements,
            baseline = block.baseline.width(),
            "rewrote statement block"
        );
        if block.entry_points != 1 || block.exits != 1 {
            warn!(
                entry_points = block.entry_points,
                exits = block.exits,
                "entry point markers matched an unexpected number of lines"
            );
        }

        let program_hash = sha256_hex(&source);
        info!(lines = document.len(), %program_hash, "transpiled document");

        Ok(GeneratedProgram {
            source_hash: fingerprint_document(document),
            program_hash,
            source,
            census,
            directives,
            prologue_lines,
            epilogue_lines,
            block,
        })
    }
}

impl Default for TranspilePipeline {
    fn default() -> Self {
        Self {
            config: TranspileConfig::default(),
            validator: Validator::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RejectionReason;

    #[test]
    fn test_rejection_stops_pipeline() {
        let err = TranspilePipeline::default()
            .transpile(&Document::parse("<p>no tags</p>"))
            .unwrap_err();
        assert_eq!(err.rejection().and_then(Rejection::reason), Some(RejectionReason::NoTags));
        assert!(err.to_string().starts_with("Validation failed"));
    }

    #[test]
    fn test_counts_reported() {
        let doc = Document::parse("#include <stdio.h>\nA\nB\n<£lhp\nint main(){\nreturn 0;\n}\n£>\nC\n");
        let program = TranspilePipeline::default().transpile(&doc).unwrap();
        assert_eq!(program.directives, 1);
        assert_eq!(program.prologue_lines, 2);
        assert_eq!(program.epilogue_lines, 1);
        assert_eq!(program.block.entry_points, 1);
        assert_eq!(program.census.total(), 2);
    }

    #[test]
    fn test_engine_gate_on_construction() {
        let config = TranspileConfig {
            engine_min_version: "42.0.0".to_string(),
            ..TranspileConfig::default()
        };
        assert!(matches!(
            TranspilePipeline::new(config),
            Err(PipelineError::Config(ConfigError::EngineVersionMismatch { .. }))
        ));
    }
}
