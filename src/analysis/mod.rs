//! Buffer and file analysis: language adapters and fact extraction.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │ Source text  │────▶│ LanguageAnalyzer  │────▶│ FileFacts        │
//! │ (file/buffer)│     │ (C, Python)       │     │ (symbols, refs)  │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//!                                                        │
//!                                                        ▼
//!                      ┌───────────────────┐     ┌──────────────────┐
//!                      │ Rule engine       │◀────│ RepoGraph        │
//!                      │ (rules::*)        │     │ (graph::store)   │
//!                      └───────────────────┘     └──────────────────┘
//! ```
//!
//! Adding a third language is a new module in `languages/`, a registry
//! entry, and a builtin allowlist for the undefined-symbol rule.

mod facts;
pub mod languages;
mod traits;

pub use facts::{
    FileFacts, Language, Param, RefKind, Reference, StructMember, Symbol, SymbolKind, ValueHint,
};
pub use languages::{analyzer_for_extension, analyzer_for_language, analyzer_for_path};
pub use traits::{LanguageAnalyzer, ParsedFile};

/// Parse an in-memory buffer and extract its facts.
///
/// Unsupported extensions yield `None`; a buffer that fails to parse
/// entirely yields empty facts rather than an error (silence over false
/// positives).
pub fn parse_buffer(content: &str, path: &str) -> Option<FileFacts> {
    let analyzer = analyzer_for_path(path)?;
    let parsed = match analyzer.parse(std::path::Path::new(path), content.as_bytes()) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(path, error = %e, "buffer parse failed");
            return Some(FileFacts::empty(path, analyzer.language()));
        }
    };
    match analyzer.extract_facts(&parsed) {
        Ok(facts) => Some(facts),
        Err(e) => {
            tracing::warn!(path, error = %e, "fact extraction failed");
            Some(FileFacts::empty(path, analyzer.language()))
        }
    }
}
