//! Snipe - local real-time cross-file static analysis for C and Python.
//!
//! Snipe surfaces semantic defects that only show up across file
//! boundaries - type mismatches, static out-of-bounds indexing, signature
//! drift, undefined and shadowed symbols, format-string mismatches, invalid
//! struct member access, dead imports, and unsafe C library functions - in
//! editor buffers that may not yet be saved to disk.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter language adapters and fact extraction
//! - `graph`: the repository symbol graph and its node/edge projection
//! - `rules`: the closed rule family producing diagnostics
//! - `engine`: the operations the transport exposes (analyze, refresh,
//!   symbols, graph, save_diagnostics)
//! - `server`: loopback HTTP facade for the editor extension
//! - `report`: CLI output formatting
//!
//! A buffer analysis is a pure function of (buffer facts, repo snapshot,
//! rule set): the engine parses the unsaved buffer, overlays it (and any
//! other open buffers) onto an immutable snapshot of the repo graph, runs
//! every rule, and deduplicates the findings.

pub mod analysis;
pub mod cli;
pub mod engine;
pub mod graph;
pub mod persist;
pub mod report;
pub mod rules;
pub mod server;

pub use analysis::{FileFacts, Language, Reference, Symbol, SymbolKind};
pub use engine::{Engine, OpenBuffer};
pub use graph::{GraphData, RepoGraph, Snapshot};
pub use rules::{Diagnostic, DiagnosticCode, Severity};

/// Errors the transport layer maps to status codes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid repo_path: {0}")]
    InvalidRepoPath(String),

    #[error("Scan failed: {0}")]
    Scan(anyhow::Error),
}
