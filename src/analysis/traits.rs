//! Core traits for language analysis.

use std::path::Path;

use crate::analysis::{FileFacts, Language};

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from `FileFacts` so the tree can be reused for multiple
/// passes without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path, repo-relative where possible.
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// 1-indexed line of a node's start position.
    pub fn line_of(&self, node: tree_sitter::Node) -> usize {
        node.start_position().row + 1
    }
}

/// Language-specific analyzer: parse a buffer into a tree and extract the
/// declaration and reference facts the rule engine consumes.
///
/// Adapters never encode rules; they expose a uniform fact model. A
/// half-written buffer still yields a best-effort tree (tree-sitter error
/// recovery), and extraction works off whatever subtrees were recognized.
///
/// Note: `tree_sitter::Parser` is not Sync, so implementations create a
/// parser per call rather than caching one.
pub trait LanguageAnalyzer: Send + Sync {
    /// The language this analyzer handles.
    fn language(&self) -> Language;

    /// File extensions handled, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source into a tree. Fails only when the grammar itself cannot
    /// be loaded; partial parse errors still produce a valid tree with
    /// ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Extract all symbols and references from a parsed file.
    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts>;
}
