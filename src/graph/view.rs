//! Node/edge projection of the repository graph for visualization.
//!
//! One file node per scanned file, one symbol node per function/variable/
//! array symbol, BELONGS_TO edges from symbols to their files, and
//! REFERENCES edges between same-named symbols in different files of the
//! same language (name-based heuristic; cross-language matches are
//! coincidental and filtered out).
//!
//! Error matching is by file *basename*: diagnostics may carry absolute
//! editor paths while graph nodes carry repo-relative ones. Same-basename
//! collisions across directories are a documented limitation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{Language, SymbolKind};
use crate::graph::Snapshot;
use crate::rules::Diagnostic;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// `"file"` or the symbol kind (`"function"`, `"variable"`, `"array"`).
    pub kind: String,
    pub file: String,
    pub line: usize,
    pub has_errors: bool,
    /// Declared type, for symbol tooltips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Symbols in the file, for file-node tooltips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_count: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "BELONGS_TO")]
    BelongsTo,
    #[serde(rename = "REFERENCES")]
    References,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Kinds that get their own node in the view.
fn is_viewable(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::Function | SymbolKind::Variable | SymbolKind::Array
    )
}

/// Project the snapshot plus the latest diagnostics into nodes and edges.
pub fn build_graph(snapshot: &Snapshot, diagnostics: &[Diagnostic]) -> GraphData {
    let mut graph = GraphData::default();

    // Diagnostics keyed by basename; a file-level set for O(1) file flags
    // and (basename, line) pairs for symbol flags.
    let mut errored_files: HashMap<String, bool> = HashMap::new();
    let mut errored_lines: Vec<(String, usize)> = Vec::new();
    for d in diagnostics {
        let base = basename(&d.file);
        errored_files.insert(base.clone(), true);
        errored_lines.push((base, d.line));
    }

    // Pass 1: file nodes and symbol nodes with BELONGS_TO edges.
    let mut name_map: HashMap<(Language, String), Vec<String>> = HashMap::new();
    for (path, entry) in snapshot.files() {
        let file_base = basename(path);
        let file_id = format!("file:{}", path);
        graph.nodes.push(GraphNode {
            id: file_id.clone(),
            label: file_base.clone(),
            kind: "file".to_string(),
            file: path.clone(),
            line: 0,
            has_errors: errored_files.contains_key(&file_base),
            data_type: None,
            symbol_count: Some(entry.symbols.len()),
        });

        for sym in &entry.symbols {
            if !is_viewable(sym.kind) {
                continue;
            }
            let sym_id = format!("{}:{}:{}", path, sym.line, sym.name);
            let has_errors = errored_lines
                .iter()
                .any(|(base, line)| *base == file_base && *line == sym.line);
            graph.nodes.push(GraphNode {
                id: sym_id.clone(),
                label: sym.name.clone(),
                kind: sym.kind.to_string(),
                file: path.clone(),
                line: sym.line,
                has_errors,
                data_type: sym.declared_type.clone(),
                symbol_count: None,
            });
            graph.edges.push(GraphEdge {
                source: sym_id.clone(),
                target: file_id.clone(),
                kind: EdgeKind::BelongsTo,
            });
            name_map
                .entry((entry.language, sym.name.clone()))
                .or_default()
                .push(sym_id);
        }
    }

    // Pass 2: REFERENCES edges between distinct same-language occurrences of
    // a name; one edge per unordered pair.
    for ids in name_map.values() {
        if ids.len() < 2 {
            continue;
        }
        for (i, src) in ids.iter().enumerate() {
            for tgt in &ids[i + 1..] {
                graph.edges.push(GraphEdge {
                    source: src.clone(),
                    target: tgt.clone(),
                    kind: EdgeKind::References,
                });
            }
        }
    }

    graph
}
