//! Analysis engine: the operations the transport layer exposes.
//!
//! Holds one `RepoGraph` per repository root, built lazily on first use and
//! replaced on explicit refresh. Analysis itself is a pure function of
//! (buffer facts, snapshot, rule set); the engine's job is assembling those
//! inputs, deduplicating, and persisting the result for the graph view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::analysis::{parse_buffer, FileFacts};
use crate::graph::{build_graph, GraphData, RepoGraph};
use crate::persist;
use crate::rules::{self, Diagnostic, RuleContext};
use crate::Error;

/// An unsaved buffer overlaid onto the repo view for one request.
#[derive(Debug, Clone)]
pub struct OpenBuffer {
    pub content: String,
    pub file_path: String,
}

pub struct Engine {
    graphs: RwLock<HashMap<PathBuf, Arc<RepoGraph>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
        }
    }

    /// The graph for a repo root, scanning it on first use.
    fn graph_for(&self, repo_path: &Path) -> Result<Arc<RepoGraph>, Error> {
        let canonical = repo_path
            .canonicalize()
            .map_err(|_| Error::InvalidRepoPath(repo_path.display().to_string()))?;
        if !canonical.is_dir() {
            return Err(Error::InvalidRepoPath(repo_path.display().to_string()));
        }

        {
            let graphs = self.graphs.read().unwrap_or_else(|e| e.into_inner());
            if let Some(graph) = graphs.get(&canonical) {
                return Ok(graph.clone());
            }
        }

        let graph = Arc::new(RepoGraph::scan(&canonical).map_err(Error::Scan)?);
        let mut graphs = self.graphs.write().unwrap_or_else(|e| e.into_inner());
        Ok(graphs.entry(canonical).or_insert(graph).clone())
    }

    /// Analyze an unsaved buffer against the repo graph.
    ///
    /// `open_buffers` are further unsaved documents overlaid onto the
    /// snapshot for this request only. The result is deduplicated and also
    /// persisted (best-effort) so the graph view can flag error nodes.
    /// Unsupported file types produce an empty list, not an error.
    pub fn analyze(
        &self,
        content: &str,
        file_path: &str,
        repo_path: &Path,
        open_buffers: &[OpenBuffer],
    ) -> Result<Vec<Diagnostic>, Error> {
        let graph = self.graph_for(repo_path)?;

        let Some(buffer) = parse_buffer(content, file_path) else {
            return Ok(Vec::new());
        };

        // overlay keys must match the snapshot's repo-relative buckets even
        // when the editor sends absolute paths
        let root = graph.root().to_path_buf();
        let mut all_overlays: Vec<FileFacts> = open_buffers
            .iter()
            .filter(|b| b.file_path != file_path)
            .filter_map(|b| {
                let mut facts = parse_buffer(&b.content, &b.file_path)?;
                facts.path = repo_relative(&root, &b.file_path);
                Some(facts)
            })
            .collect();
        // the buffer itself overlays its on-disk version so its own names
        // resolve against the newest content
        let mut own = buffer.clone();
        own.path = repo_relative(&root, file_path);
        all_overlays.push(own);

        let base = graph.snapshot();
        let snapshot = base.with_overlays(&all_overlays);

        let ctx = RuleContext::new(file_path, &buffer, &snapshot);
        let diagnostics = rules::run_all(&ctx);

        tracing::info!(
            file = file_path,
            references = buffer.references.len(),
            diagnostics = diagnostics.len(),
            "analysis complete"
        );
        persist::save_diagnostics(graph.root(), &diagnostics);
        Ok(diagnostics)
    }

    /// Full rescan of the repository. Returns the new symbol count.
    pub fn refresh(&self, repo_path: &Path) -> Result<usize, Error> {
        let graph = self.graph_for(repo_path)?;
        let count = graph.refresh().map_err(Error::Scan)?;
        let snapshot = graph.snapshot();
        persist::save_symbols(graph.root(), &snapshot.all_symbols());
        Ok(count)
    }

    /// The full symbol table, in file order.
    pub fn symbols(&self, repo_path: &Path) -> Result<Vec<crate::analysis::Symbol>, Error> {
        let graph = self.graph_for(repo_path)?;
        let snapshot = graph.snapshot();
        Ok(snapshot.all_symbols().into_iter().cloned().collect())
    }

    /// The node/edge view, flagged with the persisted diagnostics.
    pub fn graph(&self, repo_path: &Path) -> Result<GraphData, Error> {
        let graph = self.graph_for(repo_path)?;
        let diagnostics = persist::load_diagnostics(graph.root());
        Ok(build_graph(&graph.snapshot(), &diagnostics))
    }

    /// Persist the union of diagnostics the editor currently holds.
    /// Returns how many were saved.
    pub fn save_diagnostics(
        &self,
        repo_path: &Path,
        diagnostics: &[Diagnostic],
    ) -> Result<usize, Error> {
        let graph = self.graph_for(repo_path)?;
        persist::save_diagnostics(graph.root(), diagnostics);
        Ok(diagnostics.len())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Repo-relative form of an editor path, unchanged when it is already
/// relative or lies outside the repo.
fn repo_relative(root: &Path, file_path: &str) -> String {
    Path::new(file_path)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DiagnosticCode;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("core.c"), "int arr[10];\n").unwrap();
        fs::write(
            temp.path().join("utils.py"),
            "def compute(a, b, c):\n    return a + b + c\n",
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_analyze_out_of_bounds() {
        let temp = repo();
        let engine = Engine::new();
        let diags = engine
            .analyze("int x = arr[12];\n", "main.c", temp.path(), &[])
            .unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ArrayBounds);
        assert_eq!(diags[0].line, 1);
        assert_eq!(
            diags[0].message,
            "Index 12 exceeds declared size 10 in core.c:1"
        );
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let temp = repo();
        let engine = Engine::new();
        let content = "from utils import compute\nx = compute(1, 2)\n";
        let first = engine
            .analyze(content, "app.py", temp.path(), &[])
            .unwrap();
        let second = engine
            .analyze(content, "app.py", temp.path(), &[])
            .unwrap();
        let keys = |d: &[Diagnostic]| d.iter().map(|x| x.key()).collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
        assert!(!first.is_empty());
    }

    #[test]
    fn test_unsupported_extension_yields_empty() {
        let temp = repo();
        let engine = Engine::new();
        let diags = engine
            .analyze("whatever", "notes.txt", temp.path(), &[])
            .unwrap();
        assert!(diags.is_empty());
    }

    #[test]
    fn test_invalid_repo_path() {
        let engine = Engine::new();
        let err = engine
            .analyze("x = 1\n", "a.py", Path::new("/definitely/not/here"), &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRepoPath(_)));
    }

    #[test]
    fn test_overlay_supersedes_disk() {
        let temp = repo();
        let engine = Engine::new();
        // on disk arr has 10 slots; the overlay shrinks it to 2
        let overlay = OpenBuffer {
            content: "int arr[2];\n".to_string(),
            file_path: "core.c".to_string(),
        };
        let diags = engine
            .analyze("int x = arr[5];\n", "main.c", temp.path(), &[overlay])
            .unwrap();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("declared size 2"));
    }

    #[test]
    fn test_refresh_and_symbols() {
        let temp = repo();
        let engine = Engine::new();
        let count = engine.refresh(temp.path()).unwrap();
        assert!(count >= 2);

        fs::write(temp.path().join("extra.py"), "flag: bool = True\n").unwrap();
        let new_count = engine.refresh(temp.path()).unwrap();
        assert!(new_count > count);

        let symbols = engine.symbols(temp.path()).unwrap();
        assert!(symbols.iter().any(|s| s.name == "flag"));
    }

    #[test]
    fn test_graph_flags_persisted_errors() {
        let temp = repo();
        let engine = Engine::new();
        engine
            .analyze("int x = arr[12];\n", "main.c", temp.path(), &[])
            .unwrap();
        let graph = engine.graph(temp.path()).unwrap();
        // main.c is not a scanned file, but core.c's nodes exist
        assert!(graph.nodes.iter().any(|n| n.id == "file:core.c"));
    }

    #[test]
    fn test_language_locality() {
        let temp = repo();
        let engine = Engine::new();
        let c_before = engine
            .analyze("int x = arr[12];\n", "main.c", temp.path(), &[])
            .unwrap();
        // a Python overlay must not change the C result
        let overlay = OpenBuffer {
            content: "arr = [1]\n".to_string(),
            file_path: "arrmod.py".to_string(),
        };
        let c_after = engine
            .analyze("int x = arr[12];\n", "main.c", temp.path(), &[overlay])
            .unwrap();
        let keys = |d: &[Diagnostic]| d.iter().map(|x| x.key()).collect::<Vec<_>>();
        assert_eq!(keys(&c_before), keys(&c_after));
    }
}
