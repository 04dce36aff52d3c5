//! Repository symbol graph: the authoritative cross-file view.
//!
//! A `Snapshot` is an immutable picture of every supported file's symbols,
//! with two derived indexes. `RepoGraph` wraps the current snapshot behind a
//! single-writer/many-readers lock: readers clone the `Arc` and analyze
//! against a consistent picture while a concurrent refresh builds its
//! replacement off-lock and swaps it in.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::analysis::{analyzer_for_path, FileFacts, Language, Symbol};

/// Directory names never scanned.
const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".snipe",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    "target",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    "vendor",
];

/// One scanned file's contribution to the graph.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub language: Language,
    pub symbols: Vec<Symbol>,
}

/// Position of a symbol inside a snapshot: (file path, index into that
/// file's symbol list). Symbols are addressed by position, never by owning
/// pointers between them.
pub type SymbolRef = (String, usize);

/// An immutable view of the repository's symbols.
///
/// `files` is ordered by path, which is what makes "lexicographic-first"
/// the canonical-definition policy: index entries are pushed in file order,
/// so the first entry for a name is its canonical site.
#[derive(Debug, Default)]
pub struct Snapshot {
    files: BTreeMap<String, FileEntry>,
    by_name: HashMap<(Language, String), Vec<SymbolRef>>,
    functions: HashMap<(Language, String), SymbolRef>,
}

impl Snapshot {
    /// Build a snapshot from per-file facts, rebuilding both indexes.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, FileEntry)>) -> Self {
        let files: BTreeMap<String, FileEntry> = entries.into_iter().collect();
        let mut snapshot = Snapshot {
            files,
            by_name: HashMap::new(),
            functions: HashMap::new(),
        };
        snapshot.rebuild_indexes();
        snapshot
    }

    fn rebuild_indexes(&mut self) {
        self.by_name.clear();
        self.functions.clear();
        for (path, entry) in &self.files {
            for (idx, sym) in entry.symbols.iter().enumerate() {
                let key = (entry.language, sym.name.clone());
                self.by_name
                    .entry(key.clone())
                    .or_default()
                    .push((path.clone(), idx));
                if sym.kind == crate::analysis::SymbolKind::Function {
                    self.functions.entry(key).or_insert((path.clone(), idx));
                }
            }
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.files.values().map(|e| e.symbols.len()).sum()
    }

    /// Iterate files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&String, &FileEntry)> {
        self.files.iter()
    }

    /// Flat symbol list in file order, for the symbol-table operation and
    /// the graph view.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        self.files.values().flat_map(|e| e.symbols.iter()).collect()
    }

    fn resolve(&self, sref: &SymbolRef) -> Option<&Symbol> {
        self.files.get(&sref.0)?.symbols.get(sref.1)
    }

    /// Every declaration of `name` in `language`, in canonical
    /// (lexicographic file, position) order.
    pub fn symbols_named(&self, language: Language, name: &str) -> Vec<&Symbol> {
        self.by_name
            .get(&(language, name.to_string()))
            .map(|refs| refs.iter().filter_map(|r| self.resolve(r)).collect())
            .unwrap_or_default()
    }

    /// The canonical declaration of `name` outside `exclude_file`, if any.
    pub fn canonical_symbol(
        &self,
        language: Language,
        name: &str,
        exclude_file: &str,
    ) -> Option<&Symbol> {
        self.symbols_named(language, name)
            .into_iter()
            .find(|s| s.file != exclude_file)
    }

    /// The canonical function definition for a call, outside `exclude_file`.
    /// Falls back to scanning `by_name` when the first-definition index entry
    /// sits in the excluded file.
    pub fn canonical_function(
        &self,
        language: Language,
        name: &str,
        exclude_file: &str,
    ) -> Option<&Symbol> {
        if let Some(sym) = self
            .functions
            .get(&(language, name.to_string()))
            .and_then(|r| self.resolve(r))
        {
            if sym.file != exclude_file {
                return Some(sym);
            }
        }
        self.symbols_named(language, name)
            .into_iter()
            .find(|s| s.kind == crate::analysis::SymbolKind::Function && s.file != exclude_file)
    }

    /// True when any file of `language` declares `name` at all (used for
    /// undefined-symbol suppression; duplicates count).
    pub fn declares(&self, language: Language, name: &str) -> bool {
        self.by_name.contains_key(&(language, name.to_string()))
    }

    /// A derived snapshot with unsaved buffers overlaid: each overlay
    /// replaces its file's bucket (or adds one) for the lifetime of a single
    /// request. The underlying snapshot is untouched.
    pub fn with_overlays(&self, overlays: &[FileFacts]) -> Snapshot {
        let mut files = self.files.clone();
        for facts in overlays {
            files.insert(
                facts.path.clone(),
                FileEntry {
                    language: facts.language,
                    symbols: facts.symbols.clone(),
                },
            );
        }
        Snapshot::from_entries(files)
    }
}

/// The process-wide repository graph for one repo root.
pub struct RepoGraph {
    root: PathBuf,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl RepoGraph {
    /// Scan `root` and build the initial graph.
    pub fn scan(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let snapshot = build_snapshot(&root)?;
        Ok(Self {
            root,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current snapshot by reference; the caller keeps a consistent view
    /// for as long as it holds the `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Full rescan. Returns the new symbol count. Concurrent refreshes
    /// serialize on the write lock; the latest completed one wins.
    pub fn refresh(&self) -> anyhow::Result<usize> {
        let snapshot = build_snapshot(&self.root)?;
        let count = snapshot.symbol_count();
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot);
        Ok(count)
    }

    /// Replace a single file's bucket and rebuild the indexes. Cheap: no
    /// per-symbol diffing.
    pub fn refresh_file(&self, path: &str, facts: FileFacts) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        let mut files: BTreeMap<String, FileEntry> = guard.files.clone();
        files.insert(
            path.to_string(),
            FileEntry {
                language: facts.language,
                symbols: facts.symbols,
            },
        );
        *guard = Arc::new(Snapshot::from_entries(files));
    }
}

/// Collect the repo's supported source files, honoring the ignore list.
fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if !e.file_type().is_dir() || e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !IGNORED_DIRS.contains(&name.as_ref())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|ext| Language::from_extension(&ext.to_ascii_lowercase()).is_some())
                .unwrap_or(false)
        })
        .collect()
}

/// Parse and extract every supported file under `root` in parallel. A file
/// that cannot be read or parsed logs a warning and contributes nothing.
fn build_snapshot(root: &Path) -> anyhow::Result<Snapshot> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }
    let files = collect_source_files(root);

    let entries: Vec<(String, FileEntry)> = files
        .par_iter()
        .filter_map(|path| {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            let source = match std::fs::read(path) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "could not read file");
                    return None;
                }
            };
            let analyzer = analyzer_for_path(&rel)?;
            let parsed = match analyzer.parse(Path::new(&rel), &source) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(file = %rel, error = %e, "parse failed during scan");
                    return None;
                }
            };
            match analyzer.extract_facts(&parsed) {
                Ok(facts) => Some((
                    rel,
                    FileEntry {
                        language: facts.language,
                        symbols: facts.symbols,
                    },
                )),
                Err(e) => {
                    tracing::warn!(file = %rel, error = %e, "extraction failed during scan");
                    None
                }
            }
        })
        .collect();

    tracing::info!(
        root = %root.display(),
        files = entries.len(),
        "repository scan complete"
    );
    Ok(Snapshot::from_entries(entries))
}
