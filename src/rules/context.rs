//! Shared lookup context for the rule family.
//!
//! Bundles the buffer's facts with the repo snapshot in effect for one
//! analysis, and owns the two resolution policies every rule leans on:
//! the buffer overrides the repo for its own file, and the canonical
//! cross-file symbol is the lexicographic-first declaration outside the
//! buffer file.

use crate::analysis::{FileFacts, Language, Symbol, SymbolKind, ValueHint};
use crate::graph::Snapshot;

pub struct RuleContext<'a> {
    /// Path of the buffer under analysis, as the editor sent it.
    pub file: &'a str,
    pub language: Language,
    pub buffer: &'a FileFacts,
    pub snapshot: &'a Snapshot,
}

impl<'a> RuleContext<'a> {
    pub fn new(file: &'a str, buffer: &'a FileFacts, snapshot: &'a Snapshot) -> Self {
        Self {
            file,
            language: buffer.language,
            buffer,
            snapshot,
        }
    }

    /// True when a repo path refers to the buffer's file. The editor may
    /// send an absolute path while the graph stores repo-relative ones.
    pub fn is_buffer_file(&self, repo_path: &str) -> bool {
        if repo_path.is_empty() {
            return false;
        }
        let cur = self.file.replace('\\', "/");
        let repo = repo_path.replace('\\', "/");
        cur == repo || cur.ends_with(&format!("/{}", repo))
    }

    /// Canonical declaration of `name` in another file of the buffer's
    /// language.
    pub fn repo_canonical(&self, name: &str) -> Option<&'a Symbol> {
        self.snapshot
            .symbols_named(self.language, name)
            .into_iter()
            .find(|s| !self.is_buffer_file(&s.file))
    }

    /// Canonical function for a call: the buffer's own definition wins,
    /// then the lexicographic-first repo definition.
    pub fn lookup_function(&self, name: &str) -> Option<&'a Symbol> {
        if let Some(sym) = self
            .buffer
            .symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Function && s.name == name)
        {
            return Some(sym);
        }
        self.snapshot
            .symbols_named(self.language, name)
            .into_iter()
            .find(|s| s.kind == SymbolKind::Function && !self.is_buffer_file(&s.file))
    }

    /// Declared type of `name`: buffer scope first, then the canonical repo
    /// declaration.
    pub fn lookup_type(&self, name: &str) -> Option<String> {
        if let Some(sym) = self.buffer.find_symbol(name) {
            if let Some(t) = &sym.declared_type {
                return Some(t.clone());
            }
        }
        self.repo_canonical(name)
            .and_then(|s| s.declared_type.clone())
    }

    /// Resolve a value hint to an apparent type: the literal evidence wins,
    /// otherwise the identifier is looked up in the buffer then the repo.
    /// `None` means unknown and suppresses the dependent check.
    pub fn resolve_hint(&self, hint: &ValueHint) -> Option<String> {
        if let Some(t) = &hint.apparent {
            return Some(t.clone());
        }
        hint.ident.as_deref().and_then(|name| self.lookup_type(name))
    }

    /// Struct members for a type name, buffer first then repo. `None` when
    /// no definition is known (which suppresses the member check).
    pub fn lookup_struct(&self, name: &str) -> Option<&'a Symbol> {
        if let Some(sym) = self
            .buffer
            .symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Struct && s.name == name)
        {
            return Some(sym);
        }
        self.snapshot
            .symbols_named(self.language, name)
            .into_iter()
            .find(|s| s.kind == SymbolKind::Struct)
    }

    /// All names the buffer imports (Python). Star imports contribute `*`.
    pub fn imported_names(&self) -> impl Iterator<Item = &str> {
        self.buffer
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Import)
            .flat_map(|s| s.imported_names.iter().map(|n| n.as_str()))
    }
}
