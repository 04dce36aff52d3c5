//! Best-effort persistence under `<repo>/.snipe/`.
//!
//! Both files are opaque, rebuildable caches: `diagnostics.json` feeds the
//! graph view's error flags across sessions, `symbols.json` is a scan
//! by-product. Write failures are logged and never fail a request; the
//! in-memory state stays authoritative.

use std::path::{Path, PathBuf};

use crate::analysis::Symbol;
use crate::rules::Diagnostic;

const SNIPE_DIR: &str = ".snipe";
const DIAGNOSTICS_FILE: &str = "diagnostics.json";
const SYMBOLS_FILE: &str = "symbols.json";

fn snipe_dir(repo: &Path) -> PathBuf {
    repo.join(SNIPE_DIR)
}

fn write_json<T: serde::Serialize>(repo: &Path, file: &str, value: &T) {
    let dir = snipe_dir(repo);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "could not create cache dir");
        return;
    }
    let path = dir.join(file);
    let json = match serde_json::to_string_pretty(value) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(error = %e, "could not serialize cache payload");
            return;
        }
    };
    if let Err(e) = std::fs::write(&path, json) {
        tracing::warn!(path = %path.display(), error = %e, "could not write cache file");
    }
}

pub fn save_diagnostics(repo: &Path, diagnostics: &[Diagnostic]) {
    write_json(repo, DIAGNOSTICS_FILE, &diagnostics);
}

/// Last persisted diagnostics, or empty when absent/corrupt.
pub fn load_diagnostics(repo: &Path) -> Vec<Diagnostic> {
    let path = snipe_dir(repo).join(DIAGNOSTICS_FILE);
    let Ok(text) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };
    match serde_json::from_str(&text) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt diagnostics cache");
            Vec::new()
        }
    }
}

pub fn save_symbols(repo: &Path, symbols: &[&Symbol]) {
    write_json(repo, SYMBOLS_FILE, &symbols);
}
