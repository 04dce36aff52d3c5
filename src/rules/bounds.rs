//! Static array bounds verification.
//!
//! The canonical definition's size wins over anything the buffer declares
//! (an extern may overclaim); buffer-local arrays cover names the repo
//! doesn't know.

use std::collections::HashMap;

use crate::analysis::{RefKind, SymbolKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

pub fn check_array_bounds(ctx: &RuleContext) -> Vec<Diagnostic> {
    // name -> (size, declaring file, declaring line)
    let mut sizes: HashMap<&str, (i64, &str, usize)> = HashMap::new();

    // canonical repo definitions first (non-extern preferred, then extern),
    // excluding the buffer file whose unsaved content supersedes disk
    for sym in ctx.buffer.references.iter().filter_map(|r| {
        if r.kind == RefKind::ArrayAccess || r.kind == RefKind::ArrayWrite {
            Some(r.name.as_str())
        } else {
            None
        }
    }) {
        if sizes.contains_key(sym) {
            continue;
        }
        let candidates = ctx.snapshot.symbols_named(ctx.language, sym);
        let canonical = candidates
            .iter()
            .find(|s| s.array_size.is_some() && s.kind != SymbolKind::Extern && !ctx.is_buffer_file(&s.file))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|s| s.array_size.is_some() && !ctx.is_buffer_file(&s.file))
            });
        if let Some(s) = canonical {
            sizes.insert(sym, (s.array_size.unwrap(), s.file.as_str(), s.line));
        }
    }

    // buffer arrays fill the gaps
    for sym in &ctx.buffer.symbols {
        if let Some(size) = sym.array_size {
            sizes
                .entry(sym.name.as_str())
                .or_insert((size, ctx.file, sym.line));
        }
    }

    let mut diagnostics = Vec::new();
    for r in &ctx.buffer.references {
        if !matches!(r.kind, RefKind::ArrayAccess | RefKind::ArrayWrite) {
            continue;
        }
        let Some(index) = r.index else {
            continue;
        };
        let Some(&(size, decl_file, decl_line)) = sizes.get(r.name.as_str()) else {
            continue;
        };
        if index < 0 || index >= size {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::ArrayBounds,
                format!(
                    "Index {} exceeds declared size {} in {}:{}",
                    index, size, decl_file, decl_line
                ),
            ));
        }
    }
    diagnostics
}
