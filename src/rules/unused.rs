//! Unused declaration detection: dead Python imports and unused C externs.

use std::collections::HashSet;

use crate::analysis::{Language, SymbolKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

/// Imported names with zero references in the file. `from X import *` is
/// never dead (its contribution is unknowable).
pub fn check_dead_imports(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::Python {
        return diagnostics;
    }

    let used: HashSet<&str> = ctx
        .buffer
        .references
        .iter()
        .map(|r| r.name.as_str())
        .collect();

    for sym in &ctx.buffer.symbols {
        if sym.kind != SymbolKind::Import {
            continue;
        }
        for name in &sym.imported_names {
            if name == "*" {
                continue;
            }
            if !used.contains(name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    ctx.file,
                    sym.line,
                    Severity::Warning,
                    DiagnosticCode::DeadImport,
                    format!("Imported name '{}' is never used in this file", name),
                ));
            }
        }
    }
    diagnostics
}

/// Extern declarations with zero references in the file.
pub fn check_unused_externs(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::C {
        return diagnostics;
    }

    let used: HashSet<&str> = ctx
        .buffer
        .references
        .iter()
        .map(|r| r.name.as_str())
        .collect();

    for sym in &ctx.buffer.symbols {
        if sym.kind != SymbolKind::Extern {
            continue;
        }
        if !used.contains(sym.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                sym.line,
                Severity::Warning,
                DiagnosticCode::UnusedExtern,
                format!("Extern declaration '{}' is never used in this file", sym.name),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileFacts, RefKind, Reference, Symbol};
    use crate::graph::Snapshot;

    #[test]
    fn test_dead_import_reported_per_name() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        let mut imp = Symbol::new("os", SymbolKind::Import, "app.py", 1);
        imp.imported_names = vec!["path".to_string(), "getcwd".to_string()];
        buffer.symbols.push(imp);
        buffer
            .references
            .push(Reference::new("path", RefKind::Read, 3));

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_dead_imports(&ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 1);
        assert!(diags[0].message.contains("'getcwd'"));
    }

    #[test]
    fn test_star_import_never_dead() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        let mut imp = Symbol::new("os", SymbolKind::Import, "app.py", 1);
        imp.imported_names = vec!["*".to_string()];
        buffer.symbols.push(imp);

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        assert!(check_dead_imports(&ctx).is_empty());
    }

    #[test]
    fn test_unused_extern() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("main.c", Language::C);
        buffer
            .symbols
            .push(Symbol::new("shared", SymbolKind::Extern, "main.c", 1).with_type("int"));
        buffer
            .symbols
            .push(Symbol::new("used", SymbolKind::Extern, "main.c", 2).with_type("int"));
        buffer
            .references
            .push(Reference::new("used", RefKind::Read, 5));

        let ctx = RuleContext::new("main.c", &buffer, &snap);
        let diags = check_unused_externs(&ctx);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'shared'"));
    }
}
