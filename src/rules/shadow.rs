//! Variable shadowing detection (Python).
//!
//! A function-scope assignment target that reuses a module-level name hides
//! the outer binding for the rest of the function. Same-file shadows cite
//! the outer line; shadows of module-level variables in other repo files
//! get a repository-level message.

use std::collections::HashMap;

use crate::analysis::{Language, SymbolKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

pub fn check_shadowing(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::Python {
        return diagnostics;
    }

    // module-level variables in the buffer, name -> declaration line
    let mut module_level: HashMap<&str, usize> = HashMap::new();
    for s in &ctx.buffer.symbols {
        if s.is_module_scope() && matches!(s.kind, SymbolKind::Variable | SymbolKind::Array) {
            module_level.entry(s.name.as_str()).or_insert(s.line);
        }
    }

    for s in &ctx.buffer.symbols {
        if s.is_module_scope() || !matches!(s.kind, SymbolKind::Variable | SymbolKind::Array) {
            continue;
        }
        if let Some(&outer_line) = module_level.get(s.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                s.line,
                Severity::Warning,
                DiagnosticCode::ShadowedSymbol,
                format!(
                    "Local variable '{}' in '{}' shadows module-level variable defined at line {}",
                    s.name, s.scope, outer_line
                ),
            ));
            continue;
        }

        // module-level variable of another Python file in the repo
        let shadows_repo = ctx
            .snapshot
            .symbols_named(ctx.language, &s.name)
            .into_iter()
            .any(|repo_sym| {
                repo_sym.is_module_scope()
                    && matches!(repo_sym.kind, SymbolKind::Variable | SymbolKind::Array)
                    && !ctx.is_buffer_file(&repo_sym.file)
            });
        if shadows_repo {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                s.line,
                Severity::Warning,
                DiagnosticCode::ShadowedSymbol,
                format!(
                    "Local variable '{}' in '{}' shadows a module-level variable in the repository",
                    s.name, s.scope
                ),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileFacts, Symbol};
    use crate::graph::{FileEntry, Snapshot};

    #[test]
    fn test_same_file_shadow() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer
            .symbols
            .push(Symbol::new("total", SymbolKind::Variable, "app.py", 1));
        buffer.symbols.push(
            Symbol::new("total", SymbolKind::Variable, "app.py", 5).with_scope("update"),
        );

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_shadowing(&ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 5);
        assert!(diags[0].message.contains("defined at line 1"));
    }

    #[test]
    fn test_repo_level_shadow() {
        let snap = Snapshot::from_entries(vec![(
            "config.py".to_string(),
            FileEntry {
                language: Language::Python,
                symbols: vec![Symbol::new("total", SymbolKind::Variable, "config.py", 2)],
            },
        )]);
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer.symbols.push(
            Symbol::new("total", SymbolKind::Variable, "app.py", 5).with_scope("update"),
        );

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_shadowing(&ctx);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("in the repository"));
    }

    #[test]
    fn test_function_params_and_functions_do_not_shadow() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer
            .symbols
            .push(Symbol::new("helper", SymbolKind::Function, "app.py", 1));
        buffer.symbols.push(
            Symbol::new("helper", SymbolKind::Function, "app.py", 5).with_scope("outer"),
        );

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        assert!(check_shadowing(&ctx).is_empty());
    }
}
