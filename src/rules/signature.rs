//! Function signature drift detection.
//!
//! A call's positional argument count is checked against the canonical
//! definition's accepted range: minimum = required parameters, maximum =
//! total parameters, unbounded for variadics.

use crate::analysis::RefKind;
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

pub fn check_signatures(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for r in &ctx.buffer.references {
        if r.kind != RefKind::Call {
            continue;
        }
        let Some(arg_count) = r.arg_count else {
            continue;
        };
        // method calls resolve through the receiver, which name matching
        // cannot do
        if r.name.contains('.') {
            continue;
        }
        let Some(func) = ctx.lookup_function(&r.name) else {
            continue;
        };

        let (min, max) = func.arg_bounds();
        let in_range = arg_count >= min && max.map(|m| arg_count <= m).unwrap_or(true);
        if in_range {
            continue;
        }

        let expected = match max {
            None => format!("at least {}", min),
            Some(m) if m == min => format!("{}", min),
            Some(m) => format!("{} to {}", min, m),
        };
        diagnostics.push(Diagnostic::new(
            ctx.file,
            r.line,
            Severity::Error,
            DiagnosticCode::SignatureDrift,
            format!(
                "Call to '{}' expects {} argument(s) but got {} (declared in {}:{})",
                r.name, expected, arg_count, func.file, func.line
            ),
        ));
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileFacts, Language, Param, Reference, Symbol, SymbolKind};
    use crate::graph::{FileEntry, Snapshot};

    fn func(name: &str, required: usize, optional: usize, varargs: bool) -> Symbol {
        let mut f = Symbol::new(name, SymbolKind::Function, "u.py", 1);
        for i in 0..required {
            f.params.push(Param {
                name: format!("p{}", i),
                annotated_type: None,
                has_default: false,
            });
        }
        for i in 0..optional {
            f.params.push(Param {
                name: format!("o{}", i),
                annotated_type: None,
                has_default: true,
            });
        }
        f.varargs = varargs;
        f
    }

    fn snap(symbols: Vec<Symbol>) -> Snapshot {
        Snapshot::from_entries(vec![(
            "u.py".to_string(),
            FileEntry {
                language: Language::Python,
                symbols,
            },
        )])
    }

    fn call(name: &str, args: usize, line: usize) -> Reference {
        let mut r = Reference::new(name, RefKind::Call, line);
        r.arg_count = Some(args);
        r
    }

    #[test]
    fn test_too_few_arguments() {
        let snap = snap(vec![func("compute", 3, 0, false)]);
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer.references.push(call("compute", 2, 4));

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_signatures(&ctx);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("expects 3"));
        assert!(diags[0].message.contains("got 2"));
        assert!(diags[0].message.contains("u.py:1"));
    }

    #[test]
    fn test_optional_range() {
        let snap = snap(vec![func("greet", 1, 1, false)]);
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer.references.push(call("greet", 1, 1)); // ok
        buffer.references.push(call("greet", 2, 2)); // ok
        buffer.references.push(call("greet", 3, 3)); // too many

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_signatures(&ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 3);
        assert!(diags[0].message.contains("expects 1 to 2"));
    }

    #[test]
    fn test_variadic_accepts_any_count_above_min() {
        let snap = snap(vec![func("flexible", 1, 0, true)]);
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer.references.push(call("flexible", 7, 1)); // ok
        buffer.references.push(call("flexible", 0, 2)); // below min

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        let diags = check_signatures(&ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
        assert!(diags[0].message.contains("at least 1"));
    }

    #[test]
    fn test_buffer_definition_overrides_repo() {
        // repo says 3 params; the unsaved buffer redefines it with 2
        let snap = snap(vec![func("compute", 3, 0, false)]);
        let mut buffer = FileFacts::empty("u.py", Language::Python);
        buffer.symbols.push(func("compute", 2, 0, false));
        buffer.references.push(call("compute", 2, 9));

        let ctx = RuleContext::new("u.py", &buffer, &snap);
        assert!(check_signatures(&ctx).is_empty());
    }

    #[test]
    fn test_unknown_and_dotted_callees_stay_silent() {
        let snap = snap(vec![func("compute", 3, 0, false)]);
        let mut buffer = FileFacts::empty("app.py", Language::Python);
        buffer.references.push(call("mystery", 9, 1));
        buffer.references.push(call("obj.method", 9, 2));

        let ctx = RuleContext::new("app.py", &buffer, &snap);
        assert!(check_signatures(&ctx).is_empty());
    }
}
