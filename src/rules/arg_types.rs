//! Positional argument types against parameter annotations (Python).

use crate::analysis::{Language, RefKind};
use crate::rules::type_check::python_compatible;
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

pub fn check_arg_types(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::Python {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::Call || r.args.is_empty() {
            continue;
        }
        if r.name.contains('.') {
            continue;
        }
        let Some(func) = ctx.lookup_function(&r.name) else {
            continue;
        };

        for (i, hint) in r.args.iter().enumerate() {
            let Some(param) = func.params.get(i) else {
                break; // extra args are the signature rule's concern
            };
            let Some(param_type) = param.annotated_type.as_deref() else {
                continue;
            };
            let Some(arg_type) = ctx.resolve_hint(hint) else {
                continue;
            };
            if let Some(false) = python_compatible(param_type, &arg_type) {
                diagnostics.push(Diagnostic::new(
                    ctx.file,
                    r.line,
                    Severity::Error,
                    DiagnosticCode::ArgTypeMismatch,
                    format!(
                        "Argument '{}' of '{}' expects type '{}' but got '{}'",
                        param.name, r.name, param_type, arg_type
                    ),
                ));
            }
        }
    }
    diagnostics
}
