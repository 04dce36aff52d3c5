//! Type consistency rules.
//!
//! Five checks share this module: extern declarations against their
//! canonical definitions (C), element writes into typed arrays (C),
//! annotated assignments and returns against literal evidence (Python),
//! and module-level annotation drift across files (Python).

use crate::analysis::{RefKind, SymbolKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

/// Collapse runs of whitespace so `unsigned   int` and `unsigned int`
/// compare equal.
fn normalize_type(ty: &str) -> String {
    ty.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Base of a Python annotation: `list[int]` compares as `list`.
fn annotation_base(ty: &str) -> &str {
    ty.split('[').next().unwrap_or(ty).trim()
}

const PYTHON_SIMPLE_TYPES: &[&str] = &[
    "int", "float", "str", "bool", "list", "tuple", "dict", "set",
];

/// Python assignment compatibility over the closed simple-type set.
/// `int -> float` widening is permitted; anything outside the set is
/// unknown and suppresses the check.
pub fn python_compatible(annotation: &str, value: &str) -> Option<bool> {
    let ann = annotation_base(annotation);
    let val = annotation_base(value);
    if !PYTHON_SIMPLE_TYPES.contains(&ann) || !PYTHON_SIMPLE_TYPES.contains(&val) {
        return None;
    }
    Some(ann == val || (ann == "float" && val == "int"))
}

/// C element-assignment compatibility: `char <- char`, `int <- int|char`,
/// `float <- float|int`; anything else incompatible. Types outside the
/// table are unknown and suppress the check.
pub fn c_assign_compatible(target: &str, value: &str) -> Option<bool> {
    let target = normalize_type(target);
    let value = normalize_type(value);
    let known = ["char", "int", "float"];
    if !known.contains(&target.as_str()) || !known.contains(&value.as_str()) {
        return None;
    }
    Some(match target.as_str() {
        "char" => value == "char",
        "int" => value == "int" || value == "char",
        "float" => value == "float" || value == "int",
        _ => false,
    })
}

/// Extern declarations against the canonical (non-extern) definition:
/// type drift is a type mismatch; an extern that overclaims the array size
/// is a bounds defect.
pub fn check_extern_types(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != crate::analysis::Language::C {
        return diagnostics;
    }

    for sym in &ctx.buffer.symbols {
        if sym.kind != SymbolKind::Extern {
            continue;
        }
        // canonical definition: first non-extern declaration elsewhere
        let Some(def) = ctx
            .snapshot
            .symbols_named(ctx.language, &sym.name)
            .into_iter()
            .find(|s| s.kind != SymbolKind::Extern && !ctx.is_buffer_file(&s.file))
        else {
            continue;
        };

        let buf_type = sym.declared_type.as_deref().map(normalize_type);
        let def_type = def.declared_type.as_deref().map(normalize_type);
        if let (Some(buf_type), Some(def_type)) = (buf_type, def_type) {
            if buf_type != def_type {
                diagnostics.push(Diagnostic::new(
                    ctx.file,
                    sym.line,
                    Severity::Error,
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "'{}' is declared as {} in {}:{} but as {} here",
                        sym.name, def_type, def.file, def.line, buf_type
                    ),
                ));
                continue;
            }
        }

        // extern declares a larger array than the definition provides
        if let (Some(buf_size), Some(def_size)) = (sym.array_size, def.array_size) {
            if buf_size > def_size {
                diagnostics.push(Diagnostic::new(
                    ctx.file,
                    sym.line,
                    Severity::Error,
                    DiagnosticCode::ArrayBounds,
                    format!(
                        "'{}' declares size {} but the definition in {}:{} has size {}",
                        sym.name, buf_size, def.file, def.line, def_size
                    ),
                ));
            }
        }
    }
    diagnostics
}

/// Element writes into typed C arrays: `buf[i] = expr` where the element
/// type rejects the RHS's apparent type.
pub fn check_array_writes(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != crate::analysis::Language::C {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::ArrayWrite {
            continue;
        }
        let Some(rhs_type) = r.rhs.as_ref().and_then(|h| ctx.resolve_hint(h)) else {
            continue;
        };

        // element type: buffer declaration first, then canonical repo site
        let (elem_type, decl_file, decl_line) = match ctx.buffer.find_symbol(&r.name) {
            Some(sym) if sym.declared_type.is_some() => (
                sym.declared_type.clone().unwrap(),
                sym.file.clone(),
                sym.line,
            ),
            _ => match ctx.repo_canonical(&r.name) {
                Some(sym) if sym.declared_type.is_some() => (
                    sym.declared_type.clone().unwrap(),
                    sym.file.clone(),
                    sym.line,
                ),
                _ => continue,
            },
        };

        if let Some(false) = c_assign_compatible(&elem_type, &rhs_type) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::TypeMismatch,
                format!(
                    "Assigning {} to '{}' (element type {} declared in {}:{})",
                    rhs_type,
                    r.name,
                    normalize_type(&elem_type),
                    decl_file,
                    decl_line
                ),
            ));
        }
    }
    diagnostics
}

/// Annotated Python assignments with literal evidence on the RHS.
pub fn check_assignments(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != crate::analysis::Language::Python {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::Write {
            continue;
        }
        let (Some(annotation), Some(rhs)) = (r.annotation.as_deref(), r.rhs.as_ref()) else {
            continue;
        };
        let Some(value_type) = ctx.resolve_hint(rhs) else {
            continue;
        };
        if let Some(false) = python_compatible(annotation, &value_type) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::TypeMismatch,
                format!(
                    "Variable '{}' is annotated as '{}' but assigned a value of type '{}'",
                    r.name, annotation, value_type
                ),
            ));
        }
    }
    diagnostics
}

/// Returned expressions against the function's return annotation.
pub fn check_returns(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != crate::analysis::Language::Python {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::Return {
            continue;
        }
        let (Some(declared), Some(rhs)) = (r.declared_return.as_deref(), r.rhs.as_ref()) else {
            continue;
        };
        let Some(actual) = ctx.resolve_hint(rhs) else {
            continue;
        };
        if let Some(false) = python_compatible(declared, &actual) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::TypeMismatch,
                format!(
                    "Return type '{}' does not match declared return type '{}' for function '{}'",
                    actual, declared, r.name
                ),
            ));
        }
    }
    diagnostics
}

/// Module-level annotation drift across Python files: the same variable
/// annotated differently here and at its canonical repo site.
pub fn check_cross_file_types(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != crate::analysis::Language::Python {
        return diagnostics;
    }

    for sym in &ctx.buffer.symbols {
        if !sym.is_module_scope()
            || !sym.annotated
            || !matches!(sym.kind, SymbolKind::Variable | SymbolKind::Array)
        {
            continue;
        }
        let Some(ann) = sym.declared_type.as_deref() else {
            continue;
        };
        let Some(canon) = ctx
            .snapshot
            .symbols_named(ctx.language, &sym.name)
            .into_iter()
            .find(|s| {
                s.is_module_scope()
                    && s.annotated
                    && s.declared_type.is_some()
                    && !ctx.is_buffer_file(&s.file)
            })
        else {
            continue;
        };
        let canon_ann = canon.declared_type.as_deref().unwrap_or_default();
        if normalize_type(canon_ann) != normalize_type(ann) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                sym.line,
                Severity::Error,
                DiagnosticCode::TypeMismatch,
                format!(
                    "'{}' is annotated as '{}' in {}:{} but as '{}' here",
                    sym.name, canon_ann, canon.file, canon.line, ann
                ),
            ));
        }
    }
    diagnostics
}
