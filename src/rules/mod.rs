//! The analysis rule family.
//!
//! Each rule is an infallible pure function over a `RuleContext`; rules are
//! independent of one another (the star-import suppression inside the
//! undefined rule is part of that rule's own definition). The driver
//! concatenates every rule's findings, deduplicates on
//! `(file, line, code, message)`, and orders the result by source position.

mod arg_types;
mod bounds;
mod context;
mod format;
mod shadow;
mod signature;
mod structs;
mod type_check;
mod types;
mod undefined;
mod unsafe_fns;
mod unused;

pub use arg_types::check_arg_types;
pub use bounds::check_array_bounds;
pub use context::RuleContext;
pub use format::{check_format_strings, count_specifiers};
pub use shadow::check_shadowing;
pub use signature::check_signatures;
pub use structs::check_struct_access;
pub use type_check::{
    c_assign_compatible, check_array_writes, check_assignments, check_cross_file_types,
    check_extern_types, check_returns, python_compatible,
};
pub use types::{dedup_diagnostics, Diagnostic, DiagnosticCode, Severity};
pub use undefined::check_undefined;
pub use unsafe_fns::{check_unsafe_functions, lookup as lookup_unsafe, UnsafeFn};
pub use unused::{check_dead_imports, check_unused_externs};

/// Run the whole rule family over one buffer against one snapshot.
pub fn run_all(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    diagnostics.extend(check_extern_types(ctx));
    diagnostics.extend(check_array_writes(ctx));
    diagnostics.extend(check_assignments(ctx));
    diagnostics.extend(check_returns(ctx));
    diagnostics.extend(check_cross_file_types(ctx));
    diagnostics.extend(check_array_bounds(ctx));
    diagnostics.extend(check_signatures(ctx));
    diagnostics.extend(check_arg_types(ctx));
    diagnostics.extend(check_undefined(ctx));
    diagnostics.extend(check_shadowing(ctx));
    diagnostics.extend(check_dead_imports(ctx));
    diagnostics.extend(check_unused_externs(ctx));
    diagnostics.extend(check_format_strings(ctx));
    diagnostics.extend(check_struct_access(ctx));
    diagnostics.extend(check_unsafe_functions(ctx));

    let mut diagnostics = dedup_diagnostics(diagnostics);
    diagnostics.sort_by(|a, b| (a.line, a.code.as_str()).cmp(&(b.line, b.code.as_str())));
    diagnostics
}
