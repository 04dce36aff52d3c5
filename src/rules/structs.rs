//! Struct member access validation (C).
//!
//! `recv.member` / `recv->member` where the receiver's declared type
//! resolves to a known struct and the member is not in its member set.
//! Unknown receivers and undefined structs stay silent.

use crate::analysis::{Language, RefKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

pub fn check_struct_access(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::C {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::MemberAccess {
            continue;
        }
        let Some(member) = r.member.as_deref() else {
            continue;
        };
        let Some(recv_type) = ctx.lookup_type(&r.name) else {
            continue;
        };
        // "struct Point" / "struct Point*" resolve to Point
        let Some(struct_name) = recv_type
            .strip_prefix("struct ")
            .map(|rest| rest.trim_end_matches('*').trim())
        else {
            continue;
        };
        let Some(def) = ctx.lookup_struct(struct_name) else {
            continue;
        };

        if !def.members.iter().any(|m| m.name == member) {
            let available = if def.members.is_empty() {
                "(none)".to_string()
            } else {
                let mut names: Vec<&str> = def.members.iter().map(|m| m.name.as_str()).collect();
                names.sort_unstable();
                names.join(", ")
            };
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::StructAccess,
                format!(
                    "Struct '{}' has no member '{}'. Available members: {}",
                    struct_name, member, available
                ),
            ));
        }
    }
    diagnostics
}
