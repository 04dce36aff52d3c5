//! Format string argument mismatch detection (C printf family).
//!
//! Conversion specifiers are `%[flags][width][.precision][length]conv`;
//! `%%` is an escaped percent and never counts. Length modifiers are
//! consumed but carry no signal: the contract is count-only.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{Language, RefKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

lazy_static! {
    static ref SPECIFIER_RE: Regex =
        Regex::new(r"%[-+ #0]*[0-9*]*(?:\.[0-9*]*)?[hlLqjzt]*([diouxXeEfFgGaAcspn%])").unwrap();
}

/// Count conversion specifiers in a format literal, excluding `%%`.
pub fn count_specifiers(format: &str) -> usize {
    SPECIFIER_RE
        .captures_iter(format)
        .filter(|c| &c[1] != "%")
        .count()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

pub fn check_format_strings(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::C {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::FormatCall {
            continue;
        }
        let (Some(literal), Some(args)) = (r.format_literal.as_deref(), r.format_args) else {
            continue;
        };
        let specifiers = count_specifiers(literal);
        if specifiers != args {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                Severity::Error,
                DiagnosticCode::FormatString,
                format!(
                    "Format string in '{}' has {} {}, {} {}",
                    r.name,
                    specifiers,
                    plural(specifiers, "specifier"),
                    args,
                    plural(args, "argument")
                ),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileFacts, Reference};
    use crate::graph::Snapshot;

    #[test]
    fn test_specifier_counting() {
        assert_eq!(count_specifiers("%d %s"), 2);
        assert_eq!(count_specifiers("no specifiers"), 0);
        assert_eq!(count_specifiers("100%% done"), 0);
        assert_eq!(count_specifiers("%5.2f and %-8ld"), 2);
        assert_eq!(count_specifiers("%*d"), 1);
        assert_eq!(count_specifiers("%zu bytes, %p"), 2);
    }

    fn format_call(literal: &str, args: usize, line: usize) -> Reference {
        let mut r = Reference::new("printf", RefKind::FormatCall, line);
        r.format_literal = Some(literal.to_string());
        r.format_args = Some(args);
        r
    }

    #[test]
    fn test_mismatch_message() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("main.c", Language::C);
        buffer.references.push(format_call("%d %s", 1, 1));

        let ctx = RuleContext::new("main.c", &buffer, &snap);
        let diags = check_format_strings(&ctx);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("2 specifiers, 1 argument"));
    }

    #[test]
    fn test_matching_counts_and_escaped_percent() {
        let snap = Snapshot::default();
        let mut buffer = FileFacts::empty("main.c", Language::C);
        buffer.references.push(format_call("%d%%", 1, 1));
        buffer.references.push(format_call("plain", 0, 2));

        let ctx = RuleContext::new("main.c", &buffer, &snap);
        assert!(check_format_strings(&ctx).is_empty());
    }
}
