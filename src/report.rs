//! Diagnostic output formatting for the CLI.
//!
//! Two formats: colored terminal output for humans, JSON for tooling.

use colored::*;
use serde::Serialize;

use crate::rules::{Diagnostic, Severity};

/// JSON report wrapper.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub file: &'a str,
    pub diagnostics: &'a [Diagnostic],
    pub errors: usize,
    pub warnings: usize,
}

pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize) {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    (errors, warnings)
}

/// Write diagnostics as JSON to stdout.
pub fn write_json(file: &str, diagnostics: &[Diagnostic]) -> anyhow::Result<()> {
    let (errors, warnings) = count_by_severity(diagnostics);
    let report = JsonReport {
        file,
        diagnostics,
        errors,
        warnings,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARNING".yellow().bold(),
        Severity::Info => "INFO".blue().bold(),
    }
}

/// Write colored human-readable diagnostics to stdout.
pub fn write_pretty(file: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("{} {}", "✓".green().bold(), format!("{}: no findings", file).dimmed());
        return;
    }

    println!("{}", file.bold());
    for d in diagnostics {
        println!(
            "  {}:{} {} [{}] {}",
            d.file.dimmed(),
            d.line.to_string().dimmed(),
            severity_label(d.severity),
            d.code.as_str().dimmed(),
            d.message
        );
    }

    let (errors, warnings) = count_by_severity(diagnostics);
    let summary = format!("{} error(s), {} warning(s)", errors, warnings);
    if errors > 0 {
        println!("{}", summary.red());
    } else {
        println!("{}", summary.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DiagnosticCode;

    #[test]
    fn test_counts() {
        let diags = vec![
            Diagnostic::new("a.c", 1, Severity::Error, DiagnosticCode::ArrayBounds, "x"),
            Diagnostic::new("a.c", 2, Severity::Warning, DiagnosticCode::DeadImport, "y"),
            Diagnostic::new("a.c", 3, Severity::Warning, DiagnosticCode::UnusedExtern, "z"),
        ];
        assert_eq!(count_by_severity(&diags), (1, 2));
    }

    #[test]
    fn test_json_report_shape() {
        let diags = vec![Diagnostic::new(
            "a.c",
            1,
            Severity::Error,
            DiagnosticCode::FormatString,
            "Format string in 'printf' has 2 specifiers, 1 argument",
        )];
        let (errors, warnings) = count_by_severity(&diags);
        let report = JsonReport {
            file: "a.c",
            diagnostics: &diags,
            errors,
            warnings,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"], 1);
        assert_eq!(json["diagnostics"][0]["code"], "SNIPE_FORMAT_STRING");
        assert_eq!(json["diagnostics"][0]["severity"], "ERROR");
    }
}
