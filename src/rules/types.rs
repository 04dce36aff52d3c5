//! Diagnostic types shared by every rule.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic. ERROR is a defect, WARNING a likely problem,
/// INFO advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "WARNING" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Stable diagnostic codes, the closed set consumers key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    #[serde(rename = "SNIPE_TYPE_MISMATCH")]
    TypeMismatch,
    #[serde(rename = "SNIPE_ARRAY_BOUNDS")]
    ArrayBounds,
    #[serde(rename = "SNIPE_SIGNATURE_DRIFT")]
    SignatureDrift,
    #[serde(rename = "SNIPE_UNDEFINED_SYMBOL")]
    UndefinedSymbol,
    #[serde(rename = "SNIPE_SHADOWED_SYMBOL")]
    ShadowedSymbol,
    #[serde(rename = "SNIPE_FORMAT_STRING")]
    FormatString,
    #[serde(rename = "SNIPE_UNUSED_EXTERN")]
    UnusedExtern,
    #[serde(rename = "SNIPE_DEAD_IMPORT")]
    DeadImport,
    #[serde(rename = "SNIPE_UNSAFE_FUNCTION")]
    UnsafeFunction,
    #[serde(rename = "SNIPE_ARG_TYPE_MISMATCH")]
    ArgTypeMismatch,
    #[serde(rename = "SNIPE_STRUCT_ACCESS")]
    StructAccess,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::TypeMismatch => "SNIPE_TYPE_MISMATCH",
            DiagnosticCode::ArrayBounds => "SNIPE_ARRAY_BOUNDS",
            DiagnosticCode::SignatureDrift => "SNIPE_SIGNATURE_DRIFT",
            DiagnosticCode::UndefinedSymbol => "SNIPE_UNDEFINED_SYMBOL",
            DiagnosticCode::ShadowedSymbol => "SNIPE_SHADOWED_SYMBOL",
            DiagnosticCode::FormatString => "SNIPE_FORMAT_STRING",
            DiagnosticCode::UnusedExtern => "SNIPE_UNUSED_EXTERN",
            DiagnosticCode::DeadImport => "SNIPE_DEAD_IMPORT",
            DiagnosticCode::UnsafeFunction => "SNIPE_UNSAFE_FUNCTION",
            DiagnosticCode::ArgTypeMismatch => "SNIPE_ARG_TYPE_MISMATCH",
            DiagnosticCode::StructAccess => "SNIPE_STRUCT_ACCESS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SNIPE_TYPE_MISMATCH" => Some(DiagnosticCode::TypeMismatch),
            "SNIPE_ARRAY_BOUNDS" => Some(DiagnosticCode::ArrayBounds),
            "SNIPE_SIGNATURE_DRIFT" => Some(DiagnosticCode::SignatureDrift),
            "SNIPE_UNDEFINED_SYMBOL" => Some(DiagnosticCode::UndefinedSymbol),
            "SNIPE_SHADOWED_SYMBOL" => Some(DiagnosticCode::ShadowedSymbol),
            "SNIPE_FORMAT_STRING" => Some(DiagnosticCode::FormatString),
            "SNIPE_UNUSED_EXTERN" => Some(DiagnosticCode::UnusedExtern),
            "SNIPE_DEAD_IMPORT" => Some(DiagnosticCode::DeadImport),
            "SNIPE_UNSAFE_FUNCTION" => Some(DiagnosticCode::UnsafeFunction),
            "SNIPE_ARG_TYPE_MISMATCH" => Some(DiagnosticCode::ArgTypeMismatch),
            "SNIPE_STRUCT_ACCESS" => Some(DiagnosticCode::StructAccess),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        line: usize,
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            severity,
            code,
            message: message.into(),
        }
    }

    /// Dedup key: two diagnostics are the same finding when file, line,
    /// code, and message all match.
    pub fn key(&self) -> (String, usize, DiagnosticCode, String) {
        (
            self.file.clone(),
            self.line,
            self.code,
            self.message.clone(),
        )
    }
}

/// Drop duplicate findings, preserving first-seen order.
pub fn dedup_diagnostics(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = std::collections::HashSet::new();
    diagnostics
        .into_iter()
        .filter(|d| seen.insert(d.key()))
        .collect()
}
