//! Language-specific analyzer implementations.

mod c;
mod python;

pub use c::CAnalyzer;
pub use python::PythonAnalyzer;

use once_cell::sync::OnceCell;

use super::{Language, LanguageAnalyzer};

static C_ANALYZER: OnceCell<CAnalyzer> = OnceCell::new();
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Get the analyzer for a file extension (without the dot).
///
/// Returns None for unsupported extensions.
pub fn analyzer_for_extension(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    match ext {
        "c" | "h" => Some(C_ANALYZER.get_or_init(CAnalyzer::new) as &dyn LanguageAnalyzer),
        "py" => Some(PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new) as &dyn LanguageAnalyzer),
        _ => None,
    }
}

/// Get the analyzer for a language tag.
pub fn analyzer_for_language(language: Language) -> &'static dyn LanguageAnalyzer {
    match language {
        Language::C => C_ANALYZER.get_or_init(CAnalyzer::new) as &dyn LanguageAnalyzer,
        Language::Python => {
            PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new) as &dyn LanguageAnalyzer
        }
    }
}

/// Get the analyzer for a file path, keyed by its extension.
pub fn analyzer_for_path(path: &str) -> Option<&'static dyn LanguageAnalyzer> {
    Language::from_path(path).map(analyzer_for_language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(analyzer_for_extension("c").is_some());
        assert!(analyzer_for_extension("h").is_some());
        assert!(analyzer_for_extension("py").is_some());
        assert!(analyzer_for_extension("rs").is_none());

        assert_eq!(
            analyzer_for_path("dir/main.c").map(|a| a.language()),
            Some(Language::C)
        );
        assert_eq!(
            analyzer_for_path("app.py").map(|a| a.language()),
            Some(Language::Python)
        );
        assert!(analyzer_for_path("notes.txt").is_none());
    }
}
