//! Fact structures extracted from parsed source files.
//!
//! A file's facts are two flat lists: the symbols it declares and the
//! references it makes. Both carry just enough local context for the rule
//! engine to join them against the repository graph; neither holds pointers
//! into the other.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language of a file. Every repo lookup is keyed by language;
/// a C reference never resolves against a Python symbol and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Python,
}

impl Language {
    /// Determine the language from a file path extension.
    /// Returns None for unsupported files.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        Self::from_extension(&ext)
    }

    /// Determine the language from a bare extension (no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(Language::C),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Function,
    Array,
    Struct,
    Class,
    Extern,
    Import,
    Parameter,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Array => "array",
            SymbolKind::Struct => "struct",
            SymbolKind::Class => "class",
            SymbolKind::Extern => "extern",
            SymbolKind::Import => "import",
            SymbolKind::Parameter => "parameter",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Annotation (Python) or declared type (C), when present.
    pub annotated_type: Option<String>,
    pub has_default: bool,
}

/// An ordered struct member with its declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    pub ty: String,
}

/// A declared symbol. Identity is `(language, file, line, name)`.
///
/// Kind-dependent fields default to empty/None: `params`, `varargs`,
/// `kwargs` and `return_type` are only meaningful for functions, `members`
/// for structs, `imported_names` for imports, `array_size` for arrays and
/// array-shaped externs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Language-native textual type, e.g. `"int"`, `"char"`, `"list[int]"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// True when `declared_type` comes from an explicit declaration or
    /// annotation rather than literal inference. Cross-file annotation
    /// drift only considers annotated symbols.
    #[serde(default)]
    pub annotated: bool,
    pub file: String,
    pub line: usize,
    /// Empty string = module scope, otherwise the dotted enclosing-function
    /// path (e.g. `"outer.inner"`).
    #[serde(default)]
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub kwargs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<StructMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imported_names: Vec<String>,
    /// How many references in the declaring file use this symbol's name.
    /// Populated when the file's facts are finalized.
    #[serde(default)]
    pub references_in_file: usize,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type: None,
            annotated: false,
            file: file.into(),
            line,
            scope: String::new(),
            array_size: None,
            params: Vec::new(),
            varargs: false,
            kwargs: false,
            return_type: None,
            members: Vec::new(),
            imported_names: Vec::new(),
            references_in_file: 0,
        }
    }

    /// Set an explicitly declared/annotated type.
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.declared_type = Some(ty.into());
        self.annotated = true;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_array_size(mut self, size: i64) -> Self {
        self.array_size = Some(size);
        self
    }

    /// True for symbols declared at module scope.
    pub fn is_module_scope(&self) -> bool {
        self.scope.is_empty()
    }

    /// Minimum and maximum accepted positional argument counts for a
    /// function symbol. `None` as maximum means unbounded (variadic).
    pub fn arg_bounds(&self) -> (usize, Option<usize>) {
        let min = self.params.iter().filter(|p| !p.has_default).count();
        let max = if self.varargs || self.kwargs {
            None
        } else {
            Some(self.params.len())
        };
        (min, max)
    }
}

/// How a name is used at a reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Call,
    Read,
    /// Python annotated assignment (`x: int = expr`).
    Write,
    ArrayAccess,
    /// C element assignment (`arr[i] = expr`).
    ArrayWrite,
    /// C `recv.member` / `recv->member`.
    MemberAccess,
    /// printf-family call with a literal format string.
    FormatCall,
    /// Python `return expr` inside a function with a return annotation.
    Return,
}

/// Shallow type evidence for an expression: a literal-driven apparent type,
/// an identifier to resolve against the buffer scope then the repo, or
/// neither (unknown, which suppresses the dependent check).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueHint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apparent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
}

impl ValueHint {
    pub fn literal(ty: impl Into<String>) -> Self {
        Self {
            apparent: Some(ty.into()),
            ident: None,
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            apparent: None,
            ident: Some(name.into()),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.apparent.is_none() && self.ident.is_none()
    }
}

/// A use of a name at a source location. Context fields are populated per
/// `kind`; everything else stays at its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub kind: RefKind,
    pub line: usize,
    /// Literal subscript value (ArrayAccess / ArrayWrite).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Positional argument count (Call).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_count: Option<usize>,
    /// Positional argument type evidence, one entry per argument (Call).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ValueHint>,
    /// RHS evidence (Write / ArrayWrite / Return).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhs: Option<ValueHint>,
    /// Declared annotation on the target (Write).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// Declared return annotation of the enclosing function (Return).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_return: Option<String>,
    /// Accessed member name (MemberAccess).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// The format-string literal, quotes stripped (FormatCall).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_literal: Option<String>,
    /// Argument count after the format string (FormatCall).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_args: Option<usize>,
}

impl Reference {
    pub fn new(name: impl Into<String>, kind: RefKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            index: None,
            arg_count: None,
            args: Vec::new(),
            rhs: None,
            annotation: None,
            declared_return: None,
            member: None,
            format_literal: None,
            format_args: None,
        }
    }
}

/// All facts extracted from a single file or buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFacts {
    pub path: String,
    pub language: Language,
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    /// Set when the file contains `from X import *`.
    #[serde(default)]
    pub star_import: bool,
    #[serde(default)]
    pub has_parse_errors: bool,
}

impl FileFacts {
    pub fn empty(path: &str, language: Language) -> Self {
        Self {
            path: path.to_string(),
            language,
            symbols: Vec::new(),
            references: Vec::new(),
            star_import: false,
            has_parse_errors: false,
        }
    }

    /// Fill per-symbol reference counts from the reference list.
    /// Called once by the adapters after extraction.
    pub fn finalize(&mut self) {
        for sym in &mut self.symbols {
            sym.references_in_file = self
                .references
                .iter()
                .filter(|r| r.name == sym.name)
                .count();
        }
        self.star_import = self
            .symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Import && s.imported_names.iter().any(|n| n == "*"));
    }

    /// Find the first declaration of a name in this file.
    pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("src/main.c"), Some(Language::C));
        assert_eq!(Language::from_path("include/util.h"), Some(Language::C));
        assert_eq!(Language::from_path("app.py"), Some(Language::Python));
        assert_eq!(Language::from_path("README.md"), None);
        assert_eq!(Language::from_path("Makefile"), None);
    }

    #[test]
    fn test_arg_bounds() {
        let mut f = Symbol::new("greet", SymbolKind::Function, "u.py", 1);
        f.params = vec![
            Param {
                name: "name".into(),
                annotated_type: Some("str".into()),
                has_default: false,
            },
            Param {
                name: "greeting".into(),
                annotated_type: Some("str".into()),
                has_default: true,
            },
        ];
        assert_eq!(f.arg_bounds(), (1, Some(2)));

        f.varargs = true;
        assert_eq!(f.arg_bounds(), (1, None));
    }

    #[test]
    fn test_finalize_counts_references_and_star_import() {
        let mut facts = FileFacts::empty("a.py", Language::Python);
        facts
            .symbols
            .push(Symbol::new("x", SymbolKind::Variable, "a.py", 1));
        let mut imp = Symbol::new("os", SymbolKind::Import, "a.py", 2);
        imp.imported_names = vec!["*".to_string()];
        facts.symbols.push(imp);
        facts.references.push(Reference::new("x", RefKind::Read, 3));
        facts.references.push(Reference::new("x", RefKind::Read, 4));

        facts.finalize();
        assert_eq!(facts.symbols[0].references_in_file, 2);
        assert!(facts.star_import);
    }
}
