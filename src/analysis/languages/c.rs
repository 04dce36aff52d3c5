//! C language analyzer using tree-sitter.
//!
//! Covers `.c` and `.h`. Symbols come from declarations (including extern
//! storage), function definitions and prototypes, and struct definitions
//! with ordered members. References come from call sites, subscript
//! expressions, element assignments, and member accesses, plus a regex
//! supplement for `ident[lit]` accesses the grammar drops while a statement
//! is being typed. The supplement only ever adds references, never symbols.

use std::path::Path;

use lazy_static::lazy_static;
use regex::bytes::Regex;
use tree_sitter::{Language as TsLanguage, Node, Parser};

use crate::analysis::{
    FileFacts, Language, LanguageAnalyzer, Param, ParsedFile, RefKind, Reference, StructMember,
    Symbol, SymbolKind, ValueHint,
};

/// printf-family callees and the 1-based position of their format string.
/// Arguments after that position are the format arguments.
const PRINTF_FORMAT_ARG: &[(&str, usize)] = &[
    ("printf", 1),
    ("scanf", 1),
    ("fprintf", 2),
    ("fscanf", 2),
    ("sprintf", 2),
    ("sscanf", 2),
    ("snprintf", 3),
];

/// 1-based format-string position for a printf-family callee.
pub fn format_arg_index(callee: &str) -> Option<usize> {
    PRINTF_FORMAT_ARG
        .iter()
        .find(|(name, _)| *name == callee)
        .map(|(_, idx)| *idx)
}

/// C language analyzer.
pub struct CAnalyzer {
    language: TsLanguage,
}

impl CAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    // ---- symbols ----------------------------------------------------------

    fn extract_symbols(&self, parsed: &ParsedFile) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        self.walk_symbols(parsed, parsed.tree.root_node(), &mut symbols);
        supplement_array_sizes(parsed, &mut symbols);
        symbols
    }

    fn walk_symbols(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Symbol>) {
        match node.kind() {
            "function_definition" => self.collect_function(parsed, node, false, out),
            "declaration" => self.collect_declaration(parsed, node, out),
            "struct_specifier" => self.collect_struct(parsed, node, out),
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_symbols(parsed, child, out);
        }
    }

    /// Function definition or prototype. `is_extern` marks prototypes under
    /// an `extern` declaration.
    fn collect_function(
        &self,
        parsed: &ParsedFile,
        node: Node,
        is_extern: bool,
        out: &mut Vec<Symbol>,
    ) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some(func_decl) = unwrap_to_kind(declarator, "function_declarator") else {
            return;
        };
        let Some(name_node) = func_decl
            .child_by_field_name("declarator")
            .and_then(|d| unwrap_to_kind(d, "identifier"))
        else {
            return;
        };
        let name = parsed.node_text(name_node).to_string();

        let mut params = Vec::new();
        let mut varargs = false;
        if let Some(param_list) = func_decl.child_by_field_name("parameters") {
            let mut cursor = param_list.walk();
            for child in param_list.children(&mut cursor) {
                match child.kind() {
                    "parameter_declaration" => {
                        let pname = child
                            .child_by_field_name("declarator")
                            .and_then(|d| unwrap_to_kind(d, "identifier"))
                            .map(|n| parsed.node_text(n).to_string());
                        // `void` as the sole parameter declares zero params
                        let ptype = declaration_type_text(parsed, child);
                        if pname.is_none() && ptype == "void" {
                            continue;
                        }
                        params.push(Param {
                            name: pname.unwrap_or_default(),
                            annotated_type: Some(ptype),
                            has_default: false,
                        });
                    }
                    "variadic_parameter" => varargs = true,
                    _ => {}
                }
            }
        }

        let kind = if is_extern {
            SymbolKind::Extern
        } else {
            SymbolKind::Function
        };
        let return_type = declaration_type_text(parsed, node);
        let mut sym = Symbol::new(name, kind, parsed.path.clone(), parsed.line_of(node))
            .with_type(return_type.clone());
        sym.params = params;
        sym.varargs = varargs;
        sym.return_type = Some(return_type);
        out.push(sym);
    }

    /// Variable/array declarations, one symbol per declarator. Prototypes
    /// inside declarations route through `collect_function`.
    fn collect_declaration(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Symbol>) {
        let is_extern = {
            let mut cursor = node.walk();
            let result = node.children(&mut cursor).any(|c| {
                c.kind() == "storage_class_specifier" && parsed.node_text(c) == "extern"
            });
            result
        };
        let type_text = declaration_type_text(parsed, node);

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            // `int add(int a, int b);` is a prototype, not a variable
            if unwrap_to_kind(declarator, "function_declarator").is_some() {
                self.collect_function(parsed, node, is_extern, out);
                continue;
            }

            let inner = if declarator.kind() == "init_declarator" {
                declarator
                    .child_by_field_name("declarator")
                    .unwrap_or(declarator)
            } else {
                declarator
            };
            let Some(name_node) = unwrap_to_kind(inner, "identifier") else {
                continue;
            };
            let name = parsed.node_text(name_node).to_string();
            let array_size = array_size_of(parsed, inner);
            let pointer = unwrap_to_kind(inner, "pointer_declarator").is_some();

            let kind = match (is_extern, array_size) {
                (true, _) => SymbolKind::Extern,
                (false, Some(_)) => SymbolKind::Array,
                (false, None) => SymbolKind::Variable,
            };
            let ty = if pointer {
                format!("{}*", type_text)
            } else {
                type_text.clone()
            };
            let mut sym = Symbol::new(name, kind, parsed.path.clone(), parsed.line_of(node))
                .with_type(ty);
            sym.array_size = array_size;
            out.push(sym);
        }
    }

    /// Struct definitions with ordered members. A `struct_specifier` without
    /// a body is a type use, not a definition.
    fn collect_struct(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Symbol>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let name = parsed.node_text(name_node).to_string();

        let mut members = Vec::new();
        let mut cursor = body.walk();
        for field in body.children(&mut cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let field_type = declaration_type_text(parsed, field);
            let mut fc = field.walk();
            for decl in field.children_by_field_name("declarator", &mut fc) {
                let mname = if decl.kind() == "field_identifier" {
                    Some(parsed.node_text(decl).to_string())
                } else {
                    find_descendant(decl, "field_identifier")
                        .map(|n| parsed.node_text(n).to_string())
                };
                if let Some(mname) = mname {
                    members.push(StructMember {
                        name: mname,
                        ty: field_type.clone(),
                    });
                }
            }
        }

        let mut sym = Symbol::new(name, SymbolKind::Struct, parsed.path.clone(), parsed.line_of(node))
            .with_type("struct");
        sym.members = members;
        out.push(sym);
    }

    // ---- references -------------------------------------------------------

    fn extract_references(&self, parsed: &ParsedFile) -> Vec<Reference> {
        let mut refs = Vec::new();
        self.walk_references(parsed, parsed.tree.root_node(), &mut refs);
        supplement_array_accesses(parsed, &mut refs);
        refs
    }

    fn walk_references(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        match node.kind() {
            "call_expression" => self.collect_call(parsed, node, out),
            "subscript_expression" => {
                if let Some((name, index, line)) = subscript_parts(parsed, node) {
                    let mut r = Reference::new(name, RefKind::ArrayAccess, line);
                    r.index = index;
                    out.push(r);
                }
            }
            "assignment_expression" => self.collect_element_write(parsed, node, out),
            "field_expression" => self.collect_member_access(parsed, node, out),
            "identifier" => {
                if is_expression_read(node) {
                    out.push(Reference::new(
                        parsed.node_text(node),
                        RefKind::Read,
                        parsed.line_of(node),
                    ));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_references(parsed, child, out);
        }
    }

    fn collect_call(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        let Some(fn_node) = node.child_by_field_name("function") else {
            return;
        };
        if fn_node.kind() != "identifier" {
            return;
        }
        let name = parsed.node_text(fn_node).to_string();
        let line = parsed.line_of(node);

        let mut arg_nodes = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for child in args.children(&mut cursor) {
                if child.is_named() && child.kind() != "comment" {
                    arg_nodes.push(child);
                }
            }
        }

        let mut call = Reference::new(name.clone(), RefKind::Call, line);
        call.arg_count = Some(arg_nodes.len());
        call.args = arg_nodes.iter().map(|n| c_value_hint(parsed, *n)).collect();
        out.push(call);

        // printf-family call with a literal format string
        if let Some(fmt_pos) = format_arg_index(&name) {
            if let Some(fmt_node) = arg_nodes.get(fmt_pos - 1) {
                if fmt_node.kind() == "string_literal" {
                    let literal = parsed.node_text(*fmt_node).trim_matches('"').to_string();
                    let mut fc = Reference::new(name, RefKind::FormatCall, line);
                    fc.format_literal = Some(literal);
                    fc.format_args = Some(arg_nodes.len().saturating_sub(fmt_pos));
                    out.push(fc);
                }
            }
        }
    }

    /// `arr[i] = expr` element writes, for the array-write type check.
    fn collect_element_write(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        if left.kind() != "subscript_expression" {
            return;
        }
        let Some((name, index, _)) = subscript_parts(parsed, left) else {
            return;
        };
        let mut r = Reference::new(name, RefKind::ArrayWrite, parsed.line_of(node));
        r.index = index;
        r.rhs = Some(c_value_hint(parsed, right));
        out.push(r);
    }

    fn collect_member_access(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        let (Some(arg), Some(field)) = (
            node.child_by_field_name("argument"),
            node.child_by_field_name("field"),
        ) else {
            return;
        };
        if arg.kind() != "identifier" {
            return;
        }
        let mut r = Reference::new(
            parsed.node_text(arg),
            RefKind::MemberAccess,
            parsed.line_of(node),
        );
        r.member = Some(parsed.node_text(field).to_string());
        out.push(r);
    }
}

impl Default for CAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for CAnalyzer {
    fn language(&self) -> Language {
        Language::C
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["c", "h"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let mut facts = FileFacts::empty(&parsed.path, Language::C);
        facts.symbols = self.extract_symbols(parsed);
        facts.references = self.extract_references(parsed);
        facts.has_parse_errors = parsed.tree.root_node().has_error();
        facts.finalize();
        Ok(facts)
    }
}

// ---- node helpers ---------------------------------------------------------

/// Unwrap declarator nesting (pointer/array/init/parenthesized) until a node
/// of the wanted kind is found.
fn unwrap_to_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    if node.kind() == kind {
        return Some(node);
    }
    match node.kind() {
        "pointer_declarator" | "array_declarator" | "init_declarator"
        | "parenthesized_declarator" | "attributed_declarator" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(found) = unwrap_to_kind(child, kind) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

fn find_descendant<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_descendant(child, kind) {
            return Some(found);
        }
    }
    None
}

/// Textual type of a declaration-like node: primitive/sized/typedef'd type
/// specifiers joined, struct uses rendered as `struct Name`.
fn declaration_type_text(parsed: &ParsedFile, node: Node) -> String {
    let mut parts = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "primitive_type" | "sized_type_specifier" | "type_identifier" => {
                parts.push(parsed.node_text(child).trim().to_string());
            }
            "struct_specifier" => {
                if let Some(name) = child.child_by_field_name("name") {
                    parts.push(format!("struct {}", parsed.node_text(name).trim()));
                }
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        "int".to_string()
    } else {
        parts.join(" ")
    }
}

/// Literal array size from a declarator, descending nested declarators.
fn array_size_of(parsed: &ParsedFile, node: Node) -> Option<i64> {
    if node.kind() == "array_declarator" {
        if let Some(size) = node.child_by_field_name("size") {
            if let Some(v) = parse_int_literal(parsed.node_text(size)) {
                return Some(v);
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "number_literal" {
                return parse_int_literal(parsed.node_text(child));
            }
        }
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(size) = array_size_of(parsed, child) {
            return Some(size);
        }
    }
    None
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let t = text.trim();
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    t.parse().ok()
}

/// `(name, literal_index, line)` for a subscript expression. Field names
/// vary across grammar versions, so fall back to positional children
/// (`array '[' index ']'`).
fn subscript_parts(parsed: &ParsedFile, node: Node) -> Option<(String, Option<i64>, usize)> {
    let mut arg = node.child_by_field_name("argument");
    let mut idx = node.child_by_field_name("index");
    if (arg.is_none() || idx.is_none()) && node.child_count() >= 4 {
        arg = node.child(0);
        idx = node.child(2);
    }
    let (arg, idx) = (arg?, idx?);
    if arg.kind() != "identifier" {
        return None;
    }
    let index = parse_int_literal(parsed.node_text(idx));
    Some((
        parsed.node_text(arg).to_string(),
        index,
        parsed.line_of(node),
    ))
}

/// Shallow apparent type of a C expression for assignment checks:
/// number literals classify as int/float, char literals as char, string
/// literals as char*, identifiers defer to symbol lookup, and compound
/// expressions take the first literal found inside (defaulting to int).
fn c_value_hint(parsed: &ParsedFile, node: Node) -> ValueHint {
    match node.kind() {
        "number_literal" => {
            let text = parsed.node_text(node).to_ascii_lowercase();
            if text.contains('.') || text.contains('e') || text.ends_with('f') {
                ValueHint::literal("float")
            } else {
                ValueHint::literal("int")
            }
        }
        "char_literal" => ValueHint::literal("char"),
        "string_literal" => ValueHint::literal("char*"),
        "identifier" => ValueHint::identifier(parsed.node_text(node)),
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                let hint = c_value_hint(parsed, child);
                if hint.apparent.is_some() {
                    return hint;
                }
            }
            if node.child_count() > 0 {
                ValueHint::literal("int")
            } else {
                ValueHint::unknown()
            }
        }
    }
}

/// True when an identifier sits in an expression position rather than a
/// declarator, parameter, or call-callee slot.
fn is_expression_read(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "declaration" | "function_declarator" | "pointer_declarator"
        | "parameter_declaration" | "preproc_def" | "preproc_function_def" => false,
        "init_declarator" => parent
            .child_by_field_name("declarator")
            .map(|d| d.id() != node.id())
            .unwrap_or(true),
        "array_declarator" => parent
            .child_by_field_name("size")
            .map(|s| s.id() == node.id())
            .unwrap_or(false),
        "call_expression" => parent
            .child_by_field_name("function")
            .map(|f| f.id() != node.id())
            .unwrap_or(true),
        _ => true,
    }
}

// ---- regex supplement -----------------------------------------------------

lazy_static! {
    static ref ARRAY_ACCESS_RE: Regex =
        Regex::new(r"([a-zA-Z_][a-zA-Z0-9_]*)\s*\[\s*(\d+)\s*\]").unwrap();
}

/// Byte ranges of comments and string/char literals, so regex matches inside
/// them can be discarded.
fn comment_and_string_ranges(source: &[u8]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let n = source.len();
    let mut i = 0;
    while i < n {
        if source[i..].starts_with(b"//") {
            let start = i;
            while i < n && source[i] != b'\n' {
                i += 1;
            }
            ranges.push((start, i));
        } else if source[i..].starts_with(b"/*") {
            let start = i;
            i += 2;
            while i + 1 < n && &source[i..i + 2] != b"*/" {
                i += 1;
            }
            i = (i + 2).min(n);
            ranges.push((start, i));
        } else if source[i] == b'"' || source[i] == b'\'' {
            let quote = source[i];
            let start = i;
            i += 1;
            while i < n {
                if source[i] == b'\\' {
                    i += 2;
                    continue;
                }
                if source[i] == quote {
                    i += 1;
                    break;
                }
                i += 1;
            }
            ranges.push((start, i));
        } else {
            i += 1;
        }
    }
    ranges
}

fn in_ranges(pos: usize, ranges: &[(usize, usize)]) -> bool {
    ranges.iter().any(|&(start, end)| start <= pos && pos < end)
}

/// `ident[10];` with nothing but whitespace before the semicolon is an array
/// size in a declarator, not an access.
fn is_declarator_position(source: &[u8], match_end: usize) -> bool {
    source[match_end..]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b';')
        .unwrap_or(false)
}

/// Regex pass for `ident[number]` accesses tree-sitter misses while a C
/// statement is incomplete. Adds `ArrayAccess` references only, deduplicated
/// against tree-derived ones on `(name, line, index)`.
fn supplement_array_accesses(parsed: &ParsedFile, refs: &mut Vec<Reference>) {
    let source = &parsed.source[..];
    let skip = comment_and_string_ranges(source);
    let mut seen: std::collections::HashSet<(String, usize, Option<i64>)> = refs
        .iter()
        .filter(|r| r.kind == RefKind::ArrayAccess)
        .map(|r| (r.name.clone(), r.line, r.index))
        .collect();

    let mut added = 0usize;
    for m in ARRAY_ACCESS_RE.captures_iter(source) {
        let whole = m.get(0).unwrap();
        if in_ranges(whole.start(), &skip) || is_declarator_position(source, whole.end()) {
            continue;
        }
        let name = String::from_utf8_lossy(&m[1]).to_string();
        let index = std::str::from_utf8(&m[2]).ok().and_then(|s| s.parse().ok());
        let line = source[..whole.start()].iter().filter(|b| **b == b'\n').count() + 1;
        if !seen.insert((name.clone(), line, index)) {
            continue;
        }
        let mut r = Reference::new(name, RefKind::ArrayAccess, line);
        r.index = index;
        refs.push(r);
        added += 1;
    }
    if added > 0 {
        tracing::debug!(path = %parsed.path, added, "array-access regex supplement");
    }
}

/// Fill array sizes the tree walk missed by re-reading the declaration line
/// (`int arr[10];` with an ERROR node in the way still carries the size in
/// the source text).
fn supplement_array_sizes(parsed: &ParsedFile, symbols: &mut [Symbol]) {
    let lines: Vec<&str> = std::str::from_utf8(&parsed.source)
        .unwrap_or("")
        .lines()
        .collect();
    for sym in symbols.iter_mut() {
        if sym.array_size.is_some() || sym.line == 0 || sym.line > lines.len() {
            continue;
        }
        if !matches!(sym.kind, SymbolKind::Variable | SymbolKind::Array | SymbolKind::Extern) {
            continue;
        }
        let line = lines[sym.line - 1];
        let pattern = format!(
            r"\b{}\s*\[\s*(\d+)\s*\]",
            regex::escape(&sym.name)
        );
        if let Ok(re) = regex::Regex::new(&pattern) {
            if let Some(caps) = re.captures(line) {
                if let Ok(size) = caps[1].parse::<i64>() {
                    sym.array_size = Some(size);
                    if sym.kind == SymbolKind::Variable {
                        sym.kind = SymbolKind::Array;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FileFacts {
        let analyzer = CAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("test.c"), source.as_bytes())
            .unwrap();
        analyzer.extract_facts(&parsed).unwrap()
    }

    #[test]
    fn test_declarations() {
        let facts = parse(
            r#"
int counter = 0;
float ratio;
char buf[16];
extern int shared;
"#,
        );
        let counter = facts.find_symbol("counter").unwrap();
        assert_eq!(counter.kind, SymbolKind::Variable);
        assert_eq!(counter.declared_type.as_deref(), Some("int"));
        assert_eq!(counter.line, 2);

        let buf = facts.find_symbol("buf").unwrap();
        assert_eq!(buf.kind, SymbolKind::Array);
        assert_eq!(buf.array_size, Some(16));
        assert_eq!(buf.declared_type.as_deref(), Some("char"));

        let shared = facts.find_symbol("shared").unwrap();
        assert_eq!(shared.kind, SymbolKind::Extern);
    }

    #[test]
    fn test_function_definition_params() {
        let facts = parse(
            r#"
int add(int a, int b) { return a + b; }
void log_all(const char *fmt, ...) { }
int nothing(void) { return 0; }
"#,
        );
        let add = facts.find_symbol("add").unwrap();
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params[0].name, "a");
        assert!(!add.varargs);

        let log_all = facts.find_symbol("log_all").unwrap();
        assert!(log_all.varargs);
        assert_eq!(log_all.params.len(), 1);

        let nothing = facts.find_symbol("nothing").unwrap();
        assert!(nothing.params.is_empty());
    }

    #[test]
    fn test_struct_members_ordered() {
        let facts = parse(
            r#"
struct Point {
    int x;
    int y;
    float weight;
};
struct Empty {};
"#,
        );
        let point = facts.find_symbol("Point").unwrap();
        assert_eq!(point.kind, SymbolKind::Struct);
        let names: Vec<_> = point.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "weight"]);
        assert_eq!(point.members[2].ty, "float");

        let empty = facts.find_symbol("Empty").unwrap();
        assert!(empty.members.is_empty());
    }

    #[test]
    fn test_call_and_format_references() {
        let facts = parse(
            r#"
void f(void) {
    printf("%d %s\n", 42, name);
    helper(1, 2, 3);
}
"#,
        );
        let call = facts
            .references
            .iter()
            .find(|r| r.name == "helper" && r.kind == RefKind::Call)
            .unwrap();
        assert_eq!(call.arg_count, Some(3));

        let fmt = facts
            .references
            .iter()
            .find(|r| r.kind == RefKind::FormatCall)
            .unwrap();
        assert_eq!(fmt.name, "printf");
        assert_eq!(fmt.format_literal.as_deref(), Some("%d %s\\n"));
        assert_eq!(fmt.format_args, Some(2));
    }

    #[test]
    fn test_subscripts_and_element_writes() {
        let facts = parse(
            r#"
void f(void) {
    int x = arr[12];
    buf[3] = 65;
}
"#,
        );
        let access = facts
            .references
            .iter()
            .find(|r| r.name == "arr" && r.kind == RefKind::ArrayAccess)
            .unwrap();
        assert_eq!(access.index, Some(12));

        let write = facts
            .references
            .iter()
            .find(|r| r.name == "buf" && r.kind == RefKind::ArrayWrite)
            .unwrap();
        assert_eq!(write.index, Some(3));
        assert_eq!(
            write.rhs.as_ref().and_then(|h| h.apparent.as_deref()),
            Some("int")
        );
    }

    #[test]
    fn test_member_access() {
        let facts = parse(
            r#"
void f(void) {
    int a = p.x;
    int b = q->radius;
}
"#,
        );
        let dot = facts
            .references
            .iter()
            .find(|r| r.name == "p" && r.kind == RefKind::MemberAccess)
            .unwrap();
        assert_eq!(dot.member.as_deref(), Some("x"));

        let arrow = facts
            .references
            .iter()
            .find(|r| r.name == "q" && r.kind == RefKind::MemberAccess)
            .unwrap();
        assert_eq!(arrow.member.as_deref(), Some("radius"));
    }

    #[test]
    fn test_regex_supplement_skips_comments_and_declarators() {
        // Incomplete statement: the grammar may or may not see the access,
        // the supplement guarantees it either way.
        let facts = parse("int x = arr[12]\n// note[3]\nint sizes[10];\n");
        let accesses: Vec<_> = facts
            .references
            .iter()
            .filter(|r| r.kind == RefKind::ArrayAccess)
            .collect();
        assert!(accesses.iter().any(|r| r.name == "arr" && r.index == Some(12)));
        // comment match skipped
        assert!(!accesses.iter().any(|r| r.name == "note"));
        // declarator position skipped
        assert!(!accesses.iter().any(|r| r.name == "sizes"));
    }

    #[test]
    fn test_expression_reads() {
        let facts = parse(
            r#"
int total = base + offset;
"#,
        );
        let names: Vec<_> = facts
            .references
            .iter()
            .filter(|r| r.kind == RefKind::Read)
            .map(|r| r.name.as_str())
            .collect();
        assert!(names.contains(&"base"));
        assert!(names.contains(&"offset"));
        assert!(!names.contains(&"total"));
    }

    #[test]
    fn test_incomplete_buffer_still_yields_facts() {
        let facts = parse("int arr[10];\nint broken( {\n");
        assert!(facts.has_parse_errors);
        let arr = facts.find_symbol("arr").unwrap();
        assert_eq!(arr.array_size, Some(10));
    }
}
