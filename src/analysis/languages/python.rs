//! Python language analyzer using tree-sitter.
//!
//! Symbols come from function definitions (with full parameter detail),
//! class definitions, assignments (scope-tagged so function-local targets
//! exist for shadow checking), list/tuple literals bound to a name, and
//! imports. References come from call sites, subscripts, annotated
//! assignments, returns inside annotated functions, and bare identifier
//! reads.

use std::path::Path;

use tree_sitter::{Language as TsLanguage, Node, Parser};

use crate::analysis::{
    FileFacts, Language, LanguageAnalyzer, Param, ParsedFile, RefKind, Reference, Symbol,
    SymbolKind, ValueHint,
};

/// Python language analyzer.
pub struct PythonAnalyzer {
    language: TsLanguage,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    // ---- symbols ----------------------------------------------------------

    fn walk_symbols(&self, parsed: &ParsedFile, node: Node, scope: &str, out: &mut Vec<Symbol>) {
        match node.kind() {
            "function_definition" => {
                if let Some(sym) = self.collect_function(parsed, node, scope) {
                    let inner = join_scope(scope, &sym.name);
                    // parameters are symbols too, scoped to the function,
                    // so body uses of them resolve as defined names
                    for p in &sym.params {
                        if p.name.is_empty() {
                            continue;
                        }
                        let mut psym = Symbol::new(
                            p.name.clone(),
                            SymbolKind::Parameter,
                            parsed.path.clone(),
                            sym.line,
                        )
                        .with_scope(&inner);
                        if let Some(ty) = &p.annotated_type {
                            psym = psym.with_type(ty.clone());
                        }
                        out.push(psym);
                    }
                    out.push(sym);
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        self.walk_symbols(parsed, child, &inner, out);
                    }
                }
                return;
            }
            "class_definition" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = parsed.node_text(name_node).to_string();
                    out.push(
                        Symbol::new(
                            name.clone(),
                            SymbolKind::Class,
                            parsed.path.clone(),
                            parsed.line_of(node),
                        )
                        .with_scope(scope),
                    );
                    let inner = join_scope(scope, &name);
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        self.walk_symbols(parsed, child, &inner, out);
                    }
                }
                return;
            }
            "assignment" => self.collect_assignment(parsed, node, scope, out),
            "import_statement" => self.collect_import(parsed, node, out),
            "import_from_statement" => self.collect_from_import(parsed, node, out),
            // loop / with / comprehension bindings, so their targets are
            // never reported undefined
            "for_statement" | "for_in_clause" => {
                if let Some(left) = node.child_by_field_name("left") {
                    collect_binding_targets(parsed, left, scope, out);
                }
            }
            "as_pattern_target" => collect_binding_targets(parsed, node, scope, out),
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_symbols(parsed, child, scope, out);
        }
    }

    fn collect_function(&self, parsed: &ParsedFile, node: Node, scope: &str) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        let name = parsed.node_text(name_node).to_string();

        let mut params = Vec::new();
        let mut varargs = false;
        let mut kwargs = false;
        if let Some(param_list) = node.child_by_field_name("parameters") {
            let mut cursor = param_list.walk();
            for child in param_list.children(&mut cursor) {
                match child.kind() {
                    "identifier" => {
                        let pname = parsed.node_text(child).to_string();
                        if pname == "self" || pname == "cls" {
                            continue;
                        }
                        params.push(Param {
                            name: pname,
                            annotated_type: None,
                            has_default: false,
                        });
                    }
                    "typed_parameter" => {
                        let pname = first_identifier_text(parsed, child);
                        if matches!(pname.as_deref(), Some("self") | Some("cls")) {
                            continue;
                        }
                        let ptype = child
                            .child_by_field_name("type")
                            .map(|t| annotation_text(parsed, t));
                        params.push(Param {
                            name: pname.unwrap_or_default(),
                            annotated_type: ptype,
                            has_default: false,
                        });
                    }
                    "default_parameter" => {
                        let pname = child
                            .child_by_field_name("name")
                            .map(|n| parsed.node_text(n).to_string())
                            .or_else(|| first_identifier_text(parsed, child));
                        if matches!(pname.as_deref(), Some("self") | Some("cls")) {
                            continue;
                        }
                        params.push(Param {
                            name: pname.unwrap_or_default(),
                            annotated_type: None,
                            has_default: true,
                        });
                    }
                    "typed_default_parameter" => {
                        let pname = child
                            .child_by_field_name("name")
                            .map(|n| parsed.node_text(n).to_string())
                            .or_else(|| first_identifier_text(parsed, child));
                        if matches!(pname.as_deref(), Some("self") | Some("cls")) {
                            continue;
                        }
                        let ptype = child
                            .child_by_field_name("type")
                            .map(|t| annotation_text(parsed, t));
                        params.push(Param {
                            name: pname.unwrap_or_default(),
                            annotated_type: ptype,
                            has_default: true,
                        });
                    }
                    "list_splat_pattern" => varargs = true,
                    "dictionary_splat_pattern" => kwargs = true,
                    _ => {}
                }
            }
        }

        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| annotation_text(parsed, t));

        let mut sym = Symbol::new(
            name,
            SymbolKind::Function,
            parsed.path.clone(),
            parsed.line_of(node),
        )
        .with_scope(scope);
        if let Some(ref rt) = return_type {
            sym.declared_type = Some(rt.clone());
            sym.annotated = true;
        }
        sym.params = params;
        sym.varargs = varargs;
        sym.kwargs = kwargs;
        sym.return_type = return_type;
        Some(sym)
    }

    fn collect_assignment(&self, parsed: &ParsedFile, node: Node, scope: &str, out: &mut Vec<Symbol>) {
        let rhs = node.child_by_field_name("right");
        let annotation = node
            .child_by_field_name("type")
            .map(|t| annotation_text(parsed, t));
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };

        match left.kind() {
            "identifier" => {
                let name = parsed.node_text(left).to_string();
                if name.is_empty() || name.starts_with('_') {
                    return;
                }
                let mut declared = annotation.clone();
                let annotated = declared.is_some();
                let mut array_size = None;
                let mut kind = SymbolKind::Variable;
                if let Some(rhs) = rhs {
                    if declared.is_none() {
                        declared = literal_type(rhs.kind()).map(|t| t.to_string());
                    }
                    if matches!(rhs.kind(), "list" | "tuple") {
                        array_size = Some(count_elements(rhs));
                        kind = SymbolKind::Array;
                    }
                }
                let mut sym = Symbol::new(name, kind, parsed.path.clone(), parsed.line_of(node))
                    .with_scope(scope);
                sym.declared_type = declared;
                sym.annotated = annotated;
                sym.array_size = array_size;
                out.push(sym);
            }
            "pattern_list" | "tuple_pattern" => {
                let mut cursor = left.walk();
                for target in left.children(&mut cursor) {
                    if target.kind() != "identifier" {
                        continue;
                    }
                    let name = parsed.node_text(target).to_string();
                    if name.is_empty() || name.starts_with('_') {
                        continue;
                    }
                    out.push(
                        Symbol::new(
                            name,
                            SymbolKind::Variable,
                            parsed.path.clone(),
                            parsed.line_of(node),
                        )
                        .with_scope(scope),
                    );
                }
            }
            _ => {}
        }
    }

    /// `import os, json as j` emits one import symbol per module, carrying the
    /// name it binds.
    fn collect_import(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Symbol>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    let bound = parsed
                        .node_text(child)
                        .split('.')
                        .next()
                        .unwrap_or("")
                        .to_string();
                    if bound.is_empty() {
                        continue;
                    }
                    let mut sym = Symbol::new(
                        bound.clone(),
                        SymbolKind::Import,
                        parsed.path.clone(),
                        parsed.line_of(node),
                    );
                    sym.imported_names = vec![bound];
                    out.push(sym);
                }
                "aliased_import" => {
                    let Some(alias) = child.child_by_field_name("alias") else {
                        continue;
                    };
                    let bound = parsed.node_text(alias).to_string();
                    let mut sym = Symbol::new(
                        bound.clone(),
                        SymbolKind::Import,
                        parsed.path.clone(),
                        parsed.line_of(node),
                    );
                    sym.imported_names = vec![bound];
                    out.push(sym);
                }
                _ => {}
            }
        }
    }

    /// `from os import path, getcwd as gc` / `from os import *` emits one import
    /// symbol per statement, carrying every bound name (`*` for star).
    fn collect_from_import(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Symbol>) {
        let module = node
            .child_by_field_name("module_name")
            .map(|m| parsed.node_text(m).to_string())
            .unwrap_or_default();

        let mut names = Vec::new();
        let mut cursor = node.walk();
        let mut past_import_kw = false;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import" => past_import_kw = true,
                "wildcard_import" => names.push("*".to_string()),
                "dotted_name" if past_import_kw => {
                    names.push(parsed.node_text(child).to_string());
                }
                "aliased_import" if past_import_kw => {
                    if let Some(alias) = child.child_by_field_name("alias") {
                        names.push(parsed.node_text(alias).to_string());
                    }
                }
                _ => {}
            }
        }
        if names.is_empty() {
            return;
        }

        let mut sym = Symbol::new(
            module,
            SymbolKind::Import,
            parsed.path.clone(),
            parsed.line_of(node),
        );
        sym.imported_names = names;
        out.push(sym);
    }

    // ---- references -------------------------------------------------------

    fn walk_references(
        &self,
        parsed: &ParsedFile,
        node: Node,
        enclosing: Option<&EnclosingFn>,
        out: &mut Vec<Reference>,
    ) {
        let own_fn = (node.kind() == "function_definition").then(|| EnclosingFn {
            name: node
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string())
                .unwrap_or_default(),
            return_type: node
                .child_by_field_name("return_type")
                .map(|t| annotation_text(parsed, t)),
        });
        let next_enclosing = own_fn.as_ref().or(enclosing);

        match node.kind() {
            "call" => self.collect_call(parsed, node, out),
            "subscript" => {
                if let (Some(value), Some(sub)) = (
                    node.child_by_field_name("value"),
                    node.child_by_field_name("subscript"),
                ) {
                    if value.kind() == "identifier" {
                        let mut r = Reference::new(
                            parsed.node_text(value),
                            RefKind::ArrayAccess,
                            parsed.line_of(node),
                        );
                        r.index = parsed.node_text(sub).trim().parse().ok();
                        out.push(r);
                    }
                }
            }
            "assignment" => self.collect_annotated_write(parsed, node, out),
            "attribute" => {
                // receiver use counts as a read; the member name does not
                if let Some(obj) = node.child_by_field_name("object") {
                    if obj.kind() == "identifier" {
                        let name = parsed.node_text(obj);
                        if !name.starts_with('_') {
                            out.push(Reference::new(name, RefKind::Read, parsed.line_of(obj)));
                        }
                    }
                }
            }
            "return_statement" => {
                if let Some(fn_ctx) = enclosing {
                    if let Some(ret) = fn_ctx.return_type.as_ref() {
                        if let Some(expr) = node.named_child(0) {
                            let mut r = Reference::new(
                                fn_ctx.name.clone(),
                                RefKind::Return,
                                parsed.line_of(node),
                            );
                            r.declared_return = Some(ret.clone());
                            r.rhs = Some(python_value_hint(parsed, expr));
                            out.push(r);
                        }
                    }
                }
            }
            "identifier" => {
                if is_identifier_read(node) {
                    let name = parsed.node_text(node);
                    if !name.is_empty() && !name.starts_with('_') {
                        out.push(Reference::new(name, RefKind::Read, parsed.line_of(node)));
                    }
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_references(parsed, child, next_enclosing, out);
        }
    }

    fn collect_call(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        let Some(fn_node) = node.child_by_field_name("function") else {
            return;
        };
        let name = parsed.node_text(fn_node).to_string();
        if name.is_empty() {
            return;
        }

        let mut positional = Vec::new();
        let mut has_keyword = false;
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for child in args.children(&mut cursor) {
                if !child.is_named() || child.kind() == "comment" {
                    continue;
                }
                if child.kind() == "keyword_argument" {
                    has_keyword = true;
                } else {
                    positional.push(child);
                }
            }
        }

        let mut r = Reference::new(name, RefKind::Call, parsed.line_of(node));
        // Keyword arguments make the positional count ambiguous for arity
        // checking; leave it unset so the signature rule stays silent.
        if !has_keyword {
            r.arg_count = Some(positional.len());
        }
        r.args = positional
            .iter()
            .map(|n| python_value_hint(parsed, *n))
            .collect();
        out.push(r);
    }

    /// Annotated assignment `x: T = expr` becomes a typed write site.
    fn collect_annotated_write(&self, parsed: &ParsedFile, node: Node, out: &mut Vec<Reference>) {
        let Some(ann) = node.child_by_field_name("type") else {
            return;
        };
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let mut r = Reference::new(
            parsed.node_text(left),
            RefKind::Write,
            parsed.line_of(node),
        );
        r.annotation = Some(annotation_text(parsed, ann));
        r.rhs = Some(python_value_hint(parsed, right));
        out.push(r);
    }
}

/// Enclosing-function context threaded through the reference walk so return
/// statements can be checked against the declared annotation.
struct EnclosingFn {
    name: String,
    return_type: Option<String>,
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let mut facts = FileFacts::empty(&parsed.path, Language::Python);
        self.walk_symbols(parsed, parsed.tree.root_node(), "", &mut facts.symbols);
        self.walk_references(parsed, parsed.tree.root_node(), None, &mut facts.references);
        facts.has_parse_errors = parsed.tree.root_node().has_error();
        facts.finalize();
        Ok(facts)
    }
}

// ---- helpers --------------------------------------------------------------

/// Identifier binding targets of a loop/with clause, emitted as plain
/// variables in the current scope.
fn collect_binding_targets(parsed: &ParsedFile, node: Node, scope: &str, out: &mut Vec<Symbol>) {
    if node.kind() == "identifier" {
        let name = parsed.node_text(node).to_string();
        if !name.is_empty() && !name.starts_with('_') {
            out.push(
                Symbol::new(
                    name,
                    SymbolKind::Variable,
                    parsed.path.clone(),
                    parsed.line_of(node),
                )
                .with_scope(scope),
            );
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_binding_targets(parsed, child, scope, out);
    }
}

fn join_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn first_identifier_text(parsed: &ParsedFile, node: Node) -> Option<String> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|n| parsed.node_text(n).to_string());
    result
}

/// Annotation text with any leading `:` / `->` the grammar keeps attached.
fn annotation_text(parsed: &ParsedFile, node: Node) -> String {
    let text = parsed.node_text(node).trim();
    let text = text.strip_prefix("->").unwrap_or(text);
    let text = text.strip_prefix(':').unwrap_or(text);
    text.trim().to_string()
}

/// Apparent type of a Python literal node kind.
fn literal_type(kind: &str) -> Option<&'static str> {
    match kind {
        "integer" => Some("int"),
        "float" => Some("float"),
        "string" | "concatenated_string" => Some("str"),
        "true" | "false" => Some("bool"),
        "list" => Some("list"),
        "tuple" => Some("tuple"),
        "dictionary" => Some("dict"),
        "set" => Some("set"),
        _ => None,
    }
}

/// Element count of a list/tuple literal node.
fn count_elements(node: Node) -> i64 {
    let mut cursor = node.walk();
    node.children(&mut cursor).filter(|c| c.is_named()).count() as i64
}

/// Shallow type evidence for a Python expression: literals map directly,
/// identifiers and calls defer to symbol lookup (a call resolves through
/// the callee's declared return type).
fn python_value_hint(parsed: &ParsedFile, node: Node) -> ValueHint {
    if let Some(ty) = literal_type(node.kind()) {
        return ValueHint::literal(ty);
    }
    match node.kind() {
        "identifier" => ValueHint::identifier(parsed.node_text(node)),
        "unary_operator" => node
            .child_by_field_name("argument")
            .map(|a| python_value_hint(parsed, a))
            .unwrap_or_default(),
        "call" => node
            .child_by_field_name("function")
            .filter(|f| f.kind() == "identifier")
            .map(|f| ValueHint::identifier(parsed.node_text(f)))
            .unwrap_or_default(),
        "parenthesized_expression" => node
            .named_child(0)
            .map(|c| python_value_hint(parsed, c))
            .unwrap_or_default(),
        _ => ValueHint::unknown(),
    }
}

/// True when an identifier is a plain use, not a binding or structural
/// position. Call callees, definition names, parameters, import clauses,
/// attribute members, and keyword-argument names are all excluded; attribute
/// receivers are handled separately so the member name never counts.
fn is_identifier_read(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "call" => parent
            .child_by_field_name("function")
            .map(|f| f.id() != node.id())
            .unwrap_or(true),
        "keyword_argument" => parent
            .child_by_field_name("name")
            .map(|n| n.id() != node.id())
            .unwrap_or(true),
        "function_definition" | "class_definition" | "parameters" | "typed_parameter"
        | "default_parameter" | "typed_default_parameter" | "list_splat_pattern"
        | "dictionary_splat_pattern" | "attribute" | "dotted_name" | "aliased_import"
        | "import_statement" | "import_from_statement" | "wildcard_import" | "type" => false,
        _ => true,
    }
}
