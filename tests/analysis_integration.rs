//! End-to-end scenarios for the analysis engine.
//!
//! Each test builds a small repository in a tempdir and analyzes an
//! unsaved buffer against it, the way the editor extension does.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use snipe::rules::{Diagnostic, DiagnosticCode, Severity};
use snipe::Engine;

fn repo(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp
}

fn analyze(repo: &TempDir, content: &str, file: &str) -> Vec<Diagnostic> {
    Engine::new()
        .analyze(content, file, repo.path(), &[])
        .unwrap()
}

fn with_code<'a>(diags: &'a [Diagnostic], code: DiagnosticCode) -> Vec<&'a Diagnostic> {
    diags.iter().filter(|d| d.code == code).collect()
}

// ---- seeded scenarios -----------------------------------------------------

#[test]
fn scenario_cross_file_array_bounds() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    let diags = analyze(&repo, "int x = arr[12];", "main.c");

    assert_eq!(diags.len(), 1);
    let d = &diags[0];
    assert_eq!(d.file, "main.c");
    assert_eq!(d.line, 1);
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.code, DiagnosticCode::ArrayBounds);
    assert_eq!(d.message, "Index 12 exceeds declared size 10 in core.c:1");
}

#[test]
fn scenario_cross_file_annotation_drift() {
    let repo = repo(&[("a.py", "balance: int = 0\n")]);
    let diags = analyze(&repo, "balance: float = 3.14", "b.py");

    let mismatches = with_code(&diags, DiagnosticCode::TypeMismatch);
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].file, "b.py");
    assert_eq!(mismatches[0].line, 1);
    assert!(mismatches[0].message.contains("a.py:1"));
}

#[test]
fn scenario_signature_drift() {
    let repo = repo(&[(
        "utils.py",
        "def compute(a, b, c):\n    return a + b + c\n",
    )]);
    let diags = analyze(&repo, "from utils import compute\nx = compute(1, 2)\n", "app.py");

    let drift = with_code(&diags, DiagnosticCode::SignatureDrift);
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].line, 2);
    assert!(drift[0].message.contains("expects 3"));
    assert!(drift[0].message.contains("got 2"));
}

#[test]
fn scenario_unsafe_gets() {
    let repo = repo(&[("lib.c", "char buf[64];\n")]);
    let diags = analyze(&repo, "void f(void) {\n    gets(buf);\n}\n", "main.c");

    let unsafe_calls = with_code(&diags, DiagnosticCode::UnsafeFunction);
    assert_eq!(unsafe_calls.len(), 1);
    assert_eq!(unsafe_calls[0].severity, Severity::Error);
    assert!(unsafe_calls[0]
        .message
        .contains("Use fgets(buf, size, stdin) instead"));
}

#[test]
fn scenario_format_string_mismatch() {
    let repo = repo(&[("lib.c", "int unrelated;\n")]);
    let diags = analyze(&repo, "void f(void) {\n    printf(\"%d %s\", 42);\n}\n", "main.c");

    let fmt = with_code(&diags, DiagnosticCode::FormatString);
    assert_eq!(fmt.len(), 1);
    assert_eq!(fmt[0].severity, Severity::Error);
    assert!(fmt[0].message.contains("2 specifiers, 1 argument"));
}

#[test]
fn scenario_dead_import() {
    let repo = repo(&[("other.py", "x = 1\n")]);
    let diags = analyze(
        &repo,
        "from os import path, getcwd\nprint(path.join(\"a\", \"b\"))\n",
        "app.py",
    );

    let dead = with_code(&diags, DiagnosticCode::DeadImport);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].line, 1);
    assert!(dead[0].message.contains("'getcwd'"));
    assert!(!dead[0].message.contains("'path'"));
}

// ---- boundary cases -------------------------------------------------------

#[test]
fn empty_buffer_yields_nothing() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    assert!(analyze(&repo, "", "main.c").is_empty());
    assert!(analyze(&repo, "", "main.py").is_empty());
}

#[test]
fn index_equal_to_size_is_out_of_bounds() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    let in_bounds = analyze(&repo, "int x = arr[9];", "main.c");
    assert!(with_code(&in_bounds, DiagnosticCode::ArrayBounds).is_empty());

    let at_size = analyze(&repo, "int x = arr[10];", "main.c");
    assert_eq!(with_code(&at_size, DiagnosticCode::ArrayBounds).len(), 1);
}

#[test]
fn zero_size_array_rejects_every_index() {
    let repo = repo(&[("core.c", "int empty[0];\n")]);
    let diags = analyze(&repo, "int x = empty[0];", "main.c");
    assert_eq!(with_code(&diags, DiagnosticCode::ArrayBounds).len(), 1);
}

#[test]
fn python_list_bounds_from_repo_literal() {
    let repo = repo(&[("data.py", "scores = [90, 85, 78, 92, 88]\n")]);
    let diags = analyze(&repo, "from data import scores\nval = scores[6]\n", "app.py");
    let bounds = with_code(&diags, DiagnosticCode::ArrayBounds);
    assert_eq!(bounds.len(), 1);
    assert!(bounds[0].message.contains("declared size 5"));
}

#[test]
fn variadic_minimum_still_enforced() {
    let repo = repo(&[(
        "utils.py",
        "def flexible(first, *args):\n    return first\n",
    )]);
    let ok = analyze(&repo, "from utils import flexible\nflexible(1, 2, 3, 4)\n", "app.py");
    assert!(with_code(&ok, DiagnosticCode::SignatureDrift).is_empty());

    let too_few = analyze(&repo, "from utils import flexible\nflexible()\n", "app.py");
    let drift = with_code(&too_few, DiagnosticCode::SignatureDrift);
    assert_eq!(drift.len(), 1);
    assert!(drift[0].message.contains("at least 1"));
}

#[test]
fn escaped_percent_does_not_count() {
    let repo = repo(&[("lib.c", "int unrelated;\n")]);
    let diags = analyze(
        &repo,
        "void f(void) {\n    printf(\"100%% of %d\", 1);\n}\n",
        "main.c",
    );
    assert!(with_code(&diags, DiagnosticCode::FormatString).is_empty());
}

#[test]
fn star_import_suppresses_undefined() {
    let repo = repo(&[("other.py", "x = 1\n")]);
    let without_star = analyze(&repo, "print(totally_unknown)\n", "app.py");
    assert_eq!(
        with_code(&without_star, DiagnosticCode::UndefinedSymbol).len(),
        1
    );

    let with_star = analyze(
        &repo,
        "from os import *\nprint(totally_unknown)\n",
        "app.py",
    );
    assert!(with_code(&with_star, DiagnosticCode::UndefinedSymbol).is_empty());
}

#[test]
fn struct_member_access_cross_file() {
    let repo = repo(&[(
        "geo.c",
        "struct Point {\n    int x;\n    int y;\n};\nstruct Point origin;\n",
    )]);
    let diags = analyze(
        &repo,
        "void f(void) {\n    int v = origin.z;\n}\n",
        "main.c",
    );
    let access = with_code(&diags, DiagnosticCode::StructAccess);
    assert_eq!(access.len(), 1);
    assert!(access[0].message.contains("no member 'z'"));
    assert!(access[0].message.contains("x, y"));
}

#[test]
fn extern_type_drift_cross_file() {
    let repo = repo(&[("core.c", "float balance = 10.5;\n")]);
    let diags = analyze(&repo, "extern int balance;\n", "main.c");
    let mismatch = with_code(&diags, DiagnosticCode::TypeMismatch);
    assert_eq!(mismatch.len(), 1);
    assert!(mismatch[0].message.contains("float"));
    assert!(mismatch[0].message.contains("core.c:1"));
    // the extern is also unused in this buffer
    assert_eq!(with_code(&diags, DiagnosticCode::UnusedExtern).len(), 1);
}

#[test]
fn python_shadowing_same_file() {
    let repo = repo(&[("other.py", "x = 1\n")]);
    let diags = analyze(
        &repo,
        "total = 0\n\ndef update():\n    total = 5\n    return total\n",
        "app.py",
    );
    let shadows = with_code(&diags, DiagnosticCode::ShadowedSymbol);
    assert_eq!(shadows.len(), 1);
    assert_eq!(shadows[0].line, 4);
}

// ---- properties -----------------------------------------------------------

#[test]
fn property_idempotence() {
    let repo = repo(&[
        ("core.c", "int arr[10];\nchar buf[4];\n"),
        ("utils.py", "def compute(a, b, c):\n    return a\n"),
    ]);
    let engine = Engine::new();
    let content = "int x = arr[12];\nvoid f(void) {\n    gets(buf);\n    printf(\"%d\");\n}\n";
    let first = engine.analyze(content, "main.c", repo.path(), &[]).unwrap();
    let second = engine.analyze(content, "main.c", repo.path(), &[]).unwrap();

    let keys = |d: &[Diagnostic]| {
        d.iter()
            .map(|x| (x.file.clone(), x.line, x.code, x.message.clone()))
            .collect::<Vec<_>>()
    };
    assert!(!first.is_empty());
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn property_language_locality() {
    let repo = repo(&[
        ("core.c", "int arr[10];\n"),
        ("data.py", "arr = [1, 2]\n"),
    ]);
    let engine = Engine::new();

    // the C buffer resolves arr against core.c (size 10), never data.py
    let c_diags = engine
        .analyze("int x = arr[5];", "main.c", repo.path(), &[])
        .unwrap();
    assert!(with_code(&c_diags, DiagnosticCode::ArrayBounds).is_empty());

    // the Python buffer resolves arr against data.py (size 2)
    let py_diags = engine
        .analyze("from data import arr\nv = arr[5]\n", "app.py", repo.path(), &[])
        .unwrap();
    let bounds = with_code(&py_diags, DiagnosticCode::ArrayBounds);
    assert_eq!(bounds.len(), 1);
    assert!(bounds[0].message.contains("declared size 2"));
}

#[test]
fn property_overlay_correctness() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    let engine = Engine::new();

    // disk says 10, the unsaved overlay says 3
    let overlay = snipe::OpenBuffer {
        content: "int arr[3];\n".to_string(),
        file_path: "core.c".to_string(),
    };
    let diags = engine
        .analyze("int x = arr[5];", "main.c", repo.path(), &[overlay])
        .unwrap();
    let bounds = with_code(&diags, DiagnosticCode::ArrayBounds);
    assert_eq!(bounds.len(), 1);
    assert!(bounds[0].message.contains("declared size 3"));
}

#[test]
fn property_dedup_law() {
    let repo = repo(&[("core.c", "int arr[2];\n")]);
    let engine = Engine::new();
    let diags = engine
        .analyze(
            "int a = arr[5];\nint b = arr[5];\nvoid f(void) {\n    gets(0);\n    gets(0);\n}\n",
            "main.c",
            repo.path(),
            &[],
        )
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for d in &diags {
        assert!(
            seen.insert((d.file.clone(), d.line, d.code, d.message.clone())),
            "duplicate diagnostic: {:?}",
            d
        );
    }
}

#[test]
fn property_snapshot_not_mutated_by_analysis() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    let engine = Engine::new();
    let before = engine.symbols(repo.path()).unwrap().len();
    engine
        .analyze("int extra[5];\nint x = extra[1];\n", "main.c", repo.path(), &[])
        .unwrap();
    let after = engine.symbols(repo.path()).unwrap().len();
    assert_eq!(before, after);
}

#[test]
fn clean_buffer_has_no_findings() {
    let repo = repo(&[(
        "utils.py",
        "def greet(name: str, greeting: str = \"Hello\") -> str:\n    return greeting\n",
    )]);
    let diags = analyze(
        &repo,
        "from utils import greet\nmessage: str = greet(\"World\")\nprint(message)\n",
        "app.py",
    );
    assert!(diags.is_empty(), "unexpected findings: {:?}", diags);
}

#[test]
fn persisted_diagnostics_feed_graph_view() {
    let repo = repo(&[("core.c", "int arr[10];\n")]);
    let engine = Engine::new();
    // the buffer is core.c itself, with a bad access added below the array
    engine
        .analyze("int arr[10];\nint x = arr[12];\n", "core.c", repo.path(), &[])
        .unwrap();

    assert!(Path::new(&repo.path().join(".snipe").join("diagnostics.json")).exists());
    let graph = engine.graph(repo.path()).unwrap();
    let file_node = graph
        .nodes
        .iter()
        .find(|n| n.id == "file:core.c")
        .expect("file node");
    assert!(file_node.has_errors);
}
