//! Undefined symbol and function detection.
//!
//! A name is known when the buffer declares it, any same-language repo file
//! declares it (duplicates count), the buffer imports it, or it belongs to
//! the language's builtin allowlist. Python checks bare reads and calls;
//! C checks calls only. A star import in the buffer makes every name
//! potentially defined, so the rule goes silent for that file.

use phf::phf_set;

use crate::analysis::{Language, RefKind, SymbolKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

/// Python builtins, exception types, and common typing/decorator names that
/// are never reported undefined.
static PYTHON_BUILTINS: phf::Set<&'static str> = phf_set! {
    "print", "len", "range", "int", "str", "float", "bool", "list", "dict",
    "tuple", "set", "frozenset", "type", "isinstance", "issubclass",
    "hasattr", "getattr", "setattr", "delattr", "property", "staticmethod",
    "classmethod", "super", "object", "None", "True", "False", "abs", "all",
    "any", "ascii", "bin", "breakpoint", "bytearray", "bytes", "callable",
    "chr", "compile", "complex", "copyright", "credits", "dir", "divmod",
    "enumerate", "eval", "exec", "exit", "filter", "format", "globals",
    "hash", "help", "hex", "id", "input", "iter", "license", "locals",
    "map", "max", "memoryview", "min", "next", "oct", "open", "ord", "pow",
    "quit", "repr", "reversed", "round", "slice", "sorted", "sum", "vars",
    "zip", "__import__", "NotImplemented", "Ellipsis",
    // exception types
    "Exception", "BaseException", "ValueError", "TypeError", "KeyError",
    "IndexError", "AttributeError", "ImportError", "ModuleNotFoundError",
    "FileNotFoundError", "OSError", "IOError", "RuntimeError",
    "StopIteration", "StopAsyncIteration", "GeneratorExit", "SystemExit",
    "KeyboardInterrupt", "ArithmeticError", "ZeroDivisionError",
    "OverflowError", "FloatingPointError", "LookupError", "NameError",
    "UnboundLocalError", "SyntaxError", "IndentationError", "TabError",
    "SystemError", "UnicodeError", "UnicodeDecodeError",
    "UnicodeEncodeError", "UnicodeTranslateError", "Warning",
    "DeprecationWarning", "PendingDeprecationWarning", "RuntimeWarning",
    "SyntaxWarning", "ResourceWarning", "FutureWarning", "ImportWarning",
    "UnicodeWarning", "BytesWarning", "UserWarning", "AssertionError",
    "NotImplementedError", "RecursionError", "ConnectionError",
    "BrokenPipeError", "ConnectionAbortedError", "ConnectionRefusedError",
    "ConnectionResetError", "BlockingIOError", "ChildProcessError",
    "FileExistsError", "InterruptedError", "IsADirectoryError",
    "NotADirectoryError", "PermissionError", "ProcessLookupError",
    "TimeoutError", "EOFError", "BufferError",
    // common decorators and typing names
    "dataclass", "field", "abstractmethod", "override", "Optional",
    "Union", "List", "Dict", "Tuple", "Set", "Any", "Callable", "Iterator",
    "Generator", "Iterable", "Sequence", "Mapping", "MutableMapping",
    "TypeVar", "Generic", "Protocol",
    // ambient module globals
    "self", "cls", "__name__", "__file__", "__doc__", "__all__",
    "__version__", "__author__", "__package__", "__spec__", "__loader__",
    "__builtins__",
};

/// C standard library, POSIX, and common macro names that are never
/// reported undefined (the unsafe-function rule handles the discouraged
/// ones separately; they are defined, just risky).
static C_STDLIB: phf::Set<&'static str> = phf_set! {
    // stdio
    "printf", "fprintf", "sprintf", "snprintf", "scanf", "fscanf", "sscanf",
    "vsprintf", "vsnprintf", "vscanf", "vfscanf", "vsscanf", "fopen",
    "fclose", "fread", "fwrite", "fgets", "fputs", "feof", "fseek", "ftell",
    "perror", "puts", "getchar", "putchar", "getc", "putc", "fgetc",
    "fputc", "gets", "gets_s", "rewind", "freopen", "tmpfile", "tmpnam",
    "tempnam", "setbuf", "setvbuf", "ungetc", "fflush", "ferror",
    "clearerr",
    // stdlib
    "malloc", "calloc", "realloc", "free", "alloca", "exit", "abort",
    "atexit", "_exit", "at_quick_exit", "quick_exit", "system", "getenv",
    "secure_getenv", "abs", "labs", "llabs", "div", "ldiv", "lldiv",
    "rand", "srand", "random", "srandom", "drand48", "srand48", "atoi",
    "atol", "atoll", "atof", "strtol", "strtoul", "strtoll", "strtoull",
    "strtod", "strtof", "strtold", "qsort", "bsearch",
    // string
    "memcpy", "memset", "memmove", "memcmp", "memchr", "strcpy", "strncpy",
    "strcat", "strncat", "strcmp", "strncmp", "strlen", "strstr", "strchr",
    "strrchr", "strtok", "strtok_r", "strdup", "strndup", "stpcpy",
    "strlcpy", "strlcat", "bcopy", "bzero",
    // ctype
    "isalpha", "isdigit", "isalnum", "isspace", "isupper", "islower",
    "isprint", "iscntrl", "ispunct", "isxdigit", "isgraph", "toupper",
    "tolower",
    // time
    "time", "clock", "difftime", "mktime", "ctime", "ctime_r", "asctime",
    "asctime_r", "gmtime", "gmtime_r", "localtime", "localtime_r",
    "strftime",
    // process / exec
    "fork", "vfork", "execl", "execle", "execlp", "execv", "execvp",
    "execve", "popen", "pclose", "wait", "waitpid", "pipe", "dup", "dup2",
    // signal
    "signal", "sigaction", "raise", "kill",
    // io
    "open", "close", "read", "write", "lseek", "ioctl", "select", "poll",
    // misc
    "getlogin", "getpwuid", "getuid", "geteuid", "sleep", "usleep",
    "nanosleep", "mkstemp", "mkdtemp",
    // variadic
    "va_start", "va_end", "va_arg", "va_copy",
    // keywords / macros
    "assert", "sizeof", "offsetof", "NULL", "EOF", "main",
};

pub fn check_undefined(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // a star import can define anything; say nothing for this buffer
    if ctx.language == Language::Python && ctx.buffer.star_import {
        return diagnostics;
    }

    let known = |name: &str| -> bool {
        if ctx
            .buffer
            .symbols
            .iter()
            .any(|s| s.kind != SymbolKind::Import && s.name == name)
        {
            return true;
        }
        if ctx.imported_names().any(|n| n == name) {
            return true;
        }
        if ctx.snapshot.declares(ctx.language, name) {
            return true;
        }
        match ctx.language {
            Language::Python => PYTHON_BUILTINS.contains(name),
            Language::C => C_STDLIB.contains(name),
        }
    };

    match ctx.language {
        Language::Python => {
            for r in &ctx.buffer.references {
                match r.kind {
                    RefKind::Read => {
                        if !known(&r.name) {
                            diagnostics.push(Diagnostic::new(
                                ctx.file,
                                r.line,
                                Severity::Warning,
                                DiagnosticCode::UndefinedSymbol,
                                format!(
                                    "'{}' is not defined in this file, the repository, or Python builtins",
                                    r.name
                                ),
                            ));
                        }
                    }
                    RefKind::Call => {
                        if r.name.contains('.') {
                            continue;
                        }
                        if !known(&r.name) {
                            diagnostics.push(Diagnostic::new(
                                ctx.file,
                                r.line,
                                Severity::Warning,
                                DiagnosticCode::UndefinedSymbol,
                                format!(
                                    "Function '{}' is not defined in this file, the repository, or Python builtins",
                                    r.name
                                ),
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        Language::C => {
            for r in &ctx.buffer.references {
                if r.kind != RefKind::Call {
                    continue;
                }
                if !known(&r.name) {
                    diagnostics.push(Diagnostic::new(
                        ctx.file,
                        r.line,
                        Severity::Warning,
                        DiagnosticCode::UndefinedSymbol,
                        format!(
                            "Function '{}' is not defined in this file, the repository, or the C standard library",
                            r.name
                        ),
                    ));
                }
            }
        }
    }
    diagnostics
}
