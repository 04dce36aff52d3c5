//! Unsafe C library function detection, per the CERT C Secure Coding
//! Standard.
//!
//! `gets` was removed from the language in C11 and reports as ERROR; the
//! rest are still standard but discouraged and report as WARNING. Every
//! entry carries its risk category, the rationale, and a suggested
//! replacement, all of which land in the diagnostic message.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::analysis::{Language, RefKind};
use crate::rules::{Diagnostic, DiagnosticCode, RuleContext, Severity};

/// A discouraged function with its canned rationale.
#[derive(Debug, Clone, Copy)]
pub struct UnsafeFn {
    pub category: &'static str,
    pub reason: &'static str,
    pub suggestion: &'static str,
    pub severity: Severity,
}

const TABLE: &[(&str, UnsafeFn)] = &[
    // removed from the C standard (C11+)
    (
        "gets",
        UnsafeFn {
            category: "Removed from C Standard (C11+)",
            reason: "Removed in C11 with no bounds checking, guaranteed buffer overflow risk",
            suggestion: "Use fgets(buf, size, stdin) instead",
            severity: Severity::Error,
        },
    ),
    // unsafe string handling
    (
        "strcpy",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "No bounds checking, writes past the buffer if source is longer than destination",
            suggestion: "Use strncpy() or strlcpy() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "strcat",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "No bounds checking, concatenation can overflow the destination buffer",
            suggestion: "Use strncat() or strlcat() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "stpcpy",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "No bounds checking, same risks as strcpy()",
            suggestion: "Use strncpy() or strlcpy() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "gets_s",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "Annex K optional function, not widely supported and still risky",
            suggestion: "Use fgets(buf, size, stdin) instead",
            severity: Severity::Warning,
        },
    ),
    (
        "strtok",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "Uses internal static state, not thread-safe and modifies the input string",
            suggestion: "Use strtok_r() (POSIX) or manual parsing instead",
            severity: Severity::Warning,
        },
    ),
    (
        "strncpy",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "Does not guarantee null-termination if source >= n bytes",
            suggestion: "Use strlcpy() or manually null-terminate after strncpy()",
            severity: Severity::Warning,
        },
    ),
    (
        "strncat",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "Easy to misuse, the size parameter is remaining space rather than total buffer size",
            suggestion: "Use strlcat() or compute remaining size carefully",
            severity: Severity::Warning,
        },
    ),
    (
        "strdup",
        UnsafeFn {
            category: "Unsafe String Handling",
            reason: "No input length limit, untrusted input can cause memory exhaustion",
            suggestion: "Use strndup() with a max length, or validate input size first",
            severity: Severity::Warning,
        },
    ),
    // unsafe formatted output
    (
        "sprintf",
        UnsafeFn {
            category: "Unsafe Formatted Output",
            reason: "No bounds checking, formatted output can overflow the destination buffer",
            suggestion: "Use snprintf(buf, size, fmt, ...) instead",
            severity: Severity::Warning,
        },
    ),
    (
        "vsprintf",
        UnsafeFn {
            category: "Unsafe Formatted Output",
            reason: "No bounds checking, variadic format output can overflow the buffer",
            suggestion: "Use vsnprintf(buf, size, fmt, ap) instead",
            severity: Severity::Warning,
        },
    ),
    // potentially unsafe input
    (
        "scanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Without field width limits, %s can overflow buffers",
            suggestion: "Use fgets() + sscanf(), or limit field width (e.g. %99s)",
            severity: Severity::Warning,
        },
    ),
    (
        "fscanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Without field width limits, %s can overflow buffers",
            suggestion: "Use fgets() + sscanf() with bounded format specifiers",
            severity: Severity::Warning,
        },
    ),
    (
        "sscanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Without field width limits, %s can overflow buffers",
            suggestion: "Limit field width in format specifiers (e.g. %99s)",
            severity: Severity::Warning,
        },
    ),
    (
        "vscanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Variadic version of scanf, same overflow risks without width limits",
            suggestion: "Use fgets() + vsscanf() with bounded format specifiers",
            severity: Severity::Warning,
        },
    ),
    (
        "vfscanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Variadic version of fscanf, same overflow risks without width limits",
            suggestion: "Use fgets() + vsscanf() with bounded format specifiers",
            severity: Severity::Warning,
        },
    ),
    (
        "vsscanf",
        UnsafeFn {
            category: "Potentially Unsafe Input",
            reason: "Variadic version of sscanf, same overflow risks without width limits",
            suggestion: "Limit field width in format specifiers (e.g. %99s)",
            severity: Severity::Warning,
        },
    ),
    // temporary files
    (
        "tmpnam",
        UnsafeFn {
            category: "Temporary File (Race Condition Risk)",
            reason: "Race condition between name generation and file creation (TOCTOU)",
            suggestion: "Use mkstemp() or tmpfile() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "tempnam",
        UnsafeFn {
            category: "Temporary File (Race Condition Risk)",
            reason: "Race condition between name generation and file creation (TOCTOU)",
            suggestion: "Use mkstemp() or tmpfile() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "tmpfile",
        UnsafeFn {
            category: "Temporary File (Race Condition Risk)",
            reason: "Less risky than tmpnam() but still implementation-sensitive",
            suggestion: "Use mkstemp() for full control over temp file creation",
            severity: Severity::Warning,
        },
    ),
    // memory / environment
    (
        "getenv",
        UnsafeFn {
            category: "Memory / Environment Risk",
            reason: "Returns a pointer to the environment, which can be attacker-controlled or modified",
            suggestion: "Use secure_getenv() (glibc) or validate/sanitize the returned value",
            severity: Severity::Warning,
        },
    ),
    (
        "alloca",
        UnsafeFn {
            category: "Memory Risk",
            reason: "Allocates on the stack with no failure indication, stack overflow risk",
            suggestion: "Use malloc() / calloc() with proper size checks instead",
            severity: Severity::Warning,
        },
    ),
    // weak randomness
    (
        "rand",
        UnsafeFn {
            category: "Weak Random Number Generation",
            reason: "Predictable PRNG, not suitable for security-sensitive contexts",
            suggestion: "Use arc4random(), getrandom(), or /dev/urandom for secure randomness",
            severity: Severity::Warning,
        },
    ),
    (
        "srand",
        UnsafeFn {
            category: "Weak Random Number Generation",
            reason: "Seeds the predictable rand() PRNG, not cryptographically secure",
            suggestion: "Use arc4random() or getrandom() which don't need manual seeding",
            severity: Severity::Warning,
        },
    ),
    (
        "random",
        UnsafeFn {
            category: "Weak Random Number Generation",
            reason: "Better than rand() but still not cryptographically secure",
            suggestion: "Use arc4random() or getrandom() for security-sensitive contexts",
            severity: Severity::Warning,
        },
    ),
    (
        "drand48",
        UnsafeFn {
            category: "Weak Random Number Generation",
            reason: "Predictable PRNG, not suitable for security-sensitive contexts",
            suggestion: "Use arc4random() or getrandom() for secure randomness",
            severity: Severity::Warning,
        },
    ),
    // unsafe type conversion
    (
        "atoi",
        UnsafeFn {
            category: "Unsafe Type Conversion",
            reason: "No error detection, undefined behavior on overflow with no way to detect failure",
            suggestion: "Use strtol() with errno checking instead",
            severity: Severity::Warning,
        },
    ),
    (
        "atol",
        UnsafeFn {
            category: "Unsafe Type Conversion",
            reason: "No error detection, undefined behavior on overflow with no way to detect failure",
            suggestion: "Use strtol() with errno checking instead",
            severity: Severity::Warning,
        },
    ),
    (
        "atoll",
        UnsafeFn {
            category: "Unsafe Type Conversion",
            reason: "No error detection, undefined behavior on overflow with no way to detect failure",
            suggestion: "Use strtoll() with errno checking instead",
            severity: Severity::Warning,
        },
    ),
    (
        "atof",
        UnsafeFn {
            category: "Unsafe Type Conversion",
            reason: "No error detection, no way to distinguish '0.0' input from conversion failure",
            suggestion: "Use strtod() with errno checking instead",
            severity: Severity::Warning,
        },
    ),
    // process execution
    (
        "system",
        UnsafeFn {
            category: "Process Execution (Command Injection Risk)",
            reason: "Passes the string to a shell, vulnerable to command injection",
            suggestion: "Use execve() or posix_spawn() with explicit argument arrays",
            severity: Severity::Warning,
        },
    ),
    (
        "popen",
        UnsafeFn {
            category: "Process Execution (Command Injection Risk)",
            reason: "Passes the string to a shell, vulnerable to command injection",
            suggestion: "Use pipe() + fork() + exec() with explicit argument arrays",
            severity: Severity::Warning,
        },
    ),
    (
        "execl",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Inherits the environment, can be exploited via PATH or env manipulation",
            suggestion: "Use execve() with explicit environment, or validate all arguments",
            severity: Severity::Warning,
        },
    ),
    (
        "execle",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Safer than execl() but still requires careful argument validation",
            suggestion: "Validate all arguments and use absolute paths",
            severity: Severity::Warning,
        },
    ),
    (
        "execlp",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Searches PATH, an attacker can place a malicious binary in PATH",
            suggestion: "Use execve() with absolute paths instead",
            severity: Severity::Warning,
        },
    ),
    (
        "execv",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Inherits the environment, can be exploited via env manipulation",
            suggestion: "Use execve() with explicit environment",
            severity: Severity::Warning,
        },
    ),
    (
        "execvp",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Searches PATH, an attacker can place a malicious binary in PATH",
            suggestion: "Use execve() with absolute paths instead",
            severity: Severity::Warning,
        },
    ),
    (
        "execve",
        UnsafeFn {
            category: "Process Execution Risk",
            reason: "Safest exec variant but still requires careful argument validation",
            suggestion: "Validate all arguments and paths before calling",
            severity: Severity::Warning,
        },
    ),
    // signal handling
    (
        "signal",
        UnsafeFn {
            category: "Unsafe Signal Handling",
            reason: "Behavior varies across platforms and can cause race conditions",
            suggestion: "Use sigaction() for reliable, portable signal handling",
            severity: Severity::Warning,
        },
    ),
    // memory operations
    (
        "memcpy",
        UnsafeFn {
            category: "Dangerous Memory Operations",
            reason: "Undefined behavior if source and destination buffers overlap",
            suggestion: "Use memmove() if buffers may overlap, or verify non-overlap",
            severity: Severity::Warning,
        },
    ),
    (
        "memmove",
        UnsafeFn {
            category: "Dangerous Memory Operations",
            reason: "Safer than memcpy() for overlapping buffers but still dangerous if the size is wrong",
            suggestion: "Always validate the size parameter against actual buffer sizes",
            severity: Severity::Warning,
        },
    ),
    (
        "memcmp",
        UnsafeFn {
            category: "Dangerous Memory Operations",
            reason: "Not constant-time, unsafe for comparing secrets (timing side-channel attack)",
            suggestion: "Use a constant-time comparison function for passwords/keys/tokens",
            severity: Severity::Warning,
        },
    ),
    (
        "bcopy",
        UnsafeFn {
            category: "Legacy / Obsolete",
            reason: "Non-standard legacy BSD function, removed from POSIX.1-2008",
            suggestion: "Use memmove() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "bzero",
        UnsafeFn {
            category: "Legacy / Obsolete",
            reason: "Deprecated BSD function, removed from POSIX.1-2008",
            suggestion: "Use memset(buf, 0, size) instead",
            severity: Severity::Warning,
        },
    ),
    // I/O
    (
        "getc",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "Macro implementation can evaluate the stream argument multiple times",
            suggestion: "Use fgetc() for side-effect-safe single character reads",
            severity: Severity::Warning,
        },
    ),
    (
        "putc",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "Macro implementation can evaluate arguments multiple times",
            suggestion: "Use fputc() for side-effect-safe single character writes",
            severity: Severity::Warning,
        },
    ),
    (
        "getchar",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "No input size control, may block or read unbounded input",
            suggestion: "Use fgets() for controlled input reading",
            severity: Severity::Warning,
        },
    ),
    (
        "putchar",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "No output error checking by default",
            suggestion: "Check the return value or use fputc() with error handling",
            severity: Severity::Warning,
        },
    ),
    (
        "rewind",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "Silently clears the error indicator, hiding I/O failures",
            suggestion: "Use fseek(fp, 0, SEEK_SET) and check the return value for errors",
            severity: Severity::Warning,
        },
    ),
    (
        "freopen",
        UnsafeFn {
            category: "Potentially Unsafe I/O",
            reason: "Can redirect critical streams (stdin/stdout/stderr) unexpectedly",
            suggestion: "Use fopen() for new streams; avoid redirecting standard streams",
            severity: Severity::Warning,
        },
    ),
    // environment / user info
    (
        "getlogin",
        UnsafeFn {
            category: "Unreliable Environment Info",
            reason: "Not reliable, can be spoofed and may return NULL on some systems",
            suggestion: "Use getpwuid(getuid()) for reliable user identification",
            severity: Severity::Warning,
        },
    ),
    // legacy / obsolete
    (
        "setbuf",
        UnsafeFn {
            category: "Legacy / Obsolete",
            reason: "Cannot report errors; if the buffer is too small, undefined behavior",
            suggestion: "Use setvbuf() which returns an error code on failure",
            severity: Severity::Warning,
        },
    ),
    (
        "ctime",
        UnsafeFn {
            category: "Legacy / Obsolete (Not Thread-Safe)",
            reason: "Returns a pointer to a static internal buffer, not thread-safe",
            suggestion: "Use ctime_r() (POSIX) or strftime() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "asctime",
        UnsafeFn {
            category: "Legacy / Obsolete (Not Thread-Safe)",
            reason: "Returns a pointer to a static internal buffer, not thread-safe",
            suggestion: "Use asctime_r() (POSIX) or strftime() instead",
            severity: Severity::Warning,
        },
    ),
    (
        "gmtime",
        UnsafeFn {
            category: "Legacy / Obsolete (Not Thread-Safe)",
            reason: "Returns a pointer to a static internal buffer, not thread-safe",
            suggestion: "Use gmtime_r() (POSIX) instead",
            severity: Severity::Warning,
        },
    ),
    (
        "localtime",
        UnsafeFn {
            category: "Legacy / Obsolete (Not Thread-Safe)",
            reason: "Returns a pointer to a static internal buffer, not thread-safe",
            suggestion: "Use localtime_r() (POSIX) instead",
            severity: Severity::Warning,
        },
    ),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static UnsafeFn>> =
    Lazy::new(|| TABLE.iter().map(|(name, entry)| (*name, entry)).collect());

/// Table entry for a function name, if it is in the unsafe set.
pub fn lookup(name: &str) -> Option<&'static UnsafeFn> {
    BY_NAME.get(name).copied()
}

pub fn check_unsafe_functions(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if ctx.language != Language::C {
        return diagnostics;
    }

    for r in &ctx.buffer.references {
        if r.kind != RefKind::Call {
            continue;
        }
        if let Some(entry) = lookup(&r.name) {
            diagnostics.push(Diagnostic::new(
                ctx.file,
                r.line,
                entry.severity,
                DiagnosticCode::UnsafeFunction,
                format!(
                    "'{}()' {}: {}. {}.",
                    r.name, entry.category, entry.reason, entry.suggestion
                ),
            ));
        }
    }
    diagnostics
}
