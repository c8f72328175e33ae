//! Source hygiene for the canvas engine.
//!
//! The engine is driven straight from host event handlers, so it must never
//! panic and never touch the outside world. These tests scan `src/` (test
//! files excluded) for patterns that break either rule. Every budget is zero;
//! a new hit means fixing the code, not raising the number.

use std::fs;
use std::path::Path;

struct Rule {
    name: &'static str,
    pattern: &'static str,
    budget: usize,
}

/// Calls that abort the host's event loop.
const PANICS: &[Rule] = &[
    Rule { name: "unwrap", pattern: ".unwrap()", budget: 0 },
    Rule { name: "expect", pattern: ".expect(", budget: 0 },
    Rule { name: "panic", pattern: "panic!(", budget: 0 },
    Rule { name: "unreachable", pattern: "unreachable!(", budget: 0 },
    Rule { name: "todo", pattern: "todo!(", budget: 0 },
    Rule { name: "unimplemented", pattern: "unimplemented!(", budget: 0 },
];

/// Errors dropped without being looked at.
const DISCARDS: &[Rule] = &[
    Rule { name: "let underscore", pattern: "let _ =", budget: 0 },
    Rule { name: "dot ok", pattern: ".ok()", budget: 0 },
];

/// The engine does no I/O; the host owns files, sockets, threads and output.
const SIDE_EFFECTS: &[Rule] = &[
    Rule { name: "filesystem", pattern: "std::fs", budget: 0 },
    Rule { name: "network", pattern: "std::net", budget: 0 },
    Rule { name: "threads", pattern: "std::thread", budget: 0 },
    Rule { name: "process", pattern: "std::process", budget: 0 },
    Rule { name: "stdout", pattern: "println!", budget: 0 },
    Rule { name: "stderr", pattern: "eprintln!", budget: 0 },
    Rule { name: "dbg", pattern: "dbg!(", budget: 0 },
];

const STRUCTURE: &[Rule] = &[Rule { name: "allow dead_code", pattern: "#[allow(dead_code)]", budget: 0 }];

struct SourceFile {
    path: String,
    content: String,
}

fn engine_sources() -> Vec<SourceFile> {
    let mut files = Vec::new();
    walk(Path::new("src"), &mut files);
    files
}

fn walk(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Offending `path:line` locations for one rule.
fn violations(files: &[SourceFile], rule: &Rule) -> Vec<String> {
    files
        .iter()
        .flat_map(|file| {
            file.content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(rule.pattern))
                .map(|(n, _)| format!("  {}:{}", file.path, n + 1))
        })
        .collect()
}

fn check(rules: &[Rule]) {
    let files = engine_sources();
    assert!(!files.is_empty(), "no sources found under src/");

    let mut report = Vec::new();
    for rule in rules {
        let hits = violations(&files, rule);
        if hits.len() > rule.budget {
            report.push(format!(
                "{} ({}): found {}, budget {}\n{}",
                rule.name,
                rule.pattern,
                hits.len(),
                rule.budget,
                hits.join("\n")
            ));
        }
    }
    assert!(report.is_empty(), "hygiene budget exceeded:\n{}", report.join("\n"));
}

#[test]
fn no_panicking_calls() {
    check(PANICS);
}

#[test]
fn no_silent_discards() {
    check(DISCARDS);
}

#[test]
fn no_side_effects() {
    check(SIDE_EFFECTS);
}

#[test]
fn no_dead_code_allowances() {
    check(STRUCTURE);
}
