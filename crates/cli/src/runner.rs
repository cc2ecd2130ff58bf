//! Template test-suite runner.
//!
//! Convention (flat directory):
//!   <name>.vy               -- the template under test
//!   <name>.expected         -- expected stdout of every compiled variant (optional)
//!   <name>.expected-stderr  -- expected stderr (optional, defaults to empty)
//!
//! Each template is compiled `attempts` times into a scratch directory and
//! every variant is run through the interpreter. Output is compared after
//! trimming surrounding whitespace and normalizing line endings.

use crate::tap::Tap;
use std::path::{Path, PathBuf};
use std::process::Command;
use varithon_core::{compile_to, parse_template, CompileOptions, Document};

pub struct HarnessOptions {
    pub attempts: usize,
    pub interpreter: String,
    pub seed: Option<u64>,
}

pub struct RunResult {
    pub failed: usize,
}

pub fn run_suite(suite_dir: &Path, options: &HarnessOptions) -> RunResult {
    let mut tap = Tap::new();
    let mut rng = crate::make_rng(options.seed);

    let mut entries = glob_template_files(suite_dir);
    entries.sort();
    for template_path in &entries {
        let name = stem(template_path);
        let expected = Expectation {
            stdout: read_optional(&suite_dir.join(format!("{}.expected", name))),
            stderr: read_optional(&suite_dir.join(format!("{}.expected-stderr", name)))
                .unwrap_or_default(),
        };
        run_template_test(template_path, &name, &expected, options, &mut rng, &mut tap);
    }

    let failed = tap.failure_count();
    tap.finish();

    RunResult { failed }
}

struct Expectation {
    stdout: Option<String>,
    stderr: String,
}

fn run_template_test(
    template_path: &Path,
    name: &str,
    expected: &Expectation,
    options: &HarnessOptions,
    rng: &mut rand::rngs::StdRng,
    tap: &mut Tap,
) {
    let doc = match parse_template(template_path) {
        Ok(doc) => doc,
        Err(e) => {
            tap.not_ok(name, format!("template does not parse: {}", e));
            return;
        }
    };

    let scratch = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            tap.not_ok(name, format!("cannot create scratch directory: {}", e));
            return;
        }
    };

    for attempt in 0..options.attempts {
        let variant = scratch.path().join(format!("{}_{}.py", name, attempt));
        if let Err(failure) = run_variant(&doc, &variant, expected, options, rng) {
            let source = std::fs::read_to_string(&variant).unwrap_or_default();
            tap.not_ok(
                name,
                format!(
                    "attempt {} of {}: {}\n--- compiled variant\n{}",
                    attempt + 1,
                    options.attempts,
                    failure,
                    source
                ),
            );
            return;
        }
    }

    tap.ok(name);
}

fn run_variant(
    doc: &Document,
    variant: &Path,
    expected: &Expectation,
    options: &HarnessOptions,
    rng: &mut rand::rngs::StdRng,
) -> Result<(), String> {
    compile_to(doc, variant, rng, &CompileOptions::default())
        .map_err(|e| format!("compilation failed: {}", e))?;

    let mut words = options.interpreter.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| "interpreter command is empty".to_string())?;
    let output = Command::new(program)
        .args(words)
        .arg(variant)
        .output()
        .map_err(|e| format!("failed to run '{}': {}", options.interpreter, e))?;

    let stdout = normalize(&String::from_utf8_lossy(&output.stdout));
    let stderr = normalize(&String::from_utf8_lossy(&output.stderr));
    tracing::debug!(variant = %variant.display(), status = ?output.status, "ran variant");

    if let Some(want) = &expected.stdout {
        let want = normalize(want);
        if stdout != want {
            return Err(format!("stdout mismatch:\n--- expected\n{}\n+++ got\n{}", want, stdout));
        }
    }
    let want = normalize(&expected.stderr);
    if stderr != want {
        return Err(format!("stderr mismatch:\n--- expected\n{}\n+++ got\n{}", want, stderr));
    }
    Ok(())
}

// -- Helpers --

fn glob_template_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("vy") {
                results.push(path);
            }
        }
    }
    results
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_optional(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}
