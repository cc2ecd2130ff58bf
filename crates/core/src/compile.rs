//! Fixpoint expansion driver.
//!
//! Each pass collapses every command present in the current line set,
//! splicing each command's pre-lines before its line and post-lines after it.
//! Commands produced by a pass (synthetic `var`/`get` pairs, bound tokens)
//! are resolved by the next pass. Expansion stops once a pass would find no
//! command left; only then is output rendered or written.

use std::path::Path;

use rand::Rng;

use crate::ast::{Document, Line, Token};
use crate::command::Collapse;
use crate::error::CompileError;
use crate::source::{FileSystemProvider, SourceProvider};
use crate::state::{Session, DEFAULT_MAX_COLLECTION_SIZE};

/// Passes allowed before an expansion is treated as diverging.
pub const DEFAULT_MAX_PASSES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub max_passes: usize,
    /// Ceiling on `collection -b` sizes; larger sizes are conversion errors.
    pub max_collection_size: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_passes: DEFAULT_MAX_PASSES,
            max_collection_size: DEFAULT_MAX_COLLECTION_SIZE,
        }
    }
}

/// A line in flight, tagged with the 1-based source line it descends from.
#[derive(Debug, Clone)]
struct PendingLine {
    origin: u32,
    tokens: Line,
}

impl PendingLine {
    fn command_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_command()).count()
    }
}

/// Compile `doc` once with default options.
pub fn compile<R: Rng + ?Sized>(doc: &Document, rng: &mut R) -> Result<String, CompileError> {
    compile_with_options(doc, rng, &CompileOptions::default())
}

/// Compile `doc` once. Binding and identifier state live exactly as long as
/// this call; `doc` itself is left untouched.
pub fn compile_with_options<R: Rng + ?Sized>(
    doc: &Document,
    rng: &mut R,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let mut session = Session::new(rng);
    session.max_collection_size = options.max_collection_size;
    let mut lines: Vec<PendingLine> = doc
        .lines
        .iter()
        .enumerate()
        .map(|(i, tokens)| PendingLine {
            origin: u32::try_from(i + 1).unwrap_or(u32::MAX),
            tokens: tokens.clone(),
        })
        .collect();

    let mut passes = 0usize;
    loop {
        let pending: usize = lines.iter().map(PendingLine::command_count).sum();
        if pending == 0 {
            break;
        }
        if passes == options.max_passes {
            return Err(CompileError::Diverged { passes });
        }
        lines = expand_pass(lines, &mut session, &doc.file)?;
        passes += 1;
        tracing::debug!(
            file = %doc.file,
            pass = passes,
            collapses = pending,
            lines = lines.len(),
            "expansion pass"
        );
    }

    tracing::debug!(
        file = %doc.file,
        passes,
        bindings = session.bindings.len(),
        identifiers = session.identifiers.len(),
        "compiled"
    );
    Ok(render(&lines))
}

/// Compile `doc` and write the result to `dest` through `provider`. Nothing
/// is written if compilation fails.
pub fn compile_to_with_provider<R: Rng + ?Sized>(
    doc: &Document,
    dest: &Path,
    provider: &dyn SourceProvider,
    rng: &mut R,
    options: &CompileOptions,
) -> Result<(), CompileError> {
    let text = compile_with_options(doc, rng, options)?;
    provider
        .write_text(dest, &text)
        .map_err(|e| CompileError::io(&dest.to_string_lossy(), &e))
}

/// Compile `doc` to a file on disk.
pub fn compile_to<R: Rng + ?Sized>(
    doc: &Document,
    dest: &Path,
    rng: &mut R,
    options: &CompileOptions,
) -> Result<(), CompileError> {
    compile_to_with_provider(doc, dest, &FileSystemProvider, rng, options)
}

/// One sweep over the line set. Every command present is collapsed once,
/// left to right, top to bottom.
fn expand_pass<R: Rng + ?Sized>(
    lines: Vec<PendingLine>,
    session: &mut Session<'_, R>,
    file: &str,
) -> Result<Vec<PendingLine>, CompileError> {
    let mut next = Vec::with_capacity(lines.len());

    for line in lines {
        let origin = line.origin;
        let mut pre_lines = Vec::new();
        let mut rebuilt = Vec::with_capacity(line.tokens.len());
        let mut post_lines = Vec::new();

        for token in &line.tokens {
            match token {
                Token::Literal(_) => rebuilt.push(token.clone()),
                Token::Command(command) => {
                    let collapsed = command
                        .collapse(session, &line.tokens)
                        .map_err(|e| e.at(file, origin))?;
                    pre_lines.extend(collapsed.pre_lines);
                    rebuilt.extend(collapsed.result);
                    post_lines.extend(collapsed.post_lines);
                }
            }
        }

        let tag = |tokens: Line| PendingLine { origin, tokens };
        next.extend(pre_lines.into_iter().map(tag));
        next.push(tag(rebuilt));
        next.extend(post_lines.into_iter().map(tag));
    }

    Ok(next)
}

fn render(lines: &[PendingLine]) -> String {
    lines
        .iter()
        .flat_map(|line| line.tokens.iter().filter_map(Token::as_literal))
        .collect()
}
