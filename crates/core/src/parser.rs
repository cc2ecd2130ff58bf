//! Template parsing: line splitting, command dispatch, and document loading.
//!
//! A line is scanned for `~[ ... ]~` spans. Text outside spans is kept as
//! literal tokens; the text inside each span is tokenized and dispatched to a
//! [`Command`]. Nesting inside a command uses `{ ... }`, never repeated
//! delimiter pairs.

use std::path::Path;

use crate::ast::{Document, Line, Token};
use crate::command::Command;
use crate::error::CompileError;
use crate::lexer;
use crate::source::{FileSystemProvider, SourceProvider};

pub const COMMAND_START: &str = "~[";
pub const COMMAND_END: &str = "]~";

/// Parse a command body, e.g. `var x -count` or `rand -i 1 5`.
pub fn parse_command(body: &str) -> Result<Command, CompileError> {
    Command::from_tokens(lexer::tokenize_command(body)?)
}

/// Split one raw line into literal and command tokens.
pub fn parse_line(line: &str) -> Result<Line, CompileError> {
    let mut tokens = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let Some((before, body, after)) = split_command_span(rest)? else {
            tokens.push(Token::literal(rest));
            break;
        };
        if !before.is_empty() {
            tokens.push(Token::literal(before));
        }
        tokens.push(Token::command(parse_command(body)?));
        rest = after;
    }

    Ok(tokens)
}

/// Find the first `~[ ... ]~` span: `(text before, command body, text after)`.
fn split_command_span(text: &str) -> Result<Option<(&str, &str, &str)>, CompileError> {
    let Some(start) = text.find(COMMAND_START) else {
        return Ok(None);
    };
    let (before, opened) = (&text[..start], &text[start + COMMAND_START.len()..]);
    let end = opened.find(COMMAND_END).ok_or_else(|| {
        CompileError::syntax(format!(
            "'{}' found, but no matching '{}'",
            COMMAND_START, COMMAND_END
        ))
    })?;
    Ok(Some((
        before,
        &opened[..end],
        &opened[end + COMMAND_END.len()..],
    )))
}

/// Parse already-loaded lines (terminators kept) into a [`Document`].
/// Errors carry `file` and the 1-based line number.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], file: &str) -> Result<Document, CompileError> {
    let mut parsed = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line_no = u32::try_from(i + 1).unwrap_or(u32::MAX);
        parsed.push(parse_line(line.as_ref()).map_err(|e| e.at(file, line_no))?);
    }
    let doc = Document::new(file, parsed);
    tracing::debug!(
        file,
        lines = doc.lines.len(),
        commands = doc.command_count(),
        "parsed template"
    );
    Ok(doc)
}

/// Parse template source text.
pub fn parse_source(src: &str, file: &str) -> Result<Document, CompileError> {
    let lines: Vec<&str> = src.split_inclusive('\n').collect();
    parse_lines(&lines, file)
}

/// Read and parse a template file from disk.
pub fn parse_template(path: &Path) -> Result<Document, CompileError> {
    parse_template_with_provider(path, &FileSystemProvider)
}

/// Read and parse a template through the given [`SourceProvider`]. The whole
/// file is read before parsing starts.
pub fn parse_template_with_provider(
    path: &Path,
    provider: &dyn SourceProvider,
) -> Result<Document, CompileError> {
    let file = path.to_string_lossy();
    let lines = provider
        .read_lines(path)
        .map_err(|e| CompileError::io(&file, &e))?;
    parse_lines(&lines, &file)
}
