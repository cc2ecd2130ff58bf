//! Command-body tokenizer.
//!
//! Splits the text between `~[` and `]~` into argument tokens. Outside braces
//! tokens are whitespace-separated words; a `{ ... }` group at depth zero is a
//! nested command and is handed back to the parser.

use crate::ast::Token;
use crate::error::CompileError;
use crate::parser;

pub const NESTED_OPEN: char = '{';
pub const NESTED_CLOSE: char = '}';

pub fn tokenize_command(body: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        if let Some(after_open) = rest.strip_prefix(NESTED_OPEN) {
            let (inner, tail) = split_brace_group(after_open)?;
            tokens.push(Token::command(parser::parse_command(inner)?));
            rest = tail;
            continue;
        }

        if rest.starts_with(NESTED_CLOSE) {
            return Err(CompileError::syntax(format!(
                "'{}' without matching '{}'",
                NESTED_CLOSE, NESTED_OPEN
            )));
        }

        let (word, tail) = split_word(rest);
        tokens.push(Token::literal(word));
        rest = tail;
    }

    Ok(tokens)
}

/// Take one bare word off the front: everything up to whitespace or a brace.
fn split_word(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| c.is_whitespace() || c == NESTED_OPEN || c == NESTED_CLOSE)
        .unwrap_or(text.len());
    text.split_at(end)
}

/// Given the text right after an opening brace, return the group body and the
/// text after its matching closing brace.
fn split_brace_group(text: &str) -> Result<(&str, &str), CompileError> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        if c == NESTED_OPEN {
            depth += 1;
        } else if c == NESTED_CLOSE {
            depth -= 1;
            if depth == 0 {
                return Ok((&text[..i], &text[i + c.len_utf8()..]));
            }
        }
    }
    Err(CompileError::syntax(format!(
        "'{}' without matching '{}'",
        NESTED_OPEN, NESTED_CLOSE
    )))
}
