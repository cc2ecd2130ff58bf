//! Small rendering helpers shared by the commands.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::ast::{Line, Token};

const SYNTHETIC_NAME_LEN: usize = 20;
const SYNTHETIC_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";

/// Chance that a list literal puts a space after each separator.
const SPACED_SEPARATOR_P: f64 = 0.7;
/// Chance that a single separator becomes a `] + [` concatenation break.
const CONCAT_BREAK_P: f64 = 0.01;

/// Indentation of the enclosing line: its first token when that token is a
/// non-empty, all-whitespace literal.
pub fn indentation(context: &[Token]) -> String {
    match context.first() {
        Some(Token::Literal(s)) if !s.is_empty() && s.chars().all(char::is_whitespace) => {
            s.clone()
        }
        _ => String::new(),
    }
}

/// A fresh logical name for values synthesized during expansion.
pub fn synthetic_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SYNTHETIC_NAME_LEN)
        .map(|_| {
            let b = SYNTHETIC_ALPHABET.choose(rng).copied().unwrap_or(b'_');
            b as char
        })
        .collect()
}

/// Render elements as a bracketed list expression, e.g. `[a, b, c]`.
///
/// Elements are token runs so unresolved commands inside them survive for a
/// later pass.
pub fn list_literal<R: Rng + ?Sized>(elements: Vec<Line>, rng: &mut R) -> Line {
    let spacing = if rng.gen_bool(SPACED_SEPARATOR_P) { " " } else { "" };

    let mut out: Line = vec![Token::literal("[")];
    for (i, element) in elements.into_iter().enumerate() {
        if i > 0 {
            let sep = if rng.gen_bool(CONCAT_BREAK_P) {
                format!("]{spacing}+{spacing}[")
            } else {
                format!(",{spacing}")
            };
            out.push(Token::Literal(sep));
        }
        out.extend(element);
    }
    out.push(Token::literal("]"));
    out
}

/// Float literal text that always reads back as a float (`2.0`, not `2`).
pub fn float_literal(value: f64) -> String {
    let s = value.to_string();
    if value.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}
