//! `rand -i <lo> <hi>` and `rand -f <lo> <hi>` emit a random numeric literal.

use rand::Rng;

use super::{resolve_text, Collapse, RAND};
use crate::ast::{Collapsed, Token};
use crate::error::CompileError;
use crate::format;
use crate::state::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandMode {
    /// `-i`: integer in `[lo, hi]`.
    Int,
    /// `-f`: float in `[lo, hi)`.
    Float,
}

impl RandMode {
    fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-i" => Some(RandMode::Int),
            "-f" => Some(RandMode::Float),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rand {
    args: Vec<Token>,
    mode: RandMode,
}

impl Rand {
    pub(crate) fn parse(args: Vec<Token>) -> Result<Self, CompileError> {
        if args.len() != 3 {
            return Err(CompileError::syntax(format!(
                "invalid '{}' command: expected a flag and two bounds",
                RAND
            )));
        }
        let mode = args[0]
            .as_literal()
            .and_then(RandMode::from_flag)
            .ok_or_else(|| {
                CompileError::syntax(format!(
                    "invalid '{}' command: flag must be -i or -f",
                    RAND
                ))
            })?;

        // Literal bounds can be checked now; nested ones wait for collapse.
        for bound in &args[1..] {
            if let Some(text) = bound.as_literal() {
                check_bound(mode, text)?;
            }
        }

        Ok(Rand { args, mode })
    }

    pub fn args(&self) -> &[Token] {
        &self.args
    }
}

fn bounds_error(text: &str) -> CompileError {
    CompileError::conversion(format!("bounds not numeric: '{}'", text))
}

fn parse_int(text: &str) -> Result<i64, CompileError> {
    text.trim().parse().map_err(|_| bounds_error(text))
}

fn parse_float(text: &str) -> Result<f64, CompileError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| bounds_error(text))
}

fn check_bound(mode: RandMode, text: &str) -> Result<(), CompileError> {
    match mode {
        RandMode::Int => parse_int(text).map(|_| ()),
        RandMode::Float => parse_float(text).map(|_| ()),
    }
}

impl Collapse for Rand {
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
    ) -> Result<Collapsed, CompileError> {
        let mut out = Collapsed::default();
        let lo = resolve_text(&self.args[1], session, context, &mut out)?;
        let hi = resolve_text(&self.args[2], session, context, &mut out)?;

        let text = match self.mode {
            RandMode::Int => {
                let (lo, hi) = (parse_int(&lo)?, parse_int(&hi)?);
                if lo > hi {
                    return Err(CompileError::syntax(format!(
                        "invalid '{}' bounds: lower bound {} exceeds upper bound {}",
                        RAND, lo, hi
                    )));
                }
                session.rng.gen_range(lo..=hi).to_string()
            }
            RandMode::Float => {
                let (lo, hi) = (parse_float(&lo)?, parse_float(&hi)?);
                let u: f64 = session.rng.gen();
                let value = lo + (hi - lo) * u;
                if !value.is_finite() {
                    return Err(CompileError::conversion(format!(
                        "float range [{}, {}] is too wide to draw from",
                        lo, hi
                    )));
                }
                format::float_literal(value)
            }
        };

        out.result = vec![Token::Literal(text)];
        Ok(out)
    }
}
