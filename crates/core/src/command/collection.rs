//! `collection` builds a list-valued expression.
//!
//! Usage:
//!   collection <elem> [<elem> ...]
//!   collection -b <size> <elem>
//!
//! With `-b` the single element is repeated `size` times; a command element
//! is collapsed once per slot, so each slot draws its own values.
//!
//! The list is rendered either as a literal (`[a, b, c]`) or, less often, as an
//! empty list declared on a pre-line and filled by one `.append(...)` post-line
//! per element. The imperative form introduces a synthetic `var`/`get` pair
//! that later passes resolve like any other command.

use rand::Rng;

use super::{resolve_text, resolve_tokens, Collapse, Command, Get, Var, COLLECTION};
use crate::ast::{Collapsed, Line, Token};
use crate::error::CompileError;
use crate::format;
use crate::state::Session;

const BUILD_FLAG: &str = "-b";
/// Chance of the imperative append rendering over the literal one.
const IMPERATIVE_P: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    args: Vec<Token>,
    build: bool,
}

impl Collection {
    pub(crate) fn parse(args: Vec<Token>) -> Result<Self, CompileError> {
        if args.is_empty() {
            return Err(CompileError::syntax(format!(
                "invalid '{}' command: expected at least one element",
                COLLECTION
            )));
        }

        let build = args[0].as_literal() == Some(BUILD_FLAG);
        if build {
            if args.len() != 3 {
                return Err(CompileError::syntax(format!(
                    "invalid '{}' command with {} flag: expected a size and one element",
                    COLLECTION, BUILD_FLAG
                )));
            }
            if let Some(size) = args[1].as_literal() {
                parse_size(size)?;
            }
        }

        Ok(Collection { args, build })
    }

    pub fn args(&self) -> &[Token] {
        &self.args
    }

    /// Resolve the elements in source order, collapsing nested commands now.
    fn elements<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
        out: &mut Collapsed,
    ) -> Result<Vec<Line>, CompileError> {
        if !self.build {
            return self
                .args
                .iter()
                .map(|arg| resolve_tokens(arg, session, context, out))
                .collect();
        }

        let size = parse_size(&resolve_text(&self.args[1], session, context, out)?)?;
        let slots = usize::try_from(size.max(0)).unwrap_or(usize::MAX);
        if slots > session.max_collection_size {
            return Err(CompileError::conversion(format!(
                "size parameter {} exceeds the limit of {}",
                size, session.max_collection_size
            )));
        }
        let element = &self.args[2];
        (0..slots)
            .map(|_| resolve_tokens(element, session, context, out))
            .collect()
    }
}

fn parse_size(text: &str) -> Result<i64, CompileError> {
    text.trim().parse().map_err(|_| {
        CompileError::conversion(format!(
            "could not convert size parameter '{}' to an integer",
            text
        ))
    })
}

impl Collapse for Collection {
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
    ) -> Result<Collapsed, CompileError> {
        let mut out = Collapsed::default();
        let elements = self.elements(session, context, &mut out)?;

        if !session.rng.gen_bool(IMPERATIVE_P) {
            out.result = format::list_literal(elements, &mut *session.rng);
            return Ok(out);
        }

        let indent = format::indentation(context);
        let name = format::synthetic_name(&mut *session.rng);
        let reference = || Token::command(Command::Get(Get::synthetic(&name)));
        let start_line = |rest: Vec<Token>| -> Line {
            let mut line = Vec::with_capacity(rest.len() + 1);
            if !indent.is_empty() {
                line.push(Token::literal(indent.as_str()));
            }
            line.extend(rest);
            line
        };

        out.pre_lines.push(start_line(vec![
            Token::command(Command::Var(Var::synthetic(&name))),
            Token::literal(" = []\n"),
        ]));
        for element in elements {
            let mut rest = vec![reference(), Token::literal(".append(")];
            rest.extend(element);
            rest.push(Token::literal(")\n"));
            out.post_lines.push(start_line(rest));
        }
        out.result = vec![reference()];
        Ok(out)
    }
}
