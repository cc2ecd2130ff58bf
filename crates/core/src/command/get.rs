//! `get <name>` looks up the most recent binding of a logical name.

use rand::Rng;

use super::{literal_arg, Collapse, GET};
use crate::ast::{Collapsed, Token};
use crate::error::CompileError;
use crate::state::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    args: Vec<Token>,
    name: String,
}

impl Get {
    pub(crate) fn parse(args: Vec<Token>) -> Result<Self, CompileError> {
        if args.len() != 1 {
            return Err(CompileError::syntax(format!(
                "invalid 'get' command: expected exactly one variable name, got {}",
                args.len()
            )));
        }
        let name = literal_arg(&args[0], GET, "the variable name")?.to_owned();
        Ok(Get { args, name })
    }

    pub(crate) fn synthetic(name: &str) -> Self {
        Get {
            args: vec![Token::literal(name)],
            name: name.to_owned(),
        }
    }

    pub fn args(&self) -> &[Token] {
        &self.args
    }
}

impl Collapse for Get {
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        _context: &[Token],
    ) -> Result<Collapsed, CompileError> {
        match session.bindings.lookup(&self.name) {
            Some(value) => Ok(Collapsed::with_result(vec![value.clone()])),
            None => Err(CompileError::binding(format!(
                "unbound variable '{}'",
                self.name
            ))),
        }
    }
}
