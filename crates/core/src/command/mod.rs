/// The built-in command set and the collapse protocol they share.
///
/// Parsing builds a [`Command`] from its argument tokens and never touches
/// compilation state. Collapsing is a pure function of the command and the
/// [`Session`]: every call returns a fresh [`Collapsed`] and nothing is stored
/// on the node, so a parsed document can be compiled repeatedly.
use rand::Rng;

use crate::ast::{literal_text, Collapsed, Line, Token};
use crate::error::CompileError;
use crate::state::Session;

mod collection;
mod get;
mod random;
mod var;

pub use collection::Collection;
pub use get::Get;
pub use random::Rand;
pub use var::Var;

pub const VAR: &str = "var";
pub const GET: &str = "get";
pub const COLLECTION: &str = "collection";
pub const RAND: &str = "rand";

/// Resolve a command into the lines and tokens that replace it.
pub trait Collapse {
    /// `context` is the line the command currently sits in.
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
    ) -> Result<Collapsed, CompileError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Var(Var),
    Get(Get),
    Collection(Collection),
    Rand(Rand),
}

impl Command {
    /// Build a command from its tokens; the first token is the command name.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Result<Command, CompileError> {
        if tokens.is_empty() {
            return Err(CompileError::syntax("empty command"));
        }
        let head = tokens.remove(0);
        let name = match head {
            Token::Literal(name) => name,
            Token::Command(_) => {
                return Err(CompileError::syntax(
                    "command name must be a plain word, not a nested command",
                ))
            }
        };
        let args = tokens;

        match name.as_str() {
            VAR => Var::parse(args).map(Command::Var),
            GET => Get::parse(args).map(Command::Get),
            COLLECTION => Collection::parse(args).map(Command::Collection),
            RAND => Rand::parse(args).map(Command::Rand),
            other => Err(CompileError::syntax(format!("unknown command '{}'", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Var(_) => VAR,
            Command::Get(_) => GET,
            Command::Collection(_) => COLLECTION,
            Command::Rand(_) => RAND,
        }
    }

    /// Argument tokens as written, excluding the command name.
    pub fn args(&self) -> &[Token] {
        match self {
            Command::Var(c) => c.args(),
            Command::Get(c) => c.args(),
            Command::Collection(c) => c.args(),
            Command::Rand(c) => c.args(),
        }
    }
}

impl Collapse for Command {
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
    ) -> Result<Collapsed, CompileError> {
        let collapsed = match self {
            Command::Var(c) => c.collapse(session, context),
            Command::Get(c) => c.collapse(session, context),
            Command::Collection(c) => c.collapse(session, context),
            Command::Rand(c) => c.collapse(session, context),
        }?;
        tracing::trace!(
            command = self.name(),
            pre = collapsed.pre_lines.len(),
            post = collapsed.post_lines.len(),
            "collapsed"
        );
        Ok(collapsed)
    }
}

/// Resolve one argument to the tokens it stands for. A nested command is
/// collapsed on the spot and its side lines are folded into `out`.
pub(crate) fn resolve_tokens<R: Rng + ?Sized>(
    arg: &Token,
    session: &mut Session<'_, R>,
    context: &[Token],
    out: &mut Collapsed,
) -> Result<Line, CompileError> {
    match arg {
        Token::Literal(text) => Ok(vec![Token::Literal(text.clone())]),
        Token::Command(command) => {
            let mut nested = command.collapse(session, context)?;
            out.absorb_lines(&mut nested);
            Ok(nested.result)
        }
    }
}

/// Like [`resolve_tokens`], but the argument must come out as plain text.
pub(crate) fn resolve_text<R: Rng + ?Sized>(
    arg: &Token,
    session: &mut Session<'_, R>,
    context: &[Token],
    out: &mut Collapsed,
) -> Result<String, CompileError> {
    let tokens = resolve_tokens(arg, session, context, out)?;
    literal_text(&tokens).ok_or_else(|| {
        let name = match arg {
            Token::Command(c) => c.name(),
            Token::Literal(_) => "argument",
        };
        CompileError::syntax(format!(
            "nested '{}' command did not resolve to plain text",
            name
        ))
    })
}

/// The argument as a plain word, for names that must be known at parse time.
pub(crate) fn literal_arg<'a>(
    arg: &'a Token,
    command: &str,
    what: &str,
) -> Result<&'a str, CompileError> {
    arg.as_literal().ok_or_else(|| {
        CompileError::syntax(format!(
            "invalid '{}' command: {} must be a plain word",
            command, what
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::tokenize_command;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parse(body: &str) -> Result<Command, CompileError> {
        Command::from_tokens(tokenize_command(body)?)
    }

    #[test]
    fn dispatches_each_builtin() {
        assert_eq!(parse("var x").unwrap().name(), VAR);
        assert_eq!(parse("get x").unwrap().name(), GET);
        assert_eq!(parse("collection a b").unwrap().name(), COLLECTION);
        assert_eq!(parse("rand -i 1 2").unwrap().name(), RAND);
    }

    #[test]
    fn unknown_command_fails() {
        let err = parse("best x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.message().contains("unknown command 'best'"));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(parse("VAR x").is_err());
    }

    #[test]
    fn nested_command_as_name_fails() {
        let err = parse("{get x} y").unwrap_err();
        assert!(err.message().contains("plain word"));
    }

    #[test]
    fn nested_bound_that_is_not_a_number_fails_conversion() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = Session::new(&mut rng);
        session.bindings.bind("x", Token::literal("temp"));
        let cmd = parse("rand -i 1 {get x}").unwrap();
        let err = cmd.collapse(&mut session, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[test]
    fn nested_argument_must_resolve_to_text() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = Session::new(&mut rng);
        session
            .bindings
            .bind("x", Token::command(parse("get y").unwrap()));
        let cmd = parse("rand -i 1 {get x}").unwrap();
        let err = cmd.collapse(&mut session, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.message().contains("plain text"));
    }

    #[test]
    fn nested_rand_bound_is_resolved_at_collapse() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = Session::new(&mut rng);
        let cmd = parse("rand -i {rand -i 3 3} 3").unwrap();
        let out = cmd.collapse(&mut session, &[]).unwrap();
        assert_eq!(literal_text(&out.result).unwrap(), "3");
    }

    #[test]
    fn collapse_does_not_change_the_node() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = Session::new(&mut rng);
        let cmd = parse("collection {rand -i 1 9} {var y}").unwrap();
        let before = cmd.clone();
        for _ in 0..10 {
            cmd.collapse(&mut session, &[]).unwrap();
        }
        assert_eq!(cmd, before);
    }
}
