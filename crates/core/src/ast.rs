/// Parsed template representation.
///
/// A [`Document`] is a list of [`Line`]s, each an ordered run of [`Token`]s.
/// Command tokens own their argument tokens, so a line is a finite tree.
use crate::command::Command;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Text copied to the output unchanged.
    Literal(String),
    /// A command still waiting to be collapsed.
    Command(Box<Command>),
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    pub fn command(command: Command) -> Self {
        Token::Command(Box::new(command))
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Token::Command(_))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(s) => Some(s),
            Token::Command(_) => None,
        }
    }
}

/// One physical source line, or a synthetic line produced during expansion.
pub type Line = Vec<Token>;

/// Concatenate a run of tokens if every one of them is a literal.
pub fn literal_text(tokens: &[Token]) -> Option<String> {
    tokens.iter().map(Token::as_literal).collect()
}

/// Number of command tokens in a line, counting nested argument commands.
pub fn count_commands(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .map(|t| match t {
            Token::Literal(_) => 0,
            Token::Command(c) => 1 + count_commands(c.args()),
        })
        .sum()
}

/// A parsed template. Immutable once built; compiling never modifies it, so
/// one document can be compiled any number of times, from any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File the template was read from, used in located errors.
    pub file: String,
    pub lines: Vec<Line>,
}

impl Document {
    pub fn new(file: impl Into<String>, lines: Vec<Line>) -> Self {
        Document {
            file: file.into(),
            lines,
        }
    }

    pub fn command_count(&self) -> usize {
        self.lines.iter().map(|l| count_commands(l)).sum()
    }
}

/// What a single collapse decided: lines to splice before the enclosing line,
/// the tokens that replace the command, and lines to splice after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collapsed {
    pub pre_lines: Vec<Line>,
    pub result: Line,
    pub post_lines: Vec<Line>,
}

impl Collapsed {
    pub fn with_result(result: Line) -> Self {
        Collapsed {
            result,
            ..Collapsed::default()
        }
    }

    /// Fold a nested command's side lines into this outcome, keeping order.
    pub fn absorb_lines(&mut self, nested: &mut Collapsed) {
        self.pre_lines.append(&mut nested.pre_lines);
        self.post_lines.append(&mut nested.post_lines);
    }
}
