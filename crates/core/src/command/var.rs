//! `var <name> [candidate]*` binds a logical name to a fresh output identifier.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{literal_arg, resolve_text, Collapse, VAR};
use crate::ast::{Collapsed, Token};
use crate::error::CompileError;
use crate::state::Session;

/// Names tried besides the logical name itself and a random single letter.
const STOCK_NAMES: [&str; 6] = ["a_var", "variable", "my_var", "some_var", "new_var", "temp"];
/// Chance of drawing from the supplied candidates when there are any.
const CANDIDATE_P: f64 = 0.5;
/// Draws attempted before falling back to numbered names.
const MAX_DRAWS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    args: Vec<Token>,
    name: String,
}

impl Var {
    pub(crate) fn parse(args: Vec<Token>) -> Result<Self, CompileError> {
        let first = args
            .first()
            .ok_or_else(|| CompileError::syntax("invalid 'var' command: missing variable name"))?;
        let name = literal_arg(first, VAR, "the variable name")?;
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(CompileError::syntax(format!(
                "invalid 'var' command: variable name '{}' starts with a digit",
                name
            )));
        }
        let name = name.to_owned();
        Ok(Var { args, name })
    }

    /// A `var` for a name synthesized during expansion.
    pub(crate) fn synthetic(name: &str) -> Self {
        Var {
            args: vec![Token::literal(name)],
            name: name.to_owned(),
        }
    }

    pub fn args(&self) -> &[Token] {
        &self.args
    }

    fn draw<R: Rng + ?Sized>(&self, session: &mut Session<'_, R>, candidates: &[String]) -> String {
        for _ in 0..MAX_DRAWS {
            let pick = match candidates.choose(&mut *session.rng) {
                Some(c) if session.rng.gen_bool(CANDIDATE_P) => c.clone(),
                _ => self.stock_pick(&mut *session.rng),
            };
            if !session.identifiers.contains(&pick) {
                return pick;
            }
        }

        let mut n = 1usize;
        loop {
            let pick = format!("{}_{}", self.name, n);
            if !session.identifiers.contains(&pick) {
                return pick;
            }
            n += 1;
        }
    }

    fn stock_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match rng.gen_range(0..STOCK_NAMES.len() + 2) {
            0 => self.name.clone(),
            1 => char::from(b'a' + rng.gen_range(0..26u8)).to_string(),
            i => STOCK_NAMES[i - 2].to_owned(),
        }
    }
}

impl Collapse for Var {
    fn collapse<R: Rng + ?Sized>(
        &self,
        session: &mut Session<'_, R>,
        context: &[Token],
    ) -> Result<Collapsed, CompileError> {
        let mut out = Collapsed::default();

        let mut candidates = Vec::new();
        for arg in &self.args[1..] {
            let text = resolve_text(arg, session, context, &mut out)?;
            let text = match text.strip_prefix('-') {
                Some(stripped) => stripped.to_owned(),
                None => text,
            };
            if !text.is_empty() {
                candidates.push(text);
            }
        }

        let ident = self.draw(session, &candidates);
        session.identifiers.claim(&ident);
        session.bindings.bind(&self.name, Token::literal(ident.clone()));
        tracing::trace!(logical = %self.name, ident = %ident, "bound variable");

        out.result = vec![Token::Literal(ident)];
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::literal_text;
    use crate::error::ErrorKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn var(words: &[&str]) -> Var {
        Var::parse(words.iter().map(|w| Token::literal(*w)).collect()).unwrap()
    }

    #[test]
    fn requires_a_name() {
        let err = Var::parse(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn name_must_not_start_with_a_digit() {
        let err = Var::parse(vec![Token::literal("1x")]).unwrap_err();
        assert!(err.message().contains("starts with a digit"));
    }

    #[test]
    fn binds_and_claims_a_fresh_identifier() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = Session::new(&mut rng);
        let v = var(&["count"]);
        for _ in 0..30 {
            let out = v.collapse(&mut session, &[]).unwrap();
            let ident = literal_text(&out.result).unwrap();
            assert!(session.identifiers.contains(&ident));
            assert_eq!(session.bindings.lookup("count"), Some(&Token::literal(ident)));
        }
        assert_eq!(session.identifiers.len(), 30);
    }

    #[test]
    fn never_reuses_a_claimed_identifier() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = Session::new(&mut rng);
        let v = var(&["x", "-first", "-second"]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..60 {
            let before = session.identifiers.len();
            let out = v.collapse(&mut session, &[]).unwrap();
            let ident = literal_text(&out.result).unwrap();
            assert!(seen.insert(ident), "identifier handed out twice");
            assert_eq!(session.identifiers.len(), before + 1);
        }
    }

    #[test]
    fn candidates_are_used_with_dash_stripped() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = var(&["n", "-total"]);
        let mut used_candidate = false;
        for _ in 0..100 {
            let mut session = Session::new(&mut rng);
            let out = v.collapse(&mut session, &[]).unwrap();
            let ident = literal_text(&out.result).unwrap();
            assert!(!ident.starts_with('-'));
            used_candidate |= ident == "total";
        }
        assert!(used_candidate);
    }

    #[test]
    fn exhausted_pool_falls_back_to_numbered_names() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = Session::new(&mut rng);
        for name in STOCK_NAMES.iter().copied().chain(["x"]) {
            session.identifiers.claim(name);
        }
        for letter in b'a'..=b'z' {
            session.identifiers.claim(&char::from(letter).to_string());
        }
        let out = var(&["x"]).collapse(&mut session, &[]).unwrap();
        assert_eq!(literal_text(&out.result).unwrap(), "x_1");
    }
}
