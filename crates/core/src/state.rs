//! Per-compilation state threaded through every collapse.
//!
//! A [`Session`] is created at the start of one document compilation and
//! dropped at its end. Nothing in it is ever reset mid-compilation.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::ast::Token;

/// Slots a built collection may hold unless configured otherwise.
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 100_000;

/// Logical (template-level) name to its most recent binding.
#[derive(Debug, Default)]
pub struct BindingState {
    bindings: HashMap<String, Token>,
}

impl BindingState {
    /// Bind `name`, replacing any earlier binding.
    pub fn bind(&mut self, name: &str, value: Token) {
        self.bindings.insert(name.to_owned(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Token> {
        self.bindings.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Output identifiers already claimed in this compilation. Entries are
/// never released.
#[derive(Debug, Default)]
pub struct IdentifierPool {
    claimed: HashSet<String>,
}

impl IdentifierPool {
    pub fn contains(&self, ident: &str) -> bool {
        self.claimed.contains(ident)
    }

    /// Reserve `ident`. Returns false if it was already taken.
    pub fn claim(&mut self, ident: &str) -> bool {
        self.claimed.insert(ident.to_owned())
    }

    pub(crate) fn len(&self) -> usize {
        self.claimed.len()
    }
}

/// Mutable state of a single compilation plus its randomness source.
pub struct Session<'r, R: Rng + ?Sized> {
    pub bindings: BindingState,
    pub identifiers: IdentifierPool,
    pub rng: &'r mut R,
    /// Largest slot count a `collection -b` may build.
    pub max_collection_size: usize,
}

impl<'r, R: Rng + ?Sized> Session<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Session {
            bindings: BindingState::default(),
            identifiers: IdentifierPool::default(),
            rng,
            max_collection_size: DEFAULT_MAX_COLLECTION_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_replaces_previous_value() {
        let mut state = BindingState::default();
        state.bind("x", Token::literal("a_var"));
        state.bind("x", Token::literal("temp"));
        assert_eq!(state.lookup("x"), Some(&Token::literal("temp")));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn claim_reports_duplicates() {
        let mut pool = IdentifierPool::default();
        assert!(pool.claim("temp"));
        assert!(!pool.claim("temp"));
        assert!(pool.contains("temp"));
        assert_eq!(pool.len(), 1);
    }
}
