//! varithon-core: template-to-source compiler core library.
//!
//! A Varithon template is ordinary text with embedded `~[ ... ]~` commands.
//! Every compilation of the same parsed template resolves those commands
//! afresh (new variable names, new random literals, a different list
//! rendering), producing behaviorally-equivalent program variants.
//!
//! # Public API
//!
//! - [`parse_source()`] / [`parse_template()`] -- build a [`Document`]
//! - [`compile()`] / [`compile_with_options()`] -- expand a document to text
//! - [`compile_to()`] -- expand and write to a destination file
//! - [`CompileError`] -- every failure, optionally located by file and line
//! - [`SourceProvider`] -- storage abstraction used for reading and writing

pub mod ast;
pub mod command;
pub mod compile;
pub mod error;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod state;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Collapsed, Document, Line, Token};
pub use command::{Collapse, Command};
pub use compile::CompileOptions;
pub use error::{CompileError, ErrorKind};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use state::{BindingState, IdentifierPool, Session};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile, compile_to, compile_to_with_provider, compile_with_options};
pub use parser::{parse_command, parse_line, parse_source, parse_template, parse_template_with_provider};
