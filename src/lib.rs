//! Embeddable engine for a dynamically-typed, Tcl-like command language (§1-§2).
//!
//! The crate is layered bottom-up: [`value`] (the dual bytes/typed representation),
//! [`arena`] (scoped allocation for ephemeral parser/evaluator state), [`ast`] (the
//! parsed tree), [`lexer`]/[`parser`] (source text to tree), [`scope`] (variable
//! tables and frames), and [`interp`] (the tree evaluator, command dispatch, and the
//! coroutine engine). [`error::EngineError`] is re-exported at the crate root since
//! nearly every module's public API returns it.

pub mod arena;
pub mod ast;
pub mod backslash;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod value;

pub use error::EngineError;
pub use interp::{CompletionCode, EngineLimits, Host, Interpreter};
pub use value::Value;
