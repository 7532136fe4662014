//! The error taxonomy from §7, as a single `thiserror`-derived enum.
//!
//! `EngineError` is the one error type the public API surfaces — the engine never
//! hands the embedder a language-specific exception type. `CompletionCode` (in
//! `interp::evaluator`) is the separate, non-error completion-code ABI used for
//! `RETURN`/`BREAK`/`CONTINUE`/coroutine-`YIELD` signaling; those are not failures
//! and do not go through this type.

use thiserror::Error;

/// One of the error kinds enumerated in §7. Each variant carries the context needed
/// to format the message a script author would see via `errorInfo`/`errorCode`.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("wrong # args: {detail}")]
    WrongArgs { detail: String },

    #[error("bad option \"{option}\": {detail}")]
    BadOption { option: String, detail: String },

    #[error("expected {expected} but got \"{got}\"")]
    TypeError { expected: &'static str, got: String },

    #[error("index {index} out of range{context}", context = context_suffix(.context))]
    IndexOutOfRange { index: i64, context: String },

    #[error("{kind} \"{name}\" not found")]
    NameNotFound { kind: &'static str, name: String },

    #[error("{kind} \"{name}\" already exists")]
    NameCollision { kind: &'static str, name: String },

    #[error("syntax error on line {line}: {message}")]
    SyntaxError { message: String, line: usize },

    #[error("{detail}")]
    HostFailure { detail: String },

    #[error("{message}")]
    UserError { message: String, error_code: Option<String> },
}

fn context_suffix(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({})", context)
    }
}

impl EngineError {
    /// The `errorCode`-style category word used as the first element of the
    /// machine-readable error code list (§7 "User-visible behavior").
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::WrongArgs { .. } => "WRONGARGS",
            EngineError::BadOption { .. } => "BADOPTION",
            EngineError::TypeError { .. } => "TYPE",
            EngineError::IndexOutOfRange { .. } => "INDEX",
            EngineError::NameNotFound { .. } => "NOTFOUND",
            EngineError::NameCollision { .. } => "COLLISION",
            EngineError::SyntaxError { .. } => "SYNTAX",
            EngineError::HostFailure { .. } => "HOST",
            EngineError::UserError { .. } => "USER",
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        EngineError::UserError { message: message.into(), error_code: None }
    }

    pub fn wrong_args(detail: impl Into<String>) -> Self {
        EngineError::WrongArgs { detail: detail.into() }
    }

    pub fn name_not_found(kind: &'static str, name: impl Into<String>) -> Self {
        EngineError::NameNotFound { kind, name: name.into() }
    }
}
