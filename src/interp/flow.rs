//! Control-flow signaling for the evaluator (§10.1): the engine-internal analogue
//! of the teacher's `BreakError`/`ContinueError`/`ReturnError` split
//! (`interpreter/errors.rs`), adapted to carry this engine's own completion
//! codes instead of being Rust exception types in their own right.
//!
//! Every evaluator-internal function returns [`EvalResult`]: `Ok(value)` for a
//! normal `OK` completion, `Err(Flow::Error(..))` for an `ERROR`, and the other
//! `Flow` variants for `RETURN`/`BREAK`/`CONTINUE`, which unwind via `?` exactly
//! like a real error until a builtin that understands them (a loop, a proc
//! invocation) catches the specific variant it owns.

use crate::value::Value;
use crate::EngineError;

use super::completion::CompletionCode;

#[derive(Debug, Clone)]
pub enum Flow {
    Error(EngineError),
    Return(Value),
    Break,
    Continue,
    /// Unwinds out of a coroutine body at a suspending `yield`/`yieldto`
    /// (§4.7). Caught only at the point that invoked the coroutine's body
    /// (creation or resume); everywhere else it propagates like an error so
    /// it crosses intervening control-flow builtins and proc calls cleanly.
    Yield(Value),
}

pub type EvalResult = Result<Value, Flow>;

impl From<EngineError> for Flow {
    fn from(e: EngineError) -> Self {
        Flow::Error(e)
    }
}

impl Flow {
    /// Collapses a completed evaluation into the `(code, value)` pair the
    /// embedder-facing API returns (§6 `eval(i, script-bytes)`).
    pub fn into_completion(self) -> (CompletionCode, Value) {
        match self {
            Flow::Error(e) => (CompletionCode::Error, Value::from_str(e.to_string())),
            Flow::Return(v) => (CompletionCode::Return, v),
            Flow::Break => (CompletionCode::Break, Value::from_str("")),
            Flow::Continue => (CompletionCode::Continue, Value::from_str("")),
            Flow::Yield(v) => (CompletionCode::Ok, v),
        }
    }

    pub fn code(&self) -> CompletionCode {
        match self {
            Flow::Error(_) => CompletionCode::Error,
            Flow::Return(_) => CompletionCode::Return,
            Flow::Break => CompletionCode::Break,
            Flow::Continue => CompletionCode::Continue,
            Flow::Yield(_) => CompletionCode::Ok,
        }
    }
}
