//! Optional tracing hook (§10.2): a dependency-free analogue of the teacher's
//! `xtrace` helper (`interpreter/helpers/xtrace.rs`). The teacher formats a PS4
//! prefix and prints a line per command; this engine instead hands the embedder
//! a structured event and lets it decide whether and where to render it, since
//! an embedded engine has no stdout of its own to print to.

use crate::value::Value;

#[derive(Debug, Clone)]
pub enum TraceEvent {
    Dispatch { name: String, args: Vec<Value>, line: usize },
    ProcCall { name: String, depth: usize },
    ProcReturn { name: String, depth: usize },
    CoroutineSuspend { name: String },
    CoroutineResume { name: String },
    ErrorUnwind { message: String, line: usize },
}

pub type Tracer = Box<dyn Fn(&TraceEvent)>;
