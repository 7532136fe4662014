//! The coroutine engine (§4.7): cooperative suspension implemented as
//! **yield replay** rather than true call-stack capture — the open question in
//! §9 is resolved in favor of replay, with the documented correctness caveat
//! that code executed before the target yield on a resume is re-run, so it
//! must be side-effect-free (or idempotent) up to that point. The loop-state
//! stack (`LoopState`/`LoopHandle`) narrows that caveat for the common case of
//! a loop directly housing the suspension point: a `while`/`for`/`foreach`
//! registers its iteration progress here so a resume can skip its completed
//! iterations' bodies entirely rather than relying on them being idempotent.
//!
//! This module only holds the coroutine's persistent record; the control flow
//! that runs and resumes a coroutine's body lives in
//! [`crate::interp::builtins::coroutine_cmd`], since creating/resuming is
//! itself command dispatch (§4.5), and the loop-state bookkeeping itself is
//! driven from `Interpreter::loop_enter`/`loop_delta`/`loop_checkpoint`/
//! `loop_exit`/`loop_suspend` in `interpreter.rs`.

use crate::scope::FrameRef;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineState {
    Created,
    Running,
    Suspended,
    Done,
}

/// One nesting level's worth of a coroutine's loop-state stack (§4.7
/// "Loop-state stack"): `completed` is how many iterations of that loop had
/// fully finished as of the last suspend, and `yields` is how many `yield`
/// calls those completed iterations consumed, counted from the loop's own
/// start rather than the whole coroutine. A resume uses `completed` to skip
/// re-invoking those iterations' bodies and `yields` to fast-forward
/// `yield_count` past the ones it would otherwise have replayed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopState {
    pub completed: u32,
    pub yields: u32,
}

/// A handle returned by [`crate::interp::interpreter::Interpreter::loop_enter`]
/// for the duration of one loop invocation: which coroutine (if any) owns it,
/// its nesting depth on that coroutine's loop-state stack, how many leading
/// iterations to skip, and the `yield_count` baseline to measure progress
/// against.
pub struct LoopHandle {
    pub(crate) coroutine: Option<String>,
    pub(crate) depth: usize,
    pub skip: u32,
    pub(crate) base: u32,
}

/// A coroutine's persistent state across suspensions (§4.7 state machine).
/// `yield_count`/`yield_target` drive replay: a resume sets `yield_target` to
/// the prior `yield_count` and resets `yield_count` to 0, so yields below the
/// target are silently replayed and the first yield at or past it suspends.
pub struct CoroutineRecord {
    pub frame: FrameRef,
    pub state: CoroutineState,
    pub yield_count: u32,
    pub yield_target: u32,
    pub resume_value: Value,
    pub last_value: Value,
    /// The command (`cmd ?arg...?`) given to `coroutine` at creation, re-run
    /// in full on every resume (§4.7 "yield replay").
    pub command: Vec<Value>,
    /// Loop-state stack (§4.7), indexed by nesting depth of currently-open
    /// `while`/`for`/`foreach` loops on the path to the last suspend.
    pub loop_stack: Vec<LoopState>,
}

impl CoroutineRecord {
    pub fn new(frame: FrameRef, command: Vec<Value>) -> Self {
        CoroutineRecord {
            frame,
            state: CoroutineState::Created,
            yield_count: 0,
            yield_target: 0,
            resume_value: Value::from_str(""),
            last_value: Value::from_str(""),
            command,
            loop_stack: Vec::new(),
        }
    }

    /// Prepares replay state for a resume carrying `value` (§4.7 "Resume").
    pub fn begin_resume(&mut self, value: Value) {
        self.resume_value = value;
        self.yield_target = self.yield_count;
        self.yield_count = 0;
        self.state = CoroutineState::Running;
    }

    /// True while a `yield` call in the current run should replay rather than
    /// actually suspend (§4.7 "Yield").
    pub fn is_replaying(&self) -> bool {
        self.yield_count < self.yield_target
    }
}
