//! The [`Interpreter`] struct (§6 "Embedder entry points"): the handle an
//! embedder creates once and drives with `eval`. Ties together the scope
//! tree, the host, the builtin table, the AST cache, the coroutine registry,
//! and error/tracing state — the same role the teacher's `Interpreter`
//! (`interpreter/mod.rs`) plays for a shell session, minus the process table,
//! job control, and environment inheritance that belong to a shell and not to
//! an embeddable command language.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::ScriptNode;
use crate::parser::parse_script;
use crate::scope::{Frame, FrameRef};
use crate::value::Value;
use crate::EngineError;

use super::builtins;
use super::completion::CompletionCode;
use super::coroutine::{CoroutineRecord, LoopHandle, LoopState};
use super::host::Host;
use super::limits::EngineLimits;
use super::trace::Tracer;

pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> super::flow::EvalResult;

/// The interpreter's state (§3 "Interpreter state"). Owns the global frame and
/// tracks the currently executing frame; the host is boxed since an embedder
/// supplies its own implementation (§6).
pub struct Interpreter {
    pub global: FrameRef,
    pub current: FrameRef,
    host: Box<dyn Host>,
    limits: EngineLimits,
    builtins: HashMap<&'static str, BuiltinFn>,
    tracer: Option<Tracer>,
    ast_cache: RefCell<HashMap<usize, Rc<ScriptNode>>>,
    error_info: RefCell<Vec<String>>,
    coroutines: RefCell<IndexMap<String, CoroutineRecord>>,
    pub(crate) current_coroutine: Option<String>,
    loop_depth: usize,
}

impl Interpreter {
    pub fn new(host: Box<dyn Host>, limits: EngineLimits) -> Self {
        let global = Frame::new_global();
        Interpreter {
            global: global.clone(),
            current: global,
            host,
            limits,
            builtins: builtins::table(),
            tracer: None,
            ast_cache: RefCell::new(HashMap::new()),
            error_info: RefCell::new(Vec::new()),
            coroutines: RefCell::new(IndexMap::new()),
            current_coroutine: None,
            loop_depth: 0,
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn limits(&self) -> EngineLimits {
        self.limits
    }

    pub fn tracer(&self) -> Option<&Tracer> {
        self.tracer.as_ref()
    }

    pub fn lookup_builtin(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get(name).copied()
    }

    /// The top-level embedder entry point (§6 `eval(i, script-bytes)`):
    /// parses and evaluates `script` in the global frame, collapsing any
    /// unwind into a `(code, value)` pair rather than a Rust `Result`.
    pub fn eval(&mut self, script: &str) -> (CompletionCode, Value) {
        let parsed = match parse_script(script) {
            Ok(p) => p,
            Err(e) => return (CompletionCode::Error, Value::from_str(e.to_string())),
        };
        self.error_info.borrow_mut().clear();
        match super::evaluator::eval_script(self, &Rc::new(parsed)) {
            Ok(v) => (CompletionCode::Ok, v),
            Err(flow) => flow.into_completion(),
        }
    }

    /// Looks up (parsing and caching on first access) the [`ScriptNode`] for a
    /// proc/coroutine/control-flow body value (§4.3 "AST caching"): the cache
    /// is keyed on the value handle's identity, so any shimmer that replaces
    /// the cached handle (e.g. the variable holding the body is reassigned)
    /// naturally misses and reparses.
    pub fn parse_cached_body(&self, body: &Value) -> Result<Rc<ScriptNode>, EngineError> {
        let key = body.identity();
        if let Some(cached) = self.ast_cache.borrow().get(&key) {
            return Ok(cached.clone());
        }
        let parsed = Rc::new(parse_script(&body.as_str())?);
        self.ast_cache.borrow_mut().insert(key, parsed.clone());
        Ok(parsed)
    }

    pub fn push_error_info(&mut self, info: String, _line: usize) {
        self.error_info.borrow_mut().push(info);
    }

    /// Drains the accumulated `errorInfo` trace, as `catch`/`try` do when they
    /// absorb an `ERROR` (§7 "User-visible behavior").
    pub fn take_error_info(&self) -> String {
        self.error_info.borrow_mut().drain(..).collect::<Vec<_>>().join("\n")
    }

    /// Records the last absorbed error into the global `errorInfo`/`errorCode`
    /// introspection variables (§7), as `catch` does when it absorbs an
    /// `ERROR` completion.
    pub fn record_last_error(&mut self, outcome: &super::builtins::catch_try::Outcome) {
        if let Some(e) = &outcome.error {
            let info = self.take_error_info();
            let _ = crate::scope::set_scalar(&self.global, "errorInfo", Value::from_str(info));
            let _ = crate::scope::set_scalar(&self.global, "errorCode", Value::from_str(e.category()));
        }
    }

    pub fn host_register_proc(&mut self, name: &str, record: super::host::ProcRecord) {
        self.host.register_proc(name, record);
    }

    pub fn host_lookup_command(&self, name: &str) -> Option<super::host::HostCommand> {
        self.host.lookup_command(name)
    }

    pub fn host_rename_command(&mut self, old: &str, new: &str) -> Result<(), EngineError> {
        self.host.rename_command(old, new)
    }

    pub fn host_delete_command(&mut self, name: &str) -> Result<(), EngineError> {
        self.host.delete_command(name)
    }

    pub fn host_command_exists(&self, name: &str) -> bool {
        self.host.command_exists(name) || self.builtins.contains_key(name) || self.coroutine_exists(name)
    }

    pub fn host_enumerate_commands(&self, pattern: Option<&str>) -> Vec<String> {
        let mut names = self.host.enumerate_commands(pattern);
        let coroutine_names = self.coroutines.borrow().keys().cloned().collect::<Vec<_>>();
        for name in self.builtins.keys().copied().map(str::to_string).chain(coroutine_names) {
            let matches = pattern.map(|p| crate::value::list::glob_match(p, &name)).unwrap_or(true);
            if matches {
                names.push(name);
            }
        }
        names
    }

    pub fn host_register_alias(&mut self, name: &str, target: &str, prefix: Vec<Value>) {
        self.host.register_alias(name, target, prefix);
    }

    pub fn host_invoke_extension(&mut self, name: &str, args: &[Value]) -> Result<(CompletionCode, Value), EngineError> {
        self.host.invoke_extension(name, args)
    }

    pub fn coroutine_exists(&self, name: &str) -> bool {
        self.coroutines.borrow().contains_key(name)
    }

    pub fn create_coroutine(&mut self, name: String, frame: FrameRef, command: Vec<Value>) {
        self.coroutines.borrow_mut().insert(name, CoroutineRecord::new(frame, command));
    }

    /// Runs `with` against the named coroutine's record, giving mutable access
    /// without holding the `RefCell` borrow across the call (the callback may
    /// itself re-enter the interpreter).
    pub fn with_coroutine<R>(&self, name: &str, with: impl FnOnce(&mut CoroutineRecord) -> R) -> Option<R> {
        let mut coroutines = self.coroutines.borrow_mut();
        coroutines.get_mut(name).map(with)
    }

    pub fn remove_coroutine(&mut self, name: &str) -> Option<CoroutineRecord> {
        self.coroutines.borrow_mut().shift_remove(name)
    }

    /// Resets the live loop-nesting-depth counter; called once at the start
    /// of each coroutine run/resume, since every loop-state stack lookup is
    /// otherwise keyed off it (§4.7 "Loop-state stack").
    pub(crate) fn reset_loop_depth(&mut self) {
        self.loop_depth = 0;
    }

    /// Begins one invocation of a `while`/`for`/`foreach` loop. Outside a
    /// coroutine this is a no-op handle. Inside one, it looks up this loop's
    /// slot on the coroutine's loop-state stack (by nesting depth) and
    /// fast-forwards `yield_count` past the yields its already-completed
    /// iterations consumed, so the caller can skip re-running those
    /// iterations' bodies without losing replay alignment (§4.7 "Loop-state
    /// stack").
    pub fn loop_enter(&mut self) -> LoopHandle {
        let Some(name) = self.current_coroutine.clone() else {
            return LoopHandle { coroutine: None, depth: 0, skip: 0, base: 0 };
        };
        let depth = self.loop_depth;
        self.loop_depth += 1;
        let state = self.with_coroutine(&name, |r| r.loop_stack.get(depth).copied().unwrap_or_default()).unwrap_or_default();
        if state.yields > 0 {
            self.with_coroutine(&name, |r| r.yield_count += state.yields);
        }
        let base = self.with_coroutine(&name, |r| r.yield_count).unwrap_or(0);
        LoopHandle { coroutine: Some(name), depth, skip: state.completed, base }
    }

    /// The `yield_count` consumed since `handle`'s loop started, i.e. since
    /// its last fully-completed iteration plus whatever the live one has
    /// used so far. Callers checkpoint this right after an iteration
    /// finishes cleanly, when it exactly attributes to completed iterations
    /// and not to one still in flight.
    pub fn loop_delta(&self, handle: &LoopHandle) -> u32 {
        let Some(name) = &handle.coroutine else { return 0 };
        self.with_coroutine(name, |r| r.yield_count.saturating_sub(handle.base)).unwrap_or(0)
    }

    /// Writes `handle`'s loop-state stack slot directly: `completed`
    /// iterations have finished, having consumed `yields` calls to `yield`
    /// since the loop started. Pass the `yields` value from the last
    /// iteration that actually completed — not a value measured after a
    /// later iteration has partially run — so a mid-iteration suspend
    /// doesn't attribute that iteration's own yields to ones already done.
    pub fn loop_checkpoint(&mut self, handle: &LoopHandle, completed: u32, yields: u32) {
        let Some(name) = handle.coroutine.clone() else { return };
        let depth = handle.depth;
        self.with_coroutine(&name, |r| {
            if r.loop_stack.len() <= depth {
                r.loop_stack.resize(depth + 1, LoopState::default());
            }
            r.loop_stack[depth] = LoopState { completed, yields };
        });
    }

    /// Ends a loop invocation that ran to completion (or broke out) without
    /// suspending: clears its slot, since nothing needs to be skipped on the
    /// next resume.
    pub fn loop_exit(&mut self, handle: &LoopHandle) {
        self.loop_depth = handle.depth;
        if let Some(name) = &handle.coroutine {
            let depth = handle.depth;
            self.with_coroutine(name, |r| r.loop_stack.truncate(depth));
        }
    }

    /// Ends a loop invocation that suspended mid-iteration: the slot
    /// [`Interpreter::loop_checkpoint`] already wrote stays on the stack, only
    /// the live depth counter needs restoring.
    pub fn loop_suspend(&mut self, handle: &LoopHandle) {
        self.loop_depth = handle.depth;
    }
}
