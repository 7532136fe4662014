//! `coroutine`, `yield`, `yieldto`, and resuming a coroutine by invoking its
//! name as a command (§4.7 "Coroutine state machine").
//!
//! Resuming re-runs the coroutine's command from the very start every time
//! (§4.7 "Correctness caveat"): `yield_count`/`yield_target` on the
//! [`crate::interp::coroutine::CoroutineRecord`] make every yield below the
//! target silently replay rather than suspend, so only code genuinely
//! side-effect-free (or idempotent) up to the replayed point behaves
//! correctly across a resume. A replayed `yield` cannot recover the value a
//! *previous* resume passed at that exact point — this implementation
//! returns the most recent resume value for every replayed yield, which is
//! exact for the common one-resume-in-flight case and an approximation only
//! when a coroutine inspects its yield's return value on a later replay.
//! `yieldto` shares this same counting so it replays or suspends in lockstep
//! with `yield`. Loops straddling a suspension point register their own
//! progress on the coroutine's loop-state stack (see `control_flow.rs`) so a
//! resume can skip their completed iterations instead of re-running them.

use crate::scope::Frame;
use crate::value::Value;
use crate::EngineError;

use crate::interp::coroutine::CoroutineState;
use crate::interp::dispatch;
use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;
use crate::interp::trace::TraceEvent;

/// `coroutine name command ?arg ...?`: registers `name` in the `created`
/// state without running `command` yet (§4.7 state table: `created` is
/// entered by this command and left only by the first invocation of `name`,
/// which is what actually runs the body up to its first suspension or
/// completion).
pub fn coroutine_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 3 {
        return Err(Flow::Error(EngineError::wrong_args("coroutine name command ?arg ...?")));
    }
    let name = argv[1].as_str().to_string();
    if interp.coroutine_exists(&name) {
        return Err(Flow::Error(EngineError::NameCollision { kind: "coroutine", name }));
    }
    let frame = Frame::new_call(interp.global.clone(), true);
    let command = argv[2..].to_vec();
    interp.create_coroutine(name, frame, command);
    Ok(Value::from_str(""))
}

/// `yield ?value?`: suspends the enclosing coroutine unless this call is
/// being replayed toward a later suspension point (§4.7 "Yield").
pub fn yield_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() > 2 {
        return Err(Flow::Error(EngineError::wrong_args("yield ?value?")));
    }
    let value = argv.get(1).cloned().unwrap_or_else(|| Value::from_str(""));
    let name = interp
        .current_coroutine
        .clone()
        .ok_or_else(|| Flow::Error(EngineError::user("yield can only be called inside a coroutine")))?;
    let (suspend, resume_value) = interp
        .with_coroutine(&name, |record| {
            let replaying = record.is_replaying();
            record.yield_count += 1;
            (!replaying, record.resume_value.clone())
        })
        .expect("current_coroutine always names a live coroutine");
    if suspend {
        Err(Flow::Yield(value))
    } else {
        Ok(resume_value)
    }
}

/// `yieldto command ?arg ...?`: a reduced form of Tcl's tail-call-merging
/// `yieldto` — runs `command` to completion in the current frame, then
/// suspends the coroutine with that result, rather than truly splicing the
/// callee's own continuation into this coroutine's call chain. Goes through
/// the same replay gate as `yield` (§4.7 "`yieldto`... same as yield"): on a
/// resume that's still replaying toward a later suspension point, this call
/// neither re-dispatches `command` nor suspends, it just hands back the
/// resume value.
pub fn yieldto_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("yieldto command ?arg ...?")));
    }
    let name = interp
        .current_coroutine
        .clone()
        .ok_or_else(|| Flow::Error(EngineError::user("yieldto can only be called inside a coroutine")))?;
    let (replaying, resume_value) = interp
        .with_coroutine(&name, |record| (record.is_replaying(), record.resume_value.clone()))
        .expect("current_coroutine always names a live coroutine");
    if replaying {
        interp.with_coroutine(&name, |record| record.yield_count += 1);
        return Ok(resume_value);
    }
    let value = dispatch::dispatch(interp, &argv[1..], 0)?;
    interp.with_coroutine(&name, |record| record.yield_count += 1);
    Err(Flow::Yield(value))
}

/// Resumes a suspended coroutine by invoking its name as a command, carrying
/// an optional value back into the matching `yield` (§4.5 step 3, §4.7
/// "Resume").
pub fn invoke_named(interp: &mut Interpreter, name: &str, argv: &[Value]) -> EvalResult {
    if argv.len() > 2 {
        return Err(Flow::Error(EngineError::wrong_args("coroutineName ?value?")));
    }
    let state = interp
        .with_coroutine(name, |r| r.state)
        .ok_or_else(|| Flow::Error(EngineError::NameNotFound { kind: "command", name: format!("invalid command name \"{name}\"") }))?;
    match state {
        CoroutineState::Done => {
            // A finished coroutine stops existing as a command, just like a
            // deleted proc (§8: "coroutine invoked after done -> invalid command name").
            interp.remove_coroutine(name);
            Err(Flow::Error(EngineError::NameNotFound { kind: "command", name: format!("invalid command name \"{name}\"") }))
        }
        CoroutineState::Running => Err(Flow::Error(EngineError::user(format!("coroutine \"{name}\" is already running")))),
        CoroutineState::Created => run(interp, name),
        CoroutineState::Suspended => {
            let resume_value = argv.get(1).cloned().unwrap_or_else(|| Value::from_str(""));
            interp.with_coroutine(name, |r| r.begin_resume(resume_value));
            run(interp, name)
        }
    }
}

fn run(interp: &mut Interpreter, name: &str) -> EvalResult {
    let frame = interp.with_coroutine(name, |r| r.frame.clone()).expect("coroutine exists for the duration of run");
    let command = interp.with_coroutine(name, |r| r.command.clone()).expect("coroutine exists for the duration of run");
    interp.with_coroutine(name, |r| r.state = CoroutineState::Running);
    interp.reset_loop_depth();

    let saved_current = std::mem::replace(&mut interp.current, frame);
    let saved_coroutine = interp.current_coroutine.replace(name.to_string());
    if let Some(tracer) = interp.tracer() {
        tracer(&TraceEvent::CoroutineResume { name: name.to_string() });
    }
    let result = dispatch::dispatch(interp, &command, 0);
    interp.current = saved_current;
    interp.current_coroutine = saved_coroutine;

    match result {
        Ok(v) => {
            interp.with_coroutine(name, |r| {
                r.state = CoroutineState::Done;
                r.last_value = v.clone();
            });
            Ok(v)
        }
        Err(Flow::Yield(v)) => {
            interp.with_coroutine(name, |r| {
                r.state = CoroutineState::Suspended;
                r.last_value = v.clone();
            });
            if let Some(tracer) = interp.tracer() {
                tracer(&TraceEvent::CoroutineSuspend { name: name.to_string() });
            }
            Ok(v)
        }
        Err(Flow::Return(v)) => {
            interp.with_coroutine(name, |r| {
                r.state = CoroutineState::Done;
                r.last_value = v.clone();
            });
            Ok(v)
        }
        Err(Flow::Error(e)) => {
            interp.remove_coroutine(name);
            Err(Flow::Error(e))
        }
        Err(other @ (Flow::Break | Flow::Continue)) => {
            interp.remove_coroutine(name);
            Err(Flow::Error(EngineError::user(format!("{other:?} escaped coroutine \"{name}\""))))
        }
    }
}
