//! `if`, `while`, `for`, `foreach`, `break`, `continue` — the loop and
//! conditional builtins. The three loop forms register their transient
//! iteration state with the enclosing coroutine (`Interpreter::loop_enter` /
//! `loop_delta` / `loop_checkpoint` / `loop_exit` / `loop_suspend`, §4.7
//! "Loop-state stack"), so a resume can skip iterations that already ran to
//! completion instead of re-invoking their bodies. Outside a coroutine these
//! calls are no-ops.
//!
//! Each loop tracks a local `committed` count: the `yield_count` consumed by
//! iterations that have *actually finished*, as of the last one to do so.
//! On suspend this is what gets written to the loop-state stack, not a fresh
//! read of the live delta — the in-flight iteration that's suspending has
//! itself consumed part of that live delta, and attributing that to
//! "completed" iterations would make a later resume skip re-running the part
//! of this iteration that hasn't happened yet.

use std::rc::Rc;

use crate::parser::parse_script;
use crate::value::Value;
use crate::EngineError;

use crate::interp::evaluator::eval_script;
use crate::interp::expr;
use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;

fn parse_body(interp: &Interpreter, body: &Value) -> Result<Rc<crate::ast::ScriptNode>, Flow> {
    interp.parse_cached_body(body).map_err(Flow::Error)
}

pub fn if_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    let mut i = 1;
    loop {
        if i >= argv.len() {
            return Err(Flow::Error(EngineError::wrong_args("if cond ?then? body ?elseif cond ?then? body ...? ?else? ?body?")));
        }
        let cond = argv[i].as_str().to_string();
        i += 1;
        if i < argv.len() && argv[i].as_str().as_ref() == "then" {
            i += 1;
        }
        if i >= argv.len() {
            return Err(Flow::Error(EngineError::wrong_args("if: missing body")));
        }
        let body = argv[i].clone();
        i += 1;
        if expr::eval_bool(interp, &cond).map_err(Flow::Error)? {
            return eval_script(interp, &parse_body(interp, &body)?);
        }
        if i >= argv.len() {
            return Ok(Value::from_str(""));
        }
        match argv[i].as_str().as_ref() {
            "elseif" => {
                i += 1;
                continue;
            }
            "else" => {
                i += 1;
                let body = argv.get(i).cloned().ok_or_else(|| Flow::Error(EngineError::wrong_args("if: missing else body")))?;
                return eval_script(interp, &parse_body(interp, &body)?);
            }
            _ => {
                let body = argv[i].clone();
                return eval_script(interp, &parse_body(interp, &body)?);
            }
        }
    }
}

pub fn while_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 3 {
        return Err(Flow::Error(EngineError::wrong_args("while cond body")));
    }
    let cond = argv[1].as_str().to_string();
    let body = parse_body(interp, &argv[2])?;
    let handle = interp.loop_enter();
    let mut i: u32 = 0;
    let mut committed: u32 = 0;
    loop {
        if !expr::eval_bool(interp, &cond).map_err(Flow::Error)? {
            interp.loop_exit(&handle);
            return Ok(Value::from_str(""));
        }
        if i < handle.skip {
            i += 1;
            continue;
        }
        match eval_script(interp, &body) {
            Ok(_) => {
                i += 1;
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i, committed);
            }
            Err(Flow::Break) => {
                interp.loop_exit(&handle);
                return Ok(Value::from_str(""));
            }
            Err(Flow::Continue) => {
                i += 1;
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i, committed);
            }
            Err(Flow::Yield(v)) => {
                interp.loop_checkpoint(&handle, i, committed);
                interp.loop_suspend(&handle);
                return Err(Flow::Yield(v));
            }
            Err(other) => {
                interp.loop_exit(&handle);
                return Err(other);
            }
        }
    }
}

pub fn for_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 5 {
        return Err(Flow::Error(EngineError::wrong_args("for start cond next body")));
    }
    let start = parse_script(&argv[1].as_str()).map_err(Flow::Error)?;
    let cond = argv[2].as_str().to_string();
    let next = parse_script(&argv[3].as_str()).map_err(Flow::Error)?;
    let body = parse_body(interp, &argv[4])?;
    eval_script(interp, &Rc::new(start))?;
    let handle = interp.loop_enter();
    let mut i: u32 = 0;
    let mut committed: u32 = 0;
    loop {
        if !expr::eval_bool(interp, &cond).map_err(Flow::Error)? {
            interp.loop_exit(&handle);
            return Ok(Value::from_str(""));
        }
        if i < handle.skip {
            eval_script(interp, &Rc::new(next.clone()))?;
            i += 1;
            continue;
        }
        match eval_script(interp, &body) {
            Ok(_) => {
                i += 1;
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i, committed);
            }
            Err(Flow::Break) => {
                interp.loop_exit(&handle);
                return Ok(Value::from_str(""));
            }
            Err(Flow::Continue) => {
                i += 1;
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i, committed);
            }
            Err(Flow::Yield(v)) => {
                interp.loop_checkpoint(&handle, i, committed);
                interp.loop_suspend(&handle);
                return Err(Flow::Yield(v));
            }
            Err(other) => {
                interp.loop_exit(&handle);
                return Err(other);
            }
        }
        eval_script(interp, &Rc::new(next.clone()))?;
    }
}

/// `foreach varName list body` (the multi-list-and-multi-variable form is out
/// of scope; this covers the single-variable case generally, including the
/// one a coroutine body suspends from mid-iteration).
pub fn foreach_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 4 {
        return Err(Flow::Error(EngineError::wrong_args("foreach varName list body")));
    }
    let var_name = argv[1].as_str().to_string();
    let elements = argv[2].as_list().map_err(Flow::Error)?;
    let body = parse_body(interp, &argv[3])?;
    let handle = interp.loop_enter();
    let mut committed: u32 = 0;
    for (idx, element) in elements.iter().enumerate() {
        let i = idx as u32;
        if i < handle.skip {
            continue;
        }
        crate::scope::set_scalar(&interp.current, &var_name, element.clone()).map_err(Flow::Error)?;
        match eval_script(interp, &body) {
            Ok(_) => {
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i + 1, committed);
            }
            Err(Flow::Break) => {
                interp.loop_exit(&handle);
                return Ok(Value::from_str(""));
            }
            Err(Flow::Continue) => {
                committed = interp.loop_delta(&handle);
                interp.loop_checkpoint(&handle, i + 1, committed);
            }
            Err(Flow::Yield(v)) => {
                interp.loop_checkpoint(&handle, i, committed);
                interp.loop_suspend(&handle);
                return Err(Flow::Yield(v));
            }
            Err(other) => {
                interp.loop_exit(&handle);
                return Err(other);
            }
        }
    }
    interp.loop_exit(&handle);
    Ok(Value::from_str(""))
}

pub fn break_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 1 {
        return Err(Flow::Error(EngineError::wrong_args("break")));
    }
    Err(Flow::Break)
}

pub fn continue_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 1 {
        return Err(Flow::Error(EngineError::wrong_args("continue")));
    }
    Err(Flow::Continue)
}
