//! Command dispatch (§4.5): resolves the first argument's serialized form
//! against the builtin table, the host's command records, and live
//! coroutines, in that order, and carries out user-procedure invocation
//! (argument binding, activation frame, body evaluation) and alias
//! redispatch.

use crate::scope::Frame;
use crate::value::Value;
use crate::EngineError;

use super::evaluator;
use super::flow::{EvalResult, Flow};
use super::host::{HostCommand, ProcRecord};
use super::interpreter::Interpreter;
use super::trace::TraceEvent;

pub fn dispatch(interp: &mut Interpreter, argv: &[Value], line: usize) -> EvalResult {
    let name = argv[0].as_str().to_string();
    if let Some(builtin) = interp.lookup_builtin(&name) {
        return builtin(interp, argv);
    }
    match interp.host_lookup_command(&name) {
        Some(HostCommand::Proc(record)) => invoke_proc(interp, &name, &record, argv),
        Some(HostCommand::Alias { target, prefix }) => {
            let mut redirected = vec![Value::from_str(target)];
            redirected.extend(prefix);
            redirected.extend_from_slice(&argv[1..]);
            dispatch(interp, &redirected, line)
        }
        Some(HostCommand::Extension) => {
            let (code, value) = interp.host_invoke_extension(&name, &argv[1..]).map_err(Flow::Error)?;
            match code {
                crate::interp::CompletionCode::Ok => Ok(value),
                crate::interp::CompletionCode::Error => Err(Flow::Error(EngineError::HostFailure { detail: value.as_str().to_string() })),
                crate::interp::CompletionCode::Return => Err(Flow::Return(value)),
                crate::interp::CompletionCode::Break => Err(Flow::Break),
                crate::interp::CompletionCode::Continue => Err(Flow::Continue),
            }
        }
        None => {
            if interp.coroutine_exists(&name) {
                return super::builtins::coroutine_cmd::invoke_named(interp, &name, argv);
            }
            Err(Flow::Error(EngineError::NameNotFound { kind: "command", name: format!("invalid command name \"{name}\"") }))
        }
    }
}

struct Formal {
    name: String,
    default: Option<Value>,
}

/// Parses a procedure's argspec (§4.5: "each parameter is either a simple name
/// or a `{name default}` pair; a trailing parameter literally named `args` is
/// the rest parameter").
fn parse_argspec(argspec: &Value) -> Result<(Vec<Formal>, bool), EngineError> {
    let elements = argspec.as_list()?;
    let mut formals = Vec::with_capacity(elements.len());
    let mut has_rest = false;
    let count = elements.len();
    for (i, elem) in elements.iter().enumerate() {
        let fields = elem.as_list()?;
        let (name, default) = match fields.len() {
            1 => (fields[0].as_str().to_string(), None),
            2 => (fields[0].as_str().to_string(), Some(fields[1].clone())),
            _ => {
                return Err(EngineError::BadOption {
                    option: "argspec".into(),
                    detail: format!("too many fields in argument specifier \"{}\"", elem.as_str()),
                })
            }
        };
        if i + 1 == count && name == "args" {
            has_rest = true;
        }
        formals.push(Formal { name, default });
    }
    Ok((formals, has_rest))
}

fn bind_args(formals: &[Formal], has_rest: bool, actuals: &[Value], frame: &crate::scope::FrameRef) -> Result<(), EngineError> {
    let positional_count = if has_rest { formals.len() - 1 } else { formals.len() };
    let required = formals[..positional_count].iter().filter(|f| f.default.is_none()).count();
    let max = if has_rest { usize::MAX } else { formals.len() };
    if actuals.len() < required || actuals.len() > max {
        return Err(EngineError::wrong_args(format!(
            "called with {} argument(s), expected {}{}",
            actuals.len(),
            required,
            if has_rest || max != required { " or more".to_string() } else { String::new() }
        )));
    }
    let mut next = 0;
    for formal in &formals[..positional_count] {
        let value = if next < actuals.len() {
            next += 1;
            actuals[next - 1].clone()
        } else {
            formal.default.clone().expect("bind_args validated required-count above")
        };
        crate::scope::set_scalar(frame, &formal.name, value)?;
    }
    if has_rest {
        crate::scope::set_scalar(frame, "args", Value::from_list(actuals[next..].to_vec()))?;
    }
    Ok(())
}

pub fn invoke_proc(interp: &mut Interpreter, name: &str, record: &ProcRecord, argv: &[Value]) -> EvalResult {
    let (formals, has_rest) = parse_argspec(&record.argspec).map_err(Flow::Error)?;
    if interp.current.borrow().depth as u32 >= interp.limits().max_recursion_depth {
        return Err(Flow::Error(EngineError::user("too many nested evaluations (infinite recursion?)")));
    }
    let new_frame = Frame::new_call(interp.current.clone(), false);
    bind_args(&formals, has_rest, &argv[1..], &new_frame).map_err(Flow::Error)?;
    let body_script = interp.parse_cached_body(&record.body).map_err(Flow::Error)?;

    let saved = std::mem::replace(&mut interp.current, new_frame);
    if let Some(tracer) = interp.tracer() {
        tracer(&TraceEvent::ProcCall { name: name.to_string(), depth: interp.current.borrow().depth });
    }
    let result = evaluator::eval_body(interp, &body_script);
    if let Some(tracer) = interp.tracer() {
        tracer(&TraceEvent::ProcReturn { name: name.to_string(), depth: interp.current.borrow().depth });
    }
    interp.current = saved;
    result
}
