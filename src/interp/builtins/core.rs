//! `incr`, `append`, `error`, `expr`, `rename`, `command` — the remaining
//! ambient builtins that don't belong with scoping, control flow, or lists.

use crate::value::Value;
use crate::EngineError;

use crate::interp::expr;
use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;

pub fn incr_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 3 {
        return Err(Flow::Error(EngineError::wrong_args("incr varName ?increment?")));
    }
    let name = argv[1].as_str().to_string();
    let delta = match argv.get(2) {
        Some(v) => v.as_int().map_err(Flow::Error)?,
        None => 1,
    };
    let current = match crate::scope::get_scalar(&interp.current, &name) {
        Ok(v) => v.as_int().map_err(Flow::Error)?,
        Err(EngineError::NameNotFound { .. }) => 0,
        Err(e) => return Err(Flow::Error(e)),
    };
    let updated = Value::from_int(current + delta);
    crate::scope::set_scalar(&interp.current, &name, updated.clone()).map_err(Flow::Error)?;
    Ok(updated)
}

pub fn append_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("append varName ?value ...?")));
    }
    let name = argv[1].as_str().to_string();
    let mut text = match crate::scope::get_scalar(&interp.current, &name) {
        Ok(v) => v.as_str().to_string(),
        Err(EngineError::NameNotFound { .. }) => String::new(),
        Err(e) => return Err(Flow::Error(e)),
    };
    for value in &argv[2..] {
        text.push_str(&value.as_str());
    }
    let updated = Value::from_str(text);
    crate::scope::set_scalar(&interp.current, &name, updated.clone()).map_err(Flow::Error)?;
    Ok(updated)
}

/// `error message ?errorCode? ?errorInfo?` (§7: "raises a fresh `ERROR`
/// carrying the given message").
pub fn error_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 4 {
        return Err(Flow::Error(EngineError::wrong_args("error message ?errorCode? ?errorInfo?")));
    }
    let message = argv[1].as_str().to_string();
    let error_code = argv.get(2).map(|v| v.as_str().to_string());
    Err(Flow::Error(EngineError::UserError { message, error_code }))
}

pub fn expr_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("expr arg ?arg ...?")));
    }
    let text = argv[1..].iter().map(|v| v.as_str().to_string()).collect::<Vec<_>>().join(" ");
    expr::eval_expr(interp, &text).map_err(Flow::Error)
}

pub fn rename_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 3 {
        return Err(Flow::Error(EngineError::wrong_args("rename oldName newName")));
    }
    interp.host_rename_command(&argv[1].as_str(), &argv[2].as_str()).map_err(Flow::Error)?;
    Ok(Value::from_str(""))
}

/// `command exists name`, `command list ?pattern?` — minimal introspection
/// (§6 "enumerate_commands").
pub fn command_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("command exists name | command list ?pattern?")));
    }
    match argv[1].as_str().as_ref() {
        "exists" => {
            let name = argv.get(2).ok_or_else(|| Flow::Error(EngineError::wrong_args("command exists name")))?;
            Ok(Value::from_bool(interp.host_command_exists(&name.as_str())))
        }
        "list" => {
            let pattern = argv.get(2).map(|v| v.as_str().to_string());
            let names = interp.host_enumerate_commands(pattern.as_deref());
            Ok(Value::from_list(names.into_iter().map(Value::from_str).collect()))
        }
        other => Err(Flow::Error(EngineError::BadOption { option: other.to_string(), detail: "expected exists or list".into() })),
    }
}
