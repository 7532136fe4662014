//! `proc`, `return` (§4.5 "User procedure invocation").

use crate::value::Value;
use crate::EngineError;

use crate::interp::flow::{EvalResult, Flow};
use crate::interp::host::ProcRecord;
use crate::interp::interpreter::Interpreter;

pub fn proc_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 4 {
        return Err(Flow::Error(EngineError::wrong_args("proc name args body")));
    }
    let name = argv[1].as_str().to_string();
    interp.host_register_proc(&name, ProcRecord { argspec: argv[2].clone(), body: argv[3].clone() });
    Ok(Value::from_str(""))
}

/// `return ?value?`. Unwinds to the nearest enclosing proc invocation, where
/// it collapses to `OK` (§4.5, §7).
pub fn return_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() > 2 {
        return Err(Flow::Error(EngineError::wrong_args("return ?value?")));
    }
    let value = argv.get(1).cloned().unwrap_or_else(|| Value::from_str(""));
    Err(Flow::Return(value))
}
