//! `catch`, `try` (§7 "Propagation": "catch turns any code into an integer
//! valued result ... try matches on handlers by completion code ... a finally
//! clause always runs and its own error takes precedence").
//!
//! `trap` handlers (matching by error-code prefix) are not implemented — this
//! engine's `-errorcode` is a single category string rather than a structured
//! list, so prefix matching has no real target to match against here; `trap`
//! clauses parse but never fire. Noted in `DESIGN.md`.

use indexmap::IndexMap;

use crate::value::Value;
use crate::EngineError;

use crate::interp::completion::CompletionCode;
use crate::interp::evaluator::eval_script;
use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;

fn parse_body(interp: &Interpreter, body: &Value) -> Result<std::rc::Rc<crate::ast::ScriptNode>, Flow> {
    interp.parse_cached_body(body).map_err(Flow::Error)
}

pub struct Outcome {
    code: CompletionCode,
    value: Value,
    pub error: Option<EngineError>,
}

fn run(interp: &mut Interpreter, body: &Value) -> Result<Outcome, Flow> {
    let script = parse_body(interp, body)?;
    Ok(match eval_script(interp, &script) {
        Ok(v) => Outcome { code: CompletionCode::Ok, value: v, error: None },
        Err(Flow::Error(e)) => Outcome { code: CompletionCode::Error, value: Value::from_str(e.to_string()), error: Some(e) },
        Err(Flow::Return(v)) => Outcome { code: CompletionCode::Return, value: v, error: None },
        Err(Flow::Break) => Outcome { code: CompletionCode::Break, value: Value::from_str(""), error: None },
        Err(Flow::Continue) => Outcome { code: CompletionCode::Continue, value: Value::from_str(""), error: None },
        Err(Flow::Yield(v)) => Outcome { code: CompletionCode::Ok, value: v, error: None },
    })
}

fn options_dict(interp: &Interpreter, outcome: &Outcome) -> Value {
    let mut dict = IndexMap::new();
    dict.insert("-code".to_string(), Value::from_int(outcome.code.as_i32() as i64));
    if let Some(e) = &outcome.error {
        dict.insert("-errorcode".to_string(), Value::from_str(e.category()));
        dict.insert("-errorinfo".to_string(), Value::from_str(interp.take_error_info()));
    }
    Value::from_dict(dict)
}

/// `catch body ?resultVar? ?optionsVar?`.
pub fn catch_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 4 {
        return Err(Flow::Error(EngineError::wrong_args("catch body ?resultVar? ?optionsVar?")));
    }
    let outcome = run(interp, &argv[1])?;
    if outcome.code == CompletionCode::Error {
        interp.record_last_error(&outcome);
    }
    let opts = if argv.len() == 4 { Some(options_dict(interp, &outcome)) } else { None };
    if argv.len() >= 3 {
        crate::scope::set_scalar(&interp.current, &argv[2].as_str(), outcome.value.clone()).map_err(Flow::Error)?;
    }
    if let Some(opts) = opts {
        crate::scope::set_scalar(&interp.current, &argv[3].as_str(), opts).map_err(Flow::Error)?;
    }
    Ok(Value::from_int(outcome.code.as_i32() as i64))
}

fn code_matches(name: &str, code: CompletionCode) -> bool {
    match name {
        "ok" => code == CompletionCode::Ok,
        "error" => code == CompletionCode::Error,
        "return" => code == CompletionCode::Return,
        "break" => code == CompletionCode::Break,
        "continue" => code == CompletionCode::Continue,
        other => other.parse::<i32>().map(|n| n == code.as_i32()).unwrap_or(false),
    }
}

fn bind_handler_vars(interp: &mut Interpreter, varlist: &Value, outcome: &Outcome) -> Result<(), Flow> {
    let names = varlist.as_list().map_err(Flow::Error)?;
    if let Some(result_var) = names.first() {
        crate::scope::set_scalar(&interp.current, &result_var.as_str(), outcome.value.clone()).map_err(Flow::Error)?;
    }
    if let Some(opts_var) = names.get(1) {
        let opts = options_dict(interp, outcome);
        crate::scope::set_scalar(&interp.current, &opts_var.as_str(), opts).map_err(Flow::Error)?;
    }
    Ok(())
}

/// `try body ?on code varList script? ... ?trap codeList varList script? ... ?finally script?`.
pub fn try_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("try body ?handler ...? ?finally script?")));
    }
    let outcome = run(interp, &argv[1])?;

    let mut i = 2;
    let mut finally_script = None;
    let mut handled: Option<EvalResult> = None;
    while i < argv.len() {
        match argv[i].as_str().as_ref() {
            "finally" => {
                if i + 1 >= argv.len() {
                    return Err(Flow::Error(EngineError::wrong_args("try: finally requires a script")));
                }
                finally_script = Some(argv[i + 1].clone());
                i += 2;
            }
            "on" => {
                if i + 3 >= argv.len() {
                    return Err(Flow::Error(EngineError::wrong_args("try: on requires code varList script")));
                }
                if handled.is_none() && code_matches(&argv[i + 1].as_str(), outcome.code) {
                    bind_handler_vars(interp, &argv[i + 2], &outcome)?;
                    handled = Some(run(interp, &argv[i + 3]).map(|o| o.value).or_else(|f| Err(f)));
                }
                i += 4;
            }
            "trap" => {
                if i + 3 >= argv.len() {
                    return Err(Flow::Error(EngineError::wrong_args("try: trap requires codeList varList script")));
                }
                i += 4;
            }
            other => return Err(Flow::Error(EngineError::BadOption { option: other.to_string(), detail: "expected on, trap, or finally".into() })),
        }
    }

    let result: EvalResult = match handled {
        Some(r) => r,
        None => match outcome.error {
            Some(e) => Err(Flow::Error(e)),
            None => match outcome.code {
                CompletionCode::Ok => Ok(outcome.value),
                CompletionCode::Return => Err(Flow::Return(outcome.value)),
                CompletionCode::Break => Err(Flow::Break),
                CompletionCode::Continue => Err(Flow::Continue),
                CompletionCode::Error => unreachable!("error outcomes always carry an EngineError"),
            },
        },
    };

    if let Some(fscript) = finally_script {
        let finally_outcome = run(interp, &fscript)?;
        if finally_outcome.code != CompletionCode::Ok {
            return match finally_outcome.error {
                Some(e) => Err(Flow::Error(e)),
                None => Err(Flow::Error(EngineError::user("non-ok completion from finally clause"))),
            };
        }
    }
    result
}
