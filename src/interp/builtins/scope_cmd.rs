//! `set`, `unset`, `global`, `upvar`, `variable` (§4.6 "Scope and linking").

use crate::scope::{self, Level};
use crate::value::Value;
use crate::EngineError;

use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;

/// `set varName ?newValue?`. `varName` may be `name(index)` to read/write a
/// single array element (§3 "Variable table", §8 "$a() resolves to the
/// element named with the empty key").
pub fn set_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    match argv.len() {
        2 => {
            let name = argv[1].as_str();
            match scope::split_array_ref(&name) {
                Some((base, index)) => scope::get_array_elem(&interp.current, base, index).map_err(Flow::Error),
                None => scope::get_scalar(&interp.current, &name).map_err(Flow::Error),
            }
        }
        3 => {
            let name = argv[1].as_str();
            match scope::split_array_ref(&name) {
                Some((base, index)) => {
                    scope::set_array_elem(&interp.current, base, index, argv[2].clone()).map_err(Flow::Error)?;
                }
                None => {
                    scope::set_scalar(&interp.current, &name, argv[2].clone()).map_err(Flow::Error)?;
                }
            }
            Ok(argv[2].clone())
        }
        _ => Err(Flow::Error(EngineError::wrong_args("set varName ?newValue?"))),
    }
}

pub fn unset_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("unset ?varName ...?")));
    }
    for name in &argv[1..] {
        let name = name.as_str();
        scope::unset(&interp.current, &name).map_err(Flow::Error)?;
    }
    Ok(Value::from_str(""))
}

pub fn global_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("global name ?name ...?")));
    }
    let global = interp.global.clone();
    for name in &argv[1..] {
        let name = name.as_str().to_string();
        scope::link(&interp.current, &name, global.clone(), &name).map_err(Flow::Error)?;
    }
    Ok(Value::from_str(""))
}

/// `upvar ?level? other local ?other local ...?` (§4.6).
pub fn upvar_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 3 {
        return Err(Flow::Error(EngineError::wrong_args("upvar ?level? other local ?other local ...?")));
    }
    // An explicit level consumes one slot, so it is only present when doing so
    // leaves an even number of `other local` pairs behind (i.e. the untrimmed
    // argument count is odd). Without it, `upvar other local ...` defaults to
    // level 1 (the caller's own frame).
    let mut rest = &argv[1..];
    let level = match Level::parse(&rest[0].as_str()) {
        Some(level) if rest.len() % 2 != 0 => {
            rest = &rest[1..];
            level
        }
        _ => Level::Relative(1),
    };
    if rest.is_empty() || rest.len() % 2 != 0 {
        return Err(Flow::Error(EngineError::wrong_args("upvar: odd number of name pairs")));
    }
    let target = scope::frame_at_level(&interp.current, level).map_err(Flow::Error)?;
    let mut pair = rest.chunks(2);
    while let Some([other, local]) = pair.next() {
        scope::link(&interp.current, &local.as_str(), target.clone(), &other.as_str()).map_err(Flow::Error)?;
    }
    Ok(Value::from_str(""))
}

/// `variable name ?value?` — like `global` but also initializes the value in
/// the global frame if given, a convenience most Tcl-like languages layer on
/// top of plain linking.
pub fn variable_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 3 {
        return Err(Flow::Error(EngineError::wrong_args("variable name ?value?")));
    }
    let name = argv[1].as_str().to_string();
    let global = interp.global.clone();
    if argv.len() == 3 && !scope::exists_scalar(&global, &name) {
        scope::set_scalar(&global, &name, argv[2].clone()).map_err(Flow::Error)?;
    }
    scope::link(&interp.current, &name, global, &name).map_err(Flow::Error)?;
    Ok(Value::from_str(""))
}
