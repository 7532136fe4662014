//! `list`, `lappend`, `llength`, `lindex`, `join`, `split`, `subst`, `eval`,
//! `dict` — the list/dict and meta-evaluation builtins (§4.4, §9 "list and
//! dict are the two built-in structured typed forms").

use indexmap::IndexMap;

use crate::value::Value;
use crate::EngineError;

use crate::interp::evaluator::eval_script;
use crate::interp::flow::{EvalResult, Flow};
use crate::interp::interpreter::Interpreter;
use crate::interp::subst::{subst, SubstOptions};

pub fn list_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    Ok(Value::from_list(argv[1..].to_vec()))
}

pub fn lappend_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("lappend varName ?value ...?")));
    }
    let name = argv[1].as_str().to_string();
    let mut elements = match crate::scope::get_scalar(&interp.current, &name) {
        Ok(v) => v.as_list().map_err(Flow::Error)?.as_ref().clone(),
        Err(EngineError::NameNotFound { .. }) => Vec::new(),
        Err(e) => return Err(Flow::Error(e)),
    };
    elements.extend_from_slice(&argv[2..]);
    let updated = Value::from_list(elements);
    crate::scope::set_scalar(&interp.current, &name, updated.clone()).map_err(Flow::Error)?;
    Ok(updated)
}

pub fn llength_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 2 {
        return Err(Flow::Error(EngineError::wrong_args("llength list")));
    }
    Ok(Value::from_int(argv[1].as_list().map_err(Flow::Error)?.len() as i64))
}

pub fn lindex_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() != 3 {
        return Err(Flow::Error(EngineError::wrong_args("lindex list index")));
    }
    let elements = argv[1].as_list().map_err(Flow::Error)?;
    let index = argv[2].as_int().map_err(Flow::Error)?;
    if index < 0 || index as usize >= elements.len() {
        return Err(Flow::Error(EngineError::IndexOutOfRange { index, context: format!("list of length {}", elements.len()) }));
    }
    Ok(elements[index as usize].clone())
}

pub fn join_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 3 {
        return Err(Flow::Error(EngineError::wrong_args("join list ?separator?")));
    }
    let elements = argv[1].as_list().map_err(Flow::Error)?;
    let sep = argv.get(2).map(|v| v.as_str().to_string()).unwrap_or_else(|| " ".to_string());
    let joined = elements.iter().map(|v| v.as_str().to_string()).collect::<Vec<_>>().join(&sep);
    Ok(Value::from_str(joined))
}

pub fn split_cmd(_interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 || argv.len() > 3 {
        return Err(Flow::Error(EngineError::wrong_args("split string ?splitChars?")));
    }
    let text = argv[1].as_str();
    let split_chars = argv.get(2).map(|v| v.as_str().to_string()).unwrap_or_else(|| " \t\n\r".to_string());
    let pieces: Vec<Value> = if split_chars.is_empty() {
        text.chars().map(|c| Value::from_str(c.to_string())).collect()
    } else {
        text.split(|c| split_chars.contains(c)).map(Value::from_str).collect()
    };
    Ok(Value::from_list(pieces))
}

pub fn subst_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    let mut opts = SubstOptions::default();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str().as_ref() {
            "-nobackslashes" => opts.backslashes = false,
            "-nocommands" => opts.commands = false,
            "-novariables" => opts.variables = false,
            _ => break,
        }
        i += 1;
    }
    if i + 1 != argv.len() {
        return Err(Flow::Error(EngineError::wrong_args("subst ?-nobackslashes? ?-nocommands? ?-novariables? string")));
    }
    subst(interp, &argv[i].as_str(), opts).map_err(Flow::Error)
}

/// `eval arg ?arg ...?`: concatenates its arguments as the core language does
/// for multi-word commands, then evaluates the result as a script in the
/// current frame (§4.5 "meta-evaluation").
pub fn eval_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("eval arg ?arg ...?")));
    }
    let script_text = if argv.len() == 2 {
        argv[1].as_str().to_string()
    } else {
        argv[1..].iter().map(|v| v.as_str().to_string()).collect::<Vec<_>>().join(" ")
    };
    let parsed = interp.parse_cached_body(&Value::from_str(script_text)).map_err(Flow::Error)?;
    eval_script(interp, &parsed)
}

/// `dict create ?key value ...?`, `dict get dictValue key`, `dict set
/// varName key value`, `dict exists dictValue key`, `dict keys dictValue`,
/// `dict size dictValue` (§9 "dict is the other built-in structured typed
/// form").
pub fn dict_cmd(interp: &mut Interpreter, argv: &[Value]) -> EvalResult {
    if argv.len() < 2 {
        return Err(Flow::Error(EngineError::wrong_args("dict subcommand ?arg ...?")));
    }
    match argv[1].as_str().as_ref() {
        "create" => {
            if (argv.len() - 2) % 2 != 0 {
                return Err(Flow::Error(EngineError::wrong_args("dict create ?key value ...?")));
            }
            let mut map = IndexMap::new();
            for pair in argv[2..].chunks(2) {
                map.insert(pair[0].as_str().to_string(), pair[1].clone());
            }
            Ok(Value::from_dict(map))
        }
        "get" => {
            if argv.len() != 4 {
                return Err(Flow::Error(EngineError::wrong_args("dict get dictValue key")));
            }
            let map = argv[2].as_dict().map_err(Flow::Error)?;
            let key = argv[3].as_str();
            map.get(key.as_ref())
                .cloned()
                .ok_or_else(|| Flow::Error(EngineError::name_not_found("key", key.to_string())))
        }
        "set" => {
            if argv.len() != 5 {
                return Err(Flow::Error(EngineError::wrong_args("dict set varName key value")));
            }
            let name = argv[2].as_str().to_string();
            let mut map = match crate::scope::get_scalar(&interp.current, &name) {
                Ok(v) => v.as_dict().map_err(Flow::Error)?.as_ref().clone(),
                Err(EngineError::NameNotFound { .. }) => IndexMap::new(),
                Err(e) => return Err(Flow::Error(e)),
            };
            map.insert(argv[3].as_str().to_string(), argv[4].clone());
            let updated = Value::from_dict(map);
            crate::scope::set_scalar(&interp.current, &name, updated.clone()).map_err(Flow::Error)?;
            Ok(updated)
        }
        "exists" => {
            if argv.len() != 4 {
                return Err(Flow::Error(EngineError::wrong_args("dict exists dictValue key")));
            }
            let map = argv[2].as_dict().map_err(Flow::Error)?;
            Ok(Value::from_bool(map.contains_key(argv[3].as_str().as_ref())))
        }
        "keys" => {
            if argv.len() != 3 {
                return Err(Flow::Error(EngineError::wrong_args("dict keys dictValue")));
            }
            let map = argv[2].as_dict().map_err(Flow::Error)?;
            Ok(Value::from_list(map.keys().map(|k| Value::from_str(k.clone())).collect()))
        }
        "size" => {
            if argv.len() != 3 {
                return Err(Flow::Error(EngineError::wrong_args("dict size dictValue")));
            }
            Ok(Value::from_int(argv[2].as_dict().map_err(Flow::Error)?.len() as i64))
        }
        other => Err(Flow::Error(EngineError::BadOption { option: other.to_string(), detail: "expected create, get, set, exists, keys, or size".into() })),
    }
}

