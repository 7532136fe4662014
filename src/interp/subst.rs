//! Whole-string substitution (§4.4 "subst"): scans plain text for `$variable`
//! references and `[command]` substitutions independently of command/word
//! parsing, each independently toggleable — distinct from parsing a script,
//! since `subst`'s input isn't split into words or commands at all.

use crate::ast::ScriptNode;
use crate::value::Value;
use crate::EngineError;

use super::evaluator::eval_script;
use super::interpreter::Interpreter;

#[derive(Debug, Clone, Copy)]
pub struct SubstOptions {
    pub commands: bool,
    pub variables: bool,
    pub backslashes: bool,
}

impl Default for SubstOptions {
    fn default() -> Self {
        SubstOptions { commands: true, variables: true, backslashes: true }
    }
}

pub fn subst(interp: &mut Interpreter, text: &str, opts: SubstOptions) -> Result<Value, EngineError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if opts.backslashes && i + 1 < chars.len() => {
                let (text, consumed) = crate::backslash::resolve_one(&chars, i);
                out.push_str(&text);
                i += consumed;
            }
            '$' if opts.variables => {
                let (value, consumed) = subst_variable(interp, &chars, i)?;
                match value {
                    Some(v) => {
                        out.push_str(&v.as_str());
                        i += consumed;
                    }
                    None => {
                        out.push('$');
                        i += 1;
                    }
                }
            }
            '[' if opts.commands => {
                let close = find_bracket_close(&chars, i).ok_or_else(|| EngineError::SyntaxError {
                    message: "missing close-bracket in subst".into(),
                    line: 0,
                })?;
                let inner: String = chars[i + 1..close].iter().collect();
                let parsed: ScriptNode = crate::parser::parse_script(&inner)?;
                let value = eval_script(interp, &std::rc::Rc::new(parsed)).map_err(|flow| match flow {
                    super::flow::Flow::Error(e) => e,
                    other => EngineError::user(format!("non-ok completion in command substitution: {other:?}")),
                })?;
                out.push_str(&value.as_str());
                i = close + 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(Value::from_str(out))
}

fn find_bracket_close(chars: &[char], open: usize) -> Option<usize> {
    let mut bracket_depth = 1;
    let mut brace_depth = 0;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 1,
            '{' => brace_depth += 1,
            '}' if brace_depth > 0 => brace_depth -= 1,
            '[' if brace_depth == 0 => bracket_depth += 1,
            ']' if brace_depth == 0 => {
                bracket_depth -= 1;
                if bracket_depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Reads a `$name`, `${name}`, or `$name(index)` reference starting at `chars[start]`
/// (which must be `$`). Returns `None` (meaning "not a reference") when `$` isn't
/// followed by a valid variable start, matching Tcl's "a lone `$` is literal" rule.
fn subst_variable(interp: &mut Interpreter, chars: &[char], start: usize) -> Result<(Option<Value>, usize), EngineError> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'{') {
        let open = i;
        i += 1;
        let name_start = i;
        while i < chars.len() && chars[i] != '}' {
            i += 1;
        }
        if i >= chars.len() {
            return Ok((None, 1));
        }
        let name: String = chars[name_start..i].iter().collect();
        let _ = open;
        let value = crate::scope::get_scalar(&interp.current, &name)?;
        return Ok((Some(value), i + 1 - start));
    }
    let name_start = i;
    while i < chars.len() && is_name_char(chars[i]) {
        i += 1;
    }
    if i == name_start {
        return Ok((None, 1));
    }
    let name: String = chars[name_start..i].iter().collect();
    if chars.get(i) == Some(&'(') {
        let index_start = i + 1;
        let mut depth = 1;
        let mut j = index_start;
        while j < chars.len() && depth > 0 {
            match chars[j] {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                j += 1;
            }
        }
        if depth != 0 {
            return Ok((None, 1));
        }
        let index_text: String = chars[index_start..j].iter().collect();
        let index_value = subst(interp, &index_text, SubstOptions::default())?;
        let value = crate::scope::get_array_elem(&interp.current, &name, &index_value.as_str())?;
        return Ok((Some(value), j + 1 - start));
    }
    let value = crate::scope::get_scalar(&interp.current, &name)?;
    Ok((Some(value), i - start))
}
