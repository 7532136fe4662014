//! Serialization and parsing of the `list` typed form: an ordered sequence of values
//! rendered as whitespace-separated elements, brace-quoted when an element's text
//! would otherwise be ambiguous. This is the format every `Value::as_str` of a
//! `TypedValue::List` goes through (§3 "round-trip stability").

use crate::EngineError;

/// Parses a list-formatted string into its element strings.
///
/// Each element is either a `{`-braced group (taken completely literally, no
/// backslash processing, so nested braces just need to balance), a `"`-quoted group
/// (backslash escapes resolved, matching [`crate::backslash::resolve`]), or a bare
/// run of non-whitespace characters (backslash escapes resolved, whitespace escaped
/// with `\` to be included).
pub fn parse(s: &str) -> Result<Vec<String>, EngineError> {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    let mut out = Vec::new();
    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        if chars[i] == '{' {
            let start = i + 1;
            let mut depth = 1usize;
            let mut j = start;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    '\\' if j + 1 < chars.len() => j += 1,
                    _ => {}
                }
                j += 1;
            }
            if depth != 0 {
                return Err(EngineError::SyntaxError {
                    message: "unmatched open brace in list".into(),
                    line: 0,
                });
            }
            out.push(chars[start..j - 1].iter().collect());
            i = j;
        } else if chars[i] == '"' {
            let start = i + 1;
            let mut j = start;
            let mut raw = String::new();
            let mut closed = false;
            while j < chars.len() {
                if chars[j] == '\\' && j + 1 < chars.len() {
                    raw.push(chars[j]);
                    raw.push(chars[j + 1]);
                    j += 2;
                    continue;
                }
                if chars[j] == '"' {
                    closed = true;
                    j += 1;
                    break;
                }
                raw.push(chars[j]);
                j += 1;
            }
            if !closed {
                return Err(EngineError::SyntaxError {
                    message: "unmatched open quote in list".into(),
                    line: 0,
                });
            }
            out.push(crate::backslash::resolve(&raw));
            i = j;
        } else {
            let start = i;
            let mut raw = String::new();
            while i < chars.len() && !chars[i].is_whitespace() {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    raw.push(chars[i]);
                    raw.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                raw.push(chars[i]);
                i += 1;
            }
            if i == start {
                break;
            }
            out.push(crate::backslash::resolve(&raw));
        }
    }
    Ok(out)
}

/// Formats elements into list syntax, quoting each element only when its literal
/// text would otherwise parse differently (or not at all) when read back by
/// [`parse`]. Braces are preferred over backslash-escaping when the element's
/// braces already balance, matching Tcl's own preference for readability.
pub fn format(elements: &[String]) -> String {
    elements.iter().map(|e| format_element(e)).collect::<Vec<_>>().join(" ")
}

fn format_element(s: &str) -> String {
    if s.is_empty() {
        return "{}".to_string();
    }
    if !needs_quoting(s) {
        return s.to_string();
    }
    if braces_balance(s) && !s.ends_with('\\') {
        format!("{{{}}}", s)
    } else {
        backslash_quote(s)
    }
}

fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| {
        matches!(
            c,
            ' ' | '\t' | '\n' | '\r' | '{' | '}' | '[' | ']' | '$' | ';' | '"' | '\\'
        )
    }) || s.starts_with('#')
}

fn braces_balance(s: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn backslash_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            ' ' | '\t' | '\n' | '\r' | '{' | '}' | '[' | ']' | '$' | ';' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// A small glob matcher (`*`, `?`, `[set]`) used wherever the host interface
/// calls for "pattern" filtering (§6 dict/array/command enumeration by
/// pattern). Not a full Tcl glob — no `\`-escaping of meta-characters inside
/// the pattern itself — but covers the forms this engine's own builtins emit.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_match_at(&p, 0, &t, 0)
}

fn glob_match_at(p: &[char], pi: usize, t: &[char], ti: usize) -> bool {
    if pi == p.len() {
        return ti == t.len();
    }
    match p[pi] {
        '*' => {
            for skip in 0..=t.len() - ti.min(t.len()) {
                if glob_match_at(p, pi + 1, t, ti + skip) {
                    return true;
                }
            }
            false
        }
        '?' => ti < t.len() && glob_match_at(p, pi + 1, t, ti + 1),
        '[' => {
            let close = match p[pi..].iter().position(|&c| c == ']') {
                Some(offset) if offset > 0 => pi + offset,
                _ => return ti < t.len() && t[ti] == '[' && glob_match_at(p, pi + 1, t, ti + 1),
            };
            if ti >= t.len() {
                return false;
            }
            let set: &[char] = &p[pi + 1..close];
            if set.contains(&t[ti]) {
                glob_match_at(p, close + 1, t, ti + 1)
            } else {
                false
            }
        }
        c => ti < t.len() && t[ti] == c && glob_match_at(p, pi + 1, t, ti + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_star_and_question_mark() {
        assert!(glob_match("foo*", "foobar"));
        assert!(glob_match("f?o", "foo"));
        assert!(!glob_match("f?o", "fooo"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn glob_character_set() {
        assert!(glob_match("[ab]x", "ax"));
        assert!(!glob_match("[ab]x", "cx"));
    }

    #[test]
    fn round_trip_simple_elements() {
        let elems = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let s = format(&elems);
        assert_eq!(s, "a b c");
        assert_eq!(parse(&s).unwrap(), elems);
    }

    #[test]
    fn round_trip_elements_with_spaces() {
        let elems = vec!["hello world".to_string(), "x".to_string()];
        let s = format(&elems);
        assert_eq!(parse(&s).unwrap(), elems);
    }

    #[test]
    fn empty_element_braces() {
        let elems = vec!["".to_string(), "x".to_string()];
        let s = format(&elems);
        assert_eq!(s, "{} x");
        assert_eq!(parse(&s).unwrap(), elems);
    }

    #[test]
    fn nested_braces_preserved_literally() {
        assert_eq!(parse("{a {b c} d}").unwrap(), vec!["a {b c} d".to_string()]);
    }

    #[test]
    fn unmatched_brace_is_syntax_error() {
        assert!(parse("{a b").is_err());
    }
}
