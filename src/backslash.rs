//! Backslash escape resolution, shared between the parser (pre-resolving escapes in
//! bare/double-quoted words at parse time, per §4.2) and the list representation
//! (quoted and bare list elements undergo the same substitution when parsed, per
//! §9 "Substitution ordering").
//!
//! This module knows nothing about the AST or about variable/command substitution;
//! it only turns one escape sequence into the bytes it denotes.

/// Resolves every backslash escape in `s`, returning the substituted text.
///
/// Recognized escapes: `\n \t \r \a \b \f \v`, `\\`, a backslash followed by any of
/// `$[]{}"` (yields the literal character), `\xHH` (1-2 hex digits), `\uHHHH` (1-4 hex
/// digits), `\UHHHHHHHH` (1-8 hex digits), `\ooo` (1-3 octal digits), and
/// backslash-newline (collapses the newline plus any following indentation to a
/// single space). Any other `\c` yields `c` unchanged (the backslash is dropped).
pub fn resolve(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let (resolved, consumed) = resolve_one(&chars, i);
        out.push_str(&resolved);
        i += consumed;
    }
    out
}

/// Resolves exactly one escape sequence starting at `chars[i]` (which must be
/// `\\`, with at least one more character following). Returns the substituted
/// text and the number of source characters it consumed, so callers that need a
/// distinct AST node per escape (the parser's `WordPart::Backslash`, §3) can
/// advance precisely rather than resolving a whole string at once.
pub fn resolve_one(chars: &[char], i: usize) -> (String, usize) {
    debug_assert_eq!(chars[i], '\\');
    debug_assert!(i + 1 < chars.len());
    let next = chars[i + 1];
    match next {
        'n' => ("\n".to_string(), 2),
        't' => ("\t".to_string(), 2),
        'r' => ("\r".to_string(), 2),
        'a' => ("\u{7}".to_string(), 2),
        'b' => ("\u{8}".to_string(), 2),
        'f' => ("\u{c}".to_string(), 2),
        'v' => ("\u{b}".to_string(), 2),
        '\\' => ("\\".to_string(), 2),
        '\n' => {
            let mut consumed = 2;
            while i + consumed < chars.len() && (chars[i + consumed] == ' ' || chars[i + consumed] == '\t') {
                consumed += 1;
            }
            (" ".to_string(), consumed)
        }
        'x' => {
            let (value, digits) = read_hex(chars, i + 2, 2);
            if digits == 0 {
                ("x".to_string(), 2)
            } else {
                (codepoint_string(value), 2 + digits)
            }
        }
        'u' => {
            let (value, digits) = read_hex(chars, i + 2, 4);
            if digits == 0 {
                ("u".to_string(), 2)
            } else {
                (codepoint_string(value), 2 + digits)
            }
        }
        'U' => {
            let (value, digits) = read_hex(chars, i + 2, 8);
            if digits == 0 {
                ("U".to_string(), 2)
            } else {
                (codepoint_string(value), 2 + digits)
            }
        }
        '0'..='7' => {
            let (value, digits) = read_octal(chars, i + 1, 3);
            (codepoint_string(value), 1 + digits)
        }
        other => (other.to_string(), 2),
    }
}

fn codepoint_string(value: u32) -> String {
    let mut s = String::new();
    push_codepoint(&mut s, value);
    s
}

fn read_hex(chars: &[char], start: usize, max_digits: usize) -> (u32, usize) {
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max_digits && start + count < chars.len() {
        let c = chars[start + count];
        match c.to_digit(16) {
            Some(d) => {
                value = value * 16 + d;
                count += 1;
            }
            None => break,
        }
    }
    (value, count)
}

fn read_octal(chars: &[char], start: usize, max_digits: usize) -> (u32, usize) {
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max_digits && start + count < chars.len() {
        let c = chars[start + count];
        match c.to_digit(8) {
            Some(d) => {
                value = value * 8 + d;
                count += 1;
            }
            None => break,
        }
    }
    (value, count)
}

fn push_codepoint(out: &mut String, value: u32) {
    match char::from_u32(value) {
        Some(c) => out.push(c),
        None => out.push('\u{fffd}'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_escapes() {
        assert_eq!(resolve("a\\nb"), "a\nb");
        assert_eq!(resolve("a\\tb"), "a\tb");
        assert_eq!(resolve("\\\\"), "\\");
    }

    #[test]
    fn hex_and_unicode_escapes() {
        assert_eq!(resolve("\\x41"), "A");
        assert_eq!(resolve("\\u0041"), "A");
        assert_eq!(resolve("\\U00000041"), "A");
    }

    #[test]
    fn octal_escape() {
        assert_eq!(resolve("\\101"), "A");
    }

    #[test]
    fn backslash_newline_collapses_to_space() {
        assert_eq!(resolve("a\\\n   b"), "a b");
    }

    #[test]
    fn unknown_escape_drops_backslash() {
        assert_eq!(resolve("\\q"), "q");
        assert_eq!(resolve("\\$"), "$");
    }
}
