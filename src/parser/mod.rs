//! The parser / AST builder (§4.2): wraps the lexer, decomposes each word into
//! parts, and recursively parses command substitutions and array indices.
//!
//! The parser is the layer that understands `$`, `[`, and `\` — the lexer only
//! ever hands it complete, already-delimited word text.

use crate::ast::{CommandNode, ScriptNode, WordNode, WordPart};
use crate::backslash;
use crate::lexer::{find_array_index_end, LexError, Lexer, LexedWord, WordQuoting};
use crate::EngineError;

/// Parses a complete script. Line numbers in the resulting tree are 1-based and
/// absolute within `source`.
pub fn parse_script(source: &str) -> Result<ScriptNode, EngineError> {
    parse_script_at_line(source, 1)
}

fn parse_script_at_line(source: &str, base_line: usize) -> Result<ScriptNode, EngineError> {
    let mut lexer = Lexer::new(source);
    let mut commands = Vec::new();
    loop {
        lexer.skip_space();
        if lexer.at_eof() {
            break;
        }
        if lexer.at_comment() {
            lexer.skip_comment();
            if lexer.at_command_end() {
                lexer.consume_terminator();
            }
            continue;
        }
        if lexer.at_command_end() {
            lexer.consume_terminator();
            continue;
        }
        let cmd_line = base_line + lexer.line() - 1;
        let mut words = Vec::new();
        loop {
            lexer.skip_space();
            if lexer.at_command_end() {
                break;
            }
            let expand = consume_expand_marker(&mut lexer);
            let lexed = match lexer.next_word().map_err(|e| lex_error(e, base_line))? {
                Some(w) => w,
                None => break,
            };
            let word_line = base_line + lexed.line - 1;
            let parts = parse_word_parts(&lexed, word_line)?;
            words.push(WordNode { parts, expand, line: word_line });
        }
        if !words.is_empty() {
            commands.push(CommandNode { words, line: cmd_line });
        }
        if lexer.at_command_end() {
            lexer.consume_terminator();
        }
    }
    Ok(ScriptNode { commands })
}

fn lex_error(e: LexError, base_line: usize) -> EngineError {
    let (message, line) = match e {
        LexError::UnterminatedBrace { line } => ("missing close-brace".to_string(), line),
        LexError::UnterminatedQuote { line } => ("missing closing quote".to_string(), line),
        LexError::UnterminatedBracket { line } => ("missing close-bracket".to_string(), line),
        LexError::ExtraCharsAfterCloseBrace { line } => ("extra characters after close-brace".to_string(), line),
    };
    EngineError::SyntaxError { message, line: base_line + line - 1 }
}

/// Recognizes a leading `{*}` expand marker: the literal sequence `{`, `*`, `}`
/// immediately followed (no whitespace) by the rest of the word (§4.2).
fn consume_expand_marker(lexer: &mut Lexer) -> bool {
    lexer.consume_expand_prefix()
}

fn parse_word_parts(lexed: &LexedWord, line: usize) -> Result<Vec<WordPart>, EngineError> {
    if lexed.quoting == WordQuoting::Brace {
        return Ok(vec![WordPart::Literal(lexed.text.clone())]);
    }
    let chars: Vec<char> = lexed.text.chars().collect();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                let (resolved, consumed) = backslash::resolve_one(&chars, i);
                flush_literal(&mut literal, &mut parts);
                parts.push(WordPart::Backslash(resolved));
                i += consumed;
            }
            '$' => {
                if let Some((part, next_i)) = try_parse_var(&chars, i, line)? {
                    flush_literal(&mut literal, &mut parts);
                    parts.push(part);
                    i = next_i;
                } else {
                    literal.push('$');
                    i += 1;
                }
            }
            '[' => {
                let end = find_bracket_end(&chars, i)?;
                let inner: String = chars[i + 1..end].iter().collect();
                let newlines_before = chars[..i].iter().filter(|&&c| c == '\n').count();
                let inner_line = line + newlines_before;
                let script = parse_script_at_line(&inner, inner_line)?;
                flush_literal(&mut literal, &mut parts);
                parts.push(WordPart::CommandSubst(script));
                i = end + 1;
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }
    flush_literal(&mut literal, &mut parts);
    if parts.is_empty() {
        parts.push(WordPart::Literal(String::new()));
    }
    Ok(parts)
}

fn flush_literal(literal: &mut String, parts: &mut Vec<WordPart>) {
    if !literal.is_empty() {
        parts.push(WordPart::Literal(std::mem::take(literal)));
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

/// Tries to parse a variable reference starting at `chars[dollar_idx] == '$'`.
/// Returns `None` (treat `$` literally) when nothing valid follows.
fn try_parse_var(chars: &[char], dollar_idx: usize, line: usize) -> Result<Option<(WordPart, usize)>, EngineError> {
    let after_dollar = dollar_idx + 1;
    if chars.get(after_dollar) == Some(&'{') {
        let start = after_dollar + 1;
        let mut j = start;
        while j < chars.len() && chars[j] != '}' {
            j += 1;
        }
        if j >= chars.len() {
            return Err(EngineError::SyntaxError { message: "missing close-brace for variable name".into(), line });
        }
        let name: String = chars[start..j].iter().collect();
        return Ok(Some((WordPart::SimpleVar(name), j + 1)));
    }
    if chars.get(after_dollar).copied().map(is_name_start) != Some(true) {
        return Ok(None);
    }
    let mut j = after_dollar;
    while j < chars.len() && is_name_char(chars[j]) {
        j += 1;
    }
    let name: String = chars[after_dollar..j].iter().collect();
    if name.is_empty() {
        return Ok(None);
    }
    if chars.get(j) == Some(&'(') {
        let index_start = j + 1;
        let index_end = find_array_index_end(chars, index_start).ok_or_else(|| EngineError::SyntaxError {
            message: "missing close-paren for array index".into(),
            line,
        })?;
        let index_text: String = chars[index_start..index_end].iter().collect();
        let newlines_before = chars[..index_start].iter().filter(|&&c| c == '\n').count();
        let index_line = line + newlines_before;
        let index_parts = parse_word_parts(
            &LexedWord { text: index_text, quoting: WordQuoting::Bare, line: index_line },
            index_line,
        )?;
        let index_word = WordNode { parts: index_parts, expand: false, line: index_line };
        return Ok(Some((WordPart::ArrayVar { name, index: Box::new(index_word) }, index_end + 1)));
    }
    Ok(Some((WordPart::SimpleVar(name), j)))
}

/// Finds the index of the `]` matching the `[` at `chars[open]`, honoring nested
/// brackets and the brace/quote words that can occur inside (mirrors the
/// lexer's own bracket-balancing, operating over an already-extracted slice).
fn find_bracket_end(chars: &[char], open: usize) -> Result<usize, EngineError> {
    let mut i = open + 1;
    let mut depth = 1usize;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 2,
            '[' => {
                depth += 1;
                i += 1;
            }
            ']' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i - 1);
                }
            }
            '{' => {
                i = find_matching(chars, i, '{', '}')? + 1;
            }
            '"' => {
                i = find_matching_quote(chars, i)? + 1;
            }
            _ => i += 1,
        }
    }
    Err(EngineError::SyntaxError { message: "missing close-bracket".into(), line: 0 })
}

fn find_matching(chars: &[char], open: usize, open_c: char, close_c: char) -> Result<usize, EngineError> {
    let mut i = open + 1;
    let mut depth = 1usize;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }
        if chars[i] == open_c {
            depth += 1;
        } else if chars[i] == close_c {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
        i += 1;
    }
    Err(EngineError::SyntaxError { message: "missing close-brace".into(), line: 0 })
}

fn find_matching_quote(chars: &[char], open: usize) -> Result<usize, EngineError> {
    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }
        if chars[i] == '"' {
            return Ok(i);
        }
        i += 1;
    }
    Err(EngineError::SyntaxError { message: "missing closing quote".into(), line: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_word_parts(src: &str) -> Vec<WordPart> {
        let script = parse_script(src).unwrap();
        script.commands[0].words[0].parts.clone()
    }

    #[test]
    fn empty_script_has_no_commands() {
        assert!(parse_script("").unwrap().commands.is_empty());
        assert!(parse_script("   \n\t").unwrap().commands.is_empty());
    }

    #[test]
    fn comment_only_script_has_no_commands() {
        assert!(parse_script("# hello\n# world").unwrap().commands.is_empty());
    }

    #[test]
    fn simple_command_three_literal_words() {
        let script = parse_script("set x 1").unwrap();
        assert_eq!(script.commands.len(), 1);
        assert_eq!(script.commands[0].words.len(), 3);
    }

    #[test]
    fn multiple_commands_separated_by_semicolon_and_newline() {
        let script = parse_script("set x 1; set y 2\nset z 3").unwrap();
        assert_eq!(script.commands.len(), 3);
    }

    #[test]
    fn simple_var_reference() {
        let parts = first_word_parts("$x");
        assert_eq!(parts, vec![WordPart::SimpleVar("x".into())]);
    }

    #[test]
    fn braced_var_reference() {
        let parts = first_word_parts("${my var}");
        assert_eq!(parts, vec![WordPart::SimpleVar("my var".into())]);
    }

    #[test]
    fn array_element_reference() {
        let parts = first_word_parts("$a(0)");
        match &parts[0] {
            WordPart::ArrayVar { name, index } => {
                assert_eq!(name, "a");
                assert_eq!(index.parts, vec![WordPart::Literal("0".into())]);
            }
            other => panic!("expected ArrayVar, got {other:?}"),
        }
    }

    #[test]
    fn empty_array_index() {
        let parts = first_word_parts("$a()");
        match &parts[0] {
            WordPart::ArrayVar { index, .. } => assert_eq!(index.parts, vec![WordPart::Literal(String::new())]),
            other => panic!("expected ArrayVar, got {other:?}"),
        }
    }

    #[test]
    fn command_substitution_is_nested_script() {
        let parts = first_word_parts("[expr 1 + 1]");
        match &parts[0] {
            WordPart::CommandSubst(script) => {
                assert_eq!(script.commands.len(), 1);
                assert_eq!(script.commands[0].words.len(), 4);
            }
            other => panic!("expected CommandSubst, got {other:?}"),
        }
    }

    #[test]
    fn double_quoted_word_mixes_parts() {
        let parts = first_word_parts("\"a$b[c]d\"");
        assert_eq!(
            parts,
            vec![
                WordPart::Literal("a".into()),
                WordPart::SimpleVar("b".into()),
                WordPart::CommandSubst(parse_script("c").unwrap()),
                WordPart::Literal("d".into()),
            ]
        );
    }

    #[test]
    fn expand_marker_is_recognized() {
        let script = parse_script("foo {*}$args").unwrap();
        assert!(!script.commands[0].words[0].expand);
        assert!(script.commands[0].words[1].expand);
        assert_eq!(script.commands[0].words[1].parts, vec![WordPart::SimpleVar("args".into())]);
    }

    #[test]
    fn brace_word_alone_is_not_expand_marker() {
        let script = parse_script("foo {*}").unwrap();
        assert!(!script.commands[0].words[1].expand);
        assert_eq!(script.commands[0].words[1].parts, vec![WordPart::Literal("*".into())]);
    }

    #[test]
    fn unterminated_brace_reports_starting_line() {
        let err = parse_script("set x {abc\nmore").unwrap_err();
        match err {
            EngineError::SyntaxError { line, .. } => assert_eq!(line, 1),
            other => panic!("expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn deeply_nested_brackets_do_not_overflow() {
        let mut src = String::from("set x ");
        let depth = 200;
        for _ in 0..depth {
            src.push('[');
        }
        src.push_str("expr 1");
        for _ in 0..depth {
            src.push(']');
        }
        assert!(parse_script(&src).is_ok());
    }
}
