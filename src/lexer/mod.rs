//! The lexer (§4.1): splits source text into a stream of *words*, each tagged by
//! how it was quoted, with line tracking across backslash-newline continuations.
//!
//! The lexer does not interpret `$`, `[`, or `\` inside a word — that part
//! decomposition is the parser's job (§4.2). It only needs to know *where a word
//! ends*, which for bracket spans means understanding enough nested structure
//! (brackets, and the brace/quote words that can start inside them) to avoid
//! treating protected whitespace as a separator.

use thiserror::Error;

/// How a word was delimited at the source level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordQuoting {
    Bare,
    Brace,
    DoubleQuote,
}

/// One word as found by the lexer: its raw text (delimiters stripped) and the
/// line it started on. For [`WordQuoting::Brace`] the text is never processed
/// further (§4.2); for the others the parser will decompose it into parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedWord {
    pub text: String,
    pub quoting: WordQuoting,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("missing close-brace, starting on line {line}")]
    UnterminatedBrace { line: usize },
    #[error("missing closing quote, starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("missing close-bracket, starting on line {line}")]
    UnterminatedBracket { line: usize },
    #[error("extra characters after close-brace on line {line}")]
    ExtraCharsAfterCloseBrace { line: usize },
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer { chars: source.chars().collect(), pos: 0, line: 1 }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Advances past spaces, tabs, and backslash-newline continuations. Never
    /// crosses a true newline or a semicolon (§4.1).
    pub fn skip_space(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.pos += 1;
                }
                Some('\\') if self.chars.get(self.pos + 1) == Some(&'\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                _ => break,
            }
        }
    }

    /// True at newline, semicolon, or EOF (§4.1).
    pub fn at_command_end(&self) -> bool {
        matches!(self.peek(), None | Some(';') | Some('\n'))
    }

    /// True when a `#` appears at the current position. The caller is
    /// responsible for only probing this at a genuine command-start position
    /// (§4.1: "first non-blank after a terminator").
    pub fn at_comment(&self) -> bool {
        self.peek() == Some('#')
    }

    /// Consumes a comment (from the current `#` through the next unescaped
    /// newline or EOF; a trailing backslash-newline continues the comment).
    pub fn skip_comment(&mut self) {
        debug_assert!(self.at_comment());
        loop {
            match self.peek() {
                None | Some('\n') => break,
                Some('\\') if self.chars.get(self.pos + 1) == Some(&'\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    /// Consumes the command terminator at the current position (`;` or `\n`),
    /// if any. No-op at EOF.
    pub fn consume_terminator(&mut self) {
        match self.peek() {
            Some(';') => {
                self.pos += 1;
            }
            Some('\n') => {
                self.pos += 1;
                self.line += 1;
            }
            _ => {}
        }
    }

    /// Consumes a leading `{*}` expand marker if one is present at the current
    /// position, returning whether it matched. `{*}` only counts as a marker when
    /// something non-separating immediately follows it (§4.2) — `{*}` alone as a
    /// bare word is just the literal word `*`, not an expansion marker.
    pub fn consume_expand_prefix(&mut self) -> bool {
        if self.chars.get(self.pos) == Some(&'{')
            && self.chars.get(self.pos + 1) == Some(&'*')
            && self.chars.get(self.pos + 2) == Some(&'}')
        {
            match self.chars.get(self.pos + 3) {
                None | Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some(';') => false,
                Some(_) => {
                    self.pos += 3;
                    true
                }
            }
        } else {
            false
        }
    }

    /// Consumes exactly one word, or returns `None` at a command boundary/EOF.
    pub fn next_word(&mut self) -> Result<Option<LexedWord>, LexError> {
        self.skip_space();
        if self.at_command_end() {
            return Ok(None);
        }
        let start_line = self.line;
        match self.peek() {
            Some('{') => self.lex_brace_word(start_line),
            Some('"') => self.lex_quoted_word(start_line),
            _ => self.lex_bare_word(start_line),
        }
    }

    fn lex_brace_word(&mut self, start_line: usize) -> Result<Option<LexedWord>, LexError> {
        let open = self.pos;
        self.pos += 1;
        let mut depth = 1usize;
        let content_start = self.pos;
        while depth > 0 {
            match self.peek() {
                None => return Err(LexError::UnterminatedBrace { line: start_line }),
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some('}') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
        let content_end = self.pos - 1;
        let text: String = self.chars[content_start..content_end].iter().collect();
        // Word must end here: whitespace, terminator, or EOF directly follows.
        match self.peek() {
            None | Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some(';') => {}
            Some(_) => return Err(LexError::ExtraCharsAfterCloseBrace { line: start_line }),
        }
        let _ = open;
        Ok(Some(LexedWord { text, quoting: WordQuoting::Brace, line: start_line }))
    }

    fn lex_quoted_word(&mut self, start_line: usize) -> Result<Option<LexedWord>, LexError> {
        self.pos += 1; // opening quote
        let content_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedQuote { line: start_line }),
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('[') => {
                    self.skip_balanced_bracket(start_line)?;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some('"') => {
                    let text: String = self.chars[content_start..self.pos].iter().collect();
                    self.pos += 1;
                    return Ok(Some(LexedWord { text, quoting: WordQuoting::DoubleQuote, line: start_line }));
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }

    fn lex_bare_word(&mut self, start_line: usize) -> Result<Option<LexedWord>, LexError> {
        let content_start = self.pos;
        loop {
            match self.peek() {
                None | Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some(';') => break,
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('[') => {
                    self.skip_balanced_bracket(start_line)?;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
        let text: String = self.chars[content_start..self.pos].iter().collect();
        Ok(Some(LexedWord { text, quoting: WordQuoting::Bare, line: start_line }))
    }

    /// Skips from an unescaped `[` (at the current position) through its
    /// matching `]`, recursing through any brace- or quote-words that occur
    /// inside so their contents can't spuriously close the bracket.
    fn skip_balanced_bracket(&mut self, start_line: usize) -> Result<(), LexError> {
        let bracket_start_line = self.line;
        self.pos += 1; // '['
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                None => return Err(LexError::UnterminatedBracket { line: bracket_start_line }),
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('[') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(']') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some('{') => {
                    self.skip_to_matching_brace(start_line)?;
                }
                Some('"') => {
                    self.skip_to_matching_quote(start_line)?;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }

    fn skip_to_matching_brace(&mut self, outer_start_line: usize) -> Result<(), LexError> {
        self.pos += 1;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                None => return Err(LexError::UnterminatedBrace { line: outer_start_line }),
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some('}') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }

    fn skip_to_matching_quote(&mut self, outer_start_line: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedQuote { line: outer_start_line }),
                Some('\\') => {
                    if self.chars.get(self.pos + 1) == Some(&'\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some('[') => {
                    self.skip_balanced_bracket(outer_start_line)?;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }
}

/// Finds the index (into `chars`) of the first unescaped `)` at matching `[`/`]`
/// nesting, starting the scan at `from`. Used by the parser for `$name(index)`
/// array references, resolving the open question in §9 ("tie-break: first
/// unescaped `)` at matching nesting").
pub fn find_array_index_end(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    let mut bracket_depth = 0usize;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 2,
            '[' => {
                bracket_depth += 1;
                i += 1;
            }
            ']' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                i += 1;
            }
            ')' if bracket_depth == 0 => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(src: &str) -> Vec<LexedWord> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        while let Some(w) = lexer.next_word().unwrap() {
            out.push(w);
        }
        out
    }

    #[test]
    fn bare_words_split_on_space() {
        let ws = words("set x 1");
        assert_eq!(ws.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(), vec!["set", "x", "1"]);
    }

    #[test]
    fn brace_word_is_one_word_with_raw_content() {
        let ws = words("{a b c}");
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].text, "a b c");
        assert_eq!(ws[0].quoting, WordQuoting::Brace);
    }

    #[test]
    fn nested_braces_balance() {
        let ws = words("{a {b c} d}");
        assert_eq!(ws[0].text, "a {b c} d");
    }

    #[test]
    fn unterminated_brace_is_an_error() {
        let mut lexer = Lexer::new("{a b");
        assert!(matches!(lexer.next_word(), Err(LexError::UnterminatedBrace { line: 1 })));
    }

    #[test]
    fn bracket_protects_embedded_whitespace_in_bare_word() {
        let ws = words("foo[bar baz]qux");
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].text, "foo[bar baz]qux");
    }

    #[test]
    fn double_quoted_word_can_embed_brackets_with_spaces() {
        let ws = words("\"hello [foo bar]\"");
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].text, "hello [foo bar]");
        assert_eq!(ws[0].quoting, WordQuoting::DoubleQuote);
    }

    #[test]
    fn extra_chars_after_close_brace_is_an_error() {
        let mut lexer = Lexer::new("{abc}def");
        assert!(matches!(lexer.next_word(), Err(LexError::ExtraCharsAfterCloseBrace { .. })));
    }

    #[test]
    fn comment_consumes_to_end_of_line() {
        let mut lexer = Lexer::new("# a comment\nset x 1");
        assert!(lexer.at_comment());
        lexer.skip_comment();
        assert!(lexer.at_command_end());
        lexer.consume_terminator();
        let ws = {
            let mut out = Vec::new();
            while let Some(w) = lexer.next_word().unwrap() {
                out.push(w);
            }
            out
        };
        assert_eq!(ws.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(), vec!["set", "x", "1"]);
    }

    #[test]
    fn expand_prefix_requires_something_to_follow() {
        let mut lexer = Lexer::new("{*}$args");
        assert!(lexer.consume_expand_prefix());
        assert_eq!(lexer.pos, 3);

        let mut lexer = Lexer::new("{*}");
        assert!(!lexer.consume_expand_prefix());
        assert_eq!(lexer.pos, 0);

        let mut lexer = Lexer::new("{*} rest");
        assert!(!lexer.consume_expand_prefix());
    }

    #[test]
    fn array_index_end_respects_bracket_nesting() {
        let chars: Vec<char> = "foo [bar)]) rest".chars().collect();
        // the ')' at index 8 is inside [...] and must be skipped; the real end is index 10.
        let end = find_array_index_end(&chars, 0).unwrap();
        assert_eq!(end, 10);
        assert_eq!(chars[end], ')');
    }
}
