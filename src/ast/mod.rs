//! Abstract syntax tree types (§3 "AST node", §4.2).
//!
//! A script is an ordered list of commands; a command is an ordered list of
//! words; a word is either a single literal (braced words) or a sequence of
//! parts (bare/double-quoted words). Every node remembers the source line it
//! started on so the evaluator can attribute errors (§4.3 "Error attribution").

use std::fmt;

/// A script: the root of every AST, and also what a command substitution or a
/// procedure body parses into.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptNode {
    pub commands: Vec<CommandNode>,
}

/// A single command: an ordered sequence of words, the first of which names the
/// command to dispatch (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub words: Vec<WordNode>,
    pub line: usize,
}

/// A word: a sequence of parts evaluated left-to-right and concatenated (§4.3
/// "word evaluation"). `expand` marks a leading `{*}` — the word's runtime value
/// is spliced as multiple arguments rather than contributing one (§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct WordNode {
    pub parts: Vec<WordPart>,
    pub expand: bool,
    pub line: usize,
}

impl WordNode {
    /// True for a word whose value can be taken directly from its single part
    /// without string concatenation, preserving that part's typed form (§4.3).
    pub fn is_single_part(&self) -> bool {
        self.parts.len() == 1
    }
}

/// One constituent of a word.
#[derive(Debug, Clone, PartialEq)]
pub enum WordPart {
    /// Literal text: copied verbatim, including the entire contents of a
    /// brace-quoted word (which is always exactly one `Literal` part).
    Literal(String),
    /// A backslash escape, already resolved to its substituted text at parse
    /// time (§4.2 "Backslash escapes known at parse time").
    Backslash(String),
    /// `$name` or `${name}` — a scalar variable reference.
    SimpleVar(String),
    /// `$name(index)` — an array element reference; the index is itself a word
    /// subject to substitution.
    ArrayVar { name: String, index: Box<WordNode> },
    /// `[script]` — a command substitution, recursively parsed as a script.
    CommandSubst(ScriptNode),
}

impl fmt::Display for WordPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordPart::Literal(s) => write!(f, "{s}"),
            WordPart::Backslash(s) => write!(f, "{s}"),
            WordPart::SimpleVar(name) => write!(f, "${name}"),
            WordPart::ArrayVar { name, .. } => write!(f, "${name}(...)"),
            WordPart::CommandSubst(_) => write!(f, "[...]"),
        }
    }
}
