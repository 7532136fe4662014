//! The completion-code ABI (§4.7 header, §6 "Completion code ABI"): a stable
//! small integer set every command propagates, kept separate from
//! [`crate::EngineError`] since `RETURN`/`BREAK`/`CONTINUE` are routine control
//! flow, not failures.

/// `{OK=0, ERROR=1, RETURN=2, BREAK=3, CONTINUE=4}` per §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCode {
    Ok = 0,
    Error = 1,
    Return = 2,
    Break = 3,
    Continue = 4,
}

impl CompletionCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
