//! Engine-wide resource limits (§10.3), matching the teacher's explicit
//! `ExecutionLimits` struct (`interpreter/types.rs`) threaded through the engine
//! rather than hard-coded constants — generous defaults, all finite.

#[derive(Debug, Clone, Copy)]
pub struct EngineLimits {
    /// Maximum user-proc / coroutine call depth (§4.5 activation frames).
    pub max_recursion_depth: u32,
    /// Maximum brace/bracket/command-substitution nesting the parser will
    /// descend into (§8: "deeply nested braces and brackets parse without
    /// stack overflow up to the configured depth").
    pub max_nesting_depth: u32,
    /// Upper bound on the number of replayed yields a single coroutine resume
    /// will step through before giving up (guards against a corrupted
    /// yieldCount/yieldTarget pair spinning forever, §4.7).
    pub max_coroutine_replay_steps: u32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        EngineLimits { max_recursion_depth: 1000, max_nesting_depth: 200, max_coroutine_replay_steps: 100_000 }
    }
}
