//! The host callback interface (§6 "Host callback table") — cut down to the
//! command-level operations the engine itself needs to dispatch through: user
//! procedure and alias storage and lookup. Value construction, list/dict ops,
//! arenas, and variable-table ops are implemented directly by [`crate::value`]
//! and [`crate::scope`] in this crate rather than forwarded through a callback,
//! since here the engine and the "host" share one address space; I/O channels,
//! subprocesses, sockets, filesystem, clock, regex, encoding, and the event
//! loop are genuinely out of scope (§1 Non-goals) and are represented only by
//! [`Host::invoke_extension`], a single opaque seam an embedder fills in.
//!
//! [`InMemoryHost`] is the default implementation used by the CLI and by this
//! crate's own tests: it is a real, usable host (procs and aliases work end to
//! end), just one with no extension commands registered.

use std::collections::HashMap;

use crate::value::Value;
use crate::EngineError;

use super::completion::CompletionCode;

/// A user procedure's argument specification and body, as registered by the
/// `proc` builtin (§4.5 "user procedure (carries a handle to argspec + body)").
#[derive(Debug, Clone)]
pub struct ProcRecord {
    pub argspec: Value,
    pub body: Value,
}

/// What [`Host::lookup_command`] can resolve a name to, feeding command
/// dispatch step 2 (§4.5).
pub enum HostCommand {
    Proc(ProcRecord),
    Extension,
    Alias { target: String, prefix: Vec<Value> },
}

/// The seam between the engine and its embedder. An embedder substitutes its
/// own implementation to add real I/O, subprocess, and extension commands;
/// everything the core engine ships with goes through [`InMemoryHost`].
pub trait Host {
    fn register_proc(&mut self, name: &str, record: ProcRecord);
    fn lookup_command(&self, name: &str) -> Option<HostCommand>;
    fn rename_command(&mut self, old: &str, new: &str) -> Result<(), EngineError>;
    fn delete_command(&mut self, name: &str) -> Result<(), EngineError>;
    fn command_exists(&self, name: &str) -> bool;
    fn enumerate_commands(&self, pattern: Option<&str>) -> Vec<String>;
    fn register_alias(&mut self, name: &str, target: &str, prefix: Vec<Value>);
    /// Forwards to a host-provided extension command (§4.5 "Extension
    /// invocation"). The default host has none registered, so this always
    /// fails with `host-failure`; a real embedder overrides it.
    fn invoke_extension(&mut self, name: &str, args: &[Value]) -> Result<(CompletionCode, Value), EngineError> {
        let _ = args;
        Err(EngineError::HostFailure { detail: format!("no extension registered for \"{name}\"") })
    }
}

#[derive(Default)]
pub struct InMemoryHost {
    procs: HashMap<String, ProcRecord>,
    aliases: HashMap<String, (String, Vec<Value>)>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        InMemoryHost::default()
    }
}

impl Host for InMemoryHost {
    fn register_proc(&mut self, name: &str, record: ProcRecord) {
        self.procs.insert(name.to_string(), record);
    }

    fn lookup_command(&self, name: &str) -> Option<HostCommand> {
        if let Some(record) = self.procs.get(name) {
            return Some(HostCommand::Proc(record.clone()));
        }
        if let Some((target, prefix)) = self.aliases.get(name) {
            return Some(HostCommand::Alias { target: target.clone(), prefix: prefix.clone() });
        }
        None
    }

    fn rename_command(&mut self, old: &str, new: &str) -> Result<(), EngineError> {
        let record = self.procs.remove(old).ok_or_else(|| EngineError::name_not_found("command", old))?;
        self.procs.insert(new.to_string(), record);
        Ok(())
    }

    fn delete_command(&mut self, name: &str) -> Result<(), EngineError> {
        if self.procs.remove(name).is_none() && self.aliases.remove(name).is_none() {
            return Err(EngineError::name_not_found("command", name));
        }
        Ok(())
    }

    fn command_exists(&self, name: &str) -> bool {
        self.procs.contains_key(name) || self.aliases.contains_key(name)
    }

    fn enumerate_commands(&self, pattern: Option<&str>) -> Vec<String> {
        let names = self.procs.keys().chain(self.aliases.keys()).cloned();
        match pattern {
            None => names.collect(),
            Some(p) => names.filter(|n| crate::value::list::glob_match(p, n)).collect(),
        }
    }

    fn register_alias(&mut self, name: &str, target: &str, prefix: Vec<Value>) {
        self.aliases.insert(name.to_string(), (target.to_string(), prefix));
    }
}
