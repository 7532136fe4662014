//! Activation frames and variable tables (§4.6 "Scope and linking", §9 "Cyclic
//! structures").
//!
//! A frame owns a flat table of named slots. A slot is either a scalar, an
//! array (its own flat table keyed by element name), or a link redirecting to
//! a name in another frame. Links never own storage — `global` and `upvar`
//! both just install a link and let reads/writes walk through it.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::Value;
use crate::EngineError;

/// The maximum number of link hops a lookup will walk before giving up (§9:
/// "a small counter... report name-not-found if the walk exceeds the bound").
/// Links are meant to resolve in at most two hops; this is a generous multiple
/// of that to tolerate chains without allowing an actual cycle to loop forever.
const MAX_LINK_HOPS: usize = 16;

#[derive(Debug, Clone)]
pub enum VarSlot {
    Scalar(Value),
    Array(IndexMap<String, Value>),
    Link { frame: FrameRef, name: String },
}

pub type FrameRef = Rc<RefCell<Frame>>;

/// A single activation frame (§3 "Activation frame"). The global frame has
/// depth 0 and no parent; every call frame's depth is `1 + parent.depth` (§8).
#[derive(Debug)]
pub struct Frame {
    pub depth: usize,
    pub parent: Option<FrameRef>,
    pub is_proc: bool,
    pub is_coroutine: bool,
    vars: IndexMap<String, VarSlot>,
}

impl Frame {
    pub fn new_global() -> FrameRef {
        Rc::new(RefCell::new(Frame { depth: 0, parent: None, is_proc: false, is_coroutine: false, vars: IndexMap::new() }))
    }

    pub fn new_call(parent: FrameRef, is_coroutine: bool) -> FrameRef {
        let depth = parent.borrow().depth + 1;
        Rc::new(RefCell::new(Frame { depth, parent: Some(parent), is_proc: true, is_coroutine, vars: IndexMap::new() }))
    }

    /// Local variable names only, excluding links (§4.6: "introspection of local
    /// names excludes linked ones").
    pub fn local_names(&self) -> Vec<String> {
        self.vars
            .iter()
            .filter(|(_, slot)| !matches!(slot, VarSlot::Link { .. }))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All names visible in this frame, including links (§4.6).
    pub fn visible_names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}

/// The absolute-vs-relative level argument accepted by `upvar` (§4.6).
#[derive(Debug, Clone, Copy)]
pub enum Level {
    /// `#N`, counted from the global frame (0 = global).
    Absolute(usize),
    /// A plain non-negative integer, counted up from the current frame.
    Relative(usize),
}

impl Level {
    pub fn parse(s: &str) -> Option<Level> {
        if let Some(rest) = s.strip_prefix('#') {
            rest.parse::<usize>().ok().map(Level::Absolute)
        } else {
            s.parse::<usize>().ok().map(Level::Relative)
        }
    }
}

/// Walks from `current` to the frame named by `level`, failing with `bad level`
/// (modeled as `NameNotFound`, §8 "upvar #N ... exceeds current depth") when the
/// target would be above the global frame.
pub fn frame_at_level(current: &FrameRef, level: Level) -> Result<FrameRef, EngineError> {
    let target_depth = match level {
        Level::Absolute(n) => n,
        Level::Relative(n) => current.borrow().depth.checked_sub(n).ok_or_else(bad_level)?,
    };
    if target_depth > current.borrow().depth {
        return Err(bad_level());
    }
    let mut hops = current.borrow().depth - target_depth;
    let mut frame = current.clone();
    while hops > 0 {
        let parent = frame.borrow().parent.clone().ok_or_else(bad_level)?;
        frame = parent;
        hops -= 1;
    }
    Ok(frame)
}

fn bad_level() -> EngineError {
    EngineError::NameNotFound { kind: "level", name: "bad level".into() }
}

/// Resolves a name in `frame` through at most [`MAX_LINK_HOPS`] link hops,
/// returning the frame and name that actually own the slot (which may be
/// `frame`/`name` themselves if there is no link, or if the name is unset).
fn resolve(frame: &FrameRef, name: &str) -> Result<(FrameRef, String), EngineError> {
    let mut cur_frame = frame.clone();
    let mut cur_name = name.to_string();
    for _ in 0..MAX_LINK_HOPS {
        let next = match cur_frame.borrow().vars.get(&cur_name) {
            Some(VarSlot::Link { frame: target, name: target_name }) => Some((target.clone(), target_name.clone())),
            _ => None,
        };
        match next {
            Some((target_frame, target_name)) => {
                cur_frame = target_frame;
                cur_name = target_name;
            }
            None => return Ok((cur_frame, cur_name)),
        }
    }
    Err(EngineError::NameNotFound { kind: "variable", name: name.to_string() })
}

pub fn get_scalar(frame: &FrameRef, name: &str) -> Result<Value, EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let owner_ref = owner.borrow();
    match owner_ref.vars.get(&owner_name) {
        Some(VarSlot::Scalar(v)) => Ok(v.clone()),
        Some(VarSlot::Array(_)) => Err(EngineError::TypeError { expected: "scalar", got: format!("array \"{name}\"") }),
        Some(VarSlot::Link { .. }) => unreachable!("resolve() never returns a link"),
        None => Err(EngineError::name_not_found("variable", name)),
    }
}

pub fn set_scalar(frame: &FrameRef, name: &str, value: Value) -> Result<(), EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let mut owner_ref = owner.borrow_mut();
    match owner_ref.vars.get(&owner_name) {
        Some(VarSlot::Array(_)) => return Err(EngineError::TypeError { expected: "scalar", got: format!("array \"{name}\"") }),
        _ => {}
    }
    owner_ref.vars.insert(owner_name, VarSlot::Scalar(value));
    Ok(())
}

pub fn exists_scalar(frame: &FrameRef, name: &str) -> bool {
    match resolve(frame, name) {
        Ok((owner, owner_name)) => matches!(owner.borrow().vars.get(&owner_name), Some(VarSlot::Scalar(_))),
        Err(_) => false,
    }
}

pub fn unset(frame: &FrameRef, name: &str) -> Result<(), EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let mut owner_ref = owner.borrow_mut();
    if owner_ref.vars.shift_remove(&owner_name).is_none() {
        return Err(EngineError::name_not_found("variable", name));
    }
    Ok(())
}

pub fn get_array_elem(frame: &FrameRef, name: &str, elem: &str) -> Result<Value, EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let owner_ref = owner.borrow();
    match owner_ref.vars.get(&owner_name) {
        Some(VarSlot::Array(map)) => map.get(elem).cloned().ok_or_else(|| {
            EngineError::name_not_found("variable", format!("{name}({elem})"))
        }),
        Some(VarSlot::Scalar(_)) => Err(EngineError::TypeError { expected: "array", got: format!("scalar \"{name}\"") }),
        Some(VarSlot::Link { .. }) => unreachable!("resolve() never returns a link"),
        None => Err(EngineError::name_not_found("variable", name)),
    }
}

pub fn set_array_elem(frame: &FrameRef, name: &str, elem: &str, value: Value) -> Result<(), EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let mut owner_ref = owner.borrow_mut();
    match owner_ref.vars.entry(owner_name).or_insert_with(|| VarSlot::Array(IndexMap::new())) {
        VarSlot::Array(map) => {
            map.insert(elem.to_string(), value);
            Ok(())
        }
        VarSlot::Scalar(_) => Err(EngineError::TypeError { expected: "array", got: format!("scalar \"{name}\"") }),
        VarSlot::Link { .. } => unreachable!("resolve() never returns a link"),
    }
}

pub fn array_names(frame: &FrameRef, name: &str) -> Result<Vec<String>, EngineError> {
    let (owner, owner_name) = resolve(frame, name)?;
    let owner_ref = owner.borrow();
    match owner_ref.vars.get(&owner_name) {
        Some(VarSlot::Array(map)) => Ok(map.keys().cloned().collect()),
        Some(VarSlot::Scalar(_)) => Err(EngineError::TypeError { expected: "array", got: format!("scalar \"{name}\"") }),
        Some(VarSlot::Link { .. }) => unreachable!("resolve() never returns a link"),
        None => Err(EngineError::name_not_found("variable", name)),
    }
}

/// Splits a `name(index)` variable reference as written in command text (e.g.
/// `set a(k) v`, `unset a(k)`) into its name and index parts. Returns `None`
/// for a plain scalar name. The index itself is not substituted here — callers
/// that need substitution (e.g. a nested command call in the index) should
/// run it through `subst` first; this only handles the literal array syntax.
pub fn split_array_ref(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    if !text.ends_with(')') || open == 0 {
        return None;
    }
    Some((&text[..open], &text[open + 1..text.len() - 1]))
}

/// Installs a link from `local` in `frame` to `name` in `target` (`global`,
/// `upvar`). A self-link (`frame` is `target` and `local == name`) is rejected
/// per §9 ("the design forbids self-links by convention").
pub fn link(frame: &FrameRef, local: &str, target: FrameRef, name: &str) -> Result<(), EngineError> {
    if Rc::ptr_eq(frame, &target) && local == name {
        return Err(EngineError::user(format!("cannot upvar from variable to itself: {local}")));
    }
    frame.borrow_mut().vars.insert(local.to_string(), VarSlot::Link { frame: target, name: name.to_string() });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_scalar_round_trips() {
        let global = Frame::new_global();
        set_scalar(&global, "x", Value::from_int(41)).unwrap();
        assert_eq!(get_scalar(&global, "x").unwrap().as_int().unwrap(), 41);
    }

    #[test]
    fn unset_missing_name_is_not_found() {
        let global = Frame::new_global();
        assert!(unset(&global, "nope").is_err());
    }

    #[test]
    fn global_link_reaches_through_call_frame() {
        let global = Frame::new_global();
        set_scalar(&global, "g", Value::from_int(1)).unwrap();
        let call = Frame::new_call(global.clone(), false);
        link(&call, "g", global.clone(), "g").unwrap();
        set_scalar(&call, "g", Value::from_int(2)).unwrap();
        assert_eq!(get_scalar(&global, "g").unwrap().as_int().unwrap(), 2);
    }

    #[test]
    fn upvar_across_two_call_frames() {
        let global = Frame::new_global();
        let outer = Frame::new_call(global.clone(), false);
        set_scalar(&outer, "v", Value::from_int(0)).unwrap();
        let middle = Frame::new_call(outer.clone(), false);
        let target = frame_at_level(&middle, Level::Relative(1)).unwrap();
        assert_eq!(target.borrow().depth, outer.borrow().depth);
        link(&middle, "u", target, "v").unwrap();
        set_scalar(&middle, "u", Value::from_int(7)).unwrap();
        assert_eq!(get_scalar(&outer, "v").unwrap().as_int().unwrap(), 7);
    }

    #[test]
    fn bad_level_above_global_is_an_error() {
        let global = Frame::new_global();
        let call = Frame::new_call(global, false);
        assert!(frame_at_level(&call, Level::Relative(5)).is_err());
    }

    #[test]
    fn local_names_exclude_links() {
        let global = Frame::new_global();
        let call = Frame::new_call(global.clone(), false);
        set_scalar(&call, "local", Value::from_int(1)).unwrap();
        link(&call, "linked", global, "g").unwrap();
        assert_eq!(call.borrow().local_names(), vec!["local".to_string()]);
        assert_eq!(call.borrow().visible_names().len(), 2);
    }

    #[test]
    fn array_get_set_and_names() {
        let global = Frame::new_global();
        set_array_elem(&global, "a", "k1", Value::from_str("v1")).unwrap();
        set_array_elem(&global, "a", "k2", Value::from_str("v2")).unwrap();
        assert_eq!(get_array_elem(&global, "a", "k1").unwrap().as_str().as_ref(), "v1");
        assert_eq!(array_names(&global, "a").unwrap(), vec!["k1".to_string(), "k2".to_string()]);
    }
}
