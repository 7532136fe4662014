//! The polymorphic value model (§3, §9 "Dynamic value polymorphism").
//!
//! A [`Value`] is a cheap-to-clone handle (an `Rc`) around a cell holding two
//! coexistent, lazily-populated representations: a serialized byte form (here,
//! UTF-8 text — the engine does not need to support non-UTF-8 script text) and an
//! optional typed form. Reading a representation that has not been computed yet
//! derives it from whichever representation *is* present and memoizes the result
//! ("shimmering"); this module never discards information the caller didn't ask
//! to discard.
//!
//! Values are conceptually host-owned and garbage collected (§3); this crate
//! stands in for that with reference counting, which gives the same "copies are
//! cheap, many handles may alias one value" behavior an embedding host provides.

pub mod dict;
pub mod list;
pub mod number;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::EngineError;

/// A host-registered custom typed form (§3, §6 "value constructors"). The engine
/// only needs to be able to ask a custom value for its type name and its
/// serialized rendering; everything else is opaque to it.
pub trait CustomValue: fmt::Debug {
    fn type_name(&self) -> &'static str;
    fn to_bytes(&self) -> String;
}

/// The typed interpretation cached on a [`Value`], per §3.
#[derive(Clone)]
pub enum TypedValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    List(Rc<Vec<Value>>),
    Dict(Rc<IndexMap<String, Value>>),
    Custom(Rc<dyn CustomValue>),
}

impl TypedValue {
    fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Int(_) => "int",
            TypedValue::Double(_) => "double",
            TypedValue::Bool(_) => "boolean",
            TypedValue::List(_) => "list",
            TypedValue::Dict(_) => "dict",
            TypedValue::Custom(c) => c.type_name(),
        }
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(i) => write!(f, "Int({i})"),
            TypedValue::Double(d) => write!(f, "Double({d})"),
            TypedValue::Bool(b) => write!(f, "Bool({b})"),
            TypedValue::List(l) => write!(f, "List(len={})", l.len()),
            TypedValue::Dict(d) => write!(f, "Dict(len={})", d.len()),
            TypedValue::Custom(c) => write!(f, "Custom({:?})", c),
        }
    }
}

struct ValueData {
    bytes: Option<Rc<str>>,
    typed: Option<TypedValue>,
}

/// A polymorphic value handle. Cloning a `Value` clones the `Rc`, not the data —
/// aliasing is the normal, expected case (§9: "treat them as shared
/// immutable-by-convention handles").
#[derive(Clone)]
pub struct Value(Rc<RefCell<ValueData>>);

impl Value {
    fn new(bytes: Option<Rc<str>>, typed: Option<TypedValue>) -> Self {
        debug_assert!(bytes.is_some() || typed.is_some(), "a value must have at least one representation");
        Value(Rc::new(RefCell::new(ValueData { bytes, typed })))
    }

    /// Constructs a value from its serialized form with no typed form cached yet.
    pub fn from_str(s: impl Into<String>) -> Value {
        Value::new(Some(Rc::from(s.into())), None)
    }

    pub fn from_int(i: i64) -> Value {
        Value::new(None, Some(TypedValue::Int(i)))
    }

    pub fn from_double(d: f64) -> Value {
        Value::new(None, Some(TypedValue::Double(d)))
    }

    pub fn from_bool(b: bool) -> Value {
        Value::new(None, Some(TypedValue::Bool(b)))
    }

    pub fn from_list(elements: Vec<Value>) -> Value {
        Value::new(None, Some(TypedValue::List(Rc::new(elements))))
    }

    pub fn empty_dict() -> Value {
        Value::from_dict(IndexMap::new())
    }

    pub fn from_dict(map: IndexMap<String, Value>) -> Value {
        Value::new(None, Some(TypedValue::Dict(Rc::new(map))))
    }

    pub fn from_custom(custom: Rc<dyn CustomValue>) -> Value {
        Value::new(None, Some(TypedValue::Custom(custom)))
    }

    /// An independent handle carrying a copy of the currently cached
    /// representations. Used where a caller needs a value that will not be
    /// affected by later shimmering of the original handle's cache (shimmering
    /// itself never changes the logical value, so this is rarely needed —
    /// mainly for host "shallow copy" parity, §6).
    pub fn duplicate(&self) -> Value {
        let data = self.0.borrow();
        Value::new(data.bytes.clone(), data.typed.clone())
    }

    /// The serialized form, computing and memoizing it from the typed form if
    /// necessary.
    pub fn as_str(&self) -> Rc<str> {
        if let Some(bytes) = self.0.borrow().bytes.clone() {
            return bytes;
        }
        let serialized: Rc<str> = {
            let data = self.0.borrow();
            let typed = data.typed.as_ref().expect("value must have a representation");
            Rc::from(serialize_typed(typed))
        };
        self.0.borrow_mut().bytes = Some(serialized.clone());
        serialized
    }

    /// The stated type for introspection: the tag of the last cached typed form,
    /// or `"string"` if no typed form has been computed yet (§3).
    pub fn stated_type(&self) -> &'static str {
        match &self.0.borrow().typed {
            Some(t) => t.type_name(),
            None => "string",
        }
    }

    pub fn as_int(&self) -> Result<i64, EngineError> {
        if let Some(TypedValue::Int(i)) = self.0.borrow().typed {
            return Ok(i);
        }
        let s = self.as_str();
        match number::parse_int(&s) {
            Some(i) => {
                self.0.borrow_mut().typed = Some(TypedValue::Int(i));
                Ok(i)
            }
            None => Err(EngineError::TypeError { expected: "integer", got: s.to_string() }),
        }
    }

    pub fn as_double(&self) -> Result<f64, EngineError> {
        if let Some(TypedValue::Double(d)) = self.0.borrow().typed {
            return Ok(d);
        }
        if let Some(TypedValue::Int(i)) = self.0.borrow().typed {
            return Ok(i as f64);
        }
        let s = self.as_str();
        match number::parse_double(&s) {
            Some(d) => {
                self.0.borrow_mut().typed = Some(TypedValue::Double(d));
                Ok(d)
            }
            None => Err(EngineError::TypeError { expected: "double", got: s.to_string() }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, EngineError> {
        if let Some(TypedValue::Bool(b)) = self.0.borrow().typed {
            return Ok(b);
        }
        if let Some(TypedValue::Int(i)) = self.0.borrow().typed {
            return Ok(i != 0);
        }
        let s = self.as_str();
        match number::parse_bool(&s) {
            Some(b) => {
                self.0.borrow_mut().typed = Some(TypedValue::Bool(b));
                Ok(b)
            }
            None => Err(EngineError::TypeError { expected: "boolean", got: s.to_string() }),
        }
    }

    /// The list typed form, reparsing the serialized form on first access
    /// (§8: "for every list L produced by the engine, length(L) =
    /// length(parse(serialize(L)))").
    pub fn as_list(&self) -> Result<Rc<Vec<Value>>, EngineError> {
        if let Some(TypedValue::List(l)) = &self.0.borrow().typed {
            return Ok(l.clone());
        }
        let s = self.as_str();
        let elements = list::parse(&s)?.into_iter().map(Value::from_str).collect::<Vec<_>>();
        let rc = Rc::new(elements);
        self.0.borrow_mut().typed = Some(TypedValue::List(rc.clone()));
        Ok(rc)
    }

    pub fn as_dict(&self) -> Result<Rc<IndexMap<String, Value>>, EngineError> {
        if let Some(TypedValue::Dict(d)) = &self.0.borrow().typed {
            return Ok(d.clone());
        }
        let s = self.as_str();
        let parsed = dict::parse(&s)?;
        let map: IndexMap<String, Value> = parsed.into_iter().map(|(k, v)| (k, Value::from_str(v))).collect();
        let rc = Rc::new(map);
        self.0.borrow_mut().typed = Some(TypedValue::Dict(rc.clone()));
        Ok(rc)
    }

    /// Reinterprets this value as a sequence of arguments, for `{*}`-expand words
    /// (§4.3 "command evaluation").
    pub fn as_expand_elements(&self) -> Result<Vec<Value>, EngineError> {
        Ok(self.as_list()?.as_ref().clone())
    }

    /// Whether this handle is shared beyond the caller's own reference — callers
    /// performing an in-place-feeling mutation should duplicate first when this
    /// is true, since logical values are immutable-by-convention (§9).
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.0) > 1
    }

    /// An opaque identity used to key the AST cache on a script body's value
    /// (§4.3 "AST caching") — two handles produced by `duplicate` or separate
    /// constructors never compare equal here, matching "invalidated on any
    /// shimmer-out of the script type".
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("bytes", &self.0.borrow().bytes).field("typed", &self.0.borrow().typed).finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

fn serialize_typed(typed: &TypedValue) -> String {
    match typed {
        TypedValue::Int(i) => i.to_string(),
        TypedValue::Double(d) => format_double(*d),
        TypedValue::Bool(b) => if *b { "1".to_string() } else { "0".to_string() },
        TypedValue::List(elements) => {
            let strs: Vec<String> = elements.iter().map(|v| v.as_str().to_string()).collect();
            list::format(&strs)
        }
        TypedValue::Dict(map) => {
            let strs: IndexMap<String, String> = map.iter().map(|(k, v)| (k.clone(), v.as_str().to_string())).collect();
            dict::format(&strs)
        }
        TypedValue::Custom(c) => c.to_bytes(),
    }
}

fn format_double(d: f64) -> String {
    let s = format!("{}", d);
    if s.contains('.') || s.contains('e') || s.contains('E') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shimmer_string_to_int_and_back() {
        let v = Value::from_str("42");
        assert_eq!(v.stated_type(), "string");
        assert_eq!(v.as_int().unwrap(), 42);
        assert_eq!(v.stated_type(), "int");
        // round trip: serializing the typed form then reparsing yields the same typed form.
        assert_eq!(v.as_str().as_ref(), "42");
        assert_eq!(v.as_int().unwrap(), 42);
    }

    #[test]
    fn shimmer_list_round_trip() {
        let v = Value::from_str("a {b c} d");
        let list = v.as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].as_str().as_ref(), "b c");
    }

    #[test]
    fn constructed_list_serializes_with_quoting() {
        let v = Value::from_list(vec![Value::from_str("a"), Value::from_str("b c"), Value::from_str("")]);
        assert_eq!(v.as_str().as_ref(), "a {b c} {}");
        let reparsed = v.duplicate();
        let elems = reparsed.as_list().unwrap();
        assert_eq!(elems.len(), 3);
        assert_eq!(elems[2].as_str().as_ref(), "");
    }

    #[test]
    fn cloning_shares_the_handle() {
        let v = Value::from_str("x");
        let v2 = v.clone();
        assert!(v.is_shared());
        assert_eq!(v.identity(), v2.identity());
    }

    #[test]
    fn duplicate_makes_an_independent_handle() {
        let v = Value::from_str("x");
        let v2 = v.duplicate();
        assert_ne!(v.identity(), v2.identity());
        assert_eq!(v, v2);
    }

    #[test]
    fn double_formatting_always_looks_like_a_double() {
        assert_eq!(Value::from_double(3.0).as_str().as_ref(), "3.0");
        assert_eq!(Value::from_double(3.25).as_str().as_ref(), "3.25");
    }

    #[test]
    fn bad_int_coercion_is_a_type_error() {
        let v = Value::from_str("not a number");
        assert!(v.as_int().is_err());
    }
}
