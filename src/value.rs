//! The runtime [`Value`] lattice: the polymorphic value every AST node
//! evaluates to.

use crate::error::ErrorKind;
use crate::immutable_string::ImmutableString;
use ahash::AHashMap;
use num_traits::ToPrimitive;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A value suitable for use as a [`Dict`] key: the subset of [`Value`] the
/// data model calls hashable (numbers, strings, null, tuples of hashables),
/// normalised so that `1`, `1.0` and `true` hash and compare equal, matching
/// the language's own equality rule between numeric subtypes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Null,
    Int(i64),
    Float(u64),
    Str(ImmutableString),
    Tuple(Vec<Key>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "null"),
            Key::Int(n) => write!(f, "{}", n),
            Key::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Key::Str(s) => write!(f, "{:?}", s.as_str()),
            Key::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// An insertion-ordered mapping of hashable keys to values.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    map: AHashMap<Key, Value>,
    order: Vec<Key>,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: Key, value: Value) {
        if !self.map.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.map.insert(key, value);
    }

    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.map.remove(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.order.iter().map(move |k| (k, &self.map[k]))
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| values_equal(v, ov)))
    }
}

/// A native function implementing a builtin. Takes the evaluated positional
/// arguments, the keyword-argument dict, and the output sink (for
/// `print`/`打印`); returns the builtin's result or the [`ErrorKind`] to
/// raise. The call site (in the interpreter) attaches the position and
/// traceback, so builtins need not carry either.
pub type NativeFn = fn(&[Value], &Dict, &mut dyn FnMut(&str)) -> Result<Value, ErrorKind>;

/// A host-provided callable bound to a fixed name, e.g. `print`/`打印`.
#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin function {}>", self.name)
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::eq(self.func as *const (), other.func as *const ())
    }
}

/// One of the built-in kinds every [`Value`] belongs to. `Type` is its own
/// type; `Object` is the root type returned for nothing else in particular
/// but exposed as the `object` builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    NullType,
    Bool,
    Int,
    Float,
    Str,
    Tuple,
    List,
    Dict,
    Slice,
    BuiltinFunction,
    Type,
    Object,
}

impl TypeTag {
    /// The stable, unique display name of this type, e.g. `int`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::NullType => "NoneType",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::Tuple => "tuple",
            TypeTag::List => "list",
            TypeTag::Dict => "dict",
            TypeTag::Slice => "slice",
            TypeTag::BuiltinFunction => "builtin_function",
            TypeTag::Type => "type",
            TypeTag::Object => "object",
        }
    }
}

/// The polymorphic value every AST node evaluates to.
#[derive(Debug, Clone)]
pub enum Value {
    /// The process-wide singleton; `Null == Null` by identity.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(ImmutableString),
    /// Immutable ordered sequence.
    Tuple(Rc<Vec<Value>>),
    /// Mutable ordered sequence; shared via `Rc` so aliasing copies mutate together.
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<Dict>>),
    /// `(start, stop, step)`; any part may be `Null`.
    Slice(Rc<(Value, Value, Value)>),
    BuiltinFunction(BuiltinFunction),
    Type(TypeTag),
}

impl Value {
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::NullType,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::Str,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::List(_) => TypeTag::List,
            Value::Dict(_) => TypeTag::Dict,
            Value::Slice(_) => TypeTag::Slice,
            Value::BuiltinFunction(_) => TypeTag::BuiltinFunction,
            Value::Type(_) => TypeTag::Type,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    /// Truthiness per the language's rule: `Null` false; numeric zero false;
    /// empty string/list/tuple/dict false; everything else true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Slice(_) | Value::BuiltinFunction(_) | Value::Type(_) => true,
        }
    }

    /// Converts this value to a [`Key`] for use as a `Dict` key, or a
    /// `TypeError` if it is not hashable.
    pub fn as_key(&self) -> Result<Key, ErrorKind> {
        Ok(match self {
            Value::Null => Key::Null,
            Value::Bool(b) => Key::Int(*b as i64),
            Value::Int(n) => Key::Int(*n),
            Value::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Key::Int(*f as i64)
                } else {
                    Key::Float(f.to_bits())
                }
            }
            Value::String(s) => Key::Str(s.clone()),
            Value::Tuple(items) => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items.iter() {
                    keys.push(item.as_key()?);
                }
                Key::Tuple(keys)
            }
            other => {
                return Err(ErrorKind::Type(format!(
                    "unhashable type: '{}'",
                    other.type_name()
                )))
            }
        })
    }

    /// Renders this value the way `print`/`str()` do: no quotes around strings.
    #[must_use]
    pub fn display_string(&self) -> String {
        match self {
            Value::String(s) => s.as_str().to_string(),
            other => other.repr_string(),
        }
    }

    /// Renders this value the way it would appear as a literal, e.g. inside a
    /// list/tuple/dict or the REPL's echoed result.
    #[must_use]
    pub fn repr_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if f.is_nan() {
                    "NaN".to_string()
                } else if f.is_infinite() {
                    if *f > 0.0 {
                        "Inf".to_string()
                    } else {
                        "-Inf".to_string()
                    }
                } else if f.fract() == 0.0 {
                    format!("{:.1}", f)
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => format!("{:?}", s.as_str()),
            Value::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(Value::repr_string).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
            Value::List(items) => {
                let items = items.borrow();
                let parts: Vec<_> = items.iter().map(Value::repr_string).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Dict(dict) => {
                let dict = dict.borrow();
                let parts: Vec<_> = dict
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.repr_string()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Slice(parts) => {
                format!(
                    "slice({}, {}, {})",
                    parts.0.repr_string(),
                    parts.1.repr_string(),
                    parts.2.repr_string()
                )
            }
            Value::BuiltinFunction(f) => format!("<built-in function {}>", f.name),
            Value::Type(t) => format!("<type '{}'>", t.name()),
        }
    }

    /// Promotes a numeric value to `f64`, the common ground the interpreter's
    /// mixed `Int`/`Float`/`Bool` arithmetic and comparison dispatch needs.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => (*b as i64).to_f64(),
            Value::Int(n) => n.to_f64(),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }
}

/// Structural equality implementing the language's `==`: cross-type
/// comparisons between unrelated kinds are simply `false`, never a `TypeError`.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Tuple(a), Value::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::List(a), Value::List(b)) => {
            let a = a.borrow();
            let b = b.borrow();
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Dict(a), Value::Dict(b)) => *a.borrow() == *b.borrow(),
        (Value::Slice(a), Value::Slice(b)) => {
            values_equal(&a.0, &b.0) && values_equal(&a.1, &b.1) && values_equal(&a.2, &b.2)
        }
        (Value::BuiltinFunction(a), Value::BuiltinFunction(b)) => a == b,
        (Value::Type(a), Value::Type(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_falsy_and_equal_to_itself() {
        assert!(!Value::Null.is_truthy());
        assert!(values_equal(&Value::Null, &Value::Null));
    }

    #[test]
    fn empty_collections_are_falsy() {
        assert!(!Value::Tuple(Rc::new(Vec::new())).is_truthy());
        assert!(!Value::List(Rc::new(RefCell::new(Vec::new()))).is_truthy());
        assert!(!Value::Dict(Rc::new(RefCell::new(Dict::new()))).is_truthy());
        assert!(!Value::String("".into()).is_truthy());
    }

    #[test]
    fn bool_is_int_subtype_for_equality() {
        assert!(values_equal(&Value::Bool(true), &Value::Int(1)));
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(!values_equal(&Value::Int(2), &Value::Float(1.0)));
    }

    #[test]
    fn cross_type_equality_is_false_not_an_error() {
        assert!(!values_equal(&Value::Int(1), &Value::String("1".into())));
    }

    #[test]
    fn numeric_keys_normalise_across_subtypes() {
        let k1 = Value::Int(1).as_key().unwrap();
        let k2 = Value::Bool(true).as_key().unwrap();
        let k3 = Value::Float(1.0).as_key().unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1, k3);
    }

    #[test]
    fn list_is_unhashable() {
        let list = Value::List(Rc::new(RefCell::new(Vec::new())));
        assert!(list.as_key().is_err());
    }

    #[test]
    fn dict_insertion_order_is_preserved() {
        let mut dict = Dict::new();
        dict.insert(Key::Str("b".into()), Value::Int(2));
        dict.insert(Key::Str("a".into()), Value::Int(1));
        let order: Vec<_> = dict.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["\"b\"", "\"a\""]);
    }
}
