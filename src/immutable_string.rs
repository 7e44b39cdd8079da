//! The [`ImmutableString`] type: a cheaply-cloned, immutable Unicode string.

use smartstring::{LazyCompact, SmartString};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Deref};
use std::rc::Rc;

/// Backing storage: short strings live inline, longer ones spill to the heap.
pub type Identifier = SmartString<LazyCompact>;

/// An immutable, reference-counted string.
///
/// Wraps an [`Rc`]`<`[`SmartString`]`>` so cloning a [`String`][crate::value::Value::String]
/// value never copies the underlying text, matching the data model's "immutable
/// Unicode text" invariant.
#[derive(Clone, Eq)]
pub struct ImmutableString(Rc<Identifier>);

impl Deref for ImmutableString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl Borrow<str> for ImmutableString {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ImmutableString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for ImmutableString {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Hash for ImmutableString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_str().hash(state);
    }
}

impl PartialOrd for ImmutableString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ImmutableString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_str().cmp(other.0.as_str())
    }
}

impl fmt::Display for ImmutableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl fmt::Debug for ImmutableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_str(), f)
    }
}

impl From<&str> for ImmutableString {
    fn from(s: &str) -> Self {
        Self(Rc::new(Identifier::from(s)))
    }
}

impl From<String> for ImmutableString {
    fn from(s: String) -> Self {
        Self(Rc::new(Identifier::from(s)))
    }
}

impl Add for ImmutableString {
    type Output = ImmutableString;

    fn add(self, rhs: Self) -> Self::Output {
        let mut out = Identifier::from(self.0.as_str());
        out.push_str(rhs.0.as_str());
        Self(Rc::new(out))
    }
}

impl ImmutableString {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_storage() {
        let a: ImmutableString = "hello".into();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn concatenation_builds_new_string() {
        let a: ImmutableString = "foo".into();
        let b: ImmutableString = "bar".into();
        assert_eq!((a + b).as_str(), "foobar");
    }

    #[test]
    fn len_counts_chars_not_bytes() {
        let s: ImmutableString = "你好".into();
        assert_eq!(s.len(), 2);
    }
}
