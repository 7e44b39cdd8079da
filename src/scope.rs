//! Module that defines the [`SymbolTable`] type: a name-to-value mapping
//! with an optional parent, the building block of a [`crate::context::Context`].

use crate::immutable_string::Identifier;
use crate::value::Value;
use smallvec::SmallVec;
use std::rc::Rc;
use std::cell::RefCell;

/// Keep a handful of bindings inline; most scopes (an `if` body, a single
/// call frame) bind only a few names.
const SCOPE_ENTRIES_INLINED: usize = 8;

/// A mapping from name to value, with an optional parent table.
///
/// `get` searches this table then its parents, returning `None` (the
/// "undefined" sentinel, distinct from [`Value::Null`]) if the name is bound
/// nowhere in the chain. `set` always writes into this table, never a
/// parent's — matching the language's rule that assignment never implicitly
/// rebinds an enclosing scope's name. `remove` only ever touches this table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: SmallVec<[(Identifier, Value); SCOPE_ENTRIES_INLINED]>,
    parent: Option<Rc<RefCell<SymbolTable>>>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_parent(parent: Rc<RefCell<SymbolTable>>) -> Self {
        Self {
            entries: SmallVec::new(),
            parent: Some(parent),
        }
    }

    fn local_get(&self, name: &str) -> Option<Value> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Searches this table, then its parents. `None` means the name is
    /// undefined anywhere in the chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.local_get(name) {
            return Some(v);
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Binds `name` to `value` in this table. Rebinds in place if already
    /// locally bound, else appends.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.entries.iter_mut().rev().find(|(n, _)| n == name) {
            slot.1 = value;
            return;
        }
        self.entries.push((Identifier::from(name), value));
    }

    /// Removes `name` from this table only. Returns its previous value, or
    /// `None` if it was not locally bound (the spec's "undefined" sentinel).
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// True if `name` is bound locally (not counting parents).
    #[must_use]
    pub fn contains_local(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }
}
