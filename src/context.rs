//! The execution [`Context`]: a symbol table plus the linkage used to
//! reconstruct a traceback when a runtime error escapes it.

use crate::error::TracebackFrame;
use crate::position::Position;
use crate::scope::SymbolTable;
use std::cell::RefCell;
use std::rc::Rc;

/// A single execution frame: a display name (used in tracebacks, e.g.
/// `<module>`), an optional parent frame, the position in the parent where
/// this context was entered, and the symbol table it owns.
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    pub parent_call_position: Option<Position>,
    pub table: Rc<RefCell<SymbolTable>>,
}

impl Context {
    /// Builds the root `<module>` context with a fresh, parentless symbol table.
    #[must_use]
    pub fn new_global() -> Rc<Self> {
        Rc::new(Self {
            display_name: "<module>".to_string(),
            parent: None,
            parent_call_position: None,
            table: Rc::new(RefCell::new(SymbolTable::new())),
        })
    }

    /// Builds a child context whose symbol table chains to this one's.
    #[must_use]
    pub fn child(self: &Rc<Self>, display_name: String, call_position: Position) -> Rc<Self> {
        Rc::new(Self {
            display_name,
            parent: Some(self.clone()),
            parent_call_position: Some(call_position),
            table: Rc::new(RefCell::new(SymbolTable::with_parent(self.table.clone()))),
        })
    }

    /// Walks this context's chain, oldest frame first, producing the
    /// traceback a runtime error raised here should carry.
    #[must_use]
    pub fn traceback(self: &Rc<Self>) -> Vec<TracebackFrame> {
        let mut frames = Vec::new();
        let mut current = Some(self.clone());
        while let Some(ctx) = current {
            if let Some(pos) = &ctx.parent_call_position {
                frames.push(TracebackFrame {
                    display_name: ctx.display_name.clone(),
                    call_position: pos.clone(),
                });
            }
            current = ctx.parent.clone();
        }
        frames.reverse();
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc as StdRc;

    fn pos() -> Position {
        Position {
            index: 0,
            line: 0,
            column: 0,
            file_name: StdRc::from("<test>"),
            source_text: StdRc::from(""),
        }
    }

    #[test]
    fn global_context_is_module_with_no_parent() {
        let ctx = Context::new_global();
        assert_eq!(ctx.display_name, "<module>");
        assert!(ctx.parent.is_none());
    }

    #[test]
    fn child_table_sees_parent_bindings() {
        use crate::value::Value;
        let global = Context::new_global();
        global.table.borrow_mut().set("x", Value::Int(7));
        let child = global.child("inner".to_string(), pos());
        assert!(matches!(child.table.borrow().get("x"), Some(Value::Int(7))));
    }

    #[test]
    fn traceback_is_oldest_frame_first() {
        let global = Context::new_global();
        let mid = global.child("a".to_string(), pos());
        let inner = mid.child("b".to_string(), pos());
        let frames = inner.traceback();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].display_name, "a");
        assert_eq!(frames[1].display_name, "b");
    }
}
