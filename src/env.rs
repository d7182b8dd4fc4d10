// ABOUTME: Lexical environment frames — parallel variable/function namespaces chained to a parent

use crate::symbol::Symbol;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// One lexical frame. Variable and function bindings live in separate
/// namespaces (a Lisp-2), each a list of `(Symbol, cell)` pairs with new
/// bindings prepended — shadowing within a frame is "most recent wins",
/// matching the environment chain's `acons_new`-style growth in the
/// original evaluator this was modeled on.
#[derive(Debug)]
pub struct Environment {
    vbindings: RefCell<Vec<(Symbol, Rc<RefCell<Value>>)>>,
    fbindings: RefCell<Vec<(Symbol, Rc<RefCell<Value>>)>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// A fresh frame with no bindings of its own.
    pub fn new(parent: Option<Rc<Environment>>) -> Rc<Self> {
        Rc::new(Environment {
            vbindings: RefCell::new(Vec::new()),
            fbindings: RefCell::new(Vec::new()),
            parent,
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Binds `sym` to `value` in this frame's variable namespace,
    /// returning the new binding cell.
    pub fn vbind(&self, sym: Symbol, value: Value) -> Rc<RefCell<Value>> {
        let cell = Rc::new(RefCell::new(value));
        self.vbindings.borrow_mut().push((sym, cell.clone()));
        cell
    }

    /// Binds `sym` to `value` in this frame's function namespace,
    /// returning the new binding cell.
    pub fn fbind(&self, sym: Symbol, value: Value) -> Rc<RefCell<Value>> {
        let cell = Rc::new(RefCell::new(value));
        self.fbindings.borrow_mut().push((sym, cell.clone()));
        cell
    }

    /// Walks this frame then its ancestors looking for a variable
    /// binding cell. Returns `None` once the chain is exhausted — the
    /// top-level namespace fallback is the caller's responsibility
    /// (spec.md §4.1: only the root frame's absence triggers it).
    pub fn lookup_var(&self, sym: &Symbol) -> Option<Rc<RefCell<Value>>> {
        if let Some(cell) = find_binding(&self.vbindings, sym) {
            return Some(cell);
        }
        self.parent.as_ref().and_then(|p| p.lookup_var(sym))
    }

    /// Same as `lookup_var` but in the function namespace.
    pub fn lookup_fun(&self, sym: &Symbol) -> Option<Rc<RefCell<Value>>> {
        if let Some(cell) = find_binding(&self.fbindings, sym) {
            return Some(cell);
        }
        self.parent.as_ref().and_then(|p| p.lookup_fun(sym))
    }
}

fn find_binding(
    bindings: &RefCell<Vec<(Symbol, Rc<RefCell<Value>>)>>,
    sym: &Symbol,
) -> Option<Rc<RefCell<Value>>> {
    bindings
        .borrow()
        .iter()
        .rev()
        .find(|(s, _)| s == sym)
        .map(|(_, cell)| cell.clone())
}
