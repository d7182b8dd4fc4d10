// ABOUTME: Symbol interning — two symbols are equal iff they are the same object

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

struct SymbolData {
    name: String,
    package: &'static str,
}

/// An interned symbol, compared by identity (pointer equality) rather than name.
///
/// Cloning a `Symbol` is cheap (an `Rc` bump) and always yields something
/// that compares equal to the original, never to a different symbol that
/// merely shares a spelling.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn package(&self) -> &'static str {
        self.0.package
    }

    /// Stable identity for this symbol, usable as a hash-table key.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// Interns symbols by name within a single package namespace.
///
/// Per spec.md §5 the evaluator is single-threaded, so a thread-local
/// table (rather than a `Mutex`-guarded global) is the right shape.
pub struct Interner {
    table: RefCell<HashMap<(&'static str, String), Symbol>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            table: RefCell::new(HashMap::new()),
        }
    }

    pub fn intern(&self, name: &str, package: &'static str) -> Symbol {
        let key = (package, name.to_string());
        if let Some(sym) = self.table.borrow().get(&key) {
            return sym.clone();
        }
        let sym = Symbol(Rc::new(SymbolData {
            name: name.to_string(),
            package,
        }));
        self.table.borrow_mut().insert(key, sym.clone());
        sym
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static GLOBAL_INTERNER: Interner = Interner::new();
}

/// Interns `name` in the `"user"` package, the package every symbol in
/// this crate's forms lives in unless otherwise noted.
pub fn intern(name: &str) -> Symbol {
    GLOBAL_INTERNER.with(|i| i.intern(name, "user"))
}
