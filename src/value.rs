// ABOUTME: Value types the evaluator depends on — the host value-model contract (spec.md §3)

use crate::env::Environment;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::symbol::Symbol;
use regex::Regex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A mutable cons cell. Shared via `Rc<RefCell<_>>` so `mutate-car`/
/// `mutate-cdr` are visible through every other reference to the cell —
/// required for closures that capture list structure and for the place
/// engine's `push`/`pop`.
#[derive(Debug)]
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// Native function call shapes, grouped by arity class and whether the
/// native needs the calling environment (spec.md §3 "Function value",
/// §9 "function pointer family indexed by arity class").
#[derive(Clone, Copy)]
pub enum NativeFn {
    Fixed0(fn() -> Result<Value, EvalError>),
    Fixed1(fn(Value) -> Result<Value, EvalError>),
    Fixed2(fn(Value, Value) -> Result<Value, EvalError>),
    Fixed3(fn(Value, Value, Value) -> Result<Value, EvalError>),
    Fixed4(fn(Value, Value, Value, Value) -> Result<Value, EvalError>),
    Variadic0(fn(&[Value]) -> Result<Value, EvalError>),
    Variadic1(fn(Value, &[Value]) -> Result<Value, EvalError>),
    Variadic2(fn(Value, Value, &[Value]) -> Result<Value, EvalError>),
    /// Needs the evaluator itself, to re-enter `eval`/`apply` (e.g. the
    /// `eval`, `apply`, `mapcar`, `mappend` intrinsics).
    Fixed1Eval(fn(Value, &Evaluator) -> Result<Value, EvalError>),
    Fixed2Eval(fn(Value, Value, &Evaluator) -> Result<Value, EvalError>),
    Variadic1Eval(fn(Value, &[Value], &Evaluator) -> Result<Value, EvalError>),
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<native-fn>")
    }
}

/// `minparam`/`variadic` describe arity exactly the way the original
/// evaluator's `fun->f.minparam`/`fun->f.variadic` fields do (spec.md §3).
#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub minparam: usize,
    pub variadic: bool,
    pub call: NativeFn,
}

#[derive(Debug)]
pub enum FunctionValue {
    Interpreted {
        captured_env: Option<Rc<Environment>>,
        params: Value,
        body: Vec<Value>,
    },
    Native(NativeFunction),
}

/// Opaque host pointer — enough surface to exist as a value without the
/// core depending on what it contains.
pub struct OpaquePointer(pub Box<dyn Any>);

impl fmt::Debug for OpaquePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<opaque>")
    }
}

/// Minimal in-memory stream, enough for `print`/`format`/`get-line` to be
/// real operations without reimplementing file/pipe/network I/O, which
/// spec.md §1 names as an external collaborator.
#[derive(Debug, Default)]
pub struct StreamValue {
    pub buffer: String,
}

/// Structural-equality wrapper used as a hash-table key, since `Value`
/// itself is not `Hash`/`Eq` (identity and structural equality are
/// distinct operations per spec.md §3, modeled as `eq`/`equal` methods,
/// not a single `impl Eq`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Nil,
    True,
    Symbol(usize),
    Keyword(usize),
    Integer(i64),
    Character(char),
    String(String),
    Other(usize),
}

fn hash_key_of(v: &Value) -> HashKey {
    match v {
        Value::Nil => HashKey::Nil,
        Value::True => HashKey::True,
        Value::Symbol(s) => HashKey::Symbol(s.id()),
        Value::Keyword(s) => HashKey::Keyword(s.id()),
        Value::Integer(n) => HashKey::Integer(*n),
        Value::Character(c) => HashKey::Character(*c),
        Value::String(s) => HashKey::String(s.borrow().clone()),
        Value::Float(f) => HashKey::Integer(f.to_bits() as i64),
        Value::Cons(c) => HashKey::Other(Rc::as_ptr(c) as usize),
        _ => HashKey::Other(0),
    }
}

#[derive(Debug, Clone)]
pub struct HashTable {
    pub entries: HashMap<HashKey, (Value, Rc<RefCell<Value>>)>,
    pub weak: bool,
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    /// The canonical `t` / boolean-true value.
    True,
    Symbol(Symbol),
    Keyword(Symbol),
    Integer(i64),
    Float(f64),
    Character(char),
    String(Rc<RefCell<String>>),
    Cons(Rc<RefCell<ConsCell>>),
    Regex(Rc<Regex>),
    Function(Rc<FunctionValue>),
    Environment(Rc<Environment>),
    Hash(Rc<RefCell<HashTable>>),
    Stream(Rc<RefCell<StreamValue>>),
    Opaque(Rc<OpaquePointer>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(RefCell::new(s.into())))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Cons(Rc::new(RefCell::new(ConsCell { car, cdr })))
    }

    /// Builds a proper list from a `Vec`, nil-terminated.
    pub fn list(items: Vec<Value>) -> Value {
        let mut out = Value::Nil;
        for item in items.into_iter().rev() {
            out = Value::cons(item, out);
        }
        out
    }

    pub fn car(&self) -> Result<Value, EvalError> {
        match self {
            Value::Nil => Ok(Value::Nil),
            Value::Cons(c) => Ok(c.borrow().car.clone()),
            _ => Err(EvalError::type_error("car", "cons", self)),
        }
    }

    pub fn cdr(&self) -> Result<Value, EvalError> {
        match self {
            Value::Nil => Ok(Value::Nil),
            Value::Cons(c) => Ok(c.borrow().cdr.clone()),
            _ => Err(EvalError::type_error("cdr", "cons", self)),
        }
    }

    pub fn set_car(&self, new_car: Value) -> Result<(), EvalError> {
        match self {
            Value::Cons(c) => {
                c.borrow_mut().car = new_car;
                Ok(())
            }
            _ => Err(EvalError::type_error("mutate-car", "cons", self)),
        }
    }

    pub fn set_cdr(&self, new_cdr: Value) -> Result<(), EvalError> {
        match self {
            Value::Cons(c) => {
                c.borrow_mut().cdr = new_cdr;
                Ok(())
            }
            _ => Err(EvalError::type_error("mutate-cdr", "cons", self)),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::Cons(_))
    }

    pub fn is_cons(&self) -> bool {
        matches!(self, Value::Cons(_))
    }

    /// A value is truthy unless it is `nil`; everything else, including
    /// `0` and a symbol named `"nil"`, is truthy (spec.md §4.3
    /// `if`/`and`/`or`).
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// A value is a proper or improper list if it is `nil` or a cons.
    pub fn is_listp(&self) -> bool {
        matches!(self, Value::Nil | Value::Cons(_))
    }

    /// A proper list is `nil`-terminated with no dotted tail.
    pub fn is_proper_list(&self) -> bool {
        let mut cur = self.clone();
        loop {
            match cur {
                Value::Nil => return true,
                Value::Cons(c) => cur = c.borrow().cdr.clone(),
                _ => return false,
            }
        }
    }

    /// A symbol is bindable iff it is non-nil, not canonical `t`, and not
    /// a keyword (spec.md §3 "Bindable symbol"). `Nil` and `True` are
    /// their own variants here, so any `Symbol` is bindable by construction.
    pub fn is_bindable(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    /// Walks a proper list into a `Vec<Value>`. Errors if the list is
    /// improper (ends in something other than `nil`).
    pub fn to_vec(&self) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::new();
        let mut cur = self.clone();
        loop {
            match cur {
                Value::Nil => return Ok(out),
                Value::Cons(c) => {
                    let cell = c.borrow();
                    out.push(cell.car.clone());
                    cur = cell.cdr.clone();
                }
                _ => return Err(EvalError::SyntaxError("improper list".into())),
            }
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil",
            Value::True => "boolean-true",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Character(_) => "character",
            Value::String(_) => "string",
            Value::Cons(_) => "cons",
            Value::Regex(_) => "regex",
            Value::Function(_) => "function",
            Value::Environment(_) => "environment",
            Value::Hash(_) => "hash",
            Value::Stream(_) => "stream",
            Value::Opaque(_) => "opaque-pointer",
        }
        .to_string()
    }

    /// Identity comparison (`eq`): same object, or equal immediate scalar.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) | (Value::True, Value::True) => true,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Environment(a), Value::Environment(b)) => Rc::ptr_eq(a, b),
            (Value::Stream(a), Value::Stream(b)) => Rc::ptr_eq(a, b),
            (Value::Regex(a), Value::Regex(b)) => Rc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural comparison (`equal`): recurses into conses and strings.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => *a.borrow() == *b.borrow(),
            (Value::Cons(a), Value::Cons(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.car.is_equal(&b.car) && a.cdr.is_equal(&b.cdr)
            }
            _ => self.is_eq(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::True => write!(f, "t"),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Keyword(s) => write!(f, ":{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Character(c) => write!(f, "#\\{}", c),
            Value::String(s) => write!(f, "{:?}", s.borrow()),
            Value::Cons(_) => {
                write!(f, "(")?;
                let mut cur = self.clone();
                let mut first = true;
                loop {
                    match cur {
                        Value::Cons(c) => {
                            if !first {
                                write!(f, " ")?;
                            }
                            first = false;
                            let cell = c.borrow();
                            write!(f, "{}", cell.car)?;
                            cur = cell.cdr.clone();
                        }
                        Value::Nil => break,
                        other => {
                            write!(f, " . {}", other)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Regex(r) => write!(f, "#/{}/", r.as_str()),
            Value::Function(_) => write!(f, "#<function>"),
            Value::Environment(_) => write!(f, "#<environment>"),
            Value::Hash(_) => write!(f, "#<hash>"),
            Value::Stream(_) => write!(f, "#<stream>"),
            Value::Opaque(_) => write!(f, "#<opaque>"),
        }
    }
}

pub fn hash_key(v: &Value) -> HashKey {
    hash_key_of(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_builds_nil_terminated_chain() {
        let l = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(l.to_vec().unwrap().len(), 3);
        assert_eq!(format!("{}", l), "(1 2 3)");
    }

    #[test]
    fn empty_list_is_nil() {
        let l = Value::list(vec![]);
        assert!(l.is_nil());
    }

    #[test]
    fn car_cdr_roundtrip() {
        let l = Value::list(vec![Value::Integer(1), Value::Integer(2)]);
        assert!(matches!(l.car().unwrap(), Value::Integer(1)));
        let rest = l.cdr().unwrap();
        assert!(matches!(rest.car().unwrap(), Value::Integer(2)));
        assert!(rest.cdr().unwrap().is_nil());
    }

    #[test]
    fn mutate_cdr_visible_through_alias() {
        let cell = Value::cons(Value::Integer(1), Value::Nil);
        let alias = cell.clone();
        cell.set_cdr(Value::Integer(99)).unwrap();
        assert!(matches!(alias.cdr().unwrap(), Value::Integer(99)));
    }

    #[test]
    fn eq_is_identity_not_structure() {
        let a = Value::list(vec![Value::Integer(1)]);
        let b = Value::list(vec![Value::Integer(1)]);
        assert!(!a.is_eq(&b));
        assert!(a.is_equal(&b));
    }

    #[test]
    fn eq_holds_for_same_cons_cell() {
        let a = Value::cons(Value::Integer(1), Value::Nil);
        let b = a.clone();
        assert!(a.is_eq(&b));
    }

    #[test]
    fn improper_list_is_not_proper() {
        let dotted = Value::cons(Value::Integer(1), Value::Integer(2));
        assert!(!dotted.is_proper_list());
        assert!(dotted.is_listp());
    }
}
