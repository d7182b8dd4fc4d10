// ABOUTME: Place-update engine backing set/inc/dec/push/pop against bindable symbols and gethash entries

use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO};
use crate::eval::eval;
use crate::evaluator::Evaluator;
use crate::symbol::intern;
use crate::value::{hash_key, HashTable, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Resolves a place expression to the binding cell it names, without
/// evaluating the place expression itself as a value — only a bindable
/// symbol and `(gethash hash key [default])` are supported place shapes
/// (spec.md §4.6).
pub fn resolve_place(
    ev: &Evaluator,
    place_form: &Value,
    env: &Rc<Environment>,
) -> Result<Rc<RefCell<Value>>, EvalError> {
    match place_form {
        Value::Symbol(sym) => env
            .lookup_var(sym)
            .ok_or_else(|| EvalError::unbound_variable(sym.name())),
        Value::Cons(_) => {
            let oper = place_form.car()?;
            let is_gethash = matches!(&oper, Value::Symbol(s) if s == &ev.operators.gethash);
            if !is_gethash {
                return Err(EvalError::bad_place(place_form));
            }
            let args = place_form.cdr()?.to_vec()?;
            let hash_expr = args.first().ok_or_else(|| EvalError::bad_place(place_form))?;
            let key_expr = args.get(1).ok_or_else(|| EvalError::bad_place(place_form))?;
            let default_expr = args.get(2);

            let hash_val = eval(ev, hash_expr, env)?;
            let key_val = eval(ev, key_expr, env)?;
            let default_val = match default_expr {
                Some(d) => eval(ev, d, env)?,
                None => Value::Nil,
            };

            let table = match &hash_val {
                Value::Hash(h) => h.clone(),
                other => return Err(EvalError::type_error("gethash", "hash", other)),
            };

            let key = hash_key(&key_val);
            let cell = {
                let mut borrowed = table.borrow_mut();
                borrowed
                    .entries
                    .entry(key)
                    .or_insert_with(|| (key_val.clone(), Rc::new(RefCell::new(default_val))))
                    .1
                    .clone()
            };
            Ok(cell)
        }
        _ => Err(EvalError::bad_place(place_form)),
    }
}

/// Adds two numbers, promoting to `Float` if either operand is one.
fn numeric_add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(Value::Integer(x + y)),
        (Value::Integer(x), Value::Float(y)) => Ok(Value::Float(*x as f64 + y)),
        (Value::Float(x), Value::Integer(y)) => Ok(Value::Float(x + *y as f64)),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x + y)),
        _ => Err(EvalError::type_error("inc", "number", a)),
    }
}

/// Evaluates the optional third form of a place-update, defaulting to
/// integer `1` when the form is absent or evaluates to `nil` — spec.md
/// §4.6's blanket rule, applied uniformly across `set`/`inc`/`dec`/`push`
/// the way the evaluator this was modeled on applies it before dispatching
/// on the operator name.
fn eval_or_one(ev: &Evaluator, expr: Option<&Value>, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match expr {
        Some(e) => {
            let v = eval(ev, e, env)?;
            if v.is_nil() {
                Ok(Value::Integer(1))
            } else {
                Ok(v)
            }
        }
        None => Ok(Value::Integer(1)),
    }
}

/// Implements `set`/`inc`/`dec`/`push`/`pop` against a resolved place.
/// `dec` adds its delta exactly like `inc` rather than subtracting —
/// this matches the evaluator this was modeled on byte for byte, and is
/// kept as observed behavior rather than corrected into a subtraction.
pub fn modplace(
    ev: &Evaluator,
    op_name: &str,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    match op_name {
        "set" => {
            let place = args
                .first()
                .ok_or_else(|| EvalError::arity_error("set", ARITY_TWO, args.len()))?;
            let cell = resolve_place(ev, place, env)?;
            let new_val = eval_or_one(ev, args.get(1), env)?;
            *cell.borrow_mut() = new_val.clone();
            Ok(new_val)
        }
        "inc" | "dec" => {
            let place = args
                .first()
                .ok_or_else(|| EvalError::arity_error(op_name, "1-2", args.len()))?;
            let delta = eval_or_one(ev, args.get(1), env)?;
            let cell = resolve_place(ev, place, env)?;
            let current = cell.borrow().clone();
            let new_val = numeric_add(&current, &delta)?;
            *cell.borrow_mut() = new_val.clone();
            Ok(new_val)
        }
        "push" => {
            let place = args
                .first()
                .ok_or_else(|| EvalError::arity_error("push", ARITY_TWO, args.len()))?;
            let val = eval_or_one(ev, args.get(1), env)?;
            let cell = resolve_place(ev, place, env)?;
            let current = cell.borrow().clone();
            let new_list = Value::cons(val, current);
            *cell.borrow_mut() = new_list.clone();
            Ok(new_list)
        }
        "pop" => {
            let place = args
                .first()
                .ok_or_else(|| EvalError::arity_error("pop", ARITY_ONE, args.len()))?;
            let cell = resolve_place(ev, place, env)?;
            let current = cell.borrow().clone();
            let first = current.car()?;
            let rest = current.cdr()?;
            *cell.borrow_mut() = rest;
            Ok(first)
        }
        other => Err(EvalError::internal_error(format!(
            "unknown place-update operator {}",
            other
        ))),
    }
}

/// Builds a new empty hash table value (used by the `make-hash` builtin
/// as well as tests).
pub fn new_hash_table(weak: bool) -> Value {
    Value::Hash(Rc::new(RefCell::new(HashTable {
        entries: std::collections::HashMap::new(),
        weak,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Evaluator;

    #[test]
    fn set_overwrites_binding_cell() {
        let ev = Evaluator::new();
        let env = Environment::new(Some(ev.global_env.clone()));
        env.vbind(intern("x"), Value::Integer(1));
        let form = Value::Symbol(intern("x"));
        modplace(&ev, "set", &[form, Value::Integer(99)], &env).unwrap();
        let cell = env.lookup_var(&intern("x")).unwrap();
        assert!(matches!(*cell.borrow(), Value::Integer(99)));
    }

    #[test]
    fn inc_adds_delta() {
        let ev = Evaluator::new();
        let env = Environment::new(Some(ev.global_env.clone()));
        env.vbind(intern("x"), Value::Integer(5));
        let result = modplace(&ev, "inc", &[Value::Symbol(intern("x"))], &env).unwrap();
        assert!(matches!(result, Value::Integer(6)));
    }

    #[test]
    fn dec_behaves_like_inc() {
        let ev = Evaluator::new();
        let env = Environment::new(Some(ev.global_env.clone()));
        env.vbind(intern("x"), Value::Integer(5));
        let result = modplace(
            &ev,
            "dec",
            &[Value::Symbol(intern("x")), Value::Integer(3)],
            &env,
        )
        .unwrap();
        assert!(matches!(result, Value::Integer(8)));
    }

    #[test]
    fn push_and_pop_roundtrip() {
        let ev = Evaluator::new();
        let env = Environment::new(Some(ev.global_env.clone()));
        env.vbind(intern("xs"), Value::Nil);
        modplace(
            &ev,
            "push",
            &[Value::Symbol(intern("xs")), Value::Integer(1)],
            &env,
        )
        .unwrap();
        let popped = modplace(&ev, "pop", &[Value::Symbol(intern("xs"))], &env).unwrap();
        assert!(matches!(popped, Value::Integer(1)));
    }

    #[test]
    fn gethash_place_inserts_default_then_updates() {
        let ev = Evaluator::new();
        let env = Environment::new(Some(ev.global_env.clone()));
        let table = new_hash_table(false);
        env.vbind(intern("h"), table);
        let place = Value::list(vec![
            Value::Symbol(ev.operators.gethash.clone()),
            Value::Symbol(intern("h")),
            Value::list(vec![Value::Symbol(intern("quote")), Value::Symbol(intern("k"))]),
            Value::Integer(0),
        ]);
        modplace(&ev, "inc", &[place], &env).unwrap();
        let place2 = Value::list(vec![
            Value::Symbol(ev.operators.gethash.clone()),
            Value::Symbol(intern("h")),
            Value::list(vec![Value::Symbol(intern("quote")), Value::Symbol(intern("k"))]),
            Value::Integer(0),
        ]);
        let result = modplace(&ev, "inc", &[place2], &env).unwrap();
        assert!(matches!(result, Value::Integer(2)));
    }
}
