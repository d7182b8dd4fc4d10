//! Type predicates and list-membership search: atom, null, consp,
//! listp, proper-listp, numberp, eq, eql, equal, memq, memqual,
//! tree-find, some, all, none

use crate::env::Environment;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

fn truth(b: bool) -> Value {
    if b {
        Value::True
    } else {
        Value::Nil
    }
}

pub fn builtin_atom(v: Value) -> Result<Value, EvalError> {
    Ok(truth(v.is_atom()))
}

pub fn builtin_null(v: Value) -> Result<Value, EvalError> {
    Ok(truth(v.is_nil()))
}

pub fn builtin_consp(v: Value) -> Result<Value, EvalError> {
    Ok(truth(v.is_cons()))
}

pub fn builtin_listp(v: Value) -> Result<Value, EvalError> {
    Ok(truth(v.is_listp()))
}

pub fn builtin_proper_listp(v: Value) -> Result<Value, EvalError> {
    Ok(truth(v.is_proper_list()))
}

pub fn builtin_numberp(v: Value) -> Result<Value, EvalError> {
    Ok(truth(matches!(v, Value::Integer(_) | Value::Float(_))))
}

pub fn builtin_eq(a: Value, b: Value) -> Result<Value, EvalError> {
    Ok(truth(a.is_eq(&b)))
}

/// `eql` coincides with `eq` here: there is no separate "same-number"
/// identity class in this value model beyond what `eq` already covers
/// for immediate scalars.
pub fn builtin_eql(a: Value, b: Value) -> Result<Value, EvalError> {
    Ok(truth(a.is_eq(&b)))
}

pub fn builtin_equal(a: Value, b: Value) -> Result<Value, EvalError> {
    Ok(truth(a.is_equal(&b)))
}

/// `(memq item list)`: first sublist whose car is `eq` to `item`, or nil.
pub fn builtin_memq(item: Value, list: Value) -> Result<Value, EvalError> {
    let mut cur = list;
    loop {
        match cur.clone() {
            Value::Cons(_) => {
                if cur.car()?.is_eq(&item) {
                    return Ok(cur);
                }
                cur = cur.cdr()?;
            }
            _ => return Ok(Value::Nil),
        }
    }
}

/// `(memqual item list)`: same as `memq` but with structural equality.
pub fn builtin_memqual(item: Value, list: Value) -> Result<Value, EvalError> {
    let mut cur = list;
    loop {
        match cur.clone() {
            Value::Cons(_) => {
                if cur.car()?.is_equal(&item) {
                    return Ok(cur);
                }
                cur = cur.cdr()?;
            }
            _ => return Ok(Value::Nil),
        }
    }
}

/// `(tree-find item tree)`: whether `item` occurs (by `equal`) anywhere
/// in `tree`, descending into every cons.
pub fn builtin_tree_find(item: Value, tree: Value) -> Result<Value, EvalError> {
    fn walk(item: &Value, node: &Value) -> Result<bool, EvalError> {
        if item.is_equal(node) {
            return Ok(true);
        }
        if node.is_cons() {
            if walk(item, &node.car()?)? {
                return Ok(true);
            }
            return walk(item, &node.cdr()?);
        }
        Ok(false)
    }
    Ok(truth(walk(&item, &tree)?))
}

/// `(some list pred)`: true if `pred` holds for at least one element.
pub fn builtin_some(list: Value, pred: Value, ev: &Evaluator) -> Result<Value, EvalError> {
    for item in list.to_vec()? {
        if crate::apply::apply(ev, &pred, &[item])?.is_truthy() {
            return Ok(Value::True);
        }
    }
    Ok(Value::Nil)
}

/// `(all list pred)`: true iff `pred` holds for every element.
pub fn builtin_all(list: Value, pred: Value, ev: &Evaluator) -> Result<Value, EvalError> {
    for item in list.to_vec()? {
        if !crate::apply::apply(ev, &pred, &[item])?.is_truthy() {
            return Ok(Value::Nil);
        }
    }
    Ok(Value::True)
}

/// `(none list pred)`: true iff `pred` holds for no element.
pub fn builtin_none(list: Value, pred: Value, ev: &Evaluator) -> Result<Value, EvalError> {
    for item in list.to_vec()? {
        if crate::apply::apply(ev, &pred, &[item])?.is_truthy() {
            return Ok(Value::Nil);
        }
    }
    Ok(Value::True)
}

fn native(name: &'static str, minparam: usize, variadic: bool, call: NativeFn) -> Value {
    Value::Function(Rc::new(FunctionValue::Native(NativeFunction {
        name,
        minparam,
        variadic,
        call,
    })))
}

pub fn register(env: &Rc<Environment>) {
    env.fbind(intern("atom"), native("atom", 1, false, NativeFn::Fixed1(builtin_atom)));
    env.fbind(intern("null"), native("null", 1, false, NativeFn::Fixed1(builtin_null)));
    env.fbind(intern("consp"), native("consp", 1, false, NativeFn::Fixed1(builtin_consp)));
    env.fbind(intern("listp"), native("listp", 1, false, NativeFn::Fixed1(builtin_listp)));
    env.fbind(
        intern("proper-listp"),
        native("proper-listp", 1, false, NativeFn::Fixed1(builtin_proper_listp)),
    );
    env.fbind(intern("numberp"), native("numberp", 1, false, NativeFn::Fixed1(builtin_numberp)));
    env.fbind(intern("eq"), native("eq", 2, false, NativeFn::Fixed2(builtin_eq)));
    env.fbind(intern("eql"), native("eql", 2, false, NativeFn::Fixed2(builtin_eql)));
    env.fbind(intern("equal"), native("equal", 2, false, NativeFn::Fixed2(builtin_equal)));
    env.fbind(intern("memq"), native("memq", 2, false, NativeFn::Fixed2(builtin_memq)));
    env.fbind(intern("memqual"), native("memqual", 2, false, NativeFn::Fixed2(builtin_memqual)));
    env.fbind(
        intern("tree-find"),
        native("tree-find", 2, false, NativeFn::Fixed2(builtin_tree_find)),
    );
    env.fbind(intern("some"), native("some", 2, false, NativeFn::Fixed2Eval(builtin_some)));
    env.fbind(intern("all"), native("all", 2, false, NativeFn::Fixed2Eval(builtin_all)));
    env.fbind(intern("none"), native("none", 2, false, NativeFn::Fixed2Eval(builtin_none)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_is_false_for_cons() {
        let cons = Value::cons(Value::Integer(1), Value::Nil);
        assert!(!builtin_atom(cons).unwrap().is_truthy());
    }

    #[test]
    fn eq_is_identity_equal_is_structural() {
        let a = Value::list(vec![Value::Integer(1)]);
        let b = Value::list(vec![Value::Integer(1)]);
        assert!(!builtin_eq(a.clone(), b.clone()).unwrap().is_truthy());
        assert!(builtin_equal(a, b).unwrap().is_truthy());
    }

    #[test]
    fn memq_finds_matching_tail() {
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let found = builtin_memq(Value::Integer(2), list).unwrap();
        assert_eq!(found.to_vec().unwrap().len(), 2);
    }

    #[test]
    fn tree_find_descends_nested_structure() {
        let tree = Value::list(vec![Value::Integer(1), Value::list(vec![Value::Integer(2)])]);
        assert!(builtin_tree_find(Value::Integer(2), tree).unwrap().is_truthy());
    }
}
