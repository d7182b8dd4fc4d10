//! Hash tables: make-hash, gethash, sethash, pushhash, remhash, hash-count

use crate::env::Environment;
use crate::error::EvalError;
use crate::place::new_hash_table;
use crate::symbol::intern;
use crate::value::{hash_key, FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

pub fn builtin_make_hash(args: &[Value]) -> Result<Value, EvalError> {
    let weak = args.first().map(|v| v.is_truthy()).unwrap_or(false);
    Ok(new_hash_table(weak))
}

/// `(gethash hash key [default])`: returns the stored value, or
/// `default` (or `nil`) without inserting anything — unlike the place
/// form of the same name, this is a pure lookup.
pub fn builtin_gethash(hash: Value, key: Value, rest: &[Value]) -> Result<Value, EvalError> {
    let table = match &hash {
        Value::Hash(h) => h,
        other => return Err(EvalError::type_error("gethash", "hash", other)),
    };
    let k = hash_key(&key);
    let default = rest.first().cloned().unwrap_or(Value::Nil);
    Ok(table
        .borrow()
        .entries
        .get(&k)
        .map(|(_, cell)| cell.borrow().clone())
        .unwrap_or(default))
}

pub fn builtin_sethash(hash: Value, key: Value, value: Value) -> Result<Value, EvalError> {
    let table = match &hash {
        Value::Hash(h) => h,
        other => return Err(EvalError::type_error("sethash", "hash", other)),
    };
    let k = hash_key(&key);
    let mut borrowed = table.borrow_mut();
    match borrowed.entries.get(&k) {
        Some((_, cell)) => *cell.borrow_mut() = value.clone(),
        None => {
            borrowed
                .entries
                .insert(k, (key, std::rc::Rc::new(std::cell::RefCell::new(value.clone()))));
        }
    }
    Ok(value)
}

/// `(pushhash hash key value)`: conses `value` onto the list currently
/// stored at `key` (absent is treated as `nil`), storing the result.
pub fn builtin_pushhash(hash: Value, key: Value, value: Value) -> Result<Value, EvalError> {
    let current = builtin_gethash(hash.clone(), key.clone(), &[])?;
    let updated = Value::cons(value, current);
    builtin_sethash(hash, key, updated)
}

pub fn builtin_remhash(hash: Value, key: Value) -> Result<Value, EvalError> {
    let table = match &hash {
        Value::Hash(h) => h,
        other => return Err(EvalError::type_error("remhash", "hash", other)),
    };
    let k = hash_key(&key);
    let removed = table.borrow_mut().entries.remove(&k);
    Ok(match removed {
        Some((_, cell)) => cell.borrow().clone(),
        None => Value::Nil,
    })
}

pub fn builtin_hash_count(hash: Value) -> Result<Value, EvalError> {
    match &hash {
        Value::Hash(h) => Ok(Value::Integer(h.borrow().entries.len() as i64)),
        other => Err(EvalError::type_error("hash-count", "hash", other)),
    }
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
    env.fbind(
        intern("make-hash"),
        native("make-hash", 0, true, NativeFn::Variadic0(builtin_make_hash)),
    );
    env.fbind(
        intern("gethash"),
        native("gethash", 2, true, NativeFn::Variadic2(builtin_gethash)),
    );
    env.fbind(
        intern("sethash"),
        native("sethash", 3, false, NativeFn::Fixed3(builtin_sethash)),
    );
    env.fbind(
        intern("pushhash"),
        native("pushhash", 3, false, NativeFn::Fixed3(builtin_pushhash)),
    );
    env.fbind(
        intern("remhash"),
        native("remhash", 2, false, NativeFn::Fixed2(builtin_remhash)),
    );
    env.fbind(
        intern("hash-count"),
        native("hash-count", 1, false, NativeFn::Fixed1(builtin_hash_count)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sethash_then_gethash_roundtrip() {
        let h = new_hash_table(false);
        builtin_sethash(h.clone(), Value::Integer(1), Value::string("one")).unwrap();
        let result = builtin_gethash(h, Value::Integer(1), &[]).unwrap();
        assert!(matches!(result, Value::String(_)));
    }

    #[test]
    fn gethash_missing_key_returns_default() {
        let h = new_hash_table(false);
        let result = builtin_gethash(h, Value::Integer(1), &[Value::Integer(42)]).unwrap();
        assert!(matches!(result, Value::Integer(42)));
    }

    #[test]
    fn remhash_removes_and_returns_old_value() {
        let h = new_hash_table(false);
        builtin_sethash(h.clone(), Value::Integer(1), Value::Integer(9)).unwrap();
        let removed = builtin_remhash(h.clone(), Value::Integer(1)).unwrap();
        assert!(matches!(removed, Value::Integer(9)));
        assert!(matches!(builtin_hash_count(h).unwrap(), Value::Integer(0)));
    }

    #[test]
    fn pushhash_conses_onto_existing_list() {
        let h = new_hash_table(false);
        builtin_pushhash(h.clone(), Value::Integer(1), Value::Integer(1)).unwrap();
        builtin_pushhash(h.clone(), Value::Integer(1), Value::Integer(2)).unwrap();
        let result = builtin_gethash(h, Value::Integer(1), &[]).unwrap();
        assert_eq!(result.to_vec().unwrap().len(), 2);
    }
}
