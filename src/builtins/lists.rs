//! List construction and traversal: cons, car, cdr, first..sixth, rest,
//! list, append, copy-list, reverse, nreverse, ldiff, flatten, length

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

pub fn builtin_cons(car: Value, cdr: Value) -> Result<Value, EvalError> {
    Ok(Value::cons(car, cdr))
}

pub fn builtin_car(list: Value) -> Result<Value, EvalError> {
    list.car()
}

pub fn builtin_cdr(list: Value) -> Result<Value, EvalError> {
    list.cdr()
}

pub fn builtin_rest(list: Value) -> Result<Value, EvalError> {
    list.cdr()
}

fn nth(list: &Value, n: usize) -> Result<Value, EvalError> {
    let mut cur = list.clone();
    for _ in 0..n {
        cur = cur.cdr()?;
    }
    cur.car()
}

pub fn builtin_first(list: Value) -> Result<Value, EvalError> {
    nth(&list, 0)
}
pub fn builtin_second(list: Value) -> Result<Value, EvalError> {
    nth(&list, 1)
}
pub fn builtin_third(list: Value) -> Result<Value, EvalError> {
    nth(&list, 2)
}
pub fn builtin_fourth(list: Value) -> Result<Value, EvalError> {
    nth(&list, 3)
}
pub fn builtin_fifth(list: Value) -> Result<Value, EvalError> {
    nth(&list, 4)
}
pub fn builtin_sixth(list: Value) -> Result<Value, EvalError> {
    nth(&list, 5)
}

pub fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

/// Appends all but the last argument (copying their spine) onto the
/// last argument, which is shared rather than copied — matching the
/// conventional `append` contract.
pub fn builtin_append(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Ok(Value::Nil);
    }
    let (last, init) = args.split_last().unwrap();
    let mut result = last.clone();
    for list in init.iter().rev() {
        let items = list.to_vec()?;
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
    }
    Ok(result)
}

pub fn builtin_copy_list(list: Value) -> Result<Value, EvalError> {
    Ok(Value::list(list.to_vec()?))
}

pub fn builtin_reverse(list: Value) -> Result<Value, EvalError> {
    let mut items = list.to_vec()?;
    items.reverse();
    Ok(Value::list(items))
}

/// Destructive reverse: rewrites each cell's `cdr` in place to point
/// backwards instead of allocating a fresh spine.
pub fn builtin_nreverse(list: Value) -> Result<Value, EvalError> {
    let mut prev = Value::Nil;
    let mut cur = list;
    loop {
        match cur.clone() {
            Value::Nil => return Ok(prev),
            Value::Cons(_) => {
                let next = cur.cdr()?;
                cur.set_cdr(prev)?;
                prev = cur;
                cur = next;
            }
            _ => return Err(EvalError::type_error("nreverse", "list", &cur)),
        }
    }
}

/// `(ldiff list sublist)`: the leading elements of `list` up to (not
/// including) the first cell shared with `sublist`.
pub fn builtin_ldiff(list: Value, sublist: Value) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    let mut cur = list;
    loop {
        if cur.is_eq(&sublist) {
            break;
        }
        match cur.clone() {
            Value::Cons(_) => {
                out.push(cur.car()?);
                cur = cur.cdr()?;
            }
            _ => break,
        }
    }
    Ok(Value::list(out))
}

pub fn builtin_flatten(list: Value) -> Result<Value, EvalError> {
    fn go(v: &Value, out: &mut Vec<Value>) -> Result<(), EvalError> {
        match v {
            Value::Nil => Ok(()),
            Value::Cons(_) => {
                let items = v.to_vec()?;
                for item in &items {
                    go(item, out)?;
                }
                Ok(())
            }
            other => {
                out.push(other.clone());
                Ok(())
            }
        }
    }
    let mut out = Vec::new();
    go(&list, &mut out)?;
    Ok(Value::list(out))
}

pub fn builtin_length(list: Value) -> Result<Value, EvalError> {
    Ok(Value::Integer(list.to_vec()?.len() as i64))
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
    env.fbind(intern("cons"), native("cons", 2, false, NativeFn::Fixed2(builtin_cons)));
    env.fbind(intern("car"), native("car", 1, false, NativeFn::Fixed1(builtin_car)));
    env.fbind(intern("cdr"), native("cdr", 1, false, NativeFn::Fixed1(builtin_cdr)));
    env.fbind(intern("rest"), native("rest", 1, false, NativeFn::Fixed1(builtin_rest)));
    env.fbind(intern("first"), native("first", 1, false, NativeFn::Fixed1(builtin_first)));
    env.fbind(intern("second"), native("second", 1, false, NativeFn::Fixed1(builtin_second)));
    env.fbind(intern("third"), native("third", 1, false, NativeFn::Fixed1(builtin_third)));
    env.fbind(intern("fourth"), native("fourth", 1, false, NativeFn::Fixed1(builtin_fourth)));
    env.fbind(intern("fifth"), native("fifth", 1, false, NativeFn::Fixed1(builtin_fifth)));
    env.fbind(intern("sixth"), native("sixth", 1, false, NativeFn::Fixed1(builtin_sixth)));
    env.fbind(intern("list"), native("list", 0, true, NativeFn::Variadic0(builtin_list)));
    env.fbind(intern("append"), native("append", 0, true, NativeFn::Variadic0(builtin_append)));
    env.fbind(intern("copy-list"), native("copy-list", 1, false, NativeFn::Fixed1(builtin_copy_list)));
    env.fbind(intern("reverse"), native("reverse", 1, false, NativeFn::Fixed1(builtin_reverse)));
    env.fbind(intern("nreverse"), native("nreverse", 1, false, NativeFn::Fixed1(builtin_nreverse)));
    env.fbind(intern("ldiff"), native("ldiff", 2, false, NativeFn::Fixed2(builtin_ldiff)));
    env.fbind(intern("flatten"), native("flatten", 1, false, NativeFn::Fixed1(builtin_flatten)));
    env.fbind(intern("length"), native("length", 1, false, NativeFn::Fixed1(builtin_length)));
}
