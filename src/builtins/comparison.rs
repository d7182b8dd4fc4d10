//! Comparison operations: =, <, >, <=, >=
//!
//! Each is variadic: every adjacent pair in the argument list must
//! satisfy the relation for the whole call to be true.

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

fn as_number(v: &Value) -> Result<f64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(EvalError::type_error("comparison", "number", other)),
    }
}

fn chain(first: Value, rest: &[Value], op: impl Fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    let mut prev = as_number(&first)?;
    for arg in rest {
        let cur = as_number(arg)?;
        if !op(prev, cur) {
            return Ok(Value::Nil);
        }
        prev = cur;
    }
    Ok(Value::True)
}

pub fn builtin_eq(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    chain(first, rest, |a, b| a == b)
}

pub fn builtin_lt(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    chain(first, rest, |a, b| a < b)
}

pub fn builtin_gt(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    chain(first, rest, |a, b| a > b)
}

pub fn builtin_le(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    chain(first, rest, |a, b| a <= b)
}

pub fn builtin_ge(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    chain(first, rest, |a, b| a >= b)
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
    env.fbind(intern("="), native("=", 1, true, NativeFn::Variadic1(builtin_eq)));
    env.fbind(intern("<"), native("<", 1, true, NativeFn::Variadic1(builtin_lt)));
    env.fbind(intern(">"), native(">", 1, true, NativeFn::Variadic1(builtin_gt)));
    env.fbind(intern("<="), native("<=", 1, true, NativeFn::Variadic1(builtin_le)));
    env.fbind(intern(">="), native(">=", 1, true, NativeFn::Variadic1(builtin_ge)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lt_chains_across_three_values() {
        let result = builtin_lt(Value::Integer(1), &[Value::Integer(2), Value::Integer(3)]).unwrap();
        assert!(result.is_truthy());
    }

    #[test]
    fn lt_fails_when_chain_breaks() {
        let result = builtin_lt(Value::Integer(1), &[Value::Integer(3), Value::Integer(2)]).unwrap();
        assert!(!result.is_truthy());
    }

    #[test]
    fn eq_chains_numeric_equality() {
        let result = builtin_eq(Value::Integer(1), &[Value::Integer(1), Value::Float(1.0)]).unwrap();
        assert!(result.is_truthy());
    }

    #[test]
    fn eq_rejects_non_numeric_operands() {
        assert!(builtin_eq(Value::Symbol(intern("a")), &[Value::Symbol(intern("a"))]).is_err());
    }
}
