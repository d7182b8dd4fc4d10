//! Arithmetic operations: +, -, *, trunc, mod, max, min
//!
//! - `+`: sum of all arguments (identity 0)
//! - `-`: subtract subsequent args from first, or negate if single arg
//! - `*`: product of all arguments (identity 1)
//! - `trunc`: truncating integer division
//! - `mod`: remainder, exactly 2 args
//! - `max`/`min`: variadic extrema

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

fn as_number(v: &Value) -> Result<f64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(EvalError::type_error("arithmetic", "number", other)),
    }
}

fn is_float(v: &Value) -> bool {
    matches!(v, Value::Float(_))
}

fn to_value(n: f64, float: bool) -> Value {
    if float {
        Value::Float(n)
    } else {
        Value::Integer(n as i64)
    }
}

pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0.0;
    let mut float = false;
    for arg in args {
        float |= is_float(arg);
        sum += as_number(arg)?;
    }
    Ok(to_value(sum, float))
}

pub fn builtin_sub(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    let mut float = is_float(&first);
    let mut result = as_number(&first)?;
    if rest.is_empty() {
        return Ok(to_value(-result, float));
    }
    for arg in rest {
        float |= is_float(arg);
        result -= as_number(arg)?;
    }
    Ok(to_value(result, float))
}

pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1.0;
    let mut float = false;
    for arg in args {
        float |= is_float(arg);
        product *= as_number(arg)?;
    }
    Ok(to_value(product, float))
}

/// Truncating division: `(trunc 17 5) => 3`.
pub fn builtin_trunc(a: Value, b: Value) -> Result<Value, EvalError> {
    let a = as_number(&a)?;
    let b = as_number(&b)?;
    if b == 0.0 {
        return Err(EvalError::syntax_error("division by zero"));
    }
    Ok(Value::Integer((a / b).trunc() as i64))
}

pub fn builtin_mod(a: Value, b: Value) -> Result<Value, EvalError> {
    let float = is_float(&a) || is_float(&b);
    let a = as_number(&a)?;
    let b = as_number(&b)?;
    if b == 0.0 {
        return Err(EvalError::syntax_error("division by zero"));
    }
    Ok(to_value(a % b, float))
}

pub fn builtin_max(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    let mut float = is_float(&first);
    let mut best = as_number(&first)?;
    for arg in rest {
        float |= is_float(arg);
        best = best.max(as_number(arg)?);
    }
    Ok(to_value(best, float))
}

pub fn builtin_min(first: Value, rest: &[Value]) -> Result<Value, EvalError> {
    let mut float = is_float(&first);
    let mut best = as_number(&first)?;
    for arg in rest {
        float |= is_float(arg);
        best = best.min(as_number(arg)?);
    }
    Ok(to_value(best, float))
}

/// `(int-str n)`: renders an integer as a string (`#(-?\d+)`).
pub fn builtin_int_str(n: Value) -> Result<Value, EvalError> {
    match n {
        Value::Integer(i) => Ok(Value::string(i.to_string())),
        other => Err(EvalError::type_error("int-str", "integer", &other)),
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
    env.fbind(intern("+"), native("+", 0, true, NativeFn::Variadic0(builtin_add)));
    env.fbind(intern("-"), native("-", 1, true, NativeFn::Variadic1(builtin_sub)));
    env.fbind(intern("*"), native("*", 0, true, NativeFn::Variadic0(builtin_mul)));
    env.fbind(intern("trunc"), native("trunc", 2, false, NativeFn::Fixed2(builtin_trunc)));
    env.fbind(intern("mod"), native("mod", 2, false, NativeFn::Fixed2(builtin_mod)));
    env.fbind(intern("int-str"), native("int-str", 1, false, NativeFn::Fixed1(builtin_int_str)));
    env.fbind(intern("max"), native("max", 1, true, NativeFn::Variadic1(builtin_max)));
    env.fbind(intern("min"), native("min", 1, true, NativeFn::Variadic1(builtin_min)));
}
