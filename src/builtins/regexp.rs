//! Regular expressions: search-regex, match-regex
//!
//! A `Value::Regex` compiles to a `regex::Regex`; these two builtins are
//! the only operations the core exposes over it, per SPEC_FULL.md's
//! regexp category — pattern literals themselves are a parser concern.

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

fn as_str(v: &Value) -> Result<String, EvalError> {
    match v {
        Value::String(s) => Ok(s.borrow().clone()),
        other => Err(EvalError::type_error("regex", "string", other)),
    }
}

fn as_regex(v: &Value) -> Result<Rc<regex::Regex>, EvalError> {
    match v {
        Value::Regex(r) => Ok(r.clone()),
        other => Err(EvalError::type_error("regex", "regex", other)),
    }
}

/// `(search-regex re str)`: the index of the first match, or `nil`.
pub fn builtin_search_regex(re: Value, s: Value) -> Result<Value, EvalError> {
    let regex = as_regex(&re)?;
    let haystack = as_str(&s)?;
    Ok(match regex.find(&haystack) {
        Some(m) => Value::Integer(m.start() as i64),
        None => Value::Nil,
    })
}

/// `(match-regex re str)`: the matched substring at the start of `str`,
/// or `nil` if `re` does not match there.
pub fn builtin_match_regex(re: Value, s: Value) -> Result<Value, EvalError> {
    let regex = as_regex(&re)?;
    let haystack = as_str(&s)?;
    Ok(match regex.find(&haystack) {
        Some(m) if m.start() == 0 => Value::string(m.as_str()),
        _ => Value::Nil,
    })
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
        intern("search-regex"),
        native("search-regex", 2, false, NativeFn::Fixed2(builtin_search_regex)),
    );
    env.fbind(
        intern("match-regex"),
        native("match-regex", 2, false, NativeFn::Fixed2(builtin_match_regex)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_regex_finds_match_offset() {
        let re = Value::Regex(Rc::new(regex::Regex::new("b+").unwrap()));
        let result = builtin_search_regex(re, Value::string("aabbb")).unwrap();
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn match_regex_requires_match_at_start() {
        let re = Value::Regex(Rc::new(regex::Regex::new("b+").unwrap()));
        let result = builtin_match_regex(re, Value::string("aabbb")).unwrap();
        assert!(result.is_nil());
    }
}
