//! Minimal I/O surface: print, format — both write to an injected
//! `Value::Stream` rather than a real terminal/file (spec.md §1 names
//! actual I/O as an external collaborator out of scope for the core).

use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

fn display_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.borrow().clone(),
        other => other.to_string(),
    }
}

/// `(print stream value)`: appends `value`'s display form to `stream`'s
/// buffer, returning `value`.
pub fn builtin_print(stream: Value, value: Value) -> Result<Value, EvalError> {
    match &stream {
        Value::Stream(s) => {
            s.borrow_mut().buffer.push_str(&display_string(&value));
            Ok(value)
        }
        other => Err(EvalError::type_error("print", "stream", other)),
    }
}

/// `(format stream str args...)`: a minimal `~a`-style formatter — each
/// `~a` in `str` is replaced in order by the display form of the next
/// argument, written to `stream`'s buffer.
pub fn builtin_format(stream: Value, template: Value, args: &[Value]) -> Result<Value, EvalError> {
    let fmt = match &template {
        Value::String(s) => s.borrow().clone(),
        other => return Err(EvalError::type_error("format", "string", other)),
    };
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    let mut arg_iter = args.iter();
    while let Some(c) = chars.next() {
        if c == '~' && chars.peek() == Some(&'a') {
            chars.next();
            if let Some(arg) = arg_iter.next() {
                out.push_str(&display_string(arg));
            }
        } else {
            out.push(c);
        }
    }
    match &stream {
        Value::Stream(s) => {
            s.borrow_mut().buffer.push_str(&out);
            Ok(Value::string(out))
        }
        other => Err(EvalError::type_error("format", "stream", other)),
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
    env.fbind(intern("print"), native("print", 2, false, NativeFn::Fixed2(builtin_print)));
    env.fbind(
        intern("format"),
        native("format", 2, true, NativeFn::Variadic2(builtin_format)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::StreamValue;
    use std::cell::RefCell;

    fn new_stream() -> Value {
        Value::Stream(Rc::new(RefCell::new(StreamValue::default())))
    }

    #[test]
    fn print_appends_display_form_to_stream() {
        let stream = new_stream();
        builtin_print(stream.clone(), Value::Integer(42)).unwrap();
        if let Value::Stream(s) = &stream {
            assert_eq!(s.borrow().buffer, "42");
        }
    }

    #[test]
    fn format_substitutes_tilde_a_placeholders() {
        let stream = new_stream();
        builtin_format(
            stream.clone(),
            Value::string("~a plus ~a"),
            &[Value::Integer(1), Value::Integer(2)],
        )
        .unwrap();
        if let Value::Stream(s) = &stream {
            assert_eq!(s.borrow().buffer, "1 plus 2");
        }
    }
}
