// ABOUTME: eval/eval_progn and the special-form handlers dispatched through the operator table

use crate::apply::apply;
use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_ONE};
use crate::evaluator::Evaluator;
use crate::place::modplace;
use crate::symbol::intern;
use crate::value::{FunctionValue, Value};
use std::rc::Rc;

/// Evaluates a kernel-form value against `env`. Atoms other than bindable
/// symbols self-evaluate; a bindable symbol looks itself up; a cons
/// dispatches on its operator, trying an ordinary function binding
/// first and falling back to the special-form table (so a user function
/// can shadow a special form of the same name).
pub fn eval(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match form {
        Value::Nil => Ok(Value::Nil),
        Value::Symbol(sym) => env
            .lookup_var(sym)
            .map(|cell| cell.borrow().clone())
            .ok_or_else(|| EvalError::unbound_variable(sym.name())),
        Value::Cons(_) => {
            let oper = form.car()?;
            if let Value::Regex(_) = oper {
                return Ok(oper);
            }
            match &oper {
                Value::Symbol(sym) => {
                    if let Some(cell) = env.lookup_fun(sym) {
                        log::trace!("{}: ordinary function call", sym.name());
                        let arg_forms = form.cdr()?.to_vec()?;
                        let mut args = Vec::with_capacity(arg_forms.len());
                        for a in &arg_forms {
                            args.push(eval(ev, a, env)?);
                        }
                        let func_val = cell.borrow().clone();
                        apply(ev, &func_val, &args)
                    } else if let Some(handler) = ev.lookup_operator(sym) {
                        log::trace!("{}: special form", sym.name());
                        handler(ev, form, env)
                    } else {
                        Err(EvalError::unbound_function(sym.name()))
                    }
                }
                _ => Err(EvalError::syntax_error(
                    "operator position must be a symbol",
                )),
            }
        }
        other => Ok(other.clone()),
    }
}

/// Evaluates each form in sequence, returning the last result or `nil`
/// for an empty body.
pub fn eval_progn(ev: &Evaluator, forms: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Nil;
    for form in forms {
        result = eval(ev, form, env)?;
    }
    Ok(result)
}

pub fn op_quote(_ev: &Evaluator, form: &Value, _env: &Rc<Environment>) -> Result<Value, EvalError> {
    form.cdr()?.car()
}

/// `(let ((var init)...) body...)`. Initializers are evaluated against
/// the *outer* environment, in parallel, then bound into a fresh child
/// frame the body runs in. A binding item that is a bare symbol (not a
/// `(var init)` pair) binds under the symbol `nil` with value `nil`
/// rather than under its own name — this reproduces an uninitialized-
/// variable bug in the evaluator this was modeled on, preserved here as
/// observed behavior rather than "fixed".
pub fn op_let(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?;
    let bindings = args.car()?.to_vec()?;
    let body = args.cdr()?.to_vec()?;
    let child = Environment::new(Some(env.clone()));

    for item in &bindings {
        match item {
            Value::Cons(_) => {
                let var = item.car()?;
                let rest = item.cdr()?;
                if !matches!(rest, Value::Cons(_)) {
                    return Err(EvalError::syntax_error(format!(
                        "let: invalid syntax: {}",
                        item
                    )));
                }
                let init = rest.car()?;
                let sym = match var {
                    Value::Symbol(s) => s,
                    other => return Err(EvalError::not_bindable(&other)),
                };
                let value = eval(ev, &init, env)?;
                child.vbind(sym, value);
            }
            _ => {
                child.vbind(intern("nil"), Value::Nil);
            }
        }
    }

    eval_progn(ev, &body, &child)
}

pub fn op_lambda(_ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?;
    let params = args.car()?;
    let body = args.cdr()?.to_vec()?;
    Ok(Value::Function(Rc::new(FunctionValue::Interpreted {
        captured_env: Some(env.clone()),
        params,
        body,
    })))
}

pub fn op_call(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    if args.is_empty() {
        return Err(EvalError::arity_error("call", ARITY_AT_LEAST_ONE, 0));
    }
    let func_val = eval(ev, &args[0], env)?;
    let mut evaluated = Vec::with_capacity(args.len() - 1);
    for a in &args[1..] {
        evaluated.push(eval(ev, a, env)?);
    }
    apply(ev, &func_val, &evaluated)
}

/// `(fun name)` looks up `name` as a function binding and returns the
/// function value itself, without calling it.
pub fn op_fun(_ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let name_form = form.cdr()?.car()?;
    let sym = match name_form {
        Value::Symbol(s) => s,
        other => return Err(EvalError::not_bindable(&other)),
    };
    env.lookup_fun(&sym)
        .map(|cell| cell.borrow().clone())
        .ok_or_else(|| EvalError::unbound_function(sym.name()))
}

/// `(cond (test body...) ...)`. The first clause whose test is truthy
/// runs its body; a clause with no body yields the test value itself.
/// No clause matching yields `nil`.
pub fn op_cond(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let clauses = form.cdr()?.to_vec()?;
    for clause in &clauses {
        let test = clause.car()?;
        let body = clause.cdr()?.to_vec()?;
        let test_val = eval(ev, &test, env)?;
        if test_val.is_truthy() {
            if body.is_empty() {
                return Ok(test_val);
            }
            return eval_progn(ev, &body, env);
        }
    }
    Ok(Value::Nil)
}

const ARITY_TWO_OR_THREE: &str = "2-3";

pub fn op_if(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let test = args
        .first()
        .ok_or_else(|| EvalError::arity_error("if", ARITY_TWO_OR_THREE, 0))?;
    if eval(ev, test, env)?.is_truthy() {
        match args.get(1) {
            Some(then_form) => eval(ev, then_form, env),
            None => Ok(Value::Nil),
        }
    } else {
        match args.get(2) {
            Some(else_form) => eval(ev, else_form, env),
            None => Ok(Value::Nil),
        }
    }
}

/// `(and a b c...)` short-circuits to `nil` on the first falsy form,
/// otherwise returns the last value (or `t` if there are no forms).
pub fn op_and(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let mut result = Value::True;
    for a in &args {
        result = eval(ev, a, env)?;
        if !result.is_truthy() {
            return Ok(Value::Nil);
        }
    }
    Ok(result)
}

/// `(or a b c...)` short-circuits to the first truthy value, otherwise
/// `nil`.
pub fn op_or(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    for a in &args {
        let v = eval(ev, a, env)?;
        if v.is_truthy() {
            return Ok(v);
        }
    }
    Ok(Value::Nil)
}

/// `(defvar name init)` always defines in the global namespace,
/// overwriting an existing binding cell in place if one exists so that
/// aliases of it observe the new value.
pub fn op_defvar(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let sym = match args.first() {
        Some(Value::Symbol(s)) => s.clone(),
        _ => return Err(EvalError::syntax_error("defvar requires a symbol name")),
    };
    let value = match args.get(1) {
        Some(init) => eval(ev, init, env)?,
        None => Value::Nil,
    };
    if let Some(cell) = ev.global_env.lookup_var(&sym) {
        *cell.borrow_mut() = value.clone();
    } else {
        ev.global_env.vbind(sym, value.clone());
    }
    Ok(value)
}

/// `(defun name params body...)` captures the defining environment
/// (closures created inside the function body see it) and stores the
/// function in the global function namespace, overwriting in place.
pub fn op_defun(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let sym = match args.first() {
        Some(Value::Symbol(s)) => s.clone(),
        _ => return Err(EvalError::syntax_error("defun requires a symbol name")),
    };
    let params = args.get(1).cloned().unwrap_or(Value::Nil);
    let body = args.get(2..).map(|s| s.to_vec()).unwrap_or_default();
    let func_val = Value::Function(Rc::new(FunctionValue::Interpreted {
        captured_env: Some(env.clone()),
        params,
        body,
    }));
    if let Some(cell) = ev.global_env.lookup_fun(&sym) {
        *cell.borrow_mut() = func_val;
    } else {
        ev.global_env.fbind(sym.clone(), func_val);
    }
    Ok(Value::Symbol(sym))
}

/// Shared handler for `set`/`inc`/`dec`/`push`/`pop`, dispatching on the
/// operator symbol's name (spec.md §4.3's `op_modplace`).
pub fn op_modplace(ev: &Evaluator, form: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let op_name = match form.car()? {
        Value::Symbol(s) => s.name().to_string(),
        _ => {
            return Err(EvalError::internal_error(
                "modplace dispatched on non-symbol operator",
            ))
        }
    };
    let args = form.cdr()?.to_vec()?;
    modplace(ev, &op_name, &args, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Evaluator;

    fn ev_env() -> (Evaluator, Rc<Environment>) {
        let ev = Evaluator::new();
        let env = ev.global_env.clone();
        (ev, env)
    }

    #[test]
    fn integer_self_evaluates() {
        let (ev, env) = ev_env();
        let result = eval(&ev, &Value::Integer(42), &env).unwrap();
        assert!(matches!(result, Value::Integer(42)));
    }

    #[test]
    fn unbound_symbol_errors() {
        let (ev, env) = ev_env();
        let form = Value::Symbol(intern("undefined-var"));
        assert!(matches!(
            eval(&ev, &form, &env),
            Err(EvalError::UnboundVariable(_))
        ));
    }

    #[test]
    fn quote_returns_argument_unevaluated() {
        let (ev, env) = ev_env();
        let inner = Value::Symbol(intern("x"));
        let form = Value::list(vec![Value::Symbol(intern("quote")), inner]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(matches!(result, Value::Symbol(_)));
    }

    #[test]
    fn if_picks_branch_by_truthiness() {
        let (ev, env) = ev_env();
        let form = Value::list(vec![
            Value::Symbol(intern("if")),
            Value::Nil,
            Value::Integer(1),
            Value::Integer(2),
        ]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn and_short_circuits_on_nil() {
        let (ev, env) = ev_env();
        let form = Value::list(vec![
            Value::Symbol(intern("and")),
            Value::Integer(1),
            Value::Nil,
            Value::Integer(3),
        ]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(result.is_nil());
    }

    #[test]
    fn or_returns_first_truthy() {
        let (ev, env) = ev_env();
        let form = Value::list(vec![
            Value::Symbol(intern("or")),
            Value::Nil,
            Value::Integer(7),
            Value::Integer(8),
        ]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(matches!(result, Value::Integer(7)));
    }

    #[test]
    fn let_binds_and_evaluates_body() {
        let (ev, env) = ev_env();
        let bindings = Value::list(vec![Value::list(vec![
            Value::Symbol(intern("x")),
            Value::Integer(10),
        ])]);
        let form = Value::list(vec![
            Value::Symbol(intern("let")),
            bindings,
            Value::Symbol(intern("x")),
        ]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(matches!(result, Value::Integer(10)));
    }

    #[test]
    fn let_binding_item_missing_init_is_a_syntax_error() {
        let (ev, env) = ev_env();
        let bindings = Value::list(vec![Value::list(vec![Value::Symbol(intern("x"))])]);
        let form = Value::list(vec![
            Value::Symbol(intern("let")),
            bindings,
            Value::Symbol(intern("x")),
        ]);
        assert!(matches!(eval(&ev, &form, &env), Err(EvalError::SyntaxError(_))));
    }

    #[test]
    fn let_bare_symbol_binds_under_nil_symbol() {
        let (ev, env) = ev_env();
        let bindings = Value::list(vec![Value::Symbol(intern("stray"))]);
        let form = Value::list(vec![
            Value::Symbol(intern("let")),
            bindings,
            Value::Symbol(intern("nil")),
        ]);
        let result = eval(&ev, &form, &env).unwrap();
        assert!(result.is_nil());
    }

    #[test]
    fn defun_then_call_by_name() {
        let (ev, env) = ev_env();
        let defun_form = Value::list(vec![
            Value::Symbol(intern("defun")),
            Value::Symbol(intern("double")),
            Value::list(vec![Value::Symbol(intern("x"))]),
            Value::list(vec![
                Value::Symbol(intern("+")),
                Value::Symbol(intern("x")),
                Value::Symbol(intern("x")),
            ]),
        ]);
        eval(&ev, &defun_form, &env).unwrap();

        let call_form = Value::list(vec![Value::Symbol(intern("double")), Value::Integer(21)]);
        let result = eval(&ev, &call_form, &env).unwrap();
        assert!(matches!(result, Value::Integer(42)));
    }

    #[test]
    fn lambda_closure_sees_captured_environment() {
        let (ev, env) = ev_env();
        let let_form = Value::list(vec![
            Value::Symbol(intern("let")),
            Value::list(vec![Value::list(vec![
                Value::Symbol(intern("n")),
                Value::Integer(5),
            ])]),
            Value::list(vec![
                Value::Symbol(intern("lambda")),
                Value::Nil,
                Value::Symbol(intern("n")),
            ]),
        ]);
        let closure = eval(&ev, &let_form, &env).unwrap();
        let result = apply(&ev, &closure, &[]).unwrap();
        assert!(matches!(result, Value::Integer(5)));
    }
}
