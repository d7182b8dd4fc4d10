// ABOUTME: Function application — arity-class dispatch for native calls, parameter binding for closures

use crate::config::MAX_FIXED_ARGS;
use crate::env::Environment;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::eval::eval_progn;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

/// Calls `func` with already-evaluated `args`. A bare symbol `func` is
/// first resolved against the global function namespace (spec.md §4.5
/// step 1) so callers — notably `apply`/`mapcar`'s own builtin, which
/// may be handed a function name rather than an already-looked-up
/// function value — don't have to resolve it themselves. Dispatches on
/// whether the function is interpreted (re-enters `eval_progn` in a
/// fresh call frame) or native (dispatches through the native's arity
/// class).
pub fn apply(ev: &Evaluator, func: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let resolved;
    let func = match func {
        Value::Symbol(sym) => {
            let cell = ev
                .global_env
                .lookup_fun(sym)
                .ok_or_else(|| EvalError::unbound_function(sym.name()))?;
            resolved = cell.borrow().clone();
            &resolved
        }
        other => other,
    };
    match func {
        Value::Function(f) => match f.as_ref() {
            FunctionValue::Interpreted {
                captured_env,
                params,
                body,
            } => {
                log::debug!("applying interpreted function, {} args", args.len());
                interp_fun(ev, captured_env, params, body, args)
            }
            FunctionValue::Native(nf) => {
                log::debug!("applying native function {}, {} args", nf.name, args.len());
                apply_native(ev, nf, args)
            }
        },
        other => Err(EvalError::syntax_error(format!(
            "{} is not callable",
            other
        ))),
    }
}

/// Runs an interpreted closure: binds `args` against `params` in a new
/// frame parented on the closure's captured environment, then evaluates
/// the body in that frame.
pub fn interp_fun(
    ev: &Evaluator,
    captured_env: &Option<Rc<Environment>>,
    params: &Value,
    body: &[Value],
    args: &[Value],
) -> Result<Value, EvalError> {
    let call_env = Environment::new(captured_env.clone());
    bind_args(&call_env, params, args)?;
    eval_progn(ev, body, &call_env)
}

/// Lockstep-binds `args` against a parameter list. A bindable symbol in
/// tail position (either the whole parameter list, or the tail of a
/// dotted list) collects whatever arguments remain as a rest-parameter
/// list.
pub fn bind_args(env: &Rc<Environment>, params: &Value, args: &[Value]) -> Result<(), EvalError> {
    let mut idx = 0usize;
    let mut cur = params.clone();
    loop {
        match cur {
            Value::Nil => {
                if idx != args.len() {
                    return Err(EvalError::arity_error("lambda", idx.to_string(), args.len()));
                }
                return Ok(());
            }
            Value::Symbol(rest_sym) => {
                let rest = Value::list(args[idx..].to_vec());
                env.vbind(rest_sym, rest);
                return Ok(());
            }
            Value::Cons(c) => {
                if idx >= args.len() {
                    return Err(EvalError::arity_error(
                        "lambda",
                        format!("at least {}", idx + 1),
                        args.len(),
                    ));
                }
                let (car, cdr) = {
                    let cell = c.borrow();
                    (cell.car.clone(), cell.cdr.clone())
                };
                let sym = match car {
                    Value::Symbol(s) => s,
                    other => return Err(EvalError::not_bindable(&other)),
                };
                env.vbind(sym, args[idx].clone());
                idx += 1;
                cur = cdr;
            }
            _ => return Err(EvalError::syntax_error("malformed parameter list")),
        }
    }
}

fn check_fixed_arity(nf: &NativeFunction, actual: usize) -> Result<(), EvalError> {
    if actual != nf.minparam {
        return Err(EvalError::arity_error(nf.name, nf.minparam.to_string(), actual));
    }
    Ok(())
}

/// Variadic natives still collect their trailing arguments into the
/// bounded buffer `config::MAX_FIXED_ARGS` models; a call past that bound
/// is a caller error, not something this crate's slice-based plumbing
/// needs to grow unboundedly to accommodate.
fn check_variadic_arity(nf: &NativeFunction, actual: usize) -> Result<(), EvalError> {
    if actual < nf.minparam {
        return Err(EvalError::arity_error(
            nf.name,
            format!("at least {}", nf.minparam),
            actual,
        ));
    }
    if actual > MAX_FIXED_ARGS {
        return Err(EvalError::arity_error(
            nf.name,
            format!("at most {}", MAX_FIXED_ARGS),
            actual,
        ));
    }
    Ok(())
}

/// Dispatches a native function call through its arity-class tag. The
/// tag and `minparam`/`variadic` are set together at registration time,
/// so a mismatch here means a registration bug, reported as
/// `InternalError` rather than surfaced as a user-facing arity error.
fn apply_native(ev: &Evaluator, nf: &NativeFunction, args: &[Value]) -> Result<Value, EvalError> {
    match nf.call {
        NativeFn::Fixed0(f) => {
            check_fixed_arity(nf, args.len())?;
            f()
        }
        NativeFn::Fixed1(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone())
        }
        NativeFn::Fixed2(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone(), args[1].clone())
        }
        NativeFn::Fixed3(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone(), args[1].clone(), args[2].clone())
        }
        NativeFn::Fixed4(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone(), args[1].clone(), args[2].clone(), args[3].clone())
        }
        NativeFn::Variadic0(f) => {
            check_variadic_arity(nf, args.len())?;
            f(args)
        }
        NativeFn::Variadic1(f) => {
            check_variadic_arity(nf, args.len())?;
            f(args[0].clone(), &args[1..])
        }
        NativeFn::Variadic2(f) => {
            check_variadic_arity(nf, args.len())?;
            f(args[0].clone(), args[1].clone(), &args[2..])
        }
        NativeFn::Fixed1Eval(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone(), ev)
        }
        NativeFn::Fixed2Eval(f) => {
            check_fixed_arity(nf, args.len())?;
            f(args[0].clone(), args[1].clone(), ev)
        }
        NativeFn::Variadic1Eval(f) => {
            check_variadic_arity(nf, args.len())?;
            f(args[0].clone(), &args[1..], ev)
        }
    }
}
