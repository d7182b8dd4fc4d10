//! Functions that re-enter the evaluator: mapcar, mappend, apply, eval

use crate::apply::apply as apply_fn;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval as eval_fn;
use crate::evaluator::Evaluator;
use crate::expand::expand;
use crate::symbol::intern;
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};
use std::rc::Rc;

/// `(mapcar fn list...)`: steps every list in lockstep, stopping at the
/// shortest, collecting the results of applying `fn` to each tuple.
pub fn builtin_mapcar(func: Value, lists: &[Value], ev: &Evaluator) -> Result<Value, EvalError> {
    if lists.is_empty() {
        return Ok(Value::Nil);
    }
    let columns: Vec<Vec<Value>> = lists
        .iter()
        .map(|l| l.to_vec())
        .collect::<Result<_, _>>()?;
    let len = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let row: Vec<Value> = columns.iter().map(|c| c[i].clone()).collect();
        out.push(apply_fn(ev, &func, &row)?);
    }
    Ok(Value::list(out))
}

/// `(mappend fn list...)`: like `mapcar`, but concatenates the results
/// (each must itself be a list) rather than collecting them as items.
pub fn builtin_mappend(func: Value, lists: &[Value], ev: &Evaluator) -> Result<Value, EvalError> {
    let mapped = builtin_mapcar(func, lists, ev)?;
    let pieces = mapped.to_vec()?;
    let mut out = Vec::new();
    for piece in pieces {
        out.extend(piece.to_vec()?);
    }
    Ok(Value::list(out))
}

/// `(apply fn args-list)`: calls `fn` with the elements of `args-list` as
/// already-evaluated arguments. Distinct from the `call` special form,
/// which evaluates its own argument forms; here the argument list is
/// itself a value.
pub fn builtin_apply(func: Value, args_list: Value, ev: &Evaluator) -> Result<Value, EvalError> {
    let args = args_list.to_vec()?;
    apply_fn(ev, &func, &args)
}

/// `(eval form [env])`: expands then evaluates `form`, against `env` if
/// given, otherwise the global environment (spec.md §6 `eval_intrinsic`).
pub fn builtin_eval(form: Value, rest: &[Value], ev: &Evaluator) -> Result<Value, EvalError> {
    let env: Rc<Environment> = match rest.first() {
        Some(Value::Environment(e)) => e.clone(),
        Some(other) => return Err(EvalError::type_error("eval", "environment", other)),
        None => ev.global_env.clone(),
    };
    let expanded = expand(ev, &form)?;
    eval_fn(ev, &expanded, &env)
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
        intern("mapcar"),
        native("mapcar", 1, true, NativeFn::Variadic1Eval(builtin_mapcar)),
    );
    env.fbind(
        intern("mappend"),
        native("mappend", 1, true, NativeFn::Variadic1Eval(builtin_mappend)),
    );
    env.fbind(intern("apply"), native("apply", 2, false, NativeFn::Fixed2Eval(builtin_apply)));
    env.fbind(
        intern("eval"),
        native("eval", 1, true, NativeFn::Variadic1Eval(builtin_eval)),
    );
}
