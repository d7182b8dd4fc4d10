// ABOUTME: Macro expander — rewrites surface forms into the kernel forms eval() understands

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::symbol::intern;
use crate::value::Value;

/// Expands `form`, recursing per-operator: `quote`/`fun` are left
/// untouched; `let`/`lambda`/`defun` expand only their body forms,
/// leaving the binding/parameter list alone; `defvar` expands only its
/// initializer; `cond` expands every test/body form in every clause;
/// `inc`/`dec`/`push`/`pop` expand their place argument through
/// `expand_place` and their value argument through `expand`; `qquote`
/// rewrites via `expand_qquote`; anything else (`call`, `if`, `and`,
/// `or`, and ordinary function-call forms) expands every element.
pub fn expand(ev: &Evaluator, form: &Value) -> Result<Value, EvalError> {
    match form {
        Value::Nil => Ok(Value::Nil),
        Value::Cons(_) => {
            let oper = form.car()?;
            if let Value::Symbol(sym) = &oper {
                if *sym == ev.operators.quote || *sym == ev.operators.fun {
                    return Ok(form.clone());
                }
                if *sym == ev.operators.let_ || *sym == ev.operators.lambda {
                    return expand_body_only(ev, &oper, form);
                }
                if *sym == ev.operators.defun {
                    return expand_defun(ev, &oper, form);
                }
                if *sym == ev.operators.defvar {
                    return expand_defvar(ev, &oper, form);
                }
                if *sym == ev.operators.cond {
                    return expand_cond_pairs(ev, &oper, form);
                }
                if *sym == ev.operators.inc
                    || *sym == ev.operators.dec
                    || *sym == ev.operators.push
                    || *sym == ev.operators.pop
                {
                    return expand_modplace(ev, sym, &oper, form);
                }
                if *sym == ev.operators.qquote {
                    let inner = form.cdr()?.car()?;
                    return expand_qquote(ev, &inner);
                }
                log::trace!("expand: {} treated as ordinary application", sym.name());
            }
            expand_forms(ev, form)
        }
        other => Ok(other.clone()),
    }
}

/// Expands every element of a proper list form (the `call`/`if`/`and`/
/// `or`/ordinary-application case — the operator position expands to
/// itself since a bare symbol is its own expansion).
pub fn expand_forms(ev: &Evaluator, form: &Value) -> Result<Value, EvalError> {
    let items = form.to_vec()?;
    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        out.push(expand(ev, item)?);
    }
    Ok(Value::list(out))
}

fn expand_body_only(ev: &Evaluator, oper: &Value, form: &Value) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    if args.is_empty() {
        return Ok(form.clone());
    }
    let mut items = vec![oper.clone(), args[0].clone()];
    for b in &args[1..] {
        items.push(expand(ev, b)?);
    }
    Ok(Value::list(items))
}

fn expand_defun(ev: &Evaluator, oper: &Value, form: &Value) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    if args.len() < 2 {
        return Ok(form.clone());
    }
    let mut items = vec![oper.clone(), args[0].clone(), args[1].clone()];
    for b in &args[2..] {
        items.push(expand(ev, b)?);
    }
    Ok(Value::list(items))
}

fn expand_defvar(ev: &Evaluator, oper: &Value, form: &Value) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let mut items = vec![oper.clone()];
    if let Some(name) = args.first() {
        items.push(name.clone());
    }
    if let Some(init) = args.get(1) {
        items.push(expand(ev, init)?);
    }
    Ok(Value::list(items))
}

/// Expands every test and body form of every `cond` clause.
pub fn expand_cond_pairs(ev: &Evaluator, oper: &Value, form: &Value) -> Result<Value, EvalError> {
    let clauses = form.cdr()?.to_vec()?;
    let mut items = vec![oper.clone()];
    for clause in &clauses {
        items.push(expand_forms(ev, clause)?);
    }
    Ok(Value::list(items))
}

fn expand_modplace(
    ev: &Evaluator,
    sym: &crate::symbol::Symbol,
    oper: &Value,
    form: &Value,
) -> Result<Value, EvalError> {
    let args = form.cdr()?.to_vec()?;
    let new_args = if *sym == ev.operators.inc
        || *sym == ev.operators.dec
        || *sym == ev.operators.push
    {
        let mut v = Vec::new();
        if let Some(place) = args.first() {
            v.push(expand_place(ev, place)?);
        }
        if let Some(val) = args.get(1) {
            v.push(expand(ev, val)?);
        }
        v
    } else {
        let mut v = Vec::new();
        if let Some(place) = args.first() {
            v.push(expand_place(ev, place)?);
        }
        v
    };
    let mut items = vec![oper.clone()];
    items.extend(new_args);
    Ok(Value::list(items))
}

/// Expands a place expression: a bindable symbol expands to itself;
/// `(gethash hash key [default])` recurses into all three sub-forms.
/// Any other shape is not a supported place.
pub fn expand_place(ev: &Evaluator, place: &Value) -> Result<Value, EvalError> {
    match place {
        Value::Symbol(_) => Ok(place.clone()),
        Value::Cons(_) => {
            let oper = place.car()?;
            let is_gethash = matches!(&oper, Value::Symbol(s) if *s == ev.operators.gethash);
            if !is_gethash {
                return Err(EvalError::bad_place(place));
            }
            let args = place.cdr()?.to_vec()?;
            let mut items = vec![oper];
            for a in &args {
                items.push(expand(ev, a)?);
            }
            Ok(Value::list(items))
        }
        _ => Err(EvalError::bad_place(place)),
    }
}

/// Rewrites a quasiquoted template into `list`/`append`/`quote` calls
/// that, once evaluated, reconstruct the template with `unquote`d
/// sub-forms substituted and `splice`d sub-forms spliced in. A bare
/// `nil`/atom template self-quotes; `(unquote e)` substitutes
/// `expand(e)` directly; `splice` at the top level (not inside a list
/// element) is an error; `(splice e) . rest` appends the spliced list
/// onto the expansion of the rest; anything else conses its expanded
/// head onto its expanded tail.
pub fn expand_qquote(ev: &Evaluator, form: &Value) -> Result<Value, EvalError> {
    match form {
        Value::Nil => Ok(quoted(ev, Value::Nil)),
        Value::Cons(_) => {
            let car = form.car()?;
            if let Value::Symbol(sym) = &car {
                if *sym == ev.operators.unquote {
                    let e = form.cdr()?.car()?;
                    return expand(ev, &e);
                }
                if *sym == ev.operators.splice {
                    return Err(EvalError::syntax_error(
                        "splice is not valid outside a list context",
                    ));
                }
            }
            if car.is_cons() {
                let inner_oper = car.car()?;
                if let Value::Symbol(s) = &inner_oper {
                    if *s == ev.operators.splice {
                        let spliced_expr = car.cdr()?.car()?;
                        let expanded_spliced = expand(ev, &spliced_expr)?;
                        let rest = form.cdr()?;
                        let expanded_rest = expand_qquote(ev, &rest)?;
                        return Ok(Value::list(vec![
                            Value::Symbol(intern("append")),
                            expanded_spliced,
                            expanded_rest,
                        ]));
                    }
                    if *s == ev.operators.quote {
                        let quoted_expr = car.cdr()?.car()?;
                        let f_ex = Value::list(vec![
                            Value::Symbol(ev.operators.quote.clone()),
                            Value::list(vec![quoted_expr]),
                        ]);
                        let rest = form.cdr()?;
                        let expanded_rest = expand_qquote(ev, &rest)?;
                        return Ok(Value::list(vec![
                            Value::Symbol(intern("append")),
                            f_ex,
                            expanded_rest,
                        ]));
                    }
                    if *s == ev.operators.qquote {
                        let nested = car.cdr()?.car()?;
                        let f_ex = Value::list(vec![
                            Value::Symbol(intern("list")),
                            expand_qquote(ev, &expand_qquote(ev, &nested)?)?,
                        ]);
                        let rest = form.cdr()?;
                        let expanded_rest = expand_qquote(ev, &rest)?;
                        return Ok(Value::list(vec![
                            Value::Symbol(intern("append")),
                            f_ex,
                            expanded_rest,
                        ]));
                    }
                }
            }
            let rest = form.cdr()?;
            let expanded_car = expand_qquote(ev, &car)?;
            let expanded_rest = expand_qquote(ev, &rest)?;
            Ok(Value::list(vec![
                Value::Symbol(intern("append")),
                Value::list(vec![Value::Symbol(intern("list")), expanded_car]),
                expanded_rest,
            ]))
        }
        other => Ok(quoted(ev, other.clone())),
    }
}

fn quoted(ev: &Evaluator, v: Value) -> Value {
    Value::list(vec![Value::Symbol(ev.operators.quote.clone()), v])
}
