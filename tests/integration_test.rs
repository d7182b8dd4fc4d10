// ABOUTME: Cross-module integration tests exercising expand+eval together end to end

use lisp_core_eval::apply::apply;
use lisp_core_eval::env::Environment;
use lisp_core_eval::error::EvalError;
use lisp_core_eval::eval::eval;
use lisp_core_eval::evaluator::Evaluator;
use lisp_core_eval::expand::expand;
use lisp_core_eval::symbol::intern;
use lisp_core_eval::value::Value;
use std::rc::Rc;

fn sym(name: &str) -> Value {
    Value::Symbol(intern(name))
}

fn quote(v: Value) -> Value {
    Value::list(vec![sym("quote"), v])
}

fn run(ev: &Evaluator, env: &Rc<Environment>, form: Value) -> Result<Value, EvalError> {
    let expanded = expand(ev, &form)?;
    eval(ev, &expanded, env)
}

/// `(defun fact (n) (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 5) => 120`
#[test]
fn factorial_via_defun_and_recursion() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let defun_form = Value::list(vec![
        sym("defun"),
        sym("fact"),
        Value::list(vec![sym("n")]),
        Value::list(vec![
            sym("if"),
            Value::list(vec![sym("<="), sym("n"), Value::Integer(1)]),
            Value::Integer(1),
            Value::list(vec![
                sym("*"),
                sym("n"),
                Value::list(vec![sym("fact"), Value::list(vec![sym("-"), sym("n"), Value::Integer(1)])]),
            ]),
        ]),
    ]);
    run(&ev, &env, defun_form).unwrap();

    let call = Value::list(vec![sym("fact"), Value::Integer(5)]);
    let result = run(&ev, &env, call).unwrap();
    assert!(matches!(result, Value::Integer(120)));
}

/// `(let ((x 10)) (let ((f (lambda () x))) (set x 20) (call f))) => 20`
#[test]
fn closure_observes_mutation_via_set() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let inner_let = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("f"), Value::list(vec![sym("lambda"), Value::Nil, sym("x")])])]),
        Value::list(vec![sym("set"), sym("x"), Value::Integer(20)]),
        Value::list(vec![sym("call"), sym("f")]),
    ]);
    let outer_let = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("x"), Value::Integer(10)])]),
        inner_let,
    ]);

    let result = run(&ev, &env, outer_let).unwrap();
    assert!(matches!(result, Value::Integer(20)));
}

/// `` `(1 ,(+ 2 3) ,@(list 4 5) 6) => (1 5 4 5 6) ``
#[test]
fn quasiquote_unquote_and_splice_build_the_expected_list() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let template = Value::list(vec![
        sym("quasiquote"),
        Value::list(vec![
            Value::Integer(1),
            Value::list(vec![sym("unquote"), Value::list(vec![sym("+"), Value::Integer(2), Value::Integer(3)])]),
            Value::list(vec![sym("splice"), Value::list(vec![sym("list"), Value::Integer(4), Value::Integer(5)])]),
            Value::Integer(6),
        ]),
    ]);

    let result = run(&ev, &env, template).unwrap();
    let items = result.to_vec().unwrap();
    let expected = vec![1, 5, 4, 5, 6];
    for (item, exp) in items.iter().zip(expected.iter()) {
        assert!(matches!(item, Value::Integer(n) if n == exp));
    }
}

/// `(let ((h (make-hash nil nil nil))) (inc (gethash h 'k 0) 3) (inc (gethash h 'k 0) 4) (gethash h 'k nil)) => 7`
#[test]
fn gethash_place_accumulates_across_inc_calls() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let gethash_place = |default: Value| {
        Value::list(vec![
            sym("gethash"),
            sym("h"),
            quote(sym("k")),
            default,
        ])
    };

    let body = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![
            sym("h"),
            Value::list(vec![sym("make-hash")]),
        ])]),
        Value::list(vec![sym("inc"), gethash_place(Value::Integer(0)), Value::Integer(3)]),
        Value::list(vec![sym("inc"), gethash_place(Value::Integer(0)), Value::Integer(4)]),
        Value::list(vec![sym("gethash"), sym("h"), quote(sym("k")), Value::Nil]),
    ]);

    let result = run(&ev, &env, body).unwrap();
    assert!(matches!(result, Value::Integer(7)));
}

/// `(cond ((eq 1 2) 'a) ((eq 3 3) 'b) (t 'c)) => b`
#[test]
fn cond_picks_first_truthy_clause() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let form = Value::list(vec![
        sym("cond"),
        Value::list(vec![Value::list(vec![sym("eq"), Value::Integer(1), Value::Integer(2)]), quote(sym("a"))]),
        Value::list(vec![Value::list(vec![sym("eq"), Value::Integer(3), Value::Integer(3)]), quote(sym("b"))]),
        Value::list(vec![Value::True, quote(sym("c"))]),
    ]);

    let result = run(&ev, &env, form).unwrap();
    assert!(matches!(result, Value::Symbol(s) if s.name() == "b"));
}

/// `(mapcar (lambda (a b) (+ a b)) '(1 2 3) '(10 20 30)) => (11 22 33)`
#[test]
fn mapcar_steps_two_lists_together() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let form = Value::list(vec![
        sym("mapcar"),
        Value::list(vec![
            sym("lambda"),
            Value::list(vec![sym("a"), sym("b")]),
            Value::list(vec![sym("+"), sym("a"), sym("b")]),
        ]),
        quote(Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])),
        quote(Value::list(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)])),
    ]);

    let result = run(&ev, &env, form).unwrap();
    let items = result.to_vec().unwrap();
    let expected = [11, 22, 33];
    for (item, exp) in items.iter().zip(expected.iter()) {
        assert!(matches!(item, Value::Integer(n) if n == exp));
    }
}

/// `(and a b)` must not evaluate `b` once `a` is nil — observed via a
/// place mutation that would otherwise be visible (spec.md §8's
/// "short-circuit" testable property).
#[test]
fn and_short_circuit_is_observable_via_unevaluated_side_effect() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();
    env.vbind(intern("touched"), Value::Nil);

    let form = Value::list(vec![
        sym("and"),
        Value::Nil,
        Value::list(vec![sym("set"), sym("touched"), Value::True]),
    ]);
    run(&ev, &env, form).unwrap();

    let touched = env.lookup_var(&intern("touched")).unwrap();
    assert!(touched.borrow().is_nil(), "short-circuited branch must not run");
}

/// `(push x L)` followed by `(pop L)` yields `x` and restores `L`.
#[test]
fn push_then_pop_round_trips_a_place() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();
    env.vbind(intern("l"), Value::Nil);

    let push_form = Value::list(vec![sym("push"), sym("l"), Value::Integer(9)]);
    run(&ev, &env, push_form).unwrap();

    let pop_form = Value::list(vec![sym("pop"), sym("l")]);
    let popped = run(&ev, &env, pop_form).unwrap();
    assert!(matches!(popped, Value::Integer(9)));

    let l = env.lookup_var(&intern("l")).unwrap();
    assert!(l.borrow().is_nil());
}

/// A function value can be applied directly through `apply()` without
/// going through `eval` again — exercises the application engine in
/// isolation the way the evaluator's own function-call branch does.
#[test]
fn apply_invokes_an_interpreted_closure_directly() {
    let ev = Evaluator::new();
    let env = ev.global_env.clone();

    let lambda_form = Value::list(vec![
        sym("lambda"),
        Value::list(vec![sym("x")]),
        Value::list(vec![sym("*"), sym("x"), Value::Integer(2)]),
    ]);
    let closure = run(&ev, &env, lambda_form).unwrap();
    let result = apply(&ev, &closure, &[Value::Integer(21)]).unwrap();
    assert!(matches!(result, Value::Integer(42)));
}
