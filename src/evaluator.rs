// ABOUTME: Evaluator context — owns the global namespace pair and the special-form dispatch table

use crate::builtins;
use crate::env::Environment;
use crate::error::EvalError;
use crate::symbol::{intern, Symbol};
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// A special-form handler: receives the whole `(op . args)` form and the
/// environment it was written in, and decides for itself how much of the
/// form to evaluate and when (spec.md §4.3).
pub type OperatorFn = fn(&Evaluator, &Value, &Rc<Environment>) -> Result<Value, EvalError>;

/// Interned handles for every symbol the evaluator and expander treat
/// specially, built once so dispatch is a symbol-identity compare rather
/// than a string compare.
pub struct Operators {
    pub quote: Symbol,
    pub let_: Symbol,
    pub lambda: Symbol,
    pub call: Symbol,
    pub fun: Symbol,
    pub cond: Symbol,
    pub if_: Symbol,
    pub and: Symbol,
    pub or: Symbol,
    pub defvar: Symbol,
    pub defun: Symbol,
    pub set: Symbol,
    pub inc: Symbol,
    pub dec: Symbol,
    pub push: Symbol,
    pub pop: Symbol,
    pub qquote: Symbol,
    pub unquote: Symbol,
    pub splice: Symbol,
    pub gethash: Symbol,
}

impl Operators {
    fn new() -> Self {
        Operators {
            quote: intern("quote"),
            let_: intern("let"),
            lambda: intern("lambda"),
            call: intern("call"),
            fun: intern("fun"),
            cond: intern("cond"),
            if_: intern("if"),
            and: intern("and"),
            or: intern("or"),
            defvar: intern("defvar"),
            defun: intern("defun"),
            set: intern("set"),
            inc: intern("inc"),
            dec: intern("dec"),
            push: intern("push"),
            pop: intern("pop"),
            qquote: intern("quasiquote"),
            unquote: intern("unquote"),
            splice: intern("splice"),
            gethash: intern("gethash"),
        }
    }
}

/// Owns the global variable/function namespace pair and the operator
/// table. Passed explicitly to `eval`/`expand`/`apply` rather than kept
/// as process-global state (spec.md §9's "evaluator-context value"
/// option).
pub struct Evaluator {
    pub global_env: Rc<Environment>,
    pub operators: Operators,
    op_table: HashMap<Symbol, OperatorFn>,
}

impl Evaluator {
    pub fn new() -> Self {
        let global_env = Environment::new(None);
        let operators = Operators::new();
        let mut op_table: HashMap<Symbol, OperatorFn> = HashMap::new();

        op_table.insert(operators.quote.clone(), crate::eval::op_quote);
        op_table.insert(operators.let_.clone(), crate::eval::op_let);
        op_table.insert(operators.lambda.clone(), crate::eval::op_lambda);
        op_table.insert(operators.call.clone(), crate::eval::op_call);
        op_table.insert(operators.fun.clone(), crate::eval::op_fun);
        op_table.insert(operators.cond.clone(), crate::eval::op_cond);
        op_table.insert(operators.if_.clone(), crate::eval::op_if);
        op_table.insert(operators.and.clone(), crate::eval::op_and);
        op_table.insert(operators.or.clone(), crate::eval::op_or);
        op_table.insert(operators.defvar.clone(), crate::eval::op_defvar);
        op_table.insert(operators.defun.clone(), crate::eval::op_defun);
        op_table.insert(operators.set.clone(), crate::eval::op_modplace);
        op_table.insert(operators.inc.clone(), crate::eval::op_modplace);
        op_table.insert(operators.dec.clone(), crate::eval::op_modplace);
        op_table.insert(operators.push.clone(), crate::eval::op_modplace);
        op_table.insert(operators.pop.clone(), crate::eval::op_modplace);

        let evaluator = Evaluator {
            global_env,
            operators,
            op_table,
        };
        builtins::register_all(&evaluator.global_env);
        evaluator
    }

    pub fn lookup_operator(&self, sym: &Symbol) -> Option<OperatorFn> {
        self.op_table.get(sym).copied()
    }

    pub fn is_operator(&self, sym: &Symbol) -> bool {
        self.op_table.contains_key(sym)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_evaluator_registers_core_operators() {
        let ev = Evaluator::new();
        assert!(ev.is_operator(&ev.operators.quote));
        assert!(ev.is_operator(&ev.operators.if_));
        assert!(ev.is_operator(&ev.operators.defun));
        assert!(!ev.is_operator(&intern("not-an-operator")));
    }

    #[test]
    fn global_env_has_builtins_registered() {
        let ev = Evaluator::new();
        assert!(ev.global_env.lookup_fun(&intern("cons")).is_some());
        assert!(ev.global_env.lookup_fun(&intern("+")).is_some());
    }
}
