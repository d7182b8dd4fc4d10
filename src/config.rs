// ABOUTME: Fixed implementation limits the evaluator relies on

/// Ceiling on the number of arguments a variadic native accepts. Mirrors
/// the bounded `val arg[32]` buffer in the evaluator this crate's
/// application engine is modeled on, enforced in `apply::check_variadic_arity`.
pub const MAX_FIXED_ARGS: usize = 32;
