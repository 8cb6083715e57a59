use std::cell::Cell;

use crate::error::Error;
use crate::value::{Env, Value};

/// Re-entry points into the evaluator for builtins that need them
/// (`map`, `apply`, `eval`, `force`, ...). `quill-stdlib` cannot depend
/// on `quill-eval` (the evaluator seeds the root environment from the
/// stdlib), so the interpreter installs these at construction.
pub type EvalHook = fn(&Value, &Env) -> Result<Value, Error>;
pub type ApplyHook = fn(&Value, &[Value], &Env) -> Result<Value, Error>;

thread_local! {
    static EVAL_HOOK: Cell<Option<EvalHook>> = const { Cell::new(None) };
    static APPLY_HOOK: Cell<Option<ApplyHook>> = const { Cell::new(None) };
}

pub fn install_hooks(eval: EvalHook, apply: ApplyHook) {
    EVAL_HOOK.with(|cell| cell.set(Some(eval)));
    APPLY_HOOK.with(|cell| cell.set(Some(apply)));
}

/// Evaluate an expression through the installed evaluator.
pub fn eval_callback(expr: &Value, env: &Env) -> Result<Value, Error> {
    match EVAL_HOOK.with(|cell| cell.get()) {
        Some(eval) => eval(expr, env),
        None => Err(Error::lisp("evaluator is not initialized")),
    }
}

/// Apply a callable to already-evaluated arguments through the installed
/// evaluator.
pub fn apply_callback(func: &Value, args: &[Value], env: &Env) -> Result<Value, Error> {
    match APPLY_HOOK.with(|cell| cell.get()) {
        Some(apply) => apply(func, args, env),
        None => Err(Error::lisp("evaluator is not initialized")),
    }
}
