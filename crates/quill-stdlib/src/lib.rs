mod arithmetic;
mod char_ops;
mod comparison;
mod io;
mod list;
mod meta;
mod predicates;
mod string;
mod vector;

use quill_core::{intern, Env, Error, NativeProc, Signature, Value};

/// Seed an environment with the whole builtin library.
pub fn register_stdlib(env: &Env) {
    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    char_ops::register(env);
    string::register(env);
    vector::register(env);
    list::register(env);
    io::register(env);
    meta::register(env);
}

/// Register one builtin: name, arity bounds (`None` = unbounded), per-slot
/// type masks, body. The signature is checked by the evaluator before the
/// body runs.
pub(crate) fn register_fn(
    env: &Env,
    name: &str,
    min: usize,
    max: Option<usize>,
    masks: &[u32],
    f: impl Fn(&[Value], &Env) -> Result<Value, Error> + 'static,
) {
    env.define(
        intern(name),
        Value::builtin(NativeProc::new(name, Signature::new(min, max, masks), f)),
    );
}
