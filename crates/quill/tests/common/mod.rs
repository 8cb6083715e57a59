use quill_core::{Error, Value};
use quill_eval::Interpreter;

/// Evaluate a whole program in a fresh interpreter, returning the last
/// result.
pub fn eval(input: &str) -> Value {
    Interpreter::new()
        .eval_str(input)
        .unwrap_or_else(|e| panic!("failed to eval `{input}`: {e}"))
}

/// Evaluate and return the result's print form.
pub fn eval_to_string(input: &str) -> String {
    eval(input).to_string()
}

/// Evaluate, expecting an error.
pub fn eval_err(input: &str) -> Error {
    Interpreter::new()
        .eval_str(input)
        .expect_err(&format!("expected error for `{input}`"))
}
