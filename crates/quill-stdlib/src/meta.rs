use quill_core::{apply_callback, eval_callback, mask, Env, Error, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // Raise a LispError carrying the text of the argument.
    register_fn(env, "error", 1, Some(1), &[], |args, _| {
        let text = match &args[0] {
            Value::String(_) => args[0].display_string(),
            other => other.to_string(),
        };
        Err(Error::lisp(text))
    });

    // Non-local exit; only the driver catches this.
    register_fn(env, "exit", 0, Some(1), &[mask::NUMBER], |args, _| {
        let code = match args.first() {
            Some(arg) => arg
                .as_integer()
                .ok_or_else(|| Error::lisp(format!("{arg} is not a number.")))?
                as i32,
            None => 0,
        };
        Err(Error::Exit(code))
    });

    // One value from the standard reader; end of input yields nil.
    register_fn(env, "read", 0, Some(0), &[], |_args, _| {
        match quill_reader::read_from_stdin()? {
            Some(value) => Ok(value),
            None => Ok(Value::Nil),
        }
    });

    // Evaluate in the current environment.
    register_fn(env, "eval", 1, Some(1), &[], |args, env| {
        eval_callback(&args[0], env)
    });

    register_fn(
        env,
        "apply",
        2,
        Some(2),
        &[mask::CALLABLE, mask::LIST],
        |args, env| {
            let call_args = args[1]
                .list_to_vec()
                .ok_or_else(|| Error::lisp(format!("Expect list, got {}", args[1])))?;
            apply_callback(&args[0], &call_args, env)
        },
    );

    // Evaluate the captured expression in the captured environment,
    // at most once.
    register_fn(env, "force", 1, Some(1), &[mask::PROMISE], |args, _| {
        match &args[0] {
            Value::Promise(p) => {
                let cached = p.forced.borrow().clone();
                if let Some(value) = cached {
                    return Ok(value);
                }
                let value = eval_callback(&p.body, &p.env)?;
                *p.forced.borrow_mut() = Some(value.clone());
                Ok(value)
            }
            other => Err(Error::lisp(format!("force: expected promise, got {other}"))),
        }
    });
}
