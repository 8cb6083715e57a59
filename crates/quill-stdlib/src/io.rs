use std::io::Write;

use quill_core::{Env, Value};

use crate::register_fn;

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

pub fn register(env: &Env) {
    // Each value's print form on its own line.
    register_fn(env, "print", 0, None, &[], |args, _| {
        for arg in args {
            println!("{arg}");
        }
        Ok(Value::Nil)
    });

    // Display form, no trailing newline.
    register_fn(env, "display", 0, None, &[], |args, _| {
        for arg in args {
            print!("{}", arg.display_string());
        }
        flush_stdout();
        Ok(Value::Nil)
    });

    register_fn(env, "displayln", 0, None, &[], |args, _| {
        for arg in args {
            println!("{}", arg.display_string());
        }
        Ok(Value::Nil)
    });

    register_fn(env, "newline", 0, Some(0), &[], |_args, _| {
        println!();
        Ok(Value::Nil)
    });
}
