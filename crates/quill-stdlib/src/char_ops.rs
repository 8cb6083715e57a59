use quill_core::{mask, Env, Error, Value};

use crate::register_fn;

fn register_char_cmp(env: &Env, name: &'static str, ci: bool, cmp: fn(char, char) -> bool) {
    register_fn(
        env,
        name,
        2,
        Some(2),
        &[mask::CHAR, mask::CHAR],
        move |args, _| match (&args[0], &args[1]) {
            (Value::Char(a), Value::Char(b)) => {
                let (a, b) = if ci {
                    (a.to_ascii_lowercase(), b.to_ascii_lowercase())
                } else {
                    (*a, *b)
                };
                Ok(Value::Bool(cmp(a, b)))
            }
            _ => Err(Error::lisp(format!("{name}: expected chars"))),
        },
    );
}

fn register_char_predicate(env: &Env, name: &'static str, test: fn(char) -> bool) {
    register_fn(env, name, 1, Some(1), &[mask::CHAR], move |args, _| {
        match &args[0] {
            Value::Char(c) => Ok(Value::Bool(test(*c))),
            _ => Err(Error::lisp(format!("{name}: expected char"))),
        }
    });
}

pub fn register(env: &Env) {
    register_char_cmp(env, "char=?", false, |a, b| a == b);
    register_char_cmp(env, "char<?", false, |a, b| a < b);
    register_char_cmp(env, "char>?", false, |a, b| a > b);
    register_char_cmp(env, "char<=?", false, |a, b| a <= b);
    register_char_cmp(env, "char>=?", false, |a, b| a >= b);
    register_char_cmp(env, "char-ci=?", true, |a, b| a == b);
    register_char_cmp(env, "char-ci<?", true, |a, b| a < b);
    register_char_cmp(env, "char-ci>?", true, |a, b| a > b);
    register_char_cmp(env, "char-ci<=?", true, |a, b| a <= b);
    register_char_cmp(env, "char-ci>=?", true, |a, b| a >= b);

    // ASCII classification only.
    register_char_predicate(env, "char-alphabetic?", |c| c.is_ascii_alphabetic());
    register_char_predicate(env, "char-numeric?", |c| c.is_ascii_digit());
    register_char_predicate(env, "char-whitespace?", |c| c.is_ascii_whitespace());
    register_char_predicate(env, "char-uppercase?", |c| c.is_ascii_uppercase());
    register_char_predicate(env, "char-lowercase?", |c| c.is_ascii_lowercase());

    register_fn(env, "char->integer", 1, Some(1), &[mask::CHAR], |args, _| {
        match &args[0] {
            Value::Char(c) => Ok(Value::Number(*c as u32 as f64)),
            _ => Err(Error::lisp("char->integer: expected char")),
        }
    });

    register_fn(env, "integer->char", 1, Some(1), &[mask::NUMBER], |args, _| {
        let code = args[0]
            .as_integer()
            .ok_or_else(|| Error::lisp(format!("integer->char: expected integer, got {}", args[0])))?;
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Error::lisp(format!("integer->char: {code} is out of range")))?;
        Ok(Value::Char(c))
    });

    register_fn(env, "char-upcase", 1, Some(1), &[mask::CHAR], |args, _| {
        match &args[0] {
            Value::Char(c) => Ok(Value::Char(c.to_ascii_uppercase())),
            _ => Err(Error::lisp("char-upcase: expected char")),
        }
    });

    register_fn(env, "char-downcase", 1, Some(1), &[mask::CHAR], |args, _| {
        match &args[0] {
            Value::Char(c) => Ok(Value::Char(c.to_ascii_lowercase())),
            _ => Err(Error::lisp("char-downcase: expected char")),
        }
    });
}
