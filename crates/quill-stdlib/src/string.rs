use quill_core::{mask, Env, Error, Value};

use crate::register_fn;

fn string_arg(name: &str, arg: &Value) -> Result<String, Error> {
    match arg {
        Value::String(s) => Ok(s.borrow().clone()),
        _ => Err(Error::lisp(format!("{name}: expected string, got {arg}"))),
    }
}

fn index_arg(name: &str, arg: &Value) -> Result<usize, Error> {
    match arg.as_integer() {
        Some(n) if n >= 0 => Ok(n as usize),
        _ => Err(Error::lisp(format!(
            "{name}: expected a non-negative integer index, got {arg}"
        ))),
    }
}

fn register_string_cmp(env: &Env, name: &'static str, ci: bool, cmp: fn(&str, &str) -> bool) {
    register_fn(
        env,
        name,
        2,
        Some(2),
        &[mask::STRING, mask::STRING],
        move |args, _| {
            let a = string_arg(name, &args[0])?;
            let b = string_arg(name, &args[1])?;
            if ci {
                Ok(Value::Bool(cmp(
                    &a.to_ascii_lowercase(),
                    &b.to_ascii_lowercase(),
                )))
            } else {
                Ok(Value::Bool(cmp(&a, &b)))
            }
        },
    );
}

pub fn register(env: &Env) {
    register_fn(
        env,
        "make-string",
        1,
        Some(2),
        &[mask::NUMBER, mask::CHAR],
        |args, _| {
            let k = index_arg("make-string", &args[0])?;
            let fill = match args.get(1) {
                Some(Value::Char(c)) => *c,
                Some(other) => {
                    return Err(Error::lisp(format!("make-string: expected char, got {other}")))
                }
                None => ' ',
            };
            Ok(Value::string(fill.to_string().repeat(k)))
        },
    );

    register_fn(env, "string", 0, None, &[mask::CHAR, mask::SAME_AS_REST], |args, _| {
        let mut s = String::with_capacity(args.len());
        for arg in args {
            match arg {
                Value::Char(c) => s.push(*c),
                _ => return Err(Error::lisp(format!("string: expected char, got {arg}"))),
            }
        }
        Ok(Value::string(s))
    });

    register_fn(env, "string-length", 1, Some(1), &[mask::STRING], |args, _| {
        let s = string_arg("string-length", &args[0])?;
        Ok(Value::Number(s.chars().count() as f64))
    });

    register_fn(
        env,
        "string-ref",
        2,
        Some(2),
        &[mask::STRING, mask::NUMBER],
        |args, _| {
            let s = string_arg("string-ref", &args[0])?;
            let i = index_arg("string-ref", &args[1])?;
            s.chars()
                .nth(i)
                .map(Value::Char)
                .ok_or_else(|| Error::lisp(format!("string-ref: index {i} out of range")))
        },
    );

    register_fn(
        env,
        "string-set!",
        3,
        Some(3),
        &[mask::STRING, mask::NUMBER, mask::CHAR],
        |args, _| {
            let cell = args[0]
                .as_string_rc()
                .ok_or_else(|| Error::lisp("string-set!: expected string"))?;
            let i = index_arg("string-set!", &args[1])?;
            let c = match &args[2] {
                Value::Char(c) => *c,
                other => {
                    return Err(Error::lisp(format!("string-set!: expected char, got {other}")))
                }
            };
            let mut chars: Vec<char> = cell.borrow().chars().collect();
            if i >= chars.len() {
                return Err(Error::lisp(format!("string-set!: index {i} out of range")));
            }
            chars[i] = c;
            *cell.borrow_mut() = chars.into_iter().collect();
            Ok(Value::Nil)
        },
    );

    register_string_cmp(env, "string=?", false, |a, b| a == b);
    register_string_cmp(env, "string<?", false, |a, b| a < b);
    register_string_cmp(env, "string>?", false, |a, b| a > b);
    register_string_cmp(env, "string<=?", false, |a, b| a <= b);
    register_string_cmp(env, "string>=?", false, |a, b| a >= b);
    register_string_cmp(env, "string-ci=?", true, |a, b| a == b);
    register_string_cmp(env, "string-ci<?", true, |a, b| a < b);
    register_string_cmp(env, "string-ci>?", true, |a, b| a > b);
    register_string_cmp(env, "string-ci<=?", true, |a, b| a <= b);
    register_string_cmp(env, "string-ci>=?", true, |a, b| a >= b);

    register_fn(
        env,
        "substring",
        3,
        Some(3),
        &[mask::STRING, mask::NUMBER, mask::NUMBER],
        |args, _| {
            let s = string_arg("substring", &args[0])?;
            let start = index_arg("substring", &args[1])?;
            let end = index_arg("substring", &args[2])?;
            let len = s.chars().count();
            // Half-open range: 0 <= start <= end <= length.
            if start > end || end > len {
                return Err(Error::lisp(format!(
                    "substring: range {start}..{end} out of bounds for length {len}"
                )));
            }
            let sub: String = s.chars().skip(start).take(end - start).collect();
            Ok(Value::string(sub))
        },
    );

    register_fn(
        env,
        "string-append",
        0,
        None,
        &[mask::STRING, mask::SAME_AS_REST],
        |args, _| {
            let mut out = String::new();
            for arg in args {
                out.push_str(&string_arg("string-append", arg)?);
            }
            Ok(Value::string(out))
        },
    );

    register_fn(env, "string->list", 1, Some(1), &[mask::STRING], |args, _| {
        let s = string_arg("string->list", &args[0])?;
        Ok(Value::list_from_vec(s.chars().map(Value::Char).collect()))
    });

    register_fn(env, "list->string", 1, Some(1), &[mask::LIST], |args, _| {
        let items = args[0]
            .list_to_vec()
            .ok_or_else(|| Error::lisp(format!("Expect list, got {}", args[0])))?;
        let mut s = String::with_capacity(items.len());
        for item in &items {
            match item {
                Value::Char(c) => s.push(*c),
                other => {
                    return Err(Error::lisp(format!("list->string: expected char, got {other}")))
                }
            }
        }
        Ok(Value::string(s))
    });

    register_fn(env, "string-copy", 1, Some(1), &[mask::STRING], |args, _| {
        Ok(args[0].copy())
    });

    register_fn(
        env,
        "string-fill!",
        2,
        Some(2),
        &[mask::STRING, mask::CHAR],
        |args, _| {
            let cell = args[0]
                .as_string_rc()
                .ok_or_else(|| Error::lisp("string-fill!: expected string"))?;
            let c = match &args[1] {
                Value::Char(c) => *c,
                other => {
                    return Err(Error::lisp(format!("string-fill!: expected char, got {other}")))
                }
            };
            let len = cell.borrow().chars().count();
            *cell.borrow_mut() = c.to_string().repeat(len);
            Ok(Value::Nil)
        },
    );
}

#[cfg(test)]
mod tests {
    use quill_core::{Env, Value};

    use crate::register_stdlib;

    fn call(name: &str, args: &[Value]) -> Result<Value, quill_core::Error> {
        let env = Env::new();
        register_stdlib(&env);
        match &env.lookup_str(name).unwrap() {
            Value::Builtin(p) => {
                p.sig.check(name, args)?;
                (p.func)(args, &env)
            }
            _ => panic!("{name} is not a builtin"),
        }
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_make_string() {
        assert_eq!(
            call("make-string", &[num(3.0), Value::Char('x')]).unwrap(),
            Value::string("xxx")
        );
        assert_eq!(call("make-string", &[num(0.0)]).unwrap(), Value::string(""));
        assert!(call("make-string", &[num(-1.0)]).is_err());
    }

    #[test]
    fn test_string_of_chars() {
        assert_eq!(
            call("string", &[Value::Char('h'), Value::Char('i')]).unwrap(),
            Value::string("hi")
        );
    }

    #[test]
    fn test_length_and_ref() {
        let s = Value::string("abc");
        assert_eq!(call("string-length", &[s.clone()]).unwrap(), num(3.0));
        assert_eq!(call("string-ref", &[s.clone(), num(1.0)]).unwrap(), Value::Char('b'));
        assert!(call("string-ref", &[s, num(3.0)]).is_err());
    }

    #[test]
    fn test_set_mutates_through_sharing() {
        let s = Value::string("abc");
        let alias = s.clone();
        call("string-set!", &[s, num(0.0), Value::Char('z')]).unwrap();
        assert_eq!(alias.display_string(), "zbc");
    }

    #[test]
    fn test_set_out_of_range() {
        assert!(call("string-set!", &[Value::string("ab"), num(2.0), Value::Char('z')]).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            call("string<?", &[Value::string("abc"), Value::string("abd")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("string=?", &[Value::string("A"), Value::string("a")]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call("string-ci=?", &[Value::string("A"), Value::string("a")]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_substring_bounds() {
        let s = Value::string("hello");
        assert_eq!(
            call("substring", &[s.clone(), num(1.0), num(3.0)]).unwrap(),
            Value::string("el")
        );
        assert_eq!(
            call("substring", &[s.clone(), num(2.0), num(2.0)]).unwrap(),
            Value::string("")
        );
        assert!(call("substring", &[s.clone(), num(3.0), num(2.0)]).is_err());
        assert!(call("substring", &[s.clone(), num(0.0), num(6.0)]).is_err());
        assert!(call("substring", &[s, num(-1.0), num(2.0)]).is_err());
    }

    #[test]
    fn test_append_and_conversions() {
        assert_eq!(
            call("string-append", &[Value::string("ab"), Value::string("cd")]).unwrap(),
            Value::string("abcd")
        );
        assert_eq!(call("string-append", &[]).unwrap(), Value::string(""));
        assert_eq!(
            call("string->list", &[Value::string("ab")]).unwrap().to_string(),
            "(#\\a #\\b)"
        );
        let chars = Value::list_from_vec(vec![Value::Char('o'), Value::Char('k')]);
        assert_eq!(call("list->string", &[chars]).unwrap(), Value::string("ok"));
    }

    #[test]
    fn test_copy_is_decoupled() {
        let s = Value::string("abc");
        let copy = call("string-copy", &[s.clone()]).unwrap();
        call("string-fill!", &[s.clone(), Value::Char('-')]).unwrap();
        assert_eq!(s.display_string(), "---");
        assert_eq!(copy.display_string(), "abc");
    }
}
