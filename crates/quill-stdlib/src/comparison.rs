use quill_core::{mask, Env, Error, Value};

use crate::register_fn;

fn register_numeric_cmp(env: &Env, name: &'static str, cmp: fn(f64, f64) -> bool) {
    register_fn(
        env,
        name,
        2,
        Some(2),
        &[mask::NUMBER, mask::NUMBER],
        move |args, _| match (&args[0], &args[1]) {
            (Value::Number(x), Value::Number(y)) => Ok(Value::Bool(cmp(*x, *y))),
            _ => Err(Error::lisp(format!("{name}: expected numbers"))),
        },
    );
}

pub fn register(env: &Env) {
    register_numeric_cmp(env, "=", |x, y| x == y);
    register_numeric_cmp(env, "<", |x, y| x < y);
    register_numeric_cmp(env, ">", |x, y| x > y);
    register_numeric_cmp(env, "<=", |x, y| x <= y);
    register_numeric_cmp(env, ">=", |x, y| x >= y);

    register_fn(env, "even?", 1, Some(1), &[mask::NUMBER], |args, _| {
        match args[0].as_integer() {
            Some(n) => Ok(Value::Bool(n % 2 == 0)),
            None => Err(Error::lisp(format!("even?: expected integer, got {}", args[0]))),
        }
    });

    register_fn(env, "odd?", 1, Some(1), &[mask::NUMBER], |args, _| {
        match args[0].as_integer() {
            Some(n) => Ok(Value::Bool(n % 2 != 0)),
            None => Err(Error::lisp(format!("odd?: expected integer, got {}", args[0]))),
        }
    });

    register_fn(env, "zero?", 1, Some(1), &[mask::NUMBER], |args, _| {
        match &args[0] {
            Value::Number(n) => Ok(Value::Bool(*n == 0.0)),
            _ => Err(Error::lisp("zero?: expected number")),
        }
    });

    // Identity-or-small-atom equality.
    register_fn(env, "eq?", 2, Some(2), &[], |args, _| {
        Ok(Value::Bool(args[0].is_identical(&args[1])))
    });

    // Structural equality: same tag, prints equal.
    register_fn(env, "equal?", 2, Some(2), &[], |args, _| {
        Ok(Value::Bool(args[0] == args[1]))
    });

    register_fn(env, "not", 1, Some(1), &[], |args, _| {
        Ok(Value::Bool(!args[0].is_truthy()))
    });
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
    fn test_numeric_comparisons() {
        assert_eq!(call("=", &[num(2.0), num(2.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("<", &[num(1.0), num(2.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call(">", &[num(1.0), num(2.0)]).unwrap(), Value::Bool(false));
        assert_eq!(call("<=", &[num(2.0), num(2.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call(">=", &[num(1.0), num(2.0)]).unwrap(), Value::Bool(false));
        assert!(call("=", &[num(1.0), Value::string("x")]).is_err());
    }

    #[test]
    fn test_parity() {
        assert_eq!(call("even?", &[num(4.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("odd?", &[num(-3.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("odd?", &[num(4.0)]).unwrap(), Value::Bool(false));
        assert!(call("even?", &[num(1.5)]).is_err());
    }

    #[test]
    fn test_zero() {
        assert_eq!(call("zero?", &[num(0.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("zero?", &[num(0.1)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_eq_identity_vs_structural() {
        let a = Value::string("hi");
        let b = Value::string("hi");
        assert_eq!(call("eq?", &[a.clone(), b.clone()]).unwrap(), Value::Bool(false));
        assert_eq!(call("eq?", &[a.clone(), a.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(call("equal?", &[a, b]).unwrap(), Value::Bool(true));
        assert_eq!(
            call("eq?", &[num(2.0), num(2.0)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("eq?", &[Value::symbol("s"), Value::symbol("s")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("eq?", &[Value::Nil, Value::Nil]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_not() {
        assert_eq!(call("not", &[Value::Bool(false)]).unwrap(), Value::Bool(true));
        assert_eq!(call("not", &[num(0.0)]).unwrap(), Value::Bool(false));
        assert_eq!(call("not", &[Value::Nil]).unwrap(), Value::Bool(false));
    }
}
