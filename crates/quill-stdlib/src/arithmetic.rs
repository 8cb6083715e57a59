use quill_core::{mask, Env, Error, Value};

use crate::register_fn;

/// Truncation toward zero, shared by quotient/remainder/modulo.
fn trunc_toward_zero(x: f64) -> f64 {
    x.trunc()
}

fn integer_of(name: &str, arg: &Value) -> Result<i64, Error> {
    arg.as_integer()
        .ok_or_else(|| Error::lisp(format!("{name}: expected integer, got {arg}")))
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

pub fn register(env: &Env) {
    register_fn(env, "+", 0, None, &[mask::NUMBER, mask::SAME_AS_REST], |args, _| {
        let mut sum = 0.0;
        for arg in args {
            match arg {
                Value::Number(n) => sum += n,
                _ => return Err(Error::lisp("Cannot add a non-numeric value.")),
            }
        }
        Ok(Value::Number(sum))
    });

    register_fn(env, "-", 1, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        match args {
            [Value::Number(x)] => Ok(Value::Number(-x)),
            [Value::Number(x), Value::Number(y)] => Ok(Value::Number(x - y)),
            _ => Err(Error::lisp("Cannot subtract a non-numeric value.")),
        }
    });

    register_fn(env, "*", 0, None, &[mask::NUMBER, mask::SAME_AS_REST], |args, _| {
        let mut product = 1.0;
        for arg in args {
            match arg {
                Value::Number(n) => product *= n,
                _ => return Err(Error::lisp("Cannot multiply a non-numeric value.")),
            }
        }
        Ok(Value::Number(product))
    });

    register_fn(env, "/", 1, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        let (x, y) = match args {
            [Value::Number(y)] => (1.0, *y),
            [Value::Number(x), Value::Number(y)] => (*x, *y),
            _ => return Err(Error::lisp("Cannot divide a non-numeric value.")),
        };
        if y == 0.0 {
            return Err(Error::lisp("Divided by 0"));
        }
        Ok(Value::Number(x / y))
    });

    register_fn(env, "abs", 1, Some(1), &[mask::NUMBER], |args, _| {
        match &args[0] {
            Value::Number(n) => Ok(Value::Number(n.abs())),
            _ => Err(Error::lisp("abs: expected number")),
        }
    });

    register_fn(env, "expt", 2, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        let (x, y) = match (&args[0], &args[1]) {
            (Value::Number(x), Value::Number(y)) => (*x, *y),
            _ => return Err(Error::lisp("expt: expected numbers")),
        };
        if x == 0.0 && y == 0.0 {
            return Err(Error::lisp("Not a number"));
        }
        if x == 0.0 && y < 0.0 {
            return Err(Error::lisp("Divided by 0"));
        }
        // A negative base with a non-integer exponent lands off the real
        // line.
        if x < 0.0 && y.trunc() != y {
            return Err(Error::lisp("Not a number"));
        }
        Ok(Value::Number(x.powf(y)))
    });

    register_fn(env, "quotient", 2, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        let (x, y) = match (&args[0], &args[1]) {
            (Value::Number(x), Value::Number(y)) => (*x, *y),
            _ => return Err(Error::lisp("quotient: expected numbers")),
        };
        if y == 0.0 {
            return Err(Error::lisp("Divided by 0"));
        }
        Ok(Value::Number(trunc_toward_zero(x / y)))
    });

    register_fn(env, "remainder", 2, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        let (x, y) = match (&args[0], &args[1]) {
            (Value::Number(x), Value::Number(y)) => (*x, *y),
            _ => return Err(Error::lisp("remainder: expected numbers")),
        };
        if y == 0.0 {
            return Err(Error::lisp("Divided by 0"));
        }
        Ok(Value::Number(x - y * trunc_toward_zero(x / y)))
    });

    register_fn(env, "modulo", 2, Some(2), &[mask::NUMBER, mask::NUMBER], |args, _| {
        let (x, y) = match (&args[0], &args[1]) {
            (Value::Number(x), Value::Number(y)) => (*x, *y),
            _ => return Err(Error::lisp("modulo: expected numbers")),
        };
        if y == 0.0 {
            return Err(Error::lisp("Divided by 0"));
        }
        // Result takes the divisor's sign.
        let mut result = x - trunc_toward_zero(x / y) * y;
        if result < 0.0 && y > 0.0 {
            result += y;
        }
        if result > 0.0 && y < 0.0 {
            result -= y;
        }
        Ok(Value::Number(result))
    });

    register_fn(env, "gcd", 0, None, &[mask::NUMBER, mask::SAME_AS_REST], |args, _| {
        let mut acc = 0i64;
        for arg in args {
            acc = gcd_i64(acc, integer_of("gcd", arg)?);
        }
        Ok(Value::Number(acc as f64))
    });

    register_fn(env, "lcm", 0, None, &[mask::NUMBER, mask::SAME_AS_REST], |args, _| {
        let mut acc = 1i64;
        for arg in args {
            let n = integer_of("lcm", arg)?;
            if n == 0 {
                acc = 0;
                continue;
            }
            if acc == 0 {
                continue;
            }
            acc = (acc / gcd_i64(acc, n) * n).abs();
        }
        Ok(Value::Number(acc as f64))
    });
}
