use quill_core::{mask, Env, Error, Value};

use crate::register_fn;

fn index_arg(name: &str, arg: &Value) -> Result<usize, Error> {
    match arg.as_integer() {
        Some(n) if n >= 0 => Ok(n as usize),
        _ => Err(Error::lisp(format!(
            "{name}: expected a non-negative integer index, got {arg}"
        ))),
    }
}

pub fn register(env: &Env) {
    register_fn(
        env,
        "make-vector",
        1,
        Some(2),
        &[mask::NUMBER, mask::ANY],
        |args, _| {
            let k = index_arg("make-vector", &args[0])?;
            let fill = args.get(1).cloned().unwrap_or(Value::Nil);
            Ok(Value::vector(vec![fill; k]))
        },
    );

    register_fn(env, "vector", 0, None, &[], |args, _| {
        Ok(Value::vector(args.to_vec()))
    });

    register_fn(env, "vector-length", 1, Some(1), &[mask::VECTOR], |args, _| {
        let v = args[0]
            .as_vector_rc()
            .ok_or_else(|| Error::lisp("vector-length: expected vector"))?;
        let len = v.borrow().len();
        Ok(Value::Number(len as f64))
    });

    register_fn(
        env,
        "vector-ref",
        2,
        Some(2),
        &[mask::VECTOR, mask::NUMBER],
        |args, _| {
            let v = args[0]
                .as_vector_rc()
                .ok_or_else(|| Error::lisp("vector-ref: expected vector"))?;
            let i = index_arg("vector-ref", &args[1])?;
            let items = v.borrow();
            items
                .get(i)
                .cloned()
                .ok_or_else(|| Error::lisp(format!("vector-ref: index {i} out of range")))
        },
    );

    register_fn(
        env,
        "vector-set!",
        3,
        Some(3),
        &[mask::VECTOR, mask::NUMBER, mask::ANY],
        |args, _| {
            let v = args[0]
                .as_vector_rc()
                .ok_or_else(|| Error::lisp("vector-set!: expected vector"))?;
            let i = index_arg("vector-set!", &args[1])?;
            let mut items = v.borrow_mut();
            match items.get_mut(i) {
                Some(slot) => {
                    *slot = args[2].clone();
                    Ok(Value::Nil)
                }
                None => Err(Error::lisp(format!("vector-set!: index {i} out of range"))),
            }
        },
    );

    register_fn(env, "vector->list", 1, Some(1), &[mask::VECTOR], |args, _| {
        let v = args[0]
            .as_vector_rc()
            .ok_or_else(|| Error::lisp("vector->list: expected vector"))?;
        let items = v.borrow().clone();
        Ok(Value::list_from_vec(items))
    });

    register_fn(env, "list->vector", 1, Some(1), &[mask::LIST], |args, _| {
        let items = args[0]
            .list_to_vec()
            .ok_or_else(|| Error::lisp(format!("Expect list, got {}", args[0])))?;
        Ok(Value::vector(items))
    });

    register_fn(
        env,
        "vector-fill!",
        2,
        Some(2),
        &[mask::VECTOR, mask::ANY],
        |args, _| {
            let v = args[0]
                .as_vector_rc()
                .ok_or_else(|| Error::lisp("vector-fill!: expected vector"))?;
            for slot in v.borrow_mut().iter_mut() {
                *slot = args[1].clone();
            }
            Ok(Value::Nil)
        },
    );
}
