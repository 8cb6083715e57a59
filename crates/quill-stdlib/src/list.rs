use quill_core::{apply_callback, mask, Env, Error, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // cons shares both arguments, no copy.
    register_fn(env, "cons", 2, Some(2), &[], |args, _| {
        Ok(Value::cons(args[0].clone(), args[1].clone()))
    });

    register_fn(env, "car", 1, Some(1), &[], |args, _| match &args[0] {
        Value::Pair(p) => Ok(p.car.clone()),
        _ => Err(Error::lisp("Argument is not pair.")),
    });

    register_fn(env, "cdr", 1, Some(1), &[], |args, _| match &args[0] {
        Value::Pair(p) => Ok(p.cdr.clone()),
        _ => Err(Error::lisp("Argument is not pair.")),
    });

    // A fresh list whose elements are copies.
    register_fn(env, "list", 0, None, &[], |args, _| {
        Ok(Value::list_from_vec(args.iter().map(Value::copy).collect()))
    });

    register_fn(env, "length", 1, Some(1), &[], |args, _| {
        match args[0].list_to_vec() {
            Some(items) => Ok(Value::Number(items.len() as f64)),
            None => Err(Error::lisp(format!(
                "Malformed list: expected pair or nil, got {}",
                args[0]
            ))),
        }
    });

    // All but the last list are element-wise copied; the last is shared.
    register_fn(env, "append", 0, None, &[], |args, _| {
        let Some((last, front)) = args.split_last() else {
            return Ok(Value::Nil);
        };
        let mut elements = Vec::new();
        for arg in front {
            let items = arg
                .list_to_vec()
                .ok_or_else(|| Error::lisp(format!("Expect list, got {arg}")))?;
            elements.extend(items.iter().map(Value::copy));
        }
        let mut result = last.clone();
        for element in elements.into_iter().rev() {
            result = Value::cons(element, result);
        }
        Ok(result)
    });

    register_fn(
        env,
        "map",
        2,
        None,
        &[mask::CALLABLE, mask::LIST, mask::SAME_AS_REST],
        |args, env| {
            let func = &args[0];
            let mut lists = Vec::with_capacity(args.len() - 1);
            for arg in &args[1..] {
                lists.push(
                    arg.list_to_vec()
                        .ok_or_else(|| Error::lisp(format!("Expect list, got {arg}")))?,
                );
            }
            let len = lists[0].len();
            if lists.iter().any(|l| l.len() != len) {
                return Err(Error::lisp("map: lists must have equal length"));
            }
            let mut result = Vec::with_capacity(len);
            for i in 0..len {
                let tuple: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
                result.push(apply_callback(func, &tuple, env)?.copy());
            }
            Ok(Value::list_from_vec(result))
        },
    );

    register_fn(
        env,
        "filter",
        2,
        Some(2),
        &[mask::CALLABLE, mask::LIST],
        |args, env| {
            let items = args[1]
                .list_to_vec()
                .ok_or_else(|| Error::lisp(format!("Expect list, got {}", args[1])))?;
            let mut kept = Vec::new();
            for item in items {
                if apply_callback(&args[0], &[item.clone()], env)?.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::list_from_vec(kept))
        },
    );

    // Right fold: (reduce f (a b c)) = (f a (f b c)).
    register_fn(
        env,
        "reduce",
        2,
        Some(2),
        &[mask::CALLABLE, mask::LIST],
        |args, env| {
            let items = args[1]
                .list_to_vec()
                .ok_or_else(|| Error::lisp(format!("Expect list, got {}", args[1])))?;
            let Some((last, front)) = items.split_last() else {
                return Err(Error::lisp("reduce: cannot reduce an empty list"));
            };
            let mut acc = last.clone();
            for item in front.iter().rev() {
                acc = apply_callback(&args[0], &[item.clone(), acc], env)?;
            }
            Ok(acc)
        },
    );
}
