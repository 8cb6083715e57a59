use quill_core::{intern, mask, resolve, Env, Error, Lambda, NativeProc, Promise, Signature, Spur, Value};

use crate::eval::eval_value;

/// Bind every special form into the root environment. Forms are ordinary
/// values carrying their own arity bounds and operand masks, so they are
/// first-class and shadowable, and the evaluator dispatches on the value
/// the head position evaluates to.
pub fn register(env: &Env) {
    register_form(env, "quote", 1, Some(1), &[], eval_quote);
    register_form(env, "if", 2, Some(3), &[], eval_if);
    register_form(
        env,
        "define",
        2,
        None,
        &[mask::SYMBOL | mask::PAIR, mask::ANY],
        eval_define,
    );
    register_form(env, "set!", 2, Some(2), &[mask::SYMBOL, mask::ANY], eval_set);
    register_form(env, "lambda", 2, None, &[mask::LIST], eval_lambda);
    register_form(env, "begin", 1, None, &[], eval_begin);
    register_form(env, "and", 0, None, &[], eval_and);
    register_form(env, "or", 0, None, &[], eval_or);
    register_form(
        env,
        "cond",
        0,
        None,
        &[mask::PAIR, mask::SAME_AS_REST],
        eval_cond,
    );
    register_form(env, "let", 2, None, &[], eval_let);
    register_form(env, "let*", 2, None, &[mask::LIST], eval_let_star);
    register_form(env, "letrec", 2, None, &[mask::LIST], eval_letrec);
    register_form(env, "do", 2, None, &[mask::LIST, mask::PAIR], eval_do);
    register_form(env, "delay", 1, Some(1), &[], eval_delay);
    register_form(env, "quasiquote", 1, Some(1), &[], eval_quasiquote);
}

fn register_form(
    env: &Env,
    name: &str,
    min: usize,
    max: Option<usize>,
    masks: &[u32],
    f: fn(&[Value], &Env) -> Result<Value, Error>,
) {
    env.define(
        intern(name),
        Value::special_form(NativeProc::new(name, Signature::new(min, max, masks), f)),
    );
}

fn eval_quote(args: &[Value], _env: &Env) -> Result<Value, Error> {
    Ok(args[0].clone())
}

fn eval_if(args: &[Value], env: &Env) -> Result<Value, Error> {
    let cond = eval_value(&args[0], env)?;
    if cond.is_truthy() {
        eval_value(&args[1], env)
    } else if let Some(alt) = args.get(2) {
        eval_value(alt, env)
    } else {
        Ok(Value::Nil)
    }
}

fn eval_define(args: &[Value], env: &Env) -> Result<Value, Error> {
    if let Some(name) = args[0].as_symbol_spur() {
        // (define name expr)
        if args.len() != 2 {
            return Err(Error::lisp("define: too many operands"));
        }
        let val = eval_value(&args[1], env)?;
        env.define(name, val);
        Ok(Value::Nil)
    } else {
        // (define (name params...) body...) — sugar for a named lambda
        let signature = args[0]
            .list_to_vec()
            .ok_or_else(|| Error::lisp(format!("Malformed define form: {}", args[0])))?;
        let name_val = signature
            .first()
            .ok_or_else(|| Error::lisp("Malformed define form: empty signature"))?;
        let name = name_val.as_symbol_spur().ok_or_else(|| {
            Error::lisp(format!(
                "In lambda definition, {name_val} is not a symbol name"
            ))
        })?;
        let params = parse_params(&signature[1..])?;
        env.define(
            name,
            Value::lambda(Lambda {
                params,
                body: args[1..].to_vec(),
                env: env.clone(),
                name: Some(name),
            }),
        );
        Ok(Value::Symbol(name))
    }
}

fn eval_set(args: &[Value], env: &Env) -> Result<Value, Error> {
    let name = args[0]
        .as_symbol_spur()
        .ok_or_else(|| Error::lisp("set!: name must be a symbol"))?;
    let val = eval_value(&args[1], env)?;
    if !env.assign(name, val) {
        return Err(Error::lisp(format!(
            "Variable {} not defined.",
            resolve(name)
        )));
    }
    Ok(Value::Nil)
}

fn parse_params(params: &[Value]) -> Result<Vec<Spur>, Error> {
    params
        .iter()
        .map(|p| {
            p.as_symbol_spur().ok_or_else(|| {
                Error::lisp(format!("Expect symbol in lambda parameter, found {p}"))
            })
        })
        .collect()
}

fn eval_lambda(args: &[Value], env: &Env) -> Result<Value, Error> {
    let param_list = args[0]
        .list_to_vec()
        .ok_or_else(|| Error::lisp(format!("Malformed lambda parameter list: {}", args[0])))?;
    let params = parse_params(&param_list)?;
    Ok(Value::lambda(Lambda {
        params,
        body: args[1..].to_vec(),
        env: env.clone(),
        name: None,
    }))
}

fn eval_begin(args: &[Value], env: &Env) -> Result<Value, Error> {
    let mut result = Value::Nil;
    for expr in args {
        result = eval_value(expr, env)?;
    }
    Ok(result)
}

fn eval_and(args: &[Value], env: &Env) -> Result<Value, Error> {
    let mut result = Value::Bool(true);
    for expr in args {
        result = eval_value(expr, env)?;
        if !result.is_truthy() {
            break;
        }
    }
    Ok(result)
}

fn eval_or(args: &[Value], env: &Env) -> Result<Value, Error> {
    let mut result = Value::Bool(false);
    for expr in args {
        result = eval_value(expr, env)?;
        if result.is_truthy() {
            break;
        }
    }
    Ok(result)
}

fn eval_cond(args: &[Value], env: &Env) -> Result<Value, Error> {
    let else_spur = intern("else");

    // Validate clause shape up front: every clause is a non-empty list and
    // `else` appears only in last position.
    let mut clauses = Vec::with_capacity(args.len());
    for (i, clause) in args.iter().enumerate() {
        let items = clause
            .list_to_vec()
            .ok_or_else(|| Error::lisp(format!("Malformed cond clause: {clause}")))?;
        if items.is_empty() {
            return Err(Error::lisp("Malformed cond clause: empty clause"));
        }
        let is_else = items[0].as_symbol_spur() == Some(else_spur);
        if is_else && i != args.len() - 1 {
            return Err(Error::lisp("else clause must be the last one."));
        }
        clauses.push((items, is_else));
    }

    for (items, is_else) in &clauses {
        let test = if *is_else {
            Value::Bool(true)
        } else {
            eval_value(&items[0], env)?
        };
        if test.is_truthy() {
            // A clause with only a test yields the test's value.
            let mut result = test;
            for expr in &items[1..] {
                result = eval_value(expr, env)?;
            }
            return Ok(result);
        }
    }
    Ok(Value::Nil)
}

/// One (name expr) binding out of a let-family binding list.
fn binding_parts(binding: &Value, form: &str) -> Result<(Spur, Value), Error> {
    let pair = binding
        .list_to_vec()
        .ok_or_else(|| Error::lisp(format!("{form}: each binding must be a list")))?;
    if pair.len() != 2 {
        return Err(Error::lisp(format!(
            "{form}: each binding must have 2 elements"
        )));
    }
    let name = pair[0]
        .as_symbol_spur()
        .ok_or_else(|| Error::lisp(format!("{form}: binding name must be a symbol")))?;
    Ok((name, pair[1].clone()))
}

fn eval_let(args: &[Value], env: &Env) -> Result<Value, Error> {
    // Named let: (let loop ((n v)...) body...)
    if let Some(loop_name) = args[0].as_symbol_spur() {
        if args.len() < 3 {
            return Err(Error::lisp("let: too few operands"));
        }
        let bindings = args[1]
            .list_to_vec()
            .ok_or_else(|| Error::lisp("let: bindings must be a list"))?;
        let mut params = Vec::with_capacity(bindings.len());
        let mut inits = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            let (name, init) = binding_parts(binding, "let")?;
            params.push(name);
            inits.push(eval_value(&init, env)?);
        }

        // The lambda captures a frame that binds its own name, so the
        // body can self-recur.
        let loop_env = env.child();
        let lambda = Value::lambda(Lambda {
            params,
            body: args[2..].to_vec(),
            env: loop_env.clone(),
            name: Some(loop_name),
        });
        loop_env.define(loop_name, lambda.clone());
        return crate::eval::apply(&lambda, &inits, env);
    }

    // Plain let: bindings evaluated in the outer env, body in the child.
    let bindings = args[0]
        .list_to_vec()
        .ok_or_else(|| Error::lisp("let: bindings must be a list"))?;
    let new_env = env.child();
    for binding in &bindings {
        let (name, init) = binding_parts(binding, "let")?;
        let val = eval_value(&init, env)?;
        new_env.define(name, val);
    }
    eval_begin(&args[1..], &new_env)
}

fn eval_let_star(args: &[Value], env: &Env) -> Result<Value, Error> {
    let bindings = args[0]
        .list_to_vec()
        .ok_or_else(|| Error::lisp("let*: bindings must be a list"))?;
    let new_env = env.child();
    for binding in &bindings {
        let (name, init) = binding_parts(binding, "let*")?;
        // Sequential: each init sees the bindings before it.
        let val = eval_value(&init, &new_env)?;
        new_env.define(name, val);
    }
    eval_begin(&args[1..], &new_env)
}

fn eval_letrec(args: &[Value], env: &Env) -> Result<Value, Error> {
    let bindings = args[0]
        .list_to_vec()
        .ok_or_else(|| Error::lisp("letrec: bindings must be a list"))?;
    let new_env = env.child();

    // Pass 1: pre-bind every name to nil.
    let mut parts = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let (name, init) = binding_parts(binding, "letrec")?;
        new_env.define(name, Value::Nil);
        parts.push((name, init));
    }
    // Pass 2: evaluate each init in the child and overwrite.
    for (name, init) in parts {
        let val = eval_value(&init, &new_env)?;
        new_env.define(name, val);
    }
    eval_begin(&args[1..], &new_env)
}

fn eval_do(args: &[Value], env: &Env) -> Result<Value, Error> {
    let inits = args[0]
        .list_to_vec()
        .ok_or_else(|| Error::lisp("do: bindings must be a list"))?;
    let test_clause = args[1]
        .list_to_vec()
        .ok_or_else(|| Error::lisp("do: test clause must be a list"))?;
    if test_clause.is_empty() {
        return Err(Error::lisp("do: test clause must not be empty"));
    }

    let loop_env = env.child();
    let mut steps: Vec<(Spur, Option<Value>)> = Vec::with_capacity(inits.len());
    for init in &inits {
        let items = init
            .list_to_vec()
            .ok_or_else(|| Error::lisp("do: each binding must be a list"))?;
        if items.len() < 2 || items.len() > 3 {
            return Err(Error::lisp(
                "do: each binding must be (name init) or (name init step)",
            ));
        }
        let name = items[0]
            .as_symbol_spur()
            .ok_or_else(|| Error::lisp("do: binding name must be a symbol"))?;
        let val = eval_value(&items[1], &loop_env)?;
        loop_env.define(name, val);
        steps.push((name, items.get(2).cloned()));
    }

    while !eval_value(&test_clause[0], &loop_env)?.is_truthy() {
        for expr in &args[2..] {
            eval_value(expr, &loop_env)?;
        }
        // Steps update sequentially in the loop frame.
        for (name, step) in &steps {
            if let Some(step) = step {
                let val = eval_value(step, &loop_env)?;
                loop_env.define(*name, val);
            }
        }
    }

    eval_begin(&test_clause[1..], &loop_env)
}

fn eval_delay(args: &[Value], env: &Env) -> Result<Value, Error> {
    Ok(Value::promise(Promise {
        body: args[0].clone(),
        env: env.clone(),
        forced: std::cell::RefCell::new(None),
    }))
}

fn eval_quasiquote(args: &[Value], env: &Env) -> Result<Value, Error> {
    expand_quasiquote(&args[0], env, 1)
}

fn head_symbol(items: &[Value]) -> Option<String> {
    items.first().and_then(|v| v.as_symbol())
}

/// Quasiquote expansion with depth tracking: `unquote` and
/// `unquote-splicing` fire only at depth 1; deeper occurrences are
/// rebuilt with the depth adjusted. Non-list subforms come back verbatim.
fn expand_quasiquote(val: &Value, env: &Env, depth: usize) -> Result<Value, Error> {
    let Some(items) = val.list_to_vec() else {
        return Ok(val.clone());
    };
    if items.is_empty() {
        return Ok(val.clone());
    }

    match head_symbol(&items).as_deref() {
        Some("unquote") => {
            if items.len() != 2 {
                return Err(Error::lisp("unquote expects a single expression"));
            }
            if depth == 1 {
                return eval_value(&items[1], env);
            }
            let inner = expand_quasiquote(&items[1], env, depth - 1)?;
            return Ok(Value::list_from_vec(vec![Value::symbol("unquote"), inner]));
        }
        Some("quasiquote") => {
            if items.len() == 2 {
                let inner = expand_quasiquote(&items[1], env, depth + 1)?;
                return Ok(Value::list_from_vec(vec![
                    Value::symbol("quasiquote"),
                    inner,
                ]));
            }
        }
        _ => {}
    }

    let mut result = Vec::with_capacity(items.len());
    for item in &items {
        let splice_body = item.list_to_vec().filter(|xs| {
            head_symbol(xs).as_deref() == Some("unquote-splicing")
        });
        if let Some(inner) = splice_body {
            if inner.len() != 2 {
                return Err(Error::lisp("unquote-splicing expects a single expression"));
            }
            if depth == 1 {
                let spliced = eval_value(&inner[1], env)?;
                let elements = spliced
                    .list_to_vec()
                    .ok_or_else(|| Error::lisp(format!("Expect list, got {spliced}")))?;
                result.extend(elements);
            } else {
                let deeper = expand_quasiquote(&inner[1], env, depth - 1)?;
                result.push(Value::list_from_vec(vec![
                    Value::symbol("unquote-splicing"),
                    deeper,
                ]));
            }
            continue;
        }
        result.push(expand_quasiquote(item, env, depth)?);
    }
    Ok(Value::list_from_vec(result))
}
