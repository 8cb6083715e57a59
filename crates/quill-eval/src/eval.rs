use std::rc::Rc;

use quill_core::{install_hooks, resolve, Env, Error, Lambda, Value};

use crate::special_forms;

/// Callable kinds only differ in how arity violations are worded.
#[derive(Clone, Copy)]
enum CallableKind {
    Procedure,
    Form,
}

impl CallableKind {
    fn noun(self) -> &'static str {
        match self {
            CallableKind::Procedure => "arguments",
            CallableKind::Form => "operands",
        }
    }
}

/// Rewrap the internal arity variants per callable kind; everything else
/// passes through.
fn reword_arity(e: Error, kind: CallableKind) -> Error {
    match e {
        Error::TooFewArgs { name, .. } => {
            Error::lisp(format!("{name}: too few {}", kind.noun()))
        }
        Error::TooManyArgs { name, .. } => {
            Error::lisp(format!("{name}: too many {}", kind.noun()))
        }
        other => other,
    }
}

/// Evaluate an expression in an environment.
///
/// Symbols look up through the chain, nil is an error, pairs are
/// applications, and everything else evaluates to itself. Arguments of a
/// procedure call are evaluated strictly left to right; special forms
/// receive their operands unevaluated.
pub fn eval_value(expr: &Value, env: &Env) -> Result<Value, Error> {
    match expr {
        Value::Symbol(name) => env
            .lookup(*name)
            .ok_or_else(|| Error::lisp(format!("Variable {} not defined.", resolve(*name)))),
        Value::Nil => Err(Error::lisp("Evaluating nil is prohibited.")),
        Value::Pair(pair) => {
            let func = eval_value(&pair.car, env)?;
            let operands = pair
                .cdr
                .list_to_vec()
                .ok_or_else(|| Error::lisp(format!("Malformed argument list: {expr}")))?;
            match &func {
                Value::SpecialForm(form) => {
                    form.sig
                        .check(&form.name, &operands)
                        .map_err(|e| reword_arity(e, CallableKind::Form))?;
                    (form.func)(&operands, env)
                }
                Value::Builtin(_) | Value::Lambda(_) => {
                    let mut args = Vec::with_capacity(operands.len());
                    for operand in &operands {
                        args.push(eval_value(operand, env)?);
                    }
                    apply(&func, &args, env)
                }
                other => Err(Error::lisp(format!("{other} is not a procedure"))),
            }
        }
        other => Ok(other.clone()),
    }
}

/// Apply a callable to already-evaluated arguments. Arity and type checks
/// run before the body. Shared with the `apply`/`map`/`filter`/`reduce`
/// builtins through the core hooks.
pub fn apply(func: &Value, args: &[Value], env: &Env) -> Result<Value, Error> {
    match func {
        Value::Builtin(proc) => {
            proc.sig
                .check(&proc.name, args)
                .map_err(|e| reword_arity(e, CallableKind::Procedure))?;
            (proc.func)(args, env)
        }
        Value::Lambda(lambda) => apply_lambda(lambda, args),
        Value::SpecialForm(form) => Err(Error::lisp(format!(
            "{}: special form cannot be applied to evaluated arguments",
            form.name
        ))),
        other => Err(Error::lisp(format!("{other} is not a procedure"))),
    }
}

/// Lambda application: a child of the captured environment binds the
/// parameters, then the body expressions run in order.
fn apply_lambda(lambda: &Lambda, args: &[Value]) -> Result<Value, Error> {
    let name = match lambda.name {
        Some(spur) => resolve(spur),
        None => "lambda".to_string(),
    };
    if args.len() < lambda.params.len() {
        return Err(Error::lisp(format!("{name}: too few arguments")));
    }
    if args.len() > lambda.params.len() {
        return Err(Error::lisp(format!("{name}: too many arguments")));
    }
    let call_env = lambda.env.create_child(&lambda.params, args);
    let mut result = Value::Nil;
    for expr in &lambda.body {
        result = eval_value(expr, &call_env)?;
    }
    Ok(result)
}

/// The interpreter holds the root environment, seeded with every special
/// form and builtin at construction.
pub struct Interpreter {
    pub global_env: Rc<Env>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let env = Env::new();
        special_forms::register(&env);
        quill_stdlib::register_stdlib(&env);
        install_hooks(eval_value, apply);
        Interpreter {
            global_env: Rc::new(env),
        }
    }

    pub fn eval(&self, expr: &Value) -> Result<Value, Error> {
        eval_value(expr, &self.global_env)
    }

    /// Evaluate every form in the input, returning the last result.
    pub fn eval_str(&self, input: &str) -> Result<Value, Error> {
        let exprs = quill_reader::read_many(input)?;
        let mut result = Value::Nil;
        for expr in &exprs {
            result = self.eval(expr)?;
        }
        Ok(result)
    }

    /// Evaluate every form in the input, returning all results in order
    /// (the REPL prints one per line).
    pub fn eval_str_all(&self, input: &str) -> Result<Vec<Value>, Error> {
        let exprs = quill_reader::read_many(input)?;
        let mut results = Vec::with_capacity(exprs.len());
        for expr in &exprs {
            results.push(self.eval(expr)?);
        }
        Ok(results)
    }
}
