use quill_core::{mask, Env, Value};

use crate::register_fn;

fn register_mask_predicate(env: &Env, name: &'static str, bits: u32) {
    register_fn(env, name, 1, Some(1), &[], move |args, _| {
        Ok(Value::Bool(args[0].type_mask() & bits != 0))
    });
}

pub fn register(env: &Env) {
    register_mask_predicate(env, "boolean?", mask::BOOL);
    register_mask_predicate(env, "number?", mask::NUMBER);
    register_mask_predicate(env, "char?", mask::CHAR);
    register_mask_predicate(env, "string?", mask::STRING);
    register_mask_predicate(env, "symbol?", mask::SYMBOL);
    register_mask_predicate(env, "null?", mask::NIL);
    register_mask_predicate(env, "pair?", mask::PAIR);
    register_mask_predicate(env, "vector?", mask::VECTOR);
    register_mask_predicate(env, "procedure?", mask::CALLABLE);
    register_mask_predicate(env, "atom?", mask::ATOM);

    // A proper list: nil, or a pair whose cdr is a list.
    register_fn(env, "list?", 1, Some(1), &[], |args, _| {
        Ok(Value::Bool(args[0].is_list()))
    });

    // Integer-ness is a predicate on the float.
    register_fn(env, "integer?", 1, Some(1), &[], |args, _| {
        Ok(Value::Bool(args[0].as_integer().is_some()))
    });
}

#[cfg(test)]
mod tests {
    use quill_core::{Env, Value};

    use crate::register_stdlib;

    fn check(name: &str, arg: Value) -> bool {
        let env = Env::new();
        register_stdlib(&env);
        match &env.lookup_str(name).unwrap() {
            Value::Builtin(p) => (p.func)(&[arg], &env).unwrap() == Value::Bool(true),
            _ => panic!("{name} is not a builtin"),
        }
    }

    #[test]
    fn test_tag_predicates() {
        assert!(check("boolean?", Value::Bool(true)));
        assert!(check("number?", Value::Number(1.0)));
        assert!(check("char?", Value::Char('a')));
        assert!(check("string?", Value::string("s")));
        assert!(check("symbol?", Value::symbol("s")));
        assert!(check("null?", Value::Nil));
        assert!(check("pair?", Value::cons(Value::Nil, Value::Nil)));
        assert!(check("vector?", Value::vector(vec![])));
        assert!(!check("pair?", Value::Nil));
        assert!(!check("number?", Value::string("1")));
    }

    #[test]
    fn test_atom_covers_small_types() {
        for v in [
            Value::Bool(true),
            Value::Number(1.0),
            Value::string("s"),
            Value::symbol("s"),
            Value::Nil,
            Value::Char('c'),
        ] {
            assert!(check("atom?", v));
        }
        assert!(!check("atom?", Value::cons(Value::Nil, Value::Nil)));
        assert!(!check("atom?", Value::vector(vec![])));
    }

    #[test]
    fn test_list_predicate() {
        assert!(check("list?", Value::Nil));
        assert!(check(
            "list?",
            Value::list_from_vec(vec![Value::Number(1.0)])
        ));
        assert!(!check(
            "list?",
            Value::cons(Value::Number(1.0), Value::Number(2.0))
        ));
    }

    #[test]
    fn test_integer_predicate() {
        assert!(check("integer?", Value::Number(3.0)));
        assert!(!check("integer?", Value::Number(3.5)));
        assert!(!check("integer?", Value::string("3")));
    }
}
