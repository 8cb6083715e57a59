mod common;

use common::{eval, eval_err, eval_to_string};
use quill_core::Value;

#[test]
fn test_lambda_with_no_parameters() {
    assert_eq!(eval_to_string("((lambda () 42))"), "42");
}

#[test]
fn test_let_with_empty_bindings() {
    assert_eq!(eval_to_string("(let () 1)"), "1");
}

#[test]
fn test_nested_let_shadows() {
    assert_eq!(eval_to_string("(let ((x 1)) (let ((x 2)) x))"), "2");
    assert_eq!(eval_to_string("(let ((x 1)) (let ((y 2)) (+ x y)))"), "3");
}

#[test]
fn test_builtin_names_can_be_shadowed() {
    assert_eq!(eval_to_string("(define list 5) list"), "5");
    assert_eq!(eval_to_string("(let ((car 1)) car)"), "1");
}

#[test]
fn test_do_with_no_bindings() {
    assert_eq!(eval_to_string("(do () (#t 5))"), "5");
}

#[test]
fn test_cond_else_alone() {
    assert_eq!(eval("(cond (else))"), Value::Bool(true));
}

#[test]
fn test_quasiquote_nested_structure() {
    assert_eq!(eval_to_string("`(1 (2 ,(+ 1 2)))"), "(1 (2 3))");
    assert_eq!(eval_to_string("`,(+ 1 2)"), "3");
    assert_eq!(
        eval_to_string("`(,@(map (lambda (x) (* x 10)) '(1 2)))"),
        "(10 20)"
    );
}

#[test]
fn test_force_memoizes_and_marks_promise() {
    assert_eq!(eval_to_string("(force (delay (+ 1 2)))"), "3");
    assert_eq!(
        eval_to_string("(define p (delay 1)) (force p) p"),
        "#<promise (forced)>"
    );
}

#[test]
fn test_force_requires_promise() {
    assert!(eval_err("(force 1)").to_string().contains("expected promise"));
}

#[test]
fn test_apply_with_builtins_and_lambdas() {
    assert_eq!(eval_to_string("(apply cons '(1 2))"), "(1 . 2)");
    assert_eq!(
        eval_to_string("(apply (lambda (a b c) (* a (+ b c))) '(2 3 4))"),
        "14"
    );
}

#[test]
fn test_procedure_predicate_covers_callables() {
    assert_eq!(eval("(procedure? car)"), Value::Bool(true));
    assert_eq!(eval("(procedure? (lambda (x) x))"), Value::Bool(true));
    assert_eq!(eval("(procedure? if)"), Value::Bool(true));
    assert_eq!(eval("(procedure? 1)"), Value::Bool(false));
}

#[test]
fn test_closures_share_their_defining_frame() {
    assert_eq!(
        eval_to_string(
            "(define (make-account balance)
               (lambda (amount)
                 (set! balance (- balance amount))
                 balance))
             (define withdraw (make-account 100))
             (withdraw 30)
             (withdraw 30)"
        ),
        "40"
    );
}

#[test]
fn test_recursive_definitions() {
    assert_eq!(
        eval_to_string(
            "(define (fib n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))
             (fib 12)"
        ),
        "144"
    );
    assert_eq!(
        eval_to_string(
            "(define (len l) (if (null? l) 0 (+ 1 (len (cdr l)))))
             (len '(a b c d))"
        ),
        "4"
    );
}

#[test]
fn test_do_loop_builds_a_list() {
    // Steps update in order: acc conses the already-stepped i.
    assert_eq!(
        eval_to_string(
            "(do ((i 0 (+ i 1))
                  (acc '() (cons i acc)))
                 ((= i 4) acc))"
        ),
        "(4 3 2 1)"
    );
}

#[test]
fn test_define_sugar_names_appear_in_arity_errors() {
    let err = eval_err("(define (f x) x) (f 1 2)");
    assert!(err.to_string().contains("f: too many arguments"));
}

#[test]
fn test_integerness_is_a_predicate_on_floats() {
    assert_eq!(eval("(integer? 3.0)"), Value::Bool(true));
    assert_eq!(eval("(integer? (/ 10 4))"), Value::Bool(false));
    assert_eq!(eval("(integer? (/ 10 2))"), Value::Bool(true));
}

#[test]
fn test_number_print_form_collapses_integral_floats() {
    assert_eq!(eval_to_string("(/ 10 2)"), "5");
    assert_eq!(eval_to_string("(/ 10 4)"), "2.5");
    assert_eq!(eval_to_string("(* 1.5 2)"), "3");
}
