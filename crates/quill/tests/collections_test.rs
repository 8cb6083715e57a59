mod common;

use common::{eval, eval_err, eval_to_string};
use quill_core::Value;

#[test]
fn test_list_construction_and_access() {
    assert_eq!(eval_to_string("(list 1 2 (+ 1 2))"), "(1 2 3)");
    assert_eq!(eval_to_string("(cons 1 2)"), "(1 . 2)");
    assert_eq!(eval_to_string("(car (cdr '(1 2 3)))"), "2");
    assert_eq!(eval_to_string("(cons 1 (cons 2 '()))"), "(1 2)");
}

#[test]
fn test_append_chains() {
    assert_eq!(eval_to_string("(append '(1 2) '(3) '())"), "(1 2 3)");
    assert_eq!(eval_to_string("(append)"), "()");
    assert_eq!(eval_to_string("(append '() '(1))"), "(1)");
    assert_eq!(eval_to_string("(length (append '(1 2) '(3 4 5)))"), "5");
}

#[test]
fn test_list_and_pair_predicates() {
    assert_eq!(eval("(list? (cons 1 '()))"), Value::Bool(true));
    assert_eq!(eval("(pair? '())"), Value::Bool(false));
    assert_eq!(eval("(null? '())"), Value::Bool(true));
    assert_eq!(eval("(list? (cons 1 2))"), Value::Bool(false));
}

#[test]
fn test_map_over_structure() {
    assert_eq!(eval_to_string("(map car '((1 2) (3 4)))"), "(1 3)");
    assert_eq!(
        eval_to_string("(map (lambda (a b) (+ a b)) '(1 2 3) '(10 20 30))"),
        "(11 22 33)"
    );
}

#[test]
fn test_filter_and_reduce_compose() {
    assert_eq!(
        eval_to_string("(reduce + (filter even? '(1 2 3 4 5 6)))"),
        "12"
    );
    assert_eq!(eval_to_string("(reduce * '(1 2 3 4))"), "24");
}

#[test]
fn test_string_operations_end_to_end() {
    assert_eq!(
        eval_to_string("(string-append (make-string 2 #\\a) \"bc\")"),
        "\"aabc\""
    );
    assert_eq!(eval_to_string("(substring \"hello world\" 6 11)"), "\"world\"");
    assert_eq!(eval_to_string("(string->list \"ab\")"), "(#\\a #\\b)");
    assert_eq!(
        eval_to_string("(list->string (map char-upcase (string->list \"ab\")))"),
        "\"AB\""
    );
    assert_eq!(eval_to_string("(string-length (string #\\a #\\b))"), "2");
}

#[test]
fn test_string_comparisons_end_to_end() {
    assert_eq!(eval("(string<? \"abc\" \"abd\")"), Value::Bool(true));
    assert_eq!(eval("(string-ci=? \"Hello\" \"hello\")"), Value::Bool(true));
    assert_eq!(eval("(string=? \"a\" \"a\")"), Value::Bool(true));
}

#[test]
fn test_vector_operations_end_to_end() {
    assert_eq!(eval_to_string("(vector-ref (list->vector '(1 2 3)) 2)"), "3");
    assert_eq!(eval_to_string("(vector->list #(1 2))"), "(1 2)");
    assert_eq!(eval_to_string("(vector-length #(1 2 3))"), "3");
    assert_eq!(
        eval_to_string("(define v (make-vector 2 \"x\")) (vector-fill! v 0) v"),
        "#(0 0)"
    );
}

#[test]
fn test_char_operations_end_to_end() {
    assert_eq!(eval_to_string("(char->integer #\\a)"), "97");
    assert_eq!(eval_to_string("(integer->char 65)"), "#\\A");
    assert_eq!(eval_to_string("(char-upcase #\\a)"), "#\\A");
    assert_eq!(eval("(char<? #\\a #\\b)"), Value::Bool(true));
    assert_eq!(eval("(char-ci=? #\\A #\\a)"), Value::Bool(true));
    assert_eq!(eval("(char-whitespace? #\\space)"), Value::Bool(true));
    assert_eq!(eval("(char-numeric? #\\7)"), Value::Bool(true));
}

#[test]
fn test_eq_vs_equal_on_fresh_literals() {
    // Two distinct literals are structurally equal but not identical.
    assert_eq!(eval("(equal? '(1 2) '(1 2))"), Value::Bool(true));
    assert_eq!(eval("(eq? '(1 2) '(1 2))"), Value::Bool(false));
    assert_eq!(
        eval("(define l '(1 2)) (eq? l l)"),
        Value::Bool(true)
    );
    // Small atoms compare by value under eq?.
    assert_eq!(eval("(eq? 'a 'a)"), Value::Bool(true));
    assert_eq!(eval("(eq? #\\x #\\x)"), Value::Bool(true));
}

#[test]
fn test_out_of_range_accesses() {
    assert!(eval_err("(vector-ref #(1) 1)").to_string().contains("out of range"));
    assert!(eval_err("(string-ref \"a\" 1)").to_string().contains("out of range"));
    assert!(eval_err("(list->string '(1 2))")
        .to_string()
        .contains("expected char"));
}

#[test]
fn test_length_requires_proper_list() {
    assert!(eval_err("(length (cons 1 2))")
        .to_string()
        .contains("Malformed list"));
}
