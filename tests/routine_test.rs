mod common;
use common::*;

#[test]
fn test_function_returns_via_name_slot() {
    let source = "FUNCTION f(n)\nf = n * n\nEND FUNCTION\nPRINT f(7)";
    assert_eq!(run(source), " 49 \n");
}

#[test]
fn test_function_return_statement_value() {
    let source = "FUNCTION half(n)\nRETURN n / 2\nEND FUNCTION\nPRINT half(9)";
    assert_eq!(run(source), " 4.5 \n");
}

#[test]
fn test_function_default_return_is_kind_default() {
    let source = "FUNCTION silent$(x)\nEND FUNCTION\nPRINT silent$(1); \"|\"";
    assert_eq!(run(source), "|\n");
}

#[test]
fn test_function_suffix_fixes_return_kind() {
    let source = "FUNCTION third%(n)\nthird% = n / 3\nEND FUNCTION\nPRINT third%(10)";
    assert_eq!(run(source), " 3 \n");
}

#[test]
fn test_sub_call_forms() {
    let source = "SUB shout(w$)\nPRINT w$; \"!\"\nEND SUB\nshout \"hey\"\nCALL shout(\"ho\")";
    assert_eq!(run(source), "hey!\nho!\n");
}

#[test]
fn test_sub_parameters_bind_by_value() {
    let source = "SUB bump(n)\nn = n + 1\nEND SUB\nx = 5\nbump x\nPRINT x";
    assert_eq!(run(source), " 5 \n");
}

#[test]
fn test_locals_do_not_leak() {
    let source = "SUB work\ntemp = 99\nEND SUB\nwork\nPRINT temp";
    assert_eq!(run(source), " 0 \n");
}

#[test]
fn test_module_variables_visible_in_routines() {
    let source = "base = 10\nFUNCTION plus(n)\nplus = base + n\nEND FUNCTION\nPRINT plus(5)";
    assert_eq!(run(source), " 15 \n");
}

#[test]
fn test_shared_assignment_targets_module_scope() {
    let source = "DIM SHARED total\nSUB add(n)\ntotal = total + n\nEND SUB\nadd 3\nadd 4\nPRINT total";
    assert_eq!(run(source), " 7 \n");
}

#[test]
fn test_exit_sub_and_exit_function() {
    let source = "SUB partial\nPRINT \"in\"\nEXIT SUB\nPRINT \"never\"\nEND SUB\npartial";
    assert_eq!(run(source), "in\n");
    let source = "FUNCTION pick(n)\npick = 1\nIF n > 0 THEN EXIT FUNCTION\npick = 2\nEND FUNCTION\nPRINT pick(5); pick(-5)";
    assert_eq!(run(source), " 1  2 \n");
}

#[test]
fn test_recursion() {
    let source = "FUNCTION fact(n)\nIF n <= 1 THEN fact = 1 ELSE fact = n * fact(n - 1)\nEND FUNCTION\nPRINT fact(6)";
    assert_eq!(run(source), " 720 \n");
}

#[test]
fn test_missing_arguments_default() {
    let source = "SUB show(a, b$)\nPRINT a; b$; \"|\"\nEND SUB\nshow 1";
    assert_eq!(run(source), " 1 |\n");
}

#[test]
fn test_undefined_sub_reports() {
    assert!(run("frobnicate 1").starts_with("?UNDEFINED NAME; UNDEFINED SUB"));
}

#[test]
fn test_byval_marker_is_accepted() {
    let source = "SUB eat(BYVAL n)\nPRINT n\nEND SUB\neat 3";
    assert_eq!(run(source), " 3 \n");
}

#[test]
fn test_static_marker_is_accepted() {
    let source = "SUB s STATIC\nPRINT 1\nEND SUB\ns";
    assert_eq!(run(source), " 1 \n");
}

#[test]
fn test_top_level_definitions_are_inert() {
    // definitions run only when called
    let source = "PRINT \"a\"\nSUB noisy\nPRINT \"never\"\nEND SUB\nPRINT \"b\"";
    assert_eq!(run(source), "a\nb\n");
}
