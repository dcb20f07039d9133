mod common;
use common::*;

#[test]
fn test_array_round_trip() {
    let source = "DIM a(10)\n\
                  FOR i = 0 TO 10\na(i) = i\nNEXT\n\
                  ok = -1\n\
                  FOR i = 0 TO 10\nIF a(i) <> i THEN ok = 0\nNEXT\n\
                  PRINT ok";
    assert_eq!(run(source), "-1 \n");
}

#[test]
fn test_array_kinds() {
    assert_eq!(run("DIM n%(3)\nn%(1) = 2.9\nPRINT n%(1)"), " 2 \n");
    assert_eq!(run("DIM s$(2)\ns$(0) = \"hi\"\nPRINT s$(0)"), "hi\n");
    assert_eq!(run("DIM d(2) AS DOUBLE\nd(0) = 1\nPRINT d(0) + 0.5"), " 1.5 \n");
}

#[test]
fn test_multi_dimensional_row_major() {
    let source = "DIM g(2, 3)\n\
                  FOR r = 0 TO 2\nFOR c = 0 TO 3\ng(r, c) = r * 10 + c\nNEXT c\nNEXT r\n\
                  PRINT g(2, 3); g(0, 1)";
    assert_eq!(run(source), " 23  1 \n");
}

#[test]
fn test_subscript_out_of_range() {
    assert!(run("DIM a(3)\nPRINT a(4)").starts_with("?SUBSCRIPT OUT OF RANGE"));
    assert!(run("DIM a(3)\nPRINT a(-1)").starts_with("?SUBSCRIPT OUT OF RANGE"));
}

#[test]
fn test_wrong_subscript_count() {
    assert!(run("DIM a(3, 3)\nPRINT a(1)")
        .starts_with("?SUBSCRIPT OUT OF RANGE; WRONG NUMBER OF SUBSCRIPTS"));
}

#[test]
fn test_redim_preserve_keeps_shared_indices() {
    let source = "DIM a(5)\n\
                  FOR i = 0 TO 5\na(i) = i + 1\nNEXT\n\
                  REDIM PRESERVE a(8)\n\
                  PRINT a(5); a(8)";
    assert_eq!(run(source), " 6  0 \n");
}

#[test]
fn test_redim_preserve_shrinks() {
    let source = "DIM a(5)\na(2) = 9\nREDIM PRESERVE a(2)\nPRINT a(2)";
    assert_eq!(run(source), " 9 \n");
}

#[test]
fn test_redim_without_preserve_zeroes() {
    let source = "DIM a(5)\na(2) = 9\nREDIM a(5)\nPRINT a(2)";
    assert_eq!(run(source), " 0 \n");
}

#[test]
fn test_arrays_are_disjoint_from_scalars() {
    let source = "DIM a(3)\na(1) = 5\nb = 7\nPRINT a(1); b";
    assert_eq!(run(source), " 5  7 \n");
}

#[test]
fn test_array_in_read_and_input_targets() {
    let source = "DIM v(2)\nDATA 4, 5, 6\nREAD v(0), v(1), v(2)\nPRINT v(0); v(1); v(2)";
    assert_eq!(run(source), " 4  5  6 \n");
}

#[test]
fn test_option_base_shifts_lower_bound() {
    let source = "OPTION BASE 1\nDIM a(3)\na(1) = 7\nPRINT a(1)";
    assert_eq!(run(source), " 7 \n");
    assert!(run("OPTION BASE 1\nDIM a(3)\nPRINT a(0)").starts_with("?SUBSCRIPT OUT OF RANGE"));
}

#[test]
fn test_assignment_to_undimensioned_call_form_fails() {
    assert!(run("f(1) = 2").starts_with("?TYPE MISMATCH; CANNOT ASSIGN TO FUNCTION"));
}
