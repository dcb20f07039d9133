mod common;
use common::*;

#[test]
fn test_read_into_zones() {
    let source = "DATA 1, \"two\", 3.5\nREAD a%, b$, c#\nPRINT a%, b$, c#";
    assert_eq!(run(source), " 1            two            3.5 \n");
}

#[test]
fn test_read_coerces_to_target_kind() {
    let source = "DATA 3.9\nREAD n%\nPRINT n%";
    assert_eq!(run(source), " 3 \n");
}

#[test]
fn test_data_read_across_statements_in_source_order() {
    let source = "DATA 1, 2\nDATA 3\nREAD a, b, c\nPRINT a; b; c";
    assert_eq!(run(source), " 1  2  3 \n");
}

#[test]
fn test_out_of_data() {
    assert!(run("DATA 1\nREAD a, b").starts_with("?CONTROL ERROR; OUT OF DATA"));
}

#[test]
fn test_restore_resets_pointer() {
    let source = "DATA 7, 8\nREAD a, b\nRESTORE\nREAD c\nPRINT a; b; c";
    assert_eq!(run(source), " 7  8  7 \n");
}

#[test]
fn test_restore_to_line_number() {
    let source = "10 DATA 1, 2\n20 DATA 3, 4\nREAD a, b, c\nRESTORE 20\nREAD d\nPRINT a; b; c; d";
    assert_eq!(run(source), " 1  2  3  3 \n");
}

#[test]
fn test_restore_to_label() {
    let source = "DATA 1\nmore:\nDATA 9\nREAD a\nRESTORE more\nREAD b\nPRINT a; b";
    assert_eq!(run(source), " 1  9 \n");
}

#[test]
fn test_restore_unknown_target() {
    assert!(run("RESTORE 999").starts_with("?UNDEFINED NAME"));
}

#[test]
fn test_negative_data_values() {
    let source = "DATA -4, 2\nREAD a, b\nPRINT a + b";
    assert_eq!(run(source), "-2 \n");
}
