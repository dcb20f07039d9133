mod common;
use common::*;

#[test]
fn test_print_numeric_padding() {
    assert_eq!(run("PRINT 5"), " 5 \n");
    assert_eq!(run("PRINT -5"), "-5 \n");
    assert_eq!(run("PRINT 0"), " 0 \n");
}

#[test]
fn test_print_semicolons_join_items() {
    assert_eq!(run("PRINT 1; 2; 3"), " 1  2  3 \n");
    assert_eq!(run("PRINT \"a\"; \"b\""), "ab\n");
}

#[test]
fn test_print_comma_zones() {
    assert_eq!(run("PRINT 1, 2"), " 1             2 \n");
    assert_eq!(run("PRINT \"abc\", \"d\""), "abc           d\n");
}

#[test]
fn test_trailing_separator_suppresses_newline() {
    assert_eq!(run("PRINT 1;\nPRINT 2"), " 1  2 \n");
    assert_eq!(run("PRINT \"a\";"), "a");
    assert_eq!(run("PRINT \"a\","), "a             ");
}

#[test]
fn test_empty_print_emits_newline() {
    assert_eq!(run("PRINT"), "\n");
    assert_eq!(run("PRINT 1\nPRINT\nPRINT 2"), " 1 \n\n 2 \n");
}

#[test]
fn test_print_display_rule() {
    // integral values render as integers
    assert_eq!(run("PRINT 3.0"), " 3 \n");
    assert_eq!(run("PRINT 2.5"), " 2.5 \n");
    // huge magnitudes switch to an uppercase exponent
    assert_eq!(run("PRINT 1E20"), " 1E20 \n");
}

#[test]
fn test_print_using_numeric() {
    assert_eq!(run("PRINT USING \"###.##\"; 3.14159"), "  3.14\n");
    assert_eq!(run("PRINT USING \"#####\"; 42"), "   42\n");
    assert_eq!(run("PRINT USING \"$$###.##\"; 9.5"), "$9.50\n");
    assert_eq!(run("PRINT USING \"+###\"; 7"), "+  7\n");
}

#[test]
fn test_print_using_strings() {
    assert_eq!(run("PRINT USING \"!\"; \"HELLO\""), "H\n");
    assert_eq!(run("PRINT USING \"&\"; \"HELLO\""), "HELLO\n");
}

#[test]
fn test_print_using_applies_to_each_item() {
    assert_eq!(run("PRINT USING \"###\"; 1; 22"), "  1 22\n");
}

#[test]
fn test_print_using_exponential() {
    assert_eq!(run("PRINT USING \"##.##^^^^\"; 1234.5"), "1.23E+03\n");
}

#[test]
fn test_question_mark_shorthand() {
    assert_eq!(run("? 5"), " 5 \n");
}

#[test]
fn test_print_expression_items() {
    assert_eq!(run("a = 2\nPRINT a * 3; \"x\""), " 6 x\n");
}
