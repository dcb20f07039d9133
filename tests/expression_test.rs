mod common;
use common::*;

#[test]
fn test_precedence() {
    assert_eq!(run("PRINT 2 + 3 * 4"), " 14 \n");
    assert_eq!(run("PRINT (2 + 3) * 4"), " 20 \n");
    assert_eq!(run("PRINT 10 - 2 - 3"), " 5 \n");
    assert_eq!(run("PRINT 2 ^ 3 ^ 2"), " 512 \n");
    assert_eq!(run("PRINT -2 ^ 2"), "-4 \n");
}

#[test]
fn test_division_family() {
    assert_eq!(run("PRINT 1 / 2"), " 0.5 \n");
    assert_eq!(run("PRINT 7 \\ 2"), " 3 \n");
    assert_eq!(run("PRINT 7 MOD 3"), " 1 \n");
    assert_eq!(run("PRINT -7 \\ 2"), "-3 \n");
}

#[test]
fn test_division_by_zero() {
    assert!(run("PRINT 1 / 0").starts_with("?ARITHMETIC ERROR; DIVISION BY ZERO"));
    assert!(run("PRINT 1 \\ 0").starts_with("?ARITHMETIC ERROR; DIVISION BY ZERO"));
    assert!(run("PRINT 1 MOD 0").starts_with("?ARITHMETIC ERROR; DIVISION BY ZERO"));
}

#[test]
fn test_comparisons_return_dialect_booleans() {
    assert_eq!(run("PRINT 1 < 2"), "-1 \n");
    assert_eq!(run("PRINT 1 > 2"), " 0 \n");
    assert_eq!(run("PRINT 2 >= 2"), "-1 \n");
    assert_eq!(run("PRINT 1 <> 1"), " 0 \n");
}

#[test]
fn test_string_operations() {
    assert_eq!(run("PRINT \"FOO\" + \"BAR\""), "FOOBAR\n");
    assert_eq!(run("PRINT \"A\" < \"B\""), "-1 \n");
    assert_eq!(run("PRINT \"A\" = \"A\""), "-1 \n");
    assert!(run("PRINT \"A\" - 1").starts_with("?TYPE MISMATCH"));
}

#[test]
fn test_logical_operators() {
    assert_eq!(run("PRINT NOT 0"), "-1 \n");
    assert_eq!(run("PRINT NOT -1"), " 0 \n");
    assert_eq!(run("PRINT 5 AND 3"), " 1 \n");
    assert_eq!(run("PRINT 5 OR 3"), " 7 \n");
    assert_eq!(run("PRINT 5 XOR 3"), " 6 \n");
    assert_eq!(run("PRINT 5 EQV 3"), "-7 \n");
    assert_eq!(run("PRINT 5 IMP 3"), "-5 \n");
}

#[test]
fn test_not_binds_looser_than_comparison() {
    assert_eq!(run("PRINT NOT 1 = 2"), "-1 \n");
}

#[test]
fn test_numeric_promotion_and_coercion() {
    // integer store truncates toward zero
    assert_eq!(run("a% = 3.9\nPRINT a%"), " 3 \n");
    assert_eq!(run("a% = -3.9\nPRINT a%"), "-3 \n");
    // widest operand kind wins
    assert_eq!(run("PRINT 1 + 0.5"), " 1.5 \n");
    assert_eq!(run("a# = 1\nPRINT a# + 1"), " 2 \n");
}

#[test]
fn test_auto_vivification() {
    assert_eq!(run("PRINT fresh"), " 0 \n");
    assert_eq!(run("PRINT fresh$"), "\n");
    assert_eq!(run("PRINT fresh% + 1"), " 1 \n");
}

#[test]
fn test_arithmetic_identities() {
    assert_eq!(run("PRINT CINT(CDBL(123))"), " 123 \n");
    assert_eq!(run("PRINT CINT(CDBL(-321))"), "-321 \n");
    assert_eq!(run("s$ = \"HELLO\"\nPRINT LEN(s$)"), " 5 \n");
    assert_eq!(run("PRINT VAL(STR$(42))"), " 42 \n");
    assert_eq!(run("PRINT VAL(STR$(-2.5))"), "-2.5 \n");
}

#[test]
fn test_truthiness() {
    assert_eq!(run("IF 2 THEN PRINT \"Y\" ELSE PRINT \"N\""), "Y\n");
    assert_eq!(run("IF 0 THEN PRINT \"Y\" ELSE PRINT \"N\""), "N\n");
    assert_eq!(run("IF \"x\" THEN PRINT \"Y\" ELSE PRINT \"N\""), "Y\n");
    assert_eq!(run("IF \"\" THEN PRINT \"Y\" ELSE PRINT \"N\""), "N\n");
}

#[test]
fn test_integer_overflow_reports() {
    assert!(run("a% = 32767\nb% = 1\nPRINT a% + b%").starts_with("?ARITHMETIC ERROR; OVERFLOW"));
}

#[test]
fn test_unary_negation() {
    assert_eq!(run("PRINT -(2 + 3)"), "-5 \n");
    assert_eq!(run("a = 5\nPRINT -a"), "-5 \n");
}
