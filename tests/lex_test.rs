use qbasic::lang::token::{Ident, Literal, Operator, Token, TokenKind, Word};
use qbasic::lang::lex;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_line_number_only_at_line_start() {
    let tokens = lex("10 PRINT 10");
    assert_eq!(tokens[0].kind, TokenKind::LineNumber(10));
    assert_eq!(tokens[1].kind, TokenKind::Word(Word::Print));
    assert_eq!(
        tokens[2].kind,
        TokenKind::Literal(Literal::Integer("10".to_string()))
    );
}

#[test]
fn test_question_mark_is_print() {
    assert_eq!(kinds("?")[0], TokenKind::Word(Word::Print));
}

#[test]
fn test_keywords_fold_case() {
    assert_eq!(kinds("goto")[0], TokenKind::Word(Word::Goto));
    assert_eq!(kinds("GoTo")[0], TokenKind::Word(Word::Goto));
    assert_eq!(kinds("mod")[0], TokenKind::Operator(Operator::Modulo));
}

#[test]
fn test_suffixed_identifier_is_never_a_keyword() {
    assert_eq!(
        kinds("print$")[0],
        TokenKind::Ident(Ident::String("PRINT$".to_string()))
    );
}

#[test]
fn test_identifier_suffixes() {
    assert_eq!(kinds("a%")[0], TokenKind::Ident(Ident::Integer("A%".to_string())));
    assert_eq!(kinds("a&")[0], TokenKind::Ident(Ident::Long("A&".to_string())));
    assert_eq!(kinds("a!")[0], TokenKind::Ident(Ident::Single("A!".to_string())));
    assert_eq!(kinds("a#")[0], TokenKind::Ident(Ident::Double("A#".to_string())));
    assert_eq!(kinds("a$")[0], TokenKind::Ident(Ident::String("A$".to_string())));
    assert_eq!(
        kinds("total_2")[0],
        TokenKind::Ident(Ident::Plain("TOTAL_2".to_string()))
    );
}

#[test]
fn test_not_equal_spellings() {
    let tokens = kinds("a <> b >< c");
    assert_eq!(tokens[1], TokenKind::Operator(Operator::NotEqual));
    assert_eq!(tokens[3], TokenKind::Operator(Operator::NotEqual));
}

#[test]
fn test_relational_operators() {
    let tokens = kinds("<= >= < > =");
    assert_eq!(tokens[0], TokenKind::Operator(Operator::LessEqual));
    assert_eq!(tokens[1], TokenKind::Operator(Operator::GreaterEqual));
    assert_eq!(tokens[2], TokenKind::Operator(Operator::Less));
    assert_eq!(tokens[3], TokenKind::Operator(Operator::Greater));
    assert_eq!(tokens[4], TokenKind::Operator(Operator::Equal));
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("PRINT 42")[1],
        TokenKind::Literal(Literal::Integer("42".to_string()))
    );
    assert_eq!(
        kinds("PRINT 3.5")[1],
        TokenKind::Literal(Literal::Float("3.5".to_string()))
    );
    assert_eq!(
        kinds("PRINT 1E5")[1],
        TokenKind::Literal(Literal::Float("1E5".to_string()))
    );
    assert_eq!(
        kinds("PRINT 1.5e-3")[1],
        TokenKind::Literal(Literal::Float("1.5E-3".to_string()))
    );
    // D exponents normalise to E and force a float
    assert_eq!(
        kinds("PRINT 1d2")[1],
        TokenKind::Literal(Literal::Float("1D2".to_string()))
    );
    // suffixes: # and ! force floats, % stays integral
    assert_eq!(
        kinds("PRINT 2#")[1],
        TokenKind::Literal(Literal::Float("2#".to_string()))
    );
    assert_eq!(
        kinds("PRINT 2%")[1],
        TokenKind::Literal(Literal::Integer("2%".to_string()))
    );
}

#[test]
fn test_comments() {
    let tokens = kinds("PRINT 1 ' trailing words\nPRINT 2");
    assert_eq!(tokens[2], TokenKind::Rem(" trailing words".to_string()));
    let tokens = kinds("REM whole line");
    assert_eq!(tokens[0], TokenKind::Rem("whole line".to_string()));
}

#[test]
fn test_string_literals() {
    assert_eq!(
        kinds("PRINT \"HELLO\"")[1],
        TokenKind::Literal(Literal::String("HELLO".to_string()))
    );
    // newline implicitly closes an unterminated string
    let tokens = kinds("PRINT \"OPEN\nPRINT 2");
    assert_eq!(
        tokens[1],
        TokenKind::Literal(Literal::String("OPEN".to_string()))
    );
    assert_eq!(tokens[2], TokenKind::Newline);
}

#[test]
fn test_newline_styles() {
    for source in &["A\nB", "A\r\nB", "A\rB"] {
        let tokens = kinds(source);
        assert_eq!(tokens[1], TokenKind::Newline, "source {:?}", source);
        assert_eq!(tokens.len(), 4); // ident, newline, ident, eof
    }
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = lex("A = 1\n  B = 2");
    let b = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Ident(Ident::Plain("B".to_string())))
        .expect("B token");
    assert_eq!(b.line, 2);
    assert_eq!(b.column, 3);
}

#[test]
fn test_illegal_character() {
    let tokens = kinds("PRINT @");
    assert_eq!(tokens[1], TokenKind::Unknown('@'));
}

#[test]
fn test_eof_terminates() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

/// Serialising tokens back to text and re-lexing reproduces the same
/// token kinds with the same line attributions.
#[test]
fn test_token_round_trip() {
    let source = "10 LET a% = 1 + 2.5\n20 PRINT a%; \"done\"\nlabel:\nGOTO 10";
    let tokens = lex(source);
    let mut rebuilt = String::new();
    for token in &tokens {
        match &token.kind {
            TokenKind::Newline => rebuilt.push('\n'),
            TokenKind::Eof => {}
            kind => {
                rebuilt.push_str(&kind.to_string());
                rebuilt.push(' ');
            }
        }
    }
    let again = lex(&rebuilt);
    assert_eq!(tokens.len(), again.len());
    for (a, b) in tokens.iter().zip(again.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.line, b.line);
    }
}

fn first_token(source: &str) -> Token {
    lex(source).remove(0)
}

#[test]
fn test_positions_are_one_based() {
    let token = first_token("PRINT");
    assert_eq!(token.line, 1);
    assert_eq!(token.column, 1);
}
