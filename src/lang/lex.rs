use super::token::*;
use super::{LineNumber, MaxValue};

/// Tokenize an entire source text.
///
/// Newlines are significant to the grammar and are emitted as tokens; the
/// final token is always `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    BasicLexer::lex(source)
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_suffix(c: char) -> bool {
    c == '$' || c == '%' || c == '&' || c == '!' || c == '#'
}

struct BasicLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> BasicLexer<'a> {
    fn lex(source: &str) -> Vec<Token> {
        let mut lexer = BasicLexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            line_start: true,
            tokens: vec![],
        };
        lexer.scan();
        lexer.tokens
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch.is_some() {
            self.column += 1;
        }
        ch
    }

    fn push(&mut self, kind: TokenKind, column: usize) {
        self.tokens.push(Token::new(kind, self.line, column));
        self.line_start = false;
    }

    fn newline(&mut self, column: usize) {
        self.tokens.push(Token::new(TokenKind::Newline, self.line, column));
        self.line += 1;
        self.column = 1;
        self.line_start = true;
    }

    fn scan(&mut self) {
        loop {
            let pk = match self.chars.peek() {
                Some(c) => *c,
                None => {
                    let column = self.column;
                    self.push(TokenKind::Eof, column);
                    return;
                }
            };
            let column = self.column;
            if is_basic_whitespace(pk) {
                self.advance();
                continue;
            }
            if pk == '\n' {
                self.advance();
                self.newline(column);
                continue;
            }
            if pk == '\r' {
                self.advance();
                if let Some('\n') = self.chars.peek() {
                    self.advance();
                }
                self.newline(column);
                continue;
            }
            if pk == '"' {
                let string = self.string();
                self.push(TokenKind::Literal(Literal::String(string)), column);
                continue;
            }
            if pk == '\'' {
                self.advance();
                let comment = self.comment();
                self.push(TokenKind::Rem(comment), column);
                continue;
            }
            if is_basic_digit(pk) || (pk == '.' && self.second_is_digit()) {
                let kind = self.number();
                self.push(kind, column);
                continue;
            }
            if is_basic_alphabetic(pk) {
                let kind = self.alphabetic();
                self.push(kind, column);
                continue;
            }
            let kind = self.minutia();
            self.push(kind, column);
        }
    }

    fn second_is_digit(&self) -> bool {
        let mut it = self.chars.clone();
        it.next();
        matches!(it.peek(), Some(c) if is_basic_digit(*c))
    }

    fn second_starts_exponent(&self) -> bool {
        let mut it = self.chars.clone();
        it.next();
        matches!(it.peek(), Some(c) if is_basic_digit(*c) || *c == '+' || *c == '-')
    }

    fn string(&mut self) -> String {
        let mut s = String::new();
        self.advance();
        loop {
            match self.chars.peek() {
                None | Some('\n') | Some('\r') => break,
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Some(ch) = self.advance() {
                        s.push(ch);
                    }
                }
            }
        }
        s
    }

    fn comment(&mut self) -> String {
        let mut s = String::new();
        while let Some(pk) = self.chars.peek() {
            if *pk == '\n' || *pk == '\r' {
                break;
            }
            if let Some(ch) = self.advance() {
                s.push(ch);
            }
        }
        s
    }

    fn number(&mut self) -> TokenKind {
        let mut s = String::new();
        let mut float = false;
        let mut suffixed = false;
        while let Some(pk) = self.chars.peek() {
            if is_basic_digit(*pk) {
                s.push(self.advance().unwrap_or_default());
                continue;
            }
            break;
        }
        if let Some('.') = self.chars.peek() {
            if self.second_is_digit() || s.is_empty() {
                float = true;
                s.push(self.advance().unwrap_or_default());
                while let Some(pk) = self.chars.peek() {
                    if is_basic_digit(*pk) {
                        s.push(self.advance().unwrap_or_default());
                        continue;
                    }
                    break;
                }
            }
        }
        if let Some(pk) = self.chars.peek() {
            if matches!(*pk, 'E' | 'e' | 'D' | 'd') && self.second_starts_exponent() {
                float = true;
                s.push(self.advance().unwrap_or_default().to_ascii_uppercase());
                if let Some(sign) = self.chars.peek() {
                    if *sign == '+' || *sign == '-' {
                        s.push(self.advance().unwrap_or_default());
                    }
                }
                while let Some(pk) = self.chars.peek() {
                    if is_basic_digit(*pk) {
                        s.push(self.advance().unwrap_or_default());
                        continue;
                    }
                    break;
                }
            }
        }
        if let Some(pk) = self.chars.peek() {
            if is_suffix(*pk) && *pk != '$' {
                if *pk == '#' || *pk == '!' {
                    float = true;
                }
                suffixed = true;
                s.push(self.advance().unwrap_or_default());
            }
        }
        if self.line_start && !float && !suffixed {
            if let Ok(number) = s.parse::<u16>() {
                if number <= <LineNumber as MaxValue>::max_value() {
                    return TokenKind::LineNumber(number);
                }
            }
        }
        if float {
            TokenKind::Literal(Literal::Float(s))
        } else {
            TokenKind::Literal(Literal::Integer(s))
        }
    }

    fn alphabetic(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(pk) = self.chars.peek() {
            if is_basic_alphabetic(*pk) || is_basic_digit(*pk) || *pk == '_' {
                s.push(self.advance().unwrap_or_default().to_ascii_uppercase());
                continue;
            }
            break;
        }
        if let Some(pk) = self.chars.peek() {
            if is_suffix(*pk) {
                let suffix = self.advance().unwrap_or_default();
                s.push(suffix);
                return TokenKind::Ident(match suffix {
                    '$' => Ident::String(s),
                    '%' => Ident::Integer(s),
                    '&' => Ident::Long(s),
                    '!' => Ident::Single(s),
                    _ => Ident::Double(s),
                });
            }
        }
        if let Some(kind) = keyword(&s) {
            return kind;
        }
        if s == "REM" {
            while let Some(pk) = self.chars.peek() {
                if is_basic_whitespace(*pk) {
                    self.advance();
                    continue;
                }
                break;
            }
            return TokenKind::Rem(self.comment());
        }
        TokenKind::Ident(Ident::Plain(s))
    }

    fn minutia(&mut self) -> TokenKind {
        use Operator::*;
        let ch = match self.advance() {
            Some(c) => c,
            None => return TokenKind::Eof,
        };
        match ch {
            '^' => TokenKind::Operator(Caret),
            '*' => TokenKind::Operator(Multiply),
            '/' => TokenKind::Operator(Divide),
            '\\' => TokenKind::Operator(DivideInt),
            '+' => TokenKind::Operator(Plus),
            '-' => TokenKind::Operator(Minus),
            '=' => TokenKind::Operator(Equal),
            '<' => match self.chars.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(LessEqual)
                }
                Some('>') => {
                    self.advance();
                    TokenKind::Operator(NotEqual)
                }
                _ => TokenKind::Operator(Less),
            },
            '>' => match self.chars.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(GreaterEqual)
                }
                Some('<') => {
                    self.advance();
                    TokenKind::Operator(NotEqual)
                }
                _ => TokenKind::Operator(Greater),
            },
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '#' => TokenKind::Hash,
            '$' => TokenKind::Dollar,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Ampersand,
            '!' => TokenKind::Bang,
            '?' => TokenKind::Word(Word::Print),
            _ => TokenKind::Unknown(ch),
        }
    }
}
