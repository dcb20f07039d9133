use super::ast::*;
use super::token::{Literal, Operator, Token, TokenKind, Word};
use super::Error;
use crate::error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Parse a token buffer into a [`Program`].
///
/// The parser collects errors and keeps going; on any error the whole
/// accumulated list is returned so the host can report them at once.
pub fn parse(tokens: &[Token]) -> std::result::Result<Program, Vec<Error>> {
    Parser::new(tokens).program()
}

mod prec {
    pub const LOWEST: u8 = 1;
    pub const IMP: u8 = 2;
    pub const EQV: u8 = 3;
    pub const XOR: u8 = 4;
    pub const OR: u8 = 5;
    pub const AND: u8 = 6;
    pub const NOT: u8 = 7;
    pub const COMPARISON: u8 = 8;
    pub const SUM: u8 = 9;
    pub const MODULO: u8 = 10;
    pub const INTDIV: u8 = 11;
    pub const PRODUCT: u8 = 12;
    pub const NEGATE: u8 = 13;
    pub const POWER: u8 = 14;
    pub const CALL: u8 = 15;
}

fn precedence(kind: &TokenKind) -> u8 {
    use Operator::*;
    match kind {
        TokenKind::Operator(op) => match op {
            Imp => prec::IMP,
            Eqv => prec::EQV,
            Xor => prec::XOR,
            Or => prec::OR,
            And => prec::AND,
            Not => prec::NOT,
            Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual => prec::COMPARISON,
            Plus | Minus => prec::SUM,
            Modulo => prec::MODULO,
            DivideInt => prec::INTDIV,
            Multiply | Divide => prec::PRODUCT,
            Caret => prec::POWER,
        },
        TokenKind::LParen => prec::CALL,
        _ => prec::LOWEST,
    }
}

fn binary_op(op: Operator) -> Option<BinaryOp> {
    use Operator::*;
    Some(match op {
        Plus => BinaryOp::Add,
        Minus => BinaryOp::Sub,
        Multiply => BinaryOp::Mul,
        Divide => BinaryOp::Div,
        DivideInt => BinaryOp::DivInt,
        Modulo => BinaryOp::Mod,
        Caret => BinaryOp::Pow,
        Equal => BinaryOp::Eq,
        NotEqual => BinaryOp::Ne,
        Less => BinaryOp::Lt,
        Greater => BinaryOp::Gt,
        LessEqual => BinaryOp::Le,
        GreaterEqual => BinaryOp::Ge,
        And => BinaryOp::And,
        Or => BinaryOp::Or,
        Xor => BinaryOp::Xor,
        Eqv => BinaryOp::Eqv,
        Imp => BinaryOp::Imp,
        Not => return None,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<Error>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            tokens,
            pos: 0,
            errors: vec![],
        }
    }

    fn cur(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + 1).min(last)]
    }

    fn advance(&mut self) {
        let last = self.tokens.len().saturating_sub(1);
        if self.pos < last {
            self.pos += 1;
        }
    }

    fn line(&self) -> Line {
        self.cur().line
    }

    fn cur_is_word(&self, word: Word) -> bool {
        self.cur().kind == TokenKind::Word(word)
    }

    fn peek_is_word(&self, word: Word) -> bool {
        self.peek().kind == TokenKind::Word(word)
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> Result<()> {
        if self.peek_is(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(
                error!(SyntaxError; format!("EXPECTED {}, GOT {}", kind, self.peek()))
                    .in_line(self.peek().line),
            )
        }
    }

    /// True when the current token ends the statement it appears in.
    fn cur_ends_statement(&self) -> bool {
        matches!(
            self.cur().kind,
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Colon
                | TokenKind::Word(Word::Else)
                | TokenKind::Word(Word::ElseIf)
        )
    }

    fn peek_ends_statement(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Colon
                | TokenKind::Word(Word::Else)
                | TokenKind::Word(Word::ElseIf)
        )
    }

    fn sync(&mut self) {
        while !self.cur().kind.is_end_of_line() {
            self.advance();
        }
    }

    fn program(mut self) -> std::result::Result<Program, Vec<Error>> {
        let mut program = Program::new();
        loop {
            match self.cur().kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            match self.statement() {
                Ok(Some(stmt)) => {
                    match &stmt {
                        Statement::LineMarker(_, number) => {
                            program.line_numbers.insert(*number, program.statements.len());
                        }
                        Statement::Label(_, name) => {
                            program.labels.insert(name.clone(), program.statements.len());
                        }
                        Statement::Sub(def) => {
                            program.subs.insert(def.name.clone(), Rc::clone(def));
                        }
                        Statement::Function(def) => {
                            program.functions.insert(def.name.clone(), Rc::clone(def));
                        }
                        Statement::Data(_, values) => {
                            program.data_items.extend(values.iter().cloned());
                        }
                        _ => {}
                    }
                    program.statements.push(stmt);
                }
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.sync();
                }
            }
            if self.cur().kind == TokenKind::Eof {
                break;
            }
            self.advance();
        }
        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(self.errors)
        }
    }

    // *** Statements

    fn statement(&mut self) -> Result<Option<Statement>> {
        let line = self.line();
        match self.cur().kind.clone() {
            TokenKind::LineNumber(number) => Ok(Some(Statement::LineMarker(line, number))),
            TokenKind::Rem(text) => Ok(Some(Statement::Rem(line, text))),
            TokenKind::Ident(ident) => self.ident_statement(ident).map(Some),
            TokenKind::Word(word) => self.word_statement(word),
            TokenKind::Unknown(ch) => {
                Err(error!(SyntaxError; format!("ILLEGAL CHARACTER '{}'", ch)).in_line(line))
            }
            kind => Err(error!(SyntaxError; format!("UNEXPECTED {}", kind)).in_line(line)),
        }
    }

    fn word_statement(&mut self, word: Word) -> Result<Option<Statement>> {
        use Word::*;
        match word {
            Let => self.let_statement().map(Some),
            Print => self.print_statement().map(Some),
            Input => self.input_statement().map(Some),
            Dim => self.dim_statement().map(Some),
            Redim => self.redim_statement().map(Some),
            If => self.if_statement().map(Some),
            For => self.for_statement().map(Some),
            While => self.while_statement().map(Some),
            Do => self.do_statement().map(Some),
            Select => self.select_statement().map(Some),
            Goto => self.goto_statement().map(Some),
            Gosub => self.gosub_statement().map(Some),
            Return => self.return_statement().map(Some),
            Exit => self.exit_statement().map(Some),
            Next => self.next_statement().map(Some),
            Sub => self.sub_statement().map(Some),
            Function => self.function_statement().map(Some),
            Data => self.data_statement().map(Some),
            Read => self.read_statement().map(Some),
            Restore => self.restore_statement().map(Some),
            Call => self.call_statement().map(Some),
            Swap => self.swap_statement().map(Some),
            Randomize => self.randomize_statement().map(Some),
            Const => self.const_statement().map(Some),
            Open => self.open_statement().map(Some),
            Close => self.close_statement().map(Some),
            Line => self.line_statement().map(Some),
            On => self.on_statement().map(Some),
            Option => self.option_statement().map(Some),
            Get => self.get_statement().map(Some),
            Put => self.put_statement().map(Some),
            Seek => self.seek_statement().map(Some),
            Pset => self.pset_statement().map(Some),
            Circle => self.circle_statement().map(Some),
            Cls => Ok(Some(Statement::Cls(self.line()))),
            Beep => Ok(Some(Statement::Beep(self.line()))),
            Locate => self.locate_statement().map(Some),
            Color => self.color_statement().map(Some),
            Screen => self.screen_statement().map(Some),
            Sleep => self.sleep_statement().map(Some),
            End => self.end_statement(),
            other => Err(error!(SyntaxError; format!("UNEXPECTED {}", other)).in_line(self.line())),
        }
    }

    fn ident_statement(&mut self, ident: Ident) -> Result<Statement> {
        let line = self.line();
        if self.peek_is(&TokenKind::LParen) {
            let target = self.prefix()?;
            if self.peek_is(&TokenKind::Operator(Operator::Equal)) {
                self.advance();
                self.advance();
                let value = self.expression(prec::LOWEST)?;
                return Ok(Statement::Let(line, target, value));
            }
            if let Expression::Call(_, name, args) = target {
                return Ok(Statement::Call(line, name, args));
            }
            return Err(error!(SyntaxError; "EXPECTED ASSIGNMENT OR CALL").in_line(line));
        }
        if self.peek_is(&TokenKind::Operator(Operator::Equal)) {
            self.advance();
            self.advance();
            let value = self.expression(prec::LOWEST)?;
            return Ok(Statement::Let(
                line,
                Expression::Ident(line, ident),
                value,
            ));
        }
        if self.peek_is(&TokenKind::Colon) {
            self.advance();
            return Ok(Statement::Label(line, ident.name().to_string()));
        }
        // implicit sub call; arguments run to the end of the statement
        let mut args = vec![];
        if !self.peek_ends_statement() {
            self.advance();
            loop {
                args.push(self.expression(prec::LOWEST)?);
                if self.peek_is(&TokenKind::Comma) {
                    self.advance();
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Ok(Statement::Call(line, ident.name().to_string(), args))
    }

    fn let_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let target = self.prefix()?;
        self.expect_peek(TokenKind::Operator(Operator::Equal))?;
        self.advance();
        let value = self.expression(prec::LOWEST)?;
        Ok(Statement::Let(line, target, value))
    }

    fn print_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut file_num = None;
        if self.peek_is(&TokenKind::Hash) {
            self.advance();
            self.advance();
            file_num = Some(self.expression(prec::LOWEST)?);
            self.expect_peek(TokenKind::Comma)?;
            self.advance();
        } else {
            self.advance();
        }
        if self.cur_is_word(Word::Using) {
            return self.print_using_rest(line, file_num);
        }
        let (items, no_newline) = self.print_items()?;
        Ok(Statement::Print {
            line,
            file_num,
            items,
            no_newline,
        })
    }

    fn print_items(&mut self) -> Result<(Vec<PrintItem>, bool)> {
        let mut items: Vec<PrintItem> = vec![];
        let mut no_newline = false;
        loop {
            if self.cur_ends_statement() {
                break;
            }
            match self.cur().kind.clone() {
                TokenKind::Semicolon => {
                    if let Some(last) = items.last_mut() {
                        last.sep = Sep::Semicolon;
                    }
                    no_newline = true;
                    self.advance();
                }
                TokenKind::Comma => {
                    if let Some(last) = items.last_mut() {
                        last.sep = Sep::Comma;
                    }
                    no_newline = true;
                    self.advance();
                }
                _ => {
                    let expr = self.expression(prec::LOWEST)?;
                    items.push(PrintItem {
                        expr,
                        sep: Sep::None,
                    });
                    no_newline = false;
                    if self.cur_ends_statement() {
                        break;
                    }
                    self.advance();
                }
            }
        }
        Ok((items, no_newline))
    }

    fn print_using_rest(&mut self, line: Line, file_num: Option<Expression>) -> Result<Statement> {
        self.advance();
        let format = self.expression(prec::LOWEST)?;
        if self.peek_is(&TokenKind::Semicolon) {
            self.advance();
        }
        self.advance();
        let mut items = vec![];
        let mut no_newline = false;
        loop {
            if self.cur_ends_statement() {
                break;
            }
            match self.cur().kind.clone() {
                TokenKind::Semicolon | TokenKind::Comma => {
                    no_newline = true;
                    self.advance();
                }
                _ => {
                    items.push(self.expression(prec::LOWEST)?);
                    no_newline = false;
                    if self.cur_ends_statement() {
                        break;
                    }
                    self.advance();
                }
            }
        }
        Ok(Statement::PrintUsing {
            line,
            file_num,
            format,
            items,
            no_newline,
        })
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut list = vec![];
        loop {
            if self.cur_ends_statement() {
                break;
            }
            list.push(self.expression(prec::LOWEST)?);
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                break;
            }
        }
        Ok(list)
    }

    fn input_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        if self.peek_is(&TokenKind::Hash) {
            self.advance();
            self.advance();
            let file_num = self.expression(prec::LOWEST)?;
            self.expect_peek(TokenKind::Comma)?;
            self.advance();
            let targets = self.expression_list()?;
            return Ok(Statement::InputFile(line, file_num, targets));
        }
        self.advance();
        let prompt = self.optional_prompt();
        let targets = self.expression_list()?;
        Ok(Statement::Input {
            line,
            prompt,
            targets,
        })
    }

    fn optional_prompt(&mut self) -> Option<String> {
        let prompt = match self.cur().kind.clone() {
            TokenKind::Literal(Literal::String(s)) => s,
            _ => return None,
        };
        self.advance();
        if matches!(self.cur().kind, TokenKind::Semicolon | TokenKind::Comma) {
            self.advance();
        }
        Some(prompt)
    }

    fn line_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        if self.cur_is_word(Word::Input) {
            if self.peek_is(&TokenKind::Hash) {
                self.advance();
                self.advance();
                let file_num = self.expression(prec::LOWEST)?;
                self.expect_peek(TokenKind::Comma)?;
                self.advance();
                let target = self.expression(prec::LOWEST)?;
                return Ok(Statement::LineInputFile(line, file_num, target));
            }
            self.advance();
            let prompt = self.optional_prompt();
            let target = self.expression(prec::LOWEST)?;
            return Ok(Statement::LineInput {
                line,
                prompt,
                target,
            });
        }
        if self.cur().kind == TokenKind::LParen {
            return self.line_graphics(line);
        }
        Err(error!(SyntaxError; "EXPECTED INPUT OR COORDINATES AFTER LINE").in_line(line))
    }

    fn line_graphics(&mut self, line: Line) -> Result<Statement> {
        self.advance();
        let x1 = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let y1 = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::Operator(Operator::Minus))?;
        self.expect_peek(TokenKind::LParen)?;
        self.advance();
        let x2 = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let y2 = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::RParen)?;
        let mut color = None;
        let mut fill = LineFill::None;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            if !self.peek_is(&TokenKind::Comma) && !self.peek_ends_statement() {
                self.advance();
                color = Some(self.expression(prec::LOWEST)?);
            }
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
                self.advance();
                if let TokenKind::Ident(id) = &self.cur().kind {
                    fill = match id.name() {
                        "B" => LineFill::Box,
                        "BF" => LineFill::BoxFill,
                        _ => LineFill::None,
                    };
                }
            }
        }
        Ok(Statement::LineDraw {
            line,
            x1,
            y1,
            x2,
            y2,
            color,
            fill,
        })
    }

    fn dim_vars(&mut self) -> Result<Vec<DimVar>> {
        let mut vars = vec![];
        loop {
            let ident = match self.cur().kind.clone() {
                TokenKind::Ident(ident) => ident,
                _ => {
                    return Err(error!(SyntaxError; format!("EXPECTED VARIABLE, GOT {}", self.cur()))
                        .in_line(self.line()))
                }
            };
            let name = ident.name().to_string();
            let mut kind = ident.kind();
            let mut dims = vec![];
            if self.peek_is(&TokenKind::LParen) {
                self.advance();
                self.advance();
                while self.cur().kind != TokenKind::RParen {
                    if self.cur().kind.is_end_of_line() {
                        return Err(error!(SyntaxError; "EXPECTED )").in_line(self.line()));
                    }
                    dims.push(self.expression(prec::LOWEST)?);
                    if self.peek_is(&TokenKind::Comma) {
                        self.advance();
                    }
                    self.advance();
                }
            }
            if self.peek_is_word(Word::As) {
                self.advance();
                self.advance();
                kind = Some(self.data_type()?);
            }
            vars.push(DimVar { name, dims, kind });
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                break;
            }
        }
        Ok(vars)
    }

    fn dim_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut shared = false;
        if self.cur_is_word(Word::Shared) {
            shared = true;
            self.advance();
        }
        if self.cur_is_word(Word::Static) {
            self.advance();
        }
        let vars = self.dim_vars()?;
        Ok(Statement::Dim(line, shared, vars))
    }

    fn redim_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut preserve = false;
        if self.cur_is_word(Word::Preserve) {
            preserve = true;
            self.advance();
        }
        let vars = self.dim_vars()?;
        Ok(Statement::Redim(line, preserve, vars))
    }

    fn data_type(&mut self) -> Result<Kind> {
        let kind = match self.cur().kind.clone() {
            TokenKind::Word(Word::IntegerType) => Kind::Integer,
            TokenKind::Word(Word::LongType) => Kind::Long,
            TokenKind::Word(Word::SingleType) => Kind::Single,
            TokenKind::Word(Word::DoubleType) => Kind::Double,
            TokenKind::Word(Word::StringType) => Kind::String,
            _ => {
                return Err(error!(SyntaxError; format!("EXPECTED TYPE, GOT {}", self.cur()))
                    .in_line(self.line()))
            }
        };
        Ok(kind)
    }

    fn if_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let condition = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Word(Word::Then))?;
        if !self.peek_is(&TokenKind::Newline) && !self.peek_is(&TokenKind::Eof) {
            // single-line IF
            self.advance();
            let consequence = self.inline_block()?;
            let mut alternative = vec![];
            if self.cur_is_word(Word::ElseIf) || self.peek_is_word(Word::ElseIf) {
                if self.peek_is_word(Word::ElseIf) {
                    self.advance();
                }
                alternative.push(self.if_statement()?);
            } else if self.cur_is_word(Word::Else) || self.peek_is_word(Word::Else) {
                if self.peek_is_word(Word::Else) {
                    self.advance();
                }
                self.advance();
                alternative = self.inline_block()?;
            }
            return Ok(Statement::If {
                line,
                condition,
                consequence,
                alternative,
            });
        }
        // block IF
        self.advance();
        self.advance();
        let mut consequence = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => break,
                TokenKind::Word(Word::Else) | TokenKind::Word(Word::ElseIf) => break,
                TokenKind::Word(Word::End) if self.peek_is_word(Word::If) => break,
                _ => {
                    if let Some(stmt) = self.statement()? {
                        consequence.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        let mut alternative = vec![];
        if self.cur_is_word(Word::ElseIf) {
            // ELSEIF nests as an IF in the else branch and owns the END IF
            alternative.push(self.if_statement()?);
            return Ok(Statement::If {
                line,
                condition,
                consequence,
                alternative,
            });
        }
        if self.cur_is_word(Word::Else) {
            self.advance();
            loop {
                match self.cur().kind.clone() {
                    TokenKind::Newline | TokenKind::Colon => {
                        self.advance();
                        continue;
                    }
                    TokenKind::Eof => break,
                    TokenKind::Word(Word::End) if self.peek_is_word(Word::If) => break,
                    _ => {
                        if let Some(stmt) = self.statement()? {
                            alternative.push(stmt);
                        }
                        self.advance();
                    }
                }
            }
        }
        if self.cur_is_word(Word::End) && self.peek_is_word(Word::If) {
            self.advance();
        }
        Ok(Statement::If {
            line,
            condition,
            consequence,
            alternative,
        })
    }

    /// Colon-separated statements up to the end of the line, ELSE, or ELSEIF.
    fn inline_block(&mut self) -> Result<Vec<Statement>> {
        let mut stmts = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Word(Word::Else)
                | TokenKind::Word(Word::ElseIf) => break,
                TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            if let Some(stmt) = self.statement()? {
                stmts.push(stmt);
            }
            if self.cur_ends_statement() {
                match self.cur().kind.clone() {
                    TokenKind::Colon => continue,
                    _ => break,
                }
            }
            match self.peek().kind.clone() {
                TokenKind::Colon => {
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(stmts)
    }

    fn for_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let var = match self.cur().kind.clone() {
            TokenKind::Ident(ident) => ident,
            _ => {
                return Err(error!(SyntaxError; "EXPECTED LOOP VARIABLE").in_line(self.line()));
            }
        };
        self.expect_peek(TokenKind::Operator(Operator::Equal))?;
        self.advance();
        let from = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Word(Word::To))?;
        self.advance();
        let to = self.expression(prec::LOWEST)?;
        let mut step = None;
        if self.peek_is_word(Word::Step) {
            self.advance();
            self.advance();
            step = Some(self.expression(prec::LOWEST)?);
        }
        self.advance();
        let mut body = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return Err(error!(SyntaxError; "FOR WITHOUT NEXT").in_line(line));
                }
                TokenKind::Word(Word::Next) => break,
                _ => {
                    if let Some(stmt) = self.statement()? {
                        body.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        let mut next_var = None;
        if let TokenKind::Ident(ident) = self.peek().kind.clone() {
            self.advance();
            next_var = Some(ident);
        }
        Ok(Statement::For {
            line,
            var,
            from,
            to,
            step,
            next_var,
            body,
        })
    }

    fn while_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let condition = self.expression(prec::LOWEST)?;
        self.advance();
        let mut body = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return Err(error!(SyntaxError; "WHILE WITHOUT WEND").in_line(line));
                }
                TokenKind::Word(Word::Wend) => break,
                _ => {
                    if let Some(stmt) = self.statement()? {
                        body.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        Ok(Statement::While {
            line,
            condition,
            body,
        })
    }

    fn do_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut cond = DoCond::Always;
        if self.cur_is_word(Word::While) {
            self.advance();
            cond = DoCond::PreWhile(self.expression(prec::LOWEST)?);
            self.advance();
        } else if self.cur_is_word(Word::Until) {
            self.advance();
            cond = DoCond::PreUntil(self.expression(prec::LOWEST)?);
            self.advance();
        }
        let mut body = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return Err(error!(SyntaxError; "DO WITHOUT LOOP").in_line(line));
                }
                TokenKind::Word(Word::Loop) => break,
                _ => {
                    if let Some(stmt) = self.statement()? {
                        body.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        if self.peek_is_word(Word::While) {
            self.advance();
            self.advance();
            cond = DoCond::PostWhile(self.expression(prec::LOWEST)?);
        } else if self.peek_is_word(Word::Until) {
            self.advance();
            self.advance();
            cond = DoCond::PostUntil(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::DoLoop { line, cond, body })
    }

    fn select_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.expect_peek(TokenKind::Word(Word::Case))?;
        self.advance();
        let scrutinee = self.expression(prec::LOWEST)?;
        self.advance();
        let mut arms = vec![];
        let mut else_body = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return Err(error!(SyntaxError; "SELECT WITHOUT END SELECT").in_line(line));
                }
                TokenKind::Word(Word::Case) => {
                    self.advance();
                    if self.cur_is_word(Word::Else) {
                        self.advance();
                        self.case_body(&mut else_body)?;
                        continue;
                    }
                    let mut values = vec![];
                    loop {
                        values.push(self.case_value()?);
                        if self.peek_is(&TokenKind::Comma) {
                            self.advance();
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.advance();
                    let mut body = vec![];
                    self.case_body(&mut body)?;
                    arms.push(CaseArm { values, body });
                }
                TokenKind::Word(Word::End) if self.peek_is_word(Word::Select) => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(error!(SyntaxError; format!("EXPECTED CASE, GOT {}", self.cur()))
                        .in_line(self.line()));
                }
            }
        }
        Ok(Statement::Select {
            line,
            scrutinee,
            arms,
            else_body,
        })
    }

    fn case_body(&mut self, body: &mut Vec<Statement>) -> Result<()> {
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => break,
                TokenKind::Word(Word::Case) => break,
                TokenKind::Word(Word::End) if self.peek_is_word(Word::Select) => break,
                _ => {
                    if let Some(stmt) = self.statement()? {
                        body.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn case_value(&mut self) -> Result<CaseValue> {
        let is_keyword = matches!(&self.cur().kind, TokenKind::Ident(id) if id.name() == "IS");
        let cmp = match self.cur().kind.clone() {
            TokenKind::Operator(op) => binary_op(op).filter(|op| {
                matches!(
                    op,
                    BinaryOp::Eq
                        | BinaryOp::Ne
                        | BinaryOp::Lt
                        | BinaryOp::Gt
                        | BinaryOp::Le
                        | BinaryOp::Ge
                )
            }),
            _ => None,
        };
        if is_keyword || cmp.is_some() {
            if is_keyword {
                self.advance();
            }
            let op = match self.cur().kind.clone() {
                TokenKind::Operator(op) => binary_op(op),
                _ => None,
            };
            let op = match op {
                Some(op) => op,
                None => {
                    return Err(error!(SyntaxError; "EXPECTED COMPARISON AFTER IS")
                        .in_line(self.line()))
                }
            };
            self.advance();
            let value = self.expression(prec::LOWEST)?;
            return Ok(CaseValue::Is(op, value));
        }
        let value = self.expression(prec::LOWEST)?;
        if self.peek_is_word(Word::To) {
            self.advance();
            self.advance();
            let end = self.expression(prec::LOWEST)?;
            return Ok(CaseValue::Range(value, end));
        }
        Ok(CaseValue::One(value))
    }

    fn target_name(&mut self) -> Result<String> {
        match self.cur().kind.clone() {
            TokenKind::Literal(Literal::Integer(s)) => Ok(s),
            TokenKind::LineNumber(n) => Ok(n.to_string()),
            TokenKind::Ident(ident) => Ok(ident.name().to_string()),
            _ => Err(error!(SyntaxError; format!("EXPECTED LINE NUMBER OR LABEL, GOT {}", self.cur()))
                .in_line(self.line())),
        }
    }

    fn option_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.expect_peek(TokenKind::Word(Word::Base))?;
        self.advance();
        let base = self.expression(prec::LOWEST)?;
        match base {
            Expression::Integer(_, n) if n == 0 || n == 1 => {
                Ok(Statement::OptionBase(line, n as i32))
            }
            _ => Err(error!(SyntaxError; "EXPECTED 0 OR 1 AFTER OPTION BASE").in_line(line)),
        }
    }

    fn goto_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        Ok(Statement::Goto(line, self.target_name()?))
    }

    fn gosub_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        Ok(Statement::Gosub(line, self.target_name()?))
    }

    fn on_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let selector = self.expression(prec::LOWEST)?;
        self.advance();
        let gosub = if self.cur_is_word(Word::Gosub) {
            true
        } else if self.cur_is_word(Word::Goto) {
            false
        } else {
            return Err(error!(SyntaxError; "EXPECTED GOTO OR GOSUB").in_line(self.line()));
        };
        self.advance();
        let mut targets = vec![];
        loop {
            if self.cur_ends_statement() {
                break;
            }
            targets.push(self.target_name()?);
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                break;
            }
        }
        if gosub {
            Ok(Statement::OnGosub(line, selector, targets))
        } else {
            Ok(Statement::OnGoto(line, selector, targets))
        }
    }

    fn return_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut value = None;
        if !self.peek_ends_statement() {
            self.advance();
            value = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Return(line, value))
    }

    fn exit_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let kind = match self.cur().kind.clone() {
            TokenKind::Word(Word::For) => ExitKind::For,
            TokenKind::Word(Word::Do) => ExitKind::Do,
            TokenKind::Word(Word::While) => ExitKind::While,
            TokenKind::Word(Word::Sub) => ExitKind::Sub,
            TokenKind::Word(Word::Function) => ExitKind::Function,
            _ => {
                return Err(error!(SyntaxError; "EXPECTED FOR, DO, WHILE, SUB OR FUNCTION")
                    .in_line(self.line()))
            }
        };
        Ok(Statement::Exit(line, kind))
    }

    fn next_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut var = None;
        if let TokenKind::Ident(ident) = self.peek().kind.clone() {
            self.advance();
            var = Some(ident);
        }
        Ok(Statement::Next(line, var))
    }

    fn params(&mut self) -> Result<Vec<Param>> {
        self.advance();
        let mut params = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::RParen | TokenKind::Eof => break,
                _ => {}
            }
            let mut by_val = false;
            if self.cur_is_word(Word::Byval) {
                by_val = true;
                self.advance();
            } else if self.cur_is_word(Word::Byref) {
                self.advance();
            }
            let ident = match self.cur().kind.clone() {
                TokenKind::Ident(ident) => ident,
                _ => {
                    return Err(error!(SyntaxError; format!("EXPECTED PARAMETER, GOT {}", self.cur()))
                        .in_line(self.line()))
                }
            };
            let name = ident.name().to_string();
            let mut kind = ident.kind();
            if self.peek_is_word(Word::As) {
                self.advance();
                self.advance();
                kind = Some(self.data_type()?);
            }
            params.push(Param { name, kind, by_val });
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
            }
            self.advance();
        }
        Ok(params)
    }

    fn routine_header(&mut self) -> Result<(String, Vec<Param>)> {
        self.advance();
        let name = match self.cur().kind.clone() {
            TokenKind::Ident(ident) => ident.name().to_string(),
            _ => {
                return Err(error!(SyntaxError; "EXPECTED ROUTINE NAME").in_line(self.line()));
            }
        };
        let mut params = vec![];
        if self.peek_is(&TokenKind::LParen) {
            self.advance();
            params = self.params()?;
        }
        Ok((name, params))
    }

    fn routine_body(&mut self, terminator: Word, missing: &str, line: Line) -> Result<Vec<Statement>> {
        self.advance();
        let mut body = vec![];
        loop {
            match self.cur().kind.clone() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return Err(error!(SyntaxError; missing.to_string()).in_line(line));
                }
                TokenKind::Word(Word::End) if self.peek_is(&TokenKind::Word(terminator)) => {
                    self.advance();
                    break;
                }
                _ => {
                    if let Some(stmt) = self.statement()? {
                        body.push(stmt);
                    }
                    self.advance();
                }
            }
        }
        Ok(body)
    }

    fn sub_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let (name, params) = self.routine_header()?;
        let mut is_static = false;
        if self.peek_is_word(Word::Static) {
            self.advance();
            is_static = true;
        }
        let body = self.routine_body(Word::Sub, "SUB WITHOUT END SUB", line)?;
        Ok(Statement::Sub(Rc::new(SubDef {
            line,
            name,
            params,
            body,
            is_static,
        })))
    }

    fn function_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let (name, params) = self.routine_header()?;
        let mut return_kind = Kind::infer(&name);
        if self.peek_is_word(Word::As) {
            self.advance();
            self.advance();
            return_kind = self.data_type()?;
        }
        let mut is_static = false;
        if self.peek_is_word(Word::Static) {
            self.advance();
            is_static = true;
        }
        let body = self.routine_body(Word::Function, "FUNCTION WITHOUT END FUNCTION", line)?;
        Ok(Statement::Function(Rc::new(FuncDef {
            line,
            name,
            params,
            return_kind,
            body,
            is_static,
        })))
    }

    fn data_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut values = vec![];
        loop {
            if self.cur_ends_statement() {
                break;
            }
            values.push(self.expression(prec::LOWEST)?);
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                break;
            }
        }
        Ok(Statement::Data(line, values))
    }

    fn read_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let targets = self.expression_list()?;
        Ok(Statement::Read(line, targets))
    }

    fn restore_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut target = None;
        if !self.peek_ends_statement() {
            self.advance();
            target = Some(self.target_name()?);
        }
        Ok(Statement::Restore(line, target))
    }

    fn call_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let name = match self.cur().kind.clone() {
            TokenKind::Ident(ident) => ident.name().to_string(),
            _ => return Err(error!(SyntaxError; "EXPECTED SUB NAME").in_line(self.line())),
        };
        let mut args = vec![];
        if self.peek_is(&TokenKind::LParen) {
            self.advance();
            args = self.call_args()?;
        }
        Ok(Statement::Call(line, name, args))
    }

    fn swap_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let first = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let second = self.expression(prec::LOWEST)?;
        Ok(Statement::Swap(line, first, second))
    }

    fn randomize_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut seed = None;
        if !self.peek_ends_statement() {
            self.advance();
            let timer = matches!(&self.cur().kind, TokenKind::Ident(id) if id.name() == "TIMER");
            if !timer {
                seed = Some(self.expression(prec::LOWEST)?);
            }
        }
        Ok(Statement::Randomize(line, seed))
    }

    fn const_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let ident = match self.cur().kind.clone() {
            TokenKind::Ident(ident) => ident,
            _ => return Err(error!(SyntaxError; "EXPECTED CONSTANT NAME").in_line(self.line())),
        };
        self.expect_peek(TokenKind::Operator(Operator::Equal))?;
        self.advance();
        let value = self.expression(prec::LOWEST)?;
        Ok(Statement::Const(line, ident, value))
    }

    fn open_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let path = self.expression(prec::LOWEST)?;
        let mut mode = String::new();
        if self.peek_is_word(Word::For) {
            self.advance();
            self.advance();
            mode = self.cur().to_string().to_ascii_uppercase();
        }
        while !self.cur_is_word(Word::As) && !self.cur().kind.is_end_of_line() {
            self.advance();
        }
        if !self.cur_is_word(Word::As) {
            return Err(error!(SyntaxError; "EXPECTED AS").in_line(line));
        }
        self.advance();
        if self.cur().kind == TokenKind::Hash {
            self.advance();
        }
        let file_num = self.expression(prec::LOWEST)?;
        let mut rec_len = None;
        if matches!(&self.peek().kind, TokenKind::Ident(id) if id.name() == "LEN") {
            self.advance();
            self.expect_peek(TokenKind::Operator(Operator::Equal))?;
            self.advance();
            rec_len = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Open {
            line,
            path,
            mode,
            file_num,
            rec_len,
        })
    }

    fn close_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut file_nums = vec![];
        while self.peek_is(&TokenKind::Hash) {
            self.advance();
            self.advance();
            file_nums.push(self.expression(prec::LOWEST)?);
            if self.peek_is(&TokenKind::Comma) {
                self.advance();
            }
        }
        Ok(Statement::Close(line, file_nums))
    }

    fn get_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let (file_num, position, target) = self.record_args()?;
        Ok(Statement::Get {
            line,
            file_num,
            position,
            target,
        })
    }

    fn put_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let (file_num, position, source) = self.record_args()?;
        Ok(Statement::Put {
            line,
            file_num,
            position,
            source,
        })
    }

    /// `#n, [position], variable` — shared tail of GET and PUT. The
    /// position may be omitted (`#n, , v`) or elided entirely (`#n, v`).
    fn record_args(&mut self) -> Result<(Expression, Option<Expression>, Expression)> {
        self.expect_peek(TokenKind::Hash)?;
        self.advance();
        let file_num = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            let target = self.expression(prec::LOWEST)?;
            return Ok((file_num, None, target));
        }
        self.advance();
        let first = self.expression(prec::LOWEST)?;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            let target = self.expression(prec::LOWEST)?;
            Ok((file_num, Some(first), target))
        } else {
            Ok((file_num, None, first))
        }
    }

    fn seek_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.expect_peek(TokenKind::Hash)?;
        self.advance();
        let file_num = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let position = self.expression(prec::LOWEST)?;
        Ok(Statement::Seek(line, file_num, position))
    }

    fn pset_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.expect_peek(TokenKind::LParen)?;
        self.advance();
        let x = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let y = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::RParen)?;
        let mut color = None;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            color = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Pset { line, x, y, color })
    }

    fn circle_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.expect_peek(TokenKind::LParen)?;
        self.advance();
        let x = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let y = self.expression(prec::LOWEST)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::Comma)?;
        self.advance();
        let radius = self.expression(prec::LOWEST)?;
        let mut color = None;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            color = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Circle {
            line,
            x,
            y,
            radius,
            color,
        })
    }

    fn locate_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut row = None;
        if self.cur().kind != TokenKind::Comma && !self.cur_ends_statement() {
            row = Some(self.expression(prec::LOWEST)?);
        }
        let mut col = None;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            col = Some(self.expression(prec::LOWEST)?);
        } else if self.cur().kind == TokenKind::Comma {
            self.advance();
            col = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Locate(line, row, col))
    }

    fn color_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mut fg = None;
        if !self.cur_ends_statement() && self.cur().kind != TokenKind::Comma {
            fg = Some(self.expression(prec::LOWEST)?);
        }
        let mut bg = None;
        if self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            bg = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Color(line, fg, bg))
    }

    fn screen_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance();
        let mode = self.expression(prec::LOWEST)?;
        Ok(Statement::Screen(line, mode))
    }

    fn sleep_statement(&mut self) -> Result<Statement> {
        let line = self.line();
        let mut seconds = None;
        if !self.peek_ends_statement() {
            self.advance();
            seconds = Some(self.expression(prec::LOWEST)?);
        }
        Ok(Statement::Sleep(line, seconds))
    }

    fn end_statement(&mut self) -> Result<Option<Statement>> {
        // END IF / END SUB / END FUNCTION / END SELECT are block
        // terminators owned by their parsers; a stray one is skipped.
        if self.peek_is_word(Word::If)
            || self.peek_is_word(Word::Sub)
            || self.peek_is_word(Word::Function)
            || self.peek_is_word(Word::Select)
        {
            self.advance();
            return Ok(None);
        }
        Ok(Some(Statement::End(self.line())))
    }

    // *** Expressions

    fn expression(&mut self, precedence_floor: u8) -> Result<Expression> {
        let mut left = self.prefix()?;
        while !self.peek().kind.is_end_of_line()
            && precedence_floor < precedence(&self.peek().kind)
        {
            self.advance();
            left = self.infix(left)?;
        }
        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expression> {
        let line = self.line();
        match self.cur().kind.clone() {
            TokenKind::Literal(Literal::Integer(s)) => {
                let digits = s.trim_end_matches(|c| c == '%' || c == '&');
                match digits.parse::<i64>() {
                    Ok(n) => Ok(Expression::Integer(line, n)),
                    Err(_) => {
                        Err(error!(SyntaxError; format!("INVALID NUMBER {}", s)).in_line(line))
                    }
                }
            }
            TokenKind::Literal(Literal::Float(s)) => {
                let digits = s.trim_end_matches(|c| c == '!' || c == '#').replacen('D', "E", 1);
                match digits.parse::<f64>() {
                    Ok(n) => Ok(Expression::Float(line, n)),
                    Err(_) => {
                        Err(error!(SyntaxError; format!("INVALID NUMBER {}", s)).in_line(line))
                    }
                }
            }
            TokenKind::Literal(Literal::String(s)) => Ok(Expression::String(line, s)),
            TokenKind::Ident(ident) => {
                if self.peek_is(&TokenKind::LParen) {
                    self.advance();
                    let args = self.call_args()?;
                    Ok(Expression::Call(line, ident.name().to_string(), args))
                } else {
                    Ok(Expression::Ident(line, ident))
                }
            }
            TokenKind::Operator(Operator::Minus) => {
                self.advance();
                let right = self.expression(prec::NEGATE)?;
                Ok(Expression::Unary(line, UnaryOp::Neg, Box::new(right)))
            }
            TokenKind::Operator(Operator::Not) => {
                self.advance();
                let right = self.expression(prec::NOT)?;
                Ok(Expression::Unary(line, UnaryOp::Not, Box::new(right)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression(prec::LOWEST)?;
                self.expect_peek(TokenKind::RParen)?;
                Ok(Expression::Group(line, Box::new(inner)))
            }
            kind => Err(
                error!(SyntaxError; format!("NO PREFIX PARSE FUNCTION FOR {}", kind))
                    .in_line(line),
            ),
        }
    }

    fn infix(&mut self, left: Expression) -> Result<Expression> {
        let line = self.line();
        match self.cur().kind.clone() {
            TokenKind::Operator(op) => {
                let binary = match binary_op(op) {
                    Some(binary) => binary,
                    None => {
                        return Err(error!(SyntaxError; format!("UNEXPECTED {}", op)).in_line(line))
                    }
                };
                let mut floor = precedence(&TokenKind::Operator(op));
                // exponentiation is right-associative
                if op == Operator::Caret {
                    floor -= 1;
                }
                self.advance();
                let right = self.expression(floor)?;
                Ok(Expression::Binary(
                    line,
                    binary,
                    Box::new(left),
                    Box::new(right),
                ))
            }
            TokenKind::LParen => match left {
                Expression::Ident(_, ident) => {
                    let args = self.call_args()?;
                    Ok(Expression::Call(line, ident.name().to_string(), args))
                }
                other => Ok(other),
            },
            kind => Err(error!(SyntaxError; format!("UNEXPECTED {}", kind)).in_line(line)),
        }
    }

    /// Parse `( expr, expr, ... )` with the current token on the open paren.
    fn call_args(&mut self) -> Result<Vec<Expression>> {
        let mut args = vec![];
        if self.peek_is(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        self.advance();
        args.push(self.expression(prec::LOWEST)?);
        while self.peek_is(&TokenKind::Comma) {
            self.advance();
            self.advance();
            args.push(self.expression(prec::LOWEST)?);
        }
        self.expect_peek(TokenKind::RParen)?;
        Ok(args)
    }
}
