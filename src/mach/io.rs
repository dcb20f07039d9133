use super::file::FileMode;
use super::runtime::Runtime;
use super::val::Val;
use crate::error;
use crate::lang::ast::Expression;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## File-I/O statements
///
/// OPEN through SEEK, as methods on the evaluator. Positions are
/// 1-based: a byte offset in Binary mode, a record index in Random.

impl Runtime {
    fn file_number(&mut self, expr: &Expression) -> Result<i64> {
        self.eval(expr)?.to_i64()
    }

    pub(super) fn open_statement(
        &mut self,
        path: &Expression,
        mode: &str,
        file_num: &Expression,
        rec_len: &Option<Expression>,
    ) -> Result<()> {
        let path = match self.eval(path)? {
            Val::String(s) => s.to_string(),
            _ => return Err(error!(TypeError; "EXPECTED FILE NAME")),
        };
        let number = self.file_number(file_num)?;
        let mode = FileMode::from_name(mode)?;
        let rec_len = match rec_len {
            Some(expr) => Some(usize::try_from(self.eval(expr)?)?),
            None => None,
        };
        self.files().open(number, &path, mode, rec_len)
    }

    pub(super) fn close_statement(&mut self, file_nums: &[Expression]) -> Result<()> {
        if file_nums.is_empty() {
            self.files().close_all();
            return Ok(());
        }
        for expr in file_nums {
            let number = self.file_number(expr)?;
            self.files().close(number)?;
        }
        Ok(())
    }

    pub(super) fn write_to_file(&mut self, file_num: &Expression, text: &str) -> Result<()> {
        let number = self.file_number(file_num)?;
        self.files().get(number)?.write_str(text)
    }

    pub(super) fn input_file_statement(
        &mut self,
        file_num: &Expression,
        targets: &[Expression],
    ) -> Result<()> {
        let number = self.file_number(file_num)?;
        for target in targets {
            let field = if number == 0 {
                self.files().stdin_read_line()?
            } else {
                self.files().get(number)?.read_field()?
            };
            self.assign_input(target, &field)?;
        }
        Ok(())
    }

    pub(super) fn line_input_file_statement(
        &mut self,
        file_num: &Expression,
        target: &Expression,
    ) -> Result<()> {
        let number = self.file_number(file_num)?;
        let line = if number == 0 {
            self.files().stdin_read_line()?
        } else {
            self.files().get(number)?.read_line()?
        };
        self.assign(target, Val::String(line.into()))
    }

    pub(super) fn get_statement(
        &mut self,
        file_num: &Expression,
        position: &Option<Expression>,
        target: &Expression,
    ) -> Result<()> {
        let number = self.file_number(file_num)?;
        if let Some(expr) = position {
            let position = self.eval(expr)?.to_i64()?;
            self.files().get(number)?.seek_to(position)?;
        }
        let kind = self.target_kind(target);
        let val = self.files().get(number)?.read_record(kind)?;
        self.assign(target, val)
    }

    pub(super) fn put_statement(
        &mut self,
        file_num: &Expression,
        position: &Option<Expression>,
        source: &Expression,
    ) -> Result<()> {
        let number = self.file_number(file_num)?;
        if let Some(expr) = position {
            let position = self.eval(expr)?.to_i64()?;
            self.files().get(number)?.seek_to(position)?;
        }
        let val = self.eval(source)?;
        self.files().get(number)?.write_record(&val)
    }

    pub(super) fn seek_statement(
        &mut self,
        file_num: &Expression,
        position: &Expression,
    ) -> Result<()> {
        let number = self.file_number(file_num)?;
        let position = self.eval(position)?.to_i64()?;
        self.files().get(number)?.seek_to(position)
    }
}
