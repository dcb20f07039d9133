use super::env::{Env, EnvRef};
use super::file::FileTable;
use super::function::Function;
use super::operation::Operation;
use super::stack::Stack;
use super::terminal::Terminal;
use super::using;
use super::val::Val;
use super::Array;
use crate::error;
use crate::lang::ast::*;
use crate::lang::Error;
use std::cell::Cell;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Statement outcome: EXIT travels beside the error channel so loops and
/// routines can catch their own kind without overloading errors.
#[derive(Debug)]
pub enum Signal {
    Exit(ExitKind),
    Error(Error),
}

impl From<Error> for Signal {
    fn from(error: Error) -> Signal {
        Signal::Error(error)
    }
}

type Exec = std::result::Result<(), Signal>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Gosub,
    Sub,
    Function,
}

struct CallFrame {
    return_index: usize,
    env: EnvRef,
    kind: FrameKind,
    slot: Option<String>,
}

struct ForFrame {
    var: String,
    end: f64,
    step: f64,
}

/// ## The evaluator
///
/// Walks a parsed [`Program`] statement by statement against the runtime
/// model: the scoped environment, the four execution stacks, the file
/// table, and the built-in registry. The host supplies a [`Terminal`].

pub struct Runtime {
    program: Rc<Program>,
    env: EnvRef,
    module: EnvRef,
    functions: Function,
    files: FileTable,
    terminal: Box<dyn Terminal>,
    pc: usize,
    jumped: bool,
    running: bool,
    data_pointer: usize,
    array_base: i32,
    calls: Stack<CallFrame>,
    fors: Stack<ForFrame>,
    dos: Stack<usize>,
    whiles: Stack<usize>,
    stop_flag: Rc<Cell<bool>>,
}

impl Runtime {
    pub fn new(program: Program, terminal: Box<dyn Terminal>) -> Runtime {
        let module = Env::new_module();
        Runtime {
            program: Rc::new(program),
            env: Rc::clone(&module),
            module,
            functions: Function::new(),
            files: FileTable::new(),
            terminal,
            pc: 0,
            jumped: false,
            running: false,
            data_pointer: 0,
            array_base: 0,
            calls: Stack::new("OUT OF STACK SPACE"),
            fors: Stack::new("FOR STACK OVERFLOW"),
            dos: Stack::new("DO STACK OVERFLOW"),
            whiles: Stack::new("WHILE STACK OVERFLOW"),
            stop_flag: Rc::new(Cell::new(false)),
        }
    }

    /// Replace the reader behind file number 0, which designates the
    /// host's standard input.
    pub fn set_stdin(&mut self, reader: Box<dyn std::io::BufRead>) {
        self.files.set_stdin(reader);
    }

    /// A handle the host may set to request termination; the evaluator
    /// checks it between statements and unwinds cleanly.
    pub fn stop_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.stop_flag)
    }

    fn stopped(&self) -> bool {
        !self.running || self.stop_flag.get()
    }

    /// Execute the program from its first statement until the statement
    /// array is exhausted, END runs, or an error surfaces.
    pub fn run(&mut self) -> Result<()> {
        self.running = true;
        self.pc = 0;
        let program = Rc::clone(&self.program);
        let mut result = Ok(());
        while self.running && !self.stop_flag.get() && self.pc < program.statements.len() {
            let stmt = &program.statements[self.pc];
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Signal::Exit(kind)) => {
                    result = Err(error!(ControlError; format!("EXIT {} WITHOUT ENCLOSING BLOCK", kind))
                        .in_line(stmt.line()));
                    break;
                }
                Err(Signal::Error(e)) => {
                    result = Err(e.in_line(stmt.line()));
                    break;
                }
            }
            if self.jumped {
                self.jumped = false;
            } else {
                self.pc += 1;
            }
        }
        self.running = false;
        self.files.close_all();
        result
    }

    fn exec_block(&mut self, stmts: &[Statement]) -> Exec {
        for stmt in stmts {
            if self.stopped() {
                return Ok(());
            }
            self.execute(stmt).map_err(|signal| match signal {
                Signal::Error(e) => Signal::Error(e.in_line(stmt.line())),
                exit => exit,
            })?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Statement) -> Exec {
        use Statement::*;
        match stmt {
            // markers populated the side tables at parse time; routine
            // bodies run only through the routine maps
            LineMarker(..) | Label(..) | Rem(..) | Data(..) | Sub(_) | Function(_) => Ok(()),
            End(_) => {
                self.running = false;
                Ok(())
            }
            Let(_, target, value) => {
                let val = self.eval(value)?;
                self.assign(target, val)?;
                Ok(())
            }
            Print {
                file_num,
                items,
                no_newline,
                ..
            } => {
                let text = self.render_print_items(items, *no_newline)?;
                match file_num {
                    None => {
                        self.terminal.print(&text);
                        Ok(())
                    }
                    Some(expr) => Ok(self.write_to_file(expr, &text)?),
                }
            }
            PrintUsing {
                file_num,
                format,
                items,
                no_newline,
                ..
            } => {
                let format = Rc::<str>::try_from(self.eval(format)?)?;
                let mut text = String::new();
                for item in items {
                    let val = self.eval(item)?;
                    text.push_str(&using::format_with(&format, &val));
                }
                if !no_newline {
                    text.push('\n');
                }
                match file_num {
                    None => {
                        self.terminal.print(&text);
                        Ok(())
                    }
                    Some(expr) => Ok(self.write_to_file(expr, &text)?),
                }
            }
            Input {
                prompt, targets, ..
            } => self.input_statement(prompt, targets),
            LineInput {
                prompt, target, ..
            } => {
                let prompt = prompt.clone().unwrap_or_default();
                let line = self.terminal.input(&prompt);
                self.assign(target, Val::String(line.into()))?;
                Ok(())
            }
            InputFile(_, file_num, targets) => Ok(self.input_file_statement(file_num, targets)?),
            LineInputFile(_, file_num, target) => {
                Ok(self.line_input_file_statement(file_num, target)?)
            }
            Dim(_, shared, vars) => Ok(self.dim_statement(*shared, vars)?),
            Redim(_, preserve, vars) => Ok(self.redim_statement(*preserve, vars)?),
            Const(_, ident, value) => {
                let val = self.eval(value)?;
                Ok(Env::define_const(&self.env, ident.name(), val)?)
            }
            If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec_block(consequence)
                } else {
                    self.exec_block(alternative)
                }
            }
            For {
                var,
                from,
                to,
                step,
                next_var,
                body,
                ..
            } => self.for_statement(var, from, to, step, next_var, body),
            While {
                condition, body, ..
            } => self.while_statement(condition, body),
            DoLoop { cond, body, .. } => self.do_statement(cond, body),
            Select {
                scrutinee,
                arms,
                else_body,
                ..
            } => self.select_statement(scrutinee, arms, else_body),
            Goto(_, target) => Ok(self.jump(target)?),
            Gosub(_, target) => {
                self.calls.push(CallFrame {
                    return_index: self.pc,
                    env: Rc::clone(&self.env),
                    kind: FrameKind::Gosub,
                    slot: None,
                })?;
                Ok(self.jump(target)?)
            }
            OnGoto(_, selector, targets) => {
                let k = self.eval(selector)?.to_i64()?;
                if k >= 1 && k <= targets.len() as i64 {
                    self.jump(&targets[k as usize - 1])?;
                }
                Ok(())
            }
            OnGosub(_, selector, targets) => {
                let k = self.eval(selector)?.to_i64()?;
                if k >= 1 && k <= targets.len() as i64 {
                    self.calls.push(CallFrame {
                        return_index: self.pc,
                        env: Rc::clone(&self.env),
                        kind: FrameKind::Gosub,
                        slot: None,
                    })?;
                    self.jump(&targets[k as usize - 1])?;
                }
                Ok(())
            }
            Return(_, value) => self.return_statement(value),
            Exit(_, kind) => self.exit_statement(*kind),
            Next(..) => Err(error!(ControlError; "NEXT WITHOUT FOR").into()),
            Call(_, name, args) => self.call_sub(name, args),
            Read(_, targets) => self.read_statement(targets),
            Restore(_, target) => self.restore_statement(target),
            Swap(_, first, second) => {
                let a = self.eval(first)?;
                let b = self.eval(second)?;
                self.assign(first, b)?;
                self.assign(second, a)?;
                Ok(())
            }
            Randomize(_, seed) => {
                let seed = match seed {
                    Some(expr) => Some(self.eval(expr)?.to_i64()?),
                    None => None,
                };
                self.functions.randomize(seed);
                Ok(())
            }
            Open {
                path,
                mode,
                file_num,
                rec_len,
                ..
            } => Ok(self.open_statement(path, mode, file_num, rec_len)?),
            Close(_, file_nums) => Ok(self.close_statement(file_nums)?),
            Get {
                file_num,
                position,
                target,
                ..
            } => Ok(self.get_statement(file_num, position, target)?),
            Put {
                file_num,
                position,
                source,
                ..
            } => Ok(self.put_statement(file_num, position, source)?),
            Seek(_, file_num, position) => Ok(self.seek_statement(file_num, position)?),
            OptionBase(_, base) => {
                self.array_base = *base;
                Ok(())
            }
            Cls(_) => {
                self.terminal.clear();
                Ok(())
            }
            Locate(_, row, col) => {
                let row = match row {
                    Some(expr) => self.eval(expr)?.to_i64()?,
                    None => 1,
                };
                let col = match col {
                    Some(expr) => self.eval(expr)?.to_i64()?,
                    None => 1,
                };
                self.terminal.locate(row, col);
                Ok(())
            }
            Color(_, fg, bg) => {
                let fg = match fg {
                    Some(expr) => self.eval(expr)?.to_i64()?,
                    None => 7,
                };
                let bg = match bg {
                    Some(expr) => self.eval(expr)?.to_i64()?,
                    None => 0,
                };
                self.terminal.set_color(fg, bg);
                Ok(())
            }
            Screen(_, mode) => {
                // text-mode host; the mode is accepted and ignored
                self.eval(mode)?;
                Ok(())
            }
            Beep(_) => {
                self.terminal.print("\x07");
                Ok(())
            }
            Sleep(_, seconds) => {
                if let Some(expr) = seconds {
                    let seconds = self.eval(expr)?.to_f64()?;
                    if seconds > 0.0 {
                        std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
                    }
                }
                Ok(())
            }
            Pset { x, y, color, .. } => {
                let x = self.eval(x)?.to_i64()?;
                let y = self.eval(y)?.to_i64()?;
                if let Some(color) = color {
                    self.eval(color)?;
                }
                self.draw_pixel(x, y);
                self.terminal.show();
                Ok(())
            }
            LineDraw {
                x1,
                y1,
                x2,
                y2,
                color,
                fill,
                ..
            } => {
                let x1 = self.eval(x1)?.to_i64()?;
                let y1 = self.eval(y1)?.to_i64()?;
                let x2 = self.eval(x2)?.to_i64()?;
                let y2 = self.eval(y2)?.to_i64()?;
                if let Some(color) = color {
                    self.eval(color)?;
                }
                match fill {
                    LineFill::Box => {
                        self.draw_line(x1, y1, x2, y1);
                        self.draw_line(x2, y1, x2, y2);
                        self.draw_line(x2, y2, x1, y2);
                        self.draw_line(x1, y2, x1, y1);
                    }
                    LineFill::BoxFill => {
                        for y in y1.min(y2)..=y1.max(y2) {
                            for x in x1.min(x2)..=x1.max(x2) {
                                self.draw_pixel(x, y);
                            }
                        }
                    }
                    LineFill::None => self.draw_line(x1, y1, x2, y2),
                }
                self.terminal.show();
                Ok(())
            }
            Circle {
                x, y, radius, color, ..
            } => {
                let x = self.eval(x)?.to_i64()?;
                let y = self.eval(y)?.to_i64()?;
                let radius = self.eval(radius)?.to_i64()?;
                if let Some(color) = color {
                    self.eval(color)?;
                }
                self.draw_circle(x, y, radius);
                self.terminal.show();
                Ok(())
            }
        }
    }

    // *** Control flow

    fn for_statement(
        &mut self,
        var: &Ident,
        from: &Expression,
        to: &Expression,
        step: &Option<Expression>,
        next_var: &Option<Ident>,
        body: &[Statement],
    ) -> Exec {
        let start = self.eval(from)?;
        Env::set(&self.env, var.name(), start)?;
        let end = self.eval(to)?.to_f64()?;
        let step = match step {
            Some(expr) => self.eval(expr)?.to_f64()?,
            None => 1.0,
        };
        self.fors.push(ForFrame {
            var: var.name().to_string(),
            end,
            step,
        })?;
        // the optional variable after NEXT must name the innermost loop
        if let Some(next_var) = next_var {
            let matches = self
                .fors
                .last()
                .map(|frame| next_var.name().eq_ignore_ascii_case(&frame.var))
                .unwrap_or(false);
            if !matches {
                self.fors.pop();
                return Err(error!(ControlError; "NEXT WITHOUT FOR").into());
            }
        }
        let result = self.run_for(var, body);
        self.fors.pop();
        result
    }

    fn run_for(&mut self, var: &Ident, body: &[Statement]) -> Exec {
        loop {
            if self.stopped() {
                return Ok(());
            }
            let (end, step) = match self.fors.last() {
                Some(frame) => (frame.end, frame.step),
                None => return Err(error!(ControlError; "NEXT WITHOUT FOR").into()),
            };
            let current = Env::fetch(&self.env, var.name(), var.kind()).to_f64()?;
            if step >= 0.0 && current > end {
                return Ok(());
            }
            if step < 0.0 && current < end {
                return Ok(());
            }
            match self.exec_block(body) {
                Ok(()) => {}
                Err(Signal::Exit(ExitKind::For)) => return Ok(()),
                Err(other) => return Err(other),
            }
            let current = Env::fetch(&self.env, var.name(), var.kind()).to_f64()?;
            Env::set(&self.env, var.name(), Val::Double(current + step))?;
        }
    }

    fn while_statement(&mut self, condition: &Expression, body: &[Statement]) -> Exec {
        self.whiles.push(self.pc)?;
        let result = self.run_while(condition, body);
        self.whiles.pop();
        result
    }

    fn run_while(&mut self, condition: &Expression, body: &[Statement]) -> Exec {
        loop {
            if self.stopped() {
                return Ok(());
            }
            if !self.eval(condition)?.is_truthy() {
                return Ok(());
            }
            match self.exec_block(body) {
                Ok(()) => {}
                Err(Signal::Exit(ExitKind::While)) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
    }

    fn do_statement(&mut self, cond: &DoCond, body: &[Statement]) -> Exec {
        self.dos.push(self.pc)?;
        let result = self.run_do(cond, body);
        self.dos.pop();
        result
    }

    fn run_do(&mut self, cond: &DoCond, body: &[Statement]) -> Exec {
        loop {
            if self.stopped() {
                return Ok(());
            }
            match cond {
                DoCond::PreWhile(expr) => {
                    if !self.eval(expr)?.is_truthy() {
                        return Ok(());
                    }
                }
                DoCond::PreUntil(expr) => {
                    if self.eval(expr)?.is_truthy() {
                        return Ok(());
                    }
                }
                _ => {}
            }
            match self.exec_block(body) {
                Ok(()) => {}
                Err(Signal::Exit(ExitKind::Do)) => return Ok(()),
                Err(other) => return Err(other),
            }
            match cond {
                DoCond::PostWhile(expr) => {
                    if !self.eval(expr)?.is_truthy() {
                        return Ok(());
                    }
                }
                DoCond::PostUntil(expr) => {
                    if self.eval(expr)?.is_truthy() {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn select_statement(
        &mut self,
        scrutinee: &Expression,
        arms: &[CaseArm],
        else_body: &[Statement],
    ) -> Exec {
        let value = self.eval(scrutinee)?;
        for arm in arms {
            let mut matched = false;
            for case in &arm.values {
                matched = match case {
                    CaseValue::One(expr) => {
                        let candidate = self.eval(expr)?;
                        Operation::compare(&value, &candidate)? == Ordering::Equal
                    }
                    CaseValue::Range(lo, hi) => {
                        let lo = self.eval(lo)?;
                        let hi = self.eval(hi)?;
                        Operation::compare(&value, &lo)? != Ordering::Less
                            && Operation::compare(&value, &hi)? != Ordering::Greater
                    }
                    CaseValue::Is(op, expr) => {
                        let candidate = self.eval(expr)?;
                        let ordering = Operation::compare(&value, &candidate)?;
                        match op {
                            BinaryOp::Eq => ordering == Ordering::Equal,
                            BinaryOp::Ne => ordering != Ordering::Equal,
                            BinaryOp::Lt => ordering == Ordering::Less,
                            BinaryOp::Gt => ordering == Ordering::Greater,
                            BinaryOp::Le => ordering != Ordering::Greater,
                            BinaryOp::Ge => ordering != Ordering::Less,
                            _ => false,
                        }
                    }
                };
                if matched {
                    break;
                }
            }
            if matched {
                return self.exec_block(&arm.body);
            }
        }
        self.exec_block(else_body)
    }

    fn return_statement(&mut self, value: &Option<Expression>) -> Exec {
        match self.calls.last().map(|frame| frame.kind) {
            None => Err(error!(ControlError; "RETURN WITHOUT GOSUB").into()),
            Some(FrameKind::Gosub) => {
                if let Some(frame) = self.calls.pop() {
                    self.pc = frame.return_index;
                }
                Ok(())
            }
            Some(FrameKind::Sub) => Err(Signal::Exit(ExitKind::Sub)),
            Some(FrameKind::Function) => {
                if let Some(expr) = value {
                    let val = self.eval(expr)?;
                    let slot = self.calls.last().and_then(|frame| frame.slot.clone());
                    if let Some(slot) = slot {
                        Env::set(&self.env, &slot, val)?;
                    }
                }
                Err(Signal::Exit(ExitKind::Function))
            }
        }
    }

    fn exit_statement(&mut self, kind: ExitKind) -> Exec {
        let enclosed = match kind {
            ExitKind::For => !self.fors.is_empty(),
            ExitKind::Do => !self.dos.is_empty(),
            ExitKind::While => !self.whiles.is_empty(),
            ExitKind::Sub => self
                .calls
                .last()
                .map(|frame| frame.kind == FrameKind::Sub)
                .unwrap_or(false),
            ExitKind::Function => self
                .calls
                .last()
                .map(|frame| frame.kind == FrameKind::Function)
                .unwrap_or(false),
        };
        if !enclosed {
            return Err(
                error!(ControlError; format!("EXIT {} WITHOUT ENCLOSING BLOCK", kind)).into(),
            );
        }
        Err(Signal::Exit(kind))
    }

    fn resolve(&self, target: &str) -> Result<usize> {
        if let Ok(number) = target.parse::<u16>() {
            if let Some(&idx) = self.program.line_numbers.get(&number) {
                return Ok(idx);
            }
        }
        if let Some(&idx) = self.program.labels.get(&target.to_ascii_uppercase()) {
            return Ok(idx);
        }
        Err(error!(NameError; format!("UNDEFINED LINE OR LABEL {}", target)))
    }

    fn jump(&mut self, target: &str) -> Result<()> {
        self.pc = self.resolve(target)?;
        self.jumped = true;
        Ok(())
    }

    // *** Routines

    fn call_sub(&mut self, name: &str, args: &[Expression]) -> Exec {
        let def = match self.program.subs.get(&name.to_ascii_uppercase()) {
            Some(def) => Rc::clone(def),
            None => return Err(error!(NameError; format!("UNDEFINED SUB {}", name)).into()),
        };
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.eval(arg)?);
        }
        let local = Env::new_enclosed(&self.env);
        bind_params(&local, &def.params, vals)?;
        self.calls.push(CallFrame {
            return_index: self.pc,
            env: Rc::clone(&self.env),
            kind: FrameKind::Sub,
            slot: None,
        })?;
        self.env = local;
        let result = match self.exec_block(&def.body) {
            Ok(()) | Err(Signal::Exit(ExitKind::Sub)) => Ok(()),
            Err(other) => Err(other),
        };
        if let Some(frame) = self.calls.pop() {
            self.env = frame.env;
        }
        result
    }

    fn call_function(&mut self, def: Rc<FuncDef>, args: &[Expression]) -> Result<Val> {
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.eval(arg)?);
        }
        let local = Env::new_enclosed(&self.env);
        bind_params(&local, &def.params, vals)?;
        // the function-name slot doubles as the return value
        Env::declare(&local, &def.name, def.return_kind);
        self.calls.push(CallFrame {
            return_index: self.pc,
            env: Rc::clone(&self.env),
            kind: FrameKind::Function,
            slot: Some(def.name.clone()),
        })?;
        self.env = Rc::clone(&local);
        let result = match self.exec_block(&def.body) {
            Ok(()) | Err(Signal::Exit(ExitKind::Function)) => Ok(()),
            Err(Signal::Exit(kind)) => {
                Err(error!(ControlError; format!("EXIT {} WITHOUT ENCLOSING BLOCK", kind)))
            }
            Err(Signal::Error(e)) => Err(e),
        };
        if let Some(frame) = self.calls.pop() {
            self.env = frame.env;
        }
        result?;
        let ret = Env::get(&local, &def.name).unwrap_or_else(|| Val::default_for(def.return_kind));
        ret.coerce(def.return_kind)
    }

    // *** DATA

    fn read_statement(&mut self, targets: &[Expression]) -> Exec {
        let program = Rc::clone(&self.program);
        for target in targets {
            if self.data_pointer >= program.data_items.len() {
                return Err(error!(ControlError; "OUT OF DATA").into());
            }
            let val = self.eval(&program.data_items[self.data_pointer])?;
            self.data_pointer += 1;
            self.assign(target, val)?;
        }
        Ok(())
    }

    fn restore_statement(&mut self, target: &Option<String>) -> Exec {
        let target = match target {
            None => {
                self.data_pointer = 0;
                return Ok(());
            }
            Some(target) => target,
        };
        let idx = self.resolve(target)?;
        let mut count = 0;
        for stmt in &self.program.statements[..idx] {
            if let Statement::Data(_, values) = stmt {
                count += values.len();
            }
        }
        self.data_pointer = count;
        Ok(())
    }

    // *** PRINT and INPUT

    pub(super) fn render_print_items(
        &mut self,
        items: &[PrintItem],
        no_newline: bool,
    ) -> Result<String> {
        let mut out = String::new();
        let mut col = 0;
        for item in items {
            let val = self.eval(&item.expr)?;
            let text = format_print(&val);
            col += text.chars().count();
            out.push_str(&text);
            if let Sep::Comma = item.sep {
                // expand to the next 14-column zone
                let spaces = 14 - (col % 14);
                out.push_str(&" ".repeat(spaces));
                col += spaces;
            }
        }
        if !no_newline {
            out.push('\n');
        }
        Ok(out)
    }

    fn input_statement(&mut self, prompt: &Option<String>, targets: &[Expression]) -> Exec {
        let prompt = prompt.clone().unwrap_or_else(|| "? ".to_string());
        let line = self.terminal.input(&prompt);
        let fields: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();
        for (i, target) in targets.iter().enumerate() {
            if i >= fields.len() {
                break;
            }
            self.assign_input(target, &fields[i])?;
        }
        Ok(())
    }

    /// Bind one INPUT field: strings verbatim, numbers through the
    /// prefix parser (malformed input reads as 0).
    pub(super) fn assign_input(&mut self, target: &Expression, field: &str) -> Result<()> {
        let kind = self.target_kind(target);
        let val = if kind == Kind::String {
            Val::String(field.into())
        } else {
            Val::Double(Val::parse_number(field)).coerce(kind)?
        };
        self.assign(target, val)
    }

    pub(super) fn target_kind(&mut self, target: &Expression) -> Kind {
        match target {
            Expression::Ident(_, ident) => match Env::get(&self.env, ident.name()) {
                Some(val) => val.kind(),
                None => ident.kind().unwrap_or_else(|| Kind::infer(ident.name())),
            },
            Expression::Call(_, name, _) => {
                match Env::with_array(&self.env, name, |array| Ok(array.kind())) {
                    Some(Ok(kind)) => kind,
                    _ => Kind::infer(name),
                }
            }
            _ => Kind::Single,
        }
    }

    // *** Declarations

    fn dim_statement(&mut self, shared: bool, vars: &[DimVar]) -> Result<()> {
        for var in vars {
            let kind = var.kind.unwrap_or_else(|| Kind::infer(&var.name));
            if var.dims.is_empty() {
                if shared {
                    Env::mark_shared(&self.env, &var.name);
                    Env::declare(&self.module, &var.name, kind);
                } else {
                    Env::declare(&self.env, &var.name, kind);
                }
                continue;
            }
            let array = Array::new(kind, self.eval_bounds(&var.dims)?)?;
            if shared {
                Env::declare_array_shared(&self.env, &var.name, array);
            } else {
                Env::declare_array(&self.env, &var.name, array);
            }
        }
        Ok(())
    }

    fn redim_statement(&mut self, preserve: bool, vars: &[DimVar]) -> Result<()> {
        for var in vars {
            if var.dims.is_empty() {
                continue;
            }
            let kind = var
                .kind
                .or_else(|| {
                    Env::with_array(&self.env, &var.name, |array| Ok(array.kind()))
                        .and_then(|r| r.ok())
                })
                .unwrap_or_else(|| Kind::infer(&var.name));
            let mut array = Array::new(kind, self.eval_bounds(&var.dims)?)?;
            if preserve {
                if let Some(old) = Env::clone_array(&self.env, &var.name) {
                    array.preserve_from(&old);
                }
            }
            Env::declare_array(&self.env, &var.name, array);
        }
        Ok(())
    }

    fn eval_bounds(&mut self, dims: &[Expression]) -> Result<Vec<(i32, i32)>> {
        let mut bounds = Vec::with_capacity(dims.len());
        for dim in dims {
            let upper = i32::try_from(self.eval(dim)?)?;
            bounds.push((self.array_base, upper));
        }
        Ok(bounds)
    }

    // *** Expressions

    pub(super) fn eval(&mut self, expr: &Expression) -> Result<Val> {
        match expr {
            Expression::Integer(_, n) => {
                if *n >= i32::min_value() as i64 && *n <= i32::max_value() as i64 {
                    Ok(Val::Long(*n as i32))
                } else {
                    Ok(Val::Double(*n as f64))
                }
            }
            Expression::Float(_, n) => Ok(Val::Double(*n)),
            Expression::String(_, s) => Ok(Val::String(s.as_str().into())),
            Expression::Ident(_, ident) => self.eval_ident(ident),
            Expression::Call(_, name, args) => self.eval_call(name, args),
            Expression::Unary(_, UnaryOp::Neg, inner) => {
                let val = self.eval(inner)?;
                Operation::negate(val)
            }
            Expression::Unary(_, UnaryOp::Not, inner) => {
                let val = self.eval(inner)?;
                Operation::not(val)
            }
            Expression::Binary(_, op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                Operation::binary(*op, lhs, rhs)
            }
            Expression::Group(_, inner) => self.eval(inner),
        }
    }

    fn eval_ident(&mut self, ident: &Ident) -> Result<Val> {
        match ident.name() {
            // built-ins callable without parentheses
            "RND" | "TIMER" | "DATE$" | "TIME$" | "PI" => {
                self.functions.call(ident.name(), vec![])
            }
            "INKEY$" => Ok(Val::String(self.terminal.key().into())),
            "FREEFILE" => Ok(Val::Long(self.files.freefile() as i32)),
            name => Ok(Env::fetch(&self.env, name, ident.kind())),
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        // an identifier with subscripts is an array when one exists,
        // otherwise a routine or built-in call
        if Env::has_array(&self.env, name) {
            let subscripts = self.subscripts(args)?;
            return match Env::with_array(&self.env, name, |array| array.get(&subscripts)) {
                Some(result) => result,
                None => Err(error!(NameError; format!("UNDEFINED ARRAY {}", name))),
            };
        }
        if let Some(def) = self.program.functions.get(&name.to_ascii_uppercase()) {
            let def = Rc::clone(def);
            return self.call_function(def, args);
        }
        match name {
            "EOF" => {
                let n = self.file_number_arg(args)?;
                Ok(Val::from_bool(self.files.eof(n)?))
            }
            "LOC" => {
                let n = self.file_number_arg(args)?;
                Ok(Val::Long(self.files.get(n)?.loc()? as i32))
            }
            "LOF" => {
                let n = self.file_number_arg(args)?;
                Ok(Val::Long(self.files.get(n)?.lof()? as i32))
            }
            "FREEFILE" => Ok(Val::Long(self.files.freefile() as i32)),
            "INKEY$" => Ok(Val::String(self.terminal.key().into())),
            _ => {
                let mut vals = Vec::with_capacity(args.len());
                for arg in args {
                    vals.push(self.eval(arg)?);
                }
                self.functions.call(name, vals)
            }
        }
    }

    fn file_number_arg(&mut self, args: &[Expression]) -> Result<i64> {
        match args.first() {
            Some(expr) => self.eval(expr)?.to_i64(),
            None => Err(error!(ValueError; "WRONG NUMBER OF ARGUMENTS")),
        }
    }

    pub(super) fn subscripts(&mut self, args: &[Expression]) -> Result<Vec<i32>> {
        let mut subscripts = Vec::with_capacity(args.len());
        for arg in args {
            subscripts.push(i32::try_from(self.eval(arg)?)?);
        }
        Ok(subscripts)
    }

    /// Bind a value to an assignment target: a scalar or an array
    /// element. Assigning through a routine-call form is an error.
    pub(super) fn assign(&mut self, target: &Expression, val: Val) -> Result<()> {
        match target {
            Expression::Ident(_, ident) => {
                if Env::has_array(&self.env, ident.name()) {
                    return Err(error!(TypeError; "ARRAY NEEDS SUBSCRIPTS"));
                }
                Env::set(&self.env, ident.name(), val)
            }
            Expression::Call(_, name, args) => {
                if !Env::has_array(&self.env, name) {
                    return Err(error!(TypeError; "CANNOT ASSIGN TO FUNCTION"));
                }
                let subscripts = self.subscripts(args)?;
                match Env::with_array(&self.env, name, |array| array.set(&subscripts, val)) {
                    Some(result) => result,
                    None => Err(error!(NameError; format!("UNDEFINED ARRAY {}", name))),
                }
            }
            _ => Err(error!(TypeError; "INVALID ASSIGNMENT TARGET")),
        }
    }

    // *** Graphics
    //
    // A 320x200 virtual canvas scaled onto the terminal cell grid; the
    // fidelity contract is approximate.

    fn draw_pixel(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 {
            return;
        }
        let (rows, cols) = self.terminal.size();
        let tx = x as usize * cols / 320;
        let ty = y as usize * rows / 200;
        if tx < cols && ty < rows {
            self.terminal.set_cell(tx, ty, '\u{2588}');
        }
    }

    fn draw_line(&mut self, mut x1: i64, mut y1: i64, x2: i64, y2: i64) {
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x1 > x2 { -1 } else { 1 };
        let sy = if y1 > y2 { -1 } else { 1 };
        let mut err = dx - dy;
        loop {
            self.draw_pixel(x1, y1);
            if x1 == x2 && y1 == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x1 += sx;
            }
            if e2 < dx {
                err += dx;
                y1 += sy;
            }
        }
    }

    fn draw_circle(&mut self, cx: i64, cy: i64, radius: i64) {
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;
        while x >= y {
            self.draw_pixel(cx + x, cy + y);
            self.draw_pixel(cx + y, cy + x);
            self.draw_pixel(cx - y, cy + x);
            self.draw_pixel(cx - x, cy + y);
            self.draw_pixel(cx - x, cy - y);
            self.draw_pixel(cx - y, cy - x);
            self.draw_pixel(cx + y, cy - x);
            self.draw_pixel(cx + x, cy - y);
            y += 1;
            if err <= 0 {
                err += 2 * y + 1;
            }
            if err > 0 {
                x -= 1;
                err -= 2 * x + 1;
            }
        }
    }
}

fn bind_params(env: &EnvRef, params: &[Param], vals: Vec<Val>) -> Result<()> {
    // arguments were evaluated in the caller's scope and bind by value;
    // BYVAL/BYREF markers are accepted but not distinguished
    let mut vals = vals.into_iter();
    for param in params {
        let kind = param.kind.unwrap_or_else(|| Kind::infer(&param.name));
        Env::declare(env, &param.name, kind);
        if let Some(val) = vals.next() {
            Env::set(env, &param.name, val)?;
        }
    }
    Ok(())
}

fn format_print(val: &Val) -> String {
    match val {
        Val::String(s) => s.to_string(),
        other => {
            let text = other.to_string();
            if text.starts_with('-') {
                format!("{} ", text)
            } else {
                format!(" {} ", text)
            }
        }
    }
}

impl Runtime {
    pub(super) fn files(&mut self) -> &mut FileTable {
        &mut self.files
    }
}
