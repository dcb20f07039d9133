use qbasic::lang::{lex, parse};
use qbasic::mach::{Runtime, Terminal};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Capture terminal: collects PRINT output and serves scripted INPUT
/// lines (prompts are echoed into the output, like a console would).
pub struct Capture {
    out: Rc<RefCell<String>>,
    input: VecDeque<String>,
}

impl Terminal for Capture {
    fn print(&mut self, text: &str) {
        self.out.borrow_mut().push_str(text);
    }

    fn input(&mut self, prompt: &str) -> String {
        self.out.borrow_mut().push_str(prompt);
        self.input.pop_front().unwrap_or_default()
    }
}

pub fn run(source: &str) -> String {
    run_full(source, &[], None)
}

#[allow(dead_code)]
pub fn run_with_input(source: &str, input: &[&str]) -> String {
    run_full(source, input, None)
}

#[allow(dead_code)]
pub fn run_with_stdin(source: &str, stdin: &str) -> String {
    run_full(source, &[], Some(stdin.to_string()))
}

fn run_full(source: &str, input: &[&str], stdin: Option<String>) -> String {
    let program = match parse(&lex(source)) {
        Ok(program) => program,
        Err(errors) => {
            let mut out = String::new();
            for error in errors {
                out.push_str(&format!("?{}\n", error));
            }
            return out;
        }
    };
    let out = Rc::new(RefCell::new(String::new()));
    let capture = Capture {
        out: Rc::clone(&out),
        input: input.iter().map(|s| s.to_string()).collect(),
    };
    let mut runtime = Runtime::new(program, Box::new(capture));
    if let Some(stdin) = stdin {
        runtime.set_stdin(Box::new(std::io::Cursor::new(stdin.into_bytes())));
    }
    if let Err(error) = runtime.run() {
        out.borrow_mut().push_str(&format!("?{}\n", error));
    }
    let text = out.borrow().clone();
    text
}
