#[derive(Debug, PartialEq, Clone)]
pub struct Error {
    kind: ErrorKind,
    line: Option<usize>,
    message: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    SyntaxError,
    TypeError,
    ValueError,
    RangeError,
    NameError,
    IoError,
    ControlError,
    ArithError,
}

#[macro_export]
macro_rules! error {
    ($kind:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorKind::$kind)
    };
    ($kind:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorKind::$kind).message($msg)
    };
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            kind,
            line: None,
            message: None,
        }
    }

    pub fn message<S: Into<String>>(mut self, message: S) -> Error {
        self.message = Some(message.into());
        self
    }

    pub fn in_line(mut self, line: usize) -> Error {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorKind::*;
        let s = match self.kind {
            SyntaxError => "SYNTAX ERROR",
            TypeError => "TYPE MISMATCH",
            ValueError => "ILLEGAL FUNCTION CALL",
            RangeError => "SUBSCRIPT OUT OF RANGE",
            NameError => "UNDEFINED NAME",
            IoError => "I/O ERROR",
            ControlError => "CONTROL ERROR",
            ArithError => "ARITHMETIC ERROR",
        };
        write!(f, "{}", s)?;
        if let Some(message) = &self.message {
            write!(f, "; {}", message)?;
        }
        if let Some(line) = self.line {
            write!(f, " IN LINE {}", line)?;
        }
        Ok(())
    }
}
