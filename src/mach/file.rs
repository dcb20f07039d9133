use super::Val;
use crate::error;
use crate::lang::ast::Kind;
use crate::lang::Error;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};

type Result<T> = std::result::Result<T, Error>;

pub const MAX_FILE_NUMBER: i64 = 255;
const DEFAULT_RECORD_LEN: usize = 128;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileMode {
    Input,
    Output,
    Append,
    Binary,
    Random,
}

impl FileMode {
    pub fn from_name(name: &str) -> Result<FileMode> {
        use FileMode::*;
        Ok(match name {
            "INPUT" => Input,
            "OUTPUT" => Output,
            "APPEND" => Append,
            "BINARY" => Binary,
            "RANDOM" => Random,
            _ => return Err(error!(IoError; "BAD FILE MODE")),
        })
    }
}

/// ## File handles
///
/// One open file: its mode, the record length for Random access, and a
/// buffered reader when the mode calls for text input.

#[derive(Debug)]
pub struct FileHandle {
    pub name: String,
    pub mode: FileMode,
    pub rec_len: usize,
    reader: Option<BufReader<File>>,
    file: Option<File>,
}

impl FileHandle {
    fn open(name: &str, mode: FileMode, rec_len: Option<usize>) -> Result<FileHandle> {
        let mut reader = None;
        let mut file = None;
        match mode {
            FileMode::Input => match File::open(name) {
                Ok(f) => reader = Some(BufReader::new(f)),
                Err(_) => return Err(error!(IoError; "FILE NOT FOUND")),
            },
            FileMode::Output => match File::create(name) {
                Ok(f) => file = Some(f),
                Err(_) => return Err(error!(IoError; format!("CANNOT OPEN {}", name))),
            },
            FileMode::Append => {
                match OpenOptions::new().append(true).create(true).open(name) {
                    Ok(f) => file = Some(f),
                    Err(_) => return Err(error!(IoError; format!("CANNOT OPEN {}", name))),
                }
            }
            FileMode::Binary | FileMode::Random => {
                match OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .open(name)
                {
                    Ok(f) => file = Some(f),
                    Err(_) => return Err(error!(IoError; format!("CANNOT OPEN {}", name))),
                }
            }
        }
        Ok(FileHandle {
            name: name.to_string(),
            mode,
            rec_len: rec_len.unwrap_or(DEFAULT_RECORD_LEN),
            reader,
            file,
        })
    }

    fn reader(&mut self) -> Result<&mut BufReader<File>> {
        match self.reader.as_mut() {
            Some(reader) => Ok(reader),
            None => Err(error!(IoError; "BAD FILE MODE")),
        }
    }

    fn file(&mut self) -> Result<&mut File> {
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(error!(IoError; "BAD FILE MODE")),
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        let reader = self.reader()?;
        let buf = reader.fill_buf().map_err(|_| error!(IoError))?;
        Ok(buf.first().copied())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.reader()?.consume(1);
        }
        Ok(byte)
    }

    /// One comma- or newline-delimited field, leading whitespace skipped.
    pub fn read_field(&mut self) -> Result<String> {
        while let Some(byte) = self.peek_byte()? {
            if byte == b' ' || byte == b'\t' {
                self.read_byte()?;
            } else {
                break;
            }
        }
        let mut field = Vec::new();
        while let Some(byte) = self.read_byte()? {
            match byte {
                b',' | b'\n' => break,
                b'\r' => {
                    if self.peek_byte()? == Some(b'\n') {
                        self.read_byte()?;
                    }
                    break;
                }
                _ => field.push(byte),
            }
        }
        Ok(String::from_utf8_lossy(&field).trim().to_string())
    }

    /// One whole line without its terminator; empty at end of file.
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.reader()?
            .read_line(&mut line)
            .map_err(|_| error!(IoError))?;
        Ok(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string())
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.file()?
            .write_all(text.as_bytes())
            .map_err(|_| error!(IoError; "WRITE FAILURE"))
    }

    pub fn eof(&mut self) -> Result<bool> {
        if self.reader.is_some() {
            return Ok(self.peek_byte()?.is_none());
        }
        let file = self.file()?;
        let position = file.stream_position().map_err(|_| error!(IoError))?;
        let length = file.metadata().map_err(|_| error!(IoError))?.len();
        Ok(position >= length)
    }

    /// Current position: a byte offset, or a record index in Random mode.
    pub fn loc(&mut self) -> Result<i64> {
        let position = match self.reader.as_mut() {
            Some(reader) => reader.stream_position().map_err(|_| error!(IoError))?,
            None => self.file()?.stream_position().map_err(|_| error!(IoError))?,
        };
        if self.mode == FileMode::Random {
            Ok(position as i64 / self.rec_len as i64)
        } else {
            Ok(position as i64)
        }
    }

    pub fn lof(&mut self) -> Result<i64> {
        let metadata = match self.reader.as_ref() {
            Some(reader) => reader.get_ref().metadata(),
            None => self.file()?.metadata(),
        };
        Ok(metadata.map_err(|_| error!(IoError))?.len() as i64)
    }

    /// Move to a 1-based position: a byte for Binary, a record for Random.
    pub fn seek_to(&mut self, position: i64) -> Result<()> {
        if position < 1 {
            return Err(error!(IoError; "BAD RECORD NUMBER"));
        }
        let offset = if self.mode == FileMode::Random {
            (position - 1) * self.rec_len as i64
        } else {
            position - 1
        };
        self.file()?
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|_| error!(IoError))?;
        Ok(())
    }

    /// Fixed-width little-endian record read for the given kind.
    pub fn read_record(&mut self, kind: Kind) -> Result<Val> {
        let rec_len = self.rec_len;
        let file = self.file()?;
        let err = |_| error!(IoError; "READ PAST END");
        match kind {
            Kind::Integer => {
                let mut buf = [0u8; 2];
                file.read_exact(&mut buf).map_err(err)?;
                Ok(Val::Integer(i16::from_le_bytes(buf)))
            }
            Kind::Long => {
                let mut buf = [0u8; 4];
                file.read_exact(&mut buf).map_err(err)?;
                Ok(Val::Long(i32::from_le_bytes(buf)))
            }
            Kind::Single => {
                let mut buf = [0u8; 4];
                file.read_exact(&mut buf).map_err(err)?;
                Ok(Val::Single(f32::from_le_bytes(buf)))
            }
            Kind::Double => {
                let mut buf = [0u8; 8];
                file.read_exact(&mut buf).map_err(err)?;
                Ok(Val::Double(f64::from_le_bytes(buf)))
            }
            Kind::String => {
                let mut buf = vec![0u8; rec_len];
                let n = file.read(&mut buf).map_err(err)?;
                let text = String::from_utf8_lossy(&buf[..n]);
                Ok(Val::String(text.trim_end_matches('\0').into()))
            }
        }
    }

    /// Fixed-width little-endian record write; strings fill or truncate
    /// to the record length and are NUL-padded.
    pub fn write_record(&mut self, val: &Val) -> Result<()> {
        let rec_len = self.rec_len;
        let file = self.file()?;
        let err = |_| error!(IoError; "WRITE FAILURE");
        match val {
            Val::Integer(n) => file.write_all(&n.to_le_bytes()).map_err(err),
            Val::Long(n) => file.write_all(&n.to_le_bytes()).map_err(err),
            Val::Single(n) => file.write_all(&n.to_le_bytes()).map_err(err),
            Val::Double(n) => file.write_all(&n.to_le_bytes()).map_err(err),
            Val::String(s) => {
                let mut buf = vec![0u8; rec_len];
                let bytes = s.as_bytes();
                let n = bytes.len().min(rec_len);
                buf[..n].copy_from_slice(&bytes[..n]);
                file.write_all(&buf).map_err(err)
            }
        }
    }
}

/// ## File table
///
/// File numbers 1..255 map to open handles. Number 0 designates the
/// host's standard input, which tests may replace.

pub struct FileTable {
    files: HashMap<i64, FileHandle>,
    stdin: Option<Box<dyn BufRead>>,
}

impl Default for FileTable {
    fn default() -> FileTable {
        FileTable::new()
    }
}

impl FileTable {
    pub fn new() -> FileTable {
        FileTable {
            files: HashMap::new(),
            stdin: None,
        }
    }

    pub fn set_stdin(&mut self, reader: Box<dyn BufRead>) {
        self.stdin = Some(reader);
    }

    fn stdin(&mut self) -> &mut Box<dyn BufRead> {
        self.stdin
            .get_or_insert_with(|| Box::new(BufReader::new(std::io::stdin())))
    }

    pub fn open(
        &mut self,
        number: i64,
        name: &str,
        mode: FileMode,
        rec_len: Option<usize>,
    ) -> Result<()> {
        if number < 1 || number > MAX_FILE_NUMBER {
            return Err(error!(IoError; "BAD FILE NUMBER"));
        }
        if self.files.contains_key(&number) {
            return Err(error!(IoError; "FILE ALREADY OPEN"));
        }
        let handle = FileHandle::open(name, mode, rec_len)?;
        self.files.insert(number, handle);
        Ok(())
    }

    pub fn close(&mut self, number: i64) -> Result<()> {
        match self.files.remove(&number) {
            Some(_) => Ok(()),
            None => Err(error!(IoError; "FILE NOT OPEN")),
        }
    }

    pub fn close_all(&mut self) {
        self.files.clear();
    }

    pub fn get(&mut self, number: i64) -> Result<&mut FileHandle> {
        match self.files.get_mut(&number) {
            Some(handle) => Ok(handle),
            None => Err(error!(IoError; "FILE NOT OPEN")),
        }
    }

    /// The smallest unused file number.
    pub fn freefile(&self) -> i64 {
        for n in 1..=MAX_FILE_NUMBER {
            if !self.files.contains_key(&n) {
                return n;
            }
        }
        0
    }

    pub fn eof(&mut self, number: i64) -> Result<bool> {
        if number == 0 {
            let buf = self.stdin().fill_buf().map_err(|_| error!(IoError))?;
            return Ok(buf.is_empty());
        }
        self.get(number)?.eof()
    }

    pub fn stdin_read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.stdin()
            .read_line(&mut line)
            .map_err(|_| error!(IoError))?;
        Ok(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string())
    }
}
