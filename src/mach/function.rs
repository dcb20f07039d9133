use super::Val;
use crate::error;
use crate::lang::Error;
use chrono::{Local, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Built-in functions
///
/// A case-folded name to function table. The random-number generator is
/// the registry's single mutable resource; RANDOMIZE and a negative RND
/// argument reseed it.

pub struct Function {
    rng: StdRng,
}

impl Default for Function {
    fn default() -> Function {
        Function::new()
    }
}

impl Function {
    pub fn new() -> Function {
        Function {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn arity(func_name: &str) -> Option<std::ops::RangeInclusive<usize>> {
        match func_name {
            "ABS" => Some(1..=1),
            "ASC" => Some(1..=1),
            "ATAN2" | "ATN2" => Some(2..=2),
            "ATN" => Some(1..=1),
            "CDBL" => Some(1..=1),
            "CHR$" => Some(1..=1),
            "CINT" => Some(1..=1),
            "CLNG" => Some(1..=1),
            "COS" => Some(1..=1),
            "CSNG" => Some(1..=1),
            "DATE$" => Some(0..=0),
            "EXP" => Some(1..=1),
            "FIX" => Some(1..=1),
            "HEX$" => Some(1..=1),
            "INSTR" => Some(2..=3),
            "INT" => Some(1..=1),
            "LCASE$" => Some(1..=1),
            "LEFT$" => Some(2..=2),
            "LEN" => Some(1..=1),
            "LOG" => Some(1..=1),
            "LTRIM$" => Some(1..=1),
            "MID$" => Some(2..=3),
            "OCT$" => Some(1..=1),
            "PI" => Some(0..=0),
            "RIGHT$" => Some(2..=2),
            "RND" => Some(0..=1),
            "ROUND" => Some(1..=2),
            "RTRIM$" => Some(1..=1),
            "SGN" => Some(1..=1),
            "SIN" => Some(1..=1),
            "SPACE$" => Some(1..=1),
            "SPC" => Some(1..=1),
            "SQR" => Some(1..=1),
            "STR$" => Some(1..=1),
            "STRING$" => Some(2..=2),
            "TAB" => Some(1..=1),
            "TAN" => Some(1..=1),
            "TIME$" => Some(0..=0),
            "TIMER" => Some(0..=0),
            "TRIM$" => Some(1..=1),
            "UCASE$" => Some(1..=1),
            "VAL" => Some(1..=1),
            _ => None,
        }
    }

    pub fn is_builtin(func_name: &str) -> bool {
        Function::arity(func_name).is_some()
    }

    pub fn call(&mut self, func_name: &str, mut args: Vec<Val>) -> Result<Val> {
        match Function::arity(func_name) {
            Some(range) if range.contains(&args.len()) => {}
            Some(_) => return Err(error!(ValueError; "WRONG NUMBER OF ARGUMENTS")),
            None => {
                return Err(error!(NameError; format!("UNDEFINED FUNCTION {}", func_name)));
            }
        }
        match func_name {
            "ABS" => Function::abs(args.remove(0)),
            "ASC" => Function::asc(args.remove(0)),
            "ATAN2" | "ATN2" => {
                let y = args.remove(0);
                Function::atan2(y, args.remove(0))
            }
            "ATN" => Ok(Val::Double(args.remove(0).to_f64()?.atan())),
            "CDBL" => Ok(Val::Double(args.remove(0).to_f64()?)),
            "CHR$" => Function::chr(args.remove(0)),
            "CINT" => Function::cint(args.remove(0)),
            "CLNG" => Function::clng(args.remove(0)),
            "COS" => Ok(Val::Double(args.remove(0).to_f64()?.cos())),
            "CSNG" => Ok(Val::Single(args.remove(0).to_f64()? as f32)),
            "DATE$" => Function::date(),
            "EXP" => Ok(Val::Double(args.remove(0).to_f64()?.exp())),
            "FIX" => Function::fix(args.remove(0)),
            "HEX$" => Function::hex(args.remove(0)),
            "INSTR" => Function::instr(args),
            "INT" => Function::int(args.remove(0)),
            "LCASE$" => {
                let s = Rc::<str>::try_from(args.remove(0))?;
                Ok(Val::String(s.to_ascii_lowercase().into()))
            }
            "LEFT$" => {
                let s = args.remove(0);
                Function::left(s, args.remove(0))
            }
            "LEN" => Function::len(args.remove(0)),
            "LOG" => Function::log(args.remove(0)),
            "LTRIM$" => {
                let s = Rc::<str>::try_from(args.remove(0))?;
                Ok(Val::String(s.trim_start_matches(' ').into()))
            }
            "MID$" => Function::mid(args),
            "OCT$" => Function::oct(args.remove(0)),
            "PI" => Ok(Val::Double(std::f64::consts::PI)),
            "RIGHT$" => {
                let s = args.remove(0);
                Function::right(s, args.remove(0))
            }
            "RND" => self.rnd(args),
            "ROUND" => Function::round(args),
            "RTRIM$" => {
                let s = Rc::<str>::try_from(args.remove(0))?;
                Ok(Val::String(s.trim_end_matches(' ').into()))
            }
            "SGN" => Function::sgn(args.remove(0)),
            "SIN" => Ok(Val::Double(args.remove(0).to_f64()?.sin())),
            "SPACE$" => Function::space(args.remove(0)),
            "SPC" => Function::spc(args.remove(0)),
            "SQR" => Function::sqr(args.remove(0)),
            "STR$" => Function::str(args.remove(0)),
            "STRING$" => {
                let n = args.remove(0);
                Function::string(n, args.remove(0))
            }
            "TAB" => Function::tab(args.remove(0)),
            "TAN" => Ok(Val::Double(args.remove(0).to_f64()?.tan())),
            "TIME$" => Function::time(),
            "TIMER" => Function::timer(),
            "TRIM$" => {
                let s = Rc::<str>::try_from(args.remove(0))?;
                Ok(Val::String(s.trim().into()))
            }
            "UCASE$" => {
                let s = Rc::<str>::try_from(args.remove(0))?;
                Ok(Val::String(s.to_ascii_uppercase().into()))
            }
            "VAL" => Function::val(args.remove(0)),
            _ => Err(error!(NameError; format!("UNDEFINED FUNCTION {}", func_name))),
        }
    }

    /// RANDOMIZE: reseed from the given value, or from the clock.
    pub fn randomize(&mut self, seed: Option<i64>) {
        self.rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed as u64),
            None => StdRng::from_entropy(),
        };
    }

    fn abs(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(n.saturating_abs())),
            Long(n) => Ok(Long(n.saturating_abs())),
            Single(n) => Ok(Single(n.abs())),
            Double(n) => Ok(Double(n.abs())),
            String(_) => Err(error!(TypeError)),
        }
    }

    fn asc(val: Val) -> Result<Val> {
        let s = Rc::<str>::try_from(val)?;
        match s.chars().next() {
            Some(ch) => Ok(Val::Long(u32::from(ch) as i32)),
            None => Err(error!(ValueError)),
        }
    }

    fn atan2(y: Val, x: Val) -> Result<Val> {
        Ok(Val::Double(y.to_f64()?.atan2(x.to_f64()?)))
    }

    fn chr(val: Val) -> Result<Val> {
        let n = val.to_i64()?;
        if !(0..=255).contains(&n) {
            return Err(error!(ValueError));
        }
        match char::try_from(n as u32) {
            Ok(ch) => Ok(Val::String(ch.to_string().into())),
            Err(_) => Err(error!(ValueError)),
        }
    }

    /// Banker's rounding to Integer.
    fn cint(val: Val) -> Result<Val> {
        let n = round_ties_even(val.to_f64()?);
        if n < i16::min_value() as f64 || n > i16::max_value() as f64 {
            return Err(error!(ArithError; "OVERFLOW"));
        }
        Ok(Val::Integer(n as i16))
    }

    /// Banker's rounding to Long.
    fn clng(val: Val) -> Result<Val> {
        let n = round_ties_even(val.to_f64()?);
        if n < i32::min_value() as f64 || n > i32::max_value() as f64 {
            return Err(error!(ArithError; "OVERFLOW"));
        }
        Ok(Val::Long(n as i32))
    }

    fn date() -> Result<Val> {
        Ok(Val::String(
            Local::now().format("%m-%d-%Y").to_string().into(),
        ))
    }

    fn fix(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(n)),
            Long(n) => Ok(Long(n)),
            Single(n) => Ok(Single(n.trunc())),
            Double(n) => Ok(Double(n.trunc())),
            String(_) => Err(error!(TypeError)),
        }
    }

    fn hex(val: Val) -> Result<Val> {
        let n = val.to_i64()?;
        let s = if n < 0 {
            format!("-{:X}", -n)
        } else {
            format!("{:X}", n)
        };
        Ok(Val::String(s.into()))
    }

    fn instr(mut args: Vec<Val>) -> Result<Val> {
        let start = if args.len() == 3 {
            usize::try_from(args.remove(0))?
        } else {
            1
        };
        if start == 0 {
            return Err(error!(ValueError; "START IS 0"));
        }
        let haystack = Rc::<str>::try_from(args.remove(0))?;
        let pattern = Rc::<str>::try_from(args.remove(0))?;
        let hay: Vec<char> = haystack.chars().collect();
        let pat: Vec<char> = pattern.chars().collect();
        if start > hay.len() {
            return Ok(Val::Long(0));
        }
        if pat.is_empty() {
            return Ok(Val::Long(start as i32));
        }
        for i in (start - 1)..hay.len() {
            if hay[i..].starts_with(&pat[..]) {
                return Ok(Val::Long(i as i32 + 1));
            }
        }
        Ok(Val::Long(0))
    }

    /// Floor, unlike FIX which truncates.
    fn int(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(n)),
            Long(n) => Ok(Long(n)),
            Single(n) => Ok(Single(n.floor())),
            Double(n) => Ok(Double(n.floor())),
            String(_) => Err(error!(TypeError)),
        }
    }

    fn left(string: Val, len: Val) -> Result<Val> {
        let len = usize::try_from(len)?;
        let string = Rc::<str>::try_from(string)?;
        match string.char_indices().nth(len) {
            Some((pos, _ch)) => Ok(Val::String(string[..pos].into())),
            None => Ok(Val::String(string)),
        }
    }

    fn len(val: Val) -> Result<Val> {
        let string = Rc::<str>::try_from(val)?;
        Ok(Val::Long(string.len() as i32))
    }

    fn log(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        if n <= 0.0 {
            return Err(error!(ValueError));
        }
        Ok(Val::Double(n.ln()))
    }

    fn mid(mut args: Vec<Val>) -> Result<Val> {
        let string = Rc::<str>::try_from(args.remove(0))?;
        let start = usize::try_from(args.remove(0))?;
        if start == 0 {
            return Err(error!(ValueError; "START IS 0"));
        }
        let len = if args.is_empty() {
            None
        } else {
            Some(usize::try_from(args.remove(0))?)
        };
        let from = match string.char_indices().nth(start - 1) {
            Some((pos, _ch)) => pos,
            None => return Ok(Val::String("".into())),
        };
        let rest: Rc<str> = string[from..].into();
        match len {
            None => Ok(Val::String(rest)),
            Some(len) => match rest.char_indices().nth(len) {
                Some((pos, _ch)) => Ok(Val::String(rest[..pos].into())),
                None => Ok(Val::String(rest)),
            },
        }
    }

    fn oct(val: Val) -> Result<Val> {
        let n = val.to_i64()?;
        let s = if n < 0 {
            format!("-{:o}", -n)
        } else {
            format!("{:o}", n)
        };
        Ok(Val::String(s.into()))
    }

    fn right(string: Val, len: Val) -> Result<Val> {
        let len = usize::try_from(len)?;
        if len == 0 {
            return Ok(Val::String("".into()));
        }
        let string = Rc::<str>::try_from(string)?;
        match string.char_indices().rev().nth(len - 1) {
            Some((pos, _ch)) => Ok(Val::String(string[pos..].into())),
            None => Ok(Val::String(string)),
        }
    }

    fn rnd(&mut self, mut args: Vec<Val>) -> Result<Val> {
        if !args.is_empty() {
            let n = args.remove(0).to_f64()?;
            if n < 0.0 {
                self.rng = StdRng::seed_from_u64(n.trunc() as i64 as u64);
            }
        }
        Ok(Val::Single(self.rng.gen::<f64>() as f32))
    }

    fn round(mut args: Vec<Val>) -> Result<Val> {
        let n = args.remove(0).to_f64()?;
        let digits = if args.is_empty() {
            0
        } else {
            args.remove(0).to_i64()?
        };
        let multiplier = 10f64.powi(digits as i32);
        Ok(Val::Double((n * multiplier).round() / multiplier))
    }

    fn sgn(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        Ok(Val::Integer(if n > 0.0 {
            1
        } else if n < 0.0 {
            -1
        } else {
            0
        }))
    }

    fn space(val: Val) -> Result<Val> {
        let len = usize::try_from(val)?;
        Ok(Val::String(" ".repeat(len).into()))
    }

    fn spc(val: Val) -> Result<Val> {
        let len = val.to_i64()?.max(0) as usize;
        Ok(Val::String(" ".repeat(len).into()))
    }

    fn sqr(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        if n < 0.0 {
            return Err(error!(ValueError));
        }
        Ok(Val::Double(n.sqrt()))
    }

    fn str(val: Val) -> Result<Val> {
        match val {
            Val::String(_) => Err(error!(TypeError)),
            other => {
                let n = other.to_f64()?;
                let s = other.to_string();
                if n >= 0.0 {
                    Ok(Val::String(format!(" {}", s).into()))
                } else {
                    Ok(Val::String(s.into()))
                }
            }
        }
    }

    fn string(num: Val, ch: Val) -> Result<Val> {
        let num = usize::try_from(num)?;
        let ch = match ch {
            Val::String(s) => match s.chars().next() {
                Some(ch) => ch,
                None => return Err(error!(ValueError)),
            },
            other => {
                let code = other.to_i64()?;
                if !(0..=255).contains(&code) {
                    return Err(error!(ValueError));
                }
                match char::try_from(code as u32) {
                    Ok(ch) => ch,
                    Err(_) => return Err(error!(ValueError)),
                }
            }
        };
        Ok(Val::String(ch.to_string().repeat(num).into()))
    }

    /// Spaces up to column n; naive about the current cursor position.
    fn tab(val: Val) -> Result<Val> {
        let n = val.to_i64()?.max(1) as usize;
        Ok(Val::String(" ".repeat(n - 1).into()))
    }

    fn time() -> Result<Val> {
        Ok(Val::String(
            Local::now().format("%H:%M:%S").to_string().into(),
        ))
    }

    /// Seconds since local midnight, as Single.
    fn timer() -> Result<Val> {
        let now = Local::now().time();
        let seconds =
            now.num_seconds_from_midnight() as f64 + now.nanosecond() as f64 / 1_000_000_000.0;
        Ok(Val::Single(seconds as f32))
    }

    fn val(val: Val) -> Result<Val> {
        let s = Rc::<str>::try_from(val)?;
        Ok(Val::Double(Val::parse_number(&s)))
    }
}

/// Round half to even, the dialect's CINT/CLNG convention.
fn round_ties_even(n: f64) -> f64 {
    let rounded = n.round();
    if (n - n.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - n.signum()
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Val>) -> Result<Val> {
        Function::new().call(name, args)
    }

    #[test]
    fn test_string_slicing() {
        let s = || Val::String("HELLO".into());
        assert_eq!(call("LEFT$", vec![s(), Val::Integer(2)]).unwrap(), Val::String("HE".into()));
        assert_eq!(call("RIGHT$", vec![s(), Val::Integer(2)]).unwrap(), Val::String("LO".into()));
        assert_eq!(
            call("MID$", vec![s(), Val::Integer(2), Val::Integer(3)]).unwrap(),
            Val::String("ELL".into())
        );
        assert!(call("LEFT$", vec![s(), Val::Integer(-1)]).is_err());
        assert_eq!(call("LEFT$", vec![s(), Val::Integer(99)]).unwrap(), s());
    }

    #[test]
    fn test_instr() {
        let hay = || Val::String("ABCABC".into());
        let pat = || Val::String("BC".into());
        assert_eq!(call("INSTR", vec![hay(), pat()]).unwrap(), Val::Long(2));
        assert_eq!(
            call("INSTR", vec![Val::Integer(3), hay(), pat()]).unwrap(),
            Val::Long(5)
        );
        assert_eq!(
            call("INSTR", vec![hay(), Val::String("XYZ".into())]).unwrap(),
            Val::Long(0)
        );
    }

    #[test]
    fn test_banker_rounding() {
        assert_eq!(call("CINT", vec![Val::Double(2.5)]).unwrap(), Val::Integer(2));
        assert_eq!(call("CINT", vec![Val::Double(3.5)]).unwrap(), Val::Integer(4));
        assert_eq!(call("CINT", vec![Val::Double(-2.5)]).unwrap(), Val::Integer(-2));
        assert_eq!(call("CLNG", vec![Val::Double(100000.7)]).unwrap(), Val::Long(100001));
    }

    #[test]
    fn test_int_and_fix() {
        assert_eq!(call("INT", vec![Val::Double(-2.5)]).unwrap(), Val::Double(-3.0));
        assert_eq!(call("FIX", vec![Val::Double(-2.5)]).unwrap(), Val::Double(-2.0));
    }

    #[test]
    fn test_chr_and_asc() {
        assert_eq!(call("CHR$", vec![Val::Integer(65)]).unwrap(), Val::String("A".into()));
        assert!(call("CHR$", vec![Val::Integer(256)]).is_err());
        assert_eq!(call("ASC", vec![Val::String("A".into())]).unwrap(), Val::Long(65));
    }

    #[test]
    fn test_str_and_val() {
        assert_eq!(call("STR$", vec![Val::Integer(42)]).unwrap(), Val::String(" 42".into()));
        assert_eq!(call("STR$", vec![Val::Integer(-7)]).unwrap(), Val::String("-7".into()));
        assert_eq!(call("VAL", vec![Val::String("3.5".into())]).unwrap(), Val::Double(3.5));
        assert_eq!(call("VAL", vec![Val::String("junk".into())]).unwrap(), Val::Double(0.0));
    }

    #[test]
    fn test_hex_oct() {
        assert_eq!(call("HEX$", vec![Val::Integer(255)]).unwrap(), Val::String("FF".into()));
        assert_eq!(call("OCT$", vec![Val::Integer(8)]).unwrap(), Val::String("10".into()));
    }

    #[test]
    fn test_rnd_reseed_repeats() {
        let mut f = Function::new();
        let a = f.call("RND", vec![Val::Single(-3.0)]).unwrap();
        let b = f.call("RND", vec![Val::Single(-3.0)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_arity() {
        assert!(call("LEN", vec![]).is_err());
        assert!(call("NOSUCH", vec![]).is_err());
    }
}
