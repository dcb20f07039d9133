use super::Val;
use crate::error;
use crate::lang::ast::{BinaryOp, Kind};
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

/// ## Operator semantics
///
/// Arithmetic computes in the wider kind of the operand pair and the
/// comparison family returns the dialect's -1/0 booleans.

pub struct Operation {}

impl Operation {
    pub fn binary(op: BinaryOp, lhs: Val, rhs: Val) -> Result<Val> {
        use BinaryOp::*;
        match op {
            Add => Operation::sum(lhs, rhs),
            Sub => Operation::subtract(lhs, rhs),
            Mul => Operation::multiply(lhs, rhs),
            Div => Operation::divide(lhs, rhs),
            DivInt => Operation::divide_int(lhs, rhs),
            Mod => Operation::modulo(lhs, rhs),
            Pow => Operation::power(lhs, rhs),
            Eq | Ne | Lt | Gt | Le | Ge => Operation::relation(op, lhs, rhs),
            And | Or | Xor | Eqv | Imp => Operation::logical(op, lhs, rhs),
        }
    }

    pub fn negate(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => match n.checked_neg() {
                Some(n) => Ok(Integer(n)),
                None => Err(error!(ArithError; "OVERFLOW")),
            },
            Long(n) => match n.checked_neg() {
                Some(n) => Ok(Long(n)),
                None => Err(error!(ArithError; "OVERFLOW")),
            },
            Single(n) => Ok(Single(-n)),
            Double(n) => Ok(Double(-n)),
            String(_) => Err(error!(TypeError)),
        }
    }

    /// Bitwise complement; NOT -1 is 0 and NOT 0 is -1.
    pub fn not(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(!n)),
            other => Ok(Long(!(other.to_i64()? as i32))),
        }
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        match (lhs, rhs) {
            (String(l), String(r)) => {
                let mut s = l.to_string();
                s.push_str(&r);
                Ok(String(s.into()))
            }
            (String(_), _) | (_, String(_)) => Err(error!(TypeError)),
            (l, r) => match Kind::promote(l.kind(), r.kind()) {
                Kind::Integer => {
                    let (l, r) = int_pair(&l, &r)?;
                    match l.checked_add(r) {
                        Some(n) => Ok(Integer(n)),
                        None => Err(error!(ArithError; "OVERFLOW")),
                    }
                }
                Kind::Long => {
                    let (l, r) = long_pair(&l, &r)?;
                    match l.checked_add(r) {
                        Some(n) => Ok(Long(n)),
                        None => Err(error!(ArithError; "OVERFLOW")),
                    }
                }
                Kind::Single => Ok(Single(single_of(&l)? + single_of(&r)?)),
                _ => Ok(Double(l.to_f64()? + r.to_f64()?)),
            },
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        match Kind::promote(lhs.kind(), rhs.kind()) {
            Kind::String => Err(error!(TypeError)),
            Kind::Integer => {
                let (l, r) = int_pair(&lhs, &rhs)?;
                match l.checked_sub(r) {
                    Some(n) => Ok(Integer(n)),
                    None => Err(error!(ArithError; "OVERFLOW")),
                }
            }
            Kind::Long => {
                let (l, r) = long_pair(&lhs, &rhs)?;
                match l.checked_sub(r) {
                    Some(n) => Ok(Long(n)),
                    None => Err(error!(ArithError; "OVERFLOW")),
                }
            }
            Kind::Single => Ok(Single(single_of(&lhs)? - single_of(&rhs)?)),
            Kind::Double => Ok(Double(lhs.to_f64()? - rhs.to_f64()?)),
        }
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        match Kind::promote(lhs.kind(), rhs.kind()) {
            Kind::String => Err(error!(TypeError)),
            Kind::Integer => {
                let (l, r) = int_pair(&lhs, &rhs)?;
                match l.checked_mul(r) {
                    Some(n) => Ok(Integer(n)),
                    None => Err(error!(ArithError; "OVERFLOW")),
                }
            }
            Kind::Long => {
                let (l, r) = long_pair(&lhs, &rhs)?;
                match l.checked_mul(r) {
                    Some(n) => Ok(Long(n)),
                    None => Err(error!(ArithError; "OVERFLOW")),
                }
            }
            Kind::Single => Ok(Single(single_of(&lhs)? * single_of(&rhs)?)),
            Kind::Double => Ok(Double(lhs.to_f64()? * rhs.to_f64()?)),
        }
    }

    /// `/` always divides as a float; integer operands divide as Single.
    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        let divisor = rhs.to_f64()?;
        let dividend = lhs.to_f64()?;
        if divisor == 0.0 {
            return Err(error!(ArithError; "DIVISION BY ZERO"));
        }
        if lhs.kind() == Kind::Double || rhs.kind() == Kind::Double {
            Ok(Double(dividend / divisor))
        } else {
            Ok(Single((dividend / divisor) as f32))
        }
    }

    pub fn divide_int(lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.to_i64()?;
        let dividend = lhs.to_i64()?;
        if divisor == 0 {
            return Err(error!(ArithError; "DIVISION BY ZERO"));
        }
        long_result(dividend / divisor)
    }

    pub fn modulo(lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.to_i64()?;
        let dividend = lhs.to_i64()?;
        if divisor == 0 {
            return Err(error!(ArithError; "DIVISION BY ZERO"));
        }
        long_result(dividend % divisor)
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Double(lhs.to_f64()?.powf(rhs.to_f64()?)))
    }

    fn logical(op: BinaryOp, lhs: Val, rhs: Val) -> Result<Val> {
        use BinaryOp::*;
        let both_integer = lhs.kind() == Kind::Integer && rhs.kind() == Kind::Integer;
        let l = lhs.to_i64()?;
        let r = rhs.to_i64()?;
        let n = match op {
            And => l & r,
            Or => l | r,
            Xor => l ^ r,
            Eqv => !(l ^ r),
            Imp => !l | r,
            _ => return Err(error!(TypeError)),
        };
        if both_integer {
            Ok(Val::Integer(n as i16))
        } else {
            Ok(Val::Long(n as i32))
        }
    }

    pub fn compare(lhs: &Val, rhs: &Val) -> Result<Ordering> {
        use Val::*;
        match (lhs, rhs) {
            (String(l), String(r)) => Ok(l.as_bytes().cmp(r.as_bytes())),
            (String(_), _) | (_, String(_)) => Err(error!(TypeError)),
            (l, r) => Ok(l
                .to_f64()?
                .partial_cmp(&r.to_f64()?)
                .unwrap_or(Ordering::Equal)),
        }
    }

    fn relation(op: BinaryOp, lhs: Val, rhs: Val) -> Result<Val> {
        use BinaryOp::*;
        let ordering = Operation::compare(&lhs, &rhs)?;
        let result = match op {
            Eq => ordering == Ordering::Equal,
            Ne => ordering != Ordering::Equal,
            Lt => ordering == Ordering::Less,
            Gt => ordering == Ordering::Greater,
            Le => ordering != Ordering::Greater,
            Ge => ordering != Ordering::Less,
            _ => return Err(error!(TypeError)),
        };
        Ok(Val::from_bool(result))
    }
}

fn int_pair(lhs: &Val, rhs: &Val) -> Result<(i16, i16)> {
    match (lhs, rhs) {
        (Val::Integer(l), Val::Integer(r)) => Ok((*l, *r)),
        _ => Err(error!(TypeError)),
    }
}

fn long_pair(lhs: &Val, rhs: &Val) -> Result<(i32, i32)> {
    let l = match lhs {
        Val::Integer(n) => *n as i32,
        Val::Long(n) => *n,
        _ => lhs.to_i64()? as i32,
    };
    let r = match rhs {
        Val::Integer(n) => *n as i32,
        Val::Long(n) => *n,
        _ => rhs.to_i64()? as i32,
    };
    Ok((l, r))
}

fn single_of(val: &Val) -> Result<f32> {
    Ok(val.to_f64()? as f32)
}

fn long_result(n: i64) -> Result<Val> {
    if n < i32::min_value() as i64 || n > i32::max_value() as i64 {
        Err(error!(ArithError; "OVERFLOW"))
    } else {
        Ok(Val::Long(n as i32))
    }
}
