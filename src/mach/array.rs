use super::Val;
use crate::error;
use crate::lang::ast::Kind;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Dynamic arrays
///
/// Homogeneous, multi-dimensional, row-major. Bounds are inclusive
/// `(lower, upper)` pairs per dimension.

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    kind: Kind,
    bounds: Vec<(i32, i32)>,
    data: Vec<Val>,
}

impl Array {
    pub fn new(kind: Kind, bounds: Vec<(i32, i32)>) -> Result<Array> {
        let mut size: usize = 1;
        for (lower, upper) in &bounds {
            if upper < lower {
                return Err(error!(RangeError));
            }
            size = size.saturating_mul((upper - lower + 1) as usize);
        }
        if size > 16_777_216 {
            return Err(error!(RangeError; "ARRAY TOO LARGE"));
        }
        Ok(Array {
            kind,
            bounds,
            data: vec![Val::default_for(kind); size],
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn bounds(&self) -> &[(i32, i32)] {
        &self.bounds
    }

    /// Row-major linear index; the rightmost dimension varies fastest.
    fn index(&self, subscripts: &[i32]) -> Result<usize> {
        if subscripts.len() != self.bounds.len() {
            return Err(error!(RangeError; "WRONG NUMBER OF SUBSCRIPTS"));
        }
        let mut index = 0;
        let mut multiplier = 1;
        for i in (0..self.bounds.len()).rev() {
            let sub = subscripts[i];
            let (lower, upper) = self.bounds[i];
            if sub < lower || sub > upper {
                return Err(error!(RangeError));
            }
            index += (sub - lower) as usize * multiplier;
            multiplier *= (upper - lower + 1) as usize;
        }
        Ok(index)
    }

    pub fn get(&self, subscripts: &[i32]) -> Result<Val> {
        let index = self.index(subscripts)?;
        Ok(self.data[index].clone())
    }

    pub fn set(&mut self, subscripts: &[i32], val: Val) -> Result<()> {
        let index = self.index(subscripts)?;
        self.data[index] = val.coerce(self.kind)?;
        Ok(())
    }

    /// Copy every element of `old` that falls inside both bounds.
    /// Arrays of different rank share nothing.
    pub fn preserve_from(&mut self, old: &Array) {
        if old.bounds.len() != self.bounds.len() {
            return;
        }
        let shared: Vec<(i32, i32)> = old
            .bounds
            .iter()
            .zip(&self.bounds)
            .map(|(&(ol, ou), &(nl, nu))| (ol.max(nl), ou.min(nu)))
            .collect();
        if shared.iter().any(|&(lower, upper)| upper < lower) {
            return;
        }
        let mut subscripts: Vec<i32> = shared.iter().map(|&(lower, _)| lower).collect();
        loop {
            if let Ok(val) = old.get(&subscripts) {
                let _ = self.set(&subscripts, val);
            }
            // odometer step over the shared bounds
            let mut i = shared.len();
            loop {
                if i == 0 {
                    return;
                }
                i -= 1;
                if subscripts[i] < shared[i].1 {
                    subscripts[i] += 1;
                    break;
                }
                subscripts[i] = shared[i].0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_index() {
        let mut a = Array::new(Kind::Integer, vec![(0, 1), (0, 2)]).unwrap();
        a.set(&[1, 2], Val::Integer(7)).unwrap();
        assert_eq!(a.get(&[1, 2]).unwrap(), Val::Integer(7));
        assert_eq!(a.get(&[0, 0]).unwrap(), Val::Integer(0));
        assert!(a.get(&[2, 0]).is_err());
        assert!(a.get(&[0]).is_err());
    }

    #[test]
    fn test_preserve() {
        let mut a = Array::new(Kind::Single, vec![(0, 4)]).unwrap();
        for i in 0..=4 {
            a.set(&[i], Val::Single(i as f32)).unwrap();
        }
        let mut b = Array::new(Kind::Single, vec![(0, 2)]).unwrap();
        b.preserve_from(&a);
        assert_eq!(b.get(&[2]).unwrap(), Val::Single(2.0));
        let mut c = Array::new(Kind::Single, vec![(0, 9)]).unwrap();
        c.preserve_from(&a);
        assert_eq!(c.get(&[4]).unwrap(), Val::Single(4.0));
        assert_eq!(c.get(&[9]).unwrap(), Val::Single(0.0));
    }
}
