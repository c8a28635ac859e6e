// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Memory and disk sizes.

A size is a count scaled by a power of 1024, in units of bytes or words:
`512`, `4gb`, `2kw`. Sizes compare by their byte counts, so `1kb` equals
`1024b`.

*/

use std::cmp::{self, Ordering};
use std::fmt;

use scalar::{AttrType, CombineFailure, DecodeFailure};
use value::BatchOp;


/// The number of bytes in a word.
pub const WORD_BYTES: u64 = 8;

const MULTIPLIERS: &[(char, u8)] = &[('k', 10), ('m', 20), ('g', 30), ('t', 40), ('p', 50)];


/// What a size counts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SizeUnit {
    Bytes,
    Words,
}

impl Default for SizeUnit {
    fn default() -> SizeUnit {
        SizeUnit::Bytes
    }
}


/// A size: `value << shift` units.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Size {
    value: u64,
    shift: u8,
    unit: SizeUnit,
}

impl Size {
    /// Build a size. `shift` is rounded down to a multiple of 10 and capped
    /// at 50 (peta).
    pub fn new(value: u64, shift: u8, unit: SizeUnit) -> Size {
        Size { value, shift: cmp::min(shift / 10 * 10, 50), unit }
    }

    pub fn bytes(n: u64) -> Size {
        Size::new(n, 0, SizeUnit::Bytes)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// The size in bytes. This cannot overflow: the largest value is
    /// `u64::MAX << 50` words, which fits comfortably in 128 bits.
    pub fn in_bytes(&self) -> u128 {
        let unit = match self.unit {
            SizeUnit::Bytes => 1,
            SizeUnit::Words => WORD_BYTES as u128,
        };

        ((self.value as u128) << self.shift) * unit
    }

    /// Express two sizes in a common unit and shift, for arithmetic.
    ///
    /// Mixed units are converted to bytes; the smaller shift wins. Counts
    /// that no longer fit in 64 bits saturate.
    fn normalize(&self, other: &Size) -> (u64, u64, u8, SizeUnit) {
        let unit = if self.unit == other.unit { self.unit } else { SizeUnit::Bytes };
        let shift = cmp::min(self.shift, other.shift);

        let rescale = |s: &Size| -> u64 {
            let mut n = (s.value as u128) << (s.shift - shift);

            if unit == SizeUnit::Bytes && s.unit == SizeUnit::Words {
                n *= WORD_BYTES as u128;
            }

            if n > u64::max_value() as u128 {
                u64::max_value()
            } else {
                n as u64
            }
        };

        (rescale(self), rescale(other), shift, unit)
    }
}

impl AttrType for Size {
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<Size, DecodeFailure> {
        let n_digits = raw.bytes().take_while(|b| b.is_ascii_digit()).count();

        if n_digits == 0 {
            return Err(DecodeFailure::invalid(format!("\"{}\" does not start with a count", raw)));
        }

        let value = raw[..n_digits].parse::<u64>()
            .map_err(|_| DecodeFailure::invalid(format!("{} does not fit in 64 bits", &raw[..n_digits])))?;

        let mut rest = raw[n_digits..].chars().map(|c| c.to_ascii_lowercase()).peekable();
        let mut shift = 0;

        if let Some(&c) = rest.peek() {
            if let Some(&(_, s)) = MULTIPLIERS.iter().find(|&&(m, _)| m == c) {
                shift = s;
                rest.next();
            }
        }

        let unit = match rest.next() {
            None | Some('b') => SizeUnit::Bytes,
            Some('w') => SizeUnit::Words,
            Some(_) => return Err(DecodeFailure::invalid(format!("unrecognized size suffix in \"{}\"", raw))),
        };

        if rest.next().is_some() {
            return Err(DecodeFailure::invalid(format!("trailing characters in size \"{}\"", raw)));
        }

        Ok(Size { value, shift, unit })
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)?;

        if let Some(&(m, _)) = MULTIPLIERS.iter().find(|&&(_, s)| s == self.shift) {
            write!(f, "{}", m)?;
        }

        f.write_str(match self.unit {
            SizeUnit::Bytes => "b",
            SizeUnit::Words => "w",
        })
    }

    /// Sizes never go negative: arithmetic saturates at zero and at the
    /// largest count.
    fn combine_attr(&mut self, source: &Size, op: BatchOp) -> Result<(), CombineFailure> {
        let (a, b, shift, unit) = self.normalize(source);

        let value = match op {
            BatchOp::Assign => {
                *self = *source;
                return Ok(());
            },
            BatchOp::Increment => a.saturating_add(b),
            BatchOp::Decrement => a.saturating_sub(b),
            _ => return Err(CombineFailure::Unsupported),
        };

        *self = Size { value, shift, unit };
        Ok(())
    }

    fn compare_attr(&self, other: &Size) -> Option<Ordering> {
        Some(self.in_bytes().cmp(&other.in_bytes()))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.encode_attr(f)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn size(s: &str) -> Size {
        Size::decode_attr(None, s).unwrap()
    }

    #[test]
    fn parse_suffixes() {
        assert_eq!(size("512"), Size::bytes(512));
        assert_eq!(size("4gb"), Size::new(4, 30, SizeUnit::Bytes));
        assert_eq!(size("4GB"), Size::new(4, 30, SizeUnit::Bytes));
        assert_eq!(size("2kw"), Size::new(2, 10, SizeUnit::Words));
        assert_eq!(size("16m"), Size::new(16, 20, SizeUnit::Bytes));
        assert_eq!(size("3w"), Size::new(3, 0, SizeUnit::Words));
    }

    #[test]
    fn reject_malformed() {
        for bad in &["", "gb", "-1kb", "1kbb", "1xb", "1.5gb", "1 kb"] {
            assert!(Size::decode_attr(None, bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn canonical_text() {
        assert_eq!(size("512").to_string(), "512b");
        assert_eq!(size("4GB").to_string(), "4gb");
        assert_eq!(size("2kw").to_string(), "2kw");
    }

    #[test]
    fn compare_by_bytes() {
        assert_eq!(size("1kb").compare_attr(&size("1024")), Some(Ordering::Equal));
        assert_eq!(size("1kw").compare_attr(&size("8kb")), Some(Ordering::Equal));
        assert_eq!(size("1mb").compare_attr(&size("1023kb")), Some(Ordering::Greater));
    }

    #[test]
    fn increment_normalizes_to_smaller_shift() {
        let mut s = size("1gb");
        s.combine_attr(&size("512mb"), BatchOp::Increment).unwrap();
        assert_eq!(s.to_string(), "1536mb");

        let mut w = size("1kw");
        w.combine_attr(&size("8b"), BatchOp::Increment).unwrap();
        assert_eq!(w.to_string(), "8200b");
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let mut s = size("1kb");
        s.combine_attr(&size("1mb"), BatchOp::Decrement).unwrap();
        assert_eq!(s.in_bytes(), 0);
    }
}
