// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Per-kind attribute behavior.

Each payload type implements `AttrType`, which is the batch system's
decode/encode/set/compare function family expressed as one trait. This
module holds the trait and the implementations for the plain scalar types;
the structured types implement it in their own modules.

*/

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::convert::TryFrom;
use std::fmt;

use error::{qualified_name, PbsError};
use value::BatchOp;


/// Why a raw string could not be decoded.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DecodeFailure {
    Invalid(Cow<'static, str>),
    OutOfMemory,
}

impl DecodeFailure {
    pub(crate) fn invalid<S: Into<Cow<'static, str>>>(reason: S) -> DecodeFailure {
        DecodeFailure::Invalid(reason.into())
    }

    /// Attach the attribute name to make a reportable error.
    pub(crate) fn into_error(self, name: &str, resource: Option<&str>) -> PbsError {
        let name = qualified_name(name, resource);

        match self {
            DecodeFailure::Invalid(reason) => PbsError::InvalidValue { name, reason: reason.into_owned() },
            DecodeFailure::OutOfMemory => PbsError::AllocationFailure { name },
        }
    }
}

impl From<TryReserveError> for DecodeFailure {
    fn from(_: TryReserveError) -> DecodeFailure {
        DecodeFailure::OutOfMemory
    }
}


/// Why a combination was refused. The target is left unchanged.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CombineFailure {
    /// The operation is not defined for the payload type.
    Unsupported,

    /// The result would have no textual form that decodes back.
    OutOfRange(Cow<'static, str>),
}


/// The behavior of one kind of attribute payload.
pub(crate) trait AttrType: Sized {
    /// Parse a non-empty raw string. `resource` is the resource name when
    /// the attribute is a member of a resource list.
    fn decode_attr(resource: Option<&str>, raw: &str) -> Result<Self, DecodeFailure>;

    /// Write the canonical textual form.
    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result;

    /// Apply `source` to `self`. `op` is one of `Assign`, `Increment`, or
    /// `Decrement`.
    fn combine_attr(&mut self, source: &Self, op: BatchOp) -> Result<(), CombineFailure>;

    /// Order two payloads, or `None` if they are unordered.
    fn compare_attr(&self, other: &Self) -> Option<Ordering>;
}


const TRUE_TOKENS: &[&str] = &["true", "True", "TRUE", "t", "T", "y", "Y", "1"];
const FALSE_TOKENS: &[&str] = &["false", "False", "FALSE", "f", "F", "n", "N", "0"];

impl AttrType for bool {
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<bool, DecodeFailure> {
        if TRUE_TOKENS.contains(&raw) {
            Ok(true)
        } else if FALSE_TOKENS.contains(&raw) {
            Ok(false)
        } else {
            Err(DecodeFailure::invalid(format!("\"{}\" is not a boolean", raw)))
        }
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if *self { "True" } else { "False" })
    }

    /// Increment turns a flag on, decrement turns it off.
    fn combine_attr(&mut self, source: &bool, op: BatchOp) -> Result<(), CombineFailure> {
        match op {
            BatchOp::Assign => *self = *source,
            BatchOp::Increment => *self = *self || *source,
            BatchOp::Decrement => *self = *self && !*source,
            _ => return Err(CombineFailure::Unsupported),
        }
        Ok(())
    }

    fn compare_attr(&self, other: &bool) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}


/// Parse `[+-]?[0-9]+` into an `i64`.
pub(crate) fn decode_integer(raw: &str) -> Result<i64, DecodeFailure> {
    let digits = if raw.starts_with('+') || raw.starts_with('-') {
        &raw[1..]
    } else {
        raw
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeFailure::invalid(format!("\"{}\" is not a decimal integer", raw)));
    }

    raw.parse::<i64>()
        .map_err(|_| DecodeFailure::invalid(format!("{} does not fit in 64 bits", raw)))
}

macro_rules! integer_attr_type {
    ($ty:ty, $width:expr) => {
        impl AttrType for $ty {
            fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<$ty, DecodeFailure> {
                let n = decode_integer(raw)?;
                <$ty>::try_from(n)
                    .map_err(|_| DecodeFailure::invalid(format!("{} does not fit in {} bits", raw, $width)))
            }

            fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self)
            }

            fn combine_attr(&mut self, source: &$ty, op: BatchOp) -> Result<(), CombineFailure> {
                match op {
                    BatchOp::Assign => *self = *source,
                    BatchOp::Increment => *self = self.wrapping_add(*source),
                    BatchOp::Decrement => *self = self.wrapping_sub(*source),
                    _ => return Err(CombineFailure::Unsupported),
                }
                Ok(())
            }

            fn compare_attr(&self, other: &$ty) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
    };
}

integer_attr_type!(i16, 16);
integer_attr_type!(i64, 64);


/// Check `[+-]?(digits with at most one '.')([eE][+-]?[0-9]+)?`.
fn is_float_syntax(raw: &str) -> bool {
    let b = raw.as_bytes();
    let mut i = 0;

    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }

    let mut n_digits = 0;
    let mut seen_dot = false;

    while i < b.len() {
        match b[i] {
            b'0'..=b'9' => n_digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        i += 1;
    }

    if n_digits == 0 {
        return false;
    }

    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;

        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }

        let start = i;

        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }

        if i == start {
            return false;
        }
    }

    i == b.len()
}

impl AttrType for f64 {
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<f64, DecodeFailure> {
        if !is_float_syntax(raw) {
            return Err(DecodeFailure::invalid(format!("\"{}\" is not a decimal number", raw)));
        }

        match raw.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(x),
            _ => Err(DecodeFailure::invalid(format!("{} is out of range", raw))),
        }
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }

    /// Non-finite results are refused, since decoding rejects them.
    fn combine_attr(&mut self, source: &f64, op: BatchOp) -> Result<(), CombineFailure> {
        let result = match op {
            BatchOp::Assign => *source,
            BatchOp::Increment => *self + *source,
            BatchOp::Decrement => *self - *source,
            _ => return Err(CombineFailure::Unsupported),
        };

        if !result.is_finite() {
            return Err(CombineFailure::OutOfRange(
                format!("{} {} {} is not finite", self, op.symbol(), source).into()));
        }

        *self = result;
        Ok(())
    }

    fn compare_attr(&self, other: &f64) -> Option<Ordering> {
        self.partial_cmp(other)
    }
}



/// Whether `s` is a resource or property name: a letter followed by
/// letters, digits, `_`, `-`, or `.`.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}


/// Whether `s` is a host or vnode name. Unlike identifiers these may start
/// with a digit.
pub(crate) fn is_host_name(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}


/// Order two collections by containment: equal sets are `Equal`, a strict
/// subset is `Less`, a strict superset is `Greater`.
pub(crate) fn containment(left_in_right: bool, right_in_left: bool) -> Option<Ordering> {
    match (left_in_right, right_in_left) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        (false, false) => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(r: Result<impl fmt::Debug, DecodeFailure>) -> bool {
        match r {
            Err(DecodeFailure::Invalid(_)) => true,
            _ => false,
        }
    }

    #[test]
    fn boolean_tokens() {
        for t in TRUE_TOKENS {
            assert_eq!(bool::decode_attr(None, t), Ok(true));
        }
        for t in FALSE_TOKENS {
            assert_eq!(bool::decode_attr(None, t), Ok(false));
        }
        assert!(is_invalid(bool::decode_attr(None, "yes")));
        assert!(is_invalid(bool::decode_attr(None, "tRUE")));
    }

    #[test]
    fn boolean_increment_is_or() {
        let mut b = false;
        b.combine_attr(&true, BatchOp::Increment).unwrap();
        assert!(b);
        b.combine_attr(&true, BatchOp::Decrement).unwrap();
        assert!(!b);
        assert_eq!(b.combine_attr(&true, BatchOp::Eq), Err(CombineFailure::Unsupported));
    }

    #[test]
    fn integer_grammar() {
        assert_eq!(decode_integer("-5"), Ok(-5));
        assert_eq!(decode_integer("+17"), Ok(17));
        assert_eq!(decode_integer("007"), Ok(7));
        assert!(is_invalid(decode_integer("12a")));
        assert!(is_invalid(decode_integer("+")));
        assert!(is_invalid(decode_integer(" 1")));
        assert!(is_invalid(decode_integer("1.0")));
        assert!(is_invalid(decode_integer("99999999999999999999")));
    }

    #[test]
    fn short_range() {
        assert_eq!(i16::decode_attr(None, "-32768"), Ok(i16::min_value()));
        assert!(is_invalid(i16::decode_attr(None, "70000")));
        assert!(is_invalid(i16::decode_attr(None, "32768")));
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let mut n = i16::max_value();
        n.combine_attr(&1, BatchOp::Increment).unwrap();
        assert_eq!(n, i16::min_value());

        let mut m = 5i64;
        m.combine_attr(&3, BatchOp::Decrement).unwrap();
        assert_eq!(m, 2);
    }

    #[test]
    fn float_grammar() {
        assert_eq!(f64::decode_attr(None, "1.5"), Ok(1.5));
        assert_eq!(f64::decode_attr(None, "-.25"), Ok(-0.25));
        assert_eq!(f64::decode_attr(None, "2e3"), Ok(2000.));
        assert!(is_invalid(f64::decode_attr(None, "1.2.3")));
        assert!(is_invalid(f64::decode_attr(None, "inf")));
        assert!(is_invalid(f64::decode_attr(None, "NaN")));
        assert!(is_invalid(f64::decode_attr(None, "1e")));
        assert!(is_invalid(f64::decode_attr(None, "1e999")));
    }

    #[test]
    fn float_overflow_is_refused() {
        let mut x = 1e308f64;
        match x.combine_attr(&1e308, BatchOp::Increment) {
            Err(CombineFailure::OutOfRange(_)) => {},
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(x, 1e308);

        x.combine_attr(&-1e308, BatchOp::Decrement).unwrap_err();
        x.combine_attr(&1e308, BatchOp::Decrement).unwrap();
        assert_eq!(x, 0.);
    }

    #[test]
    fn names() {
        assert!(is_identifier("ncpus"));
        assert!(is_identifier("Resource_List"));
        assert!(!is_identifier("2cpus"));
        assert!(is_host_name("2cpus"));
        assert!(is_host_name("node-01.cluster"));
        assert!(!is_host_name("-node"));
        assert!(!is_host_name(""));
    }
}
