// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Applying a new value to an existing attribute.

Integer and time arithmetic wraps on overflow, sizes saturate, and floats
follow IEEE rules. Whatever the kind, a successful combination leaves the
target marked as set and modified.

*/

use std::convert::TryFrom;

use error::{PbsError, Result};
use scalar::{AttrType, CombineFailure};
use value::{AttrKind, BatchOp, Payload, Value};


/// Apply `source` to `target` with the given operation.
///
/// # Panics
///
/// Panics if `source` is unset. Callers decode request values before
/// combining them, so an unset source indicates a logic error rather than
/// bad input.
pub fn combine(target: &mut Value, source: &Value, op: BatchOp) -> Result<()> {
    assert!(source.is_set(), "cannot combine an unset {} value into an attribute", source.kind());

    let kind = target.kind();

    match op {
        BatchOp::Assign | BatchOp::Increment | BatchOp::Decrement => {},
        _ => return Err(PbsError::UnsupportedOperation { kind, op }),
    }

    let outcome = with_payload_pair!(target.payload_mut(), source.payload(), t, s => Some(t.combine_attr(s, op)),
                                     _ => None);

    match outcome {
        Some(Ok(())) => {
            target.mark_set();
            Ok(())
        },
        Some(Err(CombineFailure::Unsupported)) => Err(PbsError::UnsupportedOperation { kind, op }),
        Some(Err(CombineFailure::OutOfRange(reason))) => Err(PbsError::InvalidValue {
            name: kind.label().to_owned(),
            reason: reason.into_owned(),
        }),
        None => Err(PbsError::KindMismatch { target: kind, source: source.kind() }),
    }
}


impl Value {
    /// Apply an integer directly to a Short, Long, or LongLong value.
    ///
    /// For a Short, `n` itself must fit in 16 bits.
    pub fn apply_long(&mut self, n: i64, op: BatchOp) -> Result<()> {
        let source = match *self.payload() {
            Payload::Short(_) => match i16::try_from(n) {
                Ok(s) => Value::short(s),
                Err(_) => return Err(PbsError::InvalidValue {
                    name: AttrKind::Short.label().to_owned(),
                    reason: format!("{} does not fit in 16 bits", n),
                }),
            },
            Payload::Long(_) => Value::long(n),
            Payload::LongLong(_) => Value::long_long(n),
            _ => return Err(PbsError::KindMismatch { target: self.kind(), source: AttrKind::Long }),
        };

        combine(self, &source, op)
    }

    /// The payload of a Short, Long, or LongLong value, widened to `i64`.
    pub fn get_long(&self) -> Option<i64> {
        match *self.payload() {
            Payload::Short(n) => Some(n as i64),
            Payload::Long(n) | Payload::LongLong(n) => Some(n),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use codec::decode;
    use value::ValueFlags;

    #[test]
    fn increment_and_decrement_longs() {
        let mut t = Value::long(5);
        combine(&mut t, &Value::long(3), BatchOp::Increment).unwrap();
        assert_eq!(t.get_long(), Some(8));
        assert!(t.is_set());

        let mut t = Value::long(5);
        combine(&mut t, &Value::long(3), BatchOp::Decrement).unwrap();
        assert_eq!(t.get_long(), Some(2));
    }

    #[test]
    fn assign_marks_unset_target_as_set() {
        let mut t = Value::unset(AttrKind::Size);
        let s = decode(AttrKind::Size, "mem", None, "4gb").unwrap();
        combine(&mut t, &s, BatchOp::Assign).unwrap();
        assert!(t.flags().contains(ValueFlags::SET | ValueFlags::MODIFY));
        assert_eq!(t.payload().to_string(), "4gb");
    }

    #[test]
    fn wraparound_policy() {
        let mut t = Value::long(i64::max_value());
        combine(&mut t, &Value::long(1), BatchOp::Increment).unwrap();
        assert_eq!(t.get_long(), Some(i64::min_value()));
    }

    #[test]
    fn comparison_operators_are_unsupported() {
        let mut t = Value::long(1);
        let e = combine(&mut t, &Value::long(1), BatchOp::Eq).unwrap_err();
        assert_eq!(e, PbsError::UnsupportedOperation { kind: AttrKind::Long, op: BatchOp::Eq });
        assert_eq!(e.code(), ::error::PBSE_INTERNAL);
    }

    #[test]
    fn select_rejects_increment() {
        let mut t = decode(AttrKind::SelectionExpr, "select", None, "ncpus=1").unwrap();
        let s = decode(AttrKind::SelectionExpr, "select", None, "ncpus=2").unwrap();
        let e = combine(&mut t, &s, BatchOp::Increment).unwrap_err();
        assert_eq!(e, PbsError::UnsupportedOperation { kind: AttrKind::SelectionExpr, op: BatchOp::Increment });
        assert_eq!(t.payload().to_string(), "ncpus=1");
    }

    #[test]
    fn kinds_must_match() {
        let mut t = Value::long(1);
        let e = combine(&mut t, &Value::short(1), BatchOp::Assign).unwrap_err();
        assert_eq!(e, PbsError::KindMismatch { target: AttrKind::Long, source: AttrKind::Short });
    }

    #[test]
    #[should_panic(expected = "unset")]
    fn unset_source_panics() {
        let mut t = Value::long(1);
        let _ = combine(&mut t, &Value::unset(AttrKind::Long), BatchOp::Assign);
    }

    #[test]
    fn float_overflow_leaves_target_alone() {
        let mut t = Value::float(1e308);
        let e = combine(&mut t, &Value::float(1e308), BatchOp::Increment).unwrap_err();
        assert_eq!(e.code(), ::error::PBSE_BADATVAL);
        assert_eq!(t, Value::float(1e308));
    }

    #[test]
    fn direct_short_setter_checks_range() {
        let mut v = Value::short(1);
        let e = v.apply_long(70000, BatchOp::Assign).unwrap_err();
        assert_eq!(e, PbsError::InvalidValue {
            name: "short".to_owned(),
            reason: "70000 does not fit in 16 bits".to_owned(),
        });
        assert_eq!(v.get_long(), Some(1));

        v.apply_long(-2, BatchOp::Increment).unwrap();
        assert_eq!(v.get_long(), Some(-1));
    }

    #[test]
    fn direct_long_setter() {
        let mut v = Value::unset(AttrKind::LongLong);
        v.apply_long(10, BatchOp::Assign).unwrap();
        v.apply_long(4, BatchOp::Decrement).unwrap();
        assert_eq!(v.get_long(), Some(6));
        assert!(v.is_set());

        let mut b = Value::boolean(true);
        assert!(b.apply_long(1, BatchOp::Assign).is_err());
        assert_eq!(b.get_long(), None);
    }
}
