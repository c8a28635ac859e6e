// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Ordering attribute values.

*/

use std::cmp::Ordering;

use error::CompareError;
use scalar::AttrType;
use value::Value;


/// Compare an attribute's value with another value of the same kind.
///
/// Numbers, booleans, sizes, and times have their natural order. Node and
/// resource lists are ordered by containment, so two lists that each hold
/// something the other lacks are `Unordered`; selection expressions are
/// only ever equal or unordered.
///
/// An absent operand is reported as `CompareError::Absent`, never as
/// equality. Unset values take part with their zero payloads.
pub fn compare(attr: Option<&Value>, with: Option<&Value>) -> Result<Ordering, CompareError> {
    let (a, b) = match (attr, with) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(CompareError::Absent),
    };

    with_payload_pair!(a.payload(), b.payload(), x, y => x.compare_attr(y).ok_or(CompareError::Unordered),
                       _ => Err(CompareError::KindMismatch(a.kind(), b.kind())))
}
