// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Error types.

Every fallible operation in this crate returns its error directly. The batch
system's numeric error taxonomy is preserved through `PbsError::code`, since
the request-verification layer reports rejected attributes by code.

*/

use std::result;

use value::{AttrKind, BatchOp};


/// The code reported for success.
pub const PBSE_NONE: i32 = 0;

/// No such attribute.
pub const PBSE_NOATTR: i32 = 15002;

/// System error, including failure to allocate memory.
pub const PBSE_SYSTEM: i32 = 15010;

/// Internal error; used for programming and protocol misuse.
pub const PBSE_INTERNAL: i32 = 15011;

/// Illegal attribute or resource value.
pub const PBSE_BADATVAL: i32 = 15014;

/// Unknown resource.
pub const PBSE_UNKRESC: i32 = 15016;

/// Protocol error while talking to the server.
pub const PBSE_PROTOCOL: i32 = 15031;


/// A result whose error type is `PbsError`.
pub type Result<T> = result::Result<T, PbsError>;


/// An error from decoding, combining, verifying, or sending attributes.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum PbsError {
    /// The raw string did not satisfy the kind's grammar or range.
    #[fail(display = "illegal attribute or resource value for {}: {}", name, reason)]
    InvalidValue {
        /// The attribute name, with `.resource` appended if there was one.
        name: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The combinator was asked for an operation the kind does not support.
    #[fail(display = "operation \"{}\" is not supported on {} attributes", op, kind)]
    UnsupportedOperation {
        kind: AttrKind,
        op: BatchOp,
    },

    /// A structured decode could not reserve memory for its result.
    #[fail(display = "out of memory while decoding {}", name)]
    AllocationFailure {
        name: String,
    },

    /// Two values of different kinds were combined.
    #[fail(display = "cannot combine a {} value with a {} value", target, source)]
    KindMismatch {
        target: AttrKind,
        source: AttrKind,
    },

    /// The attribute name is not in the schema for its object type.
    #[fail(display = "unknown attribute {}", name)]
    UnknownAttribute {
        name: String,
    },

    /// The resource name is not in the schema for its attribute.
    #[fail(display = "unknown resource {}.{}", name, resource)]
    UnknownResource {
        name: String,
        resource: String,
    },

    /// The request could not be encoded or flushed.
    #[fail(display = "protocol error: {}", _0)]
    Protocol(String),
}

impl PbsError {
    /// The batch system's numeric code for this error.
    pub fn code(&self) -> i32 {
        match *self {
            PbsError::InvalidValue { .. } => PBSE_BADATVAL,
            PbsError::UnsupportedOperation { .. } => PBSE_INTERNAL,
            PbsError::AllocationFailure { .. } => PBSE_SYSTEM,
            PbsError::KindMismatch { .. } => PBSE_INTERNAL,
            PbsError::UnknownAttribute { .. } => PBSE_NOATTR,
            PbsError::UnknownResource { .. } => PBSE_UNKRESC,
            PbsError::Protocol(_) => PBSE_PROTOCOL,
        }
    }
}


/// Why a comparison could not produce an ordering.
///
/// A missing operand is an error, never `Ordering::Equal`.
#[derive(Clone, Copy, Debug, Eq, Fail, PartialEq)]
pub enum CompareError {
    /// One of the operands was absent.
    #[fail(display = "cannot compare against an absent attribute")]
    Absent,

    /// The operands are of different kinds.
    #[fail(display = "cannot compare a {} value with a {} value", _0, _1)]
    KindMismatch(AttrKind, AttrKind),

    /// The kind has no ordering between these two values.
    #[fail(display = "values are not ordered with respect to each other")]
    Unordered,
}


/// Render an attribute name for diagnostics.
pub(crate) fn qualified_name(name: &str, resource: Option<&str>) -> String {
    match resource {
        Some(r) => format!("{}.{}", name, r),
        None => name.to_owned(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_batch_taxonomy() {
        let e = PbsError::InvalidValue { name: "Priority".to_owned(), reason: "x".to_owned() };
        assert_eq!(e.code(), PBSE_BADATVAL);
        assert_eq!(PbsError::Protocol("eof".to_owned()).code(), PBSE_PROTOCOL);
        assert_eq!(PbsError::UnknownAttribute { name: "x".to_owned() }.code(), PBSE_NOATTR);
    }

    #[test]
    fn display_names_the_attribute() {
        let e = PbsError::InvalidValue {
            name: qualified_name("Resource_List", Some("mem")),
            reason: "unrecognized size suffix".to_owned(),
        };
        assert_eq!(format!("{}", e),
                   "illegal attribute or resource value for Resource_List.mem: unrecognized size suffix");
    }
}
