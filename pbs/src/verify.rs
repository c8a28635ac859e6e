// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Checking request attributes before they are sent.

A client verifies each attribute of a request against its declared kind so
that malformed values are rejected locally, with the same error code the
server would have produced. Verification only decodes; it never keeps the
decoded value and never touches shared state.

*/

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use codec::decode;
use error::{qualified_name, PbsError, Result};
use failure::Error;
use schema::{self, ObjectType};
use value::{AttrKind, BatchOp, Value, ValueFlags, WireRecord};


/// An attribute as it appears in a request, before it has been typed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttrOp {
    pub name: String,
    pub resource: Option<String>,
    pub value: String,
    pub op: BatchOp,
}

impl AttrOp {
    /// An assignment of `value` to the attribute `name`.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> AttrOp {
        AttrOp { name: name.into(), resource: None, value: value.into(), op: BatchOp::Assign }
    }

    /// An assignment of `value` to one resource of the attribute `name`.
    pub fn with_resource<N, R, V>(name: N, resource: R, value: V) -> AttrOp
        where N: Into<String>, R: Into<String>, V: Into<String>
    {
        AttrOp { name: name.into(), resource: Some(resource.into()), value: value.into(), op: BatchOp::Assign }
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| &**r)
    }

    /// The attribute as an untyped wire record, exactly as given.
    pub fn to_record(&self) -> WireRecord {
        WireRecord {
            name: self.name.clone(),
            resource: self.resource.clone(),
            value: self.value.clone(),
            flags: ValueFlags::empty(),
        }
    }
}

impl fmt::Display for AttrOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&qualified_name(&self.name, self.resource()))
    }
}

impl FromStr for AttrOp {
    type Err = Error;

    /// Parse `name[.resource]=value`.
    fn from_str(s: &str) -> ::std::result::Result<AttrOp, Error> {
        let eq = s.find('=').ok_or_else(|| format_err!("expected name=value, got \"{}\"", s))?;
        let (lhs, value) = (&s[..eq], &s[eq + 1..]);

        if lhs.is_empty() {
            return Err(format_err!("missing attribute name in \"{}\"", s));
        }

        Ok(match lhs.find('.') {
            Some(dot) => AttrOp::with_resource(&lhs[..dot], &lhs[dot + 1..], value),
            None => AttrOp::new(lhs, value),
        })
    }
}


/// A verification function for one kind.
pub type Verifier = fn(&AttrOp) -> Result<()>;

fn decode_op(kind: AttrKind, op: &AttrOp) -> Result<Value> {
    decode(kind, &op.name, op.resource(), &op.value)
}

macro_rules! decode_verifier {
    ($fn:ident, $kind:ident) => {
        fn $fn(op: &AttrOp) -> Result<()> {
            decode_op(AttrKind::$kind, op).map(|_| ())
        }
    };
}

decode_verifier!(verify_boolean, Boolean);
decode_verifier!(verify_long, Long);
decode_verifier!(verify_long_long, LongLong);
decode_verifier!(verify_float, Float);
decode_verifier!(verify_size, Size);
decode_verifier!(verify_time, Time);
decode_verifier!(verify_nodes, NodeList);
decode_verifier!(verify_resource, Resource);

/// Shorts are parsed at full width and then narrowed, so that an
/// out-of-range value is reported against the 16-bit limit.
fn verify_short(op: &AttrOp) -> Result<()> {
    let value = decode_op(AttrKind::Long, op)?;

    match value.get_long() {
        Some(n) if i16::try_from(n).is_err() => Err(PbsError::InvalidValue {
            name: qualified_name(&op.name, op.resource()),
            reason: format!("{} does not fit in 16 bits", n),
        }),
        _ => Ok(()),
    }
}

/// The parsed expression is released before returning, on success and on
/// failure alike.
fn verify_select(op: &AttrOp) -> Result<()> {
    decode_op(AttrKind::SelectionExpr, op).map(drop)
}

/// Verifiers in `AttrKind` declaration order.
static VERIFIERS: [Verifier; 10] = [
    verify_boolean,
    verify_short,
    verify_long,
    verify_long_long,
    verify_float,
    verify_size,
    verify_time,
    verify_nodes,
    verify_resource,
    verify_select,
];


/// The verification function for a kind.
pub fn verifier(kind: AttrKind) -> Verifier {
    VERIFIERS[kind as usize]
}


/// Verify one request attribute against a declared kind.
///
/// Decode errors are returned unchanged.
pub fn verify(kind: AttrKind, op: &AttrOp) -> Result<()> {
    verifier(kind)(op)
}


/// Verify request attributes against the built-in schema for an object type.
///
/// The first attribute that is unknown or fails verification determines the
/// result.
pub fn verify_attributes(object: ObjectType, ops: &[AttrOp]) -> Result<()> {
    for op in ops {
        let descriptor = schema::lookup(object, &op.name, op.resource())?;
        verify(descriptor.kind(), op)?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use error::{PBSE_BADATVAL, PBSE_NOATTR};

    #[test]
    fn table_matches_kind_order() {
        // A value every kind accepts, and one each rejects.
        let good = [
            (AttrKind::Boolean, "true", "maybe"),
            (AttrKind::Short, "-12", "40000"),
            (AttrKind::Long, "12", "12a"),
            (AttrKind::LongLong, "9000000000", "9e9"),
            (AttrKind::Float, "0.5", "half"),
            (AttrKind::Size, "2gb", "2zb"),
            (AttrKind::Time, "10:00", "10:xx"),
            (AttrKind::NodeList, "2:ppn=1", "2:"),
            (AttrKind::Resource, "ncpus=1", "ncpus"),
            (AttrKind::SelectionExpr, "ncpus=1", "ncpus=1+"),
        ];

        for &(kind, ok, bad) in &good {
            assert_eq!(verify(kind, &AttrOp::new("a", ok)), Ok(()), "{} rejected {:?}", kind, ok);
            assert!(verify(kind, &AttrOp::new("a", bad)).is_err(), "{} accepted {:?}", kind, bad);
        }
    }

    #[test]
    fn short_is_narrowed_after_decode() {
        let e = verify(AttrKind::Short, &AttrOp::new("Priority", "70000")).unwrap_err();
        assert_eq!(e.code(), PBSE_BADATVAL);
        assert_eq!(e, PbsError::InvalidValue {
            name: "Priority".to_owned(),
            reason: "70000 does not fit in 16 bits".to_owned(),
        });
    }

    #[test]
    fn errors_pass_through_unchanged() {
        let op = AttrOp::with_resource("Resource_List", "select", "2:ncpus");
        let direct = decode(AttrKind::SelectionExpr, "Resource_List", Some("select"), "2:ncpus").unwrap_err();
        assert_eq!(verify(AttrKind::SelectionExpr, &op), Err(direct));
    }

    #[test]
    fn empty_value_verifies() {
        assert_eq!(verify(AttrKind::Long, &AttrOp::new("run_count", "")), Ok(()));
    }

    #[test]
    fn schema_driven() {
        let ops = vec![
            AttrOp::new("Rerunable", "n"),
            AttrOp::with_resource("Resource_List", "walltime", "01:00:00"),
        ];
        assert_eq!(verify_attributes(ObjectType::Job, &ops), Ok(()));

        let ops = vec![AttrOp::new("Rerunable", "n"), AttrOp::new("bogus", "1")];
        assert_eq!(verify_attributes(ObjectType::Job, &ops).unwrap_err().code(), PBSE_NOATTR);
    }

    #[test]
    fn parse_cli_form() {
        let op: AttrOp = "Resource_List.mem=4gb".parse().unwrap();
        assert_eq!(op, AttrOp::with_resource("Resource_List", "mem", "4gb"));
        assert_eq!(op.to_string(), "Resource_List.mem");

        let op: AttrOp = "Priority=".parse().unwrap();
        assert_eq!(op.value, "");

        assert!("Priority".parse::<AttrOp>().is_err());
        assert!("=5".parse::<AttrOp>().is_err());
    }
}
