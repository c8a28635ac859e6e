// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! The typed attribute value.

A `Value` is one payload from a closed set of kinds, plus the flag bits the
batch system tracks for every attribute. The per-kind behavior lives in the
`AttrType` implementations of the payload types; this module only routes
each call to the right implementation.

*/

use failure::Error;
use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use nodes::NodeList;
use resource::ResourceList;
use select::SelectSpec;
use size::Size;
use time::TimeSpan;


/// The kind of an attribute value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AttrKind {
    Boolean,
    Short,
    Long,
    LongLong,
    Float,
    Size,
    Time,
    NodeList,
    Resource,
    SelectionExpr,
}

impl AttrKind {
    /// Every kind, in declaration order.
    pub const ALL: [AttrKind; 10] = [
        AttrKind::Boolean,
        AttrKind::Short,
        AttrKind::Long,
        AttrKind::LongLong,
        AttrKind::Float,
        AttrKind::Size,
        AttrKind::Time,
        AttrKind::NodeList,
        AttrKind::Resource,
        AttrKind::SelectionExpr,
    ];

    /// A stable lowercase label, as accepted by `FromStr`.
    pub fn label(self) -> &'static str {
        match self {
            AttrKind::Boolean => "boolean",
            AttrKind::Short => "short",
            AttrKind::Long => "long",
            AttrKind::LongLong => "longlong",
            AttrKind::Float => "float",
            AttrKind::Size => "size",
            AttrKind::Time => "time",
            AttrKind::NodeList => "nodes",
            AttrKind::Resource => "resource",
            AttrKind::SelectionExpr => "select",
        }
    }

    /// Whether increment and decrement are arithmetic for this kind.
    pub fn is_numeric(self) -> bool {
        match self {
            AttrKind::Short | AttrKind::Long | AttrKind::LongLong |
            AttrKind::Float | AttrKind::Size | AttrKind::Time => true,
            _ => false,
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AttrKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "long_long" => return Ok(AttrKind::LongLong),
            "selection" => return Ok(AttrKind::SelectionExpr),
            _ => {}
        }

        AttrKind::ALL.iter()
            .cloned()
            .find(|k| k.label() == s)
            .ok_or_else(|| format_err!("unrecognized attribute kind \"{}\"", s))
    }
}


/// How a new value is applied to, or tested against, an existing attribute.
///
/// Only `Assign`, `Increment`, and `Decrement` are meaningful to the
/// combinator; the rest exist because requests carry them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BatchOp {
    Assign,
    Unset,
    Increment,
    Decrement,
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    Default,
}

impl BatchOp {
    /// The operator's textual form.
    pub fn symbol(self) -> &'static str {
        match self {
            BatchOp::Assign => "=",
            BatchOp::Unset => "unset",
            BatchOp::Increment => "+=",
            BatchOp::Decrement => "-=",
            BatchOp::Eq => "==",
            BatchOp::Ne => "!=",
            BatchOp::Ge => ">=",
            BatchOp::Gt => ">",
            BatchOp::Le => "<=",
            BatchOp::Lt => "<",
            BatchOp::Default => "default",
        }
    }
}

impl fmt::Display for BatchOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BatchOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Ok(match s {
            "=" | "set" => BatchOp::Assign,
            "unset" => BatchOp::Unset,
            "+=" | "incr" => BatchOp::Increment,
            "-=" | "decr" => BatchOp::Decrement,
            "==" => BatchOp::Eq,
            "!=" => BatchOp::Ne,
            ">=" => BatchOp::Ge,
            ">" => BatchOp::Gt,
            "<=" => BatchOp::Le,
            "<" => BatchOp::Lt,
            "default" => BatchOp::Default,
            _ => return Err(format_err!("unrecognized operator \"{}\"", s)),
        })
    }
}


/// The flag bits carried by a value and copied into its wire records.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ValueFlags(u32);

impl ValueFlags {
    /// The value has been explicitly provided.
    pub const SET: ValueFlags = ValueFlags(0x01);

    /// The value changed since it was last saved.
    pub const MODIFY: ValueFlags = ValueFlags(0x02);

    /// The value was supplied as a default rather than by a request.
    pub const DEFAULT: ValueFlags = ValueFlags(0x04);

    /// Any cached encoding of the value is stale.
    pub const MODCACHE: ValueFlags = ValueFlags(0x08);

    /// No bits.
    pub fn empty() -> ValueFlags {
        ValueFlags(0)
    }

    /// Reconstruct flags from their raw bits.
    pub fn from_bits(bits: u32) -> ValueFlags {
        ValueFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: ValueFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ValueFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ValueFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for ValueFlags {
    type Output = ValueFlags;

    fn bitor(self, other: ValueFlags) -> ValueFlags {
        ValueFlags(self.0 | other.0)
    }
}


/// The payload of a value: exactly one variant per `AttrKind`.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Boolean(bool),
    Short(i16),
    Long(i64),
    LongLong(i64),
    Float(f64),
    Size(Size),
    Time(TimeSpan),
    NodeList(NodeList),
    Resource(ResourceList),
    SelectionExpr(SelectSpec),
}

/// Evaluate `$body` with `$v` bound to the inner value of a payload,
/// whatever its kind.
macro_rules! with_payload {
    ($payload:expr, $v:ident => $body:expr) => {
        match $payload {
            $crate::value::Payload::Boolean($v) => $body,
            $crate::value::Payload::Short($v) => $body,
            $crate::value::Payload::Long($v) => $body,
            $crate::value::Payload::LongLong($v) => $body,
            $crate::value::Payload::Float($v) => $body,
            $crate::value::Payload::Size($v) => $body,
            $crate::value::Payload::Time($v) => $body,
            $crate::value::Payload::NodeList($v) => $body,
            $crate::value::Payload::Resource($v) => $body,
            $crate::value::Payload::SelectionExpr($v) => $body,
        }
    };
}

/// Evaluate `$body` with `$a` and `$b` bound to the inner values of two
/// payloads of the same kind, or `$otherwise` if the kinds differ.
macro_rules! with_payload_pair {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr, _ => $otherwise:expr) => {
        match ($left, $right) {
            ($crate::value::Payload::Boolean($a), $crate::value::Payload::Boolean($b)) => $body,
            ($crate::value::Payload::Short($a), $crate::value::Payload::Short($b)) => $body,
            ($crate::value::Payload::Long($a), $crate::value::Payload::Long($b)) => $body,
            ($crate::value::Payload::LongLong($a), $crate::value::Payload::LongLong($b)) => $body,
            ($crate::value::Payload::Float($a), $crate::value::Payload::Float($b)) => $body,
            ($crate::value::Payload::Size($a), $crate::value::Payload::Size($b)) => $body,
            ($crate::value::Payload::Time($a), $crate::value::Payload::Time($b)) => $body,
            ($crate::value::Payload::NodeList($a), $crate::value::Payload::NodeList($b)) => $body,
            ($crate::value::Payload::Resource($a), $crate::value::Payload::Resource($b)) => $body,
            ($crate::value::Payload::SelectionExpr($a), $crate::value::Payload::SelectionExpr($b)) => $body,
            _ => $otherwise,
        }
    };
}

impl Payload {
    /// The zero value of a kind; this is what an unset value holds.
    pub fn zero(kind: AttrKind) -> Payload {
        match kind {
            AttrKind::Boolean => Payload::Boolean(false),
            AttrKind::Short => Payload::Short(0),
            AttrKind::Long => Payload::Long(0),
            AttrKind::LongLong => Payload::LongLong(0),
            AttrKind::Float => Payload::Float(0.),
            AttrKind::Size => Payload::Size(Size::default()),
            AttrKind::Time => Payload::Time(TimeSpan::default()),
            AttrKind::NodeList => Payload::NodeList(NodeList::default()),
            AttrKind::Resource => Payload::Resource(ResourceList::default()),
            AttrKind::SelectionExpr => Payload::SelectionExpr(SelectSpec::default()),
        }
    }

    pub fn kind(&self) -> AttrKind {
        match *self {
            Payload::Boolean(_) => AttrKind::Boolean,
            Payload::Short(_) => AttrKind::Short,
            Payload::Long(_) => AttrKind::Long,
            Payload::LongLong(_) => AttrKind::LongLong,
            Payload::Float(_) => AttrKind::Float,
            Payload::Size(_) => AttrKind::Size,
            Payload::Time(_) => AttrKind::Time,
            Payload::NodeList(_) => AttrKind::NodeList,
            Payload::Resource(_) => AttrKind::Resource,
            Payload::SelectionExpr(_) => AttrKind::SelectionExpr,
        }
    }
}

impl fmt::Display for Payload {
    /// The canonical textual form, as it is sent on the wire.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use scalar::AttrType;
        with_payload!(self, v => v.encode_attr(f))
    }
}


/// A typed attribute value.
///
/// Consumers must check `is_set` before trusting the payload: an unset value
/// always holds its kind's zero payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    payload: Payload,
    flags: ValueFlags,
}

impl Value {
    /// An unset value of the given kind.
    pub fn unset(kind: AttrKind) -> Value {
        Value {
            payload: Payload::zero(kind),
            flags: ValueFlags::empty(),
        }
    }

    /// A value that has been explicitly provided.
    pub fn new(payload: Payload) -> Value {
        let mut v = Value { payload, flags: ValueFlags::empty() };
        v.mark_set();
        v
    }

    pub fn boolean(b: bool) -> Value {
        Value::new(Payload::Boolean(b))
    }

    pub fn short(n: i16) -> Value {
        Value::new(Payload::Short(n))
    }

    pub fn long(n: i64) -> Value {
        Value::new(Payload::Long(n))
    }

    pub fn long_long(n: i64) -> Value {
        Value::new(Payload::LongLong(n))
    }

    pub fn float(x: f64) -> Value {
        Value::new(Payload::Float(x))
    }

    pub fn kind(&self) -> AttrKind {
        self.payload.kind()
    }

    pub fn is_set(&self) -> bool {
        self.flags.contains(ValueFlags::SET)
    }

    pub fn flags(&self) -> ValueFlags {
        self.flags
    }

    /// Mark the value as supplied by default rather than by a request.
    pub fn set_default(&mut self, is_default: bool) {
        if is_default {
            self.flags.insert(ValueFlags::DEFAULT);
        } else {
            self.flags.remove(ValueFlags::DEFAULT);
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Record that the value has been explicitly provided and modified.
    pub(crate) fn mark_set(&mut self) {
        self.flags.insert(ValueFlags::SET | ValueFlags::MODIFY | ValueFlags::MODCACHE);
    }
}


/// Identifies an attribute: its name, its resource name if it is a member
/// of a resource list, and its kind.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttributeDescriptor {
    pub(crate) name: Cow<'static, str>,
    pub(crate) resource: Option<Cow<'static, str>>,
    pub(crate) kind: AttrKind,
}

impl AttributeDescriptor {
    pub fn new<N: Into<Cow<'static, str>>>(name: N, kind: AttrKind) -> Self {
        AttributeDescriptor { name: name.into(), resource: None, kind }
    }

    /// A descriptor for one named resource within a resource-list attribute.
    pub fn with_resource<N, R>(name: N, resource: R, kind: AttrKind) -> Self
        where N: Into<Cow<'static, str>>, R: Into<Cow<'static, str>>
    {
        AttributeDescriptor { name: name.into(), resource: Some(resource.into()), kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| &**r)
    }

    pub fn kind(&self) -> AttrKind {
        self.kind
    }
}

impl fmt::Display for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.resource {
            Some(ref r) => write!(f, "{}.{}", self.name, r),
            None => f.write_str(&self.name),
        }
    }
}


/// An encoded attribute, ready to hand to the transport layer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct WireRecord {
    pub name: String,
    pub resource: Option<String>,
    pub value: String,
    pub flags: ValueFlags,
}
