// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Decoding raw strings into values, and encoding values into wire records.

*/

use error::Result;
use nodes::NodeList;
use resource::ResourceList;
use scalar::AttrType;
use select::SelectSpec;
use size::Size;
use time::TimeSpan;
use value::{AttrKind, AttributeDescriptor, Payload, Value, WireRecord};


/// Decode a raw string into a value of the given kind.
///
/// An empty string decodes to an unset value, which is how requests clear
/// an attribute. `name` and `resource` identify the attribute in error
/// messages; `resource` also selects single-resource decoding for resource
/// lists.
pub fn decode(kind: AttrKind, name: &str, resource: Option<&str>, raw: &str) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::unset(kind));
    }

    let payload = match kind {
        AttrKind::Boolean => bool::decode_attr(resource, raw).map(Payload::Boolean),
        AttrKind::Short => i16::decode_attr(resource, raw).map(Payload::Short),
        AttrKind::Long => i64::decode_attr(resource, raw).map(Payload::Long),
        AttrKind::LongLong => i64::decode_attr(resource, raw).map(Payload::LongLong),
        AttrKind::Float => f64::decode_attr(resource, raw).map(Payload::Float),
        AttrKind::Size => Size::decode_attr(resource, raw).map(Payload::Size),
        AttrKind::Time => TimeSpan::decode_attr(resource, raw).map(Payload::Time),
        AttrKind::NodeList => NodeList::decode_attr(resource, raw).map(Payload::NodeList),
        AttrKind::Resource => ResourceList::decode_attr(resource, raw).map(Payload::Resource),
        AttrKind::SelectionExpr => SelectSpec::decode_attr(resource, raw).map(Payload::SelectionExpr),
    };

    payload
        .map(Value::new)
        .map_err(|e| e.into_error(name, resource))
}


/// Encode a value for transmission under the given descriptor.
///
/// Returns `None` if the value is unset: there is nothing to send. When the
/// descriptor names one resource of a resource list, the record carries
/// only that resource's value, or is `None` if the list lacks it.
pub fn encode(value: &Value, descriptor: &AttributeDescriptor) -> Option<WireRecord> {
    if !value.is_set() {
        return None;
    }

    let text = match (value.payload(), descriptor.resource()) {
        (&Payload::Resource(ref list), Some(r)) => list.get(r)?.to_owned(),
        (payload, _) => payload.to_string(),
    };

    Some(WireRecord {
        name: descriptor.name().to_owned(),
        resource: descriptor.resource().map(|r| r.to_owned()),
        value: text,
        flags: value.flags(),
    })
}


/// Encode a value as one or more wire records.
///
/// A resource list becomes one record per resource, with the record's
/// resource field naming it. Every other kind, and a resource list under a
/// descriptor that names a single resource, yields the same record as
/// `encode`, if any.
pub fn encode_expanded(value: &Value, descriptor: &AttributeDescriptor) -> Vec<WireRecord> {
    if !value.is_set() {
        return Vec::new();
    }

    match *value.payload() {
        Payload::Resource(ref list) if descriptor.resource().is_none() => {
            list.iter()
                .map(|(resource, v)| WireRecord {
                    name: descriptor.name().to_owned(),
                    resource: Some(resource.to_owned()),
                    value: v.to_owned(),
                    flags: value.flags(),
                })
                .collect()
        },

        _ => encode(value, descriptor).into_iter().collect(),
    }
}


impl AttributeDescriptor {
    /// Decode a raw string as a value of this attribute.
    pub fn decode(&self, raw: &str) -> Result<Value> {
        decode(self.kind, &self.name, self.resource(), raw)
    }

    /// Encode a value of this attribute; see `encode`.
    pub fn encode(&self, value: &Value) -> Option<WireRecord> {
        encode(value, self)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use error::PbsError;
    use value::ValueFlags;

    #[test]
    fn empty_string_unsets_every_kind() {
        for kind in AttrKind::ALL.iter().cloned() {
            let v = decode(kind, "a", None, "").unwrap();
            assert!(!v.is_set());
            assert_eq!(v.payload(), &Payload::zero(kind));
        }
    }

    #[test]
    fn long_values() {
        assert_eq!(decode(AttrKind::Long, "run_count", None, "-5").unwrap(), Value::long(-5));

        match decode(AttrKind::Long, "run_count", None, "12a") {
            Err(PbsError::InvalidValue { ref name, .. }) => assert_eq!(name, "run_count"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_overflow_is_invalid() {
        let e = decode(AttrKind::Short, "Priority", None, "70000").unwrap_err();
        assert_eq!(e.code(), ::error::PBSE_BADATVAL);
    }

    #[test]
    fn decode_is_repeatable() {
        let a = decode(AttrKind::SelectionExpr, "Resource_List", Some("select"), "2:ncpus=4").unwrap();
        let b = decode(AttrKind::SelectionExpr, "Resource_List", Some("select"), "2:ncpus=4").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn encode_set_and_unset() {
        let d = AttributeDescriptor::new("run_count", AttrKind::Long);
        assert_eq!(encode(&Value::unset(AttrKind::Long), &d), None);

        let rec = encode(&Value::long(42), &d).unwrap();
        assert_eq!(rec.name, "run_count");
        assert_eq!(rec.resource, None);
        assert_eq!(rec.value, "42");
        assert!(rec.flags.contains(ValueFlags::SET));
    }

    #[test]
    fn encode_does_not_touch_the_value() {
        let d = AttributeDescriptor::with_resource("Resource_List", "walltime", AttrKind::Time);
        let v = d.decode("1:00:00").unwrap();
        let before = v.clone();
        assert_eq!(d.encode(&v).unwrap().value, "01:00:00");
        assert_eq!(v, before);
    }

    #[test]
    fn expanded_resource_records() {
        let d = AttributeDescriptor::new("Resource_List", AttrKind::Resource);
        let v = d.decode("ncpus=4,mem=2gb").unwrap();
        let recs = encode_expanded(&v, &d);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].resource.as_ref().map(|s| &**s), Some("mem"));
        assert_eq!(recs[0].value, "2gb");
        assert_eq!(recs[1].resource.as_ref().map(|s| &**s), Some("ncpus"));

        let single = encode_expanded(&Value::long(1), &AttributeDescriptor::new("x", AttrKind::Long));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn single_resource_round_trip() {
        let d = AttributeDescriptor::with_resource("Resource_List", "preempt_targets", AttrKind::Resource);
        let v = d.decode("queue=workq").unwrap();
        let rec = d.encode(&v).unwrap();
        assert_eq!(rec.resource.as_ref().map(|s| &**s), Some("preempt_targets"));
        assert_eq!(rec.value, "queue=workq");
        assert_eq!(d.decode(&rec.value).unwrap(), v);
        assert_eq!(encode_expanded(&v, &d), vec![rec]);

        let other = AttributeDescriptor::with_resource("Resource_List", "walltime", AttrKind::Resource);
        assert_eq!(other.encode(&v), None);

        let w = other.decode("01:00:00").unwrap();
        assert_eq!(other.encode(&w).unwrap().value, "01:00:00");
        assert_eq!(other.decode(&other.encode(&w).unwrap().value).unwrap(), w);
    }

    #[test]
    fn default_flag_is_carried() {
        let d = AttributeDescriptor::new("Rerunable", AttrKind::Boolean);
        let mut v = d.decode("y").unwrap();
        v.set_default(true);
        let rec = d.encode(&v).unwrap();
        assert_eq!(rec.value, "True");
        assert!(rec.flags.contains(ValueFlags::DEFAULT));
    }
}
