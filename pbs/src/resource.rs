// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Resource lists such as `Resource_List` and `resources_available`.

A resource list maps resource names to their textual values. It is decoded
either one resource at a time (the attribute carries a resource name, and the
raw string is that resource's value) or all at once from a comma-separated
list of `name=value` pairs.

*/

use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use scalar::{containment, is_identifier, AttrType, CombineFailure, DecodeFailure};
use value::BatchOp;


/// A set of named resources, kept sorted by name.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ResourceList {
    entries: BTreeMap<String, String>,
}

impl ResourceList {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|v| &**v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> Iter {
        Iter(self.entries.iter())
    }

    fn contains_all(&self, other: &ResourceList) -> bool {
        other.entries.iter().all(|(k, v)| self.entries.get(k) == Some(v))
    }
}

/// An iterator over the entries of a `ResourceList`.
pub struct Iter<'a>(btree_map::Iter<'a, String, String>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<(&'a str, &'a str)> {
        self.0.next().map(|(k, v)| (&**k, &**v))
    }
}

fn check_value(raw: &str, value: &str) -> Result<(), DecodeFailure> {
    if value.is_empty() || value.contains(',') {
        Err(DecodeFailure::invalid(format!("bad resource value in \"{}\"", raw)))
    } else {
        Ok(())
    }
}

impl AttrType for ResourceList {
    fn decode_attr(resource: Option<&str>, raw: &str) -> Result<ResourceList, DecodeFailure> {
        let mut entries = BTreeMap::new();

        if let Some(name) = resource {
            if !is_identifier(name) {
                return Err(DecodeFailure::invalid(format!("bad resource name \"{}\"", name)));
            }

            check_value(raw, raw)?;
            entries.insert(name.to_owned(), raw.to_owned());
            return Ok(ResourceList { entries });
        }

        for item in raw.split(',') {
            let (name, value) = match item.find('=') {
                Some(i) => (&item[..i], &item[i + 1..]),
                None => return Err(DecodeFailure::invalid(format!("expected name=value, got \"{}\"", item))),
            };

            if !is_identifier(name) {
                return Err(DecodeFailure::invalid(format!("bad resource name \"{}\"", name)));
            }

            check_value(raw, value)?;

            if entries.insert(name.to_owned(), value.to_owned()).is_some() {
                return Err(DecodeFailure::invalid(format!("resource \"{}\" given more than once", name)));
            }
        }

        Ok(ResourceList { entries })
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;

        for (k, v) in &self.entries {
            if first {
                first = false;
            } else {
                f.write_str(",")?;
            }

            write!(f, "{}={}", k, v)?;
        }

        Ok(())
    }

    /// Increment inserts or overwrites the entries of `source`; decrement
    /// removes the entries whose names appear in `source`.
    fn combine_attr(&mut self, source: &ResourceList, op: BatchOp) -> Result<(), CombineFailure> {
        match op {
            BatchOp::Assign => self.entries = source.entries.clone(),

            BatchOp::Increment => {
                for (k, v) in &source.entries {
                    self.entries.insert(k.clone(), v.clone());
                }
            },

            BatchOp::Decrement => {
                for k in source.entries.keys() {
                    self.entries.remove(k);
                }
            },

            _ => return Err(CombineFailure::Unsupported),
        }

        Ok(())
    }

    fn compare_attr(&self, other: &ResourceList) -> Option<Ordering> {
        containment(other.contains_all(self), self.contains_all(other))
    }
}

impl fmt::Display for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.encode_attr(f)
    }
}
