// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Built-in attribute definitions used by client-side verification.

This is not the server's full attribute table, only the job and node
attributes whose values clients routinely set or query. Names are matched
case-insensitively.

*/

use failure::Error;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use error::{PbsError, Result};
use value::{AttrKind, AttributeDescriptor};


/// The kind of object an attribute belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectType {
    Job,
    Node,
}

impl ObjectType {
    /// The built-in attribute definitions for this object type.
    pub fn attributes(self) -> &'static [AttributeDescriptor] {
        match self {
            ObjectType::Job => &JOB_ATTRIBUTES,
            ObjectType::Node => &NODE_ATTRIBUTES,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ObjectType::Job => "job",
            ObjectType::Node => "node",
        })
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> ::std::result::Result<ObjectType, Error> {
        match s {
            "job" => Ok(ObjectType::Job),
            "node" | "vnode" => Ok(ObjectType::Node),
            _ => Err(format_err!("unrecognized object type \"{}\"", s)),
        }
    }
}


macro_rules! attr {
    ($name:expr, $kind:ident) => {
        AttributeDescriptor { name: Cow::Borrowed($name), resource: None, kind: AttrKind::$kind }
    };

    ($name:expr, $resource:expr, $kind:ident) => {
        AttributeDescriptor {
            name: Cow::Borrowed($name),
            resource: Some(Cow::Borrowed($resource)),
            kind: AttrKind::$kind,
        }
    };
}

static JOB_ATTRIBUTES: [AttributeDescriptor; 19] = [
    attr!("Priority", Short),
    attr!("Rerunable", Boolean),
    attr!("run_count", Long),
    attr!("run_version", Long),
    attr!("max_run_subjobs", Long),
    attr!("Resource_List", Resource),
    attr!("Resource_List", "ncpus", Long),
    attr!("Resource_List", "ngpus", Long),
    attr!("Resource_List", "mem", Size),
    attr!("Resource_List", "vmem", Size),
    attr!("Resource_List", "walltime", Time),
    attr!("Resource_List", "cput", Time),
    attr!("Resource_List", "nodes", NodeList),
    attr!("Resource_List", "select", SelectionExpr),
    attr!("Resource_List", "preempt_targets", Resource),
    attr!("resources_used", Resource),
    attr!("resources_used", "cpupercent", Long),
    attr!("resources_used", "walltime", Time),
    attr!("resources_used", "mem", Size),
];

static NODE_ATTRIBUTES: [AttributeDescriptor; 14] = [
    attr!("Port", Long),
    attr!("pcpus", Long),
    attr!("Priority", Long),
    attr!("resv_enable", Boolean),
    attr!("no_multinode_jobs", Boolean),
    attr!("last_state_change_time", LongLong),
    attr!("last_used_time", LongLong),
    attr!("resources_available", Resource),
    attr!("resources_available", "ncpus", Long),
    attr!("resources_available", "ngpus", Long),
    attr!("resources_available", "mem", Size),
    attr!("resources_available", "loadave", Float),
    attr!("resources_assigned", Resource),
    attr!("resources_assigned", "mem", Size),
];


/// Find the definition of an attribute, or of one resource within it.
pub fn lookup(object: ObjectType, name: &str, resource: Option<&str>) -> Result<&'static AttributeDescriptor> {
    let table = object.attributes();

    let mut candidates = table.iter()
        .filter(|d| d.name().eq_ignore_ascii_case(name))
        .peekable();

    if candidates.peek().is_none() {
        return Err(PbsError::UnknownAttribute { name: name.to_owned() });
    }

    let found = candidates.find(|d| match (d.resource(), resource) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    });

    match (found, resource) {
        (Some(d), _) => Ok(d),
        (None, Some(r)) => Err(PbsError::UnknownResource { name: name.to_owned(), resource: r.to_owned() }),
        (None, None) => Err(PbsError::UnknownAttribute { name: name.to_owned() }),
    }
}
