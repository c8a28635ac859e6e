// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Typed attribute values for the PBS batch system.

Every attribute a PBS client or server deals with has a *kind* (boolean,
integer, size, walltime, node list, and so on) and travels over the wire as
a string. This crate decodes those strings into typed `Value`s, encodes
them back, applies assignment and increment/decrement updates, orders
values of the same kind, and verifies request attributes before they are
sent.

```
use pbs::{decode, AttrKind, BatchOp};

let mut walltime = decode(AttrKind::Time, "Resource_List", Some("walltime"), "1:00:00").unwrap();
let extra = decode(AttrKind::Time, "Resource_List", Some("walltime"), "30:00").unwrap();
pbs::combine(&mut walltime, &extra, BatchOp::Increment).unwrap();
assert_eq!(walltime.payload().to_string(), "01:30:00");
```

*/

extern crate chrono;
#[macro_use] extern crate failure;
#[macro_use] extern crate failure_derive;
extern crate itertools;
#[macro_use] extern crate tracing;


/// Encoder calls return `failure::Error`s of their own; this macro logs the
/// failure and converts it into `PbsError::Protocol`, returning early. The
/// request and stage name are recorded so that the message says where the
/// request broke off.
macro_rules! ptry {
    ($request:expr, $stage:expr, $op:expr) => {
        match $op {
            Ok(v) => v,
            Err(e) => {
                warn!(request = %$request, stage = $stage, "request encoding failed: {}", e);
                return Err($crate::error::PbsError::Protocol(format!("{} {}: {}", $request, $stage, e)));
            },
        }
    }
}


mod error;
#[macro_use] mod value;
mod scalar;
mod size;
mod time;
mod nodes;
mod resource;
mod select;
mod codec;
mod combine;
mod compare;
mod schema;
mod verify;
mod request;

pub use codec::{decode, encode, encode_expanded};
pub use combine::combine;
pub use compare::compare;
pub use error::{
    CompareError, PbsError, Result, PBSE_BADATVAL, PBSE_INTERNAL, PBSE_NOATTR, PBSE_NONE, PBSE_PROTOCOL,
    PBSE_SYSTEM, PBSE_UNKRESC,
};
pub use nodes::{NodeChunk, NodeHead, NodeList, NodeProp};
pub use request::{
    message_job_put, py_spawn_put, relnodes_put, status_vnode_put, ClientContext, MessageFile, Protocol,
    RecordingEncoder, RequestEncoder, RequestType, Token,
};
pub use resource::{Iter as ResourceIter, ResourceList};
pub use schema::{lookup, ObjectType};
pub use select::{SelectChunk, SelectSpec};
pub use size::{Size, SizeUnit, WORD_BYTES};
pub use time::TimeSpan;
pub use value::{AttrKind, AttributeDescriptor, BatchOp, Payload, Value, ValueFlags, WireRecord};
pub use verify::{verifier, verify, verify_attributes, AttrOp, Verifier};
