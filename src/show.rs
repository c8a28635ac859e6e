// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Decode a value and show how it would go over the wire.
 */

use colorio::ColorIo;
use failure::Error;
use pbs::{self, AttrKind, AttributeDescriptor, Payload};
use util;


#[derive(Debug, StructOpt)]
pub struct ShowCommand {
    #[structopt(short = "k", long = "kind")]
    /// The kind of the value.
    kind: AttrKind,

    #[structopt(short = "n", long = "name", default_value = "value")]
    /// The attribute name to put in the wire records.
    name: String,

    #[structopt(short = "r", long = "resource")]
    /// The resource name, if the value is one entry of a resource list.
    resource: Option<String>,

    #[structopt(help = "The raw value to decode.")]
    value: String,
}

impl ShowCommand {
    pub fn cli(self, cio: &mut ColorIo) -> Result<i32, Error> {
        let descriptor = match self.resource {
            Some(ref r) => AttributeDescriptor::with_resource(self.name.clone(), r.clone(), self.kind),
            None => AttributeDescriptor::new(self.name.clone(), self.kind),
        };

        let value = descriptor.decode(&self.value)?;
        let records = pbs::encode_expanded(&value, &descriptor);
        debug!(%descriptor, records = records.len(), "decoded");

        if records.is_empty() {
            cprint!(cio, hl, "{}", descriptor);
            cprintln!(cio, yellow, " unset");
            return Ok(0);
        }

        for rec in &records {
            match rec.resource {
                Some(ref r) => cprint!(cio, hl, "{}.{}", rec.name, r),
                None => cprint!(cio, hl, "{}", rec.name),
            }

            cprintln!(cio, pl, " = {:?} (flags {:#04x})", rec.value, rec.flags.bits());
        }

        match *value.payload() {
            Payload::Time(ref t) => {
                if let Some(d) = t.as_duration() {
                    cprintln!(cio, pl, "  about {}", util::dur_to_text(&d));
                }
            },

            Payload::Size(ref s) => {
                cprintln!(cio, pl, "  {} bytes", s.in_bytes());
            },

            Payload::NodeList(ref nodes) => {
                cprintln!(cio, pl, "  {} nodes in {} chunks", nodes.node_count(), nodes.chunks().len());
            },

            Payload::SelectionExpr(ref spec) => {
                cprintln!(cio, pl, "  {} units in {} chunks", spec.total_count(), spec.chunks().len());
            },

            _ => {},
        }

        Ok(0)
    }
}
