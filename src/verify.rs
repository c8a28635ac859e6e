// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Check attribute values before they would be sent.

Each `ATTR=VALUE` pair is checked either against the built-in attribute
definitions for an object type, or against an explicitly given kind.

*/

use colorio::ColorIo;
use failure::Error;
use pbs::{self, AttrKind, AttrOp, ObjectType};
use util;


#[derive(Debug, StructOpt)]
pub struct VerifyCommand {
    #[structopt(short = "o", long = "object", default_value = "job")]
    /// The kind of object the attributes belong to: job or node.
    object: ObjectType,

    #[structopt(short = "k", long = "kind")]
    /// Check every value as this kind instead of looking the attributes up.
    kind: Option<AttrKind>,

    #[structopt(name = "ATTR=VALUE", required = true)]
    /// The attributes to check; ATTR may be NAME.RESOURCE.
    attrs: Vec<AttrOp>,
}

impl VerifyCommand {
    pub fn cli(self, cio: &mut ColorIo) -> Result<i32, Error> {
        let mut n_rejected = 0;

        for op in &self.attrs {
            let verdict = match self.kind {
                Some(kind) => pbs::verify(kind, op),
                None => pbs::lookup(self.object, &op.name, op.resource()).and_then(|d| pbs::verify(d.kind(), op)),
            };

            if verdict.is_err() {
                n_rejected += 1;
            }

            cprint!(cio, hl, "{}", op);
            cprint!(cio, pl, " = {:?}: ", op.value);
            util::colorize_verdict(cio, &verdict);
            cprintln!(cio, pl, "");
        }

        info!(checked = self.attrs.len(), rejected = n_rejected, object = %self.object, "verification finished");
        Ok(if n_rejected == 0 { 0 } else { 1 })
    }
}
