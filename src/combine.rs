// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Apply one value to another, the way a server updates an attribute.
 */

use colorio::ColorIo;
use failure::Error;
use pbs::{self, AttrKind, BatchOp};
use util;


#[derive(Debug, StructOpt)]
pub struct CombineCommand {
    #[structopt(short = "k", long = "kind")]
    /// The kind of both values.
    kind: AttrKind,

    #[structopt(help = "The current value of the attribute; empty for unset.")]
    target: String,

    #[structopt(help = "The operation: =, +=, or -=.")]
    op: BatchOp,

    #[structopt(help = "The value to apply.")]
    source: String,
}

impl CombineCommand {
    pub fn cli(self, cio: &mut ColorIo) -> Result<i32, Error> {
        let name = self.kind.label();
        let original = pbs::decode(self.kind, name, None, &self.target)?;
        let source = pbs::decode(self.kind, name, None, &self.source)?;

        if !source.is_set() {
            return Err(format_err!("the value to apply may not be empty"));
        }

        let mut result = original.clone();
        pbs::combine(&mut result, &source, self.op)?;
        debug!(kind = %self.kind, op = %self.op, "combined");

        if original.is_set() {
            cprint!(cio, pl, "{} ", original.payload());
        } else {
            cprint!(cio, yellow, "(unset) ");
        }

        cprint!(cio, pl, "{} {} => ", self.op, source.payload());
        cprintln!(cio, hl, "{}", result.payload());

        cprint!(cio, pl, "  result is ");
        util::colorize_ordering(cio, pbs::compare(Some(&result), Some(&original)));
        cprintln!(cio, pl, " the original value");
        Ok(0)
    }
}
