// Copyright 2018 Peter Williams <peter@newton.cx>
// Licensed under the MIT License.

//! The main CLI driver logic.

extern crate chrono;
#[macro_use] extern crate failure;
#[macro_use] extern crate failure_derive;
extern crate itertools;
extern crate pbs;
#[macro_use] extern crate structopt;
extern crate termcolor;
#[macro_use] extern crate tracing;
extern crate tracing_subscriber;
extern crate users;

use failure::Error;
use pbs::ClientContext;
use std::env;
use std::io;
use std::process;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[macro_use] mod colorio;
mod combine;
mod dryrun;
mod show;
mod util;
mod verify;

use colorio::{ColorIo, ColorWhen};


#[derive(Debug, StructOpt)]
#[structopt(name = "pbsplus", about = "Check and exercise PBS batch-job attributes.")]
struct PbsPlusCli {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    /// Log more; repeat for more detail. RUST_LOG overrides this.
    verbose: u8,

    #[structopt(long = "color", default_value = "auto")]
    /// Whether to colorize output: auto, always, or never.
    color: ColorWhen,

    #[structopt(long = "no-verify")]
    /// Skip client-side attribute verification. Also set by the
    /// PBSPLUS_NO_VERIFY environment variable.
    no_verify: bool,

    #[structopt(long = "user")]
    /// The user name to put in request headers. Defaults to the login name.
    user: Option<String>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(name = "combine")]
    /// Apply one value to another and show the result
    Combine(combine::CombineCommand),

    #[structopt(name = "dryrun")]
    /// Build a request and print what would be sent
    DryRun(dryrun::DryRunCommand),

    #[structopt(name = "show")]
    /// Decode a value and show its wire encoding
    Show(show::ShowCommand),

    #[structopt(name = "verify")]
    /// Check attribute values the way a client does before sending them
    Verify(verify::VerifyCommand),
}

impl PbsPlusCli {
    fn context(&self) -> Result<ClientContext, Error> {
        let user = match self.user {
            Some(ref u) => u.clone(),
            None => users::get_current_username()
                .ok_or_else(|| format_err!("cannot determine the current user name; use --user"))?
                .into_string()
                .map_err(|_| format_err!("the current user name is not valid Unicode; use --user"))?,
        };

        let mut ctx = ClientContext::new(user);
        ctx.verify = !(self.no_verify || env::var_os("PBSPLUS_NO_VERIFY").is_some());
        Ok(ctx)
    }

    fn cli(self, cio: &mut ColorIo) -> Result<i32, Error> {
        let ctx = self.context()?;
        debug!(user = %ctx.user, verify = ctx.verify, "client context");

        match self.command {
            Command::Combine(cmd) => cmd.cli(cio),
            Command::DryRun(cmd) => cmd.cli(cio, &ctx),
            Command::Show(cmd) => cmd.cli(cio),
            Command::Verify(cmd) => cmd.cli(cio),
        }
    }
}


fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}


fn main() {
    let program = PbsPlusCli::from_args();
    init_tracing(program.verbose);

    let mut cio = ColorIo::new(program.color.into());

    process::exit(match program.cli(&mut cio) {
        Ok(code) => code,

        Err(e) => {
            cio.print_error(e);
            1
        },
    });
}
