// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Build batch requests without sending them.

The request is written to a recording encoder and the recorded tokens are
printed, one per line.

*/

use colorio::ColorIo;
use failure::Error;
use itertools::Itertools;
use pbs::{self, AttrOp, ClientContext, MessageFile, Protocol, RecordingEncoder};


fn parse_message_file(s: &str) -> Result<MessageFile, Error> {
    match s {
        "stdout" | "1" => Ok(MessageFile::Stdout),
        "stderr" | "2" => Ok(MessageFile::Stderr),
        "both" | "3" => Ok(MessageFile::Both),
        _ => Err(format_err!("expected stdout, stderr, or both; got \"{}\"", s)),
    }
}


#[derive(Debug, StructOpt)]
pub struct RequestOptions {
    #[structopt(long = "tpp")]
    /// Compose the request for the multiplexed transport.
    tpp: bool,

    #[structopt(short = "x", long = "extend")]
    /// An extension string to append to the request.
    extend: Option<String>,
}

impl RequestOptions {
    fn protocol(&self) -> Protocol {
        if self.tpp { Protocol::Tpp } else { Protocol::Tcp }
    }

    fn extend(&self) -> Option<&str> {
        self.extend.as_ref().map(|s| &**s)
    }
}


#[derive(Debug, StructOpt)]
pub enum DryRunCommand {
    #[structopt(name = "message")]
    /// Append a message to a job's output
    Message {
        #[structopt(flatten)]
        opts: RequestOptions,

        #[structopt(short = "f", long = "file", default_value = "stdout",
                    parse(try_from_str = parse_message_file))]
        /// Which output file: stdout, stderr, or both.
        file: MessageFile,

        #[structopt(help = "The job identifier.")]
        jobid: String,

        #[structopt(help = "The message text.")]
        message: String,
    },

    #[structopt(name = "pyspawn")]
    /// Run a Python process inside a job
    PySpawn {
        #[structopt(long = "tpp")]
        /// Compose the request for the multiplexed transport.
        tpp: bool,

        #[structopt(short = "e", long = "env", number_of_values = 1)]
        /// An environment entry, NAME=VALUE; may be repeated.
        env: Vec<String>,

        #[structopt(help = "The job identifier.")]
        jobid: String,

        #[structopt(help = "The program and its arguments.")]
        argv: Vec<String>,
    },

    #[structopt(name = "relnodes")]
    /// Release nodes from a job
    Relnodes {
        #[structopt(flatten)]
        opts: RequestOptions,

        #[structopt(help = "The job identifier.")]
        jobid: String,

        #[structopt(help = "The nodes to release, joined with '+'; all but the primary if omitted.")]
        node_list: Option<String>,
    },

    #[structopt(name = "statvnode")]
    /// Ask for the status of a vnode
    StatVnode {
        #[structopt(flatten)]
        opts: RequestOptions,

        #[structopt(short = "a", long = "attr", number_of_values = 1)]
        /// An attribute to ask about, ATTR=VALUE; may be repeated.
        attrs: Vec<AttrOp>,

        #[structopt(help = "The vnode; all vnodes if omitted.", default_value = "")]
        id: String,
    },
}

impl DryRunCommand {
    pub fn cli(self, cio: &mut ColorIo, ctx: &ClientContext) -> Result<i32, Error> {
        let mut enc = RecordingEncoder::new();

        let msgid = match self {
            DryRunCommand::Message { opts, file, jobid, message } => {
                pbs::message_job_put(&mut enc, ctx, opts.protocol(), &jobid, file, &message, opts.extend())?
            },

            DryRunCommand::PySpawn { tpp, env, jobid, argv } => {
                let protocol = if tpp { Protocol::Tpp } else { Protocol::Tcp };
                let argv = argv.iter().map(|s| &**s).collect_vec();
                let envp = env.iter().map(|s| &**s).collect_vec();
                pbs::py_spawn_put(&mut enc, ctx, protocol, &jobid, &argv, &envp)?
            },

            DryRunCommand::Relnodes { opts, jobid, node_list } => {
                let node_list = node_list.as_ref().map(|s| &**s);
                pbs::relnodes_put(&mut enc, ctx, opts.protocol(), &jobid, node_list, opts.extend())?
            },

            DryRunCommand::StatVnode { opts, attrs, id } => {
                pbs::status_vnode_put(&mut enc, ctx, opts.protocol(), &id, &attrs, opts.extend())?
            },
        };

        info!(tokens = enc.tokens().len(), "request built");

        for token in enc.tokens() {
            cprintln!(cio, pl, "{}", token);
        }

        if let Some(id) = msgid {
            cprint!(cio, hl, "message id:");
            cprintln!(cio, pl, " {}", id);
        }

        Ok(0)
    }
}
