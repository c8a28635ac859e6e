// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Client-side request construction.

Each `*_put` function writes one complete batch request (header, body, and
extension) to a `RequestEncoder` and flushes it. The encoder stands for the
wire encoder and its connection; holding it by `&mut` is what keeps two
requests from interleaving on the same connection.

Reply handling is the caller's business.

*/

use failure::Error;
use std::fmt;

use error::{qualified_name, Result};
use schema::ObjectType;
use value::WireRecord;
use verify::{verify_attributes, AttrOp};


/// The batch requests this module can build.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RequestType {
    MessageJob,
    PySpawn,
    RelnodesJob,
    StatusNode,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RequestType::MessageJob => "MessageJob",
            RequestType::PySpawn => "PySpawn",
            RequestType::RelnodesJob => "RelnodesJob",
            RequestType::StatusNode => "StatusNode",
        })
    }
}


/// How the request travels to the server.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Protocol {
    /// A direct stream connection.
    Tcp,

    /// The multiplexed transport; each request is composed as a separate
    /// message and gets a message id.
    Tpp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Protocol::Tcp => "tcp",
            Protocol::Tpp => "tpp",
        })
    }
}


/// Which of a job's output files a message is appended to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MessageFile {
    Stdout,
    Stderr,
    Both,
}

impl MessageFile {
    pub fn code(self) -> u64 {
        match self {
            MessageFile::Stdout => 1,
            MessageFile::Stderr => 2,
            MessageFile::Both => 3,
        }
    }
}


/// The seam between request construction and the wire encoder.
///
/// Every method may fail; the request functions turn any failure into
/// `PbsError::Protocol`.
pub trait RequestEncoder {
    /// Begin a new message. Only the multiplexed transport assigns message
    /// ids.
    fn compose(&mut self, protocol: Protocol) -> ::std::result::Result<Option<String>, Error>;

    fn put_header(&mut self, request: RequestType, user: &str) -> ::std::result::Result<(), Error>;

    fn put_str(&mut self, s: &str) -> ::std::result::Result<(), Error>;

    fn put_uint(&mut self, n: u64) -> ::std::result::Result<(), Error>;

    fn put_attr(&mut self, record: &WireRecord) -> ::std::result::Result<(), Error>;

    fn put_extend(&mut self, extend: Option<&str>) -> ::std::result::Result<(), Error>;

    fn flush(&mut self) -> ::std::result::Result<(), Error>;
}


/// Who is sending requests, and whether their attributes are checked first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientContext {
    pub user: String,
    pub verify: bool,
}

impl ClientContext {
    pub fn new<S: Into<String>>(user: S) -> ClientContext {
        ClientContext { user: user.into(), verify: true }
    }
}


fn send<E, F>(
    enc: &mut E, ctx: &ClientContext, protocol: Protocol, request: RequestType, extend: Option<&str>, body: F
) -> Result<Option<String>>
    where E: RequestEncoder + ?Sized,
          F: FnOnce(&mut E) -> ::std::result::Result<(), Error>
{
    let msgid = ptry!(request, "compose", enc.compose(protocol));
    debug!(%request, %protocol, msgid = ?msgid, "composing request");

    ptry!(request, "header", enc.put_header(request, &ctx.user));
    ptry!(request, "body", body(enc));
    ptry!(request, "extension", enc.put_extend(extend));
    ptry!(request, "flush", enc.flush());

    debug!(%request, "request flushed");
    Ok(msgid)
}


/// Ask the server to append `msg` to the output of job `jobid`.
pub fn message_job_put<E: RequestEncoder + ?Sized>(
    enc: &mut E, ctx: &ClientContext, protocol: Protocol, jobid: &str, file: MessageFile, msg: &str,
    extend: Option<&str>
) -> Result<Option<String>> {
    send(enc, ctx, protocol, RequestType::MessageJob, extend, |enc| {
        enc.put_str(jobid)?;
        enc.put_uint(file.code())?;
        enc.put_str(msg)
    })
}


/// Ask the server to run a Python process inside job `jobid`.
///
/// Argument and environment vectors go out as a count followed by the
/// strings. This request never carries an extension.
pub fn py_spawn_put<E: RequestEncoder + ?Sized>(
    enc: &mut E, ctx: &ClientContext, protocol: Protocol, jobid: &str, argv: &[&str], envp: &[&str]
) -> Result<Option<String>> {
    send(enc, ctx, protocol, RequestType::PySpawn, None, |enc| {
        enc.put_str(jobid)?;

        for list in &[argv, envp] {
            enc.put_uint(list.len() as u64)?;

            for s in list.iter() {
                enc.put_str(s)?;
            }
        }

        Ok(())
    })
}


/// Ask the server to release nodes from job `jobid`.
///
/// With no node list, every node except the primary execution host is
/// released.
pub fn relnodes_put<E: RequestEncoder + ?Sized>(
    enc: &mut E, ctx: &ClientContext, protocol: Protocol, jobid: &str, node_list: Option<&str>,
    extend: Option<&str>
) -> Result<Option<String>> {
    send(enc, ctx, protocol, RequestType::RelnodesJob, extend, |enc| {
        enc.put_str(jobid)?;
        enc.put_str(node_list.unwrap_or(""))
    })
}


/// Ask the server for the status of vnode `id`, or of all vnodes if `id`
/// is empty.
///
/// If `ctx.verify` is set the attribute list is checked against the node
/// schema first, and nothing is written if that fails.
pub fn status_vnode_put<E: RequestEncoder + ?Sized>(
    enc: &mut E, ctx: &ClientContext, protocol: Protocol, id: &str, attrs: &[AttrOp], extend: Option<&str>
) -> Result<Option<String>> {
    if ctx.verify {
        verify_attributes(ObjectType::Node, attrs)?;
    }

    send(enc, ctx, protocol, RequestType::StatusNode, extend, |enc| {
        enc.put_str(id)?;
        enc.put_uint(attrs.len() as u64)?;

        for op in attrs {
            enc.put_attr(&op.to_record())?;
        }

        Ok(())
    })
}


/// One item written to a `RecordingEncoder`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Compose(Protocol, Option<String>),
    Header(RequestType, String),
    Str(String),
    UInt(u64),
    Attr(WireRecord),
    Extend(Option<String>),
    Flush,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Compose(p, Some(ref id)) => write!(f, "compose {} msgid={}", p, id),
            Token::Compose(p, None) => write!(f, "compose {}", p),
            Token::Header(r, ref user) => write!(f, "header {} user={}", r, user),
            Token::Str(ref s) => write!(f, "str {:?}", s),
            Token::UInt(n) => write!(f, "uint {}", n),
            Token::Attr(ref rec) => write!(f, "attr {}={:?} flags={:#x}",
                                           qualified_name(&rec.name, rec.resource.as_ref().map(|r| &**r)),
                                           rec.value, rec.flags.bits()),
            Token::Extend(Some(ref e)) => write!(f, "extend {:?}", e),
            Token::Extend(None) => f.write_str("extend none"),
            Token::Flush => f.write_str("flush"),
        }
    }
}


/// An encoder that records what it is given instead of sending it.
#[derive(Clone, Debug, Default)]
pub struct RecordingEncoder {
    tokens: Vec<Token>,
    messages: u32,
}

impl RecordingEncoder {
    pub fn new() -> RecordingEncoder {
        RecordingEncoder::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl RequestEncoder for RecordingEncoder {
    fn compose(&mut self, protocol: Protocol) -> ::std::result::Result<Option<String>, Error> {
        let msgid = match protocol {
            Protocol::Tcp => None,
            Protocol::Tpp => {
                self.messages += 1;
                Some(format!("msg-{}", self.messages))
            },
        };

        self.tokens.push(Token::Compose(protocol, msgid.clone()));
        Ok(msgid)
    }

    fn put_header(&mut self, request: RequestType, user: &str) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::Header(request, user.to_owned()));
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::Str(s.to_owned()));
        Ok(())
    }

    fn put_uint(&mut self, n: u64) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::UInt(n));
        Ok(())
    }

    fn put_attr(&mut self, record: &WireRecord) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::Attr(record.clone()));
        Ok(())
    }

    fn put_extend(&mut self, extend: Option<&str>) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::Extend(extend.map(|e| e.to_owned())));
        Ok(())
    }

    fn flush(&mut self) -> ::std::result::Result<(), Error> {
        self.tokens.push(Token::Flush);
        Ok(())
    }
}
