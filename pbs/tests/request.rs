// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

//! Building requests against in-memory encoders.

#[macro_use] extern crate failure;
extern crate pbs;

use failure::Error;
use pbs::{
    message_job_put, py_spawn_put, relnodes_put, status_vnode_put, AttrOp, ClientContext, MessageFile, PbsError,
    Protocol, RecordingEncoder, RequestEncoder, RequestType, Token, WireRecord, PBSE_NOATTR, PBSE_PROTOCOL,
};


/// Records like `RecordingEncoder`, but fails once a fixed number of calls
/// have succeeded.
struct FailingEncoder {
    inner: RecordingEncoder,
    calls_left: usize,
}

impl FailingEncoder {
    fn new(calls_left: usize) -> FailingEncoder {
        FailingEncoder { inner: RecordingEncoder::new(), calls_left }
    }

    fn step(&mut self) -> Result<(), Error> {
        if self.calls_left == 0 {
            return Err(format_err!("connection reset by peer"));
        }

        self.calls_left -= 1;
        Ok(())
    }
}

impl RequestEncoder for FailingEncoder {
    fn compose(&mut self, protocol: Protocol) -> Result<Option<String>, Error> {
        self.step()?;
        self.inner.compose(protocol)
    }

    fn put_header(&mut self, request: RequestType, user: &str) -> Result<(), Error> {
        self.step()?;
        self.inner.put_header(request, user)
    }

    fn put_str(&mut self, s: &str) -> Result<(), Error> {
        self.step()?;
        self.inner.put_str(s)
    }

    fn put_uint(&mut self, n: u64) -> Result<(), Error> {
        self.step()?;
        self.inner.put_uint(n)
    }

    fn put_attr(&mut self, record: &WireRecord) -> Result<(), Error> {
        self.step()?;
        self.inner.put_attr(record)
    }

    fn put_extend(&mut self, extend: Option<&str>) -> Result<(), Error> {
        self.step()?;
        self.inner.put_extend(extend)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.step()?;
        self.inner.flush()
    }
}


fn ctx() -> ClientContext {
    ClientContext::new("pbsuser")
}

fn strs(v: &[&str]) -> Vec<Token> {
    v.iter().map(|s| Token::Str(s.to_string())).collect()
}


#[test]
fn py_spawn_layout() {
    let mut enc = RecordingEncoder::new();
    py_spawn_put(&mut enc, &ctx(), Protocol::Tcp, "7.host", &["python3", "-c", "pass"], &["A=1"]).unwrap();

    let mut expected = vec![
        Token::Compose(Protocol::Tcp, None),
        Token::Header(RequestType::PySpawn, "pbsuser".to_owned()),
        Token::Str("7.host".to_owned()),
        Token::UInt(3),
    ];
    expected.extend(strs(&["python3", "-c", "pass"]));
    expected.push(Token::UInt(1));
    expected.extend(strs(&["A=1"]));
    expected.push(Token::Extend(None));
    expected.push(Token::Flush);

    assert_eq!(enc.into_tokens(), expected);
}

#[test]
fn every_stage_failure_is_a_protocol_error() {
    // compose, header, jobid, file code, message, extension, flush
    for n in 0..7 {
        let mut enc = FailingEncoder::new(n);
        let e = message_job_put(&mut enc, &ctx(), Protocol::Tpp, "1", MessageFile::Both, "hi", None)
            .unwrap_err();
        assert_eq!(e.code(), PBSE_PROTOCOL, "failure after {} calls", n);
        assert_eq!(enc.inner.tokens().len(), n);
    }

    let mut enc = FailingEncoder::new(7);
    assert!(message_job_put(&mut enc, &ctx(), Protocol::Tpp, "1", MessageFile::Both, "hi", None).is_ok());
}

#[test]
fn protocol_error_names_the_stage() {
    let mut enc = FailingEncoder::new(4);
    match relnodes_put(&mut enc, &ctx(), Protocol::Tcp, "1", None, None) {
        Err(PbsError::Protocol(ref msg)) => {
            assert!(msg.contains("RelnodesJob extension"), "{}", msg);
            assert!(msg.contains("connection reset"), "{}", msg);
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn status_verifies_before_writing() {
    let attrs = vec![
        AttrOp::with_resource("resources_available", "ncpus", ""),
        AttrOp::new("no_such_attribute", ""),
    ];

    let mut enc = RecordingEncoder::new();
    let e = status_vnode_put(&mut enc, &ctx(), Protocol::Tcp, "node01", &attrs, None).unwrap_err();
    assert_eq!(e.code(), PBSE_NOATTR);
    assert!(enc.tokens().is_empty());

    let mut unchecked = ctx();
    unchecked.verify = false;
    status_vnode_put(&mut enc, &unchecked, Protocol::Tcp, "node01", &attrs, None).unwrap();
    assert!(enc.tokens().contains(&Token::UInt(2)));
    assert!(enc.tokens().contains(&Token::Attr(attrs[1].to_record())));
}

#[test]
fn status_with_valid_attributes() {
    let attrs = vec![AttrOp::new("Port", "15002"), AttrOp::new("resv_enable", "true")];
    let mut enc = RecordingEncoder::new();
    let id = status_vnode_put(&mut enc, &ctx(), Protocol::Tpp, "", &attrs, Some("x")).unwrap();
    assert!(id.is_some());
    assert_eq!(enc.tokens().last(), Some(&Token::Flush));
}
