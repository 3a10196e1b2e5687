// vim: tw=80
//! Dispatch emits tracing events that a subscriber can capture

use std::{
    io,
    sync::{Arc, Mutex},
};

use dynmock::*;
use dynmock::matcher::*;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut *self.0.lock().unwrap(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that captures everything at `filter`
fn capture<F: FnOnce()>(filter: &str, f: F) -> String {
    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[test]
fn dispatch_is_traced() {
    let out = capture("dynmock=trace", || {
        let mock = Mock::default();
        mock.call("ping", args![]).unwrap();
        mock.call("ping", args![]).unwrap();
    });
    assert!(out.contains("dispatching call"), "{}", out);
    assert!(out.contains("method=\"ping\"") || out.contains("method=ping"),
            "{}", out);
    assert!(out.contains("count=1"), "{}", out);
}

#[test]
fn rejections_are_debugged() {
    let out = capture("dynmock=debug", || {
        let mock = Mock::with_interface(
            [("get", Returns::sequence([1]))],
            Interface::builder("Store")
                .method("get", Signature::new())
                .build());
        mock.call("put", args![]).unwrap_err();
        mock.call("get", args![]).unwrap();
        mock.call("get", args![]).unwrap_err();
    });
    assert!(out.contains("call rejected by interface"), "{}", out);
    assert!(out.contains("return values exhausted"), "{}", out);
    assert!(!out.contains("dispatching call"), "{}", out);
}

#[test]
fn matcher_case_tree() {
    let out = capture("dynmock=debug", || {
        let mut mock = Mock::default();
        mock.set_expectation("f", expect_param(0, lt(3)), 0, 0);
        mock.call("f", args![7]).unwrap_err();
    });
    assert!(out.contains("matcher rejected value"), "{}", out);
    assert!(out.contains("expectation failed"), "{}", out);
}

#[test]
fn silent_without_subscriber() {
    // No subscriber installed: dispatch must still work
    let mock = Mock::new([("f", 1)]);
    assert_eq!(mock.call("f", args![]).unwrap(), Value::from(1));
}
