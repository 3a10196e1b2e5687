// vim: tw=80
//! Recorded calls

use std::fmt;

use crate::{Args, MockError, Param, Result, Value};

/// An immutable record of one invocation of a mock.
///
/// Its `Display` form is `name(pos1, pos2, kw1=v1, kw2=v2)`, with keyword
/// arguments in alphabetical order.  That form is stable, and is what failure
/// messages report.
#[derive(Clone, PartialEq)]
pub struct Call {
    name: String,
    args: Args,
}

impl Call {
    pub fn new<S: Into<String>>(name: S, args: Args) -> Self {
        Call{name: name.into(), args}
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Fetch one argument, by position (integer) or keyword (string).
    pub fn param<P: Into<Param>>(&self, param: P) -> Result<&Value> {
        let param = param.into();
        self.args.get(&param)
            .ok_or_else(|| MockError::MissingParam {
                call: self.to_string(),
                param: param.to_string()
            })
    }

    /// Assert that this call's arguments are exactly `args`: the same
    /// positional values in the same order, and the same keyword names with
    /// the same values.
    #[track_caller]
    pub fn check_args(&self, args: Args) {
        assert_eq!(self.args, args, "Argument mismatch for {}", self);
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args)
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The append-only, ordered log of every call made on one mock.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Vec<Call>);

impl CallLog {
    /// Every call, in invocation order.
    pub fn all(&self) -> &[Call] {
        &self.0
    }

    /// The calls to one method, in invocation order.
    pub fn named<'a>(&'a self, name: &'a str)
        -> impl Iterator<Item = &'a Call> + 'a
    {
        self.0.iter().filter(move |c| c.name == name)
    }

    /// How many calls have been made to `name`?
    pub fn count(&self, name: &str) -> usize {
        self.named(name).count()
    }

    pub fn last(&self) -> Option<&Call> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a call, returning its index in the log.
    pub(crate) fn record(&mut self, call: Call) -> usize {
        self.0.push(call);
        self.0.len() - 1
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use crate::args;

    #[test]
    fn display() {
        let c = Call::new("execute", args!["SELECT 1", 2; timeout = 5, db = "x"]);
        assert_eq!(c.to_string(), r#"execute("SELECT 1", 2, db="x", timeout=5)"#);
        assert_eq!(Call::new("close", args![]).to_string(), "close()");
    }

    #[test]
    fn param() {
        let c = Call::new("foo", args![1, 2; key = "v"]);
        assert_eq!(c.param(1).unwrap(), &Value::from(2));
        assert_eq!(c.param("key").unwrap(), &Value::from("v"));
        let e = c.param(2).unwrap_err();
        assert_eq!(e.to_string(), r#"foo(1, 2, key="v") has no parameter 2"#);
        assert!(matches!(c.param("nokey"), Err(MockError::MissingParam{..})));
    }

    #[test]
    fn check_args_ok() {
        let c = Call::new("foo", args![1; key = "v"]);
        c.check_args(args![1; key = "v"]);
    }

    #[test]
    #[should_panic(expected = "Argument mismatch for foo(1)")]
    fn check_args_extra_keyword() {
        let c = Call::new("foo", args![1]);
        c.check_args(args![1; key = "v"]);
    }

    #[test]
    #[should_panic(expected = "Argument mismatch")]
    fn check_args_wrong_value() {
        let c = Call::new("foo", args![1, 2]);
        c.check_args(args![1, 3]);
    }

    #[test]
    fn named_view_preserves_order() {
        let mut log = CallLog::default();
        log.record(Call::new("a", args![1]));
        log.record(Call::new("b", args![]));
        log.record(Call::new("a", args![2]));
        let a = log.named("a").map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(a, vec!["a(1)", "a(2)"]);
        assert_eq!(log.count("b"), 1);
        assert_eq!(log.count("c"), 0);
        assert_eq!(log.len(), 3);
    }
}
