// vim: tw=80
//! Expectations: predicates checked against each call as it happens.
//!
//! Every expectation belongs to one method name and has an active window of
//! call counts.  `count` is the number of earlier calls to the same method, so
//! the first call has count 0.  An expectation is evaluated only when
//! `after <= count`, and `count < until` unless `until` is zero.

use std::{error::Error, fmt, rc::Rc};

use tracing::debug;

use crate::{Args, Call, CallLog, Matcher, MockError, Param, Result};

/// A check run against a call before it returns.
///
/// `log` already contains `call`, as its last entry.  Returning `Ok(false)`
/// fails the call with [`MockError::ExpectationFailed`]; returning `Err` fails
/// it with that error instead.
pub trait CallPredicate {
    fn eval(&mut self, log: &CallLog, call: &Call, count: usize)
        -> Result<bool>;
}

impl CallPredicate for Box<dyn CallPredicate> {
    fn eval(&mut self, log: &CallLog, call: &Call, count: usize)
        -> Result<bool>
    {
        (**self).eval(log, call, count)
    }
}

pub struct FnPredicate<F>(F);

impl<F> CallPredicate for FnPredicate<F>
    where F: FnMut(&CallLog, &Call, usize) -> bool
{
    fn eval(&mut self, log: &CallLog, call: &Call, count: usize)
        -> Result<bool>
    {
        Ok((self.0)(log, call, count))
    }
}

/// Wrap a closure as a [`CallPredicate`].
pub fn function<F>(f: F) -> FnPredicate<F>
    where F: FnMut(&CallLog, &Call, usize) -> bool
{
    FnPredicate(f)
}

pub struct TryFnPredicate<F>(F);

impl<F> CallPredicate for TryFnPredicate<F>
    where F: FnMut(&CallLog, &Call, usize) -> Result<bool>
{
    fn eval(&mut self, log: &CallLog, call: &Call, count: usize)
        -> Result<bool>
    {
        (self.0)(log, call, count)
    }
}

/// Wrap a fallible closure as a [`CallPredicate`].  Handy with
/// [`Call::param`], whose error propagates with `?`.
pub fn try_function<F>(f: F) -> TryFnPredicate<F>
    where F: FnMut(&CallLog, &Call, usize) -> Result<bool>
{
    TryFnPredicate(f)
}

pub struct Params(Args);

impl CallPredicate for Params {
    fn eval(&mut self, _: &CallLog, call: &Call, _: usize) -> Result<bool> {
        Ok(*call.args() == self.0)
    }
}

/// Require the call's arguments to be exactly `args`.
pub fn expect_params(args: Args) -> Params {
    Params(args)
}

pub struct After(Vec<String>);

impl CallPredicate for After {
    fn eval(&mut self, log: &CallLog, _: &Call, _: usize) -> Result<bool> {
        // The log's last entry is the call under test
        let earlier = &log.all()[..log.len().saturating_sub(1)];
        Ok(self.0.iter()
           .all(|name| earlier.iter().any(|c| c.name() == name.as_str())))
    }
}

/// Require every one of `methods` to have been called before this call.
pub fn expect_after<I, S>(methods: I) -> After
    where I: IntoIterator<Item = S>, S: Into<String>
{
    After(methods.into_iter().map(Into::into).collect())
}

pub struct InjectError<E> {
    error: E,
    successful: usize,
}

impl<E: Error + Clone + 'static> CallPredicate for InjectError<E> {
    fn eval(&mut self, _: &CallLog, call: &Call, count: usize)
        -> Result<bool>
    {
        if count < self.successful {
            Ok(true)
        } else {
            debug!(%call, "injecting error");
            Err(MockError::Injected(Rc::new(self.error.clone())))
        }
    }
}

/// Let the first `successful` calls proceed normally, then fail every later
/// call with [`MockError::Injected`] carrying a clone of `error`.
pub fn expect_error<E>(error: E, successful: usize) -> InjectError<E>
    where E: Error + Clone + 'static
{
    InjectError{error, successful}
}

pub struct ParamMatch<M> {
    param: Param,
    matcher: M,
}

impl<M: Matcher> CallPredicate for ParamMatch<M> {
    fn eval(&mut self, _: &CallLog, call: &Call, _: usize) -> Result<bool> {
        let value = call.param(self.param.clone())?;
        self.matcher.matches(value)
    }
}

/// Apply `matcher` to one argument of the call.  A call that lacks the
/// argument fails with [`MockError::MissingParam`].
pub fn expect_param<P, M>(param: P, matcher: M) -> ParamMatch<M>
    where P: Into<Param>, M: Matcher
{
    ParamMatch{param: param.into(), matcher}
}

/// One registered expectation: a predicate plus its active window.
pub struct Expectation {
    predicate: Box<dyn CallPredicate>,
    after: usize,
    until: usize,
}

impl Expectation {
    /// Create a new, always-satisfied expectation active for every call.
    pub fn new() -> Self {
        Expectation {
            predicate: Box::new(function(|_, _, _| true)),
            after: 0,
            until: 0,
        }
    }

    /// Only evaluate this expectation for calls with
    /// `after <= count < until`.  An `until` of 0 means no upper bound.
    pub fn window(&mut self, after: usize, until: usize) -> &mut Self {
        assert!(until == 0 || after <= until,
            "An expectation's window may not end before it starts");
        self.after = after;
        self.until = until;
        self
    }

    /// Set the predicate.  Only one predicate can be set per `Expectation` at
    /// a time.
    pub fn with<P>(&mut self, p: P) -> &mut Self
        where P: CallPredicate + 'static
    {
        self.predicate = Box::new(p);
        self
    }

    /// Set a closure as the predicate.
    ///
    /// This is equivalent to calling [`with`](#method.with) with
    /// [`function`].
    pub fn withf<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&CallLog, &Call, usize) -> bool + 'static
    {
        self.with(function(f))
    }

    fn is_active(&self, count: usize) -> bool {
        self.after <= count && (self.until == 0 || count < self.until)
    }
}

impl Default for Expectation {
    fn default() -> Self {
        Expectation::new()
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("after", &self.after)
            .field("until", &self.until)
            .finish_non_exhaustive()
    }
}

/// A collection of [`Expectation`] objects for one method, in registration
/// order.
#[derive(Debug, Default)]
pub(crate) struct Expectations(Vec<Expectation>);

impl Expectations {
    /// Create a new expectation for this method.
    pub fn expect(&mut self) -> &mut Expectation {
        self.0.push(Expectation::new());
        let l = self.0.len();
        &mut self.0[l - 1]
    }

    /// Evaluate every active expectation in registration order.  Stops at
    /// the first failure.
    pub fn call(&mut self, log: &CallLog, call: &Call, count: usize)
        -> Result<()>
    {
        for e in self.0.iter_mut().filter(|e| e.is_active(count)) {
            if !e.predicate.eval(log, call, count)? {
                debug!(%call, count, "expectation failed");
                return Err(MockError::ExpectationFailed {
                    method: call.name().to_owned(),
                    call: call.to_string()
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use crate::{args, matcher::*};

    fn log_of(calls: &[Call]) -> CallLog {
        let mut log = CallLog::default();
        for c in calls {
            log.record(c.clone());
        }
        log
    }

    #[test]
    fn window() {
        let mut e = Expectation::new();
        e.window(2, 5);
        let active = (0..8).filter(|c| e.is_active(*c)).collect::<Vec<_>>();
        assert_eq!(active, vec![2, 3, 4]);
        e.window(3, 0);
        assert!(!e.is_active(2));
        assert!(e.is_active(1000));
    }

    #[test]
    #[should_panic(expected = "An expectation's window may not end before it starts")]
    fn backwards_window() {
        Expectation::new().window(5, 2);
    }

    #[test]
    fn params() {
        let c = Call::new("f", args![1; k = 2]);
        let log = log_of(&[c.clone()]);
        assert!(expect_params(args![1; k = 2]).eval(&log, &c, 0).unwrap());
        assert!(!expect_params(args![1]).eval(&log, &c, 0).unwrap());
        assert!(!expect_params(args![1, 2]).eval(&log, &c, 0).unwrap());
        assert!(!expect_params(args![1; k = 3]).eval(&log, &c, 0).unwrap());
    }

    #[test]
    fn after() {
        let open = Call::new("open", args![]);
        let read = Call::new("read", args![]);
        let log = log_of(&[open.clone(), read.clone()]);
        assert!(expect_after(["open"]).eval(&log, &read, 0).unwrap());
        assert!(!expect_after(["open", "seek"]).eval(&log, &read, 0).unwrap());
        // The call under test doesn't count as earlier than itself
        assert!(!expect_after(["read"]).eval(&log, &read, 0).unwrap());
    }

    #[derive(Clone, Debug, PartialEq, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn inject_error() {
        let c = Call::new("write", args![]);
        let log = log_of(&[c.clone()]);
        let mut p = expect_error(DiskFull, 2);
        assert!(p.eval(&log, &c, 0).unwrap());
        assert!(p.eval(&log, &c, 1).unwrap());
        for count in 2..4 {
            let e = p.eval(&log, &c, count).unwrap_err();
            assert_eq!(e.injected::<DiskFull>(), Some(&DiskFull));
            assert_eq!(e.to_string(), "disk full");
        }
    }

    #[test]
    fn param_match() {
        let c = Call::new("f", args![5; name = "bob"]);
        let log = log_of(&[c.clone()]);
        assert!(expect_param(0, lt(10)).eval(&log, &c, 0).unwrap());
        assert!(!expect_param(0, gt(10)).eval(&log, &c, 0).unwrap());
        assert!(expect_param("name", eq("bob")).eval(&log, &c, 0).unwrap());
        assert!(matches!(expect_param(1, eq(0)).eval(&log, &c, 0),
            Err(MockError::MissingParam{..})));
    }

    #[test]
    fn stops_at_first_failure() {
        let c = Call::new("f", args![]);
        let log = log_of(&[c.clone()]);
        let mut ee = Expectations::default();
        ee.expect().withf(|_, _, _| false);
        ee.expect().withf(|_, _, _| panic!("Should not be evaluated"));
        match ee.call(&log, &c, 0) {
            Err(MockError::ExpectationFailed{method, call}) => {
                assert_eq!(method, "f");
                assert_eq!(call, "f()");
            },
            other => panic!("Unexpected {:?}", other)
        }
    }

    #[test]
    fn inactive_not_evaluated() {
        let c = Call::new("f", args![]);
        let log = log_of(&[c.clone()]);
        let mut ee = Expectations::default();
        ee.expect()
            .window(1, 2)
            .withf(|_, _, _| panic!("Should not be evaluated"));
        ee.call(&log, &c, 0).unwrap();
        ee.call(&log, &c, 2).unwrap();
    }
}
