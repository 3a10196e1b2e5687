// vim: tw=80
//! The mock object itself, and its dispatch path.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{
    Args,
    Call,
    CallLog,
    CallPredicate,
    Expectation,
    Interface,
    Object,
    Reflect,
    Result,
    Returns,
    Value,
    expectation::Expectations,
};

/// What to do once a call has passed its expectations.
enum Outcome {
    Return(Value),
    /// Look up and invoke the delegate's method, after releasing the mock's
    /// state.
    Delegate(Rc<dyn Object>, Args),
}

#[derive(Default)]
struct State {
    returns: HashMap<String, Returns>,
    log: CallLog,
    expectations: HashMap<String, Expectations>,
    interface: Option<Interface>,
    delegate: Option<Rc<dyn Object>>,
}

impl State {
    fn dispatch(&mut self, name: &str, args: Args) -> Result<Outcome> {
        if let Some(iface) = &self.interface {
            if let Err(e) = iface.validate(name, &args) {
                debug!(method = name, %e, "call rejected by interface");
                return Err(e.into());
            }
        }

        let count = self.log.count(name);
        trace!(method = name, count, "dispatching call");
        let index = self.log.record(Call::new(name, args));
        let call = &self.log.all()[index];

        if let Some(ee) = self.expectations.get_mut(name) {
            ee.call(&self.log, call, count)?;
        }

        if let Some(returns) = self.returns.get_mut(name) {
            return returns.next(name).map(Outcome::Return);
        }
        Ok(match &self.delegate {
            Some(d) => Outcome::Delegate(d.clone(), call.args().clone()),
            None => Outcome::Return(Value::None)
        })
    }
}

/// A test double that accepts a call to any method name.
///
/// Every call goes through the same steps, in order:
/// 1. If the mock has a reference [`Interface`], the call is checked against
///    it.  A nonconforming call fails here and leaves no trace.
/// 2. The call is appended to the mock's [`CallLog`].
/// 3. The method's active expectations are evaluated.
/// 4. The method's return value is produced: from its [`Returns`] if one was
///    registered, else from the delegate's method of the same name if there
///    is one, else `Value::None`.
///
/// Mocks are single-threaded: they are neither `Send` nor `Sync`.
///
/// # Examples
/// ```
/// # use dynmock::*;
/// let mock = Mock::new([("get_squares", Returns::sequence([1, 4, 9]))]);
/// let get_squares = mock.method("get_squares");
/// assert_eq!(get_squares.call(args![]).unwrap(), Value::from(1));
/// assert_eq!(get_squares.call(args![]).unwrap(), Value::from(4));
/// assert_eq!(get_squares.call(args![]).unwrap(), Value::from(9));
/// assert!(get_squares.call(args![]).is_err());
/// assert_eq!(mock.all_calls().len(), 4);
/// ```
#[derive(Default)]
pub struct Mock {
    state: RefCell<State>,
}

impl Mock {
    /// Create a mock with an initial set of return values.
    pub fn new<I, K, R>(returns: I) -> Self
        where I: IntoIterator<Item = (K, R)>,
              K: Into<String>,
              R: Into<Returns>
    {
        let mut mock = Mock::default();
        mock.add_return_values(returns);
        mock
    }

    /// Create a mock whose calls are checked against `iface`.
    pub fn with_interface<I, K, R>(returns: I, iface: Interface) -> Self
        where I: IntoIterator<Item = (K, R)>,
              K: Into<String>,
              R: Into<Returns>
    {
        let mut mock = Mock::new(returns);
        mock.state.get_mut().interface = Some(iface);
        mock
    }

    pub fn builder() -> MockBuilder {
        MockBuilder::default()
    }

    /// Set the return values for a method, replacing any it already had.
    pub fn set_returns<K, R>(&mut self, name: K, returns: R)
        where K: Into<String>, R: Into<Returns>
    {
        self.state.get_mut().returns.insert(name.into(), returns.into());
    }

    /// Set the return values for several methods.  Each entry replaces any
    /// earlier return values for its method; other methods are untouched.
    pub fn add_return_values<I, K, R>(&mut self, returns: I)
        where I: IntoIterator<Item = (K, R)>,
              K: Into<String>,
              R: Into<Returns>
    {
        for (k, r) in returns {
            self.set_returns(k, r);
        }
    }

    /// Create a new expectation for a method.  Expectations are evaluated in
    /// the order they were created.
    pub fn expect<K: Into<String>>(&mut self, name: K) -> &mut Expectation {
        self.state.get_mut()
            .expectations
            .entry(name.into())
            .or_default()
            .expect()
    }

    /// Register `predicate` for `name`, active for calls whose count is at
    /// least `after` and, unless `until` is 0, less than `until`.
    pub fn set_expectation<K, P>(&mut self, name: K, predicate: P, after: usize,
                                 until: usize)
        where K: Into<String>, P: CallPredicate + 'static
    {
        self.expect(name).window(after, until).with(predicate);
    }

    /// A callable handle for one method of this mock.
    pub fn method<S: Into<String>>(&self, name: S) -> Method<'_> {
        Method{mock: self, name: name.into()}
    }

    /// Call a method by name.
    pub fn call(&self, name: &str, args: Args) -> Result<Value> {
        // The state must not be borrowed while any delegate code runs, in
        // case it calls back into this mock.
        let outcome = self.state.borrow_mut().dispatch(name, args)?;
        match outcome {
            Outcome::Return(v) => Ok(v),
            Outcome::Delegate(d, args) => {
                match d.attr(name).filter(Value::is_callable) {
                    Some(f) => f.call(&args),
                    None => Ok(Value::None)
                }
            }
        }
    }

    /// Every call made so far, in order.
    ///
    /// This is a snapshot: calls made afterwards do not appear in it.
    pub fn all_calls(&self) -> Vec<Call> {
        self.state.borrow().log.all().to_vec()
    }

    /// The calls made so far to `name`, in order.
    pub fn named_calls(&self, name: &str) -> Vec<Call> {
        self.state.borrow().log.named(name).cloned().collect()
    }

    /// A snapshot of the whole call log.
    pub fn call_log(&self) -> CallLog {
        self.state.borrow().log.clone()
    }

    pub fn interface(&self) -> Option<Interface> {
        self.state.borrow().interface.clone()
    }

    /// Assert that the `index`-th call overall was to `name`, with exactly
    /// `args`.
    #[track_caller]
    pub fn check_call(&self, index: usize, name: &str, args: Args) {
        let state = self.state.borrow();
        let Some(call) = state.log.all().get(index) else {
            panic!("No call at index {}; only {} calls were made",
                   index, state.log.len());
        };
        assert_eq!(call.name(), name, "Wrong method for call {}: {}", index,
                   call);
        call.check_args(args);
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Mock")
            .field("interface", &state.interface.as_ref().map(Interface::name))
            .field("returns", &state.returns)
            .field("calls", &state.log)
            .finish_non_exhaustive()
    }
}

/// A method of a [`Mock`], bound by name.  It can be stored, cloned and
/// passed around, and each [`call`](Method::call) goes through the mock's
/// full dispatch path.
#[derive(Clone, Debug)]
pub struct Method<'a> {
    mock: &'a Mock,
    name: String,
}

impl<'a> Method<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: Args) -> Result<Value> {
        self.mock.call(&self.name, args)
    }
}

/// Builder for [`Mock`]s that need more than return values.
#[derive(Default)]
pub struct MockBuilder {
    returns: HashMap<String, Returns>,
    interface: Option<Interface>,
    delegate: Option<Rc<dyn Object>>,
}

impl MockBuilder {
    pub fn returning<K, R>(mut self, name: K, returns: R) -> Self
        where K: Into<String>, R: Into<Returns>
    {
        self.returns.insert(name.into(), returns.into());
        self
    }

    /// Check every call against `iface`.
    pub fn interface(mut self, iface: Interface) -> Self {
        self.interface = Some(iface);
        self
    }

    /// Check every call against the interface described by `R`.
    pub fn reflect<R: Reflect>(self) -> Self {
        self.interface(R::interface())
    }

    /// Fall back to `delegate`'s callable attributes for methods that have
    /// no registered return values.
    pub fn delegate<O: Object>(self, delegate: O) -> Self {
        self.delegate_rc(Rc::new(delegate))
    }

    pub fn delegate_rc(mut self, delegate: Rc<dyn Object>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn build(self) -> Mock {
        let state = State {
            returns: self.returns,
            interface: self.interface,
            delegate: self.delegate,
            ..State::default()
        };
        Mock{state: RefCell::new(state)}
    }
}
