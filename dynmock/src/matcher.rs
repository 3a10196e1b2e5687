// vim: tw=80
//! Composable predicates over a single argument value.
//!
//! Matchers are usually applied to one argument of a call with
//! [`expect_param`](crate::expect_param):
//!
//! ```
//! # use dynmock::*;
//! # use dynmock::matcher::*;
//! let mut mock = Mock::new([("foo", Returns::from(()))]);
//! mock.set_expectation("foo", expect_param(0, and![ge(0), lt(10)]), 0, 0);
//! assert!(mock.call("foo", args![5]).is_ok());
//! assert!(mock.call("foo", args![50]).is_err());
//! ```
//!
//! The comparison matchers are thin wrappers around the
//! [`predicates`](https://docs.rs/predicates) crate's predicates.  When one
//! rejects a value, its case tree is logged at `debug` level.

use std::{fmt, marker::PhantomData};

use cfg_if::cfg_if;
use predicates::{Predicate, ord};
use predicates_tree::CaseTreeExt;
use tracing::debug;

use crate::{Interface, MockError, Object, Result, Value};

/// A predicate over one argument value.
///
/// `matches` takes `&mut self` because some matchers, like [`seq`], keep state
/// between invocations.
pub trait Matcher: fmt::Display {
    fn matches(&mut self, value: &Value) -> Result<bool>;
}

impl Matcher for Box<dyn Matcher> {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        (**self).matches(value)
    }
}

/// Adapts any [`Predicate`] over [`Value`]s into a [`Matcher`].
pub struct Pred<P>(P);

impl<P: Predicate<Value>> Pred<P> {
    pub fn new(p: P) -> Self {
        Pred(p)
    }
}

impl<P: Predicate<Value>> Matcher for Pred<P> {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        match self.0.find_case(false, value) {
            Some(case) => {
                debug!(%value, "matcher rejected value:\n{}", case.tree());
                Ok(false)
            },
            None => Ok(true)
        }
    }
}

impl<P: Predicate<Value>> fmt::Display for Pred<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// `param == v`
pub fn eq<V: Into<Value>>(v: V) -> Pred<ord::EqPredicate<Value>> {
    Pred(ord::eq(v.into()))
}

/// `param != v`
pub fn ne<V: Into<Value>>(v: V) -> Pred<ord::EqPredicate<Value>> {
    Pred(ord::ne(v.into()))
}

/// `param < v`
pub fn lt<V: Into<Value>>(v: V) -> Pred<ord::OrdPredicate<Value>> {
    Pred(ord::lt(v.into()))
}

/// `param <= v`
pub fn le<V: Into<Value>>(v: V) -> Pred<ord::OrdPredicate<Value>> {
    Pred(ord::le(v.into()))
}

/// `param > v`
pub fn gt<V: Into<Value>>(v: V) -> Pred<ord::OrdPredicate<Value>> {
    Pred(ord::gt(v.into()))
}

/// `param >= v`
pub fn ge<V: Into<Value>>(v: V) -> Pred<ord::OrdPredicate<Value>> {
    Pred(ord::ge(v.into()))
}

fn fmt_list(f: &mut fmt::Formatter, name: &str, ms: &[Box<dyn Matcher>])
    -> fmt::Result
{
    write!(f, "{}(", name)?;
    for (i, m) in ms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", m)?;
    }
    f.write_str(")")
}

pub struct And(Vec<Box<dyn Matcher>>);

impl Matcher for And {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        for m in self.0.iter_mut() {
            if !m.matches(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for And {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_list(f, "and", &self.0)
    }
}

/// True if every sub-matcher is true.  Stops at the first false one, so later
/// sub-matchers are not invoked at all.  See [`seq`] for why that matters.
pub fn and<I>(matchers: I) -> And
    where I: IntoIterator<Item = Box<dyn Matcher>>
{
    And(matchers.into_iter().collect())
}

pub struct Or(Vec<Box<dyn Matcher>>);

impl Matcher for Or {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        for m in self.0.iter_mut() {
            if m.matches(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for Or {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_list(f, "or", &self.0)
    }
}

/// True if any sub-matcher is true.  Stops at the first true one, so later
/// sub-matchers are not invoked at all.  See [`seq`] for why that matters.
pub fn or<I>(matchers: I) -> Or
    where I: IntoIterator<Item = Box<dyn Matcher>>
{
    Or(matchers.into_iter().collect())
}

pub struct Not<M>(M);

impl<M: Matcher> Matcher for Not<M> {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        self.0.matches(value).map(|b| !b)
    }
}

impl<M: Matcher> fmt::Display for Not<M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "not({})", self.0)
    }
}

pub fn not<M: Matcher>(m: M) -> Not<M> {
    Not(m)
}

pub struct Seq {
    matchers: Vec<Box<dyn Matcher>>,
    next: usize,
}

impl Matcher for Seq {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        let n = self.matchers.len();
        let m = self.matchers.get_mut(self.next)
            .ok_or(MockError::MatcherExhausted { matchers: n })?;
        self.next += 1;
        m.matches(value)
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_list(f, "seq", &self.matchers)
    }
}

/// A stateful matcher: the k-th time it's invoked, it applies the k-th
/// sub-matcher.  Invoking it more times than it has sub-matchers fails with
/// [`MockError::MatcherExhausted`].
///
/// Each `Seq` owns its own cursor, so build a fresh one for every expectation.
///
/// # Hazard
///
/// [`and`] and [`or`] short-circuit.  A `seq` nested under one of them is
/// skipped whenever an earlier sibling decides the result, and its cursor
/// doesn't advance for that call.  It will then be out of step with the call
/// count.
pub fn seq<I>(matchers: I) -> Seq
    where I: IntoIterator<Item = Box<dyn Matcher>>
{
    Seq{matchers: matchers.into_iter().collect(), next: 0}
}

cfg_if! {
    if #[cfg(feature = "regex")] {
        use predicates::str::RegexPredicate;
        use std::ops::BitOr;

        /// Regular expression flags for [`matches`].
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct Flags(u8);

        impl Flags {
            pub const NONE: Flags = Flags(0);
            /// Letters match both upper and lower case
            pub const IGNORE_CASE: Flags = Flags(1);
            /// `^` and `$` match at line boundaries
            pub const MULTI_LINE: Flags = Flags(2);
            /// `.` matches newlines too
            pub const DOT_ALL: Flags = Flags(4);
            /// Whitespace and `#` comments in the pattern are ignored
            pub const VERBOSE: Flags = Flags(8);

            fn prefix(self) -> String {
                let letters = [
                    (Flags::IGNORE_CASE, 'i'),
                    (Flags::MULTI_LINE, 'm'),
                    (Flags::DOT_ALL, 's'),
                    (Flags::VERBOSE, 'x'),
                ].iter()
                    .filter(|(flag, _)| self.0 & flag.0 != 0)
                    .map(|(_, c)| *c)
                    .collect::<String>();
                if letters.is_empty() {
                    letters
                } else {
                    format!("(?{})", letters)
                }
            }
        }

        impl BitOr for Flags {
            type Output = Flags;

            fn bitor(self, rhs: Flags) -> Flags {
                Flags(self.0 | rhs.0)
            }
        }

        pub struct Matches {
            pattern: String,
            re: RegexPredicate,
        }

        impl Matcher for Matches {
            fn matches(&mut self, value: &Value) -> Result<bool> {
                let s = value.as_str()
                    .ok_or_else(|| MockError::NotText{value: value.to_string()})?;
                Ok(self.re.eval(s))
            }
        }

        impl fmt::Display for Matches {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "matches({:?})", self.pattern)
            }
        }

        /// The parameter is a string, and `pattern` matches at its start.
        ///
        /// Applying it to anything other than a string is an error, not a
        /// mismatch.
        pub fn matches(pattern: &str, flags: Flags) -> Result<Matches> {
            let anchored = format!(r"{}\A(?:{})", flags.prefix(), pattern);
            let re = predicates::str::is_match(anchored)
                .map_err(|e| MockError::InvalidPattern(e.to_string()))?;
            Ok(Matches{pattern: pattern.to_owned(), re})
        }
    }
}

pub struct Is(Value);

impl Matcher for Is {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(value.is(&self.0))
    }
}

impl fmt::Display for Is {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "is({})", self.0)
    }
}

/// Identity comparison.  See [`Value::is`].
pub fn is<V: Into<Value>>(v: V) -> Is {
    Is(v.into())
}

pub struct IsInstance(Interface);

impl Matcher for IsInstance {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Object(o) => o.interface()
                .is_some_and(|i| i.is_subtype_of(&self.0)),
            _ => false
        })
    }
}

impl fmt::Display for IsInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "is_instance({})", self.0.name())
    }
}

/// The parameter is an object whose interface is `iface` or extends it.
pub fn is_instance(iface: Interface) -> IsInstance {
    IsInstance(iface)
}

pub struct IsSubclass(Interface);

impl Matcher for IsSubclass {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Interface(i) => i.is_subtype_of(&self.0),
            _ => false
        })
    }
}

impl fmt::Display for IsSubclass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "is_subclass({})", self.0.name())
    }
}

/// The parameter is an interface, and it is `iface` or extends it.
pub fn is_subclass(iface: Interface) -> IsSubclass {
    IsSubclass(iface)
}

pub struct IsA<T>(PhantomData<fn() -> T>);

impl<T: Object> Matcher for IsA<T> {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Object(o) => o.is::<T>(),
            _ => false
        })
    }
}

impl<T: Object> fmt::Display for IsA<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "is_a::<{}>()", std::any::type_name::<T>())
    }
}

/// The parameter is an object of concrete Rust type `T`.
pub fn is_a<T: Object>() -> IsA<T> {
    IsA(PhantomData)
}

pub struct Contains(Value);

impl Matcher for Contains {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(value.contains(&self.0).unwrap_or(false))
    }
}

impl fmt::Display for Contains {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "contains({})", self.0)
    }
}

/// The parameter is a container holding `v`.  See [`Value::contains`].
pub fn contains<V: Into<Value>>(v: V) -> Contains {
    Contains(v.into())
}

pub struct In(Value);

impl Matcher for In {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(self.0.contains(value).unwrap_or(false))
    }
}

impl fmt::Display for In {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "is_in({})", self.0)
    }
}

/// The parameter is a member of `container`.
pub fn is_in<V: Into<Value>>(container: V) -> In {
    In(container.into())
}

pub struct HasAttr(String);

impl Matcher for HasAttr {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(value.attr(&self.0).is_some())
    }
}

impl fmt::Display for HasAttr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "has_attr({:?})", self.0)
    }
}

pub fn has_attr<S: Into<String>>(name: S) -> HasAttr {
    HasAttr(name.into())
}

pub struct HasMethod(String);

impl Matcher for HasMethod {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(value.attr(&self.0).is_some_and(|a| a.is_callable()))
    }
}

impl fmt::Display for HasMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "has_method({:?})", self.0)
    }
}

/// The parameter has an attribute called `name`, and it is callable.
pub fn has_method<S: Into<String>>(name: S) -> HasMethod {
    HasMethod(name.into())
}

pub struct Callable;

impl Matcher for Callable {
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok(value.is_callable())
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("callable()")
    }
}

pub fn callable() -> Callable {
    Callable
}

pub struct FnMatcher<F>(F);

impl<F> Matcher for FnMatcher<F>
    where F: FnMut(&Value) -> bool
{
    fn matches(&mut self, value: &Value) -> Result<bool> {
        Ok((self.0)(value))
    }
}

impl<F> fmt::Display for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("function()")
    }
}

/// Wrap an arbitrary closure.
pub fn function<F>(f: F) -> FnMatcher<F>
    where F: FnMut(&Value) -> bool
{
    FnMatcher(f)
}

/// Build an [`and`] matcher from a list of matchers of any types.
#[macro_export]
macro_rules! and {
    ($($m:expr),* $(,)?) => {
        $crate::matcher::and(vec![
            $( Box::new($m) as Box<dyn $crate::Matcher>, )*
        ])
    }
}

/// Build an [`or`] matcher from a list of matchers of any types.
#[macro_export]
macro_rules! or {
    ($($m:expr),* $(,)?) => {
        $crate::matcher::or(vec![
            $( Box::new($m) as Box<dyn $crate::Matcher>, )*
        ])
    }
}

/// Build a [`seq`] matcher from a list of matchers of any types.
#[macro_export]
macro_rules! seq {
    ($($m:expr),* $(,)?) => {
        $crate::matcher::seq(vec![
            $( Box::new($m) as Box<dyn $crate::Matcher>, )*
        ])
    }
}
