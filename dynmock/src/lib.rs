// vim: tw=80
//! A dynamic mock object library for Rust.
//!
//! Dynmock's mocks don't need to know the type they stand in for.  A [`Mock`]
//! accepts a call to any method name, records it, checks it against the
//! expectations set for that method, and returns a scripted value.  Arguments
//! and return values are dynamically typed [`Value`]s.
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Return values`](#return-values)
//! * [`Checking calls after the fact`](#checking-calls-after-the-fact)
//! * [`Expectations`](#expectations)
//! * [`Matchers`](#matchers)
//! * [`Reference types`](#reference-types)
//! * [`Delegation`](#delegation)
//! * [`Crate features`](#crate-features)
//!
//! ## Getting Started
//! ```
//! use dynmock::*;
//!
//! let mock = Mock::new([("lookup", Returns::from("bob"))]);
//! assert_eq!(mock.call("lookup", args![42]).unwrap(), Value::from("bob"));
//! // Methods without return values return None
//! assert_eq!(mock.call("flush", args![]).unwrap(), Value::None);
//! mock.check_call(0, "lookup", args![42]);
//! ```
//!
//! ## Return values
//!
//! Each method has at most one [`Returns`] policy.  It can return a constant,
//! step through a finite sequence, or pull from an iterator.  Registering new
//! return values for a method replaces the old ones.
//!
//! ```
//! # use dynmock::*;
//! let mut mock = Mock::new([
//!     ("get_squares", Returns::sequence([1, 4, 9])),
//!     ("next_id", Returns::iter(1..)),
//! ]);
//! assert_eq!(mock.call("get_squares", args![]).unwrap(), Value::from(1));
//! assert_eq!(mock.call("next_id", args![]).unwrap(), Value::from(1));
//! assert_eq!(mock.call("next_id", args![]).unwrap(), Value::from(2));
//!
//! mock.add_return_values([("get_squares", Returns::from(0))]);
//! assert_eq!(mock.call("get_squares", args![]).unwrap(), Value::from(0));
//! ```
//!
//! A finite sequence or iterator that runs dry fails the call with
//! [`MockError::SequenceExhausted`].
//!
//! ## Checking calls after the fact
//!
//! Every call is appended to the mock's log, even calls that later fail an
//! expectation.  [`Mock::all_calls`] returns a copy of the whole log and
//! [`Mock::named_calls`] just the calls to one method.  [`Mock::check_call`]
//! and [`Call::check_args`] assert an exact match of name and arguments.
//!
//! ```
//! # use dynmock::*;
//! let cursor = Mock::default();
//! cursor.call("execute", args!["INSERT INTO t VALUES (?)", vec![1]]).unwrap();
//! cursor.call("execute", args!["DELETE FROM t"; timeout = 5]).unwrap();
//! cursor.check_call(0, "execute", args!["INSERT INTO t VALUES (?)", vec![1]]);
//! let calls = cursor.named_calls("execute");
//! assert_eq!(calls[1].to_string(), r#"execute("DELETE FROM t", timeout=5)"#);
//! ```
//!
//! ## Expectations
//!
//! Expectations check calls as they happen.  Each one is a [`CallPredicate`]
//! bound to a method name, active for a window of call counts.  A predicate
//! that returns false fails the call with [`MockError::ExpectationFailed`].
//!
//! ```
//! # use dynmock::*;
//! let mut mock = Mock::default();
//! mock.expect("foo")
//!     .withf(|_log, call, _count| {
//!         call.param(0).is_ok_and(|p| *p < Value::from(10))
//!     });
//! assert!(mock.call("foo", args![5]).is_ok());
//! let e = mock.call("foo", args![50]).unwrap_err();
//! assert_eq!(e.to_string(), "expectation failed for `foo`: foo(50)");
//! ```
//!
//! The predefined expectations are [`expect_params`], [`expect_after`],
//! [`expect_error`] and [`expect_param`].
//!
//! ## Matchers
//!
//! The [`matcher`] module contains composable predicates over one argument:
//! comparisons, boolean combinators, identity, type and structural checks,
//! and the stateful [`seq`](matcher::seq).  Apply them with
//! [`expect_param`].
//!
//! ## Reference types
//!
//! A mock built with an [`Interface`] rejects any call the real type couldn't
//! accept, before recording it.  [`#[interface]`](macro@interface) generates
//! the `Interface` from a trait definition.
//!
//! ```
//! # use dynmock::*;
//! #[interface]
//! trait UserStore {
//!     fn write_user_to_db(&self, user: u32) -> bool;
//! }
//!
//! let mock = Mock::builder()
//!     .returning("write_user_to_db", false)
//!     .reflect::<UserStoreInterface>()
//!     .build();
//! assert!(mock.call("write_user_to_db", args![1]).is_ok());
//! assert!(mock.call("write_user_to_db", args![(), 1]).is_err());
//! assert!(mock.call("unknown_func", args![]).is_err());
//! ```
//!
//! ## Delegation
//!
//! A mock can wrap a real [`Object`].  Methods with registered return values
//! are scripted; the rest are forwarded to the object's callable attributes.
//! Either way, the call is validated, recorded and checked first.
//!
//! ## Crate features
//!
//! * `regex` (default): enables [`matcher::matches`].
//!
//! Mock dispatch emits [`tracing`](https://docs.rs/tracing) events at the
//! `trace` and `debug` levels.

mod call;
mod error;
pub mod expectation;
mod interface;
pub mod matcher;
mod mock;
mod returns;
mod value;

pub use crate::call::{Call, CallLog};
pub use crate::error::{InterfaceError, MockError, Result};
pub use crate::expectation::{
    CallPredicate,
    Expectation,
    expect_after,
    expect_error,
    expect_param,
    expect_params,
};
pub use crate::interface::{
    Interface,
    InterfaceBuilder,
    Parameter,
    Reflect,
    Signature,
};
pub use crate::matcher::Matcher;
pub use crate::mock::{Method, Mock, MockBuilder};
pub use crate::returns::Returns;
pub use crate::value::{Args, Function, Object, Param, Value};
pub use dynmock_derive::interface;
