// vim: tw=80
//! Failures raised by mocked calls

use std::{error::Error, rc::Rc};

use thiserror::Error;

/// A call didn't conform to the mock's reference [`Interface`](crate::Interface).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("{interface}.{method}: method not found")]
    MethodNotFound { interface: String, method: String },

    #[error("{interface}.{method}: wrong arguments: {reason}")]
    WrongArguments {
        interface: String,
        method: String,
        reason: String,
    },
}

/// Everything that can go wrong while dispatching a mocked call.
///
/// Assertion failures from [`Mock::check_call`](crate::Mock::check_call) and
/// [`Call::check_args`](crate::Call::check_args) are not represented here;
/// those panic like any other test assertion.
#[derive(Debug, Error)]
pub enum MockError {
    /// A sequence of return values had no more elements.
    #[error("return values for `{method}` exhausted after {draws} calls")]
    SequenceExhausted { method: String, draws: usize },

    /// A [`seq`](crate::matcher::seq) matcher was invoked more times than it
    /// has sub-matchers.
    #[error("sequence matcher exhausted after {matchers} invocations")]
    MatcherExhausted { matchers: usize },

    /// An active expectation rejected the call.
    #[error("expectation failed for `{method}`: {call}")]
    ExpectationFailed { method: String, call: String },

    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// An expectation referred to an argument that the call didn't supply.
    #[error("{call} has no parameter {param}")]
    MissingParam { call: String, param: String },

    /// A text matcher was applied to something other than a string.
    #[error("expected a string but found {value}")]
    NotText { value: String },

    /// Something that isn't callable was called.
    #[error("{value} is not callable")]
    NotCallable { value: String },

    /// A regular expression failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Raised on purpose by an [`expect_error`](crate::expect_error)
    /// expectation.
    #[error("{0}")]
    Injected(Rc<dyn Error>),
}

impl MockError {
    /// If this is an injected error of type `E`, return it.
    pub fn injected<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            MockError::Injected(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}

pub type Result<T, E = MockError> = std::result::Result<T, E>;
