// vim: tw=80
//! Scripted return values

use std::fmt;

use tracing::debug;

use crate::{Function, Interface, MockError, Result, Value};

enum Rfunc {
    Const(Value),
    Seq {
        values: Vec<Value>,
        next: usize,
    },
    Iter {
        iter: Box<dyn Iterator<Item = Value>>,
        draws: usize,
    },
}

impl Rfunc {
    fn call_mut(&mut self, method: &str) -> Result<Value> {
        match self {
            Rfunc::Const(v) => Ok(v.clone()),
            Rfunc::Seq{values, next} => {
                let v = values.get(*next)
                    .cloned()
                    .ok_or_else(|| exhausted(method, *next))?;
                *next += 1;
                Ok(v)
            },
            Rfunc::Iter{iter, draws} => {
                let v = iter.next().ok_or_else(|| exhausted(method, *draws))?;
                *draws += 1;
                Ok(v)
            },
        }
    }
}

fn exhausted(method: &str, draws: usize) -> MockError {
    debug!(method, draws, "return values exhausted");
    MockError::SequenceExhausted { method: method.to_owned(), draws }
}

/// The policy that produces a method's return values.
///
/// A method has at most one `Returns` at a time; registering another replaces
/// it.  A plain value converts into a constant.
pub struct Returns(Rfunc);

impl Returns {
    /// Always return `v`.
    pub fn constant<V: Into<Value>>(v: V) -> Self {
        Returns(Rfunc::Const(v.into()))
    }

    /// Return each of `values` once, in order.  Any further call fails with
    /// [`MockError::SequenceExhausted`].
    pub fn sequence<I>(values: I) -> Self
        where I: IntoIterator, I::Item: Into<Value>
    {
        let values = values.into_iter().map(Into::into).collect();
        Returns(Rfunc::Seq{values, next: 0})
    }

    /// Pull each return value from an iterator, which may be infinite.  Once
    /// the iterator runs dry, further calls fail with
    /// [`MockError::SequenceExhausted`].  The iterator is never restarted.
    pub fn iter<I>(iter: I) -> Self
        where I: IntoIterator + 'static,
              I::IntoIter: 'static,
              I::Item: Into<Value>
    {
        let iter = Box::new(iter.into_iter().map(Into::into));
        Returns(Rfunc::Iter{iter, draws: 0})
    }

    /// Produce the next return value for `method`.
    pub(crate) fn next(&mut self, method: &str) -> Result<Value> {
        self.0.call_mut(method)
    }
}

impl fmt::Debug for Returns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0 {
            Rfunc::Const(v) => f.debug_tuple("Constant").field(v).finish(),
            Rfunc::Seq{values, next} => f.debug_struct("Sequence")
                .field("values", values)
                .field("next", next)
                .finish(),
            Rfunc::Iter{draws, ..} => f.debug_struct("Iter")
                .field("draws", draws)
                .finish(),
        }
    }
}

macro_rules! returns_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Returns {
                fn from(v: $t) -> Self {
                    Returns::constant(v)
                }
            }
        )*
    }
}

returns_from!(Value, (), bool, i32, i64, u32, f64, &str, String, Function,
              Interface);

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn constant() {
        let mut r = Returns::from(7);
        for _ in 0..3 {
            assert_eq!(r.next("f").unwrap(), Value::from(7));
        }
    }

    #[test]
    fn sequence() {
        let mut r = Returns::sequence([1, 4, 9]);
        assert_eq!(r.next("sq").unwrap(), Value::from(1));
        assert_eq!(r.next("sq").unwrap(), Value::from(4));
        assert_eq!(r.next("sq").unwrap(), Value::from(9));
        match r.next("sq") {
            Err(MockError::SequenceExhausted{method, draws}) => {
                assert_eq!(method, "sq");
                assert_eq!(draws, 3);
            },
            other => panic!("Unexpected {:?}", other)
        }
    }

    #[test]
    fn empty_sequence() {
        let mut r = Returns::sequence(Vec::<Value>::new());
        assert!(matches!(r.next("f"),
            Err(MockError::SequenceExhausted{draws: 0, ..})));
    }

    #[test]
    fn infinite_iter() {
        let mut r = Returns::iter((1..).map(|i: i64| i * i));
        for i in 1..100i64 {
            assert_eq!(r.next("f").unwrap(), Value::from(i * i));
        }
    }

    #[test]
    fn finite_iter() {
        let mut r = Returns::iter(vec!["a", "b"]);
        r.next("f").unwrap();
        r.next("f").unwrap();
        assert!(matches!(r.next("f"),
            Err(MockError::SequenceExhausted{draws: 2, ..})));
    }
}
