// vim: tw=80
//! Dynamically-typed values passed to and returned from mocked methods.
//!
//! A mock dispatches calls by name, so it can't know the argument types of the
//! methods it stands in for.  Every argument and every return value is a
//! [`Value`].  Arguments travel together as [`Args`]: an ordered list of
//! positional values plus a name-keyed map of keyword values.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    rc::Rc,
};

use downcast::{downcast, Any};

use crate::{Interface, MockError, Result};

/// An arbitrary user object that can be passed through a mock.
///
/// All methods have defaults, so the minimal implementation is an empty `impl`
/// block.  Objects are compared by identity, and can be downcast back to their
/// concrete type with [`Value::downcast_ref`].
pub trait Object: Any {
    /// The reference type this object is an instance of, if any.
    fn interface(&self) -> Option<Interface> {
        None
    }

    /// Look up a named attribute.
    fn attr(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Can this object itself be invoked?
    fn is_callable(&self) -> bool {
        false
    }

    /// Invoke the object.  Only meaningful when `is_callable` is true.
    fn call(&self, args: &Args) -> Result<Value> {
        let _ = args;
        Err(MockError::NotCallable { value: self.describe() })
    }

    /// Short human readable form, used in call strings and messages.
    fn describe(&self) -> String {
        "<object>".to_owned()
    }
}
downcast!(dyn Object);

/// A callable value.  Cloning a `Function` yields the same function, so two
/// clones compare as identical.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&Args) -> Result<Value>>);

impl Function {
    pub fn new<F>(f: F) -> Self
        where F: Fn(&Args) -> Result<Value> + 'static
    {
        Function(Rc::new(f))
    }

    pub fn call(&self, args: &Args) -> Result<Value> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Func(Function),
    /// A reference type, used as a value
    Interface(Interface),
    Object(Rc<dyn Object>),
}

impl Value {
    /// Wrap a user object.
    pub fn object<O: Object>(o: O) -> Self {
        Value::Object(Rc::new(o))
    }

    pub fn function<F>(f: F) -> Self
        where F: Fn(&Args) -> Result<Value> + 'static
    {
        Value::Func(Function::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the concrete type of an [`Object`] value.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        match self {
            Value::Object(o) => o.downcast_ref::<T>().ok(),
            _ => None,
        }
    }

    /// Identity comparison.
    ///
    /// Functions, interfaces and objects are identical only to themselves.
    /// Plain data has no identity of its own, so two data values are
    /// identical when they have the same variant and compare equal.  Floats
    /// are identical when their bits are, so a NaN is identical to itself.
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Interface(a), Value::Interface(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Int(_), Value::Float(_)) |
            (Value::Float(_), Value::Int(_)) => false,
            _ => self == other
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Func(_) => true,
            Value::Object(o) => o.is_callable(),
            _ => false,
        }
    }

    pub fn call(&self, args: &Args) -> Result<Value> {
        match self {
            Value::Func(f) => f.call(args),
            Value::Object(o) if o.is_callable() => o.call(args),
            _ => Err(MockError::NotCallable { value: self.to_string() }),
        }
    }

    /// Look up a named attribute.  Only objects have attributes.
    pub fn attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(o) => o.attr(name),
            _ => None,
        }
    }

    /// Membership test, with `self` as the container.
    ///
    /// Lists contain their elements, maps contain their keys and strings
    /// contain their substrings.  Returns `None` if `self` isn't a container.
    pub fn contains(&self, item: &Value) -> Option<bool> {
        match self {
            Value::List(l) => Some(l.iter().any(|v| v == item)),
            Value::Map(m) => Some(item.as_str().is_some_and(|k| m.contains_key(k))),
            Value::Str(s) => Some(item.as_str().is_some_and(|sub| s.contains(sub))),
            _ => None,
        }
    }
}

/// Compare an integer with a float exactly, without rounding either one.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        None
    } else if f >= LIMIT {
        Some(Ordering::Less)
    } else if f < -LIMIT {
        Some(Ordering::Greater)
    } else {
        // In range, the integral part converts to i64 exactly
        let whole = f.trunc();
        let frac = f - whole;
        Some(i.cmp(&(whole as i64)).then_with(|| {
            0.0_f64.partial_cmp(&frac).unwrap_or(Ordering::Equal)
        }))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) |
            (Value::Float(f), Value::Int(i)) =>
                cmp_int_float(*i, *f) == Some(Ordering::Equal),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Interface(a), Value::Interface(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) =>
                cmp_int_float(*b, *a).map(Ordering::reverse),
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::List(a), Value::List(b)) => a.partial_cmp(b),
            _ if self == other => Some(Ordering::Equal),
            _ => None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(l) => {
                f.write_str("[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Func(_) => f.write_str("<function>"),
            Value::Interface(i) => write!(f, "<interface {}>", i.name()),
            Value::Object(o) => f.write_str(&o.describe()),
        }
    }
}

// Values show up in assert_eq! output, where the literal form reads best.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    }
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    &str => Str,
    String => Str,
    Function => Func,
    Interface => Interface,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<Rc<dyn Object>> for Value {
    fn from(o: Rc<dyn Object>) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<Value>> From<BTreeMap<K, T>> for Value {
    fn from(m: BTreeMap<K, T>) -> Self {
        Value::Map(m.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Selects one argument of a call: by position or by keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
    Index(usize),
    Name(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Param::Index(i) => write!(f, "{}", i),
            Param::Name(n) => f.write_str(n),
        }
    }
}

impl From<usize> for Param {
    fn from(i: usize) -> Self {
        Param::Index(i)
    }
}

// Bare integer literals default to i32.  Negative indices never match.
impl From<i32> for Param {
    fn from(i: i32) -> Self {
        Param::Index(usize::try_from(i).unwrap_or(usize::MAX))
    }
}

impl From<&str> for Param {
    fn from(n: &str) -> Self {
        Param::Name(n.to_owned())
    }
}

impl From<String> for Param {
    fn from(n: String) -> Self {
        Param::Name(n)
    }
}

/// The arguments of one call.
///
/// Keyword names are unique, and are kept sorted so that the canonical
/// rendering lists them alphabetically.  Usually built with [`args!`].
#[derive(Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn push<V: Into<Value>>(&mut self, v: V) {
        self.positional.push(v.into());
    }

    /// Set a keyword argument, replacing any earlier value with that name.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, k: K, v: V) {
        self.keywords.insert(k.into(), v.into());
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    pub fn get(&self, param: &Param) -> Option<&Value> {
        match param {
            Param::Index(i) => self.positional.get(*i),
            Param::Name(n) => self.keywords.get(n),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let positional = self.positional.iter().map(ToString::to_string);
        let keywords = self.keywords.iter().map(|(k, v)| format!("{}={}", k, v));
        let all = positional.chain(keywords).collect::<Vec<_>>();
        f.write_str(&all.join(", "))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self)
    }
}

/// Build an [`Args`] from positional values, optionally followed by a
/// semicolon and `name = value` keyword pairs.
///
/// # Examples
/// ```
/// # use dynmock::*;
/// let a = args![1, "two"; verbose = true];
/// assert_eq!(a.to_string(), r#"1, "two", verbose=true"#);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    ($($p:expr),* ; $($k:ident = $v:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut a = $crate::Args::new();
        $( a.push($p); )*
        $( a.insert(stringify!($k), $v); )*
        a
    }};
    ($($p:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut a = $crate::Args::new();
        $( a.push($p); )*
        a
    }};
}
