// vim: tw=80
//! Reference types, used to check that a mock's calls match the real thing.
//!
//! A mock built with an [`Interface`] refuses any call that the real type
//! couldn't accept: unknown method names, too many or too few positional
//! arguments, and unrecognized keyword names.  Only the shape of the call is
//! checked, never the types of the values.
//!
//! Interfaces are usually generated from a trait definition with
//! [`#[interface]`](macro@crate::interface), but can also be built by hand:
//!
//! ```
//! # use dynmock::*;
//! let iface = Interface::builder("UserStore")
//!     .method("write_user", Signature::new().param("user"))
//!     .method("find", Signature::new().param("name").optional("limit", 10))
//!     .build();
//! assert!(iface.signature("find").is_some());
//! ```

use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{Args, InterfaceError, Value};

/// One named parameter of a [`Signature`].
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Parameters with a default may be omitted by the caller.
    pub default: Option<Value>,
}

/// The parameter list of one method, excluding its receiver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    params: Vec<Parameter>,
    variadic: bool,
    var_keywords: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn param<S: Into<String>>(mut self, name: S) -> Self {
        assert!(self.params.iter().all(|p| p.default.is_none()),
            "Required parameters may not follow optional ones");
        self.params.push(Parameter{name: name.into(), default: None});
        self
    }

    /// Add a parameter that may be omitted.
    pub fn optional<S, V>(mut self, name: S, default: V) -> Self
        where S: Into<String>, V: Into<Value>
    {
        let default = Some(default.into());
        self.params.push(Parameter{name: name.into(), default});
        self
    }

    /// Accept any number of extra positional arguments.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Accept any keyword names, not just the declared parameters.
    pub fn var_keywords(mut self) -> Self {
        self.var_keywords = true;
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// How many positional arguments must be supplied?  Required parameters
    /// may also be supplied by keyword.
    pub fn min_positional(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    /// The most positional arguments accepted, or `None` if unbounded.
    pub fn max_positional(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// Check the shape of `args` against this signature.  On failure, return
    /// a description of the problem.
    fn check(&self, args: &Args) -> std::result::Result<(), String> {
        let npos = args.positional().len();
        if let Some(max) = self.max_positional() {
            if npos > max {
                return Err(format!(
                    "takes at most {} positional arguments but {} were given",
                    max, npos));
            }
        }
        for k in args.keywords().keys() {
            match self.params.iter().position(|p| p.name == *k) {
                Some(i) if i < npos => {
                    return Err(format!("got multiple values for `{}`", k));
                }
                Some(_) => (),
                None if self.var_keywords => (),
                None => {
                    return Err(format!("unexpected keyword argument `{}`", k));
                }
            }
        }
        let missing = self.params.iter()
            .skip(npos)
            .filter(|p| p.default.is_none())
            .filter(|p| !args.keywords().contains_key(&p.name))
            .map(|p| format!("`{}`", p.name))
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required arguments: {}", missing.join(", ")))
        }
    }
}

struct Inner {
    name: String,
    extends: Vec<Interface>,
    methods: BTreeMap<String, Signature>,
}

/// Description of a real type: its name, the interfaces it extends, and the
/// signatures of its methods.
///
/// Cloning is cheap.  Interfaces are identified by name.
#[derive(Clone)]
pub struct Interface(Rc<Inner>);

impl Interface {
    pub fn builder<S: Into<String>>(name: S) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            extends: Vec::new(),
            methods: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn extends(&self) -> &[Interface] {
        &self.0.extends
    }

    /// Names of the methods defined directly on this interface.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.0.methods.keys().map(String::as_str)
    }

    /// Find a method's signature, on this interface or on anything it extends.
    pub fn signature(&self, method: &str) -> Option<&Signature> {
        self.0.methods.get(method)
            .or_else(|| self.0.extends.iter().find_map(|i| i.signature(method)))
    }

    /// Is `self` the same interface as `other`, or does it extend `other`,
    /// directly or indirectly?
    pub fn is_subtype_of(&self, other: &Interface) -> bool {
        self == other || self.0.extends.iter().any(|i| i.is_subtype_of(other))
    }

    pub(crate) fn ptr_eq(&self, other: &Interface) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check that `method` could be called on the real type with `args`.
    pub fn validate(&self, method: &str, args: &Args)
        -> std::result::Result<(), InterfaceError>
    {
        let sig = self.signature(method)
            .ok_or_else(|| InterfaceError::MethodNotFound {
                interface: self.name().to_owned(),
                method: method.to_owned()
            })?;
        sig.check(args)
            .map_err(|reason| InterfaceError::WrongArguments {
                interface: self.name().to_owned(),
                method: method.to_owned(),
                reason
            })
    }
}

impl PartialEq for Interface {
    fn eq(&self, other: &Interface) -> bool {
        self.ptr_eq(other) || self.name() == other.name()
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.0.name)
            .field("extends", &self.0.extends)
            .field("methods", &self.0.methods)
            .finish()
    }
}

pub struct InterfaceBuilder {
    name: String,
    extends: Vec<Interface>,
    methods: BTreeMap<String, Signature>,
}

impl InterfaceBuilder {
    /// Inherit every method of `base`.  Methods defined directly on this
    /// interface take precedence.
    pub fn extends(mut self, base: Interface) -> Self {
        self.extends.push(base);
        self
    }

    pub fn method<S: Into<String>>(mut self, name: S, sig: Signature) -> Self {
        self.methods.insert(name.into(), sig);
        self
    }

    pub fn build(self) -> Interface {
        Interface(Rc::new(Inner {
            name: self.name,
            extends: self.extends,
            methods: self.methods,
        }))
    }
}

/// Types that can describe a reference type.  Implemented by the structs that
/// [`#[interface]`](macro@crate::interface) generates.
pub trait Reflect {
    fn interface() -> Interface;
}
