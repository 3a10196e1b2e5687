// vim: tw=80
//! Proc Macros for use with dynmock
//!
//! You probably don't want to use this crate directly.  Instead, use its
//! reexports via the [`dynmock`](../dynmock/index.html) crate.

extern crate proc_macro;

mod interface;

/// Describe a trait as a reference type, so mocks can check their calls
/// against it.
///
/// The trait is emitted unchanged.  Alongside it comes a unit struct named
/// after the trait with an `Interface` suffix, which implements
/// `dynmock::Reflect`.
///
/// Each method's receiver is ignored, and every other parameter becomes a
/// named parameter.  A trailing run of `Option` parameters may be omitted by
/// callers.  Two helper attributes can decorate the last parameters:
/// * `#[variadic]` - the method accepts any number of extra positional
///   arguments
/// * `#[kwargs]` - the method accepts any keyword argument names
///
/// # Examples
/// ```ignore
/// #[interface]
/// trait Logger {
///     fn log(&self, level: u8, fmt: &str, #[variadic] args: &[Value]);
///     fn flush(&mut self, timeout: Option<u32>);
/// }
///
/// let mock = Mock::builder()
///     .reflect::<LoggerInterface>()
///     .build();
/// mock.call("log", args![3, "{} {}", 1, 2]).unwrap();
/// mock.call("flush", args![]).unwrap();
/// ```
#[proc_macro_attribute]
pub fn interface(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    interface::do_interface(attrs.into(), input.into()).into()
}
