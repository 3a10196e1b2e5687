// vim: tw=80
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    *,
    ext::IdentExt,
    spanned::Spanned
};

/// One parameter of a trait method, as seen by callers
struct Param {
    name: String,
    optional: bool,
}

/// The shape of one trait method
struct MethodDesc {
    name: String,
    params: Vec<Param>,
    variadic: bool,
    kwargs: bool,
}

impl MethodDesc {
    /// Expression that builds this method's `dynmock::Signature`
    fn signature(&self) -> TokenStream {
        let params = self.params.iter().map(|p| {
            let name = &p.name;
            if p.optional {
                quote!(.optional(#name, ::dynmock::Value::None))
            } else {
                quote!(.param(#name))
            }
        });
        let variadic = self.variadic.then(|| quote!(.variadic()));
        let kwargs = self.kwargs.then(|| quote!(.var_keywords()));
        quote!(::dynmock::Signature::new() #(#params)* #variadic #kwargs)
    }
}

/// Remove every helper attribute called `name`, and report whether there
/// were any.
fn take_attr(attrs: &mut Vec<Attribute>, name: &str) -> bool {
    let before = attrs.len();
    attrs.retain(|a| !a.path().is_ident(name));
    attrs.len() != before
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(tp) => tp.qself.is_none() &&
            tp.path.segments.last().is_some_and(|s| s.ident == "Option"),
        _ => false
    }
}

fn describe_method(f: &mut TraitItemFn) -> Result<MethodDesc> {
    let mut params = Vec::new();
    let mut variadic = false;
    let mut kwargs = false;
    // The receiver doesn't count toward a parameter's position
    let typed = f.sig.inputs.iter_mut().filter_map(|arg| match arg {
        FnArg::Typed(pt) => Some(pt),
        FnArg::Receiver(_) => None
    });
    for (i, pt) in typed.enumerate() {
        match (take_attr(&mut pt.attrs, "variadic"),
               take_attr(&mut pt.attrs, "kwargs"))
        {
            (true, true) => {
                return Err(Error::new(pt.span(),
                    "A parameter can't be both #[variadic] and #[kwargs]"));
            },
            (true, false) if variadic => {
                return Err(Error::new(pt.span(),
                    "Only one parameter may be #[variadic]"));
            },
            (false, true) if kwargs => {
                return Err(Error::new(pt.span(),
                    "Only one parameter may be #[kwargs]"));
            },
            (true, false) => {
                variadic = true;
                continue;
            },
            (false, true) => {
                kwargs = true;
                continue;
            },
            (false, false) => ()
        }
        if variadic || kwargs {
            return Err(Error::new(pt.span(),
                "Ordinary parameters must precede #[variadic] and #[kwargs]"));
        }
        let name = match pt.pat.as_ref() {
            Pat::Ident(pi) => pi.ident.unraw().to_string(),
            _ => format!("arg{}", i)
        };
        params.push(Param{name, optional: is_option(&pt.ty)});
    }
    // Only a trailing run of Options can be omitted
    let first_optional = params.iter()
        .rposition(|p| !p.optional)
        .map_or(0, |i| i + 1);
    for p in params[..first_optional].iter_mut() {
        p.optional = false;
    }
    Ok(MethodDesc {
        name: f.sig.ident.unraw().to_string(),
        params,
        variadic,
        kwargs
    })
}

pub(crate) fn do_interface(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    if !attrs.is_empty() {
        return Error::new(attrs.span(), "#[interface] takes no arguments")
            .to_compile_error();
    }
    let mut item: ItemTrait = match parse2(input) {
        Ok(t) => t,
        Err(e) => return e.to_compile_error()
    };
    let mut methods = Vec::new();
    for ti in item.items.iter_mut() {
        if let TraitItem::Fn(f) = ti {
            match describe_method(f) {
                Ok(m) => methods.push(m),
                Err(e) => return e.to_compile_error()
            }
        }
    }

    let vis = &item.vis;
    let name = item.ident.unraw().to_string();
    let reflect = format_ident!("{}Interface", item.ident.unraw());
    let doc = format!("Reference type description of [`{}`]", name);
    let names = methods.iter().map(|m| &m.name);
    let sigs = methods.iter().map(MethodDesc::signature);
    quote!(
        #item
        #[doc = #doc]
        #vis struct #reflect;
        impl ::dynmock::Reflect for #reflect {
            fn interface() -> ::dynmock::Interface {
                ::dynmock::Interface::builder(#name)
                    #(.method(#names, #sigs))*
                    .build()
            }
        }
    )
}

#[cfg(test)]
mod t {
    use std::str::FromStr;
    use pretty_assertions::assert_eq;
    use super::*;

    fn expand(code: &str) -> String {
        let ts = TokenStream::from_str(code).unwrap();
        do_interface(TokenStream::new(), ts).to_string()
    }

    fn check(desired: &str, code: &str) {
        let output = expand(code);
        // Let proc_macro2 reformat the whitespace in the expected string
        let expected = TokenStream::from_str(desired).unwrap().to_string();
        assert_eq!(expected, output);
    }

    fn tokens(code: &str) -> String {
        TokenStream::from_str(code).unwrap().to_string()
    }

    #[test]
    fn simple() {
        check(r#"
            pub trait UserStore {
                fn write_user_to_db(&self, user: u32) -> bool;
            }
            #[doc = "Reference type description of [`UserStore`]"]
            pub struct UserStoreInterface;
            impl ::dynmock::Reflect for UserStoreInterface {
                fn interface() -> ::dynmock::Interface {
                    ::dynmock::Interface::builder("UserStore")
                        .method("write_user_to_db",
                            ::dynmock::Signature::new().param("user"))
                        .build()
                }
            }
        "#, r#"
            pub trait UserStore {
                fn write_user_to_db(&self, user: u32) -> bool;
            }
        "#);
    }

    #[test]
    fn trailing_options_are_optional() {
        let output = expand(r#"
            trait Search {
                fn find(&self, a: Option<u32>, b: u32, c: Option<u32>,
                        d: std::option::Option<u32>);
            }
        "#);
        let sig = tokens(r#"
            ::dynmock::Signature::new()
                .param("a")
                .param("b")
                .optional("c", ::dynmock::Value::None)
                .optional("d", ::dynmock::Value::None)
        "#);
        assert!(output.contains(&sig), "{}", output);
    }

    #[test]
    fn helper_attributes() {
        let output = expand(r#"
            trait Logger {
                fn log(&self, fmt: &str, #[variadic] args: &[u32],
                       #[kwargs] opts: Vec<(String, u32)>);
            }
        "#);
        let sig = tokens(r#"
            ::dynmock::Signature::new().param("fmt").variadic().var_keywords()
        "#);
        assert!(output.contains(&sig), "{}", output);
        assert!(!output.contains(&tokens("#[variadic]")), "{}", output);
        assert!(!output.contains(&tokens("#[kwargs]")), "{}", output);
    }

    #[test]
    fn static_methods_and_patterns() {
        let output = expand(r#"
            trait Factory {
                fn create((x, y): (u32, u32), r#type: u8) -> Self;
                const N: usize;
            }
        "#);
        let sig = tokens(r#"
            .method("create",
                ::dynmock::Signature::new().param("arg0").param("type"))
        "#);
        assert!(output.contains(&sig), "{}", output);
    }

    #[test]
    fn pattern_names_skip_the_receiver() {
        let output = expand(r#"
            trait Plotter {
                fn plot(&self, (x, y): (i32, i32), [z]: [i32; 1]) {}
            }
        "#);
        let sig = tokens(r#"
            .method("plot",
                ::dynmock::Signature::new().param("arg0").param("arg1"))
        "#);
        assert!(output.contains(&sig), "{}", output);
    }

    #[test]
    fn ordinary_after_variadic() {
        let output = expand(r#"
            trait T {
                fn f(&self, #[variadic] a: &[u32], b: u32);
            }
        "#);
        assert!(output.contains("compile_error"), "{}", output);
        assert!(output.contains("Ordinary parameters must precede"));
    }

    #[test]
    fn both_helpers() {
        let output = expand(r#"
            trait T {
                fn f(&self, #[variadic] #[kwargs] a: &[u32]);
            }
        "#);
        assert!(output.contains("can't be both"), "{}", output);
    }

    #[test]
    fn arguments_rejected() {
        let ts = TokenStream::from_str("trait T {}").unwrap();
        let attrs = TokenStream::from_str("foo").unwrap();
        let output = do_interface(attrs, ts).to_string();
        assert!(output.contains("takes no arguments"), "{}", output);
    }

    #[test]
    fn not_a_trait() {
        let output = expand("struct S;");
        assert!(output.contains("compile_error"), "{}", output);
    }
}
