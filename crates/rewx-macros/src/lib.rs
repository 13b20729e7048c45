use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, FnArg, Ident, ItemFn, LitStr, Pat, PatType, ReturnType, Type};

/// How a parameter of a `#[component]` function is bound from the props.
enum Binding {
    /// `children: Vec<Element>` receives the element's children.
    Children,
    /// A reference parameter named `props` receives the whole map.
    Props,
    /// Anything else is extracted by name through `FromProp`.
    Extract(LitStr),
}

fn binding_for(ident: &Ident, ty: &Type) -> Binding {
    let name = ident.unraw().to_string();
    match name.as_str() {
        "children" => Binding::Children,
        "props" if matches!(ty, Type::Reference(_)) => Binding::Props,
        _ => Binding::Extract(LitStr::new(&name, ident.span())),
    }
}

/// Turns a function with typed parameters into a function component.
///
/// ```ignore
/// #[component]
/// fn greeting(name: String, excited: Option<bool>) -> RenderResult {
///     let mark = if excited.unwrap_or(false) { "!" } else { "." };
///     Ok(Element::text(format!("Hello, {name}{mark}")))
/// }
///
/// let element = Element::new(greeting()).prop("name", "Ada");
/// ```
///
/// The annotated function is replaced by a constructor returning a
/// `FunctionComponent`. Parameters are read from the element's props by name:
/// `Option<T>` parameters are optional, `children` receives the child
/// elements and a reference parameter named `props` receives the props map.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_tokens = TokenStream2::from(attr);
    if !attr_tokens.is_empty() {
        return syn::Error::new_spanned(attr_tokens, "unsupported component attribute")
            .to_compile_error()
            .into();
    }

    let func = parse_macro_input!(item as ItemFn);
    match expand(func) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(func: ItemFn) -> syn::Result<TokenStream2> {
    let sig = &func.sig;
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "components cannot be generic",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "components cannot be async"));
    }
    let return_ty = match &sig.output {
        ReturnType::Type(_, ty) => ty.as_ref().clone(),
        ReturnType::Default => {
            return Err(syn::Error::new_spanned(
                sig,
                "components must return `RenderResult`",
            ))
        }
    };

    let mut params = Vec::new();
    for arg in &sig.inputs {
        match arg {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "components cannot take `self`",
                ))
            }
            FnArg::Typed(PatType { pat, ty, .. }) => match &**pat {
                Pat::Ident(pat_ident) if pat_ident.by_ref.is_none() => {
                    params.push((pat_ident.ident.clone(), (**ty).clone()));
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "component parameters must be plain identifiers",
                    ))
                }
            },
        }
    }

    let ident = &sig.ident;
    let name = LitStr::new(&ident.unraw().to_string(), ident.span());
    let body_ident = Ident::new(&format!("__rewx_body_{}", ident.unraw()), Span::call_site());
    let render_ident = Ident::new(&format!("__rewx_render_{}", ident.unraw()), Span::call_site());
    let attrs = &func.attrs;
    let vis = &func.vis;
    let block = &func.block;

    let body_inputs: Vec<TokenStream2> = params
        .iter()
        .map(|(ident, ty)| quote! { #ident: #ty })
        .collect();
    let bindings: Vec<TokenStream2> = params
        .iter()
        .map(|(ident, ty)| match binding_for(ident, ty) {
            Binding::Children => quote! {
                let #ident: #ty = __props.children().to_vec();
            },
            Binding::Props => quote! {
                let #ident: #ty = __props;
            },
            Binding::Extract(key) => quote! {
                let #ident: #ty = __props.extract::<#ty>(#key)?;
            },
        })
        .collect();
    let args: Vec<&Ident> = params.iter().map(|(ident, _)| ident).collect();

    Ok(quote! {
        #(#attrs)*
        #vis fn #ident() -> ::rewx_core::FunctionComponent {
            #[allow(clippy::too_many_arguments)]
            fn #body_ident(#(#body_inputs),*) -> #return_ty #block

            fn #render_ident(__props: &::rewx_core::Props) -> ::rewx_core::RenderResult {
                #(#bindings)*
                #body_ident(#(#args),*)
            }

            ::rewx_core::FunctionComponent::new(#name, #render_ident)
        }
    })
}
