//! Pageobject Derive Macros: element descriptors from annotated enums
//!
//! Writing a [`PageElement`] impl by hand means one `match` arm per control.
//! The derive generates it from a `#[locator(...)]` attribute on each variant:
//!
//! ```ignore
//! use pageobject::PageElement;
//!
//! #[derive(PageElement)]
//! enum LoginPage {
//!     #[locator(id = "username")]
//!     Username,
//!     #[locator(css = "input[type=password]")]
//!     Password,
//!     #[locator(xpath = "//table[@id='history']/tr[{0}]")]
//!     HistoryRow,
//! }
//!
//! let row = LoginPage::HistoryRow.locator(&["3"])?;
//! ```
//!
//! # Strategies
//!
//! `id`, `name`, `class_name`, `tag_name`, `css`, `xpath`, `link_text`,
//! `partial_link_text`. Each variant must be a unit variant with exactly one
//! `#[locator(strategy = "expression")]` attribute; anything else is a
//! compile error pointing at the offending variant.
//!
//! [`PageElement`]: https://docs.rs/pageobject/latest/pageobject/trait.PageElement.html

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, MetaNameValue};

/// Derive `pageobject::PageElement` for an enum of unit variants.
///
/// Also generates:
/// - `all()` - every variant, in declaration order
/// - a `name()` override returning `Enum::Variant` for log output
///
/// # Attributes
///
/// - `#[locator(css = "...")]` (or any other strategy) on every variant
#[proc_macro_derive(PageElement, attributes(locator))]
pub fn derive_page_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One annotated variant
struct VariantLocator {
    ident: syn::Ident,
    strategy: syn::Ident,
    expression: String,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "PageElement can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "PageElement needs at least one variant",
        ));
    }

    let mut locators = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "PageElement variants must be unit variants",
            ));
        }
        let (strategy, expression) = extract_locator_attribute(&variant.ident, &variant.attrs)?;
        locators.push(VariantLocator {
            ident: variant.ident.clone(),
            strategy,
            expression,
        });
    }

    let template_arms = locators.iter().map(|l| {
        let ident = &l.ident;
        let strategy = &l.strategy;
        let expression = &l.expression;
        quote! {
            Self::#ident => ::pageobject::LocatorTemplate::new(::pageobject::By::#strategy, #expression)
        }
    });
    let name_arms = locators.iter().map(|l| {
        let ident = &l.ident;
        let display = format!("{name}::{ident}");
        quote! { Self::#ident => #display }
    });
    let variants = locators.iter().map(|l| &l.ident);

    Ok(quote! {
        impl #impl_generics ::pageobject::PageElement for #name #ty_generics #where_clause {
            fn template(&self) -> ::pageobject::LocatorTemplate {
                match self {
                    #(#template_arms,)*
                }
            }

            fn name(&self) -> ::std::string::String {
                let name: &'static str = match self {
                    #(#name_arms,)*
                };
                ::std::string::String::from(name)
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Every descriptor, in declaration order
            #[inline]
            pub const fn all() -> &'static [Self] {
                &[#(Self::#variants),*]
            }
        }
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Map an attribute key to the `By` variant it selects
fn strategy_variant(key: &str) -> Option<&'static str> {
    Some(match key {
        "id" => "Id",
        "name" => "Name",
        "class_name" => "ClassName",
        "tag_name" => "TagName",
        "css" => "Css",
        "xpath" => "XPath",
        "link_text" => "LinkText",
        "partial_link_text" => "PartialLinkText",
        _ => return None,
    })
}

/// Extract the strategy and expression from `#[locator(strategy = "...")]`
fn extract_locator_attribute(variant: &syn::Ident, attrs: &[Attribute]) -> syn::Result<(syn::Ident, String)> {
    let mut found: Option<(syn::Ident, String)> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("locator")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                format!("variant `{variant}` has more than one #[locator] attribute"),
            ));
        }

        let nv: MetaNameValue = attr.parse_args()?;
        let key = nv
            .path
            .get_ident()
            .map(ToString::to_string)
            .unwrap_or_default();
        let Some(strategy) = strategy_variant(&key) else {
            return Err(syn::Error::new_spanned(
                &nv.path,
                "unknown locator strategy; expected one of id, name, class_name, tag_name, css, xpath, link_text, partial_link_text",
            ));
        };
        let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = &nv.value else {
            return Err(syn::Error::new_spanned(&nv.value, "locator expression must be a string literal"));
        };

        found = Some((format_ident!("{}", strategy), s.value()));
    }

    found.ok_or_else(|| {
        syn::Error::new_spanned(
            variant,
            format!("variant `{variant}` needs a #[locator(strategy = \"expression\")] attribute"),
        )
    })
}
