use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, ItemStruct, LitStr};

/// Expands `#[service]` / `#[service("name")]` into a `ServiceMarker` impl.
///
/// Without an explicit name the snake_case form of the struct name is used,
/// so `HealthService` becomes `health_service`.
pub fn expand(args: TokenStream, input: ItemStruct) -> TokenStream {
    let name = if args.is_empty() {
        LitStr::new(&snake_case(&input.ident), input.ident.span())
    } else {
        match syn::parse2::<LitStr>(args) {
            Ok(lit) if lit.value().trim().is_empty() => {
                return syn::Error::new_spanned(lit, "service name cannot be empty")
                    .to_compile_error();
            },
            Ok(lit) => lit,
            Err(err) => return err.to_compile_error(),
        }
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #input

        #[automatically_derived]
        impl #impl_generics ::automata_kernel::service::ServiceMarker for #ident #ty_generics #where_clause {
            const SERVICE_NAME: &'static str = #name;
        }
    }
}

fn snake_case(ident: &Ident) -> String {
    let raw = ident.to_string();
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in raw.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::Span;

    #[test]
    fn snake_case_splits_on_lower_to_upper_boundaries() {
        let ident = Ident::new("HealthService", Span::call_site());
        assert_eq!(snake_case(&ident), "health_service");

        let ident = Ident::new("Http2Gateway", Span::call_site());
        assert_eq!(snake_case(&ident), "http2_gateway");

        let ident = Ident::new("IOService", Span::call_site());
        assert_eq!(snake_case(&ident), "ioservice");
    }
}
