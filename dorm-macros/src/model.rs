use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

use crate::attrs::{named_fields, parse_column_attrs, snake_case};

pub fn derive_model_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Reads `#[model(table = "...")]`; the table defaults to the snake_case
/// struct name.
fn table_name(input: &DeriveInput) -> syn::Result<String> {
    let mut table = snake_case(&input.ident.to_string());
    for attr in &input.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let s: LitStr = meta.value()?.parse()?;
                table = s.value();
                Ok(())
            } else {
                Err(meta.error("unsupported model attribute"))
            }
        })?;
    }
    Ok(table)
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let model_name = name.to_string();
    let table = table_name(input)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut fields = Vec::new();
    for field in named_fields(input, "Model")? {
        let attrs = parse_column_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let field_name = &attrs.name;
        let column = &attrs.column;
        let primary = attrs.primary.then(|| quote! { .primary() });
        let auto_increment = attrs.auto_increment.then(|| quote! { .auto_increment() });
        let tags = &attrs.tags;
        fields.push(quote! {
            .field(
                ::dorm::registry::FieldInfo::new(#field_name, #column)
                    #primary
                    #auto_increment
                    #(.tag(#tags))*
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::dorm::registry::Model for #name #ty_generics #where_clause {
            fn model_info() -> ::dorm::registry::ModelInfo {
                ::dorm::registry::ModelInfo::new(#model_name, #table)
                    #(#fields)*
            }
        }
    })
}
