use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::attrs::{named_fields, parse_column_attrs};

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let record_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut field_names = Vec::new();
    let mut arms = Vec::new();
    for field in named_fields(input, "Record")? {
        let attrs = parse_column_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let ident = &field.ident;
        let index = field_names.len();
        field_names.push(attrs.name);
        arms.push(quote! {
            #index => ::dorm::scan::coerce::coerce(&mut self.#ident, value, column),
        });
    }

    Ok(quote! {
        impl #impl_generics ::dorm::scan::record::Record for #name #ty_generics #where_clause {
            fn record_name() -> &'static str {
                #record_name
            }

            fn field_names() -> &'static [&'static str] {
                &[#(#field_names),*]
            }

            fn set_field(
                &mut self,
                index: usize,
                value: ::dorm::udbc::value::Value,
                column: &::dorm::udbc::column::ColumnMeta,
            ) -> ::dorm::Result<()> {
                match index {
                    #(#arms)*
                    _ => ::std::result::Result::Ok(()),
                }
            }
        }
    })
}
