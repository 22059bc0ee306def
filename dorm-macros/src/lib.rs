mod attrs;
mod model;
mod record;

use proc_macro::TokenStream;

/// Derives `dorm::Record`: rows can be materialized into the struct.
///
/// Fields marked `#[column(skip)]` are never written.
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record_impl(input)
}

/// Derives `dorm::Model`: table metadata for `[Model]` and `[Model.field]`
/// references.
///
/// ```ignore
/// #[derive(Default, Record, Model)]
/// #[model(table = "users")]
/// struct User {
///     #[column(name = "user_id", primary, autoincrement)]
///     id: i64,
///     #[column("user_name")]
///     name: String,
///     #[column(tags = "audit,list")]
///     updated_at: chrono::NaiveDateTime,
///     #[column(skip)]
///     cache: Option<String>,
/// }
/// ```
#[proc_macro_derive(Model, attributes(model, column))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model_impl(input)
}
