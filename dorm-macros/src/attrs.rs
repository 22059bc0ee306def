use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

/// Settings read from a field's `#[column(...)]` attributes.
pub struct ColumnAttrs {
    /// Logical field name: the Rust identifier without any `r#` prefix.
    pub name: String,
    /// Physical column name, defaulting to the logical name.
    pub column: String,
    pub primary: bool,
    pub auto_increment: bool,
    pub tags: Vec<String>,
    pub skip: bool,
}

pub fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<Vec<&'a Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                format!("{} only supports structs with named fields", derive),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{} only supports structs", derive),
        )),
    }
}

pub fn parse_column_attrs(field: &Field) -> syn::Result<ColumnAttrs> {
    let name = match &field.ident {
        Some(ident) => ident.unraw().to_string(),
        None => return Err(syn::Error::new_spanned(field, "expected a named field")),
    };
    let mut attrs = ColumnAttrs {
        column: name.clone(),
        name,
        primary: false,
        auto_increment: false,
        tags: Vec::new(),
        skip: false,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }

        // #[column("user_name")]
        if let Ok(s) = attr.parse_args::<LitStr>() {
            attrs.column = s.value();
            continue;
        }

        // #[column(name = "user_id", primary, autoincrement, tags = "a,b", skip)]
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let s: LitStr = meta.value()?.parse()?;
                attrs.column = s.value();
            } else if meta.path.is_ident("primary") {
                attrs.primary = true;
            } else if meta.path.is_ident("autoincrement") {
                attrs.auto_increment = true;
            } else if meta.path.is_ident("tags") {
                let s: LitStr = meta.value()?.parse()?;
                attrs.tags.extend(
                    s.value()
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from),
                );
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else {
                return Err(meta.error("unsupported column attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// `UserAccount` -> `user_account`.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_numeric();
        }
    }
    out
}
