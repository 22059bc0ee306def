use log::trace;

use crate::registry::Registry;
use crate::tpl::parser::parse_bracket_ref;
use crate::udbc::dialect::Dialect;

/// Replaces model references with dialect-escaped physical names.
///
/// - `[Model]` and `[!Model]` become the escaped table name.
/// - `[Model.field]` becomes the escaped column name.
/// - `[!Model.field]` becomes `table.column`, both escaped.
///
/// Brackets naming no registered model are kept as written. A registered
/// model with an unknown field yields the field text as written, unescaped.
pub fn resolve_identifiers(text: &str, dialect: Dialect, registry: &Registry) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(pos) = rest.find('[') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some(r) = parse_bracket_ref(rest) else {
            out.push('[');
            rest = &rest[1..];
            continue;
        };

        let span = &rest[..r.len];
        match registry.model(r.model) {
            None => {
                trace!("no model named {}, leaving {} as is", r.model, span);
                out.push_str(span);
            }
            Some(model) => match r.field {
                None => out.push_str(&dialect.escape(&model.table_name)),
                Some(field) => {
                    let column = match model.field_by_name(field) {
                        Some(info) => dialect.escape(&info.column),
                        None => {
                            trace!("model {} has no field {}", r.model, field);
                            field.to_string()
                        }
                    };
                    if r.qualified {
                        out.push_str(&dialect.escape(&model.table_name));
                        out.push('.');
                    }
                    out.push_str(&column);
                }
            },
        }
        rest = &rest[r.len..];
    }

    out.push_str(rest);
    out
}
