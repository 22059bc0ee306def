use log::trace;

use crate::Result;
use crate::registry::Registry;
use crate::tpl::ident::resolve_identifiers;
use crate::tpl::macros::expand;
use crate::tpl::placeholder::normalize_placeholders;
use crate::udbc::dialect::Dialect;
use crate::udbc::value::Value;

pub use crate::tpl::placeholder::rebind;

/// A statement ready to run on a connection of the target dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Renders a query template into dialect SQL with canonical `@pN` references.
///
/// This function handles:
/// 1. Numbering `?` placeholders as `@p1`, `@p2`, ...
/// 2. Expanding macro calls such as `IF!(c, a, b)`
/// 3. Resolving `[Model]`, `[Model.field]` and `[!Model.field]` references
pub fn render(template: &str, dialect: Dialect, registry: &Registry) -> Result<String> {
    let sql = normalize_placeholders(template);
    let sql = expand(
        &sql,
        dialect,
        registry.macros(),
        registry.options().max_macro_expansions,
    )?;
    let sql = resolve_identifiers(&sql, dialect, registry);
    trace!("render [{}] {} -> {}", dialect, template, sql);
    Ok(sql)
}

/// Renders `template` and binds `args` for `dialect` in one step.
pub fn prepare(
    template: &str,
    args: Vec<Value>,
    dialect: Dialect,
    registry: &Registry,
) -> Result<Prepared> {
    let sql = render(template, dialect, registry)?;
    let (sql, args) = rebind(&sql, args, dialect)?;
    Ok(Prepared { sql, args })
}
