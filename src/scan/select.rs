use crate::registry::ModelInfo;

/// Projection of every field of `model`, aliased `q{offset}`, `q{offset+1}`, ...
///
/// Without `alias` each item is table qualified (`[!Model.field] AS q0`);
/// with one it is qualified by the alias (`a.[Model.field] AS q0`). The
/// items are templates and still go through identifier resolution. Pair the
/// result with [`ColumnBinding::by_model`](crate::scan::record::ColumnBinding::by_model)
/// using the same offset.
pub fn select_list(model: &ModelInfo, alias: Option<&str>, offset: usize) -> Vec<String> {
    model
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| match alias {
            Some(a) => format!("{}.[{}.{}] AS q{}", a, model.model_name, f.name, offset + i),
            None => format!("[!{}.{}] AS q{}", model.model_name, f.name, offset + i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldInfo, Registry};
    use crate::tpl::ident::resolve_identifiers;
    use crate::udbc::dialect::Dialect;

    fn user() -> ModelInfo {
        ModelInfo::new("User", "users")
            .field(FieldInfo::new("id", "user_id"))
            .field(FieldInfo::new("name", "user_name"))
    }

    #[test]
    fn test_select_list() {
        assert_eq!(
            select_list(&user(), None, 0),
            vec!["[!User.id] AS q0", "[!User.name] AS q1"]
        );
        assert_eq!(
            select_list(&user(), Some("u"), 2),
            vec!["u.[User.id] AS q2", "u.[User.name] AS q3"]
        );
    }

    #[test]
    fn test_select_list_resolves() {
        let registry = Registry::builder().add_model(user()).build().unwrap();
        let sql = resolve_identifiers(
            &select_list(&user(), Some("u"), 0).join(", "),
            Dialect::Named,
            &registry,
        );
        assert_eq!(sql, "u.[user_id] AS q0, u.[user_name] AS q1");
    }
}
