use std::collections::HashMap;

use crate::Result;
use crate::error::DbError;
use crate::registry::ModelInfo;
use crate::udbc::column::ColumnMeta;
use crate::udbc::value::Value;

/// A plain struct that result rows can be materialized into.
///
/// Usually derived with `#[derive(Record)]`. Field indexes follow declaration
/// order and index into [`Record::field_names`].
pub trait Record: Default + Send + 'static {
    fn record_name() -> &'static str;

    fn field_names() -> &'static [&'static str];

    /// Coerces `value` into the field at `index`. Unknown indexes are ignored.
    fn set_field(&mut self, index: usize, value: Value, column: &ColumnMeta) -> Result<()>;
}

/// Lowercases and strips `_`, `-` and spaces, so `user_name`, `UserName`
/// and `user-name` all match.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Name lookup of a record type's fields, computed once per type.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    record_name: &'static str,
    field_names: &'static [&'static str],
    by_key: HashMap<String, usize>,
}

impl RecordLayout {
    pub fn of<R: Record>() -> Self {
        let field_names = R::field_names();
        let mut by_key = HashMap::with_capacity(field_names.len());
        for (i, name) in field_names.iter().enumerate() {
            // The first of two colliding names wins.
            by_key.entry(normalize_name(name)).or_insert(i);
        }
        Self {
            record_name: R::record_name(),
            field_names,
            by_key,
        }
    }

    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        self.field_names
    }

    /// Index of the field whose normalized name equals the normalized `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_key.get(&normalize_name(name)).copied()
    }
}

/// Which record field each result column feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBinding {
    /// `(column index, field index)` pairs.
    targets: Vec<(usize, usize)>,
}

impl ColumnBinding {
    /// Binds columns to fields by normalized name. Unmatched columns are skipped.
    pub fn by_name(layout: &RecordLayout, columns: &[ColumnMeta]) -> Self {
        let targets = columns
            .iter()
            .enumerate()
            .filter_map(|(col, meta)| layout.index_of(&meta.name).map(|field| (col, field)))
            .collect();
        Self { targets }
    }

    /// Binds model field `i` to column `offset + i`, the shape produced by
    /// [`select_list`](crate::scan::select::select_list).
    pub fn by_model(layout: &RecordLayout, model: &ModelInfo, offset: usize) -> Self {
        let targets = model
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(i, f)| layout.index_of(&f.name).map(|field| (offset + i, field)))
            .collect();
        Self { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Builds an `R` from one row. Columns without a bound field are ignored.
pub fn materialize<R: Record>(
    binding: &ColumnBinding,
    mut row: Vec<Value>,
    columns: &[ColumnMeta],
) -> Result<R> {
    let mut record = R::default();
    let unnamed = ColumnMeta::default();

    for &(col, field) in &binding.targets {
        let Some(cell) = row.get_mut(col) else {
            continue;
        };
        let value = std::mem::replace(cell, Value::Null);
        let meta = columns.get(col).unwrap_or(&unnamed);

        record
            .set_field(field, value, meta)
            .map_err(|e| DbError::Field {
                field: format!(
                    "{}.{}",
                    R::record_name(),
                    R::field_names().get(field).copied().unwrap_or("?")
                ),
                source: Box::new(e),
            })?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldInfo;
    use crate::scan::coerce::coerce;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        id: i64,
        user_name: String,
        balance: f64,
    }

    impl Record for Account {
        fn record_name() -> &'static str {
            "Account"
        }

        fn field_names() -> &'static [&'static str] {
            &["id", "user_name", "balance"]
        }

        fn set_field(&mut self, index: usize, value: Value, column: &ColumnMeta) -> Result<()> {
            match index {
                0 => coerce(&mut self.id, value, column),
                1 => coerce(&mut self.user_name, value, column),
                2 => coerce(&mut self.balance, value, column),
                _ => Ok(()),
            }
        }
    }

    fn columns(names: &[&str]) -> Vec<ColumnMeta> {
        names.iter().map(|n| ColumnMeta::new(*n)).collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("User_Name"), "username");
        assert_eq!(normalize_name("user-name "), "username");
    }

    #[test]
    fn test_materialize_by_name() {
        let layout = RecordLayout::of::<Account>();
        let cols = columns(&["ID", "UserName", "extra", "balance"]);
        let binding = ColumnBinding::by_name(&layout, &cols);

        let account: Account = materialize(
            &binding,
            vec![
                Value::I32(3),
                Value::Str("bob".into()),
                Value::Str("ignored".into()),
                Value::I64(10),
            ],
            &cols,
        )
        .unwrap();
        assert_eq!(
            account,
            Account {
                id: 3,
                user_name: "bob".into(),
                balance: 10.0
            }
        );
    }

    #[test]
    fn test_materialize_by_model_offset() {
        let layout = RecordLayout::of::<Account>();
        let model = ModelInfo::new("Account", "accounts")
            .field(FieldInfo::new("id", "acc_id"))
            .field(FieldInfo::new("balance", "bal"));
        let binding = ColumnBinding::by_model(&layout, &model, 1);
        let cols = columns(&["other", "q1", "q2"]);

        let account: Account = materialize(
            &binding,
            vec![Value::Str("x".into()), Value::I64(8), Value::F32(2.5)],
            &cols,
        )
        .unwrap();
        assert_eq!(account.id, 8);
        assert_eq!(account.balance, 2.5);
        assert_eq!(account.user_name, "");
    }

    #[test]
    fn test_failure_names_the_field() {
        let layout = RecordLayout::of::<Account>();
        let cols = columns(&["balance"]);
        let binding = ColumnBinding::by_name(&layout, &cols);

        let err = materialize::<Account>(&binding, vec![Value::Str("lots".into())], &cols)
            .unwrap_err();
        match err {
            DbError::Field { field, source } => {
                assert_eq!(field, "Account.balance");
                assert!(matches!(*source, DbError::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
