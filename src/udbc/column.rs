/// Metadata the database client reports for one result column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared database type name, when the client exposes one.
    pub type_name: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Currency columns deliver their payload as a decimal literal in raw bytes.
    pub fn is_currency(&self) -> bool {
        self.type_name.as_deref().is_some_and(|t| {
            t.eq_ignore_ascii_case("MONEY") || t.eq_ignore_ascii_case("SMALLMONEY")
        })
    }
}
