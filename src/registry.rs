use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::Result;
use crate::error::DbError;
use crate::scan::record::{Record, RecordLayout};
use crate::tpl::macros::{MacroDef, MacroTable};

/// Default cap on macro substitutions performed while rendering one template.
pub const DEFAULT_MAX_MACRO_EXPANSIONS: usize = 1024;

/// Tunables for the rewrite engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound on macro substitutions per template; guards against macro
    /// sets whose output keeps producing new calls.
    pub max_macro_expansions: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_macro_expansions: DEFAULT_MAX_MACRO_EXPANSIONS,
        }
    }
}

/// Mapping of one logical field to its physical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Logical name used in `[Model.field]` references.
    pub name: String,
    /// Physical column name.
    pub column: String,
    pub primary: bool,
    pub auto_increment: bool,
    pub tags: Vec<String>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            primary: false,
            auto_increment: false,
            tags: Vec::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Table metadata of a registered model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub model_name: String,
    pub table_name: String,
    fields: Vec<FieldInfo>,
    by_name: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
}

impl ModelInfo {
    pub fn new(model_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            table_name: table_name.into(),
            fields: Vec::new(),
            by_name: HashMap::new(),
            by_column: HashMap::new(),
        }
    }

    /// Appends a field. Field order must match the record's field order.
    pub fn field(mut self, field: FieldInfo) -> Self {
        let index = self.fields.len();
        self.by_name.insert(field.name.clone(), index);
        self.by_column.insert(field.column.clone(), index);
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldInfo> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldInfo> {
        self.by_column.get(column).map(|&i| &self.fields[i])
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.primary)
    }

    /// Fields carrying any of `tags`. The pseudo tags `primary` and
    /// `autoincrement` select by flag.
    pub fn fields_with_tag(&self, tags: &[&str]) -> Vec<&FieldInfo> {
        self.fields
            .iter()
            .filter(|f| {
                tags.iter().any(|&t| {
                    (t == "primary" && f.primary)
                        || (t == "autoincrement" && f.auto_increment)
                        || f.has_tag(t)
                })
            })
            .collect()
    }
}

/// A record type backed by a table.
pub trait Model: Record {
    fn model_info() -> ModelInfo;
}

/// Single-threaded build phase of a [`Registry`].
///
/// All models, record layouts and custom macros must be added here; the
/// resulting registry is read-only and may be shared across threads.
#[derive(Default)]
pub struct RegistryBuilder {
    models: HashMap<String, Arc<ModelInfo>>,
    layouts: HashMap<TypeId, Arc<RecordLayout>>,
    macros: MacroTable,
    options: EngineOptions,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model and the record layout of its type.
    pub fn model<M: Model>(self) -> Self {
        self.add_model(M::model_info()).record::<M>()
    }

    /// Registers model metadata without a backing record type.
    pub fn add_model(mut self, info: ModelInfo) -> Self {
        if self.models.contains_key(&info.model_name) {
            self.errors
                .push(format!("model '{}' registered twice", info.model_name));
            return self;
        }
        debug!(
            "register model {} -> table {} ({} fields)",
            info.model_name,
            info.table_name,
            info.fields.len()
        );
        self.models.insert(info.model_name.clone(), Arc::new(info));
        self
    }

    /// Precomputes the column-name lookup of a record type.
    pub fn record<R: Record>(mut self) -> Self {
        self.layouts
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Arc::new(RecordLayout::of::<R>()));
        self
    }

    /// Adds or replaces a macro.
    pub fn macro_def(mut self, def: MacroDef) -> Self {
        self.macros.register(def);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Registry> {
        if !self.errors.is_empty() {
            return Err(DbError::Registry(self.errors.join("; ")));
        }
        Ok(Registry {
            models: self.models,
            layouts: self.layouts,
            macros: self.macros,
            options: self.options,
        })
    }
}

/// Immutable model registry consulted by the rewrite engine and the row mapper.
#[derive(Default)]
pub struct Registry {
    models: HashMap<String, Arc<ModelInfo>>,
    layouts: HashMap<TypeId, Arc<RecordLayout>>,
    macros: MacroTable,
    options: EngineOptions,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn model(&self, name: &str) -> Option<&Arc<ModelInfo>> {
        self.models.get(name)
    }

    pub fn model_of<M: Model>(&self) -> Option<&Arc<ModelInfo>> {
        self.models.get(M::record_name())
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Layout registered for `R`, or a freshly computed one.
    pub fn layout<R: Record>(&self) -> Arc<RecordLayout> {
        self.layouts
            .get(&TypeId::of::<R>())
            .cloned()
            .unwrap_or_else(|| Arc::new(RecordLayout::of::<R>()))
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}
