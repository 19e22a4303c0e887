use super::stage::StageMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How deleting a referenced record affects the referencing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    Cascade,
    Nullify,
    Restrict,
    Defer,
}

impl DeleteAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cascade" => Some(DeleteAction::Cascade),
            "nullify" => Some(DeleteAction::Nullify),
            "restrict" => Some(DeleteAction::Restrict),
            "defer" => Some(DeleteAction::Defer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeleteAction::Cascade => "cascade",
            DeleteAction::Nullify => "nullify",
            DeleteAction::Restrict => "restrict",
            DeleteAction::Defer => "defer",
        }
    }
}

/// How a foreign-key field's owning record relates to its target record
/// during query preparation: join `to` the target's storage collection,
/// matching `on` the target key against the owning side's `from` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDescriptor {
    pub to: String,
    pub on: String,
    pub from: String,
}

/// A single field of a [`Model`](super::Model).
///
/// Created mutable during the document walk, finalized by the deferred
/// worklists, then frozen. `join` is set iff `is_fk_reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    /// Storage key; defaults to the declared name
    pub key: String,

    /// Declared type name: a scalar or another model's name
    pub declared_type: String,

    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub is_required: bool,

    /// Whether non-null wraps the element type inside a list
    #[serde(default)]
    pub is_array_required: bool,

    #[serde(default)]
    pub is_primary_key: bool,

    /// Computed: the declared type resolves to another marked,
    /// non-embedded model and this field is not the primary key
    #[serde(default)]
    pub is_fk_reference: bool,

    /// Inverse link resolved through an explicit target field
    #[serde(default)]
    pub is_virtual: bool,

    pub is_persistable: bool,

    /// Join-column override from `@link(by: ...)`
    pub fk_field: Option<String>,

    pub join: Option<JoinDescriptor>,

    pub on_delete: Option<DeleteAction>,

    pub default_value: Option<Value>,

    /// Name of the resolved target model, if the declared type resolved
    /// to one; unresolved references stay `None` and the field is
    /// treated as opaque
    pub model_ref: Option<String>,

    #[serde(default)]
    pub pipelines: StageMap,
}

impl Field {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: name.to_string(),
            declared_type: String::new(),
            is_array: false,
            is_required: false,
            is_array_required: false,
            is_primary_key: false,
            is_fk_reference: false,
            is_virtual: false,
            is_persistable: true,
            fk_field: None,
            join: None,
            on_delete: None,
            default_value: None,
            model_ref: None,
            pipelines: StageMap::default(),
        }
    }

    /// True when values of this field nest an embedded sub-object
    /// rather than a reference: the declared type resolved to a model
    /// and the field is neither an FK reference nor the primary key.
    pub fn is_embedded_link(&self) -> bool {
        self.model_ref.is_some() && !self.is_fk_reference && !self.is_primary_key
    }
}
