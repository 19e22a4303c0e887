use super::field::Field;
use super::integrity::IntegrityRule;
use super::stage::StageMap;
use crate::constants::{DEFAULT_API_SCOPE, DEFAULT_DATA_SCOPE, DEFAULT_ID_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A compiled model: one type declaration of the schema document.
///
/// Only entities (marked and not embedded) participate in top-level
/// queries and referential-integrity targets; embedded models exist
/// solely inside an owning entity's representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,

    /// Storage key; defaults to the declared name
    pub key: String,

    /// Declared name of the primary-key field
    pub id_field: String,

    #[serde(default)]
    pub is_marked_model: bool,

    #[serde(default)]
    pub is_embedded: bool,

    #[serde(default)]
    pub is_entity: bool,

    pub is_persistable: bool,

    /// Capability scopes; zeroed for models never marked as entities
    pub data_scope: String,
    pub api_scope: String,

    /// Name of the data-source binding this model stores into
    pub source: Option<String>,

    pub fields: BTreeMap<String, Field>,

    #[serde(default)]
    pub pipelines: StageMap,

    #[serde(default)]
    pub referential_integrity: Vec<IntegrityRule>,
}

impl Model {
    pub(crate) fn new(name: &str, source: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            key: name.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            is_marked_model: false,
            is_embedded: false,
            is_entity: false,
            is_persistable: true,
            data_scope: DEFAULT_DATA_SCOPE.to_string(),
            api_scope: DEFAULT_API_SCOPE.to_string(),
            source,
            fields: BTreeMap::new(),
            pipelines: StageMap::default(),
            referential_integrity: Vec::new(),
        }
    }

    /// The field named by `id_field`, when declared.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.get(&self.id_field)
    }

    /// Storage key of the primary-key field, falling back to the
    /// declared id-field name when that field is absent.
    pub fn primary_key_key(&self) -> &str {
        self.primary_key().map_or(&self.id_field, |f| &f.key)
    }
}
