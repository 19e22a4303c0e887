use super::field::DeleteAction;
use serde::{Deserialize, Serialize};

/// One referential-integrity obligation: deleting an instance
/// referenced by `field` must apply `op` to `model`.
///
/// `field_ref` threads the rule through intermediate embedded models to
/// the nearest enclosing entity: it names the embedded field under
/// which the referencing field lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityRule {
    pub model: String,
    pub field: String,
    pub field_ref: Option<String>,
    pub is_array: bool,
    pub op: DeleteAction,
}

impl IntegrityRule {
    /// Rules are deduplicated by everything except cardinality.
    pub(crate) fn dedup_key(&self) -> (String, String, Option<String>, DeleteAction) {
        (
            self.model.clone(),
            self.field.clone(),
            self.field_ref.clone(),
            self.op,
        )
    }
}
