use serde::{Deserialize, Serialize};

/// A secondary-index declaration, resolved to storage keys.
///
/// `key` is the owning model's storage key and `on` lists the storage
/// keys of the indexed fields, both rewritten by the assembler's index
/// post-pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub key: String,

    pub name: Option<String>,

    #[serde(rename = "type")]
    pub index_type: Option<String>,

    pub on: Vec<String>,
}
