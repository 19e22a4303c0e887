use crate::schema::types::StageKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operation kind of a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudKind {
    Create,
    Update,
    Delete,
    #[default]
    Read,
}

impl CrudKind {
    /// The operation-specific pipeline stage kind, if the operation
    /// carries one.
    pub fn stage_kind(self) -> Option<StageKind> {
        match self {
            CrudKind::Create => Some(StageKind::Construct),
            CrudKind::Update => Some(StageKind::Restruct),
            CrudKind::Delete => Some(StageKind::Destruct),
            CrudKind::Read => None,
        }
    }
}

/// Which payload tree a transformation pass runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformTarget {
    Input,
    Where,
}

/// Imperative request descriptor handed to the query engine.
///
/// Descriptors are never mutated; new requests are derived by shallow
/// merge through [`QueryDescriptor::merged`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub model: String,

    #[serde(default)]
    pub crud: CrudKind,

    #[serde(default)]
    pub input: Map<String, Value>,

    #[serde(default, rename = "where")]
    pub where_clause: Map<String, Value>,

    /// Field selection; `None` selects every declared field
    #[serde(default)]
    pub select: Option<Vec<String>>,

    #[serde(default)]
    pub is_cursor_paging: bool,

    /// Opaque page-boundary cursors
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,

    /// Free-form flags passed through to the driver
    #[serde(default)]
    pub flags: Map<String, Value>,
}

impl QueryDescriptor {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Shallow-merges `patch` over this descriptor, returning the
    /// derived descriptor and leaving `self` untouched.
    pub fn merged(&self, patch: QueryPatch) -> QueryDescriptor {
        let mut out = self.clone();
        if let Some(model) = patch.model {
            out.model = model;
        }
        if let Some(crud) = patch.crud {
            out.crud = crud;
        }
        if let Some(input) = patch.input {
            out.input = input;
        }
        if let Some(where_clause) = patch.where_clause {
            out.where_clause = where_clause;
        }
        if let Some(select) = patch.select {
            out.select = Some(select);
        }
        if let Some(is_cursor_paging) = patch.is_cursor_paging {
            out.is_cursor_paging = is_cursor_paging;
        }
        if let Some(before) = patch.before {
            out.before = Some(before);
        }
        if let Some(after) = patch.after {
            out.after = Some(after);
        }
        if let Some(flags) = patch.flags {
            out.flags = flags;
        }
        out
    }
}

/// Partial descriptor for deriving a new request from an existing one.
#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    pub model: Option<String>,
    pub crud: Option<CrudKind>,
    pub input: Option<Map<String, Value>>,
    pub where_clause: Option<Map<String, Value>>,
    pub select: Option<Vec<String>>,
    pub is_cursor_paging: Option<bool>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub flags: Option<Map<String, Value>>,
}

/// One join the storage driver must perform, in outer-to-inner order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub to: String,
    pub on: String,
    pub from: String,

    #[serde(rename = "where")]
    pub where_clause: Map<String, Value>,
}

/// Storage-ready query produced by the preparer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuery {
    pub model: String,

    pub crud: CrudKind,

    /// Input payload, renamed to storage keys
    pub input: Map<String, Value>,

    /// Flat predicate over storage keys, glob and containment rewritten
    #[serde(rename = "where")]
    pub where_clause: Map<String, Value>,

    pub joins: Vec<JoinClause>,

    pub select: Vec<String>,

    /// Decoded page boundaries, present only under cursor paging
    pub before: Option<Value>,
    pub after: Option<Value>,
}
