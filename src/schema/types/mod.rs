pub mod errors;
pub mod field;
pub mod index;
pub mod integrity;
pub mod model;
pub mod schema;
pub mod stage;

// Re-export all types at the schema::types module level
pub use errors::SchemaError;
pub use field::{DeleteAction, Field, JoinDescriptor};
pub use index::IndexDefinition;
pub use integrity::IntegrityRule;
pub use model::Model;
pub use schema::{KeyKind, PathTarget, Schema};
pub use stage::{StageKind, StageMap};
