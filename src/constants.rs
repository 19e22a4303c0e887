/// Common constants used across the datagraph crate.
///
/// These defaults apply when a schema document does not override them
/// through directives.
pub const RESERVED_OPERATION_ROOTS: [&str; 3] = ["Query", "Mutation", "Subscription"];

pub const DEFAULT_ID_FIELD: &str = "id";
pub const DEFAULT_DATA_SCOPE: &str = "crud";
pub const DEFAULT_API_SCOPE: &str = "cruds";
pub const DEFAULT_SOURCE: &str = "default";

/// Names of the built-in pipeline stages injected by the assembler.
pub const STAGE_ID_SERIALIZE: &str = "$id";
pub const STAGE_REQUIRED: &str = "required";
pub const STAGE_ENSURE_ID: &str = "ensureId";

/// Operators emitted into driver-ready predicates.
pub const ARRAY_OPERATOR: &str = "$in";
pub const REGEX_OPERATOR: &str = "$regex";
