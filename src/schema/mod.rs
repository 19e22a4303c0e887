//! # Schema Compiler
//!
//! Compiles a declarative schema document into the frozen [`Schema`]
//! metadata graph: models, fields, primary keys, foreign-key joins,
//! indexes, referential-integrity rules, and per-field/per-model
//! ordered pipeline configurations.
//!
//! ## Components
//!
//! * `decorator` - optional directive-fragment merge run before parsing
//! * `walker` - single depth-first enter/leave pass over the document
//! * `directives` - typed `(directive, argument)` dispatch mutating the
//!   in-flight records
//! * `assembler` - deferred worklists, post-passes, and the freeze
//! * `types` - the metadata model itself
//!
//! Compilation runs once at startup; the output is immutable and safe
//! for unrestricted concurrent reads.

pub mod assembler;
pub mod decorator;
pub mod directives;
pub mod types;
pub mod walker;

// Re-export all types at the schema module level
pub use types::{
    DeleteAction, Field, IndexDefinition, IntegrityRule, JoinDescriptor, KeyKind, Model,
    PathTarget, Schema, SchemaError, StageKind, StageMap,
};

use crate::config::CompilerConfig;
use assembler::SchemaAssembler;
use decorator::Decorator;
use log::info;
use walker::DocumentWalker;

/// Compiles the configured schema document into a frozen [`Schema`].
///
/// # Errors
/// Returns a `SchemaError` if the document fails to parse. Unresolved
/// type references and malformed directive arguments are absorbed
/// permissively rather than raised.
pub fn compile(config: &CompilerConfig) -> Result<Schema, SchemaError> {
    let type_defs = Decorator::new(config).decorate()?;
    let output = DocumentWalker::new(config).walk(&type_defs)?;
    let schema = SchemaAssembler::assemble(output);
    info!(
        "compiled schema: {} models, {} indexes",
        schema.models.len(),
        schema.indexes.len()
    );
    Ok(schema)
}
