//! # datagraph
//!
//! A schema-first data modeling and query preparation engine.
//!
//! `datagraph` compiles a declarative schema document (GraphQL-style
//! type declarations annotated with argument-bearing directives) into a
//! frozen metadata graph describing models, fields, primary keys,
//! foreign-key joins, indexes, and ordered data-transformation
//! pipelines. A query engine then converts imperative request
//! descriptors into storage-ready queries: values run through their
//! configured pipelines, declared field names are rewritten to storage
//! keys, filter clauses become flat predicates plus ordered join
//! descriptors, and pagination cursors are encoded and decoded.
//!
//! ## Components
//!
//! * `schema` - document walker, directive resolver, and two-phase
//!   assembler producing the frozen [`Schema`]
//! * `pipeline` - the named, ordered, asynchronous stage contract and
//!   the registry of built-in stages
//! * `query` - per-request transformation and driver-ready preparation
//! * `config` - compiler configuration (type definitions, decorator
//!   fragments, data-source bindings)
//!
//! The physical storage driver executing the prepared query and the
//! network layer invoking the engine are external collaborators.

pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod schema;

pub use config::{CompilerConfig, SourceConfig};
pub use error::{DataGraphError, DataGraphResult};
pub use pipeline::{FnStage, PipelineStage, StageContext, StageOutcome, StageRegistry};
pub use query::{
    CrudKind, JoinClause, PreparedQuery, Query, QueryDescriptor, QueryPatch, TransformTarget,
};
pub use schema::{compile, Schema};
