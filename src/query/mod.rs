//! # Query Engine
//!
//! Converts imperative request descriptors into storage-ready queries
//! against a frozen [`Schema`].
//!
//! ## Components
//!
//! * `types` - request descriptors and the driver-ready output shape
//! * `transformer` - per-request pipeline runner over payload trees
//! * `preparer` - join extraction, predicate flattening, storage-key
//!   renaming, cursor decoding
//! * `cursor` - opaque pagination cursor encoding
//! * `glob` - wildcard detection and regex conversion
//!
//! The `input` and `where` passes write disjoint output properties and
//! run concurrently; within a pass, mapping keys are order-independent
//! while sequence elements preserve input order.

pub mod cursor;
pub mod glob;
pub mod preparer;
pub mod transformer;
pub mod types;

pub use preparer::QueryPreparer;
pub use transformer::QueryTransformer;
pub use types::{
    CrudKind, JoinClause, PreparedQuery, QueryDescriptor, QueryPatch, TransformTarget,
};

use crate::error::DataGraphError;
use crate::pipeline::StageRegistry;
use crate::schema::types::{Model, Schema};
use serde_json::{Map, Value};

/// A per-request handle over a frozen schema.
///
/// Holds a read-only schema reference and the stage registry; derived
/// requests are produced by shallow merge, never by mutating the
/// source descriptor.
pub struct Query<'a> {
    schema: &'a Schema,
    registry: &'a StageRegistry,
    model: &'a Model,
    context: Option<Value>,
    descriptor: QueryDescriptor,
}

impl<'a> Query<'a> {
    pub fn new(
        schema: &'a Schema,
        registry: &'a StageRegistry,
        descriptor: QueryDescriptor,
    ) -> Result<Self, DataGraphError> {
        let model = schema.model(&descriptor.model).ok_or_else(|| {
            DataGraphError::Config(format!(
                "unknown model `{}` in query descriptor",
                descriptor.model
            ))
        })?;
        Ok(Self {
            schema,
            registry,
            model,
            context: None,
            descriptor,
        })
    }

    /// Attaches free-form caller context threaded into every stage.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Derives a new request by shallow-merging `patch` over this
    /// request's descriptor. The source request is left untouched.
    pub fn derive(&self, patch: QueryPatch) -> Result<Query<'a>, DataGraphError> {
        let mut derived = Query::new(self.schema, self.registry, self.descriptor.merged(patch))?;
        derived.context = self.context.clone();
        Ok(derived)
    }

    /// Runs the `input` and `where` passes, returning a transformed
    /// descriptor. The two passes are independent and run concurrently.
    pub async fn transformed(&self) -> Result<QueryDescriptor, DataGraphError> {
        let transformer =
            QueryTransformer::new(self.schema, self.registry).with_query(&self.descriptor);
        let transformer = match &self.context {
            Some(context) => transformer.with_context(context),
            None => transformer,
        };

        let input = Value::Object(self.descriptor.input.clone());
        let filter = Value::Object(transformer::unflatten(self.descriptor.where_clause.clone()));

        let (input, filter) = tokio::join!(
            transformer.transform(
                self.descriptor.crud,
                TransformTarget::Input,
                self.model,
                input,
            ),
            transformer.transform(
                self.descriptor.crud,
                TransformTarget::Where,
                self.model,
                filter,
            ),
        );

        let mut out = self.descriptor.clone();
        out.input = into_object(input?)?;
        out.where_clause = into_object(filter?)?;
        Ok(out)
    }

    /// Prepares an already transformed descriptor for the driver.
    pub fn prepare(&self, transformed: &QueryDescriptor) -> Result<PreparedQuery, DataGraphError> {
        QueryPreparer::new(self.schema).prepare(self.model, transformed)
    }

    /// Transforms and prepares in one step, yielding the driver-ready
    /// query.
    pub async fn to_driver(&self) -> Result<PreparedQuery, DataGraphError> {
        let transformed = self.transformed().await?;
        self.prepare(&transformed)
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, DataGraphError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DataGraphError::Other(
            "transformation did not produce an object".to_string(),
        )),
    }
}
