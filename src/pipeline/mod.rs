//! # Pipeline System
//!
//! The pipeline module defines the contract for the named, ordered,
//! asynchronous value-transformation functions the compiler wires onto
//! fields and the query transformer runs per value.
//!
//! ## Components
//!
//! * `StageContext` - everything a stage sees for one value
//! * `PipelineStage` - the capability trait a stage implements
//! * `StageRegistry` - explicit name-to-stage registry passed into the
//!   compiler and transformer; never a global lookup
//! * `stages` - the built-in stages the assembler injects
//!
//! A stage may suspend (external validation lookups); the transformer
//! completes each stage fully before feeding its result to the next
//! stage, in order, per value.

pub mod stages;

pub use stages::{EnsureIdStage, IdSerializeStage, RequiredStage};

use crate::constants::{STAGE_ENSURE_ID, STAGE_ID_SERIALIZE, STAGE_REQUIRED};
use crate::error::DataGraphError;
use crate::query::types::{CrudKind, QueryDescriptor, TransformTarget};
use crate::schema::types::{Field, Model, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Invocation context handed to a pipeline stage for one value.
///
/// `value` is the value as transformed so far, `start_value` the raw
/// value the pass began with; `None` means unset, which is distinct
/// from an explicit null. The schema reference lets stages resolve
/// linked models and paths.
pub struct StageContext<'a> {
    /// The request descriptor driving this pass, when one exists
    pub query: Option<&'a QueryDescriptor>,
    pub crud: CrudKind,
    pub target: TransformTarget,
    pub path: &'a [String],
    pub schema: &'a Schema,
    pub model: &'a Model,
    pub field: &'a Field,
    pub value: Option<&'a Value>,
    pub start_value: Option<&'a Value>,
    /// Free-form caller context threaded through the whole request
    pub context: Option<&'a Value>,
}

impl StageContext<'_> {
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// Outcome of one stage application.
pub enum StageOutcome {
    /// Replace the current value
    Replace(Value),
    /// Leave the value as it was
    Unchanged,
}

/// A named, ordered, asynchronous value-transform capability.
///
/// Stage failures (a rejected required field, a failed lookup)
/// propagate to the caller unmodified; the transformer never swallows
/// them.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    async fn apply(&self, ctx: StageContext<'_>) -> Result<StageOutcome, DataGraphError>;
}

/// Adapter wrapping a plain function as a pipeline stage.
pub struct FnStage {
    f: Box<dyn for<'a> Fn(StageContext<'a>) -> Result<StageOutcome, DataGraphError> + Send + Sync>,
}

impl FnStage {
    pub fn new(
        f: impl for<'a> Fn(StageContext<'a>) -> Result<StageOutcome, DataGraphError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { f: Box::new(f) }
    }
}

#[async_trait]
impl PipelineStage for FnStage {
    async fn apply(&self, ctx: StageContext<'_>) -> Result<StageOutcome, DataGraphError> {
        (self.f)(ctx)
    }
}

/// Registry of named stages.
///
/// Passed explicitly into the transformer; schemas reference stages by
/// name and an unregistered name surfaces as a configuration error at
/// transform time.
#[derive(Clone)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn PipelineStage>>,
}

impl StageRegistry {
    /// A registry with no stages at all, not even the built-ins.
    pub fn empty() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// A registry preloaded with the built-in stages the assembler
    /// injects into compiled schemas.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(STAGE_ID_SERIALIZE, Arc::new(IdSerializeStage));
        registry.register(STAGE_REQUIRED, Arc::new(RequiredStage));
        registry.register(STAGE_ENSURE_ID, Arc::new(EnsureIdStage));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, stage: Arc<dyn PipelineStage>) {
        self.stages.insert(name.into(), stage);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn PipelineStage>> {
        self.stages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
