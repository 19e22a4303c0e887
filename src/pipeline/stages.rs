//! Built-in pipeline stages.
//!
//! The assembler injects these around custom stages: `$id` is prepended
//! to `serialize` for primary-key and FK-reference fields, `required`
//! is appended to `validate` for required persistable fields, and
//! `ensureId` runs absolutely last on FK references.

use crate::constants::DEFAULT_ID_FIELD;
use crate::error::DataGraphError;
use crate::pipeline::{PipelineStage, StageContext, StageOutcome};
use crate::query::types::CrudKind;
use async_trait::async_trait;
use serde_json::Value;

/// Identity serialization for primary-key and foreign-key fields.
///
/// Collapses an object reference to the bare identifier stored under
/// the target model's id field; scalars pass through untouched.
pub struct IdSerializeStage;

#[async_trait]
impl PipelineStage for IdSerializeStage {
    async fn apply(&self, ctx: StageContext<'_>) -> Result<StageOutcome, DataGraphError> {
        let Some(value) = ctx.value else {
            return Ok(StageOutcome::Unchanged);
        };
        let id_name = ctx
            .schema
            .field_model(ctx.field)
            .map_or(DEFAULT_ID_FIELD, |model| model.id_field.as_str());
        Ok(match collapse(value, id_name) {
            Some(collapsed) => StageOutcome::Replace(collapsed),
            None => StageOutcome::Unchanged,
        })
    }
}

fn collapse(value: &Value, id_name: &str) -> Option<Value> {
    match value {
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| collapse(item, id_name).unwrap_or_else(|| item.clone()))
                .collect(),
        )),
        Value::Object(map) => map.get(id_name).or_else(|| map.get(DEFAULT_ID_FIELD)).cloned(),
        _ => None,
    }
}

/// Rejects missing values on required fields.
///
/// On create, an unset or null value fails; on update only an explicit
/// null fails, so sparse updates stay legal.
pub struct RequiredStage;

#[async_trait]
impl PipelineStage for RequiredStage {
    async fn apply(&self, ctx: StageContext<'_>) -> Result<StageOutcome, DataGraphError> {
        let missing = match ctx.crud {
            CrudKind::Create => ctx.value.map_or(true, Value::is_null),
            CrudKind::Update => matches!(ctx.value, Some(Value::Null)),
            CrudKind::Delete | CrudKind::Read => false,
        };
        if missing {
            return Err(DataGraphError::Validation(format!(
                "missing required field `{}` on `{}`",
                ctx.path_string(),
                ctx.model.name
            )));
        }
        Ok(StageOutcome::Unchanged)
    }
}

/// Ensures a foreign-key value resolved to an identifier.
///
/// Runs after identity serialization; an object that survived to this
/// point never collapsed to an id and is rejected. Unset and null pass,
/// requiredness is a separate concern.
pub struct EnsureIdStage;

#[async_trait]
impl PipelineStage for EnsureIdStage {
    async fn apply(&self, ctx: StageContext<'_>) -> Result<StageOutcome, DataGraphError> {
        if let Some(value) = ctx.value {
            if offending(value) {
                return Err(DataGraphError::Validation(format!(
                    "field `{}` on `{}` did not resolve to an identifier",
                    ctx.path_string(),
                    ctx.model.name
                )));
            }
        }
        Ok(StageOutcome::Unchanged)
    }
}

fn offending(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(offending),
        _ => false,
    }
}
