//! Pipeline-driven payload transformation.
//!
//! Runs one pass per payload tree (`input` or `where`) against the
//! model metadata. Every declared field is visited on `input` even when
//! omitted from the payload, so default substitution and required
//! checks always fire; the `where` template covers only fields carrying
//! an `instruct` stage, which lets those stages inject predicate values
//! that were never supplied. Unknown keys pass through unchanged.
//!
//! Embedded sub-objects (a field whose declared type resolved to a
//! model and which is neither an FK reference nor the primary key)
//! recurse depth-first with the linked model, extending the path.

use crate::error::DataGraphError;
use crate::pipeline::{StageContext, StageOutcome, StageRegistry};
use crate::query::types::{CrudKind, QueryDescriptor, TransformTarget};
use crate::schema::types::{Field, Model, Schema, StageKind};
use futures::future::BoxFuture;
use serde_json::{Map, Number, Value};

/// One step of a transformation pass.
///
/// The built-in steps act directly; a `Stages` step dispatches the
/// field's configured stage-name list of that kind through the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineStep {
    DefaultValue,
    CastValue,
    EnsureArray,
    Stages(StageKind),
}

fn input_steps(crud: CrudKind) -> Vec<PipelineStep> {
    let mut steps = vec![
        PipelineStep::DefaultValue,
        PipelineStep::CastValue,
        PipelineStep::EnsureArray,
        PipelineStep::Stages(StageKind::Normalize),
        PipelineStep::Stages(StageKind::Instruct),
    ];
    if let Some(kind) = crud.stage_kind() {
        steps.push(PipelineStep::Stages(kind));
    }
    steps.extend([
        PipelineStep::Stages(StageKind::Serialize),
        PipelineStep::Stages(StageKind::Transform),
        PipelineStep::Stages(StageKind::Validate),
    ]);
    steps
}

fn where_steps() -> Vec<PipelineStep> {
    vec![
        PipelineStep::CastValue,
        PipelineStep::Stages(StageKind::Instruct),
        PipelineStep::Stages(StageKind::Serialize),
    ]
}

/// Per-request pipeline runner.
pub struct QueryTransformer<'a> {
    schema: &'a Schema,
    registry: &'a StageRegistry,
    query: Option<&'a QueryDescriptor>,
    context: Option<&'a Value>,
}

impl<'a> QueryTransformer<'a> {
    pub fn new(schema: &'a Schema, registry: &'a StageRegistry) -> Self {
        Self {
            schema,
            registry,
            query: None,
            context: None,
        }
    }

    /// Attaches the originating request descriptor, handed through to
    /// every stage.
    pub fn with_query(mut self, query: &'a QueryDescriptor) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_context(mut self, context: &'a Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Runs one pass over a payload tree.
    pub async fn transform(
        &self,
        crud: CrudKind,
        target: TransformTarget,
        model: &'a Model,
        data: Value,
    ) -> Result<Value, DataGraphError> {
        let steps = match target {
            TransformTarget::Input => input_steps(crud),
            TransformTarget::Where => where_steps(),
        };
        self.transform_node(crud, target, model, data, Vec::new(), &steps)
            .await
    }

    fn transform_node<'s>(
        &'s self,
        crud: CrudKind,
        target: TransformTarget,
        model: &'s Model,
        data: Value,
        path: Vec<String>,
        steps: &'s [PipelineStep],
    ) -> BoxFuture<'s, Result<Value, DataGraphError>> {
        Box::pin(async move {
            match data {
                Value::Array(items) => {
                    // element order is significant in the result
                    let mut out = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        let mut item_path = path.clone();
                        item_path.push(index.to_string());
                        out.push(
                            self.transform_node(crud, target, model, item, item_path, steps)
                                .await?,
                        );
                    }
                    Ok(Value::Array(out))
                }
                Value::Object(map) => {
                    self.transform_doc(crud, target, model, map, path, steps)
                        .await
                }
                other => Ok(other),
            }
        })
    }

    async fn transform_doc(
        &self,
        crud: CrudKind,
        target: TransformTarget,
        model: &Model,
        mut map: Map<String, Value>,
        path: Vec<String>,
        steps: &[PipelineStep],
    ) -> Result<Value, DataGraphError> {
        // Merge the payload onto the pass template so templated fields
        // are visited even when absent.
        let mut doc: Vec<(String, Option<Value>)> = Vec::new();
        for (name, field) in &model.fields {
            let templated = match target {
                TransformTarget::Input => true,
                TransformTarget::Where => field.pipelines.has(StageKind::Instruct),
            };
            if templated {
                doc.push((name.clone(), map.remove(name)));
            }
        }
        for (key, value) in map {
            doc.push((key, Some(value)));
        }

        let mut out = Map::new();
        for (key, start) in doc {
            let lookup = match target {
                TransformTarget::Input => key.as_str(),
                // dotted filter keys locate the field by first segment
                TransformTarget::Where => key.split('.').next().unwrap_or(key.as_str()),
            };
            let Some(field) = model.fields.get(lookup) else {
                // unknown keys pass through, namespace preserved
                if let Some(value) = start {
                    out.insert(key, value);
                }
                continue;
            };

            let mut item_path = path.clone();
            item_path.push(key.clone());

            let mut value = start.clone();
            for step in steps {
                match *step {
                    PipelineStep::DefaultValue => {
                        if value.is_none() {
                            value = field.default_value.clone();
                        }
                    }
                    PipelineStep::CastValue => {
                        if let Some(current) = value.take() {
                            value = Some(cast_value(field, current));
                        }
                    }
                    PipelineStep::EnsureArray => {
                        if field.is_array {
                            if let Some(current) = value.take() {
                                value = Some(if current.is_array() {
                                    current
                                } else {
                                    Value::Array(vec![current])
                                });
                            }
                        }
                    }
                    PipelineStep::Stages(kind) => {
                        for name in field.pipelines.get(kind) {
                            let stage = self.registry.get(name).ok_or_else(|| {
                                DataGraphError::Config(format!(
                                    "pipeline stage `{}` referenced by `{}.{}` is not registered",
                                    name, model.name, field.name
                                ))
                            })?;
                            let ctx = StageContext {
                                query: self.query,
                                crud,
                                target,
                                path: &item_path,
                                schema: self.schema,
                                model,
                                field,
                                value: value.as_ref(),
                                start_value: start.as_ref(),
                                context: self.context,
                            };
                            match stage.apply(ctx).await? {
                                StageOutcome::Replace(replacement) => value = Some(replacement),
                                StageOutcome::Unchanged => {}
                            }
                        }
                    }
                }
            }

            // embedded sub-object: delegate to the linked model
            if field.is_embedded_link() {
                if let Some(sub_model) = self.schema.field_model(field) {
                    if let Some(current) = value.take() {
                        value = Some(
                            self.transform_node(
                                crud,
                                target,
                                sub_model,
                                current,
                                item_path.clone(),
                                steps,
                            )
                            .await?,
                        );
                    }
                }
            }

            // values still unset after the pass are omitted
            if let Some(resolved) = value {
                out.insert(field.name.clone(), resolved);
            }
        }
        Ok(Value::Object(out))
    }
}

/// Coerces scalar payload values toward the field's declared type.
/// Unparseable values are left untouched for the validate stages.
fn cast_value(field: &Field, value: Value) -> Value {
    if let Value::Array(items) = value {
        return Value::Array(
            items
                .into_iter()
                .map(|item| cast_scalar(field, item))
                .collect(),
        );
    }
    cast_scalar(field, value)
}

fn cast_scalar(field: &Field, value: Value) -> Value {
    match field.declared_type.as_str() {
        "String" | "ID" => match value {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        },
        "Int" => {
            if let Value::String(s) = &value {
                if let Ok(n) = s.trim().parse::<i64>() {
                    return Value::Number(n.into());
                }
            }
            value
        }
        "Float" => {
            if let Value::String(s) = &value {
                if let Some(n) = s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                    return Value::Number(n);
                }
            }
            value
        }
        "Boolean" => match value {
            Value::String(s) if s == "true" => Value::Bool(true),
            Value::String(s) if s == "false" => Value::Bool(false),
            other => other,
        },
        _ => value,
    }
}

/// Expands dotted keys into nested objects, deep-merging siblings.
/// Run over `where` payloads before the pass.
pub(crate) fn unflatten(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        insert_dotted(&mut out, &key, value);
    }
    out
}

fn insert_dotted(target: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            // a scalar already stored under `head` wins over the dotted key
            if let Value::Object(inner) = slot {
                insert_dotted(inner, rest, value);
            }
        }
        None => {
            let merge = matches!(target.get(key), Some(Value::Object(_))) && value.is_object();
            if merge {
                if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                    (target.get_mut(key), value)
                {
                    for (k, v) in incoming {
                        insert_dotted(existing, &k, v);
                    }
                }
            } else {
                target.insert(key.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_unflatten_expands_dotted_keys() {
        let map = obj(json!({"author.name": "Frank", "author.bio": "x", "title": "Dune"}));
        let out = unflatten(map);
        assert_eq!(
            Value::Object(out),
            json!({"author": {"name": "Frank", "bio": "x"}, "title": "Dune"})
        );
    }

    #[test]
    fn test_unflatten_merges_with_existing_objects() {
        let map = obj(json!({"author": {"name": "Frank"}, "author.bio": "x"}));
        let out = unflatten(map);
        assert_eq!(
            Value::Object(out),
            json!({"author": {"name": "Frank", "bio": "x"}})
        );
    }

    #[test]
    fn test_cast_scalar_coercions() {
        let mut field = Field::new("n");
        field.declared_type = "Int".to_string();
        assert_eq!(cast_scalar(&field, json!("42")), json!(42));
        assert_eq!(cast_scalar(&field, json!("nope")), json!("nope"));

        field.declared_type = "String".to_string();
        assert_eq!(cast_scalar(&field, json!(7)), json!("7"));

        field.declared_type = "Boolean".to_string();
        assert_eq!(cast_scalar(&field, json!("true")), json!(true));
    }
}
