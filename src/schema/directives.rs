//! Directive resolution.
//!
//! Each `(directive, argument)` pair maps onto exactly one tagged
//! update operation: a structural metadata assignment (last write
//! wins) or a pipeline append (declaration order preserved, list
//! arguments flattened, falsy entries dropped). Unknown combinations
//! resolve to no update and are dropped silently, which tolerates
//! incremental schema authoring.
//!
//! Two directives act by name alone: `@model` marks its model a
//! persistable-entity candidate and `@index` opens an index bound to
//! it.

use crate::config::CompilerConfig;
use crate::schema::types::{DeleteAction, Model, StageKind};
use crate::schema::walker::{FieldBuilder, IndexBuilder};
use graphql_parser::schema::{Directive, Value as AstValue};
use serde_json::Value;

/// A single update derived from one directive argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DirectiveUpdate {
    IdField(String),
    ModelKey(String),
    Source(String),
    Embedded(bool),
    ModelPersist(bool),
    DataScope(String),
    ApiScope(String),
    FieldKey(String),
    DefaultValue(Value),
    FieldPersist(bool),
    OnDelete(DeleteAction),
    LinkBy(String),
    PipelineAppend(StageKind, Vec<String>),
}

/// Resolves one `(directive, argument)` pair on the given target kind.
/// Returns `None` for unknown or malformed combinations.
pub(crate) fn resolve_update(
    directive: &str,
    on_field: bool,
    argument: &str,
    value: &AstValue<'_, String>,
) -> Option<DirectiveUpdate> {
    match (directive, on_field, argument) {
        ("model", false, "id") => string_value(value).map(DirectiveUpdate::IdField),
        ("model", false, "key") => string_value(value).map(DirectiveUpdate::ModelKey),
        ("model", false, "source") => string_value(value).map(DirectiveUpdate::Source),
        ("model", false, "embed") => bool_value(value).map(DirectiveUpdate::Embedded),
        ("model", false, "persist") => bool_value(value).map(DirectiveUpdate::ModelPersist),
        // a null scope zeroes the capability
        ("model", false, "dataScope") => Some(DirectiveUpdate::DataScope(
            string_value(value).unwrap_or_default(),
        )),
        ("model", false, "apiScope") => Some(DirectiveUpdate::ApiScope(
            string_value(value).unwrap_or_default(),
        )),
        ("field", true, "key") => string_value(value).map(DirectiveUpdate::FieldKey),
        ("field", true, "default") => Some(DirectiveUpdate::DefaultValue(json_value(value))),
        ("field", true, "persist") => bool_value(value).map(DirectiveUpdate::FieldPersist),
        ("field", true, "onDelete") => string_value(value)
            .as_deref()
            .and_then(DeleteAction::from_name)
            .map(DirectiveUpdate::OnDelete),
        ("link", true, "by") => string_value(value).map(DirectiveUpdate::LinkBy),
        _ => StageKind::from_name(argument)
            .map(|kind| DirectiveUpdate::PipelineAppend(kind, string_list(value))),
    }
}

pub(crate) fn apply_model_directive(
    model: &mut Model,
    indexes: &mut Vec<IndexBuilder>,
    directive: &Directive<'_, String>,
    config: &CompilerConfig,
) {
    if directive.name == "model" {
        model.is_marked_model = true;
    }
    if directive.name == "index" {
        let mut index = IndexBuilder {
            model: model.name.clone(),
            ..IndexBuilder::default()
        };
        for (argument, value) in &directive.arguments {
            match argument.as_str() {
                "name" => index.name = string_value(value),
                "type" => index.index_type = string_value(value),
                "on" => index.on = string_list(value),
                _ => {}
            }
        }
        indexes.push(index);
        return;
    }

    for (argument, value) in &directive.arguments {
        let Some(update) = resolve_update(&directive.name, false, argument, value) else {
            continue;
        };
        match update {
            DirectiveUpdate::IdField(v) => model.id_field = v,
            DirectiveUpdate::ModelKey(v) => model.key = v,
            DirectiveUpdate::Source(v) => {
                // an unknown binding leaves the model unbound
                model.source = config.sources.contains_key(&v).then_some(v);
            }
            DirectiveUpdate::Embedded(v) => model.is_embedded = v,
            DirectiveUpdate::ModelPersist(v) => model.is_persistable = v,
            DirectiveUpdate::DataScope(v) => model.data_scope = v,
            DirectiveUpdate::ApiScope(v) => model.api_scope = v,
            DirectiveUpdate::PipelineAppend(kind, names) => model.pipelines.append(kind, names),
            // field-scoped updates cannot apply to a model
            _ => {}
        }
    }
}

pub(crate) fn apply_field_directive(builder: &mut FieldBuilder, directive: &Directive<'_, String>) {
    for (argument, value) in &directive.arguments {
        let Some(update) = resolve_update(&directive.name, true, argument, value) else {
            continue;
        };
        match update {
            DirectiveUpdate::FieldKey(v) => builder.field.key = v,
            DirectiveUpdate::DefaultValue(v) => builder.field.default_value = Some(v),
            DirectiveUpdate::FieldPersist(v) => builder.persist = Some(v),
            DirectiveUpdate::OnDelete(op) => builder.field.on_delete = Some(op),
            DirectiveUpdate::LinkBy(v) => {
                builder.field.fk_field = Some(v);
                builder.field.is_virtual = true;
            }
            DirectiveUpdate::PipelineAppend(kind, names) => {
                builder.field.pipelines.append(kind, names);
            }
            _ => {}
        }
    }
}

fn string_value(value: &AstValue<'_, String>) -> Option<String> {
    match value {
        AstValue::String(s) => Some(s.clone()),
        AstValue::Enum(s) => Some(s.clone()),
        _ => None,
    }
}

fn bool_value(value: &AstValue<'_, String>) -> Option<bool> {
    match value {
        AstValue::Boolean(b) => Some(*b),
        _ => None,
    }
}

/// Flattens a scalar or list argument into stage names, dropping falsy
/// entries (nulls, `false`, empty strings).
fn string_list(value: &AstValue<'_, String>) -> Vec<String> {
    match value {
        AstValue::List(items) => items.iter().filter_map(string_entry).collect(),
        single => string_entry(single).into_iter().collect(),
    }
}

fn string_entry(value: &AstValue<'_, String>) -> Option<String> {
    match value {
        AstValue::String(s) | AstValue::Enum(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_value(value: &AstValue<'_, String>) -> Value {
    match value {
        AstValue::Int(n) => n
            .as_i64()
            .map_or(Value::Null, |i| Value::Number(i.into())),
        AstValue::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
        AstValue::String(s) => Value::String(s.clone()),
        AstValue::Boolean(b) => Value::Bool(*b),
        AstValue::Null => Value::Null,
        AstValue::Enum(s) => Value::String(s.clone()),
        AstValue::List(items) => Value::Array(items.iter().map(json_value).collect()),
        AstValue::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_value(v)))
                .collect(),
        ),
        AstValue::Variable(_) => Value::Null,
    }
}
