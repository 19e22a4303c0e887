//! Driver-ready query preparation.
//!
//! Converts a transformed filter tree into a flat predicate plus an
//! ordered list of join descriptors, rewrites declared field names to
//! storage keys, and decodes pagination cursors. The output is what a
//! physical storage driver consumes.

use crate::constants::{ARRAY_OPERATOR, REGEX_OPERATOR};
use crate::error::DataGraphError;
use crate::query::cursor::decode_cursor;
use crate::query::glob::{glob_to_regex, is_glob};
use crate::query::types::{JoinClause, PreparedQuery, QueryDescriptor};
use crate::schema::types::{Field, Model, Schema};
use log::warn;
use serde_json::{Map, Value};

pub struct QueryPreparer<'a> {
    schema: &'a Schema,
}

impl<'a> QueryPreparer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Prepares a transformed descriptor for the storage driver.
    pub fn prepare(
        &self,
        model: &Model,
        query: &QueryDescriptor,
    ) -> Result<PreparedQuery, DataGraphError> {
        let input = self.rename_fields(model, &query.input);

        let mut joins = Vec::new();
        let clause = self.walk_where(model, &query.where_clause, &mut joins)?;
        let where_clause = finalize_clause(clause);

        let select = query
            .select
            .clone()
            .unwrap_or_else(|| model.fields.keys().cloned().collect());

        // decoded only when cursor paging is active and a cursor is present
        let (before, after) = if query.is_cursor_paging {
            (
                query
                    .before
                    .as_deref()
                    .map(decode_cursor)
                    .transpose()
                    .map_err(DataGraphError::from)?,
                query
                    .after
                    .as_deref()
                    .map(decode_cursor)
                    .transpose()
                    .map_err(DataGraphError::from)?,
            )
        } else {
            (None, None)
        };

        Ok(PreparedQuery {
            model: query.model.clone(),
            crud: query.crud,
            input,
            where_clause,
            joins,
            select,
            before,
            after,
        })
    }

    /// Walks the transformed filter tree. A key naming a joinable field
    /// with a nested filter object pushes that field's join descriptor
    /// (outer before inner) and recurses into the target model; every
    /// other key lands in the current flat clause under its storage
    /// key.
    fn walk_where(
        &self,
        model: &Model,
        map: &Map<String, Value>,
        joins: &mut Vec<JoinClause>,
    ) -> Result<Map<String, Value>, DataGraphError> {
        let mut clause = Map::new();
        for (key, value) in map {
            let Some(field) = model.fields.get(key) else {
                clause.insert(key.clone(), value.clone());
                continue;
            };
            match (&field.join, value) {
                (Some(join), Value::Object(nested)) => {
                    let target = self.schema.field_model(field).ok_or_else(|| {
                        DataGraphError::Config(format!(
                            "join target model for `{}.{}` is missing from the schema",
                            model.name, field.name
                        ))
                    })?;
                    let position = joins.len();
                    joins.push(JoinClause {
                        to: join.to.clone(),
                        on: join.on.clone(),
                        from: join.from.clone(),
                        where_clause: Map::new(),
                    });
                    let resolved = self.walk_where(target, nested, joins)?;
                    joins[position].where_clause = finalize_clause(resolved);
                }
                _ => {
                    // embedded sub-clauses rename to storage keys too
                    clause.insert(field.key.clone(), self.rename_value(field, value));
                }
            }
        }
        Ok(clause)
    }

    /// Rewrites declared field names to storage keys, recursing into
    /// embedded sub-objects. Unknown keys are kept verbatim so payload
    /// namespaces survive to the driver.
    pub(crate) fn rename_fields(
        &self,
        model: &Model,
        fields: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, value) in fields {
            let Some(field) = model.fields.get(name) else {
                warn!(
                    "cannot find field `{}` on `{}`; key left as-is",
                    name, model.name
                );
                out.insert(name.clone(), value.clone());
                continue;
            };
            out.insert(field.key.clone(), self.rename_value(field, value));
        }
        out
    }

    fn rename_value(&self, field: &Field, value: &Value) -> Value {
        if !field.is_embedded_link() {
            return value.clone();
        }
        let Some(target) = self.schema.field_model(field) else {
            return value.clone();
        };
        match value {
            Value::Object(map) => Value::Object(self.rename_fields(target, map)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(self.rename_fields(target, map)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Flattens nested non-operator objects to dotted keys, rewrites glob
/// strings into regex predicates, and wraps ordered sequences in the
/// containment operator.
fn finalize_clause(clause: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, clause);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, map: Map<String, Value>) {
    for (key, value) in map {
        let full = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };
        match value {
            Value::Object(inner)
                if !inner.is_empty() && !inner.keys().any(|k| k.starts_with('$')) =>
            {
                flatten_into(out, Some(&full), inner);
            }
            Value::Array(items) => {
                let items: Vec<Value> = items.into_iter().map(rewrite_leaf).collect();
                let mut contains = Map::new();
                contains.insert(ARRAY_OPERATOR.to_string(), Value::Array(items));
                out.insert(full, Value::Object(contains));
            }
            leaf => {
                out.insert(full, rewrite_leaf(leaf));
            }
        }
    }
}

fn rewrite_leaf(value: Value) -> Value {
    if let Value::String(s) = &value {
        if is_glob(s) {
            let mut predicate = Map::new();
            predicate.insert(REGEX_OPERATOR.to_string(), Value::String(glob_to_regex(s)));
            return Value::Object(predicate);
        }
    }
    value
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
    fn test_finalize_rewrites_globs_and_arrays() {
        let clause = obj(json!({"title": "Du*", "tags": ["a", "b"]}));
        let out = finalize_clause(clause);
        assert_eq!(
            Value::Object(out),
            json!({
                "title": {"$regex": "^Du.*$"},
                "tags": {"$in": ["a", "b"]},
            })
        );
    }

    #[test]
    fn test_finalize_flattens_nested_objects() {
        let clause = obj(json!({"meta": {"lang": "en", "print": {"year": 1965}}}));
        let out = finalize_clause(clause);
        assert_eq!(
            Value::Object(out),
            json!({"meta.lang": "en", "meta.print.year": 1965})
        );
    }

    #[test]
    fn test_finalize_keeps_operator_objects_as_leaves() {
        let clause = obj(json!({"title": {"$regex": "^Du.*$"}}));
        let out = finalize_clause(clause);
        assert_eq!(Value::Object(out), json!({"title": {"$regex": "^Du.*$"}}));
    }
}
