//! Two-phase schema assembly.
//!
//! The walker leaves behind models whose cross-model links are
//! unresolved. The assembler runs the deferred worklists in two ordered
//! groups, field-scoped first, then model-scoped: a field's join
//! depends on its target model's field map already existing, and
//! model-level aggregates depend on all of that model's fields being
//! resolved. It then runs the index and referential-integrity
//! post-passes and freezes the result.
//!
//! Resolution is permissive: an unresolved type reference leaves the
//! field's model link absent and the field is treated as opaque.

use crate::constants::{STAGE_ENSURE_ID, STAGE_ID_SERIALIZE, STAGE_REQUIRED};
use crate::schema::types::{
    IndexDefinition, IntegrityRule, JoinDescriptor, Model, Schema, StageKind,
};
use crate::schema::walker::{IndexBuilder, WalkOutput};
use log::debug;
use std::collections::{BTreeMap, HashSet};

pub(crate) struct SchemaAssembler;

impl SchemaAssembler {
    pub fn assemble(output: WalkOutput) -> Schema {
        let WalkOutput {
            mut models,
            indexes,
            field_work,
            model_work,
        } = output;

        // all per-field resolution completes before any cross-model
        // aggregation; duplicate definitions (decorated or extended
        // types) resolve once, since resolution appends stages
        let mut seen = HashSet::new();
        for work in &field_work {
            if seen.insert((work.model.as_str(), work.field.as_str())) {
                Self::resolve_field(&mut models, &work.model, &work.field);
            }
        }
        for work in &model_work {
            Self::resolve_model(&mut models, &work.model);
        }

        let indexes = Self::resolve_indexes(&models, indexes);

        let rules: BTreeMap<String, Vec<IntegrityRule>> = models
            .keys()
            .map(|name| (name.clone(), Self::identify_on_deletes(&models, name)))
            .collect();
        for (name, set) in rules {
            if let Some(model) = models.get_mut(&name) {
                model.referential_integrity = set;
            }
        }

        Schema { models, indexes }
    }

    fn resolve_field(models: &mut BTreeMap<String, Model>, model_name: &str, field_name: &str) {
        // snapshot everything the join needs before mutating
        let Some(model) = models.get(model_name) else {
            return;
        };
        let Some(field) = model.fields.get(field_name) else {
            return;
        };
        let target = models.get(&field.declared_type);

        let model_ref = target.map(|t| t.name.clone());
        let is_fk_reference = !field.is_primary_key
            && target.map_or(false, |t| t.is_marked_model && !t.is_embedded);
        let id_serialize = field.is_primary_key || is_fk_reference;
        let required_check = field.is_required && field.is_persistable && !field.is_virtual;

        let join = if is_fk_reference {
            target.map(|t| {
                let on_name = field.fk_field.as_deref().unwrap_or(&t.id_field);
                let on = t
                    .fields
                    .get(on_name)
                    .map_or_else(|| on_name.to_string(), |tf| tf.key.clone());
                let from = if field.is_virtual {
                    model.primary_key_key().to_string()
                } else {
                    field.key.clone()
                };
                JoinDescriptor {
                    to: t.key.clone(),
                    on,
                    from,
                }
            })
        } else {
            None
        };

        let Some(field) = models
            .get_mut(model_name)
            .and_then(|m| m.fields.get_mut(field_name))
        else {
            return;
        };
        field.model_ref = model_ref;
        field.is_fk_reference = is_fk_reference;
        if id_serialize {
            // identity serialization must run before custom serialize stages
            field.pipelines.prepend(StageKind::Serialize, STAGE_ID_SERIALIZE);
        }
        if required_check {
            // after custom validate stages
            field.pipelines.push(StageKind::Validate, STAGE_REQUIRED);
        }
        if let Some(join) = join {
            debug!(
                "resolved join for `{}.{}`: to `{}` on `{}` from `{}`",
                model_name, field_name, join.to, join.on, join.from
            );
            field.join = Some(join);
            // absolute last, after the required check
            field.pipelines.push(StageKind::Validate, STAGE_ENSURE_ID);
        }
    }

    fn resolve_model(models: &mut BTreeMap<String, Model>, name: &str) {
        let Some(model) = models.get_mut(name) else {
            return;
        };
        if !model.is_marked_model {
            model.data_scope.clear();
            model.api_scope.clear();
        }
        model.is_entity = !model.data_scope.is_empty() && !model.is_embedded;
    }

    fn resolve_indexes(
        models: &BTreeMap<String, Model>,
        builders: Vec<IndexBuilder>,
    ) -> Vec<IndexDefinition> {
        builders
            .into_iter()
            .filter_map(|builder| {
                let model = models.get(&builder.model)?;
                let on = builder
                    .on
                    .iter()
                    .map(|name| {
                        model
                            .fields
                            .get(name)
                            .map_or_else(|| name.clone(), |field| field.key.clone())
                    })
                    .collect();
                Some(IndexDefinition {
                    key: model.key.clone(),
                    name: builder.name,
                    index_type: builder.index_type,
                    on,
                })
            })
            .collect()
    }

    /// Recursively collects every field whose `onDelete` targets
    /// `parent`. Rules on entities are recorded directly; rules on
    /// embedded models are threaded through to the nearest enclosing
    /// entity, carrying the embedded field's name as `field_ref`.
    pub(crate) fn identify_on_deletes(
        models: &BTreeMap<String, Model>,
        parent: &str,
    ) -> Vec<IntegrityRule> {
        let mut rules = Vec::new();
        for model in models.values() {
            for field in model.fields.values() {
                let (Some(op), Some(target)) = (field.on_delete, field.model_ref.as_deref()) else {
                    continue;
                };
                if target != parent {
                    continue;
                }
                if model.is_entity {
                    rules.push(IntegrityRule {
                        model: model.name.clone(),
                        field: field.name.clone(),
                        field_ref: None,
                        is_array: field.is_array,
                        op,
                    });
                } else {
                    for mut rule in Self::identify_on_deletes(models, &model.name) {
                        rule.field_ref = Some(field.name.clone());
                        rule.is_array = field.is_array;
                        rule.op = op;
                        rules.push(rule);
                    }
                }
            }
        }
        dedup_rules(rules)
    }
}

fn dedup_rules(rules: Vec<IntegrityRule>) -> Vec<IntegrityRule> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|rule| seen.insert(rule.dedup_key()))
        .collect()
}
