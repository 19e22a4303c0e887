//! Depth-first schema document traversal.
//!
//! One enter/leave pass over the parsed document, descending only an
//! allow-listed set of node kinds: the document itself, object and
//! interface definitions and extensions, field definitions, the
//! non-null and list type wrappers, named types, and directives.
//! Anything else aborts descent into that subtree. The three reserved
//! operation-root names never become models.
//!
//! The walk builds mutable model and field records and leaves two
//! worklists behind; all cross-model resolution is deferred to the
//! assembler because one field's join depends on its target model's
//! field map already existing.

use crate::config::CompilerConfig;
use crate::constants::RESERVED_OPERATION_ROOTS;
use crate::schema::directives;
use crate::schema::types::{Field, Model, SchemaError};
use graphql_parser::schema::{
    Definition, Directive, Document, Field as FieldDefinition, Type, TypeDefinition, TypeExtension,
};
use log::debug;
use std::collections::BTreeMap;

/// Pending per-field resolution, run by the assembler after the walk.
#[derive(Debug, Clone)]
pub(crate) struct FieldWork {
    pub model: String,
    pub field: String,
}

/// Pending per-model resolution, run after every field is resolved.
#[derive(Debug, Clone)]
pub(crate) struct ModelWork {
    pub model: String,
}

/// An index declaration captured during the walk, before storage-key
/// resolution.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexBuilder {
    pub model: String,
    pub name: Option<String>,
    pub index_type: Option<String>,
    pub on: Vec<String>,
}

/// A field under construction plus walk-scoped state that is not part
/// of the frozen record.
#[derive(Debug)]
pub(crate) struct FieldBuilder {
    pub field: Field,
    /// Explicit `persist` directive value; resolved against the model
    /// default when the field closes
    pub persist: Option<bool>,
}

/// Traversal context threaded through enter/leave calls.
#[derive(Debug, Default)]
pub(crate) struct WalkOutput {
    pub models: BTreeMap<String, Model>,
    pub indexes: Vec<IndexBuilder>,
    pub field_work: Vec<FieldWork>,
    pub model_work: Vec<ModelWork>,
}

pub(crate) struct DocumentWalker<'a> {
    config: &'a CompilerConfig,
}

impl<'a> DocumentWalker<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    pub fn walk(&self, type_defs: &str) -> Result<WalkOutput, SchemaError> {
        let document: Document<'_, String> = graphql_parser::parse_schema(type_defs)
            .map_err(|error| SchemaError::Parse(error.to_string()))?;

        let mut ctx = WalkOutput::default();
        for definition in &document.definitions {
            match definition {
                Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                    self.enter_model(&mut ctx, &object.name, &object.directives, &object.fields);
                }
                Definition::TypeDefinition(TypeDefinition::Interface(interface)) => {
                    self.enter_model(
                        &mut ctx,
                        &interface.name,
                        &interface.directives,
                        &interface.fields,
                    );
                }
                Definition::TypeExtension(TypeExtension::Object(extension)) => {
                    self.enter_model(
                        &mut ctx,
                        &extension.name,
                        &extension.directives,
                        &extension.fields,
                    );
                }
                Definition::TypeExtension(TypeExtension::Interface(extension)) => {
                    self.enter_model(
                        &mut ctx,
                        &extension.name,
                        &extension.directives,
                        &extension.fields,
                    );
                }
                // outside the allow-list, do not descend
                _ => {}
            }
        }
        Ok(ctx)
    }

    fn enter_model(
        &self,
        ctx: &mut WalkOutput,
        name: &str,
        model_directives: &[Directive<'_, String>],
        fields: &[FieldDefinition<'_, String>],
    ) {
        if RESERVED_OPERATION_ROOTS.contains(&name) {
            return;
        }

        let mut model = Model::new(name, self.config.default_source());
        for directive in model_directives {
            directives::apply_model_directive(&mut model, &mut ctx.indexes, directive, self.config);
        }
        debug!("registered model `{}`", name);

        for field_definition in fields {
            self.enter_field(ctx, &mut model, field_definition);
        }

        // leave: schedule model-scoped resolution after all field work
        ctx.model_work.push(ModelWork {
            model: name.to_string(),
        });
        ctx.models.insert(name.to_string(), model);
    }

    fn enter_field(
        &self,
        ctx: &mut WalkOutput,
        model: &mut Model,
        definition: &FieldDefinition<'_, String>,
    ) {
        let mut builder = FieldBuilder {
            field: Field::new(&definition.name),
            persist: None,
        };
        apply_type(&mut builder.field, &definition.field_type, false);
        for directive in &definition.directives {
            directives::apply_field_directive(&mut builder, directive);
        }

        // leave: everything derivable from the node alone
        let mut field = builder.field;
        field.is_primary_key = field.name == model.id_field;
        field.is_persistable = builder.persist.unwrap_or(model.is_persistable);

        ctx.field_work.push(FieldWork {
            model: model.name.clone(),
            field: field.name.clone(),
        });
        model.fields.insert(field.name.clone(), field);
    }
}

/// Applies type wrappers to cardinality flags: non-null outside a list
/// marks the value required, non-null inside a list marks the elements
/// required, and the named type becomes the declared type.
fn apply_type(field: &mut Field, ty: &Type<'_, String>, in_list: bool) {
    match ty {
        Type::NonNullType(inner) => {
            if in_list {
                field.is_array_required = true;
            } else {
                field.is_required = true;
            }
            apply_type(field, inner, in_list);
        }
        Type::ListType(inner) => {
            field.is_array = true;
            apply_type(field, inner, true);
        }
        Type::NamedType(name) => {
            field.declared_type = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(type_defs: &str) -> WalkOutput {
        let config = CompilerConfig::new(type_defs);
        DocumentWalker::new(&config).walk(type_defs).unwrap()
    }

    #[test]
    fn test_cardinality_flags() {
        let output = walk("type Author @model { id: ID! tags: [String!]! opt: [Int] }");
        let model = &output.models["Author"];
        let id = &model.fields["id"];
        assert!(id.is_required && !id.is_array);

        let tags = &model.fields["tags"];
        assert!(tags.is_array && tags.is_required && tags.is_array_required);
        assert_eq!(tags.declared_type, "String");

        let opt = &model.fields["opt"];
        assert!(opt.is_array && !opt.is_required && !opt.is_array_required);
    }

    #[test]
    fn test_operation_roots_are_not_models() {
        let output = walk("type Query { ping: String } type Author @model { id: ID! }");
        assert!(!output.models.contains_key("Query"));
        assert!(output.models.contains_key("Author"));
    }

    #[test]
    fn test_non_allow_listed_definitions_are_skipped() {
        let output = walk("scalar DateTime enum Color { RED } type A @model { id: ID! }");
        assert_eq!(output.models.len(), 1);
    }

    #[test]
    fn test_field_work_registered_in_declaration_order() {
        let output = walk("type A @model { x: ID y: ID } type B @model { z: ID }");
        let order: Vec<_> = output
            .field_work
            .iter()
            .map(|w| format!("{}.{}", w.model, w.field))
            .collect();
        assert_eq!(order, ["A.x", "A.y", "B.z"]);
        // model work strictly after the owning model's fields
        assert_eq!(output.model_work.len(), 2);
    }
}
