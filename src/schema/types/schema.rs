use super::field::Field;
use super::index::IndexDefinition;
use super::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which naming space a dot-path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Declared names
    Name,
    /// Storage keys
    Key,
}

/// Resolution result of [`Schema::resolve_path`].
#[derive(Debug, Clone, Copy)]
pub enum PathTarget<'a> {
    Model(&'a Model),
    Field(&'a Field),
}

impl<'a> PathTarget<'a> {
    pub fn as_model(&self) -> Option<&'a Model> {
        match *self {
            PathTarget::Model(model) => Some(model),
            PathTarget::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&'a Field> {
        match *self {
            PathTarget::Field(field) => Some(field),
            PathTarget::Model(_) => None,
        }
    }
}

/// The frozen output of a schema compilation.
///
/// Immutable once assembled; safe for unrestricted concurrent reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub models: BTreeMap<String, Model>,
    pub indexes: Vec<IndexDefinition>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// The model a field's declared type resolved to, if any.
    pub fn field_model(&self, field: &Field) -> Option<&Model> {
        field
            .model_ref
            .as_deref()
            .and_then(|name| self.models.get(name))
    }

    /// Resolves a dot-separated path of declared names or storage keys
    /// to a model or field.
    ///
    /// The first segment selects a model; each following segment
    /// selects a field of the current target, descending through
    /// resolved model links. An unresolvable segment keeps the current
    /// target rather than failing the whole path.
    pub fn resolve_path(&self, path: &str, kind: KeyKind) -> Option<PathTarget<'_>> {
        let mut segments = path.split('.');
        let first = segments.next()?;

        let model = self
            .models
            .values()
            .find(|model| Self::model_prop(model, kind) == first)?;
        let mut target = PathTarget::Model(model);

        for segment in segments {
            let fields = match target {
                PathTarget::Model(model) => &model.fields,
                PathTarget::Field(field) => match self.field_model(field) {
                    Some(model) => &model.fields,
                    None => continue,
                },
            };
            if let Some(field) = fields
                .values()
                .find(|field| Self::field_prop(field, kind) == segment)
            {
                target = PathTarget::Field(field);
            }
        }

        Some(target)
    }

    fn model_prop(model: &Model, kind: KeyKind) -> &str {
        match kind {
            KeyKind::Name => &model.name,
            KeyKind::Key => &model.key,
        }
    }

    fn field_prop(field: &Field, kind: KeyKind) -> &str {
        match kind {
            KeyKind::Name => &field.name,
            KeyKind::Key => &field.key,
        }
    }
}
