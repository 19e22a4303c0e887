//! Compiler configuration.
//!
//! Everything the schema compiler needs beyond the document text:
//! decorator fragments merged into model types before parsing, and the
//! named data-source bindings models can attach to via directives.

use crate::constants::DEFAULT_SOURCE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Configuration for one schema compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// The schema document text
    pub type_defs: String,

    /// Named decorator fragments: field-definition text merged into
    /// model types that opt in via `@model(decorate: "<name>")`
    #[serde(default)]
    pub decorators: HashMap<String, String>,

    /// Named data-source bindings referenced by `@model(source: "<name>")`
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,
}

/// A named storage binding. The physical driver behind it is an
/// external collaborator; models only carry the binding name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub uri: String,

    #[serde(default)]
    pub options: HashMap<String, Value>,
}

impl CompilerConfig {
    pub fn new(type_defs: impl Into<String>) -> Self {
        Self {
            type_defs: type_defs.into(),
            ..Self::default()
        }
    }

    pub fn with_decorator(mut self, name: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.decorators.insert(name.into(), fragment.into());
        self
    }

    pub fn with_source(mut self, name: impl Into<String>, source: SourceConfig) -> Self {
        self.sources.insert(name.into(), source);
        self
    }

    /// The binding newly registered models attach to when no `source`
    /// directive names another one.
    pub fn default_source(&self) -> Option<String> {
        self.sources
            .contains_key(DEFAULT_SOURCE)
            .then(|| DEFAULT_SOURCE.to_string())
    }
}
