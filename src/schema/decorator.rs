//! Directive-fragment decoration.
//!
//! An optional text-to-text preprocessing step run before the walker:
//! model types carrying `@model` may name a decorator fragment via
//! `@model(decorate: "<name>")` (falling back to `"default"`) whose
//! field-definition text is merged into the type body. The fragment is
//! inserted right after the opening brace, so a field the type declares
//! itself is seen later by the walker and wins on name conflict.

use crate::config::CompilerConfig;
use crate::schema::types::SchemaError;
use regex::{Captures, Regex};

const TYPE_HEADER: &str = r"(?:type|interface)\s+\w+[^{]*\{";
const DECORATE_ARGUMENT: &str = r#"decorate:\s*"([^"]+)""#;
const MODEL_MARKER: &str = r"@model\b";

pub(crate) struct Decorator<'a> {
    config: &'a CompilerConfig,
}

impl<'a> Decorator<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    /// Merges configured decorator fragments into marked model types,
    /// returning the decorated document text.
    pub fn decorate(&self) -> Result<String, SchemaError> {
        if self.config.decorators.is_empty() {
            return Ok(self.config.type_defs.clone());
        }

        let header = compile_pattern(TYPE_HEADER)?;
        let decorate = compile_pattern(DECORATE_ARGUMENT)?;
        let marker = compile_pattern(MODEL_MARKER)?;

        let decorated = header.replace_all(&self.config.type_defs, |caps: &Captures<'_>| {
            let head = &caps[0];
            if !marker.is_match(head) {
                return head.to_string();
            }
            let fragment_name = decorate
                .captures(head)
                .and_then(|c| c.get(1))
                .map_or("default", |m| m.as_str());
            match self.config.decorators.get(fragment_name) {
                Some(fragment) => format!("{}\n{}\n", head, fragment),
                None => head.to_string(),
            }
        });
        Ok(decorated.into_owned())
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|error| SchemaError::Parse(error.to_string()))
}
