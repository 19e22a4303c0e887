use datagraph::{
    compile, CompilerConfig, FnStage, Schema, StageContext, StageOutcome, StageRegistry,
};
use std::sync::Arc;

/// Shared library schema exercising models, embedding, FK references,
/// virtual links, storage-key overrides, defaults, and indexes.
pub const LIBRARY_SCHEMA: &str = r#"
type Author @model @index(name: "authorsByBio", on: ["bio"]) {
  id: ID
  name: String! @field(validate: ["maxLen", "notEmpty"])
  bio: String @field(key: "biography")
  agent: Agent
  books: [Book] @link(by: "author")
}

type Agent @model {
  id: ID
  name: String!
}

type Book @model @index(name: "booksByTitle", type: "unique", on: ["title"]) {
  id: ID
  title: String!
  author: Author! @field(onDelete: cascade)
  detail: Detail
  tags: [String]
  genre: String @field(default: "unknown")
}

type Detail @model(embed: true) {
  isbn: String @field(key: "isbn13")
  publisher: Publisher @field(onDelete: nullify)
}

type Publisher @model {
  id: ID
  name: String
}
"#;

pub fn compile_library() -> Schema {
    let _ = env_logger::builder().is_test(true).try_init();
    compile(&CompilerConfig::new(LIBRARY_SCHEMA)).expect("library schema compiles")
}

pub fn compile_text(type_defs: &str) -> Schema {
    let _ = env_logger::builder().is_test(true).try_init();
    compile(&CompilerConfig::new(type_defs)).expect("schema compiles")
}

/// Built-ins plus no-op registrations for the custom stage names the
/// library schema declares; their behavior is covered by dedicated
/// tests with their own registries.
pub fn library_registry() -> StageRegistry {
    let mut registry = StageRegistry::with_builtins();
    for name in ["maxLen", "notEmpty"] {
        registry.register(
            name,
            Arc::new(FnStage::new(|_: StageContext<'_>| Ok(StageOutcome::Unchanged))),
        );
    }
    registry
}
