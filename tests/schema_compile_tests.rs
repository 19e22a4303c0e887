use datagraph::schema::{DeleteAction, KeyKind, StageKind};
use datagraph::{compile, CompilerConfig};

#[path = "test_helpers/mod.rs"]
mod test_helpers;
use test_helpers::{compile_library, compile_text};

#[test]
fn test_author_book_scenario() {
    let schema = compile_text(
        r#"
        type Author @model {
          id: ID!
          name: String!
          books: [Book!]!
        }
        type Book {
          title: String!
          author: Author!
        }
        "#,
    );

    let author = schema.model("Book").unwrap().fields.get("author").unwrap();
    assert!(author.is_fk_reference);
    let join = author.join.as_ref().unwrap();
    assert_eq!(join.to, "Author");
    assert_eq!(join.on, "id");
    assert_eq!(join.from, "author");

    // Book is unmarked, so `books` nests sub-objects instead of joining
    let books = schema.model("Author").unwrap().fields.get("books").unwrap();
    assert!(!books.is_fk_reference);
    assert!(books.is_embedded_link());
    assert!(books.join.is_none());
    assert!(books.is_array && books.is_required && books.is_array_required);
}

#[test]
fn test_single_primary_key_per_model() {
    let schema = compile_library();
    for model in schema.models.values() {
        let pk_count = model
            .fields
            .values()
            .filter(|field| field.is_primary_key)
            .count();
        if model.fields.contains_key(&model.id_field) {
            assert_eq!(pk_count, 1, "model `{}`", model.name);
            assert_eq!(model.primary_key().unwrap().name, model.id_field);
        } else {
            assert_eq!(pk_count, 0, "model `{}`", model.name);
        }
        assert_eq!(model.id_field, "id");
    }
}

#[test]
fn test_fk_join_metadata() {
    let schema = compile_library();

    let author = schema.model("Book").unwrap().fields.get("author").unwrap();
    assert_eq!(author.join.as_ref().unwrap().to, "Author");
    assert_eq!(author.join.as_ref().unwrap().on, "id");
    assert_eq!(author.join.as_ref().unwrap().from, "author");

    // virtual inverse link: joins on the override column, from own id
    let books = schema.model("Author").unwrap().fields.get("books").unwrap();
    assert!(books.is_virtual);
    let join = books.join.as_ref().unwrap();
    assert_eq!(join.to, "Book");
    assert_eq!(join.on, "author");
    assert_eq!(join.from, "id");

    // join is set iff is_fk_reference
    for model in schema.models.values() {
        for field in model.fields.values() {
            assert_eq!(field.join.is_some(), field.is_fk_reference);
        }
    }
}

#[test]
fn test_storage_key_override_flows_into_joins() {
    let schema = compile_text(
        r#"
        type Author @model(key: "authors") {
          id: ID @field(key: "_id")
          name: String
        }
        type Book @model {
          id: ID
          author: Author
        }
        "#,
    );
    let join = schema
        .model("Book")
        .unwrap()
        .fields
        .get("author")
        .unwrap()
        .join
        .as_ref()
        .unwrap();
    assert_eq!(join.to, "authors");
    assert_eq!(join.on, "_id");
}

#[test]
fn test_double_compile_is_structurally_equal() {
    assert_eq!(compile_library(), compile_library());
}

#[test]
fn test_resolve_path_name_and_key_spaces_agree() {
    let schema = compile_library();

    let by_name = schema
        .resolve_path("Author.bio", KeyKind::Name)
        .and_then(|t| t.as_field().cloned())
        .unwrap();
    let by_key = schema
        .resolve_path("Author.biography", KeyKind::Key)
        .and_then(|t| t.as_field().cloned())
        .unwrap();
    assert_eq!(by_name, by_key);

    let nested = schema
        .resolve_path("Book.detail.isbn13", KeyKind::Key)
        .and_then(|t| t.as_field().cloned())
        .unwrap();
    assert_eq!(nested.name, "isbn");

    let model_only = schema.resolve_path("Book", KeyKind::Name).unwrap();
    assert_eq!(model_only.as_model().unwrap().name, "Book");
}

#[test]
fn test_required_stage_ordering() {
    let schema = compile_library();

    // custom validators first, in declared order, then the required check
    let name = schema.model("Author").unwrap().fields.get("name").unwrap();
    assert_eq!(
        name.pipelines.get(StageKind::Validate),
        ["maxLen", "notEmpty", "required"]
    );

    // FK references get the identifier check absolutely last
    let author = schema.model("Book").unwrap().fields.get("author").unwrap();
    assert_eq!(
        author.pipelines.get(StageKind::Validate),
        ["required", "ensureId"]
    );
    assert_eq!(author.pipelines.get(StageKind::Serialize), ["$id"]);

    // primary keys serialize through the identity stage too
    let id = schema.model("Book").unwrap().fields.get("id").unwrap();
    assert_eq!(id.pipelines.get(StageKind::Serialize), ["$id"]);
}

#[test]
fn test_referential_integrity_direct_rule() {
    let schema = compile_library();
    let rules = &schema.model("Author").unwrap().referential_integrity;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].model, "Book");
    assert_eq!(rules[0].field, "author");
    assert_eq!(rules[0].field_ref, None);
    assert_eq!(rules[0].op, DeleteAction::Cascade);
}

#[test]
fn test_referential_integrity_threads_through_embedded_models() {
    let schema = compile_text(
        r#"
        type Publisher @model { id: ID name: String }
        type Detail @model(embed: true) {
          publisher: Publisher @field(onDelete: nullify)
        }
        type Book @model {
          id: ID
          detail: Detail @field(onDelete: cascade)
        }
        "#,
    );

    let publisher_rules = &schema.model("Publisher").unwrap().referential_integrity;
    assert_eq!(publisher_rules.len(), 1);
    assert_eq!(publisher_rules[0].model, "Book");
    assert_eq!(publisher_rules[0].field, "detail");
    assert_eq!(publisher_rules[0].field_ref.as_deref(), Some("publisher"));
    assert_eq!(publisher_rules[0].op, DeleteAction::Nullify);

    let detail_rules = &schema.model("Detail").unwrap().referential_integrity;
    assert_eq!(detail_rules.len(), 1);
    assert_eq!(detail_rules[0].field_ref, None);
    assert_eq!(detail_rules[0].op, DeleteAction::Cascade);
}

#[test]
fn test_referential_integrity_is_idempotent_and_deduped() {
    let first = compile_library();
    let second = compile_library();
    for (name, model) in &first.models {
        let other = &second.models[name].referential_integrity;
        assert_eq!(&model.referential_integrity, other);

        let mut seen = std::collections::HashSet::new();
        for rule in &model.referential_integrity {
            assert!(seen.insert((
                rule.model.clone(),
                rule.field.clone(),
                rule.field_ref.clone(),
                rule.op,
            )));
        }
    }
}

#[test]
fn test_index_post_pass_resolves_storage_keys() {
    let schema = compile_library();
    assert_eq!(schema.indexes.len(), 2);

    let by_bio = schema
        .indexes
        .iter()
        .find(|index| index.name.as_deref() == Some("authorsByBio"))
        .unwrap();
    assert_eq!(by_bio.key, "Author");
    assert_eq!(by_bio.on, ["biography"]);

    let by_title = schema
        .indexes
        .iter()
        .find(|index| index.name.as_deref() == Some("booksByTitle"))
        .unwrap();
    assert_eq!(by_title.key, "Book");
    assert_eq!(by_title.index_type.as_deref(), Some("unique"));
    assert_eq!(by_title.on, ["title"]);
}

#[test]
fn test_scopes_and_entity_flags() {
    let schema = compile_library();

    let book = schema.model("Book").unwrap();
    assert!(book.is_marked_model && book.is_entity);
    assert_eq!(book.data_scope, "crud");
    assert_eq!(book.api_scope, "cruds");

    // embedded models are marked but never entities
    let detail = schema.model("Detail").unwrap();
    assert!(detail.is_marked_model && detail.is_embedded);
    assert!(!detail.is_entity);

    // unmarked models lose their scopes entirely
    let schema = compile_text("type Loose { x: String } type A @model { id: ID }");
    let loose = schema.model("Loose").unwrap();
    assert!(!loose.is_marked_model && !loose.is_entity);
    assert!(loose.data_scope.is_empty() && loose.api_scope.is_empty());
}

#[test]
fn test_unresolved_type_reference_is_opaque() {
    let schema = compile_text("type A @model { id: ID mystery: Phantom }");
    let mystery = schema.model("A").unwrap().fields.get("mystery").unwrap();
    assert_eq!(mystery.model_ref, None);
    assert!(!mystery.is_fk_reference);
    assert!(mystery.join.is_none());
    assert!(!mystery.is_embedded_link());
}

#[test]
fn test_malformed_directive_arguments_are_dropped() {
    // embed wants a boolean, onDelete wants a known action; both are
    // silently ignored rather than raised
    let schema = compile_text(
        r#"
        type A @model(embed: "yes") {
          id: ID
          b: B @field(onDelete: obliterate)
        }
        type B @model { id: ID }
        "#,
    );
    let a = schema.model("A").unwrap();
    assert!(!a.is_embedded);
    assert_eq!(a.fields.get("b").unwrap().on_delete, None);
}

#[test]
fn test_decorator_merges_fragment_fields() {
    let config = CompilerConfig::new(
        r#"
        type Note @model {
          body: String! @field(key: "text")
        }
        "#,
    )
    .with_decorator("default", "id: ID! body: String");
    let schema = compile(&config).unwrap();

    let note = schema.model("Note").unwrap();
    // fragment supplied the id field
    let id = note.fields.get("id").unwrap();
    assert!(id.is_primary_key && id.is_required);
    // the declared field wins over the fragment's copy
    let body = note.fields.get("body").unwrap();
    assert_eq!(body.key, "text");
    assert!(body.is_required);
}

#[test]
fn test_operation_roots_and_foreign_kinds_are_skipped() {
    let schema = compile_text(
        r#"
        scalar DateTime
        enum Color { RED GREEN }
        type Query { ping: String }
        type Mutation { noop: String }
        type A @model { id: ID }
        "#,
    );
    assert_eq!(schema.models.len(), 1);
    assert!(schema.model("A").is_some());
}

#[test]
fn test_field_persistability_defaults_from_model() {
    let schema = compile_text(
        r#"
        type Draft @model(persist: false) {
          id: ID
          kept: String @field(persist: true)
          dropped: String
        }
        "#,
    );
    let draft = schema.model("Draft").unwrap();
    assert!(!draft.is_persistable);
    assert!(draft.fields.get("kept").unwrap().is_persistable);
    assert!(!draft.fields.get("dropped").unwrap().is_persistable);
    // a required non-persistable field skips the required check
    let schema = compile_text(
        r#"
        type Draft @model(persist: false) {
          id: ID
          label: String!
        }
        "#,
    );
    let label = schema.model("Draft").unwrap().fields.get("label").unwrap();
    assert!(!label.pipelines.get(StageKind::Validate).contains(&"required".to_string()));
}
