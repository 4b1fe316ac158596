//! Tests for GraphQL validation, reconstruction and discovery

use jshunter_core::classify::graphql::reconstruct_document;
use jshunter_core::config::HeuristicsConfig;
use jshunter_core::{GraphqlMatch, GraphqlType, GraphqlValidator, JsAnalyzer, JshunterConfig};
use serde_json::json;

fn graphql(source: &str) -> Vec<GraphqlMatch> {
    JsAnalyzer::default().analyze_source(source).unwrap().graphql
}

fn relaxed() -> HeuristicsConfig {
    HeuristicsConfig {
        graphql_min_length: 5,
        selection_min_length: 1,
        ..HeuristicsConfig::default()
    }
}

// ── Validator ────────────────────────────────────────────────────

#[test]
fn test_operations_accepted() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(v.is_plausible_operation("query GetUser { user { id name } }"));
    assert!(v.is_plausible_operation(
        "mutation Save($input: SaveInput!) { save(input: $input) { ok } }"
    ));
    assert!(v.is_plausible_operation("subscription { messageAdded { text } }"));
    assert!(v.is_plausible_operation("  query {\n  # placeholder\n}"));
}

#[test]
fn test_short_query_needs_relaxed_heuristics() {
    let defaults = HeuristicsConfig::default();
    assert!(!GraphqlValidator::new(&defaults).is_plausible_operation("query { a }"));

    let relaxed = relaxed();
    assert!(GraphqlValidator::new(&relaxed).is_plausible_operation("query { a }"));
}

#[test]
fn test_unbalanced_braces_rejected() {
    let heuristics = relaxed();
    let v = GraphqlValidator::new(&heuristics);

    assert!(!v.is_plausible_operation("query { a"));
    assert!(!v.is_plausible_operation("query Foo } a { b }"));
    assert!(!v.is_plausible_operation("query GetUser { user { id }"));
}

#[test]
fn test_operation_shape_required() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(!v.is_plausible_operation("query the database for {rows}"));
    assert!(!v.is_plausible_operation("query GetUser { }   "));
    assert!(!v.is_plausible_operation("subscription plans are billed monthly"));
}

#[test]
fn test_fragment_shape() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(v.is_plausible_operation("fragment UserParts on User { id name }"));
    assert!(!v.is_plausible_operation("fragment of the text that is long"));
    assert!(!v.is_plausible_operation("fragment UserParts on User { id name"));
}

#[test]
fn test_schema_definitions() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(v.is_plausible_operation("type User { id: ID }"));
    assert!(v.is_plausible_operation("input NewUser { name: String! }"));
    assert!(v.is_plausible_operation("enum Role { ADMIN USER GUEST }"));
    assert!(v.is_plausible_operation("union SearchResult = User | Post"));
    assert!(v.is_plausible_operation("scalar DateTimeOffset"));
    assert!(v.is_plausible_operation("directive @auth(requires: Role) on FIELD"));
}

#[test]
fn test_schema_keyword_density_rejected() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(!v.is_plausible_operation("enum class struct Foo"));
    assert!(!v.is_plausible_operation(
        "type Foo { if: Boolean, for: String, while: Int }"
    ));
}

#[test]
fn test_schema_name_must_be_capitalized() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    assert!(!v.is_plausible_operation("type user { id: ID }"));
    assert!(!v.is_plausible_operation("type of thing { id: ID }"));
}

#[test]
fn test_schema_minimum_length() {
    let heuristics = HeuristicsConfig::default();
    let v = GraphqlValidator::new(&heuristics);

    // 19 characters
    assert!(!v.is_plausible_operation("type Usr { id: ID }"));
}

#[test]
fn test_keyword_limit_is_configurable() {
    let heuristics = HeuristicsConfig {
        schema_keyword_limit: 5,
        ..HeuristicsConfig::default()
    };
    let v = GraphqlValidator::new(&heuristics);
    assert!(v.is_plausible_operation("type Foo { if: Boolean, for: String }"));
}

// ── Reconstruction ───────────────────────────────────────────────

#[test]
fn test_reconstruct_operation_with_variables() {
    let doc = json!({
        "kind": "Document",
        "definitions": [{
            "kind": "OperationDefinition",
            "operation": "query",
            "name": {"kind": "Name", "value": "Feed"},
            "variableDefinitions": [
                {
                    "kind": "VariableDefinition",
                    "variable": {"kind": "Variable", "name": {"kind": "Name", "value": "first"}},
                    "type": {"kind": "NamedType", "name": {"kind": "Name", "value": "Int"}}
                },
                {
                    "kind": "VariableDefinition",
                    "variable": {"kind": "Variable", "name": {"kind": "Name", "value": "ids"}},
                    "type": {
                        "kind": "NonNullType",
                        "type": {"kind": "ListType", "type": {"kind": "NamedType", "name": {"kind": "Name", "value": "ID"}}}
                    }
                }
            ],
            "selectionSet": {"kind": "SelectionSet", "selections": []}
        }]
    });

    assert_eq!(
        reconstruct_document(&doc).unwrap(),
        "query Feed($first: Int, $ids: [ID]!) {\n  # [Reconstructed from AST]\n}"
    );
}

#[test]
fn test_reconstruct_fragment_and_operation() {
    let doc = json!({
        "kind": "Document",
        "definitions": [
            {
                "kind": "OperationDefinition",
                "operation": "mutation",
                "selectionSet": {"kind": "SelectionSet", "selections": []}
            },
            {
                "kind": "FragmentDefinition",
                "name": {"kind": "Name", "value": "Parts"},
                "typeCondition": {"kind": "NamedType", "name": {"kind": "Name", "value": "User"}}
            }
        ]
    });

    assert_eq!(
        reconstruct_document(&doc).unwrap(),
        "mutation {\n  # [Reconstructed from AST]\n}\n\nfragment Parts on User {\n  # [Reconstructed from AST]\n}"
    );
}

#[test]
fn test_reconstruct_rejects_non_documents() {
    assert!(reconstruct_document(&json!({"kind": "Field"})).is_none());
    assert!(reconstruct_document(&json!({"kind": "Document", "definitions": []})).is_none());
    assert!(reconstruct_document(&json!([1, 2, 3])).is_none());
}

// ── Discovery ────────────────────────────────────────────────────

#[test]
fn test_string_literal_operation() {
    let found = graphql(r#"const q = "mutation AddUser { addUser { id } }";"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Mutation);
    assert_eq!(found[0].value, "mutation AddUser { addUser { id } }");
}

#[test]
fn test_literal_needs_whitespace_after_keyword() {
    let found = graphql(r#"const q = "query{ viewer { login } }";"#);
    assert!(found.is_empty());
}

#[test]
fn test_tagged_template_reported_once() {
    let source = "const Q = gql`\n  query GetUser($id: ID!) {\n    user(id: $id) { name }\n  }\n`;";
    let found = graphql(source);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Query);
    assert!(found[0].value.contains("query GetUser($id: ID!)"));
    assert!(!found[0].value.contains('`'));

    let start = source.find("gql").unwrap();
    assert_eq!(found[0].span.start, start);
    assert_eq!(found[0].column, start + 1);
}

#[test]
fn test_tagged_template_with_interpolation() {
    let source = "const Q = graphql`query Feed { feed { ...Parts } } ${PARTS}`;";
    let found = graphql(source);

    assert_eq!(found.len(), 1);
    assert!(found[0].value.contains("${PARTS}"));
}

#[test]
fn test_untagged_template() {
    let found = graphql("const s = `subscription OnMsg { msg { text } }`;");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Subscription);
}

#[test]
fn test_other_tag_suppresses_template() {
    let found = graphql("const s = css`query MediaQuery { display { none } }`;");
    assert!(found.is_empty());
}

#[test]
fn test_schema_literal() {
    let found = graphql(r#"const sdl = "type User { id: ID }";"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Schema);
}

#[test]
fn test_json_parse_document() {
    let source = r#"const doc = JSON.parse('{"kind":"Document","definitions":[{"kind":"OperationDefinition","operation":"query","name":{"kind":"Name","value":"Viewer"},"variableDefinitions":[],"selectionSet":{"kind":"SelectionSet","selections":[]}}]}');"#;
    let found = graphql(source);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Query);
    assert_eq!(
        found[0].value,
        "query Viewer {\n  # [Reconstructed from AST]\n}"
    );
}

#[test]
fn test_json_parse_of_other_json_ignored() {
    let found = graphql(r#"const cfg = JSON.parse('{"kind":"Config","debug":true}');"#);
    assert!(found.is_empty());
}

#[test]
fn test_object_literal_document() {
    let source = r#"
        const doc = {
            kind: "Document",
            definitions: [{
                kind: "OperationDefinition",
                operation: "mutation",
                name: { kind: "Name", value: "Save" },
                variableDefinitions: [{
                    kind: "VariableDefinition",
                    variable: { kind: "Variable", name: { kind: "Name", value: "input" } },
                    type: { kind: "NonNullType", type: { kind: "NamedType", name: { kind: "Name", value: "SaveInput" } } }
                }],
                selectionSet: { kind: "SelectionSet", selections: [] }
            }]
        };
    "#;
    let found = graphql(source);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Mutation);
    assert_eq!(
        found[0].value,
        "mutation Save($input: SaveInput!) {\n  # [Reconstructed from AST]\n}"
    );
}

#[test]
fn test_object_literal_document_with_non_literal_parts() {
    let source = r#"const doc = { kind: "Document", definitions: defs, loc: makeLoc() };"#;
    let found = graphql(source);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, GraphqlType::Query);
    assert!(found[0].value.contains("Reconstructed from JavaScript AST object"));
}

#[test]
fn test_disabled_module() {
    let mut config = JshunterConfig::default();
    config.modules.graphql = false;
    let result = JsAnalyzer::new(config)
        .analyze_source(r#"const q = "mutation AddUser { addUser { id } }";"#)
        .unwrap();
    assert!(result.graphql.is_empty());
}
