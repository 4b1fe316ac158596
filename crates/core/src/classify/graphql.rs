//! GraphQL plausibility checks, classification and document reconstruction

use crate::config::HeuristicsConfig;
use crate::finding::GraphqlType;
use crate::syntax::{LiteralValue, NodeKind, SyntaxNode};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Selection-set stand-in for documents rebuilt from a parsed AST
const RECONSTRUCTED_BODY: &str = " {\n  # [Reconstructed from AST]\n}";

/// Emitted for object-literal documents that could not be rebuilt
pub const GENERIC_OBJECT_DOCUMENT: &str =
    "query {\n  # [Reconstructed from JavaScript AST object]\n}";

struct Patterns {
    leading_keyword: Regex,
    leading_keyword_spaced: Regex,
    operation: Regex,
    operation_shape: Regex,
    fragment: Regex,
    fragment_shape: Regex,
    schema: Regex,
    schema_keywords: Regex,
    type_shape: Regex,
    input_shape: Regex,
    enum_shape: Regex,
    enum_foreign_keywords: Regex,
    interface_shape: Regex,
    union_shape: Regex,
    scalar_shape: Regex,
    directive_shape: Regex,
    schema_name: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let keywords =
            "query|mutation|subscription|type|fragment|directive|input|enum|interface|union|scalar";
        let schema = "type|input|enum|interface|union|scalar|directive";
        Patterns {
            leading_keyword: Regex::new(&format!(r"(?i)^\s*(?:{})", keywords)).unwrap(),
            leading_keyword_spaced: Regex::new(&format!(r"(?i)^\s*(?:{})\s+", keywords)).unwrap(),
            operation: Regex::new(r"(?i)^\s*(?:query|mutation|subscription)").unwrap(),
            operation_shape: Regex::new(
                r"(?i)^\s*(?:query|mutation|subscription)\s*(?:\w+\s*(?:\([^)]*\))?\s*)?\{",
            )
            .unwrap(),
            fragment: Regex::new(r"(?i)^\s*fragment").unwrap(),
            fragment_shape: Regex::new(r"(?i)^\s*fragment\s+\w+\s+on\s+\w+\s*\{").unwrap(),
            schema: Regex::new(&format!(r"(?i)^\s*(?:{})", schema)).unwrap(),
            schema_keywords: Regex::new(
                r"(?i)\b(?:type|input|enum|interface|union|scalar|directive|class|struct|extends|implements|namespace|var|let|const|function|if|for|while|switch|case|break|continue|return|public|private|protected|static|final|abstract|override|virtual|async|await|import|export|default|from|as|new|this|super|null|undefined|true|false|boolean|string|number|object|array|void)\b",
            )
            .unwrap(),
            type_shape: Regex::new(r"(?i)^\s*type\s+[A-Z]\w*\s*(?:\{[\s\S]*\}|\s*$)").unwrap(),
            input_shape: Regex::new(r"(?i)^\s*input\s+[A-Z]\w*\s*(?:\{[\s\S]*\}|\s*$)").unwrap(),
            enum_shape: Regex::new(r"(?i)^\s*enum\s+[A-Z]\w*\s*(?:\{[\s\S]*\}|\s*$)").unwrap(),
            enum_foreign_keywords: Regex::new(
                r"(?i)\b(?:class|struct|extends|implements|public|private|protected|static|final|abstract|override|virtual|function|var|let|const|if|for|while|switch|case|break|continue|return)\b",
            )
            .unwrap(),
            interface_shape: Regex::new(r"(?i)^\s*interface\s+[A-Z]\w*\s*(?:\{[\s\S]*\}|\s*$)")
                .unwrap(),
            union_shape: Regex::new(r"(?i)^\s*union\s+[A-Z]\w*\s*=\s*[\w\s|]+").unwrap(),
            scalar_shape: Regex::new(r"(?i)^\s*scalar\s+[A-Z]\w*\s*$").unwrap(),
            directive_shape: Regex::new(r"(?i)^\s*directive\s+@\w+").unwrap(),
            schema_name: Regex::new(&format!(r"(?i)^\s*(?:{})\s+([A-Za-z_]\w*)", schema)).unwrap(),
        }
    })
}

/// Running brace counter: never negative, zero at the end
fn braces_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn has_brace_pair(s: &str) -> bool {
    s.contains('{') && s.contains('}')
}

/// Leading-keyword test used on raw string and template literals, which
/// additionally requires whitespace after the keyword
pub fn starts_with_keyword(s: &str) -> bool {
    patterns().leading_keyword_spaced.is_match(s)
}

/// Map an accepted document to its category by leading keyword
pub fn classify(s: &str) -> GraphqlType {
    let lowered = s.trim().to_lowercase();
    if lowered.starts_with("query") {
        GraphqlType::Query
    } else if lowered.starts_with("mutation") {
        GraphqlType::Mutation
    } else if lowered.starts_with("subscription") {
        GraphqlType::Subscription
    } else if [
        "type",
        "input",
        "enum",
        "interface",
        "union",
        "scalar",
        "directive",
        "fragment",
    ]
    .iter()
    .any(|kw| lowered.starts_with(kw))
    {
        GraphqlType::Schema
    } else {
        GraphqlType::Other
    }
}

/// Structural validator for GraphQL operations, fragments and schema definitions
#[derive(Debug, Clone, Copy)]
pub struct GraphqlValidator<'c> {
    heuristics: &'c HeuristicsConfig,
}

impl<'c> GraphqlValidator<'c> {
    pub fn new(heuristics: &'c HeuristicsConfig) -> Self {
        Self { heuristics }
    }

    pub fn is_plausible_operation(&self, s: &str) -> bool {
        let p = patterns();
        let trimmed = s.trim();

        if trimmed.chars().count() < self.heuristics.graphql_min_length {
            return false;
        }
        if !p.leading_keyword.is_match(trimmed) {
            return false;
        }

        if p.operation.is_match(trimmed) {
            return self.is_plausible_selection(trimmed);
        }

        if p.fragment.is_match(trimmed) {
            return p.fragment_shape.is_match(trimmed) && braces_balanced(trimmed);
        }

        if p.schema.is_match(trimmed) {
            return self.is_plausible_schema(trimmed);
        }

        false
    }

    fn is_plausible_selection(&self, trimmed: &str) -> bool {
        if !has_brace_pair(trimmed) {
            return false;
        }
        if !patterns().operation_shape.is_match(trimmed) {
            return false;
        }
        if !braces_balanced(trimmed) {
            return false;
        }

        let (Some(open), Some(close)) = (trimmed.find('{'), trimmed.rfind('}')) else {
            return false;
        };
        let body = if open < close {
            trimmed[open + 1..close].trim()
        } else {
            ""
        };
        if body.is_empty() {
            return false;
        }
        body.chars().count() >= self.heuristics.selection_min_length || body.contains('#')
    }

    fn is_plausible_schema(&self, trimmed: &str) -> bool {
        let p = patterns();

        // Schema fragments are keyword-sparse; prose and other languages are not
        if p.schema_keywords.find_iter(trimmed).count() > self.heuristics.schema_keyword_limit {
            return false;
        }

        let lowered = trimmed.to_lowercase();
        let shape_ok = if lowered.starts_with("type") {
            p.type_shape.is_match(trimmed) && has_brace_pair(trimmed)
        } else if lowered.starts_with("input") {
            p.input_shape.is_match(trimmed) && has_brace_pair(trimmed)
        } else if lowered.starts_with("enum") {
            p.enum_shape.is_match(trimmed)
                && has_brace_pair(trimmed)
                && !p.enum_foreign_keywords.is_match(trimmed)
        } else if lowered.starts_with("interface") {
            p.interface_shape.is_match(trimmed) && has_brace_pair(trimmed)
        } else if lowered.starts_with("union") {
            p.union_shape.is_match(trimmed)
        } else if lowered.starts_with("scalar") {
            p.scalar_shape.is_match(trimmed)
        } else if lowered.starts_with("directive") {
            p.directive_shape.is_match(trimmed)
        } else {
            false
        };
        if !shape_ok {
            return false;
        }

        if trimmed.contains('{') && !braces_balanced(trimmed) {
            return false;
        }

        // Directive names (`@auth`) are lower camel case by convention
        let capitalized = lowered.starts_with("directive")
            || p.schema_name
                .captures(trimmed)
                .and_then(|caps| caps.get(1))
                .is_some_and(|name| name.as_str().starts_with(|c: char| c.is_ascii_uppercase()));
        if !capitalized {
            return false;
        }

        trimmed.chars().count() >= self.heuristics.schema_min_length
    }
}

/// Rebuild operation/fragment headers from a parsed GraphQL document
/// (`{"kind": "Document", "definitions": [...]}`).
///
/// Selection sets are not recoverable in general, so each body is a comment
/// placeholder. Returns `None` if nothing could be rebuilt.
pub fn reconstruct_document(doc: &Value) -> Option<String> {
    if doc.get("kind").and_then(Value::as_str) != Some("Document") {
        return None;
    }
    let definitions = doc.get("definitions")?.as_array()?;

    let rebuilt: Vec<String> = definitions
        .iter()
        .filter_map(|def| match def.get("kind").and_then(Value::as_str) {
            Some("OperationDefinition") => reconstruct_operation(def),
            Some("FragmentDefinition") => reconstruct_fragment(def),
            _ => None,
        })
        .collect();

    if rebuilt.is_empty() {
        None
    } else {
        Some(rebuilt.join("\n\n"))
    }
}

fn name_value(node: &Value) -> Option<&str> {
    node.get("name")?.get("value")?.as_str()
}

fn reconstruct_operation(def: &Value) -> Option<String> {
    let operation = def.get("operation")?.as_str()?;
    def.get("selectionSet").filter(|s| !s.is_null())?;

    let mut out = operation.to_string();
    if let Some(name) = name_value(def).filter(|n| !n.is_empty()) {
        out.push(' ');
        out.push_str(name);
    }

    let variables: Vec<String> = def
        .get("variableDefinitions")
        .and_then(Value::as_array)
        .map(|defs| {
            defs.iter()
                .filter_map(|v| {
                    let name = name_value(v.get("variable")?)?;
                    let ty = v.get("type")?;
                    Some(format!("${}: {}", name, reconstruct_type(ty)))
                })
                .collect()
        })
        .unwrap_or_default();
    if !variables.is_empty() {
        out.push('(');
        out.push_str(&variables.join(", "));
        out.push(')');
    }

    out.push_str(RECONSTRUCTED_BODY);
    Some(out)
}

fn reconstruct_fragment(def: &Value) -> Option<String> {
    let name = name_value(def)?;
    let on = name_value(def.get("typeCondition")?)?;
    Some(format!("fragment {} on {}{}", name, on, RECONSTRUCTED_BODY))
}

/// `NonNullType` -> `T!`, `ListType` -> `[T]`, `NamedType` -> name
fn reconstruct_type(ty: &Value) -> String {
    match ty.get("kind").and_then(Value::as_str) {
        Some("NonNullType") => match ty.get("type") {
            Some(inner) => format!("{}!", reconstruct_type(inner)),
            None => "Unknown!".to_string(),
        },
        Some("ListType") => match ty.get("type") {
            Some(inner) => format!("[{}]", reconstruct_type(inner)),
            None => "[Unknown]".to_string(),
        },
        Some("NamedType") => name_value(ty).unwrap_or("Unknown").to_string(),
        _ => "Unknown".to_string(),
    }
}

/// True for object literals shaped like a parsed document:
/// a `kind: "Document"` property plus a `definitions` property
pub fn looks_like_document_object(node: &SyntaxNode) -> bool {
    let NodeKind::Object { properties } = &node.kind else {
        return false;
    };
    let has_kind = properties.iter().any(|p| {
        p.property_key() == Some("kind")
            && p.property_value().and_then(SyntaxNode::as_string_literal) == Some("Document")
    });
    let has_definitions = properties
        .iter()
        .any(|p| p.property_key() == Some("definitions"));
    has_kind && has_definitions
}

/// Convert a literal-only expression (objects, arrays, strings, numbers,
/// booleans, null) into JSON. Anything else makes the whole conversion fail.
pub fn literal_to_json(node: &SyntaxNode) -> Option<Value> {
    match &node.kind {
        NodeKind::Literal { value } => match value {
            LiteralValue::String(s) => Some(Value::String(s.clone())),
            LiteralValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            LiteralValue::Boolean(b) => Some(Value::Bool(*b)),
            LiteralValue::Null => Some(Value::Null),
            LiteralValue::Regex(_) => None,
        },
        NodeKind::Array { elements } => elements
            .iter()
            .map(literal_to_json)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        NodeKind::Object { properties } => {
            let mut map = Map::new();
            for prop in properties {
                let key = prop.property_key()?;
                let value = literal_to_json(prop.property_value()?)?;
                map.insert(key.to_string(), value);
            }
            Some(Value::Object(map))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn brace_balance() {
        assert!(braces_balanced("{ { } }"));
        assert!(!braces_balanced("} {"));
        assert!(!braces_balanced("{ {"));
    }

    #[test]
    fn nested_variable_types() {
        let ty = json!({
            "kind": "NonNullType",
            "type": {
                "kind": "ListType",
                "type": {"kind": "NonNullType", "type": {"kind": "NamedType", "name": {"value": "ID"}}}
            }
        });
        assert_eq!(reconstruct_type(&ty), "[ID!]!");
    }

    #[test]
    fn classify_by_keyword() {
        assert_eq!(classify("  Query Foo { a }"), GraphqlType::Query);
        assert_eq!(classify("fragment F on User { id }"), GraphqlType::Schema);
        assert_eq!(classify("{ a }"), GraphqlType::Other);
    }
}
