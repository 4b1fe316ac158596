//! Typed syntax tree consumed by the analyzers
//!
//! The parser adapter lowers the concrete tree-sitter tree into this tagged
//! union. Only the node kinds an analyzer inspects get their own variant;
//! everything else is kept as [`NodeKind::Other`] so the traversal engine can
//! still reach the interesting nodes below it.

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` byte range into the analyzed source
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the source text covered by this span.
    ///
    /// Returns an empty string if the span does not fall on char boundaries
    /// of `source` (e.g. a span taken from a different file).
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// Value of a literal node
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String literal with escape sequences decoded
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    /// Regular expression literal, raw source text
    Regex(String),
}

/// One raw text chunk of a template literal
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    pub span: Span,
    /// Source text of the chunk, escapes left untouched
    pub raw: String,
}

/// A node in the lowered syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub span: Span,
    pub kind: NodeKind,
}

/// Node shapes, one variant per kind an analyzer cares about
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    TemplateLiteral {
        quasis: Vec<TemplateElement>,
        expressions: Vec<SyntaxNode>,
    },
    /// ``tag`...` ``; `quasi` is always a `TemplateLiteral`
    TaggedTemplate {
        tag: Box<SyntaxNode>,
        quasi: Box<SyntaxNode>,
    },
    Binary {
        operator: String,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// Plain (`=`) and compound (`+=`, `||=`, ...) assignments
    Assignment {
        operator: String,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    Call {
        callee: Box<SyntaxNode>,
        arguments: Vec<SyntaxNode>,
    },
    New {
        callee: Box<SyntaxNode>,
        arguments: Vec<SyntaxNode>,
    },
    /// `object.property` or, when `computed`, `object[property]`
    Member {
        object: Box<SyntaxNode>,
        property: Box<SyntaxNode>,
        computed: bool,
    },
    VariableDeclarator {
        id: Box<SyntaxNode>,
        init: Option<Box<SyntaxNode>>,
    },
    Object {
        properties: Vec<SyntaxNode>,
    },
    Array {
        elements: Vec<SyntaxNode>,
    },
    Property {
        key: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
        shorthand: bool,
    },
    JsxAttribute {
        name: String,
        value: Option<Box<SyntaxNode>>,
    },
    /// Any other syntax kind, named after the grammar (e.g. `expression_statement`)
    Other {
        kind: String,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self { span, kind }
    }

    /// Direct children in source order.
    ///
    /// This is the only way the traversal engine discovers structure.
    pub fn children(&self) -> Vec<&SyntaxNode> {
        match &self.kind {
            NodeKind::Identifier { .. } | NodeKind::Literal { .. } => Vec::new(),
            NodeKind::TemplateLiteral { expressions, .. } => expressions.iter().collect(),
            NodeKind::TaggedTemplate { tag, quasi } => vec![tag.as_ref(), quasi.as_ref()],
            NodeKind::Binary { left, right, .. } | NodeKind::Assignment { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
                std::iter::once(callee.as_ref())
                    .chain(arguments.iter())
                    .collect()
            }
            NodeKind::Member {
                object, property, ..
            } => vec![object.as_ref(), property.as_ref()],
            NodeKind::VariableDeclarator { id, init } => std::iter::once(id.as_ref())
                .chain(init.as_deref())
                .collect(),
            NodeKind::Object { properties } => properties.iter().collect(),
            NodeKind::Array { elements } => elements.iter().collect(),
            NodeKind::Property { key, value, .. } => vec![key.as_ref(), value.as_ref()],
            NodeKind::JsxAttribute { value, .. } => value.as_deref().into_iter().collect(),
            NodeKind::Other { children, .. } => children.iter().collect(),
        }
    }

    /// Short, ESTree-flavoured name of the node shape (used in logs)
    pub fn type_name(&self) -> &str {
        match &self.kind {
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TaggedTemplate { .. } => "TaggedTemplateExpression",
            NodeKind::Binary { .. } => "BinaryExpression",
            NodeKind::Assignment { .. } => "AssignmentExpression",
            NodeKind::Call { .. } => "CallExpression",
            NodeKind::New { .. } => "NewExpression",
            NodeKind::Member { .. } => "MemberExpression",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::Object { .. } => "ObjectExpression",
            NodeKind::Array { .. } => "ArrayExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::JsxAttribute { .. } => "JSXAttribute",
            NodeKind::Other { kind, .. } => kind,
        }
    }

    /// Name of an identifier node
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Value of a string literal node
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Literal {
                value: LiteralValue::String(s),
            } => Some(s),
            _ => None,
        }
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.as_identifier() == Some(name)
    }

    /// `(object, property name)` of a non-computed member expression
    pub fn as_member(&self) -> Option<(&SyntaxNode, &str)> {
        match &self.kind {
            NodeKind::Member {
                object,
                property,
                computed: false,
            } => property.as_identifier().map(|name| (object.as_ref(), name)),
            _ => None,
        }
    }

    /// Property name of a non-computed member expression
    pub fn member_property(&self) -> Option<&str> {
        self.as_member().map(|(_, name)| name)
    }

    /// True for `object.property` where `object` is the bare identifier `object_name`
    pub fn is_member_of(&self, object_name: &str, property_name: &str) -> bool {
        matches!(
            self.as_member(),
            Some((object, name)) if name == property_name && object.is_identifier(object_name)
        )
    }

    /// True for `location` and for `window.location` / `document.location`
    pub fn is_location_object(&self) -> bool {
        self.is_identifier("location")
            || self.is_member_of("window", "location")
            || self.is_member_of("document", "location")
    }

    /// Key of an object property: identifier name or string literal value
    pub fn property_key(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Property { key, .. } => key.as_identifier().or_else(|| key.as_string_literal()),
            _ => None,
        }
    }

    /// Value node of an object property
    pub fn property_value(&self) -> Option<&SyntaxNode> {
        match &self.kind {
            NodeKind::Property { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Look up a property by key in an object literal
    pub fn object_property(&self, key: &str) -> Option<&SyntaxNode> {
        match &self.kind {
            NodeKind::Object { properties } => properties
                .iter()
                .find(|p| p.property_key() == Some(key))
                .and_then(|p| p.property_value()),
            _ => None,
        }
    }

    /// Arguments of a call or `new` expression (empty for every other node)
    pub fn arguments(&self) -> &[SyntaxNode] {
        match &self.kind {
            NodeKind::Call { arguments, .. } | NodeKind::New { arguments, .. } => arguments,
            _ => &[],
        }
    }
}
