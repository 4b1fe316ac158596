//! Static reconstruction of string values from expressions
//!
//! Resolution never fails loudly: an expression that cannot be turned into a
//! string yields `None`, and unresolvable pieces of a larger expression are
//! replaced by [`PLACEHOLDER`].

use crate::syntax::{NodeKind, SyntaxNode};
use std::collections::HashMap;

/// Token substituted for any sub-expression whose value is unknown
pub const PLACEHOLDER: &str = "EXPR";

/// Flat, scope-unaware map from variable name to its last resolved string
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    /// Insert or overwrite; the last write wins regardless of scope
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolve `node` to the string it would evaluate to, as far as statically known
///
/// - string literal: its value
/// - template literal: raw chunks joined with bound identifiers, string
///   literals or the placeholder for each `${...}`
/// - `a + b`: both operands, unresolvable ones as the placeholder
/// - `x.concat(...)`: the base followed by each argument
/// - identifier: its binding, if any
pub fn resolve(node: &SyntaxNode, bindings: &Bindings) -> Option<String> {
    match &node.kind {
        NodeKind::Literal { .. } => node.as_string_literal().map(str::to_string),
        NodeKind::TemplateLiteral { .. } => Some(resolve_template(node, bindings)),
        NodeKind::Binary { operator, .. } if operator == "+" => {
            Some(resolve_concatenation(node, bindings))
        }
        NodeKind::Call { .. } if is_concat_call(node) => Some(resolve_concatenation(node, bindings)),
        NodeKind::Identifier { name } => bindings.get(name).map(str::to_string),
        _ => None,
    }
}

/// Template literal with each interpolation replaced
fn resolve_template(node: &SyntaxNode, bindings: &Bindings) -> String {
    let NodeKind::TemplateLiteral {
        quasis,
        expressions,
    } = &node.kind
    else {
        return String::new();
    };

    let mut out = String::new();
    for (i, quasi) in quasis.iter().enumerate() {
        out.push_str(&quasi.raw);
        if i + 1 < quasis.len() {
            match expressions.get(i) {
                Some(expr) => out.push_str(&resolve_operand(expr, bindings)),
                None => out.push_str(PLACEHOLDER),
            }
        }
    }
    out
}

/// Operand of `+`, `.concat()` or a template: never unresolved
fn resolve_concatenation(node: &SyntaxNode, bindings: &Bindings) -> String {
    enum Part<'n> {
        Concat(&'n SyntaxNode),
        Operand(&'n SyntaxNode),
        Placeholder,
    }

    let mut out = String::new();
    let mut stack = vec![Part::Concat(node)];

    // Parts are pushed in reverse so they pop in source order
    while let Some(part) = stack.pop() {
        let node = match part {
            Part::Placeholder => {
                out.push_str(PLACEHOLDER);
                continue;
            }
            Part::Operand(node) => {
                out.push_str(&resolve_operand(node, bindings));
                continue;
            }
            Part::Concat(node) => node,
        };

        match &node.kind {
            NodeKind::Binary {
                operator,
                left,
                right,
            } if operator == "+" => {
                stack.push(Part::Concat(right));
                stack.push(Part::Concat(left));
            }
            NodeKind::Call { callee, arguments } if is_concat_call(node) => {
                let NodeKind::Member { object, .. } = &callee.kind else {
                    stack.push(Part::Placeholder);
                    continue;
                };
                stack.extend(arguments.iter().rev().map(Part::Operand));
                stack.push(Part::Concat(object));
            }
            _ => out.push_str(&resolve_operand(node, bindings)),
        }
    }
    out
}

/// String literal, bound identifier, or the placeholder
fn resolve_operand(node: &SyntaxNode, bindings: &Bindings) -> String {
    if let Some(s) = node.as_string_literal() {
        return s.to_string();
    }
    if let Some(value) = node.as_identifier().and_then(|name| bindings.get(name)) {
        return value.to_string();
    }
    PLACEHOLDER.to_string()
}

/// `<expr>.concat(...)`
pub fn is_concat_call(node: &SyntaxNode) -> bool {
    match &node.kind {
        NodeKind::Call { callee, .. } => callee.member_property() == Some("concat"),
        _ => false,
    }
}

/// True for initializers whose value is built at runtime (templates, `+`)
pub fn is_dynamic(node: &SyntaxNode) -> bool {
    match &node.kind {
        NodeKind::TemplateLiteral { .. } => true,
        NodeKind::Binary { operator, .. } => operator == "+",
        _ => false,
    }
}

/// Trim whitespace and strip one pair of wrapping quotes and backticks
pub fn normalize_url(value: &str) -> String {
    let mut normalized = value.trim();

    let wrapped_in = |s: &str, q: char| s.len() >= 2 && s.starts_with(q) && s.ends_with(q);

    if wrapped_in(normalized, '"') || wrapped_in(normalized, '\'') {
        normalized = &normalized[1..normalized.len() - 1];
    }
    if wrapped_in(normalized, '`') {
        normalized = &normalized[1..normalized.len() - 1];
    }

    normalized.to_string()
}
