//! JavaScript/TypeScript parser using Tree-sitter
//!
//! Lowers the concrete syntax tree into [`SyntaxNode`]s. Comments are dropped,
//! parentheses are transparent, and string literals are cooked so analyzers
//! see the runtime value rather than the escaped source text.

use super::{ParseDiagnostic, ParseError, ParseOutput, SourceParser};
use crate::position::LineIndex;
use crate::syntax::{LiteralValue, NodeKind, Span, SyntaxNode, TemplateElement};
use tree_sitter::{Node, Parser, Tree};

// Tests live in crates/core/tests/test_parser.rs

/// Nodes nested deeper than this are lowered without children, which keeps
/// every later walk over the tree (including `Drop`) shallow
pub const MAX_LOWERING_DEPTH: usize = 512;

/// Parser for one tree-sitter grammar of the JavaScript family
pub struct JavaScriptParser {
    language: tree_sitter::Language,
    name: &'static str,
    extensions: &'static [&'static str],
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::javascript()
    }
}

impl JavaScriptParser {
    /// Plain JavaScript (including JSX)
    pub fn javascript() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
            name: "javascript",
            extensions: &[".js", ".mjs", ".cjs", ".jsx"],
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            name: "typescript",
            extensions: &[".ts", ".mts", ".cts"],
        }
    }

    pub fn tsx() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TSX.into(),
            name: "tsx",
            extensions: &[".tsx"],
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = self.create_parser()?;
        parser.parse(source, None).ok_or_else(|| {
            ParseError::ParseFailed(format!("Failed to parse {} source", self.name))
        })
    }
}

impl SourceParser for JavaScriptParser {
    fn language_name(&self) -> &str {
        self.name
    }

    fn file_extensions(&self) -> &[&str] {
        self.extensions
    }

    fn parse(&self, source: &str) -> Result<ParseOutput, ParseError> {
        let tree = self.parse_tree(source)?;
        let root_node = tree.root_node();

        let errors = collect_errors(root_node, source);
        let root = Lowerer { source }.lower_tree(root_node);

        Ok(ParseOutput { root, errors })
    }
}

/// Walk only the error-carrying parts of the tree and report ERROR/MISSING nodes
fn collect_errors(root: Node, source: &str) -> Vec<ParseDiagnostic> {
    let mut errors = Vec::new();
    if !root.has_error() {
        return errors;
    }

    let index = LineIndex::new(source);
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = index.position(node.start_byte());
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            errors.push(ParseDiagnostic {
                message,
                line: pos.line,
                column: pos.column,
            });
        }

        let descend = node.has_error() && !node.is_error() && cursor.goto_first_child();
        if descend {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return errors;
            }
        }
    }
}

struct Lowerer<'a> {
    source: &'a str,
}

/// Pending work for the explicit-stack lowering
enum Task<'t> {
    /// Lower `node` and push exactly one finished node
    Lower(Node<'t>, usize),
    /// Pop the last `arity` finished nodes and build `node` from them
    Assemble(Node<'t>, Shape, usize),
}

/// How an interior node is rebuilt from its lowered children
enum Shape {
    /// `[left, right]`
    Binary(String),
    /// `[left, right]`
    Assignment(String),
    /// `[callee, arguments...]`
    Call,
    /// `[callee, arguments...]`
    New,
    /// `[tag, expressions...]`; span and raw chunks of the template
    TaggedTemplate(Span, Vec<TemplateElement>),
    /// `[expressions...]`
    Template(Vec<TemplateElement>),
    /// `[object, property]`
    Member { computed: bool },
    /// `[id, init?]`
    Declarator,
    /// One entry per property; `true` marks a shorthand identifier
    Object(Vec<bool>),
    /// `[key, value]`
    Pair,
    Array,
    /// `[value?]`
    JsxAttribute(String),
    /// Children kept as-is under an `Other` node
    Other,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn span(node: Node) -> Span {
        Span::new(node.start_byte(), node.end_byte())
    }

    /// Lower the whole tree without native recursion.
    ///
    /// `depth` follows the lowered tree (parentheses add no level). Nodes
    /// deeper than [`MAX_LOWERING_DEPTH`] are kept as childless `Other` nodes.
    fn lower_tree<'t>(&self, root: Node<'t>) -> SyntaxNode {
        let mut tasks = vec![Task::Lower(root, 0)];
        let mut finished: Vec<SyntaxNode> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Lower(node, depth) => self.schedule(node, depth, &mut tasks, &mut finished),
                Task::Assemble(node, shape, arity) => {
                    let children = finished.split_off(finished.len().saturating_sub(arity));
                    finished.push(self.assemble(node, shape, children));
                }
            }
        }

        finished
            .pop()
            .unwrap_or_else(|| self.other(root, Vec::new()))
    }

    /// Finish a leaf right away, or queue the children of an interior node
    fn schedule<'t>(
        &self,
        node: Node<'t>,
        depth: usize,
        tasks: &mut Vec<Task<'t>>,
        finished: &mut Vec<SyntaxNode>,
    ) {
        if depth > MAX_LOWERING_DEPTH {
            finished.push(self.other(node, Vec::new()));
            return;
        }

        if node.kind() == "parenthesized_expression" {
            match named_children(node).into_iter().next() {
                Some(inner) => tasks.push(Task::Lower(inner, depth)),
                None => finished.push(self.other(node, Vec::new())),
            }
            return;
        }

        if let Some(leaf) = self.leaf(node) {
            finished.push(SyntaxNode::new(Self::span(node), leaf));
            return;
        }

        let (shape, children) = self.plan(node, depth);
        tasks.push(Task::Assemble(node, shape, children.len()));
        for (child, child_depth) in children.into_iter().rev() {
            tasks.push(Task::Lower(child, child_depth));
        }
    }

    fn leaf(&self, node: Node) -> Option<NodeKind> {
        let kind = match node.kind() {
            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "private_property_identifier"
            | "statement_identifier"
            | "undefined" => NodeKind::Identifier {
                name: self.text(node).to_string(),
            },
            "string" => NodeKind::Literal {
                value: LiteralValue::String(self.cook_string(node)),
            },
            "number" => NodeKind::Literal {
                value: LiteralValue::Number(parse_number(self.text(node))),
            },
            "true" => NodeKind::Literal {
                value: LiteralValue::Boolean(true),
            },
            "false" => NodeKind::Literal {
                value: LiteralValue::Boolean(false),
            },
            "null" => NodeKind::Literal {
                value: LiteralValue::Null,
            },
            "regex" => NodeKind::Literal {
                value: LiteralValue::Regex(self.text(node).to_string()),
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Pick the shape of an interior node and the children it is built from
    fn plan<'t>(&self, node: Node<'t>, depth: usize) -> (Shape, Vec<(Node<'t>, usize)>) {
        let d = depth + 1;
        let field = |name: &str| node.child_by_field_name(name);
        let kind = node.kind();

        match kind {
            "template_string" => {
                let (quasis, expressions) = self.split_template(node);
                let children = expressions.into_iter().map(|e| (e, d)).collect();
                (Shape::Template(quasis), children)
            }
            "binary_expression" => match (field("left"), field("right")) {
                (Some(left), Some(right)) => {
                    (Shape::Binary(self.operator(node)), vec![(left, d), (right, d)])
                }
                _ => self.plan_other(node, depth),
            },
            "assignment_expression" | "augmented_assignment_expression" => {
                match (field("left"), field("right")) {
                    (Some(left), Some(right)) => {
                        let operator = if kind == "assignment_expression" {
                            "=".to_string()
                        } else {
                            self.operator(node)
                        };
                        (Shape::Assignment(operator), vec![(left, d), (right, d)])
                    }
                    _ => self.plan_other(node, depth),
                }
            }
            "call_expression" => match (field("function"), field("arguments")) {
                (Some(tag), Some(args)) if args.kind() == "template_string" => {
                    let (quasis, expressions) = self.split_template(args);
                    let mut children = vec![(tag, d)];
                    children.extend(expressions.into_iter().map(|e| (e, d + 1)));
                    (Shape::TaggedTemplate(Self::span(args), quasis), children)
                }
                (Some(callee), args) => {
                    let mut children = vec![(callee, d)];
                    if let Some(args) = args {
                        children.extend(named_children(args).into_iter().map(|a| (a, d)));
                    }
                    (Shape::Call, children)
                }
                (None, _) => self.plan_other(node, depth),
            },
            "new_expression" => match field("constructor") {
                Some(callee) => {
                    let mut children = vec![(callee, d)];
                    if let Some(args) = field("arguments") {
                        children.extend(named_children(args).into_iter().map(|a| (a, d)));
                    }
                    (Shape::New, children)
                }
                None => self.plan_other(node, depth),
            },
            "member_expression" | "subscript_expression" => {
                let computed = kind == "subscript_expression";
                let property = if computed {
                    field("index")
                } else {
                    field("property")
                };
                match (field("object"), property) {
                    (Some(object), Some(property)) => {
                        (Shape::Member { computed }, vec![(object, d), (property, d)])
                    }
                    _ => self.plan_other(node, depth),
                }
            }
            "variable_declarator" => match field("name") {
                Some(id) => {
                    let mut children = vec![(id, d)];
                    if let Some(init) = field("value") {
                        children.push((init, d));
                    }
                    (Shape::Declarator, children)
                }
                None => self.plan_other(node, depth),
            },
            "object" => {
                let properties = named_children(node);
                let shorthand: Vec<bool> = properties
                    .iter()
                    .map(|p| p.kind() == "shorthand_property_identifier")
                    .collect();
                let children = properties
                    .into_iter()
                    .zip(&shorthand)
                    .map(|(p, short)| (p, if *short { d + 1 } else { d }))
                    .collect();
                (Shape::Object(shorthand), children)
            }
            "pair" => match (field("key"), field("value")) {
                (Some(key), Some(value)) => (Shape::Pair, vec![(key, d), (value, d)]),
                _ => self.plan_other(node, depth),
            },
            "array" => {
                let elements = named_children(node).into_iter().map(|e| (e, d)).collect();
                (Shape::Array, elements)
            }
            "jsx_attribute" => {
                let mut named = named_children(node).into_iter();
                match named.next() {
                    Some(name) => (
                        Shape::JsxAttribute(self.text(name).to_string()),
                        named.next().map(|value| (value, d)).into_iter().collect(),
                    ),
                    None => self.plan_other(node, depth),
                }
            }
            _ => self.plan_other(node, depth),
        }
    }

    fn plan_other<'t>(&self, node: Node<'t>, depth: usize) -> (Shape, Vec<(Node<'t>, usize)>) {
        let children = named_children(node)
            .into_iter()
            .map(|c| (c, depth + 1))
            .collect();
        (Shape::Other, children)
    }

    fn assemble(&self, node: Node, shape: Shape, children: Vec<SyntaxNode>) -> SyntaxNode {
        if let Shape::Other = shape {
            return self.other(node, children);
        }
        match build(shape, children) {
            Some(kind) => SyntaxNode::new(Self::span(node), kind),
            None => self.other(node, Vec::new()),
        }
    }

    fn operator(&self, node: Node) -> String {
        node.child_by_field_name("operator")
            .map(|op| self.text(op).to_string())
            .unwrap_or_default()
    }

    fn other(&self, node: Node, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(
            Self::span(node),
            NodeKind::Other {
                kind: node.kind().to_string(),
                children,
            },
        )
    }

    /// Split a `template_string` into raw chunks and the `${...}` expressions
    fn split_template<'t>(&self, node: Node<'t>) -> (Vec<TemplateElement>, Vec<Node<'t>>) {
        let content_start = (node.start_byte() + 1).min(node.end_byte());
        let content_end = node.end_byte().saturating_sub(1).max(content_start);

        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut chunk_start = content_start;

        for child in named_children(node) {
            if child.kind() != "template_substitution" {
                continue;
            }
            quasis.push(self.template_element(chunk_start, child.start_byte()));
            if let Some(expr) = named_children(child).into_iter().next() {
                expressions.push(expr);
            }
            chunk_start = child.end_byte();
        }
        quasis.push(self.template_element(chunk_start, content_end));

        (quasis, expressions)
    }

    fn template_element(&self, start: usize, end: usize) -> TemplateElement {
        let span = Span::new(start, end.max(start));
        TemplateElement {
            span,
            raw: span.text(self.source).to_string(),
        }
    }

    /// Runtime value of a string literal
    fn cook_string(&self, node: Node) -> String {
        if node.named_child_count() == 0 {
            let text = self.text(node);
            let mut chars = text.chars();
            chars.next();
            chars.next_back();
            return chars.as_str().to_string();
        }

        let mut value = String::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "escape_sequence" => value.push_str(&unescape(self.text(child))),
                _ => value.push_str(self.text(child)),
            }
        }
        value
    }
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "comment" | "html_comment")
}

/// Named children in source order, comments skipped
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !is_comment(c.kind()))
        .collect()
}

/// Rebuild an interior node from children queued by `Lowerer::plan`
fn build(shape: Shape, children: Vec<SyntaxNode>) -> Option<NodeKind> {
    let mut children = children.into_iter();

    let kind = match shape {
        Shape::Binary(operator) => NodeKind::Binary {
            operator,
            left: take(&mut children)?,
            right: take(&mut children)?,
        },
        Shape::Assignment(operator) => NodeKind::Assignment {
            operator,
            left: take(&mut children)?,
            right: take(&mut children)?,
        },
        Shape::Member { computed } => NodeKind::Member {
            object: take(&mut children)?,
            property: take(&mut children)?,
            computed,
        },
        Shape::Declarator => NodeKind::VariableDeclarator {
            id: take(&mut children)?,
            init: take(&mut children),
        },
        Shape::Pair => NodeKind::Property {
            key: take(&mut children)?,
            value: take(&mut children)?,
            shorthand: false,
        },
        Shape::JsxAttribute(name) => NodeKind::JsxAttribute {
            name,
            value: take(&mut children),
        },
        Shape::Call => NodeKind::Call {
            callee: take(&mut children)?,
            arguments: children.collect(),
        },
        Shape::New => NodeKind::New {
            callee: take(&mut children)?,
            arguments: children.collect(),
        },
        Shape::TaggedTemplate(span, quasis) => {
            let tag = take(&mut children)?;
            let quasi = SyntaxNode::new(
                span,
                NodeKind::TemplateLiteral {
                    quasis,
                    expressions: children.collect(),
                },
            );
            NodeKind::TaggedTemplate {
                tag,
                quasi: Box::new(quasi),
            }
        }
        Shape::Template(quasis) => NodeKind::TemplateLiteral {
            quasis,
            expressions: children.collect(),
        },
        Shape::Array => NodeKind::Array {
            elements: children.collect(),
        },
        Shape::Object(shorthand) => NodeKind::Object {
            properties: children
                .zip(shorthand)
                .map(|(child, short)| {
                    if short {
                        SyntaxNode::new(
                            child.span,
                            NodeKind::Property {
                                key: Box::new(child.clone()),
                                value: Box::new(child),
                                shorthand: true,
                            },
                        )
                    } else {
                        child
                    }
                })
                .collect(),
        },
        Shape::Other => return None,
    };
    Some(kind)
}

fn take(children: &mut impl Iterator<Item = SyntaxNode>) -> Option<Box<SyntaxNode>> {
    children.next().map(Box::new)
}

/// Decode a single escape sequence such as `\n`, `\x41`, `\u00e9` or `\u{1F600}`
pub(crate) fn unescape(seq: &str) -> String {
    let mut chars = seq.chars();
    if chars.next() != Some('\\') {
        return seq.to_string();
    }
    let Some(kind) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();

    let from_hex = |hex: &str| {
        u32::from_str_radix(hex, 16)
            .ok()
            .map(|code| char::from_u32(code).unwrap_or('\u{FFFD}').to_string())
    };

    match kind {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        'b' => "\u{8}".to_string(),
        'f' => "\u{c}".to_string(),
        'v' => "\u{b}".to_string(),
        '0' if rest.is_empty() => "\0".to_string(),
        'x' => from_hex(rest).unwrap_or_else(|| seq.to_string()),
        'u' => {
            let hex = rest.trim_start_matches('{').trim_end_matches('}');
            from_hex(hex).unwrap_or_else(|| seq.to_string())
        }
        // Line continuation
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => String::new(),
        other => format!("{}{}", other, rest),
    }
}

/// Numeric value of a JS number literal (`1_000`, `0xff`, `10n`, `1e3`)
fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches('n');
    let lower = cleaned.to_ascii_lowercase();

    let parse_radix = |digits: &str, radix: u32| {
        u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN)
    };

    if let Some(hex) = lower.strip_prefix("0x") {
        parse_radix(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        parse_radix(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        parse_radix(bin, 2)
    } else {
        lower.parse::<f64>().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_simple_sequences() {
        assert_eq!(unescape(r"\n"), "\n");
        assert_eq!(unescape(r"\/"), "/");
        assert_eq!(unescape(r"\'"), "'");
        assert_eq!(unescape(r"\x41"), "A");
        assert_eq!(unescape(r"\u00e9"), "é");
        assert_eq!(unescape(r"\u{1F600}"), "😀");
        assert_eq!(unescape("\\\n"), "");
    }

    #[test]
    fn number_literals() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("1_000"), 1000.0);
        assert_eq!(parse_number("0xff"), 255.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("10n"), 10.0);
        assert_eq!(parse_number("1.5e3"), 1500.0);
    }
}
