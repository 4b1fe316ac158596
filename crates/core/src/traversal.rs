//! Depth-bounded pre-order walk over the syntax tree

use crate::syntax::SyntaxNode;

/// Visit `root` and its descendants in pre-order, calling `on_enter` on each
/// node before any of its children.
///
/// The root has depth 0. A node deeper than `max_depth` is skipped together
/// with its whole subtree; this is a cost bound, not an error. The walk keeps
/// an explicit stack, so `max_depth` never translates into native recursion.
pub fn traverse<'n, F>(root: &'n SyntaxNode, max_depth: usize, mut on_enter: F)
where
    F: FnMut(&'n SyntaxNode, usize),
{
    let mut stack: Vec<(&'n SyntaxNode, usize)> = vec![(root, 0)];
    let mut dropped = 0usize;

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            dropped += 1;
            continue;
        }

        on_enter(node, depth);

        // Reverse push keeps source order on pop
        for child in node.children().into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    if dropped > 0 {
        tracing::trace!(
            "traversal depth bound {} dropped {} subtree(s)",
            max_depth,
            dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{NodeKind, Span};

    fn leaf(name: &str, start: usize) -> SyntaxNode {
        SyntaxNode::new(
            Span::new(start, start + 1),
            NodeKind::Identifier {
                name: name.to_string(),
            },
        )
    }

    fn branch(kind: &str, start: usize, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(
            Span::new(start, start + 10),
            NodeKind::Other {
                kind: kind.to_string(),
                children,
            },
        )
    }

    fn sample() -> SyntaxNode {
        branch(
            "program",
            0,
            vec![
                branch("block", 1, vec![leaf("a", 2), leaf("b", 3)]),
                leaf("c", 4),
            ],
        )
    }

    fn names(root: &SyntaxNode, max_depth: usize) -> Vec<String> {
        let mut seen = Vec::new();
        traverse(root, max_depth, |node, _| {
            seen.push(node.type_name().to_string() + ":" + node.as_identifier().unwrap_or(""));
        });
        seen
    }

    #[test]
    fn visits_in_pre_order() {
        assert_eq!(
            names(&sample(), 100),
            vec!["program:", "block:", "Identifier:a", "Identifier:b", "Identifier:c"]
        );
    }

    #[test]
    fn depth_bound_drops_subtrees() {
        assert_eq!(names(&sample(), 1), vec!["program:", "block:", "Identifier:c"]);
        assert_eq!(names(&sample(), 0), vec!["program:"]);
    }

    #[test]
    fn reports_depth() {
        let root = sample();
        let mut depths = Vec::new();
        traverse(&root, 10, |_, depth| depths.push(depth));
        assert_eq!(depths, vec![0, 1, 2, 2, 1]);
    }
}
