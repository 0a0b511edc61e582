//! Python Tree-Sitter CST to lossless tree conversion
//!
//! Tree-Sitter nodes only carry byte ranges. The conversion walks the tree in document order and
//! assigns every byte of the source to exactly one leaf: the token text itself, or the prefix of the
//! token that follows it. Whatever remains after the last token (final newline, trailing comments)
//! lands in the prefix of an [`END_MARKER`] leaf appended to the module.

use tree_sitter::{Node as TSNode, Tree};
use tracing::trace;

use crate::ir::node::{END_MARKER, Leaf, Node};
use super::helpers::{is_atomic, is_trivia, safe_byte_slice};

/// Converts a whole Tree-Sitter tree into a `module` node ending with an end marker.
pub(crate) fn convert_ts_tree(tree: &Tree, source: &str) -> Node {
    let mut converter = Converter { source, consumed: 0 };
    let ts_root = tree.root_node();
    let mut root = if ts_root.child_count() == 0 {
        Node::branch(ts_root.kind(), Vec::new())
    } else {
        converter.convert(ts_root)
    };
    let trailing = safe_byte_slice(source, converter.consumed, source.len());
    let marker = Node::Leaf(Leaf::with_prefix(END_MARKER, "", trailing));
    match root.children_mut() {
        Some(children) => children.push(marker),
        None => root = Node::branch("module", vec![root, marker]),
    }
    root
}

struct Converter<'s> {
    source: &'s str,
    /// Byte offset up to which the source has been assigned to leaves.
    consumed: usize,
}

impl Converter<'_> {
    fn convert(&mut self, ts_node: TSNode) -> Node {
        if is_atomic(ts_node) {
            return Node::Leaf(self.leaf(ts_node));
        }
        let mut children = Vec::with_capacity(ts_node.child_count());
        let mut cursor = ts_node.walk();
        for child in ts_node.children(&mut cursor) {
            if is_trivia(child) {
                continue;
            }
            // Zero-width tokens carry no text and would only split prefixes.
            if is_atomic(child) && child.start_byte() == child.end_byte() {
                continue;
            }
            children.push(self.convert(child));
        }
        trace!("Converted '{}' with {} children", ts_node.kind(), children.len());
        Node::branch(ts_node.kind(), children)
    }

    fn leaf(&mut self, ts_node: TSNode) -> Leaf {
        let start = ts_node.start_byte().max(self.consumed);
        let end = ts_node.end_byte().max(start);
        let prefix = safe_byte_slice(self.source, self.consumed, start);
        let text = safe_byte_slice(self.source, start, end);
        self.consumed = end;
        Leaf::with_prefix(ts_node.kind(), text, prefix)
    }
}

#[cfg(test)]
mod tests {
    use crate::parsers::python::parse_source;

    #[test]
    fn test_round_trip_with_comments_and_blank_lines() {
        let code = "# header\n\nimport os  # trailing\n\n\ndef f(x):\n    return x  \\\n        + 1\n";
        let tree = parse_source(code).expect("valid python");
        assert_eq!(tree.render(), code);
    }

    #[test]
    fn test_round_trip_empty_and_comment_only() {
        for code in ["", "\n", "# only a comment", "# c\n\n"] {
            let tree = parse_source(code).expect("valid python");
            assert_eq!(tree.render(), code);
        }
    }

    #[test]
    fn test_strings_are_single_leaves() {
        let code = "x = f\"a{b}\\n\" '''multi\nline'''\n";
        let tree = parse_source(code).expect("valid python");
        assert_eq!(tree.render(), code);
        assert!(tree.leaves().any(|leaf| leaf.kind == "string" && leaf.text == "f\"a{b}\\n\""));
        assert!(tree.leaves().any(|leaf| leaf.kind == "string" && leaf.text == "'''multi\nline'''"));
    }

    #[test]
    fn test_comments_become_prefix() {
        let code = "f(a,  # why\n  b)\n";
        let tree = parse_source(code).expect("valid python");
        let b = tree.leaves().find(|leaf| leaf.text == "b").expect("leaf b");
        assert_eq!(b.prefix, "  # why\n  ");
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_source("x = 1\ndef (:\n").unwrap_err();
        match err {
            crate::errors::ConvertError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
