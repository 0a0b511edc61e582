//! Helper functions for Python Tree-Sitter parsing
//!
//! This module provides utility functions used during the conversion to the lossless tree.

use tree_sitter::Node as TSNode;
use tracing::warn;

/// Safely slice the source by byte range, returning an empty string on invalid range
///
/// # Arguments
/// * `source` - The source code
/// * `start` - Starting byte offset
/// * `end` - Ending byte offset
///
/// # Returns
/// The sliced string, or empty string if the range is invalid
pub(crate) fn safe_byte_slice(source: &str, start: usize, end: usize) -> &str {
    match source.get(start..end) {
        Some(text) => text,
        None => {
            warn!("Invalid byte range {}-{} (source len={})", start, end, source.len());
            ""
        }
    }
}

/// Whether a node is trivia that belongs in the prefix of the next token rather than in the tree.
///
/// Comments and line continuations are extras in the Python grammar: they may appear between any two
/// tokens, exactly like whitespace.
pub(crate) fn is_trivia(node: TSNode) -> bool {
    node.is_extra() || matches!(node.kind(), "comment" | "line_continuation")
}

/// Whether a node is converted to a single leaf even though Tree-Sitter gives it children.
///
/// String literals (including f-strings with their interpolations) are opaque to every rewrite, and
/// keeping them whole preserves escape sequences and embedded newlines verbatim.
pub(crate) fn is_atomic(node: TSNode) -> bool {
    node.child_count() == 0 || node.kind() == "string"
}

/// Find the 1-based (line, column) of the first ERROR or MISSING node in document order
pub(crate) fn first_error_position(root: TSNode) -> (usize, usize) {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column + 1);
        }
        if node.has_error() {
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    let pos = root.start_position();
    (pos.row + 1, pos.column + 1)
}
