//! Operator precedence classification
//!
//! Decides whether an operand moved into a new operator context needs brackets, and whether an
//! expression spans lines outside of any bracket.

use crate::ir::node::Node;

/// Operator strength classes, weakest first.
///
/// Only the five classes that the conversion targets can produce are distinguished; every operator
/// stronger than `+` is an [`Precedence::Atom`] for the purpose of deciding brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// `:=`
    Assignment,
    /// `lambda`, `x if c else y`, `not`, `and`, `or`
    Boolean,
    /// `==`, `<`, `in`, `is`, ...
    Comparison,
    /// `+ - | ^ & << >>`
    Additive,
    /// Everything else, including bracketed groups.
    Atom,
}

/// Classifies the operator at the top of `node` alone, without looking at its children.
pub(crate) fn top_level_class(node: &Node) -> Precedence {
    match node.kind() {
        "named_expression" => Precedence::Assignment,
        "conditional_expression" | "lambda" | "not_operator" | "boolean_operator" => Precedence::Boolean,
        "comparison_operator" => Precedence::Comparison,
        "binary_operator" => match node.children().get(1).and_then(Node::as_leaf) {
            Some(op) if matches!(op.text.as_str(), "+" | "-" | "|" | "^" | "&" | "<<" | ">>") => {
                Precedence::Additive
            }
            _ => Precedence::Atom,
        },
        _ => Precedence::Atom,
    }
}

/// Children of a branch outside its own brackets. Opening brackets are included, everything after them
/// up to the matching closing bracket is not.
fn outside_brackets(children: &[Node]) -> impl Iterator<Item = &Node> {
    children
        .iter()
        .scan(0usize, |depth, child| {
            let outside = *depth == 0;
            if child.is_opening_bracket() {
                *depth += 1;
            } else if child.is_closing_bracket() {
                *depth = depth.saturating_sub(1);
            }
            Some(outside.then_some(child))
        })
        .flatten()
}

/// Finds the weakest operator in `node`, not looking inside bracketed groups.
///
/// `(a or b) * c`, `f(a or b)` and `x[a or b]` are all atoms while `x + y * z` is additive.
pub fn weakest_operator(node: &Node) -> Precedence {
    if node.is_leaf() {
        return Precedence::Atom;
    }
    outside_brackets(node.children())
        .filter(|child| !child.is_leaf())
        .map(weakest_operator)
        .fold(top_level_class(node), Precedence::min)
}

/// Whether `node` must be parenthesized when placed as an operand in `context`.
///
/// Equal precedence is never assumed safe: comparisons chain and unary minus would bind differently,
/// so `a == b` placed as a comparison operand becomes `(a == b)`.
pub fn requires_parens(node: &Node, context: Precedence) -> bool {
    !node.is_leaf() && weakest_operator(node) <= context
}

/// Whether rendering `node` produces a line break outside of any bracket.
///
/// Such an expression cannot be moved to the head of an `assert` statement without brackets, since the
/// statement would end at the first newline.
pub fn contains_newline(node: &Node) -> bool {
    match node {
        Node::Leaf(leaf) => leaf.prefix.contains('\n'),
        Node::Branch(branch) => outside_brackets(&branch.children).any(contains_newline),
    }
}
