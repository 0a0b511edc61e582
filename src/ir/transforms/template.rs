//! Destination templates
//!
//! A template is the replacement assertion, written as Python source with placeholder names (`a`, `b`,
//! `delta`) and parsed once. Placeholder locations are computed from the parsed tree instead of being
//! written down by hand, so the addresses always agree with the parser's shape of the expression.

use crate::errors::ConvertError;
use crate::ir::node::Node;
use crate::parsers::parse_source;
use super::patterns::Slot;
use super::precedence::{Precedence, top_level_class};

/// Where a placeholder sits inside the template's test expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAddress {
    pub slot: Slot,
    /// Child-index path from the test expression; empty for the whole expression.
    pub path: Vec<usize>,
    /// Operator context of the placeholder, `None` when it sits inside brackets.
    pub context: Option<Precedence>,
}

/// A parsed replacement `assert` statement plus its slot address table.
#[derive(Debug, Clone)]
pub struct Template {
    source: &'static str,
    statement: Node,
    slots: Vec<SlotAddress>,
}

/// Index of the test expression among the children of an `assert_statement`.
pub const TEST_INDEX: usize = 1;

impl Template {
    /// Parses `assert <expr>` and locates the placeholders.
    ///
    /// # Errors
    /// [`ConvertError::Template`] if `expr` does not parse to a single assert statement without message,
    /// or a placeholder occurs more than once.
    pub fn parse(expr: &'static str) -> Result<Self, ConvertError> {
        let module = parse_source(&format!("assert {expr}"))
            .map_err(|err| ConvertError::template(expr, err.to_string()))?;
        let statement = match module.children() {
            [statement, _end] if statement.kind() == "assert_statement" => statement.clone(),
            _ => return Err(ConvertError::template(expr, "expected a single assert statement")),
        };
        if statement.children().len() != TEST_INDEX + 1 {
            return Err(ConvertError::template(expr, "template must not carry a message"));
        }

        let mut slots = Vec::new();
        let mut path = Vec::new();
        collect_placeholders(&statement.children()[TEST_INDEX], None, &mut path, &mut slots);
        for (i, address) in slots.iter().enumerate() {
            if slots[..i].iter().any(|other| other.slot == address.slot) {
                return Err(ConvertError::template(expr, format!("placeholder {:?} occurs twice", address.slot)));
            }
        }
        Ok(Template { source: expr, statement, slots })
    }

    /// A fresh, independent copy of the `assert_statement`.
    pub fn instantiate(&self) -> Node {
        self.statement.clone()
    }

    pub fn slots(&self) -> &[SlotAddress] {
        &self.slots
    }

    pub fn address(&self, slot: Slot) -> Option<&SlotAddress> {
        self.slots.iter().find(|address| address.slot == slot)
    }

    pub fn source(&self) -> &'static str {
        self.source
    }
}

fn placeholder_slot(node: &Node) -> Option<Slot> {
    let leaf = node.as_leaf().filter(|leaf| leaf.kind == "identifier")?;
    match leaf.text.as_str() {
        "a" => Some(Slot::Lhs),
        "b" => Some(Slot::Rhs),
        "delta" => Some(Slot::Delta),
        _ => None,
    }
}

fn collect_placeholders(
    node: &Node,
    parent: Option<(&Node, usize)>,
    path: &mut Vec<usize>,
    slots: &mut Vec<SlotAddress>,
) {
    if let Some(slot) = placeholder_slot(node) {
        slots.push(SlotAddress { slot, path: path.clone(), context: slot_context(parent) });
        return;
    }
    for (index, child) in node.children().iter().enumerate() {
        path.push(index);
        collect_placeholders(child, Some((node, index)), path, slots);
        path.pop();
    }
}

/// Operator context of a placeholder from its parent node and its index in the parent.
fn slot_context(parent: Option<(&Node, usize)>) -> Option<Precedence> {
    let Some((parent, index)) = parent else {
        // The whole test expression: only `:=` is invalid there.
        return Some(Precedence::Assignment);
    };
    match parent.kind() {
        "comparison_operator" => Some(Precedence::Comparison),
        "binary_operator" => Some(top_level_class(parent)),
        "unary_operator" => Some(Precedence::Atom),
        "not_operator" | "boolean_operator" => Some(Precedence::Boolean),
        "attribute" | "subscript" | "call" if index == 0 => Some(Precedence::Atom),
        _ => None,
    }
}
