//! Per-call-site conversion.
//!
//! [`convert`] turns one `expression_statement` holding a legacy call into an `assert_statement`. The
//! input is never modified: on [`Skip`] the caller keeps the original statement untouched.

use tracing::trace;

use crate::config::PlacesPolicy;
use crate::errors::Skip;
use crate::ir::node::{Leaf, Node, PARENTHESIZED};
use super::almost::{dispatch, tolerance_node};
use super::patterns::{Arity, Slot};
use super::precedence::{Precedence, contains_newline, requires_parens};
use super::recipes::Recipe;
use super::template::TEST_INDEX;

/// The call of a statement that consists of a single bare call expression.
///
/// Calls in any other position (`x = f(...)`, `return f(...)`, arguments) are never candidates: an
/// `assert` statement can only replace a whole statement.
pub fn bare_call(statement: &Node) -> Option<&Node> {
    match statement.children() {
        [call] if statement.kind() == "expression_statement" && call.kind() == "call" => Some(call),
        _ => None,
    }
}

/// Converts one statement with `recipe`.
///
/// # Arguments
/// * `statement` - An `expression_statement` whose only child is the legacy call
/// * `recipe` - The recipe registered for the call's function name
/// * `places` - Handling of rounding-precision arguments in the tolerance family
///
/// # Returns
/// A new `assert_statement` carrying the statement's prefix, or the reason the call was left alone.
pub fn convert(statement: &Node, recipe: &Recipe, places: PlacesPolicy) -> Result<Node, Skip> {
    let call = bare_call(statement).ok_or(Skip::NoMatch)?;
    let matched = recipe.pattern.match_call(call)?;

    let mut operands: Vec<(Slot, Node)> = [Slot::Lhs, Slot::Rhs]
        .into_iter()
        .filter_map(|slot| matched.get(slot).map(|node| (slot, node.clone())))
        .collect();
    let msg = if recipe.arity() == Arity::Almost {
        let (third, fourth) = matched.optional_arguments();
        let resolved = dispatch(third, fourth)?;
        operands.push((Slot::Delta, tolerance_node(resolved.tolerance, places)?));
        resolved.msg
    } else {
        matched.get(Slot::Msg)
    };

    let mut assertion = recipe.template.instantiate();
    for address in recipe.template.slots() {
        let index = operands
            .iter()
            .position(|(slot, _)| *slot == address.slot)
            .ok_or(Skip::NoMatch)?;
        let (_, operand) = operands.swap_remove(index);

        let mut path = Vec::with_capacity(address.path.len() + 1);
        path.push(TEST_INDEX);
        path.extend_from_slice(&address.path);
        let after_bracket = assertion.leaf_before(&path).is_some_and(Leaf::is_opening_bracket);
        let operand = place_operand(operand, address.context, after_bracket);
        assertion.replace(&path, operand).ok_or(Skip::NoMatch)?;
    }

    wrap_test(&mut assertion, dropped_comments(call));
    if let Some(msg) = msg {
        append_message(&mut assertion, msg);
    }
    assertion.set_prefix(statement.prefix());
    trace!("Converted {} into '{}'", recipe.name(), assertion.render().trim());
    Ok(assertion)
}

/// Spaces and brackets an operand for its position in the template.
fn place_operand(mut operand: Node, context: Option<Precedence>, after_bracket: bool) -> Node {
    let (multiline, empty) = (operand.prefix().contains('\n'), operand.prefix().is_empty());
    // A prefix holding a line break may carry a comment and is kept whole.
    if !multiline {
        if after_bracket {
            operand.set_prefix("");
        } else if empty {
            operand.set_prefix(" ");
        }
    }
    match context {
        Some(context) if requires_parens(&operand, context) => operand.parenthesize(),
        _ => operand,
    }
}

/// Comments attached to call tokens that have no counterpart in the assertion: the brackets and commas
/// of the argument list and the `name=` of keyword arguments.
fn dropped_comments(call: &Node) -> String {
    let mut comments = String::new();
    let Some(arguments) = call.children().get(1).filter(|node| node.kind() == "argument_list") else {
        return comments;
    };
    for child in arguments.children() {
        let dropped: &[Node] = match child {
            Node::Leaf(leaf) if matches!(leaf.kind, "(" | "," | ")") => std::slice::from_ref(child),
            Node::Branch(branch) if branch.kind == "keyword_argument" => {
                &branch.children[..branch.children.len().min(2)]
            }
            _ => &[],
        };
        for leaf in dropped.iter().filter_map(Node::as_leaf) {
            if leaf.prefix.contains('#') {
                comments.push_str(&leaf.prefix);
            }
        }
    }
    comments
}

fn wrap_in_parens(inner: Node, outer_prefix: &str, closing_prefix: String) -> Node {
    Node::branch(
        PARENTHESIZED,
        vec![
            Leaf::with_prefix("(", "(", outer_prefix).into(),
            inner,
            Leaf::with_prefix(")", ")", closing_prefix).into(),
        ],
    )
}

/// Brackets the test expression if it spans lines outside brackets or must carry dropped comments.
///
/// The part of the prefix before the first line break stays in front of the opening parenthesis; the
/// rest moves inside so every operand keeps its line.
fn wrap_test(assertion: &mut Node, closing_prefix: String) {
    let Some(children) = assertion.children_mut().filter(|children| children.len() > TEST_INDEX) else {
        return;
    };
    if closing_prefix.is_empty() && !contains_newline(&children[TEST_INDEX]) {
        return;
    }
    let mut test = children.remove(TEST_INDEX);
    let prefix = test.prefix().to_string();
    let (outer, inner) = match prefix.split_once('\n') {
        Some((head, tail)) if head.trim().is_empty() => (or_space(head), format!("\n{tail}")),
        // A comment or continuation before the break moves inside with everything after it.
        Some(_) => (" ".to_string(), prefix.clone()),
        None => (or_space(&prefix), String::new()),
    };
    test.set_prefix(inner);
    children.insert(TEST_INDEX, wrap_in_parens(test, &outer, closing_prefix));
}

fn or_space(prefix: &str) -> String {
    if prefix.is_empty() { " ".to_string() } else { prefix.to_string() }
}

/// Appends `, <msg>` to the assertion.
fn append_message(assertion: &mut Node, msg: &Node) {
    let mut msg = msg.clone();
    let keep_prefix = msg.prefix().contains('#') || msg.prefix().contains('\\');
    if !keep_prefix {
        msg.set_prefix("");
    }
    let msg = if keep_prefix || contains_newline(&msg) || requires_parens(&msg, Precedence::Assignment) {
        wrap_in_parens(msg, " ", String::new())
    } else {
        msg.set_prefix(" ");
        msg
    };
    if let Some(children) = assertion.children_mut() {
        children.push(Node::leaf(",", ","));
        children.push(msg);
    }
}
