//! Call-shape patterns for legacy assertion helpers.
//!
//! A pattern recognises `name(arg, ...)` where `name` is a bare identifier, and binds the arguments it
//! understands to [`Slot`]s. Matching never modifies the tree; a [`MatchResult`] borrows from the call it
//! was produced for.

use std::collections::HashMap;

use crate::errors::Skip;
use crate::ir::node::Node;

/// Logical operand positions of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// First operand, `a` in templates.
    Lhs,
    /// Second operand, `b` in templates.
    Rhs,
    /// Tolerance, `delta` in templates.
    Delta,
    /// Assertion message.
    Msg,
    /// Raw third argument of the tolerance family, before dispatch.
    Third,
    /// Raw fourth argument of the tolerance family, before dispatch.
    Fourth,
}

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// `f(x)` or `f(x, msg)`.
    One,
    /// `f(a, b)` or `f(a, b, msg)`.
    Two,
    /// `f(a, b)`, `f(a, b, third)` or `f(a, b, third, fourth)`.
    Almost,
}

/// One argument of a call, split into its optional keyword and its value.
#[derive(Debug, Clone, Copy)]
pub struct Argument<'t> {
    /// Keyword name for `name=value` arguments.
    pub keyword: Option<&'t str>,
    /// The value expression. For keyword arguments this excludes `name=`.
    pub value: &'t Node,
    /// The whole argument node as it appears in the argument list.
    pub node: &'t Node,
}

impl<'t> Argument<'t> {
    fn from_node(node: &'t Node) -> Self {
        if node.kind() == "keyword_argument" {
            let children = node.children();
            let keyword = children.first().and_then(Node::as_leaf).map(|leaf| leaf.text.as_str());
            if let (Some(keyword), Some(value)) = (keyword, children.get(2)) {
                return Argument { keyword: Some(keyword), value, node };
            }
        }
        Argument { keyword: None, value: node, node }
    }

    pub fn is_positional(&self) -> bool {
        self.keyword.is_none() && !is_splat(self.node)
    }

    /// A positional value or a `msg=` keyword: both fill the message slot.
    fn is_message(&self) -> bool {
        self.is_positional() || self.keyword == Some("msg")
    }
}

fn is_splat(node: &Node) -> bool {
    node.kind().ends_with("splat")
}

/// Operands bound by a successful match.
#[derive(Debug, Clone)]
pub struct MatchResult<'t> {
    slots: HashMap<Slot, &'t Node>,
    third: Option<Argument<'t>>,
    fourth: Option<Argument<'t>>,
    /// Every argument of the call, in order.
    pub arguments: Vec<Argument<'t>>,
}

impl<'t> MatchResult<'t> {
    pub fn get(&self, slot: Slot) -> Option<&'t Node> {
        match slot {
            Slot::Third => self.third.map(|arg| arg.node),
            Slot::Fourth => self.fourth.map(|arg| arg.node),
            _ => self.slots.get(&slot).copied(),
        }
    }

    /// The raw third and fourth arguments, for tolerance dispatch.
    pub fn optional_arguments(&self) -> (Option<Argument<'t>>, Option<Argument<'t>>) {
        (self.third, self.fourth)
    }
}

/// A declarative call shape: function name plus arity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPattern {
    pub name: &'static str,
    pub arity: Arity,
}

impl CallPattern {
    pub const fn new(name: &'static str, arity: Arity) -> Self {
        CallPattern { name, arity }
    }

    /// Matches a `call` node against this pattern.
    ///
    /// # Returns
    /// The bound operands, or [`Skip::NoMatch`] if the call has another name, another number of
    /// arguments, keyword arguments in operand positions, an unsupported keyword in the message
    /// position, or argument splats.
    pub fn match_call<'t>(&self, call: &'t Node) -> Result<MatchResult<'t>, Skip> {
        if call_name(call) != Some(self.name) {
            return Err(Skip::NoMatch);
        }
        let arguments = call_arguments(call).ok_or(Skip::NoMatch)?;
        let mut result = MatchResult { slots: HashMap::new(), third: None, fourth: None, arguments };
        if result.arguments.iter().any(|arg| is_splat(arg.node)) {
            return Err(Skip::NoMatch);
        }

        let operands = match self.arity {
            Arity::One => 1,
            _ => 2,
        };
        let max = match self.arity {
            Arity::Almost => 4,
            _ => operands + 1,
        };
        let count = result.arguments.len();
        if count < operands || count > max {
            return Err(Skip::NoMatch);
        }
        for (slot, arg) in [Slot::Lhs, Slot::Rhs].into_iter().zip(&result.arguments[..operands]) {
            if !arg.is_positional() {
                return Err(Skip::NoMatch);
            }
            result.slots.insert(slot, arg.value);
        }

        let rest = &result.arguments[operands..];
        if self.arity == Arity::Almost {
            result.third = rest.first().copied();
            result.fourth = rest.get(1).copied();
        } else if let Some(msg) = rest.first() {
            if !msg.is_message() {
                return Err(Skip::NoMatch);
            }
            result.slots.insert(Slot::Msg, msg.value);
        }
        Ok(result)
    }
}

/// The function name of a call whose target is a bare identifier.
pub fn call_name(call: &Node) -> Option<&str> {
    if call.kind() != "call" {
        return None;
    }
    call.children()
        .first()
        .and_then(Node::as_leaf)
        .filter(|leaf| leaf.kind == "identifier")
        .map(|leaf| leaf.text.as_str())
}

/// Splits the arguments of a call. A lone generator expression counts as one positional argument.
fn call_arguments(call: &Node) -> Option<Vec<Argument<'_>>> {
    let args = call.children().get(1)?;
    match args.kind() {
        "argument_list" => Some(
            args.children()
                .iter()
                .filter(|child| !child.is_leaf() || !matches!(child.kind(), "(" | ")" | ","))
                .map(Argument::from_node)
                .collect(),
        ),
        "generator_expression" => Some(vec![Argument::from_node(args)]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_source;

    /// Parses a single call statement and returns the call node.
    fn call(code: &str) -> Node {
        let module = parse_source(&format!("{code}\n")).expect("valid python");
        module.get(&[0, 0]).cloned().expect("call expression")
    }

    #[test]
    fn test_two_args_with_positional_message() {
        let node = call("assert_equal(x, y + 1, 'boom')");
        let result = CallPattern::new("assert_equal", Arity::Two).match_call(&node).expect("match");
        assert_eq!(result.get(Slot::Lhs).map(Node::render).as_deref(), Some("x"));
        assert_eq!(result.get(Slot::Rhs).map(Node::render).as_deref(), Some(" y + 1"));
        assert_eq!(result.get(Slot::Msg).map(Node::render).as_deref(), Some(" 'boom'"));
    }

    #[test]
    fn test_keyword_message_is_unwrapped() {
        let node = call("assert_true(x, msg='boom')");
        let result = CallPattern::new("assert_true", Arity::One).match_call(&node).expect("match");
        assert_eq!(result.get(Slot::Msg).map(Node::render).as_deref(), Some("'boom'"));
    }

    #[test]
    fn test_trailing_comma_accepted() {
        let node = call("assert_equal(x, y,)");
        assert!(CallPattern::new("assert_equal", Arity::Two).match_call(&node).is_ok());
    }

    #[test]
    fn test_rejections() {
        let pattern = CallPattern::new("assert_equal", Arity::Two);
        for code in [
            "assert_equal(x)",
            "assert_equal(x, y, z, w)",
            "assert_equal(x, b=y)",
            "assert_equal(x, y, note='boom')",
            "assert_equal(*args)",
            "assert_equal(x, **kw)",
            "assert_not_equal(x, y)",
            "tools.assert_equal(x, y)",
        ] {
            let node = call(code);
            assert_eq!(pattern.match_call(&node).err(), Some(Skip::NoMatch), "{code}");
        }
    }

    #[test]
    fn test_almost_captures_raw_optional_args() {
        let node = call("assert_almost_equal(x, y, delta=0.1, msg='m')");
        let result = CallPattern::new("assert_almost_equal", Arity::Almost).match_call(&node).expect("match");
        let (third, fourth) = result.optional_arguments();
        assert_eq!(third.and_then(|arg| arg.keyword), Some("delta"));
        assert_eq!(fourth.and_then(|arg| arg.keyword), Some("msg"));
        assert_eq!(result.get(Slot::Third).map(Node::render).as_deref(), Some(" delta=0.1"));
    }

    #[test]
    fn test_generator_argument() {
        let node = call("assert_true(x for x in y)");
        let result = CallPattern::new("assert_true", Arity::One).match_call(&node).expect("match");
        assert_eq!(result.get(Slot::Lhs).map(Node::kind), Some("generator_expression"));
    }
}
