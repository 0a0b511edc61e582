//! Tolerance family dispatch
//!
//! `assert_almost_equal(a, b, ...)` and its relatives accept a third and fourth argument that may be a
//! tolerance (`delta=`), a rounding precision (positional or `places=`) or the message (`msg=`, or
//! positional after a tolerance or precision). The dispatcher below walks those arguments through an
//! explicit state machine and either resolves the call or reports why it cannot be converted.

use tracing::trace;

use crate::config::PlacesPolicy;
use crate::errors::Skip;
use crate::ir::node::{Leaf, Node};
use super::patterns::Argument;

/// Tolerance used when neither `delta` nor `places` is given: the helpers default to 7 places.
pub const DEFAULT_TOLERANCE: &str = "1e-7";

/// How the bound of a tolerance assertion was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance<'t> {
    /// Neither `delta` nor `places` was given.
    Default,
    /// An absolute bound, used as is.
    Delta(&'t Node),
    /// A number of decimal places.
    Places(&'t Node),
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch<'t> {
    pub tolerance: Tolerance<'t>,
    pub msg: Option<&'t Node>,
}

#[derive(Debug)]
enum State<'t> {
    NeedThirdArg,
    HaveThirdArg(Argument<'t>),
    Tolerance(&'t Node),
    Precision(&'t Node),
    Message(&'t Node),
    /// The fourth argument must supply whichever of the bound and the message is still missing.
    NeedFourthArg { tolerance: Option<Tolerance<'t>>, msg: Option<&'t Node> },
    Resolved(Dispatch<'t>),
}

/// Classifies the optional arguments of a tolerance-family call.
///
/// # Returns
/// The bound and message, or [`Skip::NoMatch`] when an argument has an unsupported keyword or the two
/// optional arguments supply the same thing twice.
pub fn dispatch<'t>(third: Option<Argument<'t>>, fourth: Option<Argument<'t>>) -> Result<Dispatch<'t>, Skip> {
    let mut state = State::NeedThirdArg;
    loop {
        trace!("Tolerance dispatch state: {:?}", state);
        state = match state {
            State::NeedThirdArg => match third {
                None => State::Resolved(Dispatch { tolerance: Tolerance::Default, msg: None }),
                Some(arg) => State::HaveThirdArg(arg),
            },
            State::HaveThirdArg(arg) => match arg.keyword {
                None if arg.is_positional() => State::Precision(arg.value),
                Some("delta") => State::Tolerance(arg.value),
                Some("places") => State::Precision(arg.value),
                Some("msg") => State::Message(arg.value),
                _ => return Err(Skip::NoMatch),
            },
            State::Tolerance(value) => {
                State::NeedFourthArg { tolerance: Some(Tolerance::Delta(value)), msg: None }
            }
            State::Precision(value) => {
                State::NeedFourthArg { tolerance: Some(Tolerance::Places(value)), msg: None }
            }
            State::Message(value) => State::NeedFourthArg { tolerance: None, msg: Some(value) },
            State::NeedFourthArg { tolerance: Some(tolerance), msg } => match fourth {
                None => State::Resolved(Dispatch { tolerance, msg }),
                Some(arg) if arg.is_positional() || arg.keyword == Some("msg") => {
                    State::Resolved(Dispatch { tolerance, msg: Some(arg.value) })
                }
                Some(_) => return Err(Skip::NoMatch),
            },
            State::NeedFourthArg { tolerance: None, msg } => match fourth {
                None => State::Resolved(Dispatch { tolerance: Tolerance::Default, msg }),
                Some(arg) => match arg.keyword {
                    Some("delta") => State::Resolved(Dispatch { tolerance: Tolerance::Delta(arg.value), msg }),
                    Some("places") => State::Resolved(Dispatch { tolerance: Tolerance::Places(arg.value), msg }),
                    _ => return Err(Skip::NoMatch),
                },
            },
            State::Resolved(dispatch) => return Ok(dispatch),
        };
    }
}

/// Builds the expression that replaces `delta` in the template.
///
/// # Returns
/// A fresh node, or [`Skip::AmbiguousArgument`] for a precision under [`PlacesPolicy::Skip`].
pub fn tolerance_node(tolerance: Tolerance<'_>, policy: PlacesPolicy) -> Result<Node, Skip> {
    match tolerance {
        Tolerance::Default => Ok(Node::leaf("float", DEFAULT_TOLERANCE)),
        Tolerance::Delta(value) => Ok(value.clone()),
        Tolerance::Places(_) if policy == PlacesPolicy::Skip => Err(Skip::AmbiguousArgument),
        Tolerance::Places(value) => Ok(places_to_tolerance(value)),
    }
}

/// `7` becomes `1e-7`; any other expression `p` becomes `10 ** -(p)`.
fn places_to_tolerance(places: &Node) -> Node {
    if let Some(leaf) = places.as_leaf() {
        if leaf.kind == "integer" && !leaf.text.is_empty() && leaf.text.bytes().all(|b| b.is_ascii_digit()) {
            return Node::Leaf(Leaf::with_prefix("float", format!("1e-{}", leaf.text), leaf.prefix.clone()));
        }
    }
    let mut exponent = places.clone();
    let prefix = exponent.prefix().to_string();
    exponent.set_prefix("");
    let negated = Node::branch(
        "unary_operator",
        vec![Leaf::with_prefix("-", "-", " ").into(), exponent.parenthesize()],
    );
    Node::branch(
        "binary_operator",
        vec![Leaf::with_prefix("integer", "10", prefix).into(), Leaf::with_prefix("**", "**", " ").into(), negated],
    )
}
