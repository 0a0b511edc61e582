//! In-order statement traversal and the assertion rewriter built on it.
//!
//! The walker visits every statement of a module exactly once, in document order, while keeping track
//! of the line each node starts on. A visitor can replace an `expression_statement` in place; replaced
//! statements are not descended into.

use tracing::debug;

use crate::config::PlacesPolicy;
use crate::errors::{ConvertError, Skip};
use crate::ir::node::{Node, count_newlines};
use crate::ir::transforms::patterns::call_name;
use crate::ir::transforms::{RecipeBook, bare_call, convert};
use crate::parsers::parse_source;

/// What the walker does with a visited statement.
#[derive(Debug)]
pub enum Visit {
    /// Keep the statement and descend into it.
    Continue,
    /// Put this node in place of the statement.
    Replace(Node),
    /// Keep the statement as is without descending into it.
    Skip,
}

/// Callbacks of the statement walker.
pub trait StatementVisitor {
    /// Called for every `expression_statement`.
    ///
    /// # Arguments
    /// * `statement` - The statement, as it appears in the source
    /// * `line` - 1-based line on which the statement starts
    fn visit_statement(&mut self, statement: &Node, line: usize) -> Visit;

    /// Called for every `call` reached outside of replaced or skipped statements.
    fn visit_call(&mut self, _call: &Node, _line: usize) {}
}

/// Walks `root` in document order, applying `visitor` to every statement.
pub fn walk<V: StatementVisitor + ?Sized>(visitor: &mut V, root: &mut Node) {
    let mut walker = Walker { line: 1 };
    walker.walk(visitor, root);
}

struct Walker {
    /// Line on which the next unvisited byte sits.
    line: usize,
}

impl Walker {
    fn walk<V: StatementVisitor + ?Sized>(&mut self, visitor: &mut V, node: &mut Node) {
        match node {
            Node::Leaf(leaf) => {
                self.line += count_newlines(&leaf.prefix) + count_newlines(&leaf.text);
            }
            Node::Branch(branch) => {
                for child in branch.children.iter_mut() {
                    self.walk_child(visitor, child);
                }
            }
        }
    }

    fn walk_child<V: StatementVisitor + ?Sized>(&mut self, visitor: &mut V, child: &mut Node) {
        if !child.is_leaf() {
            let start = self.line + count_newlines(child.prefix());
            match child.kind() {
                "expression_statement" => match visitor.visit_statement(child, start) {
                    Visit::Continue => {}
                    Visit::Replace(replacement) => {
                        self.line += child.line_breaks();
                        *child = replacement;
                        return;
                    }
                    Visit::Skip => {
                        self.line += child.line_breaks();
                        return;
                    }
                },
                "call" => visitor.visit_call(child, start),
                _ => {}
            }
        }
        self.walk(visitor, child);
    }
}

/// A legacy call that was left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCall {
    pub name: String,
    /// 1-based line of the call.
    pub line: usize,
    pub reason: Skip,
}

/// Result of rewriting one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub converted: usize,
    pub skipped: Vec<SkippedCall>,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        self.converted > 0
    }
}

/// Replaces legacy assertion calls in statement position with `assert` statements.
#[derive(Debug, Clone, Copy)]
pub struct AssertRewriter<'b> {
    book: &'b RecipeBook,
    places: PlacesPolicy,
}

impl<'b> AssertRewriter<'b> {
    pub fn new(book: &'b RecipeBook, places: PlacesPolicy) -> Self {
        AssertRewriter { book, places }
    }

    /// Parses, rewrites and renders `source`.
    ///
    /// Text outside converted statements is reproduced byte for byte, so a source without legacy calls
    /// comes back unchanged.
    pub fn rewrite_source(&self, source: &str) -> Result<Rewrite, ConvertError> {
        let mut tree = parse_source(source)?;
        let (converted, skipped) = self.rewrite_tree(&mut tree);
        Ok(Rewrite { text: tree.render(), converted, skipped })
    }

    /// Rewrites `root` in place.
    ///
    /// # Returns
    /// The number of converted statements and the legacy calls left in place.
    pub fn rewrite_tree(&self, root: &mut Node) -> (usize, Vec<SkippedCall>) {
        let mut sites = SiteVisitor { rewriter: *self, converted: 0, skipped: Vec::new() };
        walk(&mut sites, root);
        (sites.converted, sites.skipped)
    }
}

struct SiteVisitor<'b> {
    rewriter: AssertRewriter<'b>,
    converted: usize,
    skipped: Vec<SkippedCall>,
}

impl SiteVisitor<'_> {
    fn skip(&mut self, name: &str, line: usize, reason: Skip) {
        debug!("Leaving {} at line {}: {}", name, line, reason);
        self.skipped.push(SkippedCall { name: name.to_string(), line, reason });
    }
}

impl StatementVisitor for SiteVisitor<'_> {
    fn visit_statement(&mut self, statement: &Node, line: usize) -> Visit {
        let Some(name) = bare_call(statement).and_then(call_name) else {
            return Visit::Continue;
        };
        let Some(recipe) = self.rewriter.book.get(name) else {
            return Visit::Continue;
        };
        match convert(statement, recipe, self.rewriter.places) {
            Ok(assertion) => {
                debug!("Converted {} at line {}", name, line);
                self.converted += 1;
                Visit::Replace(assertion)
            }
            Err(reason) => {
                self.skip(name, line, reason);
                Visit::Skip
            }
        }
    }

    fn visit_call(&mut self, call: &Node, line: usize) {
        let Some(recipe) = call_name(call).and_then(|name| self.rewriter.book.get(name)) else {
            return;
        };
        // Legacy calls outside statement position cannot become assertions, whatever their arguments.
        self.skip(recipe.name(), line, Skip::NoMatch);
    }
}
