//! Tree-Sitter parsing interface for Python
//!
//! This module provides the public API for parsing Python code using Tree-Sitter
//! and converting the concrete syntax tree into our lossless [`Node`] tree.

use tree_sitter::{Parser, Tree};
use tracing::{debug, trace};

use crate::errors::ConvertError;
use crate::ir::node::Node;
use super::conversion::convert_ts_tree;
use super::helpers::first_error_position;

/// Parse Python code into a Tree-Sitter syntax tree
///
/// A fresh parser is created per call: `tree_sitter::Parser` is not `Sync`, and files are parsed on
/// whichever worker thread picks them up.
///
/// # Arguments
/// * `code` - The Python source code to parse
///
/// # Returns
/// The Tree-Sitter tree, or an error if the grammar cannot be loaded
pub fn parse_code(code: &str) -> Result<Tree, ConvertError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
    trace!("Parsing {} bytes of Python", code.len());
    parser.parse(code, None).ok_or(ConvertError::ParserAborted)
}

/// Parse Python code into a lossless [`Node`] tree
///
/// # Arguments
/// * `code` - The Python source code to parse
///
/// # Returns
/// The `module` node, whose rendering equals `code` byte for byte, or
/// [`ConvertError::Parse`] with the 1-based position of the first syntax error.
pub fn parse_source(code: &str) -> Result<Node, ConvertError> {
    let tree = parse_code(code)?;
    let root = tree.root_node();
    if root.has_error() {
        let (line, column) = first_error_position(root);
        debug!("Parse tree contains errors, first at {}:{}", line, column);
        return Err(ConvertError::Parse { line, column });
    }
    Ok(convert_ts_tree(&tree, code))
}
