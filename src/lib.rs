//! Rewrites nose assertion helper calls (`assert_equal(a, b)`, `assert_true(x)`, ...) into plain
//! `assert` statements, preserving the surrounding source text byte for byte.

pub mod config;
pub mod diff;
pub mod driver;
pub mod errors;
pub mod ir;
pub mod logging;
pub mod parsers;

pub use config::{ConvertOptions, PlacesPolicy};
pub use errors::{ConvertError, Skip};
pub use ir::node::Node;
pub use ir::transforms::RecipeBook;
pub use ir::visitor::{AssertRewriter, Rewrite, SkippedCall};
pub use parsers::parse_source;

/// Converts `source` with the standard recipe book.
///
/// # Returns
/// The converted text with conversion counts, or the parse error that prevented conversion.
pub fn convert_source(source: &str, places: PlacesPolicy) -> Result<Rewrite, ConvertError> {
    let book = RecipeBook::standard()?;
    AssertRewriter::new(book, places).rewrite_source(source)
}
