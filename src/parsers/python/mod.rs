//! Python parsing: Tree-Sitter front end and conversion to the lossless tree.

pub mod conversion;
pub mod helpers;
pub mod parsing;

pub use parsing::{parse_code, parse_source};
