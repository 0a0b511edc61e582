//! Parser modules

pub mod python;

pub use python::{parse_code, parse_source};
