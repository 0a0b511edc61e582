//! Shared helpers for the property-based tests.

pub mod ir;
