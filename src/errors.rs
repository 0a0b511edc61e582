//! Error types shared by the parser front end, the transform engine and the driver.
//!
//! Two levels are kept apart: [`Skip`] is a per-call-site outcome that never
//! leaves the call site, [`ConvertError`] is a per-file (or startup) failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort the conversion of a whole file, or the construction of the recipe book.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to load the Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("the parser gave up without producing a tree")]
    ParserAborted,

    /// The source is not valid under the fixed grammar. Positions are 1-based.
    #[error("syntax error at line {line}, column {column}")]
    Parse { line: usize, column: usize },

    #[error("invalid template `{template}`: {reason}")]
    Template { template: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ConvertError {
    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        ConvertError::Template { template: template.to_string(), reason: reason.into() }
    }
}

/// Why a legacy call site was left unconverted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skip {
    /// The argument shape fits none of the recipe's variants.
    #[error("argument shape not supported")]
    NoMatch,
    /// An argument could be classified but has no faithful plain-assert rendition
    /// (a rounding precision under the default places policy).
    #[error("precision argument left for manual conversion")]
    AmbiguousArgument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reasons_render() {
        assert_eq!(Skip::NoMatch.to_string(), "argument shape not supported");
        assert_eq!(Skip::AmbiguousArgument.to_string(), "precision argument left for manual conversion");
        let err: &dyn std::error::Error = &Skip::NoMatch;
        assert!(err.source().is_none());
    }
}
