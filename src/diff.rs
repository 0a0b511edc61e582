//! Line diffs for previewing conversions.

use difference::{Changeset, Difference};

/// Renders a line diff of `original` against `converted`, with `path` in the header.
///
/// Unchanged lines are prefixed with a space, removed lines with `-` and added lines with `+`.
pub fn line_diff(path: &str, original: &str, converted: &str) -> String {
    let changeset = Changeset::new(original, converted, "\n");
    let mut out = format!("--- {path}\n+++ {path}\n");
    for diff in &changeset.diffs {
        let (marker, text) = match diff {
            Difference::Same(text) => (' ', text),
            Difference::Add(text) => ('+', text),
            Difference::Rem(text) => ('-', text),
        };
        for line in text.split('\n') {
            out.push(marker);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
