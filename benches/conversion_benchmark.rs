//! Benchmarks for whole-source conversion
//!
//! Measures performance of:
//! - Tree-Sitter parse plus lossless tree conversion
//! - Rewriting of test modules with a growing number of legacy assertions
//! - Rendering a tree back to text

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use nose2pytest::{convert_source, parse_source, PlacesPolicy};

// ============================================================================
// Sample test modules for benchmarking
// ============================================================================

/// Small: one test function (~10 lines)
const PYTHON_SMALL: &str = r#"
from nose.tools import assert_equal, assert_true


def test_sum():
    total = sum([1, 2, 3])
    assert_equal(total, 6)
    assert_true(total > 0, "total must be positive")
"#;

/// Medium: a test class with mixed assertions (~40 lines)
const PYTHON_MEDIUM: &str = r#"
import collections
import re

from nose.tools import *


class TestInventory:
    def setup(self):
        self.items = {"apple": 3, "pear": 0}

    def test_counts(self):
        assert_equal(self.items["apple"], 3)
        assert_not_equal(self.items["pear"], 3, msg="pear count")
        assert_greater(self.items["apple"], self.items["pear"])
        assert_in("apple", self.items)
        assert_not_in("plum", self.items)

    def test_types(self):
        assert_is_instance(self.items, dict)
        assert_is_none(self.items.get("plum"))
        assert_is_not_none(self.items.get("apple"))

    def test_lists(self):
        assert_count_equal(list(self.items), ["pear", "apple"])
        assert_list_equal(sorted(self.items), ["apple",
                                               "pear"])
        assert_regex("apple pie", r"^apple")

    def test_numbers(self):
        assert_almost_equal(0.1 + 0.2, 0.3)
        assert_almost_equal(0.1 + 0.2, 0.3, delta=1e-9)
        assert_not_almost_equal(1.0, 1.1, delta=0.01, msg="too close")
        assert_almost_equal(1.0, 1.0001, places=3)
"#;

/// Generate a module with `count` test functions of a few assertions each
fn generate_test_module(count: usize) -> String {
    let mut code = String::from("from nose.tools import *\n\n");
    for i in 0..count {
        code.push_str(&format!(
            "\ndef test_case_{i}():\n    value = compute({i})\n    assert_equal(value, {i} * 2)\n    \
             assert_true(value >= 0 and value < 1000, 'range')\n    assert_in(value,\n              \
             range(1000))\n    ok_(value is not None)\n"
        ));
    }
    code
}

// ============================================================================
// Benchmark: Parsing
// ============================================================================

fn bench_parse_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_source");

    group.bench_function("small", |b| b.iter(|| black_box(parse_source(PYTHON_SMALL))));
    group.bench_function("medium", |b| b.iter(|| black_box(parse_source(PYTHON_MEDIUM))));

    group.finish();
}

// ============================================================================
// Benchmark: Conversion
// ============================================================================

fn bench_convert_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_source");

    group.bench_function("small", |b| {
        b.iter(|| black_box(convert_source(PYTHON_SMALL, PlacesPolicy::Skip)))
    });
    group.bench_function("medium", |b| {
        b.iter(|| black_box(convert_source(PYTHON_MEDIUM, PlacesPolicy::Tolerance)))
    });

    for count in [10, 100, 500].iter() {
        let code = generate_test_module(*count);
        group.bench_with_input(BenchmarkId::new("generated_module", count), &code, |b, code| {
            b.iter(|| black_box(convert_source(code, PlacesPolicy::Skip)))
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Rendering
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let code = generate_test_module(100);
    if let Ok(tree) = parse_source(&code) {
        group.bench_function("generated_module_100", |b| b.iter(|| black_box(tree.render())));
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2));
    targets =
        bench_parse_source,
        bench_convert_source,
        bench_render
}

criterion_main!(benches);
