//! End-to-end conversion of whole sources through the standard recipe book.

use indoc::indoc;

use nose2pytest::{PlacesPolicy, Rewrite, Skip, SkippedCall, convert_source};

fn rewrite(source: &str) -> Rewrite {
    convert_source(source, PlacesPolicy::Skip).expect("valid python")
}

/// Converts a single statement and returns the text without its trailing newline.
fn conv(statement: &str) -> String {
    let rewrite = rewrite(&format!("{statement}\n"));
    assert_eq!(rewrite.converted, 1, "{statement} was not converted: {:?}", rewrite.skipped);
    rewrite.text.trim_end_matches('\n').to_string()
}

fn unchanged(source: &str, places: PlacesPolicy) -> Rewrite {
    let rewrite = convert_source(source, places).expect("valid python");
    assert_eq!(rewrite.text, source);
    assert!(!rewrite.changed());
    rewrite
}

#[test]
fn test_one_operand_recipes() {
    assert_eq!(conv("assert_true(x)"), "assert x");
    assert_eq!(conv("ok_(x)"), "assert x");
    assert_eq!(conv("assert_false(x)"), "assert not x");
    assert_eq!(conv("assert_is_none(x)"), "assert x is None");
    assert_eq!(conv("assert_is_not_none(x)"), "assert x is not None");
}

#[test]
fn test_comparison_recipes() {
    for name in [
        "assert_equal",
        "assert_equals",
        "eq_",
        "assert_list_equal",
        "assert_dict_equal",
        "assert_set_equal",
        "assert_sequence_equal",
        "assert_tuple_equal",
        "assert_multi_line_equal",
    ] {
        assert_eq!(conv(&format!("{name}(a, b)")), "assert a == b", "{name}");
    }
    assert_eq!(conv("assert_not_equal(a, b)"), "assert a != b");
    assert_eq!(conv("assert_not_equals(a, b)"), "assert a != b");
    assert_eq!(conv("assert_greater(a, b)"), "assert a > b");
    assert_eq!(conv("assert_greater_equal(a, b)"), "assert a >= b");
    assert_eq!(conv("assert_less(a, b)"), "assert a < b");
    assert_eq!(conv("assert_less_equal(a, b)"), "assert a <= b");
    assert_eq!(conv("assert_in(a, b)"), "assert a in b");
    assert_eq!(conv("assert_not_in(a, b)"), "assert a not in b");
    assert_eq!(conv("assert_is(a, b)"), "assert a is b");
    assert_eq!(conv("assert_is_not(a, b)"), "assert a is not b");
}

#[test]
fn test_call_recipes() {
    assert_eq!(conv("assert_is_instance(a, b)"), "assert isinstance(a, b)");
    assert_eq!(conv("assert_not_is_instance(a, b)"), "assert not isinstance(a, b)");
    assert_eq!(
        conv("assert_count_equal(a, b)"),
        "assert collections.Counter(a) == collections.Counter(b)"
    );
    assert_eq!(conv("assert_regex(text, pattern)"), "assert re.search(pattern, text)");
    assert_eq!(conv("assert_not_regex(text, pattern)"), "assert not re.search(pattern, text)");
}

/// A passing and a failing literal example per recipe family: the operands land where the
/// assertion evaluates them the way the helper would.
#[test]
fn test_literal_examples_keep_their_operands() {
    let cases = [
        ("assert_equal(1, 1)", "assert 1 == 1"),
        ("assert_equal(1, 2)", "assert 1 == 2"),
        ("assert_greater(2, 1)", "assert 2 > 1"),
        ("assert_greater(1, 2)", "assert 1 > 2"),
        ("assert_in(1, [1, 2])", "assert 1 in [1, 2]"),
        ("assert_in(3, [1, 2])", "assert 3 in [1, 2]"),
        ("assert_is_none(None)", "assert None is None"),
        ("assert_is_none(0)", "assert 0 is None"),
        ("assert_is_instance(1, int)", "assert isinstance(1, int)"),
        ("assert_is_instance('1', int)", "assert isinstance('1', int)"),
        ("assert_regex('abc', 'b')", "assert re.search('b', 'abc')"),
        ("assert_regex('abc', 'x')", "assert re.search('x', 'abc')"),
        ("assert_count_equal([1, 2], [2, 1])", "assert collections.Counter([1, 2]) == collections.Counter([2, 1])"),
        ("assert_almost_equal(1.0, 1.05, delta=0.1)", "assert abs(1.0 - 1.05) <= 0.1"),
        ("assert_almost_equal(1.0, 1.5, delta=0.1)", "assert abs(1.0 - 1.5) <= 0.1"),
        ("assert_not_almost_equal(1.0, 1.5, delta=0.1)", "assert abs(1.0 - 1.5) > 0.1"),
    ];
    for (legacy, expected) in cases {
        assert_eq!(conv(legacy), expected);
    }
}

#[test]
fn test_precedence_of_operands() {
    assert_eq!(conv("assert_in(a + b, c + d)"), "assert a + b in c + d");
    assert_eq!(conv("assert_in(a == b, d)"), "assert (a == b) in d");
    assert_eq!(conv("assert_equal(a and b, c)"), "assert (a and b) == c");
    assert_eq!(conv("assert_equal(x, lambda: 1)"), "assert x == (lambda: 1)");
    assert_eq!(conv("assert_false(a or b)"), "assert not (a or b)");
    assert_eq!(conv("assert_false(not a)"), "assert not (not a)");
    assert_eq!(conv("assert_true(a or b)"), "assert a or b");
    assert_eq!(conv("assert_equal(f(a, b), [c])"), "assert f(a, b) == [c]");
}

#[test]
fn test_subscripts_are_atoms() {
    assert_eq!(conv("assert_in(x[a == b], y)"), "assert x[a == b] in y");
    assert_eq!(
        conv("assert_almost_equal(x[i or j], y, delta=d)"),
        "assert abs(x[i or j] - y) <= d"
    );
    assert_eq!(conv("assert_false(x[not a])"), "assert not x[not a]");
    assert_eq!(conv("assert_equal(x[a:b], f(c)[d if e else g])"), "assert x[a:b] == f(c)[d if e else g]");
}

#[test]
fn test_operands_take_the_precedence_of_their_template_position() {
    assert_eq!(conv("assert_is_instance(a or b, c)"), "assert isinstance(a or b, c)");
    assert_eq!(
        conv("assert_almost_equal(a + b, c, delta=d)"),
        "assert abs((a + b) - c) <= d"
    );
}

#[test]
fn test_line_breaks_inside_brackets_are_preserved() {
    assert_eq!(
        conv("assert_in(long_a,\n          long_b)"),
        "assert (long_a in\n          long_b)"
    );
    assert_eq!(conv("assert_equal(f(a,\n  b), c)"), "assert f(a,\n  b) == c");
    assert_eq!(conv("assert_true([1,\n    2])"), "assert [1,\n    2]");
    assert_eq!(conv("assert_equal(x[1,\n  2], y)"), "assert x[1,\n  2] == y");
}

#[test]
fn test_message_forms_converge() {
    assert_eq!(conv("assert_equal(1, 1, \"msg\")"), "assert 1 == 1, \"msg\"");
    assert_eq!(conv("assert_equal(1, 1, msg=\"msg\")"), "assert 1 == 1, \"msg\"");
    assert_eq!(conv("assert_true(x, 'because')"), "assert x, 'because'");
    assert_eq!(conv("assert_true(x, msg='because')"), "assert x, 'because'");
    assert_eq!(conv("assert_equal(a, b, 'got %s' % a)"), "assert a == b, 'got %s' % a");
}

#[test]
fn test_tolerance_family() {
    assert_eq!(
        conv("assert_almost_equal(1.0, 1.1, delta=0.2)"),
        "assert abs(1.0 - 1.1) <= 0.2"
    );
    assert_eq!(conv("assert_almost_equal(a, b)"), "assert abs(a - b) <= 1e-7");
    assert_eq!(conv("assert_almost_equals(a, b, delta=d)"), "assert abs(a - b) <= d");
    assert_eq!(conv("assert_not_almost_equal(a, b)"), "assert abs(a - b) > 1e-7");
    assert_eq!(conv("assert_not_almost_equals(a, b, delta=d)"), "assert abs(a - b) > d");
    assert_eq!(
        conv("assert_almost_equal(a, b, delta=d, msg='m')"),
        "assert abs(a - b) <= d, 'm'"
    );
    assert_eq!(conv("assert_almost_equal(a, b, msg='m')"), "assert abs(a - b) <= 1e-7, 'm'");
}

#[test]
fn test_precision_is_left_alone_by_default() {
    for source in [
        "assert_almost_equal(1.0, 1.1, 2)\n",
        "assert_almost_equal(1.0, 1.1, places=2)\n",
        "assert_not_almost_equal(1.0, 1.1, places=2, msg='m')\n",
    ] {
        let rewrite = unchanged(source, PlacesPolicy::Skip);
        assert_eq!(rewrite.skipped.len(), 1);
        assert_eq!(rewrite.skipped[0].reason, Skip::AmbiguousArgument);
    }
}

#[test]
fn test_precision_becomes_tolerance_when_enabled() {
    let convert = |source: &str| {
        convert_source(source, PlacesPolicy::Tolerance).expect("valid python").text
    };
    assert_eq!(convert("assert_almost_equal(1.0, 1.1, 2)\n"), "assert abs(1.0 - 1.1) <= 1e-2\n");
    assert_eq!(
        convert("assert_almost_equal(1.0, 1.1, places=2)\n"),
        "assert abs(1.0 - 1.1) <= 1e-2\n"
    );
    assert_eq!(
        convert("assert_almost_equal(a, b, places=n)\n"),
        "assert abs(a - b) <= 10 ** -(n)\n"
    );
}

#[test]
fn test_unsupported_arguments_leave_source_identical() {
    for source in [
        "assert_equal(a, b, foo=1)\n",
        "assert_equal(*args)\n",
        "assert_true(**kwargs)\n",
        "assert_true(x=1)\n",
        "assert_equal(a)\n",
        "assert_true(a, b, c)\n",
        "assert_almost_equal(a, b, delta=1, places=2)\n",
    ] {
        let rewrite = unchanged(source, PlacesPolicy::Tolerance);
        assert_eq!(rewrite.skipped.len(), 1, "{source}");
        assert_eq!(rewrite.skipped[0].reason, Skip::NoMatch, "{source}");
    }
}

#[test]
fn test_other_code_is_untouched() {
    let source = indoc! {r#"
        import unittest


        class TestThing(unittest.TestCase):
            def test_it(self):
                self.assertEqual(a, b)
                assert a == b, "already plain"
                helper.assert_equal(a, b)
                print(assert_equal)
    "#};
    let rewrite = unchanged(source, PlacesPolicy::Skip);
    assert!(rewrite.skipped.is_empty());
}

#[test]
fn test_calls_outside_statements_are_reported() {
    let source = indoc! {"
        result = assert_equal(a, b)
        if assert_true(x):
            pass
        check(assert_in(a, b))
    "};
    let rewrite = unchanged(source, PlacesPolicy::Skip);
    assert_eq!(
        rewrite.skipped,
        vec![
            SkippedCall { name: "assert_equal".into(), line: 1, reason: Skip::NoMatch },
            SkippedCall { name: "assert_true".into(), line: 2, reason: Skip::NoMatch },
            SkippedCall { name: "assert_in".into(), line: 4, reason: Skip::NoMatch },
        ]
    );
}

#[test]
fn test_whole_module() {
    let source = indoc! {r#"
        from nose.tools import *


        class TestInventory:
            def test_counts(self):
                # apples first
                assert_equal(self.items["apple"], 3)  # three
                assert_not_in("plum", self.items, msg="no plums")

                if self.strict:
                    assert_almost_equal(self.ratio, 0.5,
                                        delta=0.01)
                assert_almost_equal(self.ratio, 0.5, places=2)
    "#};
    let expected = indoc! {r#"
        from nose.tools import *


        class TestInventory:
            def test_counts(self):
                # apples first
                assert self.items["apple"] == 3  # three
                assert "plum" not in self.items, "no plums"

                if self.strict:
                    assert abs(self.ratio - 0.5) <= 0.01
                assert_almost_equal(self.ratio, 0.5, places=2)
    "#};
    let rewrite = rewrite(source);
    assert_eq!(rewrite.text, expected);
    assert_eq!(rewrite.converted, 3);
    assert_eq!(
        rewrite.skipped,
        vec![SkippedCall { name: "assert_almost_equal".into(), line: 13, reason: Skip::AmbiguousArgument }]
    );
}

#[test]
fn test_comments_on_dropped_tokens_survive() {
    let source = indoc! {"
        assert_equal(a,  # left
                     b)
    "};
    let expected = indoc! {"
        assert (a ==  # left
                     b)
    "};
    assert_eq!(rewrite(source).text, expected);
}

#[test]
fn test_conversion_is_idempotent() {
    let source = indoc! {"
        def test():
            assert_equal(a, b)
            assert_in(long_a,
                      long_b, 'msg')
            assert_false(a or b)
            assert_almost_equal(x, y)
    "};
    let first = rewrite(source);
    assert_eq!(first.converted, 4);
    let second = unchanged(&first.text, PlacesPolicy::Skip);
    assert!(second.skipped.is_empty());
}

#[test]
fn test_empty_and_trivia_only_sources() {
    unchanged("", PlacesPolicy::Skip);
    unchanged("\n\n", PlacesPolicy::Skip);
    unchanged("# only a comment\n", PlacesPolicy::Skip);
    unchanged("x = 1  # no newline at end", PlacesPolicy::Skip);
}

#[test]
fn test_syntax_errors_are_reported() {
    let err = convert_source("def f(:\n    pass\n", PlacesPolicy::Skip).expect_err("invalid python");
    assert!(matches!(err, nose2pytest::ConvertError::Parse { .. }), "{err}");
}
