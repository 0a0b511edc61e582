//! Property tests over generated Python expressions.

use quickcheck::{QuickCheck, TestResult};

use nose2pytest::{Node, PlacesPolicy, convert_source, parse_source};
use test_utils::ir::generator::PyExpr;

/// Whether `operand` renders as `expected`, allowing brackets added by the conversion.
fn renders_as(operand: &Node, expected: &str) -> bool {
    let text = operand.render();
    let text = text.trim();
    text == expected || text == format!("({expected})")
}

/// The test expression of the single assert statement in `code`.
fn assert_test(code: &str) -> Option<Node> {
    let module = parse_source(code).ok()?;
    let statement = module.children().first()?;
    if statement.kind() != "assert_statement" {
        return None;
    }
    statement.children().get(1).cloned()
}

#[test]
fn test_property_source_round_trip() {
    fn prop(expr: PyExpr) -> TestResult {
        let code = format!("f({})\n", expr.to_code());
        match parse_source(&code) {
            Ok(tree) => TestResult::from_bool(tree.render() == code),
            Err(_) => TestResult::discard(),
        }
    }

    QuickCheck::new()
        .tests(500)
        .max_tests(5000)
        .quickcheck(prop as fn(PyExpr) -> TestResult);
}

#[test]
fn test_property_equality_keeps_operands() {
    fn prop(lhs: PyExpr, rhs: PyExpr) -> TestResult {
        let (lhs, rhs) = (lhs.to_code(), rhs.to_code());
        let source = format!("assert_equal({lhs}, {rhs})\n");
        let Ok(rewrite) = convert_source(&source, PlacesPolicy::Skip) else {
            return TestResult::discard();
        };
        if rewrite.converted != 1 {
            return TestResult::failed();
        }
        let Some(test) = assert_test(&rewrite.text) else {
            return TestResult::failed();
        };
        let operands = test.children();
        let well_formed = test.kind() == "comparison_operator"
            && operands.len() == 3
            && operands[1].as_leaf().is_some_and(|op| op.text == "==");
        TestResult::from_bool(well_formed && renders_as(&operands[0], &lhs) && renders_as(&operands[2], &rhs))
    }

    QuickCheck::new()
        .tests(500)
        .max_tests(5000)
        .quickcheck(prop as fn(PyExpr, PyExpr) -> TestResult);
}

#[test]
fn test_property_negation_keeps_operand() {
    fn prop(expr: PyExpr) -> TestResult {
        let code = expr.to_code();
        let Ok(rewrite) = convert_source(&format!("assert_false({code})\n"), PlacesPolicy::Skip) else {
            return TestResult::discard();
        };
        let Some(test) = assert_test(&rewrite.text) else {
            return TestResult::failed();
        };
        let operands = test.children();
        TestResult::from_bool(test.kind() == "not_operator" && operands.len() == 2 && renders_as(&operands[1], &code))
    }

    QuickCheck::new()
        .tests(500)
        .max_tests(5000)
        .quickcheck(prop as fn(PyExpr) -> TestResult);
}

#[test]
fn test_property_conversion_is_idempotent() {
    fn prop(lhs: PyExpr, rhs: PyExpr) -> TestResult {
        let source = format!(
            "def test():\n    assert_in({},\n              {}, 'msg')\n    assert_true({})\n",
            lhs.to_code(),
            rhs.to_code(),
            lhs.to_code()
        );
        let Ok(first) = convert_source(&source, PlacesPolicy::Skip) else {
            return TestResult::discard();
        };
        match convert_source(&first.text, PlacesPolicy::Skip) {
            Ok(second) => TestResult::from_bool(second.converted == 0 && second.text == first.text),
            Err(_) => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(300)
        .max_tests(3000)
        .quickcheck(prop as fn(PyExpr, PyExpr) -> TestResult);
}
