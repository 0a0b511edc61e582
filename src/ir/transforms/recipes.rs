//! The closed table of conversion recipes.
//!
//! Each legacy helper maps to exactly one call pattern and one destination template. The table is
//! parsed once per process into a [`RecipeBook`] that worker threads share read-only.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::errors::ConvertError;
use super::patterns::{Arity, CallPattern};
use super::template::Template;

/// Legacy function name, accepted arity and replacement expression.
pub const RECIPE_TABLE: &[(&str, Arity, &str)] = &[
    // One operand
    ("assert_true", Arity::One, "a"),
    ("ok_", Arity::One, "a"),
    ("assert_false", Arity::One, "not a"),
    ("assert_is_none", Arity::One, "a is None"),
    ("assert_is_not_none", Arity::One, "a is not None"),
    // Two operands joined by an operator
    ("assert_equal", Arity::Two, "a == b"),
    ("assert_equals", Arity::Two, "a == b"),
    ("eq_", Arity::Two, "a == b"),
    ("assert_list_equal", Arity::Two, "a == b"),
    ("assert_dict_equal", Arity::Two, "a == b"),
    ("assert_set_equal", Arity::Two, "a == b"),
    ("assert_sequence_equal", Arity::Two, "a == b"),
    ("assert_tuple_equal", Arity::Two, "a == b"),
    ("assert_multi_line_equal", Arity::Two, "a == b"),
    ("assert_not_equal", Arity::Two, "a != b"),
    ("assert_not_equals", Arity::Two, "a != b"),
    ("assert_greater", Arity::Two, "a > b"),
    ("assert_greater_equal", Arity::Two, "a >= b"),
    ("assert_less", Arity::Two, "a < b"),
    ("assert_less_equal", Arity::Two, "a <= b"),
    ("assert_in", Arity::Two, "a in b"),
    ("assert_not_in", Arity::Two, "a not in b"),
    ("assert_is", Arity::Two, "a is b"),
    ("assert_is_not", Arity::Two, "a is not b"),
    // Two operands inside a call
    ("assert_is_instance", Arity::Two, "isinstance(a, b)"),
    ("assert_not_is_instance", Arity::Two, "not isinstance(a, b)"),
    ("assert_count_equal", Arity::Two, "collections.Counter(a) == collections.Counter(b)"),
    ("assert_regex", Arity::Two, "re.search(b, a)"),
    ("assert_not_regex", Arity::Two, "not re.search(b, a)"),
    // Tolerance family
    ("assert_almost_equal", Arity::Almost, "abs(a - b) <= delta"),
    ("assert_almost_equals", Arity::Almost, "abs(a - b) <= delta"),
    ("assert_not_almost_equal", Arity::Almost, "abs(a - b) > delta"),
    ("assert_not_almost_equals", Arity::Almost, "abs(a - b) > delta"),
];

/// A legacy function bound to its pattern and template.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub pattern: CallPattern,
    pub template: Template,
}

impl Recipe {
    pub fn name(&self) -> &'static str {
        self.pattern.name
    }

    pub fn arity(&self) -> Arity {
        self.pattern.arity
    }
}

/// Lookup of recipes by legacy function name.
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: HashMap<&'static str, Recipe>,
}

static STANDARD: OnceCell<RecipeBook> = OnceCell::new();

impl RecipeBook {
    /// Builds a book from `(name, arity, template)` entries.
    ///
    /// # Errors
    /// The first template that fails to parse or has a misplaced placeholder.
    pub fn from_table(table: &[(&'static str, Arity, &'static str)]) -> Result<Self, ConvertError> {
        let mut recipes = HashMap::with_capacity(table.len());
        for &(name, arity, expr) in table {
            let template = Template::parse(expr)?;
            recipes.insert(name, Recipe { pattern: CallPattern::new(name, arity), template });
        }
        debug!("Built recipe book with {} recipes", recipes.len());
        Ok(RecipeBook { recipes })
    }

    /// The process-wide book for [`RECIPE_TABLE`], built on first use.
    pub fn standard() -> Result<&'static RecipeBook, ConvertError> {
        STANDARD.get_or_try_init(|| Self::from_table(RECIPE_TABLE))
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipe names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.recipes.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
