pub mod almost;
pub mod engine;
pub mod patterns;
pub mod precedence;
pub mod recipes;
pub mod template;

pub use engine::{bare_call, convert};
pub use patterns::{Arity, CallPattern, MatchResult, Slot};
pub use recipes::{Recipe, RecipeBook, RECIPE_TABLE};
pub use template::{SlotAddress, Template};
