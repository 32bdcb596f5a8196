//! Menu domain module.
//!
//! Ingredients, pizzas and the pricing rule that ties them together, implemented as
//! plain synchronous domain logic (no IO, no HTTP, no storage).

pub mod ingredient;
pub mod pizza;
pub mod pricing;

pub use ingredient::{Ingredient, IngredientId};
pub use pizza::{Pizza, PizzaId};
pub use pricing::Margin;
