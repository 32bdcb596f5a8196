use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pizzeria_core::{AggregateId, DomainResult, Entity, Identified, Identity};

use crate::ingredient::{Ingredient, IngredientId};
use crate::pricing::{self, Margin};

/// Pizza identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PizzaId(pub AggregateId);

impl PizzaId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PizzaId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Pizza.
///
/// Owns a set of ingredients (by identity) and derives its price from whatever the set
/// holds at the time of the call. The price is never stored.
#[derive(Debug, Clone)]
pub struct Pizza {
    id: PizzaId,
    identity: Identity,
    name: String,
    description: String,
    url: String,
    ingredients: HashSet<Ingredient>,
}

impl Pizza {
    /// Construct a pizza from its scalar fields and an initial ingredient set.
    ///
    /// Duplicate ingredients (same identifier) collapse to one entry.
    pub fn create(
        id: PizzaId,
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        ingredients: impl IntoIterator<Item = Ingredient>,
    ) -> Self {
        Self {
            id,
            identity: Identity::assigned(id.0),
            name: name.into(),
            description: description.into(),
            url: url.into(),
            ingredients: ingredients.into_iter().collect(),
        }
    }

    pub fn id_typed(&self) -> PizzaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Price with the house margin.
    pub fn price(&self) -> DomainResult<Decimal> {
        self.price_with(Margin::DEFAULT)
    }

    /// Price with an explicit margin. Fails when the result leaves the `Decimal` range.
    pub fn price_with(&self, margin: Margin) -> DomainResult<Decimal> {
        pricing::price_of(&self.ingredients, margin)
    }

    /// A copy of the current ingredient set.
    pub fn ingredients(&self) -> HashSet<Ingredient> {
        self.ingredients.clone()
    }

    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        let mut ids: Vec<IngredientId> = self.ingredients.iter().map(Ingredient::id_typed).collect();
        ids.sort();
        ids
    }

    pub fn has_ingredient(&self, id: &IngredientId) -> bool {
        self.ingredients.iter().any(|i| i.id() == id)
    }

    /// Add an ingredient. Returns `false` (and changes nothing) if an ingredient with
    /// the same identity is already present.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> bool {
        self.ingredients.insert(ingredient)
    }

    /// Remove an ingredient by identity. Returns `false` if it was not present.
    pub fn remove_ingredient(&mut self, ingredient: &Ingredient) -> bool {
        self.ingredients.remove(ingredient)
    }

    /// Replace name, description and url together; ingredients are untouched.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) {
        self.name = name.into();
        self.description = description.into();
        self.url = url.into();
    }
}

impl Entity for Pizza {
    type Id = PizzaId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Identified for Pizza {
    fn identifier(&self) -> Option<Uuid> {
        self.identity.identifier()
    }
}

impl PartialEq for Pizza {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Pizza {}

impl core::hash::Hash for Pizza {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pizzeria_core::DomainError;

    fn ingredient(name: &str, cost: Decimal) -> Ingredient {
        Ingredient::create(IngredientId::new(AggregateId::new()), name, cost)
    }

    fn test_pizza_id() -> PizzaId {
        PizzaId::new(AggregateId::new())
    }

    fn margherita(ingredients: Vec<Ingredient>) -> Pizza {
        Pizza::create(
            test_pizza_id(),
            "Margherita",
            "Tomato and cheese",
            "https://example.test/margherita.png",
            ingredients,
        )
    }

    #[test]
    fn price_is_cost_sum_times_margin() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let tomato = ingredient("Tomato", Decimal::new(1, 0));
        let pizza = margherita(vec![cheese, tomato]);

        assert_eq!(pizza.price().unwrap(), Decimal::new(36, 1));
    }

    #[test]
    fn price_follows_the_current_ingredient_set() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let tomato = ingredient("Tomato", Decimal::new(1, 0));
        let mut pizza = margherita(vec![cheese.clone(), tomato]);

        assert!(pizza.remove_ingredient(&cheese));
        assert_eq!(pizza.price().unwrap(), Decimal::new(12, 1));
    }

    #[test]
    fn price_with_custom_margin() {
        let pizza = margherita(vec![ingredient("Dough", Decimal::new(4, 0))]);
        let margin = Margin::new(Decimal::new(15, 1)).unwrap();
        assert_eq!(pizza.price_with(margin).unwrap(), Decimal::new(6, 0));
    }

    #[test]
    fn pizza_without_ingredients_is_free() {
        assert_eq!(margherita(vec![]).price().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn create_collapses_duplicate_ingredients() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let pizza = margherita(vec![cheese.clone(), cheese]);
        assert_eq!(pizza.ingredients().len(), 1);
        assert_eq!(pizza.price().unwrap(), Decimal::new(24, 1));
    }

    #[test]
    fn returned_ingredient_set_is_a_copy() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let pizza = margherita(vec![cheese.clone()]);

        let mut copy = pizza.ingredients();
        copy.clear();
        copy.insert(ingredient("Gold leaf", Decimal::new(1000, 0)));

        assert_eq!(pizza.ingredients().len(), 1);
        assert!(pizza.ingredients().contains(&cheese));
        assert_eq!(pizza.price().unwrap(), Decimal::new(24, 1));
    }

    #[test]
    fn adding_a_present_ingredient_is_a_no_op() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let mut pizza = margherita(vec![cheese.clone()]);

        assert!(!pizza.add_ingredient(cheese.clone()));
        assert_eq!(pizza.ingredients().len(), 1);
        assert_eq!(pizza.price().unwrap(), Decimal::new(24, 1));
    }

    #[test]
    fn adding_a_renamed_copy_keeps_the_original_entry() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let mut pizza = margherita(vec![cheese.clone()]);

        let mut pricier = cheese.clone();
        pricier.update("Aged cheese", Decimal::new(9, 0));
        assert!(!pizza.add_ingredient(pricier));
        assert_eq!(pizza.price().unwrap(), Decimal::new(24, 1));
    }

    #[test]
    fn removing_an_absent_ingredient_is_a_no_op() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let mut pizza = margherita(vec![cheese]);

        assert!(!pizza.remove_ingredient(&ingredient("Anchovy", Decimal::new(3, 0))));
        assert_eq!(pizza.ingredients().len(), 1);
    }

    #[test]
    fn update_replaces_scalars_and_keeps_ingredients() {
        let cheese = ingredient("Cheese", Decimal::new(2, 0));
        let mut pizza = margherita(vec![cheese.clone()]);

        pizza.update("Quattro formaggi", "Four cheeses", "https://example.test/4f.png");

        assert_eq!(pizza.name(), "Quattro formaggi");
        assert_eq!(pizza.description(), "Four cheeses");
        assert_eq!(pizza.url(), "https://example.test/4f.png");
        assert!(pizza.has_ingredient(&cheese.id_typed()));
    }

    #[test]
    fn equality_is_by_identifier_only() {
        let id = test_pizza_id();
        let a = Pizza::create(id, "A", "", "", vec![]);
        let b = Pizza::create(id, "B", "other", "x", vec![ingredient("Ham", Decimal::ONE)]);
        assert_eq!(a, b);
        assert_ne!(a, margherita(vec![]));
        assert!(!a.same_identity(&Identity::transient()));
        assert!(a.same_identity(&Identity::assigned(id.0)));
    }

    #[test]
    fn out_of_range_price_is_a_validation_error() {
        let saffron = ingredient("Saffron", Decimal::from_parts(0, 0, 0xF000_0000, false, 0));
        let pizza = margherita(vec![saffron]);
        assert!(matches!(pizza.price(), Err(DomainError::Validation(_))));

        let cheap = margherita(vec![ingredient("Dough", Decimal::ONE)]);
        let huge = Margin::new(Decimal::MAX).unwrap();
        assert_eq!(cheap.price_with(huge).unwrap(), Decimal::MAX);
        assert!(pizza.price_with(huge).is_err());
    }

    #[test]
    fn ingredient_ids_are_sorted() {
        let pizza = margherita(vec![
            ingredient("A", Decimal::ONE),
            ingredient("B", Decimal::ONE),
            ingredient("C", Decimal::ONE),
        ]);
        let ids = pizza.ingredient_ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn costs() -> impl Strategy<Value = Vec<i64>> {
            prop::collection::vec(0i64..100_000, 0..12)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: price == sum(cost) * 1.2, exactly.
            #[test]
            fn price_matches_formula(cents in costs()) {
                let ingredients: Vec<Ingredient> = cents
                    .iter()
                    .map(|c| ingredient("x", Decimal::new(*c, 2)))
                    .collect();
                let expected: Decimal = cents.iter().map(|c| Decimal::new(*c, 2)).sum::<Decimal>()
                    * Decimal::new(12, 1);

                let pizza = margherita(ingredients);
                prop_assert_eq!(pizza.price().unwrap(), expected);
            }

            /// Property: add is idempotent.
            #[test]
            fn add_twice_equals_add_once(cents in costs(), extra in 0i64..100_000) {
                let mut pizza = margherita(
                    cents.iter().map(|c| ingredient("x", Decimal::new(*c, 2))).collect(),
                );
                let topping = ingredient("topping", Decimal::new(extra, 2));

                pizza.add_ingredient(topping.clone());
                let once = (pizza.ingredient_ids(), pizza.price());
                pizza.add_ingredient(topping);
                let twice = (pizza.ingredient_ids(), pizza.price());

                prop_assert_eq!(once, twice);
            }

            /// Property: mutating the returned set never leaks into the aggregate.
            #[test]
            fn returned_set_is_isolated(cents in costs()) {
                let pizza = margherita(
                    cents.iter().map(|c| ingredient("x", Decimal::new(*c, 2))).collect(),
                );
                let before = (pizza.ingredient_ids(), pizza.price());

                let mut copy = pizza.ingredients();
                copy.insert(ingredient("intruder", Decimal::new(999, 0)));
                copy.retain(|i| i.name() == "intruder");

                prop_assert_eq!(before, (pizza.ingredient_ids(), pizza.price()));
            }
        }
    }
}
