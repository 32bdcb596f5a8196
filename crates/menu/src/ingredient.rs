use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pizzeria_core::{AggregateId, Entity, Identified, Identity};

/// Ingredient identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub AggregateId);

impl IngredientId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for IngredientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Ingredient.
///
/// Equality and hashing use the identifier only, so an ingredient whose name or cost
/// changed is still the same ingredient.
#[derive(Debug, Clone)]
pub struct Ingredient {
    id: IngredientId,
    identity: Identity,
    name: String,
    cost: Decimal,
}

impl Ingredient {
    /// Construct with exactly the given values.
    ///
    /// No validation happens here; request handlers check names and costs before
    /// calling into the domain.
    pub fn create(id: IngredientId, name: impl Into<String>, cost: Decimal) -> Self {
        Self {
            id,
            identity: Identity::assigned(id.0),
            name: name.into(),
            cost,
        }
    }

    /// Replace name and cost together.
    pub fn update(&mut self, name: impl Into<String>, cost: Decimal) {
        self.name = name.into();
        self.cost = cost;
    }

    pub fn id_typed(&self) -> IngredientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }
}

impl Entity for Ingredient {
    type Id = IngredientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Identified for Ingredient {
    fn identifier(&self) -> Option<Uuid> {
        self.identity.identifier()
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

// Ingredients always carry an identifier, so identity equality is reflexive.
impl Eq for Ingredient {}

impl core::hash::Hash for Ingredient {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn test_ingredient_id() -> IngredientId {
        IngredientId::new(AggregateId::new())
    }

    #[test]
    fn create_keeps_the_given_values() {
        let id = test_ingredient_id();
        let cheese = Ingredient::create(id, "Cheese", Decimal::new(2, 0));

        assert_eq!(cheese.id_typed(), id);
        assert_eq!(cheese.name(), "Cheese");
        assert_eq!(cheese.cost(), Decimal::new(2, 0));
    }

    #[test]
    fn create_does_not_validate() {
        let odd = Ingredient::create(test_ingredient_id(), "", Decimal::new(-1, 0));
        assert_eq!(odd.name(), "");
        assert_eq!(odd.cost(), Decimal::new(-1, 0));
    }

    #[test]
    fn update_replaces_name_and_cost() {
        let mut ingredient = Ingredient::create(test_ingredient_id(), "Tomato", Decimal::new(1, 0));
        ingredient.update("Cherry tomato", Decimal::new(15, 1));

        assert_eq!(ingredient.name(), "Cherry tomato");
        assert_eq!(ingredient.cost(), Decimal::new(15, 1));
    }

    #[test]
    fn equality_ignores_attributes() {
        let id = test_ingredient_id();
        let a = Ingredient::create(id, "Cheese", Decimal::new(2, 0));
        let b = Ingredient::create(id, "Mozzarella", Decimal::new(3, 0));
        let c = Ingredient::create(test_ingredient_id(), "Cheese", Decimal::new(2, 0));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn update_keeps_identity() {
        let original = Ingredient::create(test_ingredient_id(), "Ham", Decimal::new(3, 0));
        let mut updated = original.clone();
        updated.update("Prosciutto", Decimal::new(5, 0));
        assert_eq!(original, updated);
    }

    #[test]
    fn never_equal_to_a_transient_identity() {
        let ingredient = Ingredient::create(test_ingredient_id(), "Olives", Decimal::new(1, 0));
        assert!(!ingredient.same_identity(&Identity::transient()));
        assert!(ingredient.same_identity(&Identity::assigned(ingredient.id_typed().0)));
    }

    #[test]
    fn hash_follows_the_embedded_identity() {
        let id = test_ingredient_id();
        let a = Ingredient::create(id, "Cheese", Decimal::new(2, 0));
        let b = Ingredient::create(id, "Brie", Decimal::new(7, 0));
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(hash_of(&a), hash_of(&Identity::assigned(id.0)));
        assert_eq!(a.identifier(), Some(*id.0.as_uuid()));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the factory stores exactly what it was given.
            #[test]
            fn create_round_trips_name_and_cost(
                name in "[A-Za-z][A-Za-z ]{0,40}",
                cents in 0i64..1_000_000,
            ) {
                let cost = Decimal::new(cents, 2);
                let ingredient = Ingredient::create(test_ingredient_id(), name.clone(), cost);
                prop_assert_eq!(ingredient.name(), name.as_str());
                prop_assert_eq!(ingredient.cost(), cost);
            }
        }
    }
}
