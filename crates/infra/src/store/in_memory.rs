use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use pizzeria_menu::{Ingredient, IngredientId, Pizza, PizzaId};

use super::repository::{MenuQuery, Repository, StoreError};

/// Stored pizza row: scalar fields plus ingredient references.
///
/// Ingredients are resolved on every read, so a pizza always prices against the
/// latest stored ingredient costs.
#[derive(Debug, Clone)]
struct PizzaRecord {
    name: String,
    description: String,
    url: String,
    ingredient_ids: Vec<IngredientId>,
}

impl PizzaRecord {
    fn from_pizza(pizza: &Pizza) -> Self {
        Self {
            name: pizza.name().to_string(),
            description: pizza.description().to_string(),
            url: pizza.url().to_string(),
            ingredient_ids: pizza.ingredient_ids(),
        }
    }
}

/// In-memory menu store for tests/dev.
///
/// One instance backs both repositories so that pizza → ingredient references can be
/// checked on write. Lock order is always ingredients, then pizzas.
#[derive(Debug, Default)]
pub struct InMemoryMenuStore {
    ingredients: RwLock<HashMap<IngredientId, Ingredient>>,
    pizzas: RwLock<HashMap<PizzaId, PizzaRecord>>,
}

impl InMemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(
        ingredients: &HashMap<IngredientId, Ingredient>,
        id: PizzaId,
        record: &PizzaRecord,
    ) -> Pizza {
        let resolved = record.ingredient_ids.iter().filter_map(|ingredient_id| {
            let found = ingredients.get(ingredient_id).cloned();
            if found.is_none() {
                tracing::warn!(pizza_id = %id, ingredient_id = %ingredient_id, "dangling ingredient reference");
            }
            found
        });
        Pizza::create(id, &record.name, &record.description, &record.url, resolved)
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::backend("store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::backend("store lock poisoned"))
}

fn paginate<T>(items: Vec<T>, query: &MenuQuery) -> Vec<T> {
    let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
    items
        .into_iter()
        .skip(offset)
        .take(query.page.size() as usize)
        .collect()
}

#[async_trait]
impl Repository<Ingredient> for InMemoryMenuStore {
    async fn save(&self, ingredient: &Ingredient) -> Result<(), StoreError> {
        let mut map = write(&self.ingredients)?;
        map.insert(ingredient.id_typed(), ingredient.clone());
        tracing::debug!(ingredient_id = %ingredient.id_typed(), "ingredient saved");
        Ok(())
    }

    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, StoreError> {
        let map = read(&self.ingredients)?;
        Ok(map.get(id).cloned())
    }

    async fn delete(&self, ingredient: &Ingredient) -> Result<(), StoreError> {
        let id = ingredient.id_typed();
        let mut ingredients = write(&self.ingredients)?;
        if !ingredients.contains_key(&id) {
            return Err(StoreError::NotFound);
        }

        let pizzas = read(&self.pizzas)?;
        let referencing = pizzas
            .values()
            .filter(|p| p.ingredient_ids.contains(&id))
            .count();
        if referencing > 0 {
            return Err(StoreError::conflict(format!(
                "ingredient {id} is used by {referencing} pizza(s)"
            )));
        }

        ingredients.remove(&id);
        tracing::debug!(ingredient_id = %id, "ingredient deleted");
        Ok(())
    }

    async fn query(&self, query: &MenuQuery) -> Result<Vec<Ingredient>, StoreError> {
        let map = read(&self.ingredients)?;
        let mut matches: Vec<Ingredient> = map
            .values()
            .filter(|i| query.matches_name(i.name()))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id_typed().cmp(&b.id_typed())));
        Ok(paginate(matches, query))
    }
}

#[async_trait]
impl Repository<Pizza> for InMemoryMenuStore {
    async fn save(&self, pizza: &Pizza) -> Result<(), StoreError> {
        let ingredients = read(&self.ingredients)?;
        let record = PizzaRecord::from_pizza(pizza);
        if let Some(missing) = record
            .ingredient_ids
            .iter()
            .find(|id| !ingredients.contains_key(id))
        {
            return Err(StoreError::conflict(format!("ingredient {missing} does not exist")));
        }

        let mut pizzas = write(&self.pizzas)?;
        pizzas.insert(pizza.id_typed(), record);
        tracing::debug!(pizza_id = %pizza.id_typed(), "pizza saved");
        Ok(())
    }

    async fn find_by_id(&self, id: &PizzaId) -> Result<Option<Pizza>, StoreError> {
        let ingredients = read(&self.ingredients)?;
        let pizzas = read(&self.pizzas)?;
        Ok(pizzas
            .get(id)
            .map(|record| Self::resolve(&ingredients, *id, record)))
    }

    async fn delete(&self, pizza: &Pizza) -> Result<(), StoreError> {
        let mut pizzas = write(&self.pizzas)?;
        match pizzas.remove(&pizza.id_typed()) {
            Some(_) => {
                tracing::debug!(pizza_id = %pizza.id_typed(), "pizza deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn query(&self, query: &MenuQuery) -> Result<Vec<Pizza>, StoreError> {
        let ingredients = read(&self.ingredients)?;
        let pizzas = read(&self.pizzas)?;

        let mut matches: Vec<(&PizzaId, &PizzaRecord)> = pizzas
            .iter()
            .filter(|(_, record)| query.matches_name(&record.name))
            .collect();
        matches.sort_by(|(a_id, a), (b_id, b)| a.name.cmp(&b.name).then_with(|| a_id.cmp(b_id)));

        Ok(paginate(matches, query)
            .into_iter()
            .map(|(id, record)| Self::resolve(&ingredients, *id, record))
            .collect())
    }
}
