//! Use cases behind the HTTP handlers.
//!
//! Each call runs its own load → mutate → save cycle against the repositories.

use std::sync::Arc;

use anyhow::Context;

use pizzeria_core::AggregateId;
use pizzeria_infra::{AppConfig, InMemoryMenuStore, PostgresMenuStore, Repository};
use pizzeria_menu::{Ingredient, IngredientId, Margin, Pizza, PizzaId};

use crate::app::dto;
use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AppServices {
    ingredients: Arc<dyn Repository<Ingredient>>,
    pizzas: Arc<dyn Repository<Pizza>>,
    margin: Margin,
    max_page_size: u32,
}

impl AppServices {
    pub fn new(
        ingredients: Arc<dyn Repository<Ingredient>>,
        pizzas: Arc<dyn Repository<Pizza>>,
        margin: Margin,
        max_page_size: u32,
    ) -> Self {
        Self {
            ingredients,
            pizzas,
            margin,
            max_page_size,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(margin: Margin, max_page_size: u32) -> Self {
        let store = Arc::new(InMemoryMenuStore::new());
        Self::new(store.clone(), store, margin, max_page_size)
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    // -------------------------
    // Ingredients
    // -------------------------

    pub async fn create_ingredient(&self, req: dto::IngredientRequest) -> Result<Ingredient, ApiError> {
        req.validate()?;
        let ingredient = Ingredient::create(IngredientId::new(AggregateId::new()), req.name, req.cost);
        self.ingredients.save(&ingredient).await?;
        tracing::info!(ingredient_id = %ingredient.id_typed(), "ingredient created");
        Ok(ingredient)
    }

    pub async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, ApiError> {
        Ok(self.ingredients.get(&id).await?)
    }

    pub async fn list_ingredients(&self, params: dto::ListParams) -> Result<Vec<Ingredient>, ApiError> {
        let query = params.into_query(self.max_page_size)?;
        Ok(self.ingredients.query(&query).await?)
    }

    pub async fn update_ingredient(
        &self,
        id: IngredientId,
        req: dto::IngredientRequest,
    ) -> Result<(), ApiError> {
        req.validate()?;
        let mut ingredient = self.ingredients.get(&id).await?;
        ingredient.update(req.name, req.cost);
        self.ingredients.save(&ingredient).await?;
        tracing::info!(ingredient_id = %id, "ingredient updated");
        Ok(())
    }

    pub async fn delete_ingredient(&self, id: IngredientId) -> Result<(), ApiError> {
        let ingredient = self.ingredients.get(&id).await?;
        self.ingredients.delete(&ingredient).await?;
        tracing::info!(ingredient_id = %id, "ingredient deleted");
        Ok(())
    }

    // -------------------------
    // Pizzas
    // -------------------------

    pub async fn create_pizza(&self, req: dto::CreatePizzaRequest) -> Result<Pizza, ApiError> {
        let ingredient_ids = req.validate()?;

        let mut ingredients = Vec::with_capacity(ingredient_ids.len());
        for id in &ingredient_ids {
            ingredients.push(self.ingredients.get(id).await?);
        }

        let pizza = Pizza::create(
            PizzaId::new(AggregateId::new()),
            req.name,
            req.description,
            req.url,
            ingredients,
        );
        pizza.price_with(self.margin)?;
        self.pizzas.save(&pizza).await?;
        tracing::info!(pizza_id = %pizza.id_typed(), "pizza created");
        Ok(pizza)
    }

    pub async fn get_pizza(&self, id: PizzaId) -> Result<Pizza, ApiError> {
        Ok(self.pizzas.get(&id).await?)
    }

    pub async fn list_pizzas(&self, params: dto::ListParams) -> Result<Vec<Pizza>, ApiError> {
        let query = params.into_query(self.max_page_size)?;
        Ok(self.pizzas.query(&query).await?)
    }

    pub async fn update_pizza(&self, id: PizzaId, req: dto::UpdatePizzaRequest) -> Result<(), ApiError> {
        req.validate()?;
        let mut pizza = self.pizzas.get(&id).await?;
        pizza.update(req.name, req.description, req.url);
        self.pizzas.save(&pizza).await?;
        tracing::info!(pizza_id = %id, "pizza updated");
        Ok(())
    }

    pub async fn delete_pizza(&self, id: PizzaId) -> Result<(), ApiError> {
        let pizza = self.pizzas.get(&id).await?;
        self.pizzas.delete(&pizza).await?;
        tracing::info!(pizza_id = %id, "pizza deleted");
        Ok(())
    }

    /// Idempotent: adding an ingredient already on the pizza changes nothing.
    pub async fn add_pizza_ingredient(
        &self,
        pizza_id: PizzaId,
        ingredient_id: IngredientId,
    ) -> Result<(), ApiError> {
        let mut pizza = self.pizzas.get(&pizza_id).await?;
        let ingredient = self.ingredients.get(&ingredient_id).await?;
        if pizza.add_ingredient(ingredient) {
            pizza.price_with(self.margin)?;
            self.pizzas.save(&pizza).await?;
            tracing::info!(pizza_id = %pizza_id, ingredient_id = %ingredient_id, "ingredient added to pizza");
        }
        Ok(())
    }

    /// Idempotent: removing an ingredient the pizza does not hold changes nothing.
    pub async fn remove_pizza_ingredient(
        &self,
        pizza_id: PizzaId,
        ingredient_id: IngredientId,
    ) -> Result<(), ApiError> {
        let mut pizza = self.pizzas.get(&pizza_id).await?;
        let ingredient = self.ingredients.get(&ingredient_id).await?;
        if pizza.remove_ingredient(&ingredient) {
            self.pizzas.save(&pizza).await?;
            tracing::info!(pizza_id = %pizza_id, ingredient_id = %ingredient_id, "ingredient removed from pizza");
        }
        Ok(())
    }
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set, else in-memory.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(
                PostgresMenuStore::connect(url)
                    .await
                    .context("failed to connect to postgres")?,
            );
            tracing::info!("using postgres menu store");
            Ok(AppServices::new(
                store.clone(),
                store,
                config.price_margin,
                config.max_page_size,
            ))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory menu store");
            Ok(AppServices::in_memory(config.price_margin, config.max_page_size))
        }
    }
}
