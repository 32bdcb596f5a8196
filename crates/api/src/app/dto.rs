use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pizzeria_core::AggregateId;
use pizzeria_infra::{MenuQuery, PageRequest};
use pizzeria_menu::{Ingredient, IngredientId, Margin, Pizza, PizzaId};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /ingredients` and `PUT /ingredients/:id`.
#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

impl IngredientRequest {
    /// Highest accepted ingredient cost.
    pub const MAX_COST: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

    pub fn validate(&self) -> Result<(), ApiError> {
        require_name(&self.name)?;
        if self.cost < Decimal::ZERO {
            return Err(ApiError::validation("cost must not be negative"));
        }
        if self.cost > Self::MAX_COST {
            return Err(ApiError::validation(format!(
                "cost must not exceed {}",
                Self::MAX_COST
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePizzaRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Ingredient identifiers; duplicates collapse.
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl CreatePizzaRequest {
    /// Validate scalar fields and parse the ingredient identifiers.
    pub fn validate(&self) -> Result<Vec<IngredientId>, ApiError> {
        require_name(&self.name)?;
        self.ingredients
            .iter()
            .map(|raw| parse_id(raw, "ingredient").map(IngredientId::new))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePizzaRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl UpdatePizzaRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_name(&self.name)
    }
}

/// `?name=&page=&size=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ListParams {
    pub fn into_query(self, max_page_size: u32) -> Result<MenuQuery, ApiError> {
        let page = PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )?
        .clamp_size(max_page_size);
        let name = self.name.filter(|n| !n.is_empty());
        Ok(MenuQuery::new(name, page))
    }
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name must not be blank"));
    }
    Ok(())
}

/// Parse a path or body identifier; `what` names the aggregate in the error message.
pub fn parse_id(raw: &str, what: &str) -> Result<AggregateId, ApiError> {
    raw.parse::<AggregateId>()
        .map_err(|_| ApiError::InvalidId(format!("invalid {what} id")))
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: IngredientId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PizzaResponse {
    pub id: PizzaId,
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Sorted by name, then id.
    pub ingredients: Vec<IngredientResponse>,
}

pub fn ingredient_to_response(ingredient: &Ingredient) -> IngredientResponse {
    IngredientResponse {
        id: ingredient.id_typed(),
        name: ingredient.name().to_string(),
        cost: ingredient.cost(),
    }
}

pub fn pizza_to_response(pizza: &Pizza, margin: Margin) -> Result<PizzaResponse, ApiError> {
    let mut ingredients: Vec<Ingredient> = pizza.ingredients().into_iter().collect();
    ingredients.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id_typed().cmp(&b.id_typed())));

    Ok(PizzaResponse {
        id: pizza.id_typed(),
        name: pizza.name().to_string(),
        description: pizza.description().to_string(),
        url: pizza.url().to_string(),
        price: pizza.price_with(margin)?,
        ingredients: ingredients.iter().map(ingredient_to_response).collect(),
    })
}
