use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use pizzeria_menu::{IngredientId, PizzaId};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/pizzas", get(list_pizzas).post(create_pizza))
        .route(
            "/pizzas/:id",
            get(get_pizza).put(update_pizza).delete(delete_pizza),
        )
        .route(
            "/pizzas/:id/ingredients/:ingredient_id",
            put(add_ingredient).delete(remove_ingredient),
        )
}

fn parse_pizza_id(id: &str) -> Result<PizzaId, ApiError> {
    dto::parse_id(id, "pizza").map(PizzaId::new)
}

fn parse_ingredient_id(id: &str) -> Result<IngredientId, ApiError> {
    dto::parse_id(id, "ingredient").map(IngredientId::new)
}

pub async fn create_pizza(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreatePizzaRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Json(body) = body?;
    let pizza = services.create_pizza(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(dto::pizza_to_response(&pizza, services.margin())?),
    )
        .into_response())
}

pub async fn list_pizzas(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::ListParams>, QueryRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Query(params) = params?;
    let margin = services.margin();
    let items = services
        .list_pizzas(params)
        .await?
        .iter()
        .map(|p| dto::pizza_to_response(p, margin))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn get_pizza(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    let pizza = services.get_pizza(parse_pizza_id(&id)?).await?;
    Ok((
        StatusCode::OK,
        Json(dto::pizza_to_response(&pizza, services.margin())?),
    )
        .into_response())
}

pub async fn update_pizza(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdatePizzaRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    services.update_pizza(parse_pizza_id(&id)?, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_pizza(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    services.delete_pizza(parse_pizza_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, ingredient_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    services
        .add_pizza_ingredient(parse_pizza_id(&id)?, parse_ingredient_id(&ingredient_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, ingredient_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    services
        .remove_pizza_ingredient(parse_pizza_id(&id)?, parse_ingredient_id(&ingredient_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
