use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use pizzeria_menu::IngredientId;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}

fn parse_ingredient_id(id: &str) -> Result<IngredientId, ApiError> {
    dto::parse_id(id, "ingredient").map(IngredientId::new)
}

pub async fn create_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::IngredientRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Json(body) = body?;
    let ingredient = services.create_ingredient(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(dto::ingredient_to_response(&ingredient)),
    )
        .into_response())
}

pub async fn list_ingredients(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::ListParams>, QueryRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Query(params) = params?;
    let items = services
        .list_ingredients(params)
        .await?
        .iter()
        .map(dto::ingredient_to_response)
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn get_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    let ingredient = services.get_ingredient(parse_ingredient_id(&id)?).await?;
    Ok((StatusCode::OK, Json(dto::ingredient_to_response(&ingredient))).into_response())
}

pub async fn update_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::IngredientRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    services
        .update_ingredient(parse_ingredient_id(&id)?, body)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    services.delete_ingredient(parse_ingredient_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
