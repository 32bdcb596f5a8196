use axum::Router;

pub mod ingredients;
pub mod pizzas;
pub mod system;

/// Router for all menu endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(ingredients::router())
        .merge(pizzas::router())
}
