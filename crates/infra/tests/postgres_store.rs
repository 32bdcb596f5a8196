//! Runs against a live database: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use pizzeria_core::AggregateId;
use pizzeria_infra::{MenuQuery, PageRequest, PostgresMenuStore, Repository, StoreError};
use pizzeria_menu::{Ingredient, IngredientId, Pizza, PizzaId};
use rust_decimal::Decimal;

async fn store() -> Option<PostgresMenuStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PostgresMenuStore::connect(&url).await.expect("connect to postgres"))
}

fn ingredient(name: &str, cost: Decimal) -> Ingredient {
    Ingredient::create(IngredientId::new(AggregateId::new()), name, cost)
}

#[tokio::test]
#[ignore]
async fn postgres_store_round_trips_and_enforces_references() {
    let Some(store) = store().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let ingredients: &dyn Repository<Ingredient> = &store;
    let pizzas: &dyn Repository<Pizza> = &store;

    let tag = AggregateId::new().to_string();
    let cheese = ingredient(&format!("Cheese {tag}"), Decimal::new(2, 0));
    let tomato = ingredient(&format!("Tomato {tag}"), Decimal::ONE);
    ingredients.save(&cheese).await.unwrap();
    ingredients.save(&tomato).await.unwrap();

    let pizza = Pizza::create(
        PizzaId::new(AggregateId::new()),
        format!("Margherita {tag}"),
        "classic",
        "http://img.local/m.png",
        vec![cheese.clone(), tomato.clone()],
    );
    pizzas.save(&pizza).await.unwrap();

    let loaded = pizzas.get(&pizza.id_typed()).await.unwrap();
    assert_eq!(loaded.price().unwrap(), Decimal::new(36, 1));

    let mut pricier = cheese.clone();
    pricier.update(cheese.name(), Decimal::new(4, 0));
    ingredients.save(&pricier).await.unwrap();
    let loaded = pizzas.get(&pizza.id_typed()).await.unwrap();
    assert_eq!(loaded.price().unwrap(), Decimal::new(6, 0));

    assert!(matches!(ingredients.delete(&cheese).await, Err(StoreError::Conflict(_))));

    let found = ingredients
        .query(&MenuQuery::new(Some(tag.clone()), PageRequest::new(0, 10).unwrap()))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    pizzas.delete(&pizza).await.unwrap();
    assert_eq!(pizzas.delete(&pizza).await, Err(StoreError::NotFound));
    ingredients.delete(&cheese).await.unwrap();
    ingredients.delete(&tomato).await.unwrap();
    assert_eq!(ingredients.find_by_id(&cheese.id_typed()).await.unwrap(), None);
}
