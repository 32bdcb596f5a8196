//! Postgres-backed menu store.
//!
//! ## Tables
//!
//! | table | key | notes |
//! |---|---|---|
//! | `ingredients` | `id` | `cost` is `NUMERIC`, read back as `Decimal` |
//! | `pizzas` | `id` | scalar fields only; the price is never stored |
//! | `pizza_ingredients` | `(pizza_id, ingredient_id)` | cascades on pizza delete, restricts ingredient delete |
//!
//! ## Error Mapping
//!
//! | PostgreSQL code | StoreError | Scenario |
//! |---|---|---|
//! | `23503` | `Conflict` | deleting a referenced ingredient, or saving a pizza with an unknown ingredient |
//! | any other | `Backend` | connection loss, pool closed, malformed rows |

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use pizzeria_core::AggregateId;
use pizzeria_menu::{Ingredient, IngredientId, Pizza, PizzaId};

use super::repository::{MenuQuery, Repository, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ingredients (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    cost NUMERIC NOT NULL
);

CREATE TABLE IF NOT EXISTS pizzas (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    url TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pizza_ingredients (
    pizza_id UUID NOT NULL REFERENCES pizzas (id) ON DELETE CASCADE,
    ingredient_id UUID NOT NULL REFERENCES ingredients (id) ON DELETE RESTRICT,
    PRIMARY KEY (pizza_id, ingredient_id)
);
"#;

/// Menu store over a Postgres connection pool.
///
/// `Send + Sync`; the pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresMenuStore {
    pool: PgPool,
}

impl PostgresMenuStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the menu tables if they are missing. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn ingredients_for(&self, pizza_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Ingredient>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT pi.pizza_id, i.id, i.name, i.cost
            FROM pizza_ingredients pi
            JOIN ingredients i ON i.id = pi.ingredient_id
            WHERE pi.pizza_id = ANY($1)
            "#,
        )
        .bind(pizza_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_pizza_ingredients", e))?;

        let mut by_pizza: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in rows {
            let pizza_id: Uuid = row
                .try_get("pizza_id")
                .map_err(|e| map_sqlx_error("load_pizza_ingredients", e))?;
            by_pizza.entry(pizza_id).or_default().push(ingredient_from_row(&row)?);
        }
        Ok(by_pizza)
    }

    async fn pizzas_from_rows(&self, rows: Vec<PgRow>) -> Result<Vec<Pizza>, StoreError> {
        let ids = rows
            .iter()
            .map(|r| r.try_get::<Uuid, _>("id"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("load_pizzas", e))?;
        let mut ingredients = self.ingredients_for(&ids).await?;

        rows.iter()
            .map(|row| -> Result<Pizza, StoreError> {
                let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("load_pizzas", e))?;
                let name: String = row.try_get("name").map_err(|e| map_sqlx_error("load_pizzas", e))?;
                let description: String = row
                    .try_get("description")
                    .map_err(|e| map_sqlx_error("load_pizzas", e))?;
                let url: String = row.try_get("url").map_err(|e| map_sqlx_error("load_pizzas", e))?;
                Ok(Pizza::create(
                    PizzaId::new(AggregateId::from_uuid(id)),
                    name,
                    description,
                    url,
                    ingredients.remove(&id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}

fn ingredient_from_row(row: &PgRow) -> Result<Ingredient, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_ingredient", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("decode_ingredient", e))?;
    let cost: Decimal = row.try_get("cost").map_err(|e| map_sqlx_error("decode_ingredient", e))?;
    Ok(Ingredient::create(
        IngredientId::new(AggregateId::from_uuid(id)),
        name,
        cost,
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23503") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

#[async_trait]
impl Repository<Ingredient> for PostgresMenuStore {
    #[instrument(skip(self, ingredient), fields(ingredient_id = %ingredient.id_typed()))]
    async fn save(&self, ingredient: &Ingredient) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, cost)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                cost = EXCLUDED.cost
            "#,
        )
        .bind(*ingredient.id_typed().0.as_uuid())
        .bind(ingredient.name())
        .bind(ingredient.cost())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_ingredient", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, StoreError> {
        let row = sqlx::query("SELECT id, name, cost FROM ingredients WHERE id = $1")
            .bind(*id.0.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_ingredient", e))?;
        row.as_ref().map(ingredient_from_row).transpose()
    }

    #[instrument(skip(self, ingredient), fields(ingredient_id = %ingredient.id_typed()))]
    async fn delete(&self, ingredient: &Ingredient) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(*ingredient.id_typed().0.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_ingredient", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, query: &MenuQuery) -> Result<Vec<Ingredient>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, cost
            FROM ingredients
            WHERE ($1::text IS NULL OR strpos(name, $1) > 0)
            ORDER BY name COLLATE "C", id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.name.as_deref())
        .bind(i64::from(query.page.size()))
        .bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_ingredients", e))?;

        rows.iter().map(ingredient_from_row).collect()
    }
}

#[async_trait]
impl Repository<Pizza> for PostgresMenuStore {
    #[instrument(skip(self, pizza), fields(pizza_id = %pizza.id_typed()))]
    async fn save(&self, pizza: &Pizza) -> Result<(), StoreError> {
        let pizza_id = *pizza.id_typed().0.as_uuid();
        let ingredient_ids: Vec<Uuid> = pizza
            .ingredient_ids()
            .into_iter()
            .map(|id| Uuid::from(id.0))
            .collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_save_pizza", e))?;

        sqlx::query(
            r#"
            INSERT INTO pizzas (id, name, description, url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                url = EXCLUDED.url
            "#,
        )
        .bind(pizza_id)
        .bind(pizza.name())
        .bind(pizza.description())
        .bind(pizza.url())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save_pizza", e))?;

        sqlx::query("DELETE FROM pizza_ingredients WHERE pizza_id = $1")
            .bind(pizza_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_pizza_ingredients", e))?;

        sqlx::query(
            r#"
            INSERT INTO pizza_ingredients (pizza_id, ingredient_id)
            SELECT $1, unnest($2::uuid[])
            "#,
        )
        .bind(pizza_id)
        .bind(&ingredient_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save_pizza_ingredients", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_save_pizza", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &PizzaId) -> Result<Option<Pizza>, StoreError> {
        let rows = sqlx::query("SELECT id, name, description, url FROM pizzas WHERE id = $1")
            .bind(*id.0.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_pizza", e))?;
        Ok(self.pizzas_from_rows(rows).await?.into_iter().next())
    }

    #[instrument(skip(self, pizza), fields(pizza_id = %pizza.id_typed()))]
    async fn delete(&self, pizza: &Pizza) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM pizzas WHERE id = $1")
            .bind(*pizza.id_typed().0.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_pizza", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, query: &MenuQuery) -> Result<Vec<Pizza>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, url
            FROM pizzas
            WHERE ($1::text IS NULL OR strpos(name, $1) > 0)
            ORDER BY name COLLATE "C", id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.name.as_deref())
        .bind(i64::from(query.page.size()))
        .bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_pizzas", e))?;

        self.pizzas_from_rows(rows).await
    }
}
