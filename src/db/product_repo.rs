// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::catalog::Product};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (pool principal)
    // ---

    pub async fn get_all(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn get_by_id(&self, product_id: Uuid) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto não encontrado.".into()))
    }

    /// Leitura dentro da transação do chamador, sem lock. O snapshot dos
    /// itens da venda usa esta versão antes do serviço de estoque trancar
    /// a linha de verdade.
    pub async fn get<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto não encontrado.".into()))
    }

    // ---
    // Escritas (rodam dentro da transação do chamador)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        price: Decimal,
        cost_price: Decimal,
        stock: i32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, cost_price, stock, size, color)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(cost_price)
        .bind(stock)
        .bind(size)
        .bind(color)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Tranca a linha do produto até o fim da transação. Toda checagem de
    /// disponibilidade acontece depois deste lock, nunca antes.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto não encontrado.".into()))
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        active: bool,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET active = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(active)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Produto não encontrado.".into()))
    }

    /// Aplica deltas a `stock` e `reserved`. Os CHECKs de não-negatividade
    /// do banco continuam valendo por baixo da validação do serviço.
    pub async fn apply_stock_delta<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        stock_delta: i32,
        reserved_delta: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock + $2,
                reserved = reserved + $3,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(stock_delta)
        .bind(reserved_delta)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Produto não encontrado.".into()))
    }
}
