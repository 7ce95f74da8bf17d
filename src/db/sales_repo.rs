// src/db/sales_repo.rs

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Sale, SaleLineItem, SaleStatus, SaleSummary, SaleType},
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (pool principal)
    // ---

    pub async fn get_all(&self) -> Result<Vec<SaleSummary>, AppError> {
        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.customer_id, c.name AS customer_name,
                   s.sale_type, s.status, s.total_value, s.created_at
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Leitura dentro da transação do chamador (snapshot consistente),
    /// sem trancar a linha.
    pub async fn get<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(sale_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Venda não encontrada.".into()))
    }

    // ---
    // Escritas (rodam dentro da transação do chamador)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
        sale_type: SaleType,
        items: &[SaleLineItem],
        total_value: Decimal,
        payment_method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (customer_id, sale_type, items, total_value, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(sale_type)
        .bind(Json(items))
        .bind(total_value)
        .bind(payment_method)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    /// Tranca a linha da venda. `pay_full` e as recomputações de status
    /// seguram este lock durante toda a atualização multi-parcela.
    pub async fn get_for_update<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(sale_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Venda não encontrada.".into()))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        status: SaleStatus,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Venda não encontrada.".into()))
    }

    pub async fn customer_name<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let Some(customer_id) = customer_id else {
            return Ok(None);
        };
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(executor)
            .await?;
        Ok(name)
    }
}
