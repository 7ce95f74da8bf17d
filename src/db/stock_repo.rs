// src/db/stock_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{StockMovement, StockMovementReason, StockReservation},
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reservas
    // ---

    pub async fn create_reservation<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sale_id: Option<Uuid>,
        quantity: i32,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, StockReservation>(
            r#"
            INSERT INTO stock_reservations (product_id, sale_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(sale_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(reservation)
    }

    /// Tranca a linha da reserva; release/commit concorrentes serializam aqui.
    pub async fn get_reservation_for_update<'e, E>(
        &self,
        executor: E,
        reservation_id: Uuid,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockReservation>(
            "SELECT * FROM stock_reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Reserva de estoque não encontrada.".into()))
    }

    /// Reservas ativas de uma venda, trancadas, em ordem de produto para
    /// manter a ordem global de locks.
    pub async fn active_reservations_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<StockReservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, StockReservation>(
            r#"
            SELECT * FROM stock_reservations
            WHERE sale_id = $1 AND status = 'ACTIVE'
            ORDER BY product_id ASC
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(reservations)
    }

    pub async fn committed_reservations_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<StockReservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, StockReservation>(
            r#"
            SELECT * FROM stock_reservations
            WHERE sale_id = $1 AND status = 'COMMITTED'
            ORDER BY product_id ASC
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(reservations)
    }

    pub async fn mark_released<'e, E>(
        &self,
        executor: E,
        reservation_id: Uuid,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockReservation>(
            r#"
            UPDATE stock_reservations
            SET status = 'RELEASED', released_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Reserva de estoque não encontrada.".into()))
    }

    pub async fn mark_committed<'e, E>(
        &self,
        executor: E,
        reservation_id: Uuid,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockReservation>(
            r#"
            UPDATE stock_reservations
            SET status = 'COMMITTED', committed_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Reserva de estoque não encontrada.".into()))
    }

    // ---
    // Livro-razão (auditoria)
    // ---

    /// Registra uma movimentação no livro-razão.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sale_id: Option<Uuid>,
        reservation_id: Option<Uuid>,
        stock_delta: i32,
        reserved_delta: i32,
        reason: StockMovementReason,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (product_id, sale_id, reservation_id, stock_delta, reserved_delta, reason, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(sale_id)
        .bind(reservation_id)
        .bind(stock_delta)
        .bind(reserved_delta)
        .bind(reason)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn movements_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}
