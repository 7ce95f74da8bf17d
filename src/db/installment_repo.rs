// src/db/installment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::UpcomingInstallment,
    models::installments::{Installment, InstallmentPayment, InstallmentStatus},
};

#[derive(Clone)]
pub struct InstallmentRepository {
    pool: PgPool,
}

impl InstallmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Parcelas
    // ---

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        sequence: i32,
        due_date: NaiveDate,
        amount_due: Decimal,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, Installment>(
            r#"
            INSERT INTO installments (sale_id, sequence, due_date, amount_due)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(sequence)
        .bind(due_date)
        .bind(amount_due)
        .fetch_one(executor)
        .await?;
        Ok(installment)
    }

    /// Leitura sem lock. Usada para descobrir a venda dona da parcela
    /// antes de trancar na ordem certa (venda primeiro, parcela depois).
    pub async fn get<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Installment>("SELECT * FROM installments WHERE id = $1")
            .bind(installment_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Parcela não encontrada.".into()))
    }

    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Installment>("SELECT * FROM installments WHERE id = $1 FOR UPDATE")
            .bind(installment_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Parcela não encontrada.".into()))
    }

    pub async fn list_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, Installment>(
            "SELECT * FROM installments WHERE sale_id = $1 ORDER BY sequence ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(installments)
    }

    /// Mesma listagem, mas trancando as linhas. Usada pelas recomputações,
    /// sempre depois do lock na venda.
    pub async fn list_for_sale_for_update<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, Installment>(
            "SELECT * FROM installments WHERE sale_id = $1 ORDER BY sequence ASC FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(installments)
    }

    /// A venda já tem carnê? (parcelas não-canceladas)
    pub async fn has_billable<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM installments
                WHERE sale_id = $1 AND status != 'CANCELLED'
            )
            "#,
        )
        .bind(sale_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn update_amounts<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
        amount_paid: Decimal,
        status: InstallmentStatus,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Installment>(
            r#"
            UPDATE installments
            SET amount_paid = $2, status = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(installment_id)
        .bind(amount_paid)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Parcela não encontrada.".into()))
    }

    /// Anula as parcelas em aberto de uma venda cancelada. As quitadas
    /// ficam como estão (histórico de pagamento é imutável).
    pub async fn cancel_open_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET status = 'CANCELLED', updated_at = now()
            WHERE sale_id = $1 AND status IN ('PENDING', 'PARTIAL')
            "#,
        )
        .bind(sale_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Pagamentos
    // ---

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
        amount: Decimal,
        payment_date: NaiveDate,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<InstallmentPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, InstallmentPayment>(
            r#"
            INSERT INTO installment_payments (installment_id, amount, payment_date, method, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(installment_id)
        .bind(amount)
        .bind(payment_date)
        .bind(method)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn get_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<InstallmentPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InstallmentPayment>("SELECT * FROM installment_payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento não encontrado.".into()))
    }

    pub async fn update_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        amount: Decimal,
        payment_date: NaiveDate,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<InstallmentPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InstallmentPayment>(
            r#"
            UPDATE installment_payments
            SET amount = $2, payment_date = $3, method = $4, notes = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(amount)
        .bind(payment_date)
        .bind(method)
        .bind(notes)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Pagamento não encontrado.".into()))
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, payment_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM installment_payments WHERE id = $1")
            .bind(payment_id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Pagamento não encontrado.".into()));
        }
        Ok(())
    }

    pub async fn payments_for_installment<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
    ) -> Result<Vec<InstallmentPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, InstallmentPayment>(
            r#"
            SELECT * FROM installment_payments
            WHERE installment_id = $1
            ORDER BY payment_date ASC, created_at ASC
            "#,
        )
        .bind(installment_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    /// Histórico completo de pagamentos de uma venda, em uma query só.
    pub async fn payments_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<InstallmentPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, InstallmentPayment>(
            r#"
            SELECT p.* FROM installment_payments p
            JOIN installments i ON i.id = p.installment_id
            WHERE i.sale_id = $1
            ORDER BY p.payment_date ASC, p.created_at ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    // ---
    // Widget de cobrança
    // ---

    /// Parcelas em aberto vencendo até `window_end` (inclui as já vencidas).
    pub async fn upcoming(
        &self,
        window_end: NaiveDate,
    ) -> Result<Vec<UpcomingInstallment>, AppError> {
        let rows = sqlx::query_as::<_, UpcomingInstallment>(
            r#"
            SELECT i.id AS installment_id,
                   i.sale_id,
                   c.name AS customer_name,
                   i.sequence,
                   i.due_date,
                   i.amount_due,
                   i.amount_paid,
                   i.amount_due - i.amount_paid AS remaining_amount
            FROM installments i
            JOIN sales s ON s.id = i.sale_id
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE i.status IN ('PENDING', 'PARTIAL')
              AND i.due_date <= $1
            ORDER BY i.due_date ASC, i.sequence ASC
            "#,
        )
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
