// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resumo geral do painel. As quatro somas rodam na mesma transação
    // para formar um snapshot consistente dos dados.
    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        // A. Vendas registradas hoje (canceladas fora)
        let sales_today = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_value), 0)
            FROM sales
            WHERE status != 'CANCELLED'
              AND created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Saldo devedor total das parcelas em aberto
        let open_receivables = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount_due - amount_paid), 0)
            FROM installments
            WHERE status IN ('PENDING', 'PARTIAL')
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Fatia do saldo já vencida
        let overdue_total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount_due - amount_paid), 0)
            FROM installments
            WHERE status IN ('PENDING', 'PARTIAL')
              AND due_date < CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Pagamentos datados de hoje
        let received_today = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM installment_payments
            WHERE payment_date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            sales_today,
            open_receivables,
            overdue_total,
            received_today,
        })
    }
}
