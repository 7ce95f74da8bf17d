// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Resumo do dia (os cards do topo do painel).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(example = "480.00")]
    pub sales_today: Decimal, // Vendas registradas hoje (não canceladas)

    #[schema(example = "1250.00")]
    pub open_receivables: Decimal, // Saldo devedor de todas as parcelas abertas

    #[schema(example = "300.00")]
    pub overdue_total: Decimal, // Fatia do saldo já vencida

    #[schema(example = "150.00")]
    pub received_today: Decimal, // Pagamentos datados de hoje
}

// Parcela que aparece no widget de cobrança, com o cliente resolvido.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingInstallment {
    pub installment_id: Uuid,
    pub sale_id: Uuid,

    #[schema(example = "Maria Aparecida")]
    pub customer_name: Option<String>,

    #[schema(example = 2)]
    pub sequence: i32,

    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub due_date: NaiveDate,

    #[schema(example = "100.00")]
    pub amount_due: Decimal,

    #[schema(example = "40.00")]
    pub amount_paid: Decimal,

    #[schema(example = "60.00")]
    pub remaining_amount: Decimal,
}

// Agrupamento do widget: atrasadas, vencendo hoje e vencendo na semana.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingInstallments {
    pub overdue: Vec<UpcomingInstallment>,
    pub due_today: Vec<UpcomingInstallment>,
    pub due_this_week: Vec<UpcomingInstallment>,

    #[schema(example = "300.00")]
    pub overdue_total: Decimal,

    #[schema(example = "100.00")]
    pub due_today_total: Decimal,

    #[schema(example = "260.00")]
    pub due_this_week_total: Decimal,
}
