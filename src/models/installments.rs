// src/models/installments.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::sales::SaleStatus;

// --- Enums (Mapeando o Postgres) ---

// Status persistido da parcela. OVERDUE não existe aqui de propósito:
// atraso é função da data de hoje e é derivado na leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "installment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    Pending,   // Nada pago
    Partial,   // Pago em parte
    Paid,      // Quitada
    Cancelled, // Anulada junto com a venda
}

// Status exibido ao leitor, já com o atraso calculado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentDisplayStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,
    pub sale_id: Uuid,

    #[schema(example = 1)]
    pub sequence: i32,

    #[schema(value_type = String, format = Date, example = "2024-02-01")]
    pub due_date: NaiveDate,

    #[schema(example = "100.00")]
    pub amount_due: Decimal,

    #[schema(example = "40.00")]
    pub amount_paid: Decimal,

    pub status: InstallmentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Installment {
    pub fn remaining(&self) -> Decimal {
        self.amount_due - self.amount_paid
    }

    /// Ainda conta para o saldo da venda (não quitada, não anulada).
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            InstallmentStatus::Pending | InstallmentStatus::Partial
        )
    }

    /// Atrasada = vencida, em aberto e com saldo devedor.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today && self.amount_paid < self.amount_due
    }

    pub fn display_status(&self, today: NaiveDate) -> InstallmentDisplayStatus {
        if self.is_overdue(today) {
            return InstallmentDisplayStatus::Overdue;
        }
        match self.status {
            InstallmentStatus::Pending => InstallmentDisplayStatus::Pending,
            InstallmentStatus::Partial => InstallmentDisplayStatus::Partial,
            InstallmentStatus::Paid => InstallmentDisplayStatus::Paid,
            InstallmentStatus::Cancelled => InstallmentDisplayStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPayment {
    pub id: Uuid,
    pub installment_id: Uuid,

    #[schema(example = "50.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-02-01")]
    pub payment_date: NaiveDate,

    #[schema(example = "pix")]
    pub method: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Parcela como aparece nas telas do carnê: linha persistida + status
// efetivo (com atraso) + pagamentos aninhados.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentDetail {
    #[serde(flatten)]
    pub installment: Installment,

    pub effective_status: InstallmentDisplayStatus,

    #[schema(example = "60.00")]
    pub remaining_amount: Decimal,

    pub payments: Vec<InstallmentPayment>,
}

// Resultado de aplicar/editar/excluir um pagamento: a parcela e a venda
// já recomputadas. `payment` fica vazio na exclusão.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<InstallmentPayment>,

    pub installment: Installment,

    pub sale_status: SaleStatus,

    #[schema(example = "200.00")]
    pub sale_remaining_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Pagamento excede o valor da parcela em R$ 10.00.")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn installment(
        due_date: NaiveDate,
        amount_due: Decimal,
        amount_paid: Decimal,
        status: InstallmentStatus,
    ) -> Installment {
        Installment {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            sequence: 1,
            due_date,
            amount_due,
            amount_paid,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let today = date(2024, 3, 15);
        let due = Decimal::new(10000, 2);

        let late = installment(date(2024, 3, 1), due, Decimal::ZERO, InstallmentStatus::Pending);
        assert_eq!(late.display_status(today), InstallmentDisplayStatus::Overdue);

        let late_partial =
            installment(date(2024, 3, 1), due, Decimal::new(4000, 2), InstallmentStatus::Partial);
        assert_eq!(
            late_partial.display_status(today),
            InstallmentDisplayStatus::Overdue
        );

        let future = installment(date(2024, 4, 1), due, Decimal::ZERO, InstallmentStatus::Pending);
        assert_eq!(future.display_status(today), InstallmentDisplayStatus::Pending);

        // Vence hoje ainda não é atraso.
        let today_due = installment(today, due, Decimal::ZERO, InstallmentStatus::Pending);
        assert_eq!(today_due.display_status(today), InstallmentDisplayStatus::Pending);
    }

    #[test]
    fn paid_and_cancelled_never_show_overdue() {
        let today = date(2024, 3, 15);
        let due = Decimal::new(10000, 2);

        let paid = installment(date(2024, 3, 1), due, due, InstallmentStatus::Paid);
        assert_eq!(paid.display_status(today), InstallmentDisplayStatus::Paid);

        let cancelled = installment(date(2024, 3, 1), due, Decimal::ZERO, InstallmentStatus::Cancelled);
        assert_eq!(
            cancelled.display_status(today),
            InstallmentDisplayStatus::Cancelled
        );
    }
}
