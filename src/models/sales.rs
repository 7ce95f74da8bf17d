// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::installments::InstallmentDetail;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Pending,   // Criada, aguardando confirmação (malinha em casa)
    Confirmed, // Fechada, estoque baixado
    Partial,   // Confirmada com pagamento parcial
    Paid,      // Quitada
    Cancelled, // Cancelada, estoque devolvido
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleType {
    Direct,  // Baixa o estoque na criação
    Malinha, // Reserva na criação, baixa na confirmação
}

// --- Structs ---

// Item congelado no momento da venda. Preço e custo ficam aqui dentro do
// JSONB para que edições futuras do produto não reescrevam o histórico.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineItem {
    pub product_id: Uuid,

    #[schema(example = "Vestido Midi Floral")]
    pub name: String,

    #[schema(example = 2)]
    pub quantity: i32,

    #[schema(example = "149.90")]
    pub unit_price: Decimal,

    #[schema(example = "62.50")]
    pub cost_price_at_time: Decimal,

    #[schema(example = "M")]
    pub size: Option<String>,

    #[schema(example = "Azul")]
    pub color: Option<String>,
}

impl SaleLineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

// Linha como chega na requisição: só a referência ao produto. Nome, custo
// e preço (se não vier override) são congelados pelo serviço.
// Serialize também: o validador de tamanho da lista serializa o valor
// ofensor nos parâmetros do erro.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleLine {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    #[schema(example = 2)]
    pub quantity: i32,

    // Override opcional (desconto negociado). None usa o preço de tabela.
    #[schema(example = "129.90")]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,

    pub sale_type: SaleType,
    pub status: SaleStatus,

    #[schema(value_type = Vec<SaleLineItem>)]
    pub items: Json<Vec<SaleLineItem>>,

    #[schema(example = "299.80")]
    pub total_value: Decimal,

    #[schema(example = "crediario")]
    pub payment_method: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem de vendas, já com o nome do cliente resolvido.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,

    #[schema(example = "Maria Aparecida")]
    pub customer_name: Option<String>,

    pub sale_type: SaleType,
    pub status: SaleStatus,

    #[schema(example = "299.80")]
    pub total_value: Decimal,

    pub created_at: DateTime<Utc>,
}

// Visão completa do carnê de uma venda.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,

    #[schema(example = "Maria Aparecida")]
    pub customer_name: Option<String>,

    #[schema(example = "100.00")]
    pub total_paid: Decimal,

    #[schema(example = "199.80")]
    pub remaining_amount: Decimal,

    pub has_overdue: bool,

    pub installments: Vec<InstallmentDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_exactly() {
        let item = SaleLineItem {
            product_id: Uuid::new_v4(),
            name: "Blusa Cropped".into(),
            quantity: 3,
            unit_price: Decimal::new(3333, 2),
            cost_price_at_time: Decimal::new(1500, 2),
            size: None,
            color: None,
        };
        assert_eq!(item.line_total(), Decimal::new(9999, 2));
    }
}
