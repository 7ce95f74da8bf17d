// src/models/stock.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,    // Segurando unidades
    Released,  // Devolvida ao disponível
    Committed, // Consumida por venda confirmada
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_movement_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementReason {
    InitialStock,       // Estoque do cadastro do produto
    Restock,            // Reposição
    Reservation,        // Malinha segurou unidades
    ReservationRelease, // Malinha devolveu unidades
    SaleCommit,         // Baixa por venda
    SaleCancel,         // Estorno por cancelamento
}

// --- Structs ---

// Uma reserva segura unidades fora do "disponível" sem debitar o estoque
// físico. Só o commit debita; o release devolve.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockReservation {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sale_id: Option<Uuid>,

    #[schema(example = 3)]
    pub quantity: i32,

    pub status: ReservationStatus,

    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
    pub committed_at: Option<DateTime<Utc>>,
}

// Trilha de auditoria: cada mutação de estoque deixa uma linha com os
// deltas aplicados às colunas `stock` e `reserved`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,

    #[schema(example = -3)]
    pub stock_delta: i32,

    #[schema(example = 0)]
    pub reserved_delta: i32,

    pub reason: StockMovementReason,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}
