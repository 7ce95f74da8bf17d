// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Catálogo da loja. `stock` é a quantidade física; `reserved` é a fatia
// segurada por malinhas ainda pendentes. O que pode ser vendido é a diferença.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    #[schema(example = "Vestido Midi Floral")]
    pub name: String,

    #[schema(example = "149.90")]
    pub price: Decimal,

    #[schema(example = "62.50")]
    pub cost_price: Decimal,

    #[schema(example = 5)]
    pub stock: i32,

    #[schema(example = 2)]
    pub reserved: i32,

    #[schema(example = "M")]
    pub size: Option<String>,

    #[schema(example = "Azul")]
    pub color: Option<String>,

    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unidades livres para vender ou reservar agora.
    pub fn available(&self) -> i32 {
        self.stock - self.reserved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    #[schema(example = "Maria Aparecida")]
    pub name: String,

    #[schema(example = "+55 11 98888-0000")]
    pub phone: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(stock: i32, reserved: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Saia Jeans".into(),
            price: Decimal::new(9990, 2),
            cost_price: Decimal::new(4000, 2),
            stock,
            reserved,
            size: None,
            color: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn available_discounts_reservations() {
        assert_eq!(product(5, 0).available(), 5);
        assert_eq!(product(5, 3).available(), 2);
        assert_eq!(product(3, 3).available(), 0);
    }

    // O ciclo clássico da malinha sobre um estoque de 5 unidades:
    // reservar 3, tentar reservar mais 3, liberar, e então vender 3 direto.
    #[test]
    fn reserve_release_commit_walk() {
        let mut p = product(5, 0);

        // Reservar 3 segura unidades sem debitar o físico.
        assert!(p.available() >= 3);
        p.reserved += 3;
        assert_eq!(p.available(), 2);
        assert_eq!(p.stock, 5);

        // Segunda reserva de 3 não cabe no disponível.
        assert!(p.available() < 3);

        // Liberar devolve tudo ao disponível.
        p.reserved -= 3;
        assert_eq!(p.available(), 5);

        // Venda direta de 3 baixa o físico de uma vez.
        assert!(p.stock >= 3);
        p.stock -= 3;
        assert_eq!(p.stock, 2);
        assert_eq!(p.available(), 2);
    }
}
