// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::sales::{NewSaleLine, Sale, SaleDetail, SaleSummary, SaleType},
};

// ---
// Payload: CreateSale
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub customer_id: Option<Uuid>,

    #[schema(example = "MALINHA")]
    pub sale_type: SaleType,

    #[validate(length(min = 1, message = "A venda precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<NewSaleLine>,

    #[schema(example = "crediario")]
    pub payment_method: Option<String>,

    #[schema(example = "Malinha levada na terça")]
    pub notes: Option<String>,
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda criada como PENDING (direta já baixa o estoque, malinha reserva)", body = Sale),
        (status = 404, description = "Cliente ou produto não encontrado"),
        (status = 409, description = "Estoque insuficiente em alguma linha")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sale = app_state
        .sales_service
        .create_sale(
            &app_state.db_pool,
            payload.customer_id,
            payload.sale_type,
            &payload.items,
            payload.payment_method.as_deref(),
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses(
        (status = 200, description = "Todas as vendas, mais recentes primeiro", body = Vec<SaleSummary>)
    )
)]
pub async fn get_all_sales(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.list().await?;
    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    responses(
        (status = 200, description = "Venda com carnê, pagamentos e atraso derivado", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Venda")
    )
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .installment_service
        .details(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/sales/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/sales/{id}/confirm",
    tag = "Sales",
    responses(
        (status = 200, description = "Venda confirmada (reservas da malinha consumidas)", body = Sale),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda não está pendente")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Venda")
    )
)]
pub async fn confirm_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .confirm_sale(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/sales/{id}/cancel",
    tag = "Sales",
    responses(
        (status = 200, description = "Venda cancelada, estoque devolvido e parcelas em aberto anuladas", body = Sale),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda quitada ou já cancelada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Venda")
    )
)]
pub async fn cancel_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .cancel_sale(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(sale)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(items: Vec<NewSaleLine>) -> CreateSalePayload {
        CreateSalePayload {
            customer_id: None,
            sale_type: SaleType::Direct,
            items,
            payment_method: Some("pix".into()),
            notes: None,
        }
    }

    #[test]
    fn sale_without_items_fails_validation() {
        // A lista ofensora vai serializada nos parâmetros do erro.
        let err = payload(vec![]).validate().unwrap_err();
        assert!(err.errors().contains_key("items"));
    }

    #[test]
    fn zero_quantity_line_fails_nested_validation() {
        let line = NewSaleLine {
            product_id: Uuid::new_v4(),
            quantity: 0,
            unit_price: None,
        };
        assert!(payload(vec![line]).validate().is_err());
    }

    #[test]
    fn well_formed_sale_payload_passes() {
        let line = NewSaleLine {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: None,
        };
        assert!(payload(vec![line]).validate().is_ok());
    }
}
