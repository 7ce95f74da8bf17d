// src/handlers/customers.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::catalog::Customer};

// ---
// Payload: CreateCustomer
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Maria Aparecida")]
    pub name: String,

    #[validate(length(max = 30, message = "Telefone longo demais."))]
    #[schema(example = "(34) 99999-0000")]
    pub phone: Option<String>,

    #[schema(example = "Prefere malinha às quintas")]
    pub notes: Option<String>,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrada", body = Customer),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .create(&payload.name, payload.phone.as_deref(), payload.notes.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Todas as clientes, por nome", body = Vec<Customer>)
    )
)]
pub async fn get_all_customers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list().await?;
    Ok((StatusCode::OK, Json(customers)))
}
