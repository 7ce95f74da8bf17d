// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::AppError, money},
    config::AppState,
    models::catalog::Product,
    models::stock::StockMovement,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Vestido Midi Floral")]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "149.90")]
    pub price: Decimal,

    // Custo de aquisição, usado no congelamento dos itens da venda.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "62.50")]
    pub cost_price: Decimal,

    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    #[serde(default)]
    #[schema(example = 5)]
    pub stock: i32,

    #[schema(example = "M")]
    pub size: Option<String>,

    #[schema(example = "Azul")]
    pub color: Option<String>,
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto cadastrado (estoque inicial lançado no livro)", body = Product),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .stock_service
        .create_product(
            &app_state.db_pool,
            &payload.name,
            money::normalize(payload.price),
            money::normalize(payload.cost_price),
            payload.stock,
            payload.size.as_deref(),
            payload.color.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "Todos os produtos, com estoque e reservado", body = Vec<Product>)
    )
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.stock_service.list_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.stock_service.get_product(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: Restock
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestockPayload {
    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    #[schema(example = 10)]
    pub quantity: i32,

    #[schema(example = "Reposição da coleção de inverno")]
    pub notes: Option<String>,
}

// POST /api/products/{id}/restock
#[utoipa::path(
    post,
    path = "/api/products/{id}/restock",
    tag = "Products",
    request_body = RestockPayload,
    responses(
        (status = 200, description = "Estoque reposto, saldo atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn restock_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .stock_service
        .restock(&app_state.db_pool, id, payload.quantity, payload.notes.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: SetActive
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActivePayload {
    #[schema(example = false)]
    pub active: bool,
}

// PUT /api/products/{id}/active
#[utoipa::path(
    put,
    path = "/api/products/{id}/active",
    tag = "Products",
    request_body = SetActivePayload,
    responses(
        (status = 200, description = "Produto ativado ou desativado no catálogo", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn set_product_active(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .stock_service
        .set_product_active(&app_state.db_pool, id, payload.active)
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// GET /api/products/{id}/movements
#[utoipa::path(
    get,
    path = "/api/products/{id}/movements",
    tag = "Products",
    responses(
        (status = 200, description = "Livro de movimentações do produto (mais recente primeiro)", body = Vec<StockMovement>),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn get_product_movements(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.stock_service.movements(id).await?;
    Ok((StatusCode::OK, Json(movements)))
}
