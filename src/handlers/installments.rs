// src/handlers/installments.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::AppError, money},
    config::AppState,
    models::dashboard::UpcomingInstallments,
    models::installments::{Installment, PaymentOutcome},
    models::sales::SaleDetail,
};

// ---
// Validação Customizada
// ---
fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusiveMin".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

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
// Payload: CreateSchedule
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedulePayload {
    pub sale_id: Uuid,

    #[validate(range(min = 1, max = 60, message = "Número de parcelas fora do intervalo."))]
    #[schema(example = 3)]
    pub num_installments: i32,

    // Entrada paga no ato. Sai do principal antes da divisão.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "50.00")]
    pub entry_payment: Decimal,

    // Âncora dos vencimentos. Ausente usa a data de criação da venda.
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
}

// POST /api/installments/create
#[utoipa::path(
    post,
    path = "/api/installments/create",
    tag = "Installments",
    request_body = CreateSchedulePayload,
    responses(
        (status = 201, description = "Carnê gerado: soma exata ao centavo, vencimentos mensais", body = Vec<Installment>),
        (status = 400, description = "Plano inválido (entrada >= total, venda já parcelada)"),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda cancelada ou quitada")
    )
)]
pub async fn create_schedule(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSchedulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let installments = app_state
        .installment_service
        .create_schedule(
            &app_state.db_pool,
            payload.sale_id,
            payload.num_installments,
            money::normalize(payload.entry_payment),
            payload.start_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(installments)))
}

// GET /api/installments/{id}/details
#[utoipa::path(
    get,
    path = "/api/installments/{id}/details",
    tag = "Installments",
    responses(
        (status = 200, description = "Carnê completo da venda com pagamentos aninhados", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Venda")
    )
)]
pub async fn get_details(
    State(app_state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .installment_service
        .details(&app_state.db_pool, sale_id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Payload: Payment
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "100.00")]
    pub amount: Decimal,

    // Ausente usa a data de hoje.
    #[schema(value_type = Option<String>, format = Date, example = "2024-02-01")]
    pub payment_date: Option<NaiveDate>,

    #[validate(length(max = 40, message = "Forma de pagamento longa demais."))]
    #[schema(example = "pix")]
    pub method: Option<String>,

    #[validate(length(max = 280, message = "Observação longa demais."))]
    pub notes: Option<String>,
}

// POST /api/installments/{id}/payment
#[utoipa::path(
    post,
    path = "/api/installments/{id}/payment",
    tag = "Installments",
    request_body = PaymentPayload,
    responses(
        (status = 200, description = "Pagamento aplicado, parcela e venda recomputadas (aviso se pagou a mais)", body = PaymentOutcome),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Parcela não encontrada"),
        (status = 409, description = "Parcela quitada ou anulada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Parcela")
    )
)]
pub async fn apply_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .installment_service
        .apply_payment(
            &app_state.db_pool,
            id,
            money::normalize(payload.amount),
            payload.payment_date,
            payload.method.as_deref(),
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// ---
// Payload: EditPayment
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPaymentPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "80.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-02-01")]
    pub payment_date: NaiveDate,

    #[validate(length(max = 40, message = "Forma de pagamento longa demais."))]
    #[schema(example = "dinheiro")]
    pub method: Option<String>,

    #[validate(length(max = 280, message = "Observação longa demais."))]
    pub notes: Option<String>,
}

// PUT /api/installments/payments/{id}
#[utoipa::path(
    put,
    path = "/api/installments/payments/{id}",
    tag = "Installments",
    request_body = EditPaymentPayload,
    responses(
        (status = 200, description = "Pagamento corrigido, tudo recomputado do histórico", body = PaymentOutcome),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Pagamento")
    )
)]
pub async fn edit_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .installment_service
        .edit_payment(
            &app_state.db_pool,
            id,
            money::normalize(payload.amount),
            payload.payment_date,
            payload.method.as_deref(),
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// DELETE /api/installments/payments/{id}
#[utoipa::path(
    delete,
    path = "/api/installments/payments/{id}",
    tag = "Installments",
    responses(
        (status = 200, description = "Pagamento excluído, parcela pode voltar a PARTIAL/PENDING", body = PaymentOutcome),
        (status = 404, description = "Pagamento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Pagamento")
    )
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .installment_service
        .delete_payment(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// PUT /api/installments/{id}/pay-full
#[utoipa::path(
    put,
    path = "/api/installments/{id}/pay-full",
    tag = "Installments",
    responses(
        (status = 200, description = "Todas as parcelas em aberto quitadas de uma vez", body = SaleDetail),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda cancelada ou já quitada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da Venda")
    )
)]
pub async fn pay_full(
    State(app_state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .installment_service
        .pay_full(&app_state.db_pool, sale_id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// GET /api/installments/upcoming
#[utoipa::path(
    get,
    path = "/api/installments/upcoming",
    tag = "Installments",
    responses(
        (status = 200, description = "Parcelas atrasadas, de hoje e dos próximos 7 dias, com totais", body = UpcomingInstallments)
    )
)]
pub async fn get_upcoming(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let upcoming = app_state.installment_service.upcoming().await?;
    Ok((StatusCode::OK, Json(upcoming)))
}
