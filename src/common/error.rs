// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros do razão: validação e erros de domínio viram 4xx,
// falhas de transação viram 5xx. Nada aqui é re-tentado silenciosamente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidSchedule(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    AlreadySettled(String),

    #[error("{0}")]
    ResourceNotFound(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidSchedule(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidAmount(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InsufficientStock(msg) => (StatusCode::CONFLICT, msg),
            AppError::AlreadySettled(msg) => (StatusCode::CONFLICT, msg),
            AppError::ResourceNotFound(msg) => (StatusCode::NOT_FOUND, msg),

            // Falha da transação: rollback já aconteceu; o detalhe do driver
            // acompanha a resposta e o erro completo vai para o log.
            AppError::DatabaseError(e) => {
                tracing::error!("Erro de banco de dados: {}", e);
                let body = Json(json!({
                    "error": "Falha na transação com o banco de dados.",
                    "detail": e.to_string(),
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }

            AppError::InternalServerError(e) => {
                tracing::error!("Erro interno do servidor: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
