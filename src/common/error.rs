// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // Falla de la pasarela remota (red / consulta). Se muestra al usuario
    // y NO se reintenta automáticamente.
    #[error("Error al consultar la base de ventas: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // El RPC de métricas devolvió un JSON con otra forma
    #[error("Respuesta inválida del servicio de métricas: {0}")]
    MetricsDecodeError(#[from] serde_json::Error),

    #[error("Cabecera x-panel-id ausente o inválida")]
    PanelHeaderError,

    #[error("Error generando el CSV: {0}")]
    CsvError(#[from] csv::Error),

    // Variante genérica para cualquier otro error inesperado.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación, por campo.
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
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PanelHeaderError => (
                StatusCode::BAD_REQUEST,
                "La cabecera x-panel-id es obligatoria y debe ser un UUID.",
            ),

            // Todos los demás (DatabaseError, MetricsDecodeError, ...) son 500.
            // El `tracing` deja registrado el detalle que `thiserror` armó.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.",
                )
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
