// src/middleware/panel.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// El nombre de nuestra cabecera HTTP. La app no tiene autenticación: el
// panel es una sesión anónima identificada por este UUID del navegador.
const PANEL_ID_HEADER: &str = "x-panel-id";

/// Extractor del panel al que apunta el request.
#[derive(Debug, Clone)]
pub struct PanelContext(pub Uuid);

impl<S> FromRequestParts<S> for PanelContext
where
    S: Send + Sync,
{
    // AppError ya implementa IntoResponse, sirve directo como rechazo
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let valor = parts
            .headers
            .get(PANEL_ID_HEADER)
            .ok_or(AppError::PanelHeaderError)?;

        let texto = valor.to_str().map_err(|_| AppError::PanelHeaderError)?;
        let id = Uuid::parse_str(texto).map_err(|_| AppError::PanelHeaderError)?;

        Ok(PanelContext(id))
    }
}
