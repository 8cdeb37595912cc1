// src/handlers/panel.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::panel::PanelContext,
    models::filtros::VentasFilters,
    services::export,
    services::panel::VistaPanel,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConsultaPanel {
    /// Categoría de negocio que restringe el mix detallado (Ej: "TARJETA")
    pub categoria: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CambioPagina {
    /// Índice de página pedido, base cero; se recorta al rango válido
    #[schema(example = 2)]
    pub pagina: i64,
}

// GET /api/panel
#[utoipa::path(
    get,
    path = "/api/panel",
    tag = "Panel",
    params(
        ("x-panel-id" = Uuid, Header, description = "ID de la sesión de panel"),
        ConsultaPanel,
    ),
    responses(
        (status = 200, description = "Estado completo del panel con los modelos de vista", body = VistaPanel),
        (status = 400, description = "Cabecera de panel ausente o inválida")
    )
)]
pub async fn obtener_panel(
    State(app_state): State<AppState>,
    panel_ctx: PanelContext,
    Query(consulta): Query<ConsultaPanel>,
) -> Result<impl IntoResponse, AppError> {
    let panel = app_state.paneles.obtener(panel_ctx.0).await;
    let vista = panel.vista(consulta.categoria.as_deref()).await;
    Ok((StatusCode::OK, Json(vista)))
}

// PUT /api/panel/filtros
#[utoipa::path(
    put,
    path = "/api/panel/filtros",
    tag = "Panel",
    request_body = VentasFilters,
    params(
        ("x-panel-id" = Uuid, Header, description = "ID de la sesión de panel")
    ),
    responses(
        (status = 200, description = "Panel recargado con los filtros nuevos", body = VistaPanel),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn aplicar_filtros(
    State(app_state): State<AppState>,
    panel_ctx: PanelContext,
    Json(payload): Json<VentasFilters>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let panel = app_state.paneles.obtener(panel_ctx.0).await;
    panel.aplicar_filtros(payload).await;

    Ok((StatusCode::OK, Json(panel.vista(None).await)))
}

// PUT /api/panel/pagina
#[utoipa::path(
    put,
    path = "/api/panel/pagina",
    tag = "Panel",
    request_body = CambioPagina,
    params(
        ("x-panel-id" = Uuid, Header, description = "ID de la sesión de panel")
    ),
    responses(
        (status = 200, description = "Grilla recargada en la página pedida", body = VistaPanel),
        (status = 400, description = "Cabecera de panel ausente o inválida")
    )
)]
pub async fn cambiar_pagina(
    State(app_state): State<AppState>,
    panel_ctx: PanelContext,
    Json(payload): Json<CambioPagina>,
) -> Result<impl IntoResponse, AppError> {
    let panel = app_state.paneles.obtener(panel_ctx.0).await;
    panel.cambiar_pagina(payload.pagina).await;

    Ok((StatusCode::OK, Json(panel.vista(None).await)))
}

// GET /api/panel/export
#[utoipa::path(
    get,
    path = "/api/panel/export",
    tag = "Panel",
    params(
        ("x-panel-id" = Uuid, Header, description = "ID de la sesión de panel")
    ),
    responses(
        (status = 200, description = "CSV de la página cargada de la grilla",
         body = String, content_type = "text/csv"),
        (status = 400, description = "Cabecera de panel ausente o inválida")
    )
)]
pub async fn exportar_csv(
    State(app_state): State<AppState>,
    panel_ctx: PanelContext,
) -> Result<impl IntoResponse, AppError> {
    let panel = app_state.paneles.obtener(panel_ctx.0).await;
    let filas = panel.filas_cargadas().await;

    let cuerpo = export::ventas_a_csv(&filas)?;
    let nombre = export::nombre_archivo(Local::now().date_naive());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{nombre}\""),
            ),
        ],
        cuerpo,
    ))
}
