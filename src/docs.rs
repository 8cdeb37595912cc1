// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Panel ---
        handlers::panel::obtener_panel,
        handlers::panel::aplicar_filtros,
        handlers::panel::cambiar_pagina,
        handlers::panel::exportar_csv,
    ),
    components(
        schemas(
            // Filtros y grilla
            models::filtros::VentasFilters,
            models::ventas::VentaRow,
            models::ventas::PaginacionView,
            models::opciones::OpcionesFiltros,

            // Métricas agregadas
            models::dashboard::DashboardMetrics,
            models::dashboard::DashboardKpis,
            models::dashboard::StackedPoint,
            models::dashboard::TopArticle,
            models::dashboard::RubroPoint,

            // Modelos de vista del tablero
            services::panel::VistaPanel,
            services::tablero::VistaTablero,
            services::tablero::KpisTablero,
            services::tablero::ApiladoSucursales,
            services::tablero::PilaSucursal,
            services::tablero::LadoPeriodo,
            services::tablero::SegmentoCategoria,
            services::tablero::DesgloseMedio,
            services::tablero::EntradaMezcla,
            services::tablero::PuntoDispersion,

            handlers::panel::CambioPagina,
        )
    ),
    tags(
        (name = "Panel", description = "Tablero de ventas: filtros, métricas, grilla y exportación")
    ),
    info(
        title = "Tablero de Ventas API",
        description = "Backend del tablero de análisis de ventas sobre la vista consolidada",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
