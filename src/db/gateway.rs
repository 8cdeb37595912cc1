// src/db/gateway.rs

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        dashboard::DashboardMetrics,
        filtros::{RangoFechas, VentasFilters},
        opciones::Dimension,
        ventas::PaginaVentas,
    },
};

/// Pasarela hacia la base de ventas remota. Se inyecta en la capa de
/// servicios en lugar de un cliente global, así los tests corren contra
/// una implementación en memoria.
///
/// Contrato: toda dimensión sin selección viaja como NULL ("sin
/// restricción"); los errores remotos se propagan tipados y sin reintentos.
#[async_trait]
pub trait VentasGateway: Send + Sync {
    /// Página de filas de la vista consolidada, ordenada por fecha
    /// descendente, junto con el total exacto de coincidencias.
    async fn pagina_ventas(
        &self,
        filtros: &VentasFilters,
        pagina: i64,
    ) -> Result<PaginaVentas, AppError>;

    /// Métricas pre-agregadas del tablero para un juego de filtros.
    async fn metricas(&self, filtros: &VentasFilters) -> Result<DashboardMetrics, AppError>;

    /// Valores distintos de una dimensión vía RPC, acotados al rango.
    async fn rpc_valores_distintos(
        &self,
        dimension: Dimension,
        rango: RangoFechas,
    ) -> Result<Vec<String>, AppError>;

    /// Escaneo directo de la vista para la misma dimensión: el respaldo
    /// cuando el RPC falla o vuelve vacío.
    async fn escaneo_valores_distintos(
        &self,
        dimension: Dimension,
        rango: RangoFechas,
    ) -> Result<Vec<String>, AppError>;

    async fn rpc_cuotas_distintas(&self, rango: RangoFechas) -> Result<Vec<i32>, AppError>;

    async fn escaneo_cuotas_distintas(&self, rango: RangoFechas) -> Result<Vec<i32>, AppError>;
}
