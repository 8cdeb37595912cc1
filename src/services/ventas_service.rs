// src/services/ventas_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::VentasGateway,
    models::{
        dashboard::{DashboardMetrics, MetricasComparadas},
        filtros::{RangoFechas, VentasFilters},
        opciones::{Dimension, OpcionesFiltros},
        ventas::PaginaVentas,
    },
};

/// Orquesta las consultas a la pasarela: página de grilla, métricas del
/// período actual + anterior, y listas de opciones por dimensión.
#[derive(Clone)]
pub struct VentasService {
    gateway: Arc<dyn VentasGateway>,
}

impl VentasService {
    pub fn new(gateway: Arc<dyn VentasGateway>) -> Self {
        Self { gateway }
    }

    /// Una página de la grilla de detalle. La falla remota se propaga
    /// tipada; decide el controlador qué mostrar.
    pub async fn cargar_pagina(
        &self,
        filtros: &VentasFilters,
        pagina: i64,
    ) -> Result<PaginaVentas, AppError> {
        self.gateway.pagina_ventas(filtros, pagina).await
    }

    /// Métricas del período seleccionado y del mes calendario anterior.
    /// Las dos consultas salen en paralelo; la latencia queda acotada por
    /// la más lenta, no por la suma.
    pub async fn cargar_metricas(
        &self,
        filtros: &VentasFilters,
    ) -> Result<MetricasComparadas, AppError> {
        let filtros_previos = filtros.periodo_anterior();

        let fut_actual = self.gateway.metricas(filtros);
        let fut_anterior = async {
            match &filtros_previos {
                // Sin límites de fecha no hay período anterior definido:
                // KPIs en cero y series vacías, sin llamada remota.
                None => DashboardMetrics::vacio(),
                Some(previos) => match self.gateway.metricas(previos).await {
                    Ok(metricas) => metricas,
                    Err(e) => {
                        tracing::warn!(
                            "Falló la carga del período anterior, se compara contra cero: {e}"
                        );
                        DashboardMetrics::vacio()
                    }
                },
            }
        };

        let (actual, anterior) = tokio::join!(fut_actual, fut_anterior);

        Ok(MetricasComparadas {
            actual: actual?,
            anterior,
        })
    }

    /// Listas de opciones de todas las dimensiones, en paralelo. Cada
    /// dimensión falla de forma independiente: una caída no bloquea a las
    /// demás.
    pub async fn cargar_opciones(&self, rango: RangoFechas) -> OpcionesFiltros {
        let (
            sucursales,
            rubros,
            medios_pago,
            clientes,
            familias,
            categorias,
            tipos,
            generos,
            proveedores,
            cuotas,
        ) = tokio::join!(
            self.valores_dimension(Dimension::Sucursal, rango),
            self.valores_dimension(Dimension::Rubro, rango),
            self.valores_dimension(Dimension::MedioPago, rango),
            self.valores_dimension(Dimension::Cliente, rango),
            self.valores_dimension(Dimension::Familia, rango),
            self.valores_dimension(Dimension::Categoria, rango),
            self.valores_dimension(Dimension::Tipo, rango),
            self.valores_dimension(Dimension::Genero, rango),
            self.valores_dimension(Dimension::Proveedor, rango),
            self.cuotas_disponibles(rango),
        );

        OpcionesFiltros {
            sucursales,
            rubros,
            medios_pago,
            clientes,
            familias,
            categorias,
            tipos,
            generos,
            proveedores,
            cuotas,
        }
    }

    /// RPC primero; si falla o vuelve vacío, escaneo directo de la vista.
    async fn valores_dimension(&self, dimension: Dimension, rango: RangoFechas) -> Vec<String> {
        match self.gateway.rpc_valores_distintos(dimension, rango).await {
            Ok(valores) if !valores.is_empty() => valores,
            Ok(_) => {
                tracing::warn!("RPC de {dimension:?} sin resultados, escaneo directo");
                self.escaneo_dimension(dimension, rango).await
            }
            Err(e) => {
                tracing::warn!("RPC de {dimension:?} falló ({e}), escaneo directo");
                self.escaneo_dimension(dimension, rango).await
            }
        }
    }

    async fn escaneo_dimension(&self, dimension: Dimension, rango: RangoFechas) -> Vec<String> {
        self.gateway
            .escaneo_valores_distintos(dimension, rango)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("El escaneo de respaldo de {dimension:?} también falló: {e}");
                Vec::new()
            })
    }

    async fn cuotas_disponibles(&self, rango: RangoFechas) -> Vec<i32> {
        match self.gateway.rpc_cuotas_distintas(rango).await {
            Ok(valores) if !valores.is_empty() => valores,
            Ok(_) => self.escaneo_cuotas(rango).await,
            Err(e) => {
                tracing::warn!("RPC de cuotas falló ({e}), escaneo directo");
                self.escaneo_cuotas(rango).await
            }
        }
    }

    async fn escaneo_cuotas(&self, rango: RangoFechas) -> Vec<i32> {
        self.gateway
            .escaneo_cuotas_distintas(rango)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("El escaneo de respaldo de cuotas también falló: {e}");
                Vec::new()
            })
    }
}
