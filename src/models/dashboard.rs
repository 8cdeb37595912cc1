// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Los nombres de campo siguen el contrato JSON de la función de agregación
// remota: los KPIs vienen en camelCase y las series en snake_case.

// 1. KPIs del período
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardKpis {
    pub total_facturado: Decimal,
    pub margen_total: Decimal,
    /// Margen / venta total, en porcentaje
    pub rentabilidad: Decimal,
    pub voucher_count: i64,
}

// 2. Tupla plana (sucursal × categoría de negocio × medio de pago)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StackedPoint {
    pub nro_sucursal: String,
    pub categoria_negocio: String,
    pub medio_pago: String,
    pub monto: Decimal,
}

// 3. Ranking de artículos, ya ordenado por el servidor
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TopArticle {
    pub cod_articu: String,
    pub descripcio: String,
    pub total: Decimal,
    pub cant: Decimal,
    pub margen: Decimal,
}

// 4. Punto (rubro, margen promedio, cantidad total) para la dispersión
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RubroPoint {
    pub rubro: String,
    pub avg_margen: Decimal,
    pub total_cantidad: Decimal,
}

/// Respuesta agregada completa del RPC del tablero. El servidor hace todo el
/// SUM/GROUP BY; acá solo se reacomoda para los gráficos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DashboardMetrics {
    pub kpis: DashboardKpis,
    pub stacked_data: Vec<StackedPoint>,
    pub top_articles: Vec<TopArticle>,
    pub rubro_points: Vec<RubroPoint>,
}

impl DashboardMetrics {
    /// Valor definido para "sin período": KPIs en cero y series vacías.
    pub fn vacio() -> Self {
        Self::default()
    }
}

/// Métricas del período seleccionado junto con las del mes calendario
/// anterior, para la comparación del tablero.
#[derive(Debug, Clone, Default)]
pub struct MetricasComparadas {
    pub actual: DashboardMetrics,
    pub anterior: DashboardMetrics,
}
