// src/models/opciones.rs

use serde::Serialize;
use utoipa::ToSchema;

// --- LISTAS DE OPCIONES ---

/// Valores disponibles para los checkboxes de los sidebars de filtros.
/// Se recalculan cada vez que cambia el rango de fechas; las demás
/// dimensiones del filtro nunca las recortan.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpcionesFiltros {
    pub sucursales: Vec<String>,
    pub rubros: Vec<String>,
    /// Medios de pago ya unificados (desc_cuenta / desc_cond_venta)
    pub medios_pago: Vec<String>,
    /// Top de clientes por volumen de compra del período
    pub clientes: Vec<String>,
    pub familias: Vec<String>,
    pub categorias: Vec<String>,
    pub tipos: Vec<String>,
    pub generos: Vec<String>,
    pub proveedores: Vec<String>,
    pub cuotas: Vec<i32>,
}

// --- TABLA DE DIMENSIONES ---

/// Dimensiones con lista de valores distintos. La tabla es estática a
/// propósito: una dimensión inexistente no compila, en lugar de armar el
/// nombre del RPC concatenando strings en runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Sucursal,
    Rubro,
    MedioPago,
    Cliente,
    Familia,
    Categoria,
    Tipo,
    Genero,
    Proveedor,
}

pub struct DefDimension {
    pub dimension: Dimension,
    /// Función remota que resuelve el DISTINCT del lado del servidor
    pub funcion_rpc: &'static str,
    /// Columna del resultado del RPC
    pub columna_resultado: &'static str,
    /// Columna de la vista para el escaneo directo de respaldo.
    /// MedioPago no escanea una sola columna: unifica desc_cuenta y
    /// desc_cond_venta según cod_cond_venta (ver el repositorio).
    pub columna_fallback: &'static str,
}

pub const DIMENSIONES: [DefDimension; 9] = [
    DefDimension {
        dimension: Dimension::Sucursal,
        funcion_rpc: "get_distinct_sucursales",
        columna_resultado: "nro_sucursal",
        columna_fallback: "nro_sucursal",
    },
    DefDimension {
        dimension: Dimension::Rubro,
        funcion_rpc: "get_distinct_rubros",
        columna_resultado: "rubro",
        columna_fallback: "rubro",
    },
    DefDimension {
        dimension: Dimension::MedioPago,
        funcion_rpc: "get_distinct_medios_pago",
        columna_resultado: "medio_pago",
        columna_fallback: "desc_cond_venta",
    },
    DefDimension {
        dimension: Dimension::Cliente,
        funcion_rpc: "get_top_clientes",
        columna_resultado: "razon_social",
        columna_fallback: "razon_social",
    },
    DefDimension {
        dimension: Dimension::Familia,
        funcion_rpc: "get_distinct_familias",
        columna_resultado: "familia",
        columna_fallback: "familia",
    },
    DefDimension {
        dimension: Dimension::Categoria,
        funcion_rpc: "get_distinct_categorias",
        columna_resultado: "categoria",
        columna_fallback: "categoria",
    },
    DefDimension {
        dimension: Dimension::Tipo,
        funcion_rpc: "get_distinct_tipos",
        columna_resultado: "tipo",
        columna_fallback: "tipo",
    },
    DefDimension {
        dimension: Dimension::Genero,
        funcion_rpc: "get_distinct_generos",
        columna_resultado: "genero",
        columna_fallback: "genero",
    },
    DefDimension {
        dimension: Dimension::Proveedor,
        funcion_rpc: "get_distinct_proveedores",
        columna_resultado: "proveedor",
        columna_fallback: "proveedor",
    },
];

/// RPC de cuotas; devuelve enteros, por eso queda fuera de la tabla.
pub const RPC_CUOTAS: &str = "get_distinct_cuotas";
pub const COLUMNA_CUOTAS: &str = "cant_cuotas";

impl Dimension {
    pub fn def(self) -> &'static DefDimension {
        DIMENSIONES
            .iter()
            .find(|d| d.dimension == self)
            .expect("toda Dimension tiene su entrada en DIMENSIONES")
    }
}
