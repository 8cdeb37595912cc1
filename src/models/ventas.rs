// src/models/ventas.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Código de condición de venta que identifica una operación de contado.
pub const COND_CONTADO: &str = "1";

/// Tamaño fijo de página de la grilla de detalle.
pub const PAGE_SIZE: i64 = 500;

// --- FILA DE LA VISTA ---

/// Una línea de comprobante tal como la devuelve la vista consolidada
/// `v_ventas_consolidadas`. Solo lectura: nunca se muta localmente.
///
/// La vista ya aplica DISTINCT ON → queda solo el pago de mayor importe
/// por comprobante, prorrateado en `imp_prop_c_iva`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VentaRow {
    pub nro_sucursal: String,
    pub t_comp: String,
    pub n_comp: String,
    pub fecha: NaiveDateTime,

    pub cod_articu: String,
    pub descripcio: String,
    pub desc_adic: Option<String>,

    pub cod_client: String,
    pub razon_social: String,

    pub cod_cond_venta: String,
    pub desc_cond_venta: String,
    pub cod_cta: String,
    pub desc_cuenta: String,

    pub cantidad: Decimal,
    pub importe_c_iva: Decimal,
    /// Monto prorrateado: fuente de verdad de facturación cuando está presente
    pub imp_prop_c_iva: Option<Decimal>,
    pub precio_neto: Option<Decimal>,
    /// Último precio de compra c/IVA
    pub pr_ult_cpa_c_iva: Option<Decimal>,
    /// Costo unitario
    pub costo: Option<Decimal>,
    pub margen_contribucion: Decimal,
    pub monto_comprobante: Decimal,
    pub porcentaje_rentabilidad: Decimal,

    pub rubro: String,
    pub cant_cuotas: Option<i32>,
    /// 'Cuenta Corriente' | 'Contado/Tarjeta'
    pub modalida_venta: String,

    pub familia: Option<String>,
    pub categoria: Option<String>,
    pub tipo: Option<String>,
    pub genero: Option<String>,
    pub proveedor: Option<String>,
}

impl VentaRow {
    /// Medio de pago efectivo. La vista reparte la descripción en dos
    /// columnas según la condición:
    ///   cod_cond_venta == "1"  →  desc_cuenta (contado: caja/banco)
    ///   cualquier otro valor   →  desc_cond_venta (condición pactada)
    pub fn medio_pago(&self) -> &str {
        if self.cod_cond_venta == COND_CONTADO {
            &self.desc_cuenta
        } else {
            &self.desc_cond_venta
        }
    }

    /// Importe facturado de la línea: prorrateado si existe, si no el bruto.
    pub fn importe_efectivo(&self) -> Decimal {
        self.imp_prop_c_iva.unwrap_or(self.importe_c_iva)
    }

    pub fn precio_unitario(&self) -> Decimal {
        if self.cantidad > Decimal::ZERO {
            self.importe_efectivo() / self.cantidad
        } else {
            Decimal::ZERO
        }
    }

    pub fn costo_total(&self) -> Option<Decimal> {
        self.costo.map(|c| c * self.cantidad)
    }
}

/// Página de filas más el total exacto de coincidencias.
#[derive(Debug, Clone, Default)]
pub struct PaginaVentas {
    pub filas: Vec<VentaRow>,
    pub total: i64,
}

// --- PAGINACIÓN ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paginacion {
    /// Índice de página, base cero
    pub pagina: i64,
    /// Total de filas que coinciden con los filtros (del último fetch)
    pub total_filas: i64,
}

impl Paginacion {
    pub fn total_paginas(&self) -> i64 {
        ((self.total_filas + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
    }

    /// Recorta un índice pedido al rango válido [0, total_paginas - 1].
    pub fn acotar(&self, pedida: i64) -> i64 {
        pedida.clamp(0, self.total_paginas() - 1)
    }

    /// Offset de la primera fila de la página actual.
    pub fn desde(&self) -> i64 {
        self.pagina * PAGE_SIZE
    }

    /// Índice de la última fila de la página actual, inclusive.
    pub fn hasta(&self) -> i64 {
        ((self.pagina + 1) * PAGE_SIZE).min(self.total_filas) - 1
    }

    pub fn es_ultima(&self) -> bool {
        self.pagina >= self.total_paginas() - 1
    }
}

/// Proyección de la paginación para la respuesta del panel.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginacionView {
    pub pagina: i64,
    pub total_filas: i64,
    pub total_paginas: i64,
    pub tamanio_pagina: i64,
    /// Primera fila mostrada, base uno ("Mostrando 1001 – 1200 de ...")
    pub fila_desde: i64,
    /// Última fila mostrada, base uno
    pub fila_hasta: i64,
    pub es_ultima: bool,
}

impl From<&Paginacion> for PaginacionView {
    fn from(p: &Paginacion) -> Self {
        Self {
            pagina: p.pagina,
            total_filas: p.total_filas,
            total_paginas: p.total_paginas(),
            tamanio_pagina: PAGE_SIZE,
            fila_desde: p.desde() + 1,
            fila_hasta: (p.hasta() + 1).max(0),
            es_ultima: p.es_ultima(),
        }
    }
}

#[cfg(test)]
impl VentaRow {
    /// Fila representativa para armar escenarios en los tests del crate.
    pub(crate) fn de_prueba() -> Self {
        use chrono::NaiveDate;

        Self {
            nro_sucursal: "1".into(),
            t_comp: "FB".into(),
            n_comp: "0001-00001234".into(),
            fecha: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            cod_articu: "A001".into(),
            descripcio: "ZAPATILLA RUNNING".into(),
            desc_adic: None,
            cod_client: "C045".into(),
            razon_social: "PEREZ JUAN".into(),
            cod_cond_venta: "1".into(),
            desc_cond_venta: "CUENTA CORRIENTE".into(),
            cod_cta: "11".into(),
            desc_cuenta: "CAJA EFECTIVO".into(),
            cantidad: Decimal::from(2),
            importe_c_iva: Decimal::from(20000),
            imp_prop_c_iva: Some(Decimal::from(18000)),
            precio_neto: Some(Decimal::from(8264)),
            pr_ult_cpa_c_iva: Some(Decimal::from(6000)),
            costo: Some(Decimal::from(5500)),
            margen_contribucion: Decimal::from(7000),
            monto_comprobante: Decimal::from(20000),
            porcentaje_rentabilidad: Decimal::from(35),
            rubro: "CALZADO".into(),
            cant_cuotas: None,
            modalida_venta: "Contado/Tarjeta".into(),
            familia: None,
            categoria: None,
            tipo: None,
            genero: None,
            proveedor: None,
        }
    }
}
