// src/models/filtros.rs

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// --- ESTADO DE FILTROS ---

/// Selección completa de filtros del tablero. Se reemplaza entera en cada
/// edición del usuario; nunca se muta parcialmente.
///
/// Invariante: colección vacía o string en blanco = "sin restricción en esa
/// dimensión", nunca "no coincide con nada".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[validate(schema(function = validar_rango_fechas))]
pub struct VentasFilters {
    /// Límite inferior del rango, inclusive (Ej: "2024-03-01")
    pub fecha_desde: Option<NaiveDate>,
    /// Límite superior del rango, inclusive
    pub fecha_hasta: Option<NaiveDate>,

    // Dimensiones multiselección (nro_sucursal, rubro, etc.)
    pub sucursales: Vec<String>,
    pub rubros: Vec<String>,
    pub modalidades: Vec<String>,
    /// Medios de pago seleccionados; se buscan en desc_cuenta Y desc_cond_venta
    pub cuentas: Vec<String>,
    pub clientes: Vec<String>,
    pub familias: Vec<String>,
    pub categorias: Vec<String>,
    pub tipos: Vec<String>,
    pub generos: Vec<String>,
    pub proveedores: Vec<String>,
    /// Cantidades de cuotas seleccionadas
    pub cuotas: Vec<i32>,

    /// Búsqueda libre unificada sobre descripcio y cod_articu
    #[validate(length(max = 120, message = "La búsqueda admite hasta 120 caracteres"))]
    pub busqueda: String,
    /// Búsqueda por número de comprobante (n_comp)
    #[validate(length(max = 40, message = "El comprobante admite hasta 40 caracteres"))]
    pub comprobante: String,
}

/// Rango de fechas aislado; es lo único que alcanza a las listas de opciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RangoFechas {
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

fn validar_rango_fechas(filtros: &VentasFilters) -> Result<(), ValidationError> {
    if let (Some(desde), Some(hasta)) = (filtros.fecha_desde, filtros.fecha_hasta) {
        if desde > hasta {
            let mut error = ValidationError::new("rango_invertido");
            error.message = Some("fechaDesde no puede ser posterior a fechaHasta".into());
            return Err(error);
        }
    }
    Ok(())
}

impl VentasFilters {
    /// Filtros iniciales del panel: del primero del mes en curso hasta hoy.
    pub fn del_mes_en_curso() -> Self {
        let hoy = Local::now().date_naive();
        let primero = hoy.with_day(1).unwrap_or(hoy);
        Self {
            fecha_desde: Some(primero),
            fecha_hasta: Some(hoy),
            ..Self::default()
        }
    }

    pub fn rango_fechas(&self) -> RangoFechas {
        RangoFechas {
            desde: self.fecha_desde,
            hasta: self.fecha_hasta,
        }
    }

    /// Mismos filtros corridos exactamente un mes calendario hacia atrás
    /// (31/03 → 29/02 en año bisiesto). Si falta alguno de los dos límites
    /// no hay período anterior definido.
    pub fn periodo_anterior(&self) -> Option<Self> {
        let desde = self.fecha_desde?;
        let hasta = self.fecha_hasta?;
        Some(Self {
            fecha_desde: desde.checked_sub_months(Months::new(1)),
            fecha_hasta: hasta.checked_sub_months(Months::new(1)),
            ..self.clone()
        })
    }
}
