// src/db/filtros_sql.rs

use chrono::{NaiveDateTime, NaiveTime};

use crate::models::filtros::{RangoFechas, VentasFilters};

/// Parámetro tipado para una consulta armada dinámicamente. El repositorio
/// los bindea en el mismo orden en que fueron numerados.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Texto(String),
    ListaTexto(Vec<String>),
    ListaEntera(Vec<i32>),
    FechaHora(NaiveDateTime),
}

/// Cláusula WHERE lista para concatenar (vacía o " WHERE ...") junto con
/// sus parámetros posicionales.
#[derive(Debug, Clone)]
pub struct FiltrosSql {
    pub clausula: String,
    pub params: Vec<SqlParam>,
}

struct Args {
    params: Vec<SqlParam>,
}

impl Args {
    fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Registra el parámetro y devuelve su marcador posicional ($1, $2, ...)
    fn marcar(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }
}

fn inicio_del_dia(fecha: chrono::NaiveDate) -> NaiveDateTime {
    fecha.and_time(NaiveTime::MIN)
}

fn fin_del_dia(fecha: chrono::NaiveDate) -> NaiveDateTime {
    fecha.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap())
}

/// Traducción determinística del estado de filtros a predicados sobre la
/// vista consolidada. Orden de aplicación: rango de fechas, dimensiones
/// multiselección (AND entre dimensiones, OR entre los valores de cada una),
/// medio de pago sobre las dos columnas de descripción, comprobante y
/// búsqueda libre.
///
/// Filtros totalmente vacíos producen una cláusula vacía: "sin restricción",
/// jamás "no coincide con nada".
pub fn construir_where(filtros: &VentasFilters) -> FiltrosSql {
    let mut args = Args::new();
    let mut conds: Vec<String> = Vec::new();

    // 1. Rango de fechas, inclusive en ambos extremos
    if let Some(desde) = filtros.fecha_desde {
        let m = args.marcar(SqlParam::FechaHora(inicio_del_dia(desde)));
        conds.push(format!("fecha >= {m}"));
    }
    if let Some(hasta) = filtros.fecha_hasta {
        let m = args.marcar(SqlParam::FechaHora(fin_del_dia(hasta)));
        conds.push(format!("fecha <= {m}"));
    }

    // 2. Dimensiones multiselección: col = ANY(lista) solo si hay selección
    let dimensiones: [(&str, &Vec<String>); 9] = [
        ("nro_sucursal", &filtros.sucursales),
        ("rubro", &filtros.rubros),
        ("modalida_venta", &filtros.modalidades),
        ("razon_social", &filtros.clientes),
        ("familia", &filtros.familias),
        ("categoria", &filtros.categorias),
        ("tipo", &filtros.tipos),
        ("genero", &filtros.generos),
        ("proveedor", &filtros.proveedores),
    ];
    for (columna, valores) in dimensiones {
        if !valores.is_empty() {
            let m = args.marcar(SqlParam::ListaTexto(valores.clone()));
            conds.push(format!("{columna} = ANY({m})"));
        }
    }
    if !filtros.cuotas.is_empty() {
        let m = args.marcar(SqlParam::ListaEntera(filtros.cuotas.clone()));
        conds.push(format!("cant_cuotas = ANY({m})"));
    }

    // 3. Medio de pago: el valor elegido puede vivir en cualquiera de las
    // dos columnas de descripción, por eso el OR. Nunca se fusionan como
    // una sola unión libre.
    if !filtros.cuentas.is_empty() {
        let m1 = args.marcar(SqlParam::ListaTexto(filtros.cuentas.clone()));
        let m2 = args.marcar(SqlParam::ListaTexto(filtros.cuentas.clone()));
        conds.push(format!(
            "(desc_cuenta = ANY({m1}) OR desc_cond_venta = ANY({m2}))"
        ));
    }

    // 4. Número de comprobante, coincidencia parcial
    let comprobante = filtros.comprobante.trim();
    if !comprobante.is_empty() {
        let m = args.marcar(SqlParam::Texto(format!("%{comprobante}%")));
        conds.push(format!("n_comp ILIKE {m}"));
    }

    // 5. Búsqueda libre: OR entre descripción y código de artículo
    let busqueda = filtros.busqueda.trim();
    if !busqueda.is_empty() {
        let patron = format!("%{busqueda}%");
        let m1 = args.marcar(SqlParam::Texto(patron.clone()));
        let m2 = args.marcar(SqlParam::Texto(patron));
        conds.push(format!("(descripcio ILIKE {m1} OR cod_articu ILIKE {m2})"));
    }

    FiltrosSql {
        clausula: if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        },
        params: args.params,
    }
}

/// Variante reducida para los escaneos de respaldo de las listas de
/// opciones: ahí solo aplica el rango de fechas.
pub fn construir_where_rango(rango: RangoFechas) -> FiltrosSql {
    let mut args = Args::new();
    let mut conds: Vec<String> = Vec::new();

    if let Some(desde) = rango.desde {
        let m = args.marcar(SqlParam::FechaHora(inicio_del_dia(desde)));
        conds.push(format!("fecha >= {m}"));
    }
    if let Some(hasta) = rango.hasta {
        let m = args.marcar(SqlParam::FechaHora(fin_del_dia(hasta)));
        conds.push(format!("fecha <= {m}"));
    }

    FiltrosSql {
        clausula: if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        },
        params: args.params,
    }
}
