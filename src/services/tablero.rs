// src/services/tablero.rs
//
// Transformaciones puras de la respuesta agregada a estructuras listas para
// graficar. Acá no hay I/O: cada función depende solo de sus argumentos.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::dashboard::{DashboardMetrics, RubroPoint, StackedPoint, TopArticle};

// --- CATEGORÍAS DE NEGOCIO ---

/// Las 4 categorías de negocio en orden fijo de apilado (base → tope),
/// con sus colores fijos.
pub struct CategoriaNegocio {
    pub clave: &'static str,
    pub etiqueta: &'static str,
    pub color: &'static str,
}

pub const CATEGORIAS: [CategoriaNegocio; 4] = [
    CategoriaNegocio {
        clave: "CONTADO EFECTIVO",
        etiqueta: "Contado Efectivo",
        color: "#10b981", // esmeralda
    },
    CategoriaNegocio {
        clave: "TARJETA",
        etiqueta: "Tarjeta",
        color: "#3b82f6", // azul
    },
    CategoriaNegocio {
        clave: "CRÉDITO FINANCIERA",
        etiqueta: "Crédito Financiera",
        color: "#f59e0b", // ámbar
    },
    CategoriaNegocio {
        clave: "CUENTA CORRIENTE",
        etiqueta: "Cuenta Corriente",
        color: "#8b5cf6", // violeta
    },
];

/// Color del segmento sintético "OTROS" del mix detallado.
pub const COLOR_OTROS: &str = "#64748b";
/// Color para medios cuya categoría no es ninguna de las 4 fijas.
pub const COLOR_SIN_CATEGORIA: &str = "#94a3b8";

/// Cantidad máxima de medios individuales antes de colapsar en "OTROS".
const MAX_MEDIOS_VISIBLES: usize = 11;

fn color_de_categoria(clave: &str) -> &'static str {
    CATEGORIAS
        .iter()
        .find(|c| c.clave == clave)
        .map(|c| c.color)
        .unwrap_or(COLOR_SIN_CATEGORIA)
}

/// Redondeo a porcentaje entero, mitades alejándose de cero (como el
/// front-end original).
fn porcentaje(monto: Decimal, total: Decimal) -> i32 {
    (monto * Decimal::ONE_HUNDRED / total)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}

// --- APILADO POR SUCURSAL ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesgloseMedio {
    pub medio: String,
    pub monto: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentoCategoria {
    pub clave: String,
    pub etiqueta: String,
    pub color: String,
    pub monto: Decimal,
    /// (medio, monto) que componen el segmento, para el tooltip
    pub desglose: Vec<DesgloseMedio>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LadoPeriodo {
    pub total: Decimal,
    pub segmentos: Vec<SegmentoCategoria>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PilaSucursal {
    pub sucursal: String,
    pub nombre: String,
    pub actual: LadoPeriodo,
    pub anterior: LadoPeriodo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiladoSucursales {
    /// Ordenadas por total del período actual, descendente
    pub sucursales: Vec<PilaSucursal>,
    /// Máximo compartido entre ambos períodos para escalar las barras.
    /// Piso 1 para no dividir por cero.
    pub max_total: Decimal,
}

fn lado_vacio() -> LadoPeriodo {
    LadoPeriodo {
        total: Decimal::ZERO,
        segmentos: CATEGORIAS
            .iter()
            .map(|c| SegmentoCategoria {
                clave: c.clave.to_string(),
                etiqueta: c.etiqueta.to_string(),
                color: c.color.to_string(),
                monto: Decimal::ZERO,
                desglose: Vec::new(),
            })
            .collect(),
    }
}

fn agrupar_por_sucursal(puntos: &[StackedPoint]) -> BTreeMap<String, LadoPeriodo> {
    let mut mapa: BTreeMap<String, LadoPeriodo> = BTreeMap::new();
    for punto in puntos {
        let lado = mapa
            .entry(punto.nro_sucursal.clone())
            .or_insert_with(lado_vacio);
        lado.total += punto.monto;
        // Montos de categorías desconocidas suman al total pero no arman segmento
        if let Some(segmento) = lado
            .segmentos
            .iter_mut()
            .find(|s| s.clave == punto.categoria_negocio)
        {
            segmento.monto += punto.monto;
            segmento.desglose.push(DesgloseMedio {
                medio: punto.medio_pago.clone(),
                monto: punto.monto,
            });
        }
    }
    mapa
}

/// Barras apiladas por sucursal para ambos períodos. Una sucursal presente
/// en un solo período igual aparece, con el otro lado en cero.
pub fn apilado_por_sucursal(
    actual: &[StackedPoint],
    anterior: &[StackedPoint],
) -> ApiladoSucursales {
    let mut mapa_actual = agrupar_por_sucursal(actual);
    let mut mapa_anterior = agrupar_por_sucursal(anterior);

    let claves: BTreeSet<String> = mapa_actual
        .keys()
        .chain(mapa_anterior.keys())
        .cloned()
        .collect();

    let mut sucursales: Vec<PilaSucursal> = claves
        .into_iter()
        .map(|sucursal| PilaSucursal {
            nombre: format!("Suc. {sucursal}"),
            actual: mapa_actual.remove(&sucursal).unwrap_or_else(lado_vacio),
            anterior: mapa_anterior.remove(&sucursal).unwrap_or_else(lado_vacio),
            sucursal,
        })
        .collect();

    sucursales.sort_by(|a, b| b.actual.total.cmp(&a.actual.total));

    let max_total = sucursales
        .iter()
        .map(|p| p.actual.total.max(p.anterior.total))
        .max()
        .unwrap_or(Decimal::ONE)
        .max(Decimal::ONE);

    ApiladoSucursales {
        sucursales,
        max_total,
    }
}

// --- MIX DE PAGOS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntradaMezcla {
    pub clave: String,
    pub etiqueta: String,
    pub color: String,
    pub monto: Decimal,
    pub pct: i32,
}

/// Mix agrupado: total por categoría fija a través de todas las sucursales.
/// Las categorías sin monto se descartan de la salida.
pub fn mezcla_agrupada(puntos: &[StackedPoint]) -> Vec<EntradaMezcla> {
    let mut totales: BTreeMap<&str, Decimal> = BTreeMap::new();
    for punto in puntos {
        *totales.entry(punto.categoria_negocio.as_str()).or_default() += punto.monto;
    }

    // El gran total incluye categorías fuera de las 4 fijas; piso 1
    let gran_total = totales
        .values()
        .copied()
        .sum::<Decimal>()
        .max(Decimal::ONE);

    CATEGORIAS
        .iter()
        .map(|c| {
            let monto = totales.get(c.clave).copied().unwrap_or(Decimal::ZERO);
            EntradaMezcla {
                clave: c.clave.to_string(),
                etiqueta: c.etiqueta.to_string(),
                color: c.color.to_string(),
                monto,
                pct: porcentaje(monto, gran_total),
            }
        })
        .filter(|e| e.monto > Decimal::ZERO)
        .collect()
}

/// Mix detallado: medios individuales, opcionalmente restringido a una
/// categoría. Más de 11 medios colapsa la cola en un "OTROS" final.
pub fn mezcla_detallada(
    puntos: &[StackedPoint],
    categoria_seleccionada: Option<&str>,
) -> Vec<EntradaMezcla> {
    // (monto acumulado, categoría de la primera aparición)
    let mut por_medio: BTreeMap<&str, (Decimal, &str)> = BTreeMap::new();
    for punto in puntos {
        if let Some(cat) = categoria_seleccionada {
            if punto.categoria_negocio != cat {
                continue;
            }
        }
        por_medio
            .entry(punto.medio_pago.as_str())
            .and_modify(|(monto, _)| *monto += punto.monto)
            .or_insert((punto.monto, punto.categoria_negocio.as_str()));
    }

    let mut medios: Vec<(String, Decimal, &str)> = por_medio
        .into_iter()
        .map(|(medio, (monto, cat))| (medio.to_string(), monto, cat))
        .collect();
    medios.sort_by(|a, b| b.1.cmp(&a.1));

    let gran_total = medios
        .iter()
        .map(|(_, monto, _)| *monto)
        .sum::<Decimal>()
        .max(Decimal::ONE);

    let entrada = |(medio, monto, cat): &(String, Decimal, &str)| EntradaMezcla {
        clave: medio.clone(),
        etiqueta: medio.clone(),
        color: color_de_categoria(cat).to_string(),
        monto: *monto,
        pct: porcentaje(*monto, gran_total),
    };

    if medios.len() <= MAX_MEDIOS_VISIBLES {
        return medios.iter().map(entrada).collect();
    }

    let monto_otros: Decimal = medios[MAX_MEDIOS_VISIBLES..]
        .iter()
        .map(|(_, monto, _)| *monto)
        .sum();

    let mut resultado: Vec<EntradaMezcla> = medios[..MAX_MEDIOS_VISIBLES]
        .iter()
        .map(entrada)
        .collect();
    resultado.push(EntradaMezcla {
        clave: "OTROS".to_string(),
        etiqueta: "OTROS".to_string(),
        color: COLOR_OTROS.to_string(),
        monto: monto_otros,
        pct: porcentaje(monto_otros, gran_total),
    });
    resultado
}

// --- DISPERSIÓN POR RUBRO ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PuntoDispersion {
    pub rubro: String,
    pub avg_margen: Decimal,
    pub total_cantidad: Decimal,
    /// Posición horizontal normalizada [0, 1]: cantidad / máximo observado
    pub x: f64,
    /// Posición vertical normalizada [0, 1] contra el rango observado de
    /// márgenes. El piso es el mínimo observado, no cero: hay rubros con
    /// margen negativo.
    pub y: f64,
}

pub fn puntos_dispersion(puntos: &[RubroPoint]) -> Vec<PuntoDispersion> {
    if puntos.is_empty() {
        return Vec::new();
    }

    let max_cantidad = puntos
        .iter()
        .map(|p| p.total_cantidad)
        .max()
        .unwrap_or(Decimal::ONE)
        .max(Decimal::ONE);
    let min_margen = puntos
        .iter()
        .map(|p| p.avg_margen)
        .min()
        .unwrap_or(Decimal::ZERO);
    let max_margen = puntos
        .iter()
        .map(|p| p.avg_margen)
        .max()
        .unwrap_or(Decimal::ZERO);
    // Rango con piso 1 para no dividir por cero
    let rango_margen = (max_margen - min_margen).max(Decimal::ONE);

    puntos
        .iter()
        .map(|p| PuntoDispersion {
            rubro: p.rubro.clone(),
            avg_margen: p.avg_margen,
            total_cantidad: p.total_cantidad,
            x: (p.total_cantidad / max_cantidad).to_f64().unwrap_or(0.0),
            y: ((p.avg_margen - min_margen) / rango_margen)
                .to_f64()
                .unwrap_or(0.0),
        })
        .collect()
}

// --- KPIs ---

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpisTablero {
    pub total_facturado: Decimal,
    pub margen_total: Decimal,
    pub rentabilidad: Decimal,
    pub voucher_count: i64,
    /// Facturado / comprobantes; cero cuando no hay comprobantes
    pub ticket_promedio: Decimal,
}

pub fn kpis_con_ticket(metricas: &DashboardMetrics) -> KpisTablero {
    let kpis = &metricas.kpis;
    let ticket_promedio = if kpis.voucher_count > 0 {
        kpis.total_facturado / Decimal::from(kpis.voucher_count)
    } else {
        Decimal::ZERO
    };
    KpisTablero {
        total_facturado: kpis.total_facturado,
        margen_total: kpis.margen_total,
        rentabilidad: kpis.rentabilidad,
        voucher_count: kpis.voucher_count,
        ticket_promedio,
    }
}

// --- VISTA COMPLETA ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VistaTablero {
    pub kpis: KpisTablero,
    pub apilado: ApiladoSucursales,
    pub mezcla_agrupada: Vec<EntradaMezcla>,
    pub mezcla_detallada: Vec<EntradaMezcla>,
    pub top_articulos: Vec<TopArticle>,
    pub dispersion_rubros: Vec<PuntoDispersion>,
}

/// Arma todos los modelos de vista del tablero a partir de las métricas de
/// ambos períodos. `categoria` restringe únicamente el mix detallado.
pub fn armar_tablero(
    actual: &DashboardMetrics,
    anterior: &DashboardMetrics,
    categoria: Option<&str>,
) -> VistaTablero {
    VistaTablero {
        kpis: kpis_con_ticket(actual),
        apilado: apilado_por_sucursal(&actual.stacked_data, &anterior.stacked_data),
        mezcla_agrupada: mezcla_agrupada(&actual.stacked_data),
        mezcla_detallada: mezcla_detallada(&actual.stacked_data, categoria),
        top_articulos: actual.top_articles.clone(),
        dispersion_rubros: puntos_dispersion(&actual.rubro_points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::DashboardKpis;

    fn punto(sucursal: &str, categoria: &str, medio: &str, monto: i64) -> StackedPoint {
        StackedPoint {
            nro_sucursal: sucursal.to_string(),
            categoria_negocio: categoria.to_string(),
            medio_pago: medio.to_string(),
            monto: Decimal::from(monto),
        }
    }

    // --- apilado ---

    #[test]
    fn apilado_agrupa_y_ordena_por_total_actual() {
        let actual = vec![
            punto("1", "TARJETA", "VISA", 100),
            punto("1", "TARJETA", "MASTERCARD", 50),
            punto("2", "CONTADO EFECTIVO", "CAJA", 500),
        ];
        let resultado = apilado_por_sucursal(&actual, &[]);

        assert_eq!(resultado.sucursales.len(), 2);
        // La sucursal 2 factura más: va primera
        assert_eq!(resultado.sucursales[0].sucursal, "2");
        assert_eq!(resultado.sucursales[0].nombre, "Suc. 2");
        assert_eq!(resultado.sucursales[1].actual.total, Decimal::from(150));

        let tarjeta = &resultado.sucursales[1].actual.segmentos[1];
        assert_eq!(tarjeta.clave, "TARJETA");
        assert_eq!(tarjeta.monto, Decimal::from(150));
        assert_eq!(tarjeta.desglose.len(), 2);
    }

    #[test]
    fn apilado_conserva_el_orden_fijo_de_segmentos() {
        let actual = vec![punto("1", "CUENTA CORRIENTE", "CTA CTE 30 DIAS", 80)];
        let resultado = apilado_por_sucursal(&actual, &[]);

        let claves: Vec<&str> = resultado.sucursales[0]
            .actual
            .segmentos
            .iter()
            .map(|s| s.clave.as_str())
            .collect();
        assert_eq!(
            claves,
            vec![
                "CONTADO EFECTIVO",
                "TARJETA",
                "CRÉDITO FINANCIERA",
                "CUENTA CORRIENTE"
            ]
        );
    }

    #[test]
    fn sucursal_presente_en_un_solo_periodo_aparece_en_cero() {
        let actual = vec![punto("1", "TARJETA", "VISA", 100)];
        let anterior = vec![punto("9", "TARJETA", "VISA", 300)];
        let resultado = apilado_por_sucursal(&actual, &anterior);

        assert_eq!(resultado.sucursales.len(), 2);
        let suc_9 = resultado
            .sucursales
            .iter()
            .find(|s| s.sucursal == "9")
            .unwrap();
        assert_eq!(suc_9.actual.total, Decimal::ZERO);
        assert!(suc_9.actual.segmentos.iter().all(|s| s.desglose.is_empty()));
        assert_eq!(suc_9.anterior.total, Decimal::from(300));

        // El máximo compartido mira los dos períodos
        assert_eq!(resultado.max_total, Decimal::from(300));
    }

    #[test]
    fn apilado_vacio_tiene_piso_uno() {
        let resultado = apilado_por_sucursal(&[], &[]);
        assert!(resultado.sucursales.is_empty());
        assert_eq!(resultado.max_total, Decimal::ONE);
    }

    // --- mix agrupado ---

    #[test]
    fn mezcla_agrupada_suma_cien_y_descarta_ceros() {
        let puntos = vec![
            punto("1", "TARJETA", "VISA", 300),
            punto("2", "TARJETA", "MASTERCARD", 200),
            punto("1", "CONTADO EFECTIVO", "CAJA", 400),
            punto("1", "CUENTA CORRIENTE", "CTA CTE", 100),
        ];
        let mezcla = mezcla_agrupada(&puntos);

        // CRÉDITO FINANCIERA quedó en cero: no aparece
        assert_eq!(mezcla.len(), 3);
        assert!(mezcla.iter().all(|e| e.monto > Decimal::ZERO));

        let suma: i32 = mezcla.iter().map(|e| e.pct).sum();
        // Redondeos independientes: tolerancia de ± cantidad de categorías
        assert!((100 - suma).abs() <= mezcla.len() as i32);
    }

    #[test]
    fn mezcla_agrupada_sin_datos_es_vacia() {
        assert!(mezcla_agrupada(&[]).is_empty());
    }

    // --- mix detallado ---

    fn muchos_medios(cantidad: usize) -> Vec<StackedPoint> {
        (0..cantidad)
            .map(|i| {
                punto(
                    "1",
                    "TARJETA",
                    &format!("MEDIO {i:02}"),
                    (cantidad - i) as i64 * 10,
                )
            })
            .collect()
    }

    #[test]
    fn mezcla_detallada_sin_exceso_no_genera_otros() {
        let mezcla = mezcla_detallada(&muchos_medios(11), None);
        assert_eq!(mezcla.len(), 11);
        assert!(mezcla.iter().all(|e| e.clave != "OTROS"));
    }

    #[test]
    fn mezcla_detallada_colapsa_la_cola_en_otros() {
        let mezcla = mezcla_detallada(&muchos_medios(14), None);

        assert_eq!(mezcla.len(), 12);
        let otros = mezcla.last().unwrap();
        assert_eq!(otros.clave, "OTROS");
        // Exactamente un OTROS
        assert_eq!(mezcla.iter().filter(|e| e.clave == "OTROS").count(), 1);
        // Su monto es la suma de los medios más allá del puesto 11:
        // con montos 140,130,...,10 la cola son 30+20+10
        assert_eq!(otros.monto, Decimal::from(60));
        // Y el resto viene ordenado descendente
        assert_eq!(mezcla[0].monto, Decimal::from(140));
        assert!(mezcla[0].monto > mezcla[10].monto);
    }

    #[test]
    fn mezcla_detallada_respeta_la_categoria_seleccionada() {
        let puntos = vec![
            punto("1", "TARJETA", "VISA", 300),
            punto("1", "CONTADO EFECTIVO", "CAJA", 700),
        ];
        let mezcla = mezcla_detallada(&puntos, Some("TARJETA"));

        assert_eq!(mezcla.len(), 1);
        assert_eq!(mezcla[0].clave, "VISA");
        // El porcentaje se calcula contra el total restringido
        assert_eq!(mezcla[0].pct, 100);
    }

    #[test]
    fn mezcla_detallada_acumula_el_mismo_medio() {
        let puntos = vec![
            punto("1", "TARJETA", "VISA", 300),
            punto("2", "TARJETA", "VISA", 200),
        ];
        let mezcla = mezcla_detallada(&puntos, None);
        assert_eq!(mezcla.len(), 1);
        assert_eq!(mezcla[0].monto, Decimal::from(500));
    }

    // --- dispersión ---

    fn rubro(nombre: &str, margen: i64, cantidad: i64) -> RubroPoint {
        RubroPoint {
            rubro: nombre.to_string(),
            avg_margen: Decimal::from(margen),
            total_cantidad: Decimal::from(cantidad),
        }
    }

    #[test]
    fn dispersion_normaliza_contra_el_rango_observado() {
        let puntos = vec![
            rubro("CALZADO", 40, 100),
            rubro("MARROQUINERIA", -10, 50),
            rubro("INDUMENTARIA", 15, 200),
        ];
        let dispersos = puntos_dispersion(&puntos);

        // El margen mínimo observado (-10) queda en el piso del gráfico
        let minimo = dispersos.iter().find(|p| p.rubro == "MARROQUINERIA").unwrap();
        assert_eq!(minimo.y, 0.0);

        // El máximo observado queda en el techo
        let maximo = dispersos.iter().find(|p| p.rubro == "CALZADO").unwrap();
        assert!((maximo.y - 1.0).abs() < 1e-9);

        // La cantidad máxima llega al extremo derecho
        let mas_vendido = dispersos.iter().find(|p| p.rubro == "INDUMENTARIA").unwrap();
        assert!((mas_vendido.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dispersion_con_margenes_iguales_no_divide_por_cero() {
        let puntos = vec![rubro("A", 20, 10), rubro("B", 20, 30)];
        let dispersos = puntos_dispersion(&puntos);
        // Rango nulo → piso 1: ambos quedan en el piso
        assert!(dispersos.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn dispersion_vacia() {
        assert!(puntos_dispersion(&[]).is_empty());
    }

    // --- kpis ---

    #[test]
    fn ticket_promedio_divide_por_comprobantes() {
        let metricas = DashboardMetrics {
            kpis: DashboardKpis {
                total_facturado: Decimal::from(90000),
                voucher_count: 45,
                ..DashboardKpis::default()
            },
            ..DashboardMetrics::default()
        };
        let kpis = kpis_con_ticket(&metricas);
        assert_eq!(kpis.ticket_promedio, Decimal::from(2000));

        let sin_ventas = kpis_con_ticket(&DashboardMetrics::vacio());
        assert_eq!(sin_ventas.ticket_promedio, Decimal::ZERO);
    }
}
