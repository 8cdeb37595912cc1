// src/db/ventas_repo.rs

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool};

use crate::{
    common::error::AppError,
    db::filtros_sql::{construir_where, construir_where_rango, SqlParam},
    db::gateway::VentasGateway,
    models::{
        dashboard::DashboardMetrics,
        filtros::{RangoFechas, VentasFilters},
        opciones::{Dimension, COLUMNA_CUOTAS, RPC_CUOTAS},
        ventas::{PaginaVentas, VentaRow, COND_CONTADO, PAGE_SIZE},
    },
};

/// Vista consolidada del lado del servidor. El DISTINCT ON (solo el pago de
/// mayor importe por comprobante) ya viene resuelto allí.
pub const VISTA: &str = "v_ventas_consolidadas";

/// Función remota que agrega los KPIs y las series del tablero.
pub const RPC_METRICAS: &str = "get_dashboard_metrics";

/// Tope de filas de los escaneos de respaldo de las listas de opciones.
const LIMITE_ESCANEO: i64 = 5000;

#[derive(Clone)]
pub struct VentasRepository {
    pool: PgPool,
}

/// Convierte los parámetros tipados del armador de filtros en argumentos
/// posicionales de Postgres, en el mismo orden en que fueron numerados.
fn argumentos(params: &[SqlParam]) -> Result<PgArguments, AppError> {
    let mut args = PgArguments::default();
    let resultado: Result<(), sqlx::error::BoxDynError> = (|| {
        for param in params {
            match param {
                SqlParam::Texto(s) => args.add(s)?,
                SqlParam::ListaTexto(v) => args.add(v)?,
                SqlParam::ListaEntera(v) => args.add(v)?,
                SqlParam::FechaHora(t) => args.add(t)?,
            }
        }
        Ok(())
    })();
    resultado.map_err(|e| {
        AppError::InternalServerError(anyhow::anyhow!("parámetro no bindeable: {e}"))
    })?;
    Ok(args)
}

fn lista_o_nula(valores: &[String]) -> Option<&[String]> {
    if valores.is_empty() {
        None
    } else {
        Some(valores)
    }
}

fn texto_o_nulo(valor: &str) -> Option<&str> {
    let recortado = valor.trim();
    if recortado.is_empty() {
        None
    } else {
        Some(recortado)
    }
}

impl VentasRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unificación de medios de pago para el escaneo de respaldo:
    ///   cod_cond_venta == "1"  →  desc_cuenta (caja/banco)
    ///   cualquier otro código  →  desc_cond_venta
    async fn escaneo_medios_pago(&self, rango: RangoFechas) -> Result<Vec<String>, AppError> {
        let fsql = construir_where_rango(rango);
        let sql = format!(
            "SELECT cod_cond_venta, desc_cuenta, desc_cond_venta FROM {VISTA}{} LIMIT {LIMITE_ESCANEO}",
            fsql.clausula
        );

        let filas: Vec<(String, Option<String>, Option<String>)> =
            sqlx::query_as_with(&sql, argumentos(&fsql.params)?)
                .fetch_all(&self.pool)
                .await?;

        let mut medios = BTreeSet::new();
        for (cond, cuenta, cond_venta) in filas {
            let medio = if cond == COND_CONTADO { cuenta } else { cond_venta };
            if let Some(m) = medio {
                if !m.is_empty() {
                    medios.insert(m);
                }
            }
        }
        Ok(medios.into_iter().collect())
    }
}

#[async_trait]
impl VentasGateway for VentasRepository {
    async fn pagina_ventas(
        &self,
        filtros: &VentasFilters,
        pagina: i64,
    ) -> Result<PaginaVentas, AppError> {
        let fsql = construir_where(filtros);
        let offset = pagina.max(0) * PAGE_SIZE;

        let sql_filas = format!(
            "SELECT * FROM {VISTA}{} ORDER BY fecha DESC LIMIT {PAGE_SIZE} OFFSET {offset}",
            fsql.clausula
        );
        let sql_total = format!("SELECT COUNT(*) FROM {VISTA}{}", fsql.clausula);

        // El total exacto viaja junto con la página: mismas condiciones,
        // dos consultas en paralelo.
        let (filas, total) = tokio::try_join!(
            sqlx::query_as_with::<_, VentaRow, _>(&sql_filas, argumentos(&fsql.params)?)
                .fetch_all(&self.pool),
            sqlx::query_scalar_with::<_, i64, _>(&sql_total, argumentos(&fsql.params)?)
                .fetch_one(&self.pool),
        )?;

        Ok(PaginaVentas { filas, total })
    }

    async fn metricas(&self, filtros: &VentasFilters) -> Result<DashboardMetrics, AppError> {
        // Los filtros mapean 1:1 a los argumentos nominados de la función;
        // dimensión sin selección = NULL, nunca lista vacía.
        let sql = format!(
            "SELECT {RPC_METRICAS}(\
             p_fecha_desde => $1, p_fecha_hasta => $2, p_sucursales => $3, \
             p_rubros => $4, p_modalidades => $5, p_cuentas => $6, \
             p_clientes => $7, p_cuotas => $8, p_familias => $9, \
             p_categorias => $10, p_tipos => $11, p_generos => $12, \
             p_proveedores => $13, p_busqueda => $14, p_comprobante => $15)"
        );

        let cuotas: Option<&[i32]> = if filtros.cuotas.is_empty() {
            None
        } else {
            Some(&filtros.cuotas)
        };

        let json: serde_json::Value = sqlx::query_scalar(&sql)
            .bind(filtros.fecha_desde)
            .bind(filtros.fecha_hasta)
            .bind(lista_o_nula(&filtros.sucursales))
            .bind(lista_o_nula(&filtros.rubros))
            .bind(lista_o_nula(&filtros.modalidades))
            .bind(lista_o_nula(&filtros.cuentas))
            .bind(lista_o_nula(&filtros.clientes))
            .bind(cuotas)
            .bind(lista_o_nula(&filtros.familias))
            .bind(lista_o_nula(&filtros.categorias))
            .bind(lista_o_nula(&filtros.tipos))
            .bind(lista_o_nula(&filtros.generos))
            .bind(lista_o_nula(&filtros.proveedores))
            .bind(texto_o_nulo(&filtros.busqueda))
            .bind(texto_o_nulo(&filtros.comprobante))
            .fetch_one(&self.pool)
            .await?;

        Ok(serde_json::from_value(json)?)
    }

    async fn rpc_valores_distintos(
        &self,
        dimension: Dimension,
        rango: RangoFechas,
    ) -> Result<Vec<String>, AppError> {
        let def = dimension.def();
        let sql = format!(
            "SELECT {} FROM {}(p_fecha_desde => $1, p_fecha_hasta => $2)",
            def.columna_resultado, def.funcion_rpc
        );

        let valores: Vec<Option<String>> = sqlx::query_scalar(&sql)
            .bind(rango.desde)
            .bind(rango.hasta)
            .fetch_all(&self.pool)
            .await?;

        Ok(valores
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
            .collect())
    }

    async fn escaneo_valores_distintos(
        &self,
        dimension: Dimension,
        rango: RangoFechas,
    ) -> Result<Vec<String>, AppError> {
        if dimension == Dimension::MedioPago {
            return self.escaneo_medios_pago(rango).await;
        }

        let def = dimension.def();
        let fsql = construir_where_rango(rango);
        let sql = format!(
            "SELECT {} FROM {VISTA}{} LIMIT {LIMITE_ESCANEO}",
            def.columna_fallback, fsql.clausula
        );

        let valores: Vec<Option<String>> =
            sqlx::query_scalar_with(&sql, argumentos(&fsql.params)?)
                .fetch_all(&self.pool)
                .await?;

        // Deduplicación del lado del cliente, orden alfabético
        let distintos: BTreeSet<String> = valores
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
            .collect();
        Ok(distintos.into_iter().collect())
    }

    async fn rpc_cuotas_distintas(&self, rango: RangoFechas) -> Result<Vec<i32>, AppError> {
        let sql = format!(
            "SELECT {COLUMNA_CUOTAS} FROM {RPC_CUOTAS}(p_fecha_desde => $1, p_fecha_hasta => $2)"
        );

        let valores: Vec<Option<i32>> = sqlx::query_scalar(&sql)
            .bind(rango.desde)
            .bind(rango.hasta)
            .fetch_all(&self.pool)
            .await?;

        Ok(valores.into_iter().flatten().collect())
    }

    async fn escaneo_cuotas_distintas(&self, rango: RangoFechas) -> Result<Vec<i32>, AppError> {
        let fsql = construir_where_rango(rango);
        let sql = format!(
            "SELECT {COLUMNA_CUOTAS} FROM {VISTA}{} LIMIT {LIMITE_ESCANEO}",
            fsql.clausula
        );

        let valores: Vec<Option<i32>> =
            sqlx::query_scalar_with(&sql, argumentos(&fsql.params)?)
                .fetch_all(&self.pool)
                .await?;

        let distintas: BTreeSet<i32> = valores.into_iter().flatten().collect();
        Ok(distintas.into_iter().collect())
    }
}
