// src/services/panel.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{
        dashboard::MetricasComparadas,
        filtros::VentasFilters,
        opciones::OpcionesFiltros,
        ventas::{Paginacion, PaginacionView, VentaRow},
    },
    services::tablero::{armar_tablero, VistaTablero},
    services::VentasService,
};

// --- ESTADO ---

/// Estado completo de una sesión de panel. Se reemplaza por partes enteras
/// en cada commit; el lector siempre ve un snapshot coherente.
#[derive(Default)]
struct EstadoPanel {
    filtros: VentasFilters,
    paginacion: Paginacion,
    filas: Vec<VentaRow>,
    metricas: MetricasComparadas,
    opciones: OpcionesFiltros,
    /// Último error de la pasarela visible para el usuario
    error: Option<String>,
}

/// Proyección serializable del panel que consume el front-end.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VistaPanel {
    pub filtros: VentasFilters,
    pub tablero: VistaTablero,
    pub filas: Vec<VentaRow>,
    pub paginacion: PaginacionView,
    pub opciones: OpcionesFiltros,
    pub error: Option<String>,
}

// --- CONTROLADOR ---

/// Controlador de un panel: es el dueño del estado y de los tres disparos
/// de recarga, que no se cruzan entre sí:
///   (a) cambio de filtros  → métricas + página 0 de la grilla
///   (b) cambio de rango    → además, listas de opciones
///   (c) cambio de página   → solo esa página de la grilla
///
/// Toda recarga toma un número de generación al arrancar y lo verifica
/// antes de commitear: una respuesta que llega tarde, con el panel ya
/// movido a otros filtros, se descarta entera en lugar de pisar el estado
/// más nuevo.
pub struct PanelVentas {
    servicio: VentasService,
    estado: RwLock<EstadoPanel>,
    generacion: AtomicU64,
}

impl PanelVentas {
    pub fn nuevo(servicio: VentasService) -> Self {
        Self {
            servicio,
            estado: RwLock::new(EstadoPanel::default()),
            generacion: AtomicU64::new(0),
        }
    }

    fn generacion_nueva(&self) -> u64 {
        self.generacion.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn sigue_vigente(&self, generacion: u64) -> bool {
        self.generacion.load(Ordering::SeqCst) == generacion
    }

    /// Disparo (a) y, si cambió el rango de fechas, también (b).
    pub async fn aplicar_filtros(&self, nuevos: VentasFilters) {
        let rango_previo = {
            let estado = self.estado.read().await;
            estado.filtros.rango_fechas()
        };
        let cambio_rango = rango_previo != nuevos.rango_fechas();
        let generacion = self.generacion_nueva();

        // Las tres cargas salen juntas; se espera a todas antes del commit
        let (metricas, pagina, opciones) = tokio::join!(
            self.servicio.cargar_metricas(&nuevos),
            self.servicio.cargar_pagina(&nuevos, 0),
            async {
                if cambio_rango {
                    Some(self.servicio.cargar_opciones(nuevos.rango_fechas()).await)
                } else {
                    None
                }
            }
        );

        let mut estado = self.estado.write().await;
        if !self.sigue_vigente(generacion) {
            tracing::debug!("Se descarta una recarga de filtros obsoleta (gen {generacion})");
            return;
        }

        estado.filtros = nuevos;
        estado.paginacion.pagina = 0;
        estado.error = None;

        match pagina {
            Ok(p) => {
                estado.filas = p.filas;
                estado.paginacion.total_filas = p.total;
            }
            Err(e) => {
                tracing::error!("Error cargando la grilla: {e}");
                estado.error = Some(e.to_string());
            }
        }
        match metricas {
            Ok(m) => estado.metricas = m,
            Err(e) => {
                tracing::error!("Error cargando las métricas del tablero: {e}");
                estado.error = Some(e.to_string());
            }
        }
        if let Some(op) = opciones {
            estado.opciones = op;
        }
    }

    /// Disparo (c): recarga solo la página pedida; métricas y opciones
    /// quedan como están.
    pub async fn cambiar_pagina(&self, pedida: i64) {
        let (filtros, destino) = {
            let estado = self.estado.read().await;
            (estado.filtros.clone(), estado.paginacion.acotar(pedida))
        };
        let generacion = self.generacion_nueva();

        let resultado = self.servicio.cargar_pagina(&filtros, destino).await;

        let mut estado = self.estado.write().await;
        if !self.sigue_vigente(generacion) {
            tracing::debug!("Se descarta un cambio de página obsoleto (gen {generacion})");
            return;
        }

        match resultado {
            Ok(p) => {
                estado.filas = p.filas;
                estado.paginacion.pagina = destino;
                estado.paginacion.total_filas = p.total;
                estado.error = None;
            }
            Err(e) => {
                tracing::error!("Error cargando la página {destino}: {e}");
                estado.error = Some(e.to_string());
            }
        }
    }

    /// Snapshot del panel con los modelos de vista ya armados. `categoria`
    /// restringe únicamente el mix detallado de medios de pago.
    pub async fn vista(&self, categoria: Option<&str>) -> VistaPanel {
        let estado = self.estado.read().await;
        VistaPanel {
            filtros: estado.filtros.clone(),
            tablero: armar_tablero(&estado.metricas.actual, &estado.metricas.anterior, categoria),
            filas: estado.filas.clone(),
            paginacion: PaginacionView::from(&estado.paginacion),
            opciones: estado.opciones.clone(),
            error: estado.error.clone(),
        }
    }

    /// Filas de la página cargada, para la exportación CSV.
    pub async fn filas_cargadas(&self) -> Vec<VentaRow> {
        self.estado.read().await.filas.clone()
    }
}

// --- REGISTRO ---

/// Sesiones de panel vivas, una por cabecera x-panel-id. La primera visita
/// crea el panel con los filtros del mes en curso y dispara la carga
/// inicial completa.
pub struct RegistroPaneles {
    servicio: VentasService,
    paneles: RwLock<HashMap<Uuid, Arc<PanelVentas>>>,
}

impl RegistroPaneles {
    pub fn new(servicio: VentasService) -> Self {
        Self {
            servicio,
            paneles: RwLock::new(HashMap::new()),
        }
    }

    pub async fn obtener(&self, id: Uuid) -> Arc<PanelVentas> {
        if let Some(panel) = self.paneles.read().await.get(&id) {
            return panel.clone();
        }

        let candidato = Arc::new(PanelVentas::nuevo(self.servicio.clone()));
        let (panel, creado) = {
            let mut mapa = self.paneles.write().await;
            match mapa.get(&id) {
                // Otro request llegó primero: usamos el suyo
                Some(existente) => (existente.clone(), false),
                None => {
                    mapa.insert(id, candidato.clone());
                    (candidato, true)
                }
            }
        };

        if creado {
            tracing::info!("Panel nuevo {id}: carga inicial del mes en curso");
            panel.aplicar_filtros(VentasFilters::del_mes_en_curso()).await;
        }
        panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use crate::{
        common::error::AppError,
        db::VentasGateway,
        models::{
            dashboard::DashboardMetrics,
            filtros::RangoFechas,
            opciones::Dimension,
            ventas::PaginaVentas,
        },
    };

    /// Pasarela en memoria: devuelve una fila marcada con la búsqueda de
    /// los filtros y permite demorar las respuestas por término buscado.
    #[derive(Default)]
    struct GatewayFalso {
        /// (término, demora) — la página de un filtro cuya búsqueda coincide
        /// espera ese tiempo antes de resolver
        demoras: Vec<(String, Duration)>,
        llamadas_pagina: AtomicUsize,
        llamadas_metricas: AtomicUsize,
        llamadas_opciones: AtomicUsize,
        total_filas: i64,
    }

    impl GatewayFalso {
        fn con_total(total_filas: i64) -> Self {
            Self {
                total_filas,
                ..Self::default()
            }
        }

        async fn demorar(&self, termino: &str) {
            if let Some((_, d)) = self.demoras.iter().find(|(t, _)| t == termino) {
                tokio::time::sleep(*d).await;
            }
        }
    }

    #[async_trait]
    impl VentasGateway for GatewayFalso {
        async fn pagina_ventas(
            &self,
            filtros: &VentasFilters,
            pagina: i64,
        ) -> Result<PaginaVentas, AppError> {
            self.llamadas_pagina.fetch_add(1, Ordering::SeqCst);
            self.demorar(&filtros.busqueda).await;

            let fila = VentaRow {
                descripcio: format!("busqueda={} pagina={}", filtros.busqueda, pagina),
                ..VentaRow::de_prueba()
            };
            Ok(PaginaVentas {
                filas: vec![fila],
                total: self.total_filas,
            })
        }

        async fn metricas(&self, filtros: &VentasFilters) -> Result<DashboardMetrics, AppError> {
            self.llamadas_metricas.fetch_add(1, Ordering::SeqCst);
            self.demorar(&filtros.busqueda).await;
            Ok(DashboardMetrics::vacio())
        }

        async fn rpc_valores_distintos(
            &self,
            _dimension: Dimension,
            _rango: RangoFechas,
        ) -> Result<Vec<String>, AppError> {
            self.llamadas_opciones.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["valor".to_string()])
        }

        async fn escaneo_valores_distintos(
            &self,
            _dimension: Dimension,
            _rango: RangoFechas,
        ) -> Result<Vec<String>, AppError> {
            Ok(Vec::new())
        }

        async fn rpc_cuotas_distintas(&self, _rango: RangoFechas) -> Result<Vec<i32>, AppError> {
            Ok(vec![3])
        }

        async fn escaneo_cuotas_distintas(
            &self,
            _rango: RangoFechas,
        ) -> Result<Vec<i32>, AppError> {
            Ok(Vec::new())
        }
    }

    fn filtros_con_busqueda(busqueda: &str) -> VentasFilters {
        VentasFilters {
            fecha_desde: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            fecha_hasta: Some(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()),
            busqueda: busqueda.to_string(),
            ..VentasFilters::default()
        }
    }

    /// Devuelve el panel junto con el gateway para espiar los contadores.
    fn panel_con(gateway: GatewayFalso) -> (Arc<PanelVentas>, Arc<GatewayFalso>) {
        let gateway = Arc::new(gateway);
        let panel = Arc::new(PanelVentas::nuevo(VentasService::new(gateway.clone())));
        (panel, gateway)
    }

    #[tokio::test]
    async fn la_respuesta_obsoleta_no_pisa_el_estado_nuevo() {
        // El filtro A resuelve DESPUÉS de que B ya commiteó
        let (panel, _gateway) = panel_con(GatewayFalso {
            demoras: vec![("A".to_string(), Duration::from_millis(250))],
            total_filas: 10,
            ..GatewayFalso::default()
        });

        let tarea_a = {
            let panel = panel.clone();
            tokio::spawn(async move {
                panel.aplicar_filtros(filtros_con_busqueda("A")).await;
            })
        };
        // B entra apenas después y termina primero
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.aplicar_filtros(filtros_con_busqueda("B")).await;
        tarea_a.await.unwrap();

        let vista = panel.vista(None).await;
        assert_eq!(vista.filtros.busqueda, "B");
        assert_eq!(vista.filas[0].descripcio, "busqueda=B pagina=0");
    }

    #[tokio::test]
    async fn cambiar_pagina_no_recarga_metricas_ni_opciones() {
        let (panel, gateway) = panel_con(GatewayFalso::con_total(1200));

        panel.aplicar_filtros(filtros_con_busqueda("X")).await;

        let vista = panel.vista(None).await;
        assert_eq!(vista.paginacion.total_paginas, 3);
        let metricas_antes = gateway.llamadas_metricas.load(Ordering::SeqCst);
        let opciones_antes = gateway.llamadas_opciones.load(Ordering::SeqCst);

        let paginas_antes = gateway.llamadas_pagina.load(Ordering::SeqCst);

        panel.cambiar_pagina(2).await;

        let vista = panel.vista(None).await;
        assert_eq!(vista.paginacion.pagina, 2);
        assert!(vista.paginacion.es_ultima);
        assert_eq!(vista.filas[0].descripcio, "busqueda=X pagina=2");
        // Se pidió exactamente una página más
        assert_eq!(
            gateway.llamadas_pagina.load(Ordering::SeqCst),
            paginas_antes + 1
        );
        assert_eq!(
            gateway.llamadas_metricas.load(Ordering::SeqCst),
            metricas_antes
        );
        assert_eq!(
            gateway.llamadas_opciones.load(Ordering::SeqCst),
            opciones_antes
        );
    }

    #[tokio::test]
    async fn cambiar_pagina_recorta_al_rango_valido() {
        let (panel, _gateway) = panel_con(GatewayFalso::con_total(1200));

        panel.aplicar_filtros(filtros_con_busqueda("X")).await;
        panel.cambiar_pagina(99).await;

        let vista = panel.vista(None).await;
        // 1200 filas / 500 por página → la última es la 2
        assert_eq!(vista.paginacion.pagina, 2);
    }

    #[tokio::test]
    async fn las_opciones_solo_se_recargan_al_cambiar_el_rango() {
        let (panel, gateway) = panel_con(GatewayFalso::con_total(10));

        panel.aplicar_filtros(filtros_con_busqueda("uno")).await;
        let opciones_iniciales = gateway.llamadas_opciones.load(Ordering::SeqCst);
        assert!(opciones_iniciales > 0);

        // Mismo rango, otra búsqueda: no se tocan las opciones
        panel.aplicar_filtros(filtros_con_busqueda("dos")).await;
        assert_eq!(
            gateway.llamadas_opciones.load(Ordering::SeqCst),
            opciones_iniciales
        );

        // Rango distinto: sí
        let mut filtros = filtros_con_busqueda("tres");
        filtros.fecha_hasta = Some(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        panel.aplicar_filtros(filtros).await;
        assert!(gateway.llamadas_opciones.load(Ordering::SeqCst) > opciones_iniciales);
    }

    #[tokio::test]
    async fn la_falla_de_la_grilla_queda_visible_en_el_estado() {
        /// Gateway que siempre corta la consulta de páginas
        struct GatewayCaido;

        #[async_trait]
        impl VentasGateway for GatewayCaido {
            async fn pagina_ventas(
                &self,
                _filtros: &VentasFilters,
                _pagina: i64,
            ) -> Result<PaginaVentas, AppError> {
                Err(AppError::InternalServerError(anyhow::anyhow!(
                    "conexión rechazada"
                )))
            }
            async fn metricas(
                &self,
                _filtros: &VentasFilters,
            ) -> Result<DashboardMetrics, AppError> {
                Ok(DashboardMetrics::vacio())
            }
            async fn rpc_valores_distintos(
                &self,
                _d: Dimension,
                _r: RangoFechas,
            ) -> Result<Vec<String>, AppError> {
                Ok(Vec::new())
            }
            async fn escaneo_valores_distintos(
                &self,
                _d: Dimension,
                _r: RangoFechas,
            ) -> Result<Vec<String>, AppError> {
                Ok(Vec::new())
            }
            async fn rpc_cuotas_distintas(
                &self,
                _r: RangoFechas,
            ) -> Result<Vec<i32>, AppError> {
                Ok(Vec::new())
            }
            async fn escaneo_cuotas_distintas(
                &self,
                _r: RangoFechas,
            ) -> Result<Vec<i32>, AppError> {
                Ok(Vec::new())
            }
        }

        let panel = Arc::new(PanelVentas::nuevo(VentasService::new(Arc::new(
            GatewayCaido,
        ))));
        panel.aplicar_filtros(filtros_con_busqueda("X")).await;

        let vista = panel.vista(None).await;
        assert!(vista.error.is_some());
        assert!(vista.filas.is_empty());
    }

    #[tokio::test]
    async fn el_registro_reusa_el_panel_por_id() {
        let servicio = VentasService::new(Arc::new(GatewayFalso::con_total(5)));
        let registro = RegistroPaneles::new(servicio);
        let id = Uuid::new_v4();

        let primero = registro.obtener(id).await;
        // La creación dispara la carga inicial del mes en curso
        let vista = primero.vista(None).await;
        assert!(vista.filtros.fecha_desde.is_some());
        assert_eq!(vista.filas.len(), 1);

        let segundo = registro.obtener(id).await;
        assert!(Arc::ptr_eq(&primero, &segundo));

        let otro = registro.obtener(Uuid::new_v4()).await;
        assert!(!Arc::ptr_eq(&primero, &otro));
    }
}
