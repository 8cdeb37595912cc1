// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::db::VentasRepository;
use crate::services::{RegistroPaneles, VentasService};

// El estado compartido accesible en toda la aplicación
#[derive(Clone)]
pub struct AppState {
    pub paneles: Arc<RegistroPaneles>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");

        // La base es el servicio gestionado donde viven la vista consolidada
        // y las funciones RPC; acá solo se arma el pool hacia ella.
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de ventas establecida!");

        // --- Arma el grafo de dependencias ---
        // La pasarela se inyecta explícitamente: nada de clientes globales.
        let repositorio = VentasRepository::new(db_pool);
        let servicio = VentasService::new(Arc::new(repositorio));
        let paneles = Arc::new(RegistroPaneles::new(servicio));

        Ok(Self { paneles })
    }
}
