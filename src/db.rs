pub mod filtros_sql;
pub mod gateway;
pub mod ventas_repo;

pub use gateway::VentasGateway;
pub use ventas_repo::VentasRepository;
