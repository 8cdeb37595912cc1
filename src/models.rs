pub mod filtros;
pub mod ventas;
pub mod dashboard;
pub mod opciones;
