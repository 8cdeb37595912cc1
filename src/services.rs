pub mod export;
pub mod panel;
pub mod tablero;
pub mod ventas_service;

pub use panel::RegistroPaneles;
pub use ventas_service::VentasService;
