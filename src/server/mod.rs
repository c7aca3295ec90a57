//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: listener, accept loop y un thread por conexión
//! - `supervisor`: corre el listener en su propio thread y reporta cómo terminó

pub mod supervisor;
pub mod tcp;

pub use supervisor::ListenerSupervisor;
pub use tcp::Server;
