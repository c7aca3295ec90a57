//! # Task Consumer
//! src/lib.rs
//!
//! Consumidor de tareas: recibe tareas por `POST /task` y entrega cada una a
//! un dispatcher que corre en su propio thread y simula trabajo con un
//! sleep. El proceso se apaga ordenadamente ante SIGINT/SIGTERM o de forma
//! anormal si el listener falla.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing de requests y construcción de responses
//! - `router`: Enrutamiento método + path a handlers
//! - `server`: Listener TCP, un thread por conexión, supervisor del listener
//! - `tasks`: Intake, handoff sin buffer, dispatchers y contador global
//! - `lifecycle`: Coordinador del ciclo de vida y señales del sistema
//! - `config`: CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use task_consumer::config::Config;
//! use task_consumer::lifecycle::Service;
//!
//! let handle = Service::new(Config::default()).with_os_signals().start().unwrap();
//! let reason = handle.wait();
//! println!("shutdown: {}", reason);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod router;
pub mod server;
pub mod tasks;
