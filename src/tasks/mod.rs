//! # Sistema de Tareas
//! src/tasks/mod.rs
//!
//! Pipeline desde el intake hasta los dispatchers:
//!
//! ```text
//! POST /task → submit_handler → TaskPool::submit → handoff → Dispatcher
//! ```

pub mod dispatcher;
pub mod handlers;
pub mod handoff;
pub mod inflight;
pub mod pool;
pub mod types;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use pool::{TaskPool, TaskPoolConfig};
pub use types::{Task, TaskOutcome};
