//! # Handler HTTP para Tareas
//! src/tasks/handlers.rs
//!
//! Endpoint `POST /task`:
//! 1. Decodifica el body como [`Task`]
//! 2. Lanza un dispatcher y le entrega la tarea (bloquea hasta la entrega)
//! 3. Responde 200 con `Content-Type: application/json` y body vacío
//!
//! # Ejemplo de request
//! ```json
//! {"task_name": "resize", "task_description": "thumbnails for album 7"}
//! ```

use crate::error::IntakeError;
use crate::http::{Request, Response, StatusCode};
use crate::tasks::pool::TaskPool;
use crate::tasks::types::{Task, TaskOutcome};
use tracing::{debug, info};

pub fn submit_handler(req: &Request, pool: &TaskPool) -> Result<Response, IntakeError> {
    let task = Task::decode(req.body())?;
    info!(
        task_name = %task.name,
        task_description = %task.description,
        "request task received"
    );

    pool.submit(task)?;

    let response = Response::new(StatusCode::Ok).with_header("Content-Type", "application/json");

    // El resultado se serializa pero no se escribe en el body
    let encoded = TaskOutcome::success().encode()?;
    debug!(bytes = encoded.len(), "outcome encoded");

    Ok(response)
}
