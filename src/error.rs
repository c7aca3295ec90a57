//! # Errores del Intake
//! src/error.rs
//!
//! Errores que puede producir el endpoint de tareas. Cada uno sabe a qué
//! status HTTP corresponde en modo hardened, y si en modo literal debe
//! tumbar el proceso completo.

use crate::http::{Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// El body no es una tarea JSON válida
    #[error("cannot decode task: {0}")]
    Decode(#[source] serde_json::Error),

    /// La respuesta no se pudo serializar
    #[error("cannot encode outcome: {0}")]
    Encode(#[source] serde_json::Error),

    /// El sistema operativo no permitió crear el thread del dispatcher
    #[error("cannot spawn dispatcher: {0}")]
    Spawn(#[source] std::io::Error),

    /// Ningún dispatcher puede recibir ya la tarea
    #[error("handoff closed before a dispatcher took task `{0}`")]
    HandoffClosed(String),
}

impl IntakeError {
    /// Status HTTP con el que se responde en modo hardened
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::Decode(_) => StatusCode::BadRequest,
            IntakeError::Encode(_) => StatusCode::InternalServerError,
            IntakeError::Spawn(_) => StatusCode::ServiceUnavailable,
            IntakeError::HandoffClosed(_) => StatusCode::InternalServerError,
        }
    }

    /// Errores que en modo literal terminan el proceso
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, IntakeError::Decode(_) | IntakeError::Encode(_))
    }

    pub fn to_response(&self) -> Response {
        Response::error(self.status(), &self.to_string())
    }
}
