//! # Tipos de Tareas
//! src/tasks/types.rs
//!
//! Estructuras que viajan por el pipeline: la tarea recibida y el resultado
//! que se construye para cada request.

use crate::error::IntakeError;
use serde::{Deserialize, Serialize};

/// Tarea enviada por un cliente
///
/// En el wire los campos se llaman `task_name` y `task_description`.
/// Campos ausentes quedan como string vacío; no se valida su contenido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_name", default)]
    pub name: String,

    #[serde(rename = "task_description", default)]
    pub description: String,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Decodifica una tarea desde el body JSON
    ///
    /// # Ejemplo
    /// ```
    /// use task_consumer::tasks::Task;
    ///
    /// let task = Task::decode(br#"{"task_name":"build","task_description":"nightly"}"#).unwrap();
    /// assert_eq!(task.name, "build");
    /// ```
    pub fn decode(body: &[u8]) -> Result<Self, IntakeError> {
        serde_json::from_slice(body).map_err(IntakeError::Decode)
    }
}

/// Resultado construido por cada request aceptado
///
/// Se serializa pero los bytes no se escriben en el body de la respuesta:
/// el cliente solo observa el status y el `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub name: String,
    pub outcome: String,
}

impl TaskOutcome {
    pub fn success() -> Self {
        Self {
            name: "outcome".to_string(),
            outcome: "success".to_string(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, IntakeError> {
        serde_json::to_vec(self).map_err(IntakeError::Encode)
    }
}
