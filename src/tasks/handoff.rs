//! # Canal de Entrega de Tareas
//! src/tasks/handoff.rs
//!
//! Canales sin buffer (`sync_channel(0)`): un `send` bloquea hasta que un
//! dispatcher está listo en `recv`.
//!
//! - [`SharedHandoff`]: un único canal para todo el proceso. Cualquier
//!   dispatcher esperando puede recibir cualquier tarea, así que no hay
//!   afinidad entre la tarea enviada y el dispatcher lanzado junto a ella.
//! - [`private_handoff`]: un canal por tarea. El dispatcher recibe
//!   exactamente la tarea con la que fue lanzado.

use crate::tasks::types::Task;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

/// Lado receptor de un handoff, tal como lo ve un dispatcher
pub enum TaskSource {
    /// Receptor compartido entre todos los dispatchers vivos
    Shared(Arc<Mutex<Receiver<Task>>>),

    /// Receptor exclusivo de un único dispatcher
    Private(Receiver<Task>),
}

impl TaskSource {
    /// Bloquea hasta recibir una tarea
    ///
    /// Retorna `None` si todos los emisores se cerraron.
    pub fn recv(&self) -> Option<Task> {
        match self {
            TaskSource::Shared(receiver) => {
                // Quien tiene el lock es el único dispatcher en recv(); el resto espera el lock
                let guard = receiver.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.recv().ok()
            }
            TaskSource::Private(receiver) => receiver.recv().ok(),
        }
    }
}

/// Canal único compartido por todo el proceso
#[derive(Clone)]
pub struct SharedHandoff {
    sender: SyncSender<Task>,
    receiver: Arc<Mutex<Receiver<Task>>>,
}

impl SharedHandoff {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::sync_channel(0);
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Nuevo receptor para un dispatcher
    pub fn source(&self) -> TaskSource {
        TaskSource::Shared(Arc::clone(&self.receiver))
    }

    pub fn sender(&self) -> &SyncSender<Task> {
        &self.sender
    }
}

impl Default for SharedHandoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Canal privado de un solo uso
pub fn private_handoff() -> (SyncSender<Task>, TaskSource) {
    let (sender, receiver) = mpsc::sync_channel(0);
    (sender, TaskSource::Private(receiver))
}
