//! # Pool de Dispatchers
//! src/tasks/pool.rs
//!
//! Coordina el paso de una tarea desde el intake hasta un dispatcher:
//! lanza un dispatcher por tarea, empuja la tarea al handoff y lleva la
//! cuenta de dispatchers iniciados y en vuelo.

use crate::config::{Config, Mode};
use crate::error::IntakeError;
use crate::tasks::dispatcher::{DispatchCounter, DispatchReport, Dispatcher, Ordinal};
use crate::tasks::handoff::{private_handoff, SharedHandoff};
use crate::tasks::inflight::InFlight;
use crate::tasks::types::Task;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuración del pool
#[derive(Debug, Clone)]
pub struct TaskPoolConfig {
    pub mode: Mode,

    /// Duración de una unidad de trabajo simulado
    pub time_unit: Duration,
}

impl Default for TaskPoolConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Hardened,
            time_unit: Duration::from_secs(1),
        }
    }
}

impl TaskPoolConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.mode,
            time_unit: config.time_unit(),
        }
    }
}

pub struct TaskPool {
    config: TaskPoolConfig,
    counter: Arc<DispatchCounter>,

    /// Solo se usa en modo literal
    shared: SharedHandoff,

    inflight: InFlight,
    reports: Option<Sender<DispatchReport>>,
}

impl TaskPool {
    pub fn new(config: TaskPoolConfig) -> Self {
        Self {
            config,
            counter: Arc::new(DispatchCounter::new()),
            shared: SharedHandoff::new(),
            inflight: InFlight::new(),
            reports: None,
        }
    }

    /// Envía un [`DispatchReport`] por cada tarea que reciba un dispatcher
    pub fn with_reports(mut self, reports: Sender<DispatchReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Lanza un dispatcher y le entrega la tarea
    ///
    /// Bloquea hasta que algún dispatcher toma la tarea. Si el dispatcher
    /// no se pudo lanzar, la tarea no se empuja.
    pub fn submit(&self, task: Task) -> Result<(), IntakeError> {
        let submitted = task.name.clone();
        let guard = self.inflight.enter();

        match self.config.mode {
            Mode::Literal => {
                Dispatcher::new(
                    Ordinal::Claim(Arc::clone(&self.counter)),
                    self.shared.source(),
                    submitted.clone(),
                    self.config.time_unit,
                )
                .with_guard(guard)
                .with_reports(self.reports.clone())
                .spawn()
                .map_err(IntakeError::Spawn)?;

                debug!(task_name = %submitted, "writing task over shared handoff");
                self.shared
                    .sender()
                    .send(task)
                    .map_err(|e| IntakeError::HandoffClosed(e.0.name))?;
            }
            Mode::Hardened => {
                let ordinal = self.counter.next();
                let (sender, source) = private_handoff();

                Dispatcher::new(
                    Ordinal::Assigned(ordinal),
                    source,
                    submitted.clone(),
                    self.config.time_unit,
                )
                .with_guard(guard)
                .with_reports(self.reports.clone())
                .spawn()
                .map_err(IntakeError::Spawn)?;

                debug!(ordinal, task_name = %submitted, "writing task over private handoff");
                sender
                    .send(task)
                    .map_err(|e| IntakeError::HandoffClosed(e.0.name))?;
            }
        }

        Ok(())
    }

    /// Espera a los dispatchers en vuelo hasta `timeout`
    ///
    /// Retorna `true` si todos terminaron.
    pub fn drain(&self, timeout: Duration) -> bool {
        let pending = self.inflight.count();
        if pending == 0 {
            return true;
        }

        info!(pending, timeout_ms = timeout.as_millis() as u64, "draining dispatchers");
        let drained = self.inflight.wait_idle(timeout);
        if !drained {
            warn!(pending = self.inflight.count(), "drain deadline elapsed");
        }
        drained
    }

    /// Dispatchers iniciados desde que arrancó el proceso
    pub fn dispatched(&self) -> u64 {
        self.counter.current()
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.count()
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }
}
