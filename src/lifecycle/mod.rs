//! # Coordinador del Ciclo de Vida
//! src/lifecycle/mod.rs
//!
//! Arma el pipeline completo y espera el primer evento que justifique
//! apagar el proceso:
//!
//! ```text
//! Starting → Running → ShuttingDown(reason) → Terminated
//! ```
//!
//! - Error del listener → se reporta, salida con código 1
//! - Error fatal de intake (modo literal) → se reporta, salida con código 1
//! - SIGINT/SIGTERM → salida con código 0. En modo literal no se espera a
//!   los dispatchers; en modo hardened se drenan hasta el deadline.
//!
//! No hay reintentos ni reinicio del listener.

pub mod event;
pub mod signals;

pub use event::{LifecycleEvent, ShutdownReason, ShutdownSignal};

use crate::config::{Config, Mode};
use crate::server::{ListenerSupervisor, Server};
use crate::tasks::{DispatchReport, TaskPool, TaskPoolConfig};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    ShuttingDown,
    Terminated,
}

/// Builder del servicio completo
pub struct Service {
    config: Config,
    reports: Option<Sender<DispatchReport>>,
    os_signals: bool,
}

impl Service {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            reports: None,
            os_signals: false,
        }
    }

    /// Observa lo que recibe cada dispatcher
    pub fn with_reports(mut self, reports: Sender<DispatchReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Instala handlers de SIGINT/SIGTERM al arrancar
    pub fn with_os_signals(mut self) -> Self {
        self.os_signals = true;
        self
    }

    /// Fase `Starting`: crea canales y pool, registra señales y lanza el
    /// supervisor del listener
    ///
    /// Un bind fallido no es un error aquí: llega como primer evento a
    /// [`ServiceHandle::wait`].
    pub fn start(self) -> std::io::Result<ServiceHandle> {
        info!(phase = ?Phase::Starting, mode = %self.config.mode, "setting up consumer");

        let (events_tx, events_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));

        let mut pool = TaskPool::new(TaskPoolConfig::from_config(&self.config));
        if let Some(reports) = self.reports {
            pool = pool.with_reports(reports);
        }
        let pool = Arc::new(pool);

        if self.os_signals {
            signals::spawn_watcher(events_tx.clone())?;
        }

        let server = Server::new(
            self.config.clone(),
            Arc::clone(&pool),
            events_tx.clone(),
            Arc::clone(&stop),
        );
        let supervisor = ListenerSupervisor::spawn(server, events_tx.clone())?;

        info!(phase = ?Phase::Running, addr = ?supervisor.local_addr(), "consumer running");

        Ok(ServiceHandle {
            config: self.config,
            phase: Phase::Running,
            events_tx,
            events_rx,
            stop,
            pool,
            supervisor,
        })
    }
}

/// Servicio en marcha
pub struct ServiceHandle {
    config: Config,
    phase: Phase,
    events_tx: Sender<LifecycleEvent>,
    events_rx: Receiver<LifecycleEvent>,
    stop: Arc<AtomicBool>,
    pool: Arc<TaskPool>,
    supervisor: ListenerSupervisor,
}

impl ServiceHandle {
    /// Dirección real del listener, `None` si el bind falló
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.supervisor.local_addr()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pool(&self) -> Arc<TaskPool> {
        Arc::clone(&self.pool)
    }

    /// Inyecta una señal de apagado como si viniera del sistema operativo
    pub fn interrupt(&self, signal: ShutdownSignal) {
        let _ = self.events_tx.send(LifecycleEvent::Signal(signal));
    }

    /// Fase `Running`: bloquea hasta el primer evento y apaga el servicio
    ///
    /// Retorna el motivo del apagado.
    pub fn wait(mut self) -> ShutdownReason {
        // El handle conserva un Sender, así que recv() no puede fallar por desconexión
        let reason = match self.events_rx.recv() {
            Ok(event) => event,
            Err(_) => LifecycleEvent::ListenerStopped,
        };

        self.phase = Phase::ShuttingDown;
        self.stop.store(true, Ordering::Release);

        match &reason {
            LifecycleEvent::ListenerFailed(e) => {
                error!(phase = ?self.phase, error = %e, "back in main thread with a listener error");
            }
            LifecycleEvent::Fatal(e) => {
                error!(phase = ?self.phase, error = %e, "fatal intake error");
            }
            LifecycleEvent::ListenerStopped => {
                warn!(phase = ?self.phase, "listener stopped");
            }
            LifecycleEvent::Signal(signal) => {
                info!(phase = ?self.phase, %signal, "signal received, shutting down gracefully");
                self.drain();
            }
        }

        // El accept loop ve la bandera de parada en a lo sumo un intervalo de poll
        self.supervisor.join();

        self.phase = Phase::Terminated;
        info!(phase = ?self.phase, in_flight = self.pool.in_flight(), "consumer terminated");
        reason
    }

    fn drain(&self) {
        match self.config.mode {
            Mode::Literal => {
                let in_flight = self.pool.in_flight();
                if in_flight > 0 {
                    warn!(in_flight, "exiting without waiting for dispatchers");
                }
            }
            Mode::Hardened => {
                self.pool.drain(self.config.drain_timeout());
            }
        }
    }
}

/// Punto de entrada del proceso: arranca, espera y traduce el motivo a
/// código de salida
pub fn run(config: Config) -> ExitCode {
    let handle = match Service::new(config).with_os_signals().start() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "cannot start consumer");
            return ExitCode::FAILURE;
        }
    };

    let reason = handle.wait();
    reason.exit_code()
}
