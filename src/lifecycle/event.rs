//! # Eventos de Ciclo de Vida
//! src/lifecycle/event.rs
//!
//! Todo lo que puede terminar el proceso llega por un único canal como
//! [`LifecycleEvent`]. El coordinador reacciona al primero que recibe.

use crate::error::IntakeError;
use std::process::ExitCode;

/// Señal del sistema operativo que pidió el apagado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl-C
    Interrupt,

    /// SIGTERM
    Terminate,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("interrupt"),
            ShutdownSignal::Terminate => f.write_str("terminated"),
        }
    }
}

#[derive(Debug)]
pub enum LifecycleEvent {
    /// El listener no pudo hacer bind o dejó de aceptar conexiones por un error
    ListenerFailed(std::io::Error),

    /// El listener terminó porque se le pidió parar
    ListenerStopped,

    /// Error de intake que en modo literal tumba el proceso
    Fatal(IntakeError),

    /// El operador pidió apagar el proceso
    Signal(ShutdownSignal),
}

/// Motivo final del apagado: el primer evento que vio el coordinador
pub type ShutdownReason = LifecycleEvent;

impl LifecycleEvent {
    /// Código de salida del proceso para este motivo
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LifecycleEvent::Signal(_) | LifecycleEvent::ListenerStopped => ExitCode::SUCCESS,
            LifecycleEvent::ListenerFailed(_) | LifecycleEvent::Fatal(_) => ExitCode::FAILURE,
        }
    }

    pub fn is_graceful(&self) -> bool {
        matches!(self, LifecycleEvent::Signal(_) | LifecycleEvent::ListenerStopped)
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleEvent::ListenerFailed(e) => write!(f, "listener failed: {}", e),
            LifecycleEvent::ListenerStopped => f.write_str("listener stopped"),
            LifecycleEvent::Fatal(e) => write!(f, "fatal intake error: {}", e),
            LifecycleEvent::Signal(signal) => write!(f, "{} signal received", signal),
        }
    }
}
