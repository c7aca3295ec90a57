//! # Señales del Sistema Operativo
//! src/lifecycle/signals.rs
//!
//! Un thread dedicado corre un runtime tokio de un solo hilo que espera
//! SIGINT o SIGTERM (solo Ctrl-C fuera de Unix) y lo reenvía como
//! [`LifecycleEvent::Signal`].

use crate::lifecycle::event::{LifecycleEvent, ShutdownSignal};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Registra los handlers y lanza el thread observador
///
/// Los handlers quedan instalados antes de retornar, así que una señal
/// que llegue después ya no usa la acción por defecto del proceso.
pub fn spawn_watcher(events: Sender<LifecycleEvent>) -> std::io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut signals = runtime.block_on(async { ShutdownSignals::register() })?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            let signal = runtime.block_on(signals.recv());
            debug!(%signal, "signal caught");
            let _ = events.send(LifecycleEvent::Signal(signal));
        })
}

#[cfg(unix)]
struct ShutdownSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.sigint.recv() => ShutdownSignal::Interrupt,
            _ = self.sigterm.recv() => ShutdownSignal::Terminate,
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> ShutdownSignal {
        // Si el handler de Ctrl-C no se puede instalar, este thread espera para siempre
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownSignal::Interrupt,
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending().await
            }
        }
    }
}
