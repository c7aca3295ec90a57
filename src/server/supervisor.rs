//! # Supervisor del Listener
//! src/server/supervisor.rs
//!
//! Corre el listener en su propio thread y reenvía al coordinador un único
//! evento terminal: `ListenerFailed` si el bind o el accept fallan,
//! `ListenerStopped` si se le pidió parar.

use crate::lifecycle::LifecycleEvent;
use crate::server::Server;
use std::net::SocketAddr;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::error;

pub struct ListenerSupervisor {
    handle: JoinHandle<()>,
    local_addr: Option<SocketAddr>,
}

impl ListenerSupervisor {
    /// Lanza el listener y espera a saber si el bind funcionó
    ///
    /// Si el bind falla, `local_addr()` es `None` y el error ya viaja por
    /// `events`.
    pub fn spawn(server: Server, events: Sender<LifecycleEvent>) -> std::io::Result<Self> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Option<SocketAddr>>(1);

        let handle = thread::Builder::new()
            .name("listener".to_string())
            .spawn(move || {
                let outcome = match server.bind() {
                    Ok(listener) => {
                        let _ = ready_tx.send(listener.local_addr().ok());
                        drop(ready_tx);
                        server.serve(listener)
                    }
                    Err(e) => {
                        drop(ready_tx);
                        Err(e)
                    }
                };

                let event = match outcome {
                    Ok(()) => LifecycleEvent::ListenerStopped,
                    Err(e) => {
                        error!(error = %e, "listener failed");
                        LifecycleEvent::ListenerFailed(e)
                    }
                };
                let _ = events.send(event);
            })?;

        let local_addr = ready_rx.recv().ok().flatten();

        Ok(Self { handle, local_addr })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("listener thread panicked");
        }
    }
}
