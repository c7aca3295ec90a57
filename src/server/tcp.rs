//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones y procesa cada una en su propio thread. El accept loop
//! es no bloqueante para poder detenerlo con una bandera compartida.
//!
//! Cuando el intake falla con un error fatal en modo literal, la conexión
//! se corta sin respuesta, se detiene el listener y se avisa al coordinador.

use crate::config::{Config, Mode};
use crate::http::{Method, ParseError, Request, Response, StatusCode};
use crate::lifecycle::LifecycleEvent;
use crate::router::{add_common_headers, Router};
use crate::tasks::{handlers as task_handlers, TaskPool};
use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Cada cuánto el accept loop revisa la bandera de parada
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Lo que necesita cada thread de conexión
struct ConnectionContext {
    router: Arc<Router>,
    mode: Mode,
    max_body_bytes: usize,
    events: Sender<LifecycleEvent>,
    stop: Arc<AtomicBool>,
}

pub struct Server {
    config: Config,
    router: Arc<Router>,
    events: Sender<LifecycleEvent>,
    stop: Arc<AtomicBool>,
}

impl Server {
    pub fn new(
        config: Config,
        pool: Arc<TaskPool>,
        events: Sender<LifecycleEvent>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let mut router = Router::new();
        router.register(Method::POST, "/task", move |req| {
            task_handlers::submit_handler(req, &pool)
        });

        Self {
            config,
            router: Arc::new(router),
            events,
            stop,
        }
    }

    pub fn bind(&self) -> std::io::Result<TcpListener> {
        let address = self.config.address();
        info!(%address, "binding listener");
        TcpListener::bind(&address)
    }

    /// Accept loop: retorna `Ok(())` cuando se pide parar y `Err` ante un
    /// error irrecuperable del listener
    pub fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        listener.set_nonblocking(true)?;
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, mode = %self.config.mode, "listening for requests");
        }

        loop {
            if self.stop.load(Ordering::Acquire) {
                info!("listener stopping");
                return Ok(());
            }

            match listener.accept() {
                Ok((stream, peer)) => self.spawn_connection(stream, peer),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "transient accept error");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        debug!(%peer, "new connection");

        if let Err(e) = self.prepare_stream(&stream) {
            warn!(%peer, error = %e, "cannot configure connection");
            return;
        }

        let ctx = ConnectionContext {
            router: Arc::clone(&self.router),
            mode: self.config.mode,
            max_body_bytes: self.config.max_body_bytes,
            events: self.events.clone(),
            stop: Arc::clone(&self.stop),
        };

        let spawned = thread::Builder::new()
            .name("connection".to_string())
            .spawn(move || {
                if let Err(e) = handle_connection(stream, &ctx) {
                    warn!(%peer, error = %e, "connection error");
                }
            });
        if let Err(e) = spawned {
            error!(%peer, error = %e, "cannot spawn connection thread");
        }
    }

    fn prepare_stream(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.config.read_timeout()))?;
        stream.set_write_timeout(Some(self.config.write_timeout()))?;
        Ok(())
    }
}

fn is_transient(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::Interrupted | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset
    )
}

fn handle_connection(mut stream: TcpStream, ctx: &ConnectionContext) -> std::io::Result<()> {
    let start = Instant::now();

    let request = match Request::read_from(&stream, ctx.max_body_bytes) {
        Ok(request) => request,
        Err(ParseError::EmptyRequest) => {
            debug!("connection closed without data");
            return Ok(());
        }
        Err(ParseError::Io(e)) => return Err(e),
        Err(e) => {
            debug!(error = %e, "parse error");
            let status = match e {
                ParseError::BodyTooLarge { .. } => StatusCode::PayloadTooLarge,
                ParseError::UnsupportedTransferEncoding(_) => StatusCode::NotImplemented,
                _ => StatusCode::BadRequest,
            };
            let mut response = Response::error(status, &format!("Invalid: {}", e));
            add_common_headers(&mut response);
            return write_response(&mut stream, &response);
        }
    };

    debug!(method = request.method().as_str(), path = request.path(), "request");

    let response = match ctx.router.route(&request) {
        Ok(response) => response,
        Err(e) if ctx.mode == Mode::Literal && e.is_process_fatal() => {
            error!(error = %e, "fatal intake error, halting");
            // El evento va antes que la bandera para que el coordinador lo vea
            // antes que el ListenerStopped del supervisor
            let _ = ctx.events.send(LifecycleEvent::Fatal(e));
            ctx.stop.store(true, Ordering::Release);
            // Sin respuesta: el stream se cierra al salir
            return Ok(());
        }
        Err(e) => {
            warn!(error = %e, "task rejected");
            let mut response = e.to_response();
            add_common_headers(&mut response);
            response
        }
    };

    write_response(&mut stream, &response)?;

    info!(
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "exiting request handler"
    );
    Ok(())
}

fn write_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    stream.write_all(&response.to_bytes())?;
    stream.flush()
}
