//! Tests de integración para el consumidor de tareas
//! tests/integration_test.rs
//!
//! Cada test arranca el servicio completo en un puerto efímero y habla
//! HTTP crudo por `TcpStream`.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use task_consumer::config::{Config, Mode};
use task_consumer::lifecycle::{LifecycleEvent, Service, ServiceHandle, ShutdownSignal};
use task_consumer::tasks::DispatchReport;

fn test_config(mode: Mode, time_unit_ms: u64) -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.mode = mode;
    config.time_unit_ms = time_unit_ms;
    config
}

fn start(mode: Mode, time_unit_ms: u64) -> (ServiceHandle, SocketAddr, mpsc::Receiver<DispatchReport>) {
    let (reports_tx, reports_rx) = mpsc::channel();
    let handle = Service::new(test_config(mode, time_unit_ms))
        .with_reports(reports_tx)
        .start()
        .expect("start service");
    let addr = handle.local_addr().expect("listener bound");
    (handle, addr, reports_rx)
}

/// Helper: envía un request HTTP y retorna la response completa
fn send_raw(addr: SocketAddr, raw: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    stream.write_all(raw)?;
    stream.flush()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn post(addr: SocketAddr, path: &str, body: &str) -> String {
    let request = format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        path,
        addr,
        body.len(),
        body
    );
    send_raw(addr, request.as_bytes()).expect("Failed to send request")
}

fn task_body(name: &str) -> String {
    serde_json::json!({ "task_name": name, "task_description": format!("work for {}", name) })
        .to_string()
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

fn shutdown(handle: ServiceHandle) -> LifecycleEvent {
    handle.interrupt(ShutdownSignal::Interrupt);
    handle.wait()
}

#[test]
fn test_valid_submission_acknowledged() {
    let (handle, addr, _reports) = start(Mode::Hardened, 1);

    let response = post(addr, "/task", &task_body("resize"));

    assert!(response.starts_with("HTTP/1.0 200 OK"), "got: {}", response);
    assert!(response.contains("Content-Type: application/json\r\n"));
    assert!(response.contains("Content-Length: 0\r\n"));
    assert_eq!(extract_body(&response), "");

    shutdown(handle);
}

#[test]
fn test_one_dispatcher_per_submission() {
    let (handle, addr, reports) = start(Mode::Literal, 1);
    let pool = handle.pool();

    for i in 0..4 {
        let response = post(addr, "/task", &task_body(&format!("t{}", i)));
        assert!(response.contains("200 OK"), "request {} failed", i);
    }

    assert_eq!(pool.dispatched(), 4);
    assert_eq!(reports.iter().take(4).count(), 4);

    shutdown(handle);
}

#[test]
fn test_trailing_slash_route() {
    let (handle, addr, _reports) = start(Mode::Hardened, 1);

    let response = post(addr, "/task/", &task_body("slash"));
    assert!(response.contains("200 OK"), "got: {}", response);

    shutdown(handle);
}

#[test]
fn test_delays_follow_start_order_not_task() {
    let (handle, addr, reports) = start(Mode::Literal, 1);

    // Mismo nombre de tarea en todas: el delay solo depende del orden
    for _ in 0..5 {
        assert!(post(addr, "/task", &task_body("same")).contains("200 OK"));
    }

    let mut received: Vec<DispatchReport> = reports.iter().take(5).collect();
    received.sort_by_key(|r| r.ordinal);
    let delays: Vec<Duration> = received.iter().map(|r| r.delay).collect();

    assert_eq!(
        delays,
        [10, 5, 7, 15, 15].map(Duration::from_millis).to_vec()
    );

    shutdown(handle);
}

#[test]
fn test_hardened_malformed_body_is_rejected_and_service_continues() {
    let (handle, addr, _reports) = start(Mode::Hardened, 1);
    let pool = handle.pool();

    let response = post(addr, "/task", "{\"task_name\": ");
    assert!(response.contains("400 Bad Request"), "got: {}", response);
    assert!(extract_body(&response).contains("error"));
    assert_eq!(pool.dispatched(), 0);

    let response = post(addr, "/task", &task_body("after"));
    assert!(response.contains("200 OK"));
    assert_eq!(pool.dispatched(), 1);

    assert!(shutdown(handle).is_graceful());
}

#[test]
fn test_literal_malformed_body_is_fatal() {
    let (handle, addr, _reports) = start(Mode::Literal, 1);

    let response = post(addr, "/task", "not json at all");
    assert_eq!(response, "", "no response is expected");

    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = done_tx.send(handle.wait());
    });
    let reason = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("coordinator did not shut down");

    assert!(matches!(reason, LifecycleEvent::Fatal(_)));
    assert!(!reason.is_graceful());
    assert!(TcpStream::connect(addr).is_err(), "listener still accepting");
}

#[test]
fn test_signal_when_idle_exits_promptly() {
    for mode in [Mode::Literal, Mode::Hardened] {
        let (handle, _addr, _reports) = start(mode, 1);

        let started = Instant::now();
        let reason = shutdown(handle);

        assert!(matches!(reason, LifecycleEvent::Signal(ShutdownSignal::Interrupt)));
        assert!(reason.is_graceful());
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}

#[test]
fn test_literal_signal_does_not_wait_for_dispatchers() {
    // El primer dispatcher duerme 10 × 200ms = 2s
    let (handle, addr, reports) = start(Mode::Literal, 200);
    let pool = handle.pool();

    assert!(post(addr, "/task", &task_body("long")).contains("200 OK"));
    reports.recv_timeout(Duration::from_secs(5)).unwrap();

    let started = Instant::now();
    shutdown(handle);

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(pool.in_flight(), 1);
}

#[test]
fn test_hardened_signal_drains_dispatchers() {
    // El primer dispatcher duerme 10 × 20ms = 200ms
    let (handle, addr, reports) = start(Mode::Hardened, 20);
    let pool = handle.pool();

    assert!(post(addr, "/task", &task_body("drained")).contains("200 OK"));
    reports.recv_timeout(Duration::from_secs(5)).unwrap();

    let reason = shutdown(handle);

    assert!(reason.is_graceful());
    assert_eq!(pool.in_flight(), 0);
}

#[test]
fn test_hardened_concurrent_submissions_keep_affinity() {
    let (handle, addr, reports) = start(Mode::Hardened, 1);

    let clients: Vec<_> = (0..12)
        .map(|i| thread::spawn(move || post(addr, "/task", &task_body(&format!("c{}", i)))))
        .collect();
    for client in clients {
        assert!(client.join().unwrap().contains("200 OK"));
    }

    let received: Vec<DispatchReport> = reports.iter().take(12).collect();
    assert!(
        received.iter().all(DispatchReport::is_affine),
        "mismatched delivery: {:?}",
        received
    );

    shutdown(handle);
}

#[test]
fn test_literal_concurrent_submissions_deliver_each_task_once() {
    let (handle, addr, reports) = start(Mode::Literal, 1);

    let clients: Vec<_> = (0..12)
        .map(|i| thread::spawn(move || post(addr, "/task", &task_body(&format!("c{:02}", i)))))
        .collect();
    for client in clients {
        assert!(client.join().unwrap().contains("200 OK"));
    }

    let received: Vec<DispatchReport> = reports.iter().take(12).collect();

    // No hay afinidad garantizada, pero ninguna tarea se pierde ni se duplica
    let mut submitted: Vec<&str> = received.iter().map(|r| r.submitted.as_str()).collect();
    let mut delivered: Vec<&str> = received.iter().map(|r| r.received.as_str()).collect();
    submitted.sort();
    delivered.sort();
    assert_eq!(submitted, delivered);

    shutdown(handle);
}

#[test]
fn test_bind_failure_reports_and_shuts_down() {
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(Mode::Hardened, 1);
    config.port = occupied.local_addr().unwrap().port();

    let handle = Service::new(config).start().expect("start service");
    assert!(handle.local_addr().is_none());

    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = done_tx.send(handle.wait());
    });
    let reason = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("coordinator hung on bind failure");

    assert!(matches!(reason, LifecycleEvent::ListenerFailed(_)));
}

#[test]
fn test_unknown_route_and_wrong_method() {
    let (handle, addr, _reports) = start(Mode::Literal, 1);

    let response = send_raw(addr, b"GET /task HTTP/1.0\r\n\r\n").unwrap();
    assert!(response.contains("405 Method Not Allowed"), "got: {}", response);

    let response = post(addr, "/jobs/submit", &task_body("x"));
    assert!(response.contains("404 Not Found"), "got: {}", response);

    shutdown(handle);
}
