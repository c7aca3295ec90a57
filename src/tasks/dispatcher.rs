//! # Dispatcher
//! src/tasks/dispatcher.rs
//!
//! Unidad de ejecución independiente (un thread) que:
//! 1. Toma un ordinal del contador global de despachos
//! 2. Recibe exactamente una tarea del handoff
//! 3. Duerme un tiempo que depende solo del ordinal
//! 4. Termina
//!
//! El ordinal cuenta dispatchers iniciados en la vida del proceso; no
//! identifica la tarea recibida.

use crate::tasks::handoff::TaskSource;
use crate::tasks::inflight::InFlightGuard;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Contador global de dispatchers iniciados. Empieza en cero y nunca se reinicia.
#[derive(Debug, Default)]
pub struct DispatchCounter(AtomicU64);

impl DispatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incrementa y retorna el nuevo valor (el primero es 1)
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Unidades de trabajo simulado para un ordinal
///
/// # Ejemplo
/// ```
/// use task_consumer::tasks::dispatcher::delay_units;
///
/// assert_eq!(delay_units(1), 10);
/// assert_eq!(delay_units(2), 5);
/// assert_eq!(delay_units(3), 7);
/// assert_eq!(delay_units(4), 15);
/// ```
pub fn delay_units(ordinal: u64) -> u32 {
    match ordinal {
        1 => 10,
        2 => 5,
        3 => 7,
        _ => 15,
    }
}

pub fn delay_for(ordinal: u64, time_unit: Duration) -> Duration {
    time_unit * delay_units(ordinal)
}

/// De dónde sale el ordinal del dispatcher
pub enum Ordinal {
    /// Se toma del contador al arrancar el thread
    Claim(Arc<DispatchCounter>),

    /// Fue asignado al encolar la tarea
    Assigned(u64),
}

/// Lo que observó un dispatcher al recibir su tarea
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub ordinal: u64,

    /// Nombre de la tarea enviada junto con el lanzamiento de este dispatcher
    pub submitted: String,

    /// Nombre de la tarea que realmente recibió
    pub received: String,

    pub delay: Duration,
}

impl DispatchReport {
    pub fn is_affine(&self) -> bool {
        self.submitted == self.received
    }
}

pub struct Dispatcher {
    ordinal: Ordinal,
    source: TaskSource,
    submitted: String,
    time_unit: Duration,
    guard: Option<InFlightGuard>,
    reports: Option<Sender<DispatchReport>>,
}

impl Dispatcher {
    pub fn new(ordinal: Ordinal, source: TaskSource, submitted: String, time_unit: Duration) -> Self {
        Self {
            ordinal,
            source,
            submitted,
            time_unit,
            guard: None,
            reports: None,
        }
    }

    /// Cuenta al dispatcher como en vuelo hasta que termine de dormir
    pub fn with_guard(mut self, guard: InFlightGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_reports(mut self, reports: Option<Sender<DispatchReport>>) -> Self {
        self.reports = reports;
        self
    }

    /// Lanza el dispatcher en su propio thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("dispatcher".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        let ordinal = match &self.ordinal {
            Ordinal::Claim(counter) => counter.next(),
            Ordinal::Assigned(ordinal) => *ordinal,
        };
        debug!(ordinal, submitted = %self.submitted, "dispatcher started");

        let Some(task) = self.source.recv() else {
            debug!(ordinal, "handoff closed before a task arrived");
            return;
        };

        let delay = delay_for(ordinal, self.time_unit);
        info!(
            ordinal,
            task_name = %task.name,
            submitted = %self.submitted,
            delay_ms = delay.as_millis() as u64,
            "dispatcher has task"
        );

        if let Some(reports) = &self.reports {
            let _ = reports.send(DispatchReport {
                ordinal,
                submitted: self.submitted.clone(),
                received: task.name.clone(),
                delay,
            });
        }

        thread::sleep(delay);

        debug!(ordinal, "dispatcher exiting");
        drop(self.guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::handoff::{private_handoff, SharedHandoff};
    use crate::tasks::inflight::InFlight;
    use crate::tasks::types::Task;
    use std::sync::mpsc;
    use std::time::Instant;

    const UNIT: Duration = Duration::from_millis(1);

    #[test]
    fn test_delay_table() {
        let units: Vec<u32> = (1..=6).map(delay_units).collect();
        assert_eq!(units, vec![10, 5, 7, 15, 15, 15]);
        assert_eq!(delay_units(0), 15);
    }

    #[test]
    fn test_delay_scales_with_unit() {
        assert_eq!(delay_for(1, Duration::from_secs(1)), Duration::from_secs(10));
        assert_eq!(delay_for(3, Duration::from_millis(2)), Duration::from_millis(14));
    }

    #[test]
    fn test_counter_starts_at_one() {
        let counter = DispatchCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_counter_concurrent_increments_are_not_lost() {
        let counter = Arc::new(DispatchCounter::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.next();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(counter.current(), 8000);
    }

    #[test]
    fn test_dispatcher_reports_and_sleeps() {
        let (sender, source) = private_handoff();
        let (reports_tx, reports_rx) = mpsc::channel();

        let start = Instant::now();
        let handle = Dispatcher::new(Ordinal::Assigned(2), source, "a".into(), UNIT)
            .with_reports(Some(reports_tx))
            .spawn()
            .unwrap();
        sender.send(Task::new("a", "payload")).unwrap();
        handle.join().unwrap();

        let report = reports_rx.recv().unwrap();
        assert_eq!(report.ordinal, 2);
        assert_eq!(report.delay, Duration::from_millis(5));
        assert!(report.is_affine());
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_claimed_ordinal_comes_from_counter() {
        let counter = Arc::new(DispatchCounter::new());
        counter.next();
        counter.next();

        let (sender, source) = private_handoff();
        let (reports_tx, reports_rx) = mpsc::channel();
        let handle = Dispatcher::new(Ordinal::Claim(Arc::clone(&counter)), source, "x".into(), UNIT)
            .with_reports(Some(reports_tx))
            .spawn()
            .unwrap();
        sender.send(Task::new("x", "")).unwrap();
        handle.join().unwrap();

        let report = reports_rx.recv().unwrap();
        assert_eq!(report.ordinal, 3);
        assert_eq!(report.delay, Duration::from_millis(7));
        assert_eq!(counter.current(), 3);
    }

    #[test]
    fn test_shared_dispatcher_may_receive_foreign_task() {
        let handoff = SharedHandoff::new();
        let (reports_tx, reports_rx) = mpsc::channel();

        let handle = Dispatcher::new(Ordinal::Assigned(4), handoff.source(), "a".into(), UNIT)
            .with_reports(Some(reports_tx))
            .spawn()
            .unwrap();
        handoff.sender().send(Task::new("b", "")).unwrap();
        handle.join().unwrap();

        let report = reports_rx.recv().unwrap();
        assert_eq!(report.submitted, "a");
        assert_eq!(report.received, "b");
        assert!(!report.is_affine());
    }

    #[test]
    fn test_guard_released_after_sleep() {
        let inflight = InFlight::new();
        let (sender, source) = private_handoff();

        let handle = Dispatcher::new(Ordinal::Assigned(1), source, "a".into(), UNIT)
            .with_guard(inflight.enter())
            .spawn()
            .unwrap();
        assert_eq!(inflight.count(), 1);

        sender.send(Task::new("a", "")).unwrap();
        handle.join().unwrap();
        assert_eq!(inflight.count(), 0);
    }

    #[test]
    fn test_closed_handoff_exits_quietly() {
        let inflight = InFlight::new();
        let (sender, source) = private_handoff();
        drop(sender);

        Dispatcher::new(Ordinal::Assigned(1), source, "a".into(), UNIT)
            .with_guard(inflight.enter())
            .spawn()
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(inflight.count(), 0);
    }
}
