//! # Dispatchers en Vuelo
//! src/tasks/inflight.rs
//!
//! Contador tipo wait-group: cada dispatcher lanzado retiene un guard que
//! decrementa el contador al terminar. Permite esperar a que no quede
//! trabajo pendiente antes de apagar.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
pub struct InFlight {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

/// Mientras exista, cuenta como un dispatcher en vuelo
pub struct InFlightGuard {
    inflight: InFlight,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> InFlightGuard {
        let (count, _) = &*self.inner;
        *count.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        InFlightGuard {
            inflight: self.clone(),
        }
    }

    pub fn count(&self) -> usize {
        let (count, _) = &*self.inner;
        *count.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Espera hasta que el contador llegue a cero o venza el timeout
    ///
    /// Retorna `true` si quedó en cero.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let (count, condvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut current = count.lock().unwrap_or_else(|p| p.into_inner());

        while *current > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            current = match condvar.wait_timeout(current, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }

        true
    }

    fn leave(&self) {
        let (count, condvar) = &*self.inner;
        let mut current = count.lock().unwrap_or_else(|p| p.into_inner());
        *current = current.saturating_sub(1);
        if *current == 0 {
            condvar.notify_all();
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inflight.leave();
    }
}
