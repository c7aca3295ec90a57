//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea método + path a handlers.
//!
//! ```text
//! Request → Router → Handler → Result<Response, IntakeError>
//! ```
//!
//! Los paths se normalizan quitando la barra final (`/task/` == `/task`).
//! Path desconocido → 404; path conocido con otro método → 405.

use crate::error::IntakeError;
use crate::http::{Method, Request, Response, StatusCode};

pub type HandlerResult = Result<Response, IntakeError>;

/// Un handler recibe un Request y produce una Response o un error de intake
pub type Handler = Box<dyn Fn(&Request) -> HandlerResult + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use task_consumer::router::Router;
    /// use task_consumer::http::{Method, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/health", |_req| Ok(Response::new(StatusCode::Ok)));
    /// ```
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path: normalize(path).to_string(),
            handler: Box::new(handler),
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> HandlerResult {
        let path = normalize(request.path());
        let mut allowed: Vec<&'static str> = Vec::new();

        for route in self.routes.iter().filter(|r| r.path == path) {
            if route.method == request.method() {
                let mut response = (route.handler)(request)?;
                add_common_headers(&mut response);
                return Ok(response);
            }
            allowed.push(route.method.as_str());
        }

        let mut response = if allowed.is_empty() {
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", path))
        } else {
            Response::error(
                StatusCode::MethodNotAllowed,
                &format!("Method {} not allowed on {}", request.method().as_str(), path),
            )
            .with_header("Allow", &allowed.join(", "))
        };
        add_common_headers(&mut response);
        Ok(response)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers comunes a todas las respuestas
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "task-consumer");
    response.add_header("Connection", "close");
}

/// Quita las barras finales salvo en la raíz
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
