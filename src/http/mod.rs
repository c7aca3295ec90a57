//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementación mínima del protocolo HTTP/1.0 sin librerías de alto nivel:
//!
//! - Lectura y parsing de requests (body por `Content-Length` o chunked)
//! - Construcción de responses
//! - Códigos de estado
//!
//! El consumidor responde siempre con `Connection: close`, así que no hay
//! conexiones persistentes. Las respuestas nunca van en chunks.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
