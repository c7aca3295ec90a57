//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.0 (y el subconjunto de HTTP/1.1 que usan los clientes
//! de tareas) escrito a mano.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /task HTTP/1.1\r\n
//! Host: localhost:9000\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 52\r\n
//! \r\n
//! {"task_name":"build","task_description":"nightly"}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: exactamente `Content-Length` bytes, o una secuencia de chunks
//!    si viene `Transfer-Encoding: chunked`

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Read};
use thiserror::Error;

/// Tamaño máximo aceptado para request line + headers
const MAX_HEAD_BYTES: usize = 16 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Tamaño máximo de una línea de tamaño de chunk o de un trailer
const MAX_CHUNK_LINE_BYTES: usize = 4096;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
}

impl Method {
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        }
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path sin query string (ej: "/task")
    path: String,

    /// Headers con el nombre normalizado a minúsculas
    headers: HashMap<String, String>,

    version: String,

    body: Vec<u8>,
}

/// Errores que pueden ocurrir leyendo o parseando un request
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Unsupported Transfer-Encoding: {0}")]
    UnsupportedTransferEncoding(String),

    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    #[error("Request body of {size} bytes exceeds limit of {limit}")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("Request headers exceed {0} bytes")]
    HeadTooLarge(usize),

    #[error("Empty request")]
    EmptyRequest,

    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}

impl Request {
    /// Lee un request completo desde un stream
    ///
    /// Lee hasta el fin de los headers y luego el body: decodificado si viene
    /// `Transfer-Encoding: chunked`, si no exactamente `Content-Length`
    /// bytes. Sin ninguno de los dos el body queda vacío.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use task_consumer::http::Request;
    ///
    /// let raw: &[u8] = b"POST /task HTTP/1.0\r\nContent-Length: 2\r\n\r\n{}";
    /// let request = Request::read_from(raw, 1024).unwrap();
    ///
    /// assert_eq!(request.path(), "/task");
    /// assert_eq!(request.body(), b"{}");
    /// ```
    pub fn read_from<R: Read>(mut reader: R, max_body: usize) -> Result<Self, ParseError> {
        let mut buffer = Vec::with_capacity(1024);
        let mut chunk = [0u8; 4096];

        // 1. Leer hasta encontrar \r\n\r\n
        let head_end = loop {
            if let Some(pos) = find_subsequence(&buffer, HEAD_TERMINATOR) {
                break pos;
            }
            if buffer.len() > MAX_HEAD_BYTES {
                return Err(ParseError::HeadTooLarge(MAX_HEAD_BYTES));
            }

            let n = reader.read(&mut chunk)?;
            if n == 0 {
                if buffer.is_empty() {
                    return Err(ParseError::EmptyRequest);
                }
                return Err(ParseError::IncompleteRequest);
            }
            buffer.extend_from_slice(&chunk[..n]);
        };

        let body_start = head_end + HEAD_TERMINATOR.len();
        let mut request = Self::parse_head(&buffer[..head_end])?;

        // 2. Leer el body completo según el framing declarado
        let leftover = buffer.split_off(body_start);
        request.body = match request.framing()? {
            BodyFraming::Chunked => read_chunked(Cursor::new(leftover).chain(reader), max_body)?,
            BodyFraming::Length(expected) => {
                if expected > max_body {
                    return Err(ParseError::BodyTooLarge { size: expected, limit: max_body });
                }

                let mut body = leftover;
                if body.len() < expected {
                    let mut rest = vec![0u8; expected - body.len()];
                    reader.read_exact(&mut rest).map_err(incomplete_on_eof)?;
                    body.extend_from_slice(&rest);
                }
                body.truncate(expected);
                body
            }
        };

        Ok(request)
    }

    /// Parsea un request que ya está completo en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use task_consumer::http::Request;
    ///
    /// let raw = b"GET /task?verbose=1 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/task");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        Self::read_from(buffer, usize::MAX)
    }

    /// Parsea request line + headers (sin el terminador)
    fn parse_head(head: &[u8]) -> Result<Self, ParseError> {
        let head_str = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head_str.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            headers,
            version,
            body: Vec::new(),
        })
    }

    /// Formato: `POST /path?query HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;

        // El query string no se usa: solo nos quedamos con el path
        let path = match parts[1].find('?') {
            Some(query_start) => parts[1][..query_start].to_string(),
            None => parts[1].to_string(),
        };

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.find(':') {
                Some(colon_pos) => {
                    let name = line[..colon_pos].trim().to_ascii_lowercase();
                    let value = line[colon_pos + 1..].trim().to_string();
                    headers.insert(name, value);
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    /// `Transfer-Encoding` tiene prioridad sobre `Content-Length`
    fn framing(&self) -> Result<BodyFraming, ParseError> {
        if let Some(value) = self.header("Transfer-Encoding") {
            let last = value.rsplit(',').next().unwrap_or("").trim();
            if last.eq_ignore_ascii_case("chunked") {
                return Ok(BodyFraming::Chunked);
            }
            return Err(ParseError::UnsupportedTransferEncoding(value.to_string()));
        }

        match self.header("Content-Length") {
            Some(value) => value
                .parse::<usize>()
                .map(BodyFraming::Length)
                .map_err(|_| ParseError::InvalidContentLength(value.to_string())),
            None => Ok(BodyFraming::Length(0)),
        }
    }

    // === Accessors ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Cómo viene delimitado el body
enum BodyFraming {
    Length(usize),
    Chunked,
}

/// Decodifica un body `Transfer-Encoding: chunked`
///
/// ```text
/// 1a;ext=1\r\n          ← tamaño en hex (las extensiones se ignoran)
/// <26 bytes>\r\n
/// 0\r\n                 ← último chunk
/// Trailer: x\r\n        ← trailers opcionales, se descartan
/// \r\n
/// ```
///
/// `max_body` se aplica al tamaño ya decodificado.
fn read_chunked<R: Read>(reader: R, max_body: usize) -> Result<Vec<u8>, ParseError> {
    let mut reader = BufReader::new(reader);
    let mut body = Vec::new();

    loop {
        let line = read_chunk_line(&mut reader)?;
        let size_field = line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| ParseError::InvalidChunk(line.clone()))?;
        if size == 0 {
            break;
        }

        let total = body.len().saturating_add(size);
        if total > max_body {
            return Err(ParseError::BodyTooLarge { size: total, limit: max_body });
        }

        let start = body.len();
        body.resize(total, 0);
        reader.read_exact(&mut body[start..]).map_err(incomplete_on_eof)?;

        let terminator = read_chunk_line(&mut reader)?;
        if !terminator.is_empty() {
            return Err(ParseError::InvalidChunk(terminator));
        }
    }

    while !read_chunk_line(&mut reader)?.is_empty() {}

    Ok(body)
}

/// Lee una línea terminada en `\r\n` (o `\n`) sin el terminador
fn read_chunk_line<R: BufRead>(reader: &mut R) -> Result<String, ParseError> {
    let mut line = Vec::new();
    let n = reader
        .by_ref()
        .take(MAX_CHUNK_LINE_BYTES as u64)
        .read_until(b'\n', &mut line)?;

    if line.last() != Some(&b'\n') {
        if n >= MAX_CHUNK_LINE_BYTES {
            return Err(ParseError::InvalidChunk("chunk line too long".to_string()));
        }
        return Err(ParseError::IncompleteRequest);
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }

    String::from_utf8(line)
        .map_err(|e| ParseError::InvalidChunk(String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

fn incomplete_on_eof(e: std::io::Error) -> ParseError {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ParseError::IncompleteRequest,
        _ => ParseError::Io(e),
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
