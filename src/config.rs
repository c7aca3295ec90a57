//! # Configuración del Consumidor
//! src/config.rs
//!
//! Configuración del consumidor de tareas con soporte para argumentos CLI
//! y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./task_consumer --port 9000 \
//!   --mode literal \
//!   --read-timeout-ms 30000 \
//!   --write-timeout-ms 5000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! CONSUMER_PORT=9000 CONSUMER_MODE=hardened ./task_consumer
//! ```

use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;

/// Modo de operación del consumidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Comportamiento histórico: canal compartido, body inválido = proceso abortado,
    /// sin drenado al apagar
    Literal,

    /// Canal privado por tarea, 400 ante body inválido, drenado con deadline
    Hardened,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Literal => "literal",
            Mode::Hardened => "hardened",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valores de configuración inválidos
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be > 0")]
    Zero(&'static str),
}

/// Configuración del consumidor de tareas
#[derive(Debug, Clone, Parser)]
#[command(name = "task_consumer")]
#[command(about = "Recibe tareas por HTTP y las despacha a dispatchers concurrentes")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "CONSUMER_HOST")]
    pub host: String,

    /// Puerto en el que escucha el consumidor
    #[arg(short, long, default_value = "9000", env = "CONSUMER_PORT")]
    pub port: u16,

    // === Timeouts de conexión ===
    /// Timeout de lectura por conexión en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "CONSUMER_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura por conexión en milisegundos
    #[arg(long = "write-timeout-ms", default_value = "5000", env = "CONSUMER_WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Despacho ===
    /// Modo de operación
    #[arg(long, value_enum, default_value = "hardened", env = "CONSUMER_MODE")]
    pub mode: Mode,

    /// Duración de una unidad de trabajo simulado en milisegundos
    #[arg(long = "time-unit-ms", default_value = "1000", env = "CONSUMER_TIME_UNIT_MS")]
    pub time_unit_ms: u64,

    /// Tiempo máximo de espera por dispatchers en vuelo al apagar (solo hardened)
    #[arg(long = "drain-timeout-ms", default_value = "20000", env = "CONSUMER_DRAIN_TIMEOUT_MS")]
    pub drain_timeout_ms: u64,

    /// Tamaño máximo aceptado para el body de una tarea
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "CONSUMER_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use task_consumer::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:9000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Zero("read timeout"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Zero("write timeout"));
        }
        if self.time_unit_ms == 0 {
            return Err(ConfigError::Zero("time unit"));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Zero("max body bytes"));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración efectiva
    pub fn log_summary(&self) {
        tracing::info!(
            address = %self.address(),
            mode = %self.mode,
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            "network settings"
        );
        tracing::info!(
            time_unit_ms = self.time_unit_ms,
            drain_timeout_ms = self.drain_timeout_ms,
            max_body_bytes = self.max_body_bytes,
            "dispatch settings"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5_000,
            mode: Mode::Hardened,
            time_unit_ms: 1_000,
            drain_timeout_ms: 20_000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.mode, Mode::Hardened);
    }

    #[test]
    fn test_default_timeouts() {
        let config = Config::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.write_timeout(), Duration::from_secs(5));
        assert_eq!(config.time_unit(), Duration::from_secs(1));
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_zero_read_timeout() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::Zero("read timeout")));
    }

    #[test]
    fn test_validate_zero_write_timeout() {
        let mut config = Config::default();
        config.write_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("write timeout"));
    }

    #[test]
    fn test_validate_zero_time_unit() {
        let mut config = Config::default();
        config.time_unit_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_drain_is_allowed() {
        let mut config = Config::default();
        config.drain_timeout_ms = 0;
        assert!(config.validate().is_ok());
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::try_parse_from([
            "task_consumer",
            "--port",
            "9100",
            "--mode",
            "literal",
            "--time-unit-ms",
            "10",
        ])
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.mode, Mode::Literal);
        assert_eq!(config.time_unit_ms, 10);
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Config::try_parse_from(["task_consumer", "--mode", "turbo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Literal.to_string(), "literal");
        assert_eq!(Mode::Hardened.to_string(), "hardened");
    }
}
