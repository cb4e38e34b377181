use std::io;
use thiserror::Error;

/// Errores que pueden producirse al operar contra el servidor Redis o al
/// preparar una operación desde la interfaz.
#[derive(Debug, Error)]
pub enum ReguiError {
    /// Se intentó ejecutar un comando sin una conexión activa.
    #[error("not connected to a Redis server")]
    NotConnected,

    /// Falló la apertura de la conexión o el PING inicial.
    #[error("could not connect to {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: redis::RedisError,
    },

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("key '{0}' does not exist")]
    KeyNotFound(String),

    #[error("unsupported key type '{0}'")]
    UnsupportedType(String),

    /// Datos ingresados por el usuario que no pueden convertirse en un comando.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("connection state lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReguiError {
    /// Indica si el error implica que el socket con el servidor ya no sirve
    /// (conexión caída, rechazada o sin respuesta dentro del timeout).
    pub fn is_connection_lost(&self) -> bool {
        match self {
            ReguiError::Connection { .. } => true,
            ReguiError::Redis(e) => {
                e.is_io_error()
                    || e.is_connection_dropped()
                    || e.is_connection_refusal()
                    || e.is_timeout()
            }
            _ => false,
        }
    }
}
