use crate::errors::ReguiError;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Foto del estado de la conexión, pensada para mostrarse en la interfaz.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub host: String,
    pub port: u16,
    pub connected: bool,
    /// Último error de conexión, si lo hubo.
    pub error: Option<String>,
}

/// Estado interno compartido entre el hilo de la UI y los hilos de trabajo.
#[derive(Default)]
struct ConnectionState {
    connection: Option<redis::Connection>,
    host: String,
    port: u16,
    error: Option<String>,
}

/// Administrador de la única conexión activa con el servidor Redis.
///
/// Es barato de clonar: todas las copias comparten el mismo estado, de modo
/// que puede moverse a cada hilo de trabajo. El acceso al socket se serializa
/// con un `Mutex`, aunque la interfaz solo lanza una operación por vez.
#[derive(Clone)]
pub struct ConnectionManager {
    state: Arc<Mutex<ConnectionState>>,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectionState::default())),
            connect_timeout,
            command_timeout,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConnectionState>, ReguiError> {
        self.state.lock().map_err(|_| {
            log::error!("No se pudo bloquear el estado de la conexión");
            ReguiError::LockPoisoned
        })
    }

    /// Abre una conexión con `host:port` y verifica que responda a `PING`.
    ///
    /// Es una llamada bloqueante: debe ejecutarse fuera del hilo de la UI.
    /// Si ya había una conexión activa se reemplaza por la nueva.
    ///
    /// # Errores
    /// Retorna `ReguiError::Connection` si el servidor no es alcanzable o no
    /// responde. En ese caso el administrador queda desconectado y el error
    /// queda registrado en `last_error`.
    pub fn connect(&self, host: &str, port: u16) -> Result<(), ReguiError> {
        log::info!("Conectando a {}:{}", host, port);

        let result = self.open(host, port);

        let mut state = self.lock()?;
        state.host = host.to_string();
        state.port = port;

        match result {
            Ok(connection) => {
                state.connection = Some(connection);
                state.error = None;
                log::info!("Conectado a {}:{}", host, port);
                Ok(())
            }
            Err(e) => {
                state.connection = None;
                state.error = Some(e.to_string());
                log::warn!("Error al conectar a {}:{}: {}", host, port, e);
                Err(e)
            }
        }
    }

    fn open(&self, host: &str, port: u16) -> Result<redis::Connection, ReguiError> {
        let connection_error = |source: redis::RedisError| ReguiError::Connection {
            host: host.to_string(),
            port,
            source,
        };

        let client = redis::Client::open(format!("redis://{}:{}/", host, port))
            .map_err(connection_error)?;
        let mut connection = client
            .get_connection_with_timeout(self.connect_timeout)
            .map_err(connection_error)?;

        connection
            .set_read_timeout(Some(self.command_timeout))
            .map_err(connection_error)?;
        connection
            .set_write_timeout(Some(self.command_timeout))
            .map_err(connection_error)?;

        redis::cmd("PING")
            .query::<String>(&mut connection)
            .map_err(connection_error)?;

        Ok(connection)
    }

    /// Libera la conexión activa. No hace nada si no había una.
    pub fn disconnect(&self) {
        match self.lock() {
            Ok(mut state) => {
                if state.connection.take().is_some() {
                    log::info!("Desconectado de {}:{}", state.host, state.port);
                }
                state.error = None;
            }
            Err(e) => log::error!("No se pudo liberar la conexión: {}", e),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.lock()
            .map(|state| state.connection.is_some())
            .unwrap_or(false)
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().ok().and_then(|state| state.error.clone())
    }

    pub fn status(&self) -> ConnectionStatus {
        match self.lock() {
            Ok(state) => ConnectionStatus {
                host: state.host.clone(),
                port: state.port,
                connected: state.connection.is_some(),
                error: state.error.clone(),
            },
            Err(e) => ConnectionStatus {
                error: Some(e.to_string()),
                ..ConnectionStatus::default()
            },
        }
    }

    /// Ejecuta `f` con la conexión activa.
    ///
    /// Si `f` falla por un error de red la conexión se descarta y el
    /// administrador pasa a estar desconectado; los demás errores no
    /// afectan el estado.
    ///
    /// # Errores
    /// `ReguiError::NotConnected` si no hay conexión, o el error que devuelva `f`.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, ReguiError>
    where
        F: FnOnce(&mut redis::Connection) -> Result<T, ReguiError>,
    {
        let mut state = self.lock()?;
        let connection = state.connection.as_mut().ok_or(ReguiError::NotConnected)?;

        let result = f(connection);
        if let Err(e) = &result {
            if e.is_connection_lost() {
                log::warn!(
                    "Se perdió la conexión con {}:{}: {}",
                    state.host,
                    state.port,
                    e
                );
                state.connection = None;
                state.error = Some(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// Devuelve un puerto local en el que no escucha nadie.
    fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn manager() -> ConnectionManager {
        ConnectionManager::new(Duration::from_secs(2), Duration::from_secs(2))
    }

    #[test]
    fn test_starts_disconnected() {
        let manager = manager();
        assert!(!manager.is_connected());
        assert_eq!(manager.status(), ConnectionStatus::default());
        assert!(matches!(
            manager.with_connection(|_| Ok(())),
            Err(ReguiError::NotConnected)
        ));
    }

    #[test]
    fn test_connect_to_unreachable_server_records_error() {
        let manager = manager();
        let port = unused_port();

        let result = manager.connect("127.0.0.1", port);

        assert!(matches!(result, Err(ReguiError::Connection { .. })));
        assert!(!manager.is_connected());

        let status = manager.status();
        assert_eq!(status.host, "127.0.0.1");
        assert_eq!(status.port, port);
        assert!(!status.connected);
        assert!(!status.error.unwrap_or_default().is_empty());
        assert!(manager.last_error().is_some());
    }

    #[test]
    fn test_disconnect_clears_error() {
        let manager = manager();
        let _ = manager.connect("127.0.0.1", unused_port());

        manager.disconnect();

        assert!(!manager.is_connected());
        assert!(manager.last_error().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let manager = manager();
        let clone = manager.clone();
        let _ = clone.connect("127.0.0.1", unused_port());
        assert!(manager.last_error().is_some());
    }
}
