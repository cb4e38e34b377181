use crate::errors::ReguiError;
use std::thread;

/// Ejecuta `job` en un hilo propio y entrega su resultado con `deliver`.
///
/// Es la forma en que la interfaz saca de su hilo las llamadas bloqueantes
/// contra el servidor: `deliver` normalmente envía un mensaje al componente
/// que originó la operación.
///
/// # Errores
/// Retorna `ReguiError::Io` si el sistema operativo no pudo crear el hilo.
pub fn spawn_job<T, F, D>(name: &str, job: F, deliver: D) -> Result<(), ReguiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
    D: FnOnce(T) + Send + 'static,
{
    let thread_name = format!("regui-{}", name);
    log::debug!("Lanzando {}", thread_name);

    thread::Builder::new().name(thread_name).spawn(move || {
        let result = job();
        deliver(result);
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionManager;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_result_is_delivered() {
        let (tx, rx) = channel();

        spawn_job("sum", || 2 + 2, move |result| tx.send(result).unwrap()).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 4);
    }

    #[test]
    fn test_job_runs_on_a_named_thread() {
        let (tx, rx) = channel();

        spawn_job(
            "name-check",
            || thread::current().name().map(str::to_string),
            move |name| tx.send(name).unwrap(),
        )
        .unwrap();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
            Some("regui-name-check")
        );
    }

    #[test]
    fn test_connection_is_released_from_a_worker() {
        let manager = ConnectionManager::new(Duration::from_secs(1), Duration::from_secs(1));
        let released = manager.clone();
        let (tx, rx) = channel();

        spawn_job(
            "disconnect",
            move || released.disconnect(),
            move |()| tx.send(thread::current().name().map(str::to_string)).unwrap(),
        )
        .unwrap();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
            Some("regui-disconnect")
        );
        assert!(!manager.is_connected());
        assert_eq!(manager.last_error(), None);
    }

    #[test]
    fn test_errors_travel_as_values() {
        let (tx, rx) = channel();

        spawn_job(
            "failing",
            || -> Result<(), ReguiError> { Err(ReguiError::NotConnected) },
            move |result| tx.send(result).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Err(ReguiError::NotConnected)
        ));
    }
}
