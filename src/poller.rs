use std::ops::ControlFlow;
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Hilo que ejecuta una tarea a intervalos fijos hasta que se lo detiene.
///
/// La primera ejecución ocurre apenas arranca. Entre ejecuciones el hilo
/// espera en un canal de parada, por lo que `stop` lo despierta sin esperar
/// al próximo ciclo. `stop` nunca bloquea a quien lo llama: si el hilo está
/// en medio de una consulta, termina al completarla.
pub struct MetricsPoller {
    stop_sender: Option<Sender<()>>,
}

impl MetricsPoller {
    /// Lanza el hilo de consulta.
    ///
    /// `tick` decide si el ciclo continúa: devolver `ControlFlow::Break`
    /// termina el hilo (por ejemplo, cuando se perdió la conexión).
    ///
    /// # Errores
    /// Retorna el error del sistema operativo si no se pudo crear el hilo.
    pub fn start<F>(interval: Duration, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (stop_sender, stop_receiver) = channel::<()>();

        thread::Builder::new()
            .name("regui-metrics".to_string())
            .spawn(move || {
                log::debug!("Consulta de métricas iniciada cada {:?}", interval);
                loop {
                    if tick().is_break() {
                        break;
                    }
                    match stop_receiver.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Consulta de métricas detenida");
            })?;

        Ok(Self {
            stop_sender: Some(stop_sender),
        })
    }

    pub fn stop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            // si el hilo ya terminó el envío falla, y da lo mismo
            let _ = sender.send(());
        }
    }
}

impl Drop for MetricsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_ticks_immediately_and_repeatedly() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let _poller = MetricsPoller::start(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        assert!(wait_until(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 3));
    }

    #[test]
    fn test_stop_halts_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let mut poller = MetricsPoller::start(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        assert!(wait_until(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 1));
        poller.stop();
        thread::sleep(Duration::from_millis(50));

        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_break_ends_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let _poller = MetricsPoller::start(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Break(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let poller = MetricsPoller::start(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert!(wait_until(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 1));

        drop(poller);
        thread::sleep(Duration::from_millis(50));
        let after_drop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    }
}
