/// Módulo de errores.
///
/// Define `ReguiError`, el tipo de error común a todas las operaciones
/// contra el servidor y a la validación de datos ingresados por el usuario.
pub mod errors;

/// Módulo de configuración.
///
/// Define `AppConfig`, que se arma a partir de valores por defecto, el
/// archivo `regui.conf` y las variables de entorno `REGUI_*`.
pub mod config;

/// Tipos de clave (`KeyType`) y filas del navegador (`KeyEntry`).
pub mod types;

/// Módulo de valores.
///
/// Define `KeyValue`, el valor completo de una clave, junto con su
/// representación textual y la interpretación del texto ingresado en el
/// formulario de escritura.
pub mod value;

/// Módulo de conexión.
///
/// Define `ConnectionManager`, que mantiene la única conexión activa con el
/// servidor y la comparte entre los hilos de trabajo.
pub mod connection;

/// Operaciones sobre claves: listado con filtro, lectura, escritura y borrado.
pub mod key_browser;

/// Módulo de métricas.
///
/// Interpreta la salida de `INFO` y calcula las métricas derivadas
/// (comandos por segundo, hit rate) que muestra la interfaz.
pub mod metrics;

/// Hilo de consulta periódica de métricas.
pub mod poller;

/// Ejecución de operaciones bloqueantes fuera del hilo de la UI.
pub mod worker;

/// Módulo de componentes UI.
///
/// Contiene los componentes visuales de la aplicación: encabezado, paneles de
/// información y métricas, navegador de claves, panel de operaciones, barra
/// de estado y modales.
pub mod components;

/// Módulo principal de la aplicación.
///
/// Define la estructura y lógica principal de la app, incluyendo los controladores
/// de componentes UI y la comunicación mediante mensajes.
///
/// # Componentes principales
/// - `AppModel`: modelo principal que contiene controladores de componentes.
/// - `AppMsg`: enum de mensajes para controlar interacciones y eventos.
pub mod app;
