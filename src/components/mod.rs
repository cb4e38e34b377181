/// Módulo que maneja el encabezado de la aplicación.
///
/// Define el componente `HeaderModel`, con el formulario de conexión (host,
/// puerto y botón Connect/Disconnect) y el indicador de estado de la conexión.
pub mod header;

/// Panel "Server Info": versión, uptime, clientes, memoria y cantidad de claves.
pub mod server_info;

/// Panel de métricas en tiempo real: comandos por segundo, hit rate y memoria.
pub mod metrics_panel;

/// Módulo del navegador de claves.
///
/// Define el componente `KeysBrowser`, que muestra las claves del servidor con
/// su tipo, TTL y tamaño, permite filtrarlas y seleccionar una para ver su valor.
pub mod keys_browser;

/// Módulo del panel de operaciones.
///
/// Define el componente `OperationsPanel`, que muestra el valor de la clave
/// seleccionada y permite escribir o borrar claves. También define
/// `WriteRequest`, la escritura ya validada que se envía al componente principal.
pub mod operations;

/// Barra de estado con el último mensaje y un reloj.
pub mod status_bar;

/// Modal para mostrar errores al usuario.
pub mod error_modal;

/// Modal de confirmación previo al borrado de una clave.
pub mod confirm_modal;
