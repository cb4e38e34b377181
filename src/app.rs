use crate::components::{
    confirm_modal::{ConfirmModal, ConfirmModalMsg, ConfirmModalOutput},
    error_modal::{ErrorModal, ErrorModalMsg},
    header::{HeaderModel, HeaderMsg, HeaderOutput},
    keys_browser::{KeysBrowser, KeysBrowserMsg, KeysBrowserOutput},
    metrics_panel::{MetricsPanel, MetricsPanelMsg},
    operations::{OperationsMsg, OperationsOutput, OperationsPanel, WriteRequest},
    server_info::{ServerInfoMsg, ServerInfoPanel},
    status_bar::{StatusBar, StatusBarMsg},
};
use crate::config::{parse_port, AppConfig};
use crate::connection::ConnectionManager;
use crate::errors::ReguiError;
use crate::key_browser;
use crate::metrics::{self, MetricsSampler, MetricsSnapshot};
use crate::poller::MetricsPoller;
use crate::types::KeyEntry;
use crate::value::KeyValue;
use crate::worker;
use gtk4::CssProvider;
use relm4::gtk::glib::Propagation;
use relm4::gtk::prelude::*;
use relm4::{
    gtk, Component, ComponentController, ComponentParts, ComponentSender, Controller,
    RelmWidgetExt, SimpleComponent,
};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Modelo principal de la aplicación: contiene los controladores de cada
/// panel y el estado de la conexión.
///
/// Todas las operaciones contra el servidor se ejecutan en hilos de trabajo;
/// sus resultados vuelven como mensajes `AppMsg` y se aplican en el hilo de la UI.
///
/// # Campos
/// - `manager`: conexión compartida con los hilos de trabajo
/// - `poller`: hilo de métricas, presente solo mientras hay conexión
/// - `connected`: copia del estado de la conexión para no bloquear la UI
/// - `selected_key`: clave cuyo valor se muestra en el panel de operaciones
pub struct AppModel {
    header: Controller<HeaderModel>,
    server_info: Controller<ServerInfoPanel>,
    metrics: Controller<MetricsPanel>,
    keys_browser: Controller<KeysBrowser>,
    operations: Controller<OperationsPanel>,
    status_bar: Controller<StatusBar>,
    error_modal: Controller<ErrorModal>,
    confirm_modal: Controller<ConfirmModal>,
    manager: ConnectionManager,
    poller: Option<MetricsPoller>,
    poll_interval: Duration,
    connected: bool,
    selected_key: Option<String>,
}

#[derive(Debug)]
pub enum AppMsg {
    /// Conectar al host y puerto ingresados (el puerto todavía sin validar).
    Connect(String, String),
    ConnectFinished(Result<(), ReguiError>),
    Disconnect,
    /// Listar claves con el filtro indicado.
    RefreshKeys(String),
    KeysLoaded(Result<Vec<KeyEntry>, ReguiError>),
    SelectKey(String),
    ValueLoaded(String, Result<KeyValue, ReguiError>),
    WriteKey(WriteRequest),
    KeyWritten(String, Result<(), ReguiError>),
    InvalidInput(String),
    /// Pide confirmación antes de borrar.
    DeleteRequested(String),
    DeleteConfirmed(String),
    KeyDeleted(String, Result<bool, ReguiError>),
    MetricsUpdated(MetricsSnapshot),
    MetricsFailed(String),
    ConnectionLost(String),
    Close,
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppConfig;
    type Input = AppMsg;
    type Output = ();

    view! {
        gtk::Window {
            set_title: Some("RegUI - Modern Redis Manager"),
            set_default_size: (1200, 800),
            add_css_class: "main-window",

            #[wrap(Some)]
            set_titlebar = model.header.widget(),

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 10,
                    set_margin_all: 10,
                    set_hexpand: true,
                    set_vexpand: true,

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 10,
                        set_width_request: 300,

                        append: model.server_info.widget(),
                        append: model.metrics.widget(),
                    },

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 10,
                        set_hexpand: true,

                        append: model.keys_browser.widget(),
                        append: model.operations.widget(),
                    },
                },

                append: model.status_bar.widget(),
            },
        }
    }

    fn init(
        config: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        load_css();

        let error_modal = ErrorModal::builder()
            .transient_for(&root)
            .launch(())
            .detach();

        let confirm_modal = ConfirmModal::builder()
            .transient_for(&root)
            .launch(())
            .forward(sender.input_sender(), |output| match output {
                ConfirmModalOutput::Confirmed(key) => AppMsg::DeleteConfirmed(key),
            });

        let header = HeaderModel::builder()
            .launch((config.host.clone(), config.port))
            .forward(sender.input_sender(), |output| match output {
                HeaderOutput::ConnectRequested(host, port) => AppMsg::Connect(host, port),
                HeaderOutput::DisconnectRequested => AppMsg::Disconnect,
            });

        let keys_browser = KeysBrowser::builder().launch(()).forward(
            sender.input_sender(),
            |output| match output {
                KeysBrowserOutput::KeySelected(key) => AppMsg::SelectKey(key),
                KeysBrowserOutput::RefreshRequested(filter) => AppMsg::RefreshKeys(filter),
            },
        );

        let operations = OperationsPanel::builder().launch(()).forward(
            sender.input_sender(),
            |output| match output {
                OperationsOutput::SetRequested(request) => AppMsg::WriteKey(request),
                OperationsOutput::DeleteRequested(key) => AppMsg::DeleteRequested(key),
                OperationsOutput::InvalidInput(message) => AppMsg::InvalidInput(message),
            },
        );

        let model = AppModel {
            header,
            server_info: ServerInfoPanel::builder().launch(()).detach(),
            metrics: MetricsPanel::builder().launch(()).detach(),
            keys_browser,
            operations,
            status_bar: StatusBar::builder()
                .launch("Ready - Connect to a Redis server".to_string())
                .detach(),
            error_modal,
            confirm_modal,
            manager: ConnectionManager::new(config.connect_timeout, config.command_timeout),
            poller: None,
            poll_interval: config.poll_interval,
            connected: false,
            selected_key: None,
        };

        let close_sender = sender.clone();
        root.connect_close_request(move |_| {
            close_sender.input(AppMsg::Close);
            Propagation::Proceed
        });

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            AppMsg::Connect(host, port) => {
                let port = match parse_port(&port) {
                    Ok(port) if !host.is_empty() => port,
                    Ok(_) => {
                        self.connect_failed(ReguiError::InvalidInput(
                            "host cannot be empty".to_string(),
                        ));
                        return;
                    }
                    Err(e) => {
                        self.connect_failed(e);
                        return;
                    }
                };

                self.set_status("Connecting...");
                self.dispatch(
                    &sender,
                    "connect",
                    move |manager| manager.connect(&host, port),
                    AppMsg::ConnectFinished,
                );
            }
            AppMsg::ConnectFinished(Ok(())) => {
                self.connected = true;
                self.header.emit(HeaderMsg::SetConnectionStatus(true));
                self.set_status("Connected to Redis server");
                self.start_polling(&sender);
                self.keys_browser.emit(KeysBrowserMsg::Refresh);
            }
            AppMsg::ConnectFinished(Err(e)) => self.connect_failed(e),
            AppMsg::Disconnect => {
                self.stop_polling();
                self.release_connection();
                self.reset_view();
                self.set_status("Disconnected from Redis server");
            }
            AppMsg::RefreshKeys(filter) => {
                if !self.require_connection() {
                    return;
                }
                self.set_status("Loading keys...");
                self.dispatch(
                    &sender,
                    "list-keys",
                    move |manager| {
                        manager.with_connection(|conn| key_browser::list_keys(conn, &filter))
                    },
                    AppMsg::KeysLoaded,
                );
            }
            AppMsg::KeysLoaded(Ok(keys)) => {
                if !self.connected {
                    return;
                }
                self.set_status(&format!("Loaded {} keys", keys.len()));
                if let Some(selected) = &self.selected_key {
                    if !keys.iter().any(|entry| &entry.name == selected) {
                        self.selected_key = None;
                        self.operations.emit(OperationsMsg::Clear);
                    }
                }
                self.keys_browser.emit(KeysBrowserMsg::SetKeys(keys));
            }
            AppMsg::KeysLoaded(Err(e)) => self.operation_failed("Load keys", e),
            AppMsg::SelectKey(key) => {
                if !self.require_connection() {
                    return;
                }
                self.selected_key = Some(key.clone());
                self.operations.emit(OperationsMsg::Loading(key.clone()));
                self.load_value(&sender, key);
            }
            AppMsg::ValueLoaded(key, result) => {
                if self.selected_key.as_deref() != Some(key.as_str()) {
                    return;
                }
                match result {
                    Ok(value) => self.operations.emit(OperationsMsg::ShowValue(key, value)),
                    Err(e) => {
                        self.operations
                            .emit(OperationsMsg::ShowText(key, format!("Error: {}", e)));
                        self.operation_failed("Get value", e);
                    }
                }
            }
            AppMsg::WriteKey(request) => {
                if !self.require_connection() {
                    return;
                }
                let key = request.key.clone();
                self.dispatch(
                    &sender,
                    "set-value",
                    move |manager| {
                        manager.with_connection(|conn| {
                            key_browser::set_value(conn, &request.key, &request.value, request.ttl)
                        })
                    },
                    move |result| AppMsg::KeyWritten(key, result),
                );
            }
            AppMsg::KeyWritten(key, Ok(())) => {
                self.set_status(&format!("Set key '{}' successfully", key));
                self.operations.emit(OperationsMsg::WriteDone);
                self.keys_browser.emit(KeysBrowserMsg::Refresh);
                if self.selected_key.as_deref() == Some(key.as_str()) {
                    self.load_value(&sender, key);
                }
            }
            AppMsg::KeyWritten(key, Err(e)) => {
                self.operation_failed(&format!("Set key '{}'", key), e)
            }
            AppMsg::InvalidInput(message) => {
                self.set_status(&message);
                self.error_modal.emit(ErrorModalMsg::Show {
                    title: "Invalid Input".to_string(),
                    message,
                });
            }
            AppMsg::DeleteRequested(key) => {
                if self.require_connection() {
                    self.confirm_modal.emit(ConfirmModalMsg::Ask(key));
                }
            }
            AppMsg::DeleteConfirmed(key) => {
                if !self.require_connection() {
                    return;
                }
                let target = key.clone();
                self.dispatch(
                    &sender,
                    "delete-key",
                    move |manager| {
                        manager.with_connection(|conn| key_browser::delete_key(conn, &target))
                    },
                    move |result| AppMsg::KeyDeleted(key, result),
                );
            }
            AppMsg::KeyDeleted(key, Ok(existed)) => {
                if existed {
                    self.set_status(&format!("Deleted key '{}' successfully", key));
                } else {
                    self.set_status(&format!("Key '{}' no longer exists", key));
                }
                if self.selected_key.as_deref() == Some(key.as_str()) {
                    self.selected_key = None;
                    self.operations.emit(OperationsMsg::Clear);
                }
                self.keys_browser.emit(KeysBrowserMsg::Refresh);
            }
            AppMsg::KeyDeleted(key, Err(e)) => {
                self.operation_failed(&format!("Delete key '{}'", key), e)
            }
            AppMsg::MetricsUpdated(snapshot) => {
                if !self.connected {
                    return;
                }
                self.metrics.emit(MetricsPanelMsg::Update(snapshot.clone()));
                self.server_info.emit(ServerInfoMsg::Update(snapshot));
            }
            AppMsg::MetricsFailed(message) => {
                log::warn!("No se pudieron leer las métricas: {}", message);
                self.set_status(&format!("Metrics unavailable: {}", message));
            }
            AppMsg::ConnectionLost(message) => self.connection_lost(message),
            AppMsg::Close => {
                self.stop_polling();
                self.release_connection();
                log::info!("Aplicación cerrada");
            }
        }
    }
}

impl AppModel {
    /// Ejecuta `job` en un hilo de trabajo y convierte su resultado en un
    /// mensaje para este componente.
    fn dispatch<T, J, M>(&self, sender: &ComponentSender<Self>, name: &str, job: J, to_msg: M)
    where
        T: Send + 'static,
        J: FnOnce(&ConnectionManager) -> T + Send + 'static,
        M: FnOnce(T) -> AppMsg + Send + 'static,
    {
        let manager = self.manager.clone();
        let input = sender.input_sender().clone();

        if let Err(e) = worker::spawn_job(
            name,
            move || job(&manager),
            move |result| input.emit(to_msg(result)),
        ) {
            log::error!("No se pudo lanzar la tarea {}: {}", name, e);
            self.set_status(&format!("Internal error: {}", e));
        }
    }

    /// Libera la conexión en segundo plano: el socket puede estar ocupado
    /// por otra tarea hasta que venza su timeout.
    fn release_connection(&self) {
        let manager = self.manager.clone();
        if let Err(e) = worker::spawn_job("disconnect", move || manager.disconnect(), |()| ()) {
            log::error!("No se pudo lanzar la desconexión: {}", e);
        }
    }

    fn load_value(&self, sender: &ComponentSender<Self>, key: String) {
        let target = key.clone();
        self.dispatch(
            sender,
            "get-value",
            move |manager| manager.with_connection(|conn| key_browser::get_value(conn, &target)),
            move |result| AppMsg::ValueLoaded(key, result),
        );
    }

    fn start_polling(&mut self, sender: &ComponentSender<Self>) {
        self.stop_polling();

        let manager = self.manager.clone();
        let input = sender.input_sender().clone();
        let mut sampler = MetricsSampler::new();

        let tick = move || match manager.with_connection(|conn| metrics::fetch_info(conn)) {
            Ok(info) => {
                input.emit(AppMsg::MetricsUpdated(sampler.sample(&info, Instant::now())));
                ControlFlow::Continue(())
            }
            Err(ReguiError::NotConnected) => ControlFlow::Break(()),
            Err(e) if e.is_connection_lost() => {
                input.emit(AppMsg::ConnectionLost(e.to_string()));
                ControlFlow::Break(())
            }
            Err(e) => {
                input.emit(AppMsg::MetricsFailed(e.to_string()));
                ControlFlow::Continue(())
            }
        };

        match MetricsPoller::start(self.poll_interval, tick) {
            Ok(poller) => self.poller = Some(poller),
            Err(e) => {
                log::error!("No se pudo iniciar la consulta de métricas: {}", e);
                self.set_status(&format!("Metrics unavailable: {}", e));
            }
        }
    }

    fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
    }

    fn set_status(&self, status: &str) {
        self.status_bar
            .emit(StatusBarMsg::SetStatus(status.to_string()));
    }

    fn require_connection(&self) -> bool {
        if !self.connected {
            self.set_status("Please connect to Redis first");
        }
        self.connected
    }

    /// Vuelve los paneles al estado inicial, sin conexión.
    fn reset_view(&mut self) {
        self.connected = false;
        self.selected_key = None;
        self.header.emit(HeaderMsg::SetConnectionStatus(false));
        self.server_info.emit(ServerInfoMsg::Reset);
        self.metrics.emit(MetricsPanelMsg::Reset);
        self.keys_browser.emit(KeysBrowserMsg::Clear);
        self.operations.emit(OperationsMsg::Clear);
    }

    fn connect_failed(&mut self, e: ReguiError) {
        log::warn!("Falló la conexión: {}", e);
        self.header.emit(HeaderMsg::SetConnectionStatus(false));
        self.set_status(&format!("Connection failed: {}", e));
        self.error_modal.emit(ErrorModalMsg::Show {
            title: "Connection Failed".to_string(),
            message: format!("Could not connect to Redis: {}", e),
        });
    }

    fn connection_lost(&mut self, message: String) {
        if !self.connected {
            return;
        }
        log::warn!("Conexión perdida: {}", message);
        self.stop_polling();
        self.reset_view();
        self.set_status(&format!("Connection lost: {}", message));
        self.error_modal.emit(ErrorModalMsg::Show {
            title: "Connection Lost".to_string(),
            message,
        });
    }

    fn operation_failed(&mut self, action: &str, e: ReguiError) {
        if matches!(e, ReguiError::NotConnected) || e.is_connection_lost() {
            self.connection_lost(e.to_string());
            return;
        }
        log::warn!("{} falló: {}", action, e);
        self.set_status(&format!("{} failed: {}", action, e));
        self.error_modal.emit(ErrorModalMsg::Show {
            title: "Error".to_string(),
            message: format!("{} failed: {}", action, e),
        });
    }
}

fn load_css() {
    let css_provider = CssProvider::new();
    css_provider.load_from_data(include_str!("../assets/app.css"));

    match gdk4::Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &css_provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => log::warn!("No hay display por defecto; se usa el tema del sistema"),
    }
}
