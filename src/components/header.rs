use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

/// Barra superior de la ventana. Contiene el formulario de conexión
/// (host, puerto y botón Connect/Disconnect) y el indicador de estado.
#[derive(Debug)]
pub struct HeaderModel {
    /// Host ingresado por el usuario.
    host: String,
    /// Puerto ingresado por el usuario, todavía sin validar.
    port: String,
    /// Indica si hay una conexión activa.
    is_connected: bool,
    /// Indica si hay un intento de conexión en curso.
    is_connecting: bool,
}

/// Mensajes que puede recibir el componente `HeaderModel`.
#[derive(Debug)]
pub enum HeaderMsg {
    SetHost(String),
    SetPort(String),
    /// El usuario apretó el botón de conexión.
    ToggleConnection,
    /// Mensaje para establecer el estado de conexión.
    SetConnectionStatus(bool),
}

/// Salidas posibles del componente `HeaderModel`.
#[derive(Debug)]
pub enum HeaderOutput {
    /// Solicita conectar al host y puerto indicados.
    ConnectRequested(String, String),
    DisconnectRequested,
}

impl HeaderModel {
    fn button_label(&self) -> &'static str {
        if self.is_connecting {
            "Connecting..."
        } else if self.is_connected {
            "Disconnect"
        } else {
            "Connect"
        }
    }

    fn status_label(&self) -> &'static str {
        if self.is_connected {
            "● Connected"
        } else {
            "● Disconnected"
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for HeaderModel {
    /// Host y puerto con los que se completa el formulario.
    type Init = (String, u16);
    type Input = HeaderMsg;
    type Output = HeaderOutput;

    view! {
        #[name="header"]
        gtk::HeaderBar {
            set_show_title_buttons: true,

            pack_start = &gtk::Box {
                set_spacing: 5,
                add_css_class: "connection-form",

                gtk::Label {
                    set_label: "Host:",
                },
                gtk::Entry {
                    set_text: &model.host,
                    set_width_chars: 12,
                    #[watch]
                    set_sensitive: !model.is_connected && !model.is_connecting,
                    connect_changed[sender] => move |entry| {
                        sender.input(HeaderMsg::SetHost(entry.text().to_string()));
                    },
                    connect_activate => HeaderMsg::ToggleConnection,
                },
                gtk::Label {
                    set_label: "Port:",
                    set_margin_start: 5,
                },
                gtk::Entry {
                    set_text: &model.port,
                    set_width_chars: 6,
                    #[watch]
                    set_sensitive: !model.is_connected && !model.is_connecting,
                    connect_changed[sender] => move |entry| {
                        sender.input(HeaderMsg::SetPort(entry.text().to_string()));
                    },
                    connect_activate => HeaderMsg::ToggleConnection,
                },
                gtk::Button {
                    add_css_class: "button",
                    set_margin_start: 10,
                    #[watch]
                    set_label: model.button_label(),
                    #[watch]
                    set_sensitive: !model.is_connecting,
                    #[watch]
                    set_class_active: ("connect", !model.is_connected),
                    #[watch]
                    set_class_active: ("disconnect", model.is_connected),
                    connect_clicked => HeaderMsg::ToggleConnection,
                },
            },

            #[wrap(Some)]
            set_title_widget = &gtk::Label {
                set_label: "RegUI - Modern Redis Manager",
                add_css_class: "title",
            },

            pack_end = &gtk::Label {
                add_css_class: "connection-status",
                #[watch]
                set_label: model.status_label(),
                #[watch]
                set_class_active: ("connected", model.is_connected),
            },
        },
    }

    fn init(
        (host, port): Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = HeaderModel {
            host,
            port: port.to_string(),
            is_connected: false,
            is_connecting: false,
        };

        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            HeaderMsg::SetHost(host) => self.host = host,
            HeaderMsg::SetPort(port) => self.port = port,
            HeaderMsg::ToggleConnection => {
                if self.is_connecting {
                    return;
                }
                let output = if self.is_connected {
                    HeaderOutput::DisconnectRequested
                } else {
                    self.is_connecting = true;
                    HeaderOutput::ConnectRequested(
                        self.host.trim().to_string(),
                        self.port.trim().to_string(),
                    )
                };
                if sender.output(output).is_err() {
                    log::warn!("No se pudo enviar la solicitud de conexión");
                }
            }
            HeaderMsg::SetConnectionStatus(status) => {
                self.is_connected = status;
                self.is_connecting = false;
            }
        }
    }
}
