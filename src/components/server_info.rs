use crate::metrics::MetricsSnapshot;
use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

/// Panel "Server Info": versión, uptime, clientes, memoria y cantidad de claves.
#[derive(Debug, Default)]
pub struct ServerInfoPanel {
    /// Última foto recibida; `None` mientras no haya conexión.
    snapshot: Option<MetricsSnapshot>,
}

#[derive(Debug)]
pub enum ServerInfoMsg {
    Update(MetricsSnapshot),
    Reset,
}

impl ServerInfoPanel {
    fn field(&self, value: impl Fn(&MetricsSnapshot) -> String) -> String {
        self.snapshot
            .as_ref()
            .map(value)
            .unwrap_or_else(|| "-".to_string())
    }
}

#[relm4::component(pub)]
impl SimpleComponent for ServerInfoPanel {
    type Init = ();
    type Input = ServerInfoMsg;
    type Output = ();

    view! {
        gtk::Frame {
            set_label: Some("Server Info"),
            add_css_class: "panel",

            #[wrap(Some)]
            set_child = &gtk::Grid {
                set_margin_all: 10,
                set_row_spacing: 4,
                set_column_spacing: 20,

                attach[0, 0, 1, 1] = &gtk::Label {
                    set_label: "Version:",
                    set_xalign: 0.0,
                    add_css_class: "info-name",
                },
                attach[1, 0, 1, 1] = &gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "info-value",
                    #[watch]
                    set_label: &model.field(|s| s.version.clone()),
                },
                attach[0, 1, 1, 1] = &gtk::Label {
                    set_label: "Uptime:",
                    set_xalign: 0.0,
                    add_css_class: "info-name",
                },
                attach[1, 1, 1, 1] = &gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "info-value",
                    #[watch]
                    set_label: &model.field(MetricsSnapshot::uptime_label),
                },
                attach[0, 2, 1, 1] = &gtk::Label {
                    set_label: "Clients:",
                    set_xalign: 0.0,
                    add_css_class: "info-name",
                },
                attach[1, 2, 1, 1] = &gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "info-value",
                    #[watch]
                    set_label: &model.field(|s| s.clients.to_string()),
                },
                attach[0, 3, 1, 1] = &gtk::Label {
                    set_label: "Memory:",
                    set_xalign: 0.0,
                    add_css_class: "info-name",
                },
                attach[1, 3, 1, 1] = &gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "info-value",
                    #[watch]
                    set_label: &model.field(MetricsSnapshot::memory_label),
                },
                attach[0, 4, 1, 1] = &gtk::Label {
                    set_label: "Keys:",
                    set_xalign: 0.0,
                    add_css_class: "info-name",
                },
                attach[1, 4, 1, 1] = &gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "info-value",
                    #[watch]
                    set_label: &model.field(|s| s.total_keys.to_string()),
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        _sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = ServerInfoPanel::default();
        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            ServerInfoMsg::Update(snapshot) => self.snapshot = Some(snapshot),
            ServerInfoMsg::Reset => self.snapshot = None,
        }
    }
}
