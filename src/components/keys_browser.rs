use crate::key_browser::{filter_keys, server_filter};
use crate::types::KeyEntry;
use relm4::factory::{DynamicIndex, FactoryComponent, FactorySender, FactoryVecDeque};
use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

/// Fila de la lista de claves: nombre, tipo, TTL y tamaño.
#[derive(Debug)]
struct KeyRow {
    entry: KeyEntry,
}

#[relm4::factory]
impl FactoryComponent for KeyRow {
    type Init = KeyEntry;
    type Input = ();
    type Output = KeysBrowserMsg;
    type CommandOutput = ();
    type ParentWidget = gtk::Box;

    view! {
        gtk::Button {
            add_css_class: "key-row",
            connect_clicked[sender, name = self.entry.name.clone()] => move |_| {
                if sender.output(KeysBrowserMsg::Select(name.clone())).is_err() {
                    log::warn!("No se pudo notificar la selección de {}", name);
                }
            },

            #[wrap(Some)]
            set_child = &gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 10,

                gtk::Label {
                    set_label: &self.entry.name,
                    set_hexpand: true,
                    set_xalign: 0.0,
                    set_ellipsize: gtk::pango::EllipsizeMode::End,
                },
                gtk::Label {
                    set_label: self.entry.key_type.as_str(),
                    set_width_chars: 8,
                    set_xalign: 0.0,
                    add_css_class: "key-type",
                    add_css_class: self.entry.key_type.as_str(),
                },
                gtk::Label {
                    set_label: &self.entry.ttl_label(),
                    set_width_chars: 8,
                    set_xalign: 0.0,
                },
                gtk::Label {
                    set_label: &self.entry.size_label(),
                    set_width_chars: 8,
                    set_xalign: 0.0,
                },
            },
        }
    }

    fn init_model(entry: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        Self { entry }
    }
}

/// Navegador de claves: campo de búsqueda, botón de refresco y la lista.
///
/// Guarda la última lista recibida del servidor y filtra localmente mientras
/// el usuario escribe. Los filtros con comodines (`*`, `?`, `[`) se resuelven
/// en el servidor al refrescar.
#[derive(Debug)]
pub struct KeysBrowser {
    all_keys: Vec<KeyEntry>,
    filter: String,
    visible_keys: FactoryVecDeque<KeyRow>,
    selected: Option<String>,
}

#[derive(Debug)]
pub enum KeysBrowserMsg {
    /// Reemplaza la lista completa con la respuesta del servidor.
    SetKeys(Vec<KeyEntry>),
    /// El texto de búsqueda cambió.
    Filter(String),
    Select(String),
    /// Pide al componente padre una nueva consulta con el filtro actual.
    Refresh,
    Clear,
}

#[derive(Debug)]
pub enum KeysBrowserOutput {
    KeySelected(String),
    RefreshRequested(String),
}

#[relm4::component(pub)]
impl SimpleComponent for KeysBrowser {
    type Init = ();
    type Input = KeysBrowserMsg;
    type Output = KeysBrowserOutput;

    view! {
        gtk::Frame {
            set_label: Some("Keys Browser"),
            add_css_class: "panel",
            set_vexpand: true,

            #[wrap(Some)]
            set_child = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 8,
                set_margin_all: 10,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 5,

                    gtk::Label {
                        set_label: "Search:",
                    },
                    gtk::SearchEntry {
                        set_width_chars: 20,
                        set_tooltip_text: Some("Substring, or a pattern such as user:*"),
                        connect_search_changed[sender] => move |entry| {
                            sender.input(KeysBrowserMsg::Filter(entry.text().to_string()));
                        },
                        connect_activate => KeysBrowserMsg::Refresh,
                    },
                    gtk::Button {
                        set_label: "Refresh",
                        add_css_class: "button",
                        add_css_class: "refresh",
                        connect_clicked => KeysBrowserMsg::Refresh,
                    },
                    gtk::Label {
                        set_hexpand: true,
                        set_xalign: 1.0,
                        add_css_class: "dim",
                        #[watch]
                        set_label: &model.count_label(),
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 10,
                    add_css_class: "key-header",

                    gtk::Label {
                        set_label: "Key",
                        set_hexpand: true,
                        set_xalign: 0.0,
                    },
                    gtk::Label {
                        set_label: "Type",
                        set_width_chars: 8,
                        set_xalign: 0.0,
                    },
                    gtk::Label {
                        set_label: "TTL",
                        set_width_chars: 8,
                        set_xalign: 0.0,
                    },
                    gtk::Label {
                        set_label: "Size",
                        set_width_chars: 8,
                        set_xalign: 0.0,
                    },
                },

                gtk::ScrolledWindow {
                    set_hexpand: true,
                    set_vexpand: true,
                    set_min_content_height: 200,

                    #[local_ref]
                    keys_container -> gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 2,
                    }
                },

                gtk::Label {
                    set_xalign: 0.0,
                    add_css_class: "dim",
                    #[watch]
                    set_label: &model.selection_label(),
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = KeysBrowser {
            all_keys: Vec::new(),
            filter: String::new(),
            visible_keys: FactoryVecDeque::builder()
                .launch_default()
                .forward(sender.input_sender(), |msg| msg),
            selected: None,
        };

        let keys_container = model.visible_keys.widget();
        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            KeysBrowserMsg::SetKeys(keys) => {
                self.all_keys = keys;
                if let Some(selected) = &self.selected {
                    if !self.all_keys.iter().any(|entry| &entry.name == selected) {
                        self.selected = None;
                    }
                }
                self.apply_filter();
            }
            KeysBrowserMsg::Filter(filter) => {
                self.filter = filter;
                self.apply_filter();
            }
            KeysBrowserMsg::Select(name) => {
                self.selected = Some(name.clone());
                if sender.output(KeysBrowserOutput::KeySelected(name)).is_err() {
                    log::warn!("No se pudo notificar la clave seleccionada");
                }
            }
            KeysBrowserMsg::Refresh => {
                let filter = server_filter(self.filter.trim()).to_string();
                if sender
                    .output(KeysBrowserOutput::RefreshRequested(filter))
                    .is_err()
                {
                    log::warn!("No se pudo solicitar el refresco de claves");
                }
            }
            KeysBrowserMsg::Clear => {
                self.all_keys.clear();
                self.selected = None;
                self.apply_filter();
            }
        }
    }
}

impl KeysBrowser {
    fn apply_filter(&mut self) {
        let mut guard = self.visible_keys.guard();
        guard.clear();
        for entry in filter_keys(&self.all_keys, self.filter.trim()) {
            guard.push_back(entry.clone());
        }
    }

    fn count_label(&self) -> String {
        format!("{} / {} keys", self.visible_keys.len(), self.all_keys.len())
    }

    fn selection_label(&self) -> String {
        match &self.selected {
            Some(name) => format!("Selected: {}", name),
            None => "No key selected".to_string(),
        }
    }
}
