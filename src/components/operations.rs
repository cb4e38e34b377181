use crate::errors::ReguiError;
use crate::types::KeyType;
use crate::value::KeyValue;
use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};
use std::time::Duration;

/// Escritura pedida desde el formulario, ya validada.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub key: String,
    pub value: KeyValue,
    pub ttl: Option<Duration>,
}

impl WriteRequest {
    /// Arma la escritura a partir de los campos del formulario.
    ///
    /// La clave se usa tal cual se escribió: los espacios forman parte del
    /// nombre en Redis.
    ///
    /// # Errores
    /// `InvalidInput` si la clave está vacía, si el valor no corresponde al
    /// tipo elegido o si el TTL no es un número positivo de segundos.
    pub fn from_form(
        key: &str,
        key_type: &KeyType,
        text: &str,
        ttl: &str,
    ) -> Result<Self, ReguiError> {
        if key.trim().is_empty() {
            return Err(ReguiError::InvalidInput(
                "Key and Value cannot be empty".to_string(),
            ));
        }

        let value = KeyValue::parse(key_type, text)?;

        let ttl = match ttl.trim() {
            "" => None,
            raw => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ReguiError::InvalidInput(format!(
                        "TTL must be a positive number of seconds, got '{}'",
                        raw
                    )))
                }
            },
        };

        Ok(Self {
            key: key.to_string(),
            value,
            ttl,
        })
    }
}

/// Widgets del formulario que el modelo necesita leer o completar.
#[derive(Debug)]
struct FormWidgets {
    key_entry: gtk::Entry,
    ttl_entry: gtk::Entry,
    type_dropdown: gtk::DropDown,
}

/// Panel "Key Operations".
///
/// Muestra el valor de la clave seleccionada y ofrece un formulario para
/// escribir claves de cualquiera de los tipos soportados, además del borrado
/// de la clave seleccionada.
#[derive(Debug)]
pub struct OperationsPanel {
    /// Buffer de solo lectura con el valor de la clave seleccionada.
    value_buffer: gtk::TextBuffer,
    /// Buffer del valor a escribir.
    input_buffer: gtk::TextBuffer,
    /// Clave seleccionada y su valor, si ya se leyó.
    shown: Option<(String, Option<KeyValue>)>,
    form: Option<FormWidgets>,
}

#[derive(Debug)]
pub enum OperationsMsg {
    /// Se seleccionó una clave; su valor todavía se está leyendo.
    Loading(String),
    ShowValue(String, KeyValue),
    /// Muestra un mensaje en lugar del valor (por ejemplo, un error de lectura).
    ShowText(String, String),
    Clear,
    /// Copia la clave y el valor mostrados al formulario de escritura.
    EditSelected,
    Submit,
    DeleteSelected,
    /// La escritura terminó bien: se limpia el formulario.
    WriteDone,
}

#[derive(Debug)]
pub enum OperationsOutput {
    SetRequested(WriteRequest),
    DeleteRequested(String),
    /// Datos inválidos en el formulario o acción sin clave seleccionada.
    InvalidInput(String),
}

/// Opciones del selector de tipo, en el orden de `KeyType::EDITABLE`.
const TYPE_NAMES: [&str; 5] = ["string", "list", "set", "zset", "hash"];

fn buffer_text(buffer: &gtk::TextBuffer) -> String {
    buffer
        .text(&buffer.start_iter(), &buffer.end_iter(), false)
        .to_string()
}

#[relm4::component(pub)]
impl SimpleComponent for OperationsPanel {
    type Init = ();
    type Input = OperationsMsg;
    type Output = OperationsOutput;

    view! {
        gtk::Frame {
            set_label: Some("Key Operations"),
            add_css_class: "panel",

            #[wrap(Some)]
            set_child = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 8,
                set_margin_all: 10,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 5,
                    gtk::Label {
                        set_label: "Value:",
                        set_xalign: 0.0,
                    },
                    gtk::Label {
                        set_hexpand: true,
                        set_xalign: 0.0,
                        add_css_class: "dim",
                        #[watch]
                        set_label: &model.shown_key_label(),
                    },
                    gtk::Button {
                        set_label: "Edit",
                        add_css_class: "button",
                        #[watch]
                        set_sensitive: model.has_editable_value(),
                        connect_clicked => OperationsMsg::EditSelected,
                    },
                },

                gtk::ScrolledWindow {
                    set_min_content_height: 110,
                    set_hexpand: true,

                    #[wrap(Some)]
                    set_child = &gtk::TextView {
                        set_buffer: Some(&model.value_buffer),
                        set_editable: false,
                        set_monospace: true,
                        set_wrap_mode: gtk::WrapMode::WordChar,
                        add_css_class: "value-view",
                    },
                },

                gtk::Label {
                    set_label: "Set Key-Value:",
                    set_xalign: 0.0,
                    add_css_class: "section-title",
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 5,

                    gtk::Label {
                        set_label: "Key:",
                    },
                    #[name = "key_entry"]
                    gtk::Entry {
                        set_hexpand: true,
                    },
                    gtk::Label {
                        set_label: "Type:",
                        set_margin_start: 5,
                    },
                    #[name = "type_dropdown"]
                    gtk::DropDown::from_strings(&TYPE_NAMES) {
                        set_selected: 0,
                    },
                    gtk::Label {
                        set_label: "TTL (s):",
                        set_margin_start: 5,
                    },
                    #[name = "ttl_entry"]
                    gtk::Entry {
                        set_width_chars: 8,
                        set_tooltip_text: Some("Optional expiry in seconds"),
                    },
                },

                gtk::ScrolledWindow {
                    set_min_content_height: 70,
                    set_hexpand: true,
                    set_tooltip_text: Some(
                        "string: raw text. list/set: one item per line or a JSON array. \
                         zset: 'member score' per line. hash: 'field value' per line or a JSON object."
                    ),

                    #[wrap(Some)]
                    set_child = &gtk::TextView {
                        set_buffer: Some(&model.input_buffer),
                        set_monospace: true,
                        set_wrap_mode: gtk::WrapMode::WordChar,
                        add_css_class: "value-input",
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 5,

                    gtk::Button {
                        set_label: "Set",
                        add_css_class: "button",
                        add_css_class: "set",
                        connect_clicked => OperationsMsg::Submit,
                    },
                    gtk::Button {
                        set_label: "Delete Selected",
                        add_css_class: "button",
                        add_css_class: "delete",
                        connect_clicked => OperationsMsg::DeleteSelected,
                    },
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let mut model = OperationsPanel {
            value_buffer: gtk::TextBuffer::new(None),
            input_buffer: gtk::TextBuffer::new(None),
            shown: None,
            form: None,
        };

        let widgets = view_output!();
        model.form = Some(FormWidgets {
            key_entry: widgets.key_entry.clone(),
            ttl_entry: widgets.ttl_entry.clone(),
            type_dropdown: widgets.type_dropdown.clone(),
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            OperationsMsg::Loading(key) => {
                self.value_buffer.set_text("Loading...");
                self.shown = Some((key, None));
            }
            OperationsMsg::ShowValue(key, value) => {
                self.value_buffer.set_text(&value.to_display());
                self.shown = Some((key, Some(value)));
            }
            OperationsMsg::ShowText(key, text) => {
                self.value_buffer.set_text(&text);
                self.shown = Some((key, None));
            }
            OperationsMsg::Clear => {
                self.value_buffer.set_text("");
                self.shown = None;
            }
            OperationsMsg::EditSelected => self.load_selected_into_form(),
            OperationsMsg::Submit => {
                let output = match self.read_form() {
                    Ok(request) => OperationsOutput::SetRequested(request),
                    Err(e) => OperationsOutput::InvalidInput(e.to_string()),
                };
                if sender.output(output).is_err() {
                    log::warn!("No se pudo enviar la escritura al componente principal");
                }
            }
            OperationsMsg::DeleteSelected => {
                let output = match &self.shown {
                    Some((key, _)) => OperationsOutput::DeleteRequested(key.clone()),
                    None => {
                        OperationsOutput::InvalidInput("Please select a key to delete".to_string())
                    }
                };
                if sender.output(output).is_err() {
                    log::warn!("No se pudo enviar el borrado al componente principal");
                }
            }
            OperationsMsg::WriteDone => {
                self.input_buffer.set_text("");
                if let Some(form) = &self.form {
                    form.key_entry.set_text("");
                    form.ttl_entry.set_text("");
                }
            }
        }
    }
}

impl OperationsPanel {
    fn shown_key_label(&self) -> String {
        match &self.shown {
            Some((key, Some(value))) => format!("{} ({})", key, value.key_type()),
            Some((key, None)) => key.clone(),
            None => String::new(),
        }
    }

    fn has_editable_value(&self) -> bool {
        matches!(self.shown, Some((_, Some(_))))
    }

    fn read_form(&self) -> Result<WriteRequest, ReguiError> {
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| ReguiError::InvalidInput("form is not ready".to_string()))?;

        let key_type = KeyType::EDITABLE
            .get(form.type_dropdown.selected() as usize)
            .cloned()
            .unwrap_or(KeyType::String);

        WriteRequest::from_form(
            &form.key_entry.text(),
            &key_type,
            &buffer_text(&self.input_buffer),
            &form.ttl_entry.text(),
        )
    }

    fn load_selected_into_form(&self) {
        let (Some((key, Some(value))), Some(form)) = (&self.shown, &self.form) else {
            return;
        };

        form.key_entry.set_text(key);
        let key_type = value.key_type();
        if let Some(index) = KeyType::EDITABLE.iter().position(|t| *t == key_type) {
            form.type_dropdown.set_selected(index as u32);
        }
        self.input_buffer.set_text(&value.to_display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_a_key() {
        let result = WriteRequest::from_form("   ", &KeyType::String, "value", "");
        assert!(matches!(result, Err(ReguiError::InvalidInput(_))));
    }

    #[test]
    fn test_form_builds_a_string_write() {
        let request = WriteRequest::from_form("greeting", &KeyType::String, "hola", "").unwrap();
        assert_eq!(
            request,
            WriteRequest {
                key: "greeting".to_string(),
                value: KeyValue::String("hola".to_string()),
                ttl: None,
            }
        );
    }

    #[test]
    fn test_form_keeps_surrounding_spaces_in_key() {
        let request = WriteRequest::from_form(" cart ", &KeyType::List, "a", "").unwrap();
        assert_eq!(request.key, " cart ");
    }

    #[test]
    fn test_form_parses_ttl() {
        let request = WriteRequest::from_form("queue", &KeyType::List, "a\nb", " 60 ").unwrap();
        assert_eq!(request.ttl, Some(Duration::from_secs(60)));
        assert_eq!(
            request.value,
            KeyValue::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_form_rejects_bad_ttl() {
        for ttl in ["0", "-5", "soon"] {
            let result = WriteRequest::from_form("k", &KeyType::String, "v", ttl);
            assert!(matches!(result, Err(ReguiError::InvalidInput(_))), "ttl {}", ttl);
        }
    }

    #[test]
    fn test_form_rejects_empty_value() {
        let result = WriteRequest::from_form("k", &KeyType::Hash, "", "");
        assert!(matches!(result, Err(ReguiError::InvalidInput(_))));
    }

    #[test]
    fn test_type_names_follow_editable_order() {
        let types = KeyType::EDITABLE;
        let editable: Vec<&str> = types.iter().map(KeyType::as_str).collect();
        assert_eq!(editable, TYPE_NAMES);
    }
}
