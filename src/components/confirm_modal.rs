use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

#[derive(Debug)]
pub enum ConfirmModalMsg {
    /// Pide confirmación para borrar la clave indicada.
    Ask(String),
    Accept,
    Cancel,
}

#[derive(Debug)]
pub enum ConfirmModalOutput {
    Confirmed(String),
}

/// Diálogo de confirmación antes de borrar una clave.
#[derive(Debug)]
pub struct ConfirmModal {
    visible: bool,
    key: Option<String>,
}

#[relm4::component(pub)]
impl SimpleComponent for ConfirmModal {
    type Input = ConfirmModalMsg;
    type Output = ConfirmModalOutput;
    type Init = ();

    view! {
        #[root]
        gtk::Window {
            set_title: Some("Confirm Delete"),
            set_modal: true,
            set_resizable: false,
            set_default_size: (360, 140),
            set_hide_on_close: true,
            #[watch]
            set_visible: model.visible,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_margin_all: 20,
                set_spacing: 15,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 10,

                    gtk::Image {
                        set_icon_name: Some("dialog-question"),
                        set_pixel_size: 48,
                    },
                    gtk::Label {
                        #[watch]
                        set_text: &model.question(),
                        set_wrap: true,
                        set_hexpand: true,
                        set_halign: gtk::Align::Start,
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_halign: gtk::Align::End,
                    set_spacing: 10,

                    gtk::Button {
                        set_label: "Cancel",
                        add_css_class: "button",
                        connect_clicked => ConfirmModalMsg::Cancel,
                    },
                    gtk::Button {
                        set_label: "Delete",
                        add_css_class: "button",
                        add_css_class: "delete",
                        connect_clicked => ConfirmModalMsg::Accept,
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
        let model = ConfirmModal {
            visible: false,
            key: None,
        };

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            ConfirmModalMsg::Ask(key) => {
                self.key = Some(key);
                self.visible = true;
            }
            ConfirmModalMsg::Accept => {
                self.visible = false;
                if let Some(key) = self.key.take() {
                    if sender.output(ConfirmModalOutput::Confirmed(key)).is_err() {
                        log::warn!("No se pudo confirmar el borrado");
                    }
                }
            }
            ConfirmModalMsg::Cancel => {
                self.visible = false;
                self.key = None;
            }
        }
    }
}

impl ConfirmModal {
    fn question(&self) -> String {
        match &self.key {
            Some(key) => format!("Are you sure you want to delete key '{}'?", key),
            None => String::new(),
        }
    }
}
