use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

#[derive(Debug)]
pub enum ErrorModalMsg {
    /// Muestra el modal con un título y el detalle del error.
    Show { title: String, message: String },
    Hide,
}

// Modal de error, transitorio de la ventana principal
#[derive(Debug)]
pub struct ErrorModal {
    visible: bool,
    title: String,
    message: String,
}

#[relm4::component(pub)]
impl SimpleComponent for ErrorModal {
    type Input = ErrorModalMsg;
    type Output = ();
    type Init = ();

    view! {
        #[root]
        gtk::Window {
            #[watch]
            set_title: Some(&model.title),
            set_modal: true,
            set_resizable: false,
            set_default_size: (400, 180),
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
                        set_icon_name: Some("dialog-error"),
                        set_pixel_size: 48,
                    },

                    gtk::ScrolledWindow {
                        set_hexpand: true,
                        set_vexpand: true,
                        set_policy: (gtk::PolicyType::Never, gtk::PolicyType::Automatic),

                        gtk::Label {
                            #[watch]
                            set_text: &model.message,
                            set_wrap: true,
                            set_halign: gtk::Align::Start,
                            set_valign: gtk::Align::Start,
                            set_selectable: true,
                        },
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_halign: gtk::Align::End,

                    gtk::Button {
                        set_label: "Close",
                        add_css_class: "button",
                        connect_clicked => ErrorModalMsg::Hide,
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
        let model = ErrorModal {
            visible: false,
            title: "Error".to_string(),
            message: String::new(),
        };

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            ErrorModalMsg::Show { title, message } => {
                self.title = title;
                self.message = message;
                self.visible = true;
            }
            ErrorModalMsg::Hide => {
                self.visible = false;
            }
        }
    }
}
