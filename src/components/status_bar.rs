use chrono::Local;
use relm4::gtk::glib;
use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub enum StatusBarMsg {
    SetStatus(String),
    Tick,
}

/// Barra inferior: último mensaje de estado y reloj local.
#[derive(Debug)]
pub struct StatusBar {
    status: String,
    clock: String,
}

fn now_label() -> String {
    Local::now().format(CLOCK_FORMAT).to_string()
}

#[relm4::component(pub)]
impl SimpleComponent for StatusBar {
    type Init = String;
    type Input = StatusBarMsg;
    type Output = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,
            add_css_class: "status-bar",
            set_margin_all: 5,

            gtk::Label {
                set_hexpand: true,
                set_xalign: 0.0,
                set_ellipsize: gtk::pango::EllipsizeMode::End,
                #[watch]
                set_label: &model.status,
            },
            gtk::Label {
                set_xalign: 1.0,
                add_css_class: "dim",
                #[watch]
                set_label: &model.clock,
            },
        }
    }

    fn init(
        status: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = StatusBar {
            status,
            clock: now_label(),
        };

        let widgets = view_output!();

        let tick_sender = sender.input_sender().clone();
        glib::timeout_add_seconds_local(1, move || {
            tick_sender.emit(StatusBarMsg::Tick);
            glib::ControlFlow::Continue
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            StatusBarMsg::SetStatus(status) => self.status = status,
            StatusBarMsg::Tick => self.clock = now_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_clock_label_format() {
        let label = now_label();
        assert!(NaiveDateTime::parse_from_str(&label, CLOCK_FORMAT).is_ok(), "{}", label);
    }
}
