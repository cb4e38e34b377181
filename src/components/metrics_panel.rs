use crate::metrics::MetricsSnapshot;
use relm4::gtk::prelude::*;
use relm4::{gtk, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent};

/// Panel "Metrics" con tres tarjetas: comandos por segundo, hit rate y memoria.
#[derive(Debug)]
pub struct MetricsPanel {
    ops: String,
    hit_rate: String,
    memory: String,
}

#[derive(Debug)]
pub enum MetricsPanelMsg {
    Update(MetricsSnapshot),
    Reset,
}

impl Default for MetricsPanel {
    fn default() -> Self {
        Self {
            ops: "0".to_string(),
            hit_rate: "0%".to_string(),
            memory: "0 MB".to_string(),
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for MetricsPanel {
    type Init = ();
    type Input = MetricsPanelMsg;
    type Output = ();

    view! {
        gtk::Frame {
            set_label: Some("Metrics"),
            add_css_class: "panel",

            #[wrap(Some)]
            set_child = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 8,
                set_margin_all: 10,

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    add_css_class: "metric-card",
                    gtk::Label {
                        set_label: "Commands/sec",
                        set_xalign: 0.0,
                        add_css_class: "metric-title",
                    },
                    gtk::Label {
                        set_xalign: 0.0,
                        add_css_class: "metric-value",
                        add_css_class: "metric-ops",
                        #[watch]
                        set_label: &model.ops,
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    add_css_class: "metric-card",
                    gtk::Label {
                        set_label: "Hit Rate",
                        set_xalign: 0.0,
                        add_css_class: "metric-title",
                    },
                    gtk::Label {
                        set_xalign: 0.0,
                        add_css_class: "metric-value",
                        add_css_class: "metric-hits",
                        #[watch]
                        set_label: &model.hit_rate,
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    add_css_class: "metric-card",
                    gtk::Label {
                        set_label: "Memory Usage",
                        set_xalign: 0.0,
                        add_css_class: "metric-title",
                    },
                    gtk::Label {
                        set_xalign: 0.0,
                        add_css_class: "metric-value",
                        add_css_class: "metric-memory",
                        #[watch]
                        set_label: &model.memory,
                    },
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        _sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = MetricsPanel::default();
        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            MetricsPanelMsg::Update(snapshot) => {
                self.ops = snapshot.ops_label();
                self.hit_rate = snapshot.hit_rate_label();
                self.memory = snapshot.memory_label();
            }
            MetricsPanelMsg::Reset => *self = MetricsPanel::default(),
        }
    }
}
