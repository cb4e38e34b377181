extern crate rand;
extern crate relm4;
extern crate regui;
use rand::Rng;
use regui::app::AppModel;
use regui::config::AppConfig;
use relm4::RelmApp;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuración inválida, se usan los valores por defecto: {}", e);
            AppConfig::default()
        }
    };

    let id = format!("ar.regui.manager{}", rand::thread_rng().gen_range(0..100));
    let app = RelmApp::new(&id);
    app.with_args(vec![]).run::<AppModel>(config);
}
