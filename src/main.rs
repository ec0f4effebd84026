use std::path::PathBuf;

use rocket_demo::GameConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let result = GameConfig::load(config_path.as_deref()).and_then(rocket_demo::run);

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
