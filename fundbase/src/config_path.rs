use std::fs;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

pub fn get() -> String {
    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.yml".to_owned());

    if fs::metadata(&config_path).is_err() {
        fb_log::panic(
            None,
            format!(
                "[Fundbase] Config file '{config_path}' not found, set {CONFIG_PATH_ENV} or add config.yml to the working directory"
            ),
        );
    }

    config_path
}
