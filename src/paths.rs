use std::path::PathBuf;

const APP_DIR_NAME: &str = "bgn-eur-checker";

/// Returns the application data directory: `<data_local_dir>/bgn-eur-checker/`
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Returns the default config file: `<data_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.json")
}

/// Returns the scan history file: `<data_dir>/history.json`
pub fn get_history_path() -> PathBuf {
    get_data_dir().join("history.json")
}

/// Ensures the data directory exists. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_data_dir())
}
