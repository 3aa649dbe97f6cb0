use std::path::PathBuf;

/// Port the scanner back end listens on for websocket clients.
pub const DEFAULT_WS_PORT: u16 = 8001;
const DEFAULT_WS_HOST: &str = "127.0.0.1";

pub fn default_ws_host() -> String {
    DEFAULT_WS_HOST.to_string()
}

pub fn data_dir() -> PathBuf {
    // ~/.local/share/scanner/ on macOS too, for consistency with Linux
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".local")
            .join("share")
            .join("scanner")
    }
    #[cfg(windows)]
    {
        // Portable install: data/ beside the executable wins
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_data = exe_dir.join("data");
                if portable_data.exists() {
                    return portable_data;
                }
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scanner")
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_config = exe_dir.join("config.toml");
                if portable_config.exists() {
                    return exe_dir.to_path_buf();
                }
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scanner")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scanner")
    }
}
