use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    #[serde(default)]
    pub mock: bool,
    pub log_file: Option<PathBuf>,
}

/// Effective settings after merging CLI flags over the config file.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub base_url: Option<String>,
    pub mock: bool,
    pub log_file: PathBuf,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("zachetka").join("config.toml"))
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zachetka")
        .join("zk.log")
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    toml::from_str(&content).unwrap_or_default()
}

pub fn resolve_config(
    cli_mock: bool,
    cli_base_url: Option<String>,
    cli_log_file: Option<PathBuf>,
) -> ResolvedConfig {
    let config = load_config();

    ResolvedConfig {
        base_url: cli_base_url.or(config.base_url),
        mock: cli_mock || config.mock,
        log_file: cli_log_file.or(config.log_file).unwrap_or_else(default_log_path),
    }
}
