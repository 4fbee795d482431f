use crate::errors::{HordeError, HordeResult};
use crate::resources::AiConfig;
use std::fs;
use std::path::PathBuf;

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|mut path| {
            path.push("horde");
            fs::create_dir_all(&path).ok()?;
            path.push("config.toml");
            Some(path)
        })
        .flatten()
}

pub fn load_config() -> AiConfig {
    if let Some(config_path) = get_config_path() {
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<AiConfig>(&contents) {
                return config;
            }
        }
    }
    AiConfig::default()
}

pub fn save_config(config: &AiConfig) -> HordeResult<()> {
    let config_path = get_config_path().ok_or(HordeError::ConfigDirNotFound)?;
    let contents = toml::to_string_pretty(config)?;
    fs::write(config_path, contents)?;
    Ok(())
}
