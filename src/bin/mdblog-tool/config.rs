use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use mdblog::config::{read_config, Config, CFG_FILE_NAME};

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe_path| exe_path.parent().map(|dir| dir.to_path_buf()));
    let cur_dir = env::current_dir().ok();

    [exe_dir, cur_dir, dirs::config_dir()]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

fn default_log_location() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("mdblog").join("log").join("tool.log"))
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let mut config = match cfg_path.or_else(get_config_path) {
        Some(config_path) => {
            eprintln!("Reading config from {}", config_path.display());
            read_config(&config_path)
                .with_context(|| format!("Could not load configuration {}", config_path.display()))?
        }
        None => {
            eprintln!("No {} found. Using default paths relative to the current directory", CFG_FILE_NAME);
            Config::default()
        }
    };

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            log.location = default_log_location();
        }
        if let Some(ref location) = log.location {
            eprintln!("Log enabled. Files will be written in {}", location.display());
        }
        config.log = Some(log);
    }

    Ok(config)
}
