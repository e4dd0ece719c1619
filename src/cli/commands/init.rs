use crate::config::Config;
use crate::config::template::TEMPLATE;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use std::fs;
use std::path::PathBuf;

/// Handle the `init` command
///
/// Writes the configuration template to `--config` or the default location.
/// An existing file is only replaced with `--force`.
pub fn handle(config_path: Option<&str>, force: bool) -> AppResult<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_file);

    if path.exists() && !force {
        return Err(AppError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, TEMPLATE)?;

    success(format!("Config file: {}", path.display()));
    info("Fill in username and password (or set MQTT_USER / MQTT_PASS) before running");
    Ok(())
}
