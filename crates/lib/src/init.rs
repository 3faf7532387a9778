//! Initialize the configuration directory: create ~/.denti and a default
//! config file with empty backend settings to fill in.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"{
  "gateway": { "port": 3978, "bind": "127.0.0.1" },
  "knowledge": { "host": "", "key": "", "project": "" },
  "intent": { "host": "", "key": "", "project": "", "deployment": "production" },
  "scheduler": { "baseUrl": "" }
}
"#;

/// Create the config directory and a default config file if they do not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_skeleton_parses() {
        let config: crate::config::Config =
            serde_json::from_str(DEFAULT_CONFIG).expect("parse default config");
        assert_eq!(config.gateway.port, 3978);
        assert_eq!(config.knowledge.host(), None);
        assert_eq!(config.intent.deployment(), "production");
    }
}
