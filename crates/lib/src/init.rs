//! Initialize the configuration directory: create ~/.packaroo, a default config, and the workspace.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;
use crate::system_prompt::DEFAULT_SYSTEM_PROMPT;

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Creates the `workspace` subdirectory and seeds `SYSTEM.md` from the bundled prompt if missing.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config::config_dir(config_path);
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let workspace = config_dir.join("workspace");
    if !workspace.exists() {
        std::fs::create_dir_all(&workspace)
            .with_context(|| format!("creating workspace directory {}", workspace.display()))?;
        log::info!("created workspace directory at {}", workspace.display());
    }
    let system_md = workspace.join("SYSTEM.md");
    if !system_md.exists() {
        std::fs::write(&system_md, DEFAULT_SYSTEM_PROMPT)
            .with_context(|| format!("writing default SYSTEM.md to {}", system_md.display()))?;
        log::info!("wrote default SYSTEM.md to {}", system_md.display());
    } else {
        log::debug!("SYSTEM.md already exists at {}, skipping", system_md.display());
    }

    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_config_and_workspace_once() {
        let dir = std::env::temp_dir().join(format!("packaroo-init-{}", uuid::Uuid::new_v4()));
        let config_path = dir.join("config.json");

        let out = init_config_dir(&config_path).unwrap();
        assert_eq!(out, dir);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "{}");
        let system_md = dir.join("workspace").join("SYSTEM.md");
        assert_eq!(
            std::fs::read_to_string(&system_md).unwrap(),
            DEFAULT_SYSTEM_PROMPT
        );

        std::fs::write(&system_md, "custom").unwrap();
        init_config_dir(&config_path).unwrap();
        assert_eq!(std::fs::read_to_string(&system_md).unwrap(), "custom");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
