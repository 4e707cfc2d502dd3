//! System prompt loader: the bundled default, or SYSTEM.md from the workspace.
//!
//! The system prompt describes the assistant's role and the package lookups it has; the
//! composer prepends it to every turn.

use std::fs;
use std::path::Path;

/// Bundled default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../config/SYSTEM.md");

/// Load the system prompt from the workspace (SYSTEM.md).
///
/// Returns the file contents when SYSTEM.md exists and is non-empty; otherwise the bundled default.
pub fn load_system_prompt(workspace_dir: Option<&Path>) -> String {
    let Some(dir) = workspace_dir else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };
    let path = dir.join("SYSTEM.md");
    match fs::read_to_string(&path) {
        Ok(s) if !s.trim().is_empty() => {
            log::info!("using system prompt from {}", path.display());
            s
        }
        _ => DEFAULT_SYSTEM_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_workspace_uses_default() {
        assert_eq!(load_system_prompt(None), DEFAULT_SYSTEM_PROMPT);
        let dir = std::env::temp_dir().join(format!("packaroo-ws-{}", uuid::Uuid::new_v4()));
        assert_eq!(load_system_prompt(Some(&dir)), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn workspace_override_and_blank_file() {
        let dir = std::env::temp_dir().join(format!("packaroo-ws-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SYSTEM.md"), "  \n").unwrap();
        assert_eq!(load_system_prompt(Some(&dir)), DEFAULT_SYSTEM_PROMPT);
        std::fs::write(dir.join("SYSTEM.md"), "You are terse.").unwrap();
        assert_eq!(load_system_prompt(Some(&dir)), "You are terse.");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_mentions_id_formats() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("PKG"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("24-character"));
    }
}
