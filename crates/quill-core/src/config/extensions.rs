//! Extension discovery configuration.

use serde::{Deserialize, Serialize};

/// Extension discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Directory containing extension shared libraries.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Whether to scan the directory for extensions at startup.
    #[serde(default = "default_true")]
    pub auto_discover: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            auto_discover: default_true(),
        }
    }
}

fn default_directory() -> String {
    "./extensions".to_string()
}

fn default_true() -> bool {
    true
}
