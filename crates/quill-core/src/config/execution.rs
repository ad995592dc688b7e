//! Cell execution configuration.

use serde::{Deserialize, Serialize};

/// Cell execution configuration.
///
/// The selector in `quill-runtime` consumes this to pick the active cell
/// executor: an explicitly named entry point wins, otherwise any registered
/// or discovered executor, otherwise the built-in chosen by `is_strict`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Whether cells run under strict scope isolation.
    #[serde(default)]
    pub is_strict: bool,
    /// Explicit executor entry point name, if the operator pinned one.
    #[serde(default)]
    pub executor: Option<String>,
}

impl ExecutionConfig {
    /// Config selecting the built-in relaxed executor.
    pub fn relaxed() -> Self {
        Self {
            is_strict: false,
            executor: None,
        }
    }

    /// Config selecting the built-in strict executor.
    pub fn strict() -> Self {
        Self {
            is_strict: true,
            executor: None,
        }
    }

    /// Pins a named executor entry point.
    pub fn with_executor(mut self, name: impl Into<String>) -> Self {
        self.executor = Some(name.into());
        self
    }
}
