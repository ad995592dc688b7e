//! Entry point group identifiers.
//!
//! A group names one extension point of the host. Each group owns an
//! independent registry and an independent pair of policy variables.

use std::fmt;

/// Group id for pluggable cell execution strategies.
pub const GROUP_CELL_EXECUTOR: &str = "quill.cell.executor";

/// Group id for pluggable notebook cache backends.
pub const GROUP_CACHE_STORE: &str = "quill.cache.store";

/// Identifier of one extension point.
///
/// The recognized groups are the extension points the Quill host actually
/// consults. [`EntryPointGroup::Custom`] carries any other dotted identifier
/// so embedders can run private registries through the same machinery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryPointGroup {
    /// Pluggable cell execution strategies (`quill.cell.executor`).
    CellExecutor,
    /// Pluggable notebook cache backends (`quill.cache.store`).
    CacheStore,
    /// Any group outside the recognized set.
    Custom(String),
}

impl EntryPointGroup {
    /// Groups the host consults during startup.
    pub const KNOWN: [EntryPointGroup; 2] =
        [EntryPointGroup::CellExecutor, EntryPointGroup::CacheStore];

    /// The canonical dotted identifier, e.g. `quill.cell.executor`.
    pub fn as_str(&self) -> &str {
        match self {
            EntryPointGroup::CellExecutor => GROUP_CELL_EXECUTOR,
            EntryPointGroup::CacheStore => GROUP_CACHE_STORE,
            EntryPointGroup::Custom(group) => group,
        }
    }

    /// Environment key fragment for this group: ASCII-uppercased with every
    /// non-alphanumeric character mapped to an underscore.
    ///
    /// `quill.cell.executor` becomes `QUILL_CELL_EXECUTOR`.
    pub fn env_key(&self) -> String {
        self.as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for EntryPointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntryPointGroup {
    fn from(group: &str) -> Self {
        match group {
            GROUP_CELL_EXECUTOR => EntryPointGroup::CellExecutor,
            GROUP_CACHE_STORE => EntryPointGroup::CacheStore,
            other => EntryPointGroup::Custom(other.to_string()),
        }
    }
}

impl From<String> for EntryPointGroup {
    fn from(group: String) -> Self {
        EntryPointGroup::from(group.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_groups_round_trip() {
        for group in EntryPointGroup::KNOWN {
            assert_eq!(EntryPointGroup::from(group.as_str()), group);
        }
    }

    #[test]
    fn test_custom_group_preserves_identifier() {
        let group = EntryPointGroup::from("quill.test.group");
        assert_eq!(
            group,
            EntryPointGroup::Custom("quill.test.group".to_string())
        );
        assert_eq!(group.as_str(), "quill.test.group");
    }

    #[test]
    fn test_env_key_derivation() {
        assert_eq!(
            EntryPointGroup::CellExecutor.env_key(),
            "QUILL_CELL_EXECUTOR"
        );
        assert_eq!(EntryPointGroup::CacheStore.env_key(), "QUILL_CACHE_STORE");
        assert_eq!(
            EntryPointGroup::from("my-org.plugin/v2").env_key(),
            "MY_ORG_PLUGIN_V2"
        );
    }

    #[test]
    fn test_display_uses_dotted_identifier() {
        assert_eq!(
            EntryPointGroup::CellExecutor.to_string(),
            "quill.cell.executor"
        );
    }
}
