//! The per-group entry point registry.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use quill_core::{AppError, AppResult};

use crate::ids::EntryPointGroup;
use crate::policy;
use crate::source::EntryPointSource;

/// Registry of named values for one extension point.
///
/// The registry merges two populations: values registered directly by host
/// code, and values discovered through an optional [`EntryPointSource`].
/// Direct values are stored in insertion order with their original casing.
/// Every read re-evaluates the group's allow/deny policy, so registration
/// order and policy changes are both reflected immediately.
pub struct EntryPointRegistry<V> {
    group: EntryPointGroup,
    entries: IndexMap<String, V>,
    source: Option<Arc<dyn EntryPointSource<V>>>,
}

impl<V> EntryPointRegistry<V> {
    /// Creates an empty registry for `group` with no external source.
    pub fn new(group: impl Into<EntryPointGroup>) -> Self {
        Self {
            group: group.into(),
            entries: IndexMap::new(),
            source: None,
        }
    }

    /// Creates an empty registry that also consults `source`.
    pub fn with_source(
        group: impl Into<EntryPointGroup>,
        source: Arc<dyn EntryPointSource<V>>,
    ) -> Self {
        let mut registry = Self::new(group);
        registry.source = Some(source);
        registry
    }

    /// Attaches (or replaces) the external source consulted by reads.
    pub fn set_source(&mut self, source: Arc<dyn EntryPointSource<V>>) {
        self.source = Some(source);
    }

    pub fn group(&self) -> &EntryPointGroup {
        &self.group
    }

    /// Registers `value` under `name`.
    ///
    /// A name rejected by the current policy is discarded without error, so
    /// bulk registration keeps working when an operator has denied one
    /// extension. Registering an existing name replaces its value in place.
    pub fn register(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        if !policy::is_entry_point_allowed(&self.group, &name) {
            info!(group = %self.group, name = %name, "entry point rejected by policy");
            return;
        }
        debug!(group = %self.group, name = %name, "entry point registered");
        self.entries.insert(name, value);
    }

    /// Removes `name` and returns its value.
    ///
    /// Removal is not policy-gated: a denied name can still be cleaned up.
    pub fn unregister(&mut self, name: &str) -> AppResult<V> {
        self.entries.shift_remove(name).ok_or_else(|| {
            AppError::not_found(format!(
                "entry point '{}' not found in group '{}'",
                name, self.group
            ))
        })
    }

    /// Names of the directly registered entry points that the current policy
    /// allows, in registration order and original casing.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter(|name| policy::is_entry_point_allowed(&self.group, name))
            .cloned()
            .collect()
    }
}

impl<V: Clone> EntryPointRegistry<V> {
    /// Looks up a single entry point by exact name.
    ///
    /// The policy check runs first, so a denied name fails with
    /// [`ErrorKind::NotAllowed`](quill_core::ErrorKind::NotAllowed) whether or
    /// not anything is stored under it. An allowed name resolves against the
    /// direct entries, then against the external source, and finally fails
    /// with [`ErrorKind::NotFound`](quill_core::ErrorKind::NotFound).
    pub fn get(&self, name: &str) -> AppResult<V> {
        if !policy::is_entry_point_allowed(&self.group, name) {
            return Err(AppError::not_allowed(format!(
                "entry point '{}' is not allowed for group '{}'",
                name, self.group
            )));
        }
        if let Some(value) = self.entries.get(name) {
            return Ok(value.clone());
        }
        if let Some(source) = &self.source {
            for discovered in source.discover(&self.group) {
                if discovered.name() == name {
                    debug!(group = %self.group, name = %name, "loading discovered entry point");
                    return discovered.load();
                }
            }
        }
        Err(AppError::not_found(format!(
            "entry point '{}' not found in group '{}'",
            name, self.group
        )))
    }

    /// Collects every available value: the allowed direct entries in
    /// registration order, followed by everything the external source
    /// discovers.
    ///
    /// Discovered entries are loaded without a policy check. Only
    /// deliberately installed packages reach the discovery path, whereas the
    /// policy exists to tame direct registrations; callers that want
    /// filtering applied to external entries resolve them through [`get`]
    /// instead.
    ///
    /// A loader failure aborts the collection with that loader's error.
    ///
    /// [`get`]: EntryPointRegistry::get
    pub fn get_all(&self) -> AppResult<Vec<V>> {
        let mut values: Vec<V> = self
            .entries
            .iter()
            .filter(|(name, _)| policy::is_entry_point_allowed(&self.group, name))
            .map(|(_, value)| value.clone())
            .collect();
        if let Some(source) = &self.source {
            for discovered in source.discover(&self.group) {
                values.push(discovered.load()?);
            }
        }
        Ok(values)
    }
}

impl<V> fmt::Display for EntryPointRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        write!(
            f,
            "EntryPointRegistry(group=\"{}\", names={:?})",
            self.group, names
        )
    }
}

impl<V> fmt::Debug for EntryPointRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        f.debug_struct("EntryPointRegistry")
            .field("group", &self.group)
            .field("names", &names)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
