//! Discovery boundary for externally provided entry points.
//!
//! A [`EntryPointSource`] enumerates entry points that were installed next to
//! the host rather than registered by its own code. Enumeration is cheap and
//! infallible; the returned descriptors defer the actual construction work
//! until [`DiscoveredEntryPoint::load`] is called.

use std::fmt;
use std::sync::Arc;

use quill_core::AppResult;

use crate::ids::EntryPointGroup;

type Loader<V> = dyn Fn() -> AppResult<V> + Send + Sync;

/// One externally discovered entry point: a name plus a deferred loader.
pub struct DiscoveredEntryPoint<V> {
    name: String,
    loader: Box<Loader<V>>,
}

impl<V> DiscoveredEntryPoint<V> {
    pub fn new(
        name: impl Into<String>,
        loader: impl Fn() -> AppResult<V> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
        }
    }

    /// The advertised entry point name, case preserved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the deferred loader and produces the value.
    pub fn load(&self) -> AppResult<V> {
        (self.loader)()
    }
}

impl<V> fmt::Debug for DiscoveredEntryPoint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredEntryPoint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A provider of externally installed entry points.
///
/// Implementations must tolerate being called repeatedly and must skip (not
/// fail on) providers they cannot read; a broken extension library must never
/// take the host down during enumeration.
pub trait EntryPointSource<V>: Send + Sync + fmt::Debug {
    /// Enumerates the entry points declared for `group`.
    fn discover(&self, group: &EntryPointGroup) -> Vec<DiscoveredEntryPoint<V>>;
}

/// A compiled-in registration table.
///
/// Hosts that link their extensions statically declare them here and attach
/// the table to a registry, exercising the same discovery path a shared
/// library would. Also the natural mock for tests.
pub struct StaticSource<V> {
    entries: Vec<(EntryPointGroup, String, Arc<Loader<V>>)>,
}

impl<V> StaticSource<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds one entry with a deferred loader.
    pub fn with(
        mut self,
        group: impl Into<EntryPointGroup>,
        name: impl Into<String>,
        loader: impl Fn() -> AppResult<V> + Send + Sync + 'static,
    ) -> Self {
        self.entries
            .push((group.into(), name.into(), Arc::new(loader)));
        self
    }

    /// Adds one entry that loads to a clone of `value`.
    pub fn with_value(
        self,
        group: impl Into<EntryPointGroup>,
        name: impl Into<String>,
        value: V,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.with(group, name, move || Ok(value.clone()))
    }
}

impl<V> Default for StaticSource<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for StaticSource<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .entries
            .iter()
            .map(|(_, name, _)| name.as_str())
            .collect();
        f.debug_struct("StaticSource")
            .field("names", &names)
            .finish_non_exhaustive()
    }
}

impl<V: 'static> EntryPointSource<V> for StaticSource<V> {
    fn discover(&self, group: &EntryPointGroup) -> Vec<DiscoveredEntryPoint<V>> {
        self.entries
            .iter()
            .filter(|(entry_group, _, _)| entry_group == group)
            .map(|(_, name, loader)| {
                let loader = Arc::clone(loader);
                DiscoveredEntryPoint::new(name.clone(), move || (*loader)())
            })
            .collect()
    }
}
