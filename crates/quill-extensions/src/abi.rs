//! Shared-library ABI for dynamically discovered extensions.
//!
//! An extension library exports one well-known symbol,
//! [`ENTRY_POINTS_SYMBOL`], whose signature is [`EntryPointsFn`]. The host
//! calls it once per library and takes ownership of the returned
//! [`EntryPointManifest`]. Constructors are type-erased behind
//! [`ErasedConstructor`]; the loader downcasts each constructed value to the
//! concrete registry value type at load time, so a declaration placed in the
//! wrong group fails cleanly instead of corrupting memory.
//!
//! Both sides of the boundary must be built with the same toolchain. This is
//! a plugin ABI for binaries shipped together, not a stable public ABI.

use std::any::Any;
use std::fmt;

/// Symbol every extension library must export.
pub const ENTRY_POINTS_SYMBOL: &[u8] = b"quill_entry_points";

/// Signature of the exported manifest constructor.
///
/// The returned pointer must come from `Box::into_raw`; the host reclaims it
/// with `Box::from_raw` exactly once.
pub type EntryPointsFn = unsafe extern "C" fn() -> *mut EntryPointManifest;

/// Type-erased value constructor declared by an extension.
pub type ErasedConstructor = fn() -> Box<dyn Any + Send + Sync>;

/// One entry point declaration inside a manifest.
pub struct EntryPointDecl {
    /// Dotted group identifier, e.g. `quill.cell.executor`.
    pub group: &'static str,
    /// Advertised entry point name.
    pub name: &'static str,
    /// Builds one value for the registry.
    pub constructor: ErasedConstructor,
}

impl EntryPointDecl {
    pub const fn new(
        group: &'static str,
        name: &'static str,
        constructor: ErasedConstructor,
    ) -> Self {
        Self {
            group,
            name,
            constructor,
        }
    }
}

impl fmt::Debug for EntryPointDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPointDecl")
            .field("group", &self.group)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Everything one extension library declares.
#[derive(Debug, Default)]
pub struct EntryPointManifest {
    pub entries: Vec<EntryPointDecl>,
}

impl EntryPointManifest {
    pub fn new(entries: Vec<EntryPointDecl>) -> Self {
        Self { entries }
    }

    /// Leaks the manifest for handoff across the `extern "C"` boundary.
    pub fn into_raw(self) -> *mut EntryPointManifest {
        Box::into_raw(Box::new(self))
    }
}
