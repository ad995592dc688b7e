//! # quill-extensions
//!
//! Extension point machinery for Quill. Provides:
//!
//! - Well-known entry point group identifiers
//! - Environment-driven allow/deny policy, re-read on every check
//! - A per-group registry merging direct registrations with discovery
//! - A discovery boundary for installed extensions, with a
//!   `libloading`-backed implementation behind the `dynamic` feature
//!
//! ## Example
//!
//! ```
//! use quill_extensions::EntryPointRegistry;
//!
//! let mut registry = EntryPointRegistry::new("quill.cell.executor");
//! registry.register("my_executor", "some value".to_string());
//! assert_eq!(registry.names(), vec!["my_executor"]);
//! ```

pub mod abi;
pub mod ids;
pub mod loader;
pub mod policy;
pub mod registry;
pub mod source;
pub mod testing;

pub use ids::{EntryPointGroup, GROUP_CACHE_STORE, GROUP_CELL_EXECUTOR};
pub use loader::LibrarySource;
pub use registry::EntryPointRegistry;
pub use source::{DiscoveredEntryPoint, EntryPointSource, StaticSource};
