//! # quill-extension-sdk
//!
//! SDK for developing Quill extensions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quill_extension_sdk::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct EchoExecutor;
//!
//! #[async_trait]
//! impl CellExecutor for EchoExecutor {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value> {
//!         println!("running {}", cell.id);
//!         cell.run(scope)
//!     }
//! }
//!
//! quill_extension_sdk::export_entry_points![
//!     quill_extension_sdk::executor_entry_point!("echo", EchoExecutor),
//! ];
//! ```
//!
//! Build the crate as a `cdylib`, drop it into the host's extension
//! directory, and the `echo` executor becomes selectable through the
//! `quill.cell.executor` entry point group.

pub mod macros;

pub use quill_extensions::abi;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::Value;

    pub use quill_core::config::execution::ExecutionConfig;
    pub use quill_core::{AppError, AppResult, ErrorKind};

    pub use quill_extensions::abi::{EntryPointDecl, EntryPointManifest};
    pub use quill_extensions::{
        EntryPointGroup, EntryPointRegistry, GROUP_CACHE_STORE, GROUP_CELL_EXECUTOR,
    };

    pub use quill_runtime::{
        Cell, CellExecutor, CellId, CellProgram, CellScope, DynExecutorFactory, ExecutorFactory,
    };
}
