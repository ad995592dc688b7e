//! # quill-runtime
//!
//! The cell execution layer: the cell model, the builtin relaxed and strict
//! executors, and selection of an executor from the `quill.cell.executor`
//! entry point group.

pub mod cell;
pub mod executor;
pub mod select;

pub use cell::{Cell, CellId, CellProgram, CellScope};
pub use executor::{CellExecutor, RelaxedExecutor, StrictExecutor};
pub use select::{
    DynExecutorFactory, ExecutorFactory, executor_registry, get_executor, select_executor,
};
