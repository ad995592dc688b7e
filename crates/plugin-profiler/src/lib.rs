//! Profiling cell executor extension for Quill.
//!
//! Wraps the relaxed execution strategy and accumulates wall-clock runtime
//! per process. Usable two ways: linked into the host and registered through
//! [`register`], or built as a `cdylib` and dropped into the extension
//! directory, where the exported manifest advertises it under the
//! `quill.cell.executor` group.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use quill_core::AppResult;
use quill_extensions::EntryPointRegistry;
use quill_runtime::{Cell, CellExecutor, CellScope, DynExecutorFactory, RelaxedExecutor};

/// Name this executor is registered under.
pub const EXECUTOR_NAME: &str = "profiling";

/// Cumulative execution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub cells_executed: u64,
    pub total_runtime_us: u128,
    /// When this executor instance started collecting.
    pub since: DateTime<Utc>,
}

impl Default for ProfileStats {
    fn default() -> Self {
        Self {
            cells_executed: 0,
            total_runtime_us: 0,
            since: Utc::now(),
        }
    }
}

/// Relaxed execution with per-cell timing.
#[derive(Debug, Default)]
pub struct ProfilingExecutor {
    inner: RelaxedExecutor,
    stats: Mutex<ProfileStats>,
}

impl ProfilingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the statistics collected so far.
    pub fn stats(&self) -> ProfileStats {
        self.stats.lock().clone()
    }
}

#[async_trait]
impl CellExecutor for ProfilingExecutor {
    fn name(&self) -> &str {
        EXECUTOR_NAME
    }

    fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<serde_json::Value> {
        let started = Instant::now();
        let result = self.inner.execute_cell(cell, scope);
        let elapsed_us = started.elapsed().as_micros();

        let mut stats = self.stats.lock();
        stats.cells_executed += 1;
        stats.total_runtime_us += elapsed_us;
        info!(
            cell_id = %cell.id,
            elapsed_us,
            ok = result.is_ok(),
            "cell profiled"
        );
        result
    }
}

/// Registers the profiling executor with a `quill.cell.executor` registry.
///
/// For hosts that link this crate statically instead of loading the cdylib.
pub fn register(registry: &mut EntryPointRegistry<DynExecutorFactory>) {
    registry.register(
        EXECUTOR_NAME,
        Arc::new(|| Box::new(ProfilingExecutor::new()) as Box<dyn CellExecutor>)
            as DynExecutorFactory,
    );
}

quill_extension_sdk::export_entry_points![quill_extension_sdk::executor_entry_point!(
    EXECUTOR_NAME,
    ProfilingExecutor
)];
