//! Cell execution strategies.
//!
//! Two executors ship with the runtime. The relaxed executor runs a cell
//! directly against the shared scope and trusts the cell's declared
//! interface. The strict executor isolates the cell: it checks that every
//! declared reference exists, runs the body against a sandbox holding only
//! those references, and merges back only the declared definitions.
//! Extensions can provide further strategies through the
//! `quill.cell.executor` entry point group.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use quill_core::{AppError, AppResult};

use crate::cell::{Cell, CellScope};

/// A cell execution strategy.
#[async_trait]
pub trait CellExecutor: Send + Sync + fmt::Debug {
    /// Short name used in logs and selection diagnostics.
    fn name(&self) -> &str;

    /// Runs `cell` against `scope` and returns the cell's output value.
    fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value>;

    /// Async wrapper; the default delegates to the blocking path. Executors
    /// that schedule work themselves override this.
    async fn execute_cell_async(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value> {
        self.execute_cell(cell, scope)
    }
}

/// Runs cells directly against the shared scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelaxedExecutor;

impl RelaxedExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CellExecutor for RelaxedExecutor {
    fn name(&self) -> &str {
        "relaxed"
    }

    fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value> {
        debug!(cell_id = %cell.id, executor = self.name(), "executing cell");
        cell.run(scope)
    }
}

/// Runs cells inside a sandbox scope and enforces the declared interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictExecutor;

impl StrictExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CellExecutor for StrictExecutor {
    fn name(&self) -> &str {
        "strict"
    }

    fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value> {
        debug!(cell_id = %cell.id, executor = self.name(), "executing cell");
        let mut sandbox = CellScope::new();
        for reference in &cell.refs {
            match scope.get(reference) {
                Some(value) => {
                    sandbox.insert(reference.clone(), value.clone());
                }
                None => {
                    return Err(AppError::execution(format!(
                        "cell '{}' references undefined variable '{}'",
                        cell.id, reference
                    )));
                }
            }
        }

        let output = cell.run(&mut sandbox)?;

        // Only declared definitions leave the sandbox. A declared name the
        // program stopped producing is stale and is removed from the shared
        // scope so downstream cells see it disappear.
        for definition in &cell.defs {
            match sandbox.remove(definition) {
                Some(value) => {
                    scope.insert(definition.clone(), value);
                }
                None => {
                    scope.remove(definition);
                }
            }
        }

        for leftover in sandbox.keys() {
            if !cell.refs.iter().any(|r| r == leftover) {
                warn!(
                    cell_id = %cell.id,
                    name = %leftover,
                    "dropping undeclared definition"
                );
            }
        }
        Ok(output)
    }
}
