//! The notebook cell model.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use quill_core::AppResult;

/// Unique identifier of a cell within a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CellId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Variable bindings a cell reads from and writes to.
pub type CellScope = HashMap<String, Value>;

/// The executable body of a cell.
///
/// Runs against a scope and produces the cell's output value
/// (`Value::Null` for cells without one). Implemented by anything callable;
/// closures get a blanket implementation, which is what notebook front-ends
/// and tests use.
pub trait CellProgram: Send + Sync {
    fn run(&self, scope: &mut CellScope) -> AppResult<Value>;
}

impl<F> CellProgram for F
where
    F: Fn(&mut CellScope) -> AppResult<Value> + Send + Sync,
{
    fn run(&self, scope: &mut CellScope) -> AppResult<Value> {
        self(scope)
    }
}

/// One notebook cell: source text, its dataflow interface, and the compiled
/// program.
///
/// `refs` are the variable names the cell reads; `defs` are the names it
/// claims to define. Executors are free to ignore or enforce them (the
/// strict executor enforces both sides).
#[derive(Clone)]
pub struct Cell {
    pub id: CellId,
    pub code: String,
    pub refs: Vec<String>,
    pub defs: Vec<String>,
    program: Arc<dyn CellProgram>,
}

impl Cell {
    pub fn new(
        id: impl Into<CellId>,
        code: impl Into<String>,
        program: impl CellProgram + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            refs: Vec::new(),
            defs: Vec::new(),
            program: Arc::new(program),
        }
    }

    /// Declares the variables the cell reads.
    pub fn with_refs(mut self, refs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.refs = refs.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the variables the cell defines.
    pub fn with_defs(mut self, defs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.defs = defs.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the cell body against `scope` and returns its output value.
    pub fn run(&self, scope: &mut CellScope) -> AppResult<Value> {
        self.program.run(scope)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("refs", &self.refs)
            .field("defs", &self.defs)
            .finish_non_exhaustive()
    }
}
