//! Integration tests for executor selection across configuration, policy,
//! and the extension registry.

use std::sync::Arc;

use serde_json::{Value, json};
use serial_test::serial;

use quill_core::ErrorKind;
use quill_core::config::execution::ExecutionConfig;
use quill_extensions::testing::EnvVarGuard;
use quill_extensions::{EntryPointGroup, EntryPointRegistry};
use quill_runtime::{
    Cell, CellExecutor, CellScope, DynExecutorFactory, StrictExecutor, executor_registry,
    get_executor, select_executor,
};

const ALLOWLIST: &str = "QUILL_CELL_EXECUTOR_ALLOWLIST";
const DENYLIST: &str = "QUILL_CELL_EXECUTOR_DENYLIST";

fn clean_policy() -> (EnvVarGuard, EnvVarGuard) {
    (EnvVarGuard::unset(ALLOWLIST), EnvVarGuard::unset(DENYLIST))
}

fn doubling_cell() -> Cell {
    Cell::new("c1", "x = x * 2", |scope: &mut CellScope| {
        let x = scope.get("x").and_then(Value::as_i64).unwrap_or_default();
        scope.insert("doubled".to_string(), json!(x * 2));
        Ok(json!(x * 2))
    })
    .with_refs(["x"])
    .with_defs(["doubled"])
}

#[test]
#[serial]
fn test_default_selection_uses_builtin_pair() {
    let _env = clean_policy();
    let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);

    let executor = select_executor(&ExecutionConfig::relaxed(), &registry).unwrap();
    assert_eq!(executor.name(), "relaxed");

    let executor = select_executor(&ExecutionConfig::strict(), &registry).unwrap();
    assert_eq!(executor.name(), "strict");
}

#[test]
#[serial]
fn test_profiler_extension_selected_and_executes() {
    let _env = clean_policy();
    let mut registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
    plugin_profiler::register(&mut registry);

    let config = ExecutionConfig::relaxed().with_executor(plugin_profiler::EXECUTOR_NAME);
    let executor = select_executor(&config, &registry).unwrap();
    assert_eq!(executor.name(), "profiling");

    let mut scope = CellScope::from([("x".to_string(), json!(21))]);
    let output = executor.execute_cell(&doubling_cell(), &mut scope).unwrap();
    assert_eq!(output, json!(42));
    assert_eq!(scope.get("doubled"), Some(&json!(42)));
}

#[test]
#[serial]
fn test_missing_configured_executor_is_not_found() {
    let _env = clean_policy();
    let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
    let config = ExecutionConfig::relaxed().with_executor("ghost");
    let err = select_executor(&config, &registry).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
#[serial]
fn test_denied_executor_cannot_be_selected() {
    let _allow = EnvVarGuard::unset(ALLOWLIST);
    let _deny = EnvVarGuard::set(DENYLIST, "profiling");
    let mut registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
    plugin_profiler::register(&mut registry);

    // Registration was silently discarded, and explicit selection fails
    // with a policy error rather than falling back.
    assert!(registry.names().is_empty());
    let config = ExecutionConfig::relaxed().with_executor("profiling");
    let err = select_executor(&config, &registry).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAllowed);
}

#[test]
#[serial]
fn test_registered_executor_preferred_over_builtin() {
    let _env = clean_policy();
    let mut registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
    let factory: DynExecutorFactory =
        Arc::new(|| Box::new(StrictExecutor::new()) as Box<dyn CellExecutor>);
    registry.register("custom", factory);

    let executor = select_executor(&ExecutionConfig::relaxed(), &registry).unwrap();
    assert_eq!(executor.name(), "strict");
}

#[test]
#[serial]
fn test_process_wide_registry_selection() {
    let _env = clean_policy();
    plugin_profiler::register(&mut executor_registry().write());

    let config = ExecutionConfig::relaxed().with_executor("profiling");
    let executor = get_executor(&config).unwrap();
    assert_eq!(executor.name(), "profiling");

    executor_registry().write().unregister("profiling").unwrap();
}

#[tokio::test]
#[serial]
async fn test_values_flow_between_cells_strict() {
    let _env = clean_policy();
    let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
    let executor = select_executor(&ExecutionConfig::strict(), &registry).unwrap();

    let define = Cell::new("c0", "x = 21", |scope: &mut CellScope| {
        scope.insert("x".to_string(), json!(21));
        Ok(Value::Null)
    })
    .with_defs(["x"]);

    let mut scope = CellScope::new();
    executor.execute_cell_async(&define, &mut scope).await.unwrap();
    let output = executor
        .execute_cell_async(&doubling_cell(), &mut scope)
        .await
        .unwrap();
    assert_eq!(output, json!(42));
    assert_eq!(scope.get("doubled"), Some(&json!(42)));
}
