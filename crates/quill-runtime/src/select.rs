//! Executor selection against the `quill.cell.executor` entry point group.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use quill_core::AppResult;
use quill_core::config::execution::ExecutionConfig;
use quill_extensions::{EntryPointGroup, EntryPointRegistry};

use crate::executor::{CellExecutor, RelaxedExecutor, StrictExecutor};

/// Builds fresh executor instances for the registry.
///
/// Registries hand out clones, so the stored value is a factory rather than
/// an executor: every selection gets its own instance and stateful executors
/// do not leak state between notebooks.
pub trait ExecutorFactory: Send + Sync {
    fn create(&self) -> Box<dyn CellExecutor>;
}

impl<F> ExecutorFactory for F
where
    F: Fn() -> Box<dyn CellExecutor> + Send + Sync,
{
    fn create(&self) -> Box<dyn CellExecutor> {
        self()
    }
}

/// The value type stored in the `quill.cell.executor` registry.
pub type DynExecutorFactory = Arc<dyn ExecutorFactory>;

static EXECUTOR_REGISTRY: LazyLock<RwLock<EntryPointRegistry<DynExecutorFactory>>> =
    LazyLock::new(|| RwLock::new(EntryPointRegistry::new(EntryPointGroup::CellExecutor)));

/// The process-wide `quill.cell.executor` registry.
///
/// Created on first access; every caller sees the same instance. Take the
/// write half to register or attach a source, the read half to select.
pub fn executor_registry() -> &'static RwLock<EntryPointRegistry<DynExecutorFactory>> {
    &EXECUTOR_REGISTRY
}

/// Picks an executor for `config` from `registry`.
///
/// An explicitly configured executor name is resolved with
/// [`EntryPointRegistry::get`], so a missing name fails not-found and a
/// denied name fails not-allowed rather than silently falling back.
/// Without an explicit name the first available registered executor wins,
/// and an empty registry falls back to the builtin pair picked by
/// `config.is_strict`.
pub fn select_executor(
    config: &ExecutionConfig,
    registry: &EntryPointRegistry<DynExecutorFactory>,
) -> AppResult<Box<dyn CellExecutor>> {
    if let Some(name) = &config.executor {
        let factory = registry.get(name)?;
        let executor = factory.create();
        debug!(executor = executor.name(), "selected configured executor");
        return Ok(executor);
    }

    if let Some(factory) = registry.get_all()?.first() {
        let executor = factory.create();
        debug!(executor = executor.name(), "selected registered executor");
        return Ok(executor);
    }

    let executor: Box<dyn CellExecutor> = if config.is_strict {
        Box::new(StrictExecutor::new())
    } else {
        Box::new(RelaxedExecutor::new())
    };
    debug!(executor = executor.name(), "selected builtin executor");
    Ok(executor)
}

/// Selects an executor from the process-wide registry.
pub fn get_executor(config: &ExecutionConfig) -> AppResult<Box<dyn CellExecutor>> {
    select_executor(config, &executor_registry().read())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ErrorKind;
    use quill_extensions::testing::EnvVarGuard;
    use serial_test::serial;

    fn relaxed_factory() -> DynExecutorFactory {
        Arc::new(|| Box::new(RelaxedExecutor::new()) as Box<dyn CellExecutor>)
    }

    fn strict_factory() -> DynExecutorFactory {
        Arc::new(|| Box::new(StrictExecutor::new()) as Box<dyn CellExecutor>)
    }

    fn clean_policy() -> (EnvVarGuard, EnvVarGuard) {
        (
            EnvVarGuard::unset("QUILL_CELL_EXECUTOR_ALLOWLIST"),
            EnvVarGuard::unset("QUILL_CELL_EXECUTOR_DENYLIST"),
        )
    }

    #[test]
    #[serial]
    fn test_empty_registry_falls_back_to_builtins() {
        let _env = clean_policy();
        let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
        let relaxed = select_executor(&ExecutionConfig::relaxed(), &registry).unwrap();
        assert_eq!(relaxed.name(), "relaxed");
        let strict = select_executor(&ExecutionConfig::strict(), &registry).unwrap();
        assert_eq!(strict.name(), "strict");
    }

    #[test]
    #[serial]
    fn test_registered_executor_wins_over_builtin() {
        let _env = clean_policy();
        let mut registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
        registry.register("custom", strict_factory());
        // is_strict is false, but the registered executor still wins.
        let executor = select_executor(&ExecutionConfig::relaxed(), &registry).unwrap();
        assert_eq!(executor.name(), "strict");
    }

    #[test]
    #[serial]
    fn test_configured_name_is_resolved_exactly() {
        let _env = clean_policy();
        let mut registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
        registry.register("first", relaxed_factory());
        registry.register("second", strict_factory());
        let config = ExecutionConfig::relaxed().with_executor("second");
        let executor = select_executor(&config, &registry).unwrap();
        assert_eq!(executor.name(), "strict");
    }

    #[test]
    #[serial]
    fn test_configured_name_missing_is_not_found() {
        let _env = clean_policy();
        let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
        let config = ExecutionConfig::relaxed().with_executor("ghost");
        let err = select_executor(&config, &registry).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    #[serial]
    fn test_configured_name_denied_is_not_allowed() {
        let _allow = EnvVarGuard::unset("QUILL_CELL_EXECUTOR_ALLOWLIST");
        let _deny = EnvVarGuard::set("QUILL_CELL_EXECUTOR_DENYLIST", "banned");
        let registry = EntryPointRegistry::new(EntryPointGroup::CellExecutor);
        let config = ExecutionConfig::relaxed().with_executor("banned");
        let err = select_executor(&config, &registry).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAllowed);
    }

    #[test]
    #[serial]
    fn test_process_wide_registry_feeds_get_executor() {
        let _env = clean_policy();
        executor_registry()
            .write()
            .register("shared", strict_factory());
        let executor = get_executor(&ExecutionConfig::relaxed()).unwrap();
        assert_eq!(executor.name(), "strict");
        executor_registry().write().unregister("shared").unwrap();
    }
}
