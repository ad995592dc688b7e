//! Convenience macros for extension development.

/// Exports the manifest symbol an extension library must provide.
///
/// Takes one [`EntryPointDecl`](crate::abi::EntryPointDecl) expression per
/// entry point and emits the `quill_entry_points` function the host loader
/// looks up. Invoke it exactly once per library.
///
/// # Example
/// ```rust,ignore
/// quill_extension_sdk::export_entry_points![
///     quill_extension_sdk::executor_entry_point!("echo", EchoExecutor),
/// ];
/// ```
#[macro_export]
macro_rules! export_entry_points {
    ($($decl:expr),+ $(,)?) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn quill_entry_points() -> *mut $crate::abi::EntryPointManifest {
            $crate::abi::EntryPointManifest::new(vec![$($decl),+]).into_raw()
        }
    };
}

/// Declares a `quill.cell.executor` entry point backed by a
/// `Default`-constructible executor type.
///
/// Expands to an [`EntryPointDecl`](crate::abi::EntryPointDecl) whose
/// constructor produces a fresh factory; the host builds a new executor
/// instance from it on every selection.
#[macro_export]
macro_rules! executor_entry_point {
    ($name:expr, $executor:ty) => {{
        fn __construct() -> ::std::boxed::Box<dyn ::std::any::Any + Send + Sync> {
            let factory: $crate::prelude::DynExecutorFactory = ::std::sync::Arc::new(|| {
                ::std::boxed::Box::new(<$executor as ::core::default::Default>::default())
                    as ::std::boxed::Box<dyn $crate::prelude::CellExecutor>
            });
            ::std::boxed::Box::new(factory)
        }
        $crate::abi::EntryPointDecl::new($crate::prelude::GROUP_CELL_EXECUTOR, $name, __construct)
    }};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[derive(Debug, Default)]
    struct NoopExecutor;

    #[async_trait]
    impl CellExecutor for NoopExecutor {
        fn name(&self) -> &str {
            "noop"
        }

        fn execute_cell(&self, cell: &Cell, scope: &mut CellScope) -> AppResult<Value> {
            cell.run(scope)
        }
    }

    crate::export_entry_points![crate::executor_entry_point!("noop", NoopExecutor)];

    #[test]
    fn test_exported_manifest_declares_executor() {
        let raw = quill_entry_points();
        // Safety: the pointer is fresh from the exported function above.
        let manifest = unsafe { Box::from_raw(raw) };
        assert_eq!(manifest.entries.len(), 1);

        let decl = &manifest.entries[0];
        assert_eq!(decl.group, GROUP_CELL_EXECUTOR);
        assert_eq!(decl.name, "noop");

        let value = (decl.constructor)();
        let factory = value.downcast::<DynExecutorFactory>().unwrap();
        assert_eq!(factory.create().name(), "noop");
    }
}
