//! Shared-library discovery backed by `libloading`.
//!
//! Compiled only with the `dynamic` feature. Without it a stub with the same
//! surface is provided so host code does not need its own feature gates.

#[cfg(feature = "dynamic")]
pub mod library_source {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use libloading::{Library, Symbol};
    use parking_lot::Mutex;
    use tracing::{info, warn};

    use quill_core::error::AppError;
    use quill_core::result::AppResult;

    use crate::abi::{ENTRY_POINTS_SYMBOL, EntryPointManifest, EntryPointsFn};
    use crate::ids::EntryPointGroup;
    use crate::source::{DiscoveredEntryPoint, EntryPointSource};

    #[cfg(target_os = "windows")]
    const LIBRARY_EXTENSION: &str = "dll";
    #[cfg(target_os = "macos")]
    const LIBRARY_EXTENSION: &str = "dylib";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    const LIBRARY_EXTENSION: &str = "so";

    struct LoadedLibrary {
        // Keeps the library mapped; manifest strings and constructors point
        // into it.
        _library: Library,
        manifest: EntryPointManifest,
    }

    /// Entry point source that scans a directory for extension libraries.
    ///
    /// Each library is opened at most once per process and stays mapped until
    /// exit, so constructors handed out by [`discover`] remain callable for
    /// as long as the host runs. Libraries that cannot be opened, export no
    /// manifest symbol, or return a null manifest are logged and skipped.
    ///
    /// Opening a library runs its initialization code. Point this source only
    /// at directories the operator controls.
    ///
    /// [`discover`]: EntryPointSource::discover
    pub struct LibrarySource {
        directory: PathBuf,
        loaded: Mutex<HashMap<PathBuf, Arc<LoadedLibrary>>>,
    }

    impl LibrarySource {
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            Self {
                directory: directory.into(),
                loaded: Mutex::new(HashMap::new()),
            }
        }

        pub fn directory(&self) -> &Path {
            &self.directory
        }

        /// Opens one library and takes ownership of its manifest.
        ///
        /// # Safety
        ///
        /// Runs arbitrary initialization code from the library. The caller
        /// must trust the file being loaded.
        unsafe fn load_library(path: &Path) -> AppResult<LoadedLibrary> {
            // Safety: contract forwarded from this function.
            let library = unsafe { Library::new(path) }.map_err(|e| {
                AppError::extension(format!("failed to open '{}': {}", path.display(), e))
            })?;
            // Safety: the symbol type matches the exported signature; every
            // extension is built against the same ABI crate.
            let entry_points: Symbol<'_, EntryPointsFn> =
                unsafe { library.get(ENTRY_POINTS_SYMBOL) }.map_err(|e| {
                    AppError::extension(format!(
                        "'{}' does not export an entry point manifest: {}",
                        path.display(),
                        e
                    ))
                })?;
            // Safety: the exported function hands over a Box::into_raw
            // pointer, reclaimed exactly once here.
            let raw = unsafe { entry_points() };
            if raw.is_null() {
                return Err(AppError::extension(format!(
                    "'{}' returned a null manifest",
                    path.display()
                )));
            }
            let manifest = *unsafe { Box::from_raw(raw) };
            Ok(LoadedLibrary {
                _library: library,
                manifest,
            })
        }

        /// Scans the directory, loading any library not seen before, and
        /// returns a snapshot of everything loaded so far.
        fn scan(&self) -> Vec<Arc<LoadedLibrary>> {
            let mut loaded = self.loaded.lock();
            match std::fs::read_dir(&self.directory) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        let path = entry.path();
                        if path.extension().and_then(|e| e.to_str()) != Some(LIBRARY_EXTENSION) {
                            continue;
                        }
                        if loaded.contains_key(&path) {
                            continue;
                        }
                        // Safety: the directory is operator-configured and
                        // trusted, per the type's contract.
                        match unsafe { Self::load_library(&path) } {
                            Ok(library) => {
                                info!(
                                    path = %path.display(),
                                    entries = library.manifest.entries.len(),
                                    "extension library loaded"
                                );
                                loaded.insert(path, Arc::new(library));
                            }
                            Err(e) => {
                                warn!(path = %path.display(), error = %e, "skipping extension library");
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(directory = %self.directory.display(), error = %e, "extension directory not readable");
                }
            }
            loaded.values().cloned().collect()
        }
    }

    impl std::fmt::Debug for LibrarySource {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("LibrarySource")
                .field("directory", &self.directory)
                .field("loaded", &self.loaded.lock().len())
                .finish()
        }
    }

    impl<V: Send + Sync + 'static> EntryPointSource<V> for LibrarySource {
        fn discover(&self, group: &EntryPointGroup) -> Vec<DiscoveredEntryPoint<V>> {
            let mut found = Vec::new();
            for library in self.scan() {
                for decl in &library.manifest.entries {
                    if decl.group != group.as_str() {
                        continue;
                    }
                    let name = decl.name;
                    let constructor = decl.constructor;
                    let library = Arc::clone(&library);
                    found.push(DiscoveredEntryPoint::new(name, move || {
                        // The captured Arc keeps the library mapped while the
                        // loader (and anything it constructs) is alive.
                        let _keep_alive = &library;
                        constructor().downcast::<V>().map(|value| *value).map_err(|_| {
                            AppError::extension(format!(
                                "entry point '{name}' constructed a value of the wrong type"
                            ))
                        })
                    }));
                }
            }
            found
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_missing_directory_discovers_nothing() {
            let source = LibrarySource::new("/nonexistent/quill/extensions");
            let discovered: Vec<DiscoveredEntryPoint<String>> =
                source.discover(&EntryPointGroup::CellExecutor);
            assert!(discovered.is_empty());
        }

        #[test]
        fn test_non_library_files_are_ignored() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("readme.txt"), b"not a library").unwrap();
            let source = LibrarySource::new(dir.path());
            let discovered: Vec<DiscoveredEntryPoint<String>> =
                source.discover(&EntryPointGroup::CellExecutor);
            assert!(discovered.is_empty());
        }

        #[test]
        fn test_broken_library_is_skipped_not_fatal() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(format!("broken.{LIBRARY_EXTENSION}"));
            let mut file = std::fs::File::create(&path).unwrap();
            file.write_all(b"definitely not an object file").unwrap();
            drop(file);

            let source = LibrarySource::new(dir.path());
            let discovered: Vec<DiscoveredEntryPoint<String>> =
                source.discover(&EntryPointGroup::CellExecutor);
            assert!(discovered.is_empty());
            // The failed file is retried on the next scan rather than cached.
            assert!(source.loaded.lock().is_empty());
        }
    }
}

#[cfg(not(feature = "dynamic"))]
pub mod library_source {
    //! Stub used when the `dynamic` feature is disabled.

    use std::path::{Path, PathBuf};

    use tracing::debug;

    use crate::ids::EntryPointGroup;
    use crate::source::{DiscoveredEntryPoint, EntryPointSource};

    /// Inert stand-in for the `libloading`-backed source.
    #[derive(Debug)]
    pub struct LibrarySource {
        directory: PathBuf,
    }

    impl LibrarySource {
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            debug!("dynamic extension loading disabled at compile time");
            Self {
                directory: directory.into(),
            }
        }

        pub fn directory(&self) -> &Path {
            &self.directory
        }
    }

    impl<V: Send + Sync + 'static> EntryPointSource<V> for LibrarySource {
        fn discover(&self, _group: &EntryPointGroup) -> Vec<DiscoveredEntryPoint<V>> {
            Vec::new()
        }
    }
}

pub use library_source::LibrarySource;
