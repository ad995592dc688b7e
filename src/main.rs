//! Quill Host — Reactive Notebook Platform
//!
//! Main entry point that wires the extension system together: loads
//! configuration, registers bundled extensions, discovers installed ones,
//! and runs a small demonstration notebook through the selected executor.

use std::sync::Arc;

use clap::Parser;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use quill_core::AppResult;
use quill_core::config::AppConfig;
use quill_extensions::{EntryPointGroup, LibrarySource, policy};
use quill_runtime::{Cell, CellScope, executor_registry, get_executor};

#[derive(Parser, Debug)]
#[command(name = "quill-host", version, about = "Quill reactive notebook host")]
struct Cli {
    /// Configuration environment to load (overrides QUILL_ENV)
    #[arg(long)]
    env: Option<String>,

    /// Force the strict builtin executor
    #[arg(long)]
    strict: bool,

    /// Select an executor entry point by name
    #[arg(long)]
    executor: Option<String>,

    /// Print entry point diagnostics and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment, then apply CLI overrides
fn load_configuration(cli: &Cli) -> AppResult<AppConfig> {
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("QUILL_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let mut config = AppConfig::load(&env)?;

    if cli.strict {
        config.execution.is_strict = true;
    }
    if let Some(name) = &cli.executor {
        config.execution.executor = Some(name.clone());
    }

    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Quill host v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Register bundled extensions ──────────────────────
    bootstrap_extensions(&config);

    // ── Step 2: Entry point diagnostics ──────────────────────────
    report_entry_points();
    if cli.list {
        return Ok(());
    }

    // ── Step 3: Run the demonstration notebook ───────────────────
    let executor = get_executor(&config.execution)?;
    tracing::info!(executor = executor.name(), "executor selected");

    let mut scope = CellScope::new();
    for cell in demo_notebook() {
        let output = executor.execute_cell_async(&cell, &mut scope).await?;
        tracing::info!(cell_id = %cell.id, output = %output, "cell executed");
    }

    let rendered = serde_json::to_string_pretty(&scope)?;
    tracing::info!("Notebook finished. Final scope:\n{}", rendered);
    Ok(())
}

/// Register compiled-in extensions and attach shared-library discovery
fn bootstrap_extensions(config: &AppConfig) {
    let mut registry = executor_registry().write();

    plugin_profiler::register(&mut registry);

    if config.extensions.auto_discover {
        tracing::info!(
            directory = %config.extensions.directory,
            "attaching extension library discovery"
        );
        registry.set_source(Arc::new(LibrarySource::new(&config.extensions.directory)));
    } else {
        tracing::info!("extension discovery disabled");
    }
}

/// Log the policy state of every known group and the visible executors
fn report_entry_points() {
    for group in EntryPointGroup::KNOWN {
        let allow = std::env::var(policy::allowlist_var(&group)).ok();
        let deny = std::env::var(policy::denylist_var(&group)).ok();
        tracing::info!(
            group = %group,
            allowlist = allow.as_deref().unwrap_or("<unset>"),
            denylist = deny.as_deref().unwrap_or("<unset>"),
            "entry point policy"
        );
    }

    let registry = executor_registry().read();
    tracing::info!(
        group = %registry.group(),
        executors = ?registry.names(),
        "visible executors"
    );
}

/// A three-cell notebook exercising refs and defs
fn demo_notebook() -> Vec<Cell> {
    use serde_json::{Value, json};

    vec![
        Cell::new("cell-1", "x = 40", |scope: &mut CellScope| {
            scope.insert("x".to_string(), json!(40));
            Ok(Value::Null)
        })
        .with_defs(["x"]),
        Cell::new("cell-2", "y = x + 2", |scope: &mut CellScope| {
            let x = scope.get("x").and_then(Value::as_i64).unwrap_or_default();
            scope.insert("y".to_string(), json!(x + 2));
            Ok(json!(x + 2))
        })
        .with_refs(["x"])
        .with_defs(["y"]),
        Cell::new("cell-3", "show(y)", |scope: &mut CellScope| {
            Ok(scope.get("y").cloned().unwrap_or(Value::Null))
        })
        .with_refs(["y"]),
    ]
}
