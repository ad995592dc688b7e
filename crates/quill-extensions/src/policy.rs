//! Operator policy for entry point visibility.
//!
//! Two environment variables per group control which entry point names are
//! visible, e.g. for `quill.cell.executor`:
//!
//! - `QUILL_CELL_EXECUTOR_ALLOWLIST` — when set, only the listed names load
//! - `QUILL_CELL_EXECUTOR_DENYLIST` — the listed names never load
//!
//! Both hold comma-separated names and are matched case-insensitively. The
//! denylist always wins. The variables are read fresh on every check, so an
//! operator (or a test) can change policy mid-process and the next lookup
//! sees it.

use crate::ids::EntryPointGroup;

/// Name of the allowlist variable for `group`.
pub fn allowlist_var(group: &EntryPointGroup) -> String {
    format!("{}_ALLOWLIST", group.env_key())
}

/// Name of the denylist variable for `group`.
pub fn denylist_var(group: &EntryPointGroup) -> String {
    format!("{}_DENYLIST", group.env_key())
}

/// Reads one list variable from the environment.
///
/// Returns `None` when the variable is unset or contains no names after
/// trimming. A variable set to an empty (or all-whitespace, or all-comma)
/// string therefore means "no restriction", not "deny everything".
fn read_list(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    let names: Vec<String> = raw
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() { None } else { Some(names) }
}

/// Decides whether `name` is visible for `group` under the current
/// environment.
///
/// With neither variable set every name is allowed. Matching ignores case;
/// callers keep names in their original case for storage and display.
pub fn is_entry_point_allowed(group: &EntryPointGroup, name: &str) -> bool {
    let needle = name.to_lowercase();
    if let Some(denied) = read_list(&denylist_var(group)) {
        if denied.contains(&needle) {
            return false;
        }
    }
    if let Some(allowed) = read_list(&allowlist_var(group)) {
        return allowed.contains(&needle);
    }
    true
}
