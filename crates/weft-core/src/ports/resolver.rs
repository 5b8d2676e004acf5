//! Resolver ports - binding function references to runtimes.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{FnRef, ResolveError, TaskSpec};

/// A single function runtime that can look up functions by name.
#[async_trait]
pub trait RuntimeResolver: Send + Sync {
    /// Returns the runtime-specific id of the function called `name`.
    async fn resolve(&self, name: &str) -> Result<String, ResolveError>;
}

/// Resolves a task's `function_ref` to a concrete function.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, target: &str) -> Result<FnRef, ResolveError>;
}

/// Resolves the functions of all `tasks`.
///
/// Returns `function_ref -> FnRef`. Each distinct reference is resolved once;
/// the first failure aborts the whole resolution.
pub async fn resolve_tasks(
    resolver: &dyn Resolver,
    tasks: &BTreeMap<String, TaskSpec>,
) -> Result<BTreeMap<String, FnRef>, ResolveError> {
    let mut resolved = BTreeMap::new();
    for task in tasks.values() {
        if resolved.contains_key(&task.function_ref) {
            continue;
        }
        let fn_ref = resolver.resolve(&task.function_ref).await?;
        resolved.insert(task.function_ref.clone(), fn_ref);
    }
    Ok(resolved)
}
