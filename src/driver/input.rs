use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::pipeline::WorkItem;

/// Load work item records from a JSON or YAML array
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let items: Vec<WorkItem> = match extension.as_deref() {
        Some("yaml" | "yml") => serde_yml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML input: {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON input: {}", path.display()))?,
    };

    warn_on_duplicate_ids(&items);
    tracing::info!("Loaded {} work items from {}", items.len(), path.display());
    Ok(items)
}

fn warn_on_duplicate_ids(items: &[WorkItem]) {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            tracing::warn!("Duplicate work item id '{}'", item.id);
        }
    }
}
