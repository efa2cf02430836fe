use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Metadata for one registered dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub description: String,
    /// HuggingFace hub dataset repository holding the file.
    pub repo: String,
    pub filename: String,
    pub file_type: String,
    pub num_entries: usize,
    pub reference: String,
    pub citations: Vec<String>,
    /// Column name -> human-readable description.
    pub columns: HashMap<String, String>,
}

/// Sort order for [`get_available_datasets`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortMethod {
    Alphabetical,
    /// Descending by number of entries.
    NumEntries,
}

static REGISTRY: OnceLock<HashMap<String, DatasetInfo>> = OnceLock::new();

fn registry() -> &'static HashMap<String, DatasetInfo> {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(include_str!("datasets.json"))
            .expect("embedded dataset registry is valid JSON")
    })
}

/// Names of all registered datasets.
pub fn get_available_datasets(sort_method: SortMethod) -> Vec<String> {
    let mut names: Vec<String> = registry().keys().cloned().collect();
    match sort_method {
        SortMethod::Alphabetical => names.sort(),
        SortMethod::NumEntries => {
            names.sort_by_key(|name| std::cmp::Reverse(registry()[name].num_entries))
        }
    }
    names
}

/// Look up a dataset by name. Unknown names fail with a hint listing
/// similarly named datasets when any exist.
pub fn get_dataset_info(name: &str) -> Result<&'static DatasetInfo> {
    registry().get(name).ok_or_else(|| {
        let similar: Vec<&str> = registry()
            .keys()
            .filter(|known| known.contains(name) || name.contains(known.as_str()))
            .map(|known| known.as_str())
            .collect();
        if similar.is_empty() {
            anyhow!(
                "'{name}' is not an available dataset, see get_available_datasets() \
                 for the full list"
            )
        } else {
            anyhow!("'{name}' is not an available dataset, did you mean one of {similar:?}?")
        }
    })
}

pub fn get_dataset_description(name: &str) -> Result<String> {
    Ok(get_dataset_info(name)?.description.clone())
}

pub fn get_dataset_num_entries(name: &str) -> Result<usize> {
    Ok(get_dataset_info(name)?.num_entries)
}

pub fn get_dataset_columns(name: &str) -> Result<Vec<String>> {
    let mut columns: Vec<String> = get_dataset_info(name)?.columns.keys().cloned().collect();
    columns.sort();
    Ok(columns)
}

pub fn get_dataset_column_description(name: &str, column: &str) -> Result<String> {
    get_dataset_info(name)?
        .columns
        .get(column)
        .cloned()
        .ok_or_else(|| anyhow!("dataset '{name}' has no column '{column}'"))
}

pub fn get_dataset_reference(name: &str) -> Result<String> {
    Ok(get_dataset_info(name)?.reference.clone())
}

pub fn get_dataset_citations(name: &str) -> Result<Vec<String>> {
    Ok(get_dataset_info(name)?.citations.clone())
}

/// Look up one metadata field by its registry key, for generic tooling that
/// does not know the field ahead of time. The typed accessors above are
/// preferred when the field is known.
pub fn get_dataset_attribute(name: &str, attribute: &str) -> Result<serde_json::Value> {
    let value = serde_json::to_value(get_dataset_info(name)?)?;
    value
        .get(attribute)
        .cloned()
        .ok_or_else(|| anyhow!("dataset '{name}' has no attribute '{attribute}'"))
}
