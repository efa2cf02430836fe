use crate::registry::get_dataset_info;
use anyhow::{Context, Result};
use hf_hub::api::sync::Api;
use polars::prelude::*;
use std::path::Path;

/// Download a registered dataset (cached by the hub client after the first
/// call) and load it into a dataframe.
pub fn load_dataset(name: &str) -> Result<DataFrame> {
    let info = get_dataset_info(name)?;
    let api = Api::new()?;
    let path = api
        .dataset(info.repo.clone())
        .get(&info.filename)
        .with_context(|| format!("failed to retrieve '{}' from {}", info.filename, info.repo))?;
    load_dataset_from_path(path)
}

/// Load an already-local dataset file into a dataframe.
pub fn load_dataset_from_path<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use olivine_test_data::TestFile;

    #[test]
    fn test_load_dataset_from_path() {
        let (csv_path, _temp) = TestFile::dataset_regression().create_temp().unwrap();
        let df = load_dataset_from_path(&csv_path).unwrap();
        assert_eq!(df.shape(), (5, 2));
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(columns, vec!["formula", "band_gap"]);
    }

    #[test]
    fn test_load_dataset_unknown_name() {
        assert!(load_dataset("not_real_dataset").is_err());
    }
}
