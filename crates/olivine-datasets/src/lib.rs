//! olivine-datasets
//!
//! Metadata registry and retrieval for benchmark materials datasets.
//! Dataset files are downloaded from the HuggingFace hub on first use and
//! loaded into polars dataframes; the registry itself is embedded in the
//! crate and served without network access.
//!
mod registry;
mod retrieval;

pub use registry::{
    get_available_datasets, get_dataset_attribute, get_dataset_citations,
    get_dataset_column_description, get_dataset_columns, get_dataset_description,
    get_dataset_info, get_dataset_num_entries, get_dataset_reference, DatasetInfo, SortMethod,
};
pub use retrieval::{load_dataset, load_dataset_from_path};
