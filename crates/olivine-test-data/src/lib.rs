//! olivine-test-data
//!
//! A module to provide test files embedded in the crate for use in testing.
//! The fixtures are represented as `TestFile` objects which package the raw
//! data and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use olivine_test_data::TestFile;
/// let (structure_file, _temp) = TestFile::structure_nacl().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Rock-salt NaCl, conventional cubic cell (8 sites, a = 5.64 A).
    pub fn structure_nacl() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/nacl.json"),
            suffix: "json",
        }
    }
    /// FCC Cu0.5Au0.5 solid solution; every site is disordered.
    pub fn structure_disordered() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/cuau_disordered.json"),
            suffix: "json",
        }
    }
    /// Atomic-number -> embedding-vector table for the graph network.
    pub fn atom_init() -> Self {
        Self {
            filebinary: include_bytes!("../data/embeddings/atom_init.json"),
            suffix: "json",
        }
    }
    /// Small formula/band-gap regression table.
    pub fn dataset_regression() -> Self {
        Self {
            filebinary: include_bytes!("../data/datasets/sample_regression.csv"),
            suffix: "csv",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
