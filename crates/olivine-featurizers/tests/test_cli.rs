use assert_cmd::Command;
use olivine_test_data::TestFile;

#[test]
fn test_cli_featurize_gaussian() {
    let (structure_file, _tmp) = TestFile::structure_nacl().create_temp().unwrap();
    let output = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

    let mut cmd = Command::cargo_bin("olivine-featurizers").unwrap();
    cmd.arg("featurize")
        .arg("--input")
        .arg(structure_file)
        .arg("--output")
        .arg(output.path());
    cmd.assert().success();

    let contents = std::fs::read_to_string(output.path()).unwrap();
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("site,G2_0.05,G2_4,G2_20,G2_80"));
    // one row per site in the conventional NaCl cell
    assert_eq!(lines.count(), 8);
}

#[test]
fn test_cli_featurize_disordered_afs_fails() {
    let (structure_file, _tmp) = TestFile::structure_disordered().create_temp().unwrap();
    let output = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

    let mut cmd = Command::cargo_bin("olivine-featurizers").unwrap();
    cmd.arg("featurize")
        .arg("--input")
        .arg(structure_file)
        .arg("--output")
        .arg(output.path())
        .arg("--featurizer")
        .arg("afs");
    cmd.assert().failure();
}
