use crate::cli::FeaturizerKind;
use anyhow::Result;
use olivine_core::Structure;
use olivine_featurizers::{
    featurize_structure, AngularFourierSeries, GaussianSymmFunc, SiteFeaturizer,
};
use std::fs::File;
use std::io::Write;

pub fn execute(input: String, output: String, kind: FeaturizerKind) -> Result<()> {
    let structure = Structure::from_json_file(&input)?;

    let featurizer: Box<dyn SiteFeaturizer> = match kind {
        FeaturizerKind::Gaussian => Box::new(GaussianSymmFunc::default()),
        FeaturizerKind::Afs => {
            Box::new(AngularFourierSeries::from_preset("gaussian", 0.5, 0.5, 10.0)?)
        }
    };

    let labels = featurizer.feature_labels();
    let rows = featurize_structure(featurizer.as_ref(), &structure)?;

    let mut file = File::create(&output)?;
    writeln!(file, "site,{}", labels.join(","))?;
    for (idx, row) in rows.iter().enumerate() {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(file, "{},{}", idx, values.join(","))?;
    }

    println!(
        "Wrote {} features for {} sites to {}",
        labels.len(),
        rows.len(),
        output
    );
    Ok(())
}
