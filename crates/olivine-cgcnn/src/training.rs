use crate::data::{collate, CrystalGraph, CrystalGraphDataset};
use crate::model::CrystalGraphConvNet;
use anyhow::Result;
use candle_core::{DType, Tensor};
use candle_nn::{AdamW, Optimizer};

/// Normalize a target tensor and restore it later.
#[derive(Debug, Clone)]
pub struct Normalizer {
    mean: f64,
    std: f64,
}

impl Normalizer {
    /// The sample tensor provides the mean and standard deviation.
    pub fn new(sample: &Tensor) -> Result<Self> {
        let sample = sample.to_dtype(DType::F64)?;
        let mean = sample.mean_all()?.to_scalar::<f64>()?;
        let std = (sample - mean)?
            .sqr()?
            .mean_all()?
            .to_scalar::<f64>()?
            .sqrt();
        Ok(Normalizer { mean, std })
    }

    pub fn norm(&self, tensor: &Tensor) -> Result<Tensor> {
        let normed = ((tensor - self.mean)? / self.std)?;
        Ok(normed)
    }

    pub fn denorm(&self, normed: &Tensor) -> Result<Tensor> {
        let tensor = ((normed * self.std)? + self.mean)?;
        Ok(tensor)
    }
}

/// Computes and stores the average and current value.
#[derive(Debug, Default, Clone)]
pub struct AverageMeter {
    pub val: f64,
    pub avg: f64,
    pub sum: f64,
    pub count: usize,
}

impl AverageMeter {
    pub fn reset(&mut self) {
        *self = AverageMeter::default();
    }

    pub fn update(&mut self, val: f64, n: usize) {
        self.val = val;
        self.sum += val * n as f64;
        self.count += n;
        self.avg = self.sum / self.count as f64;
    }
}

/// Mean absolute error between prediction and target.
pub fn mae(prediction: &Tensor, target: &Tensor) -> Result<f64> {
    let error = (target - prediction)?
        .abs()?
        .to_dtype(DType::F64)?
        .mean_all()?
        .to_scalar::<f64>()?;
    Ok(error)
}

fn batches(dataset: &CrystalGraphDataset, batch_size: usize) -> Vec<(usize, usize)> {
    (0..dataset.len())
        .step_by(batch_size)
        .map(|start| (start, (start + batch_size).min(dataset.len())))
        .collect()
}

fn load_batch(dataset: &CrystalGraphDataset, start: usize, end: usize) -> Result<Vec<CrystalGraph>> {
    (start..end).map(|idx| dataset.get(idx)).collect()
}

/// One training epoch over the dataset.
pub fn train(
    dataset: &CrystalGraphDataset,
    model: &CrystalGraphConvNet,
    optimizer: &mut AdamW,
    epoch: usize,
    normalizer: &Normalizer,
    batch_size: usize,
    print_freq: usize,
) -> Result<()> {
    let mut losses = AverageMeter::default();
    let mut mae_errors = AverageMeter::default();
    let batch_bounds = batches(dataset, batch_size);
    let n_batches = batch_bounds.len();

    for (i, (start, end)) in batch_bounds.into_iter().enumerate() {
        let batch = load_batch(dataset, start, end)?;
        let (atom_fea, nbr_fea, nbr_idx, crystal_atom_idx, target) = collate(&batch)?;

        let output = model.forward(&atom_fea, &nbr_fea, &nbr_idx, &crystal_atom_idx)?;
        let target_normed = normalizer.norm(&target)?;
        let loss = candle_nn::loss::mse(&output, &target_normed)?;
        optimizer.backward_step(&loss)?;

        let batch_mae = mae(&normalizer.denorm(&output.detach())?, &target)?;
        let n = end - start;
        losses.update(loss.to_dtype(DType::F64)?.to_scalar::<f64>()?, n);
        mae_errors.update(batch_mae, n);

        if i % print_freq == 0 {
            println!(
                "Epoch: [{epoch}][{i}/{n_batches}]\t\
                 Loss {:.4} ({:.4})\t\
                 MAE {:.3} ({:.3})",
                losses.val, losses.avg, mae_errors.val, mae_errors.avg
            );
        }
    }
    Ok(())
}

/// Evaluate the model over the dataset; returns the average MAE.
pub fn validate(
    dataset: &CrystalGraphDataset,
    model: &CrystalGraphConvNet,
    normalizer: &Normalizer,
    batch_size: usize,
    print_freq: usize,
) -> Result<f64> {
    let mut losses = AverageMeter::default();
    let mut mae_errors = AverageMeter::default();
    let batch_bounds = batches(dataset, batch_size);
    let n_batches = batch_bounds.len();

    for (i, (start, end)) in batch_bounds.into_iter().enumerate() {
        let batch = load_batch(dataset, start, end)?;
        let (atom_fea, nbr_fea, nbr_idx, crystal_atom_idx, target) = collate(&batch)?;

        let output = model
            .forward(&atom_fea, &nbr_fea, &nbr_idx, &crystal_atom_idx)?
            .detach();
        let target_normed = normalizer.norm(&target)?;
        let loss = candle_nn::loss::mse(&output, &target_normed)?;

        let batch_mae = mae(&normalizer.denorm(&output)?, &target)?;
        let n = end - start;
        losses.update(loss.to_dtype(DType::F64)?.to_scalar::<f64>()?, n);
        mae_errors.update(batch_mae, n);

        if i % print_freq == 0 {
            println!(
                "Test: [{i}/{n_batches}]\t\
                 Loss {:.4} ({:.4})\t\
                 MAE {:.3} ({:.3})",
                losses.val, losses.avg, mae_errors.val, mae_errors.avg
            );
        }
    }
    println!(" * MAE {:.3}", mae_errors.avg);
    Ok(mae_errors.avg)
}
