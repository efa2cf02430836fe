use candle_core::{Module, Result, Tensor};
use candle_nn::ops::sigmoid;
use candle_nn::{linear, Linear, VarBuilder};

/// Numerically stable `log(1 + exp(x))`.
pub(crate) fn softplus(xs: &Tensor) -> Result<Tensor> {
    let relu = xs.relu()?;
    let log1p = ((xs.abs()?.neg()?.exp()? + 1.0)?).log()?;
    &relu + &log1p
}

/// One gated graph-convolution layer.
///
/// Each atom gathers its neighbors' features, concatenates them with its own
/// features and the bond features, and passes the result through a single
/// linear map split into a sigmoid filter and a softplus core. The filtered
/// core is summed over neighbors and added back to the atom features.
pub struct ConvLayer {
    fc_full: Linear,
    fea_len: usize,
}

impl ConvLayer {
    pub fn new(atom_fea_len: usize, nbr_fea_len: usize, vb: VarBuilder) -> Result<Self> {
        let fc_full = linear(
            2 * atom_fea_len + nbr_fea_len,
            2 * atom_fea_len,
            vb.pp("fc_full"),
        )?;
        Ok(ConvLayer {
            fc_full,
            fea_len: atom_fea_len,
        })
    }

    /// `atom_fea [N, fea_len]`, `nbr_fea [N, M, nbr_fea_len]`,
    /// `nbr_idx [N, M]` -> `[N, fea_len]`.
    pub fn forward(&self, atom_fea: &Tensor, nbr_fea: &Tensor, nbr_idx: &Tensor) -> Result<Tensor> {
        let (n, m) = nbr_idx.dims2()?;
        let flat_idx = nbr_idx.reshape((n * m,))?;
        let atom_nbr_fea = atom_fea
            .index_select(&flat_idx, 0)?
            .reshape((n, m, self.fea_len))?;
        let atom_self_fea = atom_fea
            .unsqueeze(1)?
            .expand((n, m, self.fea_len))?
            .contiguous()?;

        let total = Tensor::cat(&[&atom_self_fea, &atom_nbr_fea, nbr_fea], 2)?;
        let gated = self.fc_full.forward(&total)?;
        let filter = sigmoid(&gated.narrow(2, 0, self.fea_len)?)?;
        let core = softplus(&gated.narrow(2, self.fea_len, self.fea_len)?)?;
        let summed = (filter * core)?.sum(1)?;
        softplus(&(atom_fea + summed)?)
    }
}

#[derive(Debug, Clone)]
pub struct CrystalGraphConvNetConfig {
    pub orig_atom_fea_len: usize,
    pub nbr_fea_len: usize,
    pub atom_fea_len: usize,
    pub n_conv: usize,
    pub h_fea_len: usize,
    pub n_h: usize,
}

impl CrystalGraphConvNetConfig {
    /// Default network sizes for the given input feature lengths.
    pub fn with_feature_lens(orig_atom_fea_len: usize, nbr_fea_len: usize) -> Self {
        CrystalGraphConvNetConfig {
            orig_atom_fea_len,
            nbr_fea_len,
            atom_fea_len: 64,
            n_conv: 3,
            h_fea_len: 128,
            n_h: 1,
        }
    }
}

/// Crystal-graph convolutional network for scalar property regression.
pub struct CrystalGraphConvNet {
    embedding: Linear,
    convs: Vec<ConvLayer>,
    conv_to_fc: Linear,
    fcs: Vec<Linear>,
    fc_out: Linear,
}

impl CrystalGraphConvNet {
    pub fn new(config: &CrystalGraphConvNetConfig, vb: VarBuilder) -> Result<Self> {
        let embedding = linear(
            config.orig_atom_fea_len,
            config.atom_fea_len,
            vb.pp("embedding"),
        )?;
        let mut convs = Vec::with_capacity(config.n_conv);
        for i in 0..config.n_conv {
            convs.push(ConvLayer::new(
                config.atom_fea_len,
                config.nbr_fea_len,
                vb.pp(format!("conv{i}")),
            )?);
        }
        let conv_to_fc = linear(config.atom_fea_len, config.h_fea_len, vb.pp("conv_to_fc"))?;
        let mut fcs = Vec::with_capacity(config.n_h.saturating_sub(1));
        for i in 0..config.n_h.saturating_sub(1) {
            fcs.push(linear(config.h_fea_len, config.h_fea_len, vb.pp(format!("fc{i}")))?);
        }
        let fc_out = linear(config.h_fea_len, 1, vb.pp("fc_out"))?;
        Ok(CrystalGraphConvNet {
            embedding,
            convs,
            conv_to_fc,
            fcs,
            fc_out,
        })
    }

    /// `crystal_atom_idx` maps each crystal in the batch to its rows of
    /// `atom_fea`; the output is `[n_crystals, 1]`.
    pub fn forward(
        &self,
        atom_fea: &Tensor,
        nbr_fea: &Tensor,
        nbr_idx: &Tensor,
        crystal_atom_idx: &[Tensor],
    ) -> Result<Tensor> {
        let mut fea = self.embedding.forward(atom_fea)?;
        for conv in &self.convs {
            fea = conv.forward(&fea, nbr_fea, nbr_idx)?;
        }
        let pooled = self.pool(&fea, crystal_atom_idx)?;
        let mut crys_fea = softplus(&self.conv_to_fc.forward(&softplus(&pooled)?)?)?;
        for fc in &self.fcs {
            crys_fea = softplus(&fc.forward(&crys_fea)?)?;
        }
        self.fc_out.forward(&crys_fea)
    }

    fn pool(&self, atom_fea: &Tensor, crystal_atom_idx: &[Tensor]) -> Result<Tensor> {
        let mut pooled = Vec::with_capacity(crystal_atom_idx.len());
        for idx_map in crystal_atom_idx {
            pooled.push(atom_fea.index_select(idx_map, 0)?.mean(0)?);
        }
        Tensor::stack(&pooled, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_softplus_matches_naive_form() {
        let device = Device::Cpu;
        let xs = Tensor::from_vec(vec![-2.0f32, 0.0, 3.0], (3,), &device).unwrap();
        let values: Vec<f32> = softplus(&xs).unwrap().to_vec1().unwrap();
        for (value, x) in values.iter().zip([-2.0f32, 0.0, 3.0]) {
            assert!((value - (1.0 + x.exp()).ln()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_conv_layer_shapes() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let conv = ConvLayer::new(4, 3, vb).unwrap();

        let atom_fea = Tensor::randn(0f32, 1.0, (5, 4), &device).unwrap();
        let nbr_fea = Tensor::randn(0f32, 1.0, (5, 2, 3), &device).unwrap();
        let nbr_idx =
            Tensor::from_vec(vec![1u32, 2, 0, 3, 4, 1, 2, 0, 3, 4], (5, 2), &device).unwrap();
        let out = conv.forward(&atom_fea, &nbr_fea, &nbr_idx).unwrap();
        assert_eq!(out.dims(), &[5, 4]);
    }

    #[test]
    fn test_network_forward_shapes() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let config = CrystalGraphConvNetConfig {
            orig_atom_fea_len: 8,
            nbr_fea_len: 5,
            atom_fea_len: 16,
            n_conv: 2,
            h_fea_len: 32,
            n_h: 2,
        };
        let model = CrystalGraphConvNet::new(&config, vb).unwrap();

        // Two crystals of 3 atoms each, 4 neighbors per atom.
        let atom_fea = Tensor::randn(0f32, 1.0, (6, 8), &device).unwrap();
        let nbr_fea = Tensor::randn(0f32, 1.0, (6, 4, 5), &device).unwrap();
        let nbr_idx = Tensor::from_vec(
            vec![
                0u32, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2, 3, 4, 5, 3, 4, 5, 3, 4, 5, 3, 4, 5,
            ],
            (6, 4),
            &device,
        )
        .unwrap();
        let crystal_atom_idx = vec![
            Tensor::arange(0u32, 3, &device).unwrap(),
            Tensor::arange(3u32, 6, &device).unwrap(),
        ];
        let out = model
            .forward(&atom_fea, &nbr_fea, &nbr_idx, &crystal_atom_idx)
            .unwrap();
        assert_eq!(out.dims(), &[2, 1]);
    }
}
