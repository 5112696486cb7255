//! Tail shape parameters: Student-t df, generalized-normal beta, and their
//! gamma priors.
//!
//! Shapes are shared by every group. They are derived once per evaluation
//! from the log-scale parameters:
//!
//! - `tdf_k = exp(log_tdf_k) + 2` (so `tdf ≥ 2`),
//! - `beta_k = exp(log_beta_k)`,
//! - with `share_shape`, side 2 is overwritten by side 1 after both are
//!   derived,
//! - under generalized-normal tails, the scale ratios
//!   `ratio_k = sqrt(Γ(1/β_k) / Γ(3/β_k))` (side 2 only when asymmetric;
//!   otherwise it mirrors side 1).
use crate::phenology::core::{
    options::ModelConfig, params::PhenologyParams, single_sided::gnorm_scale_ratio,
    special::ln_gamma_density, tails::TailModel,
};

/// Evaluation-wide shape parameters for both sides of the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub tdf_1: f64,
    pub tdf_2: f64,
    pub beta_1: f64,
    pub beta_2: f64,
    /// Generalized-normal `α/σ` for side 1 (NaN unless tails are gen-normal).
    pub ratio_1: f64,
    pub ratio_2: f64,
}

impl ShapeParams {
    /// Derive the shapes for one evaluation.
    pub fn derive(params: &PhenologyParams, config: &ModelConfig) -> Self {
        let tdf_1 = params.log_tdf_1.exp() + 2.0;
        let beta_1 = params.log_beta_1.exp();
        let (tdf_2, beta_2) = if config.share_shape {
            (tdf_1, beta_1)
        } else {
            (params.log_tdf_2.exp() + 2.0, params.log_beta_2.exp())
        };

        let (ratio_1, ratio_2) = if config.tail == TailModel::GeneralizedNormal {
            let r1 = gnorm_scale_ratio(beta_1);
            let r2 = if config.asymmetric { gnorm_scale_ratio(beta_2) } else { r1 };
            (r1, r2)
        } else {
            (f64::NAN, f64::NAN)
        };

        ShapeParams { tdf_1, tdf_2, beta_1, beta_2, ratio_1, ratio_2 }
    }

    /// Sum of the active gamma log-priors on the shapes.
    ///
    /// Side 2 contributes only for asymmetric models.
    pub fn log_prior(&self, config: &ModelConfig) -> f64 {
        let mut lp = 0.0;
        if config.t_prior_active() {
            let (k, theta) = (config.nu_prior.shape, config.nu_prior.scale);
            lp += ln_gamma_density(self.tdf_1, k, theta);
            if config.asymmetric {
                lp += ln_gamma_density(self.tdf_2, k, theta);
            }
        }
        if config.beta_prior_active() {
            let (k, theta) = (config.beta_prior.shape, config.beta_prior.scale);
            lp += ln_gamma_density(self.beta_1, k, theta);
            if config.asymmetric {
                lp += ln_gamma_density(self.beta_2, k, theta);
            }
        }
        lp
    }
}
