//! Per-group parameter assembly.
//!
//! Purpose
//! -------
//! Turn trend coefficients, design matrices and optional random deviations
//! into the per-group curve parameters the distribution kernels consume.
//!
//! Key behaviors
//! -------------
//! - `mu = mu_mat · b_mu (+ mu_devs)`, `sigma1 = sig_mat · b_sig1
//!   (+ sigma1_devs)`, and for asymmetric models `sigma2 = sig_mat · b_sig2
//!   (+ sigma2_devs)`. Trends act on the natural scale.
//! - Under generalized-normal tails, `alpha_k = sigma_k · ratio_k` per group.
//! - [`random_effect_log_penalty`] sums the zero-mean normal log-densities of
//!   the active deviations.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter block lengths were checked against the data
//!   (`PhenologyParams::validate_for`).
//! - Scales are not clamped; non-positive `sigma` flows through as NaN.
//! - Fields a configuration does not use stay NaN so that accidental use is
//!   visible in the output.
use crate::phenology::core::{
    data::PhenologyData, options::ModelConfig, params::PhenologyParams, shapes::ShapeParams,
    special::ln_norm_density, tails::TailModel,
};
use ndarray::Array1;

/// Curve parameters of one group, as read by the tail kernels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupCurve {
    pub mu: f64,
    pub sigma1: f64,
    pub sigma2: f64,
    pub alpha1: f64,
    pub alpha2: f64,
}

/// Per-group curve parameters for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupParams {
    pub mu: Array1<f64>,
    pub sigma1: Array1<f64>,
    /// Present for asymmetric models only.
    pub sigma2: Option<Array1<f64>>,
    /// Present under generalized-normal tails only.
    pub alpha1: Option<Array1<f64>>,
    /// Present under asymmetric generalized-normal tails only.
    pub alpha2: Option<Array1<f64>>,
}

impl GroupParams {
    pub fn n_levels(&self) -> usize {
        self.mu.len()
    }

    /// Curve of group `g` (0-based). Absent fields read as NaN.
    #[inline]
    pub fn curve(&self, g: usize) -> GroupCurve {
        let opt = |a: &Option<Array1<f64>>| a.as_ref().map_or(f64::NAN, |v| v[g]);
        GroupCurve {
            mu: self.mu[g],
            sigma1: self.sigma1[g],
            sigma2: opt(&self.sigma2),
            alpha1: opt(&self.alpha1),
            alpha2: opt(&self.alpha2),
        }
    }
}

/// Assemble per-group `mu`, `sigma1`, `sigma2` and `alpha` values.
pub fn assemble_groups(
    data: &PhenologyData, params: &PhenologyParams, config: &ModelConfig, shapes: &ShapeParams,
) -> GroupParams {
    let mut mu = data.mu_mat.dot(&params.b_mu);
    let mut sigma1 = data.sig_mat.dot(&params.b_sig1);
    let mut sigma2 = config.asymmetric.then(|| data.sig_mat.dot(&params.b_sig2));

    if config.est_mu_re {
        mu += &params.mu_devs;
    }
    if config.est_sigma_re {
        sigma1 += &params.sigma1_devs;
        if let Some(s2) = sigma2.as_mut() {
            *s2 += &params.sigma2_devs;
        }
    }

    let (alpha1, alpha2) = if config.tail == TailModel::GeneralizedNormal {
        let a1 = &sigma1 * shapes.ratio_1;
        let a2 = sigma2.as_ref().map(|s2| s2 * shapes.ratio_2);
        (Some(a1), a2)
    } else {
        (None, None)
    };

    GroupParams { mu, sigma1, sigma2, alpha1, alpha2 }
}

/// Zero-mean normal log-penalties of the active random deviations.
///
/// - `mu_devs ~ N(0, exp(log_sigma_mu_devs))` when `est_mu_re`.
/// - `sigma1_devs ~ N(0, exp(log_sigma1_sd))` when `est_sigma_re`, plus
///   `sigma2_devs ~ N(0, exp(log_sigma2_sd))` when also asymmetric.
pub fn random_effect_log_penalty(params: &PhenologyParams, config: &ModelConfig) -> f64 {
    let sum_normal = |devs: &Array1<f64>, log_sd: f64| {
        let sd = log_sd.exp();
        devs.iter().map(|&d| ln_norm_density(d, 0.0, sd)).sum::<f64>()
    };
    let mut lp = 0.0;
    if config.est_mu_re {
        lp += sum_normal(&params.mu_devs, params.log_sigma_mu_devs);
    }
    if config.est_sigma_re {
        lp += sum_normal(&params.sigma1_devs, params.log_sigma1_sd);
        if config.asymmetric {
            lp += sum_normal(&params.sigma2_devs, params.log_sigma2_sd);
        }
    }
    lp
}
