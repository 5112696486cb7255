//! Observation families for the count likelihood.
//!
//! [`ObsFamily`] names the five ways an observed count `y` can relate to the
//! log-scale prediction `pred = log_dens + theta`:
//!
//! | family | log-likelihood |
//! |---|---|
//! | Gaussian | `ln N(y; pred, σ_obs)` |
//! | Poisson | `ln Pois(y; exp(min(pred, 20)))` |
//! | NegativeBinomial | robust NB with `ln μ = pred`, `ln(Var − μ) = 2·pred − ln σ_obs` |
//! | Binomial | Bernoulli with `logit p = pred` |
//! | Lognormal | `ln N(ln y; pred, σ_obs)` |
//!
//! Selector codes follow the selector encoding `1..=5` in the order above.
//! [`FamilyKernel`] is the resolved per-observation log-likelihood plus the
//! prediction clamp (identity except for Poisson).
use crate::phenology::{
    core::special::{ln_binom_robust, ln_nbinom_robust, ln_norm_density, ln_poisson},
    errors::PhenologyError,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper clamp applied to Poisson log-predictions.
pub const POISSON_PRED_CAP: f64 = 20.0;

/// Observation family of the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsFamily {
    #[default]
    Gaussian,
    Poisson,
    NegativeBinomial,
    Binomial,
    Lognormal,
}

impl ObsFamily {
    /// Integer selector code (`1..=5`).
    pub const fn code(self) -> i64 {
        match self {
            ObsFamily::Gaussian => 1,
            ObsFamily::Poisson => 2,
            ObsFamily::NegativeBinomial => 3,
            ObsFamily::Binomial => 4,
            ObsFamily::Lognormal => 5,
        }
    }

    /// Whether the family carries an observation-scale parameter `obs_sigma`
    /// (SD for Gaussian/Lognormal, overdispersion for NegativeBinomial).
    pub const fn has_obs_sigma(self) -> bool {
        !matches!(self, ObsFamily::Poisson | ObsFamily::Binomial)
    }
}

impl TryFrom<i64> for ObsFamily {
    type Error = PhenologyError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ObsFamily::Gaussian),
            2 => Ok(ObsFamily::Poisson),
            3 => Ok(ObsFamily::NegativeBinomial),
            4 => Ok(ObsFamily::Binomial),
            5 => Ok(ObsFamily::Lognormal),
            _ => Err(PhenologyError::InvalidFamilySelector { code }),
        }
    }
}

impl FromStr for ObsFamily {
    type Err = PhenologyError;

    /// Parse a family from a name (case-insensitive). Common short names
    /// (`"nb"`, `"negbin"`, `"bernoulli"`) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gaussian" | "normal" => Ok(ObsFamily::Gaussian),
            "poisson" => Ok(ObsFamily::Poisson),
            "negative_binomial" | "negativebinomial" | "negbin" | "nb" => {
                Ok(ObsFamily::NegativeBinomial)
            }
            "binomial" | "bernoulli" => Ok(ObsFamily::Binomial),
            "lognormal" => Ok(ObsFamily::Lognormal),
            _ => Err(PhenologyError::UnknownName {
                what: "observation family",
                name: s.to_string(),
                reason: "Valid options are 'gaussian', 'poisson', 'negative_binomial', \
                         'binomial' or 'lognormal'.",
            }),
        }
    }
}

/// Observation-scale parameter on both scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObsScale {
    pub sigma: f64,
    pub log_sigma: f64,
}

impl ObsScale {
    pub fn from_log(log_sigma: f64) -> Self {
        ObsScale { sigma: log_sigma.exp(), log_sigma }
    }
}

/// Log-likelihood of one observation given its (possibly clamped) prediction.
pub type ObsLogLikFn = fn(f64, f64, &ObsScale) -> f64;
/// In-place adjustment applied to a prediction before it is scored.
pub type PredClampFn = fn(f64) -> f64;

/// Resolved observation kernel for one family.
#[derive(Clone, Copy)]
pub struct FamilyKernel {
    pub log_lik: ObsLogLikFn,
    pub clamp: PredClampFn,
}

impl std::fmt::Debug for FamilyKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FamilyKernel").finish_non_exhaustive()
    }
}

impl FamilyKernel {
    pub fn resolve(family: ObsFamily) -> Self {
        let log_lik: ObsLogLikFn = match family {
            ObsFamily::Gaussian => gaussian_ll,
            ObsFamily::Poisson => poisson_ll,
            ObsFamily::NegativeBinomial => nbinom_ll,
            ObsFamily::Binomial => binomial_ll,
            ObsFamily::Lognormal => lognormal_ll,
        };
        let clamp: PredClampFn = match family {
            ObsFamily::Poisson => cap_poisson_pred,
            _ => identity,
        };
        FamilyKernel { log_lik, clamp }
    }
}

fn identity(pred: f64) -> f64 {
    pred
}

// NaN passes through unchanged.
fn cap_poisson_pred(pred: f64) -> f64 {
    if pred > POISSON_PRED_CAP { POISSON_PRED_CAP } else { pred }
}

fn gaussian_ll(y: f64, pred: f64, obs: &ObsScale) -> f64 {
    ln_norm_density(y, pred, obs.sigma)
}

fn poisson_ll(y: f64, pred: f64, _obs: &ObsScale) -> f64 {
    ln_poisson(y, pred.exp())
}

fn nbinom_ll(y: f64, pred: f64, obs: &ObsScale) -> f64 {
    ln_nbinom_robust(y, pred, 2.0 * pred - obs.log_sigma)
}

fn binomial_ll(y: f64, pred: f64, _obs: &ObsScale) -> f64 {
    ln_binom_robust(y, 1.0, pred)
}

fn lognormal_ll(y: f64, pred: f64, obs: &ObsScale) -> f64 {
    ln_norm_density(y.ln(), pred, obs.sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::LN_2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Selector parsing, obs_sigma presence, and per-family log-likelihood
    // reference values through the resolved kernel.
    // -------------------------------------------------------------------------

    const ALL: [ObsFamily; 5] = [
        ObsFamily::Gaussian,
        ObsFamily::Poisson,
        ObsFamily::NegativeBinomial,
        ObsFamily::Binomial,
        ObsFamily::Lognormal,
    ];

    #[test]
    fn selector_codes_round_trip_and_reject_out_of_range() {
        for family in ALL {
            assert_eq!(ObsFamily::try_from(family.code()).unwrap(), family);
        }
        for bad in [0, 6, -2] {
            assert_eq!(
                ObsFamily::try_from(bad),
                Err(PhenologyError::InvalidFamilySelector { code: bad })
            );
        }
    }

    #[test]
    fn names_parse() {
        assert_eq!("NB".parse::<ObsFamily>().unwrap(), ObsFamily::NegativeBinomial);
        assert_eq!("Lognormal".parse::<ObsFamily>().unwrap(), ObsFamily::Lognormal);
        assert!("gamma".parse::<ObsFamily>().is_err());
    }

    #[test]
    fn obs_sigma_only_for_scaled_families() {
        let with: Vec<_> = ALL.iter().filter(|f| f.has_obs_sigma()).collect();
        assert_eq!(
            with,
            vec![&ObsFamily::Gaussian, &ObsFamily::NegativeBinomial, &ObsFamily::Lognormal]
        );
    }

    #[test]
    // Purpose
    // -------
    // Negative-binomial reference value.
    //
    // Given
    // -----
    // y = 0, pred = 0, log_obs_sigma = 0.
    //
    // Expect
    // ------
    // μ = 1, Var − μ = 1, so P(Y = 0) = 1/2.
    fn nbinom_reference_value() {
        let k = FamilyKernel::resolve(ObsFamily::NegativeBinomial);
        assert_relative_eq!((k.log_lik)(0.0, 0.0, &ObsScale::from_log(0.0)), -LN_2, epsilon = 1e-14);
    }

    #[test]
    fn poisson_clamps_large_predictions_only() {
        let k = FamilyKernel::resolve(ObsFamily::Poisson);
        assert_eq!((k.clamp)(25.0), POISSON_PRED_CAP);
        assert_eq!((k.clamp)(3.0), 3.0);
        assert!((k.clamp)(f64::NAN).is_nan());
        let g = FamilyKernel::resolve(ObsFamily::Gaussian);
        assert_eq!((g.clamp)(25.0), 25.0);
    }

    #[test]
    fn gaussian_and_lognormal_differ_by_log_of_y() {
        let obs = ObsScale::from_log(0.5_f64.ln());
        let g = FamilyKernel::resolve(ObsFamily::Gaussian);
        let l = FamilyKernel::resolve(ObsFamily::Lognormal);
        let y = 7.0_f64;
        assert_relative_eq!((l.log_lik)(y, 2.0, &obs), (g.log_lik)(y.ln(), 2.0, &obs), epsilon = 1e-14);
        assert!((l.log_lik)(0.0, 2.0, &obs) == f64::NEG_INFINITY);
    }

    #[test]
    fn binomial_uses_logit_prediction() {
        let k = FamilyKernel::resolve(ObsFamily::Binomial);
        let obs = ObsScale::from_log(0.0);
        assert_relative_eq!((k.log_lik)(1.0, 0.0, &obs), -LN_2, epsilon = 1e-14);
    }
}
