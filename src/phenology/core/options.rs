//! Model configuration — family, tail model, random effects and shape priors.
//!
//! Purpose
//! -------
//! Gather every switch that changes *which* objective is evaluated into one
//! immutable, serializable value, [`ModelConfig`]. A config is fixed for the
//! lifetime of a model; parameters and data vary per call.
//!
//! Key behaviors
//! -------------
//! - Build from typed enums (struct literal / `Default` + field updates) or
//!   from the integer selector encoding via [`ModelConfig::from_selectors`]
//!   (family `1..=5`, tail `0..=2`, 0/1 toggles).
//! - [`ModelConfig::validate`] checks the gamma prior hyperparameters; it is
//!   called by the model constructor and by `from_selectors`.
//! - Serde derives with `snake_case` names so configs can live in JSON/TOML
//!   files next to the data they describe.
//!
//! Invariants & assumptions
//! ------------------------
//! - Prior hyperparameters are finite and strictly positive once validated,
//!   even when the corresponding prior is switched off.
//! - `share_shape` only matters for asymmetric Student-t / generalized-normal
//!   models; it is accepted (and ignored) elsewhere.
//!
//! Conventions
//! -----------
//! - Gamma priors use the `(shape, scale)` parameterization, mean
//!   `shape · scale`.
//! - Defaults: symmetric Gaussian-tailed curve, Gaussian observations, no
//!   random effects, no shared shape, priors off,
//!   `nu_prior = Gamma(2, 10)`, `beta_prior = Gamma(2, 1)`.
use crate::phenology::{
    core::{family::ObsFamily, tails::TailModel},
    errors::{PhenologyError, PhenologyResult},
};
use serde::{Deserialize, Serialize};

/// `(shape, scale)` hyperparameters of a gamma prior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaPrior {
    pub shape: f64,
    pub scale: f64,
}

impl GammaPrior {
    pub const fn new(shape: f64, scale: f64) -> Self {
        GammaPrior { shape, scale }
    }

    fn validate(&self, name: &'static str) -> PhenologyResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.shape) && ok(self.scale) {
            Ok(())
        } else {
            Err(PhenologyError::InvalidPrior { name, shape: self.shape, scale: self.scale })
        }
    }
}

/// Immutable configuration of the phenology objective.
///
/// Fields
/// ------
/// - `asymmetric`: separate left/right scales (and shapes) around `mu`.
/// - `family`: observation family of the counts.
/// - `tail`: tail family of the timing curve.
/// - `est_mu_re` / `est_sigma_re`: per-group random deviations on `mu` and on
///   the scales, penalized by zero-mean normal densities.
/// - `share_shape`: side 2 reuses side 1's df / beta.
/// - `use_t_prior` / `use_beta_prior`: gamma priors on the Student-t df and the
///   generalized-normal shape.
/// - `nu_prior` / `beta_prior`: hyperparameters of those priors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ModelConfig {
    pub asymmetric: bool,
    pub family: ObsFamily,
    pub tail: TailModel,
    pub est_mu_re: bool,
    pub est_sigma_re: bool,
    pub share_shape: bool,
    pub use_t_prior: bool,
    pub use_beta_prior: bool,
    pub nu_prior: GammaPrior,
    pub beta_prior: GammaPrior,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            asymmetric: false,
            family: ObsFamily::Gaussian,
            tail: TailModel::Normal,
            est_mu_re: false,
            est_sigma_re: false,
            share_shape: false,
            use_t_prior: false,
            use_beta_prior: false,
            nu_prior: GammaPrior::new(2.0, 10.0),
            beta_prior: GammaPrior::new(2.0, 1.0),
        }
    }
}

impl ModelConfig {
    /// Default configuration with the given family and tail model.
    pub fn new(family: ObsFamily, tail: TailModel) -> Self {
        ModelConfig { family, tail, ..ModelConfig::default() }
    }

    /// Build a configuration from the integer selector encoding.
    ///
    /// Parameters
    /// ----------
    /// - `asymmetric`, `est_sigma_re`, `est_mu_re`, `share_shape`,
    ///   `use_t_prior`, `use_beta_prior`: 0/1 toggles.
    /// - `family`: `1` Gaussian, `2` Poisson, `3` negative binomial,
    ///   `4` binomial, `5` lognormal.
    /// - `tail_model`: `0` normal, `1` Student-t, `2` generalized normal.
    /// - `nu_prior`, `beta_prior`: `[shape, scale]`.
    ///
    /// Errors
    /// ------
    /// - [`PhenologyError::InvalidToggle`] for toggles other than 0/1.
    /// - [`PhenologyError::InvalidFamilySelector`] /
    ///   [`PhenologyError::InvalidTailSelector`] for out-of-range codes.
    /// - [`PhenologyError::InvalidPrior`] for non-positive hyperparameters.
    #[allow(clippy::too_many_arguments)]
    pub fn from_selectors(
        asymmetric: i64, family: i64, tail_model: i64, est_sigma_re: i64, est_mu_re: i64,
        share_shape: i64, use_t_prior: i64, use_beta_prior: i64, nu_prior: [f64; 2],
        beta_prior: [f64; 2],
    ) -> PhenologyResult<Self> {
        let config = ModelConfig {
            asymmetric: toggle("asymmetric", asymmetric)?,
            family: ObsFamily::try_from(family)?,
            tail: TailModel::try_from(tail_model)?,
            est_mu_re: toggle("est_mu_re", est_mu_re)?,
            est_sigma_re: toggle("est_sigma_re", est_sigma_re)?,
            share_shape: toggle("share_shape", share_shape)?,
            use_t_prior: toggle("use_t_prior", use_t_prior)?,
            use_beta_prior: toggle("use_beta_prior", use_beta_prior)?,
            nu_prior: GammaPrior::new(nu_prior[0], nu_prior[1]),
            beta_prior: GammaPrior::new(beta_prior[0], beta_prior[1]),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the prior hyperparameters.
    pub fn validate(&self) -> PhenologyResult<()> {
        self.nu_prior.validate("nu_prior")?;
        self.beta_prior.validate("beta_prior")
    }

    /// Whether the Student-t df prior contributes to the objective.
    pub fn t_prior_active(&self) -> bool {
        self.use_t_prior && self.tail == TailModel::StudentT
    }

    /// Whether the generalized-normal shape prior contributes to the objective.
    pub fn beta_prior_active(&self) -> bool {
        self.use_beta_prior && self.tail == TailModel::GeneralizedNormal
    }
}

fn toggle(name: &'static str, code: i64) -> PhenologyResult<bool> {
    match code {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(PhenologyError::InvalidToggle { name, code }),
    }
}
