//! Phenology model — one configured objective over validated data.
//!
//! Purpose
//! -------
//! Bind a [`ModelConfig`] to its resolved distribution and observation
//! kernels and evaluate the negative log-likelihood, together with every
//! reported quantity, for given data and parameters.
//!
//! Key behaviors
//! -------------
//! - [`PhenologyModel::new`] validates the configuration and resolves the
//!   tail and family kernels once.
//! - [`PhenologyModel::evaluate`] runs, in order: shape derivation and shape
//!   priors, per-group assembly and random-effect penalties, per-observation
//!   densities / predictions / data log-likelihood, and per-group summaries.
//!   It returns `nll = -(priors + penalties + data log-likelihood)` and a
//!   [`PhenologyReport`].
//! - [`PhenologyModel`] implements [`LogLikelihood`] over the flat parameter
//!   vector, with a finite-difference gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model holds only immutable configuration and function pointers, so
//!   it is `Send + Sync` and may be shared across threads; every evaluation
//!   allocates its own buffers.
//! - Evaluation is total once structure is validated: bad numeric regions
//!   yield NaN/±inf in `nll` and the report rather than errors.
//!
//! Conventions
//! -----------
//! - `debug!` logs the resolved configuration at construction; `trace!` logs
//!   the objective terms of each evaluation. Nothing is logged at higher
//!   levels from the numeric path.
use crate::phenology::{
    core::{
        assembly::{assemble_groups, random_effect_log_penalty},
        data::PhenologyData,
        family::{FamilyKernel, ObsScale},
        likelihood::observation_terms,
        options::ModelConfig,
        params::{ParamLayout, ParamVec, PhenologyParams, check_vec},
        shapes::ShapeParams,
        summary::summarize,
        tails::TailKernel,
    },
    errors::PhenologyResult,
    models::{report::PhenologyReport, traits::LogLikelihood},
    sensitivity::central_gradient,
};
use log::{debug, trace};
use ndarray::ArrayView1;
use serde::Serialize;

/// Objective value and reported quantities of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Negative log-likelihood including priors and random-effect penalties.
    pub nll: f64,
    pub report: PhenologyReport,
}

/// A configured phenology objective.
#[derive(Debug, Clone)]
pub struct PhenologyModel {
    config: ModelConfig,
    tail: TailKernel,
    family: FamilyKernel,
}

impl PhenologyModel {
    /// Validate `config` and resolve its kernels.
    ///
    /// # Errors
    /// [`PhenologyError::InvalidPrior`](crate::phenology::errors::PhenologyError::InvalidPrior)
    /// for non-positive or non-finite prior hyperparameters.
    pub fn new(config: ModelConfig) -> PhenologyResult<Self> {
        config.validate()?;
        let tail = TailKernel::resolve(config.tail, config.asymmetric);
        let family = FamilyKernel::resolve(config.family);
        debug!(
            "phenology model: family={:?} tail={:?} asymmetric={} mu_re={} sigma_re={} \
             share_shape={} t_prior={} beta_prior={}",
            config.family,
            config.tail,
            config.asymmetric,
            config.est_mu_re,
            config.est_sigma_re,
            config.share_shape,
            config.t_prior_active(),
            config.beta_prior_active(),
        );
        Ok(PhenologyModel { config, tail, family })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Flat-vector layout for `data`.
    pub fn layout(&self, data: &PhenologyData) -> ParamLayout {
        ParamLayout::for_data(data)
    }

    /// Evaluate the objective and the report at named parameters.
    ///
    /// # Errors
    /// [`PhenologyError::ParamLengthMismatch`](crate::phenology::errors::PhenologyError::ParamLengthMismatch)
    /// if a parameter block does not fit `data`.
    pub fn evaluate(
        &self, data: &PhenologyData, params: &PhenologyParams,
    ) -> PhenologyResult<Evaluation> {
        params.validate_for(data)?;
        Ok(self.evaluate_unchecked(data, params))
    }

    /// Evaluate at a flat optimizer vector.
    ///
    /// # Errors
    /// Length and finiteness errors from the flat-vector check.
    pub fn evaluate_vec(
        &self, data: &PhenologyData, vec: ArrayView1<f64>,
    ) -> PhenologyResult<Evaluation> {
        let params = PhenologyParams::from_vec(vec, self.layout(data))?;
        Ok(self.evaluate_unchecked(data, &params))
    }

    /// Negative log-likelihood at a flat optimizer vector.
    pub fn nll(&self, data: &PhenologyData, vec: ArrayView1<f64>) -> PhenologyResult<f64> {
        self.evaluate_vec(data, vec).map(|e| e.nll)
    }

    /// Evaluation at a flat vector whose length was already checked.
    pub(crate) fn evaluate_flat(&self, data: &PhenologyData, vec: &ParamVec) -> Evaluation {
        let params = PhenologyParams::unpack(vec.view(), self.layout(data));
        self.evaluate_unchecked(data, &params)
    }

    fn evaluate_unchecked(&self, data: &PhenologyData, params: &PhenologyParams) -> Evaluation {
        let config = &self.config;
        let shapes = ShapeParams::derive(params, config);
        let log_prior = shapes.log_prior(config);

        let groups = assemble_groups(data, params, config, &shapes);
        let log_penalty = random_effect_log_penalty(params, config);

        let obs = ObsScale::from_log(params.log_obs_sigma);
        let terms =
            observation_terms(data, &groups, &params.theta, &self.tail, &shapes, &self.family, &obs);
        let summary = summarize(&groups, &params.theta, &self.tail, &shapes);

        let nll = -(log_prior + log_penalty + terms.log_lik);
        trace!(
            "phenology eval: nll={nll} prior={log_prior} penalty={log_penalty} data={}",
            terms.log_lik
        );

        let report = PhenologyReport::collect(config, params, &shapes, groups, terms, summary, &obs);
        Evaluation { nll, report }
    }
}

impl LogLikelihood for PhenologyModel {
    type Data = PhenologyData;

    /// Log-likelihood `ℓ(θ) = -nll` at the flat vector `θ`.
    ///
    /// # Steps
    /// 1. Unpack `θ` into named parameters (length and finiteness checked).
    /// 2. Evaluate priors, penalties and the data log-likelihood.
    ///
    /// # Errors
    /// - Returns [`PhenologyError`](crate::phenology::errors::PhenologyError)
    ///   if `θ` does not fit the layout of `data`.
    fn value(&self, theta: &ParamVec, data: &Self::Data) -> PhenologyResult<f64> {
        self.nll(data, theta.view()).map(|nll| -nll)
    }

    /// Validate a flat vector against the layout of `data`.
    ///
    /// # Behavior
    /// - Checks `θ.len() == 8 + 4G + Kmu + 2 Ksig`.
    /// - Ensures all entries are finite.
    fn check(&self, theta: &ParamVec, data: &Self::Data) -> PhenologyResult<()> {
        check_vec(theta.view(), self.layout(data))
    }

    /// Central finite-difference gradient `∇ℓ(θ)`.
    ///
    /// Steps scale with `1 + |θ_i|`. Slots unused by the configuration have an
    /// exactly zero derivative.
    ///
    /// # Errors
    /// - Same as [`LogLikelihood::check`].
    fn grad(&self, theta: &ParamVec, data: &Self::Data) -> PhenologyResult<ParamVec> {
        self.check(theta, data)?;
        let loglik = |v: &ParamVec| -self.evaluate_flat(data, v).nll;
        Ok(central_gradient(theta, &loglik))
    }
}
