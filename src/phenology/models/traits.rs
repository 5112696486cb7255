//! Objective seam for external drivers.
//!
//! - [`LogLikelihood`]: the interface an optimizer or sampler programs against.
//!
//! Convention: implementations return the *log-likelihood* `ℓ(θ)`; a driver
//! that minimizes works with the cost `c(θ) = -ℓ(θ)`, which for
//! [`PhenologyModel`](crate::phenology::models::PhenologyModel) is exactly the
//! reported negative log-likelihood. A supplied gradient is `∇ℓ(θ)`.
use crate::phenology::{
    core::params::ParamVec,
    errors::{PhenologyError, PhenologyResult},
};

/// User-facing log-likelihood interface over a flat parameter vector.
///
/// - `type Data`: per-model data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&ParamVec, &Data) -> PhenologyResult<f64>`: evaluate `ℓ(θ)`.
///   Numeric problems are not errors; they surface as NaN/±inf.
/// - `check(&ParamVec, &Data) -> PhenologyResult<()>`: reject structurally
///   invalid `θ`/`data` pairs. A driver calls it once before iterating.
///
/// Optional:
/// - `grad(&ParamVec, &Data) -> PhenologyResult<ParamVec>`: gradient `∇ℓ(θ)`.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &ParamVec, data: &Self::Data) -> PhenologyResult<f64>;
    fn check(&self, theta: &ParamVec, data: &Self::Data) -> PhenologyResult<()>;

    // Optional methods
    fn grad(&self, _theta: &ParamVec, _data: &Self::Data) -> PhenologyResult<ParamVec> {
        Err(PhenologyError::GradientNotImplemented)
    }
}
