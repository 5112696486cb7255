//! Per-observation timing densities, predictions and data log-likelihood.
//!
//! For observation `i` in group `g = group[i]`:
//!
//! ```text
//! log_dens[i] = ln f(x[i] | curve_g)
//! pred[i]     = log_dens[i] + theta[g]
//! ```
//!
//! and the data log-likelihood is `Σ_i ℓ_family(y[i] | pred[i])`. Under the
//! Poisson family `pred` is capped at 20 **in place** before scoring, so the
//! returned predictions carry the capped values.
use crate::phenology::core::{
    assembly::GroupParams,
    data::PhenologyData,
    family::{FamilyKernel, ObsScale},
    shapes::ShapeParams,
    tails::TailKernel,
};
use ndarray::{Array1, Zip};

/// Observation-level outputs of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTerms {
    pub log_dens: Array1<f64>,
    pub pred: Array1<f64>,
    /// `Σ_i ℓ(y[i] | pred[i])`.
    pub log_lik: f64,
}

/// Timing log-density of every observation under its group's curve.
pub fn observation_log_densities(
    data: &PhenologyData, groups: &GroupParams, kernel: &TailKernel, shapes: &ShapeParams,
) -> Array1<f64> {
    let mut out = Array1::zeros(data.len());
    Zip::from(&mut out).and(&data.x).and(&data.group).for_each(|o, &x, &g| {
        *o = (kernel.log_density)(x, &groups.curve(g), shapes);
    });
    out
}

/// Log-scale predictions `log_dens + theta[group]`.
pub fn predictions(
    data: &PhenologyData, log_dens: &Array1<f64>, theta: &Array1<f64>,
) -> Array1<f64> {
    let mut pred = Array1::zeros(log_dens.len());
    Zip::from(&mut pred).and(log_dens).and(&data.group).for_each(|p, &ld, &g| {
        *p = ld + theta[g];
    });
    pred
}

/// Clamp predictions in place and sum the family log-likelihood.
pub fn data_log_likelihood(
    y: &Array1<f64>, pred: &mut Array1<f64>, family: &FamilyKernel, obs: &ObsScale,
) -> f64 {
    let mut total = 0.0;
    Zip::from(y).and(pred).for_each(|&yi, p| {
        *p = (family.clamp)(*p);
        total += (family.log_lik)(yi, *p, obs);
    });
    total
}

/// Densities, predictions and data log-likelihood in one pass per stage.
pub fn observation_terms(
    data: &PhenologyData, groups: &GroupParams, theta: &Array1<f64>, tail: &TailKernel,
    shapes: &ShapeParams, family: &FamilyKernel, obs: &ObsScale,
) -> ObservationTerms {
    let log_dens = observation_log_densities(data, groups, tail, shapes);
    let mut pred = predictions(data, &log_dens, theta);
    let log_lik = data_log_likelihood(&data.y, &mut pred, family, obs);
    ObservationTerms { log_dens, pred, log_lik }
}
