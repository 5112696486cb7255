//! sensitivity — finite-difference derivatives of the objective and of
//! reported quantities, and delta-method standard errors.
//!
//! Purpose
//! -------
//! Give a fitting collaborator what it needs to attach uncertainty to a fit
//! without an automatic-differentiation engine: the Hessian of the negative
//! log-likelihood (to build a parameter covariance) and the Jacobians of
//! reported quantities (to push that covariance through the report).
//!
//! Key behaviors
//! -------------
//! - [`objective_hessian`]: central-difference Hessian of `nll`, built with
//!   `finitediff` as the central difference of a central-difference
//!   gradient, then symmetrized in place.
//! - [`report_jacobian`]: `m × n` Jacobian of one reported quantity
//!   (`m` = its length, `n` = flat-vector length).
//! - [`delta_method_sd`]: `sqrt(diag(J Σ Jᵀ))` for a caller-supplied
//!   covariance `Σ`.
//! - [`sd_report`]: value and delta-method SD of every quantity present in
//!   the report, from one pass of perturbed evaluations.
//!
//! Invariants & assumptions
//! ------------------------
//! - The flat vector is checked (length, finiteness) before any
//!   perturbation; perturbed evaluations cannot fail structurally.
//! - Steps are relative: coordinate `i` moves by `c · (1 + |θ_i|)` with
//!   `c = ε^{1/3}` for first derivatives and `c = ε^{1/4}` for the Hessian.
//!   `finitediff` takes fixed steps of `√ε`, so it is applied to the
//!   rescaled function `u ↦ f(θ + s ⊙ u)` at `u = 0` and the result is
//!   divided by the scales `s`.
//! - Slots the configuration does not use leave the objective bit-identical,
//!   so their derivatives are exactly zero.
//!
//! Conventions
//! -----------
//! - Derivatives are taken in the unconstrained flat-vector space.
//! - Output rows follow the quantity's element order; columns follow the
//!   flat layout.
use crate::phenology::{
    core::{
        data::PhenologyData,
        params::{ParamVec, check_vec},
    },
    errors::{PhenologyError, PhenologyResult},
    models::{
        phenology::PhenologyModel,
        report::{PhenologyReport, ReportQuantity},
    },
};
use finitediff::FiniteDiff;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

/// Value and delta-method standard deviation of one reported quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedValue {
    pub name: &'static str,
    pub value: Array1<f64>,
    pub sd: Array1<f64>,
}

/// Central-difference Hessian of the negative log-likelihood.
///
/// # Errors
/// Length and finiteness errors from the flat-vector check.
pub fn objective_hessian(
    model: &PhenologyModel, data: &PhenologyData, vec: ArrayView1<f64>,
) -> PhenologyResult<Array2<f64>> {
    check_vec(vec, model.layout(data))?;
    let nll = |v: &ParamVec| model.evaluate_flat(data, v).nll;
    Ok(central_hessian(&vec.to_owned(), &nll))
}

/// Jacobian of one reported quantity with respect to the flat vector.
///
/// # Errors
/// - Length and finiteness errors from the flat-vector check.
/// - [`PhenologyError::QuantityNotReported`] if the quantity is absent under
///   the model's configuration.
pub fn report_jacobian(
    model: &PhenologyModel, data: &PhenologyData, vec: ArrayView1<f64>, quantity: ReportQuantity,
) -> PhenologyResult<Array2<f64>> {
    check_vec(vec, model.layout(data))?;
    let x = vec.to_owned();
    let base = model.evaluate_flat(data, &x).report;
    let mut jacs = report_jacobians(model, data, &x, &base, &[quantity])?;
    Ok(jacs.remove(0))
}

/// Delta-method standard deviations of one reported quantity.
///
/// # Errors
/// - [`PhenologyError::CovarianceShape`] unless `cov` is `n × n`.
/// - Everything [`report_jacobian`] returns.
pub fn delta_method_sd(
    model: &PhenologyModel, data: &PhenologyData, vec: ArrayView1<f64>, cov: &Array2<f64>,
    quantity: ReportQuantity,
) -> PhenologyResult<Array1<f64>> {
    check_cov(cov, vec.len())?;
    let jac = report_jacobian(model, data, vec, quantity)?;
    Ok(propagate(&jac, cov))
}

/// Value and delta-method SD of every quantity present in the report.
///
/// Quantities come in [`ReportQuantity::ALL`] order, as in
/// [`PhenologyReport::entries`].
///
/// # Errors
/// - [`PhenologyError::CovarianceShape`] unless `cov` is `n × n`.
/// - Length and finiteness errors from the flat-vector check.
pub fn sd_report(
    model: &PhenologyModel, data: &PhenologyData, vec: ArrayView1<f64>, cov: &Array2<f64>,
) -> PhenologyResult<Vec<ReportedValue>> {
    check_vec(vec, model.layout(data))?;
    check_cov(cov, vec.len())?;
    let x = vec.to_owned();
    let base = model.evaluate_flat(data, &x).report;
    let present: Vec<ReportQuantity> =
        ReportQuantity::ALL.into_iter().filter(|&q| base.quantity(q).is_ok()).collect();
    let jacs = report_jacobians(model, data, &x, &base, &present)?;

    present
        .iter()
        .zip(jacs.iter())
        .map(|(&q, jac)| {
            Ok(ReportedValue { name: q.name(), value: base.quantity(q)?, sd: propagate(jac, cov) })
        })
        .collect()
}

// ---- Finite-difference kernels ----

/// Central-difference gradient of `f` at `x` with relative steps
/// `ε^{1/3} · (1 + |x_i|)`.
pub(crate) fn central_gradient(x: &Array1<f64>, f: &dyn Fn(&Array1<f64>) -> f64) -> Array1<f64> {
    let scale = step_scales(x, f64::EPSILON.cbrt());
    let rescaled = |u: &Array1<f64>| f(&(x + &(&scale * u)));
    let grad_u = Array1::<f64>::zeros(x.len()).central_diff(&rescaled);
    grad_u / &scale
}

/// Central-difference Hessian of `f` at `x` with relative steps
/// `ε^{1/4} · (1 + |x_i|)`, symmetrized.
pub(crate) fn central_hessian(x: &Array1<f64>, f: &dyn Fn(&Array1<f64>) -> f64) -> Array2<f64> {
    let scale = step_scales(x, f64::EPSILON.powf(0.25));
    let rescaled = |u: &Array1<f64>| f(&(x + &(&scale * u)));
    let grad_u = |u: &Array1<f64>| u.central_diff(&rescaled);
    let mut hess = Array1::<f64>::zeros(x.len()).central_hessian(&grad_u);
    for ((i, j), h) in hess.indexed_iter_mut() {
        *h /= scale[i] * scale[j];
    }
    symmetrize(&mut hess);
    hess
}

/// Per-coordinate scales mapping `finitediff`'s fixed `√ε` step onto
/// `rel_step · (1 + |x_i|)`.
fn step_scales(x: &Array1<f64>, rel_step: f64) -> Array1<f64> {
    let fixed = f64::EPSILON.sqrt();
    x.mapv(|v| rel_step * (1.0 + v.abs()) / fixed)
}

/// Jacobians of several report quantities from one set of `2n` perturbed
/// evaluations.
///
/// Each column comes from the reports at `x ± h_j e_j`, divided by the
/// realized step so rounding of `x_j ± h_j` does not bias the slope.
fn report_jacobians(
    model: &PhenologyModel, data: &PhenologyData, x: &Array1<f64>, base: &PhenologyReport,
    quantities: &[ReportQuantity],
) -> PhenologyResult<Vec<Array2<f64>>> {
    let n = x.len();
    let mut jacs = quantities
        .iter()
        .map(|&q| base.quantity(q).map(|v| Array2::zeros((v.len(), n))))
        .collect::<PhenologyResult<Vec<Array2<f64>>>>()?;

    let rel_step = f64::EPSILON.cbrt();
    let mut xt = x.clone();
    for j in 0..n {
        let h = rel_step * (1.0 + x[j].abs());
        xt[j] = x[j] + h;
        let x_plus = xt[j];
        let plus = model.evaluate_flat(data, &xt).report;
        xt[j] = x[j] - h;
        let x_minus = xt[j];
        let minus = model.evaluate_flat(data, &xt).report;
        xt[j] = x[j];

        let width = x_plus - x_minus;
        for (jac, &q) in jacs.iter_mut().zip(quantities) {
            let column = (plus.quantity(q)? - minus.quantity(q)?) / width;
            jac.column_mut(j).assign(&column);
        }
    }
    Ok(jacs)
}

/// `sqrt(diag(J Σ Jᵀ))`, row by row.
fn propagate(jac: &Array2<f64>, cov: &Array2<f64>) -> Array1<f64> {
    let j_cov = jac.dot(cov);
    (&j_cov * jac).sum_axis(Axis(1)).mapv(f64::sqrt)
}

fn check_cov(cov: &Array2<f64>, dim: usize) -> PhenologyResult<()> {
    let (rows, cols) = cov.dim();
    if rows != dim || cols != dim {
        return Err(PhenologyError::CovarianceShape { rows, cols, dim });
    }
    Ok(())
}

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize(hess: &mut Array2<f64>) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
