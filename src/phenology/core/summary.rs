//! Per-group summaries: quartiles, spread, and annual totals.
//!
//! - `lower25 = Q(0.25)`, `upper75 = Q(0.75)`, `range = upper75 − lower25`,
//!   using the resolved quantile kernel of the current tail model.
//! - Over the day grid `t = 1..=365`:
//!   `year_log_tot = Σ_t (dens(t) + theta)` and
//!   `year_tot = Σ_t exp(dens(t) + theta)`, with `dens` the timing
//!   log-density. Every day contributes; the loop never exits early, so
//!   non-finite densities propagate.
use crate::phenology::core::{assembly::GroupParams, shapes::ShapeParams, tails::TailKernel};
use ndarray::Array1;

/// Last day of the annual grid (days are `1..=DAYS_PER_YEAR`).
pub const DAYS_PER_YEAR: u32 = 365;

/// Summary vectors, one entry per group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub lower25: Array1<f64>,
    pub upper75: Array1<f64>,
    pub range: Array1<f64>,
    pub year_tot: Array1<f64>,
    pub year_log_tot: Array1<f64>,
}

pub fn summarize(
    groups: &GroupParams, theta: &Array1<f64>, kernel: &TailKernel, shapes: &ShapeParams,
) -> GroupSummary {
    let n = groups.n_levels();
    let mut lower25 = Array1::zeros(n);
    let mut upper75 = Array1::zeros(n);
    let mut year_tot = Array1::zeros(n);
    let mut year_log_tot = Array1::zeros(n);

    for g in 0..n {
        let curve = groups.curve(g);
        lower25[g] = (kernel.quantile)(0.25, &curve, shapes);
        upper75[g] = (kernel.quantile)(0.75, &curve, shapes);

        let mut log_tot = 0.0;
        let mut tot = 0.0;
        for t in 1..=DAYS_PER_YEAR {
            let day_log = (kernel.log_density)(f64::from(t), &curve, shapes) + theta[g];
            log_tot += day_log;
            tot += day_log.exp();
        }
        year_log_tot[g] = log_tot;
        year_tot[g] = tot;
    }

    let range = &upper75 - &lower25;
    GroupSummary { lower25, upper75, range, year_tot, year_log_tot }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phenology::core::{
        single_sided::{gnorm_scale_ratio, normal_log_density, normal_quantile},
        tails::TailModel,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Quartiles and annual totals for simple curves, and positivity of the
    // interquartile range across tail models and asymmetry.
    // -------------------------------------------------------------------------

    fn groups(mu: f64, s1: f64, s2: Option<f64>, ratio: f64) -> GroupParams {
        GroupParams {
            mu: array![mu],
            sigma1: array![s1],
            sigma2: s2.map(|s| array![s]),
            alpha1: Some(array![s1 * ratio]),
            alpha2: s2.map(|s| array![s * ratio]),
        }
    }

    fn shapes(beta: f64, df: f64) -> ShapeParams {
        let r = gnorm_scale_ratio(beta);
        ShapeParams { tdf_1: df, tdf_2: df, beta_1: beta, beta_2: beta, ratio_1: r, ratio_2: r }
    }

    #[test]
    // Purpose
    // -------
    // A normal curve well inside the year integrates to ~1 over the day grid,
    // so year_tot ≈ exp(theta).
    //
    // Given
    // -----
    // μ = 180, σ = 20, θ = ln 50.
    //
    // Expect
    // ------
    // year_tot ≈ 50, year_log_tot equal to the explicit sum, quartiles at
    // μ ± 0.6745σ.
    fn normal_curve_totals_and_quartiles() {
        let g = groups(180.0, 20.0, None, f64::NAN);
        let theta = array![50.0_f64.ln()];
        let kernel = TailKernel::resolve(TailModel::Normal, false);
        let s = summarize(&g, &theta, &kernel, &shapes(2.0, 5.0));
        assert_relative_eq!(s.year_tot[0], 50.0, max_relative = 1e-6);
        let explicit: f64 =
            (1..=365).map(|t| normal_log_density(t as f64, 180.0, 20.0) + theta[0]).sum();
        assert_relative_eq!(s.year_log_tot[0], explicit, max_relative = 1e-12);
        assert_relative_eq!(s.lower25[0], normal_quantile(0.25, 180.0, 20.0), epsilon = 1e-10);
        assert_relative_eq!(s.range[0], s.upper75[0] - s.lower25[0]);
    }

    #[test]
    // Purpose
    // -------
    // range > 0 for every tail model, symmetric and asymmetric.
    fn range_is_positive_for_all_tail_models() {
        let sh = shapes(1.5, 4.0);
        for tail in [TailModel::Normal, TailModel::StudentT, TailModel::GeneralizedNormal] {
            for (asym, s2) in [(false, None), (true, Some(25.0))] {
                let g = groups(150.0, 10.0, s2, sh.ratio_1);
                let s = summarize(&g, &array![0.0], &TailKernel::resolve(tail, asym), &sh);
                assert!(s.range[0] > 0.0, "{tail:?} asym={asym}: range = {}", s.range[0]);
                assert!(s.lower25[0] < s.upper75[0]);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Sharp generalized-normal shapes keep their interquartile range instead
    // of collapsing onto μ.
    //
    // Given
    // -----
    // μ = 150, σ = 10, β ∈ {50, 80}; symmetric and with equal split sides.
    //
    // Expect
    // ------
    // range = σ · ratio(β) · Γ(1 + 1/β), approaching the uniform limit σ√3.
    fn gnorm_range_holds_for_large_shapes() {
        for beta in [50.0_f64, 80.0] {
            let sh = shapes(beta, 4.0);
            let expected = 10.0 * sh.ratio_1 * statrs::function::gamma::gamma(1.0 + 1.0 / beta);
            for (asym, s2) in [(false, None), (true, Some(10.0))] {
                let g = groups(150.0, 10.0, s2, sh.ratio_1);
                let kernel = TailKernel::resolve(TailModel::GeneralizedNormal, asym);
                let s = summarize(&g, &array![0.0], &kernel, &sh);
                assert_relative_eq!(s.range[0], expected, max_relative = 1e-9);
                assert!(s.range[0] > 17.0 && s.range[0] < 10.0 * 3.0_f64.sqrt());
                assert_relative_eq!(150.0 - s.lower25[0], s.upper75[0] - 150.0, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn non_finite_density_propagates_into_totals() {
        let g = groups(150.0, -1.0, None, f64::NAN);
        let kernel = TailKernel::resolve(TailModel::Normal, false);
        let s = summarize(&g, &array![0.0], &kernel, &shapes(2.0, 5.0));
        assert!(s.year_log_tot[0].is_nan());
        assert!(s.year_tot[0].is_nan());
    }
}
