//! Double-sided ("split") timing densities.
//!
//! A double-sided curve shares one location `μ` between two halves of a
//! single-sided family: the left half (`x < μ`) uses scale `σ₁`, the right
//! half (`x ≥ μ`) uses `σ₂`, and each side may carry its own shape (Student-t
//! degrees of freedom or generalized-normal `β`). The density is
//!
//! ```text
//! ln f(x) = ln 2 − ln(σ₁ + σ₂) + ln g_side((x − μ) / σ_side)
//! ```
//!
//! with `g_side` the *standardized* (location 0, unit scale) side density, so
//! each half integrates to `σ_side / (σ₁ + σ₂)` and the whole curve to one.
//! With equal scales and shapes it reduces exactly to the single-sided law.
//!
//! Quantiles split at `r = σ₁ / (σ₁ + σ₂)`, the mass left of `μ`:
//! - `p < r`: `μ + σ₁ · Q_left(½ p (σ₁ + σ₂) / σ₁)`
//! - `p ≥ r`: `μ + σ₂ · Q_right(½ ((σ₁ + σ₂)(1 + p) − 2σ₁) / σ₂)`
//!
//! where `Q_side` is the standardized quantile of that side's family.
//!
//! For the generalized normal the standardized internal scale is the side's
//! ratio `sqrt(Γ(1/β)/Γ(3/β))` (see
//! [`gnorm_scale_ratio`](crate::phenology::core::single_sided::gnorm_scale_ratio)).
use crate::phenology::core::{
    single_sided::{gnorm_log_density, gnorm_quantile, student_t_quantile},
    special::{ln_norm_density, ln_student_t_std, std_normal_quantile},
};
use std::f64::consts::LN_2;

/// Shared split-density skeleton: renormalization plus the standardized side
/// log-density evaluated at the standardized distance from `mu`.
#[inline]
pub fn split_log_density(
    x: f64, mu: f64, sigma1: f64, sigma2: f64, left: impl Fn(f64) -> f64,
    right: impl Fn(f64) -> f64,
) -> f64 {
    let norm = LN_2 - (sigma1 + sigma2).ln();
    if x < mu { norm + left((x - mu) / sigma1) } else { norm + right((x - mu) / sigma2) }
}

/// Shared split-quantile skeleton over standardized side quantiles.
#[inline]
pub fn split_quantile(
    p: f64, mu: f64, sigma1: f64, sigma2: f64, left: impl Fn(f64) -> f64,
    right: impl Fn(f64) -> f64,
) -> f64 {
    let total = sigma1 + sigma2;
    let r = sigma1 / total;
    if p < r {
        mu + sigma1 * left(0.5 * p * total / sigma1)
    } else {
        mu + sigma2 * right(0.5 * (total * (1.0 + p) - 2.0 * sigma1) / sigma2)
    }
}

// ---- Normal ----

/// Double-normal log-density: normal halves with scales `sigma1` (left of
/// `mu`) and `sigma2` (right).
pub fn double_normal_log_density(x: f64, mu: f64, sigma1: f64, sigma2: f64) -> f64 {
    let std = |z: f64| ln_norm_density(z, 0.0, 1.0);
    split_log_density(x, mu, sigma1, sigma2, std, std)
}

/// Double-normal quantile, split at the left mass `sigma1 / (sigma1 + sigma2)`.
pub fn double_normal_quantile(p: f64, mu: f64, sigma1: f64, sigma2: f64) -> f64 {
    split_quantile(p, mu, sigma1, sigma2, std_normal_quantile, std_normal_quantile)
}

// ---- Student-t ----

/// Double Student-t log-density; `df1`/`df2` are the degrees of freedom of the
/// left and right halves.
pub fn double_t_log_density(
    x: f64, mu: f64, sigma1: f64, sigma2: f64, df1: f64, df2: f64,
) -> f64 {
    split_log_density(
        x,
        mu,
        sigma1,
        sigma2,
        |z| ln_student_t_std(z, df1),
        |z| ln_student_t_std(z, df2),
    )
}

/// Double Student-t quantile; each side uses its own degrees of freedom.
pub fn double_t_quantile(p: f64, mu: f64, sigma1: f64, sigma2: f64, df1: f64, df2: f64) -> f64 {
    split_quantile(
        p,
        mu,
        sigma1,
        sigma2,
        |q| student_t_quantile(q, 0.0, 1.0, df1),
        |q| student_t_quantile(q, 0.0, 1.0, df2),
    )
}

// ---- Generalized normal ----

/// Double generalized-normal log-density. `ratio1`/`ratio2` are the
/// standardized internal scales of each side.
#[allow(clippy::too_many_arguments)]
pub fn double_gnorm_log_density(
    x: f64, mu: f64, sigma1: f64, sigma2: f64, ratio1: f64, ratio2: f64, beta1: f64, beta2: f64,
) -> f64 {
    split_log_density(
        x,
        mu,
        sigma1,
        sigma2,
        |z| gnorm_log_density(z, 0.0, ratio1, beta1),
        |z| gnorm_log_density(z, 0.0, ratio2, beta2),
    )
}

/// Double generalized-normal quantile over the standardized side quantiles at
/// internal scales `ratio1`/`ratio2`.
#[allow(clippy::too_many_arguments)]
pub fn double_gnorm_quantile(
    p: f64, mu: f64, sigma1: f64, sigma2: f64, ratio1: f64, ratio2: f64, beta1: f64, beta2: f64,
) -> f64 {
    split_quantile(
        p,
        mu,
        sigma1,
        sigma2,
        |q| gnorm_quantile(q, 0.0, ratio1, beta1),
        |q| gnorm_quantile(q, 0.0, ratio2, beta2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phenology::core::single_sided::{
        gnorm_scale_ratio, normal_log_density, normal_quantile, student_t_log_density,
    };
    use crate::phenology::core::special::ln_norm_density;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Reduction to the single-sided law, normalization, and the direction of
    // asymmetry for split densities and quantiles.
    // -------------------------------------------------------------------------

    fn trapezoid(f: impl Fn(f64) -> f64, lo: f64, hi: f64, n: usize) -> f64 {
        let h = (hi - lo) / n as f64;
        let inner: f64 = (1..n).map(|k| f(lo + k as f64 * h)).sum();
        h * (0.5 * f(lo) + inner + 0.5 * f(hi))
    }

    #[test]
    // Purpose
    // -------
    // Equal sides must collapse to the single-sided density for every family.
    fn equal_sides_reduce_to_single_sided() {
        let (mu, s) = (120.0, 8.0);
        let ratio = gnorm_scale_ratio(1.4);
        for &x in &[90.0, 119.0, 120.0, 121.0, 150.0] {
            assert_relative_eq!(
                double_normal_log_density(x, mu, s, s),
                normal_log_density(x, mu, s),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                double_t_log_density(x, mu, s, s, 5.0, 5.0),
                student_t_log_density(x, mu, s, 5.0),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                double_gnorm_log_density(x, mu, s, s, ratio, ratio, 1.4, 1.4),
                gnorm_log_density(x, mu, s * ratio, 1.4),
                epsilon = 1e-12
            );
        }
        for &p in &[0.1, 0.25, 0.5, 0.75, 0.9] {
            assert_relative_eq!(
                double_normal_quantile(p, mu, s, s),
                normal_quantile(p, mu, s),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // An asymmetric double normal is a proper density.
    //
    // Given
    // -----
    // μ = 100, σ₁ = 5, σ₂ = 15.
    //
    // Expect
    // ------
    // Integral ≈ 1 and left-of-μ mass ≈ σ₁/(σ₁+σ₂) = 0.25.
    fn asymmetric_double_normal_integrates_to_one() {
        let f = |x: f64| double_normal_log_density(x, 100.0, 5.0, 15.0).exp();
        let total = trapezoid(f, 0.0, 250.0, 50_000);
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        let left = trapezoid(f, 0.0, 100.0, 20_000);
        assert_relative_eq!(left, 0.25, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // With unequal shapes the split density jumps at μ, so each half is
    // integrated on its own and checked against its share of the mass.
    //
    // Given
    // -----
    // μ = 0, σ₁ = 1, σ₂ = 2; t with df (4, 9) and generalized normal with
    // β (1.5, 3).
    //
    // Expect
    // ------
    // Left mass σ₁/(σ₁+σ₂) = 1/3, right mass 2/3.
    fn asymmetric_double_t_and_gnorm_split_mass() {
        // x = μ belongs to the right half; the left integral ends at its
        // left-hand limit.
        let left_of_mu = |x: f64| x.min(-f64::MIN_POSITIVE);

        let ft = |x: f64| double_t_log_density(x, 0.0, 1.0, 2.0, 4.0, 9.0).exp();
        let t_left = trapezoid(|x| ft(left_of_mu(x)), -400.0, 0.0, 400_000);
        let t_right = trapezoid(ft, 0.0, 800.0, 800_000);
        assert_relative_eq!(t_left, 1.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(t_right, 2.0 / 3.0, epsilon = 1e-5);

        let (r1, r2) = (gnorm_scale_ratio(1.5), gnorm_scale_ratio(3.0));
        let fg = |x: f64| double_gnorm_log_density(x, 0.0, 1.0, 2.0, r1, r2, 1.5, 3.0).exp();
        let g_left = trapezoid(|x| fg(left_of_mu(x)), -20.0, 0.0, 200_000);
        let g_right = trapezoid(fg, 0.0, 20.0, 200_000);
        assert_relative_eq!(g_left, 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(g_right, 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(g_left + g_right, 1.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // The wider right half puts more density one unit right of μ than one
    // unit left of it.
    //
    // Given
    // -----
    // μ = 0, σ₁ = 1, σ₂ = 2.
    //
    // Expect
    // ------
    // f(−1) = ⅔ φ(1) < f(+1) = ⅔ φ(½).
    fn double_normal_right_side_is_heavier() {
        let at_minus = double_normal_log_density(-1.0, 0.0, 1.0, 2.0);
        let at_plus = double_normal_log_density(1.0, 0.0, 1.0, 2.0);
        let norm = (2.0_f64 / 3.0).ln();
        assert_relative_eq!(at_minus, norm + ln_norm_density(1.0, 0.0, 1.0), epsilon = 1e-14);
        assert_relative_eq!(at_plus, norm + ln_norm_density(0.5, 0.0, 1.0), epsilon = 1e-14);
        assert!(at_plus > at_minus);
        // Mirrored scales mirror the comparison.
        assert!(double_normal_log_density(-1.0, 0.0, 2.0, 1.0) > double_normal_log_density(1.0, 0.0, 2.0, 1.0));
    }

    #[test]
    // Purpose
    // -------
    // Equal shapes make the split density continuous at μ even with unequal
    // scales; unequal shapes leave a jump.
    fn split_density_is_continuous_at_mu_for_equal_shapes() {
        let below = -1e-12;
        let (ra, rb) = (gnorm_scale_ratio(1.5), gnorm_scale_ratio(3.0));
        let pairs = [
            (double_normal_log_density(below, 0.0, 1.0, 2.0), double_normal_log_density(0.0, 0.0, 1.0, 2.0)),
            (
                double_t_log_density(below, 0.0, 1.0, 2.0, 5.0, 5.0),
                double_t_log_density(0.0, 0.0, 1.0, 2.0, 5.0, 5.0),
            ),
            (
                double_gnorm_log_density(below, 0.0, 1.0, 2.0, ra, ra, 1.5, 1.5),
                double_gnorm_log_density(0.0, 0.0, 1.0, 2.0, ra, ra, 1.5, 1.5),
            ),
        ];
        for (left, at_mu) in pairs {
            assert_relative_eq!(left, at_mu, epsilon = 1e-10);
        }
        let jump = double_gnorm_log_density(0.0, 0.0, 1.0, 2.0, ra, rb, 1.5, 3.0)
            - double_gnorm_log_density(below, 0.0, 1.0, 2.0, ra, rb, 1.5, 3.0);
        assert!(jump.abs() > 1e-3, "jump = {jump}");
    }

    #[test]
    // Purpose
    // -------
    // A wider right side shifts the median to the right of μ, and the
    // quantile at the split mass r is exactly μ.
    fn quantiles_follow_asymmetry() {
        let (mu, s1, s2) = (100.0, 5.0, 15.0);
        assert!(double_normal_quantile(0.5, mu, s1, s2) > mu);
        assert!(double_normal_quantile(0.5, mu, s2, s1) < mu);
        assert_relative_eq!(double_normal_quantile(0.25, mu, s1, s2), mu, epsilon = 1e-9);

        let lo = double_t_quantile(0.25, mu, s1, s2, 4.0, 4.0);
        let hi = double_t_quantile(0.75, mu, s1, s2, 4.0, 4.0);
        assert!(hi - mu > mu - lo);
    }

    #[test]
    // Purpose
    // -------
    // The split quantile inverts the split CDF.
    fn double_normal_quantile_inverts_numeric_cdf() {
        let (mu, s1, s2) = (100.0, 5.0, 15.0);
        let f = |x: f64| double_normal_log_density(x, mu, s1, s2).exp();
        for &p in &[0.1, 0.6, 0.9] {
            let q = double_normal_quantile(p, mu, s1, s2);
            let mass = trapezoid(f, 0.0, q, 40_000);
            assert_relative_eq!(mass, p, epsilon = 1e-5);
        }
    }

    #[test]
    fn double_t_sides_use_their_own_df() {
        let a = double_t_quantile(0.9, 0.0, 1.0, 1.0, 3.0, 3.0);
        let b = double_t_quantile(0.9, 0.0, 1.0, 1.0, 3.0, 50.0);
        assert!(b < a, "heavier right tail must give a larger upper quantile");
    }

    #[test]
    fn double_gnorm_quantiles_are_ordered() {
        let (r1, r2) = (gnorm_scale_ratio(1.2), gnorm_scale_ratio(2.5));
        let lo = double_gnorm_quantile(0.25, 50.0, 4.0, 6.0, r1, r2, 1.2, 2.5);
        let hi = double_gnorm_quantile(0.75, 50.0, 4.0, 6.0, r1, r2, 1.2, 2.5);
        assert!(lo < 50.0 && 50.0 < hi);
    }
}
