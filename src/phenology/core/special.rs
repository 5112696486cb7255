//! Special-function primitives used by the distribution library.
//!
//! Thin, infallible wrappers around `statrs` special functions plus the few
//! count-data log-densities the observation families need. None of these
//! functions validate their arguments: out-of-domain inputs (non-positive
//! scales, negative shapes, probabilities outside `[0, 1]`) produce NaN or ±inf,
//! which the objective propagates to the caller unchanged.
//!
//! ## Provided items
//! - Normal: [`ln_norm_density`], [`std_normal_quantile`].
//! - Student-t: [`ln_student_t_std`] (standard, unit-scale log-density).
//! - Gamma: [`gamma_quantile`], [`gamma_log_quantile`] (unit scale, log of
//!   the quantile), [`ln_gamma_density`] (shape/scale form).
//! - Counts: [`ln_poisson`], [`ln_nbinom_robust`], [`ln_binom_robust`].
//! - [`logspace_add`]: `ln(exp(a) + exp(b))` without overflow.
//!
//! ## Numerics
//! - `gamma_quantile` solves for `u = ln x` rather than `x`. Below the median
//!   it matches `ln P(a, e^u)` to `ln p`, above it `ln Q(a, e^u)` to
//!   `ln(1 − p)`. Both are monotone and concave or convex in `u`, so Newton
//!   steps are kept inside a sign bracket and fall back to bisection (or a
//!   doubling stride while the bracket is still open). Roots far below one
//!   are reached without loss, which matters for shapes `a = 1/β` with a large
//!   generalized-normal `β`.
//! - For `x < 1e-8` the tails come from the series
//!   `ln P(a, x) = a ln x − ln Γ(a + 1) − a x / (a + 1) + O(x²)`; `statrs`
//!   reports `P(a, x) = 0` for `x` below about `1e-15`.
//! - Starting values use the small-`x` asymptote `P(a, x) ≈ x^a / Γ(a + 1)` for
//!   `a ≤ 1` or tiny `p`, and the Wilson–Hilferty cube-root approximation
//!   otherwise.
//! - The count densities are written over real-valued `y` so that counts stored
//!   as `f64` need no conversion; they match the integer pmfs on integers.
use statrs::{
    consts::{LN_PI, LN_SQRT_2PI},
    function::{
        erf::erfc_inv,
        gamma::{checked_gamma_lr, checked_gamma_ur, ln_gamma},
    },
};
use std::f64::consts::SQRT_2;

const QGAMMA_MAX_ITERS: usize = 200;
const QGAMMA_LOG_TOL: f64 = 1e-15;
const QGAMMA_SERIES_X: f64 = 1e-8;

/// Log-density of `Normal(mean, sd)` at `x`.
#[inline]
pub fn ln_norm_density(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    -LN_SQRT_2PI - sd.ln() - 0.5 * z * z
}

/// Quantile of the standard normal distribution, `Φ⁻¹(p)`.
///
/// Returns `-inf` at `p = 0`, `+inf` at `p = 1`.
#[inline]
pub fn std_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Log-density of the standard (location 0, scale 1) Student-t with `df`
/// degrees of freedom at `z`.
#[inline]
pub fn ln_student_t_std(z: f64, df: f64) -> f64 {
    ln_gamma(0.5 * (df + 1.0)) - ln_gamma(0.5 * df) - 0.5 * (df.ln() + LN_PI)
        - 0.5 * (df + 1.0) * (z * z / df).ln_1p()
}

/// Quantile of `Gamma(shape, scale)` at probability `p`.
///
/// Returns NaN for non-finite inputs, non-positive `shape`/`scale`, or `p`
/// outside `[0, 1]`; `0` at `p = 0` and `+inf` at `p = 1`.
pub fn gamma_quantile(p: f64, shape: f64, scale: f64) -> f64 {
    if !(p.is_finite() && shape.is_finite() && scale.is_finite()) {
        return f64::NAN;
    }
    if shape <= 0.0 || scale <= 0.0 || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return 0.0;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    scale * ln_inverse_lower_gamma(shape, p).exp()
}

/// Natural log of the `Gamma(shape, 1)` quantile at probability `p`.
///
/// Stays finite for roots far below the smallest `f64`, so callers that raise
/// the quantile to a power (the generalized normal takes the `1/β`-th root)
/// can do so in log space. Returns NaN for invalid inputs, `-inf` at `p = 0`
/// and `+inf` at `p = 1`.
pub fn gamma_log_quantile(p: f64, shape: f64) -> f64 {
    if !(p.is_finite() && shape.is_finite()) || shape <= 0.0 || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    ln_inverse_lower_gamma(shape, p)
}

/// Log-density of `Gamma(shape, scale)` at `x` (mean `shape * scale`).
#[inline]
pub fn ln_gamma_density(x: f64, shape: f64, scale: f64) -> f64 {
    -ln_gamma(shape) - shape * scale.ln() + (shape - 1.0) * x.ln() - x / scale
}

/// Log-pmf of `Poisson(lambda)` at `y`.
#[inline]
pub fn ln_poisson(y: f64, lambda: f64) -> f64 {
    y * lambda.ln() - lambda - ln_gamma(y + 1.0)
}

/// `ln(exp(a) + exp(b))`, stable for large magnitudes.
#[inline]
pub fn logspace_add(a: f64, b: f64) -> f64 {
    a.max(b) + (-(a - b).abs()).exp().ln_1p()
}

/// Negative-binomial log-pmf in the robust mean/excess-variance form.
///
/// The distribution is parameterized on the log scale by its mean,
/// `log_mu = ln(μ)`, and its excess variance, `log_var_minus_mu = ln(Var − μ)`.
/// This gives size `n = μ² / (Var − μ)` and success probability `μ / Var`.
/// All intermediate quantities stay in log space.
pub fn ln_nbinom_robust(y: f64, log_mu: f64, log_var_minus_mu: f64) -> f64 {
    let log_var = logspace_add(log_mu, log_var_minus_mu);
    let log_p = log_mu - log_var;
    let n = (2.0 * log_mu - log_var_minus_mu).exp();
    let mut log_res = n * log_p;
    if y != 0.0 {
        let log_1mp = log_var_minus_mu - log_var;
        log_res += ln_gamma(y + n) - ln_gamma(n) - ln_gamma(y + 1.0) + y * log_1mp;
    }
    log_res
}

/// Binomial log-pmf with the success probability given on the logit scale.
///
/// `ln p` and `ln(1 − p)` are computed as `−ln(1 + e^{−η})` and
/// `−ln(1 + e^{η})`, which stay finite for any finite logit `η`. The binomial
/// coefficient `ln C(size, y)` is always included; it vanishes for Bernoulli
/// outcomes `y ∈ {0, 1}` and is non-zero for fractional responses.
pub fn ln_binom_robust(y: f64, size: f64, logit_p: f64) -> f64 {
    let log_p = -logspace_add(0.0, -logit_p);
    let log_1mp = -logspace_add(0.0, logit_p);
    let ln_choose = ln_gamma(size + 1.0) - ln_gamma(y + 1.0) - ln_gamma(size - y + 1.0);
    ln_choose + y * log_p + (size - y) * log_1mp
}

/// Solve `P(a, e^u) = p` for `u` with `a > 0` and `0 < p < 1`.
fn ln_inverse_lower_gamma(a: f64, p: f64) -> f64 {
    let upper = p > 0.5;
    let target = if upper { (1.0 - p).ln() } else { p.ln() };
    let ln_gamma_a = ln_gamma(a);
    let ln_gamma_a1 = ln_gamma(a + 1.0);

    // Residual oriented to increase with `u`, and its derivative in `u`.
    let residual = |u: f64| -> (f64, f64) {
        let (ln_lower, ln_upper) = ln_gamma_tails(a, u, ln_gamma_a1);
        let (ln_tail, r) =
            if upper { (ln_upper, target - ln_upper) } else { (ln_lower, ln_lower - target) };
        let slope = (a * u - u.exp() - ln_gamma_a - ln_tail).exp();
        (r, slope)
    };

    let mut u = initial_log_guess(a, p, ln_gamma_a1);
    let (mut lo, mut hi) = (f64::NEG_INFINITY, f64::INFINITY);
    let mut stride = 1.0;
    for _ in 0..QGAMMA_MAX_ITERS {
        let (r, slope) = residual(u);
        if r.is_nan() || r == 0.0 {
            break;
        }
        if r < 0.0 {
            lo = u;
        } else {
            hi = u;
        }

        let newton = u - r / slope;
        let newton_ok = r.is_finite() && slope.is_finite() && slope > 0.0;
        let next = if newton_ok && newton > lo && newton < hi {
            newton
        } else if lo.is_finite() && hi.is_finite() {
            0.5 * (lo + hi)
        } else {
            stride *= 2.0;
            if lo.is_finite() { lo + stride } else { hi - stride }
        };

        let done = (next - u).abs() <= QGAMMA_LOG_TOL * (1.0 + u.abs());
        u = next;
        if done || (hi - lo) <= QGAMMA_LOG_TOL * (1.0 + u.abs()) {
            break;
        }
    }
    u
}

/// `(ln P(a, x), ln Q(a, x))` at `x = e^u`.
fn ln_gamma_tails(a: f64, u: f64, ln_gamma_a1: f64) -> (f64, f64) {
    let x = u.exp();
    if x.is_infinite() {
        return (0.0, f64::NEG_INFINITY);
    }
    if x < QGAMMA_SERIES_X {
        let ln_lower = a * u - ln_gamma_a1 - x * a / (a + 1.0);
        return (ln_lower, (-ln_lower.exp()).ln_1p());
    }
    let lower = checked_gamma_lr(a, x).unwrap_or(f64::NAN);
    let upper = checked_gamma_ur(a, x).unwrap_or(f64::NAN);
    (lower.ln(), upper.ln())
}

fn initial_log_guess(a: f64, p: f64, ln_gamma_a1: f64) -> f64 {
    let asymptote = (p.ln() + ln_gamma_a1) / a;
    if a <= 1.0 || p < 1e-8 {
        return asymptote;
    }
    let z = std_normal_quantile(p);
    let c = 1.0 / (9.0 * a);
    let cube = 1.0 - c + z * c.sqrt();
    if cube > 0.0 { a.ln() + 3.0 * cube.ln() } else { asymptote }
}
