//! Tail models for the timing curve and their resolved kernels.
//!
//! Purpose
//! -------
//! Name the three tail families a timing curve may follow and turn a
//! `(tail, asymmetric)` pair into a pair of plain function pointers (log-density
//! and quantile) once, so per-observation and per-day loops never branch on
//! configuration.
//!
//! Key behaviors
//! -------------
//! - [`TailModel`] parses from the integer selector codes (`0` Normal,
//!   `1` Student-t, `2` generalized normal) via `TryFrom<i64>` and from
//!   case-insensitive names via `FromStr`.
//! - [`TailKernel::resolve`] picks the single- or double-sided variant. Every
//!   kernel reads the same per-group [`GroupCurve`] and evaluation-wide
//!   [`ShapeParams`]; fields a variant does not need are ignored.
//!
//! Conventions
//! -----------
//! - Symmetric kernels use `sigma1` (and `alpha1`/`beta_1`/`tdf_1`) only.
//! - Double-sided generalized-normal kernels use the standardized side ratios
//!   in [`ShapeParams`], not the per-group `alpha` values.
use crate::phenology::{
    core::{
        assembly::GroupCurve,
        double_sided::{
            double_gnorm_log_density, double_gnorm_quantile, double_normal_log_density,
            double_normal_quantile, double_t_log_density, double_t_quantile,
        },
        shapes::ShapeParams,
        single_sided::{
            gnorm_log_density, gnorm_quantile, normal_log_density, normal_quantile,
            student_t_log_density, student_t_quantile,
        },
    },
    errors::PhenologyError,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tail family of the timing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailModel {
    /// Gaussian tails.
    #[default]
    Normal,
    /// Student-t tails; degrees of freedom `exp(log_tdf) + 2`.
    StudentT,
    /// Generalized-normal (exponential power) tails; shape `exp(log_beta)`.
    GeneralizedNormal,
}

impl TailModel {
    /// Integer selector code of this tail model.
    pub const fn code(self) -> i64 {
        match self {
            TailModel::Normal => 0,
            TailModel::StudentT => 1,
            TailModel::GeneralizedNormal => 2,
        }
    }
}

impl TryFrom<i64> for TailModel {
    type Error = PhenologyError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TailModel::Normal),
            1 => Ok(TailModel::StudentT),
            2 => Ok(TailModel::GeneralizedNormal),
            _ => Err(PhenologyError::InvalidTailSelector { code }),
        }
    }
}

impl FromStr for TailModel {
    type Err = PhenologyError;

    /// Parse a tail model from a name (case-insensitive).
    ///
    /// Accepts `"normal"`/`"gaussian"`, `"student_t"`/`"t"`, and
    /// `"generalized_normal"`/`"gnorm"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "gaussian" => Ok(TailModel::Normal),
            "student_t" | "studentt" | "t" => Ok(TailModel::StudentT),
            "generalized_normal" | "generalizednormal" | "gnorm" => {
                Ok(TailModel::GeneralizedNormal)
            }
            _ => Err(PhenologyError::UnknownName {
                what: "tail model",
                name: s.to_string(),
                reason: "Valid options are 'normal', 'student_t' or 'generalized_normal'.",
            }),
        }
    }
}

/// Log-density of the timing curve at `x` for one group.
pub type DensityFn = fn(f64, &GroupCurve, &ShapeParams) -> f64;
/// Quantile of the timing curve at probability `p` for one group.
pub type QuantileFn = fn(f64, &GroupCurve, &ShapeParams) -> f64;

/// Density and quantile kernels for one `(tail, asymmetric)` configuration.
#[derive(Clone, Copy)]
pub struct TailKernel {
    pub log_density: DensityFn,
    pub quantile: QuantileFn,
}

impl std::fmt::Debug for TailKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TailKernel").finish_non_exhaustive()
    }
}

impl TailKernel {
    /// Resolve the kernels for a tail model and asymmetry flag.
    pub fn resolve(tail: TailModel, asymmetric: bool) -> Self {
        match (tail, asymmetric) {
            (TailModel::Normal, false) => TailKernel { log_density: normal_ld, quantile: normal_q },
            (TailModel::Normal, true) => {
                TailKernel { log_density: double_normal_ld, quantile: double_normal_q }
            }
            (TailModel::StudentT, false) => TailKernel { log_density: t_ld, quantile: t_q },
            (TailModel::StudentT, true) => {
                TailKernel { log_density: double_t_ld, quantile: double_t_q }
            }
            (TailModel::GeneralizedNormal, false) => {
                TailKernel { log_density: gnorm_ld, quantile: gnorm_q }
            }
            (TailModel::GeneralizedNormal, true) => {
                TailKernel { log_density: double_gnorm_ld, quantile: double_gnorm_q }
            }
        }
    }
}

// ---- Symmetric ----

fn normal_ld(x: f64, c: &GroupCurve, _s: &ShapeParams) -> f64 {
    normal_log_density(x, c.mu, c.sigma1)
}

fn normal_q(p: f64, c: &GroupCurve, _s: &ShapeParams) -> f64 {
    normal_quantile(p, c.mu, c.sigma1)
}

fn t_ld(x: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    student_t_log_density(x, c.mu, c.sigma1, s.tdf_1)
}

fn t_q(p: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    student_t_quantile(p, c.mu, c.sigma1, s.tdf_1)
}

fn gnorm_ld(x: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    gnorm_log_density(x, c.mu, c.alpha1, s.beta_1)
}

fn gnorm_q(p: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    gnorm_quantile(p, c.mu, c.alpha1, s.beta_1)
}

// ---- Double-sided ----

fn double_normal_ld(x: f64, c: &GroupCurve, _s: &ShapeParams) -> f64 {
    double_normal_log_density(x, c.mu, c.sigma1, c.sigma2)
}

fn double_normal_q(p: f64, c: &GroupCurve, _s: &ShapeParams) -> f64 {
    double_normal_quantile(p, c.mu, c.sigma1, c.sigma2)
}

fn double_t_ld(x: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    double_t_log_density(x, c.mu, c.sigma1, c.sigma2, s.tdf_1, s.tdf_2)
}

fn double_t_q(p: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    double_t_quantile(p, c.mu, c.sigma1, c.sigma2, s.tdf_1, s.tdf_2)
}

fn double_gnorm_ld(x: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    double_gnorm_log_density(
        x, c.mu, c.sigma1, c.sigma2, s.ratio_1, s.ratio_2, s.beta_1, s.beta_2,
    )
}

fn double_gnorm_q(p: f64, c: &GroupCurve, s: &ShapeParams) -> f64 {
    double_gnorm_quantile(p, c.mu, c.sigma1, c.sigma2, s.ratio_1, s.ratio_2, s.beta_1, s.beta_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phenology::core::single_sided::gnorm_scale_ratio;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Selector/name parsing and kernel resolution. Distribution values are
    // covered by `single_sided` and `double_sided`.
    // -------------------------------------------------------------------------

    fn shapes(beta: f64) -> ShapeParams {
        let ratio = gnorm_scale_ratio(beta);
        ShapeParams { tdf_1: 5.0, tdf_2: 5.0, beta_1: beta, beta_2: beta, ratio_1: ratio, ratio_2: ratio }
    }

    fn curve(mu: f64, sigma: f64, ratio: f64) -> GroupCurve {
        GroupCurve { mu, sigma1: sigma, sigma2: sigma, alpha1: sigma * ratio, alpha2: sigma * ratio }
    }

    #[test]
    fn selector_codes_round_trip() {
        for tail in [TailModel::Normal, TailModel::StudentT, TailModel::GeneralizedNormal] {
            assert_eq!(TailModel::try_from(tail.code()).unwrap(), tail);
        }
        assert_eq!(
            TailModel::try_from(3),
            Err(PhenologyError::InvalidTailSelector { code: 3 })
        );
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Student_T".parse::<TailModel>().unwrap(), TailModel::StudentT);
        assert_eq!("GNORM".parse::<TailModel>().unwrap(), TailModel::GeneralizedNormal);
        assert!(matches!(
            "cauchy".parse::<TailModel>(),
            Err(PhenologyError::UnknownName { what: "tail model", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // With equal sides the symmetric and double-sided kernels of every tail
    // model agree on density and quartiles.
    fn symmetric_and_double_kernels_agree_on_equal_sides() {
        let s = shapes(1.7);
        let c = curve(140.0, 9.0, s.ratio_1);
        for tail in [TailModel::Normal, TailModel::StudentT, TailModel::GeneralizedNormal] {
            let single = TailKernel::resolve(tail, false);
            let double = TailKernel::resolve(tail, true);
            for &x in &[120.0, 139.0, 140.0, 155.0] {
                assert_relative_eq!(
                    (single.log_density)(x, &c, &s),
                    (double.log_density)(x, &c, &s),
                    epsilon = 1e-12
                );
            }
            for &p in &[0.25, 0.75] {
                assert_relative_eq!(
                    (single.quantile)(p, &c, &s),
                    (double.quantile)(p, &c, &s),
                    epsilon = 1e-8
                );
            }
        }
    }
}
