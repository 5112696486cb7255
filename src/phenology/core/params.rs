//! Phenology parameters and the flat optimizer-vector layout.
//!
//! This module provides the **named** parameter container [`PhenologyParams`]
//! and the mapping to and from one unconstrained **optimizer-space vector**
//! ([`ParamVec`]), so an external driver can treat the objective as a function
//! of a single `Array1<f64>`.
//!
//! ## Layout
//! With `G = n_levels`, `Kmu = mu_mat.ncols()`, `Ksig = sig_mat.ncols()`:
//!
//! ```text
//! [ log_sigma1_sd | sigma1_devs (G) | log_sigma2_sd | sigma2_devs (G) |
//!   theta (G) | mu_devs (G) | log_sigma_mu_devs |
//!   log_tdf_1 | log_tdf_2 | log_beta_1 | log_beta_2 | log_obs_sigma |
//!   b_mu (Kmu) | b_sig1 (Ksig) | b_sig2 (Ksig) ]
//! ```
//!
//! Every slot is always present. Slots a configuration does not use (for
//! example `sigma2_devs` in a symmetric model, or `log_tdf_*` with normal
//! tails) are carried through unchanged and have no effect on the objective,
//! so their derivative is exactly zero.
//!
//! ## Scales
//! All parameters are unconstrained reals: positive quantities enter on the
//! log scale and `tdf = exp(log_tdf) + 2`. The trend coefficients `b_sig1` /
//! `b_sig2` act on the **natural** scale of `sigma`; keeping the resulting
//! scales positive is the caller's responsibility.
use crate::phenology::{
    core::data::PhenologyData,
    errors::{PhenologyError, PhenologyResult},
};
use ndarray::{Array1, ArrayView1, s};
use std::ops::Range;

/// Flat optimizer-space parameter vector.
pub type ParamVec = Array1<f64>;

/// Number of scalar (non-vector) slots in the layout.
const N_SCALARS: usize = 8;

/// Block sizes of the flat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    pub n_levels: usize,
    pub k_mu: usize,
    pub k_sig: usize,
}

impl ParamLayout {
    pub fn new(n_levels: usize, k_mu: usize, k_sig: usize) -> Self {
        ParamLayout { n_levels, k_mu, k_sig }
    }

    pub fn for_data(data: &PhenologyData) -> Self {
        ParamLayout::new(data.n_levels, data.k_mu(), data.k_sig())
    }

    /// Total length of the flat vector: `8 + 4G + Kmu + 2 Ksig`.
    pub fn len(&self) -> usize {
        N_SCALARS + 4 * self.n_levels + self.k_mu + 2 * self.k_sig
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of a named block (field name of [`PhenologyParams`]) in the
    /// flat vector, or `None` for an unknown name.
    pub fn range_of(&self, name: &str) -> Option<Range<usize>> {
        let g = self.n_levels;
        let blocks: [(&str, usize); 15] = [
            ("log_sigma1_sd", 1),
            ("sigma1_devs", g),
            ("log_sigma2_sd", 1),
            ("sigma2_devs", g),
            ("theta", g),
            ("mu_devs", g),
            ("log_sigma_mu_devs", 1),
            ("log_tdf_1", 1),
            ("log_tdf_2", 1),
            ("log_beta_1", 1),
            ("log_beta_2", 1),
            ("log_obs_sigma", 1),
            ("b_mu", self.k_mu),
            ("b_sig1", self.k_sig),
            ("b_sig2", self.k_sig),
        ];
        let mut start = 0;
        for (block, len) in blocks {
            if block == name {
                return Some(start..start + len);
            }
            start += len;
        }
        None
    }
}

/// Named parameters of the phenology objective.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenologyParams {
    /// Log-SD of the `sigma1` random deviations.
    pub log_sigma1_sd: f64,
    pub sigma1_devs: Array1<f64>,
    /// Log-SD of the `sigma2` random deviations.
    pub log_sigma2_sd: f64,
    pub sigma2_devs: Array1<f64>,
    /// Per-group log-intensity offset.
    pub theta: Array1<f64>,
    pub mu_devs: Array1<f64>,
    /// Log-SD of the `mu` random deviations.
    pub log_sigma_mu_devs: f64,
    pub log_tdf_1: f64,
    pub log_tdf_2: f64,
    pub log_beta_1: f64,
    pub log_beta_2: f64,
    pub log_obs_sigma: f64,
    pub b_mu: Array1<f64>,
    pub b_sig1: Array1<f64>,
    pub b_sig2: Array1<f64>,
}

impl PhenologyParams {
    /// All-zero parameters sized for `layout`.
    pub fn zeros(layout: ParamLayout) -> Self {
        let g = layout.n_levels;
        PhenologyParams {
            log_sigma1_sd: 0.0,
            sigma1_devs: Array1::zeros(g),
            log_sigma2_sd: 0.0,
            sigma2_devs: Array1::zeros(g),
            theta: Array1::zeros(g),
            mu_devs: Array1::zeros(g),
            log_sigma_mu_devs: 0.0,
            log_tdf_1: 0.0,
            log_tdf_2: 0.0,
            log_beta_1: 0.0,
            log_beta_2: 0.0,
            log_obs_sigma: 0.0,
            b_mu: Array1::zeros(layout.k_mu),
            b_sig1: Array1::zeros(layout.k_sig),
            b_sig2: Array1::zeros(layout.k_sig),
        }
    }

    /// Unpack a flat optimizer vector.
    ///
    /// # Errors
    /// - [`PhenologyError::VectorLengthMismatch`] if `vec.len() != layout.len()`.
    /// - [`PhenologyError::NonFiniteParam`] for any non-finite entry.
    pub fn from_vec(vec: ArrayView1<f64>, layout: ParamLayout) -> PhenologyResult<Self> {
        check_vec(vec, layout)?;
        Ok(Self::unpack(vec, layout))
    }

    /// Unpack without checks; `vec.len()` must equal `layout.len()`.
    pub(crate) fn unpack(vec: ArrayView1<f64>, layout: ParamLayout) -> Self {
        let g = layout.n_levels;
        let mut cursor = Cursor { vec, at: 0 };
        let log_sigma1_sd = cursor.next();
        let sigma1_devs = cursor.block(g);
        let log_sigma2_sd = cursor.next();
        let sigma2_devs = cursor.block(g);
        let theta = cursor.block(g);
        let mu_devs = cursor.block(g);
        let log_sigma_mu_devs = cursor.next();
        let log_tdf_1 = cursor.next();
        let log_tdf_2 = cursor.next();
        let log_beta_1 = cursor.next();
        let log_beta_2 = cursor.next();
        let log_obs_sigma = cursor.next();
        let b_mu = cursor.block(layout.k_mu);
        let b_sig1 = cursor.block(layout.k_sig);
        let b_sig2 = cursor.block(layout.k_sig);

        PhenologyParams {
            log_sigma1_sd,
            sigma1_devs,
            log_sigma2_sd,
            sigma2_devs,
            theta,
            mu_devs,
            log_sigma_mu_devs,
            log_tdf_1,
            log_tdf_2,
            log_beta_1,
            log_beta_2,
            log_obs_sigma,
            b_mu,
            b_sig1,
            b_sig2,
        }
    }

    /// Pack into a flat optimizer vector (see the module docs for the order).
    ///
    /// Assumes block lengths are mutually consistent (as after
    /// [`PhenologyParams::from_vec`] or a successful `validate_for`).
    pub fn to_vec(&self) -> ParamVec {
        let g = self.theta.len();
        let layout = ParamLayout::new(g, self.b_mu.len(), self.b_sig1.len());
        let mut out = Array1::zeros(layout.len());
        let mut at = 0usize;
        {
            let mut put = |vals: ArrayView1<f64>| {
                out.slice_mut(s![at..at + vals.len()]).assign(&vals);
                at += vals.len();
            };
            put(ArrayView1::from(std::slice::from_ref(&self.log_sigma1_sd)));
            put(self.sigma1_devs.view());
            put(ArrayView1::from(std::slice::from_ref(&self.log_sigma2_sd)));
            put(self.sigma2_devs.view());
            put(self.theta.view());
            put(self.mu_devs.view());
            for v in [
                &self.log_sigma_mu_devs,
                &self.log_tdf_1,
                &self.log_tdf_2,
                &self.log_beta_1,
                &self.log_beta_2,
                &self.log_obs_sigma,
            ] {
                put(ArrayView1::from(std::slice::from_ref(v)));
            }
            put(self.b_mu.view());
            put(self.b_sig1.view());
            put(self.b_sig2.view());
        }
        out
    }

    /// Check block lengths against the data the parameters will be used with.
    ///
    /// # Errors
    /// [`PhenologyError::ParamLengthMismatch`] naming the first offending block.
    pub fn validate_for(&self, data: &PhenologyData) -> PhenologyResult<()> {
        let g = data.n_levels;
        let blocks: [(&'static str, usize, usize); 7] = [
            ("sigma1_devs", g, self.sigma1_devs.len()),
            ("sigma2_devs", g, self.sigma2_devs.len()),
            ("theta", g, self.theta.len()),
            ("mu_devs", g, self.mu_devs.len()),
            ("b_mu", data.k_mu(), self.b_mu.len()),
            ("b_sig1", data.k_sig(), self.b_sig1.len()),
            ("b_sig2", data.k_sig(), self.b_sig2.len()),
        ];
        for (name, expected, actual) in blocks {
            if expected != actual {
                return Err(PhenologyError::ParamLengthMismatch { name, expected, actual });
            }
        }
        Ok(())
    }
}

/// Length and finiteness check shared by `from_vec` and the objective seam.
pub fn check_vec(vec: ArrayView1<f64>, layout: ParamLayout) -> PhenologyResult<()> {
    if vec.len() != layout.len() {
        return Err(PhenologyError::VectorLengthMismatch {
            expected: layout.len(),
            actual: vec.len(),
        });
    }
    if let Some((index, &value)) = vec.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PhenologyError::NonFiniteParam { index, value });
    }
    Ok(())
}

struct Cursor<'a> {
    vec: ArrayView1<'a, f64>,
    at: usize,
}

impl Cursor<'_> {
    fn next(&mut self) -> f64 {
        let v = self.vec[self.at];
        self.at += 1;
        v
    }

    fn block(&mut self, len: usize) -> Array1<f64> {
        let out = self.vec.slice(s![self.at..self.at + len]).to_owned();
        self.at += len;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Layout arithmetic, flat-vector packing order, and length/finiteness
    // validation.
    // -------------------------------------------------------------------------

    fn data(g: usize, k_mu: usize, k_sig: usize) -> PhenologyData {
        let groups = Array1::from_iter((1..=g as i64).cycle().take(2 * g));
        PhenologyData::new(
            Array1::ones(2 * g),
            Array1::from_elem(2 * g, 100.0),
            groups,
            g,
            Array2::ones((g, k_mu)),
            Array2::ones((g, k_sig)),
        )
        .unwrap()
    }

    #[test]
    fn layout_length_counts_every_block() {
        let layout = ParamLayout::new(3, 2, 1);
        assert_eq!(layout.len(), 8 + 12 + 2 + 2);
        assert_eq!(ParamLayout::for_data(&data(3, 2, 1)), layout);
    }

    #[test]
    fn range_of_matches_flat_order() {
        let layout = ParamLayout::new(2, 2, 1);
        assert_eq!(layout.range_of("log_sigma1_sd"), Some(0..1));
        assert_eq!(layout.range_of("theta"), Some(6..8));
        assert_eq!(layout.range_of("log_obs_sigma"), Some(15..16));
        assert_eq!(layout.range_of("b_sig2"), Some(19..20));
        assert_eq!(layout.range_of("gamma"), None);
    }

    #[test]
    // Purpose
    // -------
    // The flat order is fixed; check it slot by slot on a vector 0, 1, 2, ...
    //
    // Given
    // -----
    // G = 2, Kmu = 2, Ksig = 1 (length 20).
    //
    // Expect
    // ------
    // Each named block reads the documented positions.
    fn from_vec_reads_documented_order() {
        let layout = ParamLayout::new(2, 2, 1);
        let v = Array1::from_iter((0..layout.len()).map(|i| i as f64));
        let p = PhenologyParams::from_vec(v.view(), layout).unwrap();
        assert_eq!(p.log_sigma1_sd, 0.0);
        assert_eq!(p.sigma1_devs, array![1.0, 2.0]);
        assert_eq!(p.log_sigma2_sd, 3.0);
        assert_eq!(p.sigma2_devs, array![4.0, 5.0]);
        assert_eq!(p.theta, array![6.0, 7.0]);
        assert_eq!(p.mu_devs, array![8.0, 9.0]);
        assert_eq!(p.log_sigma_mu_devs, 10.0);
        assert_eq!(
            [p.log_tdf_1, p.log_tdf_2, p.log_beta_1, p.log_beta_2, p.log_obs_sigma],
            [11.0, 12.0, 13.0, 14.0, 15.0]
        );
        assert_eq!(p.b_mu, array![16.0, 17.0]);
        assert_eq!(p.b_sig1, array![18.0]);
        assert_eq!(p.b_sig2, array![19.0]);
        assert_eq!(p.to_vec(), v);
    }

    #[test]
    fn to_vec_then_from_vec_is_identity() {
        let layout = ParamLayout::new(3, 1, 2);
        let mut p = PhenologyParams::zeros(layout);
        p.theta = array![1.5, -0.5, 2.0];
        p.b_sig2 = array![3.0, 0.25];
        p.log_obs_sigma = -1.2;
        let back = PhenologyParams::from_vec(p.to_vec().view(), layout).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn from_vec_rejects_bad_vectors() {
        let layout = ParamLayout::new(1, 1, 1);
        assert_eq!(
            PhenologyParams::from_vec(Array1::zeros(5).view(), layout),
            Err(PhenologyError::VectorLengthMismatch { expected: 15, actual: 5 })
        );
        let mut v = Array1::zeros(layout.len());
        v[4] = f64::NAN;
        assert!(matches!(
            PhenologyParams::from_vec(v.view(), layout),
            Err(PhenologyError::NonFiniteParam { index: 4, .. })
        ));
    }

    #[test]
    fn validate_for_names_offending_block() {
        let d = data(2, 1, 1);
        let mut p = PhenologyParams::zeros(ParamLayout::for_data(&d));
        assert!(p.validate_for(&d).is_ok());
        p.b_mu = array![1.0, 2.0];
        assert_eq!(
            p.validate_for(&d),
            Err(PhenologyError::ParamLengthMismatch { name: "b_mu", expected: 1, actual: 2 })
        );
        p.b_mu = array![1.0];
        p.theta = array![0.0];
        assert_eq!(
            p.validate_for(&d),
            Err(PhenologyError::ParamLengthMismatch { name: "theta", expected: 2, actual: 1 })
        );
    }
}
