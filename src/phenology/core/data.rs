//! Observation data for phenology models.
//!
//! Purpose
//! -------
//! Provide a small, validated container for count observations indexed by a
//! day-of-year covariate and a group (typically a year), together with the
//! per-group design matrices for the location and scale trends.
//!
//! Key behaviors
//! -------------
//! - [`PhenologyData::new`] checks structure once at the boundary: lengths
//!   agree, group indices are in range, design matrices have one row per
//!   group, covariates are finite.
//! - Group indices arrive **1-based** and are stored
//!   **0-based** so evaluation code indexes per-group vectors directly.
//! - Optional group labels (e.g. the unique years `2001, 2002, …`) ride along
//!   for reporting via [`PhenologyData::with_labels`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `y.len() == x.len() == group.len() > 0`.
//! - Every `group[i] < n_levels` and `n_levels > 0`.
//! - `mu_mat.nrows() == sig_mat.nrows() == n_levels`; all entries finite.
//! - Counts `y` are **not** range-checked: families that need `y > 0` or
//!   integer counts produce `-inf`/NaN for invalid values instead.
//!
//! Downstream usage
//! ----------------
//! - Parameter layouts and parameter validation read `n_levels`, `k_mu()` and
//!   `k_sig()` from here.
//! - Objective evaluation relies on the invariants above and never re-checks
//!   them.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path and each rejection branch of
//!   `PhenologyData::new` and `with_labels`.
use crate::phenology::errors::{PhenologyError, PhenologyResult};
use ndarray::{Array1, Array2};

/// Validated observations plus per-group design matrices.
///
/// Fields
/// ------
/// - `y`: observed counts (or continuous responses for Gaussian/Lognormal).
/// - `x`: day-of-year covariate of each observation.
/// - `group`: 0-based group index of each observation.
/// - `n_levels`: number of groups.
/// - `mu_mat`: `n_levels × k_mu` design matrix for the location trend.
/// - `sig_mat`: `n_levels × k_sig` design matrix for the scale trend(s).
/// - `labels`: optional group labels for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenologyData {
    pub y: Array1<f64>,
    pub x: Array1<f64>,
    pub group: Array1<usize>,
    pub n_levels: usize,
    pub mu_mat: Array2<f64>,
    pub sig_mat: Array2<f64>,
    pub labels: Option<Array1<i64>>,
}

impl PhenologyData {
    /// Construct validated observation data.
    ///
    /// Parameters
    /// ----------
    /// - `y`, `x`: responses and day-of-year covariate (equal length, non-empty).
    /// - `groups`: **1-based** group index per observation.
    /// - `n_levels`: number of groups (`> 0`).
    /// - `mu_mat`, `sig_mat`: design matrices with `n_levels` rows.
    ///
    /// Errors
    /// ------
    /// - [`PhenologyError::NoGroups`] if `n_levels == 0`.
    /// - [`PhenologyError::EmptySeries`] if `y` is empty.
    /// - [`PhenologyError::LengthMismatch`] if `x` or `groups` differ in length
    ///   from `y`.
    /// - [`PhenologyError::NonFiniteCovariate`] for non-finite `x` or design
    ///   entries.
    /// - [`PhenologyError::GroupOutOfRange`] for indices outside
    ///   `1..=n_levels`.
    /// - [`PhenologyError::DesignRowMismatch`] if a design matrix does not have
    ///   one row per group.
    pub fn new(
        y: Array1<f64>, x: Array1<f64>, groups: Array1<i64>, n_levels: usize,
        mu_mat: Array2<f64>, sig_mat: Array2<f64>,
    ) -> PhenologyResult<Self> {
        if n_levels == 0 {
            return Err(PhenologyError::NoGroups);
        }
        if y.is_empty() {
            return Err(PhenologyError::EmptySeries);
        }
        check_len("x", y.len(), x.len())?;
        check_len("groups", y.len(), groups.len())?;
        check_finite("x", x.iter())?;

        let mut group = Array1::zeros(groups.len());
        for (index, (&g, slot)) in groups.iter().zip(group.iter_mut()).enumerate() {
            if g < 1 || g as u64 > n_levels as u64 {
                return Err(PhenologyError::GroupOutOfRange { index, group: g, n_levels });
            }
            *slot = (g - 1) as usize;
        }

        for (matrix, mat) in [("mu_mat", &mu_mat), ("sig_mat", &sig_mat)] {
            if mat.nrows() != n_levels {
                return Err(PhenologyError::DesignRowMismatch {
                    matrix,
                    rows: mat.nrows(),
                    n_levels,
                });
            }
            check_finite(matrix, mat.iter())?;
        }

        Ok(PhenologyData { y, x, group, n_levels, mu_mat, sig_mat, labels: None })
    }

    /// Attach group labels (one per group, in group order).
    ///
    /// Errors
    /// ------
    /// [`PhenologyError::LabelMismatch`] if `labels.len() != n_levels`.
    pub fn with_labels(mut self, labels: Array1<i64>) -> PhenologyResult<Self> {
        if labels.len() != self.n_levels {
            return Err(PhenologyError::LabelMismatch {
                n_levels: self.n_levels,
                actual: labels.len(),
            });
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always `false` for validated data; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of location-trend coefficients.
    pub fn k_mu(&self) -> usize {
        self.mu_mat.ncols()
    }

    /// Number of scale-trend coefficients (per side).
    pub fn k_sig(&self) -> usize {
        self.sig_mat.ncols()
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> PhenologyResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PhenologyError::LengthMismatch { what, expected, actual })
    }
}

fn check_finite<'a>(
    what: &'static str, values: impl Iterator<Item = &'a f64>,
) -> PhenologyResult<()> {
    for (index, &value) in values.enumerate() {
        if !value.is_finite() {
            return Err(PhenologyError::NonFiniteCovariate { what, index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Construction behavior of `PhenologyData::new` and `with_labels`: happy
    // path plus each structural rejection.
    // -------------------------------------------------------------------------

    fn intercepts(n: usize) -> Array2<f64> {
        Array2::ones((n, 1))
    }

    #[test]
    // Purpose
    // -------
    // Valid inputs build and groups are shifted to 0-based.
    fn new_accepts_valid_input_and_shifts_groups() {
        let data = PhenologyData::new(
            array![1.0, 4.0, 2.0],
            array![100.0, 110.0, 105.0],
            array![1, 2, 2],
            2,
            intercepts(2),
            intercepts(2),
        )
        .unwrap();
        assert_eq!(data.group, array![0usize, 1, 1]);
        assert_eq!(data.len(), 3);
        assert_eq!((data.k_mu(), data.k_sig()), (1, 1));
        assert!(data.labels.is_none());
    }

    #[test]
    fn new_rejects_structural_problems() {
        let ok_y = array![1.0, 2.0];
        let ok_x = array![1.0, 2.0];
        let ok_g = array![1_i64, 1];

        assert_eq!(
            PhenologyData::new(ok_y.clone(), ok_x.clone(), ok_g.clone(), 0, intercepts(0), intercepts(0)),
            Err(PhenologyError::NoGroups)
        );
        assert_eq!(
            PhenologyData::new(
                Array1::zeros(0),
                Array1::zeros(0),
                Array1::zeros(0),
                1,
                intercepts(1),
                intercepts(1)
            ),
            Err(PhenologyError::EmptySeries)
        );
        assert_eq!(
            PhenologyData::new(ok_y.clone(), array![1.0], ok_g.clone(), 1, intercepts(1), intercepts(1)),
            Err(PhenologyError::LengthMismatch { what: "x", expected: 2, actual: 1 })
        );
        assert_eq!(
            PhenologyData::new(ok_y.clone(), ok_x.clone(), array![1_i64], 1, intercepts(1), intercepts(1)),
            Err(PhenologyError::LengthMismatch { what: "groups", expected: 2, actual: 1 })
        );
        assert_eq!(
            PhenologyData::new(ok_y.clone(), ok_x.clone(), array![1_i64, 3], 2, intercepts(2), intercepts(2)),
            Err(PhenologyError::GroupOutOfRange { index: 1, group: 3, n_levels: 2 })
        );
        assert_eq!(
            PhenologyData::new(ok_y.clone(), ok_x.clone(), array![0_i64, 1], 2, intercepts(2), intercepts(2)),
            Err(PhenologyError::GroupOutOfRange { index: 0, group: 0, n_levels: 2 })
        );
        assert_eq!(
            PhenologyData::new(ok_y.clone(), ok_x.clone(), ok_g.clone(), 2, intercepts(3), intercepts(2)),
            Err(PhenologyError::DesignRowMismatch { matrix: "mu_mat", rows: 3, n_levels: 2 })
        );
        assert!(matches!(
            PhenologyData::new(ok_y.clone(), array![1.0, f64::NAN], ok_g.clone(), 1, intercepts(1), intercepts(1)),
            Err(PhenologyError::NonFiniteCovariate { what: "x", index: 1, .. })
        ));
        let mut bad_sig = intercepts(1);
        bad_sig[[0, 0]] = f64::INFINITY;
        assert!(matches!(
            PhenologyData::new(ok_y, ok_x, ok_g, 1, intercepts(1), bad_sig),
            Err(PhenologyError::NonFiniteCovariate { what: "sig_mat", index: 0, .. })
        ));
    }

    #[test]
    fn counts_are_not_range_checked() {
        let data = PhenologyData::new(
            array![-1.0, 0.0],
            array![10.0, 20.0],
            array![1, 1],
            1,
            intercepts(1),
            intercepts(1),
        );
        assert!(data.is_ok());
    }

    #[test]
    fn labels_must_cover_every_group() {
        let data = PhenologyData::new(
            array![1.0, 2.0],
            array![10.0, 20.0],
            array![1, 2],
            2,
            intercepts(2),
            intercepts(2),
        )
        .unwrap();
        assert_eq!(
            data.clone().with_labels(array![2001]),
            Err(PhenologyError::LabelMismatch { n_levels: 2, actual: 1 })
        );
        let labelled = data.with_labels(array![2001, 2002]).unwrap();
        assert_eq!(labelled.labels, Some(array![2001, 2002]));
    }
}
