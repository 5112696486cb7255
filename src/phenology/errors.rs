//! Errors for the phenology kernel (data validation, configuration parsing,
//! parameter layout, and sensitivity reporting).
//!
//! This module defines a single error type, [`PhenologyError`], used across the
//! crate. Errors only arise at the API boundary, when data, configuration or
//! parameter containers are built or checked against each other. Evaluating the
//! objective itself never fails: numeric domain problems (non-positive scales,
//! log of non-positive counts) propagate as NaN / ±inf.
//!
//! ## Conventions
//! - **Observation and group indices in messages are 0-based**, except for
//!   [`PhenologyError::GroupOutOfRange`] which reports the raw 1-based group
//!   value the caller supplied.
//! - Selector errors echo the integer code the caller passed so that the
//!   selector encoding (family `1..=5`, tail model `0..=2`) can be checked.
use thiserror::Error;

/// Crate-wide result alias for operations that may produce [`PhenologyError`].
pub type PhenologyResult<T> = Result<T, PhenologyError>;

/// Unified error type for the phenology kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhenologyError {
    // ---- Input/data validation ----
    /// Observation series is empty.
    #[error("Input series is empty.")]
    EmptySeries,

    /// Two per-observation (or per-group) inputs disagree in length.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}.")]
    LengthMismatch { what: &'static str, expected: usize, actual: usize },

    /// A 1-based group index lies outside `1..=n_levels`.
    #[error("Group index at observation {index} is {group}; must lie in 1..={n_levels}.")]
    GroupOutOfRange { index: usize, group: i64, n_levels: usize },

    /// The model needs at least one group.
    #[error("Number of groups must be at least one.")]
    NoGroups,

    /// A design matrix must have one row per group.
    #[error("Design matrix `{matrix}` has {rows} rows; expected one per group ({n_levels}).")]
    DesignRowMismatch { matrix: &'static str, rows: usize, n_levels: usize },

    /// Covariate values and design-matrix entries must be finite.
    #[error("Non-finite value in {what} at index {index}: {value}")]
    NonFiniteCovariate { what: &'static str, index: usize, value: f64 },

    /// Group labels, when supplied, must name every group exactly once.
    #[error("Expected {n_levels} group labels, got {actual}.")]
    LabelMismatch { n_levels: usize, actual: usize },

    // ---- Configuration ----
    /// Observation-family selector outside the selector encoding `1..=5`.
    #[error("Observation family selector must be 1..=5; got {code}.")]
    InvalidFamilySelector { code: i64 },

    /// Tail-model selector outside the selector encoding `0..=2`.
    #[error("Tail model selector must be 0..=2; got {code}.")]
    InvalidTailSelector { code: i64 },

    /// 0/1 toggles must be exactly 0 or 1.
    #[error("Toggle `{name}` must be 0 or 1; got {code}.")]
    InvalidToggle { name: &'static str, code: i64 },

    /// Gamma prior hyperparameters must be finite and strictly positive.
    #[error("Gamma prior `{name}` needs finite, positive shape and scale; got ({shape}, {scale}).")]
    InvalidPrior { name: &'static str, shape: f64, scale: f64 },

    /// Unrecognized family or tail-model name.
    #[error("Unknown {what} name '{name}'. {reason}")]
    UnknownName { what: &'static str, name: String, reason: &'static str },

    // ---- Parameters ----
    /// A named parameter block has the wrong length for the data it is used with.
    #[error("Parameter `{name}` has length {actual}; expected {expected}.")]
    ParamLengthMismatch { name: &'static str, expected: usize, actual: usize },

    /// Flat optimizer vector has the wrong length for the parameter layout.
    #[error("Parameter vector length mismatch: expected {expected}, got {actual}.")]
    VectorLengthMismatch { expected: usize, actual: usize },

    /// Flat optimizer vector entries must be finite.
    #[error("Parameter vector entry at index {index} must be finite; got {value}.")]
    NonFiniteParam { index: usize, value: f64 },

    // ---- Objective seam / sensitivities ----
    /// Analytic gradient not supplied by this implementation.
    #[error("Gradient is not implemented for this objective.")]
    GradientNotImplemented,

    /// The requested quantity is not part of the report for this configuration.
    #[error("Quantity `{name}` is not reported under the current model configuration.")]
    QuantityNotReported { name: &'static str },

    /// Parameter covariance must be square with the parameter-vector dimension.
    #[error("Covariance matrix has shape ({rows}, {cols}); expected ({dim}, {dim}).")]
    CovarianceShape { rows: usize, cols: usize, dim: usize },
}
