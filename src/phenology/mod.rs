//! phenology — seasonal-timing count models: distributions, objective, and
//! sensitivities.
//!
//! Purpose
//! -------
//! Evaluate the negative log-likelihood of a phenology model: counts observed
//! on days of the year, arriving in a bell-shaped seasonal pulse per group
//! (typically per year), with normal, Student-t or generalized-normal tails
//! that may differ left and right of the peak, observed under one of five
//! count/continuous families. Alongside the objective, report the derived
//! per-group curve summaries and their finite-difference sensitivities.
//!
//! Key behaviors
//! -------------
//! - [`core`]: special functions, single- and double-sided timing
//!   distributions, validated data, configuration, parameters and the
//!   per-evaluation stages.
//! - [`models`]: [`PhenologyModel`] (objective + [`PhenologyReport`]) and the
//!   [`LogLikelihood`] seam for external drivers.
//! - [`sensitivity`]: Hessian of the objective, Jacobians of reported
//!   quantities, delta-method standard deviations.
//! - [`errors`]: the single [`PhenologyError`] type and its result alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors arise only at the API boundary (data, configuration, parameter
//!   layout, report lookups). The numeric path is total and propagates
//!   NaN/±inf.
//! - Nothing is cached between evaluations; models are `Send + Sync`.
//!
//! Downstream usage
//! ----------------
//! 1. Build [`PhenologyData`] from counts, day-of-year, 1-based groups and
//!    the per-group design matrices.
//! 2. Build a [`ModelConfig`] (typed, `Default`-based, from serde, or from
//!    the integer selectors) and a [`PhenologyModel`].
//! 3. Hand `model` and `data` to a driver through [`LogLikelihood`], or call
//!    [`PhenologyModel::evaluate`] directly.
//! 4. At the optimum, invert [`sensitivity::objective_hessian`] and pass the
//!    covariance to [`sensitivity::sd_report`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code in every submodule.
//! - `tests/integration_phenology_pipeline.rs` runs end-to-end scenarios
//!   through the public surface.

pub mod core;
pub mod errors;
pub mod models;
pub mod sensitivity;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    GammaPrior, ModelConfig, ObsFamily, ParamLayout, ParamVec, PhenologyData, PhenologyParams,
    TailModel,
};

pub use self::errors::{PhenologyError, PhenologyResult};

pub use self::models::{Evaluation, LogLikelihood, PhenologyModel, PhenologyReport, ReportQuantity};

pub use self::sensitivity::{
    ReportedValue, delta_method_sd, objective_hessian, report_jacobian, sd_report,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_phenology::phenology::prelude::*;
//
// to import the everyday surface in a single line.

pub mod prelude {
    pub use super::{
        Evaluation, GammaPrior, LogLikelihood, ModelConfig, ObsFamily, ParamLayout, ParamVec,
        PhenologyData, PhenologyError, PhenologyModel, PhenologyParams, PhenologyReport,
        PhenologyResult, ReportQuantity, TailModel,
    };
}
