//! models — the configured phenology objective, its report, and the driver
//! seam.
//!
//! Purpose
//! -------
//! Compose the `core` stages into one objective evaluation and expose it to
//! external drivers (optimizers, samplers, reporting code).
//!
//! Key behaviors
//! -------------
//! - [`PhenologyModel`] binds a validated configuration to its resolved
//!   kernels and evaluates `nll` plus a [`PhenologyReport`].
//! - [`LogLikelihood`] is the seam a driver programs against;
//!   `PhenologyModel` implements it over the flat parameter vector.
//! - [`ReportQuantity`] names report entries for lookup and sensitivity
//!   calculations.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models are immutable after construction and `Send + Sync`.
//! - Evaluation never fails once data and parameters fit together.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`phenology`] cover objective assembly against closed
//!   forms, report presence per configuration, and the finite-difference
//!   gradient against hand-derived derivatives.
//! - Unit tests in [`report`] cover quantity lookup, name parsing and
//!   serialization of optional fields.

pub mod phenology;
pub mod report;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::phenology::{Evaluation, PhenologyModel};
pub use self::report::{PhenologyReport, ReportQuantity};
pub use self::traits::LogLikelihood;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::phenology::{Evaluation, PhenologyModel};
    pub use super::report::{PhenologyReport, ReportQuantity};
    pub use super::traits::LogLikelihood;
}
