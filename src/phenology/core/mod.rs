//! core — distributions, data, parameters and per-evaluation building blocks
//! of the phenology objective.
//!
//! Purpose
//! -------
//! Collect the numerical and structural primitives that the model layer
//! composes into one negative log-likelihood: special functions, single- and
//! double-sided timing distributions, configuration tags and their resolved
//! kernels, validated data, named parameters with their flat layout, and the
//! per-group / per-observation evaluation stages.
//!
//! Key behaviors
//! -------------
//! - Distributions ([`special`], [`single_sided`], [`double_sided`]) are plain
//!   `f64` functions that never fail; out-of-domain inputs give NaN/±inf.
//! - Configuration tags ([`TailModel`], [`ObsFamily`]) resolve once into
//!   function-pointer kernels ([`TailKernel`], [`FamilyKernel`]).
//! - [`PhenologyData`] and [`PhenologyParams`] are validated at construction
//!   or against each other; evaluation stages assume those checks passed.
//! - Evaluation stages run in order: [`ShapeParams::derive`] →
//!   [`assemble_groups`] → [`observation_terms`] and [`summarize`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Group indices are 0-based inside this module; the 1-based input
//!   encoding is converted once in [`PhenologyData::new`].
//! - Nothing is cached across evaluations: every stage allocates its outputs.
//!
//! Conventions
//! -----------
//! - Side 1 is left of `mu` (`x < mu`), side 2 is right of it (`x ≥ mu`).
//! - Positive parameters live on the log scale in [`PhenologyParams`]; the
//!   derived natural-scale values appear in [`ShapeParams`] and
//!   [`GroupParams`].
//! - This module performs no logging; the model layer logs.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its formulas and validation paths.
//! - End-to-end behavior is covered by the model layer and the integration
//!   test under `tests/`.

pub mod assembly;
pub mod data;
pub mod double_sided;
pub mod family;
pub mod likelihood;
pub mod options;
pub mod params;
pub mod shapes;
pub mod single_sided;
pub mod special;
pub mod summary;
pub mod tails;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::assembly::{GroupCurve, GroupParams, assemble_groups, random_effect_log_penalty};
pub use self::data::PhenologyData;
pub use self::family::{FamilyKernel, ObsFamily, ObsScale};
pub use self::likelihood::{ObservationTerms, observation_terms};
pub use self::options::{GammaPrior, ModelConfig};
pub use self::params::{ParamLayout, ParamVec, PhenologyParams};
pub use self::shapes::ShapeParams;
pub use self::summary::{GroupSummary, summarize};
pub use self::tails::{TailKernel, TailModel};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::data::PhenologyData;
    pub use super::family::ObsFamily;
    pub use super::options::{GammaPrior, ModelConfig};
    pub use super::params::{ParamLayout, ParamVec, PhenologyParams};
    pub use super::tails::TailModel;
}
