//! rust_phenology — numeric kernel for seasonal-timing count models.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers. All functionality lives in
//! [`phenology`]: timing distributions with normal, Student-t and
//! generalized-normal tails (symmetric or asymmetric about the peak), the
//! negative log-likelihood of grouped count data under five observation
//! families, per-group summaries, and finite-difference sensitivities.
//!
//! Invariants & assumptions
//! ------------------------
//! - The crate performs no I/O. It logs through the `log` facade only; the
//!   caller picks a backend.
//! - Fitting (optimizer loop, starting values) is left to the caller, who
//!   drives the objective through
//!   [`LogLikelihood`](phenology::LogLikelihood).
//!
//! Conventions
//! -----------
//! - Group indices are 1-based at the data boundary and 0-based everywhere
//!   else.
//! - Positive parameters are estimated on the log scale.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to the code; end-to-end scenarios are under
//!   `tests/`.

pub mod phenology;
