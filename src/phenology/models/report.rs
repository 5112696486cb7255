//! Reported quantities of one evaluation.
//!
//! Purpose
//! -------
//! Carry every derived quantity a fitting collaborator reports (with
//! standard errors) or plots, in one explicit struct whose optional fields
//! encode which quantities exist under the current configuration.
//!
//! Key behaviors
//! -------------
//! - [`PhenologyReport`] always holds the per-group curve summaries, the
//!   trend coefficients and the per-observation predictions.
//! - Configuration-dependent quantities are `Option`s: `obs_sigma` for
//!   families with an observation scale, `tdf_*` under Student-t tails,
//!   `beta_*` under generalized-normal tails, and the side-2 quantities
//!   (`b_sig2`, `sigma2`, `tdf_2`, `beta_2`) for asymmetric models only.
//! - [`ReportQuantity`] names each quantity; [`PhenologyReport::quantity`]
//!   returns it as a vector (scalars become length-1 vectors) and
//!   [`PhenologyReport::entries`] lists all present quantities in a fixed
//!   order.
//!
//! Conventions
//! -----------
//! - Per-group vectors are indexed by 0-based group; per-observation vectors
//!   follow the data order.
//! - Quantity names match the field names (`"year_tot"`, `"b_sig1"`, ...).
//! - Serialization skips absent optional fields.
use crate::phenology::{
    core::{
        assembly::GroupParams, family::ObsScale, likelihood::ObservationTerms,
        options::ModelConfig, params::PhenologyParams, shapes::ShapeParams,
        summary::GroupSummary, tails::TailModel,
    },
    errors::{PhenologyError, PhenologyResult},
};
use ndarray::{Array1, array};
use serde::Serialize;
use std::str::FromStr;

/// Derived quantities of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenologyReport {
    // ---- Always present ----
    pub theta: Array1<f64>,
    pub sigma1: Array1<f64>,
    pub mu: Array1<f64>,
    pub b_mu: Array1<f64>,
    pub b_sig1: Array1<f64>,
    pub year_tot: Array1<f64>,
    pub year_log_tot: Array1<f64>,
    pub pred: Array1<f64>,
    pub lower25: Array1<f64>,
    pub upper75: Array1<f64>,
    pub range: Array1<f64>,
    pub log_dens: Array1<f64>,

    // ---- Configuration dependent ----
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdf_1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b_sig2: Option<Array1<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma2: Option<Array1<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdf_2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_2: Option<f64>,
}

impl PhenologyReport {
    /// Collect the report from the stages of one evaluation.
    pub(crate) fn collect(
        config: &ModelConfig, params: &PhenologyParams, shapes: &ShapeParams, groups: GroupParams,
        terms: ObservationTerms, summary: GroupSummary, obs: &ObsScale,
    ) -> Self {
        let student_t = config.tail == TailModel::StudentT;
        let gen_normal = config.tail == TailModel::GeneralizedNormal;
        let side2 = |on: bool, v: f64| (on && config.asymmetric).then_some(v);

        PhenologyReport {
            theta: params.theta.clone(),
            sigma1: groups.sigma1,
            mu: groups.mu,
            b_mu: params.b_mu.clone(),
            b_sig1: params.b_sig1.clone(),
            year_tot: summary.year_tot,
            year_log_tot: summary.year_log_tot,
            pred: terms.pred,
            lower25: summary.lower25,
            upper75: summary.upper75,
            range: summary.range,
            log_dens: terms.log_dens,
            obs_sigma: config.family.has_obs_sigma().then_some(obs.sigma),
            tdf_1: student_t.then_some(shapes.tdf_1),
            beta_1: gen_normal.then_some(shapes.beta_1),
            b_sig2: config.asymmetric.then(|| params.b_sig2.clone()),
            sigma2: groups.sigma2,
            tdf_2: side2(student_t, shapes.tdf_2),
            beta_2: side2(gen_normal, shapes.beta_2),
        }
    }

    /// One quantity as a vector.
    ///
    /// # Errors
    /// [`PhenologyError::QuantityNotReported`] if the quantity is absent under
    /// the configuration that produced this report.
    pub fn quantity(&self, quantity: ReportQuantity) -> PhenologyResult<Array1<f64>> {
        let scalar = |v: Option<f64>| v.map(|v| array![v]);
        let found = match quantity {
            ReportQuantity::Theta => Some(self.theta.clone()),
            ReportQuantity::Sigma1 => Some(self.sigma1.clone()),
            ReportQuantity::Mu => Some(self.mu.clone()),
            ReportQuantity::BMu => Some(self.b_mu.clone()),
            ReportQuantity::BSig1 => Some(self.b_sig1.clone()),
            ReportQuantity::YearTot => Some(self.year_tot.clone()),
            ReportQuantity::YearLogTot => Some(self.year_log_tot.clone()),
            ReportQuantity::Pred => Some(self.pred.clone()),
            ReportQuantity::Lower25 => Some(self.lower25.clone()),
            ReportQuantity::Upper75 => Some(self.upper75.clone()),
            ReportQuantity::Range => Some(self.range.clone()),
            ReportQuantity::LogDens => Some(self.log_dens.clone()),
            ReportQuantity::ObsSigma => scalar(self.obs_sigma),
            ReportQuantity::Tdf1 => scalar(self.tdf_1),
            ReportQuantity::Beta1 => scalar(self.beta_1),
            ReportQuantity::BSig2 => self.b_sig2.clone(),
            ReportQuantity::Sigma2 => self.sigma2.clone(),
            ReportQuantity::Tdf2 => scalar(self.tdf_2),
            ReportQuantity::Beta2 => scalar(self.beta_2),
        };
        found.ok_or(PhenologyError::QuantityNotReported { name: quantity.name() })
    }

    /// Every present quantity, by name, in [`ReportQuantity::ALL`] order.
    pub fn entries(&self) -> Vec<(&'static str, Array1<f64>)> {
        ReportQuantity::ALL
            .iter()
            .filter_map(|&q| self.quantity(q).ok().map(|v| (q.name(), v)))
            .collect()
    }
}

/// Closed set of reportable quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportQuantity {
    Theta,
    Sigma1,
    Mu,
    BMu,
    BSig1,
    YearTot,
    YearLogTot,
    Pred,
    Lower25,
    Upper75,
    Range,
    LogDens,
    ObsSigma,
    Tdf1,
    Beta1,
    BSig2,
    Sigma2,
    Tdf2,
    Beta2,
}

impl ReportQuantity {
    pub const ALL: [ReportQuantity; 19] = [
        ReportQuantity::Theta,
        ReportQuantity::Sigma1,
        ReportQuantity::Mu,
        ReportQuantity::BMu,
        ReportQuantity::BSig1,
        ReportQuantity::YearTot,
        ReportQuantity::YearLogTot,
        ReportQuantity::Pred,
        ReportQuantity::Lower25,
        ReportQuantity::Upper75,
        ReportQuantity::Range,
        ReportQuantity::LogDens,
        ReportQuantity::ObsSigma,
        ReportQuantity::Tdf1,
        ReportQuantity::Beta1,
        ReportQuantity::BSig2,
        ReportQuantity::Sigma2,
        ReportQuantity::Tdf2,
        ReportQuantity::Beta2,
    ];

    /// Field name of the quantity in [`PhenologyReport`].
    pub const fn name(self) -> &'static str {
        match self {
            ReportQuantity::Theta => "theta",
            ReportQuantity::Sigma1 => "sigma1",
            ReportQuantity::Mu => "mu",
            ReportQuantity::BMu => "b_mu",
            ReportQuantity::BSig1 => "b_sig1",
            ReportQuantity::YearTot => "year_tot",
            ReportQuantity::YearLogTot => "year_log_tot",
            ReportQuantity::Pred => "pred",
            ReportQuantity::Lower25 => "lower25",
            ReportQuantity::Upper75 => "upper75",
            ReportQuantity::Range => "range",
            ReportQuantity::LogDens => "log_dens",
            ReportQuantity::ObsSigma => "obs_sigma",
            ReportQuantity::Tdf1 => "tdf_1",
            ReportQuantity::Beta1 => "beta_1",
            ReportQuantity::BSig2 => "b_sig2",
            ReportQuantity::Sigma2 => "sigma2",
            ReportQuantity::Tdf2 => "tdf_2",
            ReportQuantity::Beta2 => "beta_2",
        }
    }
}

impl FromStr for ReportQuantity {
    type Err = PhenologyError;

    /// Parse a quantity from its field name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ReportQuantity::ALL.into_iter().find(|q| q.name() == lower).ok_or_else(|| {
            PhenologyError::UnknownName {
                what: "report quantity",
                name: s.to_string(),
                reason: "Valid names are the report field names, e.g. 'mu' or 'year_tot'.",
            }
        })
    }
}
