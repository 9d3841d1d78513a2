//! Payoff-to-fitness maps
//!
//! A [`FitnessMap`] turns a raw interaction payoff (score) into reproductive
//! fitness and back. Each kind is an exact algebraic bijection, so
//! `to_score(to_fitness(s)) == s` up to floating-point rounding for every
//! finite score.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The functional form of the payoff-to-fitness map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessMapKind {
    /// `fitness = score`
    Identity,
    /// `fitness = b + w * score`
    Linear,
    /// `fitness = b * (1 - w) + w * score`
    ///
    /// A convex combination of baseline and score for `w` in `[0, 1]`,
    /// extrapolation otherwise.
    Convex,
    /// `fitness = b * exp(w * score)`
    ///
    /// The only kind that keeps fitness non-negative for all real scores
    /// while preserving relative reproduction probabilities under a constant
    /// shift of all payoffs, which makes it the default for weak and strong
    /// selection alike.
    Exponential,
}

/// Payoff-to-fitness map with baseline and selection strength
///
/// Constructed once per module, reconfigured in place when parameters change.
/// Setters reject invalid values and retain the previous configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessMap {
    kind: FitnessMapKind,
    baseline: f64,
    selection: f64,
}

impl FitnessMap {
    /// Create a map of the given kind with baseline 1 and selection strength 1
    pub fn new(kind: FitnessMapKind) -> Self {
        Self {
            kind,
            baseline: 1.0,
            selection: 1.0,
        }
    }

    /// The functional form in use
    pub fn kind(&self) -> FitnessMapKind {
        self.kind
    }

    /// Switch the functional form, keeping baseline and selection strength
    pub fn set_kind(&mut self, kind: FitnessMapKind) {
        self.kind = kind;
    }

    /// Baseline fitness `b`
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Selection strength `w`
    pub fn selection(&self) -> f64 {
        self.selection
    }

    /// Set the baseline fitness `b`
    ///
    /// Must be finite. For the exponential kind the inverse map is only
    /// defined for `b > 0`.
    pub fn set_baseline(&mut self, baseline: f64) -> Result<(), ConfigError> {
        if !baseline.is_finite() {
            log::warn!("rejecting baseline {baseline}, keeping {}", self.baseline);
            return Err(ConfigError::NonFiniteBaseline(baseline));
        }
        self.baseline = baseline;
        Ok(())
    }

    /// Set the selection strength `w`
    ///
    /// Non-positive values are rejected and the previous value retained.
    pub fn set_selection(&mut self, selection: f64) -> Result<(), ConfigError> {
        if !(selection > 0.0) || !selection.is_finite() {
            log::warn!(
                "rejecting selection strength {selection}, keeping {}",
                self.selection
            );
            return Err(ConfigError::NonPositiveSelection(selection));
        }
        self.selection = selection;
        Ok(())
    }

    /// Map a payoff to a fitness value
    pub fn to_fitness(&self, score: f64) -> f64 {
        let b = self.baseline;
        let w = self.selection;
        match self.kind {
            FitnessMapKind::Identity => score,
            FitnessMapKind::Linear => b + w * score,
            FitnessMapKind::Convex => b * (1.0 - w) + w * score,
            FitnessMapKind::Exponential => b * (w * score).exp(),
        }
    }

    /// Map a fitness value back to the payoff that produced it
    pub fn to_score(&self, fitness: f64) -> f64 {
        let b = self.baseline;
        let w = self.selection;
        match self.kind {
            FitnessMapKind::Identity => fitness,
            FitnessMapKind::Linear => (fitness - b) / w,
            FitnessMapKind::Convex => (fitness - b * (1.0 - w)) / w,
            FitnessMapKind::Exponential => (fitness / b).ln() / w,
        }
    }

    /// Map a score interval to the corresponding fitness interval
    ///
    /// Every kind is strictly increasing for `w > 0`, so the interval
    /// endpoints map to the fitness endpoints. The width of this interval is
    /// the scale factor the linear imitation rules divide by.
    pub fn map_range(&self, min_score: f64, max_score: f64) -> (f64, f64) {
        (self.to_fitness(min_score), self.to_fitness(max_score))
    }
}

impl Default for FitnessMap {
    fn default() -> Self {
        Self::new(FitnessMapKind::Exponential)
    }
}
