//! Species selection for multi-population systems
//!
//! When a model couples several populations, one species must be picked for
//! each elementary update. The [`SpeciesSelector`] weights species by their
//! configured update rates, optionally scaled by population size or total
//! fitness, or cycles through them round-robin.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SelectError};

/// Policy for picking the next species to update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeciesUpdateKind {
    /// Probability proportional to `rate * population size`
    Size,
    /// Probability proportional to `rate * total fitness`
    Fitness,
    /// Probability proportional to `rate` alone
    Uniform,
    /// Cyclic round-robin, ignoring the statistics
    Turns,
}

/// Per-species aggregate statistics consumed by the selector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    /// Current population size
    pub size: usize,
    /// Sum of fitness over all individuals
    pub total_fitness: f64,
}

/// Arbitrates which species' population is updated next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSelector {
    kind: SpeciesUpdateKind,
    rates: Vec<f64>,
    turn: usize,
}

impl SpeciesSelector {
    /// Create a selector for `num_species` species, all at rate 1
    pub fn new(num_species: usize) -> Self {
        Self {
            kind: SpeciesUpdateKind::Size,
            rates: vec![1.0; num_species],
            turn: 0,
        }
    }

    /// Number of species this selector arbitrates
    pub fn num_species(&self) -> usize {
        self.rates.len()
    }

    /// The selection policy
    pub fn kind(&self) -> SpeciesUpdateKind {
        self.kind
    }

    /// Switch the selection policy
    pub fn set_kind(&mut self, kind: SpeciesUpdateKind) {
        self.kind = kind;
    }

    /// Update-rate weight of a species
    pub fn rate(&self, species: usize) -> Option<f64> {
        self.rates.get(species).copied()
    }

    /// Set the update-rate weight of a species
    ///
    /// Rates must stay positive; invalid values are rejected with the
    /// previous rate retained.
    pub fn set_rate(&mut self, species: usize, rate: f64) -> Result<(), ConfigError> {
        if species >= self.rates.len() {
            return Err(ConfigError::SpeciesOutOfRange {
                index: species,
                count: self.rates.len(),
            });
        }
        if !(rate > 0.0) || !rate.is_finite() {
            log::warn!(
                "rejecting rate {rate} for species {species}, keeping {}",
                self.rates[species]
            );
            return Err(ConfigError::NonPositiveRate(rate));
        }
        self.rates[species] = rate;
        Ok(())
    }

    /// Restart the round-robin order at species 0
    pub fn reset_turns(&mut self) {
        self.turn = 0;
    }

    /// Pick the next species to update
    ///
    /// Fails instead of silently defaulting when the statistics length does
    /// not match the configured species count or when every weight is
    /// non-positive (for example, all populations empty under `Size`).
    pub fn next<R: Rng>(
        &mut self,
        stats: &[SpeciesStats],
        rng: &mut R,
    ) -> Result<usize, SelectError> {
        let n = self.rates.len();
        if stats.len() != n {
            return Err(SelectError::StatsMismatch {
                expected: n,
                actual: stats.len(),
            });
        }
        if n == 0 {
            return Err(SelectError::DegenerateWeights);
        }

        if self.kind == SpeciesUpdateKind::Turns {
            let species = self.turn % n;
            self.turn = (self.turn + 1) % n;
            return Ok(species);
        }

        let weights: Vec<f64> = self
            .rates
            .iter()
            .zip(stats)
            .map(|(&rate, s)| match self.kind {
                SpeciesUpdateKind::Size => rate * s.size as f64,
                SpeciesUpdateKind::Fitness => rate * s.total_fitness,
                SpeciesUpdateKind::Uniform => rate,
                SpeciesUpdateKind::Turns => unreachable!("handled above"),
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(SelectError::DegenerateWeights);
        }

        let dist = WeightedIndex::new(&weights).map_err(|_| SelectError::DegenerateWeights)?;
        Ok(dist.sample(rng))
    }
}
