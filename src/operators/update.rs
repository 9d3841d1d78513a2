//! Trait-adoption rules
//!
//! A [`PlayerUpdate`] decides whether a focal individual adopts another
//! trait, given its own fitness and a comparison fitness (a neighbor, the
//! population average, or a candidate strategy). The rule is pure
//! configuration; the caller supplies both fitness values and the run-scoped
//! random generator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kind of trait-adoption rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerUpdateKind {
    /// Adopt iff the other fitness is strictly higher; ties keep own trait
    Best,
    /// As `Best`, but ties are broken by a fair coin
    BestRandom,
    /// Pick the best trait among explicit candidates, see
    /// [`PlayerUpdate::choose_trait`]
    BestResponse,
    /// Adoption probability linear in the fitness gap, scaled by
    /// `2 * noise * fitness_range`
    Imitate,
    /// As `Imitate`, but never adopt a trait that is not strictly better
    ImitateBetter,
    /// Adoption probability `other / (my + other)`; requires non-negative
    /// fitness values
    Proportional,
    /// Fermi rule: logistic in the fitness gap with temperature `noise`
    Thermal,
}

/// Probabilistic trait-adoption rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    kind: PlayerUpdateKind,
    noise: f64,
    error: f64,
    fitness_range: f64,
}

impl PlayerUpdate {
    /// Create an update rule of the given kind with neutral noise (1),
    /// no error floor, and unit fitness range
    pub fn new(kind: PlayerUpdateKind) -> Self {
        Self {
            kind,
            noise: 1.0,
            error: 0.0,
            fitness_range: 1.0,
        }
    }

    /// The rule in use
    pub fn kind(&self) -> PlayerUpdateKind {
        self.kind
    }

    /// Switch the rule, keeping noise, error, and scale
    pub fn set_kind(&mut self, kind: PlayerUpdateKind) {
        self.kind = kind;
    }

    /// Noise temperature; neutral at 1, deterministic limit at 0
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Set the noise temperature; rejected if negative or non-finite
    pub fn set_noise(&mut self, noise: f64) -> Result<(), ConfigError> {
        if !(noise >= 0.0) || !noise.is_finite() {
            log::warn!("rejecting noise {noise}, keeping {}", self.noise);
            return Err(ConfigError::NegativeNoise(noise));
        }
        self.noise = noise;
        Ok(())
    }

    /// Error floor/ceiling on the adoption probability
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Set the error rate
    ///
    /// The final adoption probability is clamped into `[error, 1 - error]`
    /// (floor first, then ceiling), guaranteeing a non-zero chance of both
    /// correct and incorrect adoption. Values above 0.5 therefore pin the
    /// probability at `1 - error`. Rejected unless in `[0, 1]`.
    pub fn set_error(&mut self, error: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&error) || error.is_nan() {
            log::warn!("rejecting error rate {error}, keeping {}", self.error);
            return Err(ConfigError::ProbabilityOutOfRange(error));
        }
        self.error = error;
        Ok(())
    }

    /// Fitness range of the module, the scale the imitation rules divide by
    pub fn fitness_range(&self) -> f64 {
        self.fitness_range
    }

    /// Set the fitness range; rejected unless positive and finite
    ///
    /// Feed this from [`FitnessMap::map_range`] whenever the payoff extremes
    /// of the module change.
    ///
    /// [`FitnessMap::map_range`]: crate::fitness::map::FitnessMap::map_range
    pub fn set_fitness_range(&mut self, range: f64) -> Result<(), ConfigError> {
        if !(range > 0.0) || !range.is_finite() {
            log::warn!(
                "rejecting fitness range {range}, keeping {}",
                self.fitness_range
            );
            return Err(ConfigError::NonPositiveFitnessRange(range));
        }
        self.fitness_range = range;
        Ok(())
    }

    /// Adoption probability before the error clamp
    ///
    /// Exposed for analytical cross-checks; [`adopt`](Self::adopt) is the
    /// sampling entry point.
    pub fn adoption_probability(&self, my_fitness: f64, other_fitness: f64) -> f64 {
        let gap = other_fitness - my_fitness;
        match self.kind {
            // The pairwise entry point treats best-response like Best; the
            // real best-response interface is choose_trait.
            PlayerUpdateKind::Best | PlayerUpdateKind::BestResponse => {
                if gap > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            PlayerUpdateKind::BestRandom => {
                if gap > 0.0 {
                    1.0
                } else if gap < 0.0 {
                    0.0
                } else {
                    0.5
                }
            }
            PlayerUpdateKind::Imitate => self.linear_probability(gap),
            PlayerUpdateKind::ImitateBetter => {
                if gap > 0.0 {
                    self.linear_probability(gap)
                } else {
                    0.0
                }
            }
            PlayerUpdateKind::Proportional => {
                let total = my_fitness + other_fitness;
                if total <= 0.0 {
                    0.5
                } else {
                    (other_fitness / total).clamp(0.0, 1.0)
                }
            }
            PlayerUpdateKind::Thermal => {
                if self.noise <= 0.0 {
                    // Zero temperature degenerates to the step rule
                    if gap > 0.0 {
                        1.0
                    } else if gap < 0.0 {
                        0.0
                    } else {
                        0.5
                    }
                } else {
                    1.0 / (1.0 + (-gap / self.noise).exp())
                }
            }
        }
    }

    fn linear_probability(&self, gap: f64) -> f64 {
        if self.noise <= 0.0 {
            if gap > 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            (gap / (2.0 * self.noise * self.fitness_range)).clamp(0.0, 1.0)
        }
    }

    /// Decide whether the focal individual adopts the other trait
    pub fn adopt<R: Rng>(&self, my_fitness: f64, other_fitness: f64, rng: &mut R) -> bool {
        let p = self.clamp_error(self.adoption_probability(my_fitness, other_fitness));
        rng.gen::<f64>() < p
    }

    /// Best-response choice among explicit `(trait, fitness)` candidates
    ///
    /// Returns the trait with the highest fitness, breaking ties with a fair
    /// draw among the tied candidates. `None` for an empty candidate list.
    pub fn choose_trait<R: Rng>(&self, candidates: &[(usize, f64)], rng: &mut R) -> Option<usize> {
        let best = candidates
            .iter()
            .map(|&(_, f)| f)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

        let tied: Vec<usize> = candidates
            .iter()
            .filter(|&&(_, f)| f == best)
            .map(|&(t, _)| t)
            .collect();
        Some(tied[rng.gen_range(0..tied.len())])
    }

    fn clamp_error(&self, p: f64) -> f64 {
        if self.error > 0.0 {
            p.max(self.error).min(1.0 - self.error)
        } else {
            p
        }
    }
}
