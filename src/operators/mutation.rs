//! Mutation operators
//!
//! Two variants: [`TraitMutation`] for discrete, index-valued traits and
//! [`ValueMutation`] for continuous traits normalized to `[0, 1]`.
//!
//! Both share the same gating contract: `should_mutate` performs the
//! Bernoulli draw, `mutate` computes the mutated trait. Whether the gate is
//! checked once per reproduction event ("thermal") or once per time unit for
//! every individual ("cosmic ray") is the caller's choice, exposed through
//! the `uniform` flag.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::space::TraitSpace;

/// Kind of discrete-trait mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitMutationKind {
    /// Mutation disabled
    None,
    /// Uniform draw over all selectable traits, including the current one
    AnyTrait,
    /// Uniform draw over all selectable traits except the current one
    OtherTrait,
    /// Uniform draw over selectable traits within a window around the
    /// current one, wrapped circularly modulo the trait count
    Range,
}

/// Mutation operator for discrete traits
///
/// Never produces the vacant trait or an inactive trait; the uniform draw
/// runs over the [`TraitSpace`]'s precompacted selectable index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitMutation {
    kind: TraitMutationKind,
    probability: f64,
    range: usize,
    uniform: bool,
}

impl TraitMutation {
    /// Create a disabled mutation operator
    pub fn new() -> Self {
        Self {
            kind: TraitMutationKind::None,
            probability: 0.0,
            range: 1,
            uniform: false,
        }
    }

    /// The effective kind
    ///
    /// Reports [`TraitMutationKind::None`] whenever the mutation probability
    /// is zero, regardless of the configured kind.
    pub fn kind(&self) -> TraitMutationKind {
        if self.probability == 0.0 {
            TraitMutationKind::None
        } else {
            self.kind
        }
    }

    /// Set the mutation kind
    pub fn set_kind(&mut self, kind: TraitMutationKind) {
        self.kind = kind;
    }

    /// Mutation probability
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Set the mutation probability
    ///
    /// Rejected (previous value retained) unless in `[0, 1]`.
    pub fn set_probability(&mut self, probability: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&probability) || probability.is_nan() {
            log::warn!(
                "rejecting mutation probability {probability}, keeping {}",
                self.probability
            );
            return Err(ConfigError::ProbabilityOutOfRange(probability));
        }
        self.probability = probability;
        Ok(())
    }

    /// Window half-width for [`TraitMutationKind::Range`]
    pub fn range(&self) -> usize {
        self.range
    }

    /// Set the window half-width for [`TraitMutationKind::Range`]
    pub fn set_range(&mut self, range: usize) {
        self.range = range;
    }

    /// Does mutation arise independent of reproduction events?
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Set whether mutation arises independent of reproduction events
    /// (cosmic ray) rather than tied to them (thermal)
    pub fn set_uniform(&mut self, uniform: bool) {
        self.uniform = uniform;
    }

    /// Bernoulli gate: does a mutation occur on this event?
    pub fn should_mutate<R: Rng>(&self, rng: &mut R) -> bool {
        self.kind() != TraitMutationKind::None && rng.gen::<f64>() < self.probability
    }

    /// Candidate traits a mutation of `current` may produce
    ///
    /// The same enumeration backs both the stochastic [`mutate`] draw and the
    /// deterministic [`apply_flux`] correction, so the two stay microscopically
    /// consistent.
    ///
    /// [`mutate`]: Self::mutate
    /// [`apply_flux`]: Self::apply_flux
    pub fn candidates(&self, current: usize, space: &TraitSpace) -> Vec<usize> {
        match self.kind() {
            TraitMutationKind::None => Vec::new(),
            TraitMutationKind::AnyTrait => space.selectable().to_vec(),
            TraitMutationKind::OtherTrait => space
                .selectable()
                .iter()
                .copied()
                .filter(|&t| t != current)
                .collect(),
            TraitMutationKind::Range => {
                // The window treats trait indices as a ring. Whether that is
                // a true metric on traits or a label artifact is a modeling
                // question for non-ordinal trait sets; callers with unordered
                // strategies should prefer OtherTrait.
                let n = space.num_traits();
                if n == 0 {
                    return Vec::new();
                }
                let mut seen = vec![false; n];
                let mut out = Vec::new();
                for step in 1..=self.range.min(n.saturating_sub(1)) {
                    for t in [(current + step) % n, (current + n - step) % n] {
                        if t != current && !seen[t] && space.is_selectable(t) {
                            seen[t] = true;
                            out.push(t);
                        }
                    }
                }
                out
            }
        }
    }

    /// Compute the mutated trait value
    ///
    /// Returns `current` unchanged (no-op) when fewer than two traits are
    /// selectable or the candidate window is empty.
    pub fn mutate<R: Rng>(&self, current: usize, space: &TraitSpace, rng: &mut R) -> usize {
        if space.selectable().len() < 2 {
            return current;
        }
        let candidates = self.candidates(current, space);
        if candidates.is_empty() {
            return current;
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Add the mutation-flux correction to a rate-of-change vector
    ///
    /// Population-level companion for deterministic dynamics: `density` holds
    /// per-trait densities, `change` the instantaneous rates of change being
    /// assembled by an external solver. Each selectable trait loses density
    /// at rate `probability * density[t]` and redistributes it uniformly over
    /// its mutation candidates, so total mass is conserved exactly.
    pub fn apply_flux(&self, density: &[f64], change: &mut [f64], space: &TraitSpace) {
        debug_assert_eq!(density.len(), space.num_traits());
        debug_assert_eq!(change.len(), space.num_traits());

        if self.kind() == TraitMutationKind::None || space.selectable().len() < 2 {
            return;
        }

        let p = self.probability;
        for &t in space.selectable() {
            let candidates = self.candidates(t, space);
            if candidates.is_empty() {
                continue;
            }
            let outflow = p * density[t];
            let share = outflow / candidates.len() as f64;
            change[t] -= outflow;
            for &c in &candidates {
                change[c] += share;
            }
        }
    }
}

impl Default for TraitMutation {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of continuous-trait mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueMutationKind {
    /// Mutation disabled
    None,
    /// Independent uniform draw on `[0, 1]`
    Uniform,
    /// Gaussian perturbation around the parental trait, std-dev `range`;
    /// out-of-range draws are rejected and resampled
    Gaussian,
    /// Uniform perturbation within `± range` of the parental trait; the
    /// result is clamped, making the boundaries absorbing for this kind
    Range,
}

/// Mutation operator for continuous traits normalized to `[0, 1]`
///
/// The out-of-range policy is fixed per kind, not configurable: rejection
/// resampling for Gaussian (a clamp would inflate the boundary densities),
/// clamping for the uniform window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMutation {
    kind: ValueMutationKind,
    probability: f64,
    range: f64,
}

impl ValueMutation {
    /// Create a disabled mutation operator
    pub fn new() -> Self {
        Self {
            kind: ValueMutationKind::None,
            probability: 0.0,
            range: 0.01,
        }
    }

    /// The effective kind; [`ValueMutationKind::None`] at zero probability
    pub fn kind(&self) -> ValueMutationKind {
        if self.probability == 0.0 {
            ValueMutationKind::None
        } else {
            self.kind
        }
    }

    /// Set the mutation kind
    pub fn set_kind(&mut self, kind: ValueMutationKind) {
        self.kind = kind;
    }

    /// Mutation probability
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Set the mutation probability; rejected unless in `[0, 1]`
    pub fn set_probability(&mut self, probability: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&probability) || probability.is_nan() {
            log::warn!(
                "rejecting mutation probability {probability}, keeping {}",
                self.probability
            );
            return Err(ConfigError::ProbabilityOutOfRange(probability));
        }
        self.probability = probability;
        Ok(())
    }

    /// Std-dev (Gaussian) or half-width (Range) of the perturbation
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Set the perturbation scale
    ///
    /// Traits live on `[0, 1]`, so scales above the unit width are rejected
    /// along with negative or non-finite values. The bound also keeps the
    /// Gaussian rejection loop fast: at `range = 1` roughly a third of the
    /// draws already land inside the interval, while much larger scales would
    /// make the loop arbitrarily slow without changing the effective
    /// distribution.
    pub fn set_range(&mut self, range: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&range) {
            log::warn!("rejecting mutation range {range}, keeping {}", self.range);
            return Err(ConfigError::InvalidRange(range));
        }
        self.range = range;
        Ok(())
    }

    /// Bernoulli gate: does a mutation occur on this event?
    pub fn should_mutate<R: Rng>(&self, rng: &mut R) -> bool {
        self.kind() != ValueMutationKind::None && rng.gen::<f64>() < self.probability
    }

    /// Compute the mutated trait value; always lands in `[0, 1]`
    pub fn mutate<R: Rng>(&self, current: f64, rng: &mut R) -> f64 {
        match self.kind() {
            ValueMutationKind::None => current,
            ValueMutationKind::Uniform => rng.gen::<f64>(),
            ValueMutationKind::Gaussian => {
                if self.range == 0.0 {
                    return current;
                }
                let Ok(normal) = Normal::new(0.0, self.range) else {
                    return current;
                };
                loop {
                    let draw = current + normal.sample(rng);
                    if (0.0..=1.0).contains(&draw) {
                        return draw;
                    }
                }
            }
            ValueMutationKind::Range => {
                if self.range == 0.0 {
                    return current;
                }
                (current + rng.gen_range(-self.range..=self.range)).clamp(0.0, 1.0)
            }
        }
    }
}

impl Default for ValueMutation {
    fn default() -> Self {
        Self::new()
    }
}
