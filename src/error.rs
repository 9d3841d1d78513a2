//! Error types for evodyn
//!
//! This module defines all error types used throughout the library.
//!
//! Expected configuration-validation failures are reported as `Result`s so a
//! caller can keep the previous (valid) configuration; setters never panic.
//! An unhandled kind cannot occur at runtime: every kind enum is matched
//! exhaustively, so forgetting a dispatcher arm is a compile error.

use thiserror::Error;

/// Error type for rejected configuration values
///
/// When a setter returns one of these, the component retains its previous
/// configuration unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Probability outside the unit interval
    #[error("Probability must lie in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    /// Selection strength must stay positive
    #[error("Selection strength must be positive, got {0}")]
    NonPositiveSelection(f64),

    /// Baseline fitness must be a finite number
    #[error("Baseline fitness must be finite, got {0}")]
    NonFiniteBaseline(f64),

    /// Noise temperature cannot be negative
    #[error("Noise must be non-negative, got {0}")]
    NegativeNoise(f64),

    /// Continuous mutation range (std-dev or half-width) must fit the unit
    /// trait interval
    #[error("Mutation range must lie in [0, 1], got {0}")]
    InvalidRange(f64),

    /// Fitness range used to scale imitation probabilities
    #[error("Fitness range must be positive and finite, got {0}")]
    NonPositiveFitnessRange(f64),

    /// Per-species update rate must stay positive
    #[error("Update rate must be positive, got {0}")]
    NonPositiveRate(f64),

    /// Trait index outside the configured trait space
    #[error("Trait index {index} out of range for {count} traits")]
    TraitOutOfRange { index: usize, count: usize },

    /// Species index outside the configured species set
    #[error("Species index {index} out of range for {count} species")]
    SpeciesOutOfRange { index: usize, count: usize },

    /// Moran chains need at least one individual
    #[error("Population size must be at least 1, got {0}")]
    InvalidPopulationSize(usize),

    /// Fitness values feeding the Moran chain must be positive
    #[error("Fitness values must be positive and finite, got mutant {mutant}, resident {resident}")]
    InvalidFitness { mutant: f64, resident: f64 },
}

/// Error type for species-selection failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectError {
    /// Caller supplied statistics for the wrong number of species
    #[error("Expected statistics for {expected} species, got {actual}")]
    StatsMismatch { expected: usize, actual: usize },

    /// All selection weights vanished; refusing to default silently
    #[error("Total selection weight is not positive")]
    DegenerateWeights,
}

/// Top-level error type for engine operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvoError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Species selection error
    #[error("Species selection error: {0}")]
    Select(#[from] SelectError),
}

/// Result type alias for engine operations
pub type EvoResult<T> = Result<T, EvoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ProbabilityOutOfRange(1.5);
        assert_eq!(err.to_string(), "Probability must lie in [0, 1], got 1.5");

        let err = ConfigError::TraitOutOfRange { index: 7, count: 4 };
        assert_eq!(err.to_string(), "Trait index 7 out of range for 4 traits");

        let err = ConfigError::InvalidFitness {
            mutant: -1.0,
            resident: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Fitness values must be positive and finite, got mutant -1, resident 1"
        );
    }

    #[test]
    fn test_select_error_display() {
        let err = SelectError::StatsMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Expected statistics for 2 species, got 3");
    }

    #[test]
    fn test_evo_error_from_config_error() {
        let cfg_err = ConfigError::NonPositiveSelection(0.0);
        let evo_err: EvoError = cfg_err.into();
        assert!(matches!(evo_err, EvoError::Config(_)));
    }

    #[test]
    fn test_evo_error_from_select_error() {
        let sel_err = SelectError::DegenerateWeights;
        let evo_err: EvoError = sel_err.into();
        assert!(matches!(evo_err, EvoError::Select(_)));
    }
}
