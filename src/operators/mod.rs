//! Stochastic update operators
//!
//! This module provides mutation, trait-adoption, and species-selection
//! operators. Each operator is pure configuration: every sampling call takes
//! the run-scoped random generator by reference.

pub mod mutation;
pub mod species;
pub mod update;

pub mod prelude {
    pub use super::mutation::*;
    pub use super::species::*;
    pub use super::update::*;
}
