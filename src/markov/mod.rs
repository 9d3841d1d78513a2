//! Analytical Moran-chain machinery
//!
//! Exact fixation probabilities and fixation times for the one-dimensional
//! birth-death chain underlying the stochastic dynamics, used as ground
//! truth for validating simulation runs and as a fast replacement for them
//! when the population size permits.

pub mod solver;

pub mod prelude {
    pub use super::solver::*;
}
