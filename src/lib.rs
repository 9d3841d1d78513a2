//! # evodyn
//!
//! Stochastic update rules and exact Markov-chain analytics for evolutionary
//! dynamics in finite populations.
//!
//! The crate provides the reusable core of an individual-based evolutionary
//! simulation: payoff-to-fitness maps, discrete- and continuous-trait
//! mutation, probabilistic trait-adoption rules, species arbitration for
//! multi-population systems, and an exact solver for fixation probabilities
//! and fixation times of the corresponding Moran birth-death chain.
//!
//! ## Core Concepts
//!
//! - **Configuration, not state**: every component is a function of its
//!   explicit inputs plus its configuration; nothing here owns population
//!   storage or a random generator.
//! - **External randomness**: all sampling calls take `&mut R: Rng`, so a
//!   single run-scoped generator yields bit-for-bit reproducible runs.
//! - **Exact analytics**: whenever the dynamics reduce to a one-dimensional
//!   birth-death chain, [`markov::FixationSolver`] computes reference
//!   quantities directly from the payoffs, without simulation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evodyn::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let map = FitnessMap::new(FitnessMapKind::Exponential);
//! let mut solver = FixationSolver::new();
//! solver.configure(100, map.to_fitness(2.0), map.to_fitness(1.0))?;
//! let rho = solver.fixation_probability(1);
//! ```

pub mod error;
pub mod fitness;
pub mod markov;
pub mod operators;
pub mod space;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::markov::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::space::TraitSpace;
}
