//! Payoff-to-fitness mapping
//!
//! This module converts raw game payoffs into the fitness values that drive
//! reproduction and imitation probabilities.

pub mod map;

pub mod prelude {
    pub use super::map::*;
}
