//! Trait-space bookkeeping
//!
//! Modules can deactivate traits at runtime and may designate one trait as
//! "vacant" (an empty site rather than a strategy). Mutation must only ever
//! produce active, non-vacant traits, and must do so uniformly. To keep that
//! uniform draw O(1) the space maintains a dense list of selectable indices,
//! rebuilt once per configuration change instead of rescanning the mask in
//! the hot mutation path.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Active/vacant bookkeeping for a discrete trait space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitSpace {
    active: Vec<bool>,
    vacant: Option<usize>,
    /// Dense index of active, non-vacant traits
    selectable: Vec<usize>,
}

impl TraitSpace {
    /// Create a space of `n_traits` traits, all active, none vacant
    pub fn new(n_traits: usize) -> Self {
        let mut space = Self {
            active: vec![true; n_traits],
            vacant: None,
            selectable: Vec::new(),
        };
        space.rebuild();
        space
    }

    /// Create a space with the given trait designated as vacant
    pub fn with_vacant(n_traits: usize, vacant: usize) -> Result<Self, ConfigError> {
        let mut space = Self::new(n_traits);
        space.set_vacant(Some(vacant))?;
        Ok(space)
    }

    /// Total number of trait slots, active or not
    pub fn num_traits(&self) -> usize {
        self.active.len()
    }

    /// The vacant trait, if the module defines one
    pub fn vacant(&self) -> Option<usize> {
        self.vacant
    }

    /// Activate or deactivate a trait slot
    pub fn set_active(&mut self, index: usize, active: bool) -> Result<(), ConfigError> {
        if index >= self.active.len() {
            return Err(ConfigError::TraitOutOfRange {
                index,
                count: self.active.len(),
            });
        }
        self.active[index] = active;
        self.rebuild();
        Ok(())
    }

    /// Replace the whole activity mask
    pub fn set_active_mask(&mut self, mask: &[bool]) -> Result<(), ConfigError> {
        if mask.len() != self.active.len() {
            return Err(ConfigError::TraitOutOfRange {
                index: mask.len(),
                count: self.active.len(),
            });
        }
        self.active.copy_from_slice(mask);
        self.rebuild();
        Ok(())
    }

    /// Designate (or clear) the vacant trait
    pub fn set_vacant(&mut self, vacant: Option<usize>) -> Result<(), ConfigError> {
        if let Some(index) = vacant {
            if index >= self.active.len() {
                return Err(ConfigError::TraitOutOfRange {
                    index,
                    count: self.active.len(),
                });
            }
        }
        self.vacant = vacant;
        self.rebuild();
        Ok(())
    }

    /// Is `index` an active trait?
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Is `index` a valid mutation target (active and not vacant)?
    pub fn is_selectable(&self, index: usize) -> bool {
        self.is_active(index) && self.vacant != Some(index)
    }

    /// Dense list of active, non-vacant trait indices, in ascending order
    pub fn selectable(&self) -> &[usize] {
        &self.selectable
    }

    fn rebuild(&mut self) {
        self.selectable.clear();
        for (index, &active) in self.active.iter().enumerate() {
            if active && self.vacant != Some(index) {
                self.selectable.push(index);
            }
        }
    }
}
