//! Reaction State
//!
//! Holds the ordered reactant and product species of the single simulated
//! reaction. Order matters: it drives the equation string and the order in
//! which species are integrated and reported.
//!
//! # Critical Invariants
//!
//! 1. **Name Uniqueness**: A species name appears at most once across both sides
//! 2. **History Alignment**: All species histories have the same length

use crate::models::species::Species;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the equation a species sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesRole {
    Reactant,
    Product,
}

impl fmt::Display for SpeciesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesRole::Reactant => write!(f, "reactant"),
            SpeciesRole::Product => write!(f, "product"),
        }
    }
}

/// Ordered reactant/product species
///
/// # Example
///
/// ```rust
/// use equilibrium_sim_core::{ReactionState, Species};
///
/// let state = ReactionState::new(
///     vec![Species::new("A", 1, 0.5), Species::new("B", 2, 0.75)],
///     vec![Species::new("C", 1, 0.0)],
/// );
/// assert_eq!(state.num_species(), 3);
/// assert!(state.contains("B"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReactionState {
    reactants: Vec<Species>,
    products: Vec<Species>,
}

impl ReactionState {
    pub fn new(reactants: Vec<Species>, products: Vec<Species>) -> Self {
        Self {
            reactants,
            products,
        }
    }

    pub fn reactants(&self) -> &[Species] {
        &self.reactants
    }

    pub fn products(&self) -> &[Species] {
        &self.products
    }

    pub(crate) fn reactants_mut(&mut self) -> &mut [Species] {
        &mut self.reactants
    }

    pub(crate) fn products_mut(&mut self) -> &mut [Species] {
        &mut self.products
    }

    /// Append a species to one side of the equation
    pub fn push(&mut self, role: SpeciesRole, species: Species) {
        match role {
            SpeciesRole::Reactant => self.reactants.push(species),
            SpeciesRole::Product => self.products.push(species),
        }
    }

    /// Get reference to a species by name
    pub fn get_species(&self, name: &str) -> Option<&Species> {
        self.all_species().find(|s| s.name() == name)
    }

    /// Get mutable reference to a species by name
    pub fn get_species_mut(&mut self, name: &str) -> Option<&mut Species> {
        self.all_species_mut().find(|s| s.name() == name)
    }

    /// Role of the named species, if present
    pub fn role_of(&self, name: &str) -> Option<SpeciesRole> {
        if self.reactants.iter().any(|s| s.name() == name) {
            Some(SpeciesRole::Reactant)
        } else if self.products.iter().any(|s| s.name() == name) {
            Some(SpeciesRole::Product)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.role_of(name).is_some()
    }

    /// Reactants first, then products, each in insertion order
    pub fn all_species(&self) -> impl Iterator<Item = &Species> {
        self.reactants.iter().chain(self.products.iter())
    }

    pub fn all_species_mut(&mut self) -> impl Iterator<Item = &mut Species> {
        self.reactants.iter_mut().chain(self.products.iter_mut())
    }

    pub fn num_species(&self) -> usize {
        self.reactants.len() + self.products.len()
    }

    /// Product of `concentration^coefficient` over reactants (1.0 if none)
    pub fn reactant_activity(&self) -> f64 {
        self.reactants.iter().map(Species::activity).product()
    }

    /// Product of `concentration^coefficient` over products (1.0 if none)
    pub fn product_activity(&self) -> f64 {
        self.products.iter().map(Species::activity).product()
    }

    /// Check that every species history has `expected_len` entries
    pub fn histories_aligned(&self, expected_len: usize) -> bool {
        self.all_species().all(|s| s.history().len() == expected_len)
    }
}
