//! Trajectory reporting
//!
//! Read-only view of a run for downstream plotting. Nothing here computes
//! beyond formatting: every series is copied straight from the engine.

use crate::models::species::Species;
use crate::models::state::SpeciesRole;
use crate::orchestrator::{Reaction, SimulationError};
use serde::{Deserialize, Serialize};

/// Build `"<coeff><name> + ... <=> <coeff><name> + ..."`
///
/// # Example
/// ```
/// use equilibrium_sim_core::{reporting::format_equation, Species};
///
/// let reactants = vec![Species::new("A", 1, 0.5), Species::new("B", 2, 0.75)];
/// let products = vec![Species::new("C", 1, 0.0)];
/// assert_eq!(format_equation(&reactants, &products), "1A + 2B <=> 1C");
/// ```
pub fn format_equation(reactants: &[Species], products: &[Species]) -> String {
    format!("{} <=> {}", format_side(reactants), format_side(products))
}

fn format_side(species: &[Species]) -> String {
    species
        .iter()
        .map(|s| format!("{}{}", s.coefficient(), s.name()))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Concentration series of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSeries {
    pub name: String,
    pub coefficient: u32,
    pub role: SpeciesRole,
    pub history: Vec<f64>,
}

impl SpeciesSeries {
    fn capture(role: SpeciesRole, species: &Species) -> Self {
        Self {
            name: species.name().to_string(),
            coefficient: species.coefficient(),
            role,
            history: species.history().to_vec(),
        }
    }
}

/// Vertical marker for a registered perturbation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationMarker {
    pub tick: usize,
    pub label: String,
    pub applied: bool,
}

/// Everything a plotting collaborator needs, in one serializable value
///
/// Every series has the same length as `times`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub equation: String,
    pub dt: f64,
    pub times: Vec<usize>,
    pub species: Vec<SpeciesSeries>,
    pub quotient: Vec<f64>,
    pub constant: Vec<f64>,
    pub markers: Vec<PerturbationMarker>,
}

impl Trajectory {
    pub fn from_reaction(reaction: &Reaction) -> Self {
        let species = reaction
            .reactants()
            .iter()
            .map(|s| SpeciesSeries::capture(SpeciesRole::Reactant, s))
            .chain(
                reaction
                    .products()
                    .iter()
                    .map(|s| SpeciesSeries::capture(SpeciesRole::Product, s)),
            )
            .collect();

        let markers = reaction
            .perturbations()
            .iter()
            .map(|p| PerturbationMarker {
                tick: p.tick(),
                label: p.perturbation().label(),
                applied: p.is_applied(),
            })
            .collect();

        Self {
            equation: reaction.equation_string(),
            dt: reaction.dt(),
            times: reaction.times().to_vec(),
            species,
            quotient: reaction.quotient_history().to_vec(),
            constant: reaction.constant_history().to_vec(),
            markers,
        }
    }

    /// Series for the named species
    pub fn series(&self, name: &str) -> Option<&SpeciesSeries> {
        self.species.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self).map_err(|e| {
            SimulationError::SerializationError(format!("Trajectory serialization failed: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_species_per_side() {
        let reactants = vec![Species::new("N2O4", 1, 1.0)];
        let products = vec![Species::new("NO2", 2, 0.0)];
        assert_eq!(format_equation(&reactants, &products), "1N2O4 <=> 2NO2");
    }

    #[test]
    fn test_empty_side() {
        let reactants = vec![Species::new("A", 1, 1.0)];
        assert_eq!(format_equation(&reactants, &[]), "1A <=> ");
    }
}
