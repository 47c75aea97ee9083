//! Reference conditions.

use skein_core::{Condition, Context, Environment, MoleculeId, MoleculeSet, NodeId};

/// Requires at least `threshold` of a molecule on the owning node.
///
/// The propensity contribution is mass-action style: the molecule's
/// current count when the threshold is met, zero otherwise. A reaction
/// gated on two `MoleculePresent` conditions therefore fires at a rate
/// proportional to the product of the two counts.
#[derive(Debug)]
pub struct MoleculePresent {
    name: String,
    node: NodeId,
    molecule: MoleculeId,
    threshold: f64,
}

impl MoleculePresent {
    /// Require `threshold` or more of `molecule` on `node`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not finite or is negative.
    pub fn new(node: NodeId, molecule: MoleculeId, threshold: f64) -> Self {
        assert!(
            threshold.is_finite() && threshold >= 0.0,
            "MoleculePresent threshold must be finite and non-negative"
        );
        Self {
            name: format!("molecule_present({molecule} >= {threshold})"),
            node,
            molecule,
            threshold,
        }
    }
}

impl Condition for MoleculePresent {
    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn reads(&self) -> MoleculeSet {
        [self.molecule].into_iter().collect()
    }

    fn is_satisfied(&self, env: &dyn Environment) -> bool {
        env.molecule_count(self.node, self.molecule) >= self.threshold
    }

    fn propensity_contribution(&self, env: &dyn Environment) -> f64 {
        let count = env.molecule_count(self.node, self.molecule);
        if count >= self.threshold {
            count
        } else {
            0.0
        }
    }

    fn rebind(&self, node: NodeId) -> Option<Box<dyn Condition>> {
        Some(Box::new(Self::new(node, self.molecule, self.threshold)))
    }
}
