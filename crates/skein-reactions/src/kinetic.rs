//! The standard condition/action/distribution composite reaction.

use skein_core::{
    Action, CloneError, Condition, ConsistencyError, Context, Environment, Execution,
    MoleculeSet, NodeId, Reaction, Time, TimeDistribution,
};

/// A rate-governed reaction: conditions gate and scale it, actions are
/// its effects, a time distribution turns its propensity into firing
/// times.
///
/// Propensity = `rate_constant × Π condition contributions`; with no
/// conditions the reaction fires at the bare rate constant. Input
/// context is the widest condition context, output context the widest
/// action context — both recomputed on demand so stateful actions that
/// broaden their reach at runtime are observed immediately.
///
/// # Examples
///
/// ```
/// use skein_core::{MoleculeId, NodeId, Reaction};
/// use skein_reactions::{AddMolecule, ConstantRate, KineticReaction, MoleculePresent};
///
/// let reaction = KineticReaction::builder("decay", NodeId(0))
///     .rate_constant(0.5)
///     .condition(Box::new(MoleculePresent::new(NodeId(0), MoleculeId(0), 1.0)))
///     .action(Box::new(AddMolecule::new(NodeId(0), MoleculeId(0), -1.0)))
///     .distribution(Box::new(ConstantRate::new()))
///     .build()
///     .unwrap();
///
/// assert_eq!(reaction.name(), "decay");
/// assert!(reaction.tau().is_infinite());
/// ```
#[derive(Debug)]
pub struct KineticReaction {
    name: String,
    node: NodeId,
    rate_constant: f64,
    conditions: Vec<Box<dyn Condition>>,
    actions: Vec<Box<dyn Action>>,
    distribution: Box<dyn TimeDistribution>,
    rate: f64,
}

/// Builder for [`KineticReaction`].
///
/// Required: `distribution`. Conditions and actions are optional — a
/// conditionless reaction fires at its bare rate constant, an
/// actionless one is a pure clock.
pub struct KineticReactionBuilder {
    name: String,
    node: NodeId,
    rate_constant: f64,
    conditions: Vec<Box<dyn Condition>>,
    actions: Vec<Box<dyn Action>>,
    distribution: Option<Box<dyn TimeDistribution>>,
}

impl KineticReaction {
    /// Create a new builder for a reaction named `name` on `node`.
    pub fn builder(name: impl Into<String>, node: NodeId) -> KineticReactionBuilder {
        KineticReactionBuilder {
            name: name.into(),
            node,
            rate_constant: 1.0,
            conditions: Vec::new(),
            actions: Vec::new(),
            distribution: None,
        }
    }

    fn propensity(&self, env: &dyn Environment) -> f64 {
        self.conditions
            .iter()
            .fold(self.rate_constant, |p, c| p * c.propensity_contribution(env))
    }
}

impl KineticReactionBuilder {
    /// Set the base rate constant (default: 1.0). Must be finite and
    /// non-negative.
    pub fn rate_constant(mut self, rate: f64) -> Self {
        self.rate_constant = rate;
        self
    }

    /// Append a gating condition.
    pub fn condition(mut self, condition: Box<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append an effect. Actions execute in the order they were added.
    pub fn action(mut self, action: Box<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Set the time distribution (required).
    pub fn distribution(mut self, distribution: Box<dyn TimeDistribution>) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Build the reaction, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - no `distribution` was set
    /// - `rate_constant` is negative, NaN, or infinite
    pub fn build(self) -> Result<KineticReaction, String> {
        let distribution = self
            .distribution
            .ok_or_else(|| "distribution is required".to_string())?;

        if !self.rate_constant.is_finite() || self.rate_constant < 0.0 {
            return Err(format!(
                "rate_constant must be finite and >= 0, got {}",
                self.rate_constant
            ));
        }

        Ok(KineticReaction {
            name: self.name,
            node: self.node,
            rate_constant: self.rate_constant,
            conditions: self.conditions,
            actions: self.actions,
            distribution,
            rate: 0.0,
        })
    }
}

impl Reaction for KineticReaction {
    fn name(&self) -> &str {
        &self.name
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn input_context(&self) -> Context {
        self.conditions
            .iter()
            .fold(Context::Local, |ctx, c| ctx.widest(c.context()))
    }

    fn output_context(&self) -> Context {
        self.actions
            .iter()
            .fold(Context::Local, |ctx, a| ctx.widest(a.context()))
    }

    fn reads(&self) -> MoleculeSet {
        self.conditions
            .iter()
            .fold(MoleculeSet::empty(), |set, c| set.union(&c.reads()))
    }

    fn writes(&self) -> MoleculeSet {
        self.actions
            .iter()
            .fold(MoleculeSet::empty(), |set, a| set.union(&a.writes()))
    }

    fn tau(&self) -> Time {
        self.distribution.next_occurrence()
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn update_status(&mut self, now: Time, executed: bool, env: &dyn Environment) {
        self.rate = self.propensity(env);
        self.distribution.update(now, executed, self.rate);
    }

    fn execute(&mut self, env: &mut dyn Environment) -> Result<Execution, ConsistencyError> {
        for condition in &self.conditions {
            if !condition.is_satisfied(env) {
                return Err(ConsistencyError::ConditionUnsatisfied {
                    reaction: self.name.clone(),
                    condition: condition.name().to_string(),
                });
            }
        }

        let before = self.output_context();
        for action in &mut self.actions {
            action.execute(env);
        }
        let after = self.output_context();

        if after > before {
            Ok(Execution::widened(after))
        } else {
            Ok(Execution::completed())
        }
    }

    fn clone_on_node(&self, node: NodeId) -> Result<Box<dyn Reaction>, CloneError> {
        let unsupported = || CloneError::Unsupported {
            reaction: self.name.clone(),
            node,
        };

        let mut conditions = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            conditions.push(condition.rebind(node).ok_or_else(unsupported)?);
        }
        let mut actions = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            actions.push(action.rebind(node).ok_or_else(unsupported)?);
        }
        let distribution = self.distribution.fork().ok_or_else(unsupported)?;

        Ok(Box::new(KineticReaction {
            name: self.name.clone(),
            node,
            rate_constant: self.rate_constant,
            conditions,
            actions,
            distribution,
            rate: 0.0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AddMolecule, ConstantRate, MoleculePresent, SetMolecule};
    use skein_core::MoleculeId;
    use skein_test_utils::GridEnvironment;

    const X: MoleculeId = MoleculeId(0);
    const Y: MoleculeId = MoleculeId(1);

    fn env_with_x(count: f64) -> GridEnvironment {
        let mut env = GridEnvironment::new();
        env.add_node(NodeId(0));
        env.set_molecule_count(NodeId(0), X, count);
        env
    }

    // ── Builder ──────────────────────────────────────────────

    #[test]
    fn build_requires_distribution() {
        let err = KineticReaction::builder("r", NodeId(0)).build().unwrap_err();
        assert!(err.contains("distribution"));
    }

    #[test]
    fn build_rejects_bad_rate_constant() {
        let err = KineticReaction::builder("r", NodeId(0))
            .rate_constant(-1.0)
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap_err();
        assert!(err.contains("rate_constant"));
    }

    // ── Propensity and scheduling ────────────────────────────

    #[test]
    fn bare_rate_constant_schedules_reciprocal() {
        let env = env_with_x(0.0);
        let mut r = KineticReaction::builder("clock", NodeId(0))
            .rate_constant(1.0)
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        r.update_status(Time::ZERO, true, &env);
        assert_eq!(r.tau(), Time::new(1.0));
        assert_eq!(r.rate(), 1.0);
    }

    #[test]
    fn propensity_is_product_of_contributions() {
        let mut env = env_with_x(3.0);
        env.set_molecule_count(NodeId(0), Y, 4.0);
        let mut r = KineticReaction::builder("bind", NodeId(0))
            .rate_constant(0.5)
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .condition(Box::new(MoleculePresent::new(NodeId(0), Y, 1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        r.update_status(Time::ZERO, false, &env);
        assert_eq!(r.rate(), 0.5 * 3.0 * 4.0);
        assert_eq!(r.tau(), Time::new(1.0 / 6.0));
    }

    #[test]
    fn unsatisfied_condition_parks_at_infinity() {
        let env = env_with_x(0.0);
        let mut r = KineticReaction::builder("gated", NodeId(0))
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        r.update_status(Time::ZERO, false, &env);
        assert_eq!(r.rate(), 0.0);
        assert!(r.tau().is_infinite());
    }

    #[test]
    fn update_status_is_idempotent_without_env_change() {
        let env = env_with_x(2.0);
        let mut r = KineticReaction::builder("decay", NodeId(0))
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        r.update_status(Time::ZERO, false, &env);
        let tau = r.tau();
        r.update_status(Time::ZERO, false, &env);
        assert_eq!(r.tau(), tau);
    }

    // ── Declaration surface ──────────────────────────────────

    #[test]
    fn reads_and_writes_union_parts() {
        let r = KineticReaction::builder("transform", NodeId(0))
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .action(Box::new(AddMolecule::new(NodeId(0), X, -1.0)))
            .action(Box::new(AddMolecule::new(NodeId(0), Y, 1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        assert!(r.reads().contains(X));
        assert!(!r.reads().contains(Y));
        assert!(r.writes().contains(X));
        assert!(r.writes().contains(Y));
        assert_eq!(r.input_context(), Context::Local);
        assert_eq!(r.output_context(), Context::Local);
    }

    #[test]
    fn neighborhood_action_widens_output_context() {
        let r = KineticReaction::builder("spill", NodeId(0))
            .action(Box::new(crate::AddToNeighbors::new(NodeId(0), X, 1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();
        assert_eq!(r.output_context(), Context::Neighborhood);
        assert_eq!(r.input_context(), Context::Local);
    }

    // ── Execution ────────────────────────────────────────────

    #[test]
    fn actions_run_in_declaration_order() {
        let mut env = env_with_x(0.0);
        let mut r = KineticReaction::builder("ordered", NodeId(0))
            .action(Box::new(SetMolecule::new(NodeId(0), X, 10.0)))
            .action(Box::new(AddMolecule::new(NodeId(0), X, -4.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        r.execute(&mut env).unwrap();
        // Set-then-add; the reverse order would leave 10.0.
        assert_eq!(env.molecule_count(NodeId(0), X), 6.0);
    }

    #[test]
    fn execute_with_false_condition_is_a_consistency_error() {
        let mut env = env_with_x(0.0);
        let mut r = KineticReaction::builder("guarded", NodeId(0))
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .action(Box::new(SetMolecule::new(NodeId(0), X, 99.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        let err = r.execute(&mut env).unwrap_err();
        assert!(matches!(err, ConsistencyError::ConditionUnsatisfied { .. }));
        // Actions did not run.
        assert_eq!(env.molecule_count(NodeId(0), X), 0.0);
    }

    // ── Cloning ──────────────────────────────────────────────

    #[test]
    fn clone_on_node_rebinds_all_parts() {
        let mut env = env_with_x(5.0);
        env.add_node(NodeId(1));
        env.set_molecule_count(NodeId(1), X, 5.0);

        let r = KineticReaction::builder("decay", NodeId(0))
            .condition(Box::new(MoleculePresent::new(NodeId(0), X, 1.0)))
            .action(Box::new(AddMolecule::new(NodeId(0), X, -1.0)))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        let mut clone = r.clone_on_node(NodeId(1)).unwrap();
        assert_eq!(clone.node(), NodeId(1));
        clone.execute(&mut env).unwrap();
        assert_eq!(env.molecule_count(NodeId(1), X), 4.0);
        assert_eq!(env.molecule_count(NodeId(0), X), 5.0);
    }

    #[test]
    fn clone_fails_when_a_part_refuses() {
        // An action holding externally owned state that cannot be
        // duplicated.
        #[derive(Debug)]
        struct Tap;
        impl Action for Tap {
            fn context(&self) -> Context {
                Context::Local
            }
            fn writes(&self) -> MoleculeSet {
                MoleculeSet::empty()
            }
            fn execute(&mut self, _env: &mut dyn Environment) {}
            fn rebind(&self, _node: NodeId) -> Option<Box<dyn Action>> {
                None
            }
        }

        let r = KineticReaction::builder("tapped", NodeId(0))
            .action(Box::new(Tap))
            .distribution(Box::new(ConstantRate::new()))
            .build()
            .unwrap();

        let err = r.clone_on_node(NodeId(1)).unwrap_err();
        assert_eq!(
            err,
            CloneError::Unsupported {
                reaction: "tapped".into(),
                node: NodeId(1),
            }
        );
    }
}
