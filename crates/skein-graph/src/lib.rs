//! Reaction dependency graph.
//!
//! [`DependencyGraph`] maintains, for every linked reaction, the set of
//! reactions it influences (outbound) and the set that influence it
//! (inbound). Edges are derived, never declared: reaction A influences
//! reaction B when A's write set intersects B's read set and the pair
//! is in scope given A's output context, B's input context, and the
//! environment's adjacency. After each firing, only `affected_by` of
//! the fired reaction is recomputed — the whole point of maintaining
//! explicit edges instead of rescanning all pairs per step.
//!
//! # Neighborhood staleness
//!
//! Edges for neighborhood-scoped reactions are computed against the
//! adjacency observed at [`link`](DependencyGraph::link) (or
//! [`widen_context`](DependencyGraph::widen_context)) time and are not
//! invalidated when nodes later move. Callers that change the topology
//! re-link the reactions whose neighborhoods changed; relinking on
//! every move would reintroduce the quadratic rescan this graph exists
//! to avoid.
//!
//! The graph is directed but not acyclic — a reaction that writes a
//! molecule it also reads depends on itself, which is the common case.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use indexmap::{IndexMap, IndexSet};

use skein_arena::ReactionArena;
use skein_core::{ConsistencyError, Context, Environment, Reaction, ReactionHandle};

/// Per-reaction edge record.
///
/// `out_context` is the output context the reaction was last linked
/// with. It starts at the declared context and can only widen (a
/// runtime effect observed reaching further than declared); edges are
/// always consistent with it.
#[derive(Debug, Default)]
struct Record {
    inbound: IndexSet<ReactionHandle>,
    outbound: IndexSet<ReactionHandle>,
    out_context: Option<Context>,
}

/// Directed dependency graph over reaction handles.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    records: IndexMap<ReactionHandle, Record>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and store `handle`'s edges against every other linked
    /// reaction.
    ///
    /// Both directions are derived in one pass: who `handle` can
    /// invalidate, and who can invalidate `handle`. Reactions present
    /// in the arena but not yet linked are skipped; they pick up their
    /// edges when they link. A no-op if `handle` is stale.
    pub fn link(&mut self, handle: ReactionHandle, arena: &ReactionArena, env: &dyn Environment) {
        let Some(reaction) = arena.get(handle) else {
            return;
        };
        let out_context = reaction.output_context();
        self.link_with_context(handle, reaction, out_context, arena, env);
    }

    /// Remove every edge touching `handle`, in both directions.
    ///
    /// A silent no-op if `handle` was never linked (or already
    /// unlinked): repeated removal must never corrupt the edge sets of
    /// other reactions.
    pub fn unlink(&mut self, handle: ReactionHandle) {
        let Some(record) = self.records.shift_remove(&handle) else {
            return;
        };
        for other in record.outbound {
            if let Some(r) = self.records.get_mut(&other) {
                r.inbound.shift_remove(&handle);
            }
        }
        for other in record.inbound {
            if let Some(r) = self.records.get_mut(&other) {
                r.outbound.shift_remove(&handle);
            }
        }
    }

    /// The reactions needing recomputation after `handle` fires, in
    /// insertion order. Empty if `handle` is not linked.
    pub fn affected_by(
        &self,
        handle: ReactionHandle,
    ) -> impl Iterator<Item = ReactionHandle> + '_ {
        self.records
            .get(&handle)
            .into_iter()
            .flat_map(|r| r.outbound.iter().copied())
    }

    /// The reactions whose firing requires updating `handle`, in
    /// insertion order. Empty if `handle` is not linked.
    pub fn depends_on(
        &self,
        handle: ReactionHandle,
    ) -> impl Iterator<Item = ReactionHandle> + '_ {
        self.records
            .get(&handle)
            .into_iter()
            .flat_map(|r| r.inbound.iter().copied())
    }

    /// Widen `handle`'s effective output context and recompute its
    /// edges.
    ///
    /// Called when an executed action reported effects reaching beyond
    /// the context the reaction was linked with. Widening is monotonic:
    /// the effective context is the widest ever observed, so a
    /// transient narrow execution never drops edges.
    pub fn widen_context(
        &mut self,
        handle: ReactionHandle,
        context: Context,
        arena: &ReactionArena,
        env: &dyn Environment,
    ) {
        let Some(reaction) = arena.get(handle) else {
            return;
        };
        let widened = match self.records.get(&handle).and_then(|r| r.out_context) {
            Some(current) => current.widest(context),
            None => reaction.output_context().widest(context),
        };
        self.unlink(handle);
        self.link_with_context(handle, reaction, widened, arena, env);
    }

    /// Whether `handle` is currently linked.
    pub fn is_linked(&self, handle: ReactionHandle) -> bool {
        self.records.contains_key(&handle)
    }

    /// Number of linked reactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no reactions are linked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Verify that every outbound edge has its inbound counterpart and
    /// vice versa.
    ///
    /// # Errors
    ///
    /// [`ConsistencyError::AsymmetricDependency`] naming the first
    /// unmatched edge.
    pub fn check_symmetry(&self) -> Result<(), ConsistencyError> {
        for (&handle, record) in &self.records {
            for &other in &record.outbound {
                let matched = self
                    .records
                    .get(&other)
                    .is_some_and(|r| r.inbound.contains(&handle));
                if !matched {
                    return Err(ConsistencyError::AsymmetricDependency {
                        from: handle,
                        to: other,
                    });
                }
            }
            for &other in &record.inbound {
                let matched = self
                    .records
                    .get(&other)
                    .is_some_and(|r| r.outbound.contains(&handle));
                if !matched {
                    return Err(ConsistencyError::AsymmetricDependency {
                        from: other,
                        to: handle,
                    });
                }
            }
        }
        Ok(())
    }

    /// Shared implementation of `link` and `widen_context`: compute
    /// edges for `reaction` using `out_context` as its effective
    /// output context.
    fn link_with_context(
        &mut self,
        handle: ReactionHandle,
        reaction: &dyn Reaction,
        out_context: Context,
        arena: &ReactionArena,
        env: &dyn Environment,
    ) {
        let mut outbound = IndexSet::new();
        let mut inbound = IndexSet::new();

        for (other_handle, other) in arena.iter() {
            if other_handle == handle {
                if influences(reaction, out_context, reaction, env) {
                    outbound.insert(handle);
                    inbound.insert(handle);
                }
                continue;
            }
            // Unlinked reactions are skipped; they compute both
            // directions when they link.
            let Some(other_out) = self.records.get(&other_handle).and_then(|r| r.out_context)
            else {
                continue;
            };
            if influences(reaction, out_context, other, env) {
                outbound.insert(other_handle);
            }
            if influences(other, other_out, reaction, env) {
                inbound.insert(other_handle);
            }
        }

        for &other in &outbound {
            if other != handle {
                if let Some(r) = self.records.get_mut(&other) {
                    r.inbound.insert(handle);
                }
            }
        }
        for &other in &inbound {
            if other != handle {
                if let Some(r) = self.records.get_mut(&other) {
                    r.outbound.insert(handle);
                }
            }
        }

        self.records.insert(
            handle,
            Record {
                inbound,
                outbound,
                out_context: Some(out_context),
            },
        );
    }
}

/// Whether firing `a` (acting at `a_out`) can invalidate `b`'s rate.
fn influences(
    a: &dyn Reaction,
    a_out: Context,
    b: &dyn Reaction,
    env: &dyn Environment,
) -> bool {
    a.writes().intersects(&b.reads()) && in_scope(a_out, a.node(), b.input_context(), b.node(), env)
}

/// Context scoping for a candidate edge: the influencer acts at `out`
/// from `a_node`, the influenced listens at `input` on `b_node`.
fn in_scope(
    out: Context,
    a_node: skein_core::NodeId,
    input: Context,
    b_node: skein_core::NodeId,
    env: &dyn Environment,
) -> bool {
    use Context::{Global, Local, Neighborhood};

    if out == Global || input == Global {
        return true;
    }
    if a_node == b_node {
        return true;
    }
    match (out, input) {
        (Local, Local) => false,
        (Neighborhood, Local) => env.are_neighbors(a_node, b_node),
        (Local, Neighborhood) => env.are_neighbors(b_node, a_node),
        (Neighborhood, Neighborhood) => {
            if env.are_neighbors(a_node, b_node) {
                return true;
            }
            // Distinct, non-adjacent nodes can still couple through a
            // shared neighbor.
            let theirs = env.neighborhood(b_node);
            env.neighborhood(a_node).iter().any(|n| theirs.contains(n))
        }
        (Global, _) | (_, Global) => true,
    }
}
