use hashbrown::{HashMap, HashSet};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::net::{Marking, PetriNet, Place, Transition};

impl<P: Place> PetriNet<P> {
    /// Every marking reachable from the marking observed at call entry by
    /// firing any finite sequence out of `transitions`, the entry marking
    /// included.
    ///
    /// The snapshot is taken under the net's lock; exploration then runs on
    /// copies without it, so firings by other threads after entry are not
    /// reflected in the result. Terminates only for bounded nets; on an
    /// unbounded net the exploration grows without end.
    pub fn reachable(&self, transitions: &[Transition<P>]) -> HashSet<Marking<P>> {
        let start = self.marking();

        let mut reached = HashSet::new();
        let mut pending = vec![start.clone()];
        reached.insert(start);

        while let Some(marking) = pending.pop() {
            for transition in transitions {
                let mut next = marking.clone();
                if transition.try_fire_in(&mut next) && !reached.contains(&next) {
                    reached.insert(next.clone());
                    pending.push(next);
                }
            }
        }

        reached
    }

    /// The reachable state space as a graph: nodes are markings, and an
    /// edge `m -> m'` with weight `i` records that firing `transitions[i]`
    /// at `m` yields `m'`. Entry marking and staleness behave exactly as in
    /// `reachable`.
    pub fn reachability_graph(&self, transitions: &[Transition<P>]) -> DiGraph<Marking<P>, usize> {
        let start = self.marking();

        let mut graph = DiGraph::new();
        let mut nodes: HashMap<Marking<P>, NodeIndex> = HashMap::new();

        let root = graph.add_node(start.clone());
        nodes.insert(start.clone(), root);
        let mut pending = vec![(start, root)];

        while let Some((marking, from)) = pending.pop() {
            for (index, transition) in transitions.iter().enumerate() {
                let mut next = marking.clone();
                if !transition.try_fire_in(&mut next) {
                    continue;
                }

                let to = match nodes.get(&next) {
                    Some(&existing) => existing,
                    None => {
                        let added = graph.add_node(next.clone());
                        nodes.insert(next.clone(), added);
                        pending.push((next, added));
                        added
                    }
                };
                graph.add_edge(from, to, index);
            }
        }

        graph
    }
}
