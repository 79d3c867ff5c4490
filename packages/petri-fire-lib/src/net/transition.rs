use hashbrown::{HashMap, HashSet};

use crate::net::{Marking, Place};

/// Immutable description of a single transition: what it consumes, what it
/// produces, which places must be empty and which places it wipes.
///
/// Arcs with weight zero are dropped at construction, so every stored arc
/// carries a weight of at least one. Descriptors are plain values; sharing
/// one across threads needs no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<P: Place> {
    input: HashMap<P, u64>,
    output: HashMap<P, u64>,
    inhibitor: HashSet<P>,
    reset: HashSet<P>,
}

impl<P: Place> Transition<P> {
    pub fn new(
        input: impl IntoIterator<Item = (P, u64)>,
        reset: impl IntoIterator<Item = P>,
        inhibitor: impl IntoIterator<Item = P>,
        output: impl IntoIterator<Item = (P, u64)>,
    ) -> Self {
        Transition {
            input: input.into_iter().filter(|(_, weight)| *weight > 0).collect(),
            output: output.into_iter().filter(|(_, weight)| *weight > 0).collect(),
            inhibitor: inhibitor.into_iter().collect(),
            reset: reset.into_iter().collect(),
        }
    }

    /// A transition with no arcs: enabled everywhere, fires to no effect.
    pub fn empty() -> Self {
        Transition {
            input: HashMap::new(),
            output: HashMap::new(),
            inhibitor: HashSet::new(),
            reset: HashSet::new(),
        }
    }

    /// Adds an input arc consuming `weight` tokens from `place`.
    pub fn with_input(mut self, place: P, weight: u64) -> Self {
        if weight > 0 {
            self.input.insert(place, weight);
        }
        self
    }

    /// Adds an output arc producing `weight` tokens into `place`.
    pub fn with_output(mut self, place: P, weight: u64) -> Self {
        if weight > 0 {
            self.output.insert(place, weight);
        }
        self
    }

    /// Requires `place` to be empty for the transition to be enabled.
    pub fn with_inhibitor(mut self, place: P) -> Self {
        self.inhibitor.insert(place);
        self
    }

    /// Wipes `place` when the transition fires.
    pub fn with_reset(mut self, place: P) -> Self {
        self.reset.insert(place);
        self
    }

    pub fn input(&self) -> &HashMap<P, u64> {
        &self.input
    }

    pub fn output(&self) -> &HashMap<P, u64> {
        &self.output
    }

    pub fn inhibitor(&self) -> &HashSet<P> {
        &self.inhibitor
    }

    pub fn reset(&self) -> &HashSet<P> {
        &self.reset
    }

    /// A transition is enabled when every input place holds at least the
    /// arc weight and every inhibitor place holds nothing. Reset arcs take
    /// no part in enabling.
    pub fn is_enabled_in(&self, marking: &Marking<P>) -> bool {
        self.input
            .iter()
            .all(|(place, weight)| marking.tokens(place) >= *weight)
            && self.inhibitor.iter().all(|place| marking.tokens(place) == 0)
    }

    /// Applies the transition's effect: inputs are consumed, then outputs
    /// produced, then reset places wiped. The order is load-bearing: a
    /// place that is both produced into and reset ends up empty.
    ///
    /// Callers must have checked `is_enabled_in` on the same marking.
    pub(crate) fn fire_in(&self, marking: &mut Marking<P>) {
        for (place, weight) in &self.input {
            marking.withdraw(place, *weight);
        }
        for (place, weight) in &self.output {
            marking.deposit(place.clone(), *weight);
        }
        for place in &self.reset {
            marking.clear(place);
        }
    }

    /// Fires the transition if it is enabled; reports whether it fired.
    pub(crate) fn try_fire_in(&self, marking: &mut Marking<P>) -> bool {
        if self.is_enabled_in(marking) {
            self.fire_in(marking);
            true
        } else {
            false
        }
    }
}

impl<P: Place> Default for Transition<P> {
    fn default() -> Self {
        Transition::empty()
    }
}
