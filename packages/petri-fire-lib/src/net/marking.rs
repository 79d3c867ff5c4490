use std::{
    fmt::Display,
    hash::{DefaultHasher, Hash, Hasher},
};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::net::Place;

/// Token counts per place.
///
/// Only places with a positive count are stored; a missing key reads as
/// zero. Every mutation re-establishes that invariant, which is what makes
/// inhibitor checks and marking equality well-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marking<P: Place> {
    counts: HashMap<P, u64>,
}

impl<P: Place> Marking<P> {
    pub fn new() -> Self {
        Marking {
            counts: HashMap::new(),
        }
    }

    /// Tokens currently in `place`; absent places hold zero.
    pub fn tokens(&self, place: &P) -> u64 {
        self.counts.get(place).copied().unwrap_or(0)
    }

    /// Number of places holding at least one token.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all token counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&P, u64)> {
        self.counts.iter().map(|(place, count)| (place, *count))
    }

    /// Adds `weight` tokens to `place`. A weight of zero is a no-op, so no
    /// zero entry can appear.
    pub fn deposit(&mut self, place: P, weight: u64) {
        if weight == 0 {
            return;
        }
        *self.counts.entry(place).or_insert(0) += weight;
    }

    /// Removes up to `weight` tokens from `place`. The key disappears when
    /// no tokens would remain.
    pub fn withdraw(&mut self, place: &P, weight: u64) {
        if let Some(count) = self.counts.get_mut(place) {
            if *count > weight {
                *count -= weight;
            } else {
                self.counts.remove(place);
            }
        }
    }

    /// Empties `place` regardless of its current count.
    pub fn clear(&mut self, place: &P) {
        self.counts.remove(place);
    }
}

impl<P: Place> Default for Marking<P> {
    fn default() -> Self {
        Marking::new()
    }
}

impl<P: Place> FromIterator<(P, u64)> for Marking<P> {
    fn from_iter<I: IntoIterator<Item = (P, u64)>>(iter: I) -> Self {
        let mut marking = Marking::new();
        for (place, count) in iter {
            marking.deposit(place, count);
        }
        marking
    }
}

impl<P: Place> Hash for Marking<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // order-independent: equal markings must hash equally whatever the
        // map's iteration order happens to be
        let mut acc = 0u64;
        for (place, count) in &self.counts {
            let mut entry = DefaultHasher::new();
            place.hash(&mut entry);
            count.hash(&mut entry);
            acc = acc.wrapping_add(entry.finish());
        }
        state.write_u64(acc);
        state.write_usize(self.counts.len());
    }
}

impl<P: Place + Display> Display for Marking<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self
            .counts
            .iter()
            .map(|(place, count)| format!("{place}: {count}"))
            .sorted()
            .join(", ");
        write!(f, "{{{entries}}}")
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashSet;

    use super::*;

    #[test]
    fn absent_places_read_as_zero() {
        let marking: Marking<&str> = Marking::new();
        assert_eq!(marking.tokens(&"p"), 0);
    }

    #[test]
    fn construction_strips_zero_entries() {
        let marking = Marking::from_iter([("p", 0), ("q", 2)]);
        assert_eq!(marking.len(), 1);
        assert_eq!(marking.tokens(&"q"), 2);
    }

    #[test]
    fn withdraw_removes_exhausted_places() {
        let mut marking = Marking::from_iter([("p", 2)]);

        marking.withdraw(&"p", 1);
        assert_eq!(marking.tokens(&"p"), 1);

        marking.withdraw(&"p", 1);
        assert_eq!(marking.tokens(&"p"), 0);
        assert!(marking.is_empty());
    }

    #[test]
    fn clear_empties_a_place() {
        let mut marking = Marking::from_iter([("p", 5), ("q", 1)]);
        marking.clear(&"p");
        assert_eq!(marking, Marking::from_iter([("q", 1)]));
    }

    #[test]
    fn total_sums_all_places() {
        let marking = Marking::from_iter([("p", 3), ("q", 4)]);
        assert_eq!(marking.total(), 7);
    }

    #[test]
    fn equal_markings_hash_equally() {
        let forward = Marking::from_iter([("a", 1), ("b", 2), ("c", 3)]);
        let backward = Marking::from_iter([("c", 3), ("b", 2), ("a", 1)]);

        let mut set = HashSet::new();
        set.insert(forward);
        set.insert(backward);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_sorts_by_place() {
        let marking = Marking::from_iter([("b", 1), ("a", 2)]);
        assert_eq!(marking.to_string(), "{a: 2, b: 1}");
    }
}
