use petri_fire_lib::net::{Marking, PetriNet, Transition};
use rand::{Rng, SeedableRng, rngs::StdRng};

const PLACES: [&str; 4] = ["p0", "p1", "p2", "p3"];

// Every generated transition produces at most as many tokens as it
// consumes, so the total can never grow and the reachable set stays
// finite.
fn random_conserving_transition(r: &mut StdRng) -> Transition<&'static str> {
    let mut transition = Transition::empty();
    let mut available = 0u64;

    for place in PLACES {
        let consumed = r.gen_range(0..3u64);
        available += consumed;
        if consumed > 0 {
            transition = transition.with_input(place, consumed);
        }
    }

    for place in PLACES {
        if available == 0 {
            break;
        }
        let produced = r.gen_range(0..=available);
        available -= produced;
        if produced > 0 {
            transition = transition.with_output(place, produced);
        }
    }

    if r.gen_bool(0.3) {
        transition = transition.with_inhibitor(PLACES[r.gen_range(0..PLACES.len())]);
    }
    if r.gen_bool(0.3) {
        transition = transition.with_reset(PLACES[r.gen_range(0..PLACES.len())]);
    }

    transition
}

#[test]
fn random_bounded_nets_keep_the_sparse_invariant() {
    let mut r = StdRng::seed_from_u64(7);

    for _ in 0..25 {
        let transitions: Vec<_> = (0..5)
            .map(|_| random_conserving_transition(&mut r))
            .collect();
        let initial: Marking<&'static str> = PLACES
            .iter()
            .map(|place| (*place, r.gen_range(0..3u64)))
            .collect();
        let initial_total = initial.total();

        let net = PetriNet::new(initial, false);
        for marking in net.reachable(&transitions) {
            assert!(
                marking.iter().all(|(_, count)| count > 0),
                "a zero count leaked into a stored marking"
            );
            assert!(marking.total() <= initial_total, "tokens appeared out of thin air");
        }
    }
}

#[test]
fn random_nets_explore_the_same_set_twice() {
    let mut r = StdRng::seed_from_u64(11);

    for _ in 0..10 {
        let transitions: Vec<_> = (0..4)
            .map(|_| random_conserving_transition(&mut r))
            .collect();
        let initial: Marking<&'static str> = PLACES
            .iter()
            .map(|place| (*place, r.gen_range(0..3u64)))
            .collect();

        let net = PetriNet::new(initial, false);
        assert_eq!(net.reachable(&transitions), net.reachable(&transitions));
    }
}
