use std::sync::Arc;

use petri_fire_lib::{
    net::{Marking, PetriNet, Transition},
    threading::FiringPool,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Place {
    ToAdd,
    B,
    Product,
    Mutex,
    A,
    End,
}

fn adding(value: u64) -> Transition<Place> {
    Transition::empty()
        .with_input(Place::ToAdd, value)
        .with_inhibitor(Place::Mutex)
        .with_inhibitor(Place::End)
        .with_output(Place::Product, value)
        .with_output(Place::A, value)
}

fn filling(value: u64) -> Transition<Place> {
    Transition::empty()
        .with_input(Place::Mutex, 1)
        .with_input(Place::A, value)
        .with_inhibitor(Place::End)
        .with_output(Place::Mutex, 1)
        .with_output(Place::ToAdd, value)
}

fn restart() -> Transition<Place> {
    Transition::empty()
        .with_input(Place::B, 1)
        .with_inhibitor(Place::Mutex)
        .with_inhibitor(Place::ToAdd)
        .with_inhibitor(Place::End)
        .with_output(Place::Mutex, 1)
}

fn end_filling() -> Transition<Place> {
    Transition::empty()
        .with_input(Place::Mutex, 1)
        .with_inhibitor(Place::A)
        .with_inhibitor(Place::End)
}

fn terminal() -> Transition<Place> {
    Transition::empty()
        .with_inhibitor(Place::ToAdd)
        .with_inhibitor(Place::B)
        .with_inhibitor(Place::Mutex)
        .with_output(Place::End, 1)
        .with_output(Place::Mutex, 1)
}

// Doubling weights let the fill/add phases move the A tokens in binary
// chunks; weights above the operand can never be enabled, so the set stops
// there.
fn worker_transitions(operand: u64) -> Vec<Transition<Place>> {
    let mut transitions = vec![];

    let mut value = 1;
    while value <= operand.max(1) {
        transitions.push(adding(value));
        transitions.push(filling(value));
        value *= 2;
    }

    transitions.push(restart());
    transitions.push(end_filling());
    transitions
}

fn multiply(a: u64, b: u64, workers: usize) -> u64 {
    let net = Arc::new(PetriNet::new(
        Marking::from_iter([(Place::A, a), (Place::B, b)]),
        false,
    ));
    let mut pool = FiringPool::spawn(Arc::clone(&net), worker_transitions(a), workers);

    let finish = vec![terminal()];
    let token = net.cancel_token();
    net.fire(&finish, &token).unwrap();

    let product = net.marking().tokens(&Place::Product);

    let counts = pool.join();
    assert_eq!(counts.len(), workers);

    product
}

#[test]
fn multiplies_two_by_three_with_four_workers() {
    assert_eq!(multiply(2, 3, 4), 6);
}

#[test]
fn multiplies_larger_operands() {
    assert_eq!(multiply(5, 7, 4), 35);
}

#[test]
fn multiplication_by_zero_terminates_immediately() {
    assert_eq!(multiply(2, 0, 2), 0);
    assert_eq!(multiply(0, 3, 2), 0);
}

#[test]
fn the_terminal_marking_disables_every_worker_transition() {
    let net = Arc::new(PetriNet::new(
        Marking::from_iter([(Place::A, 2), (Place::B, 3)]),
        false,
    ));
    let mut pool = FiringPool::spawn(Arc::clone(&net), worker_transitions(2), 4);

    let finish = vec![terminal()];
    let token = net.cancel_token();
    net.fire(&finish, &token).unwrap();
    pool.join();

    let marking = net.marking();
    assert_eq!(marking.tokens(&Place::End), 1);
    for transition in worker_transitions(2) {
        assert!(!transition.is_enabled_in(&marking));
    }
}
