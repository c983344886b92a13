use rand::{Rng, RngCore, SeedableRng, rngs::StdRng, seq::SliceRandom};
use replidoc::{
    Document,
    operation::{Cursor, Key, Mutation, Operation, PathElement, Value},
};

use crate::helpers::*;

const KEYS: [&str; 3] = ["a", "b", "c"];

fn key(rng: &mut StdRng) -> &'static str {
    KEYS.choose(rng).copied().unwrap_or("a")
}

/// Picks a valid edit against the replica's current view.
fn random_edit(rng: &mut StdRng, doc: &Document) -> (Cursor, Mutation) {
    let list_path = [PathElement::map("list")];
    let list_len = doc.node_at(&list_path).map_or(0, |node| node.list().len());
    let value = rng.gen_range(0..1000i64);

    match rng.gen_range(0..8) {
        0 => (
            register_at(&[key(rng)]),
            Mutation::insert(Key::Register, value),
        ),
        1 => (
            register_at(&[key(rng), key(rng)]),
            Mutation::assign(Key::Register, value),
        ),
        2 => (Cursor::empty(), Mutation::delete(key(rng))),
        3 => (register_at(&[key(rng)]), Mutation::delete(Key::Register)),
        4 => (
            Cursor::new(Key::Register, list_path),
            Mutation::insert(rng.gen_range(0..=list_len), Value::Branch),
        ),
        5 => (
            Cursor::new(
                Key::Register,
                [PathElement::map("list"), PathElement::list(rng.gen_range(0..=list_len))],
            ),
            Mutation::assign(Key::Register, value),
        ),
        6 if list_len > 0 => (
            Cursor::new(Key::Register, list_path),
            Mutation::delete(rng.gen_range(0..list_len)),
        ),
        _ => (Cursor::empty(), Mutation::assign(key(rng), Value::Branch)),
    }
}

/// Runs a random session of edits and partial syncs, then delivers every
/// operation everywhere in a random order.
fn run_session(seed: u64, replicas: usize, steps: usize) -> (Vec<Document>, Vec<Operation>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut docs: Vec<Document> = (0..replicas)
        .map(|n| Document::init(format!("replica-{n}")))
        .collect();
    let mut log = Vec::new();

    for _ in 0..steps {
        let at = rng.gen_range(0..replicas);
        let (cursor, mutation) = random_edit(&mut rng, &docs[at]);
        log.push(author(&mut docs[at], cursor, mutation));

        if rng.gen_bool(0.3) {
            let to = rng.gen_range(0..replicas);
            let partial = rng.gen_range(0..=log.len());
            deliver(&mut docs[to], &shuffled(&log[..partial], rng.next_u64()));
        }
    }

    for doc in docs.iter_mut() {
        deliver(doc, &shuffled(&log, rng.next_u64()));
    }
    (docs, log)
}

#[test]
fn test_random_sessions_converge() {
    for seed in 0..25 {
        let (docs, log) = run_session(seed, 3, 60);
        let refs: Vec<&Document> = docs.iter().collect();
        assert_converged(&refs);
        assert_eq!(docs[0].applied().len(), log.len(), "seed {seed}");
    }
}

#[test]
fn test_delivery_order_does_not_matter() {
    let (docs, log) = run_session(42, 4, 80);

    for order in 0..10 {
        let mut late = Document::init("late-joiner");
        deliver(&mut late, &shuffled(&log, 1000 + order));
        assert!(late.buffered().is_empty());
        assert_eq!(late.head(), docs[0].head(), "delivery order {order}");
    }
}

#[test]
fn test_list_edits_converge() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut docs: Vec<Document> = ["x", "y"].into_iter().map(Document::init).collect();
    let mut log = Vec::new();

    for round in 0..30 {
        let at = round % 2;
        let len = docs[at]
            .node_at(&[PathElement::map("list")])
            .map_or(0, |node| node.list().len());
        let index = rng.gen_range(0..=len);
        let cursor = Cursor::new(
            Key::Register,
            [PathElement::map("list"), PathElement::list(index)],
        );
        log.push(author(&mut docs[at], cursor, Mutation::insert(Key::Register, round as i64)));

        if round % 5 == 4 {
            for doc in docs.iter_mut() {
                deliver(doc, &log);
            }
        }
    }
    for doc in docs.iter_mut() {
        deliver(doc, &log);
    }

    assert_converged(&[&docs[0], &docs[1]]);
    let list = docs[0].node_at(&[PathElement::map("list")]).unwrap();
    let mut seen = live_list_values(list);
    assert!(seen.len() <= 30);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), live_list_values(list).len());
}
