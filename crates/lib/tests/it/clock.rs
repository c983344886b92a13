use replidoc::{Error, clock::Clock};

#[test]
fn test_seed_is_stable_per_replica() {
    let first = Clock::new("node-1");
    let restarted = Clock::new("node-1");

    assert_eq!(first, restarted);
    assert_eq!(first.id(), first.seed().to_string());
    assert_eq!(first.timestamp(), format!("1.{}", first.seed()));
}

#[test]
fn test_tick_never_decreases() {
    let mut clock = Clock::new("node-1");
    let mut previous = clock.count();
    for _ in 0..100 {
        clock.tick().unwrap();
        assert_eq!(clock.count(), previous + 1);
        previous = clock.count();
    }
}

#[test]
fn test_update_is_monotonic_and_idempotent() {
    let mut clock = Clock::new("node-1");
    let remote = Clock::from_parts(40, clock.seed() + 1);

    clock.update(&remote);
    assert_eq!(clock.count(), 40);

    let seed = clock.seed();
    for older in [Clock::from_parts(3, 1), Clock::from_parts(39, u32::MAX as u64), remote] {
        clock.update(&older);
        assert_eq!(clock.count(), 40);
        assert_eq!(clock.seed(), seed);
    }
}

#[test]
fn test_update_from_string() {
    let mut clock = Clock::from_parts(2, 5);
    clock.update_str("7.3").unwrap();
    assert_eq!(clock.to_string(), "7.5");

    let err: Error = clock.update_str("7-3").unwrap_err().into();
    assert!(err.is_parse_error());
    assert_eq!(clock.count(), 7);
}

#[test]
fn test_minted_ids_exceed_merged_ids() {
    let mut clock = Clock::new("node-1");
    let remote = Clock::from_parts(9, clock.seed() + 10);
    clock.update(&remote);

    let minted = clock.mint().unwrap();
    assert!(minted > remote.current());
    assert!(clock.owns(&minted));
}

#[test]
fn test_clock_stops_at_max_count() {
    let mut clock = Clock::from_parts(Clock::MAX_COUNT - 2, 1);
    clock.tick().unwrap();
    clock.tick().unwrap();
    assert_eq!(clock.count(), Clock::MAX_COUNT);

    let err: Error = clock.mint().unwrap_err().into();
    assert!(err.is_clock_exhausted());
    assert!(!err.is_parse_error());
    assert_eq!(clock.count(), Clock::MAX_COUNT);
}

#[test]
fn test_clock_serde() {
    let clock = Clock::from_parts(12, 99);
    let json = serde_json::to_string(&clock).unwrap();
    let back: Clock = serde_json::from_str(&json).unwrap();
    assert_eq!(back, clock);
}
