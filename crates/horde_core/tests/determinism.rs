//! Same seed and inputs, same game.

use horde_core::data::GameData;
use horde_core::replay::{Replay, ReplayAction};
use horde_core::simulation::Simulation;
use horde_test_utils::determinism::{
    find_first_divergence, verify_determinism, verify_determinism_parallel,
};
use horde_test_utils::fixtures::{run_scripted, scripted_input, DT};

#[test]
fn test_repeated_runs_match() {
    let result = verify_determinism(3, 900, || Simulation::with_defaults(42));
    result.assert_deterministic();
}

#[test]
fn test_parallel_runs_match() {
    let result = verify_determinism_parallel(4, 600, || Simulation::with_defaults(7));
    result.assert_deterministic();
}

#[test]
fn test_no_divergence_tick_by_tick() {
    assert_eq!(find_first_divergence(|| Simulation::with_defaults(99), 300), None);
}

#[test]
fn test_different_seeds_differ() {
    let mut a = Simulation::with_defaults(1);
    let mut b = Simulation::with_defaults(2);
    run_scripted(&mut a, 300);
    run_scripted(&mut b, 300);
    assert_ne!(a.state_hash(), b.state_hash());
}

#[test]
fn test_long_replay_round_trips_and_verifies() {
    let mut sim = Simulation::with_defaults(1234);
    let mut replay = Replay::new(sim.seed(), sim.config().clone());
    for frame in 0..1200 {
        let input = scripted_input(frame);
        sim.tick(DT, &input);
        replay.record_tick(DT, input);
        if sim.pending_upgrades() > 0 {
            let part = horde_core::data::WeaponPart::ALL[frame as usize % 8];
            if sim.apply_upgrade(part).is_some() {
                replay.record(ReplayAction::Upgrade(part));
            }
        }
    }
    replay.finalize(&sim);

    let bytes = replay.to_bytes().expect("encode");
    let decoded = Replay::from_bytes(&bytes).expect("decode");
    decoded.verify(&GameData::default()).expect("replay matches");
}
