//! Property tests over stat composition and the ammo invariant.

use horde_core::data::{
    GameData, ModifierKind, QuickReloadStats, StatKey, UpgradeLevels, UpgradeTable, WeaponId,
    WeaponPart,
};
use horde_core::input::FrameInput;
use horde_core::reload::QuickReloadWindow;
use horde_core::stats::compose_stats;
use horde_test_utils::fixtures::armed_sim;
use horde_test_utils::strategies::{arb_dt, arb_frame_input, arb_upgrade_picks, arb_weapon};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn levels_from(picks: &[WeaponPart], data: &GameData) -> UpgradeLevels {
    let mut levels = UpgradeLevels::new();
    for &part in picks {
        levels.raise(part, data.upgrades.max_level(part));
    }
    levels
}

/// Default table with the barrel retargeted at max spread, so three parts
/// stack onto one stat.
fn stacked_spread_table() -> UpgradeTable {
    let mut table = UpgradeTable::default();
    for effect in &mut table.effects {
        if effect.part == WeaponPart::Barrel {
            effect.stat = StatKey::MaxSpread;
            effect.kind = ModifierKind::SubtractPercentBase;
            effect.value = 0.04;
        }
    }
    table
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-5 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn upgrade_order_does_not_matter(
        weapon in arb_weapon(),
        picks in arb_upgrade_picks(24),
        level in 1u32..10,
        seed in any::<u64>(),
    ) {
        let data = GameData::default();
        let weapon = data.weapons.get(weapon);
        let levels = levels_from(&picks, &data);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let table = stacked_spread_table();
        let mut shuffled_table = table.clone();
        shuffled_table.effects.shuffle(&mut rng);

        let forward: Vec<(WeaponPart, u32)> = levels.iter().collect();
        let mut permuted = forward.clone();
        permuted.shuffle(&mut rng);

        let a = compose_stats(weapon, &table, forward.iter().copied(), level, 2.0);
        let b = compose_stats(weapon, &shuffled_table, permuted.iter().copied(), level, 2.0);

        let reduction: f32 = [WeaponPart::Barrel, WeaponPart::Muzzle, WeaponPart::Grip]
            .iter()
            .filter_map(|&part| table.effect(part).map(|e| e.value * levels.level(part) as f32))
            .sum();
        let expected = (weapon.spread.max_spread * (1.0 - reduction)).max(0.0);

        prop_assert!(close(a.max_spread, expected), "{} vs {}", a.max_spread, expected);
        prop_assert!(close(b.max_spread, expected), "{} vs {}", b.max_spread, expected);
        prop_assert!(close(a.damage, b.damage));
        prop_assert!(close(a.fire_rate, b.fire_rate));
        prop_assert!(close(a.zoom, b.zoom));
        prop_assert!(close(a.penetration.chance, b.penetration.chance));
        prop_assert_eq!(a.max_ammo, b.max_ammo);
        prop_assert_eq!(a.penetration.count, b.penetration.count);
    }

    #[test]
    fn ammo_stays_within_magazine(
        weapon in arb_weapon(),
        frames in prop::collection::vec((arb_dt(), arb_frame_input()), 1..240),
    ) {
        let mut sim = armed_sim(11, weapon);
        for (dt, input) in &frames {
            sim.tick(*dt, input);
            if sim.pending_upgrades() > 0 {
                sim.skip_upgrade();
            }
            let player = sim.player();
            prop_assert!(player.ammo <= player.max_ammo);
            prop_assert_eq!(player.max_ammo, sim.stats().max_ammo);
        }
    }

    #[test]
    fn quick_reload_window_is_clipped_and_sized(
        lo in 0.0f32..1.0,
        span in 0.0f32..1.0,
        difficulty in 0.0f32..0.5,
        seed in any::<u64>(),
    ) {
        let qr = QuickReloadStats {
            min_time_percent: lo,
            max_time_percent: (lo + span).min(1.0),
            difficulty_percent: difficulty,
            ..QuickReloadStats::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let w = QuickReloadWindow::roll(&qr, &mut rng);
        let half = difficulty / 2.0;
        prop_assert!(w.start >= 0.0 && w.end <= 1.0);
        prop_assert!(w.start >= qr.min_time_percent - half - 1e-5);
        prop_assert!(w.end <= qr.max_time_percent + half + 1e-5);
        prop_assert!(w.end - w.start <= difficulty + 1e-5);
    }
}

#[test]
fn switching_weapons_mid_reload_keeps_ammo_valid() {
    let mut sim = armed_sim(5, WeaponId::Smg);
    sim.world_mut().player.ammo = 3;
    let reload = FrameInput {
        reload_pressed: true,
        ..FrameInput::default()
    };
    sim.tick(1.0 / 60.0, &reload);
    assert!(sim.player().reload.is_reloading());
    sim.switch_weapon(WeaponId::Sniper);
    assert!(!sim.player().reload.is_reloading());
    assert_eq!(sim.player().ammo, sim.player().max_ammo);
}
