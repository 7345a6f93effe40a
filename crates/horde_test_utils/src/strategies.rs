//! Proptest strategies for simulation inputs and upgrade states.

use horde_core::data::{WeaponId, WeaponPart};
use horde_core::input::FrameInput;
use horde_core::math::Vec2;
use proptest::prelude::*;

/// Any weapon id.
pub fn arb_weapon() -> impl Strategy<Value = WeaponId> {
    prop::sample::select(WeaponId::ALL.to_vec())
}

/// Any weapon part.
pub fn arb_part() -> impl Strategy<Value = WeaponPart> {
    prop::sample::select(WeaponPart::ALL.to_vec())
}

/// A sequence of part raises, as a player would pick them.
pub fn arb_upgrade_picks(max_len: usize) -> impl Strategy<Value = Vec<WeaponPart>> {
    prop::collection::vec(arb_part(), 0..=max_len)
}

/// A plausible frame delta, including long stalls.
pub fn arb_dt() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 0.001f32..0.05,
        1 => 0.05f32..0.5,
    ]
}

/// Input with random buttons and a random aim point on a 1280x720 screen.
pub fn arb_frame_input() -> impl Strategy<Value = FrameInput> {
    (
        -1i8..=1,
        -1i8..=1,
        (0.0f32..1280.0, 0.0f32..720.0),
        any::<[bool; 6]>(),
    )
        .prop_map(|(x, y, (ax, ay), b)| FrameInput {
            move_axis: Vec2::new(f32::from(x), f32::from(y)).normalize_or_zero(),
            aim_screen: Vec2::new(ax, ay),
            fire_held: b[0] || b[1],
            fire_pressed: b[1],
            sprint_held: b[2],
            reload_pressed: b[3],
            dodge_pressed: b[4],
            grenade_pressed: b[5],
            pause_pressed: false,
        })
}
