//! Input sampling.
//!
//! The host forwards raw key and pointer events as they arrive. Once per
//! frame [`InputSampler::sample`] folds them into a [`FrameInput`]: held
//! state for movement and the trigger, plus one-shot actions that are
//! consumed by the sample that reports them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::{safe_normalize, Vec2};

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Shift,
    Space,
    R,
    G,
    Escape,
}

/// Key assignments. Several keys may map to one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    /// Move up.
    pub up: Vec<Key>,
    /// Move down.
    pub down: Vec<Key>,
    /// Move left.
    pub left: Vec<Key>,
    /// Move right.
    pub right: Vec<Key>,
    /// Sprint while held.
    pub sprint: Vec<Key>,
    /// Start a reload.
    pub reload: Vec<Key>,
    /// Dodge roll.
    pub dodge: Vec<Key>,
    /// Throw a grenade.
    pub grenade: Vec<Key>,
    /// Toggle pause.
    pub pause: Vec<Key>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            up: vec![Key::W, Key::Up],
            down: vec![Key::S, Key::Down],
            left: vec![Key::A, Key::Left],
            right: vec![Key::D, Key::Right],
            sprint: vec![Key::Shift],
            reload: vec![Key::R],
            dodge: vec![Key::Space],
            grenade: vec![Key::G],
            pause: vec![Key::Escape],
        }
    }
}

/// Everything the simulation reads from input in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Movement direction, unit length or zero.
    pub move_axis: Vec2,
    /// Pointer position in screen pixels.
    pub aim_screen: Vec2,
    /// Trigger is down.
    pub fire_held: bool,
    /// Trigger went down since the previous sample.
    pub fire_pressed: bool,
    /// Sprint key is down.
    pub sprint_held: bool,
    /// Reload requested.
    pub reload_pressed: bool,
    /// Dodge requested.
    pub dodge_pressed: bool,
    /// Grenade requested.
    pub grenade_pressed: bool,
    /// Pause toggle requested.
    pub pause_pressed: bool,
}

impl FrameInput {
    /// Whether the player is trying to move.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.move_axis != Vec2::ZERO
    }
}

/// Accumulates raw events between frames.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    bindings: InputBindings,
    held: BTreeSet<Key>,
    pointer: Vec2,
    pointer_held: bool,
    fire_pressed: bool,
    reload_pressed: bool,
    dodge_pressed: bool,
    grenade_pressed: bool,
    pause_pressed: bool,
}

impl InputSampler {
    /// Sampler with custom bindings.
    #[must_use]
    pub fn new(bindings: InputBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Current bindings.
    #[must_use]
    pub fn bindings(&self) -> &InputBindings {
        &self.bindings
    }

    /// A key went down. Auto-repeat of an already held key is ignored.
    pub fn key_down(&mut self, key: Key) {
        if !self.held.insert(key) {
            return;
        }
        let b = &self.bindings;
        self.reload_pressed |= b.reload.contains(&key);
        self.dodge_pressed |= b.dodge.contains(&key);
        self.grenade_pressed |= b.grenade.contains(&key);
        self.pause_pressed |= b.pause.contains(&key);
    }

    /// A key went up.
    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Pointer moved to a screen position.
    pub fn pointer_moved(&mut self, screen: Vec2) {
        self.pointer = screen;
    }

    /// Primary button went down.
    pub fn pointer_down(&mut self) {
        if !self.pointer_held {
            self.fire_pressed = true;
        }
        self.pointer_held = true;
    }

    /// Primary button went up.
    pub fn pointer_up(&mut self) {
        self.pointer_held = false;
    }

    /// Drop all held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.pointer_held = false;
    }

    fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.held.contains(k))
    }

    /// Build this frame's input and consume one-shot actions.
    pub fn sample(&mut self) -> FrameInput {
        let b = &self.bindings;
        let mut axis = Vec2::ZERO;
        if self.any_held(&b.up) {
            axis.y -= 1.0;
        }
        if self.any_held(&b.down) {
            axis.y += 1.0;
        }
        if self.any_held(&b.left) {
            axis.x -= 1.0;
        }
        if self.any_held(&b.right) {
            axis.x += 1.0;
        }

        let input = FrameInput {
            move_axis: safe_normalize(axis),
            aim_screen: self.pointer,
            fire_held: self.pointer_held,
            fire_pressed: self.fire_pressed,
            sprint_held: self.any_held(&b.sprint),
            reload_pressed: self.reload_pressed,
            dodge_pressed: self.dodge_pressed,
            grenade_pressed: self.grenade_pressed,
            pause_pressed: self.pause_pressed,
        };

        self.fire_pressed = false;
        self.reload_pressed = false;
        self.dodge_pressed = false;
        self.grenade_pressed = false;
        self.pause_pressed = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let mut sampler = InputSampler::default();
        sampler.key_down(Key::W);
        sampler.key_down(Key::D);
        let input = sampler.sample();
        assert!((input.move_axis.length() - 1.0).abs() < 1e-5);
        assert!(input.move_axis.x > 0.0 && input.move_axis.y < 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut sampler = InputSampler::default();
        sampler.key_down(Key::A);
        sampler.key_down(Key::Right);
        assert!(!sampler.sample().is_moving());
    }

    #[test]
    fn test_actions_consumed_once() {
        let mut sampler = InputSampler::default();
        sampler.key_down(Key::R);
        sampler.pointer_down();
        let first = sampler.sample();
        assert!(first.reload_pressed && first.fire_pressed && first.fire_held);
        let second = sampler.sample();
        assert!(!second.reload_pressed && !second.fire_pressed);
        assert!(second.fire_held);
    }

    #[test]
    fn test_key_repeat_does_not_retrigger() {
        let mut sampler = InputSampler::default();
        sampler.key_down(Key::G);
        sampler.sample();
        sampler.key_down(Key::G);
        assert!(!sampler.sample().grenade_pressed);
        sampler.key_up(Key::G);
        sampler.key_down(Key::G);
        assert!(sampler.sample().grenade_pressed);
    }

    #[test]
    fn test_bindings_from_ron() {
        let bindings: InputBindings = ron::from_str("(dodge: [Shift])").expect("parse");
        let mut sampler = InputSampler::new(bindings);
        sampler.key_down(Key::Shift);
        let input = sampler.sample();
        assert!(input.dodge_pressed);
        assert!(input.sprint_held);
        assert_eq!(sampler.bindings().reload, vec![Key::R]);
    }
}
