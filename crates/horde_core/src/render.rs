//! Draw-list builder.
//!
//! The renderer reads the world and produces a [`Frame`]: an ordered list
//! of screen-space [`DrawCommand`]s that any backend (canvas, terminal,
//! GPU) can replay. It never mutates the simulation, so it also runs while
//! the game is paused.

use serde::{Deserialize, Serialize};

use crate::components::{GrenadeState, Rgb};
use crate::math::{direction, ray_exit_distance, Rect, Vec2};
use crate::reload::ReloadStatus;
use crate::simulation::Simulation;
use crate::stats::EffectiveStats;
use crate::world::{Camera, World};

/// Background.
pub const GROUND: Rgb = [34, 38, 32];
/// Player body.
pub const PLAYER: Rgb = [70, 130, 200];
/// Bullet tracer.
pub const BULLET: Rgb = [255, 240, 160];
/// Hit flash.
pub const FLASH: Rgb = [255, 255, 255];
/// Grenade body.
pub const GRENADE: Rgb = [60, 90, 50];
/// Laser sight.
pub const LASER: Rgb = [255, 30, 30];
/// Crosshair.
pub const CROSSHAIR: Rgb = [230, 230, 230];
/// Reload bar track.
pub const BAR_BACK: Rgb = [40, 40, 40];
/// Reload bar fill.
pub const BAR_FILL: Rgb = [220, 220, 220];
/// Quick-reload window.
pub const BAR_WINDOW: Rgb = [90, 200, 90];
/// Quick-reload window after a miss.
pub const BAR_LOCKED: Rgb = [200, 60, 60];
/// Health bar.
pub const HEALTH: Rgb = [200, 40, 40];
/// Shadow.
pub const SHADOW: Rgb = [0, 0, 0];

/// Width of the reload bar in pixels.
const RELOAD_BAR_WIDTH: f32 = 40.0;
/// Distance the reload bar sits above the player.
const RELOAD_BAR_OFFSET: f32 = 30.0;
/// Crosshair gap when the weapon is perfectly accurate.
const CROSSHAIR_MIN_GAP: f32 = 4.0;
/// Crosshair arm length.
const CROSSHAIR_ARM: f32 = 8.0;

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Viewport {
    /// New viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width.max(0.0), self.height.max(0.0))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(crate::world::DEFAULT_VIEWPORT.x, crate::world::DEFAULT_VIEWPORT.y)
    }
}

/// One primitive in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Fill the screen.
    Clear {
        /// Colour.
        color: Rgb,
    },
    /// Filled circle.
    Circle {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Colour.
        color: Rgb,
        /// Opacity in `[0, 1]`.
        alpha: f32,
    },
    /// Circle outline.
    Ring {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Stroke width.
        width: f32,
        /// Colour.
        color: Rgb,
        /// Opacity.
        alpha: f32,
    },
    /// Line segment.
    Line {
        /// Start.
        from: Vec2,
        /// End.
        to: Vec2,
        /// Stroke width.
        width: f32,
        /// Colour.
        color: Rgb,
        /// Opacity.
        alpha: f32,
    },
    /// Axis-aligned filled rectangle.
    Rect {
        /// Top-left corner.
        min: Vec2,
        /// Size.
        size: Vec2,
        /// Colour.
        color: Rgb,
        /// Opacity.
        alpha: f32,
    },
    /// Rotated filled rectangle.
    Quad {
        /// Centre.
        center: Vec2,
        /// Full size before rotation.
        size: Vec2,
        /// Rotation, radians.
        rotation: f32,
        /// Colour.
        color: Rgb,
        /// Opacity.
        alpha: f32,
    },
    /// Text anchored at its centre.
    Text {
        /// Anchor.
        position: Vec2,
        /// Content.
        text: String,
        /// Colour.
        color: Rgb,
        /// Opacity.
        alpha: f32,
        /// Font size in pixels.
        size: f32,
    },
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Screen size the commands were built for.
    pub viewport: Option<Viewport>,
    /// Commands in paint order.
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        self.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            alpha,
        });
    }

    fn rect(&mut self, min: Vec2, size: Vec2, color: Rgb, alpha: f32) {
        self.push(DrawCommand::Rect {
            min,
            size,
            color,
            alpha,
        });
    }

    /// Number of commands of a given variant name, for tests and tooling.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

/// Build the frame for a simulation.
#[must_use]
pub fn draw_frame(sim: &Simulation, viewport: Viewport) -> Frame {
    draw_world(sim.world(), sim.stats(), viewport)
}

/// World area visible through `camera`.
#[must_use]
pub fn visible_rect(camera: &Camera) -> Rect {
    Rect::from_center_size(camera.position, camera.viewport / camera.zoom.max(f32::EPSILON))
}

/// Build the frame from raw state.
#[must_use]
pub fn draw_world(world: &World, stats: &EffectiveStats, viewport: Viewport) -> Frame {
    let camera = Camera {
        viewport: viewport.size(),
        ..world.camera
    };
    let zoom = camera.zoom.max(f32::EPSILON);
    let to_screen = |p: Vec2| camera.world_to_screen(p);
    let stores = &world.stores;
    let mut frame = Frame {
        viewport: Some(viewport),
        commands: Vec::new(),
    };

    frame.push(DrawCommand::Clear { color: GROUND });

    for item in stores.items.iter().filter(|i| !i.dead) {
        let blink = item.life > 3.0 || (item.life * 8.0) as u32 % 2 == 0;
        if blink {
            let at = to_screen(item.position) - Vec2::new(0.0, item.z * zoom);
            frame.circle(at, item.radius * zoom * 0.6, item.color, 1.0);
        }
    }

    for shell in &stores.shells {
        let at = to_screen(shell.position) - Vec2::new(0.0, shell.z * zoom);
        let alpha = (shell.life / shell.max_life.max(f32::EPSILON)).clamp(0.0, 1.0);
        frame.push(DrawCommand::Quad {
            center: at,
            size: Vec2::new(4.0, 2.0) * zoom,
            rotation: shell.rotation,
            color: shell.color,
            alpha,
        });
    }

    for z in stores.zombies.iter().filter(|z| !z.dead) {
        let at = to_screen(z.position);
        let color = if z.hit_flash > 0.0 { FLASH } else { z.color };
        frame.circle(at, z.radius * zoom, color, 1.0);
        if z.health < z.max_health {
            let width = z.radius * 2.0 * zoom;
            let min = at - Vec2::new(width / 2.0, (z.radius + 8.0) * zoom);
            let fill = (z.health / z.max_health.max(f32::EPSILON)).clamp(0.0, 1.0);
            frame.rect(min, Vec2::new(width, 3.0), BAR_BACK, 1.0);
            frame.rect(min, Vec2::new(width * fill, 3.0), HEALTH, 1.0);
        }
    }

    for b in stores.bullets.iter().filter(|b| !b.dead) {
        let tail = b.position - crate::math::safe_normalize(b.velocity) * 10.0;
        frame.line(to_screen(tail), to_screen(b.position), 2.0, BULLET, 1.0);
    }

    for g in stores.grenades.iter().filter(|g| !g.dead) {
        let ground = to_screen(g.position);
        frame.circle(ground, 5.0 * zoom, SHADOW, 0.3);
        let lifted = ground - Vec2::new(0.0, g.z * zoom);
        let color = if g.state == GrenadeState::Rolling && (g.life * 10.0) as u32 % 2 == 0 {
            LASER
        } else {
            GRENADE
        };
        frame.circle(lifted, 5.0 * zoom, color, 1.0);
    }

    for e in &stores.explosions {
        let alpha = (e.life / e.max_life.max(f32::EPSILON)).clamp(0.0, 1.0);
        for ring in e.rings.iter().filter(|r| r.radius > 0.0) {
            frame.push(DrawCommand::Ring {
                center: to_screen(e.position),
                radius: ring.radius * zoom,
                width: ring.width,
                color: [255, 160, 60],
                alpha,
            });
        }
    }

    for p in &stores.particles {
        let alpha = (p.life / p.max_life.max(f32::EPSILON)).clamp(0.0, 1.0);
        frame.circle(to_screen(p.position), p.size * zoom, p.color, alpha);
    }

    draw_player(&mut frame, world, stats, &camera);

    for t in &stores.texts {
        let alpha = (t.life / t.max_life.max(f32::EPSILON)).clamp(0.0, 1.0);
        frame.push(DrawCommand::Text {
            position: to_screen(t.position),
            text: t.text.clone(),
            color: t.color,
            alpha,
            size: 14.0,
        });
    }

    draw_crosshair(&mut frame, world, stats, &camera);
    frame
}

fn draw_player(frame: &mut Frame, world: &World, stats: &EffectiveStats, camera: &Camera) {
    let player = &world.player;
    let zoom = camera.zoom.max(f32::EPSILON);
    let at = camera.world_to_screen(player.position);
    let forward = direction(player.rotation);
    let alpha = if player.dodge.active { 0.5 } else { 1.0 };

    if stats.laser_sight {
        let muzzle = player.position + forward * stats.gun_length;
        if let Some(len) = ray_exit_distance(muzzle, forward, &visible_rect(camera)) {
            frame.line(
                camera.world_to_screen(muzzle),
                camera.world_to_screen(muzzle + forward * len),
                1.0,
                LASER,
                0.6,
            );
        }
    }

    for part in &stats.render_parts {
        let mid = player.position + forward * (part.offset_x + part.length / 2.0);
        frame.push(DrawCommand::Quad {
            center: camera.world_to_screen(mid),
            size: Vec2::new(part.length, part.width) * zoom,
            rotation: player.rotation,
            color: part.color,
            alpha,
        });
    }
    frame.circle(at, player.radius * zoom, PLAYER, alpha);

    if let Some(progress) = player.reload.progress() {
        let shake = if player.reload.fail_shake > 0.0 {
            (player.reload.fail_shake * 60.0).sin() * 3.0
        } else {
            0.0
        };
        let min = at - Vec2::new(RELOAD_BAR_WIDTH / 2.0 - shake, RELOAD_BAR_OFFSET * zoom + 6.0);
        frame.rect(min, Vec2::new(RELOAD_BAR_WIDTH, 5.0), BAR_BACK, 0.8);
        let window = player.reload.window;
        let window_color = if player.reload.status() == ReloadStatus::QuickReloadLocked {
            BAR_LOCKED
        } else {
            BAR_WINDOW
        };
        frame.rect(
            min + Vec2::new(window.start * RELOAD_BAR_WIDTH, 0.0),
            Vec2::new((window.end - window.start) * RELOAD_BAR_WIDTH, 5.0),
            window_color,
            0.9,
        );
        let marker = min.x + progress * RELOAD_BAR_WIDTH;
        frame.line(
            Vec2::new(marker, min.y - 1.0),
            Vec2::new(marker, min.y + 6.0),
            2.0,
            BAR_FILL,
            1.0,
        );
    }
}

/// Crosshair at the pointer whose gap opens with the current spread.
fn draw_crosshair(frame: &mut Frame, world: &World, stats: &EffectiveStats, camera: &Camera) {
    let pointer = world.pointer;
    let player_screen = camera.world_to_screen(world.player.position);
    let reach = pointer.distance(player_screen);
    let spread = world.player.recoil.current_spread(stats);
    let gap = CROSSHAIR_MIN_GAP + reach * (spread / 2.0).tan().abs();
    let gap = if gap.is_finite() { gap } else { CROSSHAIR_MIN_GAP };

    for dir in [Vec2::X, -Vec2::X, Vec2::Y, -Vec2::Y] {
        frame.line(
            pointer + dir * gap,
            pointer + dir * (gap + CROSSHAIR_ARM),
            2.0,
            CROSSHAIR,
            0.9,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::data::{GameData, WeaponId};

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default(), GameData::default(), 1)
    }

    fn is_line(c: &DrawCommand) -> bool {
        matches!(c, DrawCommand::Line { .. })
    }

    #[test]
    fn test_frame_starts_with_clear() {
        let frame = draw_frame(&sim(), Viewport::default());
        assert_eq!(frame.commands[0], DrawCommand::Clear { color: GROUND });
    }

    #[test]
    fn test_laser_only_for_laser_weapons() {
        let mut s = sim();
        let without = draw_frame(&s, Viewport::default()).count(is_line);
        s.switch_weapon(WeaponId::Sniper);
        assert!(s.stats().laser_sight);
        let with = draw_frame(&s, Viewport::default()).count(is_line);
        assert_eq!(with, without + 1);
    }

    #[test]
    fn test_laser_stops_at_screen_edge() {
        let mut s = sim();
        s.switch_weapon(WeaponId::Sniper);
        let viewport = Viewport::new(800.0, 600.0);
        let frame = draw_frame(&s, viewport);
        let laser = frame
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Line { to, color, .. } if *color == LASER => Some(*to),
                _ => None,
            })
            .expect("laser line");
        assert!((laser.x - 800.0).abs() < 1e-2);
    }

    #[test]
    fn test_crosshair_opens_with_spread() {
        let s = sim();
        let mut world = s.world().clone();
        world.pointer = Vec2::new(900.0, 360.0);
        let tight = draw_world(&world, s.stats(), Viewport::default());
        world.player.recoil.movement_spread = 0.5;
        let wide = draw_world(&world, s.stats(), Viewport::default());

        let first_gap = |f: &Frame| {
            f.commands
                .iter()
                .rev()
                .find_map(|c| match c {
                    DrawCommand::Line { from, .. } => Some(from.distance(world.pointer)),
                    _ => None,
                })
                .unwrap_or(0.0)
        };
        assert!(first_gap(&wide) > first_gap(&tight));
    }

    #[test]
    fn test_reload_bar_drawn_while_reloading() {
        let s = sim();
        let mut world = s.world().clone();
        let qr = s.stats().quick_reload;
        world.player.ammo = 0;
        world.player.reload.start(1.0, 1.0, &qr, &mut world.rng);
        let idle = draw_world(s.world(), s.stats(), Viewport::default());
        let reloading = draw_world(&world, s.stats(), Viewport::default());
        let rects = |f: &Frame| f.count(|c| matches!(c, DrawCommand::Rect { .. }));
        assert_eq!(rects(&reloading), rects(&idle) + 2);
    }
}
