//! ASCII rasterizer for draw lists.
//!
//! Renders a [`Frame`] into a character grid for quick terminal review.
//! Each screen cell covers `viewport / (width, height)` pixels; later
//! commands overwrite earlier ones, matching paint order.

use horde_core::math::Vec2;
use horde_core::render::{draw_frame, DrawCommand, Frame, Viewport};
use horde_core::simulation::Simulation;

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Width of the ASCII viewport.
    pub width: usize,
    /// Height of the ASCII viewport.
    pub height: usize,
    /// Append a HUD line.
    pub show_hud: bool,
    /// Draw floating text.
    pub show_text: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            show_hud: true,
            show_text: false,
        }
    }
}

struct Grid {
    cols: usize,
    rows: usize,
    cell: Vec2,
    cells: Vec<char>,
}

impl Grid {
    fn new(cols: usize, rows: usize, viewport: Vec2) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell: Vec2::new(
                viewport.x.max(1.0) / cols as f32,
                viewport.y.max(1.0) / rows as f32,
            ),
            cells: vec![' '; cols * rows],
        }
    }

    fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let c = (p.x / self.cell.x) as usize;
        let r = (p.y / self.cell.y) as usize;
        (c < self.cols && r < self.rows).then_some((c, r))
    }

    fn plot(&mut self, p: Vec2, ch: char) {
        if let Some((c, r)) = self.cell_of(p) {
            self.cells[r * self.cols + c] = ch;
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, ch: char) {
        let steps = ((to - from) / self.cell).abs().max_element().ceil().min(512.0) as usize;
        for i in 0..=steps {
            let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
            self.plot(from.lerp(to, t), ch);
        }
    }

    fn disc(&mut self, center: Vec2, radius: f32, ch: char) {
        // Always mark the centre so small things stay visible.
        self.plot(center, ch);
        let min = center - Vec2::splat(radius);
        let max = center + Vec2::splat(radius);
        let mut y = (min.y / self.cell.y).floor() * self.cell.y + self.cell.y / 2.0;
        while y <= max.y {
            let mut x = (min.x / self.cell.x).floor() * self.cell.x + self.cell.x / 2.0;
            while x <= max.x {
                let p = Vec2::new(x, y);
                if p.distance_squared(center) <= radius * radius {
                    self.plot(p, ch);
                }
                x += self.cell.x;
            }
            y += self.cell.y;
        }
    }

    fn ring(&mut self, center: Vec2, radius: f32, ch: char) {
        let n = 32;
        for i in 0..n {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            self.plot(center + Vec2::new(a.cos(), a.sin()) * radius, ch);
        }
    }

    fn text(&mut self, position: Vec2, text: &str) {
        let Some((c, r)) = self.cell_of(position) else {
            return;
        };
        let start = c.saturating_sub(text.chars().count() / 2);
        for (i, ch) in text.chars().enumerate() {
            let col = start + i;
            if col < self.cols {
                self.cells[r * self.cols + col] = ch;
            }
        }
    }

    fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

fn circle_char(radius: f32) -> char {
    if radius >= 20.0 {
        'O'
    } else if radius >= 12.0 {
        'o'
    } else if radius >= 4.0 {
        '*'
    } else {
        '.'
    }
}

/// Rasterize a frame. Faint commands (alpha below 0.15) are skipped.
pub fn rasterize(frame: &Frame, config: &AsciiConfig) -> Vec<String> {
    let viewport = frame.viewport.unwrap_or_default().size();
    let mut grid = Grid::new(config.width, config.height, viewport);

    for command in &frame.commands {
        match command {
            DrawCommand::Clear { .. } => grid.cells.fill(' '),
            DrawCommand::Circle { center, radius, alpha, .. } if *alpha >= 0.15 => {
                grid.disc(*center, *radius, circle_char(*radius));
            }
            DrawCommand::Ring { center, radius, alpha, .. } if *alpha >= 0.15 => {
                grid.ring(*center, *radius, '~');
            }
            DrawCommand::Line { from, to, alpha, .. } if *alpha >= 0.15 => {
                grid.line(*from, *to, '-');
            }
            DrawCommand::Rect { min, size, alpha, .. } if *alpha >= 0.15 => {
                grid.line(*min, *min + Vec2::new(size.x, 0.0), '=');
            }
            DrawCommand::Quad { center, .. } => grid.plot(*center, '+'),
            DrawCommand::Text { position, text, .. } if config.show_text => {
                grid.text(*position, text);
            }
            _ => {}
        }
    }
    grid.rows()
}

/// Render the current simulation frame, with the player marked `@`.
pub fn render_ascii(sim: &Simulation, config: &AsciiConfig) -> Vec<String> {
    let viewport = Viewport::new(
        sim.world().camera.viewport.x,
        sim.world().camera.viewport.y,
    );
    let frame = draw_frame(sim, viewport);
    let mut grid = Grid::new(config.width, config.height, viewport.size());
    grid.cells = rasterize(&frame, config)
        .iter()
        .flat_map(|row| {
            let mut chars: Vec<char> = row.chars().collect();
            chars.resize(grid.cols, ' ');
            chars
        })
        .collect();
    grid.cells.resize(grid.cols * grid.rows, ' ');
    let player = sim.world().camera.world_to_screen(sim.player().position);
    grid.plot(player, '@');

    let mut rows = grid.rows();
    if config.show_hud {
        let s = sim.snapshot();
        rows.push(format!(
            "tick {} | hp {:.0}/{:.0} | {} {}/{} | wave {} | kills {} | score {} | lvl {}",
            sim.tick_count(),
            s.health,
            s.max_health,
            s.weapon,
            s.ammo,
            s.max_ammo,
            s.wave,
            s.kills,
            s.score,
            s.level
        ));
    }
    rows
}
