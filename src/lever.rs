// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::ease;
use crate::frame::Frame;

const SHAFT_ROWS: i32 = 4;

/// Decorative lever overlay that tilts toward the pointer. Runs on its own
/// smoothing rate and touches nothing the rain field owns.
#[derive(Clone, Copy, Debug)]
pub struct Lever {
    pub max_angle: f32,
    pub smoothing: f32,
    pub rot_x: f32,
    pub rot_y: f32,
    pub target_x: f32,
    pub target_y: f32,
}

impl Default for Lever {
    fn default() -> Self {
        Self::new()
    }
}

impl Lever {
    pub fn new() -> Self {
        Self {
            max_angle: 35.0,
            smoothing: 8.0,
            rot_x: 0.0,
            rot_y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
        }
    }

    /// Pointer position relative to the viewport center becomes a rotation
    /// target: vertical motion tips the lever, horizontal motion leans it.
    pub fn aim(&mut self, col: u16, row: u16, width: u16, height: u16) {
        let hw = width.max(1) as f32 / 2.0;
        let hh = height.max(1) as f32 / 2.0;
        let nx = ((col as f32 - hw) / hw).clamp(-1.0, 1.0);
        let ny = ((row as f32 - hh) / hh).clamp(-1.0, 1.0);
        self.target_x = (-ny * self.max_angle).clamp(-self.max_angle, self.max_angle);
        self.target_y = (nx * self.max_angle).clamp(-self.max_angle, self.max_angle);
    }

    pub fn neutral(&mut self) {
        self.target_x = 0.0;
        self.target_y = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        self.rot_x = ease::approach(self.rot_x, self.target_x, self.smoothing, dt);
        self.rot_y = ease::approach(self.rot_y, self.target_y, self.smoothing, dt);
    }

    /// Repaints the lever with a shear derived from the smoothed rotation,
    /// the terminal stand-in for a perspective transform.
    pub fn draw(&self, frame: &mut Frame, fg: Option<Color>, bg: Option<Color>) {
        if frame.width < 9 || frame.height < 8 {
            return;
        }
        let ax = frame.width as i32 / 2;
        let ay = frame.height as i32 - 2;

        // Lean folds the yaw and roll components into one screen shear;
        // terminal cells are narrow, so the horizontal throw is doubled.
        let lean = (self.rot_y * 1.1).to_radians().tan() * 2.0;
        let dip = (self.rot_x * 0.8).to_radians().sin();

        put(frame, ax - 1, ay, Cell::glyph('═', fg, bg));
        put(frame, ax, ay, Cell::glyph('╩', fg, bg));
        put(frame, ax + 1, ay, Cell::glyph('═', fg, bg));

        for k in 1..SHAFT_ROWS {
            let x = ax + (k as f32 * lean).round() as i32;
            put(frame, x, ay - k, Cell::glyph('║', fg, bg));
        }

        let kx = ax + (SHAFT_ROWS as f32 * lean).round() as i32;
        let ky = ay - SHAFT_ROWS - (dip * 1.5).round() as i32;
        let mut knob = Cell::glyph('◉', fg, bg);
        knob.bold = true;
        put(frame, kx, ky, knob);
    }
}

fn put(frame: &mut Frame, x: i32, y: i32, cell: Cell) {
    if x >= 0 && y >= 0 && x < frame.width as i32 && y < frame.height as i32 {
        frame.set(x as u16, y as u16, cell);
    }
}
