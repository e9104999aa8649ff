// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

// Terminal cells are roughly twice as tall as wide; vertical extents are
// halved so an ellipse reads as an ellipse on screen.
const CELL_ASPECT: f32 = 0.5;

/// Cell canvas for one frame. Float-space drawing goes through a movable
/// origin (the vanishing point); overlays address cells directly.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    origin_x: f32,
    origin_y: f32,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<crossterm::style::Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(self.blank);
    }

    pub fn translate(&mut self, cx: f32, cy: f32) {
        self.origin_x = cx;
        self.origin_y = cy;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    fn set_signed(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as u16, y as u16, cell);
    }

    /// Single origin-relative point, rounded to the nearest cell.
    pub fn plot(&mut self, fx: f32, fy: f32, cell: Cell) {
        let x = (fx + self.origin_x).round();
        let y = (fy + self.origin_y).round();
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.set_signed(x as i32, y as i32, cell);
    }

    /// Filled ellipse around an origin-relative center, radii in cell
    /// widths. Always lights at least the center cell.
    pub fn fill_ellipse(&mut self, fx: f32, fy: f32, rx: f32, ry: f32, cell: Cell) {
        let cx = fx + self.origin_x;
        let cy = fy + self.origin_y;
        if !cx.is_finite() || !cy.is_finite() {
            return;
        }

        let rx = rx.abs();
        let ry = ry.abs() * CELL_ASPECT;
        if rx < 0.5 && ry < 0.5 {
            self.plot(fx, fy, cell);
            return;
        }

        let x0 = (cx - rx).floor() as i32;
        let x1 = (cx + rx).ceil() as i32;
        let y0 = (cy - ry).floor() as i32;
        let y1 = (cy + ry).ceil() as i32;

        let rx = rx.max(0.5);
        let ry = ry.max(0.5);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 - cx) / rx;
                let dy = (y as f32 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.set_signed(x, y, cell);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> Cell {
        Cell::glyph('o', None, None)
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut f = Frame::new(4, 3, None);
        f.set(1, 1, dot());
        f.clear();
        assert!(f.cells().iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn tiny_ellipse_still_lights_the_center_cell() {
        let mut f = Frame::new(9, 9, None);
        f.fill_ellipse(4.0, 4.0, 0.1, 0.1, dot());
        assert_eq!(f.get(4, 4).unwrap().ch, 'o');
        assert_eq!(f.cells().iter().filter(|c| c.ch == 'o').count(), 1);
    }

    #[test]
    fn ellipse_is_clipped_at_the_borders() {
        let mut f = Frame::new(5, 5, None);
        f.fill_ellipse(0.0, 0.0, 3.0, 6.0, dot());
        // No panic, and something near the corner was drawn.
        assert_eq!(f.get(0, 0).unwrap().ch, 'o');
    }

    #[test]
    fn translate_offsets_float_space_draws() {
        let mut f = Frame::new(10, 10, None);
        f.translate(5.0, 5.0);
        f.plot(2.0, -1.0, dot());
        assert_eq!(f.get(7, 4).unwrap().ch, 'o');
    }

    #[test]
    fn non_finite_centers_are_ignored() {
        let mut f = Frame::new(4, 4, None);
        f.fill_ellipse(f32::NAN, 0.0, 2.0, 2.0, dot());
        f.plot(f32::INFINITY, 0.0, dot());
        assert!(f.cells().iter().all(|c| c.ch == ' '));
    }
}
