// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::{
    cell::Cell, ease, frame::Frame, noise::ValueNoise, palette::Palette, raindrop::Raindrop,
};

/// Light to heavy drop glyphs, picked by stroke weight.
pub const GLYPHS: [char; 5] = ['·', '•', 'o', 'O', '@'];

// Far-plane depth is the viewport width; drops recycle at the near plane.
const NEAR_PLANE: f32 = 1.0;

pub struct Storm {
    pub width: f32,
    pub height: f32,
    pub min_speed: f32,
    pub jitter: f32,
    pub palette: Palette,

    drops: Vec<Raindrop>,
    noise: ValueNoise,
    frames: u64,

    mt: StdRng,
    rand_x: Uniform<f32>,
    rand_y: Uniform<f32>,
    rand_len: Uniform<f32>,
}

impl Storm {
    pub fn new(
        count: usize,
        width: u16,
        height: u16,
        min_speed: f32,
        jitter: f32,
        seed: u64,
        palette: Palette,
    ) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        let mut mt = StdRng::seed_from_u64(seed);

        // Freshly seeded drops spread tighter than recycled ones and start
        // anywhere along the depth axis so the field opens already full.
        let spawn_x = Uniform::new(-w, w).expect("valid range");
        let spawn_y = Uniform::new(-h, h).expect("valid range");
        let spawn_z = Uniform::new(0.3 * w, w).expect("valid range");
        let rand_len = Uniform::new(15.0, 35.0).expect("valid range");

        let mut drops = Vec::with_capacity(count);
        for _ in 0..count {
            drops.push(Raindrop {
                x: spawn_x.sample(&mut mt),
                y: spawn_y.sample(&mut mt),
                z: spawn_z.sample(&mut mt),
                pz: 0.0,
                length: rand_len.sample(&mut mt),
            });
        }

        Self {
            width: w,
            height: h,
            min_speed,
            jitter,
            palette,
            drops,
            noise: ValueNoise::new(seed),
            frames: 0,
            mt,
            rand_x: Uniform::new(-1.5 * w, 1.5 * w).expect("valid range"),
            rand_y: Uniform::new(-1.5 * h, 1.5 * h).expect("valid range"),
            rand_len,
        }
    }

    /// A new viewport re-rolls every drop from scratch. Rescaling the old
    /// positions would warp the perspective, so nothing is preserved.
    pub fn resize(&mut self, width: u16, height: u16) {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        self.width = w;
        self.height = h;
        self.rand_x = Uniform::new(-1.5 * w, 1.5 * w).expect("valid range");
        self.rand_y = Uniform::new(-1.5 * h, 1.5 * h).expect("valid range");

        for i in 0..self.drops.len() {
            let x = self.rand_x.sample(&mut self.mt);
            let y = self.rand_y.sample(&mut self.mt);
            let len = self.rand_len.sample(&mut self.mt);
            let d = &mut self.drops[i];
            d.x = x;
            d.y = y;
            d.z = w;
            d.pz = w;
            d.length = len;
        }
    }

    #[allow(dead_code)]
    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    /// Perspective divide onto the screen plane, relative to the vanishing
    /// point.
    pub fn project(&self, d: &Raindrop) -> (f32, f32) {
        (d.x / d.z * self.width, d.y / d.z * self.height)
    }

    fn shade(&self, alpha: f32, weight: f32) -> Cell {
        let hi = (GLYPHS.len() - 1) as f32;
        let gi = ease::remap(weight, 0.2, 1.2, 0.0, hi).round().clamp(0.0, hi) as usize;

        let fg = if self.palette.colors.is_empty() {
            None
        } else {
            let last = (self.palette.colors.len() - 1) as f32;
            let ci = ease::remap(alpha, 80.0, 200.0, 0.0, last)
                .round()
                .clamp(0.0, last) as usize;
            self.palette.colors.get(ci).copied()
        };

        Cell {
            ch: GLYPHS[gi],
            fg,
            bg: self.palette.bg,
            bold: weight > 1.0,
        }
    }

    pub fn rain(&mut self, frame: &mut Frame, dt: f32, speed: f32) {
        let w = self.width;
        let h = self.height;
        frame.translate(w * 0.5, h * 0.667);

        let max_dist = (w * w + h * h).sqrt() / 2.0 * 0.55;
        let fall = speed.max(self.min_speed) * dt * 60.0;
        let t = self.frames as f32 * 0.01;

        for i in 0..self.drops.len() {
            let mut d = self.drops[i];

            let (sx, sy) = self.project(&d);

            // Radial distance stands in for depth: center reads far,
            // periphery reads near. The remaps extrapolate past their
            // endpoints on purpose.
            let dist = (sx * sx + sy * sy).sqrt();
            let depth = ease::remap(dist, 0.0, max_dist, w, w * 0.2);
            let alpha = ease::remap(depth, w * 0.3, w, 200.0, 80.0);
            let size = ease::remap(depth, w * 0.3, w, 8.0, 1.5);
            let weight = ease::remap(size, 1.5, 8.0, 0.2, 1.2);

            frame.fill_ellipse(sx, sy, size * 0.3, size * 0.65, self.shade(alpha, weight));

            d.pz = d.z;
            d.z -= fall;

            d.x += (self.noise.sample(i as f32 * 0.01, t) - 0.5) * self.jitter * 5.0;
            d.y += (self.noise.sample(100.0 + i as f32 * 0.01, t) - 0.5) * self.jitter * 5.0;

            if d.z < NEAR_PLANE {
                d.x = self.rand_x.sample(&mut self.mt);
                d.y = self.rand_y.sample(&mut self.mt);
                d.z = w;
                d.pz = d.z;
                d.length = self.rand_len.sample(&mut self.mt);
            }

            self.drops[i] = d;
        }

        self.frames = self.frames.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::build_palette;
    use crate::runtime::{ColorMode, Theme};

    fn make_storm(count: usize, w: u16, h: u16) -> Storm {
        let palette = build_palette(Theme::Rain, ColorMode::TrueColor, false);
        Storm::new(count, w, h, 2.0, 0.01, 0x5EED, palette)
    }

    #[test]
    fn drop_count_is_invariant() {
        let mut storm = make_storm(300, 60, 24);
        let mut frame = Frame::new(60, 24, storm.palette.bg);
        for _ in 0..50 {
            storm.rain(&mut frame, 0.016, 10.0);
        }
        assert_eq!(storm.drops().len(), 300);
        storm.resize(31, 9);
        assert_eq!(storm.drops().len(), 300);
        storm.rain(&mut frame, 0.016, 10.0);
        assert_eq!(storm.drops().len(), 300);
    }

    #[test]
    fn depth_stays_positive_at_every_projection() {
        let mut storm = make_storm(200, 80, 24);
        let mut frame = Frame::new(80, 24, storm.palette.bg);
        for _ in 0..400 {
            for d in storm.drops() {
                assert!(d.z > 0.0);
                let (sx, sy) = storm.project(d);
                assert!(sx.is_finite() && sy.is_finite());
            }
            storm.rain(&mut frame, 0.05, 30.0);
        }
    }

    #[test]
    fn passing_the_near_plane_recycles_to_the_far_plane() {
        let mut storm = make_storm(100, 40, 20);
        let mut frame = Frame::new(40, 20, storm.palette.bg);
        // A fall large enough to push every drop past the near plane.
        storm.rain(&mut frame, 0.05, 1.0e6);
        for d in storm.drops() {
            assert_eq!(d.z, storm.width);
            assert_eq!(d.pz, storm.width);
            assert!(d.x.abs() <= 1.5 * storm.width);
            assert!(d.y.abs() <= 1.5 * storm.height);
            assert!((15.0..35.0).contains(&d.length));
        }
    }

    #[test]
    fn resize_rerolls_rather_than_rescales() {
        let mut storm = make_storm(150, 100, 40);
        let before: Vec<_> = storm.drops().to_vec();
        storm.resize(50, 20);
        let moved = storm
            .drops()
            .iter()
            .zip(&before)
            .filter(|(a, b)| a != b)
            .count();
        assert!(moved > 100);
        for d in storm.drops() {
            assert_eq!(d.z, storm.width);
        }
    }

    #[test]
    fn resize_then_rain_projects_finite_coordinates() {
        for (w, h) in [(1u16, 1u16), (3, 2), (200, 50)] {
            let mut storm = make_storm(64, 80, 24);
            let mut frame = Frame::new(w, h, storm.palette.bg);
            storm.resize(w, h);
            storm.rain(&mut frame, 0.016, 5.0);
            for d in storm.drops() {
                let (sx, sy) = storm.project(d);
                assert!(sx.is_finite() && sy.is_finite());
            }
        }
    }

    #[test]
    fn same_seed_replays_the_same_weather() {
        let mut a = make_storm(120, 64, 32);
        let mut b = make_storm(120, 64, 32);
        let mut fa = Frame::new(64, 32, a.palette.bg);
        let mut fb = Frame::new(64, 32, b.palette.bg);
        for _ in 0..10 {
            a.rain(&mut fa, 0.016, 12.0);
            b.rain(&mut fb, 0.016, 12.0);
        }
        assert_eq!(a.drops(), b.drops());
    }

    #[test]
    fn zero_jitter_advances_depth_only() {
        let mut storm = make_storm(50, 40, 20);
        storm.jitter = 0.0;
        let before: Vec<_> = storm.drops().to_vec();
        let mut frame = Frame::new(40, 20, storm.palette.bg);
        storm.rain(&mut frame, 0.016, 2.0);
        let fall = 2.0 * 0.016 * 60.0;
        for (after, b) in storm.drops().iter().zip(&before) {
            if after.z == storm.width && b.z - fall < 1.0 {
                continue; // recycled
            }
            assert_eq!(after.x, b.x);
            assert_eq!(after.y, b.y);
            assert_eq!(after.z, b.z - fall);
            assert_eq!(after.pz, b.z);
        }
    }

    #[test]
    fn empty_field_renders_nothing_and_survives() {
        let mut storm = make_storm(0, 40, 20);
        let mut frame = Frame::new(40, 20, storm.palette.bg);
        storm.rain(&mut frame, 0.016, 30.0);
        assert!(frame.cells().iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn rain_paints_cells() {
        let mut storm = make_storm(500, 60, 24);
        let mut frame = Frame::new(60, 24, storm.palette.bg);
        storm.rain(&mut frame, 0.016, 2.0);
        assert!(frame.cells().iter().any(|c| c.ch != ' '));
    }
}
