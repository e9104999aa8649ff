// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, Theme};

/// A ramp of shades from dim (index 0) to bright (last index), plus the
/// background the frame is cleared to. Drop brightness indexes the ramp.
#[derive(Clone, Debug)]
pub struct Palette {
    pub colors: Vec<Color>,
    pub bg: Option<Color>,
}

pub const RAMP_STEPS: usize = 8;

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

fn ramp(dim: (u8, u8, u8), bright: (u8, u8, u8)) -> Vec<(u8, u8, u8)> {
    (0..RAMP_STEPS)
        .map(|i| {
            let t = i as f32 / (RAMP_STEPS - 1) as f32;
            (
                lerp_u8(dim.0, bright.0, t),
                lerp_u8(dim.1, bright.1, t),
                lerp_u8(dim.2, bright.2, t),
            )
        })
        .collect()
}

fn theme_ramp(theme: Theme) -> Vec<(u8, u8, u8)> {
    match theme {
        Theme::Rain => ramp((45, 60, 85), (210, 225, 240)),
        Theme::Storm => ramp((40, 45, 60), (170, 185, 215)),
        Theme::Neon => ramp((20, 45, 90), (130, 230, 255)),
        Theme::Ember => ramp((70, 25, 10), (255, 185, 95)),
        Theme::Mist => ramp((55, 62, 66), (195, 205, 210)),
        Theme::Mono => ramp((90, 90, 90), (255, 255, 255)),
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn nearest_cube_level(v: u8) -> usize {
    let mut best = 0usize;
    let mut best_d = i32::MAX;
    for (i, &l) in CUBE_LEVELS.iter().enumerate() {
        let d = (v as i32 - l as i32).pow(2);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn nearest_gray(rgb: (u8, u8, u8)) -> (u8, (u8, u8, u8)) {
    let avg = ((rgb.0 as u16 + rgb.1 as u16 + rgb.2 as u16) / 3) as u8;
    if avg < 8 {
        return (16, (0, 0, 0));
    }
    if avg > 238 {
        return (231, (255, 255, 255));
    }
    let idx = 232 + (avg - 8) / 10;
    let v = 8 + 10 * (idx - 232);
    (idx, (v, v, v))
}

pub fn rgb_to_ansi256(rgb: (u8, u8, u8)) -> u8 {
    let ri = nearest_cube_level(rgb.0);
    let gi = nearest_cube_level(rgb.1);
    let bi = nearest_cube_level(rgb.2);
    let cube = (
        CUBE_LEVELS[ri],
        CUBE_LEVELS[gi],
        CUBE_LEVELS[bi],
    );
    let cube_idx = 16 + 36 * ri as u8 + 6 * gi as u8 + bi as u8;

    let (gray_idx, gray) = nearest_gray(rgb);
    if dist2(rgb, gray) < dist2(rgb, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn colors_for_mode(mode: ColorMode, list: &[(u8, u8, u8)]) -> Vec<Color> {
    match mode {
        // Mono leaves the terminal's default foreground in charge.
        ColorMode::Mono => Vec::new(),
        ColorMode::TrueColor => list
            .iter()
            .map(|&(r, g, b)| Color::Rgb { r, g, b })
            .collect(),
        ColorMode::Color256 => list
            .iter()
            .map(|&rgb| Color::AnsiValue(rgb_to_ansi256(rgb)))
            .collect(),
    }
}

pub fn build_palette(theme: Theme, mode: ColorMode, transparent: bool) -> Palette {
    Palette {
        colors: colors_for_mode(mode, &theme_ramp(theme)),
        bg: if transparent { None } else { Some(Color::Black) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_run_dim_to_bright() {
        for theme in [
            Theme::Rain,
            Theme::Storm,
            Theme::Neon,
            Theme::Ember,
            Theme::Mist,
            Theme::Mono,
        ] {
            let r = theme_ramp(theme);
            assert_eq!(r.len(), RAMP_STEPS);
            let lum = |c: (u8, u8, u8)| c.0 as u16 + c.1 as u16 + c.2 as u16;
            assert!(lum(r[0]) < lum(r[RAMP_STEPS - 1]));
        }
    }

    #[test]
    fn ansi256_maps_known_colors() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        // A pure cube color maps to its cube index.
        assert_eq!(rgb_to_ansi256((95, 0, 0)), 16 + 36);
    }

    #[test]
    fn mono_palette_defers_to_terminal_foreground() {
        let p = build_palette(Theme::Rain, ColorMode::Mono, false);
        assert!(p.colors.is_empty());
        assert_eq!(p.bg, Some(Color::Black));
    }

    #[test]
    fn transparent_background_clears_bg() {
        let p = build_palette(Theme::Rain, ColorMode::TrueColor, true);
        assert_eq!(p.bg, None);
        assert_eq!(p.colors.len(), RAMP_STEPS);
    }
}
