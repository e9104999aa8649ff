// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::ease;

/// Two input channels feed one target speed: press-and-hold ramps it past a
/// threshold, the wheel nudges it in steps. `current` chases `target` with
/// exponential smoothing so the field never jumps.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    pub idle_speed: f32,
    pub hyper_max: f32,
    pub accel_per_sec: f32,
    pub hold_threshold: Duration,
    pub scroll_step: f32,
    pub smoothing: f32,

    pub current: f32,
    pub target: f32,
    pub holding: bool,
    press_start: Option<Instant>,
}

impl Throttle {
    pub fn new(
        idle_speed: f32,
        hyper_max: f32,
        accel_per_sec: f32,
        hold_threshold: Duration,
        scroll_step: f32,
        smoothing: f32,
    ) -> Self {
        Self {
            idle_speed,
            hyper_max,
            accel_per_sec,
            hold_threshold,
            scroll_step,
            smoothing,
            current: idle_speed,
            target: idle_speed,
            holding: false,
            press_start: None,
        }
    }

    pub fn press(&mut self, now: Instant) {
        self.press_start = Some(now);
        self.holding = true;
    }

    /// Ending a hold always parks the target back at idle, even when the
    /// wheel had pushed it higher beforehand.
    pub fn release(&mut self) {
        self.press_start = None;
        self.holding = false;
        self.target = self.idle_speed;
    }

    /// Shifts an in-progress hold forward, e.g. across a pause, so paused
    /// time does not count toward the ramp.
    pub fn defer(&mut self, by: Duration) {
        if let Some(start) = self.press_start.as_mut() {
            *start += by;
        }
    }

    pub fn nudge(&mut self, up: bool) {
        let delta = if up {
            self.scroll_step
        } else {
            -self.scroll_step
        };
        self.target = (self.target + delta).clamp(self.idle_speed, self.hyper_max);
    }

    pub fn update(&mut self, now: Instant, dt: f32) {
        if self.holding {
            if let Some(start) = self.press_start {
                let held = now.saturating_duration_since(start);
                if held >= self.hold_threshold {
                    let t = (held - self.hold_threshold).as_secs_f32();
                    self.target = (self.idle_speed + t * self.accel_per_sec).min(self.hyper_max);
                } else {
                    self.target = self.idle_speed;
                }
            }
        }

        self.current = ease::approach(self.current, self.target, self.smoothing, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle() -> Throttle {
        Throttle::new(2.0, 30.0, 40.0, Duration::from_millis(500), 0.5, 10.0)
    }

    #[test]
    fn smoothing_closes_in_on_a_fixed_target() {
        let mut th = throttle();
        th.target = 30.0;
        let now = Instant::now();
        let mut gap = (th.target - th.current).abs();
        for i in 0..60 {
            th.update(now + Duration::from_millis(16 * i), 0.016);
            let next_gap = (th.target - th.current).abs();
            assert!(next_gap < gap, "gap widened at step {}", i);
            assert!(th.current <= th.target);
            gap = next_gap;
        }
    }

    #[test]
    fn short_tap_never_leaves_idle() {
        let mut th = throttle();
        let t0 = Instant::now();
        th.press(t0);
        th.update(t0 + Duration::from_millis(300), 0.016);
        assert_eq!(th.target, th.idle_speed);
        th.release();
        assert_eq!(th.target, th.idle_speed);
    }

    #[test]
    fn hold_ramp_is_linear_past_the_threshold() {
        let mut th = Throttle::new(2.0, 100.0, 40.0, Duration::from_millis(500), 0.5, 10.0);
        let t0 = Instant::now();
        th.press(t0);
        th.update(t0 + Duration::from_millis(1500), 0.016);
        // One second past the threshold at 40/s on top of idle 2.
        assert!((th.target - 42.0).abs() < 1e-3);
    }

    #[test]
    fn hold_ramp_clamps_at_hyper_max() {
        let mut th = throttle();
        let t0 = Instant::now();
        th.press(t0);
        th.update(t0 + Duration::from_secs(60), 0.016);
        assert_eq!(th.target, th.hyper_max);
    }

    #[test]
    fn release_discards_any_accumulated_target() {
        let mut th = throttle();
        for _ in 0..10 {
            th.nudge(true);
        }
        assert_eq!(th.target, 7.0);

        let t0 = Instant::now();
        th.press(t0);
        th.update(t0 + Duration::from_secs(2), 0.016);
        assert!(th.target > th.idle_speed);

        th.release();
        assert_eq!(th.target, th.idle_speed);
    }

    #[test]
    fn wheel_steps_accumulate_and_clamp() {
        let mut th = throttle();
        for n in 1..=10 {
            th.nudge(true);
            assert_eq!(th.target, 2.0 + 0.5 * n as f32);
        }
        for _ in 0..200 {
            th.nudge(true);
        }
        assert_eq!(th.target, th.hyper_max);
        for _ in 0..200 {
            th.nudge(false);
        }
        assert_eq!(th.target, th.idle_speed);
    }

    #[test]
    fn deferred_holds_do_not_count_paused_time() {
        let mut th = throttle();
        let t0 = Instant::now();
        th.press(t0);
        th.defer(Duration::from_secs(1));
        th.update(t0 + Duration::from_millis(1400), 0.016);
        assert_eq!(th.target, th.idle_speed);
    }

    #[test]
    fn wheel_target_persists_until_overridden() {
        let mut th = throttle();
        th.nudge(true);
        th.nudge(true);
        let now = Instant::now();
        for i in 0..20 {
            th.update(now + Duration::from_millis(16 * i), 0.016);
        }
        assert_eq!(th.target, 3.0);
        assert!((th.current - 3.0).abs() < 0.1);
    }
}
