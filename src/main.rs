// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod ease;
mod frame;
mod lever;
mod noise;
mod palette;
mod raindrop;
mod runtime;
mod storm;
mod terminal;
mod throttle;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, Args,
};
use crate::frame::Frame;
use crate::lever::Lever;
use crate::palette::build_palette;
use crate::runtime::{ColorMode, Theme};
use crate::storm::Storm;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::throttle::Throttle;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("PLUVIO_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u32_range(name: &str, v: u32, min: u32, max: u32) -> u32 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            8 => ColorMode::Color256,
            24 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,8,24)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "rain" => Ok(Theme::Rain),
        "storm" => Ok(Theme::Storm),
        "neon" => Ok(Theme::Neon),
        "ember" => Ok(Theme::Ember),
        "mist" => Ok(Theme::Mist),
        "mono" | "white" => Ok(Theme::Mono),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });

    let count = require_u32_range("--count", args.count, 0, 200_000) as usize;
    let idle_speed = require_f32_range("--idle-speed", args.idle_speed, 0.001, 1000.0);
    let hyper_max = require_f32_range("--hyper-max", args.hyper_max, idle_speed, 1000.0);
    let accel = require_f32_range("--accel", args.accel, 0.0, 10_000.0);
    let hold_ms = require_u64_range("--hold-ms", args.hold_ms, 0, 60_000);
    let scroll_step = require_f32_range("--scroll-step", args.scroll_step, 0.0, 100.0);
    let smoothing = require_f32_range("--smoothing", args.smoothing, 0.01, 1000.0);
    let jitter = require_f32_range("--jitter", args.jitter, 0.0, 10.0);

    let theme = match parse_theme(&args.color) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let color_mode = detect_color_mode(&args);
    let palette = build_palette(theme, color_mode, args.transparent);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;

    let mut storm = Storm::new(count, w, h, idle_speed, jitter, args.seed, palette);
    let mut throttle = Throttle::new(
        idle_speed,
        hyper_max,
        accel,
        Duration::from_millis(hold_ms),
        scroll_step,
        smoothing,
    );
    let mut lever = if args.no_lever {
        None
    } else {
        Some(Lever::new())
    };

    let mut frame = Frame::new(w, h, storm.palette.bg);

    let start_time = Instant::now();
    let end_time = duration_s.and_then(|s| {
        if s <= 0.0 {
            return None;
        }
        Some(start_time + Duration::from_secs_f64(s))
    });

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut last_tick = Instant::now();

    let mut running = true;
    let mut paused = false;
    let mut pause_time: Option<Instant> = None;

    let mut perf_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let ev = Terminal::read_event()?;
                match ev {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::FocusLost => {
                        if let Some(lv) = lever.as_mut() {
                            lv.neutral();
                        }
                    }
                    Event::Mouse(m) => match m.kind {
                        MouseEventKind::Down(_) => throttle.press(Instant::now()),
                        MouseEventKind::Up(_) => throttle.release(),
                        MouseEventKind::ScrollUp => throttle.nudge(true),
                        MouseEventKind::ScrollDown => throttle.nudge(false),
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                            if let Some(lv) = lever.as_mut() {
                                lv.aim(m.column, m.row, frame.width, frame.height);
                            }
                        }
                        _ => {}
                    },
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }

                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => running = false,
                            KeyCode::Char('p') => {
                                paused = !paused;
                                if paused {
                                    pause_time = Some(Instant::now());
                                } else if let Some(pt) = pause_time.take() {
                                    let gap = Instant::now().saturating_duration_since(pt);
                                    throttle.defer(gap);
                                }
                            }
                            KeyCode::Char(' ') => {
                                storm.resize(frame.width, frame.height);
                            }
                            KeyCode::Up => throttle.nudge(true),
                            KeyCode::Down => throttle.nudge(false),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            storm.resize(nw, nh);
            frame = Frame::new(nw, nh, storm.palette.bg);
        }

        let now = Instant::now();
        let dt = now.saturating_duration_since(last_tick).as_secs_f32().min(0.05);
        last_tick = now;

        if !paused {
            throttle.update(now, dt);

            let work_start = Instant::now();
            frame.clear();
            storm.rain(&mut frame, dt, throttle.current);
            if let Some(lv) = lever.as_mut() {
                lv.update(dt);
                lv.draw(&mut frame, storm.palette.colors.last().copied(), storm.palette.bg);
            }
            term.draw(&frame)?;
            let work_s = work_start.elapsed().as_secs_f32();

            if args.perf_stats {
                perf_frames = perf_frames.saturating_add(1);
                perf_work_sum_s += work_s as f64;
                perf_work_max_s = perf_work_max_s.max(work_s);
            }
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    if args.perf_stats {
        drop(term);
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", perf_frames as f64 / elapsed_s);
        println!("  frames: {}", perf_frames);
        println!(
            "  avg_work_ms: {:.3}",
            perf_work_sum_s / frames as f64 * 1000.0
        );
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
    }

    Ok(())
}
