// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  pluvio --fps 60 --count 1224 --idle-speed 2 --hyper-max 30 --accel 40 --hold-ms 500 --scroll-step 0.5 --smoothing 10 --jitter 0.01 --color rain";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        let (head, rest) = DEFAULT_PARAMS_USAGE
            .split_once('\n')
            .unwrap_or((DEFAULT_PARAMS_USAGE, ""));
        format!("\x1b[1;36m{}\x1b[0m\n{}", head, rest)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pluvio", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "no-lever",
        help_heading = "GENERAL",
        help = "Disable the pointer-tilt lever overlay"
    )]
    pub no_lever: bool,

    #[arg(
        long = "transparent",
        help_heading = "APPEARANCE",
        help = "Keep the terminal's own background instead of black"
    )]
    pub transparent: bool,

    #[arg(
        short = 'n',
        long = "count",
        default_value_t = 1224,
        help_heading = "MOTION",
        help = "Number of raindrops (min 0 max 200000)"
    )]
    pub count: u32,

    #[arg(
        long = "idle-speed",
        default_value_t = 2.0,
        help_heading = "MOTION",
        help = "Resting fall speed (min 0.001 max 1000)"
    )]
    pub idle_speed: f32,

    #[arg(
        long = "hyper-max",
        default_value_t = 30.0,
        help_heading = "MOTION",
        help = "Speed ceiling for hold and scroll (min: idle speed, max 1000)"
    )]
    pub hyper_max: f32,

    #[arg(
        long = "accel",
        default_value_t = 40.0,
        help_heading = "MOTION",
        help = "Hold ramp acceleration per second (min 0 max 10000)"
    )]
    pub accel: f32,

    #[arg(
        long = "hold-ms",
        default_value_t = 500,
        help_heading = "MOTION",
        help = "Milliseconds a press must last before the ramp starts (max 60000)"
    )]
    pub hold_ms: u64,

    #[arg(
        long = "scroll-step",
        default_value_t = 0.5,
        help_heading = "MOTION",
        help = "Speed change per wheel notch (min 0 max 100)"
    )]
    pub scroll_step: f32,

    #[arg(
        long = "smoothing",
        default_value_t = 10.0,
        help_heading = "MOTION",
        help = "Exponential smoothing rate toward the target speed (min 0.01 max 1000)"
    )]
    pub smoothing: f32,

    #[arg(
        long = "jitter",
        default_value_t = 0.01,
        help_heading = "MOTION",
        help = "Cosmetic per-drop drift magnitude (min 0 max 10)"
    )]
    pub jitter: f32,

    #[arg(
        long = "seed",
        default_value_t = 7,
        help_heading = "MOTION",
        help = "Seed for drop placement and drift noise"
    )]
    pub seed: u64,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "rain",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,8,24). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR THEMES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --color.\x1b[0m");
    } else {
        println!("AVAILABLE COLOR THEMES:");
        println!("NOTE: Use only the VALUE (left side) with --color.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("rain         Cold blue-gray rainfall (default)");
    println!("storm        Darker slate storm front");
    println!("neon         Electric blue downpour");
    println!("ember        Warm sparks instead of water");
    println!("mist         Soft low-contrast gray");
    println!("mono         Terminal foreground only (alias: white)");
}
