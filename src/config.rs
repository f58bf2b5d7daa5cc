use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{error::ConfigError, types::Rect};

pub const FRAME_HZ: f32 = 60.0;

pub const PUSH_SPEED: f32 = 3.0;
pub const SCATTER_RADIUS: f32 = 100.0;
pub const DAMPING: f32 = 0.1;

/// Pusher perimeter must exceed the recipient's by more than this ratio,
/// kept as numerator/denominator so the boundary compares exactly.
pub const BULLY_RATIO: (u32, u32) = (13, 10);
pub const BULLY_MULTIPLIER: f32 = 3.0;

pub const CLAMP_STEP_LEFT: f32 = 10.0;
pub const CLAMP_STEP_TOP: f32 = 10.0;
pub const CLAMP_STEP_RIGHT: f32 = 10.0;
pub const CLAMP_STEP_BOTTOM: f32 = 5.0;

pub const RAISE_BELOW_PX: u32 = 65;
pub const RAISED_LAYER: u8 = 20;

pub const BUBBLE_IN: bool = true;
pub const BUBBLE_DELAY_MS: u64 = 60;
pub const BUBBLE_INITIAL: usize = 4;

pub const CELL_PX_W: u32 = 8;
pub const CELL_PX_H: u32 = 16;

pub const HEADLESS_FRAMES: u32 = 600;
pub const HEADLESS_WIDTH: f32 = 800.0;
pub const HEADLESS_HEIGHT: f32 = 600.0;

pub const DEFAULT_LABELS: [&str; 14] = [
    "toybox",
    "a",
    "overlap",
    "push",
    "rectangles",
    "bubble in",
    "clamp",
    "frame",
    "resolution loop",
    "ok",
    "surface",
    "container",
    "hi",
    "convergence heuristic",
];

/// Per-edge inward nudge applied when a body crosses the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampSteps {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for ClampSteps {
    fn default() -> Self {
        Self {
            left: CLAMP_STEP_LEFT,
            top: CLAMP_STEP_TOP,
            right: CLAMP_STEP_RIGHT,
            bottom: CLAMP_STEP_BOTTOM,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub push_speed: f32,
    pub scatter_radius: f32,
    pub damping: f32,
    pub bully_ratio: (u32, u32),
    pub bully_multiplier: f32,
    pub clamp: ClampSteps,
    pub raise_below_px: u32,
    pub bubble_in: bool,
    pub bubble_delay: Duration,
    pub bubble_initial: usize,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            push_speed: PUSH_SPEED,
            scatter_radius: SCATTER_RADIUS,
            damping: DAMPING,
            bully_ratio: BULLY_RATIO,
            bully_multiplier: BULLY_MULTIPLIER,
            clamp: ClampSteps::default(),
            raise_below_px: RAISE_BELOW_PX,
            bubble_in: BUBBLE_IN,
            bubble_delay: Duration::from_millis(BUBBLE_DELAY_MS),
            bubble_initial: BUBBLE_INITIAL,
            seed: None,
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        non_negative("push_speed", self.push_speed)?;
        non_negative("scatter_radius", self.scatter_radius)?;
        non_negative("bully_multiplier", self.bully_multiplier)?;
        non_negative("clamp.left", self.clamp.left)?;
        non_negative("clamp.top", self.clamp.top)?;
        non_negative("clamp.right", self.clamp.right)?;
        non_negative("clamp.bottom", self.clamp.bottom)?;
        if self.bully_ratio.1 == 0 {
            return Err(ConfigError::ZeroRatioDenominator);
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::DampingOutOfRange(self.damping));
        }
        Ok(self)
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

/// Rectangles that shove each other apart until nothing overlaps.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base displacement per collision, in pixels
    #[arg(long, default_value_t = PUSH_SPEED)]
    pub push_speed: f32,
    /// Max random offset from the container center at spawn, in pixels
    #[arg(long, default_value_t = SCATTER_RADIUS)]
    pub scatter_radius: f32,
    /// Fraction of the remaining distance the smoothed position covers per update
    #[arg(long, default_value_t = DAMPING)]
    pub damping: f32,
    /// Seed for the shuffle and spawn scatter
    #[arg(long)]
    pub seed: Option<u64>,
    /// Show every box at once instead of revealing them one by one
    #[arg(long)]
    pub no_bubble_in: bool,
    /// Milliseconds between revealed boxes
    #[arg(long, default_value_t = BUBBLE_DELAY_MS)]
    pub bubble_delay_ms: u64,
    /// Run without a terminal UI and print the final layout
    #[arg(long)]
    pub headless: bool,
    /// Number of frames to simulate in headless mode
    #[arg(long, default_value_t = HEADLESS_FRAMES)]
    pub frames: u32,
    /// Headless container width in pixels
    #[arg(long, default_value_t = HEADLESS_WIDTH)]
    pub width: f32,
    /// Headless container height in pixels
    #[arg(long, default_value_t = HEADLESS_HEIGHT)]
    pub height: f32,
    /// Write log output to this file (terminal mode logs nowhere otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Box labels; a built-in set is used when none are given
    pub labels: Vec<String>,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        Settings {
            push_speed: self.push_speed,
            scatter_radius: self.scatter_radius,
            damping: self.damping,
            bubble_in: !self.no_bubble_in,
            bubble_delay: Duration::from_millis(self.bubble_delay_ms),
            seed: self.seed,
            ..Settings::default()
        }
        .validate()
    }

    /// Fixed container for headless runs.
    pub fn container(&self) -> Result<Rect, ConfigError> {
        non_negative("width", self.width)?;
        non_negative("height", self.height)?;
        Ok(Rect::from_size(self.width, self.height))
    }

    pub fn labels(&self) -> Vec<String> {
        if self.labels.is_empty() {
            DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()
        } else {
            self.labels.clone()
        }
    }
}
