//! Tunables. The constants are the defaults; [`Args`] lets any of them be
//! overridden from the command line.

use std::f64::consts::PI;

use clap::Parser;

use crate::generator::MIN_ROOM_SIZE;
use crate::player::PlayerSettings;
use crate::rooms::RoomLimits;
use crate::scaler::Filter;
use crate::world::ViewMode;

pub const MAX_ROOM_WIDTH: i32 = 20;
pub const MAX_ROOM_HEIGHT: i32 = 20;
/// Edge of one grid cell, in pixels.
pub const WALL_SIZE: f64 = 50.0;
/// Grid-line crossings each ray search may attempt.
pub const MAX_RAY_STEPS: u32 = 8;
pub const CAMERA_PLANE_WIDTH: f64 = 30.0;
pub const CAMERA_PLANE_DISTANCE: f64 = 20.0;
pub const PLAYER_SPEED: f64 = 120.0;
pub const TURN_SPEED: f64 = PI;
pub const TARGET_FPS: u32 = 60;
pub const PIXEL_SCALE: u32 = 1;
pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

/// Procedurally generated rooms, seen through a grid ray caster
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "room_caster", version, about, long_about = None)]
pub struct Args {
    /// Seed for room generation (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Largest room width, in cells
    #[arg(long, allow_negative_numbers = true)]
    pub max_width: Option<i32>,

    /// Largest room height, in cells
    #[arg(long, allow_negative_numbers = true)]
    pub max_height: Option<i32>,

    /// Edge of one grid cell, in pixels
    #[arg(long, allow_negative_numbers = true)]
    pub wall_size: Option<f64>,

    /// Grid-line crossings per ray search
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Frame rate cap
    #[arg(long)]
    pub fps: Option<u32>,

    /// Window pixels per rendered pixel
    #[arg(long)]
    pub pixel_scale: Option<u32>,

    /// Bilinear upscaling instead of hard pixel edges
    #[arg(long)]
    pub smooth: bool,

    /// Start in the first-person view rather than top-down
    #[arg(long)]
    pub first_person: bool,

    /// Additional logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved settings. Out-of-range values are clamped rather than rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub seed: u64,
    pub limits: RoomLimits,
    pub wall_size: f64,
    pub max_steps: u32,
    pub player: PlayerSettings,
    pub fps: u32,
    pub pixel_scale: u32,
    pub filter: Filter,
    pub view: ViewMode,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            seed: args.seed.unwrap_or_else(rand::random),
            limits: RoomLimits {
                max_width: args.max_width.unwrap_or(MAX_ROOM_WIDTH).max(MIN_ROOM_SIZE),
                max_height: args.max_height.unwrap_or(MAX_ROOM_HEIGHT).max(MIN_ROOM_SIZE),
            },
            wall_size: args
                .wall_size
                .filter(|size| size.is_finite())
                .unwrap_or(WALL_SIZE)
                .max(1.0),
            max_steps: args.max_steps.unwrap_or(MAX_RAY_STEPS).max(1),
            player: PlayerSettings {
                plane_width: CAMERA_PLANE_WIDTH,
                plane_distance: CAMERA_PLANE_DISTANCE,
                speed: PLAYER_SPEED,
                turn_speed: TURN_SPEED,
            },
            fps: args.fps.unwrap_or(TARGET_FPS).max(1),
            pixel_scale: args.pixel_scale.unwrap_or(PIXEL_SCALE).max(1),
            filter: if args.smooth {
                Filter::Bilinear
            } else {
                Filter::Nearest
            },
            view: if args.first_person {
                ViewMode::FirstPerson
            } else {
                ViewMode::TopDown
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_args(&Args::default())
    }
}
