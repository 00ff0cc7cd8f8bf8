//! Procedurally generated rooms joined through their exits, viewed either from
//! above or through a grid ray caster.

pub mod camera;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod player;
pub mod ray;
pub mod renderer;
pub mod rooms;
pub mod scaler;
pub mod world;

pub use config::{Args, Config};
pub use error::SetupError;
pub use world::{StepOutcome, ViewMode, World};
