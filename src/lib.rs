//! Pointer-driven fluid backdrop: a stable-fluids dye field stirred by
//! pointer splats and composited behind application content.

pub mod app;
pub mod color;
pub mod error;
pub mod fluid_field;
pub mod grid;
pub mod host;
pub mod layering;
pub mod pointer;
pub mod post;
pub mod simulator;
pub mod types;
pub mod viewer;

pub use error::{ConfigError, MountError};
pub use host::{GraphicsCapability, HostEvent, ListenerId, SurfaceHost};
pub use layering::SurfaceLayer;
pub use pointer::{Pointer, Splat, SurfaceSize, PRIMARY_POINTER_ID};
pub use simulator::FluidSimulator;
pub use types::{Rgb, SimulationConfig};
