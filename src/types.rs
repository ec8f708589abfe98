use glam::Vec3;

use crate::error::ConfigError;

/// Linear RGB triple, channels nominally in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub sim_resolution: u32,
    pub dye_resolution: u32,
    pub density_dissipation: f32,
    pub velocity_dissipation: f32,
    pub pressure: f32,
    pub pressure_iterations: u32,
    pub curl: f32,
    pub splat_radius: f32,
    pub splat_force: f32,
    pub shading: bool,
    pub colorful: bool,
    pub color_update_speed: f32,
    pub paused: bool,
    pub back_color: Rgb,
    pub transparent: bool,
    pub bloom: bool,
    pub bloom_iterations: u32,
    pub bloom_resolution: u32,
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub bloom_soft_knee: f32,
    pub sunrays: bool,
    pub sunrays_resolution: u32,
    pub sunrays_weight: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sim_resolution: 128,
            dye_resolution: 1024,
            density_dissipation: 0.97,
            velocity_dissipation: 0.98,
            pressure: 0.8,
            pressure_iterations: 20,
            curl: 30.0,
            splat_radius: 0.15,
            splat_force: 3000.0,
            shading: true,
            colorful: true,
            color_update_speed: 10.0,
            paused: false,
            back_color: Rgb::BLACK,
            transparent: false,
            bloom: true,
            bloom_iterations: 8,
            bloom_resolution: 256,
            bloom_intensity: 0.5,
            bloom_threshold: 0.6,
            bloom_soft_knee: 0.7,
            sunrays: true,
            sunrays_resolution: 196,
            sunrays_weight: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("sim_resolution", self.sim_resolution),
            ("dye_resolution", self.dye_resolution),
            ("pressure_iterations", self.pressure_iterations),
            ("bloom_iterations", self.bloom_iterations),
            ("bloom_resolution", self.bloom_resolution),
            ("sunrays_resolution", self.sunrays_resolution),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { name });
            }
        }

        for (name, value) in [
            ("density_dissipation", self.density_dissipation),
            ("velocity_dissipation", self.velocity_dissipation),
            ("pressure", self.pressure),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }

        for (name, value) in [
            ("curl", self.curl),
            ("splat_radius", self.splat_radius),
            ("splat_force", self.splat_force),
            ("color_update_speed", self.color_update_speed),
            ("bloom_intensity", self.bloom_intensity),
            ("bloom_threshold", self.bloom_threshold),
            ("bloom_soft_knee", self.bloom_soft_knee),
            ("sunrays_weight", self.sunrays_weight),
        ] {
            // NaN fails this comparison too
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        Ok(())
    }
}
