use std::ops::{Add, Mul};

use glam::{Vec2, Vec3};

use crate::grid::Grid;
use crate::pointer::Splat;
use crate::types::SimulationConfig;

/// Dissipation factors are per frame at this rate.
const REFERENCE_FRAME_RATE: f32 = 60.0;
/// Splat weights below `exp(-SPLAT_CUTOFF)` are skipped.
const SPLAT_CUTOFF: f32 = 9.21;
const VELOCITY_LIMIT: f32 = 1000.0;

/// Stable-fluids velocity field on a coarse grid carrying a finer dye field.
///
/// Velocity is stored in simulation texels per second; the dye grid covers
/// the same texture space at its own resolution.
pub struct FluidField {
    velocity: Grid<Vec2>,
    next_velocity: Grid<Vec2>,
    curl: Grid<f32>,
    divergence: Grid<f32>,
    pressure: Grid<f32>,
    next_pressure: Grid<f32>,
    dye: Grid<Vec3>,
    next_dye: Grid<Vec3>,
    aspect_ratio: f32,
    time: f32,
}

impl FluidField {
    pub fn new(sim: [usize; 2], dye: [usize; 2], aspect_ratio: f32) -> Self {
        let [sw, sh] = sim;
        let [dw, dh] = dye;
        Self {
            velocity: Grid::new(sw, sh, Vec2::ZERO),
            next_velocity: Grid::new(sw, sh, Vec2::ZERO),
            curl: Grid::new(sw, sh, 0.0),
            divergence: Grid::new(sw, sh, 0.0),
            pressure: Grid::new(sw, sh, 0.0),
            next_pressure: Grid::new(sw, sh, 0.0),
            dye: Grid::new(dw, dh, Vec3::ZERO),
            next_dye: Grid::new(dw, dh, Vec3::ZERO),
            aspect_ratio,
            time: 0.0,
        }
    }

    pub fn sim_dimensions(&self) -> [usize; 2] {
        self.velocity.dimensions()
    }

    pub fn dye_dimensions(&self) -> [usize; 2] {
        self.dye.dimensions()
    }

    pub fn velocity(&self) -> &Grid<Vec2> {
        &self.velocity
    }

    pub fn dye(&self) -> &Grid<Vec3> {
        &self.dye
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Sum of all dye channels, a rough measure of how much color is left.
    pub fn total_dye(&self) -> f32 {
        self.dye.cells().iter().map(|c| c.x + c.y + c.z).sum()
    }

    /// Mean absolute divergence of the current velocity field.
    pub fn mean_divergence(&self) -> f32 {
        let [w, h] = self.velocity.dimensions();
        let mut total = 0.0;
        for y in 0..h {
            for x in 0..w {
                total += divergence_at(&self.velocity, x, y).abs();
            }
        }
        total / (w * h) as f32
    }

    /// Rebuilds the grids at new resolutions, resampling velocity and dye.
    pub fn resize(&mut self, sim: [usize; 2], dye: [usize; 2], aspect_ratio: f32) {
        let [sw, sh] = sim;
        let [dw, dh] = dye;
        self.aspect_ratio = aspect_ratio;

        if self.velocity.dimensions() != sim {
            self.velocity = self.velocity.resampled(sw, sh);
            self.next_velocity = Grid::new(sw, sh, Vec2::ZERO);
            self.curl = Grid::new(sw, sh, 0.0);
            self.divergence = Grid::new(sw, sh, 0.0);
            self.pressure = Grid::new(sw, sh, 0.0);
            self.next_pressure = Grid::new(sw, sh, 0.0);
        }

        if self.dye.dimensions() != dye {
            self.dye = self.dye.resampled(dw, dh);
            self.next_dye = Grid::new(dw, dh, Vec3::ZERO);
        }
    }

    pub fn splat(&mut self, splat: &Splat) {
        if !(splat.radius > 0.0) {
            return;
        }
        deposit(&mut self.velocity, splat, self.aspect_ratio, splat.force);
        deposit(&mut self.dye, splat, self.aspect_ratio, splat.color.to_vec3());
    }

    pub fn step(&mut self, config: &SimulationConfig, dt: f32) {
        self.compute_curl();
        self.apply_vorticity(config.curl, dt);
        self.compute_divergence();
        self.project(config.pressure, config.pressure_iterations);
        self.advect_velocity(dt, config.velocity_dissipation);
        self.advect_dye(dt, config.density_dissipation);
        self.time += dt;
    }

    fn compute_curl(&mut self) {
        let velocity = &self.velocity;
        self.curl.par_fill(|x, y| {
            let (x, y) = (x as isize, y as isize);
            let left = velocity.get_clamped(x - 1, y).y;
            let right = velocity.get_clamped(x + 1, y).y;
            let top = velocity.get_clamped(x, y + 1).x;
            let bottom = velocity.get_clamped(x, y - 1).x;
            0.5 * (right - left - top + bottom)
        });
    }

    fn apply_vorticity(&mut self, strength: f32, dt: f32) {
        if strength == 0.0 {
            return;
        }
        let curl = &self.curl;
        let velocity = &self.velocity;
        self.next_velocity.par_fill(|x, y| {
            let (xi, yi) = (x as isize, y as isize);
            let left = curl.get_clamped(xi - 1, yi).abs();
            let right = curl.get_clamped(xi + 1, yi).abs();
            let top = curl.get_clamped(xi, yi + 1).abs();
            let bottom = curl.get_clamped(xi, yi - 1).abs();
            let centre = curl.get(x, y);

            let mut force = 0.5 * Vec2::new(top - bottom, right - left);
            force /= force.length() + 1.0e-4;
            force *= strength * centre;
            force.y = -force.y;

            (velocity.get(x, y) + force * dt).clamp(
                Vec2::splat(-VELOCITY_LIMIT),
                Vec2::splat(VELOCITY_LIMIT),
            )
        });
        std::mem::swap(&mut self.velocity, &mut self.next_velocity);
    }

    fn compute_divergence(&mut self) {
        let velocity = &self.velocity;
        self.divergence.par_fill(|x, y| divergence_at(velocity, x, y));
    }

    /// Pressure solve by Jacobi relaxation, then removes the pressure
    /// gradient from the velocity.
    fn project(&mut self, retention: f32, iterations: u32) {
        for p in self.pressure.cells_mut() {
            *p *= retention;
        }

        for _ in 0..iterations {
            let pressure = &self.pressure;
            let divergence = &self.divergence;
            self.next_pressure.par_fill(|x, y| {
                let (xi, yi) = (x as isize, y as isize);
                let sum = pressure.get_clamped(xi - 1, yi)
                    + pressure.get_clamped(xi + 1, yi)
                    + pressure.get_clamped(xi, yi - 1)
                    + pressure.get_clamped(xi, yi + 1);
                (sum - divergence.get(x, y)) * 0.25
            });
            std::mem::swap(&mut self.pressure, &mut self.next_pressure);
        }

        let pressure = &self.pressure;
        let velocity = &self.velocity;
        self.next_velocity.par_fill(|x, y| {
            let (xi, yi) = (x as isize, y as isize);
            let gradient = 0.5
                * Vec2::new(
                    pressure.get_clamped(xi + 1, yi) - pressure.get_clamped(xi - 1, yi),
                    pressure.get_clamped(xi, yi + 1) - pressure.get_clamped(xi, yi - 1),
                );
            velocity.get(x, y) - gradient
        });
        std::mem::swap(&mut self.velocity, &mut self.next_velocity);
    }

    fn advect_velocity(&mut self, dt: f32, dissipation: f32) {
        let decay = frame_decay(dissipation, dt);
        let velocity = &self.velocity;
        let texel = velocity.texel_size();
        self.next_velocity.par_fill(|x, y| {
            let coord = velocity.uv(x, y) - dt * velocity.get(x, y) * texel;
            velocity.sample(coord) * decay
        });
        std::mem::swap(&mut self.velocity, &mut self.next_velocity);
    }

    fn advect_dye(&mut self, dt: f32, dissipation: f32) {
        let decay = frame_decay(dissipation, dt);
        let velocity = &self.velocity;
        let texel = velocity.texel_size();
        let dye = &self.dye;
        self.next_dye.par_fill(|x, y| {
            let uv = dye.uv(x, y);
            let coord = uv - dt * velocity.sample(uv) * texel;
            dye.sample(coord) * decay
        });
        std::mem::swap(&mut self.dye, &mut self.next_dye);
    }
}

/// Multiplier for `dt` seconds of a per-frame dissipation factor.
fn frame_decay(dissipation: f32, dt: f32) -> f32 {
    dissipation.powf(dt * REFERENCE_FRAME_RATE)
}

/// Central-difference divergence; walls reflect the normal component.
fn divergence_at(velocity: &Grid<Vec2>, x: usize, y: usize) -> f32 {
    let [w, h] = velocity.dimensions();
    let centre = velocity.get(x, y);
    let (xi, yi) = (x as isize, y as isize);

    let left = if x == 0 {
        -centre.x
    } else {
        velocity.get_clamped(xi - 1, yi).x
    };
    let right = if x + 1 == w {
        -centre.x
    } else {
        velocity.get_clamped(xi + 1, yi).x
    };
    let bottom = if y == 0 {
        -centre.y
    } else {
        velocity.get_clamped(xi, yi - 1).y
    };
    let top = if y + 1 == h {
        -centre.y
    } else {
        velocity.get_clamped(xi, yi + 1).y
    };

    0.5 * (right - left + top - bottom)
}

/// Adds a gaussian blob of `value` around the splat position.
fn deposit<T>(grid: &mut Grid<T>, splat: &Splat, aspect_ratio: f32, value: T)
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let [w, h] = grid.dimensions();
    let reach = (splat.radius * SPLAT_CUTOFF).sqrt();
    let reach_x = reach / aspect_ratio;

    let span = |centre: f32, reach: f32, cells: usize| {
        let lo = ((centre - reach) * cells as f32).floor().max(0.0) as usize;
        let hi = ((centre + reach) * cells as f32).ceil().clamp(0.0, cells as f32) as usize;
        lo..hi
    };

    for y in span(splat.position.y, reach, h) {
        for x in span(splat.position.x, reach_x, w) {
            let mut p = grid.uv(x, y) - splat.position;
            p.x *= aspect_ratio;
            let weight = (-p.length_squared() / splat.radius).exp();
            let idx = grid.idx(x, y);
            let cell = &mut grid.cells_mut()[idx];
            *cell = *cell + value * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    fn small_field() -> FluidField {
        FluidField::new([32, 32], [64, 64], 1.0)
    }

    fn centre_splat(force: Vec2) -> Splat {
        Splat {
            position: Vec2::splat(0.5),
            force,
            color: Rgb::new(0.15, 0.0, 0.0),
            radius: 0.0025,
        }
    }

    #[test]
    fn empty_field_stays_empty() {
        let mut field = small_field();
        let config = SimulationConfig::default();
        for _ in 0..5 {
            field.step(&config, 1.0 / 60.0);
        }
        assert_eq!(field.total_dye(), 0.0);
        assert!(field.velocity().cells().iter().all(|v| *v == Vec2::ZERO));
    }

    #[test]
    fn splat_deposits_dye_at_its_position() {
        let mut field = small_field();
        field.splat(&centre_splat(Vec2::ZERO));

        let dye = field.dye();
        let centre = dye.sample(Vec2::splat(0.5));
        let corner = dye.get(0, 0);
        assert!(centre.x > 0.1, "centre dye {centre:?}");
        assert_eq!(corner, Vec3::ZERO);
    }

    #[test]
    fn zero_radius_splat_is_ignored() {
        let mut field = small_field();
        let mut splat = centre_splat(Vec2::new(50.0, 0.0));
        splat.radius = 0.0;
        field.splat(&splat);
        assert_eq!(field.total_dye(), 0.0);
    }

    #[test]
    fn dye_dissipates_over_time() {
        let mut field = small_field();
        let config = SimulationConfig::default();
        field.splat(&centre_splat(Vec2::ZERO));
        let before = field.total_dye();

        for _ in 0..30 {
            field.step(&config, 1.0 / 60.0);
        }

        let after = field.total_dye();
        assert!(after < before * 0.6, "before {before}, after {after}");
        assert!(after > 0.0);
    }

    #[test]
    fn projection_reduces_divergence() {
        let mut field = small_field();
        let mut splat = centre_splat(Vec2::new(60.0, 0.0));
        splat.radius = 0.01;
        field.splat(&splat);
        let before = field.mean_divergence();

        field.compute_divergence();
        field.project(0.0, 40);

        let after = field.mean_divergence();
        assert!(after < before * 0.5, "before {before}, after {after}");
    }

    #[test]
    fn splat_force_moves_dye_downstream() {
        let mut field = small_field();
        let config = SimulationConfig {
            curl: 0.0,
            ..SimulationConfig::default()
        };
        field.splat(&centre_splat(Vec2::new(120.0, 0.0)));

        for _ in 0..10 {
            field.step(&config, 1.0 / 60.0);
        }

        let dye = field.dye();
        let upstream = dye.sample(Vec2::new(0.4, 0.5)).x;
        let downstream = dye.sample(Vec2::new(0.6, 0.5)).x;
        assert!(downstream > upstream, "up {upstream}, down {downstream}");
    }

    #[test]
    fn resize_keeps_dye() {
        let mut field = small_field();
        field.splat(&centre_splat(Vec2::ZERO));
        field.resize([16, 16], [48, 48], 1.0);

        assert_eq!(field.dye_dimensions(), [48, 48]);
        assert!(field.dye().sample(Vec2::splat(0.5)).x > 0.05);
    }

    #[test]
    fn frame_decay_matches_factor_at_reference_rate() {
        assert!((frame_decay(0.97, 1.0 / 60.0) - 0.97).abs() < 1e-5);
    }
}
