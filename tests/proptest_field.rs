//! Property-based tests for color generation, pointer mapping and the fluid
//! field using proptest
//!
//! - HSV conversion stays inside the unit cube
//! - Surface coordinates map into texture space
//! - Random splat sequences never produce NaN and dye never goes negative

use fluid_backdrop::color::hsv_to_rgb;
use fluid_backdrop::fluid_field::FluidField;
use fluid_backdrop::{Rgb, SimulationConfig, Splat, SurfaceSize};
use glam::Vec2;
use proptest::prelude::*;

const SIM_SIDE: usize = 12;
const DYE_SIDE: usize = 24;
const DT: f32 = 1.0 / 60.0;
const SIMULATION_STEPS: usize = 6;

fn small_config() -> SimulationConfig {
    SimulationConfig {
        pressure_iterations: 8,
        ..SimulationConfig::default()
    }
}

fn splat_strategy() -> impl Strategy<Value = Splat> {
    (
        0.0f32..1.0,
        0.0f32..1.0,
        -3000.0f32..3000.0,
        -3000.0f32..3000.0,
        0.0f32..0.15,
        0.0f32..0.15,
        0.0f32..0.15,
        0.0005f32..0.01,
    )
        .prop_map(|(x, y, fx, fy, r, g, b, radius)| Splat {
            position: Vec2::new(x, y),
            force: Vec2::new(fx, fy),
            color: Rgb::new(r, g, b),
            radius,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every hue at full saturation and value lands inside [0, 1].
    #[test]
    fn hsv_channels_stay_in_unit_range(h in 0.0f32..1.0) {
        let rgb = hsv_to_rgb(h, 1.0, 1.0);
        for channel in [rgb.r, rgb.g, rgb.b] {
            prop_assert!((0.0..=1.0).contains(&channel), "h={h} -> {rgb:?}");
        }
        // a saturated color always has one full channel
        prop_assert!((rgb.r.max(rgb.g).max(rgb.b) - 1.0).abs() < 1e-5);
    }

    /// Positions inside the surface map into texture space with y up.
    #[test]
    fn texcoords_stay_in_texture_space(
        width in 1u32..4000,
        height in 1u32..4000,
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
    ) {
        let surface = SurfaceSize::new(width, height);
        let uv = surface.texcoord(fx * width as f32, fy * height as f32);

        prop_assert!((0.0..=1.0).contains(&uv.x));
        prop_assert!((0.0..=1.0).contains(&uv.y));
        prop_assert!((uv.y - (1.0 - fy)).abs() < 1e-4);
    }

    /// Arbitrary splat sequences keep the field finite and the dye
    /// non-negative.
    #[test]
    fn random_splats_keep_field_finite(
        splats in prop::collection::vec(splat_strategy(), 1..6),
        aspect in 0.5f32..2.0,
    ) {
        let mut field = FluidField::new([SIM_SIDE, SIM_SIDE], [DYE_SIDE, DYE_SIDE], aspect);
        let config = small_config();

        for splat in &splats {
            field.splat(splat);
        }
        for _ in 0..SIMULATION_STEPS {
            field.step(&config, DT);
        }

        for v in field.velocity().cells() {
            prop_assert!(v.is_finite(), "velocity {v:?}");
        }
        for c in field.dye().cells() {
            prop_assert!(c.is_finite(), "dye {c:?}");
            prop_assert!(c.min_element() >= 0.0, "dye {c:?}");
        }
    }
}
