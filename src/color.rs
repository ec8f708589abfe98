use rand::Rng;

use crate::types::Rgb;

/// Scale applied to freshly generated pointer colors so splats tint the
/// field without saturating it.
pub const COLOR_DAMPING: f32 = 0.15;

/// Sector-based HSV to RGB conversion. `h` wraps, `s` and `v` are in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let scaled = h * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match (sector as i64).rem_euclid(6) {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}

/// Random fully saturated hue, damped by [`COLOR_DAMPING`].
pub fn generate_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let hue: f32 = rng.gen();
    hsv_to_rgb(hue, 1.0, 1.0).scaled(COLOR_DAMPING)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn sector_boundaries_select_expected_permutation() {
        // At each boundary f = 0, so t = v(1 - s) = p and q = v.
        let (v, s) = (0.8, 0.5);
        let p = v * (1.0 - s);
        let expected = [
            Rgb::new(v, p, p),
            Rgb::new(v, v, p),
            Rgb::new(p, v, p),
            Rgb::new(p, v, v),
            Rgb::new(p, p, v),
            Rgb::new(v, p, v),
        ];

        for (sector, want) in expected.iter().enumerate() {
            let got = hsv_to_rgb(sector as f32 / 6.0, s, v);
            assert!(
                (got.r - want.r).abs() < 1e-5
                    && (got.g - want.g).abs() < 1e-5
                    && (got.b - want.b).abs() < 1e-5,
                "sector {sector}: got {got:?}, want {want:?}"
            );
        }
    }

    #[test]
    fn mid_sector_uses_fractional_terms() {
        // h = 1/12 sits halfway through sector 0: (v, t, p) with f = 0.5
        let c = hsv_to_rgb(1.0 / 12.0, 1.0, 1.0);
        assert!((c.r - 1.0).abs() < 1e-5);
        assert!((c.g - 0.5).abs() < 1e-5);
        assert!(c.b.abs() < 1e-5);
    }

    #[test]
    fn generated_colors_are_damped() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let c = generate_color(&mut rng);
            let max = c.r.max(c.g).max(c.b);
            assert!((max - COLOR_DAMPING).abs() < 1e-5, "{c:?}");
            assert!(c.r >= 0.0 && c.g >= 0.0 && c.b >= 0.0);
        }
    }
}
