//! Display pipeline: shading, bloom and sunrays over the dye field, blended
//! onto the background into an RGBA8 frame.

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::grid::{cell_uv, grid_resolution, Grid};
use crate::types::SimulationConfig;

const SUNRAYS_TAPS: usize = 16;
const SUNRAYS_DENSITY: f32 = 0.3;
const SUNRAYS_DECAY: f32 = 0.95;
const SUNRAYS_EXPOSURE: f32 = 0.7;

/// Composited output, `width * height` RGBA8 pixels, top row first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl Frame {
    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}

pub fn composite(dye: &Grid<Vec3>, config: &SimulationConfig) -> Frame {
    let [width, height] = dye.dimensions();
    let aspect = width as f32 / height as f32;

    let bloom = config.bloom.then(|| bloom(dye, config, aspect));
    let sunrays = config.sunrays.then(|| sunrays(dye, config, aspect));
    let back = config.back_color.to_vec3();

    let mut rgba = vec![0u8; width * height * 4];
    rgba.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, out)| {
            // frame rows run top-down, grid rows bottom-up
            let y = height - 1 - row;
            for x in 0..width {
                let uv = dye.uv(x, y);
                let mut c = dye.get(x, y);

                if config.shading {
                    c *= diffuse(dye, x, y);
                }

                let mut glow = bloom.as_ref().map(|b| b.sample(uv));
                if let Some(rays) = &sunrays {
                    let r = rays.sample(uv);
                    c *= r;
                    glow = glow.map(|g| g * r);
                }
                if let Some(g) = glow {
                    c += linear_to_gamma(g);
                }

                let a = c.max_element().clamp(0.0, 1.0);
                let pixel = if config.transparent {
                    let straight = if a > 0.0 { c / a } else { Vec3::ZERO };
                    to_rgba8(straight, a)
                } else {
                    to_rgba8(c + back * (1.0 - a), 1.0)
                };
                out[x * 4..x * 4 + 4].copy_from_slice(&pixel);
            }
        });

    Frame {
        width,
        height,
        rgba,
    }
}

/// Lambert term of a height map built from dye brightness.
fn diffuse(dye: &Grid<Vec3>, x: usize, y: usize) -> f32 {
    let (xi, yi) = (x as isize, y as isize);
    let left = dye.get_clamped(xi - 1, yi).length();
    let right = dye.get_clamped(xi + 1, yi).length();
    let top = dye.get_clamped(xi, yi + 1).length();
    let bottom = dye.get_clamped(xi, yi - 1).length();

    let normal =
        Vec3::new(right - left, top - bottom, dye.texel_size().length()).normalize_or_zero();
    (normal.z + 0.7).clamp(0.7, 1.0)
}

fn bloom(dye: &Grid<Vec3>, config: &SimulationConfig, aspect: f32) -> Grid<Vec3> {
    let [w, h] = grid_resolution(config.bloom_resolution, aspect);
    let threshold = config.bloom_threshold;
    let knee = threshold * config.bloom_soft_knee + 1.0e-4;
    let curve = Vec3::new(threshold - knee, knee * 2.0, 0.25 / knee);

    let mut base = Grid::new(w, h, Vec3::ZERO);
    base.par_fill(|x, y| {
        let c = dye.sample(cell_uv(x, y, [w, h]));
        let br = c.max_element();
        let rq = (br - curve.x).clamp(0.0, curve.y);
        let rq = curve.z * rq * rq;
        c * (rq.max(br - threshold) / br.max(1.0e-4))
    });

    let mut chain = vec![base];
    for _ in 0..config.bloom_iterations {
        let Some(last) = chain.last() else { break };
        if last.width() < 4 || last.height() < 4 {
            break;
        }
        let next = downsample(last);
        chain.push(next);
    }

    for level in (1..chain.len()).rev() {
        let (fine, coarse) = chain.split_at_mut(level);
        let coarse = &coarse[0];
        let fine = &mut fine[level - 1];
        let [fw, fh] = fine.dimensions();
        for y in 0..fh {
            for x in 0..fw {
                let uv = cell_uv(x, y, [fw, fh]);
                let idx = fine.idx(x, y);
                fine.cells_mut()[idx] += coarse.sample(uv);
            }
        }
    }

    let mut out = chain.swap_remove(0);
    for c in out.cells_mut() {
        *c *= config.bloom_intensity;
    }
    out
}

/// 2x box downsample.
fn downsample(fine: &Grid<Vec3>) -> Grid<Vec3> {
    let mut coarse = Grid::new(fine.width() / 2, fine.height() / 2, Vec3::ZERO);
    coarse.par_fill(|x, y| {
        let (x, y) = (2 * x as isize, 2 * y as isize);
        (fine.get_clamped(x, y)
            + fine.get_clamped(x + 1, y)
            + fine.get_clamped(x, y + 1)
            + fine.get_clamped(x + 1, y + 1))
            * 0.25
    });
    coarse
}

/// Radial blur of the inverse dye mask toward the centre of the surface.
fn sunrays(dye: &Grid<Vec3>, config: &SimulationConfig, aspect: f32) -> Grid<f32> {
    let [w, h] = grid_resolution(config.sunrays_resolution, aspect);

    let mut mask = Grid::new(w, h, 0.0f32);
    mask.par_fill(|x, y| {
        let br = dye.sample(cell_uv(x, y, [w, h])).max_element();
        1.0 - (br * 20.0).clamp(0.0, 0.8)
    });

    let weight = config.sunrays_weight;
    let mut rays = Grid::new(w, h, 0.0f32);
    rays.par_fill(|x, y| {
        let uv = cell_uv(x, y, [w, h]);
        let step = (uv - Vec2::splat(0.5)) * (SUNRAYS_DENSITY / SUNRAYS_TAPS as f32);
        let mut coord = uv;
        let mut illumination = 1.0;
        let mut color = mask.sample(uv);
        for _ in 0..SUNRAYS_TAPS {
            coord -= step;
            color += mask.sample(coord) * illumination * weight;
            illumination *= SUNRAYS_DECAY;
        }
        color * SUNRAYS_EXPOSURE
    });
    rays
}

fn linear_to_gamma(c: Vec3) -> Vec3 {
    let c = c.max(Vec3::ZERO);
    (1.055 * c.powf(0.416_666_67) - Vec3::splat(0.055)).max(Vec3::ZERO)
}

fn to_rgba8(c: Vec3, a: f32) -> [u8; 4] {
    let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, (a.clamp(0.0, 1.0) * 255.0) as u8]
}
