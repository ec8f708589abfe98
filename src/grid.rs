use std::ops::{Add, Mul};

use glam::Vec2;
use rayon::prelude::*;

/// Cell-centred 2D grid addressed in texture space.
///
/// Row 0 is the bottom of the surface (`uv.y` near 0), matching texture
/// coordinates where y grows upwards.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[self.idx(x, y)]
    }

    /// Cell lookup with coordinates clamped to the edge.
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.get(x, y)
    }

    /// Texture coordinate of the centre of cell `(x, y)`.
    pub fn uv(&self, x: usize, y: usize) -> Vec2 {
        cell_uv(x, y, self.dimensions())
    }
}

impl<T: Copy + Send> Grid<T> {
    /// Writes `f(x, y)` into every cell, one row per rayon task.
    pub fn par_fill<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        let width = self.width;
        self.cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = f(x, y);
                }
            });
    }
}

impl<T> Grid<T>
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    /// Bilinear sample with clamp-to-edge addressing.
    pub fn sample(&self, uv: Vec2) -> T {
        let fx = uv.x * self.width as f32 - 0.5;
        let fy = uv.y * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let bottom = self.get_clamped(x0, y0) * (1.0 - tx) + self.get_clamped(x0 + 1, y0) * tx;
        let top =
            self.get_clamped(x0, y0 + 1) * (1.0 - tx) + self.get_clamped(x0 + 1, y0 + 1) * tx;
        bottom * (1.0 - ty) + top * ty
    }

    /// Same field content at a new resolution.
    pub fn resampled(&self, width: usize, height: usize) -> Self {
        let mut out = Grid::new(width, height, self.cells[0]);
        for y in 0..out.height {
            for x in 0..out.width {
                let uv = out.uv(x, y);
                let idx = out.idx(x, y);
                out.cells[idx] = self.sample(uv);
            }
        }
        out
    }
}

/// Texture coordinate of the centre of cell `(x, y)` in a grid of the given
/// dimensions.
pub fn cell_uv(x: usize, y: usize, [width, height]: [usize; 2]) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}

/// Grid dimensions for a base `resolution` on a surface with the given
/// aspect ratio: the short side gets `resolution`, the long side is
/// stretched by the aspect ratio and follows the surface's longer axis.
pub fn grid_resolution(resolution: u32, aspect_ratio: f32) -> [usize; 2] {
    let aspect = if aspect_ratio < 1.0 {
        1.0 / aspect_ratio
    } else {
        aspect_ratio
    };
    let min = resolution as f32;
    let max = (resolution as f32 * aspect).round();

    if aspect_ratio > 1.0 {
        [max as usize, min as usize]
    } else {
        [min as usize, max as usize]
    }
}
