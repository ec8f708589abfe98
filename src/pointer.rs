use glam::Vec2;

use crate::types::Rgb;

/// Identity of the primary mouse pointer.
pub const PRIMARY_POINTER_ID: i64 = -1;

/// Rendering surface size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Pixel position (origin top-left) to texture coordinates (origin
    /// bottom-left).
    pub fn texcoord(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x / self.width as f32, 1.0 - y / self.height as f32)
    }

    /// Shrinks the delta along the shorter axis so splat direction looks the
    /// same whatever the surface proportions.
    pub fn correct_delta(&self, delta: Vec2) -> Vec2 {
        let aspect = self.aspect_ratio();
        let mut corrected = delta;
        if aspect < 1.0 {
            corrected.x *= aspect;
        }
        if aspect > 1.0 {
            corrected.y /= aspect;
        }
        corrected
    }
}

/// One active input contact.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    pub id: i64,
    pub texcoord: Vec2,
    pub prev_texcoord: Vec2,
    pub delta: Vec2,
    pub down: bool,
    pub moved: bool,
    pub color: Rgb,
}

impl Pointer {
    fn new(id: i64) -> Self {
        Self {
            id,
            texcoord: Vec2::ZERO,
            prev_texcoord: Vec2::ZERO,
            delta: Vec2::ZERO,
            down: false,
            moved: false,
            color: Rgb::BLACK,
        }
    }

    fn press(&mut self, texcoord: Vec2, color: Rgb) {
        self.down = true;
        self.moved = false;
        self.texcoord = texcoord;
        self.prev_texcoord = texcoord;
        self.delta = Vec2::ZERO;
        self.color = color;
    }

    fn move_to(&mut self, texcoord: Vec2, surface: SurfaceSize) {
        self.prev_texcoord = self.texcoord;
        self.texcoord = texcoord;
        self.delta = surface.correct_delta(self.texcoord - self.prev_texcoord);
        self.moved = self.delta.x.abs() > 0.0 || self.delta.y.abs() > 0.0;
    }
}

/// Directional color impulse consumed by the next simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Splat {
    pub position: Vec2,
    pub force: Vec2,
    pub color: Rgb,
    /// Kernel radius in texture space, already aspect corrected.
    pub radius: f32,
}

/// Every contact seen since mount. The primary mouse pointer always sits at
/// index 0; touch contacts are appended on their first press and reused
/// after release.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    pointers: Vec<Pointer>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            pointers: vec![Pointer::new(PRIMARY_POINTER_ID)],
        }
    }

    pub fn get(&self, id: i64) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn primary(&self) -> &Pointer {
        &self.pointers[0]
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pointer> {
        self.pointers.iter_mut()
    }

    fn entry(&mut self, id: i64) -> &mut Pointer {
        let index = match self.pointers.iter().position(|p| p.id == id) {
            Some(index) => index,
            None => {
                self.pointers.push(Pointer::new(id));
                self.pointers.len() - 1
            }
        };
        &mut self.pointers[index]
    }

    pub fn press(&mut self, id: i64, texcoord: Vec2, color: Rgb) -> &Pointer {
        let pointer = self.entry(id);
        pointer.press(texcoord, color);
        pointer
    }

    /// Moves pointer `id`, pressing it first at `texcoord` if it was up.
    /// `fresh_color` is only called for that implicit press.
    pub fn move_to(
        &mut self,
        id: i64,
        texcoord: Vec2,
        surface: SurfaceSize,
        fresh_color: impl FnOnce() -> Rgb,
    ) -> &Pointer {
        let pointer = self.entry(id);
        if !pointer.down {
            pointer.press(texcoord, fresh_color());
        }
        pointer.move_to(texcoord, surface);
        pointer
    }

    pub fn release(&mut self, id: i64) {
        if let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == id) {
            pointer.down = false;
        }
    }

    /// Back to the single primary pointer.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.pointers.push(Pointer::new(PRIMARY_POINTER_ID));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_surface_scales_horizontal_delta() {
        let surface = SurfaceSize::new(400, 800);
        let corrected = surface.correct_delta(Vec2::new(0.1, 0.2));
        assert!((corrected.x - 0.05).abs() < 1e-6);
        assert!((corrected.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn wide_surface_scales_vertical_delta() {
        let surface = SurfaceSize::new(800, 400);
        let corrected = surface.correct_delta(Vec2::new(0.1, 0.2));
        assert!((corrected.x - 0.1).abs() < 1e-6);
        assert!((corrected.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn texcoord_flips_vertical_axis() {
        let surface = SurfaceSize::new(200, 100);
        assert_eq!(surface.texcoord(50.0, 25.0), Vec2::new(0.25, 0.75));
    }

    #[test]
    fn move_without_press_starts_at_new_position() {
        let mut tracker = PointerTracker::new();
        let surface = SurfaceSize::new(100, 100);
        let at = Vec2::new(0.3, 0.6);

        let pointer = tracker.move_to(PRIMARY_POINTER_ID, at, surface, || Rgb::new(0.1, 0.0, 0.0));

        assert!(pointer.down);
        assert!(!pointer.moved);
        assert_eq!(pointer.delta, Vec2::ZERO);
        assert_eq!(pointer.prev_texcoord, at);
        assert_eq!(pointer.color, Rgb::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn release_keeps_pointer_tracked() {
        let mut tracker = PointerTracker::new();
        tracker.press(4, Vec2::splat(0.5), Rgb::BLACK);
        tracker.release(4);

        assert_eq!(tracker.len(), 2);
        assert!(!tracker.get(4).map_or(true, |p| p.down));
    }

    #[test]
    fn touches_reuse_their_slot() {
        let mut tracker = PointerTracker::new();
        tracker.press(9, Vec2::splat(0.1), Rgb::BLACK);
        tracker.release(9);
        tracker.press(9, Vec2::splat(0.2), Rgb::BLACK);

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.primary().id, PRIMARY_POINTER_ID);
    }
}
