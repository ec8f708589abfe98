//! Camera and slide navigation for the project artifact viewer. Model
//! loading and drawing belong to whatever implements [`OrbitControls`].

use glam::Vec3;

pub const START_POSITION: Vec3 = Vec3::new(-3.351_929, 0.142_208_72, -4.691_621);
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 15.0;
const ZOOM_IN_FACTOR: f32 = 0.8;
const ZOOM_OUT_FACTOR: f32 = 1.2;

/// Orbit-style camera controls owned by the renderer.
pub trait OrbitControls {
    /// Restore the controls' saved target and orientation.
    fn reset(&mut self);
    fn set_position(&mut self, position: Vec3);
}

pub struct CameraRig<C> {
    controls: C,
    position: Vec3,
}

impl<C: OrbitControls> CameraRig<C> {
    pub fn new(mut controls: C) -> Self {
        controls.set_position(START_POSITION);
        Self {
            controls,
            position: START_POSITION,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn reset(&mut self) {
        self.position = START_POSITION;
        self.controls.set_position(START_POSITION);
        self.controls.reset();
    }

    pub fn zoom_in(&mut self) {
        let distance = (self.distance() * ZOOM_IN_FACTOR).max(MIN_DISTANCE);
        self.set_distance(distance);
    }

    pub fn zoom_out(&mut self) {
        let distance = (self.distance() * ZOOM_OUT_FACTOR).min(MAX_DISTANCE);
        self.set_distance(distance);
    }

    fn set_distance(&mut self, distance: f32) {
        // a camera sitting on the origin has no direction to scale along
        let Some(direction) = self.position.try_normalize() else {
            return;
        };
        self.position = direction * distance;
        self.controls.set_position(self.position);
    }
}

/// Model slide first, then image slides; navigation wraps.
#[derive(Clone, Debug)]
pub struct SlideDeck {
    slides: Vec<String>,
    current: usize,
}

impl SlideDeck {
    pub fn new(model_path: impl Into<String>, image_paths: &[String]) -> Self {
        let mut slides = Vec::with_capacity(image_paths.len() + 1);
        slides.push(model_path.into());
        slides.extend(image_paths.iter().cloned());
        Self { slides, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> &str {
        &self.slides[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn is_model_slide(&self) -> bool {
        self.current == 0
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.slides.len();
    }

    pub fn prev(&mut self) {
        self.current = (self.current + self.slides.len() - 1) % self.slides.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingControls {
        resets: usize,
        last_position: Option<Vec3>,
    }

    impl OrbitControls for RecordingControls {
        fn reset(&mut self) {
            self.resets += 1;
        }

        fn set_position(&mut self, position: Vec3) {
            self.last_position = Some(position);
        }
    }

    #[test]
    fn zoom_in_stops_at_min_distance() {
        let mut rig = CameraRig::new(RecordingControls::default());
        for _ in 0..50 {
            rig.zoom_in();
        }
        assert!((rig.distance() - MIN_DISTANCE).abs() < 1e-4);
        assert_eq!(rig.controls().last_position, Some(rig.position()));
    }

    #[test]
    fn zoom_out_stops_at_max_distance() {
        let mut rig = CameraRig::new(RecordingControls::default());
        for _ in 0..50 {
            rig.zoom_out();
        }
        assert!((rig.distance() - MAX_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn zoom_keeps_direction() {
        let mut rig = CameraRig::new(RecordingControls::default());
        rig.zoom_in();
        let direction = rig.position().normalize();
        assert!(direction.abs_diff_eq(START_POSITION.normalize(), 1e-5));
        assert!((rig.distance() - START_POSITION.length() * 0.8).abs() < 1e-4);
    }

    #[test]
    fn reset_restores_start_and_resets_controls() {
        let mut rig = CameraRig::new(RecordingControls::default());
        rig.zoom_out();
        rig.reset();

        assert_eq!(rig.position(), START_POSITION);
        assert_eq!(rig.controls().resets, 1);
        assert_eq!(rig.controls().last_position, Some(START_POSITION));
    }

    #[test]
    fn slides_wrap_both_ways() {
        let images = vec!["a.png".to_owned(), "b.png".to_owned()];
        let mut deck = SlideDeck::new("model.glb", &images);

        assert!(deck.is_model_slide());
        deck.prev();
        assert_eq!(deck.current(), "b.png");
        deck.next();
        assert_eq!(deck.current(), "model.glb");
        deck.next();
        deck.next();
        deck.next();
        assert_eq!(deck.index(), 0);
    }

    #[test]
    fn single_slide_deck_stays_put() {
        let mut deck = SlideDeck::new("model.glb", &[]);
        deck.next();
        deck.prev();
        assert_eq!(deck.len(), 1);
        assert!(deck.is_model_slide());
    }
}
