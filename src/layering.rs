/// Viewport width (logical pixels) at which the backdrop moves in front of
/// the page background.
pub const LAYER_BREAKPOINT: f32 = 768.0;

/// Surface opacity while the pointer is elsewhere; content painted beneath
/// stays visible through the backdrop.
pub const IDLE_OPACITY: f32 = 0.8;
pub const HOVER_OPACITY: f32 = 1.0;

/// Opacity the host applies when painting the composited frame.
pub fn surface_opacity(hovering: bool) -> f32 {
    if hovering {
        HOVER_OPACITY
    } else {
        IDLE_OPACITY
    }
}

/// Stacking position of the rendering surface relative to host content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceLayer {
    /// Under all content; narrow viewports.
    BehindContent,
    /// Over the page background but under interactive elements; wide
    /// viewports.
    AboveBackground,
}

impl SurfaceLayer {
    pub fn for_viewport_width(width: f32) -> Self {
        if width < LAYER_BREAKPOINT {
            Self::BehindContent
        } else {
            Self::AboveBackground
        }
    }

    pub fn z_index(self) -> i32 {
        match self {
            Self::BehindContent => -1,
            Self::AboveBackground => 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayerPolicy {
    current: SurfaceLayer,
}

impl LayerPolicy {
    pub fn new(viewport_width: f32) -> Self {
        Self {
            current: SurfaceLayer::for_viewport_width(viewport_width),
        }
    }

    pub fn current(&self) -> SurfaceLayer {
        self.current
    }

    /// Re-evaluates the layer; returns it only when it changed.
    pub fn on_resize(&mut self, viewport_width: f32) -> Option<SurfaceLayer> {
        let next = SurfaceLayer::for_viewport_width(viewport_width);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
