use crate::pointer::SurfaceSize;

/// Input the simulator listens for while mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    PointerDown,
    PointerMove,
    PointerUp,
    HoverEnter,
    HoverLeave,
    Resize,
}

impl HostEvent {
    pub const ALL: [HostEvent; 6] = [
        HostEvent::PointerDown,
        HostEvent::PointerMove,
        HostEvent::PointerUp,
        HostEvent::HoverEnter,
        HostEvent::HoverLeave,
        HostEvent::Resize,
    ];
}

/// Handle returned by [`SurfaceHost::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphicsCapability {
    pub max_texture_side: usize,
}

/// What the simulator needs from whoever owns the viewport.
pub trait SurfaceHost {
    /// `None` when no graphics context can be created.
    fn graphics_capability(&self) -> Option<GraphicsCapability>;

    /// Full-viewport surface size in device pixels.
    fn surface_size(&self) -> SurfaceSize;

    /// Viewport width in logical pixels, used for the layering policy.
    fn viewport_width(&self) -> f32;

    fn subscribe(&mut self, event: HostEvent) -> ListenerId;

    /// Unknown or already removed ids are ignored.
    fn unsubscribe(&mut self, id: ListenerId);
}
