use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::generate_color;
use crate::error::MountError;
use crate::fluid_field::FluidField;
use crate::grid::grid_resolution;
use crate::host::{HostEvent, ListenerId, SurfaceHost};
use crate::layering::{surface_opacity, LayerPolicy, SurfaceLayer};
use crate::pointer::{Pointer, PointerTracker, Splat, SurfaceSize, PRIMARY_POINTER_ID};
use crate::post::{self, Frame};
use crate::types::SimulationConfig;

/// Longest frame step; slower frames simulate in slow motion.
const MAX_FRAME_DT: f32 = 1.0 / 60.0;

/// Longest dye grid side the CPU solver and compositor keep within a 60 Hz
/// frame.
const MAX_DYE_SIDE: usize = 512;

/// Pointer-driven fluid backdrop bound to one host surface.
///
/// Created by [`FluidSimulator::mount`] and alive until [`unmount`]. All
/// pointer state and the splat queue belong to the instance; the host routes
/// its events to the `on_*` handlers and calls [`step`] once per frame.
///
/// [`unmount`]: FluidSimulator::unmount
/// [`step`]: FluidSimulator::step
pub struct FluidSimulator {
    config: SimulationConfig,
    hover_force: f32,
    hover_radius: f32,
    field: FluidField,
    frame: Frame,
    pointers: PointerTracker,
    splats: Vec<Splat>,
    surface: SurfaceSize,
    max_texture_side: usize,
    layer: LayerPolicy,
    hovering: bool,
    color_timer: f32,
    listeners: Vec<ListenerId>,
    rng: StdRng,
    mounted: bool,
}

impl FluidSimulator {
    pub fn mount<H: SurfaceHost + ?Sized>(
        host: &mut H,
        config: SimulationConfig,
    ) -> Result<Self, MountError> {
        Self::mount_with_rng(host, config, StdRng::from_entropy())
    }

    /// Like [`mount`](Self::mount) with a caller-provided color source.
    pub fn mount_with_rng<H: SurfaceHost + ?Sized>(
        host: &mut H,
        config: SimulationConfig,
        rng: StdRng,
    ) -> Result<Self, MountError> {
        config.validate()?;

        let capability = host
            .graphics_capability()
            .ok_or(MountError::GraphicsUnavailable)?;
        let required = config.sim_resolution as usize;
        if capability.max_texture_side < required {
            return Err(MountError::TextureTooSmall {
                required,
                available: capability.max_texture_side,
            });
        }

        let surface = host.surface_size();
        let (sim, dye) = field_dimensions(&config, surface, capability.max_texture_side);
        let field = FluidField::new(sim, dye, surface.aspect_ratio());
        let listeners = HostEvent::ALL
            .iter()
            .map(|event| host.subscribe(*event))
            .collect();

        log::info!(
            "fluid backdrop mounted: surface {}x{}, sim {}x{}, dye {}x{}",
            surface.width,
            surface.height,
            sim[0],
            sim[1],
            dye[0],
            dye[1]
        );

        Ok(Self {
            hover_force: config.splat_force,
            hover_radius: config.splat_radius,
            config,
            field,
            frame: Frame::default(),
            pointers: PointerTracker::new(),
            splats: Vec::new(),
            surface,
            max_texture_side: capability.max_texture_side,
            layer: LayerPolicy::new(host.viewport_width()),
            hovering: false,
            color_timer: 0.0,
            listeners,
            rng,
            mounted: true,
        })
    }

    /// Drops every listener registered at mount. Safe to call twice.
    pub fn unmount<H: SurfaceHost + ?Sized>(&mut self, host: &mut H) {
        if !self.mounted {
            return;
        }
        for id in self.listeners.drain(..) {
            host.unsubscribe(id);
        }
        self.pointers.reset();
        self.splats.clear();
        self.hovering = false;
        self.mounted = false;
        log::info!("fluid backdrop unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &FluidField {
        &self.field
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn layer(&self) -> SurfaceLayer {
        self.layer.current()
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Opacity to paint the frame with: translucent unless hovered.
    pub fn opacity(&self) -> f32 {
        surface_opacity(self.hovering)
    }

    /// Progress toward the next pointer recolor in colorful mode, in [0, 1).
    pub fn color_timer(&self) -> f32 {
        self.color_timer
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn pointers(&self) -> &PointerTracker {
        &self.pointers
    }

    pub fn pointer(&self, id: i64) -> Option<&Pointer> {
        self.pointers.get(id)
    }

    pub fn pending_splats(&self) -> &[Splat] {
        &self.splats
    }

    /// `x`, `y` in device pixels from the surface's top-left corner.
    pub fn on_pointer_down(&mut self, id: i64, x: f32, y: f32) {
        if !self.mounted {
            return;
        }
        let texcoord = self.surface.texcoord(x, y);
        let color = generate_color(&mut self.rng);
        let radius = self.splat_radius();

        let pointer = self.pointers.press(id, texcoord, color);
        let splat = Splat {
            position: pointer.texcoord,
            force: Vec2::ZERO,
            color: pointer.color,
            radius,
        };
        self.splats.push(splat);
    }

    pub fn on_pointer_move(&mut self, id: i64, x: f32, y: f32) {
        if !self.mounted {
            return;
        }
        if !self.pointers.get(id).is_some_and(|p| p.down) {
            self.on_pointer_down(id, x, y);
        }

        let texcoord = self.surface.texcoord(x, y);
        let radius = self.splat_radius();
        let surface = self.surface;
        let rng = &mut self.rng;
        let pointer = self
            .pointers
            .move_to(id, texcoord, surface, || generate_color(rng));

        if pointer.moved {
            let splat = Splat {
                position: pointer.texcoord,
                force: pointer.delta * self.config.splat_force,
                color: pointer.color,
                radius,
            };
            self.splats.push(splat);
        }
    }

    pub fn on_pointer_up(&mut self, id: i64) {
        if !self.mounted {
            return;
        }
        self.pointers.release(id);
    }

    pub fn on_hover_enter(&mut self) {
        if !self.mounted {
            return;
        }
        self.hovering = true;
        self.config.splat_force = self.hover_force;
        self.config.splat_radius = self.hover_radius;
    }

    /// Stops new motion from being injected; the field keeps dissipating.
    pub fn on_hover_leave(&mut self) {
        if !self.mounted {
            return;
        }
        self.hovering = false;
        self.config.splat_force = 0.0;
        self.config.splat_radius = 0.0;
        self.pointers.release(PRIMARY_POINTER_ID);
    }

    /// Resizes the grids when the surface changed and re-evaluates the
    /// stacking layer. Returns the layer only when it changed.
    pub fn on_resize(
        &mut self,
        surface: SurfaceSize,
        viewport_width: f32,
    ) -> Option<SurfaceLayer> {
        if !self.mounted {
            return None;
        }

        if surface != self.surface {
            self.surface = surface;
            let (sim, dye) = field_dimensions(&self.config, surface, self.max_texture_side);
            self.field.resize(sim, dye, surface.aspect_ratio());
            log::debug!(
                "surface resized to {}x{}: sim {}x{}, dye {}x{}",
                surface.width,
                surface.height,
                sim[0],
                sim[1],
                dye[0],
                dye[1]
            );
        }

        let changed = self.layer.on_resize(viewport_width);
        if let Some(layer) = changed {
            log::debug!("backdrop layer is now {layer:?} (z-index {})", layer.z_index());
        }
        changed
    }

    /// Advances one frame: applies queued splats, evolves the field unless
    /// paused and composites the visible frame.
    pub fn step(&mut self, elapsed: f32) -> &Frame {
        if !self.mounted {
            return &self.frame;
        }

        let dt = if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        if self.config.colorful {
            self.update_colors(dt);
        }

        for splat in self.splats.drain(..) {
            self.field.splat(&splat);
        }

        if !self.config.paused {
            self.field.step(&self.config, dt);
        }

        self.frame = post::composite(self.field.dye(), &self.config);
        &self.frame
    }

    fn update_colors(&mut self, dt: f32) {
        self.color_timer += dt * self.config.color_update_speed;
        if self.color_timer >= 1.0 {
            self.color_timer %= 1.0;
            for pointer in self.pointers.iter_mut() {
                pointer.color = generate_color(&mut self.rng);
            }
        }
    }

    /// Kernel radius in texture space for the current splat radius knob.
    fn splat_radius(&self) -> f32 {
        let aspect = self.surface.aspect_ratio();
        let radius = self.config.splat_radius / 100.0;
        if aspect > 1.0 {
            radius * aspect
        } else {
            radius
        }
    }
}

/// Simulation and dye grid sizes for a surface. The dye grid shrinks to fit
/// the host's texture limit and the CPU frame budget; the host's linear
/// texture filtering upscales it to the surface.
fn field_dimensions(
    config: &SimulationConfig,
    surface: SurfaceSize,
    max_texture_side: usize,
) -> ([usize; 2], [usize; 2]) {
    let aspect = surface.aspect_ratio();
    let sim = grid_resolution(config.sim_resolution, aspect);
    let [dw, dh] = grid_resolution(config.dye_resolution, aspect);

    let longest = dw.max(dh);
    let limit = max_texture_side.min(MAX_DYE_SIDE);
    let dye = if longest > limit {
        let scale = limit as f32 / longest as f32;
        [
            ((dw as f32 * scale).round() as usize).max(1),
            ((dh as f32 * scale).round() as usize).max(1),
        ]
    } else {
        [dw, dh]
    };

    (sim, dye)
}
