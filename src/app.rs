use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions};

use crate::host::{GraphicsCapability, HostEvent, ListenerId, SurfaceHost};
use crate::layering::SurfaceLayer;
use crate::pointer::{SurfaceSize, PRIMARY_POINTER_ID};
use crate::simulator::FluidSimulator;
use crate::types::{Rgb, SimulationConfig};

/// Viewport facts and live subscriptions, refreshed from egui every frame.
struct EguiHost {
    max_texture_side: usize,
    surface: SurfaceSize,
    pixels_per_point: f32,
    viewport_width: f32,
    subscriptions: HashMap<ListenerId, HostEvent>,
    next_id: u64,
}

impl EguiHost {
    fn new() -> Self {
        Self {
            max_texture_side: 0,
            surface: SurfaceSize::new(1, 1),
            pixels_per_point: 1.0,
            viewport_width: 0.0,
            subscriptions: HashMap::new(),
            next_id: 0,
        }
    }

    /// Returns true when the surface size changed.
    fn observe(&mut self, ctx: &egui::Context) -> bool {
        let rect = ctx.screen_rect();
        let ppp = ctx.pixels_per_point();
        let surface = SurfaceSize::new(
            (rect.width() * ppp).round() as u32,
            (rect.height() * ppp).round() as u32,
        );

        self.max_texture_side = ctx.input(|i| i.max_texture_side);
        self.pixels_per_point = ppp;
        self.viewport_width = rect.width();

        let changed = surface != self.surface;
        self.surface = surface;
        changed
    }

    fn listens(&self, event: HostEvent) -> bool {
        self.subscriptions.values().any(|e| *e == event)
    }

    /// Logical point to device pixel, floored like the browser's offset
    /// coordinates.
    fn to_device(&self, pos: Pos2) -> (f32, f32) {
        (
            (pos.x * self.pixels_per_point).floor(),
            (pos.y * self.pixels_per_point).floor(),
        )
    }
}

impl SurfaceHost for EguiHost {
    fn graphics_capability(&self) -> Option<GraphicsCapability> {
        (self.max_texture_side > 0).then_some(GraphicsCapability {
            max_texture_side: self.max_texture_side,
        })
    }

    fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn subscribe(&mut self, event: HostEvent) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.insert(id, event);
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.subscriptions.remove(&id);
    }
}

pub struct FluidApp {
    host: EguiHost,
    simulator: Option<FluidSimulator>,
    mount_attempted: bool,
    texture: Option<TextureHandle>,
    hovering: bool,
    frames: u64,
}

impl FluidApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            host: EguiHost::new(),
            simulator: None,
            mount_attempted: false,
            texture: None,
            hovering: false,
            frames: 0,
        }
    }

    /// Mounts on the first frame, once the viewport size is known. A failed
    /// mount is logged and never retried; the app runs without the effect.
    fn ensure_mounted(&mut self) {
        if self.mount_attempted {
            return;
        }
        self.mount_attempted = true;

        match FluidSimulator::mount(&mut self.host, SimulationConfig::default()) {
            Ok(simulator) => self.simulator = Some(simulator),
            Err(err) => log::warn!("fluid backdrop disabled: {err}"),
        }
    }

    fn dispatch_input(&mut self, ctx: &egui::Context) {
        let Some(simulator) = self.simulator.as_mut() else {
            return;
        };
        let host = &self.host;

        let (events, hovering) = ctx.input(|i| {
            (
                routed_events(&i.events, i.any_touches()),
                i.pointer.hover_pos().is_some(),
            )
        });

        if hovering != self.hovering {
            self.hovering = hovering;
            if hovering && host.listens(HostEvent::HoverEnter) {
                simulator.on_hover_enter();
            } else if !hovering && host.listens(HostEvent::HoverLeave) {
                simulator.on_hover_leave();
            }
        }

        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if pressed && host.listens(HostEvent::PointerDown) {
                        let (x, y) = host.to_device(pos);
                        simulator.on_pointer_down(PRIMARY_POINTER_ID, x, y);
                    } else if !pressed && host.listens(HostEvent::PointerUp) {
                        simulator.on_pointer_up(PRIMARY_POINTER_ID);
                    }
                }
                egui::Event::PointerMoved(pos) if host.listens(HostEvent::PointerMove) => {
                    let (x, y) = host.to_device(pos);
                    simulator.on_pointer_move(PRIMARY_POINTER_ID, x, y);
                }
                egui::Event::Touch { id, phase, pos, .. } => {
                    let touch = id.0 as i64;
                    let (x, y) = host.to_device(pos);
                    match phase {
                        egui::TouchPhase::Start if host.listens(HostEvent::PointerDown) => {
                            simulator.on_pointer_down(touch, x, y);
                        }
                        egui::TouchPhase::Move if host.listens(HostEvent::PointerMove) => {
                            simulator.on_pointer_move(touch, x, y);
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel
                            if host.listens(HostEvent::PointerUp) =>
                        {
                            simulator.on_pointer_up(touch);
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn update_texture(&mut self, ctx: &egui::Context) {
        let Some(simulator) = &self.simulator else {
            return;
        };
        let frame = simulator.frame();
        if frame.rgba.is_empty() {
            return;
        }

        let image = ColorImage::from_rgba_unmultiplied(frame.size(), &frame.rgba);
        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("fluid-backdrop", image, TextureOptions::LINEAR));
        }
    }

    fn paint_backdrop(&self, ui: &egui::Ui, opacity: f32) {
        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                ui.ctx().screen_rect(),
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                backdrop_tint(opacity),
            );
        }
    }

    fn draw_content(ui: &mut egui::Ui) {
        ui.add_space(48.0);
        ui.vertical_centered(|ui| {
            ui.heading("fluid backdrop");
            ui.label("Move the pointer to stir the field. Press and drag for a fresh color.");
        });
    }

    fn draw_status(&self, ctx: &egui::Context) {
        let Some(simulator) = &self.simulator else {
            return;
        };
        let surface = simulator.surface();
        let [dw, dh] = simulator.field().dye_dimensions();
        let [sw, sh] = simulator.field().sim_dimensions();
        let layer = simulator.layer();

        egui::Window::new("Backdrop")
            .default_open(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("surface: {}x{}", surface.width, surface.height));
                ui.label(format!("sim grid: {sw}x{sh}"));
                ui.label(format!("dye grid: {dw}x{dh}"));
                ui.label(format!("layer: {layer:?} (z-index {})", layer.z_index()));
                ui.label(format!("hovering: {}", simulator.is_hovering()));
                ui.label(format!("splat force: {:.0}", simulator.config().splat_force));
                ui.label(format!("pointers: {}", simulator.pointers().len()));
                ui.label(format!("sim time: {:.1}s", simulator.field().time()));
                ui.label(format!("frames: {}", self.frames));
            });
    }
}

impl eframe::App for FluidApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let resized = self.host.observe(ctx);
        self.ensure_mounted();

        if let Some(simulator) = self.simulator.as_mut() {
            if resized && self.host.listens(HostEvent::Resize) {
                simulator.on_resize(self.host.surface_size(), self.host.viewport_width());
            }
        }

        self.dispatch_input(ctx);

        let dt = ctx.input(|i| i.stable_dt);
        if let Some(simulator) = self.simulator.as_mut() {
            simulator.step(dt);
            self.frames += 1;
        }
        self.update_texture(ctx);

        let layer = self.simulator.as_ref().map(|s| s.layer());
        let opacity = self.simulator.as_ref().map_or(1.0, |s| s.opacity());
        let back = self
            .simulator
            .as_ref()
            .map_or(SimulationConfig::default().back_color, |s| s.config().back_color);
        let fill = panel_fill(back);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(fill))
            .show(ctx, |ui| {
                if layer == Some(SurfaceLayer::BehindContent) {
                    self.paint_backdrop(ui, opacity);
                }
                Self::draw_content(ui);
                if layer == Some(SurfaceLayer::AboveBackground) {
                    self.paint_backdrop(ui, opacity);
                }
            });

        self.draw_status(ctx);

        ctx.request_repaint();
    }
}

/// Input for this frame with egui's mouse emulation of the first finger
/// dropped while touches are live, so each finger drives exactly one pointer.
fn routed_events(events: &[egui::Event], any_touches: bool) -> Vec<egui::Event> {
    let touching = any_touches
        || events
            .iter()
            .any(|e| matches!(e, egui::Event::Touch { .. }));

    events
        .iter()
        .filter(|e| {
            !touching
                || !matches!(
                    e,
                    egui::Event::PointerButton { .. } | egui::Event::PointerMoved(_)
                )
        })
        .cloned()
        .collect()
}

/// Premultiplied white at `opacity`, scaling the whole frame when painted.
fn backdrop_tint(opacity: f32) -> Color32 {
    Color32::from_white_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn panel_fill(back: Rgb) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(back.r), channel(back.g), channel(back.b))
}

impl Drop for FluidApp {
    fn drop(&mut self) {
        if let Some(simulator) = self.simulator.as_mut() {
            simulator.unmount(&mut self.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(1),
            phase,
            pos: Pos2::new(x, y),
            force: None,
        }
    }

    fn press(x: f32, y: f32) -> egui::Event {
        egui::Event::PointerButton {
            pos: Pos2::new(x, y),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn touch_frames_drop_emulated_mouse_events() {
        let events = vec![
            touch(egui::TouchPhase::Start, 10.0, 20.0),
            egui::Event::PointerMoved(Pos2::new(10.0, 20.0)),
            press(10.0, 20.0),
        ];

        let routed = routed_events(&events, false);

        assert_eq!(routed.len(), 1);
        assert!(matches!(routed[0], egui::Event::Touch { .. }));
    }

    #[test]
    fn live_touch_drops_mouse_events_without_touch_event() {
        let events = vec![egui::Event::PointerMoved(Pos2::new(5.0, 5.0))];
        assert!(routed_events(&events, true).is_empty());
    }

    #[test]
    fn mouse_events_pass_without_touches() {
        let events = vec![
            egui::Event::PointerMoved(Pos2::new(5.0, 5.0)),
            press(5.0, 5.0),
        ];
        assert_eq!(routed_events(&events, false), events);
    }

    #[test]
    fn tint_follows_opacity() {
        assert_eq!(backdrop_tint(0.8), Color32::from_white_alpha(204));
        assert_eq!(backdrop_tint(1.0), Color32::WHITE);
    }

    #[test]
    fn panel_fill_uses_configured_background() {
        let fill = panel_fill(Rgb::new(1.0, 0.5, 0.0));
        assert_eq!(fill, Color32::from_rgb(255, 128, 0));
    }
}
