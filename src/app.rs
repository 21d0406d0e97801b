//! Window and interaction loop

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::WindowBuilder;

use crate::error::{ViewerError, ViewerResult};
use crate::renderer::{pick_axis, Renderer};
use crate::scene::{CameraInput, OrbitController, Scene};
use crate::ui::SliderController;
use crate::ViewerConfig;

/// Pixels of a touchpad scroll that count as one wheel notch
const PIXELS_PER_NOTCH: f32 = 50.0;

/// Mouse state turned into orbit camera input
#[derive(Debug, Default)]
struct MouseTracker {
    input: CameraInput,
    last_position: Option<Vec2>,
}

impl MouseTracker {
    fn on_cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.last_position {
            if self.input.rotate_active || self.input.dolly_active {
                self.input.mouse_delta += position - last;
            }
        }
        self.last_position = Some(position);
    }

    /// Presses are ignored when egui owns the pointer; releases always count.
    fn on_button(&mut self, button: MouseButton, pressed: bool, egui_wants_pointer: bool) {
        if pressed && egui_wants_pointer {
            return;
        }
        match button {
            MouseButton::Left => self.input.rotate_active = pressed,
            MouseButton::Right => self.input.dolly_active = pressed,
            _ => {}
        }
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
        };
        self.input.scroll_delta += notches;
    }
}

/// A scene on screen with its sliders
pub struct Viewer {
    config: ViewerConfig,
    scene: Scene,
    sliders: SliderController,
}

impl Viewer {
    pub fn new(config: ViewerConfig, scene: Scene, sliders: SliderController) -> Self {
        Self {
            config,
            scene,
            sliders,
        }
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> ViewerResult<()> {
        let Self {
            config,
            mut scene,
            mut sliders,
        } = self;

        let event_loop = EventLoop::new().map_err(|e| ViewerError::Window(e.to_string()))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.title)
                .with_inner_size(PhysicalSize::new(config.width, config.height))
                .build(&event_loop)
                .map_err(|e| ViewerError::Window(e.to_string()))?,
        );

        let mut renderer = Renderer::new(Arc::clone(&window), &scene, &config)?;
        let (width, height) = renderer.surface_size();
        scene.camera.set_aspect(width as f32, height as f32);

        let mut controller = OrbitController::from_camera(&scene.camera);
        let mut mouse = MouseTracker::default();
        let mut frames: u64 = 0;
        let max_frames = config.max_frames;
        let failure: Rc<RefCell<Option<ViewerError>>> = Rc::new(RefCell::new(None));
        let failure_slot = Rc::clone(&failure);

        log::info!("Entering event loop");
        event_loop
            .run(move |event, elwt: &EventLoopWindowTarget<()>| {
                elwt.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { event, .. } => {
                        let consumed = renderer.on_window_event(&event);

                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(size) => {
                                renderer.resize(size.width, size.height);
                                let (width, height) = renderer.surface_size();
                                scene.camera.set_aspect(width as f32, height as f32);
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                let position = Vec2::new(position.x as f32, position.y as f32);
                                mouse.on_cursor_moved(position);
                            }
                            WindowEvent::MouseInput { state, button, .. } => {
                                let pressed = state == ElementState::Pressed;
                                let over_ui = consumed || renderer.wants_pointer_input();
                                // A left click on an axis tip turns the camera to that axis
                                let axis = match (pressed, button, mouse.last_position) {
                                    (true, MouseButton::Left, Some(cursor)) if !over_ui => {
                                        let (width, height) = renderer.surface_size();
                                        pick_axis(
                                            &scene.orientation_axes,
                                            &scene.camera,
                                            (cursor.x, cursor.y),
                                            width,
                                            height,
                                        )
                                    }
                                    _ => None,
                                };
                                match axis {
                                    Some(axis) => controller.snap_to(&mut scene.camera, axis),
                                    None => mouse.on_button(button, pressed, over_ui),
                                }
                            }
                            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                                mouse.on_wheel(delta);
                            }
                            WindowEvent::RedrawRequested => {
                                controller.update(&mut scene.camera, &mouse.input);
                                mouse.input.reset_deltas();

                                if let Err(e) = renderer.render(&scene, &mut sliders) {
                                    log::error!("Rendering failed: {}", e);
                                    *failure_slot.borrow_mut() = Some(e);
                                    elwt.exit();
                                    return;
                                }

                                frames += 1;
                                if max_frames.is_some_and(|max| frames >= max) {
                                    log::info!("Rendered {} frames, exiting", frames);
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        renderer.window().request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|e| ViewerError::Window(e.to_string()))?;

        let failure = failure.borrow_mut().take();
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_accumulates_only_while_pressed() {
        let mut mouse = MouseTracker::default();
        mouse.on_cursor_moved(Vec2::new(10.0, 10.0));
        mouse.on_cursor_moved(Vec2::new(20.0, 10.0));
        assert_eq!(mouse.input.mouse_delta, Vec2::ZERO);

        mouse.on_button(MouseButton::Left, true, false);
        mouse.on_cursor_moved(Vec2::new(25.0, 7.0));
        assert_eq!(mouse.input.mouse_delta, Vec2::new(5.0, -3.0));
        assert!(mouse.input.rotate_active);

        mouse.on_button(MouseButton::Left, false, false);
        assert!(!mouse.input.rotate_active);
    }

    #[test]
    fn test_presses_over_egui_are_ignored() {
        let mut mouse = MouseTracker::default();
        mouse.on_button(MouseButton::Right, true, true);
        assert!(!mouse.input.dolly_active);

        mouse.on_button(MouseButton::Right, true, false);
        mouse.on_button(MouseButton::Right, false, true);
        assert!(!mouse.input.dolly_active);
    }

    #[test]
    fn test_wheel_notches() {
        let mut mouse = MouseTracker::default();
        mouse.on_wheel(MouseScrollDelta::LineDelta(0.0, 2.0));
        mouse.on_wheel(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, -25.0),
        ));
        assert!((mouse.input.scroll_delta - 1.5).abs() < 1e-6);
    }
}
