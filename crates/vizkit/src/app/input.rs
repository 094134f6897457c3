#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use vizkit_render::RenderEngine;

use super::App;
use crate::interactor::{apply_scene_action, key_action, KeyAction};
use crate::style::CameraMotion;

impl App {
    fn viewport(&self) -> (u32, u32) {
        self.engine
            .as_ref()
            .map_or(self.size, |engine| (engine.width, engine.height))
    }

    fn handle_key(&mut self, code: winit::keyboard::KeyCode, state: ElementState, repeat: bool) {
        let Some(action) = key_action(code) else {
            return;
        };
        if let KeyAction::Widget(motion) = action {
            let Some(widget) = self.plane_widget.as_mut() else {
                return;
            };
            match state {
                ElementState::Pressed => {
                    widget.manipulate(motion, &mut self.renderer);
                    self.widget_key = Some(code);
                }
                ElementState::Released if self.widget_key == Some(code) => {
                    widget.end_interaction(&mut self.renderer);
                    self.widget_key = None;
                }
                ElementState::Released => {}
            }
            return;
        }
        if state != ElementState::Pressed || repeat {
            return;
        }
        if apply_scene_action(action, &mut self.renderer) {
            return;
        }
        match action {
            KeyAction::SetStyle(style) => {
                log::info!("interaction style: {style:?}");
                self.style = style;
            }
            KeyAction::Quit => self.close_requested = true,
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(err);
                event_loop.exit();
                return;
            }
        };
        log::info!("window created: {} {}x{}", self.title, self.size.0, self.size.1);

        match pollster::block_on(RenderEngine::new_windowed(window.clone(), self.vsync)) {
            Ok(engine) => self.engine = Some(engine),
            Err(err) => {
                self.fail(err);
                event_loop.exit();
                return;
            }
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let (Some(last), Some(motion)) = (self.last_frame_time, self.motion) {
                    let dt = now.duration_since(last).as_secs_f32();
                    let (w, h) = self.viewport();
                    let offset = (
                        (self.mouse_pos.0 - f64::from(w) * 0.5) as f32,
                        (self.mouse_pos.1 - f64::from(h) * 0.5) as f32,
                    );
                    self.style
                        .hold(self.renderer.camera_mut(), motion, offset, (w, h), dt);
                }
                self.last_frame_time = Some(now);

                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta = (
                    (position.x - self.mouse_pos.0) as f32,
                    (position.y - self.mouse_pos.1) as f32,
                );
                self.mouse_pos = (position.x, position.y);
                if let Some(motion) = self.motion {
                    let size = self.viewport();
                    self.style
                        .drag(self.renderer.camera_mut(), motion, delta, size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.motion = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) if self.shift_down => {
                        Some(CameraMotion::Pan)
                    }
                    (ElementState::Pressed, MouseButton::Left) => Some(CameraMotion::Rotate),
                    (ElementState::Pressed, MouseButton::Middle) => Some(CameraMotion::Pan),
                    (ElementState::Pressed, MouseButton::Right) => Some(CameraMotion::Dolly),
                    (ElementState::Released, _) => None,
                    (ElementState::Pressed, _) => self.motion,
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                };
                self.style.wheel(self.renderer.camera_mut(), lines);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event.state, event.repeat);
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}
