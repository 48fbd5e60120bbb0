//! Application builder and frame loop.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use glam::{Mat4, Vec2};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::command::{self, CommandSurface};
use crate::engine::Engine;
use crate::error::AppError;
use crate::gesture::{self, GestureFrame};
use crate::gpu::GpuState;
use crate::interaction::InteractionPoint;
use crate::interpret::Interpreter;
use crate::params::{Mode, ParamSet, ParamUpdate};
use crate::time::Time;

/// A particle field builder.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct Lumina {
    params: ParamSet,
    interpreter: Option<Arc<dyn Interpreter>>,
    console: bool,
    commands: Option<(Sender<String>, Receiver<String>)>,
    gestures: Option<(Sender<GestureFrame>, Receiver<GestureFrame>)>,
}

impl Lumina {
    /// Create a field with default parameters.
    pub fn new() -> Self {
        Self {
            params: ParamSet::default(),
            interpreter: None,
            console: true,
            commands: None,
            gestures: None,
        }
    }

    /// Start from a full parameter snapshot.
    pub fn with_params(mut self, params: ParamSet) -> Self {
        self.params = params;
        self
    }

    /// Set the starting particle count (clamped into the valid range).
    pub fn with_count(mut self, count: u32) -> Self {
        self.params.apply(&ParamUpdate {
            count: Some(count),
            ..Default::default()
        });
        self
    }

    /// Set the starting motion mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.params.mode = mode;
        self
    }

    /// Plug in a natural-language interpreter for free-text commands.
    pub fn with_interpreter<I: Interpreter + 'static>(mut self, interpreter: I) -> Self {
        self.interpreter = Some(Arc::new(interpreter));
        self
    }

    /// Do not read commands from stdin.
    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }

    /// A sender for feeding commands programmatically. Text lines behave
    /// exactly like console input: prose goes to the interpreter, lines
    /// starting with `{` merge as raw parameter JSON.
    pub fn command_feed(&mut self) -> Sender<String> {
        let (tx, _) = self.commands.get_or_insert_with(mpsc::channel);
        tx.clone()
    }

    /// A sender for a gesture source. Frames are drained once per tick and
    /// the newest one wins.
    pub fn gesture_feed(&mut self) -> Sender<GestureFrame> {
        let (tx, _) = self.gestures.get_or_insert_with(mpsc::channel);
        tx.clone()
    }

    /// Open the window and run the frame loop. Blocks until the window
    /// closes or Escape is pressed.
    pub fn run(mut self) -> Result<(), AppError> {
        let shared = Arc::new(Mutex::new(self.params.clone()));
        let (updates_tx, updates_rx) = mpsc::channel();

        let (lines_tx, lines_rx) = self.commands.take().unwrap_or_else(mpsc::channel);
        if self.console {
            command::spawn_stdin_feed(lines_tx.clone());
        }
        let surface = self
            .interpreter
            .take()
            .map(|interpreter| CommandSurface::new(interpreter, Arc::clone(&shared)));
        thread::spawn(move || command::run_command_pump(surface, lines_rx, updates_tx));
        // With no console and no external feed the pump exits right away.
        drop(lines_tx);

        let gestures_rx = self.gestures.take().map(|(_tx, rx)| rx);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(shared, updates_rx, gestures_rx);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

impl Default for Lumina {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    engine: Engine,
    time: Time,
    shared: Arc<Mutex<ParamSet>>,
    updates: Receiver<ParamUpdate>,
    gestures: Option<Receiver<GestureFrame>>,
    interaction: InteractionPoint,
    model_yaw: f32,
    left_held: bool,
    right_held: bool,
    cursor: Option<(f64, f64)>,
    last_drag: Option<(f64, f64)>,
    last_title: Instant,
}

impl App {
    fn new(
        shared: Arc<Mutex<ParamSet>>,
        updates: Receiver<ParamUpdate>,
        gestures: Option<Receiver<GestureFrame>>,
    ) -> Self {
        let params = shared.lock().unwrap().clone();
        Self {
            window: None,
            gpu: None,
            engine: Engine::new(&params),
            time: Time::new(),
            shared,
            updates,
            gestures,
            interaction: InteractionPoint::inactive(),
            model_yaw: 0.0,
            left_held: false,
            right_held: false,
            cursor: None,
            last_drag: None,
            last_title: Instant::now(),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        self.shared.lock().unwrap().mode = mode;
    }

    /// Drain pending updates and gestures, then advance the engine one frame.
    fn advance(&mut self) -> ParamSet {
        let mut params = self.shared.lock().unwrap();
        while let Ok(update) = self.updates.try_recv() {
            params.apply(&update);
        }

        if let Some(gestures) = &self.gestures {
            let mut newest = None;
            while let Ok(frame) = gestures.try_recv() {
                newest = Some(frame);
            }
            match newest {
                Some(GestureFrame::Inactive) => {
                    self.interaction = InteractionPoint::inactive();
                }
                Some(GestureFrame::Active { point, speed_hint }) => {
                    self.interaction = InteractionPoint::at(point);
                    if let Some(hint) = speed_hint {
                        params.speed = gesture::smooth_speed(params.speed, hint);
                    }
                }
                None => {}
            }
        }
        let snapshot = params.clone();
        drop(params);

        // A held button wins over gestures for the attractor.
        if self.left_held {
            if let (Some(gpu), Some((x, y))) = (&self.gpu, self.cursor) {
                let ndc = Vec2::new(
                    (x / gpu.config.width as f64 * 2.0 - 1.0) as f32,
                    (1.0 - y / gpu.config.height as f64 * 2.0) as f32,
                );
                self.interaction =
                    InteractionPoint::at(gpu.camera.cursor_to_target_plane(ndc, gpu.aspect()));
            }
        }

        self.engine.sync(&snapshot);
        let (elapsed, _delta) = self.time.update();
        self.engine.tick(&snapshot, &self.interaction, elapsed);
        // Slow rigid spin of the whole cloud, carried in the model matrix so
        // stored positions stay untouched.
        self.model_yaw += 0.001 * snapshot.speed;
        snapshot
    }

    fn present(&mut self, snapshot: &ParamSet, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else { return };

        if self.engine.take_rebuilt() {
            gpu.rebuild_particles(self.engine.buffer());
            // The fresh buffers already carry the new colors.
            self.engine.take_colors_dirty();
        } else {
            gpu.upload_positions(self.engine.buffer().positions());
            if self.engine.take_colors_dirty() {
                gpu.upload_colors(self.engine.buffer().colors());
            }
        }

        let model = Mat4::from_rotation_y(self.model_yaw);
        match gpu.render(self.engine.appearance(), model, self.time.elapsed()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                width: gpu.config.width,
                height: gpu.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => eprintln!("Render error: {:?}", e),
        }

        if self.last_title.elapsed() >= Duration::from_millis(500) {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "Lumina - {} | {} particles | {:.0} fps",
                    snapshot.mode,
                    snapshot.count,
                    self.time.fps()
                ));
            }
            self.last_title = Instant::now();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("Lumina")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(err) => {
                    eprintln!("{}", AppError::from(err));
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            match pollster::block_on(GpuState::new(window, self.engine.buffer())) {
                Ok(gpu) => {
                    // The initial buffers already hold current contents.
                    self.engine.take_rebuilt();
                    self.engine.take_colors_dirty();
                    self.gpu = Some(gpu);
                }
                Err(err) => {
                    eprintln!("{}", AppError::from(err));
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        match code {
                            KeyCode::Escape => event_loop.exit(),
                            KeyCode::Digit1 => self.set_mode(Mode::Orbit),
                            KeyCode::Digit2 => self.set_mode(Mode::Flow),
                            KeyCode::Digit3 => self.set_mode(Mode::Vortex),
                            KeyCode::Digit4 => self.set_mode(Mode::Chaos),
                            KeyCode::Digit5 => self.set_mode(Mode::Expand),
                            KeyCode::Digit6 => self.set_mode(Mode::Galaxy),
                            _ => {}
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Left => {
                    self.left_held = state == ElementState::Pressed;
                    if !self.left_held {
                        self.interaction = InteractionPoint::inactive();
                    }
                }
                MouseButton::Right => {
                    self.right_held = state == ElementState::Pressed;
                    if !self.right_held {
                        self.last_drag = None;
                    }
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x, position.y));
                if self.right_held {
                    if let Some((last_x, last_y)) = self.last_drag {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(gpu) = &mut self.gpu {
                            gpu.camera.orbit(dx, dy);
                        }
                    }
                    self.last_drag = Some((position.x, position.y));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                if self.left_held {
                    self.interaction = InteractionPoint::inactive();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu) = &mut self.gpu {
                    gpu.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                if self.gpu.is_some() {
                    let snapshot = self.advance();
                    self.present(&snapshot, event_loop);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
