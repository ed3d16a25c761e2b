//! Orrery - a scroll-driven 3D backdrop with a rotating card stack

mod config;
mod deck;
mod label;
mod scheduler;
#[cfg(test)]
mod testing;
mod view;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use engine_core::Viewport;
use glam::Vec2;
use renderer::{Renderer, WindowMount};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use config::OrreryConfig;
use scheduler::RedrawScheduler;
use view::View;

fn window_viewport(window: &Window) -> Viewport {
    let size = window.inner_size();
    let scale = window.scale_factor() as f32;
    Viewport::new(size.width as f32 / scale, size.height as f32 / scale, scale)
}

struct App {
    config: OrreryConfig,
    mount: Option<WindowMount>,
    view: Option<View<Renderer, RedrawScheduler>>,
    /// Front card label last shown in the title bar.
    titled: Option<String>,
}

impl App {
    fn new(config: OrreryConfig) -> Self {
        Self { config, mount: None, view: None, titled: None }
    }

    /// Show the front card's label in the title bar.
    fn sync_title(&mut self) {
        let (Some(view), Some(mount)) = (&self.view, &self.mount) else {
            return;
        };
        let label = view.front_label();
        if label == self.titled.as_deref() {
            return;
        }
        match label {
            Some(label) => mount.window().set_title(&format!("Orrery - {}", label)),
            None => mount.window().set_title("Orrery"),
        }
        self.titled = label.map(str::to_string);
    }

    fn open(&mut self, window: Arc<Window>) -> Result<()> {
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;
        let mount = WindowMount::new(window.clone());
        let view = View::open(
            renderer,
            RedrawScheduler::new(window.clone()),
            mount.clone(),
            window_viewport(&window),
            &self.config,
            Instant::now(),
        )?;
        self.mount = Some(mount);
        self.view = Some(view);
        Ok(())
    }

    /// Tear the view down and remember its last theme and scene.
    fn close(&mut self) {
        if let Some(mut view) = self.view.take() {
            view.close();
            self.config.theme = view.scene_config().theme;
            self.config.view = view.scene_config().kind;
            self.config.save();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        if key == KeyCode::Escape {
            self.close();
            event_loop.exit();
            return;
        }
        let now = Instant::now();
        let Some(view) = &mut self.view else {
            return;
        };
        let rebuilt = match key {
            KeyCode::KeyT => view.toggle_theme(now),
            KeyCode::KeyG => view.toggle_kind(now),
            _ => return,
        };
        if let Err(e) = rebuilt {
            log::warn!("Scene rebuild failed: {}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.view.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("Orrery")
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.open(window) {
            log::error!("Failed to initialize view: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let now = Instant::now();
        match &event {
            WindowEvent::CloseRequested => {
                self.close();
                event_loop.exit();
            }
            WindowEvent::Destroyed => {
                if let Some(mount) = &self.mount {
                    mount.mark_detached();
                }
                self.close();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(view), Some(mount)) = (&mut self.view, &self.mount) {
                    view.on_resize(window_viewport(mount.window()));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(view), Some(mount)) = (&mut self.view, &self.mount) {
                    view.on_window_input(&event);
                    let logical = position.to_logical::<f32>(mount.window().scale_factor());
                    view.on_cursor(Vec2::new(logical.x, logical.y), now);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(view) = &mut self.view {
                    view.on_cursor_left(now);
                }
            }
            WindowEvent::MouseWheel { .. } => {
                if let Some(view) = &mut self.view {
                    view.on_window_input(&event);
                }
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                if let Some(view) = &mut self.view {
                    view.on_click(now);
                }
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                if key.state == ElementState::Pressed && !key.repeat {
                    if let PhysicalKey::Code(code) = key.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(view) = &mut self.view {
                    if let Err(e) = view.redraw(now) {
                        log::warn!("Frame failed: {}", e);
                    }
                }
                self.sync_title();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(view) = &mut self.view else {
            return;
        };
        // Redraws keep themselves going; only the carousel timer needs a wake-up
        match view.poll(Instant::now()) {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Orrery");
    println!("  Wheel  - Scroll the page (camera dolly)");
    println!("  Mouse  - Tilt the orbit, hover globe nodes; hover the cards to pause, click to advance");
    println!("  T      - Toggle light/dark theme");
    println!("  G      - Cycle hero/globe/laser scene");
    println!("  Escape - Quit");

    let config = OrreryConfig::load();
    log::info!("Starting Orrery ({:?} scene, {:?} theme)", config.view, config.theme);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
