use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use glam::{IVec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use tileworld::atlas::{Atlas, AtlasBuilder, PendingAtlas};
use tileworld::camera::Camera;
use tileworld::config::AppConfig;
use tileworld::renderer::Renderer;
use tileworld::renderer::atlas_texture::AtlasTexture;
use tileworld::{ChunkOutlines, DIRT, GRASS, STONE, VertexSink, World};

/// Camera pan speed for the arrow keys, in world units per second.
const CAM_SPEED: f32 = 500.0;

fn main() {
    let config = AppConfig::from_args(std::env::args());
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(config.log_level()).init() {
        eprintln!("logger already initialised: {e}");
    }

    // Pack the atlas while the window comes up; `resumed` waits for it.
    let pending = AtlasBuilder::new(config.atlas.clone()).spawn();

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            log::error!("could not create event loop: {e}");
            std::process::exit(1);
        }
    };

    let mut app = App { config, pending: Some(pending), state: None, failed: false };
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {e}");
        std::process::exit(1);
    }
    if app.failed {
        std::process::exit(1);
    }
}

// ── App ──────────────────────────────────────────────────────────────────────

struct App {
    config: AppConfig,
    pending: Option<PendingAtlas>,
    state: Option<State>,
    /// Startup failed; exit non-zero once the loop stops.
    failed: bool,
}

struct State {
    renderer: Renderer,
    atlas: Atlas,
    world: World,
    camera: Camera,
    rng: StdRng,
    sink: VertexSink,
    /// F3 toggles chunk outlines.
    show_chunk_bounds: bool,
    outlines: ChunkOutlines,
    keys_held: HashSet<KeyCode>,
    dragging: bool,
    cursor: Option<Vec2>,
    last_instant: Instant,
    title_timer: Instant,
    frames: u32,
    clicks: u32,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, msg: String) {
        log::error!("{msg}");
        self.failed = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(&self.config.title)
                .with_inner_size(winit::dpi::PhysicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => return self.fail(event_loop, format!("could not create window: {e}")),
        };

        let Some(pending) = self.pending.take() else { return };
        let atlas = match pending.wait() {
            Ok(atlas) => atlas,
            Err(e) => return self.fail(event_loop, format!("atlas build failed: {e}")),
        };
        if atlas.is_empty() {
            log::warn!("atlas has no tiles; the world will render blank");
        }

        let mut renderer = match pollster::block_on(Renderer::new(window)) {
            Ok(r) => r,
            Err(e) => return self.fail(event_loop, format!("renderer setup failed: {e}")),
        };

        let texture = match atlas.path() {
            Some(path) => match AtlasTexture::from_file(renderer.device(), renderer.queue(), path) {
                Ok(t) => t,
                Err(e) => return self.fail(event_loop, format!("could not reopen atlas {path:?}: {e}")),
            },
            None => AtlasTexture::upload(renderer.device(), renderer.queue(), atlas.image()),
        };
        renderer.set_atlas(&texture);

        let (w, h) = renderer.size();
        let now = Instant::now();
        self.state = Some(State {
            renderer,
            atlas,
            world: World::new(self.config.world.clone()),
            camera: Camera::new(w as f32 / 2.0, h as f32 / 2.0),
            rng: StdRng::from_entropy(),
            sink: VertexSink::new(),
            show_chunk_bounds: false,
            outlines: ChunkOutlines::default(),
            keys_held: HashSet::new(),
            dragging: false,
            cursor: None,
            last_instant: now,
            title_timer: now,
            frames: 0,
            clicks: 0,
        });
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => state.renderer.resize(size),

            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                if let (true, Some(prev)) = (state.dragging, state.cursor) {
                    state.camera.pan_screen(pos - prev);
                }
                state.cursor = Some(pos);
            }

            WindowEvent::MouseInput { button, state: button_state, .. } => {
                let pressed = button_state == ElementState::Pressed;
                if button == MouseButton::Left {
                    state.dragging = pressed;
                }
                if !pressed && matches!(button, MouseButton::Left | MouseButton::Right) {
                    state.clicks += 1;
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 100.0) as f32,
                };
                state.camera.scroll_zoom(notches);
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state: key_state, .. },
                ..
            } => match key_state {
                ElementState::Pressed => {
                    if state.keys_held.insert(code) {
                        state.on_key_pressed(code);
                    }
                }
                ElementState::Released => {
                    state.keys_held.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => state.frame(),

            _ => {}
        }
    }
}

// ── Frame ────────────────────────────────────────────────────────────────────

impl State {
    fn on_key_pressed(&mut self, code: KeyCode) {
        match code {
            KeyCode::Space => self.spawn_chunk(),
            KeyCode::KeyR => {
                self.world.clear();
                log::info!("world cleared");
            }
            KeyCode::F3 => {
                self.show_chunk_bounds = !self.show_chunk_bounds;
                log::info!("chunk outlines {}", if self.show_chunk_bounds { "on" } else { "off" });
            }
            _ => {}
        }
    }

    /// Drop a stone chunk with a small dirt/grass patch somewhere on screen.
    fn spawn_chunk(&mut self) {
        let (w, h) = self.renderer.size();
        let view = self.camera.visible_rect(w as f32, h as f32);
        let at = Vec2::new(
            self.rng.gen_range(view.min.x..view.max.x),
            self.rng.gen_range(view.min.y..view.max.y),
        );
        let index = self.world.spawn_chunk(at);

        let stone = self.atlas.tile(STONE);
        let dirt = self.atlas.tile(DIRT);
        let grass = self.atlas.tile(GRASS);
        let Some(chunk) = self.world.chunk_mut(index) else { return };
        chunk.fill_all(stone);
        for (pos, tile) in [
            (IVec2::new(7, 8), &dirt),
            (IVec2::new(8, 8), &grass),
            (IVec2::new(7, 7), &dirt),
            (IVec2::new(8, 7), &grass),
        ] {
            if let Err(e) = chunk.set(pos, tile.clone()) {
                log::debug!("spawn: {e}");
            }
        }
        log::info!("spawned chunk {} at {}", index, chunk.location());
    }

    /// Turn one random cell of one random chunk into dirt.
    fn scribble(&mut self) {
        if self.world.is_empty() {
            return;
        }
        let index = self.rng.gen_range(0..self.world.len());
        let size = self.world.chunk_size().as_ivec2();
        let pos = IVec2::new(self.rng.gen_range(0..size.x.max(1)), self.rng.gen_range(0..size.y.max(1)));
        let tile = self.atlas.tile(DIRT);
        if let Some(chunk) = self.world.chunk_mut(index) {
            if let Err(e) = chunk.set(pos, tile) {
                log::debug!("edit rejected: {e}");
            }
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_instant).as_secs_f32().min(0.25);
        self.last_instant = now;

        let mut pan = Vec2::ZERO;
        for (key, dir) in [
            (KeyCode::ArrowLeft, Vec2::NEG_X),
            (KeyCode::ArrowRight, Vec2::X),
            (KeyCode::ArrowUp, Vec2::NEG_Y),
            (KeyCode::ArrowDown, Vec2::Y),
        ] {
            if self.keys_held.contains(&key) {
                pan += dir;
            }
        }
        self.camera.position += pan * CAM_SPEED * dt;

        if self.keys_held.contains(&KeyCode::KeyD) {
            self.scribble();
        }

        let (w, h) = self.renderer.size();
        let viewport = self.camera.visible_rect(w as f32, h as f32);

        self.sink.clear();
        let stats = self.world.render(&viewport, &mut self.sink, &mut self.rng);

        // Chunk pass is complete; the overlay goes on top.
        self.outlines.clear();
        if self.show_chunk_bounds {
            self.outlines.push_chunks(self.world.chunks());
        }

        self.renderer.update_camera(&self.camera.build_view_proj(w as f32, h as f32));
        match self.renderer.render(&self.sink.vertices, self.outlines.vertices()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = self.renderer.window.inner_size();
                self.renderer.resize(size);
            }
            Err(e) => log::error!("render error: {e}"),
        }

        self.frames += 1;
        if now.duration_since(self.title_timer).as_secs_f32() >= 1.0 {
            self.renderer.window.set_title(&format!(
                "FPS: {} CPS: {} Chunks: {} (drawn {}, culled {}) DeltaTime: {:.4}",
                self.frames,
                self.clicks,
                self.world.len(),
                stats.drawn,
                stats.culled,
                dt,
            ));
            self.title_timer = now;
            self.frames = 0;
            self.clicks = 0;
        }
    }
}
