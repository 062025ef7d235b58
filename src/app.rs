use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::device::ShaderSources;
use crate::scene::Scene;
use crate::utils::Vertex;
use crate::wgpu_device::WgpuDevice;
use crate::Renderer;

/// Stock WGSL sources for the packed sprite-vertex layout.
pub const VERTEX_SHADER: &str = include_str!("../shaders/sprite.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/sprite.frag.wgsl");

pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "quadbatch".to_string(),
            width: 800,
            height: 600,
        }
    }
}

type SetupCallback = Box<dyn FnOnce(&mut Renderer, &mut Scene) -> anyhow::Result<()>>;
type FrameCallback = Box<dyn FnMut(&mut Renderer, &mut Scene)>;

pub struct App {
    config: WindowConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    setup: Option<SetupCallback>,
    frame: FrameCallback,
}

impl App {
    pub fn new<S, F>(config: WindowConfig, setup: S, frame: F) -> Self
    where
        S: FnOnce(&mut Renderer, &mut Scene) -> anyhow::Result<()> + 'static,
        F: FnMut(&mut Renderer, &mut Scene) + 'static,
    {
        Self {
            config,
            window: None,
            renderer: None,
            scene: Scene::new(),
            setup: Some(Box::new(setup)),
            frame: Box::new(frame),
        }
    }

    pub fn renderer(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    fn init_renderer(&mut self, window: Arc<Window>) -> anyhow::Result<Renderer> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let device = WgpuDevice::new(surface, instance, size)?;
        let mut renderer = Renderer::new(
            Box::new(device),
            &ShaderSources {
                vertex: VERTEX_SHADER,
                fragment: FRAGMENT_SHADER,
            },
        )?;

        // The fixed per-vertex record: position 2, color 3, uv 2.
        renderer.add_attribute("a_position", 2, Vertex::POSITION_OFFSET, Vertex::STRIDE)?;
        renderer.add_attribute("a_color", 3, Vertex::COLOR_OFFSET, Vertex::STRIDE)?;
        renderer.add_attribute("a_texCoord", 2, Vertex::UV_OFFSET, Vertex::STRIDE)?;
        renderer.add_uniform("u_resolution", &[size.width as f32, size.height as f32])?;
        renderer.add_uniform("u_texture", &[0.0])?;

        Ok(renderer)
    }
}

impl ApplicationHandler<()> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match self.init_renderer(window.clone()) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("renderer initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Some(setup) = self.setup.take() {
            if let Err(e) = setup(&mut renderer, &mut self.scene) {
                log::error!("application setup failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.renderer = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::RedrawRequested => {
                if let Some(renderer) = &mut self.renderer {
                    (self.frame)(renderer, &mut self.scene);

                    if let Err(e) = self
                        .scene
                        .render(renderer)
                        .and_then(|_| renderer.present())
                    {
                        log::error!("frame failed: {e}");
                    }

                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                        log::error!("resize failed: {e}");
                    }
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            _ => (),
        }
    }
}

/// Opens a window, wires a renderer to it, runs `setup` once and `frame`
/// every redraw.
pub fn run_app<S, F>(config: WindowConfig, setup: S, frame: F) -> anyhow::Result<()>
where
    S: FnOnce(&mut Renderer, &mut Scene) -> anyhow::Result<()> + 'static,
    F: FnMut(&mut Renderer, &mut Scene) + 'static,
{
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, setup, frame);
    event_loop.run_app(&mut app)?;
    Ok(())
}
