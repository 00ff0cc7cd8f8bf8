use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use room_caster::config::{Args, Config, WINDOW_HEIGHT, WINDOW_WIDTH};
use room_caster::input::InputCollector;
use room_caster::renderer::{Framebuffer, colors};
use room_caster::scaler::Upscaler;
use room_caster::{SetupError, World};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    config: Config,
    world: World,
    input: InputCollector,

    // Internal buffer, window size divided by the pixel scale
    framebuffer: Framebuffer,
    upscaler: Upscaler,

    // Frame pacing
    frame_interval: Duration,
    next_frame: Instant,
    last_tick: Instant,

    // HUD
    frame_counter: u32,
    last_fps_report: Instant,

    failure: Option<SetupError>,
}

impl App {
    fn new(config: Config) -> Self {
        let world = World::from_config(&config);
        let now = Instant::now();
        Self {
            window: None,
            surface: None,
            frame_interval: Duration::from_secs_f64(1.0 / config.fps as f64),
            config,
            world,
            input: InputCollector::new(),
            framebuffer: Framebuffer::default(),
            upscaler: Upscaler::default(),
            next_frame: now,
            last_tick: now,
            frame_counter: 0,
            last_fps_report: now,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SetupError) {
        error!("{err}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SetupError> {
        let attributes = Window::default_attributes()
            .with_title("Room Caster")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = Rc::new(event_loop.create_window(attributes)?);
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window.clone())?;

        let size = window.inner_size();
        self.rebuild_framebuffer(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
        Ok(())
    }

    fn rebuild_framebuffer(&mut self, dst_w: usize, dst_h: usize) {
        let scale = self.config.pixel_scale as usize;
        let (fb_w, fb_h) = ((dst_w / scale).max(1), (dst_h / scale).max(1));
        if self.framebuffer.resize(fb_w, fb_h) {
            debug!("internal framebuffer {fb_w}x{fb_h} for window {dst_w}x{dst_h}");
        }
        self.upscaler = Upscaler::new(dst_w, dst_h, fb_w, fb_h, self.config.filter);
    }

    /// Seconds since the last tick, capped so a stall does not teleport the
    /// player through walls.
    fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;
        dt.as_secs_f64()
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) -> Result<(), SetupError> {
        let frame = self.input.take_frame();
        if frame.quit_requested {
            info!("quit requested; stopping");
            event_loop.exit();
            return Ok(());
        }
        let dt = self.tick();
        self.world.update(dt, &frame);

        let Some(window) = self.window.clone() else {
            return Ok(());
        };
        if window.id() != id {
            return Ok(());
        }
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        let (dw, dh) = (size.width as usize, size.height as usize);
        if self.upscaler.target_size() != (dw, dh) {
            self.rebuild_framebuffer(dw, dh);
        }

        self.framebuffer.clear(colors::BLACK);
        self.world.draw(&mut self.framebuffer);

        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        surface.resize(width, height)?;
        let mut buf = surface.buffer_mut()?;
        self.upscaler.blit(&mut buf, self.framebuffer.pixels());
        buf.present()?;

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_report).as_secs_f32();
        if elapsed >= 1.0 {
            debug!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
            self.frame_counter = 0;
            self.last_fps_report = now;
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_surface(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        self.input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_framebuffer(new_size.width as usize, new_size.height as usize);
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop, id) {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame {
            self.next_frame = now + self.frame_interval;
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

fn init_logging(verbose: bool) -> Result<(), SetupError> {
    use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

    let level = if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_time_level(LevelFilter::Error)
        .add_filter_allow_str("room_caster")
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

fn main() -> Result<(), SetupError> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = Config::from_args(&args);
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now()));

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
