//! Windowed viewer with live audio playback.
//!
//! Space is the play button: it loads a new random track when none is
//! loaded (or the last one finished), then toggles play/pause. The up and
//! down arrows change the playback volume. Escape quits.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::analysis::SpectrumAnalyser;
use crate::audio::{AudioSystem, Playhead, TrackLibrary};
use crate::config::Config;
use crate::error::{Result, SpectraceError};
use crate::mapping::CanvasSize;
use crate::rendering::RenderSystem;
use crate::session::{Session, SessionState};

/// Gain change per arrow key press
const VOLUME_STEP: f32 = 0.1;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Playback
    library: TrackLibrary,
    audio: Option<AudioSystem>,
    analyser: SpectrumAnalyser,
    session: Session,

    // Configuration
    config: Config,

    /// Fatal error that ended the event loop
    error: Option<SpectraceError>,
}

impl App {
    fn new(config: Config, library: TrackLibrary) -> Result<Self> {
        Ok(Self {
            window: None,
            render_system: None,
            library,
            audio: None,
            analyser: SpectrumAnalyser::new(config.analysis.clone()),
            session: Session::new(&config)?,
            config,
            error: None,
        })
    }

    /// Play button
    fn press_play(&mut self) -> Result<()> {
        match self.session.state() {
            SessionState::Playing => {
                self.session.pause()?;
                if let Some(audio) = &self.audio {
                    audio.pause();
                }
            }
            SessionState::Paused => {
                self.session.play()?;
                if let Some(audio) = &self.audio {
                    audio.play();
                }
            }
            SessionState::Ready => self.start()?,
            SessionState::Idle | SessionState::Finished => {
                self.load_track()?;
                self.start()?;
            }
            SessionState::Loading => {}
        }
        Ok(())
    }

    fn load_track(&mut self) -> Result<()> {
        self.session.begin_loading()?;

        let volume = self.config.render.volume;
        let loaded = self
            .library
            .load_random()
            .and_then(|track| AudioSystem::new(&track, volume));

        match loaded {
            Ok(audio) => {
                self.audio = Some(audio);
                self.session.loaded()?;
                Ok(())
            }
            Err(e) => {
                self.session.load_failed()?;
                Err(e)
            }
        }
    }

    /// Fresh playback from the start of the loaded track
    fn start(&mut self) -> Result<()> {
        self.session.play()?;
        self.analyser.reset();
        if let Some(audio) = &self.audio {
            audio.play();
        }
        Ok(())
    }

    /// One display tick: update (when playing), then render and present
    fn render_frame(&mut self) {
        if self.session.is_playing() && self.audio.as_ref().is_some_and(|a| a.is_finished()) {
            if let Err(e) = self.session.finish() {
                tracing::warn!("{}", e);
            }
        }

        let render = &self.config.render;
        let canvas = CanvasSize::new(render.width, render.height);

        let frame = match (&self.audio, self.session.is_playing()) {
            (Some(audio), true) => Some(self.analyser.analyse(
                audio.history(self.config.analysis.fft_size),
                audio.sample_rate() as f32,
            )),
            _ => None,
        };
        self.session.update(frame.as_ref(), canvas);

        let composite = self.session.render(render.width, render.height);

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };
        match render_system.present(&composite) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(e) => tracing::warn!("Render error: {:?}", e),
        }
    }

    fn change_volume(&mut self, delta: f32) {
        let volume = self.config.render.adjust_volume(delta);
        if let Some(audio) = &self.audio {
            audio.set_volume(volume);
        }
        tracing::info!(volume, "Volume");
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("spectrace")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.render.width,
                self.config.render.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| SpectraceError::Graphics(e.to_string()))?,
        );
        let render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window)))?;

        tracing::info!("Press SPACE to play/pause, UP/DOWN for volume, ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.init_window(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::ArrowUp => self.change_volume(VOLUME_STEP),
                KeyCode::ArrowDown => self.change_volume(-VOLUME_STEP),
                KeyCode::Space if !repeat => {
                    if let Err(e) = self.press_play() {
                        tracing::warn!("{}", e);
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }
}

/// Open the viewer and block until it is closed
pub fn run(config: Config, library: TrackLibrary) -> Result<()> {
    let mut app = App::new(config, library)?;
    let event_loop = EventLoop::new().map_err(|e| SpectraceError::Graphics(e.to_string()))?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| SpectraceError::Graphics(e.to_string()))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
