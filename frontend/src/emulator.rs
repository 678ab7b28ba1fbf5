use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use log::{info, warn};
use pocket_core::core::RomPath;
use pocket_core::session::{DisplaySurface, HostEvent, HostShell, InputRouter, Notifier, RunState};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;

use crate::error::FrontendError;
use crate::input::{Action, KeyMap};
use crate::video::Video;
use crate::{picker, screenshot};

pub const WINDOW_TITLE: &str = "Pocket";
const NOTICE_TIME: Duration = Duration::from_secs(2);
const IDLE_POLL: Duration = Duration::from_millis(2);

/// Paths the window needs for ROM picking and screenshots.
pub struct Paths {
    pub rom_dir: PathBuf,
    pub rom_filter: String,
    pub save_dir: PathBuf,
    pub screenshot_dir: PathBuf,
}

/// Messages from the [`HostShell`] notifier, shown in the title bar.
pub struct TitleNotices {
    rx: Receiver<String>,
    until: Option<Instant>,
}

impl TitleNotices {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx, until: None }
    }

    fn update(&mut self, video: &mut Video) {
        if let Some(msg) = self.rx.try_iter().last() {
            video.set_title(&format!("{WINDOW_TITLE} - {msg}"));
            self.until = Some(Instant::now() + NOTICE_TIME);
        } else if self.until.is_some_and(|t| Instant::now() >= t) {
            video.set_title(WINDOW_TITLE);
            self.until = None;
        }
    }
}

pub struct Window<N: Notifier> {
    pub shell: HostShell<N>,
    pub router: InputRouter,
    pub surface: DisplaySurface,
    pub video: Video,
    pub key_map: KeyMap,
    pub notices: TitleNotices,
    pub paths: Paths,
}

impl<N: Notifier> Window<N> {
    /// Pump SDL events until the window closes. Returns after the
    /// session has been torn down.
    pub fn run(&mut self, sdl: &sdl2::Sdl) -> Result<(), FrontendError> {
        let mut event_pump = sdl.event_pump().map_err(FrontendError::Sdl)?;

        'main: loop {
            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        scancode: Some(Scancode::Escape),
                        ..
                    } => break 'main,

                    Event::Window { win_event, .. } => match win_event {
                        WindowEvent::FocusGained | WindowEvent::Restored => {
                            self.shell.handle(HostEvent::Foreground);
                        }
                        WindowEvent::FocusLost | WindowEvent::Minimized => {
                            self.shell.handle(HostEvent::Background);
                        }
                        _ => {}
                    },

                    Event::KeyDown {
                        scancode: Some(sc),
                        repeat: false,
                        ..
                    } => match self.key_map.get(sc) {
                        Some(Action::Button(button)) => self.router.set_key(button, true),
                        Some(Action::ToggleDisplay) => self.router.toggle_display_mode(),
                        Some(Action::OpenRom) => self.open_rom(),
                        Some(Action::Screenshot) => self.screenshot(),
                        None => {}
                    },

                    Event::KeyUp {
                        scancode: Some(sc), ..
                    } => {
                        if let Some(Action::Button(button)) = self.key_map.get(sc) {
                            self.router.set_key(button, false);
                        }
                    }

                    _ => {}
                }
            }

            self.notices.update(&mut self.video);

            match self.surface.poll_redraw() {
                Some(frame) => self.video.present(&frame, &self.surface)?,
                None => std::thread::sleep(IDLE_POLL),
            }
        }

        self.shell.handle(HostEvent::Teardown);
        Ok(())
    }

    /// Start `rom`, reporting failures through the notifier.
    pub fn start(&mut self, rom: PathBuf) -> bool {
        let rom = RomPath::new(rom, &self.paths.save_dir);
        self.router.release_all();
        self.shell.rom_selected(rom)
    }

    fn open_rom(&mut self) {
        let was_running = self.shell.controller().state() == RunState::Running;
        self.shell.controller().pause();
        self.router.release_all();
        info!("choose a ROM in the terminal");

        match picker::pick_from_terminal(&self.paths.rom_dir, &self.paths.rom_filter) {
            Ok(Some(path)) => {
                self.start(path);
            }
            Ok(None) => {
                if was_running {
                    self.shell.controller().resume();
                }
            }
            Err(e) => {
                warn!("ROM picker failed: {e}");
                if was_running {
                    self.shell.controller().resume();
                }
            }
        }
    }

    fn screenshot(&mut self) {
        let Some(frame) = self.surface.snapshot_for_draw() else {
            return;
        };
        match screenshot::save(&frame, &self.paths.screenshot_dir) {
            Ok(path) => info!("screenshot saved to {}", path.display()),
            Err(e) => warn!("screenshot failed: {e}"),
        }
    }
}
